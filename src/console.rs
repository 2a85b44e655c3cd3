//! Page console capture. Installs a hook that buffers console output in the
//! page, drained once after the run and re-emitted through tracing.

use eoka::Page;
use serde::Deserialize;

use crate::Result;

/// JavaScript that wraps console methods to buffer their output.
const HOOK_JS: &str = r#"
(() => {
    if (window.__hitprobe_console) return;
    window.__hitprobe_console = [];
    for (const level of ['log', 'warn', 'error']) {
        const orig = console[level].bind(console);
        console[level] = (...args) => {
            window.__hitprobe_console.push({level, text: args.map(String).join(' ')});
            orig(...args);
        };
    }
})()
"#;

/// One captured console line.
#[derive(Debug, Clone, Deserialize)]
pub struct ConsoleLine {
    pub level: String,
    pub text: String,
}

/// Install the console hook. Idempotent.
pub async fn install(page: &Page) -> Result<()> {
    page.execute(HOOK_JS).await?;
    Ok(())
}

/// Drain all buffered console lines. Returns empty if the hook was never
/// installed (or the page navigated away from it).
pub async fn drain(page: &Page) -> Result<Vec<ConsoleLine>> {
    let json: String = page
        .evaluate("JSON.stringify((window.__hitprobe_console || []).splice(0))")
        .await?;
    let lines: Vec<ConsoleLine> = serde_json::from_str(&json)
        .map_err(|e| eoka::Error::CdpSimple(format!("console parse error: {}", e)))?;
    Ok(lines)
}
