use clap::Parser;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use hitprobe::{Error, Mode};

#[derive(Parser)]
#[command(name = "hitprobe")]
#[command(about = "Click-interception diagnostics for a browser page")]
#[command(version)]
struct Cli {
    /// Config file to run
    config: PathBuf,

    /// Run in headless mode (overrides config)
    #[arg(long)]
    headless: bool,

    /// Sweep mode: passive (hit-test only) or active (real clicks)
    #[arg(long, value_name = "MODE")]
    mode: Option<String>,

    /// Set a parameter (can be used multiple times)
    #[arg(short = 'P', long = "param", value_name = "KEY=VALUE")]
    params: Vec<String>,

    /// Verbose output (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Validate config without running
    #[arg(long)]
    check: bool,

    /// Quiet mode (only errors)
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> hitprobe::Result<()> {
    let cli = Cli::parse();

    let level = if cli.quiet {
        Level::ERROR
    } else {
        match cli.verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            _ => Level::DEBUG,
        }
    };

    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    let params = hitprobe::Params::from_args(&cli.params)?;
    let mut config = hitprobe::Config::load_with_params(&cli.config, &params)?;

    if let Some(ref mode) = cli.mode {
        config.probe.mode = match mode.as_str() {
            "passive" => Mode::Passive,
            "active" => Mode::Active,
            other => {
                return Err(Error::Config(format!(
                    "unknown mode '{}', expected passive or active",
                    other
                )))
            }
        };
    }
    if cli.headless {
        config.browser.headless = true;
    }

    if cli.check {
        println!("Config valid: {}", config.name);
        println!("  Target: {}", config.target.url);
        println!("  Overlay: #{}", config.page.overlay);
        println!("  Control: #{}", config.page.control);
        let mode = match config.probe.mode {
            Mode::Passive => "passive",
            Mode::Active => "active",
        };
        println!("  Mode: {}", mode);
        println!("  Offsets: {}", config.probe.offsets.len());
        println!("  Anchors: {}", config.probe.anchors.len());
        if !config.params.is_empty() {
            println!("  Parameters: {}", config.params.len());
            for (name, def) in &config.params {
                let req = if def.required { " (required)" } else { "" };
                let desc = def.description.as_deref().unwrap_or("");
                println!("    - {}{}: {}", name, req, desc);
            }
        }
        return Ok(());
    }

    println!("Running: {}", config.name);

    let mut runner = hitprobe::Runner::new(&config.browser).await?;
    let result = runner.run(&config).await;
    // Release the browser before inspecting the outcome.
    runner.close().await?;
    let result = result?;

    print!("{}", result.report);
    for line in &result.console {
        println!("console[{}]: {}", line.level, line.text);
    }

    println!();
    if result.success {
        println!("✓ No interception detected");
    } else {
        println!("✗ Interception detected");
        if let Some(first) = result.report.first_interception() {
            println!("  First intercepted probe: {}", first);
        }
    }
    let samples = result.report.hits.len() + result.report.clicks.len();
    println!("  Samples: {}", samples);
    if result.report.reopens() > 0 {
        println!("  Overlay reopens: {}", result.report.reopens());
    }
    println!("  Duration: {}ms", result.duration_ms);

    if !result.success {
        std::process::exit(1);
    }

    Ok(())
}
