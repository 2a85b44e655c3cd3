//! Runtime `${var}` substitution, so configs never bake in machine-specific
//! values like the page path or viewport.

use crate::{Error, Result};
use serde::Deserialize;
use std::collections::HashMap;

/// Runtime parameters passed to a config.
#[derive(Debug, Clone, Default)]
pub struct Params {
    values: HashMap<String, String>,
}

impl Params {
    /// Create empty params.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a parameter value.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Get a parameter value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(|s| s.as_str())
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Parse from CLI args like "key=value".
    pub fn from_args(args: &[String]) -> Result<Self> {
        let mut params = Self::new();
        for arg in args {
            let (key, value) = arg.split_once('=').ok_or_else(|| {
                Error::Config(format!("invalid param '{}', expected key=value", arg))
            })?;
            params.values.insert(key.to_string(), value.to_string());
        }
        Ok(params)
    }
}

/// Parameter definition in config.
#[derive(Debug, Clone, Deserialize)]
pub struct ParamDef {
    /// Whether this parameter is required.
    #[serde(default)]
    pub required: bool,

    /// Default value if not provided.
    pub default: Option<String>,

    /// Description for documentation.
    pub description: Option<String>,
}

/// Recursively substitute `${var}` in every string of a YAML document.
pub fn apply(
    value: &mut serde_yaml::Value,
    params: &Params,
    defs: &HashMap<String, ParamDef>,
) -> Result<()> {
    match value {
        serde_yaml::Value::String(s) => {
            *s = expand(s, params, defs)?;
        }
        serde_yaml::Value::Mapping(map) => {
            for (_, v) in map.iter_mut() {
                apply(v, params, defs)?;
            }
        }
        serde_yaml::Value::Sequence(seq) => {
            for v in seq.iter_mut() {
                apply(v, params, defs)?;
            }
        }
        _ => {}
    }
    Ok(())
}

/// Expand `${var}` patterns in one string. Unknown variables are left as-is;
/// a defined-but-missing optional variable expands to the empty string.
fn expand(input: &str, params: &Params, defs: &HashMap<String, ParamDef>) -> Result<String> {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(open) = rest.find("${") {
        out.push_str(&rest[..open]);
        let Some(close) = rest[open..].find('}') else {
            // Unterminated pattern, keep verbatim.
            out.push_str(&rest[open..]);
            return Ok(out);
        };
        let close = open + close;
        let name = &rest[open + 2..close];

        if let Some(v) = params.get(name) {
            out.push_str(v);
        } else if let Some(def) = defs.get(name) {
            if let Some(ref d) = def.default {
                out.push_str(d);
            } else if def.required {
                return Err(Error::Config(format!(
                    "missing required parameter: {}",
                    name
                )));
            }
        } else {
            out.push_str(&rest[open..=close]);
        }
        rest = &rest[close + 1..];
    }

    out.push_str(rest);
    Ok(out)
}
