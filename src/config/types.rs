use serde::{Deserialize, Serialize};

/// Root configuration container for the `callinfo` binary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub grammar: GrammarConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

/// Option grammar applied to the inspected call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrammarConfig {
    /// Short-option pattern (e.g. "a:h"). Unset means raw mode.
    #[serde(default)]
    pub short: Option<String>,
    /// Long-option patterns (e.g. ["all::", "hight:"]).
    #[serde(default)]
    pub long: Vec<String>,
}

/// What goes into the printed report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Environment variables to look up.
    #[serde(default)]
    pub env: Vec<String>,
    /// Pretty-print JSON (default: true).
    #[serde(default = "default_pretty")]
    pub pretty: bool,
    /// Include stdin content (default: false).
    #[serde(default)]
    pub read_stdin: bool,
    /// Give up on stdin after this many milliseconds. Unset waits forever.
    #[serde(default)]
    pub stdin_timeout_ms: Option<u64>,
}

fn default_pretty() -> bool {
    true
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            env: Vec::new(),
            pretty: default_pretty(),
            read_stdin: false,
            stdin_timeout_ms: None,
        }
    }
}
