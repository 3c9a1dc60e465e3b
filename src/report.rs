//! Serialisable snapshot of an [`Invocation`].

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Serialize;

use crate::invocation::{Invocation, OptionGrammar, OptionStore};

/// What the `callinfo` binary prints.
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub script: &'a str,
    pub mode: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grammar: Option<GrammarReport>,
    pub options: &'a OptionStore,
    pub operands: &'a [String],
    pub operand_index: usize,
    pub env: BTreeMap<String, Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stdin: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stdin_error: Option<String>,
}

/// Declared grammar, echoed back in pattern form.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct GrammarReport {
    pub short: String,
    pub long: Vec<String>,
}

impl From<&OptionGrammar> for GrammarReport {
    fn from(grammar: &OptionGrammar) -> Self {
        let short = grammar
            .short_defs()
            .iter()
            .map(|d| format!("{}{}", d.name, d.arity.suffix()))
            .collect();
        let long = grammar
            .long_defs()
            .iter()
            .map(|d| format!("{}{}", d.name, d.arity.suffix()))
            .collect();
        Self { short, long }
    }
}

impl<'a> Report<'a> {
    /// Snapshot `invocation`.
    ///
    /// With `read_stdin` the stream is drained (bounded by `timeout` if given);
    /// a read failure is recorded in `stdin_error` rather than returned.
    pub fn capture(
        invocation: &'a Invocation,
        env_names: &[String],
        read_stdin: bool,
        timeout: Option<Duration>,
    ) -> Self {
        let env = env_names
            .iter()
            .map(|name| (name.clone(), invocation.env(name)))
            .collect();

        let (stdin, stdin_error) = if read_stdin {
            let result = match timeout {
                Some(timeout) => invocation.input_timeout(timeout),
                None => invocation.input(),
            };
            match result {
                Ok(text) => (Some(text), None),
                Err(e) => {
                    tracing::warn!(error = %e, "standard input not captured");
                    (None, Some(e.to_string()))
                }
            }
        } else {
            (None, None)
        };

        Self {
            script: invocation.name(),
            mode: invocation.options().mode(),
            grammar: invocation.grammar().map(GrammarReport::from),
            options: invocation.options(),
            operands: invocation.operands(),
            operand_index: invocation.operand_index(),
            env,
            stdin,
            stdin_error,
        }
    }

    pub fn to_json(&self, pretty: bool) -> serde_json::Result<String> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Cursor;

    fn invocation(stdin: &'static [u8]) -> Invocation {
        let mut vars = HashMap::new();
        vars.insert("EMPTY".to_string(), String::new());
        Invocation::builder()
            .short("a:h")
            .long(["all::"])
            .args(&["run", "-a", "foo", "-h", "--all=bar", "file"])
            .env(vars)
            .stdin(Cursor::new(stdin))
            .build()
            .unwrap()
    }

    #[test]
    fn captures_options_and_env() {
        let inv = invocation(b"");
        let names = ["EMPTY".to_string(), "UNSET_VAR_XYZ".to_string()];
        let report = Report::capture(&inv, &names, false, None);
        let json: serde_json::Value = serde_json::from_str(&report.to_json(false).unwrap()).unwrap();

        assert_eq!(json["script"], "run");
        assert_eq!(json["mode"], "parsed");
        assert_eq!(json["grammar"]["short"], "a:h");
        assert_eq!(json["grammar"]["long"][0], "all::");
        assert_eq!(json["options"]["a"], "foo");
        assert_eq!(json["options"]["h"], true);
        assert_eq!(json["options"]["all"], "bar");
        assert_eq!(json["operands"][0], "file");
        assert_eq!(json["operand_index"], 5);
        assert_eq!(json["env"]["EMPTY"], "");
        assert!(json["env"]["UNSET_VAR_XYZ"].is_null());
        assert!(json.get("stdin").is_none());
        assert!(!inv.input_cached());
    }

    #[test]
    fn captures_stdin_when_asked() {
        let inv = invocation(b"piped");
        let report = Report::capture(&inv, &[], true, Some(Duration::from_secs(5)));
        assert_eq!(report.stdin, Some("piped"));
        assert!(report.stdin_error.is_none());
    }

    #[test]
    fn stdin_error_is_recorded() {
        let inv = invocation(&[0xff]);
        let report = Report::capture(&inv, &[], true, None);
        assert!(report.stdin.is_none());
        assert!(report.stdin_error.unwrap().contains("UTF-8"));
    }
}
