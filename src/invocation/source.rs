//! Injected services: argument vector and environment lookup.

use std::collections::HashMap;

/// Supplies the process argument vector (script path first).
pub trait ArgumentSource {
    fn args(&self) -> Vec<String>;
}

/// Looks up environment variables by name.
///
/// `None` means unset; a variable set to the empty string is `Some("")`.
pub trait EnvironmentSource: Send + Sync {
    fn var(&self, name: &str) -> Option<String>;
}

/// The real process arguments. Non-UTF-8 arguments are converted lossily.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessArgs;

impl ArgumentSource for ProcessArgs {
    fn args(&self) -> Vec<String> {
        std::env::args_os()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvironmentSource for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        // `var_os` may panic on names that are empty or contain `=` or NUL.
        if name.is_empty() || name.contains('=') || name.contains('\0') {
            return None;
        }
        std::env::var_os(name).map(|v| v.to_string_lossy().into_owned())
    }
}

impl ArgumentSource for Vec<String> {
    fn args(&self) -> Vec<String> {
        self.clone()
    }
}

impl ArgumentSource for [&str] {
    fn args(&self) -> Vec<String> {
        self.iter().map(|s| s.to_string()).collect()
    }
}

impl<const N: usize> ArgumentSource for [&str; N] {
    fn args(&self) -> Vec<String> {
        self.as_slice().args()
    }
}

impl EnvironmentSource for HashMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_env_distinguishes_empty_from_unset() {
        let mut env = HashMap::new();
        env.insert("EMPTY".to_string(), String::new());

        assert_eq!(env.var("EMPTY"), Some(String::new()));
        assert_eq!(env.var("SOME_RANDOM_ENV_VAR_12345"), None);
    }

    #[test]
    fn process_env_reads_path() {
        assert!(ProcessEnv.var("PATH").is_some());
    }

    #[test]
    fn process_env_rejects_unsettable_names() {
        assert_eq!(ProcessEnv.var(""), None);
        assert_eq!(ProcessEnv.var("A=B"), None);
    }

    #[test]
    fn process_args_start_with_program() {
        assert!(!ProcessArgs.args().is_empty());
    }

    #[test]
    fn array_source_keeps_order() {
        assert_eq!(["a", "b", "a"].args(), vec!["a", "b", "a"]);
    }
}
