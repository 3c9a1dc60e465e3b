//! The invocation model: one value per process run.
//!
//! ```text
//! ArgumentSource → script name + tokens → (grammar? getopt : raw) → OptionStore
//! EnvironmentSource ─────────────────────────────────────────────▶ env()
//! stdin ──────────────── LazyInput (drained once) ───────────────▶ input()
//! ```
//!
//! Without a short-option pattern the arguments stay a raw sequence; with one
//! they are parsed getopt-style into a name → value mapping. The shape is
//! fixed at construction.

mod error;
mod getopt;
mod grammar;
mod input;
mod options;
mod source;

pub use error::{GrammarError, InvocationError};
pub use getopt::{parse as parse_args, Getopt};
pub use grammar::{Arity, OptionDef, OptionGrammar};
pub use input::{InputStream, LazyInput};
pub use options::{OptKey, OptRef, OptValue, OptionStore, ParsedOptions};
pub use source::{ArgumentSource, EnvironmentSource, ProcessArgs, ProcessEnv};

use std::time::Duration;

use tracing::{debug, warn};

/// A single command-line call: script name, options, environment, stdin.
///
/// `Send + Sync`; the name and options never change, and stdin is drained at
/// most once no matter how many threads ask for it.
pub struct Invocation {
    script_name: String,
    options: OptionStore,
    grammar: Option<OptionGrammar>,
    operands: Vec<String>,
    operand_index: usize,
    env: Box<dyn EnvironmentSource>,
    input: LazyInput,
}

impl std::fmt::Debug for Invocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Invocation")
            .field("script_name", &self.script_name)
            .field("options", &self.options)
            .field("operands", &self.operands)
            .field("input", &self.input)
            .finish_non_exhaustive()
    }
}

impl Invocation {
    /// Build from the real process arguments, environment and stdin.
    ///
    /// `short == None` selects raw mode; `long == None` means no long options.
    pub fn new(short: Option<&str>, long: Option<&[&str]>) -> Result<Self, InvocationError> {
        let mut builder = Self::builder();
        if let Some(short) = short {
            builder = builder.short(short);
        }
        if let Some(long) = long {
            builder = builder.long(long.iter().copied());
        }
        builder.build()
    }

    /// Raw-mode invocation over the real process.
    pub fn from_process() -> Self {
        let args = ProcessArgs.args();
        Self::assemble(args, None, Box::new(ProcessEnv), Box::new(std::io::stdin()))
    }

    pub fn builder() -> InvocationBuilder {
        InvocationBuilder::new()
    }

    fn assemble(
        args: Vec<String>,
        grammar: Option<OptionGrammar>,
        env: Box<dyn EnvironmentSource>,
        stdin: InputStream,
    ) -> Self {
        let mut args = args.into_iter();
        let script_name = args.next().unwrap_or_else(|| {
            warn!("empty argument vector, script name left blank");
            String::new()
        });
        let tokens: Vec<String> = args.collect();

        let (options, operands, operand_index) = match &grammar {
            None => {
                debug!(count = tokens.len(), "raw option mode");
                let operands = tokens.clone();
                (OptionStore::Raw(tokens), operands, 1)
            }
            Some(grammar) => {
                let parsed = getopt::parse(&tokens, grammar);
                debug!(
                    options = parsed.options.len(),
                    skipped = parsed.skipped.len(),
                    operand_index = parsed.operand_index,
                    "parsed option mode"
                );
                let operands = tokens[parsed.operand_index..].to_vec();
                (
                    OptionStore::Parsed(parsed.options),
                    operands,
                    parsed.operand_index + 1,
                )
            }
        };

        Self {
            script_name,
            options,
            grammar,
            operands,
            operand_index,
            env,
            input: LazyInput::new(stdin),
        }
    }

    /// The script path as invoked (argument zero).
    pub fn name(&self) -> &str {
        &self.script_name
    }

    /// All options: the raw sequence or the parsed mapping.
    pub fn options(&self) -> &OptionStore {
        &self.options
    }

    /// One option by index (raw mode) or name (parsed mode). `None` when absent.
    pub fn opt<'k>(&self, key: impl Into<OptKey<'k>>) -> Option<OptRef<'_>> {
        self.options.get(key)
    }

    /// Textual value of an option; `None` when absent or given without a value.
    pub fn opt_str<'k>(&self, key: impl Into<OptKey<'k>>) -> Option<&str> {
        self.opt(key).and_then(|v| v.as_str())
    }

    pub fn has<'k>(&self, key: impl Into<OptKey<'k>>) -> bool {
        self.opt(key).is_some()
    }

    /// The declared grammar, parsed mode only.
    pub fn grammar(&self) -> Option<&OptionGrammar> {
        self.grammar.as_ref()
    }

    /// Arguments left after option parsing stopped. In raw mode, every argument.
    pub fn operands(&self) -> &[String] {
        &self.operands
    }

    /// Position of the first operand in the full argument vector (script name at 0).
    pub fn operand_index(&self) -> usize {
        self.operand_index
    }

    /// Environment variable by name. `None` when unset, `Some("")` when set empty.
    pub fn env(&self, name: &str) -> Option<String> {
        self.env.var(name)
    }

    /// Entire standard input as text, read on first call and cached.
    ///
    /// Blocks until end-of-stream. If stdin is an interactive terminal with no
    /// EOF pending this never returns; redirect or close stdin first, or use
    /// [`input_timeout`](Self::input_timeout).
    pub fn input(&self) -> Result<&str, InvocationError> {
        std::str::from_utf8(self.input.get()?).map_err(InvocationError::InputNotUtf8)
    }

    /// Standard input as raw bytes. Shares the cache with [`input`](Self::input).
    pub fn input_bytes(&self) -> Result<&[u8], InvocationError> {
        self.input.get()
    }

    /// [`input`](Self::input) with an upper bound on the wait.
    ///
    /// The bound also covers waiting for another thread's drain. On
    /// [`InvocationError::InputTimedOut`] the read keeps going in the
    /// background and a later call can still collect it.
    pub fn input_timeout(&self, timeout: Duration) -> Result<&str, InvocationError> {
        std::str::from_utf8(self.input.get_timeout(timeout)?).map_err(InvocationError::InputNotUtf8)
    }

    /// Whether stdin has been drained already.
    pub fn input_cached(&self) -> bool {
        self.input.is_cached()
    }
}

/// Builder for an [`Invocation`] with injectable sources.
///
/// Defaults to the real process arguments, environment and stdin.
pub struct InvocationBuilder {
    short: Option<String>,
    long: Vec<String>,
    args: Option<Vec<String>>,
    env: Box<dyn EnvironmentSource>,
    stdin: Option<InputStream>,
}

impl InvocationBuilder {
    pub fn new() -> Self {
        Self {
            short: None,
            long: Vec::new(),
            args: None,
            env: Box::new(ProcessEnv),
            stdin: None,
        }
    }

    /// Short-option pattern, e.g. `"ah:b::"`. Setting it selects parsed mode.
    pub fn short(mut self, pattern: impl Into<String>) -> Self {
        self.short = Some(pattern.into());
        self
    }

    /// Long-option patterns, e.g. `["all::", "hight:"]`. Only used in parsed mode.
    pub fn long<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.long.extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Argument vector, script path first.
    pub fn args(mut self, source: &(impl ArgumentSource + ?Sized)) -> Self {
        self.args = Some(source.args());
        self
    }

    pub fn env(mut self, source: impl EnvironmentSource + 'static) -> Self {
        self.env = Box::new(source);
        self
    }

    pub fn stdin(mut self, reader: impl std::io::Read + Send + 'static) -> Self {
        self.stdin = Some(Box::new(reader));
        self
    }

    /// Parse the grammar (if any) and the arguments.
    pub fn build(self) -> Result<Invocation, InvocationError> {
        if self.short.is_none() && !self.long.is_empty() {
            debug!("long patterns ignored without a short pattern");
        }
        let grammar = self
            .short
            .as_deref()
            .map(|short| OptionGrammar::parse(short, self.long.as_slice()))
            .transpose()?;
        let args = self.args.unwrap_or_else(|| ProcessArgs.args());
        let stdin = self
            .stdin
            .unwrap_or_else(|| Box::new(std::io::stdin()) as InputStream);

        Ok(Invocation::assemble(args, grammar, self.env, stdin))
    }
}

impl Default for InvocationBuilder {
    fn default() -> Self {
        Self::new()
    }
}
