use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use callinfo::config::Config;
use callinfo::logging::init_tracing;
use callinfo::report::Report;
use callinfo::Invocation;

/// Show how a command line is seen: script name, options, environment and stdin.
#[derive(Debug, Parser)]
#[command(name = "callinfo", version)]
struct Cli {
    /// Short-option pattern, e.g. "ah:b::". Omit for raw mode.
    #[arg(short, long)]
    short: Option<String>,

    /// Long-option pattern, e.g. "all::". Repeatable.
    #[arg(short, long = "long")]
    long: Vec<String>,

    /// Environment variable to report. Repeatable.
    #[arg(short, long = "env", value_name = "NAME")]
    env: Vec<String>,

    /// Read and report standard input.
    #[arg(long)]
    stdin: bool,

    /// Give up on standard input after this many milliseconds.
    #[arg(long, value_name = "MS")]
    timeout_ms: Option<u64>,

    /// Single-line JSON output.
    #[arg(long)]
    compact: bool,

    /// Config file (default: ~/.config/callinfo/config.toml).
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Debug logging.
    #[arg(short, long)]
    verbose: bool,

    /// The call to inspect: script path followed by its arguments.
    #[arg(last = true, value_name = "CALL")]
    call: Vec<String>,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("loading config")?;
    merge_cli(&mut config, &cli);
    tracing::debug!(?config, "effective config");

    let mut builder = Invocation::builder().args(&cli.call);
    if let Some(short) = &config.grammar.short {
        builder = builder
            .short(short.as_str())
            .long(config.grammar.long.iter().cloned());
    }
    let invocation = builder.build().context("building invocation")?;

    let timeout = config.report.stdin_timeout_ms.map(Duration::from_millis);
    let report = Report::capture(
        &invocation,
        &config.report.env,
        config.report.read_stdin,
        timeout,
    );

    let json = report.to_json(config.report.pretty)?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", json)?;
    Ok(())
}

/// CLI flags override file values.
fn merge_cli(config: &mut Config, cli: &Cli) {
    if cli.short.is_some() {
        config.grammar.short = cli.short.clone();
    }
    if !cli.long.is_empty() {
        config.grammar.long = cli.long.clone();
    }
    config.report.env.extend(cli.env.iter().cloned());
    if cli.stdin {
        config.report.read_stdin = true;
    }
    if cli.timeout_ms.is_some() {
        config.report.stdin_timeout_ms = cli.timeout_ms;
    }
    if cli.compact {
        config.report.pretty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_call_is_kept_verbatim() {
        let cli = Cli::parse_from(["callinfo", "-s", "a:", "--", "run", "-a", "x", "--weird"]);
        assert_eq!(cli.short.as_deref(), Some("a:"));
        assert_eq!(cli.call, vec!["run", "-a", "x", "--weird"]);
    }

    #[test]
    fn cli_overrides_config() {
        let cli = Cli::parse_from([
            "callinfo", "--long", "all::", "--env", "HOME", "--stdin", "--compact", "--timeout-ms",
            "10",
        ]);
        let mut config = Config::default();
        config.grammar.short = Some("a".into());
        config.report.env = vec!["PATH".into()];

        merge_cli(&mut config, &cli);

        assert_eq!(config.grammar.short.as_deref(), Some("a"));
        assert_eq!(config.grammar.long, vec!["all::".to_string()]);
        assert_eq!(config.report.env, vec!["PATH".to_string(), "HOME".to_string()]);
        assert!(config.report.read_stdin);
        assert!(!config.report.pretty);
        assert_eq!(config.report.stdin_timeout_ms, Some(10));
    }
}
