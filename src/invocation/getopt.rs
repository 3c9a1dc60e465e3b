//! POSIX getopt-style parser: argument tokens + grammar → parsed options.
//!
//! Unknown flags and flags missing a required value are skipped, never
//! reported as errors.

use tracing::debug;

use crate::invocation::grammar::{Arity, OptionGrammar};
use crate::invocation::options::ParsedOptions;

/// Result of parsing argument tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Getopt {
    /// Recognised options.
    pub options: ParsedOptions,
    /// Index into the token slice where option parsing stopped.
    pub operand_index: usize,
    /// Tokens or bundle fragments that were skipped.
    pub skipped: Vec<String>,
}

/// Parse `tokens` (the arguments after the script name) against `grammar`.
///
/// Parsing stops at the first operand (a token not starting with `-`, or a
/// lone `-`) or right after a `--` terminator.
pub fn parse(tokens: &[String], grammar: &OptionGrammar) -> Getopt {
    let mut out = Getopt::default();
    let mut idx = 0usize;

    while idx < tokens.len() {
        let token = tokens[idx].as_str();

        if token == "--" {
            idx += 1;
            break;
        }

        if let Some(body) = token.strip_prefix("--") {
            idx = parse_long(body, tokens, idx, grammar, &mut out);
            continue;
        }

        match token.strip_prefix('-') {
            Some(bundle) if !bundle.is_empty() => {
                idx = parse_short_bundle(bundle, tokens, idx, grammar, &mut out);
            }
            // Operand (or lone `-`): stop.
            _ => break,
        }
    }

    out.operand_index = idx;
    out
}

/// Handle `--name`, `--name=value` and `--name value`. Returns the next index.
fn parse_long(
    body: &str,
    tokens: &[String],
    idx: usize,
    grammar: &OptionGrammar,
    out: &mut Getopt,
) -> usize {
    let (name, attached) = match body.split_once('=') {
        Some((name, value)) => (name, Some(value)),
        None => (body, None),
    };

    let Some(def) = grammar.long(name) else {
        debug!(option = %tokens[idx], "skipping unrecognised long option");
        out.skipped.push(tokens[idx].clone());
        return idx + 1;
    };

    match (def.arity, attached) {
        (Arity::NoValue, None) => out.options.record(name, None),
        (Arity::NoValue, Some(_)) => {
            debug!(option = %tokens[idx], "skipping value given to no-value long option");
            out.skipped.push(tokens[idx].clone());
        }
        (Arity::RequiresValue | Arity::OptionalValue, Some(value)) => {
            out.options.record(name, Some(value.to_string()))
        }
        (Arity::OptionalValue, None) => out.options.record(name, None),
        (Arity::RequiresValue, None) => match tokens.get(idx + 1) {
            Some(value) => {
                out.options.record(name, Some(value.clone()));
                return idx + 2;
            }
            None => {
                debug!(option = name, "long option missing required value");
                out.skipped.push(tokens[idx].clone());
            }
        },
    }

    idx + 1
}

/// Handle one `-abc` token. Returns the next index.
fn parse_short_bundle(
    bundle: &str,
    tokens: &[String],
    idx: usize,
    grammar: &OptionGrammar,
    out: &mut Getopt,
) -> usize {
    for (pos, c) in bundle.char_indices() {
        let Some(def) = grammar.short(c) else {
            debug!(option = %c, "skipping unrecognised short option");
            out.skipped.push(format!("-{c}"));
            continue;
        };

        let rest = &bundle[pos + c.len_utf8()..];
        let attached = rest.strip_prefix('=').unwrap_or(rest);
        let name = def.name.as_str();

        match def.arity {
            Arity::NoValue => out.options.record(name, None),
            Arity::OptionalValue => {
                if rest.is_empty() {
                    out.options.record(name, None);
                } else {
                    out.options.record(name, Some(attached.to_string()));
                }
                return idx + 1;
            }
            Arity::RequiresValue => {
                if !rest.is_empty() {
                    out.options.record(name, Some(attached.to_string()));
                    return idx + 1;
                }
                return match tokens.get(idx + 1) {
                    Some(value) => {
                        out.options.record(name, Some(value.clone()));
                        idx + 2
                    }
                    None => {
                        debug!(option = %c, "short option missing required value");
                        out.skipped.push(format!("-{c}"));
                        idx + 1
                    }
                };
            }
        }
    }

    idx + 1
}
