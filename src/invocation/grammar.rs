//! Option grammar: short/long patterns → option definitions.

use crate::invocation::error::GrammarError;

/// Whether an option takes a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Bare flag, no value (pattern `a` / `all`).
    NoValue,
    /// Requires exactly one value (pattern `a:` / `all:`).
    RequiresValue,
    /// Value only when attached, e.g. `-avalue` or `--all=value` (pattern `a::` / `all::`).
    OptionalValue,
}

impl Arity {
    fn from_colons(colons: usize) -> Option<Self> {
        match colons {
            0 => Some(Arity::NoValue),
            1 => Some(Arity::RequiresValue),
            2 => Some(Arity::OptionalValue),
            _ => None,
        }
    }

    /// Pattern suffix for this arity.
    pub fn suffix(self) -> &'static str {
        match self {
            Arity::NoValue => "",
            Arity::RequiresValue => ":",
            Arity::OptionalValue => "::",
        }
    }
}

/// A single declared option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionDef {
    /// Name without dashes: one character for short options, the full word for long ones.
    pub name: String,
    /// Does it take a value?
    pub arity: Arity,
}

/// Declared short and long options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionGrammar {
    short: Vec<OptionDef>,
    long: Vec<OptionDef>,
}

impl OptionGrammar {
    /// Parse a short pattern (e.g. `"ah:b::"`) and a set of long patterns
    /// (e.g. `["all", "hight:", "level::"]`).
    pub fn parse<S: AsRef<str>>(short: &str, long: &[S]) -> Result<Self, GrammarError> {
        let short = parse_short(short)?;
        let long = long
            .iter()
            .map(|p| parse_long(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { short, long })
    }

    /// Look up a short option by character.
    ///
    /// A character declared twice resolves to its last declaration.
    pub fn short(&self, c: char) -> Option<&OptionDef> {
        self.short.iter().rev().find(|d| d.name.chars().eq(std::iter::once(c)))
    }

    /// Look up a long option by exact name.
    pub fn long(&self, name: &str) -> Option<&OptionDef> {
        self.long.iter().rev().find(|d| d.name == name)
    }

    pub fn short_defs(&self) -> &[OptionDef] {
        &self.short
    }

    pub fn long_defs(&self) -> &[OptionDef] {
        &self.long
    }
}

fn parse_short(pattern: &str) -> Result<Vec<OptionDef>, GrammarError> {
    let mut defs = Vec::new();
    let mut chars = pattern.char_indices().peekable();

    while let Some((position, c)) = chars.next() {
        if c == ':' {
            return Err(GrammarError::DanglingColon { position });
        }
        if !c.is_ascii_alphanumeric() {
            return Err(GrammarError::InvalidShortOption(c));
        }

        let mut colons = 0;
        while chars.next_if(|&(_, next)| next == ':').is_some() {
            colons += 1;
        }
        let arity = Arity::from_colons(colons).ok_or_else(|| GrammarError::TooManyColons {
            option: c.to_string(),
        })?;

        defs.push(OptionDef {
            name: c.to_string(),
            arity,
        });
    }

    Ok(defs)
}

fn parse_long(pattern: &str) -> Result<OptionDef, GrammarError> {
    let name = pattern.trim_end_matches(':');
    let colons = pattern.len() - name.len();

    if name.is_empty() {
        return Err(GrammarError::EmptyLongName {
            pattern: pattern.to_string(),
        });
    }
    if name.starts_with('-') || name.contains('=') || name.chars().any(char::is_whitespace) {
        return Err(GrammarError::InvalidLongName(name.to_string()));
    }
    let arity = Arity::from_colons(colons).ok_or_else(|| GrammarError::TooManyColons {
        option: name.to_string(),
    })?;

    Ok(OptionDef {
        name: name.to_string(),
        arity,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const NO_LONG: &[&str] = &[];

    #[test]
    fn parses_short_arities() {
        let grammar = OptionGrammar::parse("ah:b::", NO_LONG).unwrap();

        assert_eq!(grammar.short('a').unwrap().arity, Arity::NoValue);
        assert_eq!(grammar.short('h').unwrap().arity, Arity::RequiresValue);
        assert_eq!(grammar.short('b').unwrap().arity, Arity::OptionalValue);
        assert!(grammar.short('x').is_none());
        assert_eq!(grammar.short_defs().len(), 3);
    }

    #[test]
    fn parses_long_arities() {
        let grammar = OptionGrammar::parse("", &["action", "hight:", "all::"]).unwrap();

        assert_eq!(grammar.long("action").unwrap().arity, Arity::NoValue);
        assert_eq!(grammar.long("hight").unwrap().arity, Arity::RequiresValue);
        assert_eq!(grammar.long("all").unwrap().arity, Arity::OptionalValue);
        assert!(grammar.long("act").is_none());
    }

    #[test]
    fn empty_patterns_are_valid() {
        let grammar = OptionGrammar::parse("", NO_LONG).unwrap();
        assert!(grammar.short_defs().is_empty());
        assert!(grammar.long_defs().is_empty());
    }

    #[test]
    fn redeclared_short_uses_last_arity() {
        let grammar = OptionGrammar::parse("aa:", NO_LONG).unwrap();
        assert_eq!(grammar.short('a').unwrap().arity, Arity::RequiresValue);
    }

    #[test]
    fn leading_colon_is_rejected() {
        assert_eq!(
            OptionGrammar::parse(":a", NO_LONG),
            Err(GrammarError::DanglingColon { position: 0 })
        );
    }

    #[test]
    fn triple_colon_is_rejected() {
        assert_eq!(
            OptionGrammar::parse("a:::", NO_LONG),
            Err(GrammarError::TooManyColons {
                option: "a".into()
            })
        );
        assert!(matches!(
            OptionGrammar::parse("", &["all:::"]),
            Err(GrammarError::TooManyColons { .. })
        ));
    }

    #[test]
    fn non_alphanumeric_short_is_rejected() {
        assert_eq!(
            OptionGrammar::parse("a-", NO_LONG),
            Err(GrammarError::InvalidShortOption('-'))
        );
    }

    #[test]
    fn bad_long_names_are_rejected() {
        assert!(matches!(
            OptionGrammar::parse("", &["::"]),
            Err(GrammarError::EmptyLongName { .. })
        ));
        assert!(matches!(
            OptionGrammar::parse("", &["--all"]),
            Err(GrammarError::InvalidLongName(_))
        ));
        assert!(matches!(
            OptionGrammar::parse("", &["a=b"]),
            Err(GrammarError::InvalidLongName(_))
        ));
    }

    #[test]
    fn suffix_matches_pattern_convention() {
        assert_eq!(Arity::NoValue.suffix(), "");
        assert_eq!(Arity::RequiresValue.suffix(), ":");
        assert_eq!(Arity::OptionalValue.suffix(), "::");
    }
}
