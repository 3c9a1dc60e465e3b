//! Option storage: raw argument sequence or parsed name → value mapping.

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

/// Value recorded for a parsed option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptValue {
    /// Given without a value.
    Flag,
    /// Given once with a value.
    Value(String),
    /// Given more than once; every occurrence in order (`None` = bare occurrence).
    Repeated(Vec<Option<String>>),
}

impl OptValue {
    fn from_occurrence(value: Option<String>) -> Self {
        match value {
            Some(v) => OptValue::Value(v),
            None => OptValue::Flag,
        }
    }

    fn into_occurrences(self) -> Vec<Option<String>> {
        match self {
            OptValue::Flag => vec![None],
            OptValue::Value(v) => vec![Some(v)],
            OptValue::Repeated(all) => all,
        }
    }

    /// Record another occurrence of the same option.
    pub(crate) fn push(&mut self, value: Option<String>) {
        let mut all = std::mem::replace(self, OptValue::Flag).into_occurrences();
        all.push(value);
        *self = OptValue::Repeated(all);
    }

    /// Last textual value given, if any.
    ///
    /// For a repeated option this is the last occurrence that carried a value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptValue::Flag => None,
            OptValue::Value(v) => Some(v),
            OptValue::Repeated(all) => all.iter().rev().find_map(|v| v.as_deref()),
        }
    }

    /// Number of times the option was given.
    pub fn count(&self) -> usize {
        match self {
            OptValue::Flag | OptValue::Value(_) => 1,
            OptValue::Repeated(all) => all.len(),
        }
    }

    /// Every occurrence in order.
    pub fn occurrences(&self) -> Vec<Option<&str>> {
        match self {
            OptValue::Flag => vec![None],
            OptValue::Value(v) => vec![Some(v.as_str())],
            OptValue::Repeated(all) => all.iter().map(|v| v.as_deref()).collect(),
        }
    }
}

// Bare occurrences serialize as `true`, valued ones as their string.
impl Serialize for OptValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            OptValue::Flag => serializer.serialize_bool(true),
            OptValue::Value(v) => serializer.serialize_str(v),
            OptValue::Repeated(all) => {
                let mut seq = serializer.serialize_seq(Some(all.len()))?;
                for v in all {
                    match v {
                        Some(v) => seq.serialize_element(v)?,
                        None => seq.serialize_element(&true)?,
                    }
                }
                seq.end()
            }
        }
    }
}

/// Parsed options in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedOptions {
    entries: Vec<(String, OptValue)>,
}

impl ParsedOptions {
    /// Record one occurrence of `name`, accumulating repeats.
    pub(crate) fn record(&mut self, name: &str, value: Option<String>) {
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => existing.push(value),
            None => self
                .entries
                .push((name.to_string(), OptValue::from_occurrence(value))),
        }
    }

    pub fn get(&self, name: &str) -> Option<&OptValue> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for ParsedOptions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// The two option shapes, fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionStore {
    /// No grammar declared: every argument after the script name, unparsed.
    Raw(Vec<String>),
    /// Grammar declared: options by name.
    Parsed(ParsedOptions),
}

impl OptionStore {
    /// Look up by index (raw) or name (parsed). A key of the other kind reads as absent.
    pub fn get<'k>(&self, key: impl Into<OptKey<'k>>) -> Option<OptRef<'_>> {
        match (self, key.into()) {
            (OptionStore::Raw(args), OptKey::Index(i)) => args.get(i).map(|a| OptRef::Arg(a)),
            (OptionStore::Parsed(opts), OptKey::Name(name)) => opts.get(name).map(OptRef::Parsed),
            _ => None,
        }
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, OptionStore::Raw(_))
    }

    pub fn mode(&self) -> &'static str {
        match self {
            OptionStore::Raw(_) => "raw",
            OptionStore::Parsed(_) => "parsed",
        }
    }
}

// Raw → JSON array, parsed → JSON object.
impl Serialize for OptionStore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            OptionStore::Raw(args) => args.serialize(serializer),
            OptionStore::Parsed(opts) => opts.serialize(serializer),
        }
    }
}

/// Key into an [`OptionStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptKey<'a> {
    /// Position in the raw sequence.
    Index(usize),
    /// Option name without dashes.
    Name(&'a str),
}

impl From<usize> for OptKey<'_> {
    fn from(i: usize) -> Self {
        OptKey::Index(i)
    }
}

impl<'a> From<&'a str> for OptKey<'a> {
    fn from(name: &'a str) -> Self {
        OptKey::Name(name)
    }
}

impl<'a> From<&'a String> for OptKey<'a> {
    fn from(name: &'a String) -> Self {
        OptKey::Name(name)
    }
}

/// Borrowed view of one present option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptRef<'a> {
    /// A raw argument.
    Arg(&'a str),
    /// A parsed option value.
    Parsed(&'a OptValue),
}

impl<'a> OptRef<'a> {
    /// Textual value: the raw argument, or the last value of a parsed option.
    pub fn as_str(&self) -> Option<&'a str> {
        match *self {
            OptRef::Arg(a) => Some(a),
            OptRef::Parsed(v) => v.as_str(),
        }
    }

    pub fn is_flag(&self) -> bool {
        matches!(self, OptRef::Parsed(OptValue::Flag))
    }
}
