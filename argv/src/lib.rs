//! Command-line argument parsing.
//!
//! Turns a raw argument vector (everything after the program name) into a map
//! of options and an ordered list of positional arguments:
//! - `-abc` expands to `-a -b -c`
//! - `--key=value`, `--key value` and `-k value` assign string values
//! - the strings `"true"` and `"false"` become booleans
//! - one layer of enclosing quotes is stripped from every token
//!
//! Parsing is total: any argument vector produces a result.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use tracing::{debug, trace};

// ============================================================================
// Result and Error types
// ============================================================================

pub type Result<T> = std::result::Result<T, Error>;

/// Errors from typed option retrieval. Parsing itself never fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("option not found: {0}")]
    NotFound(String),

    #[error("option {name}: expected {expected}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
    },

    #[error("option {name}: bad number: {value}")]
    BadNumber { name: String, value: String },
}

// ============================================================================
// OptionValue
// ============================================================================

/// Value of a parsed option: either a bare flag state or a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Str(String),
}

impl OptionValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::Str(s) => Some(s),
            OptionValue::Bool(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Bool(b) => Some(*b),
            OptionValue::Str(_) => None,
        }
    }

    /// `"true"` and `"false"` become booleans; every other string is kept.
    fn coerce(self) -> Self {
        match self {
            OptionValue::Str(s) if s == "true" => OptionValue::Bool(true),
            OptionValue::Str(s) if s == "false" => OptionValue::Bool(false),
            other => other,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(b) => write!(f, "{}", b),
            OptionValue::Str(s) => write!(f, "{}", s),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(b: bool) -> Self {
        OptionValue::Bool(b)
    }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        OptionValue::Str(s.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(s: String) -> Self {
        OptionValue::Str(s)
    }
}

// ============================================================================
// Typed retrieval
// ============================================================================

/// Conversion from a stored option value, used by [`Options::get`].
pub trait FromOptionValue: Sized {
    fn from_option_value(name: &str, v: &OptionValue) -> Result<Self>;
}

impl FromOptionValue for bool {
    fn from_option_value(name: &str, v: &OptionValue) -> Result<Self> {
        match v {
            OptionValue::Bool(b) => Ok(*b),
            OptionValue::Str(_) => Err(mismatch(name, "bool")),
        }
    }
}

impl FromOptionValue for String {
    fn from_option_value(name: &str, v: &OptionValue) -> Result<Self> {
        match v {
            OptionValue::Str(s) => Ok(s.clone()),
            OptionValue::Bool(_) => Err(mismatch(name, "string")),
        }
    }
}

impl FromOptionValue for i32 {
    fn from_option_value(name: &str, v: &OptionValue) -> Result<Self> {
        parse_number(name, v, "i32")
    }
}

impl FromOptionValue for i64 {
    fn from_option_value(name: &str, v: &OptionValue) -> Result<Self> {
        parse_number(name, v, "i64")
    }
}

impl FromOptionValue for u32 {
    fn from_option_value(name: &str, v: &OptionValue) -> Result<Self> {
        parse_number(name, v, "u32")
    }
}

impl FromOptionValue for u64 {
    fn from_option_value(name: &str, v: &OptionValue) -> Result<Self> {
        parse_number(name, v, "u64")
    }
}

impl FromOptionValue for f64 {
    fn from_option_value(name: &str, v: &OptionValue) -> Result<Self> {
        parse_number(name, v, "f64")
    }
}

fn mismatch(name: &str, expected: &'static str) -> Error {
    Error::TypeMismatch {
        name: name.to_string(),
        expected,
    }
}

// Numbers are stored as strings and only parsed on retrieval.
fn parse_number<T: FromStr>(name: &str, v: &OptionValue, expected: &'static str) -> Result<T> {
    match v {
        OptionValue::Str(s) => s.parse().map_err(|_| Error::BadNumber {
            name: name.to_string(),
            value: s.clone(),
        }),
        OptionValue::Bool(_) => Err(mismatch(name, expected)),
    }
}

// ============================================================================
// Options
// ============================================================================

/// Options keyed by name without leading dashes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Options {
    values: BTreeMap<String, OptionValue>,
}

impl Options {
    /// Parse `args` and keep only the options.
    pub fn from_args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        parse(args).options
    }

    pub fn value(&self, name: &str) -> Option<&OptionValue> {
        self.values.get(name)
    }

    /// Get a typed value by option name.
    pub fn get<T: FromOptionValue>(&self, name: &str) -> Result<T> {
        match self.values.get(name) {
            Some(v) => T::from_option_value(name, v),
            None => Err(Error::NotFound(name.to_string())),
        }
    }

    /// Check if an option was given on the command line
    pub fn is_present(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Copy of all key/value pairs.
    pub fn to_record(&self) -> BTreeMap<String, OptionValue> {
        self.values.clone()
    }
}

// ============================================================================
// PositionalArguments
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PositionalArguments(Vec<String>);

impl PositionalArguments {
    /// Filter the positional arguments out of `args`.
    pub fn from_args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut positional = Vec::new();
        let mut previous: Option<String> = None;
        for arg in args {
            let arg: String = arg.into();
            if is_positional(&arg, previous.as_deref()) {
                positional.push(arg.clone());
            }
            previous = Some(arg);
        }
        PositionalArguments(positional)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.0.clone()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

// ============================================================================
// ParsedArguments
// ============================================================================

/// Result of parsing one argument vector.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedArguments {
    options: Options,
    positional_arguments: PositionalArguments,
    #[serde(skip)]
    option_arguments: Vec<String>,
}

impl ParsedArguments {
    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn positional_arguments(&self) -> &PositionalArguments {
        &self.positional_arguments
    }

    /// Raw arguments that went to option parsing, in original order.
    pub fn option_arguments(&self) -> &[String] {
        &self.option_arguments
    }

    pub fn into_parts(self) -> (Options, PositionalArguments) {
        (self.options, self.positional_arguments)
    }
}

// ============================================================================
// Parsing
// ============================================================================

/// Parse an argument vector that excludes the program name.
pub fn parse<I, S>(args: I) -> ParsedArguments
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let args: Vec<String> = args.into_iter().map(Into::into).collect();

    let mut positional = Vec::new();
    let mut option_arguments = Vec::new();
    let mut stream = Vec::new();

    let mut previous: Option<&str> = None;
    for arg in &args {
        if is_positional(arg, previous) {
            trace!(arg = arg.as_str(), "positional argument");
            positional.push(arg.clone());
        } else {
            trace!(arg = arg.as_str(), "option argument");
            push_option_tokens(arg, &mut stream);
            option_arguments.push(arg.clone());
        }
        previous = Some(arg.as_str());
    }

    let options = assign_options(&stream);
    debug!(
        args = args.len(),
        options = options.len(),
        positional = positional.len(),
        "parsed arguments"
    );

    ParsedArguments {
        options,
        positional_arguments: PositionalArguments(positional),
        option_arguments,
    }
}

/// Parse the arguments of the current process, skipping the program name.
///
/// Arguments that are not valid UTF-8 are converted lossily.
pub fn parse_env() -> ParsedArguments {
    parse(
        std::env::args_os()
            .skip(1)
            .map(|a| a.to_string_lossy().into_owned()),
    )
}

/// Whether `arg` is a positional argument given the argument before it.
///
/// An argument is positional when it does not start with `-` and was not
/// consumed as the value of a preceding flag. A preceding flag that carries
/// its own `=value` does not consume anything.
pub fn is_positional(arg: &str, previous: Option<&str>) -> bool {
    if arg.starts_with('-') {
        return false;
    }
    match previous {
        None => true,
        Some(prev) => !prev.starts_with('-') || prev.contains('='),
    }
}

/// Split clustered short flags into one flag per character.
///
/// `-abc` becomes `-a`, `-b`, `-c`. Long flags, single short flags and
/// anything else are returned unchanged.
pub fn split_short_flags(token: &str) -> Vec<String> {
    match token.strip_prefix('-') {
        Some(letters) if letters.chars().count() >= 2 && !letters.contains('-') => {
            letters.chars().map(|c| format!("-{}", c)).collect()
        }
        _ => vec![token.to_string()],
    }
}

/// Remove one leading and one trailing quote, each optionally escaped.
///
/// The two ends are handled independently, so `'x"` becomes `x`.
pub fn strip_enclosing_quotes(value: &str) -> &str {
    strip_trailing_quote(strip_leading_quote(value))
}

fn is_quote(c: char) -> bool {
    c == '\'' || c == '"'
}

fn strip_leading_quote(value: &str) -> &str {
    let unescaped = value.strip_prefix('\\').unwrap_or(value);
    match unescaped.strip_prefix(is_quote) {
        Some(rest) => rest,
        None => value,
    }
}

fn strip_trailing_quote(value: &str) -> &str {
    match value.strip_suffix(is_quote) {
        Some(rest) => rest.strip_suffix('\\').unwrap_or(rest),
        None => value,
    }
}

fn push_option_tokens(arg: &str, stream: &mut Vec<String>) {
    let (token, inline_value) = match arg.split_once('=') {
        Some((token, value)) => (token, Some(value)),
        None => (arg, None),
    };

    for flag in split_short_flags(token) {
        stream.push(strip_enclosing_quotes(&flag).to_string());
    }
    if let Some(value) = inline_value {
        stream.push(strip_enclosing_quotes(value).to_string());
    }
}

fn assign_options(stream: &[String]) -> Options {
    let mut values = BTreeMap::new();

    let mut index = 0;
    while index < stream.len() {
        let entry = &stream[index];
        if !entry.starts_with('-') {
            index += 1;
            continue;
        }

        let key = entry.trim_start_matches('-').to_string();
        match stream.get(index + 1) {
            Some(next) if !next.starts_with('-') => {
                values.insert(key, OptionValue::Str(next.clone()));
                index += 2;
            }
            _ => {
                values.insert(key, OptionValue::Bool(true));
                index += 1;
            }
        }
    }

    Options {
        values: values.into_iter().map(|(k, v)| (k, v.coerce())).collect(),
    }
}
