//! Parsed parameter values.

use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use indexmap::IndexMap;
use serde::Serialize;

/// Canonical date format, `dd/mm/yyyy`.
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// Canonical time format, `hh:mm:ss`.
pub const TIME_FORMAT: &str = "%H:%M:%S";

/// A typed parameter value.
///
/// `Display` renders the canonical token form, which the producing parser
/// accepts again.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Integer(i64),
    Float(f64),
    /// Letters-only token.
    Word(String),
    /// Free-form text, possibly containing escaped spaces.
    Text(String),
    /// Member of an enum parser's value set.
    Enum(String),
    /// Id from `<@id>` or `<@!id>`.
    User(u64),
    /// Id from `<#id>`.
    Channel(u64),
    /// Id from `<@&id>`.
    Role(u64),
    Date(NaiveDate),
    Time(NaiveTime),
    /// Tag state.
    Flag(bool),
    /// Option that was not given.
    None,
}

impl Default for Value {
    fn default() -> Self {
        Value::None
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(n) => write!(f, "{n}"),
            Value::Word(s) | Value::Text(s) | Value::Enum(s) => write!(f, "{s}"),
            Value::User(id) => write!(f, "<@{id}>"),
            Value::Channel(id) => write!(f, "<#{id}>"),
            Value::Role(id) => write!(f, "<@&{id}>"),
            Value::Date(date) => write!(f, "{}", date.format(DATE_FORMAT)),
            Value::Time(time) => write!(f, "{}", time.format(TIME_FORMAT)),
            Value::Flag(b) => write!(f, "{b}"),
            Value::None => Ok(()),
        }
    }
}

impl Value {
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    pub fn is_some(&self) -> bool {
        !self.is_none()
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Integers widen to floats.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Text of word, string and enum values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Word(s) | Value::Text(s) | Value::Enum(s) => Some(s),
            _ => None,
        }
    }

    /// Id of any mention value.
    pub fn as_id(&self) -> Option<u64> {
        match self {
            Value::User(id) | Value::Channel(id) | Value::Role(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_time(&self) -> Option<NaiveTime> {
        match self {
            Value::Time(t) => Some(*t),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Flag(b) => Some(*b),
            _ => None,
        }
    }
}

/// Parameters of one invocation keyed by name.
///
/// Holds every argument, every option (`Value::None` when not given) and every
/// tag (`Value::Flag(false)` when not given), in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ParsedParams {
    values: IndexMap<String, Value>,
}

impl ParsedParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Whether the parameter exists and carries a value.
    pub fn is_set(&self, name: &str) -> bool {
        self.get(name).is_some_and(Value::is_some)
    }

    pub fn get_int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_int)
    }

    pub fn get_int_or(&self, name: &str, default: i64) -> i64 {
        self.get_int(name).unwrap_or(default)
    }

    pub fn get_float(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_float)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn get_str_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.get_str(name).unwrap_or(default)
    }

    pub fn get_id(&self, name: &str) -> Option<u64> {
        self.get(name).and_then(Value::as_id)
    }

    pub fn get_date(&self, name: &str) -> Option<NaiveDate> {
        self.get(name).and_then(Value::as_date)
    }

    pub fn get_time(&self, name: &str) -> Option<NaiveTime> {
        self.get(name).and_then(Value::as_time)
    }

    /// Tag state; unknown names read as `false`.
    pub fn flag(&self, name: &str) -> bool {
        self.get(name).and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<'a> IntoIterator for &'a ParsedParams {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

impl FromIterator<(String, Value)> for ParsedParams {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
