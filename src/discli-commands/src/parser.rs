//! Typed value parsers.
//!
//! Each variant validates the lexical shape of a raw token, converts it and
//! applies its constraints. Parsers are built once at registration time and
//! never change afterwards.

use std::collections::HashSet;
use std::fmt;

use chrono::{NaiveDate, NaiveTime};

use crate::error::{ConfigError, ValueError};
use crate::validation::{self, Bounds, MentionKind};
use crate::value::{DATE_FORMAT, TIME_FORMAT, Value};

/// Converter from one raw token to one [`Value`].
#[derive(Debug, Clone, PartialEq)]
pub enum ValueParser {
    Integer(Bounds<i64>),
    Float(Bounds<f64>),
    /// Letters only; bounds apply to the length in characters.
    Word(Bounds<usize>),
    /// Any non-empty token; bounds apply to the length in characters.
    String(Bounds<usize>),
    /// One of a fixed set of words, compared case-sensitively.
    Enum(Vec<String>),
    UserMention,
    ChannelMention,
    RoleMention,
    Date(Bounds<NaiveDate>),
    Time(Bounds<NaiveTime>),
}

impl ValueParser {
    pub fn integer(bounds: Bounds<i64>) -> Self {
        ValueParser::Integer(bounds)
    }

    pub fn float(bounds: Bounds<f64>) -> Self {
        ValueParser::Float(bounds)
    }

    pub fn word(length: Bounds<usize>) -> Self {
        ValueParser::Word(length)
    }

    pub fn string(length: Bounds<usize>) -> Self {
        ValueParser::String(length)
    }

    pub fn enumeration<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ValueParser::Enum(values.into_iter().map(Into::into).collect())
    }

    pub fn date(bounds: Bounds<NaiveDate>) -> Self {
        ValueParser::Date(bounds)
    }

    pub fn time(bounds: Bounds<NaiveTime>) -> Self {
        ValueParser::Time(bounds)
    }

    /// Short type name used in usage and tree output.
    pub fn kind(&self) -> &'static str {
        match self {
            ValueParser::Integer(_) => "integer",
            ValueParser::Float(_) => "float",
            ValueParser::Word(_) => "word",
            ValueParser::String(_) => "string",
            ValueParser::Enum(_) => "enum",
            ValueParser::UserMention => "user",
            ValueParser::ChannelMention => "channel",
            ValueParser::RoleMention => "role",
            ValueParser::Date(_) => "date",
            ValueParser::Time(_) => "time",
        }
    }

    /// Free-form text parsers, whose tokens could be mistaken for
    /// sub-command names.
    pub fn is_free_text(&self) -> bool {
        matches!(self, ValueParser::Word(_) | ValueParser::String(_))
    }

    /// Checks the constraints themselves. Called when the owning parameter
    /// is registered.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            ValueParser::Integer(bounds) => bounds.validate(),
            ValueParser::Float(bounds) => {
                if bounds.min.is_some_and(f64::is_nan) || bounds.max.is_some_and(f64::is_nan) {
                    return Err(ConfigError::InvalidBounds("bound is NaN".to_string()));
                }
                bounds.validate()
            }
            ValueParser::Word(bounds) | ValueParser::String(bounds) => bounds.validate(),
            ValueParser::Date(bounds) => bounds.validate(),
            ValueParser::Time(bounds) => bounds.validate(),
            ValueParser::Enum(values) => validate_enum(values),
            ValueParser::UserMention | ValueParser::ChannelMention | ValueParser::RoleMention => {
                Ok(())
            }
        }
    }

    /// Validates and converts `input`.
    pub fn parse(&self, input: &str) -> Result<Value, ValueError> {
        match self {
            ValueParser::Integer(bounds) => {
                if !validation::is_integer(input) {
                    return Err(malformed("integer", input));
                }
                let value: i64 = input.parse().map_err(|_| malformed("integer", input))?;
                bounds.check("value", &value)?;
                Ok(Value::Integer(value))
            }
            ValueParser::Float(bounds) => {
                if !validation::is_float(input) {
                    return Err(malformed("float", input));
                }
                let value: f64 = input
                    .parse()
                    .ok()
                    .filter(|v: &f64| v.is_finite())
                    .ok_or_else(|| malformed("float", input))?;
                bounds.check("value", &value)?;
                Ok(Value::Float(value))
            }
            ValueParser::Word(bounds) => {
                if !validation::is_word(input) {
                    return Err(malformed("word", input));
                }
                bounds.check("length", &input.chars().count())?;
                Ok(Value::Word(input.to_string()))
            }
            ValueParser::String(bounds) => {
                if input.is_empty() {
                    return Err(malformed("string", input));
                }
                bounds.check("length", &input.chars().count())?;
                Ok(Value::Text(input.to_string()))
            }
            ValueParser::Enum(values) => {
                if !validation::is_word(input) {
                    return Err(malformed("word", input));
                }
                if values.iter().any(|v| v == input) {
                    Ok(Value::Enum(input.to_string()))
                } else {
                    Err(ValueError::NotInEnum {
                        input: input.to_string(),
                        allowed: values.join(", "),
                    })
                }
            }
            ValueParser::UserMention => {
                validation::mention_id(MentionKind::User, input).map(Value::User)
            }
            ValueParser::ChannelMention => {
                validation::mention_id(MentionKind::Channel, input).map(Value::Channel)
            }
            ValueParser::RoleMention => {
                validation::mention_id(MentionKind::Role, input).map(Value::Role)
            }
            ValueParser::Date(bounds) => {
                let date = parse_date(input).ok_or_else(|| malformed("date (dd/mm/yyyy)", input))?;
                bounds.check("date", &date)?;
                Ok(Value::Date(date))
            }
            ValueParser::Time(bounds) => {
                let time = parse_time(input).ok_or_else(|| malformed("time (hh:mm:ss)", input))?;
                bounds.check("time", &time)?;
                Ok(Value::Time(time))
            }
        }
    }
}

impl fmt::Display for ValueParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind())?;
        match self {
            ValueParser::Integer(b) => write!(f, "{b}"),
            ValueParser::Float(b) => write!(f, "{b}"),
            ValueParser::Word(b) | ValueParser::String(b) => write!(f, "{b}"),
            ValueParser::Enum(values) => write!(f, "({})", values.join("|")),
            ValueParser::Date(b) => write!(f, "{}", b.clone().map(|d| d.format(DATE_FORMAT))),
            ValueParser::Time(b) => write!(f, "{}", b.clone().map(|t| t.format(TIME_FORMAT))),
            ValueParser::UserMention | ValueParser::ChannelMention | ValueParser::RoleMention => {
                Ok(())
            }
        }
    }
}

/// Parses a `dd/mm/yyyy` date, rejecting impossible calendar dates.
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    if !validation::is_date(input) {
        return None;
    }
    NaiveDate::parse_from_str(input, DATE_FORMAT).ok()
}

/// Parses a `hh:mm:ss` time.
pub fn parse_time(input: &str) -> Option<NaiveTime> {
    if !validation::is_time(input) {
        return None;
    }
    NaiveTime::parse_from_str(input, TIME_FORMAT).ok()
}

fn malformed(expected: &'static str, input: &str) -> ValueError {
    ValueError::Malformed {
        expected,
        input: input.to_string(),
    }
}

fn validate_enum(values: &[String]) -> Result<(), ConfigError> {
    if values.is_empty() {
        return Err(ConfigError::InvalidEnum("no values given".to_string()));
    }
    let mut seen = HashSet::new();
    for value in values {
        if !validation::is_word(value) {
            return Err(ConfigError::InvalidEnum(format!(
                "'{value}' is not a word"
            )));
        }
        if !seen.insert(value.as_str()) {
            return Err(ConfigError::InvalidEnum(format!("'{value}' is repeated")));
        }
    }
    Ok(())
}
