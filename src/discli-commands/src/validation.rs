//! Lexical validators and the bounds helper shared by value parsers.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{ConfigError, ValueError};

static WORD_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z]+$").expect("word regex pattern is valid"));

static IDENTIFIER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_]+$").expect("identifier regex pattern is valid"));

static INTEGER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?[0-9]+$").expect("integer regex pattern is valid"));

static FLOAT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^-?([0-9]+\.?[0-9]*|\.[0-9]+)$").expect("float regex pattern is valid")
});

static DATE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{2}/[0-9]{2}/[0-9]{4}$").expect("date regex pattern is valid"));

static TIME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{2}:[0-9]{2}:[0-9]{2}$").expect("time regex pattern is valid"));

/// Group 1: the numeric id.
static USER_MENTION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^<@!?([0-9]+)>$").expect("user mention regex pattern is valid"));

static CHANNEL_MENTION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^<#([0-9]+)>$").expect("channel mention regex pattern is valid"));

static ROLE_MENTION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^<@&([0-9]+)>$").expect("role mention regex pattern is valid"));

/// Letters only, at least one.
pub fn is_word(input: &str) -> bool {
    WORD_REGEX.is_match(input)
}

/// Letters and underscores, at least one. Used for command and parameter names.
pub fn is_identifier(input: &str) -> bool {
    IDENTIFIER_REGEX.is_match(input)
}

/// A single ASCII letter.
pub fn is_letter(letter: char) -> bool {
    letter.is_ascii_alphabetic()
}

pub fn is_integer(input: &str) -> bool {
    INTEGER_REGEX.is_match(input)
}

pub fn is_float(input: &str) -> bool {
    FLOAT_REGEX.is_match(input)
}

/// `dd/mm/yyyy`; calendar validity is checked by the date parser.
pub fn is_date(input: &str) -> bool {
    DATE_REGEX.is_match(input)
}

/// `hh:mm:ss`; range validity is checked by the time parser.
pub fn is_time(input: &str) -> bool {
    TIME_REGEX.is_match(input)
}

pub fn is_user_mention(input: &str) -> bool {
    USER_MENTION_REGEX.is_match(input)
}

pub fn is_channel_mention(input: &str) -> bool {
    CHANNEL_MENTION_REGEX.is_match(input)
}

pub fn is_role_mention(input: &str) -> bool {
    ROLE_MENTION_REGEX.is_match(input)
}

/// Mention shapes understood by [`mention_id`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MentionKind {
    User,
    Channel,
    Role,
}

impl MentionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MentionKind::User => "user mention",
            MentionKind::Channel => "channel mention",
            MentionKind::Role => "role mention",
        }
    }

    fn regex(self) -> &'static Regex {
        match self {
            MentionKind::User => &USER_MENTION_REGEX,
            MentionKind::Channel => &CHANNEL_MENTION_REGEX,
            MentionKind::Role => &ROLE_MENTION_REGEX,
        }
    }
}

/// Strips the mention decorators and returns the id.
///
/// The bracket shape is checked before the digits are parsed, so `<@12` and
/// `<#12>` (for a user mention) fail as malformed rather than as overflow.
pub fn mention_id(kind: MentionKind, input: &str) -> Result<u64, ValueError> {
    let malformed = || ValueError::Malformed {
        expected: kind.as_str(),
        input: input.to_string(),
    };

    let digits = kind
        .regex()
        .captures(input)
        .and_then(|cap| cap.get(1))
        .ok_or_else(malformed)?;

    digits.as_str().parse::<u64>().map_err(|_| malformed())
}

/// Validates an identifier, naming what it identifies in the error.
pub fn validate_identifier(what: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::InvalidIdentifier {
            what,
            value: value.to_string(),
            reason: "must not be empty",
        });
    }
    if !is_identifier(value) {
        return Err(ConfigError::InvalidIdentifier {
            what,
            value: value.to_string(),
            reason: "only letters and underscores are allowed",
        });
    }
    Ok(())
}

pub fn validate_letter(what: &'static str, letter: char) -> Result<(), ConfigError> {
    if !is_letter(letter) {
        return Err(ConfigError::InvalidIdentifier {
            what,
            value: letter.to_string(),
            reason: "must be a single letter",
        });
    }
    Ok(())
}

pub fn validate_description(
    what: &'static str,
    description: Option<&str>,
) -> Result<(), ConfigError> {
    match description {
        Some(text) if text.trim().is_empty() => Err(ConfigError::EmptyDescription { what }),
        _ => Ok(()),
    }
}

/// Optional lower and upper limits with independent inclusive/exclusive edges.
///
/// New bounds include the minimum and exclude the maximum.
#[derive(Debug, Clone, PartialEq)]
pub struct Bounds<T> {
    pub min: Option<T>,
    pub max: Option<T>,
    pub include_min: bool,
    pub include_max: bool,
}

impl<T> Default for Bounds<T> {
    fn default() -> Self {
        Self::any()
    }
}

impl<T> Bounds<T> {
    /// No limits.
    pub fn any() -> Self {
        Self {
            min: None,
            max: None,
            include_min: true,
            include_max: false,
        }
    }

    pub fn new(min: Option<T>, max: Option<T>) -> Self {
        Self {
            min,
            max,
            ..Self::any()
        }
    }

    /// `[min, max)`.
    pub fn between(min: T, max: T) -> Self {
        Self::new(Some(min), Some(max))
    }

    pub fn at_least(min: T) -> Self {
        Self::new(Some(min), None)
    }

    /// `..max]`: an upper limit alone is inclusive.
    pub fn at_most(max: T) -> Self {
        Self::new(None, Some(max)).include_max(true)
    }

    #[must_use]
    pub fn include_min(mut self, include: bool) -> Self {
        self.include_min = include;
        self
    }

    #[must_use]
    pub fn include_max(mut self, include: bool) -> Self {
        self.include_max = include;
        self
    }

    pub fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    /// Maps the limits to another type, keeping the edges.
    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> Bounds<U> {
        Bounds {
            min: self.min.map(&mut f),
            max: self.max.map(&mut f),
            include_min: self.include_min,
            include_max: self.include_max,
        }
    }
}

impl<T: PartialOrd + fmt::Display> Bounds<T> {
    /// Rejects `min > max`. Raised at registration time.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let (Some(min), Some(max)) = (&self.min, &self.max) {
            if min > max {
                return Err(ConfigError::InvalidBounds(format!(
                    "minimum {min} is greater than maximum {max}"
                )));
            }
        }
        Ok(())
    }

    /// Checks `value` against both edges. `what` names the measured quantity
    /// in the error ("value", "length", ...).
    pub fn check(&self, what: &'static str, value: &T) -> Result<(), ValueError> {
        if let Some(min) = &self.min {
            if value < min || (!self.include_min && value == min) {
                return Err(ValueError::BelowMinimum {
                    what,
                    value: value.to_string(),
                    bound: min.to_string(),
                    inclusive: self.include_min,
                });
            }
        }
        if let Some(max) = &self.max {
            if value > max || (!self.include_max && value == max) {
                return Err(ValueError::AboveMaximum {
                    what,
                    value: value.to_string(),
                    bound: max.to_string(),
                    inclusive: self.include_max,
                });
            }
        }
        Ok(())
    }
}

impl<T: fmt::Display> fmt::Display for Bounds<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unbounded() {
            return Ok(());
        }
        write!(f, "{}", if self.include_min { '[' } else { '(' })?;
        match &self.min {
            Some(min) => write!(f, "{min}")?,
            None => write!(f, "..")?,
        }
        write!(f, ", ")?;
        match &self.max {
            Some(max) => write!(f, "{max}")?,
            None => write!(f, "..")?,
        }
        write!(f, "{}", if self.include_max { ']' } else { ')' })
    }
}
