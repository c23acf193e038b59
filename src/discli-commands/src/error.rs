//! Error types for the command engine.
//!
//! Errors fall into two groups: [`ConfigError`] is raised while the command
//! tree is being built, everything else is raised per dispatch and never
//! touches the tree.

use thiserror::Error;

/// Result type for dispatch operations.
pub type Result<T, E = CommandError> = std::result::Result<T, E>;

/// Errors raised while registering commands and parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A name, letter or word does not follow the identifier rules.
    #[error("invalid {what} '{value}': {reason}")]
    InvalidIdentifier {
        what: &'static str,
        value: String,
        reason: &'static str,
    },

    /// A description was given but is empty.
    #[error("{what} description must not be empty")]
    EmptyDescription { what: &'static str },

    /// Parameter name already taken on the same command.
    #[error("name '{name}' is already used by {owner} on '{command}'")]
    NameInUse {
        command: String,
        name: String,
        owner: &'static str,
    },

    /// Short flag letter already taken on the same command.
    #[error("letter '-{letter}' is already used by {owner} on '{command}'")]
    LetterInUse {
        command: String,
        letter: char,
        owner: &'static str,
    },

    /// Long flag word already taken on the same command.
    #[error("word '--{word}' is already used by {owner} on '{command}'")]
    WordInUse {
        command: String,
        word: String,
        owner: &'static str,
    },

    /// Minimum greater than maximum, or an unparseable bound.
    #[error("invalid bounds: {0}")]
    InvalidBounds(String),

    /// Enum parser without values, with duplicates, or with non-word values.
    #[error("invalid enum values: {0}")]
    InvalidEnum(String),

    /// A sibling command with the same name exists.
    #[error("command '{0}' already exists")]
    CommandExists(String),

    /// Free-text first argument and sub-commands cannot coexist.
    #[error("ambiguous parameters on '{command}': {reason}")]
    Ambiguous {
        command: String,
        reason: &'static str,
    },
}

/// Validation failures of a single raw value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValueError {
    /// The token does not have the lexical shape of the expected type.
    #[error("'{input}' is not a valid {expected}")]
    Malformed {
        expected: &'static str,
        input: String,
    },

    #[error("{what} {value} must be {} {bound}", lower_op(.inclusive))]
    BelowMinimum {
        what: &'static str,
        value: String,
        bound: String,
        inclusive: bool,
    },

    #[error("{what} {value} must be {} {bound}", upper_op(.inclusive))]
    AboveMaximum {
        what: &'static str,
        value: String,
        bound: String,
        inclusive: bool,
    },

    /// The token is a word but not one of the allowed values.
    #[error("'{input}' is not one of: {allowed}")]
    NotInEnum { input: String, allowed: String },
}

fn lower_op(inclusive: &bool) -> &'static str {
    if *inclusive { ">=" } else { ">" }
}

fn upper_op(inclusive: &bool) -> &'static str {
    if *inclusive { "<=" } else { "<" }
}

/// Errors raised while turning the remaining tokens into parameters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("unexpected word '--{word}' for command '{command}'")]
    UnexpectedWord { command: String, word: String },

    #[error("unexpected letter '-{letter}' for command '{command}'")]
    UnexpectedLetter { command: String, letter: String },

    #[error("unexpected argument '{token}' for command '{command}'")]
    UnexpectedArgument { command: String, token: String },

    /// An option was given without its value token.
    #[error("option '{option}' of command '{command}' expects a value")]
    InvalidOption { command: String, option: String },

    #[error("command '{command}' expects {expected} argument(s), got {actual}")]
    ExpectedArguments {
        command: String,
        expected: usize,
        actual: usize,
    },

    /// A value parser rejected the token of an argument or option.
    #[error("invalid value for '{param}': {source}")]
    InvalidValue {
        param: String,
        #[source]
        source: ValueError,
    },
}

/// Errors surfaced to the caller of a dispatch.
#[derive(Debug, Error)]
pub enum CommandError {
    /// No top-level command matched the first token.
    #[error("command not found: '{0}'")]
    NotFound(String),

    /// A permission set denied descent into a matched command.
    #[error("insufficient permissions for '{0}'")]
    InsufficientPermissions(String),

    /// The resolved command is a namespace without a handler.
    #[error("command '{0}' is not executable")]
    NotExecutable(String),

    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The handler itself failed.
    #[error("command '{command}' failed: {source}")]
    Handler {
        command: String,
        source: anyhow::Error,
    },
}

impl ParseError {
    /// Wrap a value failure with the owning parameter's name.
    pub fn invalid_value(param: impl Into<String>, source: ValueError) -> Self {
        ParseError::InvalidValue {
            param: param.into(),
            source,
        }
    }
}

impl CommandError {
    /// Returns the parse error if this is one.
    pub fn as_parse(&self) -> Option<&ParseError> {
        match self {
            CommandError::Parse(e) => Some(e),
            _ => None,
        }
    }
}
