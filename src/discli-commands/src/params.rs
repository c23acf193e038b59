//! Parameter definitions and the per-command registries.
//!
//! A command declares positional [`Argument`]s, valued [`CommandOption`]s and
//! boolean [`Tag`]s. Names are unique across all three kinds; letters and
//! words are unique across options and tags, so `-x` and `--word` always
//! resolve to exactly one parameter.

use std::collections::HashMap;
use std::fmt;

use chrono::{NaiveDate, NaiveTime};

use crate::error::{ConfigError, ParseError};
use crate::parser::ValueParser;
use crate::validation::{self, Bounds};
use crate::value::{ParsedParams, Value};

macro_rules! typed_constructors {
    () => {
        pub fn integer(name: impl Into<String>, bounds: Bounds<i64>) -> Self {
            Self::new(name, ValueParser::Integer(bounds))
        }

        pub fn float(name: impl Into<String>, bounds: Bounds<f64>) -> Self {
            Self::new(name, ValueParser::Float(bounds))
        }

        /// Letters only; `length` bounds the character count.
        pub fn word(name: impl Into<String>, length: Bounds<usize>) -> Self {
            Self::new(name, ValueParser::Word(length))
        }

        /// Any non-empty text; `length` bounds the character count.
        pub fn string(name: impl Into<String>, length: Bounds<usize>) -> Self {
            Self::new(name, ValueParser::String(length))
        }

        pub fn enumeration<I, S>(name: impl Into<String>, values: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            Self::new(name, ValueParser::enumeration(values))
        }

        pub fn user(name: impl Into<String>) -> Self {
            Self::new(name, ValueParser::UserMention)
        }

        pub fn channel(name: impl Into<String>) -> Self {
            Self::new(name, ValueParser::ChannelMention)
        }

        pub fn role(name: impl Into<String>) -> Self {
            Self::new(name, ValueParser::RoleMention)
        }

        pub fn date(name: impl Into<String>, bounds: Bounds<NaiveDate>) -> Self {
            Self::new(name, ValueParser::Date(bounds))
        }

        pub fn time(name: impl Into<String>, bounds: Bounds<NaiveTime>) -> Self {
            Self::new(name, ValueParser::Time(bounds))
        }
    };
}

/// Positional parameter, matched by declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    name: String,
    description: Option<String>,
    parser: ValueParser,
}

impl Argument {
    pub fn new(name: impl Into<String>, parser: ValueParser) -> Self {
        Self {
            name: name.into(),
            description: None,
            parser,
        }
    }

    typed_constructors!();

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn parser(&self) -> &ValueParser {
        &self.parser
    }

    /// Parses one token, naming this argument in the error.
    pub fn parse(&self, input: &str) -> Result<Value, ParseError> {
        self.parser
            .parse(input)
            .map_err(|e| ParseError::invalid_value(&self.name, e))
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.parser)?;
        if let Some(desc) = &self.description {
            write!(f, " | {desc}")?;
        }
        Ok(())
    }
}

/// Named parameter taking one value token, as `-l value` or `--word value`.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandOption {
    name: String,
    description: Option<String>,
    letter: char,
    word: Option<String>,
    parser: ValueParser,
}

impl CommandOption {
    /// The letter defaults to the first character of the name.
    pub fn new(name: impl Into<String>, parser: ValueParser) -> Self {
        let name = name.into();
        Self {
            letter: default_letter(&name),
            name,
            description: None,
            word: None,
            parser,
        }
    }

    typed_constructors!();

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_letter(mut self, letter: char) -> Self {
        self.letter = letter;
        self
    }

    #[must_use]
    pub fn with_word(mut self, word: impl Into<String>) -> Self {
        self.word = Some(word.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn letter(&self) -> char {
        self.letter
    }

    /// The `--word` alias, if any.
    pub fn long_word(&self) -> Option<&str> {
        self.word.as_deref()
    }

    pub fn parser(&self) -> &ValueParser {
        &self.parser
    }

    pub fn parse(&self, input: &str) -> Result<Value, ParseError> {
        self.parser
            .parse(input)
            .map_err(|e| ParseError::invalid_value(&self.name, e))
    }
}

impl fmt::Display for CommandOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} | -{}", self.name, self.parser, self.letter)?;
        if let Some(word) = &self.word {
            write!(f, " | --{word}")?;
        }
        if let Some(desc) = &self.description {
            write!(f, " | {desc}")?;
        }
        Ok(())
    }
}

/// Boolean switch, `false` unless given. Tag letters can be bundled: `-sv`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    name: String,
    description: Option<String>,
    letter: char,
    word: Option<String>,
}

impl Tag {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            letter: default_letter(&name),
            name,
            description: None,
            word: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_letter(mut self, letter: char) -> Self {
        self.letter = letter;
        self
    }

    #[must_use]
    pub fn with_word(mut self, word: impl Into<String>) -> Self {
        self.word = Some(word.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn letter(&self) -> char {
        self.letter
    }

    /// The `--word` alias, if any.
    pub fn long_word(&self) -> Option<&str> {
        self.word.as_deref()
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} | -{}", self.name, self.letter)?;
        if let Some(word) = &self.word {
            write!(f, " | --{word}")?;
        }
        if let Some(desc) = &self.description {
            write!(f, " | {desc}")?;
        }
        Ok(())
    }
}

fn default_letter(name: &str) -> char {
    name.chars().next().unwrap_or('\0')
}

/// Arguments of one command in declaration order.
#[derive(Debug, Clone, Default)]
pub struct ArgumentRegistry {
    entries: Vec<Argument>,
}

impl ArgumentRegistry {
    pub fn get(&self, index: usize) -> Option<&Argument> {
        self.entries.get(index)
    }

    pub fn find(&self, name: &str) -> Option<&Argument> {
        self.entries.iter().find(|a| a.name == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Argument> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether the first argument accepts free-form text.
    pub fn first_is_text(&self) -> bool {
        self.entries
            .first()
            .is_some_and(|a| a.parser.is_free_text())
    }
}

/// Options of one command with letter and word lookup.
#[derive(Debug, Clone, Default)]
pub struct OptionRegistry {
    entries: Vec<CommandOption>,
    by_letter: HashMap<char, usize>,
    by_word: HashMap<String, usize>,
}

impl OptionRegistry {
    pub fn by_letter(&self, letter: char) -> Option<&CommandOption> {
        self.by_letter.get(&letter).map(|&i| &self.entries[i])
    }

    pub fn by_word(&self, word: &str) -> Option<&CommandOption> {
        self.by_word.get(word).map(|&i| &self.entries[i])
    }

    pub fn find(&self, name: &str) -> Option<&CommandOption> {
        self.entries.iter().find(|o| o.name == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CommandOption> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn index_of_letter(&self, letter: char) -> Option<usize> {
        self.by_letter.get(&letter).copied()
    }

    fn index_of_word(&self, word: &str) -> Option<usize> {
        self.by_word.get(word).copied()
    }
}

/// Tags of one command with letter and word lookup.
#[derive(Debug, Clone, Default)]
pub struct TagRegistry {
    entries: Vec<Tag>,
    by_letter: HashMap<char, usize>,
    by_word: HashMap<String, usize>,
}

impl TagRegistry {
    pub fn by_letter(&self, letter: char) -> Option<&Tag> {
        self.by_letter.get(&letter).map(|&i| &self.entries[i])
    }

    pub fn by_word(&self, word: &str) -> Option<&Tag> {
        self.by_word.get(word).map(|&i| &self.entries[i])
    }

    pub fn find(&self, name: &str) -> Option<&Tag> {
        self.entries.iter().find(|t| t.name == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Tag> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn index_of_letter(&self, letter: char) -> Option<usize> {
        self.by_letter.get(&letter).copied()
    }

    fn index_of_word(&self, word: &str) -> Option<usize> {
        self.by_word.get(word).copied()
    }
}

/// The three registries of one command and the checks spanning them.
#[derive(Debug, Clone, Default)]
pub struct Parameters {
    arguments: ArgumentRegistry,
    options: OptionRegistry,
    tags: TagRegistry,
}

impl Parameters {
    pub fn arguments(&self) -> &ArgumentRegistry {
        &self.arguments
    }

    pub fn options(&self) -> &OptionRegistry {
        &self.options
    }

    pub fn tags(&self) -> &TagRegistry {
        &self.tags
    }

    /// Number of entries in every parse result.
    pub fn len(&self) -> usize {
        self.arguments.len() + self.options.len() + self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn add_argument(&mut self, command: &str, argument: Argument) -> Result<(), ConfigError> {
        validation::validate_identifier("argument name", &argument.name)?;
        validation::validate_description("argument", argument.description.as_deref())?;
        argument.parser.validate()?;
        self.check_name(command, &argument.name)?;

        self.arguments.entries.push(argument);
        Ok(())
    }

    pub fn add_option(&mut self, command: &str, option: CommandOption) -> Result<(), ConfigError> {
        validation::validate_identifier("option name", &option.name)?;
        validation::validate_description("option", option.description.as_deref())?;
        validation::validate_letter("option letter", option.letter)?;
        if let Some(word) = &option.word {
            validate_word("option word", word)?;
        }
        option.parser.validate()?;
        self.check_name(command, &option.name)?;
        self.check_letter(command, option.letter)?;
        if let Some(word) = &option.word {
            self.check_word(command, word)?;
        }

        let index = self.options.entries.len();
        self.options.by_letter.insert(option.letter, index);
        if let Some(word) = &option.word {
            self.options.by_word.insert(word.clone(), index);
        }
        self.options.entries.push(option);
        Ok(())
    }

    pub fn add_tag(&mut self, command: &str, tag: Tag) -> Result<(), ConfigError> {
        validation::validate_identifier("tag name", &tag.name)?;
        validation::validate_description("tag", tag.description.as_deref())?;
        validation::validate_letter("tag letter", tag.letter)?;
        if let Some(word) = &tag.word {
            validate_word("tag word", word)?;
        }
        self.check_name(command, &tag.name)?;
        self.check_letter(command, tag.letter)?;
        if let Some(word) = &tag.word {
            self.check_word(command, word)?;
        }

        let index = self.tags.entries.len();
        self.tags.by_letter.insert(tag.letter, index);
        if let Some(word) = &tag.word {
            self.tags.by_word.insert(word.clone(), index);
        }
        self.tags.entries.push(tag);
        Ok(())
    }

    fn check_name(&self, command: &str, name: &str) -> Result<(), ConfigError> {
        let owner = if self.arguments.find(name).is_some() {
            "an argument"
        } else if self.options.find(name).is_some() {
            "an option"
        } else if self.tags.find(name).is_some() {
            "a tag"
        } else {
            return Ok(());
        };
        Err(ConfigError::NameInUse {
            command: command.to_string(),
            name: name.to_string(),
            owner,
        })
    }

    fn check_letter(&self, command: &str, letter: char) -> Result<(), ConfigError> {
        let owner = if self.options.index_of_letter(letter).is_some() {
            "an option"
        } else if self.tags.index_of_letter(letter).is_some() {
            "a tag"
        } else {
            return Ok(());
        };
        Err(ConfigError::LetterInUse {
            command: command.to_string(),
            letter,
            owner,
        })
    }

    fn check_word(&self, command: &str, word: &str) -> Result<(), ConfigError> {
        let owner = if self.options.index_of_word(word).is_some() {
            "an option"
        } else if self.tags.index_of_word(word).is_some() {
            "a tag"
        } else {
            return Ok(());
        };
        Err(ConfigError::WordInUse {
            command: command.to_string(),
            word: word.to_string(),
            owner,
        })
    }

    /// Turns the tokens left after resolution into a value per parameter.
    ///
    /// `--word` looks up option words, then tag words. `-x` is an option when
    /// `x` is exactly an option letter, otherwise every letter must name a
    /// tag. Tokens that read as numbers (`-5`, `-2.5`) are positional.
    pub fn parse(&self, command: &str, tokens: &[String]) -> Result<ParsedParams, ParseError> {
        let mut arguments: Vec<Value> = Vec::with_capacity(self.arguments.len());
        let mut options = vec![Value::None; self.options.len()];
        let mut tags = vec![false; self.tags.len()];

        let mut i = 0;
        while i < tokens.len() {
            let token = tokens[i].as_str();

            if let Some(word) = token.strip_prefix("--") {
                if let Some(index) = self.options.index_of_word(word) {
                    options[index] = self.option_value(command, index, tokens.get(i + 1))?;
                    i += 2;
                } else if let Some(index) = self.tags.index_of_word(word) {
                    tags[index] = true;
                    i += 1;
                } else {
                    return Err(ParseError::UnexpectedWord {
                        command: command.to_string(),
                        word: word.to_string(),
                    });
                }
                continue;
            }

            if let Some(letters) = flag_letters(token) {
                let mut chars = letters.chars();
                let single = match (chars.next(), chars.next()) {
                    (Some(c), None) => self.options.index_of_letter(c),
                    _ => None,
                };

                if let Some(index) = single {
                    options[index] = self.option_value(command, index, tokens.get(i + 1))?;
                    i += 2;
                    continue;
                }

                let indices = self.tag_bundle(command, letters)?;
                for index in indices {
                    tags[index] = true;
                }
                i += 1;
                continue;
            }

            let Some(argument) = self.arguments.get(arguments.len()) else {
                return Err(ParseError::UnexpectedArgument {
                    command: command.to_string(),
                    token: token.to_string(),
                });
            };
            arguments.push(argument.parse(token)?);
            i += 1;
        }

        if arguments.len() < self.arguments.len() {
            return Err(ParseError::ExpectedArguments {
                command: command.to_string(),
                expected: self.arguments.len(),
                actual: arguments.len(),
            });
        }

        let mut params = ParsedParams::new();
        for (argument, value) in self.arguments.iter().zip(arguments) {
            params.insert(argument.name.clone(), value);
        }
        for (option, value) in self.options.iter().zip(options) {
            params.insert(option.name.clone(), value);
        }
        for (tag, set) in self.tags.iter().zip(tags) {
            params.insert(tag.name.clone(), Value::Flag(set));
        }
        Ok(params)
    }

    fn option_value(
        &self,
        command: &str,
        index: usize,
        token: Option<&String>,
    ) -> Result<Value, ParseError> {
        let option = &self.options.entries[index];
        match token {
            Some(token) => option.parse(token),
            None => Err(ParseError::InvalidOption {
                command: command.to_string(),
                option: option.name.clone(),
            }),
        }
    }

    /// All or nothing: one unknown letter rejects the whole bundle.
    fn tag_bundle(&self, command: &str, letters: &str) -> Result<Vec<usize>, ParseError> {
        let unexpected = |letter: String| ParseError::UnexpectedLetter {
            command: command.to_string(),
            letter,
        };

        if letters.is_empty() {
            return Err(unexpected(String::new()));
        }
        letters
            .chars()
            .map(|c| {
                self.tags
                    .index_of_letter(c)
                    .ok_or_else(|| unexpected(c.to_string()))
            })
            .collect()
    }
}

/// Letters after a single dash, or `None` for positional tokens.
fn flag_letters(token: &str) -> Option<&str> {
    if validation::is_float(token) {
        return None;
    }
    token.strip_prefix('-')
}

fn validate_word(what: &'static str, word: &str) -> Result<(), ConfigError> {
    if validation::is_word(word) {
        Ok(())
    } else {
        Err(ConfigError::InvalidIdentifier {
            what,
            value: word.to_string(),
            reason: "only letters are allowed",
        })
    }
}
