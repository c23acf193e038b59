//! Declarative command trees in TOML.
//!
//! ```toml
//! name = "bot"
//!
//! [[command]]
//! name = "user"
//! executable = false
//!
//! [[command.command]]
//! name = "ban"
//! argument = [{ name = "target_id", kind = "integer", min = 0 }]
//! option = [{ name = "reason", kind = "string", word = "reason" }]
//! tag = [{ name = "silent" }]
//! permissions = { users = [1234] }
//! ```
//!
//! Every executable command in the file is bound to the same handler, which
//! can tell commands apart through the parsed parameters or its own state.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::handler::SharedHandler;
use crate::node::CommandNode;
use crate::params::{Argument, CommandOption, Tag};
use crate::parser::{self, ValueParser};
use crate::permission::{InvocationContext, Permission};
use crate::system::CommandSystem;
use crate::validation::Bounds;

fn default_name() -> String {
    "commands".to_string()
}

fn default_true() -> bool {
    true
}

/// Root of a command tree file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeConfig {
    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default, rename = "command")]
    pub commands: Vec<CommandConfig>,
}

/// One command and its sub-commands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandConfig {
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    /// `false` makes the command a namespace without a handler.
    #[serde(default = "default_true")]
    pub executable: bool,

    #[serde(default, rename = "argument")]
    pub arguments: Vec<ArgumentConfig>,

    #[serde(default, rename = "option")]
    pub options: Vec<OptionConfig>,

    #[serde(default, rename = "tag")]
    pub tags: Vec<TagConfig>,

    #[serde(default)]
    pub permissions: Option<PermissionConfig>,

    #[serde(default, rename = "command")]
    pub commands: Vec<CommandConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArgumentConfig {
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(flatten)]
    pub kind: KindConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionConfig {
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Defaults to the first character of the name.
    #[serde(default)]
    pub letter: Option<char>,

    #[serde(default)]
    pub word: Option<String>,

    #[serde(flatten)]
    pub kind: KindConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagConfig {
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub letter: Option<char>,

    #[serde(default)]
    pub word: Option<String>,
}

/// Value type of an argument or option, selected by `kind`.
///
/// Unset edges follow [`Bounds`]: the minimum is inclusive, the maximum
/// exclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum KindConfig {
    Integer {
        min: Option<i64>,
        max: Option<i64>,
        include_min: Option<bool>,
        include_max: Option<bool>,
    },
    Float {
        min: Option<f64>,
        max: Option<f64>,
        include_min: Option<bool>,
        include_max: Option<bool>,
    },
    Word {
        min_length: Option<usize>,
        max_length: Option<usize>,
        include_min: Option<bool>,
        include_max: Option<bool>,
    },
    String {
        min_length: Option<usize>,
        max_length: Option<usize>,
        include_min: Option<bool>,
        include_max: Option<bool>,
    },
    Enum {
        values: Vec<String>,
    },
    User,
    Channel,
    Role,
    /// Bounds in `dd/mm/yyyy`.
    Date {
        min: Option<String>,
        max: Option<String>,
        include_min: Option<bool>,
        include_max: Option<bool>,
    },
    /// Bounds in `hh:mm:ss`.
    Time {
        min: Option<String>,
        max: Option<String>,
        include_min: Option<bool>,
        include_max: Option<bool>,
    },
}

/// Any listed id grants access.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionConfig {
    #[serde(default)]
    pub users: Vec<u64>,

    #[serde(default)]
    pub guilds: Vec<u64>,

    #[serde(default)]
    pub channels: Vec<u64>,
}

fn bounds<T>(
    min: Option<T>,
    max: Option<T>,
    include_min: Option<bool>,
    include_max: Option<bool>,
) -> Bounds<T> {
    let defaults = Bounds::<T>::any();
    Bounds::new(min, max)
        .include_min(include_min.unwrap_or(defaults.include_min))
        .include_max(include_max.unwrap_or(defaults.include_max))
}

fn parse_bound<T>(
    value: Option<&String>,
    parse: impl Fn(&str) -> Option<T>,
    expected: &str,
) -> Result<Option<T>, ConfigError> {
    value
        .map(|raw| {
            parse(raw.as_str()).ok_or_else(|| {
                ConfigError::InvalidBounds(format!("'{raw}' is not a valid {expected}"))
            })
        })
        .transpose()
}

impl KindConfig {
    /// Builds the value parser. Date and time bounds are parsed here.
    pub fn parser(&self) -> Result<ValueParser, ConfigError> {
        let value_parser = match self {
            KindConfig::Integer {
                min,
                max,
                include_min,
                include_max,
            } => ValueParser::Integer(bounds(*min, *max, *include_min, *include_max)),
            KindConfig::Float {
                min,
                max,
                include_min,
                include_max,
            } => ValueParser::Float(bounds(*min, *max, *include_min, *include_max)),
            KindConfig::Word {
                min_length,
                max_length,
                include_min,
                include_max,
            } => ValueParser::Word(bounds(*min_length, *max_length, *include_min, *include_max)),
            KindConfig::String {
                min_length,
                max_length,
                include_min,
                include_max,
            } => ValueParser::String(bounds(*min_length, *max_length, *include_min, *include_max)),
            KindConfig::Enum { values } => ValueParser::Enum(values.clone()),
            KindConfig::User => ValueParser::UserMention,
            KindConfig::Channel => ValueParser::ChannelMention,
            KindConfig::Role => ValueParser::RoleMention,
            KindConfig::Date {
                min,
                max,
                include_min,
                include_max,
            } => {
                let min = parse_bound(min.as_ref(), parser::parse_date, "date")?;
                let max = parse_bound(max.as_ref(), parser::parse_date, "date")?;
                ValueParser::Date(bounds(min, max, *include_min, *include_max))
            }
            KindConfig::Time {
                min,
                max,
                include_min,
                include_max,
            } => {
                let min = parse_bound(min.as_ref(), parser::parse_time, "time")?;
                let max = parse_bound(max.as_ref(), parser::parse_time, "time")?;
                ValueParser::Time(bounds(min, max, *include_min, *include_max))
            }
        };
        Ok(value_parser)
    }
}

impl ArgumentConfig {
    pub fn to_argument(&self) -> Result<Argument, ConfigError> {
        let mut argument = Argument::new(&self.name, self.kind.parser()?);
        if let Some(description) = &self.description {
            argument = argument.with_description(description);
        }
        Ok(argument)
    }
}

impl OptionConfig {
    pub fn to_option(&self) -> Result<CommandOption, ConfigError> {
        let mut option = CommandOption::new(&self.name, self.kind.parser()?);
        if let Some(description) = &self.description {
            option = option.with_description(description);
        }
        if let Some(letter) = self.letter {
            option = option.with_letter(letter);
        }
        if let Some(word) = &self.word {
            option = option.with_word(word);
        }
        Ok(option)
    }
}

impl TagConfig {
    pub fn to_tag(&self) -> Tag {
        let mut tag = Tag::new(&self.name);
        if let Some(description) = &self.description {
            tag = tag.with_description(description);
        }
        if let Some(letter) = self.letter {
            tag = tag.with_letter(letter);
        }
        if let Some(word) = &self.word {
            tag = tag.with_word(word);
        }
        tag
    }
}

impl PermissionConfig {
    pub fn is_empty(&self) -> bool {
        self.users.is_empty() && self.guilds.is_empty() && self.channels.is_empty()
    }

    pub fn to_permissions<C: InvocationContext>(&self) -> Vec<Permission<C>> {
        let users = self.users.iter().map(|&id| Permission::user(id));
        let guilds = self.guilds.iter().map(|&id| Permission::guild(id));
        let channels = self.channels.iter().map(|&id| Permission::channel(id));
        users.chain(guilds).chain(channels).collect()
    }
}

impl TreeConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Builds the command system, binding `handler` to every executable
    /// command.
    pub fn build<C, R>(&self, handler: SharedHandler<C, R>) -> Result<CommandSystem<C, R>, ConfigError>
    where
        C: InvocationContext,
    {
        let mut system = CommandSystem::try_new(self.name.clone(), self.description.as_deref())?;
        for command in &self.commands {
            let node = if command.executable {
                system.executable_with(&command.name, command.description.as_deref(), Arc::clone(&handler))?
            } else {
                system.command(&command.name, command.description.as_deref())?
            };
            command.apply(node, &handler)?;
        }
        Ok(system)
    }
}

impl CommandConfig {
    /// Adds parameters, permissions and sub-commands to an already
    /// registered `node`.
    fn apply<C, R>(&self, node: &mut CommandNode<C, R>, handler: &SharedHandler<C, R>) -> Result<(), ConfigError>
    where
        C: InvocationContext,
    {
        for argument in &self.arguments {
            node.add_argument(argument.to_argument()?)?;
        }
        for option in &self.options {
            node.add_option(option.to_option()?)?;
        }
        for tag in &self.tags {
            node.add_tag(tag.to_tag())?;
        }
        if let Some(permissions) = &self.permissions {
            for permission in permissions.to_permissions() {
                node.add_permission(permission);
            }
        }

        for command in &self.commands {
            let child = if command.executable {
                node.executable_with(&command.name, command.description.as_deref(), Arc::clone(handler))?
            } else {
                node.command(&command.name, command.description.as_deref())?
            };
            command.apply(child, handler)?;
        }
        Ok(())
    }
}
