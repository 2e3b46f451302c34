//! Trail command specification tables.
//!
//! Defines the declarative contract of every command a trail script may
//! invoke: its parameters, the execution context it requires, the value
//! types and ranges of its parameters, and how it changes the context stack.
//! A [`SpecRegistry`] is built once from such a table (either the built-in
//! CAD table or a JSON file) and is read-only afterwards.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

mod builtin;

pub use builtin::builtin_commands;

/// Current format version for the registry table JSON schema.
pub const TABLE_FORMAT_VERSION: &str = "1.0.0";

/// Context tag every validation pass starts from.
pub const BASE_CONTEXT: &str = "startup";

/// Semantic type of a command parameter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    /// Value must parse as a floating-point literal other than infinity or NaN.
    Numeric,
    /// Free text; never checked.
    Text,
    /// Any type not understood by this toolchain version; never checked.
    #[serde(other)]
    Other,
}

impl std::fmt::Display for ParamType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParamType::Numeric => write!(f, "numeric"),
            ParamType::Text => write!(f, "text"),
            ParamType::Other => write!(f, "other"),
        }
    }
}

/// Inclusive numeric bounds for a parameter. Either side may be open.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct ParamRange {
    /// Smallest accepted value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Largest accepted value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl ParamRange {
    /// Range with both bounds set.
    pub fn between(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    /// Whether `value` lies within the declared bounds.
    pub fn contains(&self, value: f64) -> bool {
        self.min.is_none_or(|min| value >= min) && self.max.is_none_or(|max| value <= max)
    }
}

/// Declarative effect of a command on the execution context stack.
///
/// `pop` is applied before `push`. Popping removes the most recently pushed
/// occurrence of the tag; it is a no-op when the tag is absent and never
/// removes the base context.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContextTransition {
    /// Tag to pop before pushing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pop: Option<String>,
    /// Tag to push.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push: Option<String>,
}

impl ContextTransition {
    /// Transition that only pushes `tag`.
    pub fn push(tag: impl Into<String>) -> Self {
        Self {
            pop: None,
            push: Some(tag.into()),
        }
    }

    /// Transition that only pops `tag`.
    pub fn pop(tag: impl Into<String>) -> Self {
        Self {
            pop: Some(tag.into()),
            push: None,
        }
    }
}

/// Declared contract of a single trail command.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CommandSpec {
    /// Command name as written inside `~ Command `...``.
    pub name: String,
    /// Ordered parameter names. `~ Input` lines following the command bind
    /// to these in order.
    #[serde(default)]
    pub parameters: Vec<String>,
    /// Whether a complete script is expected to contain this command.
    #[serde(default)]
    pub required: bool,
    /// Context tags of which at least one must be active. Empty means the
    /// command is legal anywhere.
    #[serde(default)]
    pub context: Vec<String>,
    /// Semantic type per parameter name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameter_types: BTreeMap<String, ParamType>,
    /// Numeric bounds per parameter name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub ranges: BTreeMap<String, ParamRange>,
    /// Effect on the context stack once the command has run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition: Option<ContextTransition>,
}

impl CommandSpec {
    /// A command with no parameters, no context requirement and no transition.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
            required: false,
            context: Vec::new(),
            parameter_types: BTreeMap::new(),
            ranges: BTreeMap::new(),
            transition: None,
        }
    }

    /// Mark the command as required (builder pattern).
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set the required context tags (builder pattern).
    pub fn in_context(mut self, tags: &[&str]) -> Self {
        self.context = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    /// Append a typed parameter, with an optional range (builder pattern).
    pub fn param(mut self, name: &str, ty: ParamType, range: Option<ParamRange>) -> Self {
        self.parameters.push(name.to_string());
        self.parameter_types.insert(name.to_string(), ty);
        if let Some(r) = range {
            self.ranges.insert(name.to_string(), r);
        }
        self
    }

    /// Set the context transition (builder pattern).
    pub fn transition(mut self, transition: ContextTransition) -> Self {
        self.transition = Some(transition);
        self
    }

    /// Declared type of the named parameter, if any.
    pub fn parameter_type(&self, param: &str) -> Option<ParamType> {
        self.parameter_types.get(param).copied()
    }

    /// Declared range of the named parameter, if any.
    pub fn range(&self, param: &str) -> Option<&ParamRange> {
        self.ranges.get(param)
    }
}

/// Errors raised while building a [`SpecRegistry`].
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Two entries declare the same command name.
    #[error("duplicate command name in registry: {0}")]
    DuplicateCommand(String),

    /// An entry has an empty name.
    #[error("registry entry {index} has an empty command name")]
    EmptyName {
        /// Position of the entry in the table.
        index: usize,
    },

    /// The table file is not valid registry JSON.
    #[error("invalid registry table: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegistryFile {
    #[serde(default = "default_format_version")]
    format_version: String,
    commands: Vec<CommandSpec>,
}

fn default_format_version() -> String {
    TABLE_FORMAT_VERSION.to_string()
}

/// Closed, immutable catalog of known commands.
///
/// Construct once at startup and share by reference; there is no mutation API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecRegistry {
    /// Table format version the registry was loaded from.
    format_version: String,
    /// All command entries, in table order.
    commands: Vec<CommandSpec>,
    /// Command name → index into `commands`.
    #[serde(skip)]
    by_name: HashMap<String, usize>,
}

impl SpecRegistry {
    /// Build a registry from a command table.
    ///
    /// Fails if any two entries share a name or any name is empty.
    pub fn new(commands: Vec<CommandSpec>) -> Result<Self, RegistryError> {
        Self::with_format_version(TABLE_FORMAT_VERSION.to_string(), commands)
    }

    fn with_format_version(
        format_version: String,
        commands: Vec<CommandSpec>,
    ) -> Result<Self, RegistryError> {
        let mut by_name = HashMap::with_capacity(commands.len());
        for (index, cmd) in commands.iter().enumerate() {
            if cmd.name.trim().is_empty() {
                return Err(RegistryError::EmptyName { index });
            }
            if by_name.insert(cmd.name.clone(), index).is_some() {
                return Err(RegistryError::DuplicateCommand(cmd.name.clone()));
            }
        }
        Ok(Self {
            format_version,
            commands,
            by_name,
        })
    }

    /// The built-in CAD command table.
    pub fn builtin() -> Self {
        let commands = builtin_commands();
        let by_name = commands
            .iter()
            .enumerate()
            .map(|(i, cmd)| (cmd.name.clone(), i))
            .collect();
        Self {
            format_version: TABLE_FORMAT_VERSION.to_string(),
            commands,
            by_name,
        }
    }

    /// Load a registry from table JSON (`{"commands": [...]}`).
    pub fn from_json(json: &str) -> Result<Self, RegistryError> {
        let file: RegistryFile = serde_json::from_str(json)?;
        Self::with_format_version(file.format_version, file.commands)
    }

    /// Look up a command by name.
    pub fn lookup(&self, name: &str) -> Option<&CommandSpec> {
        self.by_name.get(name).map(|&i| &self.commands[i])
    }

    /// Whether `name` is a known command.
    pub fn is_known(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// All commands, in table order.
    pub fn commands(&self) -> &[CommandSpec] {
        &self.commands
    }

    /// Commands a complete script is expected to contain.
    pub fn required_commands(&self) -> impl Iterator<Item = &CommandSpec> {
        self.commands.iter().filter(|c| c.required)
    }

    /// Table format version this registry was loaded from.
    pub fn format_version(&self) -> &str {
        &self.format_version
    }

    /// Number of known commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether the registry has no commands.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
