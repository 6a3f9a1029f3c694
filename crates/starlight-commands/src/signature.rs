//! Usage strings for application command parameters.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The type of value a parameter accepts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterKind {
    #[default]
    String,
    Integer,
    Number,
    Boolean,
    User,
    Channel,
    Role,
    Mentionable,
    Attachment,
}

/// The value carried by a [`Choice`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChoiceValue {
    Int(i64),
    Float(f64),
    Str(String),
}

impl From<&str> for ChoiceValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for ChoiceValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for ChoiceValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for ChoiceValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

/// One predefined value of a parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub name: String,
    pub value: ChoiceValue,
}

/// A declared command parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandParameter {
    pub name: String,
    #[serde(default)]
    pub kind: ParameterKind,
    #[serde(default = "default_required")]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<Choice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn default_required() -> bool {
    true
}

impl CommandParameter {
    /// A required string parameter.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ParameterKind::default(),
            required: true,
            default: None,
            choices: Vec::new(),
            description: None,
        }
    }

    pub fn kind(mut self, kind: ParameterKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Makes the parameter optional with a displayed default.
    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.required = false;
        self.default = Some(value.into());
        self
    }

    pub fn choice(mut self, name: impl Into<String>, value: impl Into<ChoiceValue>) -> Self {
        self.choices.push(Choice {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }
}

impl fmt::Display for CommandParameter {
    /// Formats the parameter as it appears in a usage string.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.kind == ParameterKind::Attachment {
            return if self.required {
                write!(f, "<{} (upload a file)>", self.name)
            } else {
                write!(f, "[{} (upload a file)]", self.name)
            };
        }

        let name = if self.choices.is_empty() {
            self.name.clone()
        } else {
            self.choices
                .iter()
                .map(|choice| match &choice.value {
                    ChoiceValue::Str(value) => format!("\"{value}\""),
                    _ => choice.name.clone(),
                })
                .collect::<Vec<_>>()
                .join("|")
        };

        match (&self.default, self.required) {
            (_, true) => write!(f, "<{name}>"),
            (Some(default), false) if !default.is_empty() => write!(f, "[{name}={default}]"),
            (_, false) => write!(f, "[{name}]"),
        }
    }
}

/// Builds the usage string for a list of parameters, e.g.
/// `<member> [reason=none] [proof (upload a file)]`.
pub fn app_signature(parameters: &[CommandParameter]) -> String {
    parameters
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}
