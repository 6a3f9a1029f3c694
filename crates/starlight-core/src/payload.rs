//! Message payload model.
//!
//! Every send or edit issued by a surface carries a [`MessagePayload`]. The
//! payload is deliberately platform-neutral: text content, an optional rich
//! [`Embed`], a free-form `extra` map for host-specific keys, and the
//! serialised state of the surface's controls.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::id::ControlId;

fn is_false(value: &bool) -> bool {
    !*value
}

// =============================================================================
// MessagePayload
// =============================================================================

/// The keyword set handed to a host send/edit primitive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessagePayload {
    /// Plain text content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    /// Rich embed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embed: Option<Embed>,

    /// Host-specific keys passed through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,

    /// Snapshot of the surface's controls. `None` leaves the host's current
    /// component set untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<Vec<ComponentState>>,

    /// Only visible to the interacting user.
    #[serde(default, skip_serializing_if = "is_false")]
    pub ephemeral: bool,
}

impl MessagePayload {
    /// Creates an empty payload.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a payload carrying only text content.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Default::default()
        }
    }

    /// Creates a payload carrying only an embed.
    pub fn embed(embed: Embed) -> Self {
        Self {
            embed: Some(embed),
            ..Default::default()
        }
    }

    /// Creates a payload that only updates the component set.
    pub fn components_only(components: Vec<ComponentState>) -> Self {
        Self {
            components: Some(components),
            ..Default::default()
        }
    }

    /// Sets the component snapshot (builder pattern).
    pub fn with_components(mut self, components: Vec<ComponentState>) -> Self {
        self.components = Some(components);
        self
    }

    /// Adds a host-specific key (builder pattern).
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Marks the payload ephemeral (builder pattern).
    pub fn ephemeral(mut self) -> Self {
        self.ephemeral = true;
        self
    }

    /// Returns `true` if the payload carries no visible content.
    pub fn is_empty(&self) -> bool {
        self.content.is_none()
            && self.embed.is_none()
            && self.extra.is_empty()
            && self.components.is_none()
    }
}

// =============================================================================
// Embed
// =============================================================================

/// A rich, structured message body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Embed {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<EmbedField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,
}

/// One name/value field of an [`Embed`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub inline: bool,
}

impl Embed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn color(mut self, color: u32) -> Self {
        self.color = Some(color);
        self
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        self.fields.push(EmbedField {
            name: name.into(),
            value: value.into(),
            inline,
        });
        self
    }

    pub fn footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }
}

// =============================================================================
// PageContent: what a render hook may return
// =============================================================================

/// The value produced by a page render hook.
///
/// A structured payload is used as-is, an embed is wrapped as the payload's
/// embed, and anything textual becomes the payload's content.
#[derive(Debug, Clone, PartialEq)]
pub enum PageContent {
    Payload(MessagePayload),
    Embed(Embed),
    Text(String),
}

impl PageContent {
    /// Normalises the content into a payload.
    pub fn into_payload(self) -> MessagePayload {
        match self {
            Self::Payload(payload) => payload,
            Self::Embed(embed) => MessagePayload::embed(embed),
            Self::Text(text) => MessagePayload::text(text),
        }
    }
}

impl From<MessagePayload> for PageContent {
    fn from(payload: MessagePayload) -> Self {
        Self::Payload(payload)
    }
}

impl From<Embed> for PageContent {
    fn from(embed: Embed) -> Self {
        Self::Embed(embed)
    }
}

impl From<String> for PageContent {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for PageContent {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

// =============================================================================
// Component snapshots
// =============================================================================

/// Visual style of a button.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonStyle {
    #[default]
    Secondary,
    Primary,
    Success,
    Danger,
}

/// One entry of a select menu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    pub label: String,
    /// The value reported back when this option is chosen. Defaults to the label.
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl SelectOption {
    pub fn new(label: impl Into<String>) -> Self {
        let label = label.into();
        Self {
            value: label.clone(),
            label,
            description: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// The kind-specific part of a control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ComponentKind {
    Button {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        emoji: Option<String>,
        #[serde(default)]
        style: ButtonStyle,
    },
    Select {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        placeholder: Option<String>,
        options: Vec<SelectOption>,
    },
}

/// Serialisable state of one control, attached to outgoing payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentState {
    pub custom_id: ControlId,
    #[serde(flatten)]
    pub kind: ComponentKind,
    pub disabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row: Option<u8>,
}
