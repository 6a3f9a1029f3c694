//! Interactive controls (buttons and selects) owned by a surface.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::error::ViewResult;
use crate::host::BoxedInteraction;
use crate::id::ControlId;
use crate::payload::{ButtonStyle, ComponentKind, ComponentState, SelectOption};

/// A type-erased control callback.
///
/// The callback slot of a [`Control`] holds one of these. Identity matters:
/// interception utilities save the exact `Arc` and put it back, so restores
/// can be checked with [`Arc::ptr_eq`].
pub type ControlCallback =
    Arc<dyn Fn(BoxedInteraction, ControlId) -> BoxFuture<'static, ViewResult<()>> + Send + Sync>;

/// Converts an async closure into a [`ControlCallback`].
pub fn callback<F, Fut>(f: F) -> ControlCallback
where
    F: Fn(BoxedInteraction, ControlId) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ViewResult<()>> + Send + 'static,
{
    Arc::new(move |interaction, id| Box::pin(f(interaction, id)))
}

/// One interactive element of a surface.
#[derive(Clone)]
pub struct Control {
    id: ControlId,
    kind: ComponentKind,
    /// Whether the control is greyed out.
    pub disabled: bool,
    /// Layout row, if the host supports rows.
    pub row: Option<u8>,
    callback: Option<ControlCallback>,
}

impl Control {
    /// Creates a button with a random custom id.
    pub fn button() -> Self {
        Self {
            id: ControlId::random(),
            kind: ComponentKind::Button {
                label: None,
                emoji: None,
                style: ButtonStyle::default(),
            },
            disabled: false,
            row: None,
            callback: None,
        }
    }

    /// Creates a select menu with a random custom id.
    pub fn select(options: Vec<SelectOption>) -> Self {
        Self {
            id: ControlId::random(),
            kind: ComponentKind::Select {
                placeholder: None,
                options,
            },
            disabled: false,
            row: None,
            callback: None,
        }
    }

    /// Overrides the custom id (builder pattern).
    pub fn with_id(mut self, id: impl Into<ControlId>) -> Self {
        self.id = id.into();
        self
    }

    /// Sets the button label. Ignored for selects.
    pub fn label(mut self, text: impl Into<String>) -> Self {
        if let ComponentKind::Button { label, .. } = &mut self.kind {
            *label = Some(text.into());
        }
        self
    }

    /// Sets the button emoji. Ignored for selects.
    pub fn emoji(mut self, value: impl Into<String>) -> Self {
        if let ComponentKind::Button { emoji, .. } = &mut self.kind {
            *emoji = Some(value.into());
        }
        self
    }

    /// Sets the button style. Ignored for selects.
    pub fn style(mut self, value: ButtonStyle) -> Self {
        if let ComponentKind::Button { style, .. } = &mut self.kind {
            *style = value;
        }
        self
    }

    /// Sets the select placeholder. Ignored for buttons.
    pub fn placeholder(mut self, text: impl Into<String>) -> Self {
        if let ComponentKind::Select { placeholder, .. } = &mut self.kind {
            *placeholder = Some(text.into());
        }
        self
    }

    /// Sets the layout row (builder pattern).
    pub fn on_row(mut self, row: u8) -> Self {
        self.row = Some(row);
        self
    }

    /// Installs the callback (builder pattern).
    pub fn on_click(mut self, cb: ControlCallback) -> Self {
        self.callback = Some(cb);
        self
    }

    pub fn id(&self) -> &ControlId {
        &self.id
    }

    pub fn kind(&self) -> &ComponentKind {
        &self.kind
    }

    /// Replaces the select options. Ignored for buttons.
    pub fn set_options(&mut self, new_options: Vec<SelectOption>) {
        if let ComponentKind::Select { options, .. } = &mut self.kind {
            *options = new_options;
        }
    }

    /// Returns a clone of the callback slot.
    pub fn callback(&self) -> Option<ControlCallback> {
        self.callback.clone()
    }

    /// Swaps the callback slot, returning the previous value.
    pub fn replace_callback(&mut self, cb: Option<ControlCallback>) -> Option<ControlCallback> {
        std::mem::replace(&mut self.callback, cb)
    }

    /// Serialisable snapshot of this control.
    pub fn state(&self) -> ComponentState {
        ComponentState {
            custom_id: self.id.clone(),
            kind: self.kind.clone(),
            disabled: self.disabled,
            row: self.row,
        }
    }
}

impl fmt::Debug for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Control")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("disabled", &self.disabled)
            .field("row", &self.row)
            .field("has_callback", &self.callback.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_builder() {
        let button = Control::button()
            .with_id("stop")
            .emoji("⏹️")
            .style(ButtonStyle::Danger)
            .on_row(1);

        assert_eq!(button.id().as_str(), "stop");
        assert_eq!(button.row, Some(1));
        match button.kind() {
            ComponentKind::Button { emoji, style, .. } => {
                assert_eq!(emoji.as_deref(), Some("⏹️"));
                assert_eq!(*style, ButtonStyle::Danger);
            }
            _ => panic!("Expected Button"),
        }
    }

    #[test]
    fn test_placeholder_ignored_for_buttons() {
        let button = Control::button().placeholder("nope");
        assert!(matches!(button.kind(), ComponentKind::Button { .. }));
    }

    #[test]
    fn test_replace_callback_returns_previous() {
        let first = callback(|_, _| async { Ok(()) });
        let mut control = Control::button().on_click(first.clone());

        let previous = control.replace_callback(None);
        assert!(Arc::ptr_eq(&previous.unwrap(), &first));
        assert!(control.callback().is_none());
    }
}
