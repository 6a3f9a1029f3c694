//! Range and emptiness checks that serde cannot express.

#[cfg(feature = "help")]
use starlight_commands::HelpOptions;
use starlight_views::{NavRole, NavigationButtons};

use super::error::{ConfigError, ConfigResult};
use super::schema::{LogOutput, LoggingConfig, PaginationConfig, StarlightConfig};

/// Most options a select menu holds; also the embed field limit.
const MAX_PER_PAGE: usize = 25;

/// Longest placeholder a select menu accepts.
#[cfg(feature = "help")]
const MAX_PLACEHOLDER_LEN: usize = 150;

fn ensure(ok: bool, field: impl Into<String>, reason: impl Into<String>) -> ConfigResult<()> {
    if ok {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, reason))
    }
}

/// Checks every section, reporting the first invalid field.
pub fn validate_config(config: &StarlightConfig) -> ConfigResult<()> {
    check_logging(&config.logging)?;
    check_pagination(&config.pagination)?;
    #[cfg(feature = "help")]
    check_help(&config.help)?;
    Ok(())
}

fn check_logging(logging: &LoggingConfig) -> ConfigResult<()> {
    ensure(
        logging.output != LogOutput::File || logging.file_path.is_some(),
        "logging.file_path",
        "required when logging.output is \"file\"",
    )?;
    ensure(
        logging.filters.keys().all(|module| !module.trim().is_empty()),
        "logging.filters",
        "module names cannot be empty",
    )
}

fn check_pagination(pagination: &PaginationConfig) -> ConfigResult<()> {
    ensure(
        pagination.disable_timeout || pagination.timeout_secs > 0,
        "pagination.timeout_secs",
        "must be greater than 0 unless disable_timeout is set",
    )?;
    check_buttons(&pagination.buttons)
}

fn check_buttons(buttons: &NavigationButtons) -> ConfigResult<()> {
    for role in NavRole::ALL {
        let Some(button) = buttons.get(role) else {
            continue;
        };
        let field = format!("pagination.buttons.{}", format!("{role:?}").to_lowercase());
        let blank = |text: &Option<String>| text.as_deref().is_some_and(|t| t.trim().is_empty());
        ensure(
            !blank(&button.label) && !blank(&button.emoji),
            field.as_str(),
            "label and emoji cannot be blank",
        )?;
        ensure(
            button.label.is_some() || button.emoji.is_some(),
            field,
            "needs a label or an emoji",
        )?;
    }
    Ok(())
}

#[cfg(feature = "help")]
fn check_help(help: &HelpOptions) -> ConfigResult<()> {
    let in_range = |n: usize| (1..=MAX_PER_PAGE).contains(&n);
    ensure(
        in_range(help.per_page),
        "help.per_page",
        format!("must be between 1 and {MAX_PER_PAGE}, got {}", help.per_page),
    )?;
    if let Some(per_page) = help.categories_per_page {
        ensure(
            in_range(per_page),
            "help.categories_per_page",
            format!("must be between 1 and {MAX_PER_PAGE}, got {per_page}"),
        )?;
    }
    ensure(
        help.placeholder.chars().count() <= MAX_PLACEHOLDER_LEN,
        "help.placeholder",
        format!("longer than {MAX_PLACEHOLDER_LEN} characters"),
    )?;
    for (field, text) in [
        ("help.title", &help.title),
        ("help.no_category", &help.no_category),
        ("help.no_documentation", &help.no_documentation),
        ("help.home_label", &help.home_label),
        ("help.error_title", &help.error_title),
        ("help.close_label", &help.close_label),
    ] {
        ensure(!text.trim().is_empty(), field, "cannot be empty")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use starlight_views::NavButton;

    use super::*;

    fn invalid_field(config: &StarlightConfig) -> String {
        match validate_config(config) {
            Err(ConfigError::Invalid { field, .. }) => field,
            other => panic!("expected an invalid field, got {other:?}"),
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        validate_config(&StarlightConfig::default()).unwrap();
    }

    #[test]
    fn test_zero_timeout() {
        let mut config = StarlightConfig::default();
        config.pagination.timeout_secs = 0;
        assert_eq!(invalid_field(&config), "pagination.timeout_secs");

        config.pagination.disable_timeout = true;
        validate_config(&config).unwrap();
    }

    #[cfg(feature = "help")]
    #[test]
    fn test_per_page_bounds() {
        let mut config = StarlightConfig::default();
        config.help.per_page = 0;
        assert_eq!(invalid_field(&config), "help.per_page");
        config.help.per_page = 26;
        assert_eq!(invalid_field(&config), "help.per_page");
        config.help.per_page = 25;
        config.help.categories_per_page = Some(0);
        assert_eq!(invalid_field(&config), "help.categories_per_page");
    }

    #[test]
    fn test_button_labels() {
        let mut config = StarlightConfig::default();
        config.pagination.buttons.stop = Some(NavButton::label("  "));
        assert_eq!(invalid_field(&config), "pagination.buttons.stop");

        config.pagination.buttons.stop = Some(NavButton {
            label: None,
            emoji: None,
            ..NavButton::label("x")
        });
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("needs a label or an emoji"));

        config.pagination.buttons.stop = None;
        validate_config(&config).unwrap();
    }

    #[cfg(feature = "help")]
    #[test]
    fn test_placeholder_length() {
        let mut config = StarlightConfig::default();
        config.help.placeholder = "x".repeat(151);
        assert_eq!(invalid_field(&config), "help.placeholder");
    }

    #[cfg(feature = "help")]
    #[test]
    fn test_blank_texts() {
        let mut config = StarlightConfig::default();
        config.help.home_label = " ".to_string();
        assert_eq!(invalid_field(&config), "help.home_label");
        config.help.home_label = "Home".to_string();
        config.help.close_label = String::new();
        assert_eq!(invalid_field(&config), "help.close_label");
    }

    #[test]
    fn test_file_output_needs_path() {
        let mut config = StarlightConfig::default();
        config.logging.output = LogOutput::File;
        assert_eq!(invalid_field(&config), "logging.file_path");
        config.logging.file_path = Some(PathBuf::from("starlight.log"));
        validate_config(&config).unwrap();
    }
}
