//! Single-message help surfaces: one command, one group, or an error.
//!
//! These are plain [`ViewAuthor`]s. The error view carries a Close button
//! and deletes its message when stopped.

use starlight_core::{
    BoxedInteraction, ButtonStyle, CommandContext, Control, ControlCallback, Embed,
    MessagePayload, ViewResult, callback,
};
use starlight_views::{ViewAuthor, ViewOptions, WeakView};
use tracing::debug;

use super::model::{CommandInfo, HelpOptions};

/// Embed describing a single command.
pub fn command_embed(command: &CommandInfo, options: &HelpOptions) -> Embed {
    Embed::new()
        .title(command.signature())
        .description(
            command
                .description
                .as_deref()
                .or(command.brief.as_deref())
                .unwrap_or(&options.no_documentation),
        )
        .color(options.accent_color)
}

/// Embed describing a group and its visible subcommands.
pub fn group_embed(group: &CommandInfo, options: &HelpOptions) -> Embed {
    let mut description = group
        .description
        .as_deref()
        .or(group.brief.as_deref())
        .unwrap_or(&options.no_documentation)
        .to_string();

    let subcommands: Vec<String> = group
        .subcommands
        .iter()
        .filter(|command| !command.hidden)
        .map(|command| {
            format!(
                "`{}`\n{}",
                command.signature(),
                command.brief.as_deref().unwrap_or(&options.no_documentation)
            )
        })
        .collect();
    if !subcommands.is_empty() {
        description.push_str("\n\n**Subcommands**\n");
        description.push_str(&subcommands.join("\n"));
    }

    Embed::new()
        .title(group.signature())
        .description(description)
        .color(options.accent_color)
}

pub fn error_embed(error: &str, options: &HelpOptions) -> Embed {
    Embed::new()
        .title(options.error_title.clone())
        .description(error)
        .color(options.error_color)
}

/// Sends the detail page of `command` as a view owned by the invoker.
pub async fn send_command_help(
    ctx: &dyn CommandContext,
    command: &CommandInfo,
    options: &HelpOptions,
    view_options: ViewOptions,
) -> ViewResult<ViewAuthor> {
    let view = ViewAuthor::for_context(ctx, view_options);
    view.start(ctx, MessagePayload::embed(command_embed(command, options)))
        .await?;
    Ok(view)
}

/// Sends the detail page of a command group.
pub async fn send_group_help(
    ctx: &dyn CommandContext,
    group: &CommandInfo,
    options: &HelpOptions,
    view_options: ViewOptions,
) -> ViewResult<ViewAuthor> {
    let view = ViewAuthor::for_context(ctx, view_options);
    view.start(ctx, MessagePayload::embed(group_embed(group, options)))
        .await?;
    Ok(view)
}

/// Sends `error` with a Close button. Closing deletes the message.
///
/// The caller keeps the returned view alive for as long as the button
/// should respond.
pub async fn send_error_message(
    ctx: &dyn CommandContext,
    error: &str,
    options: &HelpOptions,
    view_options: ViewOptions,
) -> ViewResult<ViewAuthor> {
    let view = ViewAuthor::for_context(ctx, view_options.delete_after(true));
    view.add_control(
        Control::button()
            .label(options.close_label.clone())
            .style(ButtonStyle::Danger)
            .on_click(close_callback(view.downgrade())),
    );
    view.start(ctx, MessagePayload::embed(error_embed(error, options)))
        .await?;
    Ok(view)
}

fn close_callback(view: WeakView) -> ControlCallback {
    callback(move |interaction: BoxedInteraction, _| {
        let view = view.clone();
        async move {
            if !interaction.is_done() {
                interaction.defer().await?;
            }
            if let Some(view) = view.upgrade() {
                debug!("Closing help error message");
                view.stop();
            }
            Ok(())
        }
    })
}

#[cfg(test)]
mod tests {
    use starlight_core::ComponentKind;
    use starlight_core::mock::MockHost;

    use super::*;
    use crate::signature::CommandParameter;

    const OWNER: u64 = 3;

    fn tag_group() -> CommandInfo {
        CommandInfo::new("tag")
            .brief("Manage tags")
            .subcommand(
                CommandInfo::new("create")
                    .brief("Create a tag")
                    .parameter(CommandParameter::new("name")),
            )
            .subcommand(CommandInfo::new("delete"))
            .subcommand(CommandInfo::new("purge").hidden(true))
    }

    #[tokio::test]
    async fn test_command_detail() {
        let host = MockHost::new();
        let ctx = host.context(OWNER);
        let command = CommandInfo::new("ban")
            .brief("Ban a member")
            .description("Bans a member and deletes a day of their messages.")
            .parameter(CommandParameter::new("member"));

        let view = send_command_help(
            ctx.as_ref(),
            &command,
            &HelpOptions::default(),
            ViewOptions::no_timeout(),
        )
        .await
        .unwrap();

        assert!(view.is_started());
        let embed = host.last_message().unwrap().embed.unwrap();
        assert_eq!(embed.title.as_deref(), Some("ban <member>"));
        assert_eq!(
            embed.description.as_deref(),
            Some("Bans a member and deletes a day of their messages.")
        );
        assert_eq!(embed.color, Some(0x5865F2));
    }

    #[test]
    fn test_undocumented_command_uses_placeholder() {
        let embed = command_embed(&CommandInfo::new("ping"), &HelpOptions::default());
        assert_eq!(embed.title.as_deref(), Some("ping"));
        assert_eq!(embed.description.as_deref(), Some("No Documentation"));
    }

    #[tokio::test]
    async fn test_group_detail_lists_visible_subcommands() {
        let host = MockHost::new();
        let ctx = host.context(OWNER);

        send_group_help(
            ctx.as_ref(),
            &tag_group(),
            &HelpOptions::default(),
            ViewOptions::no_timeout(),
        )
        .await
        .unwrap();

        let embed = host.last_message().unwrap().embed.unwrap();
        assert_eq!(embed.title.as_deref(), Some("tag"));
        assert_eq!(
            embed.description.as_deref(),
            Some(
                "Manage tags\n\n**Subcommands**\n`create <name>`\nCreate a tag\n`delete`\nNo Documentation"
            )
        );
    }

    #[test]
    fn test_group_without_subcommands() {
        let group = CommandInfo::new("tag").subcommand(CommandInfo::new("x").hidden(true));
        let embed = group_embed(&group, &HelpOptions::default());
        assert_eq!(embed.description.as_deref(), Some("No Documentation"));
    }

    #[tokio::test]
    async fn test_error_close_deletes_message() {
        let host = MockHost::new();
        let ctx = host.context(OWNER);
        let view = send_error_message(
            ctx.as_ref(),
            "No command called \"nope\" found.",
            &HelpOptions::default(),
            ViewOptions::no_timeout(),
        )
        .await
        .unwrap();
        let id = host.last_message_id().unwrap();

        let payload = host.last_message().unwrap();
        let embed = payload.embed.clone().unwrap();
        assert_eq!(embed.title.as_deref(), Some("Something went wrong!"));
        assert_eq!(embed.color, Some(0xE74C3C));
        let components = payload.components.unwrap();
        assert_eq!(components.len(), 1);
        assert!(matches!(
            &components[0].kind,
            ComponentKind::Button { label: Some(label), style: ButtonStyle::Danger, .. } if label == "Close"
        ));

        let close = view.control_ids()[0].clone();
        let interaction: BoxedInteraction = host.interaction(OWNER);
        view.dispatch(interaction.clone(), &close).await.unwrap();
        view.wait_teardown().await.unwrap();

        assert!(interaction.is_done());
        assert!(view.is_stopped());
        assert!(host.is_deleted(id));
    }

    #[tokio::test]
    async fn test_error_close_ignores_other_users() {
        let host = MockHost::new();
        let ctx = host.context(OWNER);
        let view = send_error_message(
            ctx.as_ref(),
            "oops",
            &HelpOptions::default(),
            ViewOptions::no_timeout(),
        )
        .await
        .unwrap();
        let id = host.last_message_id().unwrap();

        let close = view.control_ids()[0].clone();
        view.dispatch(host.interaction(OWNER + 1), &close).await.unwrap();

        assert!(!view.is_stopped());
        assert!(!host.is_deleted(id));
    }
}
