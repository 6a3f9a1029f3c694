//! Console Pager
//!
//! Runs starlight views against the in-memory mock host and prints the
//! message payload after every step as JSON.
//!
//! # Usage
//!
//! ```bash
//! cargo run --package console-pager -- pager --items 5 --clicks next,next,end,previous,stop
//! cargo run --package console-pager -- inline --items 3
//! cargo run --package console-pager -- help-menu
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use futures::StreamExt;
use starlight::commands::{HelpRenderer, ParameterKind};
use starlight::core::mock::MockHost;
use starlight::prelude::*;
use starlight::runtime::config::{ConfigLoader, LogOutput};
use starlight::runtime::logging::LoggingBuilder;
use starlight::views::NavigationButtons;
use tracing::info;

const OWNER: u64 = 1;

#[derive(Parser)]
#[command(version, about = "Drive starlight views against an in-memory host")]
struct Args {
    /// Configuration file (TOML). Defaults are used when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Button pagination driven by a scripted list of clicks.
    Pager {
        #[arg(long, default_value_t = 5)]
        items: usize,
        #[arg(long, value_delimiter = ',', default_value = "next,next,end,previous,stop")]
        clicks: Vec<Click>,
    },
    /// Pages rendered from the body of an async loop.
    Inline {
        #[arg(long, default_value_t = 3)]
        items: usize,
    },
    /// The category help menu.
    HelpMenu,
}

#[derive(Clone, Copy, ValueEnum)]
enum Click {
    Start,
    Previous,
    Stop,
    Next,
    End,
}

impl From<Click> for NavRole {
    fn from(click: Click) -> Self {
        match click {
            Click::Start => NavRole::Start,
            Click::Previous => NavRole::Previous,
            Click::Stop => NavRole::Stop,
            Click::Next => NavRole::Next,
            Click::End => NavRole::End,
        }
    }
}

fn print_message(host: &MockHost, step: &str) -> Result<()> {
    let payload = host.last_message().context("no message was sent")?;
    println!("── {step}");
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}

async fn click(view: &SimplePaginationView<String>, host: &MockHost, role: NavRole) -> Result<()> {
    let id = view
        .nav_control(role)
        .with_context(|| format!("no {role:?} button installed"))?;
    let interaction: BoxedInteraction = host.interaction(OWNER);
    view.view().dispatch(interaction, id).await?;
    Ok(())
}

fn lines(items: usize) -> Vec<String> {
    (1..=items).map(|n| format!("Item number {n}")).collect()
}

async fn run_pager(options: PaginationOptions, items: usize, clicks: Vec<Click>) -> Result<()> {
    let host = MockHost::new();
    let ctx = host.context(OWNER);
    let view = SimplePaginationView::for_context(
        ctx.as_ref(),
        lines(items),
        render_fn(|request: PageRequest<'_, String>| {
            Ok(Embed::new()
                .title(request.data().clone())
                .footer(format!("{}/{}", request.page + 1, request.max_pages()))
                .into())
        }),
        options,
    );

    view.start(ctx.as_ref(), StartOptions::default()).await?;
    print_message(&host, "start")?;

    for step in clicks {
        let role = NavRole::from(step);
        click(&view, &host, role).await?;
        if role == NavRole::Stop {
            view.view().wait_teardown().await?;
        }
        print_message(&host, &format!("{role:?} (page {})", view.current_page()))?;
    }
    Ok(())
}

async fn run_inline(options: PaginationOptions, items: usize) -> Result<()> {
    let host = MockHost::new();
    let ctx: BoxedContext = host.context(OWNER);
    let view =
        SimplePaginationView::for_context(ctx.as_ref(), lines(items), DisplayRenderer, options);

    let driver = {
        let view = view.clone();
        let host = host.clone();
        tokio::spawn(async move {
            for _ in 1..items {
                tokio::time::sleep(Duration::from_millis(50)).await;
                click(&view, &host, NavRole::Next).await?;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
            view.view().stop();
            anyhow::Ok(())
        })
    };

    let mut pages = InlinePagination::new(view, ctx);
    while let Some(item) = pages.next().await {
        let text = format!("{} (shouted: {})", item.data(), item.data().to_uppercase());
        info!(page = item.page(), "Formatting inline page");
        item.format(text)?;
    }

    driver.await??;
    print_message(&host, "inline loop finished")
}

fn demo_book(options: HelpOptions) -> HelpBook {
    HelpBook::new(
        [
            Category::new("Music")
                .description("Play and queue songs in a voice channel")
                .command(
                    CommandInfo::new("play")
                        .brief("Queue a song by name or link")
                        .parameter(CommandParameter::new("query")),
                )
                .command(CommandInfo::new("skip").brief("Skip the current song"))
                .command(
                    CommandInfo::new("volume").parameter(
                        CommandParameter::new("level")
                            .kind(ParameterKind::Integer)
                            .default_value("50"),
                    ),
                ),
            Category::new("Moderation")
                .description("Keep the server tidy")
                .command(
                    CommandInfo::new("ban")
                        .brief("Ban a member")
                        .parameter(CommandParameter::new("member").kind(ParameterKind::User))
                        .parameter(CommandParameter::new("reason").optional()),
                ),
            Category::uncategorized().command(CommandInfo::new("ping").brief("Check latency")),
        ],
        options,
    )
}

async fn run_help_menu(mut options: PaginationOptions, help: HelpOptions) -> Result<()> {
    let host = MockHost::new();
    let ctx = host.context(OWNER);
    options.buttons = NavigationButtons::arrows();

    let renderer = Arc::new(HelpRenderer::new(Arc::new(demo_book(help))));
    let menu = SimplePaginationView::with_renderer(
        OWNER,
        renderer.book().index_pages(),
        renderer.clone(),
        options,
    );
    menu.start(ctx.as_ref(), StartOptions::default()).await?;
    print_message(&host, "index")?;

    let select = renderer.select_control().context("category select missing")?;
    let pick: BoxedInteraction = host.select_interaction(OWNER, ["1"]);
    menu.view().dispatch(pick, &select).await?;
    print_message(&host, "category")?;

    let home = renderer.home_control().context("home button missing")?;
    let back: BoxedInteraction = host.interaction(OWNER);
    menu.view().dispatch(back, &home).await?;
    print_message(&host, "home")?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut loader = ConfigLoader::new();
    if let Some(path) = &args.config {
        loader = loader.file(path);
    }
    let config = loader.load()?;

    // Payloads go to stdout, logs to stderr.
    LoggingBuilder::from_config(&config.logging)
        .output(LogOutput::Stderr)
        .init();

    let options = config.pagination.to_options();
    match args.command {
        Command::Pager { items, clicks } => run_pager(options, items, clicks).await,
        Command::Inline { items } => run_inline(options, items).await,
        Command::HelpMenu => run_help_menu(options, config.help).await,
    }
}
