//! `mao article` command - News articles for the public site

use clap::Subcommand;
use console::style;
use miette::Result;
use std::path::PathBuf;

use crate::cli::commands::utils::{
    finish_list, mutate, open_screen, Columns, Connection, DeleteArgs, IdArgs, ViewArgs,
};
use crate::cli::table::{CellValue, ColumnDef, TableRow};
use crate::cli::GlobalOpts;
use crate::core::entity::Record;
use crate::core::fetch::Screen;
use crate::core::identity::RecordId;
use crate::core::mutation::{Action, RefreshPolicy};
use crate::core::upload::encode_file;
use crate::core::view::FilterState;
use crate::entities::article::{self, toggle_local, Article, ArticleInput, ArticleStatus, ArticleSummary};

#[derive(Subcommand, Debug)]
pub enum ArticleCommands {
    /// List articles with filtering
    List(ListArgs),

    /// Write a new article (saved as draft unless --status published)
    New(NewArgs),

    /// Edit an article; only the given fields change
    Update(UpdateArgs),

    /// Switch an article between draft and published
    Toggle(IdArgs),

    /// Permanently delete an article
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Filter by publication status
    #[arg(long)]
    pub status: Option<ArticleStatus>,

    /// Filter by category (exact)
    #[arg(long, short = 'c')]
    pub category: Option<String>,

    #[command(flatten)]
    pub view: ViewArgs,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    #[arg(long, short = 't')]
    pub title: String,

    /// Article body
    #[arg(long)]
    pub content: String,

    #[arg(long, short = 'c')]
    pub category: String,

    #[arg(long)]
    pub author: Option<String>,

    /// Cover image (png, jpg, gif or webp; at most 5MB)
    #[arg(long)]
    pub image: Option<PathBuf>,

    #[arg(long)]
    pub status: Option<ArticleStatus>,
}

#[derive(clap::Args, Debug)]
pub struct UpdateArgs {
    /// Article ID
    pub id: String,

    #[arg(long, short = 't')]
    pub title: Option<String>,

    #[arg(long)]
    pub content: Option<String>,

    #[arg(long, short = 'c')]
    pub category: Option<String>,

    #[arg(long)]
    pub author: Option<String>,

    /// Replace the cover image
    #[arg(long)]
    pub image: Option<PathBuf>,

    #[arg(long)]
    pub status: Option<ArticleStatus>,
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", "ID", 8),
    ColumnDef::new("title", "TITLE", 36),
    ColumnDef::new("category", "CATEGORY", 14),
    ColumnDef::new("author", "AUTHOR", 18),
    ColumnDef::new("status", "STATUS", 10),
    ColumnDef::new("created", "CREATED", 12),
];

fn row(a: &Article) -> TableRow {
    TableRow::new(a.id.to_string())
        .cell("id", CellValue::Id(a.id.to_string()))
        .cell("title", CellValue::Text(a.title.clone()))
        .cell("category", CellValue::Text(a.category.clone()))
        .cell("author", CellValue::Text(a.author.clone()))
        .cell("status", CellValue::Article(a.status))
        .cell("created", CellValue::Date(a.created_at))
}

const OUTPUT: Columns<Article> = Columns {
    entity_name: "article",
    plural: "articles",
    columns: COLUMNS,
    row,
};

pub fn run(cmd: ArticleCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ArticleCommands::List(args) => run_list(args, global),
        ArticleCommands::New(args) => run_new(args, global),
        ArticleCommands::Update(args) => run_update(args, global),
        ArticleCommands::Toggle(args) => run_toggle(args, global),
        ArticleCommands::Delete(args) => {
            let conn = Connection::open(global)?;
            let mut screen: Screen<Article> = Screen::new(article::source());
            mutate(
                &conn,
                &mut screen,
                article::ENDPOINT,
                Some(&args.id),
                Action::Delete,
                RefreshPolicy::Refetch,
                "article",
                args.yes,
                global,
            )?;
            Ok(())
        }
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let conn = Connection::open(global)?;
    let filter = FilterState::new()
        .with_category("status", args.status.map(|s| s.to_string()).unwrap_or_default())
        .with_category("category", args.category.clone().unwrap_or_default());
    let screen: Screen<Article> = open_screen(&conn, article::source(), &args.view, filter);

    let summary = ArticleSummary::compute(screen.view.filtered());
    let cards = vec![
        ("Articles", summary.total.to_string()),
        ("Published", summary.published.to_string()),
        ("Drafts", summary.draft.to_string()),
    ];

    finish_list(&screen, &OUTPUT, &args.view, Some(cards), None, &conn, global)
}

fn image_data(path: Option<&PathBuf>) -> Result<Option<String>> {
    path.map(|p| encode_file(p).map_err(|e| miette::miette!("{}", e)))
        .transpose()
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let input = ArticleInput {
        title: Some(args.title),
        content: Some(args.content),
        author: args.author,
        category: Some(args.category),
        image: image_data(args.image.as_ref())?,
        status: args.status,
    };
    let body = input
        .create_body()
        .map_err(|e| miette::miette!("{}", e.user_message()))?;

    let conn = Connection::open(global)?;
    let mut screen: Screen<Article> = Screen::new(article::source());
    mutate(
        &conn,
        &mut screen,
        article::ENDPOINT,
        None,
        Action::Create(body),
        RefreshPolicy::Refetch,
        "article",
        false,
        global,
    )?;
    Ok(())
}

fn run_update(args: UpdateArgs, global: &GlobalOpts) -> Result<()> {
    let input = ArticleInput {
        title: args.title,
        content: args.content,
        author: args.author,
        category: args.category,
        image: image_data(args.image.as_ref())?,
        status: args.status,
    };
    let body = input
        .update_body()
        .map_err(|e| miette::miette!("{}", e.user_message()))?;

    let conn = Connection::open(global)?;
    let mut screen: Screen<Article> = Screen::new(article::source());
    mutate(
        &conn,
        &mut screen,
        article::ENDPOINT,
        Some(&args.id),
        Action::Update(body),
        RefreshPolicy::Refetch,
        "article",
        false,
        global,
    )?;
    Ok(())
}

/// Toggle on the backend, then flip the loaded copy without refetching
fn run_toggle(args: IdArgs, global: &GlobalOpts) -> Result<()> {
    let conn = Connection::open(global)?;
    let mut screen: Screen<Article> = Screen::new(article::source());
    if let Err(e) = screen.load(&conn.client) {
        tracing::debug!(error = %e, "articles not loaded before toggle");
    }

    let target = RecordId::from(args.id.as_str());
    let local_target = target.clone();
    let done = mutate(
        &conn,
        &mut screen,
        article::ENDPOINT,
        Some(&args.id),
        Action::ToggleStatus,
        RefreshPolicy::optimistic(move |articles| toggle_local(articles, &local_target)),
        "article",
        false,
        global,
    )?;

    if done && !global.quiet {
        if let Some(a) = screen.records().iter().find(|a| a.id() == &target) {
            println!("  {} is now {}", a.title, style(a.status).cyan());
        }
    }
    Ok(())
}
