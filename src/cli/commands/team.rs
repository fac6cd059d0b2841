//! `mao team` command - MAO team members shown on the public site

use clap::Subcommand;
use miette::Result;
use std::path::PathBuf;

use crate::cli::commands::utils::{
    finish_list, mutate, open_screen, Columns, Connection, DeleteArgs, ViewArgs,
};
use crate::cli::table::{CellValue, ColumnDef, TableRow};
use crate::cli::GlobalOpts;
use crate::core::fetch::Screen;
use crate::core::mutation::{Action, RefreshPolicy};
use crate::core::upload::encode_file;
use crate::core::view::FilterState;
use crate::entities::team::{self, TeamMember, TeamMemberInput, TeamSummary};

#[derive(Subcommand, Debug)]
pub enum TeamCommands {
    /// List team members
    List(ListArgs),

    /// Add a team member (photo required)
    Add(AddArgs),

    /// Edit a team member; only the given fields change
    Update(UpdateArgs),

    /// Remove a team member
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Only active (true) or inactive (false) members
    #[arg(long)]
    pub active: Option<bool>,

    #[command(flatten)]
    pub view: ViewArgs,
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    #[arg(long, short = 'n')]
    pub name: String,

    #[arg(long)]
    pub position: String,

    /// Photo file (png, jpg, gif or webp; at most 5MB)
    #[arg(long)]
    pub photo: PathBuf,

    #[arg(long)]
    pub bio: Option<String>,

    /// Position in the public listing (lower first)
    #[arg(long)]
    pub order: Option<i64>,

    /// Add as inactive (hidden on the public site)
    #[arg(long)]
    pub inactive: bool,
}

#[derive(clap::Args, Debug)]
pub struct UpdateArgs {
    /// Team member ID
    pub id: String,

    #[arg(long, short = 'n')]
    pub name: Option<String>,

    #[arg(long)]
    pub position: Option<String>,

    #[arg(long)]
    pub bio: Option<String>,

    /// Replace the photo
    #[arg(long)]
    pub photo: Option<PathBuf>,

    #[arg(long)]
    pub order: Option<i64>,

    /// Show or hide on the public site
    #[arg(long)]
    pub active: Option<bool>,
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", "ID", 8),
    ColumnDef::new("order", "#", 4),
    ColumnDef::new("name", "NAME", 24),
    ColumnDef::new("position", "POSITION", 28),
    ColumnDef::new("active", "ACTIVE", 6),
    ColumnDef::new("photo", "PHOTO", 5),
];

fn row(m: &TeamMember) -> TableRow {
    TableRow::new(m.id.to_string())
        .cell("id", CellValue::Id(m.id.to_string()))
        .cell("order", CellValue::Number(m.display_order))
        .cell("name", CellValue::Text(m.name.clone()))
        .cell("position", CellValue::Text(m.position.clone()))
        .cell("active", CellValue::Flag(m.is_active))
        .cell("photo", CellValue::Flag(m.photo.is_some()))
}

const OUTPUT: Columns<TeamMember> = Columns {
    entity_name: "team member",
    plural: "team members",
    columns: COLUMNS,
    row,
};

pub fn run(cmd: TeamCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        TeamCommands::List(args) => run_list(args, global),
        TeamCommands::Add(args) => run_add(args, global),
        TeamCommands::Update(args) => run_update(args, global),
        TeamCommands::Delete(args) => run_delete(args, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let conn = Connection::open(global)?;
    let filter = FilterState::new()
        .with_category("active", args.active.map(|a| a.to_string()).unwrap_or_default());
    let mut screen: Screen<TeamMember> = open_screen(&conn, team::source(), &args.view, filter);

    let mut members = screen.records().to_vec();
    members.sort_by_key(|m| m.display_order);
    screen.view.replace(members);

    let summary = TeamSummary::compute(screen.view.filtered());
    let cards = vec![
        ("Team members", summary.total.to_string()),
        ("Active", summary.active.to_string()),
    ];

    finish_list(&screen, &OUTPUT, &args.view, Some(cards), None, &conn, global)
}

fn photo_data(path: Option<&PathBuf>) -> Result<Option<String>> {
    path.map(|p| encode_file(p).map_err(|e| miette::miette!("{}", e)))
        .transpose()
}

fn run_add(args: AddArgs, global: &GlobalOpts) -> Result<()> {
    let input = TeamMemberInput {
        name: Some(args.name),
        position: Some(args.position),
        bio: args.bio,
        photo: photo_data(Some(&args.photo))?,
        is_active: Some(!args.inactive),
        display_order: args.order,
    };
    let body = input
        .create_body()
        .map_err(|e| miette::miette!("{}", e.user_message()))?;

    send(None, Action::Create(body), false, global)
}

fn run_update(args: UpdateArgs, global: &GlobalOpts) -> Result<()> {
    let input = TeamMemberInput {
        name: args.name,
        position: args.position,
        bio: args.bio,
        photo: photo_data(args.photo.as_ref())?,
        is_active: args.active,
        display_order: args.order,
    };
    let body = input
        .update_body()
        .map_err(|e| miette::miette!("{}", e.user_message()))?;

    send(Some(&args.id), Action::Update(body), false, global)
}

fn run_delete(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    send(Some(&args.id), Action::Delete, args.yes, global)
}

fn send(id: Option<&str>, action: Action, yes: bool, global: &GlobalOpts) -> Result<()> {
    let conn = Connection::open(global)?;
    let mut screen: Screen<TeamMember> = Screen::new(team::source());
    mutate(
        &conn,
        &mut screen,
        team::ENDPOINT,
        id,
        action,
        RefreshPolicy::Refetch,
        "team member",
        yes,
        global,
    )?;
    Ok(())
}
