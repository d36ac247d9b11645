//! Command handlers.
//!
//! Each handler validates what it can before touching configuration or the
//! network: filters are compiled first, so a bad regex fails fast even with
//! no credentials. Handlers return `taskdeck_cards::Result`; `main` turns the
//! error into an exit code.

mod add;
mod session;
mod show;

use crate::banner;
use crate::cli::{Cli, Commands};
use crate::config::{config_path, Overrides, Settings};
use crate::terminal::TerminalInteraction;
use taskdeck_cards::query;
use taskdeck_cards::{BoardContext, Card, CompiledFilter, DeckError, Result, SortKey, TrelloClient};
use tracing::debug;

/// Run a parsed command line
pub fn run(cli: Cli) -> Result<()> {
    let overrides = Overrides {
        board: cli.board,
        color: cli.no_color.then_some(false),
    };
    if cli.no_color {
        colored::control::set_override(false);
    }

    match cli.command {
        Commands::Show { what } => show::run_show(what, &overrides),
        Commands::Grep(args) => show::run_grep(&args, &overrides),
        Commands::Batch { action } => session::run_batch(action, &overrides),
        Commands::Delete { what } => session::run_delete(what, &overrides),
        Commands::Review { filter } => session::run_review(&filter, &overrides),
        Commands::Add { what } => add::run_add(what, &overrides),
        Commands::Config => run_config(&overrides),
    }
}

/// Load configuration, applying its color preference
pub(crate) fn load_settings(overrides: &Overrides) -> Result<Settings> {
    let settings = Settings::load(overrides).map_err(|e| DeckError::config(format!("{e:#}")))?;
    if !settings.color {
        colored::control::set_override(false);
    }
    Ok(settings)
}

/// A connected client and the loaded board
pub(crate) struct Workspace {
    pub settings: Settings,
    pub repo: TrelloClient,
    pub ctx: BoardContext,
}

impl Workspace {
    pub fn connect(overrides: &Overrides) -> Result<Self> {
        let settings = load_settings(overrides)?;
        let repo = settings.client()?;
        let ctx = BoardContext::load(&repo, settings.board_name()?)?;
        debug!(board = %ctx.board.name, lists = ctx.lists().len(), "board loaded");
        Ok(Self {
            settings,
            repo,
            ctx,
        })
    }

    /// Fetch the board's cards and keep those the filter selects
    pub fn select(&self, filter: &CompiledFilter, sort: Option<SortKey>) -> Result<Vec<Card>> {
        let predicate = filter.resolve(&self.ctx)?;
        let cards = query::fetch(&self.repo, &self.ctx, predicate.list())?;
        Ok(query::select(&self.ctx, &cards, &predicate, sort))
    }

    /// Banner ahead of an interactive session, when configured
    pub fn banner(&self, io: &TerminalInteraction) {
        if self.settings.banner && io.is_interactive() {
            banner::print_banner(self.settings.color);
        }
    }
}

fn run_config(overrides: &Overrides) -> Result<()> {
    let settings = load_settings(overrides)?;
    match config_path() {
        Some(path) if path.exists() => println!("# {}", path.display()),
        Some(path) => println!("# {} (not found; defaults and environment only)", path.display()),
        None => println!("# no configuration directory"),
    }
    let yaml = serde_yaml_ng::to_string(&settings.masked())
        .map_err(|e| DeckError::config(format!("cannot print configuration: {e}")))?;
    print!("{yaml}");
    Ok(())
}
