//! CLI definition for the taskdeck command-line interface.
//!
//! Only clap types live here. Turning parsed flags into engine values
//! ([`FilterArgs::to_filter`]) is the one piece of logic, so that command
//! handlers never see raw strings.

use clap::{Args, Parser, Subcommand};
use taskdeck_cards::{CardFilter, Field, SortKey, StatusFilter};

/// taskdeck - query, batch-edit and review Trello cards.
///
/// Credentials and the default board come from the configuration file
/// (`$TASKDECK_CONFIG`, else `~/.config/taskdeck/config.yaml`) or from
/// `TASKDECK_*` environment variables.
#[derive(Parser, Debug)]
#[command(name = "taskdeck")]
#[command(version)]
#[command(about = "Query, batch-edit and review Trello cards from the terminal")]
#[command(
    long_about = "taskdeck works on one Trello board at a time. It fetches the board's cards \
    once per command, filters them locally and either prints them or walks through them \
    interactively.\n\n\
    Environment variables:\n  \
    TASKDECK_CONFIG     Path to the configuration file\n  \
    TASKDECK_API_KEY    Trello API key\n  \
    TASKDECK_API_TOKEN  Trello API token\n  \
    TASKDECK_BOARD      Board to work with"
)]
pub struct Cli {
    /// Board to work with for this command
    #[arg(short, long, global = true, value_name = "NAME")]
    pub board: Option<String>,

    /// Enable debug output to stderr
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Disable ANSI colors
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print cards, lists, tags or boards
    Show {
        #[command(subcommand)]
        what: ShowKind,
    },

    /// Search card titles with regular expressions
    Grep(GrepArgs),

    /// Apply one action to each matching card in turn
    Batch {
        #[command(subcommand)]
        action: BatchKind,
    },

    /// Archive or delete cards, or archive a list
    Delete {
        #[command(subcommand)]
        what: DeleteKind,
    },

    /// Walk through matching cards with a command prompt
    Review {
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Create a card
    Add {
        #[command(subcommand)]
        what: AddKind,
    },

    /// Print the effective configuration with secrets masked
    Config,
}

#[derive(Subcommand, Debug)]
pub enum ShowKind {
    /// Cards matching the filter flags
    Cards {
        #[command(flatten)]
        filter: FilterArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Open cards with a due date, earliest first
    Soon {
        /// Output as JSON
        #[arg(long, conflicts_with = "tsv")]
        json: bool,
        /// Output as tab-separated values with a header line
        #[arg(long)]
        tsv: bool,
    },
    /// Open lists on the board, in board order
    Lists {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Tags defined on the board
    Tags {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Boards visible to the account
    Boards {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum BatchKind {
    /// Toggle tags on each card
    Tag {
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Move each card to a list chosen with one keystroke
    Move {
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Set a due date on each card
    Due {
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Turn links in titles into attachments
    Attach {
        #[command(flatten)]
        filter: FilterArgs,
    },
}

#[derive(Subcommand, Debug)]
pub enum DeleteKind {
    /// Archive matching cards, or delete them with --force
    Cards {
        /// Delete permanently instead of archiving
        #[arg(short, long)]
        force: bool,
        /// Do not ask before each card
        #[arg(short, long)]
        noninteractive: bool,
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Archive a list by its exact name
    List {
        /// List name
        name: String,
        /// Do not ask for confirmation
        #[arg(short, long)]
        noninteractive: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum AddKind {
    /// Create a card. Without a title, $EDITOR is opened to write one.
    Card {
        /// Card title
        title: Option<String>,
        /// Description for the new card
        #[arg(short = 'm', long)]
        message: Option<String>,
        /// List to create the card in (defaults to inbox_list, then the first list)
        #[arg(short, long, value_name = "NAME")]
        list: Option<String>,
        /// Review the card right after creating it
        #[arg(short, long)]
        edit: bool,
    },
}

/// Flags shared by every command that selects cards
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Only cards in this list (exact, else unique partial name)
    #[arg(short, long, value_name = "NAME")]
    pub list: Option<String>,

    /// Title must match this regex; repeat for alternatives
    #[arg(short = 'm', long = "match", value_name = "REGEX")]
    pub matches: Vec<String>,

    /// Match titles ignoring case
    #[arg(short = 'i', long)]
    pub ignore_case: bool,

    /// Card must carry this tag; repeat to accept any of several
    #[arg(short = 't', long = "tag", value_name = "NAME")]
    pub tags: Vec<String>,

    /// Only cards without tags
    #[arg(long)]
    pub no_tags: bool,

    /// Only cards with a due date
    #[arg(long)]
    pub has_due: bool,

    /// Only cards without a due date
    #[arg(long)]
    pub no_due: bool,

    /// Only cards with attachments
    #[arg(long)]
    pub attachments: bool,

    /// Card status: open, closed or all
    #[arg(short, long, default_value = "open", value_parser = parse_status)]
    pub status: StatusFilter,
}

impl FilterArgs {
    /// Build the engine filter. Conflicting flags surface when it is compiled.
    pub fn to_filter(&self) -> CardFilter {
        let mut filter = CardFilter::new()
            .case_insensitive(self.ignore_case)
            .with_status(self.status);
        if let Some(list) = &self.list {
            filter = filter.with_list(list.clone());
        }
        for pattern in &self.matches {
            filter = filter.with_title_pattern(pattern.clone());
        }
        for tag in &self.tags {
            filter = filter.with_tag(tag.clone());
        }
        if self.no_tags {
            filter = filter.without_tags();
        }
        if self.has_due {
            filter = filter.with_due();
        }
        if self.no_due {
            filter = filter.without_due();
        }
        if self.attachments {
            filter = filter.with_attachments(true);
        }
        filter
    }
}

/// Sorting and output flags for card listings
#[derive(Args, Debug, Clone, Default)]
pub struct OutputArgs {
    /// Sort by name, list, activity or due
    #[arg(long, value_name = "FIELD", value_parser = parse_sort)]
    pub by: Option<SortKey>,

    /// Comma-separated fields to show (name,list,tags,desc,due,activity,id,url)
    #[arg(long, value_delimiter = ',', value_parser = parse_field)]
    pub fields: Vec<Field>,

    /// Output as JSON
    #[arg(long, conflicts_with = "tsv")]
    pub json: bool,

    /// Output as tab-separated values with a header line
    #[arg(long)]
    pub tsv: bool,
}

/// `grep` flags, modelled on grep(1)
#[derive(Args, Debug, Clone)]
pub struct GrepArgs {
    /// Pattern to match against card titles
    pub pattern: Option<String>,

    /// Additional patterns; a card matching any of them is shown
    #[arg(short = 'e', long = "regexp", value_name = "PATTERN")]
    pub regexp: Vec<String>,

    /// Ignore case
    #[arg(short = 'i', long)]
    pub ignore_case: bool,

    /// Print only the number of matching cards
    #[arg(short, long)]
    pub count: bool,

    #[command(flatten)]
    pub output: OutputArgs,
}

impl GrepArgs {
    /// Every pattern given, `-e` patterns first
    pub fn patterns(&self) -> Vec<String> {
        self.regexp
            .iter()
            .chain(self.pattern.iter())
            .cloned()
            .collect()
    }
}

fn parse_status(s: &str) -> Result<StatusFilter, String> {
    s.parse().map_err(|e: taskdeck_cards::DeckError| e.to_string())
}

fn parse_sort(s: &str) -> Result<SortKey, String> {
    s.parse().map_err(|e: taskdeck_cards::DeckError| e.to_string())
}

fn parse_field(s: &str) -> Result<Field, String> {
    s.parse().map_err(|e: taskdeck_cards::DeckError| e.to_string())
}
