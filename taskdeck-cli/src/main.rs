//! taskdeck CLI - query, batch-edit and review Trello cards.
//!
//! Commands:
//! - `taskdeck show cards|lists|tags|boards`: Print board contents
//! - `taskdeck grep <pattern>`: Search card titles
//! - `taskdeck batch tag|move|due|attach`: One action per matching card
//! - `taskdeck delete cards|list`: Archive or delete
//! - `taskdeck review`: Per-card command prompt
//! - `taskdeck add card [title]`: Create a card
//! - `taskdeck config`: Print the effective configuration
//!
//! Exit codes:
//! - 0: Success, including when no cards match
//! - 1: Other errors
//! - 2: Invalid input (bad regex, date, flags)
//! - 3: Configuration error
//! - 4: Authentication failed
//! - 5: Board, list or tag not found
//! - 6: Network error

use clap::Parser;
use tracing_subscriber::EnvFilter;

use taskdeck::{banner, commands, Cli};

fn main() {
    // Show the banner for interactive help (not when piped).
    {
        use std::io::IsTerminal;
        let args: Vec<String> = std::env::args().collect();
        let show = match args.len() {
            1 => std::io::stdin().is_terminal(),
            2 => args[1] == "--help" || args[1] == "-h",
            _ => false,
        };
        if show {
            banner::print_banner(true);
        }
    }

    let cli = Cli::parse();

    let filter = if cli.debug {
        EnvFilter::new("taskdeck=debug,taskdeck_cards=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .init();

    let exit_code = match commands::run(cli) {
        Ok(()) => 0,
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    };

    std::process::exit(exit_code);
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskdeck::{AddKind, BatchKind, Commands, DeleteKind, ShowKind};
    use taskdeck_cards::{Field, SortKey, StatusFilter};

    #[test]
    fn test_cli_parsing_show_cards() {
        let cli = Cli::parse_from([
            "taskdeck", "show", "cards", "-l", "Inbox", "-t", "Food", "-t", "Work", "-m", "milk",
            "-i", "--by", "due", "--fields", "name,due", "--json",
        ]);
        let Commands::Show {
            what: ShowKind::Cards { filter, output },
        } = cli.command
        else {
            panic!("expected show cards");
        };
        assert_eq!(filter.list.as_deref(), Some("Inbox"));
        assert_eq!(filter.tags, vec!["Food", "Work"]);
        assert_eq!(filter.matches, vec!["milk"]);
        assert!(filter.ignore_case);
        assert_eq!(filter.status, StatusFilter::Open);
        assert_eq!(output.by, Some(SortKey::Due));
        assert_eq!(output.fields, vec![Field::Name, Field::Due]);
        assert!(output.json);
    }

    #[test]
    fn test_cli_parsing_show_soon() {
        let cli = Cli::parse_from(["taskdeck", "show", "soon", "--tsv"]);
        assert!(matches!(
            cli.command,
            Commands::Show {
                what: ShowKind::Soon { json: false, tsv: true }
            }
        ));
        assert!(Cli::try_parse_from(["taskdeck", "show", "soon", "--json", "--tsv"]).is_err());
    }

    #[test]
    fn test_cli_parsing_globals_after_subcommand() {
        let cli = Cli::parse_from(["taskdeck", "review", "-s", "all", "-b", "Home", "--no-color"]);
        assert_eq!(cli.board.as_deref(), Some("Home"));
        assert!(cli.no_color);
        assert!(matches!(
            cli.command,
            Commands::Review { filter } if filter.status == StatusFilter::All
        ));
    }

    #[test]
    fn test_cli_parsing_grep() {
        let cli = Cli::parse_from(["taskdeck", "grep", "-c", "-i", "-e", "a", "-e", "b", "c"]);
        let Commands::Grep(args) = cli.command else {
            panic!("expected grep");
        };
        assert!(args.count);
        assert!(args.ignore_case);
        assert_eq!(args.patterns(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_cli_parsing_batch_and_delete() {
        let cli = Cli::parse_from(["taskdeck", "batch", "attach", "--no-tags"]);
        assert!(matches!(
            cli.command,
            Commands::Batch {
                action: BatchKind::Attach { filter }
            } if filter.no_tags
        ));

        let cli = Cli::parse_from(["taskdeck", "delete", "cards", "-f", "-n", "-l", "Done"]);
        assert!(matches!(
            cli.command,
            Commands::Delete {
                what: DeleteKind::Cards { force: true, noninteractive: true, .. }
            }
        ));

        let cli = Cli::parse_from(["taskdeck", "delete", "list", "Someday", "-n"]);
        assert!(matches!(
            cli.command,
            Commands::Delete {
                what: DeleteKind::List { ref name, noninteractive: true }
            } if name == "Someday"
        ));
    }

    #[test]
    fn test_cli_parsing_add_card() {
        let cli = Cli::parse_from(["taskdeck", "add", "card", "Buy milk", "-m", "2l", "-e"]);
        let Commands::Add {
            what:
                AddKind::Card {
                    title,
                    message,
                    list,
                    edit,
                },
        } = cli.command
        else {
            panic!("expected add card");
        };
        assert_eq!(title.as_deref(), Some("Buy milk"));
        assert_eq!(message.as_deref(), Some("2l"));
        assert_eq!(list, None);
        assert!(edit);
    }

    #[test]
    fn test_cli_rejects_bad_values() {
        assert!(Cli::try_parse_from(["taskdeck", "show", "cards", "-s", "gone"]).is_err());
        assert!(Cli::try_parse_from(["taskdeck", "show", "cards", "--by", "color"]).is_err());
        assert!(Cli::try_parse_from(["taskdeck", "show", "cards", "--fields", "name,size"]).is_err());
        assert!(Cli::try_parse_from(["taskdeck", "show", "cards", "--json", "--tsv"]).is_err());
    }
}
