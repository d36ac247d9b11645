//! Output rendering: terminal tables, JSON and TSV.
//!
//! Every function returns the rendered text; commands decide where it goes.

use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use taskdeck_cards::types::{Board, List, Tag};
use taskdeck_cards::{Field, QueryRow, Result};

/// How card listings are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Tsv,
}

impl OutputFormat {
    pub fn from_flags(json: bool, tsv: bool) -> Self {
        if json {
            Self::Json
        } else if tsv {
            Self::Tsv
        } else {
            Self::Table
        }
    }
}

/// Columns given up, in order, when a table does not fit the terminal
const DROP_ORDER: [Field; 5] = [Field::Desc, Field::Id, Field::Url, Field::Activity, Field::List];

/// Widest a single cell is allowed to get before truncation
const MAX_CELL: usize = 60;

/// Terminal width from crossterm, 120 when not connected to a TTY
pub fn terminal_width() -> u16 {
    crossterm::terminal::size().map(|(w, _)| w).unwrap_or(120)
}

/// A bordered table whose columns wrap to `width`, normally
/// [`terminal_width`]
pub fn new_table(width: u16) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(width);
    table
}

/// The first line of a value, cut to [`MAX_CELL`] characters. A cut or a
/// dropped second line is marked with "...".
fn cell(value: &str) -> String {
    let mut lines = value.lines();
    let first = lines.next().unwrap_or("");
    if first.chars().count() > MAX_CELL {
        let kept: String = first.chars().take(MAX_CELL - 3).collect();
        format!("{kept}...")
    } else if lines.next().is_some() {
        format!("{first} ...")
    } else {
        first.to_string()
    }
}

/// Drop low-value columns until the estimated table width fits `width`.
///
/// The name column is never dropped, so very narrow terminals still wrap.
pub fn fit_fields(fields: &[Field], rows: &[QueryRow], width: usize) -> Vec<Field> {
    let column_width = |field: Field| -> usize {
        rows.iter()
            .filter_map(|row| row.fields.iter().find(|(f, _)| *f == field))
            .map(|(_, value)| cell(value).chars().count())
            .max()
            .unwrap_or(0)
            .max(field.as_str().len())
    };
    let mut kept: Vec<Field> = fields.to_vec();
    let total = |kept: &[Field]| kept.iter().map(|f| column_width(*f) + 3).sum::<usize>() + 1;

    for field in DROP_ORDER {
        if total(&kept) <= width {
            break;
        }
        kept.retain(|f| *f != field);
    }
    kept
}

fn value_of(row: &QueryRow, field: Field) -> &str {
    row.fields
        .iter()
        .find(|(f, _)| *f == field)
        .map(|(_, value)| value.as_str())
        .unwrap_or("")
}

/// Fields present in the rows, in projection order
fn fields_of(rows: &[QueryRow], requested: &[Field]) -> Vec<Field> {
    match rows.first() {
        Some(row) => row.fields.iter().map(|(f, _)| *f).collect(),
        None if requested.is_empty() => Field::ALL.to_vec(),
        None => requested.to_vec(),
    }
}

/// Render matched cards.
///
/// `requested` is what `--fields` asked for; when it is empty the table
/// may drop columns to fit `width`.
pub fn cards(
    rows: &[QueryRow],
    requested: &[Field],
    format: OutputFormat,
    width: u16,
) -> Result<String> {
    let fields = fields_of(rows, requested);
    match format {
        OutputFormat::Json => {
            let values: Vec<serde_json::Value> = rows.iter().map(QueryRow::to_json).collect();
            Ok(serde_json::to_string_pretty(&values)?)
        }
        OutputFormat::Tsv => Ok(cards_tsv(rows, &fields)),
        OutputFormat::Table => {
            if rows.is_empty() {
                return Ok("No matching cards".to_string());
            }
            let fields = if requested.is_empty() {
                fit_fields(&fields, rows, width as usize)
            } else {
                fields
            };
            let mut table = new_table(width);
            table.set_header(fields.iter().map(|f| f.as_str()));
            for row in rows {
                table.add_row(fields.iter().map(|f| cell(value_of(row, *f))));
            }
            Ok(table.to_string())
        }
    }
}

fn tsv_escape(value: &str) -> String {
    value.replace(['\t', '\n', '\r'], " ")
}

fn cards_tsv(rows: &[QueryRow], fields: &[Field]) -> String {
    let mut lines = vec![fields
        .iter()
        .map(|f| f.as_str())
        .collect::<Vec<_>>()
        .join("\t")];
    for row in rows {
        lines.push(
            fields
                .iter()
                .map(|f| tsv_escape(value_of(row, *f)))
                .collect::<Vec<_>>()
                .join("\t"),
        );
    }
    lines.join("\n")
}

fn json<T: Serialize>(items: &[T]) -> Result<String> {
    Ok(serde_json::to_string_pretty(items)?)
}

/// Render the open lists of a board
pub fn lists(lists: &[List], as_json: bool, width: u16) -> Result<String> {
    if as_json {
        return json(lists);
    }
    let mut table = new_table(width);
    table.set_header(vec!["Name", "ID"]);
    for list in lists {
        table.add_row(vec![list.name.as_str(), list.id.as_str()]);
    }
    Ok(table.to_string())
}

/// Render a board's tags
pub fn tags(tags: &[Tag], as_json: bool, width: u16) -> Result<String> {
    if as_json {
        return json(tags);
    }
    let mut table = new_table(width);
    table.set_header(vec!["Name", "Color", "ID"]);
    for tag in tags {
        table.add_row(vec![
            tag.name.as_str(),
            tag.color.as_deref().unwrap_or("-"),
            tag.id.as_str(),
        ]);
    }
    Ok(table.to_string())
}

/// Render the boards visible to the account
pub fn boards(boards: &[Board], as_json: bool, width: u16) -> Result<String> {
    if as_json {
        return json(boards);
    }
    let mut table = new_table(width);
    table.set_header(vec!["Name", "URL"]);
    for board in boards {
        table.add_row(vec![board.name.as_str(), board.url.as_str()]);
    }
    Ok(table.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskdeck_cards::filter::CardPredicate;
    use taskdeck_cards::query;
    use taskdeck_cards::{BoardContext, Card};

    fn rows(fields: &[Field]) -> Vec<QueryRow> {
        let ctx = BoardContext::new(
            Board::new("b1", "Home"),
            vec![List::new("inbox", "Inbox", "b1", 1.0)],
            vec![Tag::new("t1", "Food", "b1")],
        );
        let cards = vec![
            Card::new("c1", "Buy milk", "inbox")
                .with_tag("t1")
                .with_description("two litres\nsemi-skimmed"),
            Card::new("c2", "Call\tplumber", "inbox"),
        ];
        query::query(&ctx, &cards, &CardPredicate::default(), None, fields)
    }

    #[test]
    fn test_cell_cuts_long_and_multiline_values() {
        assert_eq!(cell("hello"), "hello");
        assert_eq!(cell("two litres\nsemi-skimmed"), "two litres ...");
        let long = "こ".repeat(MAX_CELL + 5);
        let cut = cell(&long);
        assert_eq!(cut.chars().count(), MAX_CELL);
        assert!(cut.ends_with("..."));
    }

    #[test]
    fn test_json_keeps_requested_fields_in_order() {
        let rows = rows(&[Field::Tags, Field::Name]);
        let text = cards(&rows, &[Field::Tags, Field::Name], OutputFormat::Json, 120).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value[0]["name"], "Buy milk");
        assert_eq!(value[0]["tags"], "Food");
        assert!(value[0].get("desc").is_none());
        assert!(text.find("\"tags\"").unwrap() < text.find("\"name\"").unwrap());
    }

    #[test]
    fn test_json_empty_is_array() {
        let text = cards(&[], &[], OutputFormat::Json, 120).unwrap();
        assert_eq!(text, "[]");
    }

    #[test]
    fn test_tsv_header_and_escaping() {
        let rows = rows(&[Field::Name, Field::Desc]);
        let text = cards(&rows, &[Field::Name, Field::Desc], OutputFormat::Tsv, 120).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "name\tdesc");
        assert_eq!(lines[1], "Buy milk\ttwo litres semi-skimmed");
        assert_eq!(lines[2], "Call plumber\t");
    }

    #[test]
    fn test_tsv_empty_has_header() {
        let text = cards(&[], &[Field::Name], OutputFormat::Tsv, 120).unwrap();
        assert_eq!(text, "name");
    }

    #[test]
    fn test_fit_fields_drops_in_order() {
        let rows = rows(&[]);
        let all = Field::ALL.to_vec();
        assert_eq!(fit_fields(&all, &rows, 1000), all);

        let narrow = fit_fields(&all, &rows, 40);
        assert!(narrow.contains(&Field::Name));
        assert!(!narrow.contains(&Field::Desc));
        assert!(!narrow.contains(&Field::Id));

        let tiny = fit_fields(&all, &rows, 5);
        assert_eq!(tiny, vec![Field::Name, Field::Tags, Field::Due]);
    }

    #[test]
    fn test_table_lists_titles() {
        let rows = rows(&[]);
        let text = cards(&rows, &[], OutputFormat::Table, 200).unwrap();
        assert!(text.contains("Buy milk"));
        assert!(text.contains("name"));
        assert_eq!(
            cards(&[], &[], OutputFormat::Table, 80).unwrap(),
            "No matching cards"
        );
    }

    #[test]
    fn test_format_from_flags() {
        assert_eq!(OutputFormat::from_flags(false, false), OutputFormat::Table);
        assert_eq!(OutputFormat::from_flags(true, false), OutputFormat::Json);
        assert_eq!(OutputFormat::from_flags(false, true), OutputFormat::Tsv);
    }
}
