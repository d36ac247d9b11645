//! ASCII banner for the taskdeck CLI.

use std::io::{self, IsTerminal, Write};

/// ANSI 256-color codes, one per logo line (teal to blue)
const COLORS: [&str; 5] = [
    "\x1b[38;5;43m",
    "\x1b[38;5;37m",
    "\x1b[38;5;31m",
    "\x1b[38;5;25m",
    "\x1b[38;5;19m",
];
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";

const LOGO: [&str; 5] = [
    " ┌──┬──┬──┐  ▀█▀ ▄▀▄ ▄▀▀ █▄▀ █▀▄ █▀▀ ▄▀▀ █▄▀",
    " │▓▓│▒▒│░░│   █  █▀█ ▀▀█ █▀▄ █ █ █▀▀ █   █▀▄",
    " │▓▓│▒▒│  │   ▀  ▀ ▀ ▀▀  ▀ ▀ ▀▀  ▀▀▀  ▀▀ ▀ ▀",
    " │▓▓│  │  │",
    " └──┴──┴──┘",
];

/// Print the banner to stdout.
///
/// Colors are used only when stdout is a terminal, `NO_COLOR` is unset and
/// `color` is true.
pub fn print_banner(color: bool) {
    let use_color =
        color && io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none();

    let mut out = io::stdout().lock();
    let _ = writeln!(out);
    for (i, line) in LOGO.iter().enumerate() {
        if use_color {
            let _ = writeln!(out, "{}{}{}", COLORS[i], line, RESET);
        } else {
            let _ = writeln!(out, "{}", line);
        }
    }
    if use_color {
        let _ = writeln!(out, "  {}Trello cards from the terminal{}", DIM, RESET);
    } else {
        let _ = writeln!(out, "  Trello cards from the terminal");
    }
    let _ = writeln!(out);
}
