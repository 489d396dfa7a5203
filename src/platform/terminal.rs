//! Terminal capability probes.

use std::env;

#[cfg(unix)]
use libc::{self, c_int};

/// Terminal column count from the stdout window size, then `COLUMNS`.
pub fn terminal_columns() -> Option<usize> {
    #[cfg(unix)]
    {
        if let Some((cols, _)) = read_winsize(libc::STDOUT_FILENO) {
            return Some(usize::from(cols));
        }
    }
    columns_from(|key| env::var(key).ok())
}

fn columns_from(lookup: impl Fn(&str) -> Option<String>) -> Option<usize> {
    lookup("COLUMNS")
        .and_then(|value| value.trim().parse::<usize>().ok())
        .filter(|cols| *cols > 0)
}

#[cfg(unix)]
fn read_winsize(fd: c_int) -> Option<(u16, u16)> {
    let mut size = libc::winsize {
        ws_row: 0,
        ws_col: 0,
        ws_xpixel: 0,
        ws_ypixel: 0,
    };
    let result = unsafe { libc::ioctl(fd, libc::TIOCGWINSZ, &mut size) };
    if result == 0 && size.ws_col > 0 && size.ws_row > 0 {
        Some((size.ws_col, size.ws_row))
    } else {
        None
    }
}

/// Whether the terminal advertises OSC-8 hyperlink support.
pub fn supports_hyperlinks() -> bool {
    hyperlinks_from(|key| env::var(key).ok())
}

const HYPERLINK_PROGRAMS: &[&str] = &["iTerm.app", "WezTerm", "vscode", "ghostty", "Hyper"];
const HYPERLINK_MARKERS: &[&str] = &["WT_SESSION", "KITTY_WINDOW_ID", "KONSOLE_VERSION", "DOMTERM"];
const MIN_VTE_VERSION: u32 = 5000;

fn hyperlinks_from(lookup: impl Fn(&str) -> Option<String>) -> bool {
    if lookup("TERM").as_deref() == Some("dumb") {
        return false;
    }
    if lookup("FORCE_HYPERLINK").as_deref() == Some("1") {
        return true;
    }
    let program = lookup("TERM_PROGRAM");
    if program.is_some_and(|program| HYPERLINK_PROGRAMS.contains(&program.as_str())) {
        return true;
    }
    if HYPERLINK_MARKERS.iter().any(|key| lookup(key).is_some()) {
        return true;
    }
    lookup("VTE_VERSION")
        .and_then(|version| version.trim().parse::<u32>().ok())
        .is_some_and(|version| version >= MIN_VTE_VERSION)
}
