use ratatui::{
    style::{Color, Stylize},
    text::{Line, Span},
};

use crate::terminal::DisplayMode;

pub mod surface;

/// One-line summary shown under the terminal.
pub fn status_line(
    source: &str,
    mode: DisplayMode,
    retained: usize,
    capacity: usize,
    offset: usize,
    source_closed: bool,
) -> Line<'static> {
    let mut spans = vec![
        Span::raw(format!(" {source} ")).reversed(),
        Span::raw(format!(" {mode} ")).fg(Color::Cyan),
        Span::raw(format!("{retained}/{capacity} B ")),
        Span::raw(format!("@{offset} ")).dark_gray(),
    ];
    if source_closed {
        spans.push(Span::raw("[closed] ").red());
    }
    spans.push(Span::raw("q:quit m:mode r:reset s:save d:dump").dark_gray().italic());
    Line::from(spans)
}
