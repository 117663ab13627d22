//! Table styling and terminal sizing for text output.

use tabled::Table;
use tabled::settings::Style;

use crate::cli::StyleMode;

/// Narrowest temperature bar drawn in a history chart.
pub const MIN_BAR_WIDTH: usize = 10;

/// Widest temperature bar drawn in a history chart.
pub const MAX_BAR_WIDTH: usize = 60;

/// Columns taken by the chart's time, temperature and humidity cells plus borders.
const CHART_RESERVED_WIDTH: usize = 52;

/// Get terminal width, defaulting to 80 if detection fails.
pub fn terminal_width() -> usize {
    terminal_size::terminal_size()
        .map(|(w, _)| w.0 as usize)
        .unwrap_or(80)
}

/// Bar width that lets a history chart row fit in `term_width` columns.
pub fn chart_bar_width(term_width: usize) -> usize {
    term_width
        .saturating_sub(CHART_RESERVED_WIDTH)
        .clamp(MIN_BAR_WIDTH, MAX_BAR_WIDTH)
}

/// Apply the border style for the given mode.
pub fn apply_table_style(table: &mut Table, style: StyleMode) {
    match style {
        StyleMode::Rich => {
            table.with(Style::rounded());
        }
        StyleMode::Plain => {
            table.with(Style::blank());
        }
    }
}
