use crate::core::model::Decision;
use crate::core::numeric::SENTINEL;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Defines different styles for text elements.
pub enum StyleType {
    Title,
    Gain,
    Loss,
    Warning,
    Subtle,
}

/// Applies a consistent style to a string.
pub fn style_text(text: &str, style_type: StyleType) -> String {
    let styled = match style_type {
        StyleType::Title => style(text).bold().underlined(),
        StyleType::Gain => style(text).green().bold(),
        StyleType::Loss => style(text).red().bold(),
        StyleType::Warning => style(text).yellow(),
        StyleType::Subtle => style(text).dim(),
    };
    styled.to_string()
}

/// Creates a new `comfy_table::Table` with standard styling.
pub fn new_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

/// Formats an optional text value. `None` and the sentinel are dimmed.
pub fn text_cell(value: Option<&str>) -> Cell {
    match value {
        Some(v) if v != SENTINEL => Cell::new(v),
        _ => Cell::new(SENTINEL).fg(Color::DarkGrey),
    }
}

pub fn value_cell(value: &str) -> Cell {
    text_cell(Some(value)).set_alignment(CellAlignment::Right)
}

/// Buy in green, Sell in red, Hold plain, Unknown dimmed.
pub fn decision_cell(decision: Decision) -> Cell {
    let cell = Cell::new(decision.to_string()).set_alignment(CellAlignment::Center);
    match decision {
        Decision::Buy => cell.fg(Color::Green).add_attribute(Attribute::Bold),
        Decision::Sell => cell.fg(Color::Red).add_attribute(Attribute::Bold),
        Decision::Hold => cell,
        Decision::Unknown => cell.fg(Color::DarkGrey),
    }
}

/// Creates a spinner shown while a refresh is in flight.
pub fn new_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed_precise}]")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    spinner.set_style(style);
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Prints a separator line matching the terminal width.
pub fn print_separator() {
    let term_width = console::Term::stdout()
        .size_checked()
        .map(|(_, w)| w as usize)
        .unwrap_or(80);
    println!("\n{}", "─".repeat(term_width));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_cell_dims_missing_values() {
        assert_eq!(text_cell(None).content(), SENTINEL);
        assert_eq!(text_cell(Some("5.50%")).content(), "5.50%");
    }

    #[test]
    fn test_decision_cell_content() {
        assert_eq!(decision_cell(Decision::Buy).content(), "Buy");
        assert_eq!(decision_cell(Decision::Unknown).content(), Decision::Unknown.to_string());
    }
}
