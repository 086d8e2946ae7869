use super::ui;
use crate::core::calendar::{date_label, time_label};
use crate::core::holdings::in_category;
use crate::core::model::{Asset, Domain, EntityCategory};
use crate::core::numeric::SENTINEL;
use crate::core::view::AggregateView;
use crate::store::AggregateViewStore;
use comfy_table::Cell;

/// One-line provenance of a view: source and completion time.
pub fn provenance(view: &AggregateView) -> String {
    match (view.source, view.freshness) {
        (Some(source), Some(at)) => {
            let text = format!("{source}, updated {}", at.format("%H:%M:%S UTC"));
            if view.is_backup() {
                ui::style_text(&text, ui::StyleType::Warning)
            } else {
                ui::style_text(&text, ui::StyleType::Subtle)
            }
        }
        _ => ui::style_text("no data yet", ui::StyleType::Subtle),
    }
}

pub fn ticker_line(asset: &Asset, view: &AggregateView) -> String {
    match view.ticker() {
        Some(ticker) => {
            let style = if ticker.is_loss {
                ui::StyleType::Loss
            } else {
                ui::StyleType::Gain
            };
            format!(
                "{} {} {}",
                ui::style_text(asset.id(), ui::StyleType::Title),
                ticker.price,
                ui::style_text(&format!("{}%", ticker.change_percent), style)
            )
        }
        None => format!(
            "{} {}",
            ui::style_text(asset.id(), ui::StyleType::Title),
            SENTINEL
        ),
    }
}

pub fn indicator_table(view: &AggregateView) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Indicator"),
        ui::header_cell("Reading"),
        ui::header_cell("Value"),
        ui::header_cell("Decision"),
    ]);
    for indicator in view.indicators() {
        table.add_row(vec![
            Cell::new(indicator.kind.to_string()),
            Cell::new(indicator.kind.reading()),
            ui::value_cell(&indicator.value),
            ui::decision_cell(indicator.decision),
        ]);
    }
    table.to_string()
}

pub fn holdings_table(view: &AggregateView, category: EntityCategory) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell(&category.to_string()),
        ui::header_cell("Change"),
        ui::header_cell("%"),
        ui::header_cell("Streak"),
        ui::header_cell("Decision"),
    ]);
    for holding in in_category(view.holdings(), category) {
        let streak = holding
            .streak
            .as_ref()
            .map(|s| format!("{} {}", s.main_value, s.percentage).trim().to_string());
        table.add_row(vec![
            Cell::new(&holding.name),
            ui::value_cell(&holding.change.main_value),
            ui::text_cell(Some(holding.change.percentage.as_str()).filter(|p| !p.is_empty())),
            ui::text_cell(streak.as_deref()),
            ui::decision_cell(holding.change.decision),
        ]);
    }
    table.to_string()
}

pub fn calendar_table(view: &AggregateView) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Date"),
        ui::header_cell("Time"),
        ui::header_cell("Event"),
        ui::header_cell("Actual"),
        ui::header_cell("Consensus"),
        ui::header_cell("Previous"),
    ]);
    for day in view.calendar() {
        for (i, event) in day.events.iter().enumerate() {
            let date = if i == 0 { date_label(&day.date) } else { String::new() };
            table.add_row(vec![
                Cell::new(date),
                Cell::new(time_label(&event.time)),
                Cell::new(&event.event_name),
                ui::text_cell(event.actual_value.as_deref()),
                ui::text_cell(event.consensus_value.as_deref()),
                ui::text_cell(event.previous_value.as_deref()),
            ]);
        }
    }
    table.to_string()
}

pub fn signal_history_table(view: &AggregateView) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Time"),
        ui::header_cell("Signal"),
        ui::header_cell("Price"),
        ui::header_cell("Description"),
    ]);
    for entry in view.signal_history() {
        table.add_row(vec![
            Cell::new(&entry.timestamp),
            Cell::new(&entry.subtitle),
            ui::value_cell(&entry.price),
            Cell::new(&entry.description),
        ]);
    }
    table.to_string()
}

fn section(title: &str, view: &AggregateView, body: String) -> String {
    format!(
        "{} ({})\n{}\n",
        ui::style_text(title, ui::StyleType::Title),
        provenance(view),
        body
    )
}

/// Renders every tracked view of the store.
pub fn render(store: &AggregateViewStore, assets: &[Asset]) -> String {
    let mut output = String::new();

    for asset in assets {
        if let Some(view) = store.current(Domain::Ticker, Some(asset)) {
            output.push_str(&ticker_line(asset, &view));
            output.push('\n');
        }
    }
    output.push('\n');

    for asset in assets {
        if let Some(view) = store.current(Domain::Indicators, Some(asset)) {
            let title = format!("{asset} Indicators");
            output.push_str(&section(&title, &view, indicator_table(&view)));
        }
        if let Some(view) = store.current(Domain::Entities, Some(asset)) {
            for category in EntityCategory::ALL {
                let title = format!("{asset} {category}");
                output.push_str(&section(&title, &view, holdings_table(&view, category)));
            }
        }
    }

    if let Some(view) = store.current(Domain::EconomicCalendar, None) {
        output.push_str(&section("Economic Calendar", &view, calendar_table(&view)));
    }
    if let Some(view) = store.current(Domain::SignalHistory, None) {
        output.push_str(&section("Signal History", &view, signal_history_table(&view)));
    }

    output
}
