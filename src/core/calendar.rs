use crate::core::model::{CalendarDay, EconomicEvent};
use chrono::NaiveDate;

/// Groups events under their date. Dates appear in first-seen order and the
/// events of a date keep the order the provider gave them.
pub fn group_by_date(events: &[EconomicEvent]) -> Vec<CalendarDay> {
    let mut days: Vec<CalendarDay> = Vec::new();
    for event in events {
        match days.iter_mut().find(|day| day.date == event.date) {
            Some(day) => day.events.push(event.clone()),
            None => days.push(CalendarDay {
                date: event.date.clone(),
                events: vec![event.clone()],
            }),
        }
    }
    days
}

/// `2025-04-04` becomes `Friday, Apr 4`. Unparseable dates are shown as given.
pub fn date_label(date: &str) -> String {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map(|d| d.format("%A, %b %-d").to_string())
        .unwrap_or_else(|_| date.to_string())
}

/// Trims a `HH:MM:SS` release time to `HH:MM`.
pub fn time_label(time: &str) -> String {
    let mut parts = time.trim().splitn(3, ':');
    match (parts.next(), parts.next()) {
        (Some(hours), Some(minutes)) => format!("{hours}:{minutes}"),
        _ => time.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(date: &str, name: &str) -> EconomicEvent {
        EconomicEvent {
            date: date.to_string(),
            time: "12:30:00".to_string(),
            event_name: name.to_string(),
            actual_value: None,
            consensus_value: Some("4.1%".to_string()),
            previous_value: Some("4.0%".to_string()),
            forecast_value: None,
        }
    }

    #[test]
    fn test_same_date_events_share_one_header() {
        let events = vec![
            event("2025-04-04", "Non Farm Payrolls"),
            event("2025-04-04", "Unemployment Rate"),
        ];
        let days = group_by_date(&events);
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].date, "2025-04-04");
        let names: Vec<_> = days[0].events.iter().map(|e| e.event_name.as_str()).collect();
        assert_eq!(names, vec!["Non Farm Payrolls", "Unemployment Rate"]);
    }

    #[test]
    fn test_dates_keep_first_seen_order() {
        let events = vec![
            event("2025-04-10", "CPI YoY"),
            event("2025-04-02", "ISM Manufacturing PMI"),
            event("2025-04-10", "Core Inflation Rate YoY"),
        ];
        let days = group_by_date(&events);
        let dates: Vec<_> = days.iter().map(|d| d.date.as_str()).collect();
        assert_eq!(dates, vec!["2025-04-10", "2025-04-02"]);
        assert_eq!(days[0].events.len(), 2);
        assert!(group_by_date(&[]).is_empty());
    }

    #[test]
    fn test_labels() {
        assert_eq!(date_label("2025-04-04"), "Friday, Apr 4");
        assert_eq!(date_label("next week"), "next week");
        assert_eq!(time_label("08:30:00"), "08:30");
        assert_eq!(time_label("All Day"), "All Day");
    }
}
