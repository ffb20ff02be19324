use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklySummary {
    pub week_start: String,
    pub week_end: String,
    pub clients: Vec<ClientSummary>,
    pub grand_total: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientSummary {
    pub name: String,
    pub daily: [f64; 5],
    pub total: f64,
}

const DAY_HEADERS: [&str; 5] = ["Mon", "Tue", "Wed", "Thu", "Fri"];
const COL_WIDTH: usize = 6;
const NAME_WIDTH: usize = 20;

fn format_hours(hours: f64) -> String {
    if hours == 0.0 {
        return "—".to_string();
    }
    format!("{hours:.1}")
}

fn format_date_range(start: &str, end: &str) -> String {
    let parse = |value: &str| NaiveDate::parse_from_str(value, "%Y-%m-%d");
    match (parse(start), parse(end)) {
        (Ok(start), Ok(end)) => format!(
            "{} {} – {} {}, {}",
            start.format("%b"),
            start.format("%-d"),
            end.format("%b"),
            end.format("%-d"),
            end.format("%Y"),
        ),
        _ => format!("{start} – {end}"),
    }
}

/// Renders the summary as a fixed-width text table.
pub fn table(summary: &WeeklySummary) -> String {
    let mut lines = Vec::new();

    lines.push(format!(
        "Week of {}",
        format_date_range(&summary.week_start, &summary.week_end)
    ));
    lines.push(String::new());

    let mut header = format!("{:<NAME_WIDTH$}", "Client");
    for day in DAY_HEADERS {
        header.push_str(&format!("{day:>COL_WIDTH$}"));
    }
    header.push_str("  Total");
    let separator = "─".repeat(header.chars().count());
    lines.push(header);
    lines.push(separator.clone());

    for client in &summary.clients {
        let name: String = client.name.chars().take(NAME_WIDTH).collect();
        let mut row = format!("{name:<NAME_WIDTH$}");
        for hours in client.daily {
            row.push_str(&format!("{:>COL_WIDTH$}", format_hours(hours)));
        }
        row.push_str(&format!("{:>width$}h", format_hours(client.total), width = COL_WIDTH + 1));
        lines.push(row);
    }

    lines.push(separator);

    let mut daily_totals = [0.0; 5];
    for client in &summary.clients {
        for (total, hours) in daily_totals.iter_mut().zip(client.daily.iter()) {
            *total += hours;
        }
    }
    let mut totals = format!("{:<NAME_WIDTH$}", "Total");
    for hours in daily_totals {
        totals.push_str(&format!("{:>COL_WIDTH$}", format_hours(hours)));
    }
    totals.push_str(&format!("{:>width$}h", format_hours(summary.grand_total), width = COL_WIDTH + 1));
    lines.push(totals);

    lines.join("\n")
}

/// Renders the summary as indented JSON.
pub fn json(summary: &WeeklySummary) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(summary)
}
