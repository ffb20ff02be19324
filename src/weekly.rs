use std::collections::HashMap;
use std::thread;

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, NaiveDateTime};

use crate::clients;
use crate::config::Config;
use crate::error::Error;
use crate::format::{ClientSummary, WeeklySummary};
use crate::http::ApiClient;
use crate::models::TimeEntry;
use crate::time_entries;

/// Monday-to-Friday window containing the reference date. A Sunday belongs
/// to the week that ended the day before.
pub fn week_range(reference: NaiveDate) -> (NaiveDate, NaiveDate) {
    let monday = reference - Duration::days(reference.weekday().num_days_from_monday() as i64);
    (monday, monday + Duration::days(4))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Calendar date an entry belongs to, in local wall-clock terms. Prefers the
/// timezone-naive local timestamp; entries without one fall back to the UTC
/// timestamp.
fn entry_local_date(entry: &TimeEntry) -> Option<NaiveDate> {
    let raw = match entry.local_started_at.as_deref() {
        Some(local) if !local.is_empty() => local,
        _ => entry.started_at.as_str(),
    };
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .map(|dt| dt.date())
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.date_naive()))
        .ok()
}

/// Buckets entries into per-client daily hours for the week starting at
/// `week_start`. Weekend entries are dropped; hours are rounded to 2
/// decimals per bucket, and totals are sums of already-rounded values.
pub fn build_summary(
    entries: &[TimeEntry],
    client_names: &HashMap<u64, String>,
    week_start: NaiveDate,
) -> WeeklySummary {
    let week_end = week_start + Duration::days(4);

    let mut by_client: HashMap<u64, [i64; 5]> = HashMap::new();
    for entry in entries {
        let Some(date) = entry_local_date(entry) else {
            continue;
        };
        let day_index = date.weekday().num_days_from_monday() as usize;
        if day_index > 4 {
            continue;
        }
        by_client.entry(entry.client_id).or_default()[day_index] += entry.duration;
    }

    let mut clients: Vec<ClientSummary> = by_client
        .into_iter()
        .map(|(client_id, seconds)| {
            let mut daily = [0.0; 5];
            for (slot, &secs) in daily.iter_mut().zip(seconds.iter()) {
                *slot = round2(secs as f64 / 3600.0);
            }
            let total = round2(daily.iter().sum());
            let name = client_names
                .get(&client_id)
                .cloned()
                .unwrap_or_else(|| format!("Client #{client_id}"));
            ClientSummary { name, daily, total }
        })
        .collect();
    clients.sort_by_key(|client| client.name.to_lowercase());

    let grand_total = round2(clients.iter().map(|client| client.total).sum());

    WeeklySummary {
        week_start: week_start.format("%Y-%m-%d").to_string(),
        week_end: week_end.format("%Y-%m-%d").to_string(),
        clients,
        grand_total,
    }
}

/// Runs the weekly report: the week's entries and the client name map are
/// fetched concurrently, then aggregated.
pub fn run_weekly(
    client: &ApiClient,
    cfg: &Config,
    week_of: Option<NaiveDate>,
) -> Result<WeeklySummary, Error> {
    let reference = week_of.unwrap_or_else(|| Local::now().date_naive());
    let (week_start, week_end) = week_range(reference);

    let (entries, names) = thread::scope(|scope| {
        let entries = scope.spawn(|| {
            time_entries::list_time_entries(client, cfg.business_id, week_start, week_end)
        });
        let names = scope.spawn(|| clients::list_clients(client, &cfg.account_id));
        (
            entries.join().expect("time entry fetch panicked"),
            names.join().expect("client fetch panicked"),
        )
    });

    Ok(build_summary(&entries?, &names?, week_start))
}
