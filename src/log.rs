use chrono::Utc;

use crate::config;
use crate::error::Error;
use crate::http;
use crate::time_entries::{self, CreateTimeEntry};

#[derive(Debug)]
pub struct LogOptions {
    pub message: String,
    pub duration: String,
    pub client: Option<u64>,
    pub project: Option<u64>,
    pub service: Option<u64>,
    pub no_billable: bool,
}

/// Parses a human-friendly duration like "2h", "30m" or "1h30m" into
/// seconds.
pub fn parse_duration(value: &str) -> Result<i64, Error> {
    let invalid = || {
        Error::Config(format!(
            "invalid duration {value:?} (expected format: 2h, 30m, 1h30m)"
        ))
    };

    let mut rest = value.trim();
    if rest.is_empty() {
        return Err(invalid());
    }

    let mut seconds: i64 = 0;
    if let Some((hours, tail)) = rest.split_once('h') {
        seconds += hours.parse::<i64>().map_err(|_| invalid())? * 3600;
        rest = tail;
    }
    if !rest.is_empty() {
        let minutes = rest.strip_suffix('m').ok_or_else(invalid)?;
        seconds += minutes.parse::<i64>().map_err(|_| invalid())? * 60;
    }
    if seconds <= 0 {
        return Err(invalid());
    }
    Ok(seconds)
}

/// Creates a logged time entry right now, with defaults pulled from the
/// working directory's `.freshlog.json`.
pub fn run_log(options: &LogOptions) -> Result<String, Error> {
    let cfg = config::load()?;

    let project_config = config::load_project_config_from_cwd().unwrap_or_default();
    let client_id = options
        .client
        .or(project_config.client_id)
        .ok_or_else(|| {
            Error::Config(
                "no client specified. Use --client or run `freshlog init` to create .freshlog.json"
                    .to_string(),
            )
        })?;

    let seconds = parse_duration(&options.duration)?;

    let client = http::api_client(&cfg);
    let entry = time_entries::create_time_entry(
        &client,
        cfg.business_id,
        &CreateTimeEntry {
            client_id,
            project_id: options.project.or(project_config.project_id),
            service_id: options.service.or(project_config.service_id),
            duration: seconds,
            note: options.message.clone(),
            billable: !options.no_billable,
            started_at: Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        },
    )?;

    let hours = seconds as f64 / 3600.0;
    Ok(format!(
        "Logged {hours:.2}h: {} (entry #{})",
        options.message, entry.id
    ))
}
