use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config;
use crate::error::Error;
use crate::http;
use crate::time_entries::{self, CreateTimeEntry};

/// A running timer, persisted beside the config file so it survives across
/// invocations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerState {
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub note: String,
    pub client_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_id: Option<u64>,
    pub billable: bool,
}

#[derive(Debug, Default)]
pub struct StartOptions {
    pub message: Option<String>,
    pub client: Option<u64>,
    pub project: Option<u64>,
    pub service: Option<u64>,
    pub no_billable: bool,
}

fn timer_path() -> Result<PathBuf, Error> {
    let dir = dirs::config_dir()
        .ok_or_else(|| Error::Config("could not locate the user config directory".to_string()))?;
    Ok(dir.join("freshlog").join("timer.json"))
}

fn load_timer_from(path: &Path) -> Result<TimerState, Error> {
    let contents =
        fs::read_to_string(path).map_err(|_| Error::Config("no timer running".to_string()))?;
    serde_json::from_str(&contents)
        .map_err(|err| Error::Config(format!("corrupt timer state: {err}")))
}

fn save_timer_to(path: &Path, state: &TimerState) -> Result<(), Error> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut json = serde_json::to_string_pretty(state)?;
    json.push('\n');
    fs::write(path, json)?;
    Ok(())
}

fn format_elapsed(elapsed: Duration) -> String {
    let hours = elapsed.num_hours();
    let minutes = elapsed.num_minutes() % 60;
    if hours > 0 {
        format!("{hours}h{minutes}m")
    } else {
        format!("{minutes}m")
    }
}

pub fn run_start(options: &StartOptions) -> Result<String, Error> {
    let path = timer_path()?;

    if let Ok(existing) = load_timer_from(&path) {
        let elapsed = Utc::now() - existing.started_at;
        return Err(Error::Config(format!(
            "timer already running (started {} ago, note: {:?}). Run `freshlog stop` first",
            format_elapsed(elapsed),
            existing.note
        )));
    }

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

    let state = TimerState {
        started_at: Utc::now(),
        note: options.message.clone().unwrap_or_default(),
        client_id,
        project_id: options.project.or(project_config.project_id),
        service_id: options.service.or(project_config.service_id),
        billable: !options.no_billable,
    };
    save_timer_to(&path, &state)?;

    if state.note.is_empty() {
        Ok("Timer started".to_string())
    } else {
        Ok(format!("Timer started: {}", state.note))
    }
}

pub fn run_stop(message_override: Option<&str>) -> Result<String, Error> {
    let path = timer_path()?;
    let state = load_timer_from(&path)?;

    let elapsed = Utc::now() - state.started_at;
    // Anything shorter than a minute still books a minute.
    let seconds = elapsed.num_seconds().max(60);

    let note = match message_override {
        Some(message) if !message.is_empty() => message.to_string(),
        _ => state.note.clone(),
    };

    let cfg = config::load()?;
    let client = http::api_client(&cfg);
    let entry = time_entries::create_time_entry(
        &client,
        cfg.business_id,
        &CreateTimeEntry {
            client_id: state.client_id,
            project_id: state.project_id,
            service_id: state.service_id,
            duration: seconds,
            note: note.clone(),
            billable: state.billable,
            started_at: state.started_at.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        },
    )?;

    if let Err(err) = fs::remove_file(&path) {
        warn!(error = %err, "failed to clear timer state");
    }

    let hours = seconds as f64 / 3600.0;
    Ok(format!("Stopped. Logged {hours:.2}h: {note} (entry #{})", entry.id))
}

pub fn run_timer_status() -> Result<String, Error> {
    let path = timer_path()?;
    let Ok(state) = load_timer_from(&path) else {
        return Ok("No timer running.".to_string());
    };

    let elapsed = Utc::now() - state.started_at;
    let mut lines = vec![format!("Timer running: {}", format_elapsed(elapsed))];
    if !state.note.is_empty() {
        lines.push(format!("Note: {}", state.note));
    }
    lines.push(format!("Client: {}", state.client_id));
    if let Some(project_id) = state.project_id {
        lines.push(format!("Project: {project_id}"));
    }
    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timer_state_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("timer.json");
        let state = TimerState {
            started_at: "2026-02-09T09:00:00Z".parse().unwrap(),
            note: "deep work".to_string(),
            client_id: 100,
            project_id: Some(7),
            service_id: None,
            billable: true,
        };

        save_timer_to(&path, &state).unwrap();
        let loaded = load_timer_from(&path).unwrap();

        assert_eq!(loaded.started_at, state.started_at);
        assert_eq!(loaded.note, "deep work");
        assert_eq!(loaded.client_id, 100);
        assert_eq!(loaded.project_id, Some(7));
        assert!(loaded.billable);
    }

    #[test]
    fn load_timer_missing_file_means_not_running() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_timer_from(&dir.path().join("timer.json")).unwrap_err();
        match err {
            Error::Config(message) => assert_eq!(message, "no timer running"),
            other => panic!("expected Config error, got {other:?}"),
        }
    }

    #[test]
    fn corrupt_timer_state_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("timer.json");
        fs::write(&path, "{not json").unwrap();
        let err = load_timer_from(&path).unwrap_err();
        match err {
            Error::Config(message) => assert!(message.contains("corrupt timer state")),
            other => panic!("expected Config error, got {other:?}"),
        }
    }

    #[test]
    fn format_elapsed_prints_hours_and_minutes() {
        assert_eq!(format_elapsed(Duration::minutes(5)), "5m");
        assert_eq!(format_elapsed(Duration::minutes(65)), "1h5m");
        assert_eq!(format_elapsed(Duration::hours(2)), "2h0m");
    }
}
