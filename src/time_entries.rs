use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::error::Error;
use crate::http::ApiClient;
use crate::models::TimeEntry;

/// Fetches time entries whose local start falls inside the inclusive date
/// range, expanded to full days in wall-clock terms.
pub fn list_time_entries(
    client: &ApiClient,
    business_id: u64,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<TimeEntry>, Error> {
    let path = format!("/timetracking/business/{business_id}/time_entries");
    client.get_paginated(
        &path,
        "time_entries",
        &[
            ("started_from", format!("{from}T00:00:00")),
            ("started_to", format!("{to}T23:59:59")),
        ],
    )
}

/// Fetches billable, not-yet-billed entries for one client.
pub fn list_unbilled_entries(
    client: &ApiClient,
    business_id: u64,
    client_id: u64,
) -> Result<Vec<TimeEntry>, Error> {
    let path = format!("/timetracking/business/{business_id}/time_entries");
    client.get_paginated(
        &path,
        "time_entries",
        &[
            ("client_id", client_id.to_string()),
            ("billed", "false".to_string()),
            ("billable", "true".to_string()),
        ],
    )
}

/// Marks each entry as billed, one update at a time in input order. Stops at
/// the first failure; already-updated entries stay updated. Returns how many
/// entries were marked and the failure, if any, so the caller can report
/// partial success.
pub fn mark_entries_billed(
    client: &ApiClient,
    business_id: u64,
    entries: &[TimeEntry],
) -> (usize, Option<Error>) {
    for (index, entry) in entries.iter().enumerate() {
        let path = format!(
            "/timetracking/business/{business_id}/time_entries/{}",
            entry.id
        );
        // The update re-asserts duration, start time and the logged flag;
        // the API rejects a bare billed flip.
        let body = json!({
            "time_entry": {
                "billed": true,
                "started_at": entry.started_at,
                "is_logged": true,
                "duration": entry.duration,
            },
        });
        if let Err(err) = client.put(&path, &body) {
            debug!(entry = entry.id, error = %err, "failed to mark entry billed");
            return (index, Some(err));
        }
    }
    (entries.len(), None)
}

pub struct CreateTimeEntry {
    pub client_id: u64,
    pub project_id: Option<u64>,
    pub service_id: Option<u64>,
    pub duration: i64,
    pub note: String,
    pub billable: bool,
    pub started_at: String,
}

#[derive(Deserialize)]
struct CreatedEntry {
    time_entry: TimeEntry,
}

/// Creates a logged time entry and returns the server's view of it.
pub fn create_time_entry(
    client: &ApiClient,
    business_id: u64,
    entry: &CreateTimeEntry,
) -> Result<TimeEntry, Error> {
    let path = format!("/timetracking/business/{business_id}/time_entries");
    let mut time_entry = json!({
        "client_id": entry.client_id,
        "duration": entry.duration,
        "note": entry.note,
        "billable": entry.billable,
        "started_at": entry.started_at,
        "is_logged": true,
    });
    if let Some(project_id) = entry.project_id {
        time_entry["project_id"] = json!(project_id);
    }
    if let Some(service_id) = entry.service_id {
        time_entry["service_id"] = json!(service_id);
    }
    let created: CreatedEntry = client.post(&path, &json!({ "time_entry": time_entry }))?;
    Ok(created.time_entry)
}

#[cfg(test)]
mod tests {
    use tokio::runtime::Runtime;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn entry(id: u64) -> TimeEntry {
        TimeEntry {
            id,
            client_id: 100,
            duration: 3600,
            started_at: "2026-02-09T09:00:00Z".to_string(),
            local_started_at: Some("2026-02-09T09:00:00".to_string()),
            note: "work".to_string(),
            billable: true,
        }
    }

    #[test]
    fn list_expands_range_to_full_days() {
        let rt = Runtime::new().unwrap();
        let server = rt.block_on(async {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path("/timetracking/business/42/time_entries"))
                .and(query_param("started_from", "2026-02-09T00:00:00"))
                .and(query_param("started_to", "2026-02-13T23:59:59"))
                .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                    "time_entries": [
                        {"id": 1, "client_id": 100, "duration": 3600,
                         "started_at": "2026-02-09T09:00:00Z", "billable": true},
                    ],
                    "meta": {"pages": 1},
                })))
                .mount(&server)
                .await;
            server
        });

        let client = ApiClient::new(server.uri(), "test-token");
        let from = NaiveDate::from_ymd_opt(2026, 2, 9).unwrap();
        let to = NaiveDate::from_ymd_opt(2026, 2, 13).unwrap();
        let entries = list_time_entries(&client, 42, from, to).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, 1);
    }

    #[test]
    fn mark_entries_billed_reports_partial_success() {
        let rt = Runtime::new().unwrap();
        let server = rt.block_on(async {
            let server = MockServer::start().await;
            Mock::given(method("PUT"))
                .and(path("/timetracking/business/42/time_entries/1"))
                .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
                .mount(&server)
                .await;
            Mock::given(method("PUT"))
                .and(path("/timetracking/business/42/time_entries/2"))
                .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
                .mount(&server)
                .await;
            server
        });

        let client = ApiClient::new(server.uri(), "test-token");
        let (marked, err) = mark_entries_billed(&client, 42, &[entry(1), entry(2), entry(3)]);
        assert_eq!(marked, 1);
        assert!(matches!(err, Some(Error::Api { status: 500, .. })));

        // The failure on entry 2 stops the sweep before entry 3.
        let requests = rt
            .block_on(server.received_requests())
            .expect("requests not recorded");
        assert_eq!(requests.len(), 2);
    }

    #[test]
    fn create_time_entry_posts_logged_entry() {
        let rt = Runtime::new().unwrap();
        let server = rt.block_on(async {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/timetracking/business/42/time_entries"))
                .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                    "time_entry": {
                        "id": 77, "client_id": 100, "duration": 1800,
                        "started_at": "2026-02-09T09:00:00Z", "note": "standup",
                        "billable": true,
                    },
                })))
                .mount(&server)
                .await;
            server
        });

        let client = ApiClient::new(server.uri(), "test-token");
        let created = create_time_entry(
            &client,
            42,
            &CreateTimeEntry {
                client_id: 100,
                project_id: None,
                service_id: None,
                duration: 1800,
                note: "standup".to_string(),
                billable: true,
                started_at: "2026-02-09T09:00:00Z".to_string(),
            },
        )
        .unwrap();
        assert_eq!(created.id, 77);
        assert_eq!(created.duration, 1800);

        let requests = rt
            .block_on(server.received_requests())
            .expect("requests not recorded");
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(body["time_entry"]["is_logged"], true);
        assert!(body["time_entry"].get("project_id").is_none());
    }

    #[test]
    fn mark_entries_billed_all_success() {
        let rt = Runtime::new().unwrap();
        let server = rt.block_on(async {
            let server = MockServer::start().await;
            Mock::given(method("PUT"))
                .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
                .mount(&server)
                .await;
            server
        });

        let client = ApiClient::new(server.uri(), "test-token");
        let (marked, err) = mark_entries_billed(&client, 42, &[entry(1), entry(2)]);
        assert_eq!(marked, 2);
        assert!(err.is_none());
    }
}
