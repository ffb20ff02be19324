use std::env;
use std::sync::Mutex;

use reqwest::Method;
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::config::{self, Config};
use crate::error::Error;

pub const BASE_URL: &str = "https://api.freshbooks.com";

const PER_PAGE: u32 = 100;

/// Access and refresh tokens as returned by the OAuth token endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Callback invoked on the first 401 of a request. Returns a fresh access
/// token; persisting the rotated credentials is the callback's job.
pub type RefreshFn = Box<dyn Fn() -> Result<String, Error> + Send + Sync>;

pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Mutex<String>,
    refresh: Option<RefreshFn>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        let client = Client::builder()
            .user_agent("freshlog")
            .build()
            .expect("Failed to build HTTP client");
        Self {
            client,
            base_url: base_url.into(),
            token: Mutex::new(token.into()),
            refresh: None,
        }
    }

    pub fn set_refresh(&mut self, refresh: RefreshFn) {
        self.refresh = Some(refresh);
    }

    pub fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, Error> {
        let body = self.send(Method::GET, path, params, None)?;
        Ok(serde_json::from_str(&body)?)
    }

    pub fn post<T: DeserializeOwned>(&self, path: &str, body: &impl Serialize) -> Result<T, Error> {
        let payload = serde_json::to_value(body)?;
        let body = self.send(Method::POST, path, &[], Some(&payload))?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Unary update. The response body is not interesting to any caller, so
    /// it is discarded after status classification.
    pub fn put(&self, path: &str, body: &impl Serialize) -> Result<(), Error> {
        let payload = serde_json::to_value(body)?;
        self.send(Method::PUT, path, &[], Some(&payload))?;
        Ok(())
    }

    /// Fetches every page of a list endpoint and concatenates the items.
    ///
    /// The API answers list requests with one of two envelopes:
    /// - timetracking: `{ <key>: [...], meta: { pages: N } }`
    /// - accounting:   `{ response: { result: { <key>: [...], pages: N } } }`
    ///
    /// Pages are fetched one at a time; items that fail to decode are
    /// skipped.
    pub fn get_paginated<T: DeserializeOwned>(
        &self,
        path: &str,
        result_key: &str,
        params: &[(&str, String)],
    ) -> Result<Vec<T>, Error> {
        let mut all = Vec::new();
        let mut page: u64 = 1;
        let mut total_pages: u64 = 1;

        while page <= total_pages {
            let mut page_params: Vec<(&str, String)> = params.to_vec();
            page_params.push(("page", page.to_string()));
            page_params.push(("per_page", PER_PAGE.to_string()));

            let data: Value = self.get(path, &page_params)?;
            let (items, pages) = extract_page(&data, result_key);
            debug!(path, page, pages, items = items.len(), "fetched page");

            for item in items {
                match serde_json::from_value::<T>(item) {
                    Ok(value) => all.push(value),
                    Err(err) => debug!(path, error = %err, "skipping undecodable item"),
                }
            }

            if pages > 0 {
                total_pages = pages;
            }
            page += 1;
        }

        Ok(all)
    }

    fn send(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<String, Error> {
        let url = format!("{}{}", self.base_url, path);
        let mut attempt = 0;

        loop {
            let token = self.token.lock().expect("token lock poisoned").clone();
            let mut request = self
                .client
                .request(method.clone(), &url)
                .header("Authorization", format!("Bearer {token}"))
                .header("Content-Type", "application/json");
            if !params.is_empty() {
                request = request.query(params);
            }
            if let Some(body) = body {
                request = request.json(body);
            }

            debug!(%method, path, attempt, "sending request");
            let response = request.send()?;
            let status = response.status();
            let text = response.text()?;
            debug!(%method, path, status = status.as_u16(), "received response");

            if status.as_u16() == 401 {
                if attempt == 0 {
                    if let Some(refresh) = &self.refresh {
                        debug!("access token rejected, refreshing");
                        match refresh() {
                            Ok(new_token) => {
                                *self.token.lock().expect("token lock poisoned") = new_token;
                                attempt += 1;
                                continue;
                            }
                            Err(err) => {
                                debug!(error = %err, "token refresh failed");
                                return Err(Error::session_expired());
                            }
                        }
                    }
                }
                return Err(Error::Unauthorized { body: text });
            }

            if !status.is_success() {
                return Err(Error::Api {
                    status: status.as_u16(),
                    status_text: status.canonical_reason().unwrap_or("").to_string(),
                    body: text,
                });
            }

            return Ok(text);
        }
    }
}

/// Creates an [`ApiClient`] wired with config-aware token refresh: on 401
/// the refresh token is exchanged and the rotated credentials are written
/// back through the config module.
pub fn api_client(cfg: &Config) -> ApiClient {
    let mut client = ApiClient::new(BASE_URL, &cfg.access_token);
    let refresh_token = cfg.refresh_token.clone();
    let snapshot = cfg.clone();
    client.set_refresh(Box::new(move || {
        let Some(token) = refresh_token.as_deref() else {
            return Err(Error::Config(
                "no refresh token available. Run `freshlog setup` to re-authenticate".to_string(),
            ));
        };
        let tokens = refresh_access_token(BASE_URL, token)?;
        let mut updated = snapshot.clone();
        updated.access_token = tokens.access_token.clone();
        updated.refresh_token = Some(tokens.refresh_token);
        config::save(&updated)?;
        Ok(tokens.access_token)
    }));
    client
}

/// Exchanges a refresh token for a new token pair.
pub fn refresh_access_token(base_url: &str, refresh_token: &str) -> Result<TokenPair, Error> {
    let payload = serde_json::json!({
        "grant_type": "refresh_token",
        "client_id": env::var("FRESHBOOKS_CLIENT_ID").unwrap_or_default(),
        "client_secret": env::var("FRESHBOOKS_CLIENT_SECRET").unwrap_or_default(),
        "refresh_token": refresh_token,
    });

    let response = Client::new()
        .post(format!("{base_url}/auth/oauth/token"))
        .json(&payload)
        .send()?;
    let status = response.status();
    let body = response.text()?;
    if !status.is_success() {
        return Err(Error::Api {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or("").to_string(),
            body,
        });
    }
    Ok(serde_json::from_str(&body)?)
}

fn extract_page(data: &Value, key: &str) -> (Vec<Value>, u64) {
    // Top-level shape (timetracking).
    if let Some(items) = data.get(key).and_then(Value::as_array) {
        let pages = data
            .get("meta")
            .and_then(|meta| meta.get("pages"))
            .and_then(Value::as_u64)
            .unwrap_or(1);
        return (items.clone(), pages);
    }

    // Nested shape (accounting).
    let result = data.get("response").and_then(|resp| resp.get("result"));
    let items = result
        .and_then(|result| result.get(key))
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    let pages = result
        .and_then(|result| result.get("pages"))
        .and_then(Value::as_u64)
        .unwrap_or(1);
    (items, pages)
}
