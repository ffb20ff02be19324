use std::env;
use std::io::{self, Write};

use reqwest::Url;
use reqwest::blocking::Client;

use crate::config::{self, Config};
use crate::error::Error;
use crate::http::{self, ApiClient, TokenPair};
use crate::identity;

const AUTHORIZE_URL: &str = "https://auth.freshbooks.com/service/auth/oauth/authorize";
const REDIRECT_URI: &str = "https://localhost:8457/callback";

/// Exchanges an authorization code for a token pair.
pub fn exchange_code(
    base_url: &str,
    client_id: &str,
    client_secret: &str,
    code: &str,
) -> Result<TokenPair, Error> {
    let payload = serde_json::json!({
        "grant_type": "authorization_code",
        "client_id": client_id,
        "client_secret": client_secret,
        "code": code,
        "redirect_uri": REDIRECT_URI,
    });

    let response = Client::new()
        .post(format!("{base_url}/auth/oauth/token"))
        .json(&payload)
        .send()?;
    let status = response.status();
    let body = response.text()?;
    if !status.is_success() {
        return Err(Error::Config(format!(
            "token exchange failed ({}): {body}",
            status.as_u16()
        )));
    }
    Ok(serde_json::from_str(&body)?)
}

/// Pulls the authorization code out of whatever the user pasted: the bare
/// code, or the full redirect URL with a `code` query parameter.
fn extract_code(input: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    if input.starts_with("http") {
        let url = Url::parse(input).ok()?;
        return url
            .query_pairs()
            .find(|(key, _)| key == "code")
            .map(|(_, value)| value.into_owned());
    }
    Some(input.to_string())
}

/// Interactive OAuth bootstrap: prints the authorization link, reads the
/// pasted redirect, exchanges the code, verifies the token against the
/// identity endpoint and writes the config.
pub fn run_setup() -> Result<(), Error> {
    let client_id = env::var("FRESHBOOKS_CLIENT_ID").unwrap_or_default();
    let client_secret = env::var("FRESHBOOKS_CLIENT_SECRET").unwrap_or_default();
    if client_id.is_empty() || client_secret.is_empty() {
        return Err(Error::Config(
            "missing FRESHBOOKS_CLIENT_ID or FRESHBOOKS_CLIENT_SECRET environment variables"
                .to_string(),
        ));
    }

    let auth_url = Url::parse_with_params(
        AUTHORIZE_URL,
        &[
            ("client_id", client_id.as_str()),
            ("response_type", "code"),
            ("redirect_uri", REDIRECT_URI),
        ],
    )
    .map_err(|err| Error::Config(format!("failed to build authorization URL: {err}")))?;

    println!("Open this link to authorize freshlog:\n");
    println!("  {auth_url}\n");
    println!("After approving, the browser is sent to {REDIRECT_URI}.");
    print!("Paste the full redirect URL (or just the code): ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let code = extract_code(&input)
        .ok_or_else(|| Error::Config("no authorization code received".to_string()))?;

    println!("Exchanging code for token...");
    let tokens = exchange_code(http::BASE_URL, &client_id, &client_secret, &code)?;

    println!("Verifying token...");
    let client = ApiClient::new(http::BASE_URL, &tokens.access_token);
    let identity = identity::get_identity(&client).map_err(|err| match err {
        Error::Unauthorized { .. } => {
            Error::Config("invalid token. Please check your access token".to_string())
        }
        other => other,
    })?;

    // Re-running setup rotates credentials but keeps billing settings.
    let previous = config::load().ok();
    let cfg = Config {
        access_token: tokens.access_token,
        refresh_token: Some(tokens.refresh_token),
        account_id: identity.account_id.clone(),
        business_id: identity.business_id,
        client_rates: previous
            .as_ref()
            .map(|p| p.client_rates.clone())
            .unwrap_or_default(),
        default_currency: previous.as_ref().and_then(|p| p.default_currency.clone()),
        invoice_status: previous.map(|p| p.invoice_status).unwrap_or_default(),
    };
    config::save(&cfg)?;

    println!();
    println!("Setup complete.");
    println!("  Account:  {}", identity.account_id);
    println!("  Business: {}", identity.business_id);
    println!("  Config:   {}", config::path()?.display());
    Ok(())
}

/// Rotates the OAuth tokens. Cron-friendly: prints nothing on success.
pub fn run_refresh() -> Result<(), Error> {
    let cfg = config::load()?;
    let Some(refresh_token) = cfg.refresh_token.as_deref() else {
        return Err(Error::Config(
            "no refresh token in config. Run `freshlog setup` first".to_string(),
        ));
    };

    let tokens = http::refresh_access_token(http::BASE_URL, refresh_token)?;

    let mut updated = cfg.clone();
    updated.access_token = tokens.access_token;
    updated.refresh_token = Some(tokens.refresh_token);
    config::save(&updated)
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tokio::runtime::Runtime;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[test]
    fn extract_code_accepts_bare_code() {
        assert_eq!(extract_code("abc123\n").as_deref(), Some("abc123"));
    }

    #[test]
    fn extract_code_parses_redirect_url() {
        let input = "https://localhost:8457/callback?code=abc123&state=xyz";
        assert_eq!(extract_code(input).as_deref(), Some("abc123"));
    }

    #[test]
    fn extract_code_rejects_empty_and_codeless_input() {
        assert_eq!(extract_code("   \n"), None);
        assert_eq!(extract_code("https://localhost:8457/callback?error=denied"), None);
    }

    #[test]
    fn exchange_code_posts_authorization_grant() {
        let rt = Runtime::new().unwrap();
        let server = rt.block_on(async {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/auth/oauth/token"))
                .and(body_partial_json(json!({
                    "grant_type": "authorization_code",
                    "code": "abc123",
                })))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "access_token": "new-access",
                    "refresh_token": "new-refresh",
                })))
                .mount(&server)
                .await;
            server
        });

        let tokens = exchange_code(&server.uri(), "id", "secret", "abc123").unwrap();
        assert_eq!(tokens.access_token, "new-access");
        assert_eq!(tokens.refresh_token, "new-refresh");
    }

    #[test]
    fn exchange_code_failure_is_actionable() {
        let rt = Runtime::new().unwrap();
        let server = rt.block_on(async {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .respond_with(ResponseTemplate::new(400).set_body_string("bad grant"))
                .mount(&server)
                .await;
            server
        });

        let err = exchange_code(&server.uri(), "id", "secret", "bad").unwrap_err();
        match err {
            Error::Config(message) => {
                assert!(message.contains("token exchange failed (400)"));
                assert!(message.contains("bad grant"));
            }
            other => panic!("expected Config error, got {other:?}"),
        }
    }
}
