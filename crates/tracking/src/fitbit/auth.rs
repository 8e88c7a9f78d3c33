//! Fitbit OAuth2 authentication
//!
//! Implements the OAuth2 authorization code flow for the Fitbit Web API.
//! Uses a local HTTP server on the redirect URI's port to receive the
//! callback, and synchronous HTTP (ureq) to be executor-agnostic.

use anyhow::{Context, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::path::PathBuf;
use url::Url;

use crate::config::FitbitCredentials;
use crate::sync::FetchError;

/// OAuth2 configuration and token management for Fitbit
pub struct FitbitAuth {
    credentials: FitbitCredentials,
    token_path: PathBuf,
}

/// Stored token data
#[derive(Debug, Serialize, Deserialize)]
struct StoredToken {
    access_token: String,
    refresh_token: Option<String>,
    expires_at: Option<i64>,
}

/// Token response from Fitbit
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: Option<u64>,
}

/// Seconds before expiry at which a token is refreshed
const EXPIRY_MARGIN_SECS: i64 = 300;

impl FitbitAuth {
    /// Fitbit OAuth2 endpoints
    const AUTH_URL: &'static str = "https://www.fitbit.com/oauth2/authorize";
    const TOKEN_URL: &'static str = "https://api.fitbit.com/oauth2/token";

    /// Scopes needed for the synced metrics
    const SCOPES: &'static str = "activity heartrate sleep weight";

    /// Create a new FitbitAuth storing tokens in the Daybook config directory
    pub fn new(credentials: FitbitCredentials) -> Result<Self> {
        let token_path = Self::default_token_path()?;
        Ok(Self::with_token_path(credentials, token_path))
    }

    /// Create a new FitbitAuth storing tokens at `token_path`
    pub fn with_token_path(credentials: FitbitCredentials, token_path: PathBuf) -> Self {
        Self {
            credentials,
            token_path,
        }
    }

    /// Get the default token storage path (~/.config/daybook/fitbit-tokens.json)
    fn default_token_path() -> Result<PathBuf> {
        config::config_path("fitbit-tokens.json").context("Could not determine config directory")
    }

    /// Authorization URL the user is sent to
    pub fn authorize_url(&self, state: &str) -> String {
        format!(
            "{}?response_type=code&client_id={}&redirect_uri={}&scope={}&state={}",
            Self::AUTH_URL,
            urlencoding::encode(&self.credentials.client_id),
            urlencoding::encode(&self.credentials.redirect_uri),
            urlencoding::encode(Self::SCOPES),
            urlencoding::encode(state),
        )
    }

    /// Get a valid access token, refreshing it if it is about to expire.
    ///
    /// Never starts the interactive flow; without a usable token this
    /// fails with [`FetchError::NotAuthenticated`].
    pub fn access_token(&self) -> Result<String, FetchError> {
        let token = self.load_token().map_err(|e| {
            debug!("No usable Fitbit token: {:#}", e);
            FetchError::NotAuthenticated
        })?;

        if token_fresh(token.expires_at, chrono::Utc::now().timestamp()) {
            return Ok(token.access_token);
        }

        let refresh_token = token.refresh_token.ok_or(FetchError::NotAuthenticated)?;
        let new_token = self.refresh_access_token(&refresh_token)?;
        self.store_refreshed_token(new_token)
    }

    /// Persist a refreshed token and hand back its access token.
    ///
    /// Fitbit refresh tokens are single-use, so once a refresh succeeds the
    /// stored token is dead. If the new one cannot be written the session
    /// is lost and the caller is told to log in again.
    fn store_refreshed_token(&self, token: TokenResponse) -> Result<String, FetchError> {
        if let Err(e) = self.save_token_response(&token) {
            error!(
                "Failed to store refreshed Fitbit token, run `daybook login` again: {:#}",
                e
            );
            return Err(FetchError::NotAuthenticated);
        }
        info!("Refreshed Fitbit access token");
        Ok(token.access_token)
    }

    /// Run the interactive authorization code flow and store the tokens
    pub fn login(&self) -> Result<()> {
        // Step 1: Listen on the port the redirect URI points at
        let redirect = Url::parse(&self.credentials.redirect_uri)
            .with_context(|| format!("Invalid redirect URI {}", self.credentials.redirect_uri))?;
        let port = redirect
            .port_or_known_default()
            .context("Redirect URI has no port")?;
        let listener = TcpListener::bind(("127.0.0.1", port))
            .with_context(|| format!("Could not listen on port {} for the OAuth callback", port))?;

        // Step 2: Send the user to the authorization page
        let state = oauth_state();
        let auth_url = self.authorize_url(&state);

        println!("\n=== Fitbit Authentication Required ===");
        println!("Opening browser for authentication...");
        println!("If the browser doesn't open, visit: {}", auth_url);

        if let Err(e) = open::that(&auth_url) {
            eprintln!("Failed to open browser: {}. Please open the URL manually.", e);
        }

        // Step 3: Wait for callback with authorization code
        println!("Waiting for authorization...");
        let code = self.wait_for_callback(listener, &state)?;

        // Step 4: Exchange code for tokens
        println!("Exchanging authorization code for tokens...");
        let mut response = ureq::post(Self::TOKEN_URL)
            .header("Authorization", &self.basic_auth_header())
            .send_form([
                ("client_id", self.credentials.client_id.as_str()),
                ("code", code.as_str()),
                ("grant_type", "authorization_code"),
                ("redirect_uri", self.credentials.redirect_uri.as_str()),
            ])
            .context("Failed to exchange authorization code")?;

        let token: TokenResponse = response
            .body_mut()
            .read_json()
            .context("Failed to parse token response")?;
        self.save_token_response(&token)?;

        println!("Authentication successful!\n");
        Ok(())
    }

    /// Wait for the OAuth callback and extract the authorization code
    fn wait_for_callback(&self, listener: TcpListener, state: &str) -> Result<String> {
        let (mut stream, _) = listener.accept().context("Failed to accept connection")?;

        let mut reader = BufReader::new(&stream);
        let mut request_line = String::new();
        reader
            .read_line(&mut request_line)
            .context("Failed to read request")?;

        let code = parse_callback(&request_line, state);

        // Send response to browser
        let (status, body) = if code.is_ok() {
            ("200 OK", "Authentication successful! You can close this window.")
        } else {
            ("400 Bad Request", "Authentication failed. Please try again.")
        };

        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: text/html\r\nConnection: close\r\n\r\n<html><body><h1>{}</h1></body></html>",
            status, body
        );
        stream.write_all(response.as_bytes()).ok();

        code
    }

    /// Exchange a refresh token for a new access token
    fn refresh_access_token(&self, refresh_token: &str) -> Result<TokenResponse, FetchError> {
        let response = ureq::post(Self::TOKEN_URL)
            .header("Authorization", &self.basic_auth_header())
            .send_form([
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ]);

        let response = match response {
            Ok(response) => response,
            Err(ureq::Error::StatusCode(status)) if status == 400 || status == 401 => {
                warn!("Fitbit rejected the refresh token (HTTP {})", status);
                return Err(FetchError::NotAuthenticated);
            }
            Err(ureq::Error::StatusCode(status)) => {
                return Err(FetchError::Http {
                    status,
                    endpoint: "oauth2/token".to_string(),
                });
            }
            Err(e) => return Err(FetchError::Transport(e.to_string())),
        };

        let mut token: TokenResponse = response
            .into_body()
            .read_json()
            .map_err(|e| FetchError::Decode(format!("refresh token response: {}", e)))?;

        // Preserve the refresh token if not returned
        if token.refresh_token.is_none() {
            token.refresh_token = Some(refresh_token.to_string());
        }

        Ok(token)
    }

    fn basic_auth_header(&self) -> String {
        let pair = format!(
            "{}:{}",
            self.credentials.client_id, self.credentials.client_secret
        );
        format!("Basic {}", STANDARD.encode(pair))
    }

    /// Load stored token from disk
    fn load_token(&self) -> Result<StoredToken> {
        let content = fs::read_to_string(&self.token_path)
            .with_context(|| format!("Failed to read {}", self.token_path.display()))?;
        let token: StoredToken =
            serde_json::from_str(&content).context("Failed to parse stored token")?;
        Ok(token)
    }

    /// Save token response to disk
    fn save_token_response(&self, token: &TokenResponse) -> Result<()> {
        // Ensure directory exists
        if let Some(parent) = self.token_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let stored = StoredToken {
            access_token: token.access_token.clone(),
            refresh_token: token.refresh_token.clone(),
            expires_at: token
                .expires_in
                .map(|d| chrono::Utc::now().timestamp() + d as i64),
        };

        let content = serde_json::to_string_pretty(&stored)?;
        fs::write(&self.token_path, content)
            .with_context(|| format!("Failed to write {}", self.token_path.display()))?;
        Ok(())
    }

    /// Check if the user is authenticated, refreshing the token if needed
    pub fn is_authenticated(&self) -> bool {
        self.access_token().is_ok()
    }

    /// Clear stored tokens (logout)
    pub fn logout(&self) -> Result<()> {
        if self.token_path.exists() {
            fs::remove_file(&self.token_path)?;
        }
        Ok(())
    }
}

/// Whether a token expiring at `expires_at` is still good at `now`
fn token_fresh(expires_at: Option<i64>, now: i64) -> bool {
    expires_at.is_some_and(|at| at > now + EXPIRY_MARGIN_SECS)
}

/// Random value tying the callback to this login attempt
fn oauth_state() -> String {
    use std::collections::hash_map::RandomState;
    use std::hash::{BuildHasher, Hasher};

    let hasher = RandomState::new().build_hasher();
    format!("{:016x}", hasher.finish())
}

/// Extract the authorization code from a callback request line.
///
/// Format: `GET /callback?code=AUTH_CODE&state=STATE HTTP/1.1`
fn parse_callback(request_line: &str, expected_state: &str) -> Result<String> {
    let target = request_line
        .split_whitespace()
        .nth(1)
        .context("Malformed callback request")?;
    let url = Url::parse("http://localhost")
        .and_then(|base| base.join(target))
        .context("Malformed callback URL")?;

    let mut code = None;
    let mut state = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            "error" => anyhow::bail!("OAuth error: {}", value),
            _ => {}
        }
    }

    if state.as_deref() != Some(expected_state) {
        anyhow::bail!("OAuth state mismatch");
    }
    code.context("No authorization code received")
}
