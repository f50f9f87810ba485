// Tunegrab - Playlist-aware music downloader
// Copyright (C) 2026 Tunegrab contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.


//! OAuth authorization-code login against the catalog service
//!
//! The flow needs a browser the core does not have, so it is split at the
//! redirect: we surface the authorize URL through the event sink, listen on
//! the loopback redirect address for exactly one callback, verify the
//! `state` we generated, and exchange the authorization code for a bearer
//! token. Tokens are held in memory only; there is no refresh handling.

use crate::error::{Result, TunegrabError};
use crate::events::EventSink;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::Deserialize;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

const AUTHORIZE_URL: &str = "https://accounts.spotify.com/authorize";
const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const REDIRECT_URI: &str = "http://127.0.0.1:8888/callback";
const REDIRECT_ADDR: &str = "127.0.0.1:8888";
const SCOPES: &str = "user-library-read playlist-read-private";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Drives the interactive login flow
pub struct Authenticator {
    client: reqwest::Client,
    client_id: String,
    client_secret: String,
}

impl Authenticator {
    pub fn new(client_id: String, client_secret: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            client_id,
            client_secret,
        }
    }

    /// Run the whole flow and return a bearer token
    ///
    /// Emits the authorize URL as a log event for the hosting layer to open
    /// in a browser, then blocks on the single loopback callback.
    pub async fn login(&self, events: &dyn EventSink) -> Result<String> {
        if self.client_id.is_empty() || self.client_secret.is_empty() {
            return Err(TunegrabError::ConfigurationError(
                "client credentials are not set".into(),
            ));
        }

        let state = random_state();
        let url = authorize_url(&self.client_id, &state);

        // Bind before announcing the URL so the redirect cannot race us.
        let listener = TcpListener::bind(REDIRECT_ADDR).await.map_err(|e| {
            TunegrabError::AuthenticationFailed(format!("cannot listen on {REDIRECT_ADDR}: {e}"))
        })?;
        events.log(&format!("Open this URL to authorize: {url}"));

        let (code, returned_state) = accept_callback(&listener).await?;
        if returned_state != state {
            return Err(TunegrabError::AuthenticationFailed(
                "state mismatch in OAuth callback".into(),
            ));
        }

        self.exchange_code(&code).await
    }

    async fn exchange_code(&self, code: &str) -> Result<String> {
        let response = self
            .client
            .post(TOKEN_URL)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", REDIRECT_URI),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            return Err(TunegrabError::AuthenticationFailed(format!(
                "token exchange failed with status {status}"
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| TunegrabError::InvalidApiResponse(format!("token response: {e}")))?;
        Ok(token.access_token)
    }
}

/// Build the user-facing authorization URL
fn authorize_url(client_id: &str, state: &str) -> String {
    format!(
        "{}?client_id={}&response_type=code&redirect_uri={}&scope={}&state={}",
        AUTHORIZE_URL,
        urlencoding::encode(client_id),
        urlencoding::encode(REDIRECT_URI),
        urlencoding::encode(SCOPES),
        urlencoding::encode(state),
    )
}

fn random_state() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(16)
        .map(char::from)
        .collect()
}

/// Accept exactly one redirect request and pull `code` and `state` out of it
async fn accept_callback(listener: &TcpListener) -> Result<(String, String)> {
    let (mut stream, _) = listener.accept().await.map_err(|e| {
        TunegrabError::AuthenticationFailed(format!("callback accept failed: {e}"))
    })?;

    let mut buf = vec![0u8; 4096];
    let n = stream.read(&mut buf).await.map_err(|e| {
        TunegrabError::AuthenticationFailed(format!("callback read failed: {e}"))
    })?;
    let request = String::from_utf8_lossy(&buf[..n]);

    let result = parse_callback_request(&request);

    let body = match &result {
        Ok(_) => "Authorized! You can close this window.",
        Err(_) => "Authorization failed. Check the application log.",
    };
    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes()).await;

    result
}

/// Extract `code` and `state` from the raw HTTP request line
fn parse_callback_request(request: &str) -> Result<(String, String)> {
    let request_line = request
        .lines()
        .next()
        .ok_or_else(|| TunegrabError::AuthenticationFailed("empty callback request".into()))?;
    let target = request_line
        .split_whitespace()
        .nth(1)
        .ok_or_else(|| TunegrabError::AuthenticationFailed("malformed request line".into()))?;

    let query = target.split_once('?').map(|(_, q)| q).unwrap_or("");
    if let Some(reason) = query_param(query, "error") {
        return Err(TunegrabError::AuthenticationFailed(format!(
            "authorization denied: {reason}"
        )));
    }

    let code = query_param(query, "code").ok_or_else(|| {
        TunegrabError::AuthenticationFailed("callback carried no authorization code".into())
    })?;
    let state = query_param(query, "state").ok_or_else(|| {
        TunegrabError::AuthenticationFailed("callback carried no state".into())
    })?;
    Ok((code, state))
}

fn query_param(query: &str, name: &str) -> Option<String> {
    query.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        if key != name {
            return None;
        }
        Some(urlencoding::decode(value).ok()?.into_owned())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authorize_url_carries_encoded_parameters() {
        let url = authorize_url("my client", "abc123");
        assert!(url.starts_with(AUTHORIZE_URL));
        assert!(url.contains("client_id=my%20client"));
        assert!(url.contains("redirect_uri=http%3A%2F%2F127.0.0.1%3A8888%2Fcallback"));
        assert!(url.contains("scope=user-library-read%20playlist-read-private"));
        assert!(url.contains("state=abc123"));
    }

    #[test]
    fn state_is_random_and_url_safe() {
        let a = random_state();
        let b = random_state();
        assert_eq!(a.len(), 16);
        assert_ne!(a, b);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn parses_code_and_state_from_callback() {
        let request = "GET /callback?code=AQD-xyz&state=s1 HTTP/1.1\r\nHost: 127.0.0.1\r\n\r\n";
        let (code, state) = parse_callback_request(request).unwrap();
        assert_eq!(code, "AQD-xyz");
        assert_eq!(state, "s1");
    }

    #[test]
    fn decodes_percent_encoded_parameters() {
        let request = "GET /callback?code=a%2Fb&state=x%20y HTTP/1.1\r\n\r\n";
        let (code, state) = parse_callback_request(request).unwrap();
        assert_eq!(code, "a/b");
        assert_eq!(state, "x y");
    }

    #[test]
    fn denied_authorization_is_an_error() {
        let request = "GET /callback?error=access_denied&state=s1 HTTP/1.1\r\n\r\n";
        let err = parse_callback_request(request).unwrap_err();
        assert!(matches!(err, TunegrabError::AuthenticationFailed(msg) if msg.contains("access_denied")));
    }

    #[test]
    fn missing_code_is_an_error() {
        let request = "GET /callback?state=s1 HTTP/1.1\r\n\r\n";
        assert!(parse_callback_request(request).is_err());
    }
}
