//! Client for the dedicated server's admin Web API.
//!
//! Every response arrives wrapped in a `{code, message, succeeded, data}`
//! envelope. HTTP-level failures are transport errors and are checked before
//! the envelope is inspected; an envelope with `succeeded: false` fails with
//! the envelope's message.

use std::collections::HashMap;

use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::common::error::{ApiError, ApiResult};

/// A player as reported by the list endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlayerRecord {
    pub name: String,
    pub unique_id: String,
}

/// Uniform response wrapper used by every endpoint.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    code: i32,
    message: String,
    succeeded: bool,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct PlayerCountData {
    num_players: u32,
}

/// Authenticated client for the server's admin HTTP surface.
pub struct AdminApiClient {
    base_url: String,
    password: Option<String>,
    http: Client,
}

impl AdminApiClient {
    /// Create a client for `http://localhost:{port}/`.
    pub fn new(port: u16, password: Option<String>) -> Self {
        Self {
            base_url: format!("http://localhost:{port}"),
            password,
            http: Client::new(),
        }
    }

    /// Number of players currently online.
    pub async fn player_count(&self) -> ApiResult<u32> {
        let body = self.execute(self.request(Method::GET, "/player/count")).await?;
        let data: PlayerCountData = unwrap_envelope(&body)?;
        Ok(data.num_players)
    }

    /// Players currently on the server.
    ///
    /// The endpoint returns a mapping keyed by arbitrary ids; only the
    /// values are kept, in the mapping's iteration order.
    pub async fn player_list(&self) -> ApiResult<Vec<PlayerRecord>> {
        let body = self.execute(self.request(Method::GET, "/player/list")).await?;
        let data: HashMap<String, PlayerRecord> = unwrap_envelope(&body)?;
        Ok(data.into_values().collect())
    }

    /// Banned players.
    pub async fn player_ban_list(&self) -> ApiResult<Vec<PlayerRecord>> {
        let body = self
            .execute(self.request(Method::GET, "/player/banlist"))
            .await?;
        let data: HashMap<String, PlayerRecord> = unwrap_envelope(&body)?;
        Ok(data.into_values().collect())
    }

    /// Kick a player by unique id.
    pub async fn kick(&self, unique_id: &str) -> ApiResult<()> {
        self.post_ack("/player/kick", &[("unique_id", unique_id)]).await
    }

    /// Ban a player by unique id.
    pub async fn ban(&self, unique_id: &str) -> ApiResult<()> {
        self.post_ack("/player/ban", &[("unique_id", unique_id)]).await
    }

    /// Unban a player by unique id.
    pub async fn unban(&self, unique_id: &str) -> ApiResult<()> {
        self.post_ack("/player/unban", &[("unique_id", unique_id)]).await
    }

    /// Broadcast a message to the in-game chat.
    pub async fn announce(&self, message: &str) -> ApiResult<()> {
        self.post_ack("/chat", &[("message", message)]).await
    }

    /// POST with an empty body; only the envelope's succeeded flag matters.
    async fn post_ack(&self, path: &str, query: &[(&str, &str)]) -> ApiResult<()> {
        let request = self.request(Method::POST, path).query(query);
        let body = self.execute(request).await?;
        unwrap_ack(&body)
    }

    /// Start a request against the API.
    ///
    /// The shared-secret password is appended as a query parameter here so
    /// that every call site gets it uniformly.
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut builder = self.http.request(method, format!("{}{path}", self.base_url));
        if let Some(ref password) = self.password {
            builder = builder.query(&[("password", password)]);
        }
        builder
    }

    async fn execute(&self, request: RequestBuilder) -> ApiResult<String> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Http {
                status: status.as_u16(),
            });
        }
        Ok(response.text().await?)
    }
}

/// Deserialize an envelope and return its payload.
fn unwrap_envelope<T: DeserializeOwned>(body: &str) -> ApiResult<T> {
    let envelope: Envelope<T> = serde_json::from_str(body).map_err(|e| ApiError::InvalidPayload {
        message: e.to_string(),
    })?;

    if !envelope.succeeded {
        return Err(ApiError::Rejected {
            code: envelope.code,
            message: envelope.message,
        });
    }

    envelope.data.ok_or(ApiError::InvalidPayload {
        message: "missing data".to_string(),
    })
}

/// Check only the envelope's succeeded flag; the payload is opaque.
fn unwrap_ack(body: &str) -> ApiResult<()> {
    let envelope: Envelope<serde_json::Value> =
        serde_json::from_str(body).map_err(|e| ApiError::InvalidPayload {
            message: e.to_string(),
        })?;

    if !envelope.succeeded {
        return Err(ApiError::Rejected {
            code: envelope.code,
            message: envelope.message,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_envelope_carries_message() {
        let body = r#"{"code":1,"message":"x","succeeded":false,"data":null}"#;

        let result: ApiResult<PlayerCountData> = unwrap_envelope(body);
        match result {
            Err(ApiError::Rejected { code, message }) => {
                assert_eq!(code, 1);
                assert_eq!(message, "x");
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[test]
    fn successful_envelope_returns_data_unchanged() {
        let body = r#"{"code":0,"message":"ok","succeeded":true,"data":{"num_players":7}}"#;

        let data: PlayerCountData = unwrap_envelope(body).unwrap();
        assert_eq!(data.num_players, 7);
    }

    #[test]
    fn player_map_flattens_to_records() {
        let body = r#"{
            "code": 0,
            "message": "",
            "succeeded": true,
            "data": {
                "0": {"name": "McRay", "unique_id": "76561197997411952"},
                "1": {"name": "Arend", "unique_id": "76561197997411953"}
            }
        }"#;

        let data: HashMap<String, PlayerRecord> = unwrap_envelope(body).unwrap();
        let mut names: Vec<&str> = data.values().map(|p| p.name.as_str()).collect();
        names.sort_unstable();
        assert_eq!(names, ["Arend", "McRay"]);
    }

    #[test]
    fn successful_envelope_without_data_is_invalid() {
        let body = r#"{"code":0,"message":"ok","succeeded":true,"data":null}"#;

        let result: ApiResult<PlayerCountData> = unwrap_envelope(body);
        assert!(matches!(result, Err(ApiError::InvalidPayload { .. })));
    }

    #[test]
    fn ack_ignores_payload_shape() {
        let body = r#"{"code":0,"message":"ok","succeeded":true,"data":null}"#;
        assert!(unwrap_ack(body).is_ok());

        let body = r#"{"code":2,"message":"no such player","succeeded":false,"data":null}"#;
        match unwrap_ack(body) {
            Err(ApiError::Rejected { message, .. }) => {
                assert_eq!(message, "no such player");
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[test]
    fn garbage_body_is_invalid_payload() {
        let result: ApiResult<PlayerCountData> = unwrap_envelope("<html>bad gateway</html>");
        assert!(matches!(result, Err(ApiError::InvalidPayload { .. })));
    }
}
