//! REST client
//!
//! Thin JSON client over `reqwest`. The server is the source of truth; a
//! failed call is returned as-is and never retried here.

use crate::config::AdminConfig;
use crate::error::{AdminError, Result};
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

/// API client
#[derive(Clone, Debug)]
pub struct ApiClient {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: &str, api_key: Option<&str>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.map(String::from),
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &AdminConfig) -> Self {
        Self::new(&config.api_url, config.api_key.as_deref())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send("GET", path, self.client.get(self.url(path))).await
    }

    /// GET with query parameters
    pub async fn get_with<T, Q>(&self, path: &str, query: &Q) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        self.send("GET", path, self.client.get(self.url(path)).query(query)).await
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send("POST", path, self.client.post(self.url(path)).json(body)).await
    }

    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send("PUT", path, self.client.put(self.url(path)).json(body)).await
    }

    /// DELETE, response body ignored
    pub async fn delete(&self, path: &str) -> Result<()> {
        let _: Value = self.send("DELETE", path, self.client.delete(self.url(path))).await?;
        Ok(())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: &'static str,
        path: &str,
        req: RequestBuilder,
    ) -> Result<T> {
        let req = match &self.api_key {
            Some(key) => req.bearer_auth(key),
            None => req,
        };

        let resp = req.send().await.map_err(|e| {
            warn!(method, path, error = %e, "request failed");
            AdminError::Network(e.to_string())
        })?;
        let status = resp.status();
        let body = resp.text().await.map_err(|e| AdminError::Network(e.to_string()))?;
        debug!(method, path, status = status.as_u16(), "api response");

        if !status.is_success() {
            let message = error_message(status.as_u16(), &body);
            warn!(method, path, status = status.as_u16(), %message, "api error");
            return Err(AdminError::Api { status: status.as_u16(), message });
        }
        decode(&body)
    }
}

/// Decode a response body, unwrapping a `{ "data": ... }` envelope if the
/// body itself does not fit
fn decode<T: DeserializeOwned>(body: &str) -> Result<T> {
    let value: Value = if body.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(body)?
    };
    match T::deserialize(&value) {
        Ok(decoded) => Ok(decoded),
        Err(e) => match value.get("data") {
            Some(data) => Ok(T::deserialize(data)?),
            None => Err(e.into()),
        },
    }
}

/// Message for a failed response
///
/// Looks at `detail`, then `message`, then `error`. A `detail` list (field
/// validation errors) is joined by `msg`.
pub(crate) fn error_message(status: u16, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| {
            ["detail", "message", "error"]
                .iter()
                .find_map(|key| json.get(key).and_then(message_text))
        })
        .unwrap_or_else(|| format!("Request failed with status {}", status))
}

fn message_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Array(items) => {
            let parts: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str).or_else(|| item.as_str()))
                .collect();
            (!parts.is_empty()).then(|| parts.join("; "))
        }
        Value::Object(_) => value.get("message").and_then(message_text),
        _ => None,
    }
}

/// `{ "message": ... }` acknowledgement returned by action endpoints
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub success: Option<bool>,
}
