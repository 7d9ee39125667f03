use crate::errors::{Result, StrataError};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, trace};
use url::Url;

/// Blocking HTTP client for the strata app server.
///
/// Auth is a bearer token from user config. A 401 is fatal to the
/// operation and reported with the activation URL the user needs to visit;
/// any other non-2xx response carries the server's request id for support.
pub struct HostClient {
    client: Client,
    base_url: Url,
    activation_url: String,
}

impl HostClient {
    pub fn new(app_server_url: &str, token: &str) -> Result<Self> {
        let base_url = Url::parse(app_server_url)?;
        let activation_url = format!("{}/activate", app_server_url.trim_end_matches('/'));

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| StrataError::config(format!("invalid auth token: {e}")))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .default_headers(headers)
            .build()
            .map_err(|e| StrataError::config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            activation_url,
        })
    }

    /// POST a JSON body and decode a JSON response.
    pub fn post<T, U>(&self, path: &str, body: &T) -> Result<U>
    where
        T: Serialize,
        U: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        debug!("POST {}", url);

        let response = self.client.post(url).json(body).send()?;
        self.handle_response(response)
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        let joined = format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        Ok(Url::parse(&joined)?)
    }

    fn handle_response<U: DeserializeOwned>(&self, response: reqwest::blocking::Response) -> Result<U> {
        let status = response.status();

        if status.is_success() {
            let text = response.text()?;
            trace!("response body: {}", text);
            serde_json::from_str(&text).map_err(|e| {
                StrataError::config(format!("failed to parse review host response: {e}"))
            })
        } else if status == StatusCode::UNAUTHORIZED {
            Err(StrataError::AuthExpired {
                activation_url: self.activation_url.clone(),
            })
        } else {
            let request_id = response
                .headers()
                .get("x-request-id")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("<none>")
                .to_string();
            Err(StrataError::UnexpectedServerResponse {
                status: status.as_u16(),
                request_id,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_cleanly() {
        let client = HostClient::new("https://app.strata.dev/api/v1/", "token").unwrap();
        assert_eq!(
            client.endpoint("pull-requests/submit").unwrap().as_str(),
            "https://app.strata.dev/api/v1/pull-requests/submit"
        );
        assert_eq!(
            client.endpoint("/pull-requests/info").unwrap().as_str(),
            "https://app.strata.dev/api/v1/pull-requests/info"
        );
    }

    #[test]
    fn test_activation_url_derivation() {
        let client = HostClient::new("https://app.strata.dev/api/v1", "token").unwrap();
        assert_eq!(
            client.activation_url,
            "https://app.strata.dev/api/v1/activate"
        );
    }
}
