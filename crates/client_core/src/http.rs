use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use shared::error::ApiError;
use tracing::debug;
use url::Url;

use crate::{
    config::ClientSettings,
    error::{ClientError, Result},
};

/// HTTP client bound to the API base url resolved from settings. Paths handed
/// to [`ApiClient::endpoint`] are relative to that base.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
}

impl ApiClient {
    pub fn from_settings(settings: &ClientSettings) -> Result<Self> {
        let http = Client::builder()
            .timeout(settings.request_timeout())
            .build()
            .map_err(ClientError::HttpClient)?;
        Self::with_client(http, &settings.base_url())
    }

    pub fn with_client(http: Client, base_url: &str) -> Result<Self> {
        let base_url = parse_base_url(base_url)?;
        debug!(base_url = %base_url, "api client configured");
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|source| ClientError::InvalidPath {
                path: path.to_string(),
                source,
            })
    }

    pub fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        Ok(self.http.request(method, self.endpoint(path)?))
    }

    pub fn get(&self, path: &str) -> Result<RequestBuilder> {
        self.request(Method::GET, path)
    }

    pub fn post(&self, path: &str) -> Result<RequestBuilder> {
        self.request(Method::POST, path)
    }

    /// Sends `request` and decodes a JSON body, mapping non-success statuses
    /// to [`ClientError::Api`].
    pub async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let res = check_status(request.send().await?).await?;
        Ok(res.json().await?)
    }
}

async fn check_status(res: Response) -> Result<Response> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let body = match res.text().await {
        Ok(body) => body,
        Err(err) => {
            debug!(status = status.as_u16(), error = %err, "failed to read error response body");
            String::new()
        }
    };
    Err(ClientError::Api {
        status: status.as_u16(),
        error: ApiError::from_response_body(status.as_u16(), &body),
    })
}

/// The base always ends with `/` so joined paths extend it instead of
/// replacing its last segment.
fn parse_base_url(raw: &str) -> Result<Url> {
    let raw = raw.trim();
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };
    let url = Url::parse(&normalized).map_err(|source| ClientError::InvalidBaseUrl {
        url: raw.to_string(),
        source,
    })?;
    if url.cannot_be_a_base() || url.host_str().is_none() {
        return Err(ClientError::InvalidBaseUrl {
            url: raw.to_string(),
            source: url::ParseError::EmptyHost,
        });
    }
    Ok(url)
}

#[cfg(test)]
#[path = "tests/http_tests.rs"]
mod tests;
