//! HTTP client for the brandsight server.

use std::time::Duration;

use brandsight_core::{Owner, SourceType, StoredReport};
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned {status} ({code}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid server URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

/// Result of `POST /api/v1/analyze`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AnalyzeResult {
    Completed(StoredReport),
    NotImplemented {
        message: String,
        source_type: SourceType,
    },
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

#[derive(Debug, Deserialize)]
struct RegisterData {
    created: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeBody<'a> {
    owner_id: &'a str,
    #[serde(rename = "brandURL")]
    brand_url: &'a str,
    review_count: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OwnerBody<'a> {
    owner_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

/// Client for the `/api/v1` surface.
pub struct BrandsightClient {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl BrandsightClient {
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`ClientError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn new(
        base_url: &str,
        token: Option<String>,
        timeout_secs: u64,
    ) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("brandsight-cli/0.1")
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| ClientError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url,
            token: token.filter(|t| !t.trim().is_empty()),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|e| ClientError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })
    }

    fn authorised(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        context: &str,
    ) -> Result<(StatusCode, T), ClientError> {
        let response = self.authorised(builder).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(match serde_json::from_str::<ErrorEnvelope>(&body) {
                Ok(envelope) => ClientError::Api {
                    status: status.as_u16(),
                    code: envelope.error.code,
                    message: envelope.error.message,
                },
                Err(_) => ClientError::Api {
                    status: status.as_u16(),
                    code: "unknown".to_string(),
                    message: body.chars().take(200).collect(),
                },
            });
        }

        let parsed = serde_json::from_str(&body).map_err(|e| ClientError::Deserialize {
            context: context.to_string(),
            source: e,
        })?;
        Ok((status, parsed))
    }

    /// Submit a brand URL for analysis.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Api`] for any error envelope from the server.
    pub async fn analyze(
        &self,
        owner_id: &str,
        brand_url: &str,
        review_count: u32,
    ) -> Result<AnalyzeResult, ClientError> {
        let url = self.endpoint("api/v1/analyze")?;
        let body = AnalyzeBody {
            owner_id,
            brand_url,
            review_count,
        };
        let (_, envelope): (_, Envelope<AnalyzeResult>) = self
            .send(self.client.post(url).json(&body), "analyze")
            .await?;
        Ok(envelope.data)
    }

    /// An owner's reports, newest first. Empty when the owner has none.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Api`] for an unknown owner or a server failure.
    pub async fn history(&self, owner_id: &str) -> Result<Vec<StoredReport>, ClientError> {
        let url = self.endpoint("api/v1/history")?;
        let body = OwnerBody {
            owner_id,
            name: None,
        };
        match self
            .send::<Envelope<Vec<StoredReport>>>(self.client.post(url).json(&body), "history")
            .await
        {
            Ok((_, envelope)) => Ok(envelope.data),
            Err(ClientError::Api { code, .. }) if code == "empty_result" => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    /// Fetch one report by id.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Api`] with code `not_found` if the id is unknown.
    pub async fn report(&self, id: Uuid) -> Result<StoredReport, ClientError> {
        let url = self.endpoint(&format!("api/v1/reports/{id}"))?;
        let (_, envelope): (_, Envelope<StoredReport>) =
            self.send(self.client.get(url), "report").await?;
        Ok(envelope.data)
    }

    /// Fetch a registered owner and its display name.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Api`] with code `not_found` if the owner is not
    /// registered.
    pub async fn owner(&self, owner_id: &str) -> Result<Owner, ClientError> {
        let mut url = self.endpoint("api/v1/owners")?;
        url.path_segments_mut()
            .map_err(|()| ClientError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: "URL cannot be a base".to_string(),
            })?
            .push(owner_id);
        let (_, envelope): (_, Envelope<Owner>) =
            self.send(self.client.get(url), "owner").await?;
        Ok(envelope.data)
    }

    /// Register an owner. Returns `true` when newly created.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Api`] if the server rejects the id.
    pub async fn register_owner(
        &self,
        owner_id: &str,
        name: Option<&str>,
    ) -> Result<bool, ClientError> {
        let url = self.endpoint("api/v1/owners")?;
        let body = OwnerBody { owner_id, name };
        let (status, envelope): (_, Envelope<RegisterData>) = self
            .send(self.client.post(url).json(&body), "register owner")
            .await?;
        Ok(status == StatusCode::CREATED || envelope.data.created)
    }
}
