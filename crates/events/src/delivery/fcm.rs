//! Firebase Cloud Messaging delivery over the HTTP v1 API.
//!
//! The v1 API addresses one token per request, so [`FcmDispatcher`] fans a
//! multicast out into concurrent `messages:send` calls and reassembles the
//! outcomes in token order. Error bodies are classified into the
//! `messaging/*` vocabulary the notifier reconciles against.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use prana_core::dispatch::{
    MessagingErrorCode, MulticastMessage, MulticastResponse, Priority, SendOutcome,
};
use prana_core::payload::{Notification, NotificationData};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use super::token::{
    AccessTokenSource, ServiceAccountKey, ServiceAccountTokenSource, StaticTokenSource,
};
use super::{DispatchError, PushDispatcher};

/// Production FCM endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://fcm.googleapis.com";

/// Default number of in-flight sends per multicast.
const DEFAULT_CONCURRENCY: usize = 16;

/// HTTP request timeout for a single send.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const FCM_ERROR_TYPE: &str = "type.googleapis.com/google.firebase.fcm.v1.FcmError";
const BAD_REQUEST_TYPE: &str = "type.googleapis.com/google.rpc.BadRequest";

// ---------------------------------------------------------------------------
// FcmConfig
// ---------------------------------------------------------------------------

/// How the dispatcher authenticates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FcmCredentials {
    /// Path to a Google service-account key file.
    ServiceAccountFile(PathBuf),
    /// A pre-issued bearer token (emulators, tests).
    AccessToken(String),
}

/// Configuration for the FCM delivery channel.
#[derive(Debug, Clone)]
pub struct FcmConfig {
    /// Firebase project; taken from the key file when unset.
    pub project_id: Option<String>,
    pub credentials: FcmCredentials,
    /// Base URL, without the `/v1/...` path.
    pub endpoint: String,
    /// Maximum concurrent sends per multicast.
    pub concurrency: usize,
}

impl FcmConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if neither `FCM_ACCESS_TOKEN` nor
    /// `GOOGLE_APPLICATION_CREDENTIALS` is set. A static token wins when both
    /// are present.
    ///
    /// | Variable                         | Required | Default                      |
    /// |----------------------------------|----------|------------------------------|
    /// | `GOOGLE_APPLICATION_CREDENTIALS` | one of   | none                         |
    /// | `FCM_ACCESS_TOKEN`               | one of   | none                         |
    /// | `FCM_PROJECT_ID`                 | no       | key file `project_id`        |
    /// | `FCM_ENDPOINT`                   | no       | `https://fcm.googleapis.com` |
    /// | `FCM_CONCURRENCY`                | no       | `16`                         |
    pub fn from_env() -> Option<Self> {
        let credentials = match (
            std::env::var("FCM_ACCESS_TOKEN"),
            std::env::var("GOOGLE_APPLICATION_CREDENTIALS"),
        ) {
            (Ok(token), _) => FcmCredentials::AccessToken(token),
            (Err(_), Ok(path)) => FcmCredentials::ServiceAccountFile(path.into()),
            _ => return None,
        };

        Some(Self {
            project_id: std::env::var("FCM_PROJECT_ID").ok(),
            credentials,
            endpoint: std::env::var("FCM_ENDPOINT")
                .unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string()),
            concurrency: std::env::var("FCM_CONCURRENCY")
                .ok()
                .and_then(|c| c.parse().ok())
                .unwrap_or(DEFAULT_CONCURRENCY),
        })
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    message: WireMessage<'a>,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    token: &'a str,
    notification: &'a Notification,
    data: &'a NotificationData,
    android: AndroidConfig,
    apns: ApnsConfig,
}

#[derive(Debug, Serialize)]
struct AndroidConfig {
    priority: &'static str,
}

#[derive(Debug, Serialize)]
struct ApnsConfig {
    headers: ApnsHeaders,
}

#[derive(Debug, Serialize)]
struct ApnsHeaders {
    #[serde(rename = "apns-priority")]
    apns_priority: &'static str,
}

impl<'a> WireMessage<'a> {
    fn new(token: &'a str, message: &'a MulticastMessage) -> Self {
        let (android, apns) = match message.priority {
            Priority::High => ("HIGH", "10"),
            Priority::Normal => ("NORMAL", "5"),
        };
        Self {
            token,
            notification: &message.payload.notification,
            data: &message.payload.data,
            android: AndroidConfig { priority: android },
            apns: ApnsConfig {
                headers: ApnsHeaders {
                    apns_priority: apns,
                },
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    details: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(rename = "@type", default)]
    type_url: String,
    #[serde(rename = "errorCode", default)]
    error_code: Option<String>,
    #[serde(rename = "fieldViolations", default)]
    field_violations: Vec<FieldViolation>,
}

#[derive(Debug, Deserialize)]
struct FieldViolation {
    #[serde(default)]
    field: String,
}

// ---------------------------------------------------------------------------
// Error classification
// ---------------------------------------------------------------------------

impl ErrorBody {
    /// Build a body for responses whose payload is not a Google error.
    fn from_status(status: StatusCode, raw: &str) -> Self {
        let code = match status {
            StatusCode::BAD_REQUEST => "INVALID_ARGUMENT",
            StatusCode::NOT_FOUND => "NOT_FOUND",
            StatusCode::TOO_MANY_REQUESTS => "QUOTA_EXCEEDED",
            StatusCode::INTERNAL_SERVER_ERROR => "INTERNAL",
            StatusCode::SERVICE_UNAVAILABLE => "UNAVAILABLE",
            _ => "UNSPECIFIED_ERROR",
        };
        Self {
            message: raw.to_string(),
            status: code.to_string(),
            details: Vec::new(),
        }
    }

    /// The FCM-specific error code if present, else the canonical status.
    fn code(&self) -> &str {
        self.details
            .iter()
            .filter(|d| d.type_url == FCM_ERROR_TYPE)
            .find_map(|d| d.error_code.as_deref())
            .unwrap_or(self.status.as_str())
    }

    fn names_token_field(&self) -> bool {
        let violation = self
            .details
            .iter()
            .filter(|d| d.type_url == BAD_REQUEST_TYPE)
            .flat_map(|d| d.field_violations.iter())
            .any(|v| v.field == "message.token");
        violation || self.message.contains("not a valid FCM registration token")
    }

    fn classify(&self) -> MessagingErrorCode {
        match self.code() {
            // A bare NOT_FOUND also comes back for a wrong project or URL, so
            // only the FCM-specific code counts as an unregistered token.
            "UNREGISTERED" => MessagingErrorCode::RegistrationTokenNotRegistered,
            "INVALID_ARGUMENT" if self.names_token_field() => {
                MessagingErrorCode::InvalidRegistrationToken
            }
            "INVALID_ARGUMENT" => MessagingErrorCode::InvalidArgument,
            "SENDER_ID_MISMATCH" => MessagingErrorCode::MismatchedCredential,
            "QUOTA_EXCEEDED" | "RESOURCE_EXHAUSTED" => MessagingErrorCode::MessageRateExceeded,
            "UNAVAILABLE" => MessagingErrorCode::ServerUnavailable,
            "INTERNAL" => MessagingErrorCode::InternalError,
            "THIRD_PARTY_AUTH_ERROR" | "APNS_AUTH_ERROR" => MessagingErrorCode::ThirdPartyAuthError,
            _ => MessagingErrorCode::UnknownError,
        }
    }
}

// ---------------------------------------------------------------------------
// FcmDispatcher
// ---------------------------------------------------------------------------

/// Sends multicast pushes through the FCM HTTP v1 API.
pub struct FcmDispatcher {
    client: reqwest::Client,
    endpoint: String,
    project_id: String,
    concurrency: usize,
    token_source: Arc<dyn AccessTokenSource>,
}

impl FcmDispatcher {
    /// Create a dispatcher for `project_id` against the production endpoint.
    pub fn new(
        project_id: impl Into<String>,
        token_source: Arc<dyn AccessTokenSource>,
    ) -> Result<Self, DispatchError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            project_id: project_id.into(),
            concurrency: DEFAULT_CONCURRENCY,
            token_source,
        })
    }

    /// Build a dispatcher from configuration, loading credentials.
    pub fn from_config(config: &FcmConfig) -> Result<Self, DispatchError> {
        let (token_source, key_project): (Arc<dyn AccessTokenSource>, Option<String>) =
            match &config.credentials {
                FcmCredentials::AccessToken(token) => {
                    (Arc::new(StaticTokenSource::new(token.clone())), None)
                }
                FcmCredentials::ServiceAccountFile(path) => {
                    let key = ServiceAccountKey::from_file(path)?;
                    let project = key.project_id.clone();
                    (Arc::new(ServiceAccountTokenSource::new(key)?), project)
                }
            };

        let project_id = config.project_id.clone().or(key_project).ok_or_else(|| {
            DispatchError::Config(
                "FCM_PROJECT_ID is not set and the credentials name no project".to_string(),
            )
        })?;

        Ok(Self::new(project_id, token_source)?
            .with_endpoint(config.endpoint.clone())
            .with_concurrency(config.concurrency))
    }

    /// Point the dispatcher at another base URL (emulator, mock server).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    fn send_url(&self) -> String {
        format!(
            "{}/v1/projects/{}/messages:send",
            self.endpoint, self.project_id
        )
    }

    /// Send to one token.
    ///
    /// Only credential rejections are errors; everything else, including
    /// transport failures, becomes a per-token [`SendOutcome::Failed`].
    async fn send_one(
        &self,
        url: &str,
        access_token: &str,
        token: &str,
        message: &MulticastMessage,
    ) -> Result<SendOutcome, DispatchError> {
        let body = SendRequest {
            message: WireMessage::new(token, message),
        };

        let response = match self
            .client
            .post(url)
            .bearer_auth(access_token)
            .json(&body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "FCM send failed before a response arrived");
                return Ok(SendOutcome::failed(
                    MessagingErrorCode::UnknownError,
                    e.to_string(),
                ));
            }
        };

        let status = response.status();
        let raw = match response.text().await {
            Ok(raw) => raw,
            Err(e) => {
                return Ok(SendOutcome::failed(
                    MessagingErrorCode::UnknownError,
                    e.to_string(),
                ))
            }
        };

        if status.is_success() {
            return Ok(match serde_json::from_str::<SendResponse>(&raw) {
                Ok(sent) => SendOutcome::Delivered {
                    message_id: sent.name,
                },
                Err(e) => SendOutcome::failed(
                    MessagingErrorCode::UnknownError,
                    format!("Unreadable FCM response: {e}"),
                ),
            });
        }

        let error = serde_json::from_str::<ErrorEnvelope>(&raw)
            .map(|envelope| envelope.error)
            .unwrap_or_else(|_| ErrorBody::from_status(status, &raw));
        let code = error.classify();

        let credential_problem = status == StatusCode::UNAUTHORIZED
            || (status == StatusCode::FORBIDDEN && code != MessagingErrorCode::MismatchedCredential);
        if credential_problem {
            tracing::error!(
                status = status.as_u16(),
                detail = %error.message,
                "FCM rejected the access token"
            );
            return Err(DispatchError::Unauthorized(status.as_u16()));
        }

        tracing::debug!(status = status.as_u16(), %code, "FCM send failed for token");
        Ok(SendOutcome::failed(code, error.message))
    }
}

#[async_trait]
impl PushDispatcher for FcmDispatcher {
    async fn send_multicast(
        &self,
        message: &MulticastMessage,
    ) -> Result<MulticastResponse, DispatchError> {
        if message.tokens.is_empty() {
            return Ok(MulticastResponse::default());
        }

        let access_token = self.token_source.access_token().await?;
        let url = self.send_url();

        let sends: Vec<_> = message
            .tokens
            .iter()
            .map(|token| self.send_one(&url, &access_token, token, message))
            .collect();

        // `buffered` keeps outputs in input order.
        let responses: Vec<SendOutcome> = futures::stream::iter(sends)
            .buffered(self.concurrency)
            .try_collect()
            .await?;

        Ok(MulticastResponse { responses })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
