//! HTTP client for the serverless function that emails candidates about stage changes.
//!
//! Templating, provider delivery, and the audit log of sent messages live in the
//! function itself. This side only builds the request and reports whether it was
//! queued. Failures are never retried here; callers treat them as warnings.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

pub mod templates;

const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("notification function rejected request (status {status}): {body}")]
    Rejected { status: u16, body: String },
}

/// Body posted to the notification function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageNotification {
    pub recipient_email: String,
    pub candidate_name: String,
    pub stage_name: String,
    pub subject: String,
    pub message: String,
    pub recruiter_name: String,
    pub company_name: String,
}

#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn send(&self, notification: &StageNotification) -> Result<(), NotificationError>;
}

/// Posts stage notifications to the function endpoint with a bearer token.
#[derive(Clone)]
pub struct HttpNotificationDispatcher {
    client: Client,
    endpoint: String,
    token: String,
}

impl HttpNotificationDispatcher {
    pub fn new(endpoint: String, token: String) -> Result<Self, NotificationError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            endpoint,
            token,
        })
    }
}

#[async_trait]
impl NotificationDispatcher for HttpNotificationDispatcher {
    async fn send(&self, notification: &StageNotification) -> Result<(), NotificationError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .json(notification)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(
                "Notification function returned {} for stage '{}': {}",
                status, notification.stage_name, body
            );
            return Err(NotificationError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        debug!(
            "Stage notification queued for stage '{}'",
            notification.stage_name
        );
        Ok(())
    }
}
