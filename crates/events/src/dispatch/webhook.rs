//! Webhook transport.
//!
//! [`WebhookDispatcher`] POSTs each [`Notification`] as JSON to one
//! configured URL. A single attempt per call; the dispatch worker owns
//! retries.

use std::time::Duration;

use async_trait::async_trait;

use crate::dispatch::{Notification, NotificationDispatcher};
use crate::error::DispatchError;

/// HTTP request timeout for a single delivery attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub struct WebhookDispatcher {
    client: reqwest::Client,
    url: String,
}

impl WebhookDispatcher {
    pub fn new(url: impl Into<String>) -> Result<Self, DispatchError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl NotificationDispatcher for WebhookDispatcher {
    async fn notify(&self, notification: &Notification) -> Result<(), DispatchError> {
        let response = self
            .client
            .post(&self.url)
            .json(notification)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(DispatchError::HttpStatus(response.status().as_u16()));
        }
        Ok(())
    }
}
