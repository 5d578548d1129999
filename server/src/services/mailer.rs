//! Transactional email relay for new offer requests.
//!
//! Thin HTTP wrapper over the EmailJS `/api/v1.0/email/send` endpoint. The
//! `Mailer` trait keeps the offer action testable without a network.

use std::time::Duration;

use serde::Serialize;

use crate::config::EmailJsConfig;

const REQUEST_TIMEOUT_SECS: u64 = 15;
const CONNECT_TIMEOUT_SECS: u64 = 5;
const SEND_PATH: &str = "/api/v1.0/email/send";

#[derive(Debug, thiserror::Error)]
pub enum MailerError {
    #[error("http client build failed: {0}")]
    HttpClientBuild(String),
    #[error("relay request failed: {0}")]
    Request(String),
    #[error("relay returned {status}: {body}")]
    Response { status: u16, body: String },
}

/// Template parameters for the "new offer request" email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OfferEmail {
    pub from_name: String,
    pub from_email: String,
    pub phone: String,
    pub category: String,
    pub message: String,
}

#[async_trait::async_trait]
pub trait Mailer: Send + Sync {
    /// Notify the studio inbox about a new offer request.
    ///
    /// # Errors
    ///
    /// Returns a [`MailerError`] when the relay cannot be reached or rejects
    /// the message.
    async fn send_offer(&self, email: &OfferEmail) -> Result<(), MailerError>;
}

// =============================================================================
// EMAILJS
// =============================================================================

pub struct EmailJsMailer {
    http: reqwest::Client,
    config: EmailJsConfig,
}

impl EmailJsMailer {
    pub fn new(config: EmailJsConfig) -> Result<Self, MailerError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| MailerError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, config })
    }

    pub(crate) fn endpoint(&self) -> String {
        format!("{}{SEND_PATH}", self.config.base_url)
    }
}

#[derive(Serialize)]
struct SendRequest<'a> {
    service_id: &'a str,
    template_id: &'a str,
    user_id: &'a str,
    template_params: &'a OfferEmail,
}

fn send_request<'a>(config: &'a EmailJsConfig, email: &'a OfferEmail) -> SendRequest<'a> {
    SendRequest {
        service_id: &config.service_id,
        template_id: &config.template_id,
        user_id: &config.public_key,
        template_params: email,
    }
}

#[async_trait::async_trait]
impl Mailer for EmailJsMailer {
    async fn send_offer(&self, email: &OfferEmail) -> Result<(), MailerError> {
        let response = self
            .http
            .post(self.endpoint())
            .json(&send_request(&self.config, email))
            .send()
            .await
            .map_err(|e| MailerError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MailerError::Response { status, body });
        }

        tracing::debug!(status, "offer email relayed");
        Ok(())
    }
}

#[cfg(test)]
#[path = "mailer_test.rs"]
mod tests;
