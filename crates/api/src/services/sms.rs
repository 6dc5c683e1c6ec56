//! SMS delivery collaborator.
//!
//! One-time codes are delivered through an external HTTP gateway. In
//! development (or when no gateway is configured) the console variant logs
//! the code instead of sending it, which keeps the issue flow exercisable
//! without a provider account.

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use thiserror::Error;

use farmstellar_core::{OtpCode, Phone};

use crate::config::SmsConfig;

/// Errors that can occur during SMS delivery.
#[derive(Debug, Error)]
pub enum SmsError {
    /// Transport-level failure talking to the gateway.
    #[error("SMS gateway request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The gateway answered with a non-success status.
    #[error("SMS gateway rejected the message (status {0})")]
    Rejected(u16),
}

#[derive(Serialize)]
struct GatewayMessage<'a> {
    to: &'a str,
    body: String,
}

/// Delivery channel for one-time codes.
pub enum SmsGateway {
    /// POST the message to an HTTP gateway.
    Http {
        client: reqwest::Client,
        url: String,
        token: SecretString,
    },
    /// Log the code instead of sending (development / no gateway configured).
    Console,
}

impl SmsGateway {
    /// Build the gateway from configuration.
    #[must_use]
    pub fn from_config(config: Option<&SmsConfig>) -> Self {
        config.map_or(Self::Console, |sms| Self::Http {
            client: reqwest::Client::new(),
            url: sms.gateway_url.clone(),
            token: sms.token.clone(),
        })
    }

    /// Deliver a one-time code to a phone.
    ///
    /// # Errors
    ///
    /// Returns `SmsError` if the gateway cannot be reached or rejects the
    /// message. Console delivery never fails.
    pub async fn send_code(&self, phone: &Phone, code: &OtpCode) -> Result<(), SmsError> {
        match self {
            Self::Http { client, url, token } => {
                let message = GatewayMessage {
                    to: phone.as_str(),
                    body: format!("Your Farmstellar verification code is {code}"),
                };

                let response = client
                    .post(url)
                    .bearer_auth(token.expose_secret())
                    .json(&message)
                    .send()
                    .await?;

                let status = response.status();
                if !status.is_success() {
                    return Err(SmsError::Rejected(status.as_u16()));
                }

                tracing::info!(phone = %phone, "OTP delivered via gateway");
                Ok(())
            }
            Self::Console => {
                tracing::info!(phone = %phone, code = %code, "OTP (console delivery)");
                Ok(())
            }
        }
    }
}
