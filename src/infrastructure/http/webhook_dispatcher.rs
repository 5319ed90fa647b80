//! Webhook delivery over HTTP.

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;
use std::time::Duration;

use crate::domain::click_event::WebhookPayload;
use crate::domain::click_worker::WebhookDispatcher;
use crate::domain::entities::WebhookTarget;
use crate::error::AppError;

pub const SIGNATURE_HEADER: &str = "X-Nanhi-Signature";

/// Returns `sha256=<hex>` of the HMAC-SHA256 of `body` under `secret`.
pub fn sign_body(secret: &str, body: &[u8]) -> Result<String, AppError> {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
        .map_err(|_| AppError::internal("Invalid webhook secret", json!({})))?;
    mac.update(body);
    Ok(format!("sha256={}", hex::encode(mac.finalize().into_bytes())))
}

/// POSTs JSON payloads with a per-request timeout. No retries.
pub struct HttpWebhookDispatcher {
    client: reqwest::Client,
}

impl HttpWebhookDispatcher {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("nanhi-link/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl WebhookDispatcher for HttpWebhookDispatcher {
    async fn dispatch(
        &self,
        target: &WebhookTarget,
        payload: &WebhookPayload,
    ) -> Result<(), AppError> {
        let body = serde_json::to_vec(payload)
            .map_err(|e| AppError::internal(format!("Failed to encode webhook: {}", e), json!({})))?;

        let mut request = self
            .client
            .post(&target.url)
            .header(reqwest::header::CONTENT_TYPE, "application/json");

        if let Some(secret) = target.secret.as_deref().filter(|s| !s.is_empty()) {
            request = request.header(SIGNATURE_HEADER, sign_body(secret, &body)?);
        }

        let response = request.body(body).send().await.map_err(|e| {
            AppError::internal(
                format!("Webhook request failed: {}", e),
                json!({ "integration_id": target.integration_id }),
            )
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::internal(
                format!("Webhook endpoint returned {}", status),
                json!({ "integration_id": target.integration_id, "status": status.as_u16() }),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_body_known_vector() {
        // RFC 4231 test case 2.
        let sig = sign_body("Jefe", b"what do ya want for nothing?").unwrap();
        assert_eq!(
            sig,
            "sha256=5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn test_sign_body_depends_on_secret() {
        let a = sign_body("one", b"{}").unwrap();
        let b = sign_body("two", b"{}").unwrap();
        assert_ne!(a, b);
        assert!(a.starts_with("sha256="));
    }
}
