//! Short code generation and validation.

use crate::error::AppError;
use base64::Engine as _;
use serde_json::json;

/// Random bytes per generated code; 6 bytes encode to 8 URL-safe characters.
const CODE_LENGTH_BYTES: usize = 6;

pub const MIN_CUSTOM_CODE_LEN: usize = 4;
pub const MAX_CUSTOM_CODE_LEN: usize = 50;

/// Codes that collide with routes on either server. Only names that pass
/// the length and character checks belong here; `/api` is already shorter
/// than any custom code.
const RESERVED_CODES: &[&str] = &["health", "admin", "static", "assets", "metrics"];

/// Generates a random 8-character URL-safe short code.
///
/// # Errors
///
/// Returns [`AppError::Internal`] if the system RNG is unavailable.
pub fn generate_code() -> Result<String, AppError> {
    let mut buffer = [0u8; CODE_LENGTH_BYTES];

    getrandom::fill(&mut buffer).map_err(|e| {
        tracing::error!(error = %e, "System RNG unavailable");
        AppError::internal("Failed to generate short code", json!({}))
    })?;

    Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(buffer))
}

/// Validates a caller-chosen short code.
///
/// Codes are 4-50 characters of `[A-Za-z0-9_-]` and must not shadow a
/// reserved route. Comparison against reserved names ignores case.
///
/// # Errors
///
/// Returns [`AppError::Validation`] with code `INVALID_SHORT_CODE`.
pub fn validate_custom_code(code: &str) -> Result<(), AppError> {
    let invalid = |message: &str| {
        AppError::bad_request(message, json!({ "short_code": code }))
            .with_code("INVALID_SHORT_CODE")
    };

    if code.len() < MIN_CUSTOM_CODE_LEN || code.len() > MAX_CUSTOM_CODE_LEN {
        return Err(AppError::bad_request(
            format!(
                "Short code must be {}-{} characters",
                MIN_CUSTOM_CODE_LEN, MAX_CUSTOM_CODE_LEN
            ),
            json!({ "short_code": code, "provided_length": code.len() }),
        )
        .with_code("INVALID_SHORT_CODE"));
    }

    if !code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(invalid(
            "Short code can only contain letters, digits, hyphens and underscores",
        ));
    }

    if RESERVED_CODES
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(code))
    {
        return Err(invalid("This short code is reserved"));
    }

    Ok(())
}
