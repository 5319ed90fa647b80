//! Helpers shared by the API, the redirect service and the admin CLI.
//!
//! - [`code_generator`] - Short code generation and validation
//! - [`url_normalizer`] - Destination URL validation
//! - [`utm`] - UTM parameter injection
//! - [`password`] - Argon2id link passwords
//! - [`ip`] - Client IP extraction and masking

pub mod code_generator;
pub mod ip;
pub mod password;
pub mod url_normalizer;
pub mod utm;
