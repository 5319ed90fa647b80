//! HTML pages served by the redirect service.
//!
//! Every page is an Askama template under `templates/`, rendered as
//! `text/html; charset=utf-8` through `askama_web`.

use askama::Template;
use askama_web::WebTemplate;

use crate::application::services::redirect_service::InterstitialPage;

#[derive(Template, WebTemplate)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate {
    pub short_code: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "expired.html")]
pub struct ExpiredTemplate {
    pub short_code: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "limit_reached.html")]
pub struct LimitReachedTemplate {
    pub short_code: String,
}

/// GET form that resubmits the short code with the password in `p`.
#[derive(Template, WebTemplate)]
#[template(path = "password.html")]
pub struct PasswordTemplate {
    pub short_code: String,
    pub invalid_attempt: bool,
}

#[derive(Template, WebTemplate)]
#[template(path = "unavailable.html")]
pub struct UnavailableTemplate {}

#[derive(Template, WebTemplate)]
#[template(path = "error.html")]
pub struct ErrorTemplate {}

/// Tracking page shown before the client-side redirect.
///
/// Script fragments are inserted unescaped; `destination_js` and
/// `short_code_js` are JSON string literals safe inside `<script>`.
#[derive(Template, WebTemplate)]
#[template(path = "interstitial.html")]
pub struct InterstitialTemplate {
    pub destination_url: String,
    pub destination_js: String,
    pub short_code_js: String,
    pub delay_ms: u64,
    pub cloaking: bool,
    pub head_scripts: String,
    pub body_scripts: String,
    pub footer_scripts: String,
}

impl From<InterstitialPage> for InterstitialTemplate {
    fn from(page: InterstitialPage) -> Self {
        Self {
            destination_js: js_string(&page.destination_url),
            short_code_js: js_string(&page.short_code),
            destination_url: page.destination_url,
            delay_ms: u64::from(page.delay_seconds) * 1000,
            cloaking: page.cloaking,
            head_scripts: page.scripts.head,
            body_scripts: page.scripts.body,
            footer_scripts: page.scripts.footer,
        }
    }
}

/// Encodes `value` as a JSON string literal that cannot close a `<script>` block.
pub fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string())
        .to_string()
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026")
        .replace('\u{2028}', "\\u2028")
        .replace('\u{2029}', "\\u2029")
}
