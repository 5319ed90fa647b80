//! Composition of tracking scripts for the interstitial page.
//!
//! Pure: the same inputs always produce the same fragments.

use crate::domain::entities::{Placement, ScriptKind, TrackingConfig, TrackingScript};

/// Values substituted into `{{destination_url}}`, `{{short_code}}` and `{{link_id}}`.
#[derive(Debug, Clone)]
pub struct ScriptContext<'a> {
    pub destination_url: &'a str,
    pub short_code: &'a str,
    pub link_id: i64,
}

/// Concatenated script markup per placement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComposedScripts {
    pub head: String,
    pub body: String,
    pub footer: String,
}

impl ComposedScripts {
    pub fn is_empty(&self) -> bool {
        self.head.is_empty() && self.body.is_empty() && self.footer.is_empty()
    }
}

/// Whether a granted visit should see the interstitial instead of a redirect.
///
/// Cloaking always needs the page. Otherwise tracking must be enabled and at
/// least one link script or owner integration script must be enabled.
pub fn should_serve_interstitial(config: &TrackingConfig, integration_scripts: &[TrackingScript]) -> bool {
    if config.cloaking {
        return true;
    }
    config.enabled
        && config
            .scripts
            .iter()
            .chain(integration_scripts)
            .any(|s| s.enabled)
}

/// Renders the enabled scripts into head, body and footer fragments.
///
/// Integration scripts come first, followed by the link's scripts; within
/// each source the declaration order is kept.
pub fn compose_scripts(
    integration_scripts: &[TrackingScript],
    link_scripts: &[TrackingScript],
    ctx: &ScriptContext<'_>,
) -> ComposedScripts {
    let mut composed = ComposedScripts::default();

    for script in integration_scripts
        .iter()
        .chain(link_scripts)
        .filter(|s| s.enabled)
    {
        let Some(markup) = render_script(&script.kind) else {
            continue;
        };
        let markup = substitute_placeholders(&markup, ctx);

        let slot = match script.placement {
            Placement::Head => &mut composed.head,
            Placement::Body => &mut composed.body,
            Placement::Footer => &mut composed.footer,
        };
        if !slot.is_empty() {
            slot.push('\n');
        }
        slot.push_str(&markup);
    }

    composed
}

fn substitute_placeholders(markup: &str, ctx: &ScriptContext<'_>) -> String {
    markup
        .replace("{{destination_url}}", ctx.destination_url)
        .replace("{{short_code}}", ctx.short_code)
        .replace("{{link_id}}", &ctx.link_id.to_string())
}

/// Vendor ids are embedded in JS string literals and URLs.
fn is_safe_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn render_script(kind: &ScriptKind) -> Option<String> {
    let markup = match kind {
        ScriptKind::GoogleAnalytics { measurement_id } => {
            if !is_safe_id(measurement_id) {
                tracing::warn!(measurement_id = %measurement_id, "Skipping Google Analytics script with invalid id");
                return None;
            }
            format!(
                "<script async src=\"https://www.googletagmanager.com/gtag/js?id={id}\"></script>\n\
                 <script>window.dataLayer=window.dataLayer||[];function gtag(){{dataLayer.push(arguments);}}gtag('js',new Date());gtag('config','{id}');</script>",
                id = measurement_id
            )
        }
        ScriptKind::FacebookPixel { pixel_id } => {
            if !is_safe_id(pixel_id) {
                tracing::warn!(pixel_id = %pixel_id, "Skipping Facebook Pixel script with invalid id");
                return None;
            }
            format!(
                "<script>!function(f,b,e,v,n,t,s){{if(f.fbq)return;n=f.fbq=function(){{n.callMethod?n.callMethod.apply(n,arguments):n.queue.push(arguments)}};\
                 if(!f._fbq)f._fbq=n;n.push=n;n.loaded=!0;n.version='2.0';n.queue=[];t=b.createElement(e);t.async=!0;\
                 t.src=v;s=b.getElementsByTagName(e)[0];s.parentNode.insertBefore(t,s)}}(window,document,'script','https://connect.facebook.net/en_US/fbevents.js');\
                 fbq('init','{id}');fbq('track','PageView');</script>",
                id = pixel_id
            )
        }
        ScriptKind::GoogleTagManager { container_id } => {
            if !is_safe_id(container_id) {
                tracing::warn!(container_id = %container_id, "Skipping Google Tag Manager script with invalid id");
                return None;
            }
            format!(
                "<script>(function(w,d,s,l,i){{w[l]=w[l]||[];w[l].push({{'gtm.start':new Date().getTime(),event:'gtm.js'}});\
                 var f=d.getElementsByTagName(s)[0],j=d.createElement(s),dl=l!='dataLayer'?'&l='+l:'';j.async=true;\
                 j.src='https://www.googletagmanager.com/gtm.js?id='+i+dl;f.parentNode.insertBefore(j,f);}})(window,document,'script','dataLayer','{id}');</script>",
                id = container_id
            )
        }
        ScriptKind::Custom { code } => code.clone(),
    };
    Some(markup)
}
