//! UTM parameter injection into destination URLs.

use url::Url;

use crate::domain::entities::UtmParams;

/// Appends the link's UTM parameters to `destination`.
///
/// Existing `utm_*` keys that the link configures are replaced; all other
/// query parameters keep their order. A destination that does not parse as
/// a URL is returned unchanged.
pub fn inject_utm(destination: &str, utm: &UtmParams) -> String {
    let pairs = utm.pairs();
    if pairs.is_empty() {
        return destination.to_string();
    }

    let Ok(mut url) = Url::parse(destination) else {
        tracing::warn!(destination, "Skipping UTM injection for unparsable URL");
        return destination.to_string();
    };

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !pairs.iter().any(|(utm_key, _)| *utm_key == &**key))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    {
        let mut query = url.query_pairs_mut();
        query.clear();
        query.extend_pairs(kept.iter());
        query.extend_pairs(pairs.iter());
    }

    url.to_string()
}
