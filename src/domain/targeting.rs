//! Geo and time targeting evaluation.
//!
//! All functions are pure: they take the rules, the visitor's location and
//! the current instant, and never touch storage.

use chrono::{DateTime, Datelike, FixedOffset, Offset, Timelike, Utc};

use crate::domain::entities::{GeoLocation, GeoRules, TimeRules};

fn contains_code(list: &[String], code: &str) -> bool {
    list.iter().any(|c| c.eq_ignore_ascii_case(code))
}

/// Returns whether a visitor at `location` may access a link with `rules`.
///
/// Blocked lists win over allowed lists. A non-empty allowed list rejects
/// every code not on it, including an unknown location.
pub fn check_geo_targeting(location: &GeoLocation, rules: &GeoRules) -> bool {
    if contains_code(&rules.blocked_countries, &location.country_code) {
        return false;
    }
    if !rules.allowed_countries.is_empty()
        && !contains_code(&rules.allowed_countries, &location.country_code)
    {
        return false;
    }
    if contains_code(&rules.blocked_regions, &location.region) {
        return false;
    }
    if !rules.allowed_regions.is_empty() && !contains_code(&rules.allowed_regions, &location.region)
    {
        return false;
    }
    true
}

/// Local wall-clock time for the rule's offset. Invalid offsets fall back to UTC.
fn local_time(rules: &TimeRules, now: DateTime<Utc>) -> DateTime<FixedOffset> {
    let offset = FixedOffset::east_opt(rules.utc_offset_minutes.saturating_mul(60))
        .unwrap_or_else(|| Utc.fix());
    now.with_timezone(&offset)
}

fn day_index(local: &DateTime<FixedOffset>) -> u8 {
    local.weekday().num_days_from_sunday() as u8
}

/// Returns whether a link with `rules` is accessible at `now`.
pub fn check_time_targeting(rules: &TimeRules, now: DateTime<Utc>) -> bool {
    if rules.expires_at.is_some_and(|e| now > e) {
        return false;
    }
    if rules.starts_at.is_some_and(|s| now < s) {
        return false;
    }

    let local = local_time(rules, now);

    if !rules.allowed_days.is_empty() && !rules.allowed_days.contains(&day_index(&local)) {
        return false;
    }

    if let Some(window) = rules.allowed_hours
        && !window.contains(local.hour() as u8)
    {
        return false;
    }

    true
}

/// Finds the geo override for `location`, preferring a region-level match.
pub fn find_geo_redirect<'a>(location: &GeoLocation, rules: &'a GeoRules) -> Option<&'a str> {
    let country_matches = |r: &&crate::domain::entities::GeoRedirect| {
        r.country.eq_ignore_ascii_case(&location.country_code)
    };

    rules
        .redirects
        .iter()
        .filter(country_matches)
        .find(|r| {
            r.region
                .as_deref()
                .is_some_and(|region| region.eq_ignore_ascii_case(&location.region))
        })
        .or_else(|| {
            rules
                .redirects
                .iter()
                .filter(country_matches)
                .find(|r| r.region.is_none())
        })
        .map(|r| r.url.as_str())
}

/// Finds the first time override matching `now`.
pub fn find_time_redirect(rules: &TimeRules, now: DateTime<Utc>) -> Option<&str> {
    let local = local_time(rules, now);
    let day = day_index(&local);
    let hour = local.hour() as u8;

    rules
        .redirects
        .iter()
        .find(|r| {
            (r.days.is_empty() || r.days.contains(&day))
                && r.hours.is_none_or(|w| w.contains(hour))
        })
        .map(|r| r.url.as_str())
}

/// Returns the geo override URL for `location`, or `default` when none matches.
pub fn get_geo_redirect_url(location: &GeoLocation, rules: &GeoRules, default: &str) -> String {
    find_geo_redirect(location, rules)
        .unwrap_or(default)
        .to_string()
}

/// Returns the time override URL for `now`, or `default` when none matches.
pub fn get_time_redirect_url(rules: &TimeRules, now: DateTime<Utc>, default: &str) -> String {
    find_time_redirect(rules, now)
        .unwrap_or(default)
        .to_string()
}
