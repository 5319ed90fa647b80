//! Device, browser and OS classification from a `User-Agent` header.
//!
//! Plain substring matching; order matters because most browsers embed the
//! tokens of the engines they descend from (Edge contains "Chrome", Chrome
//! contains "Safari", Android contains "Linux").

use crate::domain::entities::UNKNOWN;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientInfo {
    pub device: String,
    pub browser: String,
    pub os: String,
}

impl ClientInfo {
    pub fn unknown() -> Self {
        Self {
            device: UNKNOWN.to_string(),
            browser: UNKNOWN.to_string(),
            os: UNKNOWN.to_string(),
        }
    }
}

pub fn parse_user_agent(user_agent: Option<&str>) -> ClientInfo {
    let Some(ua) = user_agent.filter(|ua| !ua.trim().is_empty()) else {
        return ClientInfo::unknown();
    };

    ClientInfo {
        device: device_type(ua).to_string(),
        browser: browser(ua).to_string(),
        os: operating_system(ua).to_string(),
    }
}

fn device_type(ua: &str) -> &'static str {
    if ua.contains("iPad") || (ua.contains("Android") && !ua.contains("Mobile")) {
        "Tablet"
    } else if ua.contains("Mobile") || ua.contains("iPhone") || ua.contains("Android") {
        "Mobile"
    } else {
        "Desktop"
    }
}

fn browser(ua: &str) -> &'static str {
    if ua.contains("Edg") {
        "Edge"
    } else if ua.contains("Firefox") || ua.contains("FxiOS") {
        "Firefox"
    } else if ua.contains("Chrome") || ua.contains("CriOS") {
        "Chrome"
    } else if ua.contains("Safari") {
        "Safari"
    } else {
        "Other"
    }
}

fn operating_system(ua: &str) -> &'static str {
    if ua.contains("iPhone") || ua.contains("iPad") || ua.contains("iOS") {
        "iOS"
    } else if ua.contains("Android") {
        "Android"
    } else if ua.contains("Windows") {
        "Windows"
    } else if ua.contains("Mac") {
        "macOS"
    } else if ua.contains("Linux") {
        "Linux"
    } else {
        "Other"
    }
}
