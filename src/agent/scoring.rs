//! Purpose: Score cited sources by domain trust and publication freshness.
//! Exports: `score_domain`, `score_freshness`.
//! Invariants: Scores are in [0.0, 1.0]; unknown inputs fall back to neutral values.
use time::format_description::well_known::{Iso8601, Rfc2822, Rfc3339};
use time::{OffsetDateTime, PrimitiveDateTime};
use url::Url;

const MAJOR_PUBLISHERS: &[&str] = &[
    "reuters",
    "apnews",
    "bbc",
    "nytimes",
    "wsj",
    "bloomberg",
    "economist",
    "npr",
    "theguardian",
    "washingtonpost",
];

const LOW_TRUST_HINTS: &[&str] = &[
    "blogspot",
    "wordpress",
    "medium.com",
    "pinterest",
    "reddit.com",
];

const NEUTRAL_FRESHNESS: f64 = 0.5;

pub fn score_domain(url: &str, publisher: &str) -> f64 {
    let mut score: f64 = 0.50;
    let publisher = publisher.to_lowercase();
    let host = host_of(url);

    if host.ends_with(".gov") {
        score += 0.35;
    } else if host.ends_with(".edu") {
        score += 0.30;
    } else if host.ends_with(".org") {
        score += 0.10;
    } else if host.is_empty() {
        score -= 0.10;
    }

    if MAJOR_PUBLISHERS
        .iter()
        .any(|name| host.contains(name) || publisher.contains(name))
    {
        score += 0.20;
    }

    if LOW_TRUST_HINTS.iter().any(|hint| host.contains(hint)) {
        score -= 0.20;
    }

    round_to(score, 3).clamp(0.0, 1.0)
}

/// Newer content scores higher. Missing or unparseable dates are neutral.
pub fn score_freshness(published_at: Option<&str>, now: OffsetDateTime) -> f64 {
    let Some(raw) = published_at else {
        return NEUTRAL_FRESHNESS;
    };
    let Some(published) = parse_timestamp(raw.trim()) else {
        return NEUTRAL_FRESHNESS;
    };

    let age_days = ((now - published).as_seconds_f64() / 86_400.0).max(0.0);
    let score = if age_days <= 1.0 {
        1.0
    } else if age_days <= 7.0 {
        0.9
    } else if age_days <= 30.0 {
        0.75
    } else if age_days <= 90.0 {
        0.6
    } else if age_days <= 365.0 {
        0.4
    } else {
        0.2
    };
    round_to(score, 3)
}

pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

fn host_of(url: &str) -> String {
    let host = Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(str::to_lowercase))
        .unwrap_or_default();
    match host.strip_prefix("www.") {
        Some(rest) => rest.to_string(),
        None => host,
    }
}

// RSS feeds use RFC 2822; APIs mostly RFC 3339. Offset-less ISO 8601 is UTC.
fn parse_timestamp(raw: &str) -> Option<OffsetDateTime> {
    if raw.is_empty() {
        return None;
    }
    OffsetDateTime::parse(raw, &Rfc2822)
        .or_else(|_| OffsetDateTime::parse(raw, &Rfc3339))
        .or_else(|_| OffsetDateTime::parse(raw, &Iso8601::DEFAULT))
        .or_else(|_| PrimitiveDateTime::parse(raw, &Iso8601::DEFAULT).map(|dt| dt.assume_utc()))
        .ok()
}
