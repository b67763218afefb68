//! Purpose: Answer providers backed by public search APIs.
//! Exports: `Provider`, `ProviderAnswer`, `Source`, `HttpProviderConfig`,
//! `DuckDuckGo`, `Wikipedia`, `GoogleNews`.
//! Role: Fetch a candidate answer plus cited sources for one query.
//! Invariants: Every provider returns the normalized `ProviderAnswer` shape.
//! Invariants: Response parsing is split from transport so it can be tested offline.
#![allow(clippy::result_large_err)]

use crate::core::error::{Error, ErrorKind};
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::error::Error as StdError;
use std::sync::LazyLock;
use std::time::Duration;
use url::Url;

const DUCKDUCKGO_URL: &str = "https://api.duckduckgo.com/";
const WIKIPEDIA_SEARCH_URL: &str = "https://en.wikipedia.org/w/api.php";
const WIKIPEDIA_SUMMARY_URL: &str = "https://en.wikipedia.org/api/rest_v1/page/summary/";
const GOOGLE_NEWS_RSS_URL: &str = "https://news.google.com/rss/search";
const GOOGLE_NEWS_MAX_ITEMS: usize = 5;
const NO_SUMMARY: &str = "No summary available.";

pub trait Provider: Send + Sync {
    fn name(&self) -> &str;
    fn fetch(&self, query: &str) -> Result<ProviderAnswer, Error>;
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub title: String,
    pub url: String,
    pub publisher: String,
    pub published_at: Option<String>,
    pub domain_score: f64,
    pub freshness_score: f64,
}

impl Source {
    /// A source with neutral scores; the agent rescores it before ranking.
    pub fn unscored(
        title: impl Into<String>,
        url: impl Into<String>,
        publisher: impl Into<String>,
        published_at: Option<String>,
    ) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            publisher: publisher.into(),
            published_at,
            domain_score: 0.5,
            freshness_score: 0.5,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ProviderAnswer {
    pub provider: String,
    pub claim: String,
    pub answer: String,
    pub sources: Vec<Source>,
    pub base_confidence: f64,
    pub reasoning_notes: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct HttpProviderConfig {
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpProviderConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            user_agent: format!("agent-explorer/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpProviderConfig {
    pub fn validate(&self) -> Result<(), Error> {
        if self.timeout.is_zero() {
            return Err(Error::new(ErrorKind::Usage)
                .with_message("provider timeout must be greater than zero")
                .with_hint("Use a positive value like 10s."));
        }
        Ok(())
    }
}

/// User-facing error text with the first underlying cause appended.
pub(crate) fn error_detail(err: &Error) -> String {
    let message = err.display_message();
    match err.source() {
        Some(cause) => format!("{message}: {cause}"),
        None => message,
    }
}

#[derive(Clone)]
struct HttpFetcher {
    agent: ureq::Agent,
    user_agent: String,
}

impl HttpFetcher {
    fn new(config: &HttpProviderConfig) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(config.timeout).build(),
            user_agent: config.user_agent.clone(),
        }
    }

    fn get_text(&self, url: &Url) -> Result<String, Error> {
        let response = self
            .agent
            .get(url.as_str())
            .set("User-Agent", &self.user_agent)
            .call();
        match response {
            Ok(resp) => resp.into_string().map_err(|err| {
                Error::new(ErrorKind::Io)
                    .with_message("failed to read response body")
                    .with_source(err)
            }),
            Err(ureq::Error::Status(code, resp)) => {
                Err(Error::request_failed(code, resp.into_string().unwrap_or_default()))
            }
            Err(ureq::Error::Transport(err)) => Err(Error::new(ErrorKind::Io)
                .with_message(format!("request to {} failed", url.host_str().unwrap_or("?")))
                .with_source(err)),
        }
    }

    fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T, Error> {
        let body = self.get_text(url)?;
        serde_json::from_str(&body).map_err(|err| {
            Error::new(ErrorKind::Decode)
                .with_message("invalid provider json")
                .with_source(err)
        })
    }
}

fn build_url(base: &str, params: &[(&str, &str)]) -> Result<Url, Error> {
    Url::parse_with_params(base, params).map_err(|err| {
        Error::new(ErrorKind::Internal)
            .with_message("invalid provider url")
            .with_source(err)
    })
}

// DuckDuckGo instant answers.

pub struct DuckDuckGo {
    http: HttpFetcher,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DuckDuckGoResponse {
    #[serde(default)]
    abstract_text: String,
    #[serde(default)]
    abstract_source: Option<String>,
    #[serde(default, rename = "AbstractURL")]
    abstract_url: Option<String>,
    #[serde(default)]
    related_topics: Vec<Value>,
}

impl DuckDuckGo {
    pub fn new(config: &HttpProviderConfig) -> Self {
        Self {
            http: HttpFetcher::new(config),
        }
    }
}

impl Provider for DuckDuckGo {
    fn name(&self) -> &str {
        "duckduckgo"
    }

    fn fetch(&self, query: &str) -> Result<ProviderAnswer, Error> {
        let url = build_url(
            DUCKDUCKGO_URL,
            &[
                ("q", query),
                ("format", "json"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
            ],
        )?;
        let response: DuckDuckGoResponse = self.http.get_json(&url)?;
        Ok(duckduckgo_answer(query, response))
    }
}

fn duckduckgo_answer(query: &str, response: DuckDuckGoResponse) -> ProviderAnswer {
    let (answer, source_title, source_url) = if !response.abstract_text.is_empty() {
        (
            response.abstract_text,
            response
                .abstract_source
                .unwrap_or_else(|| "DuckDuckGo".to_string()),
            response.abstract_url.unwrap_or_default(),
        )
    } else if let Some((text, url)) = response.related_topics.iter().find_map(|topic| {
        let text = topic.get("Text")?.as_str()?;
        let url = topic.get("FirstURL").and_then(Value::as_str).unwrap_or("");
        Some((text.to_string(), url.to_string()))
    }) {
        (text, "DuckDuckGo related Topics".to_string(), url)
    } else {
        (
            "No instant answer".to_string(),
            "DuckDuckGo".to_string(),
            String::new(),
        )
    };

    let sources = if source_url.is_empty() && source_title.is_empty() {
        Vec::new()
    } else {
        vec![Source::unscored(
            source_title.clone(),
            source_url,
            source_title,
            None,
        )]
    };
    let base_confidence = if answer.is_empty() { 0.20 } else { 0.60 };

    ProviderAnswer {
        provider: "duckduckgo".to_string(),
        claim: query.to_string(),
        answer,
        sources,
        base_confidence,
        reasoning_notes: vec!["Normalized DuckDuckGo response.".to_string()],
    }
}

// Wikipedia: top search hit, then its page summary.

pub struct Wikipedia {
    http: HttpFetcher,
}

#[derive(Debug, Default, Deserialize)]
struct WikipediaSearchResponse {
    #[serde(default)]
    query: WikipediaSearchQuery,
}

#[derive(Debug, Default, Deserialize)]
struct WikipediaSearchQuery {
    #[serde(default)]
    search: Vec<WikipediaSearchHit>,
}

#[derive(Debug, Deserialize)]
struct WikipediaSearchHit {
    title: String,
}

#[derive(Debug, Default, Deserialize)]
struct WikipediaSummary {
    #[serde(default)]
    extract: Option<String>,
    #[serde(default)]
    content_urls: Option<Value>,
}

impl Wikipedia {
    pub fn new(config: &HttpProviderConfig) -> Self {
        Self {
            http: HttpFetcher::new(config),
        }
    }

    fn lookup(&self, query: &str) -> Result<ProviderAnswer, Error> {
        let search_url = build_url(
            WIKIPEDIA_SEARCH_URL,
            &[
                ("action", "query"),
                ("list", "search"),
                ("srsearch", query),
                ("format", "json"),
                ("utf8", "1"),
                ("srlimit", "1"),
            ],
        )?;
        let search: WikipediaSearchResponse = self.http.get_json(&search_url)?;
        let Some(hit) = search.query.search.into_iter().next() else {
            return Ok(wikipedia_no_hits(query));
        };

        let mut summary_url = Url::parse(WIKIPEDIA_SUMMARY_URL).map_err(|err| {
            Error::new(ErrorKind::Internal)
                .with_message("invalid provider url")
                .with_source(err)
        })?;
        if let Ok(mut segments) = summary_url.path_segments_mut() {
            segments.pop_if_empty().push(&hit.title);
        }
        let summary: WikipediaSummary = self.http.get_json(&summary_url)?;
        Ok(wikipedia_answer(query, &hit.title, summary))
    }
}

impl Provider for Wikipedia {
    fn name(&self) -> &str {
        "wikipedia"
    }

    fn fetch(&self, query: &str) -> Result<ProviderAnswer, Error> {
        match self.lookup(query) {
            Ok(answer) => Ok(answer),
            Err(err) if err.kind() == ErrorKind::Internal => Err(err),
            Err(err) => {
                tracing::warn!(error = %err, "wikipedia lookup failed");
                Ok(wikipedia_failure(query, &err))
            }
        }
    }
}

fn wikipedia_no_hits(query: &str) -> ProviderAnswer {
    ProviderAnswer {
        provider: "wikipedia".to_string(),
        claim: query.to_string(),
        answer: "No Wikipedia result found.".to_string(),
        sources: Vec::new(),
        base_confidence: 0.2,
        reasoning_notes: vec!["Wikipedia search returned no hits.".to_string()],
    }
}

fn wikipedia_failure(query: &str, err: &Error) -> ProviderAnswer {
    ProviderAnswer {
        provider: "wikipedia".to_string(),
        claim: query.to_string(),
        answer: format!("Wikipedia request failed: {}", error_detail(err)),
        sources: Vec::new(),
        base_confidence: 0.1,
        reasoning_notes: vec!["Network/API error while calling Wikipedia.".to_string()],
    }
}

fn wikipedia_answer(query: &str, title: &str, summary: WikipediaSummary) -> ProviderAnswer {
    let extract = summary
        .extract
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| NO_SUMMARY.to_string());
    let page_url = summary
        .content_urls
        .as_ref()
        .and_then(|urls| urls.pointer("/desktop/page"))
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();
    let base_confidence = if extract != NO_SUMMARY { 0.75 } else { 0.45 };

    ProviderAnswer {
        provider: "wikipedia".to_string(),
        claim: query.to_string(),
        answer: extract,
        sources: vec![Source::unscored(
            title.to_string(),
            page_url,
            "Wikipedia".to_string(),
            None,
        )],
        base_confidence,
        reasoning_notes: vec![format!("Selected top Wikipedia search hit: {title}")],
    }
}

// Google News RSS search.

pub struct GoogleNews {
    http: HttpFetcher,
}

impl GoogleNews {
    pub fn new(config: &HttpProviderConfig) -> Self {
        Self {
            http: HttpFetcher::new(config),
        }
    }
}

impl Provider for GoogleNews {
    fn name(&self) -> &str {
        "google_news"
    }

    fn fetch(&self, query: &str) -> Result<ProviderAnswer, Error> {
        let url = build_url(
            GOOGLE_NEWS_RSS_URL,
            &[("q", query), ("hl", "en-US"), ("gl", "US"), ("ceid", "US:en")],
        )?;
        let body = self.http.get_text(&url)?;
        Ok(google_news_answer(query, parse_rss_items(&body)))
    }
}

fn google_news_answer(query: &str, items: Vec<Source>) -> ProviderAnswer {
    let answer = items
        .first()
        .map(|item| item.title.clone())
        .unwrap_or_else(|| "No results found".to_string());
    let base_confidence = if items.is_empty() { 0.2 } else { 0.5 };
    ProviderAnswer {
        provider: "google_news".to_string(),
        claim: query.to_string(),
        answer,
        sources: items,
        base_confidence,
        reasoning_notes: vec!["Fetched from Google News".to_string()],
    }
}

static RSS_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<item\b[^>]*>(.*?)</item>").expect("item pattern"));
static RSS_TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<title\b[^>]*>(.*?)</title>").expect("title pattern"));
static RSS_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<link\b[^>]*>(.*?)</link>").expect("link pattern"));
static RSS_PUB_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<pubDate\b[^>]*>(.*?)</pubDate>").expect("date pattern"));

/// Extracts up to five feed items. Titles shaped `headline - Publisher` are split.
fn parse_rss_items(xml: &str) -> Vec<Source> {
    RSS_ITEM
        .captures_iter(xml)
        .take(GOOGLE_NEWS_MAX_ITEMS)
        .map(|item| {
            let body = item.get(1).map(|m| m.as_str()).unwrap_or("");
            let raw_title = rss_field(&RSS_TITLE, body).unwrap_or_default();
            let raw_title = raw_title.trim();
            let (title, publisher) = match raw_title.rsplit_once(" - ") {
                Some((title, publisher)) if !publisher.is_empty() => {
                    (title.to_string(), publisher.to_string())
                }
                Some((title, _)) => (title.to_string(), "Google News".to_string()),
                None => (raw_title.to_string(), "Google News".to_string()),
            };
            Source::unscored(
                title,
                rss_field(&RSS_LINK, body).unwrap_or_default(),
                publisher,
                rss_field(&RSS_PUB_DATE, body),
            )
        })
        .collect()
}

fn rss_field(pattern: &Regex, item: &str) -> Option<String> {
    let raw = pattern.captures(item)?.get(1)?.as_str().trim();
    let raw = raw
        .strip_prefix("<![CDATA[")
        .and_then(|rest| rest.strip_suffix("]]>"))
        .unwrap_or(raw);
    Some(decode_entities(raw))
}

fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::{
        DuckDuckGoResponse, HttpProviderConfig, WikipediaSummary, duckduckgo_answer,
        google_news_answer, parse_rss_items, wikipedia_answer, wikipedia_failure,
        wikipedia_no_hits,
    };
    use crate::core::error::{Error, ErrorKind};
    use serde_json::json;
    use std::io;
    use std::time::Duration;

    #[test]
    fn zero_timeout_is_rejected() {
        let config = HttpProviderConfig {
            timeout: Duration::ZERO,
            ..HttpProviderConfig::default()
        };
        let err = config.validate().expect_err("zero timeout");
        assert_eq!(err.kind(), ErrorKind::Usage);
        assert!(err.hint().is_some());
        HttpProviderConfig::default().validate().expect("default is valid");
    }

    #[test]
    fn wikipedia_failure_keeps_transport_cause() {
        let err = Error::new(ErrorKind::Io)
            .with_message("request to en.wikipedia.org failed")
            .with_source(io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused"));
        let answer = wikipedia_failure("q", &err);
        assert_eq!(
            answer.answer,
            "Wikipedia request failed: request to en.wikipedia.org failed: connection refused"
        );
        assert_eq!(answer.base_confidence, 0.1);
    }

    #[test]
    fn duckduckgo_prefers_abstract() {
        let response: DuckDuckGoResponse = serde_json::from_value(json!({
            "AbstractText": "Rust is a systems language.",
            "AbstractSource": "Wikipedia",
            "AbstractURL": "https://en.wikipedia.org/wiki/Rust",
            "RelatedTopics": [{"Text": "ignored", "FirstURL": "https://duckduckgo.com/x"}]
        }))
        .expect("response");
        let answer = duckduckgo_answer("rust", response);
        assert_eq!(answer.answer, "Rust is a systems language.");
        assert_eq!(answer.base_confidence, 0.60);
        assert_eq!(answer.sources.len(), 1);
        assert_eq!(answer.sources[0].publisher, "Wikipedia");
        assert_eq!(answer.sources[0].url, "https://en.wikipedia.org/wiki/Rust");
    }

    #[test]
    fn duckduckgo_falls_back_to_first_topic_with_text() {
        let response: DuckDuckGoResponse = serde_json::from_value(json!({
            "AbstractText": "",
            "RelatedTopics": [
                {"Name": "group", "Topics": []},
                {"Text": "Rust (fungus)", "FirstURL": "https://duckduckgo.com/Rust_fungus"}
            ]
        }))
        .expect("response");
        let answer = duckduckgo_answer("rust", response);
        assert_eq!(answer.answer, "Rust (fungus)");
        assert_eq!(answer.sources[0].title, "DuckDuckGo related Topics");
    }

    #[test]
    fn duckduckgo_without_hits_still_cites_itself() {
        let answer = duckduckgo_answer("zzz", DuckDuckGoResponse::default());
        assert_eq!(answer.answer, "No instant answer");
        assert_eq!(answer.sources.len(), 1);
        assert_eq!(answer.sources[0].url, "");
    }

    #[test]
    fn wikipedia_summary_sets_confidence() {
        let summary: WikipediaSummary = serde_json::from_value(json!({
            "extract": "The Eiffel Tower is a tower in Paris.",
            "content_urls": {"desktop": {"page": "https://en.wikipedia.org/wiki/Eiffel_Tower"}}
        }))
        .expect("summary");
        let answer = wikipedia_answer("eiffel", "Eiffel Tower", summary);
        assert_eq!(answer.base_confidence, 0.75);
        assert_eq!(answer.sources[0].url, "https://en.wikipedia.org/wiki/Eiffel_Tower");
        assert_eq!(
            answer.reasoning_notes,
            ["Selected top Wikipedia search hit: Eiffel Tower"]
        );

        let empty = wikipedia_answer("eiffel", "Eiffel Tower", WikipediaSummary::default());
        assert_eq!(empty.answer, "No summary available.");
        assert_eq!(empty.base_confidence, 0.45);
    }

    #[test]
    fn wikipedia_no_hits_is_low_confidence() {
        let answer = wikipedia_no_hits("qqq");
        assert!(answer.sources.is_empty());
        assert_eq!(answer.base_confidence, 0.2);
    }

    #[test]
    fn rss_items_split_publisher_and_decode_entities() {
        let xml = r#"<rss><channel><title>feed</title>
            <item><title>Rust 2.0 &amp; beyond - The Register</title>
              <link>https://news.example.com/a</link>
              <pubDate>Mon, 09 Mar 2026 18:00:00 GMT</pubDate></item>
            <item><title><![CDATA[Plain headline]]></title><link>https://b.example</link></item>
            </channel></rss>"#;
        let items = parse_rss_items(xml);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "Rust 2.0 & beyond");
        assert_eq!(items[0].publisher, "The Register");
        assert_eq!(
            items[0].published_at.as_deref(),
            Some("Mon, 09 Mar 2026 18:00:00 GMT")
        );
        assert_eq!(items[1].title, "Plain headline");
        assert_eq!(items[1].publisher, "Google News");
        assert_eq!(items[1].published_at, None);
    }

    #[test]
    fn rss_keeps_first_five_items() {
        let xml: String = (0..8)
            .map(|idx| format!("<item><title>story {idx}</title></item>"))
            .collect();
        let items = parse_rss_items(&xml);
        assert_eq!(items.len(), 5);
        let answer = google_news_answer("q", items);
        assert_eq!(answer.answer, "story 0");
        assert_eq!(answer.base_confidence, 0.5);
    }

    #[test]
    fn google_news_without_items_is_low_confidence() {
        let answer = google_news_answer("q", Vec::new());
        assert_eq!(answer.answer, "No results found");
        assert_eq!(answer.base_confidence, 0.2);
    }
}
