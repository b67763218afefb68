//! Purpose: Fact-checking agent that answers a question from several providers.
//! Exports: `Agent`, `AgentReport`, `CandidateReward`, and the submodules.
//! Role: Backend behind `serve` and `batch`; produces the field mapping the client renders.
//! Invariants: Providers run in route order; a provider failure becomes a low-confidence
//! candidate instead of failing the query.
//! Invariants: The best candidate is the first one with the maximal total reward.
pub mod classify;
pub mod providers;
pub mod reward;
pub mod scoring;

use classify::{QueryType, classify_query_type};
use providers::{
    DuckDuckGo, GoogleNews, HttpProviderConfig, Provider, ProviderAnswer, Source, Wikipedia,
    error_detail,
};
use reward::{DEFAULT_WEIGHTS, RewardBreakdown, RewardTerms, compute_reward};
use scoring::{score_domain, score_freshness};

use crate::core::error::Error;
use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};
use std::sync::Arc;
use time::OffsetDateTime;

const NO_SOURCES_CITATION_QUALITY: f64 = 0.3;
const NO_SOURCES_FRESHNESS: f64 = 0.5;
const FAILED_PROVIDER_CONFIDENCE: f64 = 0.05;

#[derive(Clone)]
pub struct Agent {
    duckduckgo: Arc<dyn Provider>,
    wikipedia: Arc<dyn Provider>,
    google_news: Arc<dyn Provider>,
    weights: RewardTerms,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AgentReport {
    pub claim: String,
    pub query_type: QueryType,
    pub answer: String,
    pub sources: Vec<Source>,
    pub confidence: f64,
    pub reasoning_notes: Vec<String>,
    #[serde(serialize_with = "breakdown_or_empty")]
    pub reward_breakdown: Option<RewardBreakdown>,
    pub candidate_rewards: Vec<CandidateReward>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CandidateReward {
    pub provider: String,
    pub total_reward: f64,
}

#[derive(Clone, Debug)]
struct Candidate {
    provider: String,
    claim: String,
    answer: String,
    sources: Vec<Source>,
    reward_breakdown: RewardBreakdown,
    total_reward: f64,
    reasoning_notes: Vec<String>,
}

impl Agent {
    pub fn new(
        duckduckgo: Arc<dyn Provider>,
        wikipedia: Arc<dyn Provider>,
        google_news: Arc<dyn Provider>,
    ) -> Self {
        Self {
            duckduckgo,
            wikipedia,
            google_news,
            weights: DEFAULT_WEIGHTS,
        }
    }

    /// Agent wired to the public DuckDuckGo, Wikipedia, and Google News endpoints.
    pub fn with_http(config: &HttpProviderConfig) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self::new(
            Arc::new(DuckDuckGo::new(config)),
            Arc::new(Wikipedia::new(config)),
            Arc::new(GoogleNews::new(config)),
        ))
    }

    pub fn with_weights(mut self, weights: RewardTerms) -> Self {
        self.weights = weights;
        self
    }

    fn route(&self, query_type: QueryType) -> Vec<&dyn Provider> {
        match query_type {
            QueryType::Math => vec![self.duckduckgo.as_ref(), self.wikipedia.as_ref()],
            QueryType::Ambiguous => vec![
                self.duckduckgo.as_ref(),
                self.google_news.as_ref(),
                self.wikipedia.as_ref(),
            ],
            QueryType::Factual => vec![
                self.wikipedia.as_ref(),
                self.duckduckgo.as_ref(),
                self.google_news.as_ref(),
            ],
        }
    }

    pub fn answer(&self, query: &str) -> AgentReport {
        self.answer_at(query, OffsetDateTime::now_utc())
    }

    pub fn answer_at(&self, query: &str, now: OffsetDateTime) -> AgentReport {
        let query = query.trim();
        let query_type = classify_query_type(query);
        let providers = self.route(query_type);
        tracing::info!(%query_type, providers = providers.len(), "answering query");
        answer_with(query, query_type, &providers, &self.weights, now)
    }
}

fn answer_with(
    query: &str,
    query_type: QueryType,
    providers: &[&dyn Provider],
    weights: &RewardTerms,
    now: OffsetDateTime,
) -> AgentReport {
    let candidates: Vec<Candidate> = providers
        .iter()
        .map(|provider| {
            let raw = provider.fetch(query).unwrap_or_else(|err| {
                tracing::warn!(provider = provider.name(), error = %err, "provider failed");
                failed_provider_answer(provider.name(), query, &error_detail(&err))
            });
            score_candidate(raw, query_type, weights, now)
        })
        .collect();

    let Some(best) = select_best(&candidates) else {
        return AgentReport {
            claim: query.to_string(),
            query_type,
            answer: "No candidates returned.".to_string(),
            sources: Vec::new(),
            confidence: 0.0,
            reasoning_notes: vec!["No provider candidates available.".to_string()],
            reward_breakdown: None,
            candidate_rewards: Vec::new(),
        };
    };

    let mut reasoning_notes = best.reasoning_notes.clone();
    reasoning_notes.push(format!("Selected provider: {}", best.provider));

    AgentReport {
        claim: best.claim.clone(),
        query_type,
        answer: best.answer.clone(),
        sources: best.sources.clone(),
        confidence: best.total_reward,
        reasoning_notes,
        reward_breakdown: Some(best.reward_breakdown.clone()),
        candidate_rewards: candidates
            .iter()
            .map(|candidate| CandidateReward {
                provider: candidate.provider.clone(),
                total_reward: candidate.total_reward,
            })
            .collect(),
    }
}

fn failed_provider_answer(provider: &str, query: &str, reason: &str) -> ProviderAnswer {
    ProviderAnswer {
        provider: provider.to_string(),
        claim: query.to_string(),
        answer: format!("Provider failed: {reason}"),
        sources: Vec::new(),
        base_confidence: FAILED_PROVIDER_CONFIDENCE,
        reasoning_notes: vec![format!("{provider} failed.")],
    }
}

fn score_candidate(
    raw: ProviderAnswer,
    query_type: QueryType,
    weights: &RewardTerms,
    now: OffsetDateTime,
) -> Candidate {
    let sources: Vec<Source> = raw
        .sources
        .into_iter()
        .map(|source| Source {
            domain_score: score_domain(&source.url, &source.publisher),
            freshness_score: score_freshness(source.published_at.as_deref(), now),
            ..source
        })
        .collect();

    let (citation_quality, freshness) = if sources.is_empty() {
        (NO_SOURCES_CITATION_QUALITY, NO_SOURCES_FRESHNESS)
    } else {
        let count = sources.len() as f64;
        (
            sources.iter().map(|s| s.domain_score).sum::<f64>() / count,
            sources.iter().map(|s| s.freshness_score).sum::<f64>() / count,
        )
    };

    let signals = RewardTerms {
        base_confidence: raw.base_confidence,
        citation_quality,
        freshness,
        route_bonus: query_type.route_bonus(),
    };
    let (total_reward, reward_breakdown) = compute_reward(signals, weights);
    tracing::debug!(provider = %raw.provider, total_reward, "scored candidate");

    Candidate {
        provider: raw.provider,
        claim: raw.claim,
        answer: raw.answer,
        sources,
        reward_breakdown,
        total_reward,
        reasoning_notes: raw.reasoning_notes,
    }
}

fn select_best(candidates: &[Candidate]) -> Option<&Candidate> {
    candidates.iter().fold(None, |best, candidate| match best {
        Some(current) if current.total_reward >= candidate.total_reward => Some(current),
        _ => Some(candidate),
    })
}

fn breakdown_or_empty<S: Serializer>(
    breakdown: &Option<RewardBreakdown>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match breakdown {
        Some(breakdown) => breakdown.serialize(serializer),
        None => serializer.serialize_map(Some(0))?.end(),
    }
}
