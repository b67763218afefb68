//! Purpose: Cheap up-front routing of a query into math, factual, or ambiguous.
//! Exports: `QueryType`, `classify_query_type`.
//! Invariants: Classification is deterministic and never fails; empty input is factual.
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryType {
    Math,
    Factual,
    Ambiguous,
}

impl QueryType {
    pub fn as_str(self) -> &'static str {
        match self {
            QueryType::Math => "math",
            QueryType::Factual => "factual",
            QueryType::Ambiguous => "ambiguous",
        }
    }

    pub fn route_bonus(self) -> f64 {
        match self {
            QueryType::Math => 0.20,
            QueryType::Factual => 0.10,
            QueryType::Ambiguous => 0.05,
        }
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const MATH_KEYWORDS: &[&str] = &[
    "sum",
    "difference",
    "product",
    "quotient",
    "percent",
    "percentage",
    "solve",
    "equation",
    "calculate",
    "average",
    "total",
    "how many",
    "how much",
    "per week",
    "per day",
    "allowance",
    "profit",
    "cost",
];

const AMBIGUOUS_KEYWORDS: &[&str] = &[
    "best",
    "top",
    "good",
    "better",
    "should i",
    "recommend",
    "vs",
    "compare",
    "worth it",
    "ideas",
    "suggest",
    "opinion",
];

static DIGIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d").expect("digit pattern"));
static OPERATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[+\-*/=]").expect("operator pattern"));
static QUANTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\s*\d+|\d+\s*%|\b\d+(\.\d+)?\b").expect("quantity pattern")
});

pub fn classify_query_type(query: &str) -> QueryType {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return QueryType::Factual;
    }

    let mut math_score = 0;
    if DIGIT.is_match(&q) {
        math_score += 1;
    }
    if OPERATOR.is_match(&q) {
        math_score += 2;
    }
    if QUANTITY.is_match(&q) {
        math_score += 1;
    }
    if MATH_KEYWORDS.iter().any(|keyword| q.contains(keyword)) {
        math_score += 2;
    }

    let mut ambiguous_score = 0;
    if AMBIGUOUS_KEYWORDS.iter().any(|keyword| q.contains(keyword)) {
        ambiguous_score += 1;
    }
    // Substring match: "for" and "world" count too.
    if q.contains("or") {
        ambiguous_score += 1;
    }
    if q.split_whitespace().count() <= 3 {
        ambiguous_score += 1;
    }

    if math_score >= 3 {
        return QueryType::Math;
    }
    if ambiguous_score >= 3 {
        return QueryType::Ambiguous;
    }
    QueryType::Factual
}

#[cfg(test)]
mod tests {
    use super::{QueryType, classify_query_type};

    #[test]
    fn empty_query_is_factual() {
        assert_eq!(classify_query_type("   "), QueryType::Factual);
    }

    #[test]
    fn arithmetic_is_math() {
        assert_eq!(classify_query_type("what is 12 + 30"), QueryType::Math);
        assert_eq!(
            classify_query_type("How much profit on $40 at 15%?"),
            QueryType::Math
        );
    }

    #[test]
    fn single_number_without_operator_or_keyword_is_not_math() {
        assert_eq!(
            classify_query_type("who won the world cup in 2018 final match"),
            QueryType::Factual
        );
    }

    #[test]
    fn short_opinion_query_is_ambiguous() {
        assert_eq!(
            classify_query_type("best editor recommendations"),
            QueryType::Ambiguous
        );
        assert_eq!(classify_query_type("best tea or coffee"), QueryType::Factual);
    }

    #[test]
    fn plain_question_is_factual() {
        assert_eq!(
            classify_query_type("When was the Eiffel Tower completed?"),
            QueryType::Factual
        );
    }

    #[test]
    fn route_bonus_per_type() {
        assert_eq!(QueryType::Math.route_bonus(), 0.20);
        assert_eq!(QueryType::Factual.route_bonus(), 0.10);
        assert_eq!(QueryType::Ambiguous.route_bonus(), 0.05);
    }
}
