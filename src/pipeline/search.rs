//! Free-text search with quoted phrases and `-term` exclusions

use crate::core::record::Record;
use regex::Regex;
use std::sync::OnceLock;

/// A search box query split into its parts
///
/// `usd "wrapped ether" -stable` parses into the bare term `usd`, the exact
/// phrase `wrapped ether` and the exclusion `stable`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedQuery {
    pub terms: Vec<String>,
    pub exact: Vec<String>,
    pub exclude: Vec<String>,
}

fn token_regex() -> &'static Regex {
    static TOKEN_REGEX: OnceLock<Regex> = OnceLock::new();
    // A token is a run of non-space characters where quoted groups may contain spaces
    TOKEN_REGEX.get_or_init(|| {
        Regex::new(r#"(?:[^\s"]+|"[^"]*")+"#).expect("token regex is valid")
    })
}

impl ParsedQuery {
    pub fn parse(query: &str) -> Self {
        let mut parsed = ParsedQuery::default();

        for token in token_regex().find_iter(query).map(|m| m.as_str()) {
            if let Some(rest) = token.strip_prefix('-') {
                let term = rest.replace('"', "");
                if !term.is_empty() {
                    parsed.exclude.push(term.to_lowercase());
                }
            } else if token.len() >= 2 && token.starts_with('"') && token.ends_with('"') {
                let phrase = &token[1..token.len() - 1];
                if !phrase.is_empty() {
                    parsed.exact.push(phrase.to_lowercase());
                }
            } else {
                parsed.terms.push(token.to_lowercase());
            }
        }

        parsed
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty() && self.exact.is_empty() && self.exclude.is_empty()
    }

    /// Evaluate the query against a record's search fields
    ///
    /// Rejects the record if any exclusion appears in any field, then
    /// requires every phrase and every bare term to appear in at least one
    /// field. Matching is case-insensitive substring; missing fields read as
    /// the empty string.
    pub fn matches<R: Record + ?Sized>(&self, record: &R, fields: &[String]) -> bool {
        if self.is_empty() {
            return true;
        }

        let haystacks: Vec<String> = fields
            .iter()
            .map(|field| record.field_or_null(field).to_display_string().to_lowercase())
            .collect();
        let in_any = |needle: &str| haystacks.iter().any(|h| h.contains(needle));

        if self.exclude.iter().any(|term| in_any(term)) {
            return false;
        }

        self.exact.iter().all(|phrase| in_any(phrase)) && self.terms.iter().all(|term| in_any(term))
    }
}

/// Filter records by a parsed search query over the given fields
pub fn advanced_search<R: Record + Clone>(records: &[R], query: &str, fields: &[String]) -> Vec<R> {
    let parsed = ParsedQuery::parse(query);
    if parsed.is_empty() {
        return records.to_vec();
    }
    records
        .iter()
        .filter(|record| parsed.matches(*record, fields))
        .cloned()
        .collect()
}

/// Join the non-empty queries of several search inputs with a space
pub fn combine_search_queries(queries: &[&str]) -> String {
    queries
        .iter()
        .map(|q| q.trim())
        .filter(|q| !q.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
