//! Search ranking
//!
//! Combines keyword matches from an inverted index with the scores of a
//! previous PageRank run. A page matches once per query term whose posting
//! list contains it.

use crate::error::{LinkRankError, LinkRankResult};
use crate::ranking::{RankedEntry, RankedItemSet};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use tracing::debug;

/// Parse `identifier outDegree score` lines into a [`RankedItemSet`].
///
/// Fields may be separated by whitespace or commas. Blank lines are ignored.
pub fn parse_page_rank_list(origin: &str, text: &str) -> LinkRankResult<RankedItemSet> {
    let mut pages = RankedItemSet::new();

    for (number, line) in text.lines().enumerate() {
        let line_no = number + 1;
        let fields: Vec<&str> = line
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|field| !field.is_empty())
            .collect();
        if fields.is_empty() {
            continue;
        }

        let parse_error = |message: String| LinkRankError::Parse {
            origin: origin.to_string(),
            line: line_no,
            message,
        };

        let [identifier, out_degree, score] = fields[..] else {
            return Err(parse_error(format!(
                "expected `url outDegree score`, found {} fields",
                fields.len()
            )));
        };
        let out_degree: usize = out_degree
            .parse()
            .map_err(|_| parse_error(format!("invalid out-degree `{}`", out_degree)))?;
        let score: f64 = score
            .parse()
            .map_err(|_| parse_error(format!("invalid score `{}`", score)))?;

        pages.insert_entry(identifier, out_degree, score)?;
    }

    debug!(origin, pages = pages.len(), "parsed page rank list");
    Ok(pages)
}

/// Term to posting list
#[derive(Debug, Clone, Default)]
pub struct InvertedIndex {
    postings: FxHashMap<String, Vec<String>>,
}

impl InvertedIndex {
    /// Each line is `term url url ...`; a repeated term extends its postings
    pub fn parse(text: &str) -> Self {
        let mut postings: FxHashMap<String, Vec<String>> = FxHashMap::default();
        for line in text.lines() {
            let mut tokens = line.split_whitespace();
            if let Some(term) = tokens.next() {
                postings
                    .entry(term.to_string())
                    .or_default()
                    .extend(tokens.map(str::to_string));
            }
        }
        Self { postings }
    }

    /// Postings of `term`, empty when the term is not indexed
    pub fn postings(&self, term: &str) -> &[String] {
        self.postings.get(term).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn term_count(&self) -> usize {
        self.postings.len()
    }
}

/// A page matched by a query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub identifier: String,
    pub matches: usize,
    pub score: f64,
    pub out_degree: usize,
}

/// Rank the pages of `pages` that match at least one of `terms`.
///
/// Ordered by match count, then score (both descending), then identifier.
/// URLs in the index that are not in `pages` are ignored.
pub fn rank_search_results<S: AsRef<str>>(
    pages: &RankedItemSet,
    index: &InvertedIndex,
    terms: &[S],
    limit: usize,
) -> Vec<SearchHit> {
    let mut matches = vec![0usize; pages.len()];

    for term in terms {
        let mut seen = FxHashSet::default();
        for url in index.postings(term.as_ref()) {
            if !seen.insert(url.as_str()) {
                continue;
            }
            if let Ok(position) = pages.index_of(url) {
                matches[position] += 1;
            }
        }
    }

    let mut hits: Vec<SearchHit> = pages
        .iter()
        .zip(matches)
        .filter(|(_, count)| *count > 0)
        .map(|(entry, count)| hit(entry, count))
        .collect();

    hits.sort_by(|a, b| {
        b.matches
            .cmp(&a.matches)
            .then_with(|| b.score.total_cmp(&a.score))
            .then_with(|| a.identifier.cmp(&b.identifier))
    });
    hits.truncate(limit);
    hits
}

fn hit(entry: &RankedEntry, matches: usize) -> SearchHit {
    SearchHit {
        identifier: entry.identifier.clone(),
        matches,
        score: entry.score,
        out_degree: entry.out_degree,
    }
}
