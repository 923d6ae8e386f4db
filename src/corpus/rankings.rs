use crate::error::{read_to_string, LinkRankResult};
use linkrank_aggregation::Ranking;
use std::path::Path;
use tracing::debug;

/// One identifier per whitespace-separated token, in rank order
pub fn parse_ranking(name: impl Into<String>, text: &str) -> Ranking {
    Ranking::new(name, text.split_whitespace().map(str::to_string).collect())
}

/// Load a ranking file; the ranking is named after the file
pub fn load_ranking(path: impl AsRef<Path>) -> LinkRankResult<Ranking> {
    let path = path.as_ref();
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let ranking = parse_ranking(name, &read_to_string(path)?);
    debug!(path = %path.display(), items = ranking.len(), "loaded ranking");
    Ok(ranking)
}

pub fn load_rankings<P: AsRef<Path>>(paths: &[P]) -> LinkRankResult<Vec<Ranking>> {
    paths.iter().map(load_ranking).collect()
}
