//! Configuration
//!
//! Every path the loaders read is injected from here; the engines themselves
//! only receive their numeric settings. All sections are optional in a YAML
//! file and fall back to their defaults.

use crate::error::{read_to_string, LinkRankError, LinkRankResult};
use linkrank_aggregation::AggregationConfig;
use linkrank_graph_algorithms::PageRankConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where the corpus files live
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusConfig {
    /// Whitespace-separated list of page URLs
    pub collection_path: PathBuf,
    /// Directory holding one link file per page
    pub pages_dir: PathBuf,
    /// Suffix appended to a URL to name its link file
    pub link_extension: String,
    /// Output of a previous PageRank run (`url outDegree score` lines)
    pub page_rank_list_path: PathBuf,
    /// `term url url ...` lines
    pub inverted_index_path: PathBuf,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            collection_path: PathBuf::from("collection.txt"),
            pages_dir: PathBuf::from("."),
            link_extension: ".txt".to_string(),
            page_rank_list_path: PathBuf::from("pageRankList.txt"),
            inverted_index_path: PathBuf::from("invertedIndex.txt"),
        }
    }
}

impl CorpusConfig {
    /// Resolve every relative path against `root`
    pub fn rooted_at(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        let defaults = Self::default();
        Self {
            collection_path: root.join(defaults.collection_path),
            pages_dir: root.to_path_buf(),
            link_extension: defaults.link_extension,
            page_rank_list_path: root.join(defaults.page_rank_list_path),
            inverted_index_path: root.join(defaults.inverted_index_path),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Number of results to keep
    pub max_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { max_results: 30 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkRankConfig {
    pub corpus: CorpusConfig,
    pub pagerank: PageRankConfig,
    pub aggregation: AggregationConfig,
    pub search: SearchConfig,
}

impl LinkRankConfig {
    pub fn from_yaml_str(yaml: &str) -> LinkRankResult<Self> {
        serde_yaml::from_str(yaml).map_err(|e| LinkRankError::Config(e.to_string()))
    }

    /// Load a YAML configuration file
    pub fn load(path: impl AsRef<Path>) -> LinkRankResult<Self> {
        let path = path.as_ref();
        let config = Self::from_yaml_str(&read_to_string(path)?)?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LinkRankConfig::default();
        assert_eq!(config.corpus.collection_path, PathBuf::from("collection.txt"));
        assert_eq!(config.corpus.link_extension, ".txt");
        assert_eq!(config.aggregation.max_items, 10);
        assert_eq!(config.search.max_results, 30);
        assert_eq!(config.pagerank.damping_factor, 0.85);
    }

    #[test]
    fn test_partial_yaml() {
        let yaml = r#"
corpus:
  pages_dir: pages
pagerank:
  damping_factor: 0.9
  max_iterations: 50
aggregation:
  max_items: 8
  parallel: true
"#;
        let config = LinkRankConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.corpus.pages_dir, PathBuf::from("pages"));
        assert_eq!(config.corpus.collection_path, PathBuf::from("collection.txt"));
        assert_eq!(config.pagerank.damping_factor, 0.9);
        assert_eq!(config.pagerank.max_iterations, 50);
        assert_eq!(config.pagerank.tolerance, 0.00001);
        assert_eq!(config.aggregation.max_items, 8);
        assert!(config.aggregation.parallel);
        assert_eq!(config.search, SearchConfig::default());
    }

    #[test]
    fn test_bad_yaml() {
        let err = LinkRankConfig::from_yaml_str("pagerank: [1, 2").unwrap_err();
        assert!(matches!(err, LinkRankError::Config(_)));
    }

    #[test]
    fn test_rooted_paths() {
        let config = CorpusConfig::rooted_at("/data/corpus");
        assert_eq!(
            config.collection_path,
            PathBuf::from("/data/corpus/collection.txt")
        );
        assert_eq!(config.pages_dir, PathBuf::from("/data/corpus"));
    }
}
