use crate::error::{read_to_string, LinkRankResult};
use indexmap::IndexSet;
use linkrank_graph_algorithms::DirectedLinkGraph;
use std::path::Path;
use tracing::{debug, info, warn};

const SECTION_START: &str = "#start";
const SECTION_END: &str = "#end";
const SECTION_NAME: &str = "Section-1";

/// Page URLs in vertex order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Collection {
    urls: IndexSet<String>,
}

impl Collection {
    /// Whitespace-separated URLs; repeated URLs keep their first index
    pub fn parse(text: &str) -> Self {
        Self {
            urls: text.split_whitespace().map(str::to_string).collect(),
        }
    }

    pub fn load(path: impl AsRef<Path>) -> LinkRankResult<Self> {
        let path = path.as_ref();
        let collection = Self::parse(&read_to_string(path)?);
        debug!(path = %path.display(), pages = collection.len(), "loaded collection");
        Ok(collection)
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn index_of(&self, url: &str) -> Option<usize> {
        self.urls.get_index_of(url)
    }

    pub fn url(&self, index: usize) -> Option<&str> {
        self.urls.get_index(index).map(String::as_str)
    }

    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.urls.iter().map(String::as_str)
    }
}

/// Outgoing link targets listed in a page's link file.
///
/// Reads tokens up to the first `#end`; the `#start` and `Section-1` markers
/// are skipped.
pub fn parse_link_file(text: &str) -> Vec<&str> {
    text.split_whitespace()
        .take_while(|&token| token != SECTION_END)
        .filter(|&token| token != SECTION_START && token != SECTION_NAME)
        .collect()
}

/// Build the link graph, reading each page's link file through `read_links`.
///
/// Self-links and links to pages outside the collection are skipped;
/// repeated links collapse into one edge.
pub fn build_link_graph_with<F>(
    collection: &Collection,
    mut read_links: F,
) -> LinkRankResult<DirectedLinkGraph>
where
    F: FnMut(&str) -> LinkRankResult<String>,
{
    let mut graph = DirectedLinkGraph::new(collection.len());

    for (src, url) in collection.urls().enumerate() {
        let text = read_links(url)?;
        for target in parse_link_file(&text) {
            if target == url {
                continue;
            }
            match collection.index_of(target) {
                Some(dst) => {
                    // false just means the link was listed twice
                    graph.insert_edge(src, dst)?;
                }
                None => warn!(page = url, link = target, "skipping link outside the collection"),
            }
        }
    }

    info!(
        pages = graph.vertex_count(),
        links = graph.edge_count(),
        "built link graph"
    );
    Ok(graph)
}

/// Build the link graph from `<pages_dir>/<url><extension>` files
pub fn build_link_graph(
    collection: &Collection,
    pages_dir: impl AsRef<Path>,
    extension: &str,
) -> LinkRankResult<DirectedLinkGraph> {
    let pages_dir = pages_dir.as_ref();
    build_link_graph_with(collection, |url| {
        let path = pages_dir.join(format!("{}{}", url, extension));
        debug!(path = %path.display(), "reading link file");
        read_to_string(&path)
    })
}
