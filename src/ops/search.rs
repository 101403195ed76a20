use std::ops::Range;

use regex::Regex;

use crate::model::Board;

/// Which field of a node matched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchField {
    Id,
    Title,
    StatusId,
}

/// A search hit for a node field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub node_id: String,
    /// Owning list, so hits inside collapsed lists can be located
    pub parent_id: Option<String>,
    pub field: MatchField,
    pub spans: Vec<Range<usize>>,
}

/// Collect all non-overlapping match byte-ranges for a regex in the given text.
fn find_matches(re: &Regex, text: &str) -> Vec<Range<usize>> {
    re.find_iter(text).map(|m| m.start()..m.end()).collect()
}

/// Search every node on the board, hidden children included, in board order.
pub fn search_nodes(board: &Board, re: &Regex) -> Vec<SearchHit> {
    let mut hits = Vec::new();
    for node in board.nodes() {
        let mut fields = vec![(MatchField::Id, node.id.as_str()), (MatchField::Title, node.title.as_str())];
        if let Some(status_id) = node.status_id.as_deref() {
            fields.push((MatchField::StatusId, status_id));
        }
        for (field, text) in fields {
            let spans = find_matches(re, text);
            if !spans.is_empty() {
                hits.push(SearchHit {
                    node_id: node.id.clone(),
                    parent_id: node.parent.clone(),
                    field,
                    spans,
                });
            }
        }
    }
    hits
}
