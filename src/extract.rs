//! Derive the ordered result list from the container.
//!
//! The page gives no stable class or id per result, so the extractor leans
//! on two structural signals: every result carries a heading, and the
//! enclosing block announces its content language. Walking up from each
//! heading to the nearest `lang`-carrying ancestor lands on the result
//! block; anything whose tag is not a generic block container is an inline
//! wrapper and gets filtered out.

use tracing::debug;

use crate::config::NavConfig;
use crate::dom::{Document, LANG_ATTR, NodeId};

/// Ordered result blocks under `container`, in heading document order.
///
/// A heading with no qualifying ancestor is skipped, never fatal; one bad
/// entry must not take down the whole pass.
pub fn extract_results<D: Document + ?Sized>(
    doc: &D,
    container: NodeId,
    config: &NavConfig,
) -> Vec<NodeId> {
    let mut results = Vec::new();
    for heading in doc.descendants_by_tag(container, &config.heading_tag) {
        let Some(block) = lang_ancestor(doc, heading) else {
            debug!(%heading, "heading has no lang-carrying ancestor, skipping");
            continue;
        };
        let tag = doc.tag(block).unwrap_or_default();
        if !config.is_block_tag(tag) {
            debug!(%block, tag, "lang ancestor is not a block container, skipping");
            continue;
        }
        if config.dedupe_blocks && results.contains(&block) {
            continue;
        }
        results.push(block);
    }
    results
}

/// Nearest strict ancestor carrying a `lang` attribute.
fn lang_ancestor<D: Document + ?Sized>(doc: &D, node: NodeId) -> Option<NodeId> {
    let mut current = doc.parent(node);
    while let Some(candidate) = current {
        if doc.attr(candidate, LANG_ATTR).is_some() {
            return Some(candidate);
        }
        current = doc.parent(candidate);
    }
    None
}
