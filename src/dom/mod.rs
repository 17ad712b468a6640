//! Abstract view of the host page.
//!
//! Result entries are non-owning [`NodeId`] handles into a tree the host
//! owns and mutates; they are only valid until the next extraction pass, so
//! consumers re-fetch through the extractor rather than caching them. The
//! [`Document`] trait covers the read surface the navigator needs plus the
//! one write it performs (class toggling); scroll and navigation effects go
//! through [`ViewHost`].

use std::fmt;

mod page;

pub use page::PageDom;

/// Attribute marking an element as a self-contained result block.
pub const LANG_ATTR: &str = "lang";
/// Attribute holding a link target.
pub const HREF_ATTR: &str = "href";
/// Tag of a link element.
pub const ANCHOR_TAG: &str = "a";

/// Opaque handle to an element owned by the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// A child-list change somewhere in the document.
///
/// Attribute changes are deliberately not reported: the navigator itself
/// writes the marker class, and observing attributes would feed its own
/// writes back into the refresh path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    ChildInserted { parent: NodeId, node: NodeId },
    ChildRemoved { parent: NodeId, node: NodeId },
}

/// Read surface of the host page, plus class writes.
pub trait Document {
    fn root(&self) -> NodeId;

    /// Whether the node is currently attached under the root.
    fn contains(&self, node: NodeId) -> bool;

    /// Lowercased tag name, if the node exists.
    fn tag(&self, node: NodeId) -> Option<&str>;

    fn attr(&self, node: NodeId, name: &str) -> Option<&str>;

    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// First attached element with the given `id` attribute.
    fn element_by_id(&self, id: &str) -> Option<NodeId>;

    /// Descendants of `root` with the given tag, in document order. Does
    /// not include `root` itself.
    fn descendants_by_tag(&self, root: NodeId, tag: &str) -> Vec<NodeId>;

    /// Every attached element currently carrying the class.
    fn elements_with_class(&self, class: &str) -> Vec<NodeId>;

    fn add_class(&mut self, node: NodeId, class: &str);

    fn remove_class(&mut self, node: NodeId, class: &str);

    /// Tag of the element holding input focus, if any.
    fn focused_tag(&self) -> Option<&str>;
}

/// Scroll and navigation effects on the host view.
pub trait ViewHost {
    /// Whether the node lies within the viewport's vertical bounds.
    fn is_in_view(&self, node: NodeId) -> bool;

    /// Scroll to the absolute top of the page.
    fn scroll_to_top(&mut self);

    /// Bring the node into centered view.
    fn scroll_into_view(&mut self, node: NodeId);

    /// Navigate the current page to `href`.
    fn navigate(&mut self, href: &str);

    /// Open `href` in a new browsing context.
    fn open_in_new_tab(&mut self, href: &str);
}

/// Target of the first anchor descendant carrying an `href`, if any.
pub fn first_link<D: Document + ?Sized>(doc: &D, node: NodeId) -> Option<String> {
    doc.descendants_by_tag(node, ANCHOR_TAG)
        .into_iter()
        .find_map(|anchor| doc.attr(anchor, HREF_ATTR).map(str::to_owned))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_link_skips_anchors_without_href() {
        let mut dom = PageDom::new();
        let block = dom.create_element("div");
        dom.append_child(dom.root(), block);

        let bare = dom.create_element("a");
        dom.append_child(block, bare);
        assert_eq!(first_link(&dom, block), None);

        let linked = dom.create_element("a");
        dom.set_attr(linked, HREF_ATTR, "https://example.com/a");
        dom.append_child(block, linked);
        assert_eq!(first_link(&dom, block).as_deref(), Some("https://example.com/a"));
    }
}
