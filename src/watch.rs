//! One-shot wait for the results container.
//!
//! Pages build their result list well after the initial document, so the
//! watcher combines an immediate existence check with a document-wide
//! child-insertion feed: whichever fires first resolves it. There is no
//! timeout; on a page that never grows the container the watcher simply
//! never resolves and the rest of the system stays inert.

use std::sync::mpsc::{Receiver, RecvError, TryRecvError};

use tracing::debug;

use crate::WatchError;
use crate::config::NavConfig;
use crate::dom::{Document, Mutation, NodeId};

/// Resolves at most once with the results container. Subscribe the feed on
/// the document root before constructing the watcher, otherwise an insertion
/// between the immediate check and the subscription can be missed.
///
/// Resolution is one-shot: `wait` consumes the watcher, and after a
/// successful `poll` the caller is expected to drop it, which drops the
/// feed subscription with it.
pub struct ContainerWatcher {
    id: String,
    block_tags: Vec<String>,
    events: Receiver<Mutation>,
    startup_checked: bool,
}

impl ContainerWatcher {
    pub fn new(config: &NavConfig, events: Receiver<Mutation>) -> Self {
        Self {
            id: config.container_id.clone(),
            block_tags: config.block_tags.clone(),
            events,
            startup_checked: false,
        }
    }

    /// Drain pending insertions and report the container if it exists now.
    ///
    /// `Ok(None)` means "not yet"; call again after the next event-loop
    /// turn. Errors are terminal: either the id is taken by an element of
    /// the wrong shape, or the feed is gone.
    pub fn poll<D: Document>(&mut self, doc: &D) -> Result<Option<NodeId>, WatchError> {
        if !self.startup_checked {
            self.startup_checked = true;
            if let Some(found) = self.check_existing(doc)? {
                return Ok(Some(found));
            }
        }
        loop {
            match self.events.try_recv() {
                Ok(Mutation::ChildInserted { .. }) => {
                    if let Some(found) = self.check_inserted(doc) {
                        return Ok(Some(found));
                    }
                }
                Ok(Mutation::ChildRemoved { .. }) => {}
                Err(TryRecvError::Empty) => return Ok(None),
                Err(TryRecvError::Disconnected) => {
                    return Err(WatchError::FeedClosed {
                        id: self.id.clone(),
                    });
                }
            }
        }
    }

    /// Block until the container appears. Never returns `Ok` for a page
    /// that never grows one; the feed disconnecting is the only way out.
    pub fn wait<D: Document>(mut self, doc: &D) -> Result<NodeId, WatchError> {
        if !self.startup_checked {
            self.startup_checked = true;
            if let Some(found) = self.check_existing(doc)? {
                return Ok(found);
            }
        }
        loop {
            match self.events.recv() {
                Ok(Mutation::ChildInserted { .. }) => {
                    if let Some(found) = self.check_inserted(doc) {
                        return Ok(found);
                    }
                }
                Ok(Mutation::ChildRemoved { .. }) => {}
                Err(RecvError) => {
                    return Err(WatchError::FeedClosed { id: self.id });
                }
            }
        }
    }

    /// Startup check: an element squatting on the container id with the
    /// wrong tag is reported as an error rather than silently ignored.
    fn check_existing<D: Document>(&self, doc: &D) -> Result<Option<NodeId>, WatchError> {
        let Some(node) = doc.element_by_id(&self.id) else {
            return Ok(None);
        };
        let tag = doc.tag(node).unwrap_or_default();
        if self.is_block(tag) {
            Ok(Some(node))
        } else {
            Err(WatchError::NotAContainer {
                id: self.id.clone(),
                tag: tag.to_owned(),
            })
        }
    }

    /// Insertion-phase check: only a well-shaped match resolves; anything
    /// else keeps the watcher waiting.
    fn check_inserted<D: Document>(&self, doc: &D) -> Option<NodeId> {
        let node = doc.element_by_id(&self.id)?;
        let tag = doc.tag(node).unwrap_or_default();
        if self.is_block(tag) {
            Some(node)
        } else {
            debug!(%node, tag, id = %self.id, "inserted id match is not a block container");
            None
        }
    }

    fn is_block(&self, tag: &str) -> bool {
        self.block_tags
            .iter()
            .any(|block| block.eq_ignore_ascii_case(tag))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use super::*;
    use crate::dom::PageDom;

    fn config() -> NavConfig {
        NavConfig::default()
    }

    #[test]
    fn resolves_immediately_when_the_container_already_exists() {
        let mut dom = PageDom::new();
        let container = dom.create_element("div");
        dom.set_attr(container, "id", "search");
        dom.append_child(dom.root(), container);

        let events = dom.observe(dom.root());
        let mut watcher = ContainerWatcher::new(&config(), events);
        assert_eq!(watcher.poll(&dom).unwrap(), Some(container));
    }

    #[test]
    fn rejects_an_existing_element_of_the_wrong_shape() {
        let mut dom = PageDom::new();
        let impostor = dom.create_element("span");
        dom.set_attr(impostor, "id", "search");
        dom.append_child(dom.root(), impostor);

        let events = dom.observe(dom.root());
        let mut watcher = ContainerWatcher::new(&config(), events);
        assert_eq!(
            watcher.poll(&dom),
            Err(WatchError::NotAContainer {
                id: "search".into(),
                tag: "span".into(),
            })
        );
    }

    #[test]
    fn resolves_after_a_later_insertion() {
        let mut dom = PageDom::new();
        let events = dom.observe(dom.root());
        let mut watcher = ContainerWatcher::new(&config(), events);

        assert_eq!(watcher.poll(&dom).unwrap(), None);

        let container = dom.create_element("div");
        dom.set_attr(container, "id", "search");
        dom.append_child(dom.root(), container);

        assert_eq!(watcher.poll(&dom).unwrap(), Some(container));
    }

    #[test]
    fn an_inserted_wrong_shape_keeps_the_watcher_pending() {
        let mut dom = PageDom::new();
        let events = dom.observe(dom.root());
        let mut watcher = ContainerWatcher::new(&config(), events);
        assert_eq!(watcher.poll(&dom).unwrap(), None);

        let impostor = dom.create_element("span");
        dom.set_attr(impostor, "id", "search");
        dom.append_child(dom.root(), impostor);

        assert_eq!(watcher.poll(&dom).unwrap(), None);
    }

    #[test]
    fn a_closed_feed_is_terminal() {
        let dom = PageDom::new();
        let (tx, rx) = mpsc::channel();
        drop(tx);
        let mut watcher = ContainerWatcher::new(&config(), rx);
        assert_eq!(
            watcher.poll(&dom),
            Err(WatchError::FeedClosed { id: "search".into() })
        );
    }
}
