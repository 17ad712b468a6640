//! Vim-style keyboard navigation over a search-results page.
//!
//! The crate models the host page as an abstract [`Document`] tree plus a
//! [`ViewHost`] for scroll and navigation effects. On top of that sit the
//! three moving parts: a one-shot [`ContainerWatcher`] that resolves the
//! results container once it exists, an extractor that derives the ordered
//! list of result blocks from the container's headings, and a
//! [`SelectionController`] that owns the cursor and reacts to key events.
//!
//! The root module re-exports the types embedders need so they can wire the
//! pieces together without digging through the module hierarchy.

pub mod config;
pub mod controller;
pub mod dom;
mod error;
pub mod extract;
pub mod watch;

pub use config::{MotionPolicy, NavConfig, RehighlightPolicy};
pub use controller::SelectionController;
pub use dom::{Document, Mutation, NodeId, PageDom, ViewHost, first_link};
pub use error::WatchError;
pub use extract::extract_results;
pub use watch::ContainerWatcher;
