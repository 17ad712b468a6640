//! Cursor over the current result list.
//!
//! The controller owns all mutable navigation state (the extracted result
//! handles, the cursor, the `gg` arm) and is handed the document and view
//! host explicitly on every call, so the logic stays unit-testable without
//! a live page. Result handles are invalidated by every refresh; nothing in
//! here caches them across one.
//!
//! Every degraded path (empty list, missing link, stranded cursor) logs and
//! returns; key handling never panics and never propagates an error.

use std::time::Instant;

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{debug, warn};

use crate::config::{MotionPolicy, NavConfig, RehighlightPolicy};
use crate::dom::{Document, NodeId, ViewHost, first_link};
use crate::extract::extract_results;


/// Elements whose focus means the user is typing, not navigating.
const TEXT_INPUT_TAGS: [&str; 3] = ["input", "textarea", "select"];

/// Modifiers treated as the "open in new tab" chord on activation.
const NEW_TAB_MODIFIERS: KeyModifiers = KeyModifiers::META.union(KeyModifiers::SUPER);

/// Modifiers that hand `g`/`G` back to the browser.
const RESERVED_MODIFIERS: KeyModifiers = KeyModifiers::CONTROL
    .union(KeyModifiers::META)
    .union(KeyModifiers::SUPER);

pub struct SelectionController {
    config: NavConfig,
    results: Vec<NodeId>,
    selected: usize,
    goto_armed: Option<Instant>,
}

impl SelectionController {
    pub fn new(config: NavConfig) -> Self {
        Self {
            config,
            results: Vec::new(),
            selected: 0,
            goto_armed: None,
        }
    }

    pub fn config(&self) -> &NavConfig {
        &self.config
    }

    pub fn results(&self) -> &[NodeId] {
        &self.results
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected(&self) -> Option<NodeId> {
        self.results.get(self.selected).copied()
    }

    /// Re-derive the result list from the container and reconcile the
    /// cursor. Called once the container resolves and again on every
    /// subtree mutation.
    ///
    /// Whether the highlight is recomputed follows the configured
    /// [`RehighlightPolicy`]; the default leaves an in-range highlight
    /// alone so unrelated mutations don't flicker it.
    pub fn refresh<D: Document, H: ViewHost>(
        &mut self,
        doc: &mut D,
        host: &mut H,
        container: NodeId,
    ) {
        let stranded = self.results.len() <= self.selected;
        self.results = extract_results(doc, container, &self.config);
        if self.results.is_empty() {
            self.selected = 0;
            debug!("refresh produced no results");
            return;
        }
        // a shrink strands the cursor too: its marked node just left the page
        let shrunk = self.selected >= self.results.len();
        if shrunk {
            self.selected = self.results.len() - 1;
        }
        let rehighlight = match self.config.rehighlight {
            RehighlightPolicy::Always => true,
            RehighlightPolicy::OnOverflow => stranded || shrunk,
        };
        debug!(
            results = self.results.len(),
            selected = self.selected,
            rehighlight,
            "refreshed result list"
        );
        if rehighlight {
            self.apply_highlight(doc, host);
        }
    }

    /// Handle a key press with the current wall clock.
    pub fn handle_key<D: Document, H: ViewHost>(
        &mut self,
        doc: &mut D,
        host: &mut H,
        key: KeyEvent,
    ) -> bool {
        self.handle_key_at(doc, host, key, Instant::now())
    }

    /// Handle a key press at an explicit instant. Returns whether the key
    /// was consumed, so an embedder can suppress default handling.
    pub fn handle_key_at<D: Document, H: ViewHost>(
        &mut self,
        doc: &mut D,
        host: &mut H,
        key: KeyEvent,
        now: Instant,
    ) -> bool {
        if let Some(tag) = doc.focused_tag()
            && is_text_input(tag)
        {
            return false;
        }
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.step(1, doc, host);
                true
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.step(-1, doc, host);
                true
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                self.activate(doc, host, key.modifiers.intersects(NEW_TAB_MODIFIERS));
                true
            }
            KeyCode::Char('g') => {
                if key.modifiers.intersects(RESERVED_MODIFIERS) {
                    return false;
                }
                match self.goto_armed.take() {
                    Some(armed)
                        if now.duration_since(armed) <= self.config.double_press_window() =>
                    {
                        self.select_first(doc, host);
                    }
                    _ => self.goto_armed = Some(now),
                }
                true
            }
            KeyCode::Char('G') => {
                if key.modifiers.intersects(RESERVED_MODIFIERS) {
                    return false;
                }
                self.select_last(doc, host);
                true
            }
            _ => false,
        }
    }

    fn step<D: Document, H: ViewHost>(&mut self, delta: isize, doc: &mut D, host: &mut H) {
        let len = self.results.len();
        if len == 0 {
            debug!("no results to move through");
            return;
        }
        self.selected = match self.config.motion {
            MotionPolicy::Clamp => {
                if delta > 0 {
                    (self.selected + 1).min(len - 1)
                } else {
                    self.selected.saturating_sub(1)
                }
            }
            MotionPolicy::Wrap => {
                (self.selected as isize + delta).rem_euclid(len as isize) as usize
            }
        };
        self.apply_highlight(doc, host);
    }

    fn select_first<D: Document, H: ViewHost>(&mut self, doc: &mut D, host: &mut H) {
        if self.results.is_empty() {
            return;
        }
        self.selected = 0;
        self.apply_highlight(doc, host);
    }

    fn select_last<D: Document, H: ViewHost>(&mut self, doc: &mut D, host: &mut H) {
        if self.results.is_empty() {
            return;
        }
        self.selected = self.results.len() - 1;
        self.apply_highlight(doc, host);
    }

    /// Follow the selected entry's first link, if it has one. Missing
    /// selection or link is reported and otherwise ignored; the cursor
    /// stays where it was.
    fn activate<D: Document, H: ViewHost>(&self, doc: &D, host: &mut H, new_tab: bool) {
        let Some(entry) = self.selected() else {
            warn!(selected = self.selected, "activation with no selected result");
            return;
        };
        let Some(href) = first_link(doc, entry) else {
            warn!(%entry, "selected result has no link, ignoring activation");
            return;
        };
        if new_tab {
            host.open_in_new_tab(&href);
        } else {
            host.navigate(&href);
        }
    }

    /// Scroll the selection into view and move the marker class onto it.
    ///
    /// The first result scrolls the page to absolute top so the header above
    /// the list stays visible; everything else scrolls only when actually
    /// out of the viewport. The marker is left untouched when it is already
    /// exactly on the target, which keeps redundant class churn off the hot
    /// mutation path.
    fn apply_highlight<D: Document, H: ViewHost>(&self, doc: &mut D, host: &mut H) {
        let Some(target) = self.selected() else {
            return;
        };
        if self.selected == 0 {
            host.scroll_to_top();
        } else if !host.is_in_view(target) {
            host.scroll_into_view(target);
        }

        let marker = self.config.marker_class.as_str();
        let marked = doc.elements_with_class(marker);
        if marked.len() == 1 && marked[0] == target {
            return;
        }
        for node in marked {
            doc.remove_class(node, marker);
        }
        doc.add_class(target, marker);
    }
}

fn is_text_input(tag: &str) -> bool {
    TEXT_INPUT_TAGS
        .iter()
        .any(|input| input.eq_ignore_ascii_case(tag))
}
