//! Terminal simulator for the navigator.
//!
//! Stands in for the host page: a feed thread streams the results container
//! and late entries into an in-memory [`PageDom`] the way a live page grows,
//! and the terminal viewport plays the browser window. Keys run through the
//! same controller the library exposes; activating an entry ends the session
//! with its link as the outcome. A `/`-focusable query box demonstrates the
//! typing guard.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use ratatui::Frame;
use ratatui::crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::layout::{Constraint, Layout};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph};
use serde::Deserialize;
use tracing::info;

use serpnav::{
    ContainerWatcher, Document, Mutation, NodeId, PageDom, SelectionController, ViewHost,
    first_link,
};

use crate::settings::ResolvedConfig;

/// Where the session ended: an activated link, or a plain quit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NavOutcome {
    pub href: Option<String>,
    pub new_tab: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ResultSpec {
    title: String,
    href: Option<String>,
    #[serde(default = "default_lang")]
    lang: String,
}

fn default_lang() -> String {
    "en".into()
}

/// Shape of the JSON page fixture.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct PageSpec {
    /// Entries present when the container first appears.
    initial: Vec<ResultSpec>,
    /// Entries streamed in afterwards, one per feed tick.
    deferred: Vec<ResultSpec>,
}

enum FeedUpdate {
    Container(Vec<ResultSpec>),
    Append(ResultSpec),
}

/// Simulated page loader: the container shows up one tick in, late entries
/// follow. The thread ends with the channel, which simply stops the feed.
fn spawn_feed(spec: PageSpec, interval: Duration) -> Receiver<FeedUpdate> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        thread::sleep(interval);
        if tx.send(FeedUpdate::Container(spec.initial)).is_err() {
            return;
        }
        for entry in spec.deferred {
            thread::sleep(interval);
            if tx.send(FeedUpdate::Append(entry)).is_err() {
                return;
            }
        }
    });
    rx
}

/// Build one result block and attach it, fully formed, in a single
/// insertion, the way a real page hands the observer whole subtrees.
fn append_result(dom: &mut PageDom, container: NodeId, spec: &ResultSpec) {
    let block = dom.create_element("div");
    dom.set_attr(block, "lang", &spec.lang);
    let heading = dom.create_element("h3");
    dom.set_text(heading, &spec.title);
    match &spec.href {
        Some(href) => {
            let anchor = dom.create_element("a");
            dom.set_attr(anchor, "href", href);
            dom.append_child(block, anchor);
            dom.append_child(anchor, heading);
        }
        None => dom.append_child(block, heading),
    }
    dom.append_child(container, block);
}

/// Terminal viewport standing in for the browser window.
#[derive(Default)]
struct TuiHost {
    order: Vec<NodeId>,
    top: usize,
    height: usize,
    outcome: Option<NavOutcome>,
}

impl TuiHost {
    fn position(&self, node: NodeId) -> Option<usize> {
        self.order.iter().position(|&n| n == node)
    }

    fn sync(&mut self, order: &[NodeId], height: usize) {
        self.order = order.to_vec();
        self.height = height.max(1);
        let max_top = self.order.len().saturating_sub(self.height);
        if self.top > max_top {
            self.top = max_top;
        }
    }
}

impl ViewHost for TuiHost {
    fn is_in_view(&self, node: NodeId) -> bool {
        match self.position(node) {
            Some(pos) => pos >= self.top && pos < self.top + self.height,
            None => false,
        }
    }

    fn scroll_to_top(&mut self) {
        self.top = 0;
    }

    fn scroll_into_view(&mut self, node: NodeId) {
        if let Some(pos) = self.position(node) {
            self.top = pos.saturating_sub(self.height / 2);
        }
    }

    fn navigate(&mut self, href: &str) {
        self.outcome = Some(NavOutcome {
            href: Some(href.to_owned()),
            new_tab: false,
        });
    }

    fn open_in_new_tab(&mut self, href: &str) {
        self.outcome = Some(NavOutcome {
            href: Some(href.to_owned()),
            new_tab: true,
        });
    }
}

fn load_page_spec(path: Option<&Path>) -> Result<PageSpec> {
    match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read page fixture {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("invalid page fixture {}", path.display()))
        }
        None => Ok(sample_page_spec()),
    }
}

fn sample_page_spec() -> PageSpec {
    let entry = |title: &str, href: &str| ResultSpec {
        title: title.to_owned(),
        href: Some(href.to_owned()),
        lang: "en".into(),
    };
    PageSpec {
        initial: vec![
            entry("Rust Programming Language", "https://www.rust-lang.org/"),
            entry("The Rust Book", "https://doc.rust-lang.org/book/"),
            entry("crates.io: Rust Package Registry", "https://crates.io/"),
            entry("Rust By Example", "https://doc.rust-lang.org/rust-by-example/"),
        ],
        deferred: vec![
            entry("Rustlings", "https://github.com/rust-lang/rustlings"),
            entry("This Week in Rust", "https://this-week-in-rust.org/"),
        ],
    }
}

/// Run the simulator to completion.
pub(crate) fn run(settings: ResolvedConfig) -> Result<NavOutcome> {
    let spec = load_page_spec(settings.page.as_deref())?;
    let nav = settings.nav;

    let mut dom = PageDom::new();
    let body = dom.create_element("body");
    dom.append_child(dom.root(), body);
    let query_box = dom.create_element("input");
    dom.set_attr(query_box, "id", "q");
    dom.append_child(body, query_box);

    // subscribe before the first check so no insertion can slip between
    let document_feed = dom.observe(dom.root());
    let mut watcher = Some(ContainerWatcher::new(&nav, document_feed));
    let mut controller = SelectionController::new(nav.clone());
    let mut host = TuiHost::default();

    let updates = spawn_feed(spec, settings.feed_interval);

    let mut terminal = ratatui::init();
    terminal.clear()?;

    let (event_tx, event_rx) = mpsc::channel();
    let input_running = Arc::new(AtomicBool::new(true));
    let input_flag = Arc::clone(&input_running);

    let input_thread = thread::spawn(move || -> Result<()> {
        while input_flag.load(Ordering::Relaxed) {
            if event::poll(Duration::from_millis(50))? {
                let event = event::read()?;
                if event_tx.send(event).is_err() {
                    break;
                }
            }
        }
        Ok(())
    });

    // page-side handle to the container; the controller side discovers its
    // own through the watcher
    let mut page_container: Option<NodeId> = None;
    let mut container: Option<NodeId> = None;
    let mut container_feed: Option<Receiver<Mutation>> = None;

    let result: Result<NavOutcome> = 'session: loop {
        let list_height = (terminal.size()?.height as usize).saturating_sub(5).max(1);
        host.sync(controller.results(), list_height);

        // grow the page the way the host would
        loop {
            match updates.try_recv() {
                Ok(FeedUpdate::Container(initial)) => {
                    let node = dom.create_element("div");
                    dom.set_attr(node, "id", &nav.container_id);
                    for entry in &initial {
                        append_result(&mut dom, node, entry);
                    }
                    dom.append_child(body, node);
                    page_container = Some(node);
                }
                Ok(FeedUpdate::Append(entry)) => {
                    if let Some(node) = page_container {
                        append_result(&mut dom, node, &entry);
                    }
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }

        if let Some(active) = watcher.as_mut() {
            match active.poll(&dom) {
                Ok(Some(found)) => {
                    info!(%found, "results container resolved");
                    container = Some(found);
                    container_feed = Some(dom.observe(found));
                    // one-shot: drops the document-wide subscription
                    watcher = None;
                    controller.refresh(&mut dom, &mut host, found);
                }
                Ok(None) => {}
                Err(err) => break 'session Err(err.into()),
            }
        }

        if let (Some(feed), Some(found)) = (container_feed.as_ref(), container) {
            let mut dirty = false;
            while feed.try_recv().is_ok() {
                dirty = true;
            }
            if dirty {
                controller.refresh(&mut dom, &mut host, found);
                host.sync(controller.results(), list_height);
            }
        }

        terminal.draw(|frame| draw(frame, &dom, &controller, &host, query_box))?;

        loop {
            match event_rx.try_recv() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    if handle_demo_key(&mut dom, &mut controller, &mut host, query_box, key) {
                        break 'session Ok(NavOutcome {
                            href: None,
                            new_tab: false,
                        });
                    }
                    if let Some(outcome) = host.outcome.take() {
                        break 'session Ok(outcome);
                    }
                }
                Ok(_) => {}
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    break 'session Err(anyhow!("input event channel disconnected"));
                }
            }
        }

        thread::sleep(Duration::from_millis(16));
    };

    ratatui::restore();

    input_running.store(false, Ordering::Relaxed);
    match input_thread.join() {
        Ok(join_result) => join_result?,
        Err(err) => std::panic::resume_unwind(err),
    }

    result
}

/// Returns true when the user asked to quit.
fn handle_demo_key(
    dom: &mut PageDom,
    controller: &mut SelectionController,
    host: &mut TuiHost,
    query_box: NodeId,
    key: KeyEvent,
) -> bool {
    let typing = dom.focused_tag().is_some();
    match key.code {
        KeyCode::Esc if typing => {
            dom.set_focus(None);
            false
        }
        KeyCode::Esc | KeyCode::Char('q') if !typing => true,
        KeyCode::Char('/') if !typing => {
            dom.set_focus(Some(query_box));
            false
        }
        KeyCode::Backspace if typing => {
            let mut text = dom.text(query_box).unwrap_or_default().to_owned();
            text.pop();
            dom.set_text(query_box, &text);
            false
        }
        KeyCode::Char(c) if typing => {
            let mut text = dom.text(query_box).unwrap_or_default().to_owned();
            text.push(c);
            dom.set_text(query_box, &text);
            // the controller's focus guard drops this one on its own
            controller.handle_key(dom, host, key);
            false
        }
        _ => {
            controller.handle_key(dom, host, key);
            false
        }
    }
}

fn draw(
    frame: &mut Frame,
    dom: &PageDom,
    controller: &SelectionController,
    host: &TuiHost,
    query_box: NodeId,
) {
    let [query_area, list_area, hint_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    let typing = dom.focused_tag().is_some();
    let query_title = if typing {
        "Search (Esc to blur)"
    } else {
        "Search (/ to focus)"
    };
    let query_text = dom.text(query_box).unwrap_or_default().to_owned();
    frame.render_widget(
        Paragraph::new(query_text).block(Block::default().borders(Borders::ALL).title(query_title)),
        query_area,
    );

    let config = controller.config();
    let marked = dom.elements_with_class(&config.marker_class);
    let items: Vec<ListItem> = controller
        .results()
        .iter()
        .enumerate()
        .skip(host.top)
        .take(host.height)
        .map(|(index, &block)| {
            let title = dom
                .descendants_by_tag(block, &config.heading_tag)
                .first()
                .and_then(|&heading| dom.text(heading))
                .unwrap_or("(untitled)");
            let href = first_link(dom, block).unwrap_or_default();
            let line = format!("{:>2}. {title}  {href}", index + 1);
            let mut item = ListItem::new(line);
            if marked.contains(&block) {
                item = item.style(Style::default().add_modifier(Modifier::REVERSED | Modifier::BOLD));
            }
            item
        })
        .collect();

    let title = if controller.results().is_empty() {
        "Results (waiting for the page)".to_owned()
    } else {
        format!("Results ({})", controller.results().len())
    };
    frame.render_widget(
        List::new(items).block(Block::default().borders(Borders::ALL).title(title)),
        list_area,
    );

    frame.render_widget(
        Paragraph::new("j/k move  gg first  G last  Enter open  q quit"),
        hint_area,
    );
}
