// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::{debug, warn};

use crate::child::{
    ChildView, ChildViewMode, DetailContext, DetailRenderer, LoadContext, RowLoader,
};
use crate::detail::{DetailItem, build_detail_items, reorder, sanitize_preview};
use crate::format::{format_elapsed, format_status_value, quote_breadcrumb_segment};
use crate::ids::{FrameId, RequestId};
use crate::labels::{LabelScope, fallback_label, row_label};
use crate::layout::Viewport;
use crate::node::Node;
use crate::projection::TableData;
use crate::registry::Registry;
use crate::request::{PendingRequest, RequestCoordinator, RequestTarget, request_label};
use crate::search::{SearchState, find_match_index};

pub const HELP_HINT: &str = "Press ? for help";
pub const DEFAULT_ROOT_LABEL: &str = "Items";
pub const EMPTY_CONTENT: &str = "(content is empty)";
pub const SEARCH_UNAVAILABLE: &str = "Search is not available for this view.";
const NO_MATCH_PREFIX: &str = "No match for '/";

pub const HELP_LINES: [&str; 7] = [
    "Up/Down j/k     : navigate lists",
    "Enter           : open item or copy value",
    "/<text>         : jump to matching text",
    "Backspace / Esc : go to parent",
    "Ctrl+W          : toggle full screen",
    "?               : toggle this help",
    "q               : quit",
];

pub trait Clipboard {
    fn copy(&mut self, text: &str) -> Result<()>;
}

#[derive(Clone, Default)]
pub struct SessionOptions {
    pub title: String,
    pub footer: String,
    pub root_label: String,
    pub detail_renderer: Option<DetailRenderer>,
    pub preview_renderer: Option<DetailRenderer>,
    pub detail_context: Option<DetailContext>,
    pub parent_type: String,
    pub row_loader: Option<RowLoader>,
    pub initial_row: Option<usize>,
    pub open_initial: bool,
    pub custom_table: Option<TableData>,
    pub stretch: bool,
    pub profile: String,
    pub capabilities: Option<Arc<dyn Any + Send + Sync>>,
}

impl fmt::Debug for SessionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionOptions")
            .field("title", &self.title)
            .field("footer", &self.footer)
            .field("root_label", &self.root_label)
            .field("detail_renderer", &self.detail_renderer.is_some())
            .field("preview_renderer", &self.preview_renderer.is_some())
            .field("detail_context", &self.detail_context.is_some())
            .field("parent_type", &self.parent_type)
            .field("row_loader", &self.row_loader.is_some())
            .field("initial_row", &self.initial_row)
            .field("open_initial", &self.open_initial)
            .field("custom_table", &self.custom_table.is_some())
            .field("stretch", &self.stretch)
            .field("profile", &self.profile)
            .finish_non_exhaustive()
    }
}

impl SessionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = footer.into();
        self
    }

    pub fn with_root_label(mut self, label: impl Into<String>) -> Self {
        self.root_label = label.into();
        self
    }

    pub fn with_detail_renderer<F>(mut self, renderer: F) -> Self
    where
        F: Fn(usize) -> String + Send + Sync + 'static,
    {
        self.detail_renderer = Some(Arc::new(renderer));
        self
    }

    pub fn with_preview_renderer<F>(mut self, renderer: F) -> Self
    where
        F: Fn(usize) -> String + Send + Sync + 'static,
    {
        self.preview_renderer = Some(Arc::new(renderer));
        self
    }

    pub fn with_detail_context<F>(mut self, parent_type: impl Into<String>, context: F) -> Self
    where
        F: Fn(usize) -> Option<Node> + Send + Sync + 'static,
    {
        self.parent_type = parent_type.into();
        self.detail_context = Some(Arc::new(context));
        self
    }

    pub fn with_row_loader<F>(mut self, loader: F) -> Self
    where
        F: Fn(&LoadContext, usize) -> Result<ChildView> + Send + Sync + 'static,
    {
        self.row_loader = Some(Arc::new(loader));
        self
    }

    pub fn with_initial_row(mut self, row: usize, open: bool) -> Self {
        self.initial_row = Some(row);
        self.open_initial = open;
        self
    }

    pub fn with_custom_table(mut self, table: TableData) -> Self {
        self.custom_table = Some(table);
        self
    }

    pub fn with_stretch(mut self, stretch: bool) -> Self {
        self.stretch = stretch;
        self
    }

    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = profile.into();
        self
    }

    pub fn with_capabilities(mut self, capabilities: Arc<dyn Any + Send + Sync>) -> Self {
        self.capabilities = Some(capabilities);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Ctrl(char),
    Up,
    Down,
    Left,
    Right,
    PageUp,
    PageDown,
    Home,
    End,
    Enter,
    Esc,
    Backspace,
    Tab,
    BackTab,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    MoveUp,
    MoveDown,
    PageUp,
    PageDown,
    HalfPageUp,
    HalfPageDown,
    Top,
    Bottom,
    Activate,
    Back,
    Escape,
    OpenSearch,
    ToggleHelp,
    ToggleFullScreen,
    Quit,
}

impl SessionCommand {
    pub fn from_key(key: Key) -> Option<Self> {
        let command = match key {
            Key::Up | Key::Char('k') | Key::Ctrl('p') => Self::MoveUp,
            Key::Down | Key::Char('j') | Key::Ctrl('j') => Self::MoveDown,
            Key::PageUp => Self::PageUp,
            Key::PageDown => Self::PageDown,
            Key::Ctrl('u') => Self::HalfPageUp,
            Key::Ctrl('d') => Self::HalfPageDown,
            Key::Home | Key::Char('g') => Self::Top,
            Key::End | Key::Char('G') => Self::Bottom,
            Key::Enter => Self::Activate,
            Key::Backspace => Self::Back,
            Key::Esc => Self::Escape,
            Key::Char('/') => Self::OpenSearch,
            Key::Char('?') => Self::ToggleHelp,
            Key::Ctrl('w') => Self::ToggleFullScreen,
            Key::Char('q' | 'Q') | Key::Ctrl('c') => Self::Quit,
            _ => return None,
        };
        Some(command)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    CursorMoved(usize),
    FramePushed(FrameId),
    FramePopped(FrameId),
    LoadStarted(RequestId),
    LoadFinished(RequestId),
    LoadDiscarded(RequestId),
    SearchOpened,
    SearchClosed,
    HelpToggled(bool),
    FullScreenToggled(bool),
    StatusUpdated(String),
    StatusCleared,
    Resized(Viewport),
    Quit,
}

pub struct LoadJob {
    request: RequestId,
    task: Box<dyn FnOnce() -> Result<ChildView> + Send>,
}

impl fmt::Debug for LoadJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadJob")
            .field("request", &self.request)
            .finish_non_exhaustive()
    }
}

impl LoadJob {
    fn new<F>(request: RequestId, task: F) -> Self
    where
        F: FnOnce() -> Result<ChildView> + Send + 'static,
    {
        Self {
            request,
            task: Box::new(task),
        }
    }

    pub fn request(&self) -> RequestId {
        self.request
    }

    pub fn run(self) -> LoadOutcome {
        LoadOutcome {
            request: self.request,
            result: (self.task)(),
        }
    }
}

#[derive(Debug)]
pub struct LoadOutcome {
    pub request: RequestId,
    pub result: Result<ChildView>,
}

#[derive(Debug, Clone)]
pub struct TableFrame {
    pub view: ChildView,
    pub display: TableData,
    pub cursor: usize,
}

impl TableFrame {
    fn new(view: ChildView) -> Self {
        let display = view.table().with_abbreviated_ids();
        Self {
            view,
            display,
            cursor: 0,
        }
    }

    pub fn row_label(&self, index: usize) -> String {
        row_label(
            &self.view.headers,
            self.view.rows.get(index).map(Vec::as_slice),
            index,
            LabelScope::Child,
        )
    }
}

#[derive(Debug, Clone)]
pub struct DetailFrame {
    pub items: Vec<DetailItem>,
    pub cursor: usize,
}

#[derive(Debug, Clone)]
pub struct TextFrame {
    pub content: String,
    pub scroll: usize,
}

impl TextFrame {
    pub fn line_count(&self) -> usize {
        self.content.lines().count().max(1)
    }
}

#[derive(Debug, Clone)]
pub enum FrameKind {
    Table(TableFrame),
    Detail(DetailFrame),
    Text(TextFrame),
}

#[derive(Debug, Clone)]
pub struct Frame {
    pub id: FrameId,
    pub label: String,
    pub title: String,
    pub parent: Option<Node>,
    pub parent_type: String,
    pub kind: FrameKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusRow {
    pub left: String,
    pub right: String,
}

impl StatusRow {
    fn new(left: impl Into<String>, right: Option<String>) -> Self {
        Self {
            left: left.into(),
            right: right.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone)]
struct RootView {
    table: TableData,
    display: TableData,
    cursor: usize,
}

enum SearchFlow {
    Consumed,
    Propagate,
}

pub struct Session {
    options: SessionOptions,
    registry: Arc<Registry>,
    clipboard: Box<dyn Clipboard>,
    context: LoadContext,
    root: RootView,
    frames: Vec<Frame>,
    next_frame: u64,
    requests: RequestCoordinator,
    jobs: Vec<LoadJob>,
    search: Option<SearchState>,
    status: Option<String>,
    show_help: bool,
    full_screen: bool,
    viewport: Viewport,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("options", &self.options)
            .field("frames", &self.frames.len())
            .field("cursor", &self.root.cursor)
            .field("pending", &self.requests.active())
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

impl Session {
    pub fn new(
        table: TableData,
        mut options: SessionOptions,
        registry: Arc<Registry>,
        clipboard: Box<dyn Clipboard>,
    ) -> Self {
        let table = options.custom_table.take().unwrap_or(table);
        let display = table.with_abbreviated_ids();
        let context = LoadContext::new(options.capabilities.clone());
        Self {
            options,
            registry,
            clipboard,
            context,
            root: RootView {
                table,
                display,
                cursor: 0,
            },
            frames: Vec::new(),
            next_frame: 0,
            requests: RequestCoordinator::new(),
            jobs: Vec::new(),
            search: None,
            status: None,
            show_help: false,
            full_screen: true,
            viewport: Viewport::default(),
        }
    }

    pub fn start(&mut self, now: Instant) -> Vec<SessionEvent> {
        let Some(row) = self.options.initial_row else {
            return Vec::new();
        };
        let count = self.root.table.row_count();
        if count == 0 {
            return Vec::new();
        }
        self.root.cursor = row.min(count - 1);
        let mut events = vec![SessionEvent::CursorMoved(self.root.cursor)];
        if self.options.open_initial {
            events.extend(self.activate(now));
        }
        events
    }

    pub fn title(&self) -> &str {
        self.options.title.trim()
    }

    pub fn footer(&self) -> &str {
        self.options.footer.trim()
    }

    pub fn stretch(&self) -> bool {
        self.options.stretch
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn root_table(&self) -> &TableData {
        &self.root.table
    }

    pub fn root_display(&self) -> &TableData {
        &self.root.display
    }

    pub fn root_cursor(&self) -> usize {
        self.root.cursor
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn top(&self) -> Option<&Frame> {
        self.frames.last()
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn is_searching(&self) -> bool {
        self.search.is_some()
    }

    pub fn search_prompt(&self) -> Option<String> {
        self.search.as_ref().map(SearchState::prompt)
    }

    pub fn pending(&self) -> Option<&PendingRequest> {
        self.requests.active()
    }

    pub fn show_help(&self) -> bool {
        self.show_help
    }

    pub fn full_screen(&self) -> bool {
        self.full_screen
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn take_jobs(&mut self) -> Vec<LoadJob> {
        std::mem::take(&mut self.jobs)
    }

    pub fn root_label(&self) -> String {
        [self.options.root_label.trim(), self.options.title.trim()]
            .into_iter()
            .find(|label| !label.is_empty())
            .unwrap_or(DEFAULT_ROOT_LABEL)
            .to_owned()
    }

    pub fn breadcrumbs(&self) -> Vec<String> {
        std::iter::once(self.root_label())
            .chain(self.frames.iter().map(|frame| frame.label.clone()))
            .collect()
    }

    pub fn breadcrumb_line(&self) -> String {
        let crumbs = self.breadcrumbs();
        let mut line = crumbs[0].clone();
        for segment in &crumbs[1..] {
            line.push_str(" > ");
            line.push_str(&quote_breadcrumb_segment(segment));
        }
        line
    }

    pub fn status_rows(&self, now: Instant) -> Vec<StatusRow> {
        let hint = (!self.show_help).then(|| HELP_HINT.to_owned());
        let mut rows = vec![StatusRow::new(self.breadcrumb_line(), hint)];

        let profile = self.options.profile.trim();
        let mut profile = (!profile.is_empty()).then(|| format!("Profile: {profile}"));

        if let Some(line) = self.requests.status_line(now) {
            rows.push(StatusRow::new(line, profile.take()));
        }
        if let Some(prompt) = self.search_prompt() {
            rows.push(StatusRow::new(prompt, profile.take()));
            return rows;
        }
        if let Some(status) = &self.status {
            rows.push(StatusRow::new(status.clone(), profile.take()));
            return rows;
        }
        if !self.footer().is_empty() {
            rows.push(StatusRow::new(self.footer(), profile.take()));
            return rows;
        }
        if let Some(profile) = profile {
            rows.push(StatusRow::new("", Some(profile)));
        }
        rows
    }

    pub fn preview_text(&self) -> Option<String> {
        if !self.frames.is_empty() || self.root.table.rows.is_empty() {
            return None;
        }
        let renderer = self.options.preview_renderer.as_ref()?;
        let text = renderer(self.root.cursor);
        (!text.trim().is_empty()).then_some(text)
    }

    pub fn side_panel(&self) -> Option<String> {
        let text = match self.frames.last() {
            None => {
                if self.root.table.rows.is_empty() {
                    return None;
                }
                let renderer = self.options.detail_renderer.as_ref()?;
                let index = self.root.cursor;
                let parent = self.root_context(index);
                sanitize_preview(
                    &renderer(index),
                    &self.registry,
                    &self.options.parent_type,
                    parent.as_ref(),
                )
            }
            Some(Frame {
                kind: FrameKind::Table(table),
                ..
            }) => {
                if table.view.rows.is_empty() {
                    return None;
                }
                let raw = table.view.render_detail(table.cursor)?;
                let parent = table.view.context(table.cursor);
                sanitize_preview(
                    &raw,
                    &self.registry,
                    &table.view.parent_type,
                    parent.as_ref(),
                )
            }
            Some(_) => return None,
        };
        (!text.trim().is_empty()).then_some(text)
    }

    pub fn handle_key(&mut self, key: Key, now: Instant) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        if self.search.is_some() {
            if let SearchFlow::Consumed = self.handle_search_key(key, now, &mut events) {
                return events;
            }
        }
        if let Some(command) = SessionCommand::from_key(key) {
            events.extend(self.dispatch(command, now));
        }
        events
    }

    pub fn dispatch(&mut self, command: SessionCommand, now: Instant) -> Vec<SessionEvent> {
        match command {
            SessionCommand::Quit => vec![SessionEvent::Quit],
            SessionCommand::ToggleHelp => {
                self.show_help = !self.show_help;
                vec![SessionEvent::HelpToggled(self.show_help)]
            }
            SessionCommand::ToggleFullScreen => {
                self.full_screen = !self.full_screen;
                vec![SessionEvent::FullScreenToggled(self.full_screen)]
            }
            SessionCommand::OpenSearch => self.open_search(now),
            SessionCommand::Escape if self.frames.is_empty() => vec![SessionEvent::Quit],
            SessionCommand::Escape | SessionCommand::Back => self.pop_frame(),
            SessionCommand::Activate => self.activate(now),
            SessionCommand::MoveUp
            | SessionCommand::MoveDown
            | SessionCommand::PageUp
            | SessionCommand::PageDown
            | SessionCommand::HalfPageUp
            | SessionCommand::HalfPageDown
            | SessionCommand::Top
            | SessionCommand::Bottom => self.move_cursor(command),
        }
    }

    pub fn tick(&mut self, now: Instant) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        if self.search.as_ref().is_some_and(|search| search.is_expired(now)) {
            self.close_search(false, &mut events);
        }
        self.requests.tick();
        events
    }

    pub fn resize(&mut self, width: u16, height: u16) -> Vec<SessionEvent> {
        self.viewport = Viewport::new(width, height);
        let visible = self.viewport.frame_height();
        for frame in &mut self.frames {
            if let FrameKind::Text(text) = &mut frame.kind {
                text.scroll = text.scroll.min(text.line_count().saturating_sub(visible));
            }
        }
        vec![SessionEvent::Resized(self.viewport)]
    }

    /// Applies a finished load. Results for anything other than the active
    /// request are ignored.
    pub fn complete_load(&mut self, outcome: LoadOutcome, now: Instant) -> Vec<SessionEvent> {
        let LoadOutcome { request, result } = outcome;
        let Some((pending, elapsed)) = self.requests.complete(request, now) else {
            return Vec::new();
        };
        let mut events = vec![SessionEvent::LoadFinished(request)];

        match pending.target {
            RequestTarget::Row { index } => match result {
                Ok(view) => {
                    let label = self.present_row_child(index, view, &mut events);
                    let label = if label.trim().is_empty() {
                        pending.label.clone()
                    } else {
                        label
                    };
                    self.set_status(loaded_status(&label, elapsed), &mut events);
                }
                Err(err) => {
                    warn!(request = %request, error = %err, "row load failed");
                    self.set_status(
                        with_elapsed(format!("Unable to open: {err:#}"), elapsed),
                        &mut events,
                    );
                }
            },
            RequestTarget::Detail { frame, item } => {
                let located = self
                    .frames
                    .iter()
                    .position(|candidate| candidate.id == frame)
                    .filter(|&index| match &self.frames[index].kind {
                        FrameKind::Detail(detail) => item < detail.items.len(),
                        _ => false,
                    });
                let Some(frame_index) = located else {
                    debug!(
                        request = %request,
                        frame = %frame,
                        "discarding result for closed frame"
                    );
                    events.push(SessionEvent::LoadDiscarded(request));
                    return events;
                };
                match result {
                    Ok(view) => {
                        let label = self.present_detail_child(frame_index, item, view, &mut events);
                        self.set_status(loaded_status(&label, elapsed), &mut events);
                    }
                    Err(err) => {
                        warn!(request = %request, error = %err, "detail load failed");
                        let label = self.mark_item_error(frame_index, item, &err);
                        self.set_status(
                            with_elapsed(
                                format!("Unable to load {}: {err:#}", request_label(&label)),
                                elapsed,
                            ),
                            &mut events,
                        );
                    }
                }
            }
        }
        events
    }

    fn root_context(&self, index: usize) -> Option<Node> {
        self.options
            .detail_context
            .as_ref()
            .and_then(|context| context(index))
    }

    fn root_row_label(&self, index: usize) -> String {
        row_label(
            &self.root.table.headers,
            self.root.table.rows.get(index).map(Vec::as_slice),
            index,
            LabelScope::Root,
        )
    }

    fn activate(&mut self, now: Instant) -> Vec<SessionEvent> {
        let Some(top) = self.frames.last() else {
            return self.activate_root(now);
        };
        match top.kind {
            FrameKind::Table(_) => self.open_child_row_detail(),
            FrameKind::Detail(_) => self.activate_detail_item(now),
            FrameKind::Text(_) => Vec::new(),
        }
    }

    fn activate_root(&mut self, now: Instant) -> Vec<SessionEvent> {
        let index = self.root.cursor;
        if index >= self.root.table.row_count() {
            return Vec::new();
        }

        if let Some(loader) = self.options.row_loader.clone() {
            let label = self.root_row_label(index);
            let Some(id) = self.requests.begin(label, RequestTarget::Row { index }, now) else {
                return Vec::new();
            };
            let context = self.context.clone();
            self.jobs.push(LoadJob::new(id, move || loader(&context, index)));
            let mut events = Vec::new();
            self.clear_status(&mut events);
            events.push(SessionEvent::LoadStarted(id));
            return events;
        }

        let Some(renderer) = self.options.detail_renderer.clone() else {
            return Vec::new();
        };
        let parent = self.root_context(index);
        let items = build_detail_items(
            &renderer(index),
            &self.registry,
            &self.options.parent_type,
            parent.as_ref(),
        );
        let label = self.root_row_label(index);
        let parent_type = self.options.parent_type.clone();
        let mut events = Vec::new();
        self.push_frame(
            label.clone(),
            label,
            parent,
            parent_type,
            FrameKind::Detail(DetailFrame { items, cursor: 0 }),
            &mut events,
        );
        events
    }

    fn open_child_row_detail(&mut self) -> Vec<SessionEvent> {
        let Some(Frame {
            kind: FrameKind::Table(table),
            ..
        }) = self.frames.last()
        else {
            return Vec::new();
        };
        let row = table.cursor;
        if row >= table.view.rows.len() {
            return Vec::new();
        }
        let Some(raw) = table.view.render_detail(row) else {
            return Vec::new();
        };
        let parent = table.view.context(row);
        let parent_type = table.view.parent_type.clone();
        let label = table.row_label(row);

        let items = build_detail_items(&raw, &self.registry, &parent_type, parent.as_ref());
        let mut events = Vec::new();
        self.push_frame(
            label.clone(),
            label,
            parent,
            parent_type,
            FrameKind::Detail(DetailFrame { items, cursor: 0 }),
            &mut events,
        );
        events
    }

    fn activate_detail_item(&mut self, now: Instant) -> Vec<SessionEvent> {
        let Some(frame) = self.frames.last() else {
            return Vec::new();
        };
        let FrameKind::Detail(detail) = &frame.kind else {
            return Vec::new();
        };
        let Some(item) = detail.items.get(detail.cursor) else {
            return Vec::new();
        };

        let Some(loader) = item.loader.clone() else {
            let value = item.value.trim().to_owned();
            let mut events = Vec::new();
            self.copy_value(&value, &mut events);
            return events;
        };

        let target = RequestTarget::Detail {
            frame: frame.id,
            item: detail.cursor,
        };
        let label = item.label.clone();
        let parent = frame.parent.clone();
        let Some(id) = self.requests.begin(label, target, now) else {
            return Vec::new();
        };
        let context = self.context.clone();
        self.jobs
            .push(LoadJob::new(id, move || loader(&context, parent.as_ref())));
        let mut events = Vec::new();
        self.clear_status(&mut events);
        events.push(SessionEvent::LoadStarted(id));
        events
    }

    fn copy_value(&mut self, value: &str, events: &mut Vec<SessionEvent>) {
        if value.is_empty() {
            self.set_status("No value to copy.", events);
            return;
        }
        match self.clipboard.copy(value) {
            Ok(()) => self.set_status(
                format!("Copied '{}' to buffer...", format_status_value(value)),
                events,
            ),
            Err(err) => {
                warn!(error = %err, "clipboard copy failed");
                self.set_status(format!("Copy failed: {err:#}"), events);
            }
        }
    }

    fn present_row_child(
        &mut self,
        index: usize,
        view: ChildView,
        events: &mut Vec<SessionEvent>,
    ) -> String {
        let label = match view.title.trim() {
            "" => self.root_row_label(index),
            title => title.to_owned(),
        };
        let fallback = self.root_context(index);
        self.present_child(view, label, fallback, events)
    }

    fn present_detail_child(
        &mut self,
        frame_index: usize,
        item: usize,
        view: ChildView,
        events: &mut Vec<SessionEvent>,
    ) -> String {
        let frame = &self.frames[frame_index];
        let hint = match &frame.kind {
            FrameKind::Detail(detail) => detail
                .items
                .get(item)
                .map(|item| item.label.trim().to_owned())
                .unwrap_or_default(),
            _ => String::new(),
        };
        let label = [hint.as_str(), view.title.trim()]
            .into_iter()
            .find(|label| !label.is_empty())
            .map_or_else(|| fallback_label(item), str::to_owned);
        let fallback = frame.parent.clone();
        self.present_child(view, label, fallback, events)
    }

    /// Turns a loaded child into a frame: detail mode gives a detail frame,
    /// a rowless view with a renderer gives a text frame, anything else a
    /// table frame.
    fn present_child(
        &mut self,
        view: ChildView,
        label: String,
        fallback_parent: Option<Node>,
        events: &mut Vec<SessionEvent>,
    ) -> String {
        let title = match view.title.trim() {
            "" => label.clone(),
            title => title.to_owned(),
        };
        let parent_type = view.parent_type.clone();

        if view.mode == ChildViewMode::Detail {
            let parent = view.context(0).or(fallback_parent);
            let raw = view.render_detail(0).unwrap_or_default();
            let items = build_detail_items(&raw, &self.registry, &parent_type, parent.as_ref());
            return self.push_frame(
                label,
                title,
                parent,
                parent_type,
                FrameKind::Detail(DetailFrame { items, cursor: 0 }),
                events,
            );
        }

        let kind = if view.rows.is_empty() && view.detail_renderer.is_some() {
            let content = view.render_detail(0).unwrap_or_default().trim().to_owned();
            let content = if content.is_empty() {
                EMPTY_CONTENT.to_owned()
            } else {
                content
            };
            FrameKind::Text(TextFrame { content, scroll: 0 })
        } else {
            FrameKind::Table(TableFrame::new(view))
        };
        self.push_frame(label, title, fallback_parent, parent_type, kind, events)
    }

    fn mark_item_error(&mut self, frame_index: usize, item: usize, err: &anyhow::Error) -> String {
        let FrameKind::Detail(detail) = &mut self.frames[frame_index].kind else {
            return String::new();
        };
        let Some(target) = detail.items.get_mut(item) else {
            return String::new();
        };
        target.value = format!("error: {err:#}");
        let label = target.label.clone();
        let cursor_label = detail
            .items
            .get(detail.cursor)
            .map(|current| current.label.clone());

        detail.items = reorder(std::mem::take(&mut detail.items));
        if let Some(cursor_label) = cursor_label {
            if let Some(position) = detail
                .items
                .iter()
                .position(|candidate| candidate.label == cursor_label)
            {
                detail.cursor = position;
            }
        }
        label
    }

    fn push_frame(
        &mut self,
        label: String,
        title: String,
        parent: Option<Node>,
        parent_type: String,
        kind: FrameKind,
        events: &mut Vec<SessionEvent>,
    ) -> String {
        let mut label = label.trim().to_owned();
        let mut title = title.trim().to_owned();
        if title.is_empty() {
            title = label.clone();
        }
        if label.is_empty() {
            label = if title.is_empty() {
                fallback_label(self.frames.len())
            } else {
                title.clone()
            };
        }

        self.next_frame = self.next_frame.saturating_add(1);
        let id = FrameId::new(self.next_frame);
        debug!(frame = %id, label = %label, depth = self.frames.len() + 1, "frame pushed");
        self.frames.push(Frame {
            id,
            label: label.clone(),
            title,
            parent,
            parent_type,
            kind,
        });
        self.clear_status(events);
        events.push(SessionEvent::FramePushed(id));
        label
    }

    fn pop_frame(&mut self) -> Vec<SessionEvent> {
        let Some(frame) = self.frames.pop() else {
            return Vec::new();
        };
        debug!(frame = %frame.id, depth = self.frames.len(), "frame popped");
        let mut events = vec![SessionEvent::FramePopped(frame.id)];
        self.clear_status(&mut events);
        events
    }

    fn set_status(&mut self, message: impl Into<String>, events: &mut Vec<SessionEvent>) {
        let message = message.into();
        let message = message.trim();
        if message.is_empty() {
            self.clear_status(events);
            return;
        }
        if self.search.is_some() {
            self.close_search(true, events);
        }
        self.status = Some(message.to_owned());
        events.push(SessionEvent::StatusUpdated(message.to_owned()));
    }

    fn clear_status(&mut self, events: &mut Vec<SessionEvent>) {
        if self.status.take().is_some() {
            events.push(SessionEvent::StatusCleared);
        }
    }

    fn clear_search_status(&mut self, events: &mut Vec<SessionEvent>) {
        if self
            .status
            .as_deref()
            .is_some_and(|status| status.starts_with(NO_MATCH_PREFIX))
        {
            self.clear_status(events);
        }
    }

    fn page_size(&self) -> usize {
        self.viewport.frame_height().saturating_sub(1).max(1)
    }

    fn cursor_state(&self) -> (usize, usize) {
        match self.frames.last() {
            None => (self.root.cursor, self.root.table.row_count()),
            Some(frame) => match &frame.kind {
                FrameKind::Table(table) => (table.cursor, table.view.rows.len()),
                FrameKind::Detail(detail) => (detail.cursor, detail.items.len()),
                FrameKind::Text(text) => (
                    text.scroll,
                    text.line_count()
                        .saturating_sub(self.viewport.frame_height())
                        + 1,
                ),
            },
        }
    }

    fn set_cursor(&mut self, position: usize) {
        match self.frames.last_mut() {
            None => self.root.cursor = position,
            Some(frame) => match &mut frame.kind {
                FrameKind::Table(table) => table.cursor = position,
                FrameKind::Detail(detail) => detail.cursor = position,
                FrameKind::Text(text) => text.scroll = position,
            },
        }
    }

    fn move_cursor(&mut self, command: SessionCommand) -> Vec<SessionEvent> {
        let (current, len) = self.cursor_state();
        let next = step_cursor(current, len, command, self.page_size());
        if next == current {
            return Vec::new();
        }
        self.set_cursor(next);
        vec![SessionEvent::CursorMoved(next)]
    }

    fn searchable_labels(&self) -> Option<Vec<String>> {
        match self.frames.last() {
            None => Some(
                (0..self.root.table.row_count())
                    .map(|index| self.root_row_label(index))
                    .collect(),
            ),
            Some(frame) => match &frame.kind {
                FrameKind::Table(table) => Some(
                    (0..table.view.rows.len())
                        .map(|index| table.row_label(index))
                        .collect(),
                ),
                FrameKind::Detail(detail) => {
                    Some(detail.items.iter().map(|item| item.label.clone()).collect())
                }
                FrameKind::Text(_) => None,
            },
        }
    }

    fn open_search(&mut self, now: Instant) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        if self.searchable_labels().is_none() {
            self.set_status(SEARCH_UNAVAILABLE, &mut events);
            return events;
        }
        self.clear_status(&mut events);
        self.search = Some(SearchState::new(now));
        events.push(SessionEvent::SearchOpened);
        events
    }

    fn close_search(&mut self, preserve_status: bool, events: &mut Vec<SessionEvent>) {
        if self.search.take().is_none() {
            return;
        }
        events.push(SessionEvent::SearchClosed);
        if !preserve_status {
            self.clear_search_status(events);
        }
    }

    fn handle_search_key(
        &mut self,
        key: Key,
        now: Instant,
        events: &mut Vec<SessionEvent>,
    ) -> SearchFlow {
        let Some(search) = self.search.as_mut() else {
            return SearchFlow::Propagate;
        };
        match key {
            Key::Esc => {
                self.close_search(false, events);
                SearchFlow::Consumed
            }
            Key::Enter => {
                self.close_search(false, events);
                SearchFlow::Propagate
            }
            Key::Backspace => {
                if search.pop(now) {
                    self.apply_search_query(events);
                } else {
                    self.close_search(false, events);
                }
                SearchFlow::Consumed
            }
            Key::Char(ch) => {
                if search.push(ch, now) {
                    self.apply_search_query(events);
                }
                SearchFlow::Consumed
            }
            _ => {
                self.close_search(false, events);
                SearchFlow::Propagate
            }
        }
    }

    fn apply_search_query(&mut self, events: &mut Vec<SessionEvent>) {
        let Some(query) = self.search.as_ref().map(|search| search.query().to_owned()) else {
            return;
        };
        if query.is_empty() {
            self.clear_search_status(events);
            return;
        }
        let Some(labels) = self.searchable_labels() else {
            return;
        };
        let (cursor, _) = self.cursor_state();
        match find_match_index(&query, cursor, labels.len(), |index| labels[index].clone()) {
            Some(index) => {
                if index != cursor {
                    self.set_cursor(index);
                    events.push(SessionEvent::CursorMoved(index));
                }
                self.clear_search_status(events);
            }
            None => self.set_status(format!("{NO_MATCH_PREFIX}{query}'"), events),
        }
    }
}

fn loaded_status(label: &str, elapsed: Duration) -> String {
    format!("{} loaded in {}", request_label(label), format_elapsed(elapsed))
}

fn with_elapsed(message: String, elapsed: Duration) -> String {
    if elapsed.is_zero() {
        return message;
    }
    format!("{message} (after {})", format_elapsed(elapsed))
}

fn step_cursor(current: usize, len: usize, command: SessionCommand, page: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let last = len - 1;
    let half = (page / 2).max(1);
    match command {
        SessionCommand::MoveUp => current.saturating_sub(1),
        SessionCommand::MoveDown => current.saturating_add(1).min(last),
        SessionCommand::PageUp => current.saturating_sub(page),
        SessionCommand::PageDown => current.saturating_add(page).min(last),
        SessionCommand::HalfPageUp => current.saturating_sub(half),
        SessionCommand::HalfPageDown => current.saturating_add(half).min(last),
        SessionCommand::Top => 0,
        SessionCommand::Bottom => last,
        _ => current,
    }
}
