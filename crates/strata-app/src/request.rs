// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::time::{Duration, Instant};

use tracing::debug;

use crate::format::format_elapsed;
use crate::ids::{FrameId, RequestId};

const SPINNER_FRAMES: [char; 8] = ['⣾', '⣽', '⣻', '⢿', '⡿', '⣟', '⣯', '⣷'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Row,
    Detail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestTarget {
    Row { index: usize },
    Detail { frame: FrameId, item: usize },
}

impl RequestTarget {
    pub fn kind(self) -> RequestKind {
        match self {
            Self::Row { .. } => RequestKind::Row,
            Self::Detail { .. } => RequestKind::Detail,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequest {
    pub id: RequestId,
    pub label: String,
    pub target: RequestTarget,
    pub started_at: Instant,
}

impl PendingRequest {
    pub fn kind(&self) -> RequestKind {
        self.target.kind()
    }

    pub fn inflight_message(&self) -> String {
        let label = self.label.trim();
        let label = if label.is_empty() {
            match self.kind() {
                RequestKind::Row => "selection",
                RequestKind::Detail => "detail",
            }
        } else {
            label
        };
        format!("Loading {label}...")
    }
}

pub fn request_label(label: &str) -> &str {
    match label.trim() {
        "" => "request",
        trimmed => trimmed,
    }
}

/// Single-flight gate for background loads. At most one request is active;
/// only a completion carrying its id clears it.
#[derive(Debug, Default)]
pub struct RequestCoordinator {
    active: Option<PendingRequest>,
    next_id: u64,
    spinner: usize,
}

impl RequestCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn active(&self) -> Option<&PendingRequest> {
        self.active.as_ref()
    }

    pub fn begin(
        &mut self,
        label: impl Into<String>,
        target: RequestTarget,
        now: Instant,
    ) -> Option<RequestId> {
        if let Some(active) = &self.active {
            debug!(active = %active.id, "request rejected: another load is in flight");
            return None;
        }
        self.next_id = self.next_id.saturating_add(1);
        let id = RequestId::new(self.next_id);
        self.active = Some(PendingRequest {
            id,
            label: label.into(),
            target,
            started_at: now,
        });
        self.spinner = 0;
        debug!(request = %id, destination = ?target, "request started");
        Some(id)
    }

    pub fn complete(&mut self, id: RequestId, now: Instant) -> Option<(PendingRequest, Duration)> {
        if self.active.as_ref().is_none_or(|active| active.id != id) {
            debug!(request = %id, "ignoring stale completion");
            return None;
        }
        let finished = self.active.take()?;
        let elapsed = now.saturating_duration_since(finished.started_at);
        debug!(request = %id, elapsed_ms = elapsed.as_millis() as u64, "request finished");
        Some((finished, elapsed))
    }

    pub fn tick(&mut self) -> bool {
        if self.active.is_none() {
            return false;
        }
        self.spinner = (self.spinner + 1) % SPINNER_FRAMES.len();
        true
    }

    pub fn spinner_frame(&self) -> char {
        SPINNER_FRAMES[self.spinner % SPINNER_FRAMES.len()]
    }

    pub fn status_line(&self, now: Instant) -> Option<String> {
        let active = self.active.as_ref()?;
        let elapsed = now.saturating_duration_since(active.started_at);
        Some(format!(
            "{} {} {}",
            self.spinner_frame(),
            active.inflight_message(),
            format_elapsed(elapsed)
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::{RequestCoordinator, RequestKind, RequestTarget, request_label};
    use crate::ids::FrameId;

    #[test]
    fn single_flight_rejects_second_begin() {
        let now = Instant::now();
        let mut coordinator = RequestCoordinator::new();

        let first = coordinator.begin("routes", RequestTarget::Row { index: 2 }, now);
        assert!(first.is_some());
        let second = coordinator.begin("plugins", RequestTarget::Row { index: 3 }, now);
        assert_eq!(second, None);

        let active = coordinator.active().map(|request| request.label.clone());
        assert_eq!(active.as_deref(), Some("routes"));
    }

    #[test]
    fn complete_requires_matching_id() {
        let start = Instant::now();
        let mut coordinator = RequestCoordinator::new();
        let target = RequestTarget::Detail {
            frame: FrameId::new(1),
            item: 0,
        };
        let Some(id) = coordinator.begin("", target, start) else {
            panic!("begin should succeed");
        };

        let stale = crate::ids::RequestId::new(id.get() + 10);
        assert!(coordinator.complete(stale, start).is_none());
        assert!(coordinator.is_active());

        let done = coordinator.complete(id, start + Duration::from_millis(1500));
        let Some((request, elapsed)) = done else {
            panic!("matching completion should finish");
        };
        assert_eq!(request.kind(), RequestKind::Detail);
        assert_eq!(request.inflight_message(), "Loading detail...");
        assert_eq!(elapsed, Duration::from_millis(1500));
        assert!(!coordinator.is_active());
        assert!(coordinator.complete(id, start).is_none());
    }

    #[test]
    fn ids_increase_monotonically() {
        let now = Instant::now();
        let mut coordinator = RequestCoordinator::new();
        let mut previous = 0;
        for _ in 0..3 {
            let Some(id) = coordinator.begin("x", RequestTarget::Row { index: 0 }, now) else {
                panic!("begin should succeed");
            };
            assert!(id.get() > previous);
            previous = id.get();
            coordinator.complete(id, now);
        }
    }

    #[test]
    fn status_line_shows_spinner_and_elapsed() {
        let start = Instant::now();
        let mut coordinator = RequestCoordinator::new();
        assert_eq!(coordinator.status_line(start), None);
        assert!(!coordinator.tick());

        coordinator.begin("", RequestTarget::Row { index: 0 }, start);
        assert_eq!(
            coordinator.status_line(start + Duration::from_secs(3)).as_deref(),
            Some("⣾ Loading selection... 3s")
        );
        assert!(coordinator.tick());
        assert_eq!(coordinator.spinner_frame(), '⣽');
        assert_eq!(request_label("  "), "request");
    }
}
