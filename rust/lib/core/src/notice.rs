//! Transient user notifications ("toasts").

use std::sync::Mutex;
use std::time::{Duration, Instant};

/// How long a notice stays visible.
pub const NOTICE_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Success, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Error, message: message.into() }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Info, message: message.into() }
    }
}

/// Receives notices emitted by views.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Holds the single visible notice and hides it after its TTL.
///
/// A newer notice replaces the current one, as a toast would.
pub struct NoticeBoard {
    ttl: Duration,
    current: Mutex<Option<(Notice, Instant)>>,
}

impl NoticeBoard {
    pub fn new() -> Self {
        Self::with_ttl(NOTICE_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self { ttl, current: Mutex::new(None) }
    }

    /// The visible notice, if it has not expired yet.
    pub fn current(&self) -> Option<Notice> {
        self.current_at(Instant::now())
    }

    fn current_at(&self, now: Instant) -> Option<Notice> {
        let mut guard = self.current.lock().unwrap_or_else(|e| e.into_inner());
        match guard.as_ref() {
            Some((notice, shown)) if now.duration_since(*shown) < self.ttl => Some(notice.clone()),
            Some(_) => {
                *guard = None;
                None
            }
            None => None,
        }
    }

    /// Close the notice before it expires.
    pub fn dismiss(&self) {
        let mut guard = self.current.lock().unwrap_or_else(|e| e.into_inner());
        *guard = None;
    }
}

impl Default for NoticeBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for NoticeBoard {
    fn notify(&self, notice: Notice) {
        let mut guard = self.current.lock().unwrap_or_else(|e| e.into_inner());
        *guard = Some((notice, Instant::now()));
    }
}

/// Records every notice. Handy for front ends that print a log, and for tests.
#[derive(Default)]
pub struct NoticeLog {
    notices: Mutex<Vec<Notice>>,
}

impl NoticeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn count(&self, kind: NoticeKind) -> usize {
        self.notices
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|n| n.kind == kind)
            .count()
    }
}

impl Notifier for NoticeLog {
    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap_or_else(|e| e.into_inner()).push(notice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn board_keeps_latest_notice() {
        let board = NoticeBoard::new();
        assert!(board.current().is_none());
        board.notify(Notice::success("saved"));
        board.notify(Notice::error("failed"));
        assert_eq!(board.current(), Some(Notice::error("failed")));
        board.dismiss();
        assert!(board.current().is_none());
    }

    #[test]
    fn board_expires_after_ttl() {
        let board = NoticeBoard::with_ttl(Duration::from_millis(50));
        board.notify(Notice::info("hello"));
        let later = Instant::now() + Duration::from_millis(60);
        assert!(board.current_at(later).is_none());
        assert!(board.current().is_none());
    }

    #[test]
    fn log_counts_by_kind() {
        let log = NoticeLog::new();
        log.notify(Notice::error("a"));
        log.notify(Notice::success("b"));
        log.notify(Notice::error("c"));
        assert_eq!(log.count(NoticeKind::Error), 2);
        assert_eq!(log.notices().len(), 3);
    }
}
