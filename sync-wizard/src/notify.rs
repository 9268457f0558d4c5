// Toast/notification surface.
// The wizard engine never talks to the terminal directly; it reports outcomes
// through an injected `Notifier` so the data flow stays traceable and testable.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);

    fn success(&self, text: &str) {
        self.notify(Notice {
            kind: NoticeKind::Success,
            text: text.to_string(),
        });
    }

    fn error(&self, text: &str) {
        self.notify(Notice {
            kind: NoticeKind::Error,
            text: text.to_string(),
        });
    }
}

/// Drops every notice. Used by non-interactive report commands where errors
/// are already printed to stderr.
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _notice: Notice) {}
}

/// Collects notices in memory. The TUI drains it into footer toasts; tests
/// assert against the recorded sequence.
#[derive(Default)]
pub struct RecordingNotifier {
    notices: std::sync::Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Vec<Notice> {
        std::mem::take(&mut self.notices.lock().expect("notifier mutex poisoned"))
    }

    pub fn snapshot(&self) -> Vec<Notice> {
        self.notices.lock().expect("notifier mutex poisoned").clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices
            .lock()
            .expect("notifier mutex poisoned")
            .push(notice);
    }
}
