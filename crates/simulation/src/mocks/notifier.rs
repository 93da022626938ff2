//! Notice sink that keeps every notice for inspection.

use std::sync::Mutex;

use bigbang_types::{Notice, Notifier};

#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().expect("notice lock poisoned").clone()
    }

    pub fn titles(&self) -> Vec<String> {
        self.notices()
            .into_iter()
            .map(|notice| notice.title)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.notices.lock().expect("notice lock poisoned").is_empty()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().expect("notice lock poisoned").push(notice);
    }
}
