//! User-visible notice delivery.

use std::{cell::RefCell, rc::Rc};

/// Blocking notice channel for launcher-level refusals.
///
/// Permission denials resolve synchronously, so this trait is synchronous as
/// well; the sink returns once the notice has been handed to the host, not
/// once the user dismisses it.
pub trait NoticeSink {
    /// Shows `body` under a short `title`.
    fn notify(&self, title: &str, body: &str);
}

#[derive(Debug, Clone, Copy, Default)]
/// Discards every notice; for headless targets.
pub struct NoopNoticeSink;

impl NoticeSink for NoopNoticeSink {
    fn notify(&self, _title: &str, _body: &str) {}
}

#[derive(Debug, Clone, Default)]
/// Records notices for test assertions.
pub struct MemoryNoticeSink {
    entries: Rc<RefCell<Vec<(String, String)>>>,
}

impl MemoryNoticeSink {
    /// Snapshot of every `(title, body)` delivered so far.
    pub fn entries(&self) -> Vec<(String, String)> {
        self.entries.borrow().clone()
    }
}

impl NoticeSink for MemoryNoticeSink {
    fn notify(&self, title: &str, body: &str) {
        self.entries
            .borrow_mut()
            .push((title.to_string(), body.to_string()));
    }
}

#[derive(Debug, Clone, Copy, Default)]
/// Browser sink delivering through `window.alert`.
pub struct BrowserNoticeSink;

impl NoticeSink for BrowserNoticeSink {
    fn notify(&self, title: &str, body: &str) {
        #[cfg(target_arch = "wasm32")]
        {
            if let Some(window) = web_sys::window() {
                let _ = window.alert_with_message(&format!("{title}\n\n{body}"));
            }
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = (title, body);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_sink_records_in_order() {
        let sink = MemoryNoticeSink::default();
        sink.notify("Access denied", "TRADE_EDIT requires the trade role");
        sink.notify("Access denied", "SETTINGS requires the admin role");

        let entries = sink.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].0, "Access denied");
        assert!(entries[1].1.contains("SETTINGS"));
    }
}
