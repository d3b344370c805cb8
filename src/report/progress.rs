//! Progress notification sink
//!
//! Generation reports status as it goes, both as structured [`ProgressUpdate`]s
//! and as human-readable lines. Sinks are fire-and-forget: a notification
//! never blocks or fails generation.

use std::fmt;

use tracing::info;

/// Structured progress notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressUpdate {
    /// Free-form status line
    Status(String),
    /// A main-outline leaf is about to be generated
    SectionStarted { title: String },
    /// A sub-outline section finished with `chars` target-script characters
    SubsectionDone { title: String, chars: usize },
}

impl ProgressUpdate {
    pub fn status(message: impl Into<String>) -> Self {
        Self::Status(message.into())
    }
}

impl fmt::Display for ProgressUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status(message) => f.write_str(message),
            Self::SectionStarted { title } => f.write_str(&generating_message(title)),
            Self::SubsectionDone { title, chars } => {
                f.write_str(&subsection_done_message(title, *chars))
            }
        }
    }
}

/// Receiver of progress messages
pub trait ProgressSink: Send + Sync {
    fn notify(&self, message: &str);

    /// Structured notification; text-only sinks receive the rendered line
    fn update(&self, update: ProgressUpdate) {
        self.notify(&update.to_string());
    }
}

/// Discards every message
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn notify(&self, _message: &str) {}
}

/// Forwards messages to the tracing subscriber
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl ProgressSink for LogSink {
    fn notify(&self, message: &str) {
        info!(target: "longform::progress", "{}", message);
    }
}

impl<T: ProgressSink + ?Sized> ProgressSink for std::sync::Arc<T> {
    fn notify(&self, message: &str) {
        (**self).notify(message);
    }

    fn update(&self, update: ProgressUpdate) {
        (**self).update(update);
    }
}

const GENERATING_PREFIX: &str = "正在生成：";
const SUBSECTION_DONE_PREFIX: &str = "完成子部分：";

/// Message announcing that a leaf section is about to be generated
pub fn generating_message(title: &str) -> String {
    format!("{}{}...", GENERATING_PREFIX, title)
}

/// Message reporting a finished sub-outline section and its character count
pub fn subsection_done_message(title: &str, chars: usize) -> String {
    format!("{}{}\n字数：{}", SUBSECTION_DONE_PREFIX, title, chars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Collect(Mutex<Vec<String>>);

    impl ProgressSink for Collect {
        fn notify(&self, message: &str) {
            self.0.lock().unwrap().push(message.to_string());
        }
    }

    #[test]
    fn test_message_formats() {
        assert_eq!(generating_message("引言"), "正在生成：引言...");
        assert_eq!(subsection_done_message("背景", 512), "完成子部分：背景\n字数：512");
    }

    #[test]
    fn test_update_renders_for_text_sinks() {
        let sink = Collect::default();
        sink.update(ProgressUpdate::SectionStarted {
            title: "引言".to_string(),
        });
        sink.update(ProgressUpdate::SubsectionDone {
            title: "背景".to_string(),
            chars: 12,
        });
        sink.update(ProgressUpdate::status("正在生成大纲..."));
        assert_eq!(
            *sink.0.lock().unwrap(),
            vec!["正在生成：引言...", "完成子部分：背景\n字数：12", "正在生成大纲..."]
        );
    }

    #[test]
    fn test_arc_forwards() {
        let inner = Arc::new(Collect::default());
        let sink: Arc<Collect> = Arc::clone(&inner);
        sink.notify("hello");
        NullSink.notify("dropped");
        LogSink.notify("logged");
        assert_eq!(*inner.0.lock().unwrap(), vec!["hello".to_string()]);
    }
}
