//! Real-Time Progress Streaming
//!
//! Broadcasts report generation progress to any number of listeners.
//! `ProgressTracker` is the `ProgressSink` handed to a report session; the
//! console renderer subscribes and prints events as they arrive.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Instant;

use tokio::sync::broadcast;

use super::ui::output::Output;
use crate::report::progress::{
    ProgressSink, ProgressUpdate, generating_message, subsection_done_message,
};

/// Progress event types
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Run started
    Started { title: String, leaf_sections: usize },
    /// A main-outline section is being generated
    SectionStarted { title: String },
    /// A sub-outline section finished
    SubsectionCompleted { title: String, chars: usize },
    /// Status message
    Message {
        level: MessageLevel,
        message: String,
    },
    /// Run finished
    Finished {
        success: bool,
        total_duration_secs: u64,
        summary: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Warning,
    Error,
}

/// Progress tracker state
#[derive(Debug, Clone, Default)]
pub struct ProgressState {
    /// Leaf sections in the main outline
    pub sections_total: usize,
    /// Main-outline sections started so far
    pub sections_started: usize,
    /// Sub-outline sections finished so far
    pub subsections_completed: usize,
    /// Notifications received
    pub messages: usize,
    /// Section currently being generated
    pub current_section: String,
    pub last_message: String,
    pub is_running: bool,
}

/// Real-time progress tracker
#[derive(Clone)]
pub struct ProgressTracker {
    state: Arc<RwLock<ProgressState>>,
    sender: broadcast::Sender<ProgressEvent>,
    start_time: Arc<RwLock<Option<Instant>>>,
    active: Arc<AtomicBool>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(256);

        Self {
            state: Arc::new(RwLock::new(ProgressState::default())),
            sender,
            start_time: Arc::new(RwLock::new(None)),
            active: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Send an event through the broadcast channel.
    /// Silently discards if no receivers are listening.
    #[inline]
    fn emit(&self, event: ProgressEvent) {
        let _ = self.sender.send(event);
    }

    /// Subscribe to progress events
    pub fn subscribe(&self) -> broadcast::Receiver<ProgressEvent> {
        self.sender.subscribe()
    }

    /// Get current state
    pub fn state(&self) -> ProgressState {
        self.state
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Start tracking a generation run
    pub fn start(&self, title: &str, leaf_sections: usize) {
        self.active.store(true, Ordering::SeqCst);
        *self
            .start_time
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(Instant::now());

        {
            let mut state = self
                .state
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            *state = ProgressState {
                sections_total: leaf_sections,
                is_running: true,
                ..Default::default()
            };
        }

        self.emit(ProgressEvent::Started {
            title: title.to_string(),
            leaf_sections,
        });
    }

    /// Send a status message
    pub fn message(&self, level: MessageLevel, message: &str) {
        self.emit(ProgressEvent::Message {
            level,
            message: message.to_string(),
        });
    }

    /// Mark the current run as over; listeners stay subscribed
    pub fn end_run(&self) {
        self.state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .is_running = false;
    }

    /// Finish tracking; the console render loop exits on this event
    pub fn finish(&self, success: bool, summary: &str) {
        let duration = self
            .start_time
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .as_ref()
            .map(|s| s.elapsed().as_secs())
            .unwrap_or(0);

        self.state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .is_running = false;
        self.active.store(false, Ordering::SeqCst);

        self.emit(ProgressEvent::Finished {
            success,
            total_duration_secs: duration,
            summary: summary.to_string(),
        });
    }

    /// Check if tracking is active
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for ProgressTracker {
    fn notify(&self, message: &str) {
        self.update(ProgressUpdate::status(message));
    }

    fn update(&self, update: ProgressUpdate) {
        let event = {
            let mut state = self
                .state
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            state.messages += 1;
            state.last_message = update.to_string();

            match update {
                ProgressUpdate::SectionStarted { title } => {
                    state.sections_started += 1;
                    state.current_section = title.clone();
                    ProgressEvent::SectionStarted { title }
                }
                ProgressUpdate::SubsectionDone { title, chars } => {
                    state.subsections_completed += 1;
                    ProgressEvent::SubsectionCompleted { title, chars }
                }
                ProgressUpdate::Status(message) => ProgressEvent::Message {
                    level: MessageLevel::Info,
                    message,
                },
            }
        };

        self.emit(event);
    }
}

/// Console progress renderer
pub struct ConsoleRenderer {
    tracker: ProgressTracker,
}

impl ConsoleRenderer {
    pub fn new(tracker: ProgressTracker) -> Self {
        Self { tracker }
    }

    /// One-line status summary of the current run
    pub fn render(&self) -> String {
        let state = self.tracker.state();

        if !state.is_running {
            return String::new();
        }

        format!(
            "{} {}/{} {}",
            render_progress_bar(state.sections_started, state.sections_total, 30),
            state.sections_started,
            state.sections_total,
            state.current_section
        )
    }

    fn print_event(&self, output: &Output, event: &ProgressEvent) {
        match event {
            ProgressEvent::Started {
                title,
                leaf_sections,
            } => {
                output.header(&format!("{} ({} 个章节)", title, leaf_sections));
            }
            ProgressEvent::SectionStarted { title } => {
                let status = self.render();
                if status.is_empty() {
                    output.info(&generating_message(title));
                } else {
                    output.info(&status);
                }
            }
            ProgressEvent::SubsectionCompleted { title, chars } => {
                output.detail(&subsection_done_message(title, *chars));
            }
            ProgressEvent::Message { level, message } => match level {
                MessageLevel::Info => output.info(message),
                MessageLevel::Warning => output.warning(message),
                MessageLevel::Error => output.error(message),
            },
            ProgressEvent::Finished {
                success,
                total_duration_secs,
                summary,
            } => {
                let line = format!("{} ({})", summary, format_duration(*total_duration_secs));
                if *success {
                    output.success(&line);
                } else {
                    output.error(&line);
                }
            }
        }
    }

    /// Print events until the run finishes or the tracker is dropped
    pub fn start_render_loop(self) -> tokio::task::JoinHandle<()> {
        let mut receiver = self.tracker.subscribe();

        tokio::spawn(async move {
            let output = Output::new();
            loop {
                match receiver.recv().await {
                    Ok(event) => {
                        let finished = matches!(event, ProgressEvent::Finished { .. });
                        self.print_event(&output, &event);
                        if finished {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        output.warning(&format!("{} progress events skipped", skipped));
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }
}

/// Render a simple progress bar
fn render_progress_bar(completed: usize, total: usize, width: usize) -> String {
    if total == 0 {
        return format!("[{}]", " ".repeat(width));
    }

    let progress = (completed as f32 / total as f32).min(1.0);
    let filled = (progress * width as f32) as usize;
    let empty = width.saturating_sub(filled);

    format!("[{}{}]", "█".repeat(filled), "░".repeat(empty))
}

/// Format duration as human-readable string
fn format_duration(secs: u64) -> String {
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    }
}
