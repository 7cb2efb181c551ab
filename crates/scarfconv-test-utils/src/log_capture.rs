//! Capture `tracing` events for assertions.
//!
//! [`LogCapture`] is a layer that records each event's level, target, message
//! and `attribute` field. Install it for the scope of a test with
//! [`LogCapture::install`]:
//!
//! ```ignore
//! let (capture, _guard) = LogCapture::install();
//! registry.mark_valid("nope");
//! assert!(capture.warned_about("nope"));
//! ```

use std::sync::{Arc, Mutex};

use tracing::field::{Field, Visit};
use tracing::subscriber::DefaultGuard;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;

/// One captured event.
#[derive(Debug, Clone)]
pub struct CapturedEvent {
    pub level: Level,
    pub target: String,
    pub message: String,
    /// Value of the `attribute` field, when the event had one.
    pub attribute: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct LogCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl LogCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a fresh capture as the thread's default subscriber until the
    /// guard is dropped.
    pub fn install() -> (Self, DefaultGuard) {
        let capture = Self::new();
        let guard = tracing_subscriber::registry()
            .with(capture.clone())
            .set_default();
        (capture, guard)
    }

    pub fn events(&self) -> Vec<CapturedEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub fn at_level(&self, level: Level) -> Vec<CapturedEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.level == level)
            .collect()
    }

    /// Whether a warning was logged for `attribute`.
    pub fn warned_about(&self, attribute: &str) -> bool {
        self.at_level(Level::WARN)
            .iter()
            .any(|e| e.attribute.as_deref() == Some(attribute))
    }

    pub fn contains_message(&self, needle: &str) -> bool {
        self.events().iter().any(|e| e.message.contains(needle))
    }
}

impl<S: Subscriber> Layer<S> for LogCapture {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        if let Ok(mut events) = self.events.lock() {
            events.push(CapturedEvent {
                level: *metadata.level(),
                target: metadata.target().to_string(),
                message: visitor.message,
                attribute: visitor.attribute,
            });
        }
    }
}

#[derive(Default)]
struct FieldVisitor {
    message: String,
    attribute: Option<String>,
}

impl Visit for FieldVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        match field.name() {
            "message" => self.message = format!("{value:?}"),
            "attribute" => self.attribute = Some(format!("{value:?}")),
            _ => {}
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "message" => self.message = value.to_string(),
            "attribute" => self.attribute = Some(value.to_string()),
            _ => {}
        }
    }
}
