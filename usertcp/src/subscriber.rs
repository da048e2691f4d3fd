use std::fmt::{Debug, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::event::Event;
use tracing::field::{Field, Visit};
use tracing::{span, Id, Level, Metadata, Subscriber};

/// Prints one line per event to stderr: level, target, message and fields.
///
/// Warnings and errors are always shown. Info is shown at verbosity 0, debug
/// is added at 1 and trace at 2 or more.
pub struct DeviceSubscriber {
    ids: AtomicUsize,
    verbosity: u64,
}

impl DeviceSubscriber {
    pub fn new(verbosity: u64) -> Self {
        DeviceSubscriber {
            ids: AtomicUsize::new(1),
            verbosity,
        }
    }

    pub fn shows(&self, level: &Level) -> bool {
        required_verbosity(level) <= self.verbosity
    }
}

impl Subscriber for DeviceSubscriber {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.shows(metadata.level())
    }

    // Spans are not printed, they only need distinct ids
    fn new_span(&self, _span: &span::Attributes) -> Id {
        let id = self.ids.fetch_add(1, Ordering::SeqCst);
        Id::from_u64(id as u64)
    }

    fn record(&self, _span: &Id, _values: &span::Record) {}

    fn record_follows_from(&self, _span: &Id, _follows: &Id) {}

    fn event(&self, event: &Event) {
        let metadata = event.metadata();
        let mut visitor = LineVisitor::default();
        event.record(&mut visitor);
        eprintln!(
            "{:>5} {}: {}{}",
            level_label(metadata.level()),
            metadata.target(),
            visitor.message,
            visitor.fields
        );
    }

    fn enter(&self, _span: &Id) {}

    fn exit(&self, _span: &Id) {}
}

fn required_verbosity(level: &Level) -> u64 {
    if *level == Level::TRACE {
        2
    } else if *level == Level::DEBUG {
        1
    } else {
        0
    }
}

fn level_label(level: &Level) -> &'static str {
    if *level == Level::TRACE {
        "TRACE"
    } else if *level == Level::DEBUG {
        "DEBUG"
    } else if *level == Level::INFO {
        "INFO"
    } else if *level == Level::WARN {
        "WARN"
    } else {
        "ERROR"
    }
}

/// Collects the message and the `name=value` pairs of one event.
#[derive(Default)]
struct LineVisitor {
    message: String,
    fields: String,
}

impl Visit for LineVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            let _ = write!(self.fields, " {}={}", field.name(), value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{:?}", value);
        } else {
            let _ = write!(self.fields, " {}={:?}", field.name(), value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_levels() {
        let quiet = DeviceSubscriber::new(0);
        assert!(quiet.shows(&Level::ERROR));
        assert!(quiet.shows(&Level::WARN));
        assert!(quiet.shows(&Level::INFO));
        assert!(!quiet.shows(&Level::DEBUG));
        assert!(!quiet.shows(&Level::TRACE));

        let debug = DeviceSubscriber::new(1);
        assert!(debug.shows(&Level::DEBUG));
        assert!(!debug.shows(&Level::TRACE));

        let trace = DeviceSubscriber::new(5);
        assert!(trace.shows(&Level::TRACE));
    }

    #[test]
    fn labels() {
        assert_eq!(level_label(&Level::WARN), "WARN");
        assert_eq!(level_label(&Level::TRACE), "TRACE");
    }
}
