//! Injectable debug log sink

/// Capability the adapter logs through when debug logging is enabled
pub trait LogSink: Send + Sync {
    /// Record one message
    fn record(&self, message: &str);
}

/// Default sink: writes to standard output
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutLog;

impl LogSink for StdoutLog {
    fn record(&self, message: &str) {
        println!("{message}");
    }
}

/// Sink forwarding messages into the `tracing` ecosystem at DEBUG level
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLog;

impl LogSink for TracingLog {
    fn record(&self, message: &str) {
        tracing::debug!("{message}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct CaptureLog(Mutex<Vec<String>>);

    impl LogSink for CaptureLog {
        fn record(&self, message: &str) {
            self.0.lock().unwrap().push(message.to_string());
        }
    }

    #[test]
    fn test_sink_records_through_trait_object() {
        let capture = std::sync::Arc::new(CaptureLog(Mutex::new(Vec::new())));
        let sink: std::sync::Arc<dyn LogSink> = capture.clone();
        sink.record("first");
        sink.record("second");

        let messages = capture.0.lock().unwrap();
        assert_eq!(*messages, vec!["first", "second"]);
    }

    #[test]
    fn test_stdout_sink_does_not_panic() {
        StdoutLog.record("message");
        TracingLog.record("message");
    }
}
