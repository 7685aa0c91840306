use crate::domain::{DeadLetterQueue, Error};

/// Dead-letter queue that routes failed events into the log. A rejected
/// event never halts the stream; it is reported here and skipped.
#[derive(Default, Debug)]
pub struct LogDlq {}

impl DeadLetterQueue for LogDlq {
    fn report(&self, error: &Error) {
        tracing::warn!(error = %error, "event routed to dead-letter queue");
    }
}

/// Test double keeping rejected errors for inspection.
#[cfg(test)]
#[derive(Default, Debug)]
pub struct RecordingDlq {
    pub errors: std::cell::RefCell<Vec<String>>,
}

#[cfg(test)]
impl DeadLetterQueue for RecordingDlq {
    fn report(&self, error: &Error) {
        self.errors.borrow_mut().push(error.to_string());
    }
}
