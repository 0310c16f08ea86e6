use crate::message::Messages;

pub trait Driver {
    fn report(&mut self, messages: Messages);
}

/// Discards every message. For callers that only care about the values a
/// phase produces.
#[derive(Debug)]
pub struct NoopDriver;

impl Driver for NoopDriver {
    fn report(&mut self, _messages: Messages) {}
}

/// Accumulates every reported message for later inspection.
#[derive(Debug, Default)]
pub struct CollectingDriver {
    pub msgs: Messages,
}

impl CollectingDriver {
    pub fn new() -> Self {
        Self {
            msgs: Messages::new(),
        }
    }
}

impl Driver for CollectingDriver {
    fn report(&mut self, messages: Messages) {
        self.msgs.merge(messages);
    }
}
