use std::collections::VecDeque;

/// Outgoing lines waiting for the next flush, oldest first.
///
/// Lines are stored without their terminator; the writer adds it.
#[derive(Debug, Default)]
pub struct Outbox {
    queue: VecDeque<String>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: impl Into<String>) {
        self.queue.push_back(line.into());
    }

    /// Remove and return every queued line in order.
    pub fn drain(&mut self) -> Vec<String> {
        self.queue.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.queue.iter().map(String::as_str)
    }
}
