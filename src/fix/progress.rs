use crate::logging::{LogLevel, MessageSink};

/// Step counter forwarding coarse progress and user messages to the host sink.
pub(super) struct Progress<'a> {
    sink: &'a mut dyn MessageSink,
    current: usize,
    total: usize,
}

impl<'a> Progress<'a> {
    pub(super) fn begin(sink: &'a mut dyn MessageSink, total: usize) -> Self {
        sink.progress_begin(total);
        Self {
            sink,
            current: 0,
            total,
        }
    }

    /// Advance by one step; the reported value never exceeds the total.
    pub(super) fn step(&mut self) {
        self.advance(1);
    }

    pub(super) fn advance(&mut self, steps: usize) {
        if self.current >= self.total {
            return;
        }
        self.current = (self.current + steps).min(self.total);
        self.sink.progress_update(self.current);
    }

    pub(super) fn report(&mut self, level: LogLevel, message: &str) {
        self.sink.report(level, message);
    }

    pub(super) fn end(self) {
        self.sink.progress_end();
    }
}
