//! Free-text diagnostics for the controller's notification surface.

/// Buffer of diagnostics produced during one unit of work.
///
/// Nothing here is fatal; entries are drained to the host after each
/// inbound message or controller call.
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Vec<String>,
    trace_routing: bool,
}

impl Diagnostics {
    /// `trace_routing` echoes every routing decision at info level, as
    /// requested by the `frames` diagnostics category.
    pub fn new(trace_routing: bool) -> Self {
        Self {
            entries: Vec::new(),
            trace_routing,
        }
    }

    pub fn traces_routing(&self) -> bool {
        self.trace_routing
    }

    pub fn push(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(diagnostic = %message, "frame router diagnostic");
        self.entries.push(message);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn drain(&mut self) -> std::vec::Drain<'_, String> {
        self.entries.drain(..)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_empties_the_buffer() {
        let mut diagnostics = Diagnostics::new(false);
        diagnostics.push("first");
        diagnostics.push(String::from("second"));
        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics.drain().collect::<Vec<_>>(), vec!["first", "second"]);
        assert!(diagnostics.is_empty());
        assert!(!diagnostics.traces_routing());
    }
}
