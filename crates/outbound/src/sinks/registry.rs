//! SinkRegistry - named sink lookup
//!
//! In-process implementation of [`SinkResolver`] backing deferred
//! failure-sink names. Registration happens during wiring; lookups after
//! that are read-only.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use contracts::{MessageSink, RelayError, SinkResolver};

/// Registry of named sinks
#[derive(Default)]
pub struct SinkRegistry {
    sinks: RwLock<HashMap<String, Arc<dyn MessageSink>>>,
}

impl SinkRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a sink under a name, replacing any previous entry
    pub fn register(&self, name: impl Into<String>, sink: Arc<dyn MessageSink>) {
        self.sinks.write().unwrap().insert(name.into(), sink);
    }

    /// Names of all registered sinks
    pub fn names(&self) -> Vec<String> {
        self.sinks.read().unwrap().keys().cloned().collect()
    }
}

impl SinkResolver for SinkRegistry {
    fn resolve(&self, name: &str) -> Result<Arc<dyn MessageSink>, RelayError> {
        self.sinks
            .read()
            .unwrap()
            .get(name)
            .map(Arc::clone)
            .ok_or_else(|| RelayError::SinkResolution {
                name: name.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sinks::LogSink;

    #[test]
    fn test_resolve_registered_sink() {
        let registry = SinkRegistry::new();
        registry.register("errors", Arc::new(LogSink::new("errors")));

        let sink = registry.resolve("errors").unwrap();
        assert_eq!(sink.name(), "errors");
    }

    #[test]
    fn test_resolve_unknown_name_fails() {
        let registry = SinkRegistry::new();
        let err = registry.resolve("missing").unwrap_err();
        assert!(matches!(err, RelayError::SinkResolution { ref name } if name == "missing"));
    }
}
