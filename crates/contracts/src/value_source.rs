//! ValueSource - per-message deferred configuration
//!
//! A configuration value is either a constant or a pure function of the
//! message being handled. This closed variant replaces a dynamic expression
//! language: operators wire literals, programmatic users wire closures.

use std::fmt;
use std::sync::Arc;

use crate::Message;

/// A literal value or a per-message computation
pub enum ValueSource<T> {
    /// Fixed value, resolved identically for every message
    Literal(T),

    /// Pure function of the message; `None` means "not resolvable here"
    Computed(Arc<dyn Fn(&Message) -> Option<T> + Send + Sync>),
}

impl<T: Clone> ValueSource<T> {
    /// Create a literal source
    pub fn literal(value: T) -> Self {
        Self::Literal(value)
    }

    /// Create a computed source from a closure
    pub fn computed(f: impl Fn(&Message) -> Option<T> + Send + Sync + 'static) -> Self {
        Self::Computed(Arc::new(f))
    }

    /// Resolve this source against a message
    pub fn resolve(&self, message: &Message) -> Option<T> {
        match self {
            Self::Literal(value) => Some(value.clone()),
            Self::Computed(f) => f(message),
        }
    }
}

impl<T> Clone for ValueSource<T>
where
    T: Clone,
{
    fn clone(&self) -> Self {
        match self {
            Self::Literal(value) => Self::Literal(value.clone()),
            Self::Computed(f) => Self::Computed(Arc::clone(f)),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ValueSource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            Self::Computed(_) => f.write_str("Computed(<fn>)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header_names;

    #[test]
    fn test_literal_resolves_for_any_message() {
        let source = ValueSource::literal("orders".to_string());
        let message = Message::from_bytes(&b"x"[..]);
        assert_eq!(source.resolve(&message), Some("orders".to_string()));
    }

    #[test]
    fn test_computed_reads_message() {
        let source = ValueSource::computed(|message: &Message| {
            message.header(header_names::STREAM).map(str::to_uppercase)
        });

        let with = Message::from_bytes(&b"x"[..]).with_header(header_names::STREAM, "orders");
        let without = Message::from_bytes(&b"x"[..]);

        assert_eq!(source.resolve(&with), Some("ORDERS".to_string()));
        assert_eq!(source.resolve(&without), None);
    }
}
