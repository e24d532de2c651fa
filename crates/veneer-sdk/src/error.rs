//! Error types for proxy synthesis and call dispatch

use crate::descriptor::TypeKind;

/// Result type for synthesis and dispatch operations
pub type ProxyResult<T> = Result<T, ProxyError>;

/// Errors raised while building an interface table or running a call
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProxyError {
    /// The described type is not an interface
    #[error("`{name}` is not an interface (described as {kind})")]
    NotAnInterface {
        /// Type name as described
        name: String,
        /// Kind the descriptor declared
        kind: TypeKind,
    },

    /// A member shape cannot be carried by the forwarding protocol
    #[error("unsupported member `{interface}::{member}`: {reason}")]
    UnsupportedMember {
        /// Declaring interface
        interface: String,
        /// Member name
        member: String,
        /// Why the shape is rejected
        reason: String,
    },

    /// A flattened member index was never assigned
    #[error("member index {index} out of range for `{interface}` ({len} members)")]
    IndexOutOfRange {
        /// Interface whose table was consulted
        interface: String,
        /// Requested index
        index: usize,
        /// Number of indexed members
        len: usize,
    },

    /// No member has the requested name
    #[error("`{interface}` has no member named `{member}`")]
    UnknownMember {
        /// Interface whose table was consulted
        interface: String,
        /// Requested name
        member: String,
    },

    /// A forwarding slot does not belong to the interface table
    #[error("slot {slot} of `{declaring}` is not part of `{interface}`")]
    UnknownSlot {
        /// Interface whose table was consulted
        interface: String,
        /// Interface that declares the slot
        declaring: String,
        /// Declared slot
        slot: usize,
    },

    /// Type mismatch during value conversion
    #[error("type mismatch: expected {expected}, got {got}")]
    TypeMismatch {
        /// Expected type name
        expected: String,
        /// Actual type name
        got: String,
    },

    /// An argument position was not supplied
    #[error("`{member}` expects argument {index}, only {len} supplied")]
    MissingArgument {
        /// Member being dispatched
        member: String,
        /// Missing position
        index: usize,
        /// Number of supplied arguments
        len: usize,
    },

    /// A `&mut self` member was dispatched through a shared target borrow
    #[error("`{member}` requires exclusive access to the target")]
    ReceiverMismatch {
        /// Member being dispatched
        member: String,
    },

    /// Dispatch to the target was requested but no target is set
    #[error("`{member}` has no target to dispatch to")]
    MissingTarget {
        /// Member being dispatched
        member: String,
    },

    /// Raised by a handler hook
    #[error("{0}")]
    Handler(String),

    /// Configuration could not be read or parsed
    #[error("config error: {0}")]
    Config(String),

    /// A diagnostic dump could not be written
    #[error("dump failed: {0}")]
    Dump(String),
}

impl ProxyError {
    /// Build a handler error from any message
    pub fn handler(message: impl Into<String>) -> Self {
        ProxyError::Handler(message.into())
    }

    /// Build a type mismatch between two type names
    pub fn mismatch(expected: impl Into<String>, got: impl Into<String>) -> Self {
        ProxyError::TypeMismatch {
            expected: expected.into(),
            got: got.into(),
        }
    }
}

impl From<String> for ProxyError {
    fn from(s: String) -> Self {
        ProxyError::Handler(s)
    }
}

impl From<&str> for ProxyError {
    fn from(s: &str) -> Self {
        ProxyError::Handler(s.to_string())
    }
}
