use std::fmt::{self, Display};

/// The expression tree (or a method call inside it) falls outside the
/// grammar the compiler supports. Fatal to the single compile call.
#[derive(Debug)]
pub struct UnsupportedExpression(pub String);

impl UnsupportedExpression {
    pub(crate) fn new(message: impl Into<String>) -> crate::Error {
        crate::Error::new(Self(message.into()))
    }
}

impl Display for UnsupportedExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cannot compile: {}", self.0)
    }
}

impl std::error::Error for UnsupportedExpression {}

/// A host value has no representation as a SQLite storage class.
#[derive(Debug)]
pub struct UnsupportedValueType(pub String);

impl UnsupportedValueType {
    pub(crate) fn new(message: impl Into<String>) -> crate::Error {
        crate::Error::new(Self(message.into()))
    }
}

impl Display for UnsupportedValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid value conversion: {}", self.0)
    }
}

impl std::error::Error for UnsupportedValueType {}

/// Enqueue was attempted after shutdown was requested.
#[derive(Debug)]
pub struct QueueClosed;

impl Display for QueueClosed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("The operations queue is shut down and does not accept new operations")
    }
}

impl std::error::Error for QueueClosed {}

/// The operation's cancellation token was triggered before it started.
#[derive(Debug)]
pub struct OperationCancelled;

impl Display for OperationCancelled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("The operation was cancelled before it started running")
    }
}

impl std::error::Error for OperationCancelled {}
