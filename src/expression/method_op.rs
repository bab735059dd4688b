use crate::{Result, UnsupportedExpression};

/// Method-style predicates, fixed at tree construction time.
///
/// The front end maps host call sites to one of these tags so the compiler
/// can match exhaustively over a closed set instead of comparing method
/// names. [`MethodOp::resolve`] is the single place where a raw name/arity
/// pair is admitted or rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodOp {
    /// `Like(a, b)` renders `(a LIKE b)`.
    Like,
    /// Static-style `Contains(collection, item)` renders `(item IN collection)`.
    In,
    /// `Contains(item)` on a text receiver renders `(recv LIKE ('%' || item || '%'))`.
    ContainsText,
    /// `Contains(item)` on a collection receiver renders `(item IN recv)`.
    ContainsItem,
    /// `StartsWith(s)` renders `(recv LIKE (s || '%'))`.
    StartsWith,
    /// `EndsWith(s)` renders `(recv LIKE ('%' || s))`.
    EndsWith,
    /// `Equals(x)` renders `(recv = (x))`.
    Equals,
    /// `Is(a, b)` renders `(a IS b)`.
    Is,
    /// `IsNot(a, b)` renders `(a IS NOT b)`.
    IsNot,
    /// `ToLower()` renders `LOWER(recv)`.
    ToLower,
    /// `ToUpper()` renders `UPPER(recv)`.
    ToUpper,
}

impl MethodOp {
    /// Map a raw method name and explicit argument count to its tag.
    ///
    /// `text_receiver` disambiguates the one-argument `Contains`, which
    /// compiles as a substring match on text receivers and as membership on
    /// anything else.
    pub fn resolve(name: &str, args: usize, text_receiver: bool) -> Result<Self> {
        Ok(match (name, args) {
            ("Like", 2) => MethodOp::Like,
            ("Contains", 2) => MethodOp::In,
            ("Contains", 1) if text_receiver => MethodOp::ContainsText,
            ("Contains", 1) => MethodOp::ContainsItem,
            ("StartsWith", 1) => MethodOp::StartsWith,
            ("EndsWith", 1) => MethodOp::EndsWith,
            ("Equals", 1) => MethodOp::Equals,
            ("Is", 2) => MethodOp::Is,
            ("IsNot", 2) => MethodOp::IsNot,
            ("ToLower", 0) => MethodOp::ToLower,
            ("ToUpper", 0) => MethodOp::ToUpper,
            _ => {
                return Err(UnsupportedExpression::new(format!(
                    "method `{}` with {} argument(s)",
                    name, args
                )));
            }
        })
    }

    /// Number of operands expected besides the receiver.
    pub(crate) fn arity(&self) -> usize {
        match self {
            MethodOp::Like | MethodOp::In | MethodOp::Is | MethodOp::IsNot => 2,
            MethodOp::ContainsText
            | MethodOp::ContainsItem
            | MethodOp::StartsWith
            | MethodOp::EndsWith
            | MethodOp::Equals => 1,
            MethodOp::ToLower | MethodOp::ToUpper => 0,
        }
    }

    /// Whether the operands travel as explicit arguments (no receiver).
    pub(crate) fn is_static(&self) -> bool {
        matches!(
            self,
            MethodOp::Like | MethodOp::In | MethodOp::Is | MethodOp::IsNot
        )
    }
}
