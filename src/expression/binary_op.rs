use std::fmt::{self, Display, Formatter};

/// Binary operators the compiler knows how to print.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Greater,
    GreaterEqual,
    Less,
    LessEqual,
    BitwiseAnd,
    And,
    BitwiseOr,
    Or,
    Equal,
    NotEqual,
}

impl BinaryOp {
    /// SQL spelling of the operator.
    pub fn sql_symbol(&self) -> &'static str {
        match self {
            BinaryOp::Greater => ">",
            BinaryOp::GreaterEqual => ">=",
            BinaryOp::Less => "<",
            BinaryOp::LessEqual => "<=",
            BinaryOp::BitwiseAnd => "&",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
            BinaryOp::BitwiseOr => "|",
            BinaryOp::Equal => "=",
            BinaryOp::NotEqual => "!=",
        }
    }
}

impl Display for BinaryOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BinaryOp::Greater => "Greater",
            BinaryOp::GreaterEqual => "GreaterEqual",
            BinaryOp::Less => "Less",
            BinaryOp::LessEqual => "LessEqual",
            BinaryOp::BitwiseAnd => "BitwiseAnd",
            BinaryOp::And => "And",
            BinaryOp::BitwiseOr => "BitwiseOr",
            BinaryOp::Or => "Or",
            BinaryOp::Equal => "Equal",
            BinaryOp::NotEqual => "NotEqual",
        })
    }
}
