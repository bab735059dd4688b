use crate::{
    BinaryOp, MethodOp, Result, UnsupportedExpression, UnsupportedValueType, Value,
};
use std::collections::BTreeMap;

/// One node of an immutable predicate tree destined for SQL compilation.
///
/// Trees are built by the combinators below (or by [`col`], [`lit`] and
/// friends), consumed by the sql writer and never mutated. Values captured
/// from the surrounding host code travel explicitly inside the tree as a
/// [`Capture`] environment instead of being resolved through reflection.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// The free row variable the predicate is quantified over.
    Param(&'static str),
    /// Member access: a column when rooted at [`Expr::Param`], otherwise a
    /// field of the captured environment evaluated eagerly at compile time.
    Member { target: Box<Expr>, member: String },
    /// An already-coerced constant.
    Literal(Value),
    /// Root of the captured closure environment.
    Captured(Capture),
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Not(Box<Expr>),
    /// Numeric/text widening applied to an eagerly evaluated operand.
    Convert {
        target: ConvertType,
        operand: Box<Expr>,
    },
    Method {
        op: MethodOp,
        receiver: Option<Box<Expr>>,
        args: Vec<Expr>,
    },
}

/// Values captured from the host scope, passed to the tree explicitly.
#[derive(Debug, Clone, PartialEq)]
pub enum Capture {
    Scalar(Value),
    Record(BTreeMap<String, Capture>),
}

impl Capture {
    pub fn scalar(value: impl Into<Value>) -> Self {
        Capture::Scalar(value.into())
    }

    pub fn record<K: Into<String>>(fields: impl IntoIterator<Item = (K, Capture)>) -> Self {
        Capture::Record(
            fields
                .into_iter()
                .map(|(k, v)| (k.into(), v))
                .collect(),
        )
    }
}

/// Target types a [`Expr::Convert`] node can widen to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvertType {
    Integer,
    Float,
    Text,
}

impl ConvertType {
    pub(crate) fn coerce(&self, value: Value) -> Result<Value> {
        match (self, value) {
            (_, Value::Null) => Ok(Value::Null),
            (ConvertType::Integer, Value::Integer(v)) => Ok(Value::Integer(v)),
            (ConvertType::Integer, Value::Float(v)) => Ok(Value::Integer(v as i64)),
            (ConvertType::Integer, Value::Text(v)) => {
                v.trim().parse().map(Value::Integer).map_err(|_| {
                    UnsupportedValueType::new(format!("Cannot convert `{}` to INTEGER", v))
                })
            }
            (ConvertType::Float, Value::Float(v)) => Ok(Value::Float(v)),
            (ConvertType::Float, Value::Integer(v)) => Ok(Value::Float(v as f64)),
            (ConvertType::Float, Value::Text(v)) => {
                v.trim().parse().map(Value::Float).map_err(|_| {
                    UnsupportedValueType::new(format!("Cannot convert `{}` to REAL", v))
                })
            }
            (ConvertType::Text, Value::Text(v)) => Ok(Value::Text(v)),
            (ConvertType::Text, Value::Integer(v)) => {
                Ok(Value::Text(itoa::Buffer::new().format(v).to_owned()))
            }
            (ConvertType::Text, Value::Float(v)) => {
                Ok(Value::Text(ryu::Buffer::new().format(v).to_owned()))
            }
            (_, value) => Err(UnsupportedValueType::new(format!(
                "Cannot convert a {} value to {:?}",
                value.type_name(),
                self
            ))),
        }
    }
}

impl Expr {
    /// Evaluate a non-column sub-expression to its runtime value.
    ///
    /// Columns have no runtime value; any shape that is not a literal, a
    /// conversion or a captured member chain is an unsupported expression.
    pub fn evaluate(&self) -> Result<Value> {
        match self {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Convert { target, operand } => target.coerce(operand.evaluate()?),
            Expr::Captured(..) | Expr::Member { .. } => match self.resolve_capture()? {
                Capture::Scalar(value) => Ok(value.clone()),
                Capture::Record(..) => Err(UnsupportedExpression::new(
                    "a captured record cannot be rendered as a value",
                )),
            },
            other => Err(UnsupportedExpression::new(format!(
                "{} node has no runtime value",
                other.variant_name()
            ))),
        }
    }

    fn resolve_capture(&self) -> Result<&Capture> {
        match self {
            Expr::Captured(capture) => Ok(capture),
            Expr::Member { target, member } => match target.resolve_capture()? {
                Capture::Record(fields) => fields.get(member).ok_or_else(|| {
                    UnsupportedExpression::new(format!(
                        "captured environment has no member `{}`",
                        member
                    ))
                }),
                Capture::Scalar(..) => Err(UnsupportedExpression::new(format!(
                    "member `{}` accessed on a scalar capture",
                    member
                ))),
            },
            other => Err(UnsupportedExpression::new(format!(
                "{} node does not reference the captured environment",
                other.variant_name()
            ))),
        }
    }

    pub(crate) fn variant_name(&self) -> &'static str {
        match self {
            Expr::Param(..) => "Param",
            Expr::Member { .. } => "Member",
            Expr::Literal(..) => "Literal",
            Expr::Captured(..) => "Captured",
            Expr::Binary { .. } => "Binary",
            Expr::Not(..) => "Not",
            Expr::Convert { .. } => "Convert",
            Expr::Method { .. } => "Method",
        }
    }

    /// Whether this is a member access on the row parameter.
    pub(crate) fn is_column(&self) -> bool {
        matches!(self, Expr::Member { target, .. } if matches!(**target, Expr::Param(..)))
    }
}

/// A column of the queried table, referenced by its host member name.
pub fn col(member: impl Into<String>) -> Expr {
    Expr::Member {
        target: Box::new(Expr::Param("row")),
        member: member.into(),
    }
}

/// The row variable itself, under an explicit name.
pub fn param(name: &'static str) -> Expr {
    Expr::Param(name)
}

/// A constant, coerced to its storage class at construction time.
pub fn lit(value: impl Into<Value>) -> Expr {
    Expr::Literal(value.into())
}

/// The SQL NULL literal.
pub fn null() -> Expr {
    Expr::Literal(Value::Null)
}

/// The root of a captured closure environment.
pub fn captured(capture: Capture) -> Expr {
    Expr::Captured(capture)
}

/// Anything usable as an operand: an expression, or a constant that
/// converts losslessly into a [`Value`].
pub trait IntoExpr {
    fn into_expr(self) -> Expr;
}

impl IntoExpr for Expr {
    fn into_expr(self) -> Expr {
        self
    }
}

macro_rules! impl_into_expr {
    ($source:ty) => {
        impl IntoExpr for $source {
            fn into_expr(self) -> Expr {
                Expr::Literal(self.into())
            }
        }
    };
}

impl_into_expr!(Value);
impl_into_expr!(bool);
impl_into_expr!(i8);
impl_into_expr!(i16);
impl_into_expr!(i32);
impl_into_expr!(i64);
impl_into_expr!(u8);
impl_into_expr!(u16);
impl_into_expr!(u32);
impl_into_expr!(f32);
impl_into_expr!(f64);
impl_into_expr!(&str);
impl_into_expr!(String);
impl_into_expr!(Vec<u8>);

impl Expr {
    fn binary(self, op: BinaryOp, rhs: impl IntoExpr) -> Expr {
        Expr::Binary {
            op,
            lhs: Box::new(self),
            rhs: Box::new(rhs.into_expr()),
        }
    }

    pub fn gt(self, rhs: impl IntoExpr) -> Expr {
        self.binary(BinaryOp::Greater, rhs)
    }
    pub fn ge(self, rhs: impl IntoExpr) -> Expr {
        self.binary(BinaryOp::GreaterEqual, rhs)
    }
    pub fn lt(self, rhs: impl IntoExpr) -> Expr {
        self.binary(BinaryOp::Less, rhs)
    }
    pub fn le(self, rhs: impl IntoExpr) -> Expr {
        self.binary(BinaryOp::LessEqual, rhs)
    }
    pub fn eq(self, rhs: impl IntoExpr) -> Expr {
        self.binary(BinaryOp::Equal, rhs)
    }
    pub fn ne(self, rhs: impl IntoExpr) -> Expr {
        self.binary(BinaryOp::NotEqual, rhs)
    }
    pub fn and(self, rhs: impl IntoExpr) -> Expr {
        self.binary(BinaryOp::And, rhs)
    }
    pub fn or(self, rhs: impl IntoExpr) -> Expr {
        self.binary(BinaryOp::Or, rhs)
    }
    pub fn bitwise_and(self, rhs: impl IntoExpr) -> Expr {
        self.binary(BinaryOp::BitwiseAnd, rhs)
    }
    pub fn bitwise_or(self, rhs: impl IntoExpr) -> Expr {
        self.binary(BinaryOp::BitwiseOr, rhs)
    }

    pub fn not(self) -> Expr {
        Expr::Not(Box::new(self))
    }

    /// Access a member of this expression.
    pub fn member(self, member: impl Into<String>) -> Expr {
        Expr::Member {
            target: Box::new(self),
            member: member.into(),
        }
    }

    pub fn convert(self, target: ConvertType) -> Expr {
        Expr::Convert {
            target,
            operand: Box::new(self),
        }
    }

    pub fn like(self, pattern: impl IntoExpr) -> Expr {
        Expr::Method {
            op: MethodOp::Like,
            receiver: None,
            args: vec![self, pattern.into_expr()],
        }
    }

    /// Membership of this value in a collection-valued expression.
    pub fn is_in(self, collection: impl IntoExpr) -> Expr {
        Expr::Method {
            op: MethodOp::In,
            receiver: None,
            args: vec![collection.into_expr(), self],
        }
    }

    /// Substring match on a text receiver.
    pub fn contains_text(self, needle: impl IntoExpr) -> Expr {
        Expr::Method {
            op: MethodOp::ContainsText,
            receiver: Some(Box::new(self)),
            args: vec![needle.into_expr()],
        }
    }

    /// Membership in this collection-valued receiver.
    pub fn contains(self, item: impl IntoExpr) -> Expr {
        Expr::Method {
            op: MethodOp::ContainsItem,
            receiver: Some(Box::new(self)),
            args: vec![item.into_expr()],
        }
    }

    pub fn starts_with(self, prefix: impl IntoExpr) -> Expr {
        Expr::Method {
            op: MethodOp::StartsWith,
            receiver: Some(Box::new(self)),
            args: vec![prefix.into_expr()],
        }
    }

    pub fn ends_with(self, suffix: impl IntoExpr) -> Expr {
        Expr::Method {
            op: MethodOp::EndsWith,
            receiver: Some(Box::new(self)),
            args: vec![suffix.into_expr()],
        }
    }

    pub fn equals(self, other: impl IntoExpr) -> Expr {
        Expr::Method {
            op: MethodOp::Equals,
            receiver: Some(Box::new(self)),
            args: vec![other.into_expr()],
        }
    }

    pub fn is(self, other: impl IntoExpr) -> Expr {
        Expr::Method {
            op: MethodOp::Is,
            receiver: None,
            args: vec![self, other.into_expr()],
        }
    }

    pub fn is_not(self, other: impl IntoExpr) -> Expr {
        Expr::Method {
            op: MethodOp::IsNot,
            receiver: None,
            args: vec![self, other.into_expr()],
        }
    }

    pub fn to_lower(self) -> Expr {
        Expr::Method {
            op: MethodOp::ToLower,
            receiver: Some(Box::new(self)),
            args: vec![],
        }
    }

    pub fn to_upper(self) -> Expr {
        Expr::Method {
            op: MethodOp::ToUpper,
            receiver: Some(Box::new(self)),
            args: vec![],
        }
    }
}
