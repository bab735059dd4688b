/// A value as SQLite natively stores it.
///
/// The engine knows five storage classes, nothing more. Richer host types
/// (dates, uuids, decimals, ...) are funnelled into one of these through
/// [`AsValue`](crate::AsValue) before they reach a statement or a literal.
#[derive(Default, Debug, Clone, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Integer(i64),
    Float(f64),
    Text(String),
    Blob(Box<[u8]>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Storage class name, used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Integer(..) => "INTEGER",
            Value::Float(..) => "REAL",
            Value::Text(..) => "TEXT",
            Value::Blob(..) => "BLOB",
        }
    }

    pub fn same_type(&self, other: &Self) -> bool {
        core::mem::discriminant(self) == core::mem::discriminant(other)
    }
}
