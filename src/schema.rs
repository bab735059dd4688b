use crate::{Result, UnsupportedExpression};
use std::marker::PhantomData;

/// Maps host member names to their mapped column names.
///
/// Implemented by the schema layer and injected into the sql writer, the
/// compiler never inspects host types itself.
pub trait ColumnResolver {
    fn resolve_column(&self, member: &str) -> Result<String>;
}

/// Member names are column names, unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityColumns;

impl ColumnResolver for IdentityColumns {
    fn resolve_column(&self, member: &str) -> Result<String> {
        Ok(member.to_owned())
    }
}

/// Column mapping backed by a static member/column table.
#[derive(Debug, Clone, Copy)]
pub struct ColumnMap(pub &'static [(&'static str, &'static str)]);

impl ColumnResolver for ColumnMap {
    fn resolve_column(&self, member: &str) -> Result<String> {
        self.0
            .iter()
            .find_map(|(m, c)| (*m == member).then(|| (*c).to_owned()))
            .ok_or_else(|| {
                UnsupportedExpression::new(format!("member `{}` is not mapped to a column", member))
            })
    }
}

/// Static description of a mapped table, standing in for derive-based
/// schema reflection.
pub trait Table {
    fn table_name() -> &'static str;
    fn resolve_column(member: &str) -> Result<String>;
}

/// Adapter exposing a [`Table`]'s column mapping as a [`ColumnResolver`].
pub struct TableColumns<T: Table>(PhantomData<fn() -> T>);

impl<T: Table> TableColumns<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T: Table> Default for TableColumns<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Table> ColumnResolver for TableColumns<T> {
    fn resolve_column(&self, member: &str) -> Result<String> {
        T::resolve_column(member)
    }
}
