use crate::{
    Expr, Result, SqlWriter, SqliteSqlWriter, Table, TableColumns, UnsupportedExpression,
};
use std::{borrow::Cow, marker::PhantomData};

/// One ORDER BY key: resolved column name and direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub column: String,
    pub ascending: bool,
}

/// An immutable SELECT descriptor over a mapped table.
///
/// Every method consumes the descriptor and returns a new one, and the type
/// is `Clone`, so a descriptor can be kept around and reused to produce any
/// number of executions, including concurrent ones going through the
/// operations queue.
pub struct SelectQuery<T: Table> {
    selection: Cow<'static, str>,
    condition: Option<Expr>,
    order_by: Vec<(Expr, bool)>,
    limit: Option<u64>,
    offset: Option<u64>,
    table: PhantomData<fn() -> T>,
}

impl<T: Table> SelectQuery<T> {
    pub fn new() -> Self {
        Self {
            selection: "*".into(),
            condition: None,
            order_by: Vec::new(),
            limit: None,
            offset: None,
            table: PhantomData,
        }
    }

    /// Narrow the result set. Repeated calls combine with `and`.
    pub fn filter(mut self, predicate: Expr) -> Self {
        self.condition = Some(match self.condition.take() {
            Some(existing) => existing.and(predicate),
            None => predicate,
        });
        self
    }

    /// Append an ascending order key. Keys keep the order they were added
    /// in, later keys break ties among earlier ones.
    pub fn order_by(mut self, key: Expr) -> Self {
        self.order_by.push((key, true));
        self
    }

    /// Append a descending order key.
    pub fn order_by_descending(mut self, key: Expr) -> Self {
        self.order_by.push((key, false));
        self
    }

    pub fn take(mut self, count: u64) -> Self {
        self.limit = Some(count);
        self
    }

    pub fn skip(mut self, count: u64) -> Self {
        self.offset = Some(count);
        self
    }

    /// Same descriptor, counting rows instead of returning them.
    pub fn count(mut self) -> Self {
        self.selection = "COUNT(*)".into();
        self
    }

    /// Render the complete SELECT statement.
    pub fn to_sql(&self) -> Result<String> {
        let order_by = self
            .order_by
            .iter()
            .map(|(key, ascending)| {
                Ok(OrderBy {
                    column: order_key_column::<T>(key)?,
                    ascending: *ascending,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let mut out = String::new();
        SqliteSqlWriter.write_select(
            &mut out,
            &self.selection,
            T::table_name(),
            self.condition.as_ref(),
            &order_by,
            self.limit,
            self.offset,
            &TableColumns::<T>::new(),
        )?;
        Ok(out)
    }
}

impl<T: Table> Default for SelectQuery<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Table> Clone for SelectQuery<T> {
    fn clone(&self) -> Self {
        Self {
            selection: self.selection.clone(),
            condition: self.condition.clone(),
            order_by: self.order_by.clone(),
            limit: self.limit,
            offset: self.offset,
            table: PhantomData,
        }
    }
}

/// Extract the column an order key refers to: a bare member access on the
/// row parameter, optionally inside a numeric widening conversion.
fn order_key_column<T: Table>(key: &Expr) -> Result<String> {
    let key = match key {
        Expr::Convert { operand, .. } => operand.as_ref(),
        key => key,
    };
    match key {
        Expr::Member { target, member } if matches!(**target, Expr::Param(..)) => {
            T::resolve_column(member)
        }
        other => Err(UnsupportedExpression::new(format!(
            "Order By does not support {} keys",
            other.variant_name()
        ))),
    }
}
