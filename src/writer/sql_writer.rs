use crate::{
    BinaryOp, ColumnResolver, Expr, MethodOp, OrderBy, Result, UnsupportedExpression, Value,
    separated_by,
};
use std::fmt::Write;

/// Dialect printer converting expression trees and select descriptors into
/// concrete SQL strings.
///
/// Everything writes into a caller supplied buffer; the default methods
/// implement the SQLite conventions and a dialect may override the pieces
/// it renders differently.
pub trait SqlWriter {
    /// Escape occurrences of `search` with `replace` while copying into the buffer.
    fn write_escaped(&self, out: &mut String, value: &str, search: char, replace: &str) {
        let mut position = 0;
        for (i, c) in value.char_indices() {
            if c == search {
                out.push_str(&value[position..i]);
                out.push_str(replace);
                position = i + 1;
            }
        }
        out.push_str(&value[position..]);
    }

    /// Quote identifiers ("name") doubling inner quotes.
    fn write_identifier_quoted(&self, out: &mut String, value: &str) {
        out.push('"');
        self.write_escaped(out, value, '"', "\"\"");
        out.push('"');
    }

    /// Render a concrete value as a SQL literal.
    fn write_value(&self, out: &mut String, value: &Value) {
        match value {
            Value::Null => out.push_str("NULL"),
            Value::Integer(v) => {
                let mut buffer = itoa::Buffer::new();
                out.push_str(buffer.format(*v));
            }
            Value::Float(v) => {
                if v.is_infinite() {
                    self.write_value_infinity(out, v.is_sign_negative());
                } else if v.is_nan() {
                    self.write_value_nan(out);
                } else {
                    let mut buffer = ryu::Buffer::new();
                    out.push_str(buffer.format(*v));
                }
            }
            Value::Text(v) => self.write_value_string(out, v),
            Value::Blob(v) => self.write_value_blob(out, v),
        }
    }

    /// Render and escape a string literal using single quotes.
    fn write_value_string(&self, out: &mut String, value: &str) {
        out.push('\'');
        self.write_escaped(out, value, '\'', "''");
        out.push('\'');
    }

    /// Render a blob literal using the hex form.
    fn write_value_blob(&self, out: &mut String, value: &[u8]) {
        out.push_str("X'");
        for b in value {
            let _ = write!(out, "{:02X}", b);
        }
        out.push('\'');
    }

    /// SQLite has no infinity literal, an out of range constant decays to it.
    fn write_value_infinity(&self, out: &mut String, negative: bool) {
        if negative {
            out.push('-');
        }
        out.push_str("1.0e+10000");
    }

    /// SQLite stores NaN as NULL.
    fn write_value_nan(&self, out: &mut String) {
        out.push_str("NULL");
    }

    /// Compile an expression tree into a SQL fragment.
    fn write_expression(
        &self,
        out: &mut String,
        value: &Expr,
        columns: &dyn ColumnResolver,
    ) -> Result<()> {
        match value {
            Expr::Param(name) => {
                out.push(':');
                out.push_str(name);
            }
            Expr::Member { target, member } if matches!(**target, Expr::Param(..)) => {
                self.write_identifier_quoted(out, &columns.resolve_column(member)?);
            }
            Expr::Member { .. } | Expr::Captured(..) | Expr::Convert { .. } => {
                self.write_value(out, &value.evaluate()?);
            }
            Expr::Literal(v) => self.write_value(out, v),
            Expr::Binary { op, lhs, rhs } => {
                self.write_expression_binary_op(out, *op, lhs, rhs, columns)?;
            }
            Expr::Not(operand) => {
                out.push_str("NOT(");
                self.write_expression(out, operand, columns)?;
                out.push(')');
            }
            Expr::Method { op, receiver, args } => {
                self.write_expression_method_op(out, *op, receiver.as_deref(), args, columns)?;
            }
        }
        Ok(())
    }

    /// Render a binary operator expression.
    ///
    /// A right side compiling to the NULL literal turns equality into the
    /// IS NULL forms; a left-hand NULL keeps the plain operator.
    fn write_expression_binary_op(
        &self,
        out: &mut String,
        op: BinaryOp,
        lhs: &Expr,
        rhs: &Expr,
        columns: &dyn ColumnResolver,
    ) -> Result<()> {
        let mut left = String::new();
        self.write_expression(&mut left, lhs, columns)?;
        let mut right = String::new();
        self.write_expression(&mut right, rhs, columns)?;
        if right == "NULL" && matches!(op, BinaryOp::Equal | BinaryOp::NotEqual) {
            out.push('(');
            out.push_str(&left);
            out.push_str(if op == BinaryOp::Equal {
                " IS NULL)"
            } else {
                " IS NOT NULL)"
            });
            return Ok(());
        }
        let _ = write!(out, "({} {} {})", left, op.sql_symbol(), right);
        Ok(())
    }

    /// Render a method-style predicate.
    ///
    /// Arity and receiver shape are revalidated here so a hand assembled
    /// tree cannot slip through with the wrong number of operands.
    fn write_expression_method_op(
        &self,
        out: &mut String,
        op: MethodOp,
        receiver: Option<&Expr>,
        args: &[Expr],
        columns: &dyn ColumnResolver,
    ) -> Result<()> {
        if args.len() != op.arity() || receiver.is_none() != op.is_static() {
            return Err(UnsupportedExpression::new(format!(
                "method operator {:?} applied to {} argument(s)",
                op,
                args.len()
            )));
        }
        let mut recv = String::new();
        if let Some(receiver) = receiver {
            self.write_expression(&mut recv, receiver, columns)?;
        }
        let mut rendered = Vec::with_capacity(args.len());
        for arg in args {
            let mut buffer = String::new();
            self.write_expression(&mut buffer, arg, columns)?;
            rendered.push(buffer);
        }
        let _ = match op {
            MethodOp::Like => write!(out, "({} LIKE {})", rendered[0], rendered[1]),
            MethodOp::In => write!(out, "({} IN {})", rendered[1], rendered[0]),
            MethodOp::ContainsText => {
                write!(out, "({} LIKE ('%' || {} || '%'))", recv, rendered[0])
            }
            MethodOp::ContainsItem => write!(out, "({} IN {})", rendered[0], recv),
            MethodOp::StartsWith => write!(out, "({} LIKE ({} || '%'))", recv, rendered[0]),
            MethodOp::EndsWith => write!(out, "({} LIKE ('%' || {}))", recv, rendered[0]),
            MethodOp::Equals => write!(out, "({} = ({}))", recv, rendered[0]),
            MethodOp::Is => write!(out, "({} IS {})", rendered[0], rendered[1]),
            MethodOp::IsNot => write!(out, "({} IS NOT {})", rendered[0], rendered[1]),
            MethodOp::ToLower => write!(out, "LOWER({})", recv),
            MethodOp::ToUpper => write!(out, "UPPER({})", recv),
        };
        Ok(())
    }

    /// Emit a SELECT statement. Optional clauses appear only when supplied,
    /// order keys keep the caller's sequence, ascending is the default and
    /// descending appends ` DESC`.
    fn write_select(
        &self,
        out: &mut String,
        selection: &str,
        table: &str,
        condition: Option<&Expr>,
        order_by: &[OrderBy],
        limit: Option<u64>,
        offset: Option<u64>,
        columns: &dyn ColumnResolver,
    ) -> Result<()> {
        out.reserve(64 + selection.len() + table.len());
        out.push_str("SELECT ");
        out.push_str(selection);
        out.push_str("\nFROM ");
        self.write_identifier_quoted(out, table);
        if let Some(condition) = condition {
            out.push_str("\nWHERE ");
            self.write_expression(out, condition, columns)?;
        }
        if !order_by.is_empty() {
            out.push_str("\nORDER BY ");
            separated_by(
                out,
                order_by,
                |out, term| {
                    self.write_identifier_quoted(out, &term.column);
                    if !term.ascending {
                        out.push_str(" DESC");
                    }
                },
                ", ",
            );
        }
        if let Some(limit) = limit {
            let _ = write!(out, "\nLIMIT {}", limit);
        }
        if let Some(offset) = offset {
            let _ = write!(out, "\nOFFSET {}", offset);
        }
        Ok(())
    }
}

/// The SQLite dialect writer.
#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteSqlWriter;

impl SqlWriter for SqliteSqlWriter {}

/// Compile a single expression tree into a WHERE-ready SQL fragment.
pub fn compile_expression(expr: &Expr, columns: &dyn ColumnResolver) -> Result<String> {
    let mut out = String::new();
    SqliteSqlWriter.write_expression(&mut out, expr, columns)?;
    Ok(out)
}
