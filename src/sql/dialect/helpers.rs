//! Shared helpers for dialect implementations.

use crate::sql::expr::{func, lit_inline, Expr};

/// Quote with double quotes, escaping embedded quotes by doubling.
pub fn quote_double(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Quote with backticks, escaping embedded backticks by doubling.
pub fn quote_backtick(ident: &str) -> String {
    format!("`{}`", ident.replace('`', "``"))
}

/// Quote with brackets, escaping embedded closing brackets by doubling.
pub fn quote_bracket(ident: &str) -> String {
    format!("[{}]", ident.replace(']', "]]"))
}

/// `DATE_TRUNC('unit', expr)`.
pub fn date_trunc(unit: &str, expr: Expr) -> Expr {
    func("DATE_TRUNC", vec![lit_inline(unit), expr])
}

/// A single-argument function call.
pub fn call1(name: &str, expr: Expr) -> Expr {
    func(name, vec![expr])
}
