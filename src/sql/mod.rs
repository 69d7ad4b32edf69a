//! SQL generation: expression AST, query AST, tokens, and dialects.
//!
//! The compiler in [`crate::translation`] produces the ASTs defined here;
//! this module owns turning them into text:
//!
//! - [`expr`] - expression AST
//! - [`query`] - SELECT statement AST
//! - [`token`] - token types, serialization, parameter collection
//! - [`dialect`] - the dialect trait and built-in dialect implementations

pub mod dialect;
pub mod expr;
pub mod query;
pub mod token;

pub use dialect::{QuoteStyle, SqlDialect};
pub use expr::{BinaryOperator, Expr, ExprExt, Literal, UnaryOperator};
pub use query::{FromSource, Join, JoinType, LimitOffset, OrderByExpr, Query, SelectExpr, SortDir, TableRef};
pub use token::{FormatError, SqlParam, Token, TokenStream};
