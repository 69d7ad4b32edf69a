//! SELECT statement AST.
//!
//! The clause appliers in [`crate::translation`] fold their contributions
//! into a [`Query`]; `to_sql` renders it through the token serializer.

use super::dialect::SqlDialect;
use super::expr::{star, Expr, ExprExt};
use super::token::{FormatError, SqlParam, Token, TokenStream};

// =============================================================================
// Select Expression (column with optional alias)
// =============================================================================

/// A SELECT list item: expression with optional alias.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "builders have no effect until used"]
pub struct SelectExpr {
    pub expr: Expr,
    pub alias: Option<String>,
}

impl SelectExpr {
    pub fn new(expr: Expr) -> Self {
        Self { expr, alias: None }
    }

    pub fn with_alias(mut self, alias: &str) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn to_tokens(&self) -> TokenStream {
        let mut ts = self.expr.to_tokens();
        if let Some(alias) = &self.alias {
            ts.space()
                .push(Token::As)
                .space()
                .push(Token::Ident(alias.clone()));
        }
        ts
    }
}

impl From<Expr> for SelectExpr {
    fn from(expr: Expr) -> Self {
        SelectExpr::new(expr)
    }
}

// =============================================================================
// FROM sources
// =============================================================================

/// A table reference with optional schema and alias. The alias renders
/// without an AS keyword, matching join and subquery aliases.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "builders have no effect until used"]
pub struct TableRef {
    pub schema: Option<String>,
    pub table: String,
    pub alias: Option<String>,
}

impl TableRef {
    pub fn new(table: &str) -> Self {
        Self {
            schema: None,
            table: table.into(),
            alias: None,
        }
    }

    pub fn with_schema(mut self, schema: &str) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn with_alias(mut self, alias: &str) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn to_tokens(&self) -> TokenStream {
        let mut ts = TokenStream::new();
        if let Some(schema) = &self.schema {
            ts.push(Token::Ident(schema.clone()));
            ts.push(Token::Dot);
        }
        ts.push(Token::Ident(self.table.clone()));
        if let Some(alias) = &self.alias {
            ts.space().push(Token::Ident(alias.clone()));
        }
        ts
    }
}

/// What a query selects from or joins against.
#[derive(Debug, Clone, PartialEq)]
pub enum FromSource {
    /// A physical table.
    Table(TableRef),
    /// A parenthesized subquery with an alias.
    Subquery { query: Box<Query>, alias: String },
    /// An opaque native SQL fragment, parenthesized and aliased.
    Native { sql: String, alias: String },
}

impl FromSource {
    pub fn to_tokens(&self, dialect: &dyn SqlDialect) -> TokenStream {
        let mut ts = TokenStream::new();
        match self {
            FromSource::Table(table) => {
                ts.append(&table.to_tokens());
            }
            FromSource::Subquery { query, alias } => {
                ts.lparen();
                ts.append(&query.to_tokens(dialect));
                ts.rparen();
                ts.space().push(Token::Ident(alias.clone()));
            }
            FromSource::Native { sql, alias } => {
                ts.lparen();
                ts.push(Token::Raw(sql.clone()));
                ts.rparen();
                ts.space().push(Token::Ident(alias.clone()));
            }
        }
        ts
    }
}

// =============================================================================
// Joins
// =============================================================================

/// Type of join.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    Left,
}

/// A JOIN clause.
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub join_type: JoinType,
    pub source: FromSource,
    pub on: Expr,
}

impl Join {
    pub fn to_tokens(&self, dialect: &dyn SqlDialect) -> TokenStream {
        let mut ts = TokenStream::new();
        match self.join_type {
            JoinType::Inner => ts.push(Token::Inner),
            JoinType::Left => ts.push(Token::Left),
        };
        ts.space().push(Token::Join).space();
        ts.append(&self.source.to_tokens(dialect));
        ts.space().push(Token::On).space();
        ts.append(&self.on.to_tokens());
        ts
    }
}

// =============================================================================
// ORDER BY
// =============================================================================

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDir {
    #[default]
    Asc,
    Desc,
}

/// An ORDER BY expression.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderByExpr {
    pub expr: Expr,
    pub dir: SortDir,
}

impl OrderByExpr {
    pub fn asc(expr: Expr) -> Self {
        Self {
            expr,
            dir: SortDir::Asc,
        }
    }

    pub fn desc(expr: Expr) -> Self {
        Self {
            expr,
            dir: SortDir::Desc,
        }
    }

    pub fn to_tokens(&self) -> TokenStream {
        let mut ts = self.expr.to_tokens();
        ts.space().push(match self.dir {
            SortDir::Asc => Token::Asc,
            SortDir::Desc => Token::Desc,
        });
        ts
    }
}

// =============================================================================
// LIMIT / OFFSET
// =============================================================================

/// LIMIT and OFFSET clause. Emission is a dialect hook.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LimitOffset {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl LimitOffset {
    pub fn to_tokens(&self, dialect: &dyn SqlDialect) -> TokenStream {
        dialect.emit_limit_offset(self.limit, self.offset)
    }
}

// =============================================================================
// Query
// =============================================================================

/// A SELECT query.
#[derive(Debug, Clone, Default, PartialEq)]
#[must_use = "Query has no effect until rendered with to_sql() or to_tokens()"]
pub struct Query {
    pub select: Vec<SelectExpr>,
    pub from: Option<FromSource>,
    pub joins: Vec<Join>,
    pub where_clause: Option<Expr>,
    pub group_by: Vec<Expr>,
    pub order_by: Vec<OrderByExpr>,
    pub limit_offset: Option<LimitOffset>,
}

impl Query {
    /// Create a new empty query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a SELECT list item.
    pub fn merge_select(mut self, item: SelectExpr) -> Self {
        self.select.push(item);
        self
    }

    /// Set the FROM source.
    pub fn from_source(mut self, source: FromSource) -> Self {
        self.from = Some(source);
        self
    }

    /// Add a LEFT JOIN.
    pub fn left_join(mut self, source: FromSource, on: Expr) -> Self {
        self.joins.push(Join {
            join_type: JoinType::Left,
            source,
            on,
        });
        self
    }

    /// Add a WHERE condition (ANDed with existing conditions).
    pub fn filter(mut self, condition: Expr) -> Self {
        self.where_clause = Some(match self.where_clause {
            Some(existing) => existing.and(condition),
            None => condition,
        });
        self
    }

    /// Append a GROUP BY expression.
    pub fn merge_group_by(mut self, expr: Expr) -> Self {
        self.group_by.push(expr);
        self
    }

    /// Append an ORDER BY expression.
    pub fn merge_order_by(mut self, expr: OrderByExpr) -> Self {
        self.order_by.push(expr);
        self
    }

    /// Set LIMIT.
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit_offset
            .get_or_insert_with(LimitOffset::default)
            .limit = Some(limit);
        self
    }

    /// Set OFFSET.
    pub fn offset(mut self, offset: u64) -> Self {
        self.limit_offset
            .get_or_insert_with(LimitOffset::default)
            .offset = Some(offset);
        self
    }

    /// Convert to a token stream for the given dialect.
    pub fn to_tokens(&self, dialect: &dyn SqlDialect) -> TokenStream {
        let mut ts = TokenStream::new();

        ts.push(Token::Select).space();
        if self.select.is_empty() {
            ts.append(&star().to_tokens());
        }
        for (i, item) in self.select.iter().enumerate() {
            if i > 0 {
                ts.comma().space();
            }
            ts.append(&item.to_tokens());
        }

        if let Some(from) = &self.from {
            ts.space().push(Token::From).space();
            ts.append(&from.to_tokens(dialect));
        }

        for join in &self.joins {
            ts.space();
            ts.append(&join.to_tokens(dialect));
        }

        if let Some(condition) = &self.where_clause {
            ts.space().push(Token::Where).space();
            ts.append(&condition.to_tokens());
        }

        if !self.group_by.is_empty() {
            ts.space().push(Token::GroupBy).space();
            for (i, expr) in self.group_by.iter().enumerate() {
                if i > 0 {
                    ts.comma().space();
                }
                ts.append(&expr.to_tokens());
            }
        }

        if !self.order_by.is_empty() {
            ts.space().push(Token::OrderBy).space();
            for (i, expr) in self.order_by.iter().enumerate() {
                if i > 0 {
                    ts.comma().space();
                }
                ts.append(&expr.to_tokens());
            }
        }

        if let Some(limit_offset) = &self.limit_offset {
            ts.space();
            ts.append(&limit_offset.to_tokens(dialect));
        }

        ts
    }

    /// Render to SQL text plus positional parameters.
    pub fn to_sql(&self, dialect: &dyn SqlDialect) -> Result<(String, Vec<SqlParam>), FormatError> {
        self.to_tokens(dialect).serialize(dialect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::dialect::Ansi;
    use crate::sql::expr::{count_star, ident, table_col};

    fn sql(query: &Query) -> String {
        query.to_sql(&Ansi).unwrap().0
    }

    #[test]
    fn test_simple_select() {
        let query = Query::new()
            .merge_select(SelectExpr::new(table_col("orders", "id")))
            .from_source(FromSource::Table(
                TableRef::new("orders").with_schema("public"),
            ));
        assert_eq!(
            sql(&query),
            "SELECT \"orders\".\"id\" FROM \"public\".\"orders\""
        );
    }

    #[test]
    fn test_empty_select_renders_star() {
        let query = Query::new().from_source(FromSource::Table(TableRef::new("t")));
        assert_eq!(sql(&query), "SELECT * FROM \"t\"");
    }

    #[test]
    fn test_aliased_aggregation() {
        let query = Query::new()
            .merge_select(SelectExpr::new(count_star()).with_alias("count"))
            .from_source(FromSource::Table(TableRef::new("t")));
        assert_eq!(sql(&query), "SELECT COUNT(*) AS \"count\" FROM \"t\"");
    }

    #[test]
    fn test_subquery_from_aliased_without_as() {
        let inner = Query::new()
            .merge_select(SelectExpr::new(count_star()).with_alias("count"))
            .from_source(FromSource::Table(TableRef::new("t")));
        let query = Query::new()
            .from_source(FromSource::Subquery {
                query: Box::new(inner),
                alias: "source".into(),
            })
            .limit(10);
        assert_eq!(
            sql(&query),
            "SELECT * FROM (SELECT COUNT(*) AS \"count\" FROM \"t\") \"source\" LIMIT 10"
        );
    }

    #[test]
    fn test_left_join() {
        let query = Query::new()
            .merge_select(SelectExpr::new(table_col("c", "name")))
            .from_source(FromSource::Table(TableRef::new("orders")))
            .left_join(
                FromSource::Table(TableRef::new("categories").with_alias("c")),
                table_col("orders", "category_id").eq(table_col("c", "id")),
            );
        assert_eq!(
            sql(&query),
            "SELECT \"c\".\"name\" FROM \"orders\" LEFT JOIN \"categories\" \"c\" \
             ON \"orders\".\"category_id\" = \"c\".\"id\""
        );
    }

    #[test]
    fn test_filter_merges_with_and() {
        let query = Query::new()
            .from_source(FromSource::Table(TableRef::new("t")))
            .filter(ident("a").eq(1))
            .filter(ident("b").eq(2));
        assert_eq!(
            sql(&query),
            "SELECT * FROM \"t\" WHERE (\"a\" = 1) AND (\"b\" = 2)"
        );
    }

    #[test]
    fn test_group_and_order() {
        let query = Query::new()
            .merge_select(SelectExpr::new(ident("status")))
            .from_source(FromSource::Table(TableRef::new("t")))
            .merge_group_by(ident("status"))
            .merge_order_by(OrderByExpr::desc(ident("status")));
        assert_eq!(
            sql(&query),
            "SELECT \"status\" FROM \"t\" GROUP BY \"status\" ORDER BY \"status\" DESC"
        );
    }

    #[test]
    fn test_limit_offset() {
        let query = Query::new()
            .from_source(FromSource::Table(TableRef::new("t")))
            .limit(5)
            .offset(10);
        assert_eq!(sql(&query), "SELECT * FROM \"t\" LIMIT 5 OFFSET 10");
    }
}
