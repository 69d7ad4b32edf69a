//! Expression AST - the tagged tree the compiler produces.
//!
//! Every variant must be handled in `to_tokens()` - the compiler enforces
//! this. Serialization is dialect-agnostic at this level; quoting and
//! placeholder collection happen in the token serializer.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use super::token::{Token, TokenStream};

// =============================================================================
// Expression AST
// =============================================================================

/// A SQL expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Qualified identifier. Qualification is structural - the parts are
    /// quoted separately, so a dot inside any part can never be mistaken
    /// for a qualifier.
    Identifier {
        schema: Option<String>,
        table: Option<String>,
        column: String,
    },

    /// Literal values.
    Literal(Literal),

    /// Binary operation: left op right.
    BinaryOp {
        left: Box<Expr>,
        op: BinaryOperator,
        right: Box<Expr>,
    },

    /// Unary operation: op expr.
    UnaryOp { op: UnaryOperator, expr: Box<Expr> },

    /// Function call: name(args...).
    Function {
        name: String,
        args: Vec<Expr>,
        distinct: bool,
    },

    /// CASE WHEN ... THEN ... ELSE ... END.
    Case {
        when_clauses: Vec<(Expr, Expr)>,
        else_clause: Option<Box<Expr>>,
    },

    /// expr BETWEEN low AND high.
    Between {
        expr: Box<Expr>,
        low: Box<Expr>,
        high: Box<Expr>,
    },

    /// EXTRACT(part FROM expr).
    Extract { part: String, expr: Box<Expr> },

    /// Wildcard: * or table.*.
    Star { table: Option<String> },

    /// Raw SQL passed through without escaping. Only trusted, static
    /// dialect-specific fragments; never user input.
    Raw(String),
}

/// Literal values.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    String(String),
    Bool(bool),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
    Time(NaiveTime),
    Null,
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    // Comparison
    Eq,
    Ne,
    Lt,
    Gt,
    Lte,
    Gte,
    // Logical
    And,
    Or,
    // Arithmetic
    Plus,
    Minus,
    Mul,
    Div,
    // String
    Like,
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Not,
    Minus,
}

// =============================================================================
// Expression to Tokens
// =============================================================================

impl Expr {
    /// Convert this expression to a token stream.
    pub fn to_tokens(&self) -> TokenStream {
        let mut ts = TokenStream::new();

        match self {
            Expr::Identifier {
                schema,
                table,
                column,
            } => {
                if let Some(s) = schema {
                    ts.push(Token::Ident(s.clone()));
                    ts.push(Token::Dot);
                }
                if let Some(t) = table {
                    ts.push(Token::Ident(t.clone()));
                    ts.push(Token::Dot);
                }
                ts.push(Token::Ident(column.clone()));
            }

            Expr::Literal(lit) => {
                ts.push(lit.to_token());
            }

            Expr::BinaryOp { left, op, right } => {
                // Equality against a NULL literal renders as IS [NOT] NULL.
                let null_test = match (op, right.as_ref()) {
                    (BinaryOperator::Eq, Expr::Literal(Literal::Null)) => Some(Token::IsNull),
                    (BinaryOperator::Ne, Expr::Literal(Literal::Null)) => Some(Token::IsNotNull),
                    _ => None,
                };
                if let Some(test) = null_test {
                    ts.append(&operand_tokens(left));
                    ts.space().push(test);
                } else {
                    ts.append(&operand_tokens(left));
                    ts.space();
                    ts.push(binary_op_token(*op));
                    ts.space();
                    ts.append(&operand_tokens(right));
                }
            }

            Expr::UnaryOp { op, expr } => {
                ts.push(match op {
                    UnaryOperator::Not => Token::Not,
                    UnaryOperator::Minus => Token::Minus,
                });
                ts.space();
                ts.append(&operand_tokens(expr));
            }

            Expr::Function {
                name,
                args,
                distinct,
            } => {
                ts.push(Token::FunctionName(name.clone()));
                ts.lparen();
                if *distinct {
                    ts.push(Token::Distinct).space();
                }
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        ts.comma().space();
                    }
                    ts.append(&arg.to_tokens());
                }
                ts.rparen();
            }

            Expr::Case {
                when_clauses,
                else_clause,
            } => {
                ts.push(Token::Case);
                for (when, then) in when_clauses {
                    ts.space().push(Token::When).space();
                    ts.append(&when.to_tokens());
                    ts.space().push(Token::Then).space();
                    ts.append(&then.to_tokens());
                }
                if let Some(else_expr) = else_clause {
                    ts.space().push(Token::Else).space();
                    ts.append(&else_expr.to_tokens());
                }
                ts.space().push(Token::End);
            }

            Expr::Between { expr, low, high } => {
                ts.append(&operand_tokens(expr));
                ts.space().push(Token::Between).space();
                ts.append(&operand_tokens(low));
                ts.space().push(Token::And).space();
                ts.append(&operand_tokens(high));
            }

            Expr::Extract { part, expr } => {
                ts.push(Token::FunctionName("EXTRACT".into()));
                ts.lparen();
                ts.push(Token::Raw(part.to_uppercase()));
                ts.space().push(Token::From).space();
                ts.append(&expr.to_tokens());
                ts.rparen();
            }

            Expr::Star { table } => {
                if let Some(t) = table {
                    ts.push(Token::Ident(t.clone()));
                    ts.push(Token::Dot);
                }
                ts.push(Token::Star);
            }

            Expr::Raw(sql) => {
                ts.push(Token::Raw(sql.clone()));
            }
        }

        ts
    }
}

impl Literal {
    fn to_token(&self) -> Token {
        use super::token::SqlParam;
        match self {
            Literal::Int(n) => Token::LitInt(*n),
            Literal::Float(f) => Token::LitFloat(*f),
            Literal::Bool(b) => Token::LitBool(*b),
            Literal::Null => Token::LitNull,
            Literal::String(s) => Token::Param(SqlParam::Text(s.clone())),
            Literal::Date(d) => Token::Param(SqlParam::Date(*d)),
            Literal::Timestamp(ts) => Token::Param(SqlParam::Timestamp(*ts)),
            Literal::Time(t) => Token::Param(SqlParam::Time(*t)),
        }
    }
}

/// Tokens for an operand position: nested binary and unary operations
/// wrap in parentheses to preserve precedence.
fn operand_tokens(expr: &Expr) -> TokenStream {
    match expr {
        Expr::BinaryOp { .. } | Expr::UnaryOp { .. } => {
            let mut ts = TokenStream::new();
            ts.lparen();
            ts.append(&expr.to_tokens());
            ts.rparen();
            ts
        }
        _ => expr.to_tokens(),
    }
}

fn binary_op_token(op: BinaryOperator) -> Token {
    match op {
        BinaryOperator::Eq => Token::Eq,
        BinaryOperator::Ne => Token::Ne,
        BinaryOperator::Lt => Token::Lt,
        BinaryOperator::Gt => Token::Gt,
        BinaryOperator::Lte => Token::Lte,
        BinaryOperator::Gte => Token::Gte,
        BinaryOperator::And => Token::And,
        BinaryOperator::Or => Token::Or,
        BinaryOperator::Plus => Token::Plus,
        BinaryOperator::Minus => Token::Minus,
        BinaryOperator::Mul => Token::Mul,
        BinaryOperator::Div => Token::Div,
        BinaryOperator::Like => Token::Like,
    }
}

// =============================================================================
// Expression Constructors
// =============================================================================

/// Bare column reference.
pub fn ident(column: &str) -> Expr {
    Expr::Identifier {
        schema: None,
        table: None,
        column: column.into(),
    }
}

/// Qualified column reference (table.column).
pub fn table_col(table: &str, column: &str) -> Expr {
    Expr::Identifier {
        schema: None,
        table: Some(table.into()),
        column: column.into(),
    }
}

/// Integer literal.
pub fn lit_int(n: i64) -> Expr {
    Expr::Literal(Literal::Int(n))
}

/// Float literal.
pub fn lit_float(f: f64) -> Expr {
    Expr::Literal(Literal::Float(f))
}

/// String literal (parameterized on output).
pub fn lit_str(s: &str) -> Expr {
    Expr::Literal(Literal::String(s.into()))
}

/// NULL literal.
pub fn lit_null() -> Expr {
    Expr::Literal(Literal::Null)
}

/// A single-quoted string rendered inline, never parameterized.
pub fn lit_inline(s: &str) -> Expr {
    Expr::Raw(format!("'{}'", s.replace('\'', "''")))
}

/// Star (*) expression.
pub fn star() -> Expr {
    Expr::Star { table: None }
}

/// Generic function call.
pub fn func(name: &str, args: Vec<Expr>) -> Expr {
    Expr::Function {
        name: name.into(),
        args,
        distinct: false,
    }
}

/// COUNT(*).
pub fn count_star() -> Expr {
    func("COUNT", vec![star()])
}

/// EXTRACT(part FROM expr).
pub fn extract(part: &str, expr: Expr) -> Expr {
    Expr::Extract {
        part: part.into(),
        expr: Box::new(expr),
    }
}

// =============================================================================
// Expression Builder Trait
// =============================================================================

/// Extension trait for building expressions fluently.
pub trait ExprExt: Sized {
    fn into_expr(self) -> Expr;

    fn binary(self, op: BinaryOperator, other: impl Into<Expr>) -> Expr {
        Expr::BinaryOp {
            left: Box::new(self.into_expr()),
            op,
            right: Box::new(other.into()),
        }
    }

    fn eq(self, other: impl Into<Expr>) -> Expr {
        self.binary(BinaryOperator::Eq, other)
    }

    fn and(self, other: impl Into<Expr>) -> Expr {
        self.binary(BinaryOperator::And, other)
    }

    fn add(self, other: impl Into<Expr>) -> Expr {
        self.binary(BinaryOperator::Plus, other)
    }

    fn sub(self, other: impl Into<Expr>) -> Expr {
        self.binary(BinaryOperator::Minus, other)
    }

    fn mul(self, other: impl Into<Expr>) -> Expr {
        self.binary(BinaryOperator::Mul, other)
    }

    fn div(self, other: impl Into<Expr>) -> Expr {
        self.binary(BinaryOperator::Div, other)
    }

    fn like(self, pattern: impl Into<Expr>) -> Expr {
        self.binary(BinaryOperator::Like, pattern)
    }
}

impl ExprExt for Expr {
    fn into_expr(self) -> Expr {
        self
    }
}

// =============================================================================
// Conversions
// =============================================================================

impl From<i64> for Expr {
    fn from(n: i64) -> Self {
        lit_int(n)
    }
}

impl From<i32> for Expr {
    fn from(n: i32) -> Self {
        lit_int(n as i64)
    }
}

impl From<f64> for Expr {
    fn from(f: f64) -> Self {
        lit_float(f)
    }
}

impl From<&str> for Expr {
    fn from(s: &str) -> Self {
        lit_str(s)
    }
}

impl From<bool> for Expr {
    fn from(b: bool) -> Self {
        Expr::Literal(Literal::Bool(b))
    }
}

// =============================================================================
// Tests
// =============================================================================
