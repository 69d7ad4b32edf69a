//! SQL Tokens - the atomic units of SQL output.
//!
//! Tokens are dialect-agnostic representations that serialize to
//! dialect-specific strings. String and date/time literals serialize as
//! positional `?` placeholders and are collected into a parameter vector;
//! numbers, booleans and NULL are rendered inline.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;

use super::dialect::SqlDialect;

/// Sentinel that stands in for literal dots inside user-supplied names
/// while identifiers travel through the AST. Restored by the serializer.
const DOT_SENTINEL: char = '\u{1}';

/// Replace literal dots in a user-supplied name with the sentinel.
pub(crate) fn escape_dots(name: &str) -> String {
    name.replace('.', "\u{1}")
}

fn unescape_dots(sql: &str) -> String {
    sql.replace(DOT_SENTINEL, ".")
}

/// A positional query parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Text(String),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
    Time(NaiveTime),
}

/// Errors raised while serializing tokens to SQL text.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormatError {
    #[error("cannot render non-finite float {0} as a SQL literal")]
    NonFiniteFloat(f64),
}

/// SQL Token - every element a rendered statement can contain.
///
/// Adding a new variant causes compile errors everywhere it needs to be
/// handled (exhaustive matching).
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // === Keywords ===
    Select,
    From,
    Where,
    And,
    Or,
    Not,
    As,
    On,
    Join,
    Left,
    Inner,
    GroupBy,
    OrderBy,
    Asc,
    Desc,
    Limit,
    Offset,
    Rows,
    Fetch,
    Next,
    Only,
    First,
    Case,
    When,
    Then,
    Else,
    End,
    Between,
    Like,
    IsNull,
    IsNotNull,
    Distinct,

    // === Punctuation ===
    Comma,
    Dot,
    Star,
    LParen,
    RParen,

    // === Operators ===
    Eq,
    Ne,
    Lt,
    Gt,
    Lte,
    Gte,
    Plus,
    Minus,
    Mul,
    Div,

    // === Whitespace ===
    Space,

    // === Dynamic Content ===
    /// Identifier (table, column, alias), quoted per dialect.
    Ident(String),
    /// Integer literal, rendered inline.
    LitInt(i64),
    /// Float literal, rendered inline.
    LitFloat(f64),
    /// Boolean literal, rendered inline.
    LitBool(bool),
    /// NULL literal.
    LitNull,
    /// A single-quoted string rendered inline, never parameterized.
    /// For trusted static fragments such as `DATE_TRUNC('month', …)`.
    LitInlineString(String),
    /// A value rendered as a `?` placeholder and collected positionally.
    Param(SqlParam),

    /// Function name, uppercased on output.
    FunctionName(String),

    /// Raw SQL passed through without escaping. Never carries user input;
    /// only trusted, static dialect-specific fragments.
    Raw(String),
}

impl Token {
    /// Serialize this token, appending any placeholder value to `params`.
    pub fn serialize(
        &self,
        dialect: &dyn SqlDialect,
        params: &mut Vec<SqlParam>,
    ) -> Result<String, FormatError> {
        Ok(match self {
            Token::Select => "SELECT".into(),
            Token::From => "FROM".into(),
            Token::Where => "WHERE".into(),
            Token::And => "AND".into(),
            Token::Or => "OR".into(),
            Token::Not => "NOT".into(),
            Token::As => "AS".into(),
            Token::On => "ON".into(),
            Token::Join => "JOIN".into(),
            Token::Left => "LEFT".into(),
            Token::Inner => "INNER".into(),
            Token::GroupBy => "GROUP BY".into(),
            Token::OrderBy => "ORDER BY".into(),
            Token::Asc => "ASC".into(),
            Token::Desc => "DESC".into(),
            Token::Limit => "LIMIT".into(),
            Token::Offset => "OFFSET".into(),
            Token::Rows => "ROWS".into(),
            Token::Fetch => "FETCH".into(),
            Token::Next => "NEXT".into(),
            Token::Only => "ONLY".into(),
            Token::First => "FIRST".into(),
            Token::Case => "CASE".into(),
            Token::When => "WHEN".into(),
            Token::Then => "THEN".into(),
            Token::Else => "ELSE".into(),
            Token::End => "END".into(),
            Token::Between => "BETWEEN".into(),
            Token::Like => "LIKE".into(),
            Token::IsNull => "IS NULL".into(),
            Token::IsNotNull => "IS NOT NULL".into(),
            Token::Distinct => "DISTINCT".into(),

            Token::Comma => ",".into(),
            Token::Dot => ".".into(),
            Token::Star => "*".into(),
            Token::LParen => "(".into(),
            Token::RParen => ")".into(),

            Token::Eq => "=".into(),
            Token::Ne => "<>".into(),
            Token::Lt => "<".into(),
            Token::Gt => ">".into(),
            Token::Lte => "<=".into(),
            Token::Gte => ">=".into(),
            Token::Plus => "+".into(),
            Token::Minus => "-".into(),
            Token::Mul => "*".into(),
            Token::Div => "/".into(),

            Token::Space => " ".into(),

            Token::Ident(name) => dialect.quote_style().quote(name),
            Token::LitInt(n) => n.to_string(),
            Token::LitFloat(f) => {
                if !f.is_finite() {
                    return Err(FormatError::NonFiniteFloat(*f));
                }
                let mut buffer = ryu::Buffer::new();
                buffer.format(*f).to_string()
            }
            Token::LitBool(b) => {
                if *b {
                    "TRUE".into()
                } else {
                    "FALSE".into()
                }
            }
            Token::LitNull => "NULL".into(),
            Token::LitInlineString(s) => format!("'{}'", s.replace('\'', "''")),
            Token::Param(value) => {
                params.push(value.clone());
                "?".into()
            }

            Token::FunctionName(name) => name.to_uppercase(),

            Token::Raw(s) => s.clone(),
        })
    }
}

/// A stream of tokens that can be serialized to SQL.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenStream {
    tokens: Vec<Token>,
}

impl TokenStream {
    /// Create an empty token stream.
    pub fn new() -> Self {
        Self { tokens: vec![] }
    }

    /// Push a single token.
    pub fn push(&mut self, token: Token) -> &mut Self {
        self.tokens.push(token);
        self
    }

    /// Append another token stream.
    pub fn append(&mut self, other: &TokenStream) -> &mut Self {
        self.tokens.extend(other.tokens.iter().cloned());
        self
    }

    /// Serialize to SQL text plus positional parameters.
    ///
    /// The final pass restores dot sentinels to literal dots, so dots in
    /// user-supplied names survive quoting without ever colliding with
    /// qualifier dots.
    pub fn serialize(
        &self,
        dialect: &dyn SqlDialect,
    ) -> Result<(String, Vec<SqlParam>), FormatError> {
        let mut sql = String::new();
        let mut params = Vec::new();
        for token in &self.tokens {
            sql.push_str(&token.serialize(dialect, &mut params)?);
        }
        Ok((unescape_dots(&sql), params))
    }

    // Convenience methods for common tokens
    pub fn space(&mut self) -> &mut Self {
        self.push(Token::Space)
    }
    pub fn comma(&mut self) -> &mut Self {
        self.push(Token::Comma)
    }
    pub fn lparen(&mut self) -> &mut Self {
        self.push(Token::LParen)
    }
    pub fn rparen(&mut self) -> &mut Self {
        self.push(Token::RParen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::dialect::{Ansi, MySql, SqlServer, H2};

    fn serialize(ts: &TokenStream) -> (String, Vec<SqlParam>) {
        ts.serialize(&Ansi).unwrap()
    }

    #[test]
    fn test_keyword_serialize() {
        let mut params = vec![];
        assert_eq!(Token::Select.serialize(&Ansi, &mut params).unwrap(), "SELECT");
        assert_eq!(Token::GroupBy.serialize(&Ansi, &mut params).unwrap(), "GROUP BY");
        assert!(params.is_empty());
    }

    #[test]
    fn test_ident_quoting_per_dialect() {
        let tok = Token::Ident("users".into());
        let mut params = vec![];
        assert_eq!(tok.serialize(&Ansi, &mut params).unwrap(), "\"users\"");
        assert_eq!(tok.serialize(&MySql, &mut params).unwrap(), "`users`");
        assert_eq!(tok.serialize(&SqlServer, &mut params).unwrap(), "[users]");
        assert_eq!(tok.serialize(&H2, &mut params).unwrap(), "\"USERS\"");
    }

    #[test]
    fn test_params_collected_in_order() {
        let mut ts = TokenStream::new();
        ts.push(Token::Param(SqlParam::Text("a".into())))
            .space()
            .push(Token::LitInt(1))
            .space()
            .push(Token::Param(SqlParam::Text("b".into())));
        let (sql, params) = serialize(&ts);
        assert_eq!(sql, "? 1 ?");
        assert_eq!(
            params,
            vec![SqlParam::Text("a".into()), SqlParam::Text("b".into())]
        );
    }

    #[test]
    fn test_float_serialize() {
        let mut params = vec![];
        assert_eq!(Token::LitFloat(2.0).serialize(&Ansi, &mut params).unwrap(), "2.0");
        assert_eq!(Token::LitFloat(-42.5).serialize(&Ansi, &mut params).unwrap(), "-42.5");
    }

    #[test]
    fn test_non_finite_float_is_an_error() {
        let mut params = vec![];
        assert!(matches!(
            Token::LitFloat(f64::NAN).serialize(&Ansi, &mut params),
            Err(FormatError::NonFiniteFloat(_))
        ));
        assert!(matches!(
            Token::LitFloat(f64::INFINITY).serialize(&Ansi, &mut params),
            Err(FormatError::NonFiniteFloat(_))
        ));
    }

    #[test]
    fn test_inline_string_escaping() {
        let mut params = vec![];
        assert_eq!(
            Token::LitInlineString("it's".into())
                .serialize(&Ansi, &mut params)
                .unwrap(),
            "'it''s'"
        );
        assert!(params.is_empty());
    }

    #[test]
    fn test_dot_sentinel_restored() {
        let mut ts = TokenStream::new();
        ts.push(Token::Ident(escape_dots("weird.name")));
        let (sql, _) = serialize(&ts);
        assert_eq!(sql, "\"weird.name\"");
    }
}
