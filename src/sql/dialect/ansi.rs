//! The reference dialect: pure root behavior, ANSI quoting.
//!
//! Exists so callers and tests can compile against the trait defaults
//! without picking a concrete database. Real targets override date
//! bucketing at minimum - the root `date` is the identity rewrite.

use super::SqlDialect;

/// Reference dialect with every root default.
#[derive(Debug, Clone, Copy)]
pub struct Ansi;

impl SqlDialect for Ansi {
    fn name(&self) -> &'static str {
        "ansi"
    }
}
