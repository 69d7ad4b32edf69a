//! Compilation context.
//!
//! The two pieces of ambient state - the query at the current nesting
//! level and the nesting depth itself - travel as an explicit value
//! threaded through recursion. Nothing outlives a compilation call and
//! sibling compilations never observe each other's context.

use crate::error::{QueryError, QueryResult};
use crate::mbql::{Aggregation, Expression, InnerQuery};
use crate::metadata::MetadataStore;

/// Everything node compilation needs to resolve references: the store,
/// the inner query at the current nesting level, and the level itself.
#[derive(Debug, Clone, Copy)]
pub struct Context<'a> {
    store: &'a MetadataStore,
    query: &'a InnerQuery,
    nesting_level: usize,
}

impl<'a> Context<'a> {
    /// Top-level context (nesting level 0).
    pub fn new(store: &'a MetadataStore, query: &'a InnerQuery) -> Self {
        Self {
            store,
            query,
            nesting_level: 0,
        }
    }

    pub fn store(&self) -> &'a MetadataStore {
        self.store
    }

    /// The inner query at the current nesting level.
    pub fn query(&self) -> &'a InnerQuery {
        self.query
    }

    pub fn nesting_level(&self) -> usize {
        self.nesting_level
    }

    /// Context for a source query one level deeper.
    pub fn nested(&self, query: &'a InnerQuery) -> Self {
        Self {
            store: self.store,
            query,
            nesting_level: self.nesting_level + 1,
        }
    }

    /// Resolve a named entry of the current query's `expressions` map.
    pub fn expression(&self, name: &str) -> QueryResult<&'a Expression> {
        self.query
            .expressions
            .get(name)
            .ok_or_else(|| QueryError::UnknownExpression(name.into()))
    }

    /// Resolve an aggregation reference at the current nesting level.
    /// References never reach aggregations of enclosing levels.
    pub fn aggregation_at(&self, index: usize) -> QueryResult<&'a Aggregation> {
        self.query
            .aggregation
            .get(index)
            .ok_or(QueryError::UnknownAggregationIndex {
                index,
                level: self.nesting_level,
            })
    }
}
