//! In-memory metadata store with scoped overrides.
//!
//! Compilation is a pure, single-threaded tree rewrite, so the store uses
//! `RefCell` scope stacks instead of locks. Scoped overrides shadow table
//! records for the duration of a closure: foreign-key navigation and nested
//! source queries rebind a table to its join or `source` alias, and the
//! shadowing must unwind on every exit path.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::error::{MetadataKind, QueryError, QueryResult};

use super::{Field, FieldId, Table, TableId};

/// Read-only lookup of table and field records, plus a scoped override
/// primitive for table records.
#[derive(Debug, Default)]
pub struct MetadataStore {
    tables: HashMap<TableId, Table>,
    fields: HashMap<FieldId, Field>,
    scopes: RefCell<Vec<HashMap<TableId, Table>>>,
}

impl MetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a table record.
    pub fn add_table(&mut self, table: Table) {
        self.tables.insert(table.id, table);
    }

    /// Register a field record.
    pub fn add_field(&mut self, field: Field) {
        self.fields.insert(field.id, field);
    }

    /// Look up a table record, innermost override scope first.
    pub fn table(&self, id: TableId) -> QueryResult<Table> {
        for scope in self.scopes.borrow().iter().rev() {
            if let Some(table) = scope.get(&id) {
                return Ok(table.clone());
            }
        }
        self.tables
            .get(&id)
            .cloned()
            .ok_or(QueryError::MetadataMiss {
                kind: MetadataKind::Table,
                id: id.0,
            })
    }

    /// Look up a field record.
    pub fn field(&self, id: FieldId) -> QueryResult<Field> {
        self.fields
            .get(&id)
            .cloned()
            .ok_or(QueryError::MetadataMiss {
                kind: MetadataKind::Field,
                id: id.0,
            })
    }

    /// Run `f` with a fresh override scope. Any table stored through
    /// [`MetadataStore::store_table`] inside `f` shadows the base record
    /// only until `f` returns; the scope pops on every exit path,
    /// including unwinding.
    pub fn with_pushed_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        let _guard = ScopeGuard::push(self);
        f()
    }

    /// Shadow a table record in the innermost override scope.
    ///
    /// # Panics
    ///
    /// Panics when called outside [`MetadataStore::with_pushed_scope`].
    pub fn store_table(&self, table: Table) {
        let mut scopes = self.scopes.borrow_mut();
        let scope = scopes
            .last_mut()
            .expect("store_table requires an active override scope (see with_pushed_scope)");
        scope.insert(table.id, table);
    }
}

/// Pops the override scope it pushed when dropped.
struct ScopeGuard<'a> {
    store: &'a MetadataStore,
}

impl<'a> ScopeGuard<'a> {
    fn push(store: &'a MetadataStore) -> Self {
        store.scopes.borrow_mut().push(HashMap::new());
        Self { store }
    }
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        self.store.scopes.borrow_mut().pop();
    }
}
