use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::IdGenerator;
use crate::types::ColumnType;

/// Index of a table inside a [`TableGraph`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct TableId(pub usize);

/// Foreign key target of a column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForeignKeyRef {
    pub table: String,
    pub column: String,
    /// Model class owning the referenced table.
    pub class: String,
}

/// A column of a generated table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    pub name: String,
    /// Model attribute the column was derived from.
    pub attribute: String,
    pub ty: ColumnType,
    pub nullable: bool,
    pub unique: bool,
    pub primary_key: bool,
    pub references: Option<ForeignKeyRef>,
}

/// Primary key preserving column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrimaryKey {
    pub columns: Vec<String>,
    /// Key generation strategy, set for single-column keys only.
    pub generator: Option<IdGenerator>,
}

impl PrimaryKey {
    pub fn is_composite(&self) -> bool {
        self.columns.len() > 1
    }
}

/// A generated table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Table {
    pub name: String,
    /// Model class the table was built from.
    pub class: String,
    pub columns: Vec<Column>,
    pub primary_key: Option<PrimaryKey>,
}

impl Table {
    pub fn new(name: impl Into<String>, class: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            class: class.into(),
            columns: Vec::new(),
            primary_key: None,
        }
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    /// Column derived from the given model attribute.
    pub fn column_for_attribute(&self, attribute: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|column| column.attribute == attribute)
    }

    /// Columns carrying a foreign key reference, in column order.
    pub fn foreign_keys(&self) -> impl Iterator<Item = &Column> {
        self.columns
            .iter()
            .filter(|column| column.references.is_some())
    }

    /// First key column; composite keys are referenced through it.
    pub fn first_key_column(&self) -> Option<&Column> {
        let key = self.primary_key.as_ref()?;
        let name = key.columns.first()?;
        self.column(name)
    }
}

/// Construction state of a table slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TableState {
    /// Registered as a placeholder; dependencies are still being resolved.
    Building,
    Built,
}

#[derive(Debug, Clone, Serialize)]
struct TableSlot {
    table: Table,
    state: TableState,
}

/// Tables keyed by canonical name.
///
/// Serves as the memoization cache while the schema builder runs and as the
/// frozen input of both emitters afterwards.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TableGraph {
    slots: Vec<TableSlot>,
    by_name: BTreeMap<String, TableId>,
    by_class: BTreeMap<String, TableId>,
    order: Vec<TableId>,
}

impl TableGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn table(&self, id: TableId) -> &Table {
        &self.slots[id.0].table
    }

    pub fn state(&self, id: TableId) -> TableState {
        self.slots[id.0].state
    }

    pub fn lookup(&self, name: &str) -> Option<TableId> {
        self.by_name.get(name).copied()
    }

    pub fn lookup_class(&self, class: &str) -> Option<TableId> {
        self.by_class.get(class).copied()
    }

    pub fn table_by_name(&self, name: &str) -> Option<&Table> {
        self.lookup(name).map(|id| self.table(id))
    }

    pub fn table_for_class(&self, class: &str) -> Option<&Table> {
        self.lookup_class(class).map(|id| self.table(id))
    }

    /// Tables in finalization order; every table follows the tables it
    /// depends on, except where an association cycle makes that impossible.
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.order.iter().map(|id| self.table(*id))
    }

    /// Position of a table in finalization order.
    pub fn position(&self, name: &str) -> Option<usize> {
        let id = self.lookup(name)?;
        self.order.iter().position(|candidate| *candidate == id)
    }

    /// Register a placeholder for a table about to be built.
    ///
    /// Callers must check [`TableGraph::lookup`] first; the name and class
    /// must both be unregistered.
    pub(crate) fn register(&mut self, table: Table) -> TableId {
        let id = TableId(self.slots.len());
        self.by_name.insert(table.name.clone(), id);
        self.by_class.insert(table.class.clone(), id);
        self.slots.push(TableSlot {
            table,
            state: TableState::Building,
        });
        id
    }

    pub(crate) fn table_mut(&mut self, id: TableId) -> &mut Table {
        &mut self.slots[id.0].table
    }

    pub(crate) fn finalize(&mut self, id: TableId) {
        self.slots[id.0].state = TableState::Built;
        self.order.push(id);
    }
}
