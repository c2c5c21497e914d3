mod rows;

pub use rows::Rows;

use crate::error::{DbError, Result};
use crate::query::parser::parse_conditions;
use crate::query::{ColumnDefinition, Condition, Operator, Query, TableDefinition};
use crate::storage::{DataType, Table, file};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info, warn};

/// Owns every table, keyed by name.
///
/// Nothing outside hands out mutable access to row storage; all changes go
/// through the operations below, which validate fully before mutating.
#[derive(Debug, Default)]
pub struct Database {
    tables: BTreeMap<String, Table>,
}

impl Database {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    fn get(&self, name: &str) -> Result<&Table> {
        self.tables
            .get(name)
            .ok_or_else(|| DbError::TableNotFound(name.to_string()))
    }

    fn get_mut(&mut self, name: &str) -> Result<&mut Table> {
        self.tables
            .get_mut(name)
            .ok_or_else(|| DbError::TableNotFound(name.to_string()))
    }

    /// Accepts a full [`TableDefinition`] or just a table name.
    pub fn create_table(&mut self, def: impl Into<TableDefinition>) -> Result<()> {
        let def = def.into();
        if self.tables.contains_key(&def.table_name) {
            return Err(DbError::TableExists(def.table_name));
        }
        let table = Table::with_columns(
            def.table_name.clone(),
            def.columns.into_iter().map(|col| (col.name, col.data_type)),
        )?;
        debug!(table = %def.table_name, columns = table.columns().len(), "created table");
        self.tables.insert(def.table_name, table);
        Ok(())
    }

    pub fn drop_table(&mut self, name: &str) -> Result<()> {
        self.tables
            .remove(name)
            .ok_or_else(|| DbError::TableNotFound(name.to_string()))?;
        debug!(table = name, "dropped table");
        Ok(())
    }

    pub fn add_column(&mut self, table: &str, column: ColumnDefinition) -> Result<()> {
        self.add_column_default(table, &column.name, column.data_type)
    }

    /// Adds a column and gives every existing row an empty cell for it.
    pub fn add_column_default(
        &mut self,
        table: &str,
        column: &str,
        data_type: DataType,
    ) -> Result<()> {
        self.get_mut(table)?.add_column(column, data_type)?;
        debug!(table, column, %data_type, "added column");
        Ok(())
    }

    pub fn remove_column(&mut self, table: &str, column: &str) -> Result<()> {
        self.get_mut(table)?.remove_column(column)?;
        debug!(table, column, "removed column");
        Ok(())
    }

    /// Appends one row. Columns left out get an empty cell. Every supplied
    /// column and value is checked before the row is built.
    pub fn insert(
        &mut self,
        table: &str,
        values: &[(impl AsRef<str>, impl AsRef<str>)],
    ) -> Result<()> {
        let target = self.get_mut(table)?;
        let mut row = vec![String::new(); target.columns().len()];
        for (column, value) in values {
            let value: &str = value.as_ref();
            let index = checked_cell(target, column.as_ref(), value)?;
            row[index] = value.to_string();
        }
        target.push_row(row);
        debug!(table, rows = target.row_count(), "inserted row");
        Ok(())
    }

    /// Sets `updates` on every row whose `condition_column` cell equals
    /// `condition_value`. Returns whether any row matched.
    pub fn update(
        &mut self,
        table: &str,
        updates: &[(impl AsRef<str>, impl AsRef<str>)],
        condition_column: &str,
        condition_value: &str,
    ) -> Result<bool> {
        let target = self.get_mut(table)?;
        let condition = target.require_column(condition_column)?;
        let updates = updates
            .iter()
            .map(|(column, value)| {
                let value: &str = value.as_ref();
                let index = checked_cell(target, column.as_ref(), value)?;
                Ok((index, value.to_string()))
            })
            .collect::<Result<Vec<_>>>()?;

        let changed = target.edit_rows(|row| {
            if row[condition] != condition_value {
                return false;
            }
            for (index, value) in &updates {
                row[*index] = value.clone();
            }
            true
        });
        debug!(table, changed, "updated rows");
        Ok(changed > 0)
    }

    /// Removes every row whose `condition_column` cell equals
    /// `condition_value`, keeping the others in order.
    pub fn delete(
        &mut self,
        table: &str,
        condition_column: &str,
        condition_value: &str,
    ) -> Result<usize> {
        let target = self.get_mut(table)?;
        let condition = target.require_column(condition_column)?;
        let removed = target.retain_rows(|row| row[condition] != condition_value);
        debug!(table, removed, "deleted rows");
        Ok(removed)
    }

    /// Rows of `table` projected onto `columns`, filtered by a WHERE body such
    /// as `"id = 1 and name = Ann"`. An empty expression keeps every row.
    pub fn select(
        &self,
        table: &str,
        columns: &[impl AsRef<str>],
        condition_expr: &str,
    ) -> Result<Rows<'_>> {
        let (conditions, _skipped) = parse_conditions(condition_expr)?;
        self.select_where(table, columns, &conditions)
    }

    pub fn select_where(
        &self,
        table: &str,
        columns: &[impl AsRef<str>],
        conditions: &[Condition],
    ) -> Result<Rows<'_>> {
        let source = self.get(table)?;
        Rows::new(source, columns, equality_filters(source, conditions)?)
    }

    /// Runs a parsed SELECT, including GROUP BY and HAVING.
    pub fn execute_select(&self, query: &Query) -> Result<Rows<'_>> {
        let source = self.get(&query.table_name)?;
        let rows = Rows::new(
            source,
            query.columns.as_slice(),
            equality_filters(source, &query.conditions)?,
        )?;
        if query.group_by_columns.is_empty() {
            if !query.having_conditions.is_empty() {
                warn!(table = %query.table_name, "HAVING without GROUP BY is ignored");
            }
            return Ok(rows);
        }
        let group = query
            .group_by_columns
            .iter()
            .map(|col| source.require_column(col))
            .collect::<Result<Vec<_>>>()?;
        Ok(rows.grouped(group, equality_filters(source, &query.having_conditions)?))
    }

    pub async fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        file::write(path, &file::encode(self.tables.values())).await?;
        info!(path = %path.display(), tables = self.tables.len(), "saved database");
        Ok(())
    }

    /// Loads every table in the file, replacing tables of the same name.
    /// The file is parsed in full first, so a bad file changes nothing.
    pub async fn load_from_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let tables = file::decode(&file::read(path).await?)?;
        info!(path = %path.display(), tables = tables.len(), "loaded database");
        for table in tables {
            if self.tables.contains_key(table.name()) {
                warn!(table = table.name(), "replacing existing table");
            }
            self.tables.insert(table.name().to_string(), table);
        }
        Ok(())
    }
}

/// Resolves `column` and checks `value` against its type.
fn checked_cell(table: &Table, column: &str, value: &str) -> Result<usize> {
    let index = table.require_column(column)?;
    if !table.validate_row_type(index, value) {
        let expected = table.columns()[index].data_type;
        return Err(DbError::InvalidValueType {
            column: column.to_string(),
            expected,
            value: value.to_string(),
        });
    }
    Ok(index)
}

/// Equality conditions as `(column index, value)`. Other operators are not
/// evaluated and AND/OR are not honoured: the result is a plain conjunction.
fn equality_filters(table: &Table, conditions: &[Condition]) -> Result<Vec<(usize, String)>> {
    let mut filters = Vec::with_capacity(conditions.len());
    for cond in conditions {
        let index = table.require_column(&cond.column)?;
        if cond.op != Operator::Eq {
            warn!(column = %cond.column, op = %cond.op, "operator not evaluated, condition ignored");
            continue;
        }
        filters.push((index, cond.value.clone()));
    }
    Ok(filters)
}
