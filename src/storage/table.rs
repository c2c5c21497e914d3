use super::DataType;
use crate::error::{DbError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub data_type: DataType,
    /// Position of this column's cell in every row.
    pub index: usize,
}

/// Schema and row storage for one relation.
///
/// Every row holds exactly one cell per column, aligned by [`Column::index`].
/// Schema edits pad or strip rows in place so that never drifts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    name: String,
    columns: Vec<Column>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Builds an empty table from a column list. Column types may differ here;
    /// only later [`Table::add_column`] calls enforce a single shared type.
    pub fn with_columns(
        name: impl Into<String>,
        columns: impl IntoIterator<Item = (String, DataType)>,
    ) -> Result<Self> {
        let mut table = Self::new(name);
        for (column, data_type) in columns {
            table.ensure_absent(&column)?;
            table.push_column(column, data_type);
        }
        Ok(table)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|col| col.name == name)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.column(name).map(|col| col.index)
    }

    /// Like [`Table::column_index`], but a missing column is an error.
    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| DbError::column_not_found(&self.name, name))
    }

    pub fn add_column(&mut self, name: impl Into<String>, data_type: DataType) -> Result<()> {
        let name = name.into();
        self.ensure_absent(&name)?;
        if let Some(existing) = self.columns.iter().find(|col| col.data_type != data_type) {
            return Err(DbError::TypeMismatch {
                column: name,
                expected: existing.data_type,
                found: data_type,
            });
        }
        self.push_column(name, data_type);
        Ok(())
    }

    pub fn remove_column(&mut self, name: &str) -> Result<()> {
        let index = self.require_column(name)?;
        self.columns.remove(index);
        for col in &mut self.columns[index..] {
            col.index -= 1;
        }
        for row in &mut self.rows {
            row.remove(index);
        }
        Ok(())
    }

    /// Whether `value` fits the type of the column at `column_index`.
    /// An out-of-range index is never valid.
    pub fn validate_row_type(&self, column_index: usize, value: &str) -> bool {
        self.columns
            .get(column_index)
            .is_some_and(|col| col.data_type.accepts(value))
    }

    pub(crate) fn push_row(&mut self, row: Vec<String>) {
        debug_assert_eq!(row.len(), self.columns.len());
        self.rows.push(row);
    }

    /// Rebuilds the row list from the rows `keep` accepts. Returns how many
    /// rows were dropped.
    pub(crate) fn retain_rows(&mut self, mut keep: impl FnMut(&[String]) -> bool) -> usize {
        let before = self.rows.len();
        self.rows = std::mem::take(&mut self.rows)
            .into_iter()
            .filter(|row| keep(row.as_slice()))
            .collect();
        before - self.rows.len()
    }

    /// Runs `edit` on each row; returns how many calls reported a change.
    pub(crate) fn edit_rows(&mut self, mut edit: impl FnMut(&mut [String]) -> bool) -> usize {
        let mut changed = 0;
        for row in &mut self.rows {
            if edit(row.as_mut_slice()) {
                changed += 1;
            }
        }
        changed
    }

    fn ensure_absent(&self, name: &str) -> Result<()> {
        if self.column(name).is_some() {
            return Err(DbError::ColumnExists {
                table: self.name.clone(),
                column: name.to_string(),
            });
        }
        Ok(())
    }

    fn push_column(&mut self, name: String, data_type: DataType) {
        let index = self.columns.len();
        self.columns.push(Column {
            name,
            data_type,
            index,
        });
        for row in &mut self.rows {
            row.push(String::new());
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn ints(names: &[&str]) -> Table {
        Table::with_columns(
            "t",
            names.iter().map(|n| (n.to_string(), DataType::Int)),
        )
        .unwrap()
    }

    fn indices(table: &Table) -> Vec<(String, usize)> {
        table
            .columns()
            .iter()
            .map(|col| (col.name.clone(), col.index))
            .collect()
    }

    #[test]
    fn test_add_column_appends_index() {
        let mut table = ints(&["a", "b"]);
        table.add_column("c", DataType::Int).unwrap();
        assert_eq!(table.column("c").unwrap().index, 2);
    }

    #[test]
    fn test_add_column_rejects_other_type() {
        let mut table = ints(&["a"]);
        let err = table.add_column("s", DataType::String).unwrap_err();
        assert!(matches!(
            err,
            DbError::TypeMismatch {
                expected: DataType::Int,
                found: DataType::String,
                ..
            }
        ));
        assert_eq!(table.columns().len(), 1);
    }

    #[test]
    fn test_add_column_rejects_duplicate() {
        let mut table = ints(&["a"]);
        assert!(matches!(
            table.add_column("a", DataType::Int),
            Err(DbError::ColumnExists { .. })
        ));
    }

    #[test]
    fn test_first_column_of_any_type() {
        let mut table = Table::new("t");
        table.add_column("s", DataType::String).unwrap();
        assert_eq!(table.column("s").unwrap().data_type, DataType::String);
    }

    #[test]
    fn test_add_column_pads_rows() {
        let mut table = ints(&["a"]);
        table.push_row(vec!["1".into()]);
        table.push_row(vec!["2".into()]);
        table.add_column("b", DataType::Int).unwrap();
        assert_eq!(table.rows(), &[vec!["1".to_string(), String::new()], vec![
            "2".to_string(),
            String::new()
        ]]);
    }

    #[test]
    fn test_remove_column_renumbers() {
        let mut table = ints(&["a", "b", "c"]);
        table.push_row(vec!["1".into(), "2".into(), "3".into()]);
        table.remove_column("a").unwrap();
        assert_eq!(indices(&table), vec![("b".into(), 0), ("c".into(), 1)]);
        assert_eq!(table.rows()[0], vec!["2".to_string(), "3".to_string()]);

        table.add_column("d", DataType::Int).unwrap();
        assert_eq!(table.column("d").unwrap().index, 2);
    }

    #[test]
    fn test_remove_missing_column() {
        let mut table = ints(&["a"]);
        assert!(matches!(
            table.remove_column("zz"),
            Err(DbError::ColumnNotFound { .. })
        ));
    }

    #[test]
    fn test_column_index() {
        let table = ints(&["a", "b"]);
        assert_eq!(table.column_index("b"), Some(1));
        assert_eq!(table.column_index("nope"), None);
    }

    #[test]
    fn test_validate_row_type() {
        let table = ints(&["a"]);
        assert!(table.validate_row_type(0, "42"));
        assert!(!table.validate_row_type(0, "42.5"));
        assert!(!table.validate_row_type(0, "42x"));
        assert!(!table.validate_row_type(0, ""));
        assert!(!table.validate_row_type(5, "42"));
    }

    #[test]
    fn test_with_columns_rejects_duplicates() {
        let result = Table::with_columns("t", [
            ("a".to_string(), DataType::Int),
            ("a".to_string(), DataType::String),
        ]);
        assert!(matches!(result, Err(DbError::ColumnExists { .. })));
    }

    #[test]
    fn test_retain_rows_keeps_order() {
        let mut table = ints(&["a"]);
        for v in ["1", "2", "3", "2"] {
            table.push_row(vec![v.into()]);
        }
        assert_eq!(table.retain_rows(|row| row[0] != "2"), 2);
        assert_eq!(table.rows(), &[vec!["1".to_string()], vec!["3".to_string()]]);
    }
}
