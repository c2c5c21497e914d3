use crate::error::Result;
use crate::storage::Table;
use std::collections::HashSet;
use std::slice;

struct Grouping<'a> {
    columns: Vec<usize>,
    having: Vec<(usize, String)>,
    seen: HashSet<Vec<&'a str>>,
}

/// Lazily filtered and projected rows of one table, in storage order.
///
/// Borrows the table, so it has to be dropped before the database is
/// changed again. Run the select again to start over.
pub struct Rows<'a> {
    header: Vec<String>,
    projection: Vec<usize>,
    filters: Vec<(usize, String)>,
    group: Option<Grouping<'a>>,
    source: slice::Iter<'a, Vec<String>>,
}

impl<'a> Rows<'a> {
    /// `*` selects every column in schema order.
    pub(super) fn new(
        table: &'a Table,
        columns: &[impl AsRef<str>],
        filters: Vec<(usize, String)>,
    ) -> Result<Self> {
        let mut header = Vec::new();
        let mut projection = Vec::new();
        for column in columns {
            let column: &str = column.as_ref();
            if column == "*" {
                for col in table.columns() {
                    header.push(col.name.clone());
                    projection.push(col.index);
                }
            } else {
                projection.push(table.require_column(column)?);
                header.push(column.to_string());
            }
        }
        Ok(Rows {
            header,
            projection,
            filters,
            group: None,
            source: table.rows().iter(),
        })
    }

    /// Keeps the first row of each distinct `columns` key, then applies the
    /// `having` filters to that row.
    pub(super) fn grouped(mut self, columns: Vec<usize>, having: Vec<(usize, String)>) -> Self {
        self.group = Some(Grouping {
            columns,
            having,
            seen: HashSet::new(),
        });
        self
    }

    /// Names of the projected columns.
    pub fn columns(&self) -> &[String] {
        &self.header
    }
}

fn matches(filters: &[(usize, String)], row: &[String]) -> bool {
    filters.iter().all(|(index, value)| row[*index] == *value)
}

impl Iterator for Rows<'_> {
    type Item = Vec<String>;

    fn next(&mut self) -> Option<Self::Item> {
        for row in self.source.by_ref() {
            if !matches(&self.filters, row) {
                continue;
            }
            if let Some(group) = &mut self.group {
                let key = group.columns.iter().map(|&i| row[i].as_str()).collect();
                if !group.seen.insert(key) || !matches(&group.having, row) {
                    continue;
                }
            }
            return Some(self.projection.iter().map(|&i| row[i].clone()).collect());
        }
        None
    }
}
