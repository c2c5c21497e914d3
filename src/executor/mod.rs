use crate::database::Database;
use crate::error::Result;
use crate::query::{AlterAction, Parser, Stmt};
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryResult {
    Rows {
        columns: Vec<String>,
        rows: Vec<Vec<String>>,
        /// Conditions skipped while parsing.
        warnings: Vec<String>,
    },
    Success(String),
    Error(String),
}

impl QueryResult {
    pub fn is_error(&self) -> bool {
        matches!(self, QueryResult::Error(_))
    }
}

impl fmt::Display for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryResult::Success(msg) => write!(f, "{msg}"),
            QueryResult::Error(msg) => write!(f, "Error: {msg}"),
            QueryResult::Rows {
                columns,
                rows,
                warnings,
            } => {
                for warning in warnings {
                    writeln!(f, "Warning: {warning}")?;
                }
                let mut widths: Vec<usize> = columns.iter().map(|c| c.chars().count()).collect();
                for row in rows {
                    for (width, cell) in widths.iter_mut().zip(row) {
                        *width = (*width).max(cell.chars().count());
                    }
                }
                write_line(f, columns, &widths)?;
                let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
                write_line(f, &rule, &widths)?;
                for row in rows {
                    write_line(f, row, &widths)?;
                }
                let plural = if rows.len() == 1 { "" } else { "s" };
                write!(f, "({} row{plural})", rows.len())
            }
        }
    }
}

fn write_line(f: &mut fmt::Formatter<'_>, cells: &[String], widths: &[usize]) -> fmt::Result {
    write!(f, "|")?;
    for (cell, width) in cells.iter().zip(widths) {
        write!(f, " {cell:<width$} |")?;
    }
    writeln!(f)
}

/// Binds parsed statements to [`Database`] operations.
#[derive(Default)]
pub struct Executor {
    db: Database,
}

impl Executor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_database(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn database_mut(&mut self) -> &mut Database {
        &mut self.db
    }

    /// Runs every statement in `src`, stopping at the first failure.
    pub fn run(&mut self, src: &str) -> Vec<QueryResult> {
        let stmts = match Parser::new(src).and_then(Parser::parse) {
            Ok(stmts) => stmts,
            Err(e) => return vec![QueryResult::Error(e.to_string())],
        };
        let mut results = Vec::with_capacity(stmts.len());
        for stmt in stmts {
            let result = self
                .execute(stmt)
                .unwrap_or_else(|e| QueryResult::Error(e.to_string()));
            let failed = result.is_error();
            results.push(result);
            if failed {
                break;
            }
        }
        results
    }

    /// Runs `src` and reports the outcome of its last statement.
    pub fn execute_query(&mut self, src: &str) -> QueryResult {
        self.run(src)
            .pop()
            .unwrap_or_else(|| QueryResult::Success("Nothing to run.".to_string()))
    }

    pub fn execute(&mut self, stmt: Stmt) -> Result<QueryResult> {
        debug!(?stmt, "executing");
        let msg = match stmt {
            Stmt::Select(query) => {
                let rows = self.db.execute_select(&query)?;
                let columns = rows.columns().to_vec();
                return Ok(QueryResult::Rows {
                    columns,
                    rows: rows.collect(),
                    warnings: query.warnings.iter().map(ToString::to_string).collect(),
                });
            }
            Stmt::Create(def) => {
                let name = def.table_name.clone();
                self.db.create_table(def)?;
                format!("Table {name} created.")
            }
            Stmt::Drop { table } => {
                self.db.drop_table(&table)?;
                format!("Table {table} dropped.")
            }
            Stmt::Alter {
                table,
                action: AlterAction::AddColumn(column),
            } => {
                let name = column.name.clone();
                self.db.add_column(&table, column)?;
                format!("Column {name} added to {table}.")
            }
            Stmt::Alter {
                table,
                action: AlterAction::RemoveColumn(column),
            } => {
                self.db.remove_column(&table, &column)?;
                format!("Column {column} removed from {table}.")
            }
            Stmt::Insert { table, values } => {
                self.db.insert(&table, values.as_slice())?;
                "1 row inserted.".to_string()
            }
            Stmt::Update {
                table,
                assigns,
                filter: (column, value),
            } => {
                if self.db.update(&table, assigns.as_slice(), &column, &value)? {
                    "Rows updated.".to_string()
                } else {
                    "No rows matched.".to_string()
                }
            }
            Stmt::Delete {
                table,
                filter: (column, value),
            } => {
                let removed = self.db.delete(&table, &column, &value)?;
                format!("{removed} row(s) deleted.")
            }
        };
        Ok(QueryResult::Success(msg))
    }
}
