//! Text dump format:
//!
//! ```text
//! Table: users
//! id,name,
//! 1,Ann,
//! 2,Bob,
//!
//! ```
//!
//! Column types are not written; a reloaded column is always STRING.

use super::{DataType, Table};
use crate::error::{DbError, Result};
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncWriteExt;

const HEADER: &str = "Table: ";

pub fn encode<'a>(tables: impl IntoIterator<Item = &'a Table>) -> String {
    let mut out = String::new();
    for table in tables {
        out.push_str(HEADER);
        out.push_str(table.name());
        out.push('\n');
        push_cells(&mut out, table.columns().iter().map(|col| col.name.as_str()));
        for row in table.rows() {
            push_cells(&mut out, row.iter().map(String::as_str));
        }
        out.push('\n');
    }
    out
}

fn push_cells<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>) {
    for cell in cells {
        out.push_str(cell);
        out.push(',');
    }
    out.push('\n');
}

enum Block {
    Idle,
    Header(String),
    Rows(Table),
}

pub fn decode(text: &str) -> Result<Vec<Table>> {
    let mut tables = Vec::new();
    let mut block = Block::Idle;
    for (n, line) in text.lines().enumerate() {
        let line_no = n + 1;
        block = match block {
            Block::Idle if line.is_empty() => Block::Idle,
            Block::Idle => match line.strip_prefix(HEADER) {
                Some(name) => Block::Header(name.to_string()),
                None => return Err(malformed(line_no, "expected 'Table: <name>' header")),
            },
            Block::Header(name) => {
                let columns = split_cells(line, line_no)?
                    .into_iter()
                    .map(|col| (col, DataType::String));
                let table = Table::with_columns(name, columns).map_err(|err| match err {
                    DbError::ColumnExists { column, .. } => {
                        malformed(line_no, &format!("duplicate column '{column}'"))
                    }
                    other => other,
                })?;
                Block::Rows(table)
            }
            Block::Rows(table) if line.is_empty() => {
                tables.push(table);
                Block::Idle
            }
            Block::Rows(mut table) => {
                let row = split_cells(line, line_no)?;
                if row.len() != table.columns().len() {
                    return Err(malformed(
                        line_no,
                        &format!(
                            "row has {} cells, table '{}' has {} columns",
                            row.len(),
                            table.name(),
                            table.columns().len()
                        ),
                    ));
                }
                table.push_row(row);
                Block::Rows(table)
            }
        };
    }
    match block {
        Block::Idle => {}
        Block::Header(name) => {
            return Err(malformed(
                text.lines().count(),
                &format!("table '{name}' has no column line"),
            ));
        }
        // last block without the blank separator
        Block::Rows(table) => tables.push(table),
    }
    Ok(tables)
}

fn split_cells(line: &str, line_no: usize) -> Result<Vec<String>> {
    if line.is_empty() {
        return Ok(Vec::new());
    }
    let body = line
        .strip_suffix(',')
        .ok_or_else(|| malformed(line_no, "missing trailing comma"))?;
    Ok(body.split(',').map(str::to_string).collect())
}

fn malformed(line: usize, reason: &str) -> DbError {
    DbError::MalformedFile {
        line,
        reason: reason.to_string(),
    }
}

pub async fn write(path: impl AsRef<Path>, contents: &str) -> Result<()> {
    let mut file = fs::File::create(path).await?;
    file.write_all(contents.as_bytes()).await?;
    file.flush().await?;
    Ok(())
}

pub async fn read(path: impl AsRef<Path>) -> Result<String> {
    Ok(fs::read_to_string(path).await?)
}

#[cfg(test)]
mod test {
    use super::*;

    fn users() -> Table {
        let mut table = Table::with_columns("users", [
            ("id".to_string(), DataType::Int),
            ("name".to_string(), DataType::String),
        ])
        .unwrap();
        table.push_row(vec!["1".into(), "Ann".into()]);
        table.push_row(vec!["2".into(), "Bob".into()]);
        table
    }

    #[test]
    fn test_encode_canonical_shape() {
        let text = encode([&users(), &Table::new("empty")]);
        assert_eq!(
            text,
            "Table: users\nid,name,\n1,Ann,\n2,Bob,\n\nTable: empty\n\n\n"
        );
    }

    #[test]
    fn test_decode_restores_names_and_values() {
        let tables = decode(&encode([&users()])).unwrap();
        assert_eq!(tables.len(), 1);
        let table = &tables[0];
        assert_eq!(table.name(), "users");
        let names: Vec<_> = table.columns().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["id", "name"]);
        assert!(table.columns().iter().all(|c| c.data_type == DataType::String));
        assert_eq!(table.rows(), users().rows());
    }

    #[test]
    fn test_decode_keeps_empty_cells() {
        let tables = decode("Table: t\na,b,\n,x,\n\n").unwrap();
        assert_eq!(tables[0].rows()[0], vec![String::new(), "x".to_string()]);
    }

    #[test]
    fn test_decode_without_final_blank_line() {
        let tables = decode("Table: a\nx,\n1,\n\nTable: b\ny,\n2,").unwrap();
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[1].rows()[0], vec!["2".to_string()]);
    }

    #[test]
    fn test_decode_rejects_short_row() {
        let err = decode("Table: t\na,b,\n1,\n").unwrap_err();
        assert!(matches!(err, DbError::MalformedFile { line: 3, .. }));
    }

    #[test]
    fn test_decode_rejects_missing_header() {
        let err = decode("a,b,\n").unwrap_err();
        assert!(matches!(err, DbError::MalformedFile { line: 1, .. }));
    }

    #[test]
    fn test_decode_rejects_missing_trailing_comma() {
        let err = decode("Table: t\na,b\n").unwrap_err();
        assert!(matches!(err, DbError::MalformedFile { line: 2, .. }));
    }

    #[tokio::test]
    async fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.txt");
        write(&path, "Table: t\n\n\n").await.unwrap();
        assert_eq!(read(&path).await.unwrap(), "Table: t\n\n\n");
    }

    #[tokio::test]
    async fn test_read_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read(dir.path().join("absent.txt")).await.unwrap_err();
        assert!(matches!(err, DbError::Io(_)));
    }
}
