use super::error::{QueryErr, Result};
use super::lexer::{Lexer, Operator, Token};
use crate::storage::DataType;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    Create(TableDefinition),
    Drop {
        table: String,
    },
    Alter {
        table: String,
        action: AlterAction,
    },
    Insert {
        table: String,
        values: Vec<(String, String)>,
    },
    Select(Query),
    Update {
        table: String,
        assigns: Vec<(String, String)>,
        filter: (String, String),
    },
    Delete {
        table: String,
        filter: (String, String),
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlterAction {
    AddColumn(ColumnDefinition),
    RemoveColumn(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDefinition {
    pub name: String,
    pub data_type: DataType,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableDefinition {
    pub table_name: String,
    pub columns: Vec<ColumnDefinition>,
}

/// A bare name defines a table with no columns yet.
impl From<&str> for TableDefinition {
    fn from(name: &str) -> Self {
        TableDefinition {
            table_name: name.to_string(),
            columns: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Logical {
    And,
    Or,
}

/// One `column operator value` triple from a WHERE or HAVING clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub column: String,
    pub op: Operator,
    pub value: String,
    /// How this condition joins the one before it.
    pub logical: Option<Logical>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub table_name: String,
    pub columns: Vec<String>,
    pub conditions: Vec<Condition>,
    pub having_conditions: Vec<Condition>,
    pub group_by_columns: Vec<String>,
    /// Condition triples skipped during parsing.
    pub warnings: Vec<QueryErr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Clause {
    Columns,
    From,
    Where,
    GroupBy,
    Having,
}

impl Clause {
    fn expects(self) -> &'static str {
        match self {
            Clause::Columns => "column name",
            Clause::From => "table name",
            Clause::Where | Clause::Having => "condition",
            Clause::GroupBy => "group column",
        }
    }
}

/// `==` is accepted as a spelling of `=`.
pub fn is_valid_operator(op: &str) -> bool {
    Operator::from_symbol(op).is_some()
}

pub fn parse_select_command(src: &str) -> Result<Query> {
    let mut parser = Parser::new(src)?;
    let query = parser.parse_select()?;
    parser.expect_end()?;
    Ok(query)
}

pub fn parse_create_table_command(src: &str) -> Result<TableDefinition> {
    let mut parser = Parser::new(src)?;
    let def = parser.parse_create()?;
    parser.expect_end()?;
    Ok(def)
}

/// Parses the body of a WHERE clause, without the keyword.
/// Returns the conditions plus any triples that were skipped.
pub fn parse_conditions(src: &str) -> Result<(Vec<Condition>, Vec<QueryErr>)> {
    let mut parser = Parser::new(src)?;
    let mut query = Query::default();
    parser.parse_clauses(Clause::Where, &mut query, false)?;
    Ok((query.conditions, query.warnings))
}

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(src: &str) -> Result<Self> {
        Ok(Parser {
            tokens: Lexer::new(src).tokenize()?,
            pos: 0,
        })
    }

    /// Parses every `;`-separated statement in the source.
    pub fn parse(mut self) -> Result<Vec<Stmt>> {
        let mut stmts = Vec::new();
        loop {
            while self.peek() == Some(&Token::Semicolon) {
                self.pos += 1;
            }
            if self.peek().is_none() {
                return Ok(stmts);
            }
            stmts.push(self.parse_statement()?);
            match self.advance() {
                None | Some(Token::Semicolon) => {}
                Some(other) => return Err(QueryErr::unexpected("';'", other)),
            }
        }
    }

    fn parse_statement(&mut self) -> Result<Stmt> {
        let token = self.peek().cloned().ok_or(QueryErr::UnexpectedEof)?;
        Ok(match token {
            Token::Select => Stmt::Select(self.parse_select()?),
            Token::Create => Stmt::Create(self.parse_create()?),
            Token::Drop => {
                self.pos += 1;
                Stmt::Drop {
                    table: self.expect_ident("table name")?,
                }
            }
            Token::Alter => self.parse_alter()?,
            Token::Insert => self.parse_insert()?,
            Token::Update => self.parse_update()?,
            Token::Delete => self.parse_delete()?,
            other => return Err(QueryErr::unexpected("statement keyword", other)),
        })
    }

    fn parse_select(&mut self) -> Result<Query> {
        self.expect(Token::Select)?;
        let mut query = Query::default();
        self.parse_clauses(Clause::Columns, &mut query, true)?;
        if query.columns.is_empty() {
            return Err(QueryErr::unexpected("column name", "FROM"));
        }
        if query.table_name.is_empty() {
            return Err(QueryErr::unexpected("FROM <table>", "end of statement"));
        }
        Ok(query)
    }

    /// Feeds tokens into `query` until the statement ends. The current clause
    /// decides which accumulator a token goes to.
    fn parse_clauses(&mut self, mut clause: Clause, query: &mut Query, switch: bool) -> Result<()> {
        let mut logical = None;
        while let Some(token) = self.peek().cloned() {
            if token == Token::Semicolon {
                break;
            }
            self.pos += 1;
            match (clause, token) {
                (_, Token::From) if switch => clause = Clause::From,
                (_, Token::Where) if switch => clause = Clause::Where,
                (_, Token::Group) if switch => {
                    self.expect(Token::By)?;
                    clause = Clause::GroupBy;
                }
                (_, Token::Having) if switch => clause = Clause::Having,
                (Clause::Columns | Clause::GroupBy, Token::Comma) => {}
                (Clause::Columns, Token::Word(col) | Token::Text(col)) => query.columns.push(col),
                (Clause::GroupBy, Token::Word(col)) => query.group_by_columns.push(col),
                (Clause::From, Token::Word(table)) if query.table_name.is_empty() => {
                    query.table_name = table
                }
                (Clause::Where | Clause::Having, Token::Comma) => {}
                (Clause::Where | Clause::Having, Token::And) => logical = Some(Logical::And),
                (Clause::Where | Clause::Having, Token::Or) => logical = Some(Logical::Or),
                (Clause::Where | Clause::Having, Token::Word(column)) => {
                    match self.read_condition(column, logical.take()) {
                        Ok(cond) if clause == Clause::Where => query.conditions.push(cond),
                        Ok(cond) => query.having_conditions.push(cond),
                        Err(err @ QueryErr::InvalidOperator(_)) => {
                            warn!(%err, "skipping condition");
                            query.warnings.push(err);
                        }
                        Err(err) => return Err(err),
                    }
                }
                (clause, other) => return Err(QueryErr::unexpected(clause.expects(), other)),
            }
        }
        Ok(())
    }

    /// Reads the operator and value following `column`. A bad operator still
    /// consumes the whole triple so the caller can carry on after it.
    fn read_condition(&mut self, column: String, logical: Option<Logical>) -> Result<Condition> {
        let first = self.advance().ok_or(QueryErr::UnexpectedEof)?;
        let spelled = match (first.symbol(), first) {
            (Some(symbol), _) => {
                // operators such as `<>` and `=>` reach here split in two
                let mut spelled = symbol.to_string();
                while let Some(next) = self.peek().and_then(Token::symbol) {
                    spelled.push_str(next);
                    self.pos += 1;
                }
                spelled
            }
            (None, Token::Word(w) | Token::Text(w)) => w,
            (None, other) => other.to_string(),
        };
        let value = self.expect_value()?;
        let op = Operator::from_symbol(&spelled).ok_or(QueryErr::InvalidOperator(spelled))?;
        Ok(Condition {
            column,
            op,
            value,
            logical,
        })
    }

    /// `create <table> [<column> <type>]...`
    fn parse_create(&mut self) -> Result<TableDefinition> {
        self.expect(Token::Create)?;
        let mut def = TableDefinition::from(self.expect_ident("table name")?.as_str());
        while let Some(token) = self.peek() {
            match token {
                Token::Semicolon => break,
                Token::Comma => self.pos += 1,
                _ => def.columns.push(self.column_definition()?),
            }
        }
        Ok(def)
    }

    /// `alter <table> add <column> <type>` or `alter <table> remove <column>`
    fn parse_alter(&mut self) -> Result<Stmt> {
        self.expect(Token::Alter)?;
        let table = self.expect_ident("table name")?;
        let action = match self.advance() {
            Some(Token::Add) => AlterAction::AddColumn(self.column_definition()?),
            Some(Token::Remove) => AlterAction::RemoveColumn(self.expect_ident("column name")?),
            Some(other) => return Err(QueryErr::unexpected("ADD or REMOVE", other)),
            None => return Err(QueryErr::UnexpectedEof),
        };
        Ok(Stmt::Alter { table, action })
    }

    /// `insert into <table> <column> = <value> [, ...]`
    fn parse_insert(&mut self) -> Result<Stmt> {
        self.expect(Token::Insert)?;
        self.expect(Token::Into)?;
        let table = self.expect_ident("table name")?;
        let values = self.assignments(None)?;
        Ok(Stmt::Insert { table, values })
    }

    /// `update <table> set <column> = <value> [, ...] where <column> = <value>`
    fn parse_update(&mut self) -> Result<Stmt> {
        self.expect(Token::Update)?;
        let table = self.expect_ident("table name")?;
        self.expect(Token::Set)?;
        let assigns = self.assignments(Some(Token::Where))?;
        self.expect(Token::Where)?;
        let filter = self.equality_filter()?;
        Ok(Stmt::Update {
            table,
            assigns,
            filter,
        })
    }

    /// `delete from <table> where <column> = <value>`
    fn parse_delete(&mut self) -> Result<Stmt> {
        self.expect(Token::Delete)?;
        self.expect(Token::From)?;
        let table = self.expect_ident("table name")?;
        self.expect(Token::Where)?;
        let filter = self.equality_filter()?;
        Ok(Stmt::Delete { table, filter })
    }

    fn column_definition(&mut self) -> Result<ColumnDefinition> {
        let name = self.expect_ident("column name")?;
        let data_type: DataType = self.expect_ident("column type")?.parse()?;
        Ok(ColumnDefinition { name, data_type })
    }

    /// Comma separated `column = value` pairs, up to `stop` or the end of
    /// the statement.
    fn assignments(&mut self, stop: Option<Token>) -> Result<Vec<(String, String)>> {
        let mut pairs = Vec::new();
        while let Some(token) = self.peek() {
            if *token == Token::Semicolon || Some(token) == stop.as_ref() {
                break;
            }
            if *token == Token::Comma {
                self.pos += 1;
                continue;
            }
            let column = self.expect_ident("column name")?;
            self.expect(Token::Op(Operator::Eq))?;
            pairs.push((column, self.expect_value()?));
        }
        if pairs.is_empty() {
            return Err(match self.peek() {
                Some(token) => QueryErr::unexpected("column = value", token),
                None => QueryErr::UnexpectedEof,
            });
        }
        Ok(pairs)
    }

    /// A single `column = value` condition.
    fn equality_filter(&mut self) -> Result<(String, String)> {
        let column = self.expect_ident("column name")?;
        let cond = self.read_condition(column, None)?;
        if cond.op != Operator::Eq {
            return Err(QueryErr::InvalidOperator(cond.op.to_string()));
        }
        Ok((cond.column, cond.value))
    }

    pub(crate) fn expect_end(&mut self) -> Result<()> {
        if self.peek() == Some(&Token::Semicolon) {
            self.pos += 1;
        }
        match self.advance() {
            None => Ok(()),
            Some(token) => Err(QueryErr::unexpected("end of statement", token)),
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, expected: Token) -> Result<()> {
        match self.advance() {
            Some(token) if token == expected => Ok(()),
            Some(token) => Err(QueryErr::unexpected(expected.to_string(), token)),
            None => Err(QueryErr::UnexpectedEof),
        }
    }

    fn expect_ident(&mut self, what: &str) -> Result<String> {
        match self.advance() {
            Some(Token::Word(ident)) => Ok(ident),
            Some(token) => Err(QueryErr::unexpected(what, token)),
            None => Err(QueryErr::UnexpectedEof),
        }
    }

    fn expect_value(&mut self) -> Result<String> {
        match self.advance() {
            Some(token) => {
                let shown = token.to_string();
                token
                    .into_value()
                    .ok_or_else(|| QueryErr::unexpected("value", shown))
            }
            None => Err(QueryErr::UnexpectedEof),
        }
    }
}
