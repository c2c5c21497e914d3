use super::error::{QueryErr, Result};
use std::collections::VecDeque;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,    // = or ==
    NotEq, // !=
    Lt,    // <
    Le,    // <=
    Gt,    // >
    Ge,    // >=
}

impl Operator {
    /// The operator spelled by `symbol`, if it is one of the recognised ones.
    pub fn from_symbol(symbol: &str) -> Option<Operator> {
        Some(match symbol {
            "=" | "==" => Operator::Eq,
            "!=" => Operator::NotEq,
            "<" => Operator::Lt,
            "<=" => Operator::Le,
            ">" => Operator::Gt,
            ">=" => Operator::Ge,
            _ => return None,
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::NotEq => "!=",
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    // Bare word: identifier, number or unquoted value
    Word(String),
    // Quoted value
    Text(String),
    // Keywords
    Select,
    From,
    Where,
    Group,
    By,
    Having,
    And,
    Or,
    Create,
    Drop,
    Alter,
    Add,
    Remove,
    Insert,
    Into,
    Update,
    Set,
    Delete,
    // Delimiters
    Comma,
    Semicolon,
    Op(Operator),
    // `!` not followed by `=`
    Bang,
}

impl Token {
    /// The token as a plain value, if it can stand for one.
    pub fn into_value(self) -> Option<String> {
        match self {
            Token::Word(s) | Token::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Spelling of an operator-like token.
    pub fn symbol(&self) -> Option<&'static str> {
        match self {
            Token::Op(op) => Some(op.as_str()),
            Token::Bang => Some("!"),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Word(w) => write!(f, "'{w}'"),
            Token::Text(t) => write!(f, "\"{t}\""),
            Token::Comma => f.write_str("','"),
            Token::Semicolon => f.write_str("';'"),
            Token::Op(op) => write!(f, "'{op}'"),
            Token::Bang => f.write_str("'!'"),
            keyword => write!(f, "{}", format!("{keyword:?}").to_uppercase()),
        }
    }
}

pub struct Lexer {
    src: VecDeque<char>,
}

impl Lexer {
    pub fn new(src: &str) -> Self {
        Lexer {
            src: src.chars().collect(),
        }
    }

    fn is_word_char(ch: char) -> bool {
        !ch.is_whitespace() && !matches!(ch, ',' | ';' | '=' | '<' | '>' | '!' | '\'' | '"')
    }

    fn finished(&self) -> bool {
        self.src.is_empty()
    }

    fn curr(&self) -> Option<char> {
        self.src.front().copied()
    }

    fn walk(&mut self) -> Option<char> {
        self.src.pop_front()
    }

    /// Consumes the next char if it equals `expected`.
    fn eat(&mut self, expected: char) -> bool {
        if self.curr() == Some(expected) {
            self.walk();
            true
        } else {
            false
        }
    }

    fn skip_ws(&mut self) {
        while let Some(ch) = self.curr()
            && ch.is_whitespace()
        {
            self.walk();
        }
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            self.skip_ws();
            if self.finished() {
                return Ok(tokens);
            }
            tokens.push(self.next()?);
        }
    }

    pub fn next(&mut self) -> Result<Token> {
        self.skip_ws();
        let ch = self.walk().ok_or(QueryErr::UnexpectedEof)?;
        Ok(match ch {
            ',' => Token::Comma,
            ';' => Token::Semicolon,
            '=' => {
                self.eat('=');
                Token::Op(Operator::Eq)
            }
            '!' if self.eat('=') => Token::Op(Operator::NotEq),
            '!' => Token::Bang,
            '<' if self.eat('=') => Token::Op(Operator::Le),
            '<' => Token::Op(Operator::Lt),
            '>' if self.eat('=') => Token::Op(Operator::Ge),
            '>' => Token::Op(Operator::Gt),
            '\'' | '"' => self.lex_text(ch)?,
            _ if Self::is_word_char(ch) => self.lex_word(ch),
            _ => return Err(QueryErr::InvalidToken(ch)),
        })
    }

    fn lex_text(&mut self, quote: char) -> Result<Token> {
        let mut out = String::new();
        while let Some(ch) = self.walk() {
            if ch == quote {
                return Ok(Token::Text(out));
            } else if ch == '\\' {
                let esc = self.walk().ok_or(QueryErr::UnterminatedText)?;
                match esc {
                    '\\' | '\'' | '"' => out.push(esc),
                    't' => out.push('\t'),
                    _ => {
                        out.push(ch);
                        out.push(esc);
                    }
                }
            } else {
                out.push(ch);
            }
        }
        Err(QueryErr::UnterminatedText)
    }

    fn lex_word(&mut self, start: char) -> Token {
        let mut out = String::from(start);
        while let Some(ch) = self.curr()
            && Self::is_word_char(ch)
        {
            out.push(ch);
            self.walk();
        }
        match out.to_ascii_lowercase().as_str() {
            "select" => Token::Select,
            "from" => Token::From,
            "where" => Token::Where,
            "group" => Token::Group,
            "by" => Token::By,
            "having" => Token::Having,
            "and" => Token::And,
            "or" => Token::Or,
            "create" => Token::Create,
            "drop" => Token::Drop,
            "alter" => Token::Alter,
            "add" => Token::Add,
            "remove" => Token::Remove,
            "insert" => Token::Insert,
            "into" => Token::Into,
            "update" => Token::Update,
            "set" => Token::Set,
            "delete" => Token::Delete,
            _ => Token::Word(out),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn lex(src: &str) -> Vec<Token> {
        Lexer::new(src).tokenize().unwrap()
    }

    fn word(s: &str) -> Token {
        Token::Word(s.to_string())
    }

    #[test]
    fn test_keywords_ignore_case() {
        assert_eq!(
            lex("select FROM WhErE group BY having"),
            vec![
                Token::Select,
                Token::From,
                Token::Where,
                Token::Group,
                Token::By,
                Token::Having
            ]
        );
    }

    #[test]
    fn test_words_keep_case() {
        assert_eq!(lex("Users user_id42 42.5 -3"), vec![
            word("Users"),
            word("user_id42"),
            word("42.5"),
            word("-3"),
        ]);
    }

    #[test]
    fn test_trailing_comma_is_split_off() {
        assert_eq!(lex("id, name"), vec![word("id"), Token::Comma, word("name")]);
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            lex("= == != < <= > >="),
            vec![
                Token::Op(Operator::Eq),
                Token::Op(Operator::Eq),
                Token::Op(Operator::NotEq),
                Token::Op(Operator::Lt),
                Token::Op(Operator::Le),
                Token::Op(Operator::Gt),
                Token::Op(Operator::Ge),
            ]
        );
    }

    #[test]
    fn test_glued_condition() {
        assert_eq!(
            lex("id=1 age>=30"),
            vec![
                word("id"),
                Token::Op(Operator::Eq),
                word("1"),
                word("age"),
                Token::Op(Operator::Ge),
                word("30"),
            ]
        );
    }

    #[test]
    fn test_quoted_values() {
        assert_eq!(
            lex(r#"name="Zed" 'it\'s me' "select""#),
            vec![
                word("name"),
                Token::Op(Operator::Eq),
                Token::Text("Zed".to_string()),
                Token::Text("it's me".to_string()),
                Token::Text("select".to_string()),
            ]
        );
    }

    #[test]
    fn test_unterminated_text() {
        assert_eq!(
            Lexer::new("'unfinished").tokenize(),
            Err(QueryErr::UnterminatedText)
        );
    }

    #[test]
    fn test_lone_bang() {
        assert_eq!(lex("a ! b"), vec![word("a"), Token::Bang, word("b")]);
        assert_eq!(lex("a!b"), vec![word("a"), Token::Bang, word("b")]);
    }

    #[test]
    fn test_split_operators() {
        assert_eq!(lex("a<>1"), vec![
            word("a"),
            Token::Op(Operator::Lt),
            Token::Op(Operator::Gt),
            word("1"),
        ]);
    }

    #[test]
    fn test_operator_symbols() {
        assert_eq!(Operator::from_symbol("=="), Some(Operator::Eq));
        assert_eq!(Operator::from_symbol(">="), Some(Operator::Ge));
        assert_eq!(Operator::from_symbol("<>"), None);
        assert_eq!(Token::Bang.symbol(), Some("!"));
        assert_eq!(word("like").symbol(), None);
    }

    #[test]
    fn test_next_at_end() {
        let mut lexer = Lexer::new("   ");
        assert_eq!(lexer.next(), Err(QueryErr::UnexpectedEof));
    }
}
