use serde::{Deserialize, Serialize};

use crate::error::ParseError;
use crate::grammar::{Grammar, Symbol, SymbolId, END_MARK, END_MARK_ID};

/// A lexeme as produced by an external scanner. `category` names the
/// grammar terminal, `literal` is the source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub category: String,
    pub literal: String,
}

impl Token {
    pub fn new(category: &str, literal: &str) -> Self {
        Self {
            category: category.to_string(),
            literal: literal.to_string(),
        }
    }

    /// A token whose literal is its own category, like keywords and
    /// punctuation.
    pub fn keyword(category: &str) -> Self {
        Self::new(category, category)
    }

    pub fn end() -> Self {
        Self::keyword(END_MARK)
    }

    pub fn is_end(&self) -> bool {
        self.category == END_MARK
    }

    /// Maps a scanner classification code to its fixed terminal. Unknown
    /// codes keep the literal as the category.
    pub fn classify(code: &str, literal: &str) -> Self {
        let category = match code {
            "I" => "identifier",
            "U" => "integer_const",
            "L" => "string_const",
            "C" => "character_const",
            _ => literal,
        };
        Self::new(category, literal)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenStream {
    tokens: Vec<Token>,
}

impl TokenStream {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    /// One token per non-blank line: `category [literal...]`.
    pub fn from_lines(text: &str) -> Self {
        let tokens = text
            .lines()
            .filter_map(|line| {
                let line = line.trim();
                let (category, literal) = match line.split_once(char::is_whitespace) {
                    Some((category, literal)) => (category, literal.trim()),
                    None => (line, line),
                };
                if category.is_empty() {
                    None
                } else {
                    Some(Token::new(category, literal))
                }
            })
            .collect();
        Self { tokens }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Checks every category against the grammar's terminals and returns
    /// the lookahead symbols, terminated by exactly one end marker.
    pub fn resolve(&self, grammar: &Grammar) -> Result<(Vec<SymbolId>, Vec<Token>), ParseError> {
        let mut lookahead = Vec::with_capacity(self.tokens.len() + 1);
        let mut tokens = Vec::with_capacity(self.tokens.len() + 1);
        for (position, token) in self.tokens.iter().enumerate() {
            let last = position + 1 == self.tokens.len();
            let id = match grammar.get_symbol_index(&token.category) {
                Some(id) if matches!(grammar.symbol(id), Symbol::Terminal(_)) => id,
                Some(END_MARK_ID) if last => END_MARK_ID,
                _ => {
                    return Err(ParseError::UnknownTokenCategory {
                        position,
                        category: token.category.clone(),
                    })
                }
            };
            lookahead.push(id);
            tokens.push(token.clone());
        }
        if lookahead.last() != Some(&END_MARK_ID) {
            lookahead.push(END_MARK_ID);
            tokens.push(Token::end());
        }
        Ok((lookahead, tokens))
    }
}

impl From<Vec<Token>> for TokenStream {
    fn from(tokens: Vec<Token>) -> Self {
        Self::new(tokens)
    }
}

impl FromIterator<Token> for TokenStream {
    fn from_iter<I: IntoIterator<Item = Token>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
