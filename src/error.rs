use std::fmt::{self, Display};

use crate::grammar::ProductionId;

/// Problems found while loading a grammar. These are configuration errors
/// and are always reported before any parsing begins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrammarError {
    DuplicateSymbol(String),
    ReservedSymbol(String),
    DuplicateProductionId(ProductionId),
    UnknownSymbol {
        production: ProductionId,
        name: String,
    },
    LeftNotNonTerminal {
        production: ProductionId,
        name: String,
    },
    MalformedProduction {
        production: ProductionId,
        reason: String,
    },
    NoStartSymbol,
    Syntax {
        line: usize,
        message: String,
    },
    Definition(String),
}

impl Display for GrammarError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GrammarError::DuplicateSymbol(name) => {
                write!(f, "Symbol \"{}\" is declared more than once", name)
            }
            GrammarError::ReservedSymbol(name) => {
                write!(f, "Symbol \"{}\" is reserved and cannot be declared", name)
            }
            GrammarError::DuplicateProductionId(id) => {
                write!(f, "Production id {} is used more than once", id)
            }
            GrammarError::UnknownSymbol { production, name } => write!(
                f,
                "Production {}: \"{}\" is neither a terminal nor a non-terminal",
                production, name
            ),
            GrammarError::LeftNotNonTerminal { production, name } => write!(
                f,
                "Production {}: left side \"{}\" is not a non-terminal",
                production, name
            ),
            GrammarError::MalformedProduction { production, reason } => {
                write!(f, "Production {}: {}", production, reason)
            }
            GrammarError::NoStartSymbol => write!(f, "Grammar has no start symbol"),
            GrammarError::Syntax { line, message } => write!(f, "Line {}: {}", line, message),
            GrammarError::Definition(message) => {
                write!(f, "Invalid grammar definition: {}", message)
            }
        }
    }
}

impl std::error::Error for GrammarError {}

impl From<serde_json::Error> for GrammarError {
    fn from(e: serde_json::Error) -> GrammarError {
        GrammarError::Definition(e.to_string())
    }
}

/// Two productions claim the same `(lhs, lookahead)` cell of the parsing table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableConflict {
    pub lhs: String,
    pub lookahead: String,
    pub first: ProductionId,
    pub second: ProductionId,
}

impl Display for TableConflict {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "M[{}, {}] is claimed by productions {} and {}",
            self.lhs, self.lookahead, self.first, self.second
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    ConflictingEntries(Vec<TableConflict>),
}

impl Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TableError::ConflictingEntries(conflicts) => {
                write!(f, "Grammar is not LL(1):")?;
                for conflict in conflicts {
                    write!(f, "\n  {}", conflict)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for TableError {}

/// A failed derivation. Positions are 0-based token indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    UnknownTokenCategory {
        position: usize,
        category: String,
    },
    UnexpectedTerminal {
        position: usize,
        expected: String,
        found: String,
        literal: String,
    },
    NoTableEntry {
        position: usize,
        non_terminal: String,
        /// Lookaheads the non-terminal does have rules for.
        expected: Vec<String>,
        found: String,
        literal: String,
    },
}

impl ParseError {
    pub fn position(&self) -> usize {
        match self {
            ParseError::UnknownTokenCategory { position, .. }
            | ParseError::UnexpectedTerminal { position, .. }
            | ParseError::NoTableEntry { position, .. } => *position,
        }
    }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ParseError::UnknownTokenCategory { position, category } => write!(
                f,
                "Token #{}: category \"{}\" is not a terminal of the grammar",
                position + 1,
                category
            ),
            ParseError::UnexpectedTerminal {
                position,
                expected,
                found,
                literal,
            } => write!(
                f,
                "Syntax error at token #{} (value: '{}'): expected {}, found terminal {}",
                position + 1,
                literal,
                expected,
                found
            ),
            ParseError::NoTableEntry {
                position,
                non_terminal,
                expected,
                found,
                literal,
            } => write!(
                f,
                "Syntax error at token #{} (value: '{}'): no rule for non-terminal {} with lookahead {} (expected one of: {})",
                position + 1,
                literal,
                non_terminal,
                found,
                expected.join(", ")
            ),
        }
    }
}

impl std::error::Error for ParseError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    Grammar(GrammarError),
    Table(TableError),
    Parse(ParseError),
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Grammar(e) => write!(f, "{}", e),
            Error::Table(e) => write!(f, "{}", e),
            Error::Parse(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Grammar(e) => Some(e),
            Error::Table(e) => Some(e),
            Error::Parse(e) => Some(e),
        }
    }
}

impl From<GrammarError> for Error {
    fn from(e: GrammarError) -> Error {
        Error::Grammar(e)
    }
}

impl From<TableError> for Error {
    fn from(e: TableError) -> Error {
        Error::Table(e)
    }
}

impl From<ParseError> for Error {
    fn from(e: ParseError) -> Error {
        Error::Parse(e)
    }
}
