use crate::error::ParseError;
use crate::grammar::{Grammar, ParseTable, ProductionId, Symbol, SymbolId, END_MARK, EPSILON_ID};

use super::{ParseTree, Token, TokenStream};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverState {
    Running,
    Accepted,
    SyntaxError(ParseError),
}

/// One transition of the automaton, recorded for tracing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Expand {
        node: usize,
        production: ProductionId,
        cursor: usize,
    },
    Match {
        node: usize,
        literal: String,
        cursor: usize,
    },
    SkipEpsilon {
        node: usize,
    },
}

/// Automaton configuration captured before a step: stack labels from
/// bottom to top, and the categories still to be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceRow {
    pub stack: Vec<String>,
    pub input: Vec<String>,
    pub step: Step,
}

/// Read-only view of a grammar and its table. Each parse gets its own
/// `Derivation`, so one parser can serve any number of token streams.
#[derive(Debug, Clone, Copy)]
pub struct Parser<'a> {
    grammar: &'a Grammar,
    table: &'a ParseTable,
}

impl<'a> Parser<'a> {
    pub fn new(grammar: &'a Grammar, table: &'a ParseTable) -> Self {
        Self { grammar, table }
    }

    /// Validates the token categories and sets up a derivation positioned
    /// on the first token.
    pub fn derivation(&self, tokens: &TokenStream) -> Result<Derivation<'a>, ParseError> {
        let (lookahead, tokens) = tokens.resolve(self.grammar)?;
        Ok(Derivation::new(self.grammar, self.table, lookahead, tokens))
    }

    pub fn parse(&self, tokens: &TokenStream) -> Result<ParseTree, ParseError> {
        self.derivation(tokens)?.finish()
    }
}

/// Explicit-stack LL(1) automaton over one token stream.
#[derive(Debug, Clone)]
pub struct Derivation<'a> {
    grammar: &'a Grammar,
    table: &'a ParseTable,
    lookahead: Vec<SymbolId>,
    tokens: Vec<Token>,
    cursor: usize,
    stack: Vec<usize>,
    tree: ParseTree,
    state: DriverState,
    trace: Vec<Step>,
}

impl<'a> Derivation<'a> {
    /// `lookahead` must end with the end marker and be parallel to `tokens`.
    fn new(
        grammar: &'a Grammar,
        table: &'a ParseTable,
        lookahead: Vec<SymbolId>,
        tokens: Vec<Token>,
    ) -> Self {
        let mut tree = ParseTree::new();
        // Without a start symbol the root is a bare ε and only the empty
        // stream is accepted.
        let start = grammar.start_symbol().unwrap_or(EPSILON_ID);
        let root = tree.create_node(start, grammar.get_symbol_name(start), 0);
        Self {
            grammar,
            table,
            lookahead,
            tokens,
            cursor: 0,
            stack: vec![root],
            tree,
            state: DriverState::Running,
            trace: Vec::new(),
        }
    }

    pub fn state(&self) -> &DriverState {
        &self.state
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    pub fn tree(&self) -> &ParseTree {
        &self.tree
    }

    pub fn trace(&self) -> &[Step] {
        &self.trace
    }

    /// Ids of the productions applied so far, in leftmost-derivation order.
    pub fn productions(&self) -> Vec<ProductionId> {
        self.trace
            .iter()
            .filter_map(|step| match step {
                Step::Expand { production, .. } => Some(*production),
                _ => None,
            })
            .collect()
    }

    pub fn stack_labels(&self) -> Vec<&str> {
        self.stack
            .iter()
            .filter_map(|&index| self.tree.get(index))
            .map(|node| node.symbol.as_str())
            .collect()
    }

    /// Tokens from the cursor on, end marker included.
    pub fn remaining_input(&self) -> &[Token] {
        &self.tokens[self.cursor.min(self.tokens.len())..]
    }

    fn fail(&mut self, error: ParseError) {
        self.state = DriverState::SyntaxError(error);
    }

    fn current(&self) -> (SymbolId, &Token) {
        (self.lookahead[self.cursor], &self.tokens[self.cursor])
    }

    /// Performs one transition and returns the resulting state.
    pub fn step(&mut self) -> &DriverState {
        if self.state != DriverState::Running {
            return &self.state;
        }
        let (grammar, table) = (self.grammar, self.table);
        let (la, token) = self.current();
        let (category, literal) = (token.category.clone(), token.literal.clone());

        let Some(&top) = self.stack.last() else {
            if grammar.symbol(la) == &Symbol::EndMarker {
                self.state = DriverState::Accepted;
            } else {
                self.fail(ParseError::UnexpectedTerminal {
                    position: self.cursor,
                    expected: END_MARK.to_string(),
                    found: category,
                    literal,
                });
            }
            return &self.state;
        };

        let symbol = match self.tree.get(top) {
            Some(node) => node.grammar_symbol,
            None => unreachable!("stack entries are indices of created nodes"),
        };
        match grammar.symbol(symbol) {
            Symbol::Epsilon => {
                self.stack.pop();
                self.trace.push(Step::SkipEpsilon { node: top });
            }
            Symbol::Terminal(_) | Symbol::EndMarker => {
                if symbol == la {
                    self.tree.relabel(top, &literal);
                    self.stack.pop();
                    self.trace.push(Step::Match {
                        node: top,
                        literal,
                        cursor: self.cursor,
                    });
                    self.cursor += 1;
                } else {
                    self.fail(ParseError::UnexpectedTerminal {
                        position: self.cursor,
                        expected: grammar.get_symbol_name(symbol).to_string(),
                        found: category,
                        literal,
                    });
                }
            }
            Symbol::NonTerminal(nt) => {
                match grammar.table_production(table, symbol, la) {
                    Some(production) => {
                        self.stack.pop();
                        let children = self.tree.add_children(
                            top,
                            production
                                .rhs
                                .iter()
                                .map(|&s| (s, grammar.get_symbol_name(s))),
                        );
                        self.stack.extend(children.into_iter().rev());
                        self.trace.push(Step::Expand {
                            node: top,
                            production: production.id,
                            cursor: self.cursor,
                        });
                    }
                    None => self.fail(ParseError::NoTableEntry {
                        position: self.cursor,
                        non_terminal: nt.name.clone(),
                        expected: table
                            .lookaheads(symbol)
                            .into_iter()
                            .map(|t| grammar.get_symbol_name(t).to_string())
                            .collect(),
                        found: category,
                        literal,
                    }),
                }
            }
        }
        &self.state
    }

    pub fn run(&mut self) -> &DriverState {
        while self.state == DriverState::Running {
            self.step();
        }
        &self.state
    }

    /// Like `run`, but snapshots the stack and the remaining input before
    /// every successful step. A failing step leaves no row.
    pub fn run_traced(&mut self) -> Vec<TraceRow> {
        let mut rows = Vec::new();
        while self.state == DriverState::Running {
            let stack: Vec<String> = self.stack_labels().into_iter().map(String::from).collect();
            let input: Vec<String> = self
                .remaining_input()
                .iter()
                .map(|token| token.category.clone())
                .collect();
            let recorded = self.trace.len();
            self.step();
            if let Some(step) = self.trace.get(recorded) {
                rows.push(TraceRow {
                    stack,
                    input,
                    step: step.clone(),
                });
            }
        }
        rows
    }

    /// Runs to completion. Only an accepted derivation yields its tree.
    pub fn finish(mut self) -> Result<ParseTree, ParseError> {
        self.run();
        match self.state {
            DriverState::Accepted => Ok(self.tree),
            DriverState::SyntaxError(e) => Err(e),
            DriverState::Running => unreachable!("run() only returns once the derivation halts"),
        }
    }
}
