extern crate wasm_bindgen;

use std::fmt::Display;

use wasm_bindgen::prelude::*;

pub mod error;
pub mod grammar;
pub mod parser;

pub use error::{Error, GrammarError, ParseError, TableConflict, TableError};
pub use grammar::{ConflictPolicy, FirstFollow, Grammar, ParseTable};
pub use parser::{
    Derivation, DriverState, ParseTree, ParseTreeNode, Parser, Step, Token, TokenStream, TraceRow,
};

/// A loaded grammar together with its FIRST/FOLLOW sets and parsing table.
/// Everything inside is read-only once built, so an engine can be shared
/// between threads that each parse their own token stream.
#[derive(Debug, Clone)]
pub struct Engine {
    grammar: Grammar,
    sets: FirstFollow,
    table: ParseTable,
}

impl Engine {
    pub fn new(grammar: Grammar, policy: ConflictPolicy) -> Result<Self, TableError> {
        let sets = grammar.calculate_first_follow();
        let table = grammar.generate_ll1_parsing_table(&sets, policy)?;
        Ok(Self {
            grammar,
            sets,
            table,
        })
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn sets(&self) -> &FirstFollow {
        &self.sets
    }

    pub fn table(&self) -> &ParseTable {
        &self.table
    }

    pub fn parser(&self) -> Parser<'_> {
        Parser::new(&self.grammar, &self.table)
    }

    pub fn parse(&self, tokens: &TokenStream) -> Result<ParseTree, ParseError> {
        self.parser().parse(tokens)
    }
}

fn error_to_json(e: impl Display) -> String {
    serde_json::json!({ "error": e.to_string() }).to_string()
}

#[wasm_bindgen]
pub fn first_follow_to_json(grammar: &str) -> String {
    match crate::Grammar::parse(grammar) {
        Ok(g) => {
            let sets = g.calculate_first_follow();
            g.to_non_terminal_output_vec(&sets).to_json()
        }
        Err(e) => error_to_json(e),
    }
}

#[wasm_bindgen]
pub fn ll1_table_to_json(grammar: &str) -> String {
    let engine = crate::Grammar::parse(grammar)
        .map_err(Error::from)
        .and_then(|g| Engine::new(g, ConflictPolicy::KeepFirst).map_err(Error::from));
    match engine {
        Ok(engine) => engine
            .grammar()
            .to_ll1_parsing_table_output(engine.table())
            .to_json(),
        Err(e) => error_to_json(e),
    }
}

#[wasm_bindgen]
pub fn parse_to_json(grammar: &str, tokens: &str) -> String {
    let tree = crate::Grammar::parse(grammar)
        .map_err(Error::from)
        .and_then(|g| Engine::new(g, ConflictPolicy::Reject).map_err(Error::from))
        .and_then(|engine| {
            engine
                .parse(&TokenStream::from_lines(tokens))
                .map_err(Error::from)
        });
    match tree {
        Ok(tree) => tree.to_json(),
        Err(e) => error_to_json(e),
    }
}
