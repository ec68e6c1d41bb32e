//! The block-structured toy language used by the legacy tool. Its grammar
//! is not LL(1): `<declaration_list>` can both start a declaration and
//! vanish on `identifier`.

use ll1_engine::{
    ConflictPolicy, Engine, Grammar, ParseError, TableConflict, TableError, Token, TokenStream,
};

const AU_GRAMMAR: &str = include_str!("fixtures/au.json");

fn grammar() -> Grammar {
    Grammar::from_json(AU_GRAMMAR).unwrap()
}

fn engine() -> Engine {
    Engine::new(grammar(), ConflictPolicy::KeepFirst).unwrap()
}

fn program(tokens: &[(&str, &str)]) -> TokenStream {
    tokens
        .iter()
        .map(|&(code, literal)| Token::classify(code, literal))
        .collect()
}

#[test]
fn loads_every_symbol_and_production() {
    let g = grammar();
    assert_eq!(g.terminals().len(), 37);
    assert_eq!(g.non_terminals().len(), 30);
    assert_eq!(g.productions().len(), 57);
    assert_eq!(g.index_of("<au_program>"), Some(0));
    assert_eq!(g.start_symbol(), g.get_symbol_index("<au_program>"));
}

#[test]
fn strict_build_names_the_conflict() {
    let g = grammar();
    let sets = g.calculate_first_follow();
    let err = g
        .generate_ll1_parsing_table(&sets, ConflictPolicy::Reject)
        .unwrap_err();
    assert_eq!(
        err,
        TableError::ConflictingEntries(vec![TableConflict {
            lhs: "<declaration_list>".to_string(),
            lookahead: "identifier".to_string(),
            first: 2,
            second: 3,
        }])
    );
}

#[test]
fn keep_first_table_matches_the_legacy_choice() {
    let engine = engine();
    let g = engine.grammar();
    let table = engine.table();
    let sym = |n: &str| g.get_symbol_index(n).unwrap();

    assert_eq!(table.len(), 115);
    assert_eq!(table.conflicts().len(), 1);
    assert_eq!(table.lookup(sym("<declaration_list>"), sym("identifier")), Some(2));
    assert_eq!(table.lookup(sym("<declaration_list>"), sym("read")), Some(3));
    assert_eq!(table.lookup(sym("<else_part>"), sym("else")), Some(21));
    assert_eq!(table.lookup(sym("<else_part>"), sym(";")), Some(22));
}

#[test]
fn follow_sets_of_the_toy_language() {
    let g = grammar();
    let sets = g.calculate_first_follow();
    let follow = |n: &str| -> Vec<&str> {
        let mut v: Vec<&str> = sets
            .follow_of(g.index_of(n).unwrap())
            .iter()
            .map(|&s| g.get_symbol_name(s))
            .collect();
        v.sort();
        v
    };

    assert_eq!(
        follow("<declaration_list>"),
        vec!["$", "identifier", "if", "read", "while", "write", "}"]
    );
    assert_eq!(follow("<else_part>"), vec![";"]);
    assert!(follow("<declaration_tail>").is_empty());
}

#[test]
fn parses_declarations_and_io() {
    let engine = engine();
    let tokens = program(&[
        ("K", "AU"),
        ("K", "Language"),
        ("K", "int"),
        ("I", "a"),
        ("S", ","),
        ("I", "b"),
        ("S", ";"),
        ("K", "read"),
        ("S", "("),
        ("I", "a"),
        ("S", ")"),
        ("S", ";"),
        ("K", "write"),
        ("S", "("),
        ("I", "a"),
        ("S", "+"),
        ("U", "1"),
        ("S", ")"),
        ("S", ";"),
    ]);
    let mut derivation = engine.parser().derivation(&tokens).unwrap();
    derivation.run();
    assert_eq!(derivation.cursor(), tokens.len());
    let tree = derivation.finish().unwrap();

    assert_eq!(tree.len(), 55);
    assert_eq!(tree.root().unwrap().symbol, "<au_program>");
    let leaves: Vec<&str> = tree.frontier().into_iter().filter(|&s| s != "ε").collect();
    let literals: Vec<&str> = tokens.tokens().iter().map(|t| t.literal.as_str()).collect();
    assert_eq!(leaves, literals);
}

#[test]
fn parses_a_while_loop() {
    let engine = engine();
    let tokens = program(&[
        ("K", "AU"),
        ("K", "Language"),
        ("K", "while"),
        ("S", "("),
        ("I", "a"),
        ("S", "<"),
        ("U", "10"),
        ("S", ")"),
        ("S", "{"),
        ("K", "write"),
        ("S", "("),
        ("L", "\"x\""),
        ("S", ")"),
        ("S", ";"),
        ("S", "}"),
        ("S", ";"),
    ]);
    let tree = engine.parse(&tokens).unwrap();
    assert_eq!(tree.len(), 54);
}

#[test]
fn assignment_after_declarations_hits_the_conflict() {
    let engine = engine();
    let tokens = program(&[
        ("K", "AU"),
        ("K", "Language"),
        ("K", "int"),
        ("I", "a"),
        ("S", ";"),
        ("I", "a"),
        ("S", "="),
        ("U", "1"),
        ("S", ";"),
    ]);
    assert_eq!(
        engine.parse(&tokens).unwrap_err(),
        ParseError::NoTableEntry {
            position: 6,
            non_terminal: "<type_decl_tail>".to_string(),
            expected: vec!["identifier".to_string(), "[".to_string()],
            found: "=".to_string(),
            literal: "=".to_string(),
        }
    );
}

#[test]
fn character_constants_are_not_in_any_production() {
    let engine = engine();
    let tokens = program(&[("K", "AU"), ("K", "Language"), ("C", "'c'")]);
    assert!(matches!(
        engine.parse(&tokens),
        Err(ParseError::NoTableEntry { position: 2, .. })
    ));
}
