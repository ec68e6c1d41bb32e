use super::{grammar::Symbol, Grammar, SymbolId, SymbolSet, END_MARK_ID, EPSILON_ID};

/// FIRST and FOLLOW sets of every non-terminal, indexed by the dense
/// non-terminal index. FIRST(A) contains Epsilon iff A is nullable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirstFollow {
    pub first: Vec<SymbolSet>,
    pub follow: Vec<SymbolSet>,
    /// Sweeps over the productions, counting the final one that changed nothing.
    pub first_passes: usize,
    pub follow_passes: usize,
}

impl FirstFollow {
    pub fn first_of(&self, nt_index: usize) -> &SymbolSet {
        &self.first[nt_index]
    }

    pub fn follow_of(&self, nt_index: usize) -> &SymbolSet {
        &self.follow[nt_index]
    }

    pub fn is_nullable(&self, nt_index: usize) -> bool {
        self.first[nt_index].contains(&EPSILON_ID)
    }
}

impl Grammar {
    pub fn calculate_first_follow(&self) -> FirstFollow {
        let (first, first_passes) = self.calculate_first();
        let (follow, follow_passes) = self.calculate_follow(&first);
        FirstFollow {
            first,
            follow,
            first_passes,
            follow_passes,
        }
    }

    /// FIRST of a symbol sequence under the given FIRST sets. Epsilon is in
    /// the result iff every symbol of the sequence is nullable, so the empty
    /// sequence yields `{ε}`.
    pub fn first_of_sequence(&self, first: &[SymbolSet], sequence: &[SymbolId]) -> SymbolSet {
        let mut result = SymbolSet::new();
        for &idx in sequence {
            match self.symbol(idx) {
                Symbol::Epsilon => continue,
                Symbol::Terminal(_) | Symbol::EndMarker => {
                    result.insert(idx);
                    return result;
                }
                Symbol::NonTerminal(nt) => {
                    let nt_first = &first[nt.index];
                    result.extend(nt_first.iter().filter(|&&s| s != EPSILON_ID));
                    if !nt_first.contains(&EPSILON_ID) {
                        return result;
                    }
                }
            }
        }
        result.insert(EPSILON_ID);
        result
    }

    /// Sets only grow and are bounded by the terminal alphabet, so every
    /// sweep that changes something adds at least one element.
    fn max_passes(&self) -> usize {
        self.non_terminals().len() * (self.terminals().len() + 2) + 1
    }

    pub fn calculate_first(&self) -> (Vec<SymbolSet>, usize) {
        let mut first: Vec<SymbolSet> = vec![SymbolSet::new(); self.non_terminals().len()];
        let mut passes = 0;
        let mut changed = true;
        while changed {
            changed = false;
            passes += 1;
            debug_assert!(passes <= self.max_passes(), "FIRST sets failed to converge");
            for production in self.productions() {
                let rhs_first = self.first_of_sequence(&first, &production.rhs);
                let lhs_first = &mut first[production.lhs_index];
                let before = lhs_first.len();
                lhs_first.extend(rhs_first);
                if lhs_first.len() > before {
                    changed = true;
                }
            }
        }
        (first, passes)
    }

    pub fn calculate_follow(&self, first: &[SymbolSet]) -> (Vec<SymbolSet>, usize) {
        let mut follow: Vec<SymbolSet> = vec![SymbolSet::new(); self.non_terminals().len()];
        if let Some(start) = self.start_symbol().and_then(|s| self.non_terminal(s)) {
            follow[start.index].insert(END_MARK_ID);
        }

        let mut passes = 0;
        let mut changed = true;
        while changed {
            changed = false;
            passes += 1;
            debug_assert!(passes <= self.max_passes(), "FOLLOW sets failed to converge");
            for production in self.productions() {
                for (j, &idx) in production.rhs.iter().enumerate() {
                    let b = match self.symbol(idx) {
                        Symbol::NonTerminal(nt) => nt.index,
                        _ => continue,
                    };
                    let rest_first = self.first_of_sequence(first, &production.rhs[j + 1..]);
                    let before = follow[b].len();
                    follow[b].extend(rest_first.iter().filter(|&&s| s != EPSILON_ID));
                    if rest_first.contains(&EPSILON_ID) && b != production.lhs_index {
                        let lhs_follow = follow[production.lhs_index].clone();
                        follow[b].extend(lhs_follow);
                    }
                    if follow[b].len() > before {
                        changed = true;
                    }
                }
            }
        }
        (follow, passes)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use crate::grammar::{SymbolSet, END_MARK_ID, EPSILON_ID};
    use crate::Grammar;

    fn names(g: &Grammar, set: &SymbolSet) -> Vec<String> {
        let mut v: Vec<String> = set.iter().map(|&s| g.get_symbol_name(s).to_string()).collect();
        v.sort();
        v
    }

    fn expression_grammar() -> Grammar {
        Grammar::parse("E -> T E'\nE' -> + T E' | ε\nT -> id").unwrap()
    }

    #[test]
    fn first_of_sequence_cases() {
        let g = expression_grammar();
        let sets = g.calculate_first_follow();
        let id = g.get_symbol_index("id").unwrap();
        let plus = g.get_symbol_index("+").unwrap();
        let e_prime = g.get_symbol_index("E'").unwrap();
        let t = g.get_symbol_index("T").unwrap();

        let empty: SymbolSet = g.first_of_sequence(&sets.first, &[]);
        assert_eq!(empty, [EPSILON_ID].into_iter().collect::<SymbolSet>());

        let only_epsilon = g.first_of_sequence(&sets.first, &[EPSILON_ID]);
        assert_eq!(only_epsilon, [EPSILON_ID].into_iter().collect::<SymbolSet>());

        let nullable_then_terminal = g.first_of_sequence(&sets.first, &[e_prime, id]);
        assert_eq!(nullable_then_terminal, [plus, id].into_iter().collect::<SymbolSet>());

        let stops_at_t = g.first_of_sequence(&sets.first, &[t, plus]);
        assert_eq!(stops_at_t, [id].into_iter().collect::<SymbolSet>());
    }

    #[test]
    fn expression_grammar_sets() {
        let g = expression_grammar();
        let sets = g.calculate_first_follow();
        let e = g.index_of("E").unwrap();
        let e_prime = g.index_of("E'").unwrap();
        let t = g.index_of("T").unwrap();

        assert_eq!(names(&g, sets.first_of(e)), vec!["id"]);
        assert_eq!(names(&g, sets.first_of(e_prime)), vec!["+", "ε"]);
        assert_eq!(names(&g, sets.first_of(t)), vec!["id"]);
        assert_eq!(names(&g, sets.follow_of(e)), vec!["$"]);
        assert_eq!(names(&g, sets.follow_of(e_prime)), vec!["$"]);
        assert_eq!(names(&g, sets.follow_of(t)), vec!["$", "+"]);
        assert!(sets.is_nullable(e_prime));
        assert!(!sets.is_nullable(e));
    }

    #[test]
    fn lab_grammar_sets() {
        let g = Grammar::parse(
            "S -> B A\nA -> + B A | ε\nB -> D C\nC -> * D C | ε\nD -> ( S ) | a",
        )
        .unwrap();
        let sets = g.calculate_first_follow();
        let first = |n: &str| names(&g, sets.first_of(g.index_of(n).unwrap()));
        let follow = |n: &str| names(&g, sets.follow_of(g.index_of(n).unwrap()));

        assert_eq!(first("S"), vec!["(", "a"]);
        assert_eq!(first("A"), vec!["+", "ε"]);
        assert_eq!(first("C"), vec!["*", "ε"]);
        assert_eq!(follow("S"), vec!["$", ")"]);
        assert_eq!(follow("A"), vec!["$", ")"]);
        assert_eq!(follow("B"), vec!["$", ")", "+"]);
        assert_eq!(follow("C"), vec!["$", ")", "+"]);
        assert_eq!(follow("D"), vec!["$", ")", "*", "+"]);
    }

    #[rstest]
    #[case("E -> T E'\nE' -> + T E' | ε\nT -> id")]
    #[case("S -> B A\nA -> + B A | ε\nB -> D C\nC -> * D C | ε\nD -> ( S ) | a")]
    #[case("S -> A B c\nA -> a | ε\nB -> b | ε")]
    fn sets_are_fixed_points(#[case] text: &str) {
        let g = Grammar::parse(text).unwrap();
        let sets = g.calculate_first_follow();

        for production in g.productions() {
            let rhs_first = g.first_of_sequence(&sets.first, &production.rhs);
            assert!(rhs_first.is_subset(sets.first_of(production.lhs_index)));
        }
        let (follow_again, _) = g.calculate_follow(&sets.first);
        assert_eq!(follow_again, sets.follow);

        let non_terminals = g.non_terminals().len();
        assert!(sets.first_passes <= non_terminals + 1);
        assert!(sets.follow_passes <= non_terminals + 1);
    }

    #[rstest]
    #[case("E -> T E'\nE' -> + T E' | ε\nT -> id")]
    #[case("S -> A B c\nA -> a | ε\nB -> b | ε")]
    fn sets_hold_only_terminals_and_sentinels(#[case] text: &str) {
        let g = Grammar::parse(text).unwrap();
        let sets = g.calculate_first_follow();
        let start = g.non_terminal(g.start_symbol().unwrap()).unwrap().index;
        assert!(sets.follow_of(start).contains(&END_MARK_ID));

        for set in sets.first.iter().chain(sets.follow.iter()) {
            for &s in set {
                assert!(g.non_terminal(s).is_none());
            }
        }
        for set in &sets.first {
            assert!(!set.contains(&END_MARK_ID));
        }
        for set in &sets.follow {
            assert!(!set.contains(&EPSILON_ID));
        }
    }

    #[test]
    fn unreachable_non_terminal_has_empty_follow() {
        let g = Grammar::parse("S -> a\nU -> b").unwrap();
        let sets = g.calculate_first_follow();
        assert!(sets.follow_of(g.index_of("U").unwrap()).is_empty());
        assert_eq!(names(&g, sets.first_of(g.index_of("U").unwrap())), vec!["b"]);
    }
}
