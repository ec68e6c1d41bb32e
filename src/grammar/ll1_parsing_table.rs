use std::collections::HashMap;

use crate::error::{TableConflict, TableError};
use crate::Grammar;

use super::{FirstFollow, Production, ProductionId, SymbolId, END_MARK_ID, EPSILON_ID};

/// What to do when two productions claim the same table cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConflictPolicy {
    /// Fail the build and report every conflicting cell.
    #[default]
    Reject,
    /// Keep the production inserted first; conflicts stay inspectable on
    /// the table.
    KeepFirst,
}

/// Deterministic LL(1) table: one row per non-terminal, one column per
/// terminal followed by the end marker.
#[derive(Debug, Clone)]
pub struct ParseTable {
    columns: Vec<SymbolId>,
    column_of: HashMap<SymbolId, usize>,
    row_of: HashMap<SymbolId, usize>,
    /// Candidates per cell in insertion order; the first one is used.
    cells: Vec<Vec<Vec<ProductionId>>>,
    conflicts: Vec<TableConflict>,
}

impl ParseTable {
    pub fn lookup(&self, non_terminal: SymbolId, lookahead: SymbolId) -> Option<ProductionId> {
        let row = *self.row_of.get(&non_terminal)?;
        let col = *self.column_of.get(&lookahead)?;
        self.cells[row][col].first().cloned()
    }

    /// Lookaheads for which `non_terminal` has an entry, in column order.
    pub fn lookaheads(&self, non_terminal: SymbolId) -> Vec<SymbolId> {
        match self.row_of.get(&non_terminal) {
            Some(&row) => self
                .columns
                .iter()
                .zip(&self.cells[row])
                .filter(|(_, cell)| !cell.is_empty())
                .map(|(&t, _)| t)
                .collect(),
            None => Vec::new(),
        }
    }

    /// Number of filled cells.
    pub fn len(&self) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|cell| !cell.is_empty())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn columns(&self) -> &[SymbolId] {
        &self.columns
    }

    /// All candidates of a cell, by dense row index and column position.
    pub fn candidates(&self, row: usize, col: usize) -> &[ProductionId] {
        &self.cells[row][col]
    }

    pub fn conflicts(&self) -> &[TableConflict] {
        &self.conflicts
    }

    /// Filled cells as `(row, lookahead, production)`, row-major.
    pub fn entries(&self) -> impl Iterator<Item = (usize, SymbolId, ProductionId)> + '_ {
        self.cells.iter().enumerate().flat_map(move |(row, cells)| {
            cells
                .iter()
                .enumerate()
                .filter_map(move |(col, cell)| cell.first().map(|&p| (row, self.columns[col], p)))
        })
    }

    fn insert(&mut self, row: usize, lookahead: SymbolId, production: ProductionId) {
        let col = self.column_of[&lookahead];
        let cell = &mut self.cells[row][col];
        if !cell.contains(&production) {
            cell.push(production);
        }
    }
}

impl Grammar {
    pub fn generate_ll1_parsing_table(
        &self,
        sets: &FirstFollow,
        policy: ConflictPolicy,
    ) -> Result<ParseTable, TableError> {
        let columns: Vec<SymbolId> = self
            .terminals()
            .iter()
            .cloned()
            .chain(std::iter::once(END_MARK_ID))
            .collect();
        let column_of: HashMap<SymbolId, usize> =
            columns.iter().enumerate().map(|(i, &t)| (t, i)).collect();
        let row_of: HashMap<SymbolId, usize> = self
            .non_terminals()
            .iter()
            .enumerate()
            .map(|(i, &nt)| (nt, i))
            .collect();

        let mut table = ParseTable {
            cells: vec![vec![Vec::new(); columns.len()]; self.non_terminals().len()],
            columns,
            column_of,
            row_of,
            conflicts: Vec::new(),
        };

        for production in self.productions() {
            let first = self.first_of_sequence(&sets.first, &production.rhs);
            for &t in first.iter().filter(|&&t| t != EPSILON_ID) {
                table.insert(production.lhs_index, t, production.id);
            }
            if first.contains(&EPSILON_ID) {
                for &b in sets.follow_of(production.lhs_index) {
                    table.insert(production.lhs_index, b, production.id);
                }
            }
        }

        table.conflicts = self.collect_conflicts(&table);
        if policy == ConflictPolicy::Reject && !table.conflicts.is_empty() {
            return Err(TableError::ConflictingEntries(table.conflicts));
        }
        Ok(table)
    }

    fn collect_conflicts(&self, table: &ParseTable) -> Vec<TableConflict> {
        let mut conflicts = Vec::new();
        for (row, &nt) in self.non_terminals().iter().enumerate() {
            for (col, &lookahead) in table.columns.iter().enumerate() {
                if let Some((&first, rest)) = table.cells[row][col].split_first() {
                    for &second in rest {
                        conflicts.push(TableConflict {
                            lhs: self.get_symbol_name(nt).to_string(),
                            lookahead: self.get_symbol_name(lookahead).to_string(),
                            first,
                            second,
                        });
                    }
                }
            }
        }
        conflicts
    }

    /// The production a table cell selects, resolved against this grammar.
    pub fn table_production(
        &self,
        table: &ParseTable,
        non_terminal: SymbolId,
        lookahead: SymbolId,
    ) -> Option<&Production> {
        table
            .lookup(non_terminal, lookahead)
            .and_then(|id| self.production(id))
    }
}

#[cfg(test)]
mod tests {
    use crate::error::{TableConflict, TableError};
    use crate::grammar::{ConflictPolicy, END_MARK_ID};
    use crate::Grammar;

    #[test]
    fn expression_grammar_table() {
        let g = Grammar::parse("E -> T E'\nE' -> + T E' | ε\nT -> id").unwrap();
        let sets = g.calculate_first_follow();
        let table = g
            .generate_ll1_parsing_table(&sets, ConflictPolicy::Reject)
            .unwrap();

        let sym = |n: &str| g.get_symbol_index(n).unwrap();
        assert_eq!(table.lookup(sym("E"), sym("id")), Some(1));
        assert_eq!(table.lookup(sym("E'"), sym("+")), Some(2));
        assert_eq!(table.lookup(sym("E'"), END_MARK_ID), Some(3));
        assert_eq!(table.lookup(sym("T"), sym("id")), Some(4));
        assert_eq!(table.lookup(sym("E"), sym("+")), None);
        assert_eq!(table.lookup(sym("id"), sym("id")), None);
        assert_eq!(table.len(), 4);
        assert!(table.conflicts().is_empty());
        assert_eq!(table.columns().last(), Some(&END_MARK_ID));
    }

    #[test]
    fn nullable_production_fills_follow_columns() {
        let g = Grammar::parse("S -> A b\nA -> a | ε").unwrap();
        let sets = g.calculate_first_follow();
        let table = g
            .generate_ll1_parsing_table(&sets, ConflictPolicy::Reject)
            .unwrap();
        let sym = |n: &str| g.get_symbol_index(n).unwrap();

        assert_eq!(table.lookup(sym("S"), sym("a")), Some(1));
        assert_eq!(table.lookup(sym("S"), sym("b")), Some(1));
        assert_eq!(table.lookup(sym("A"), sym("b")), Some(3));
        assert_eq!(table.lookup(sym("A"), END_MARK_ID), None);
        assert_eq!(table.lookaheads(sym("A")), vec![sym("a"), sym("b")]);
        assert!(table.lookaheads(sym("a")).is_empty());
        let production = g.table_production(&table, sym("A"), sym("a")).unwrap();
        assert_eq!(production.id, 2);
    }

    #[test]
    fn conflicts_are_rejected_by_default() {
        let g = Grammar::parse("S -> a b | a c").unwrap();
        let sets = g.calculate_first_follow();
        let err = g
            .generate_ll1_parsing_table(&sets, ConflictPolicy::default())
            .unwrap_err();
        assert_eq!(
            err,
            TableError::ConflictingEntries(vec![TableConflict {
                lhs: "S".to_string(),
                lookahead: "a".to_string(),
                first: 1,
                second: 2,
            }])
        );
        assert!(err.to_string().contains("productions 1 and 2"));
    }

    #[test]
    fn keep_first_reproduces_first_match() {
        let g = Grammar::parse("S -> A a\nA -> a | ε").unwrap();
        let sets = g.calculate_first_follow();
        let table = g
            .generate_ll1_parsing_table(&sets, ConflictPolicy::KeepFirst)
            .unwrap();
        let sym = |n: &str| g.get_symbol_index(n).unwrap();

        assert_eq!(table.lookup(sym("A"), sym("a")), Some(2));
        assert_eq!(table.conflicts().len(), 1);
        assert_eq!(table.conflicts()[0].second, 3);
    }
}
