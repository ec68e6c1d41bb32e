use std::collections::HashMap;

use crate::error::GrammarError;

use super::{ProductionId, SymbolId, END_MARK, END_MARK_ID, EPSILON, EPSILON_ALIAS, EPSILON_ID};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonTerminal {
    /// Dense position among the non-terminals, used to index every
    /// per-non-terminal table.
    pub index: usize,
    pub name: String,
    /// Positions in `Grammar::productions` of the productions whose left
    /// side is this non-terminal.
    pub productions: Vec<usize>,
}

impl NonTerminal {
    pub fn new(index: usize, name: String) -> Self {
        Self {
            index,
            name,
            productions: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Symbol {
    Epsilon,
    EndMarker,
    Terminal(String),
    NonTerminal(NonTerminal),
}

impl Symbol {
    pub fn non_terminal(&self) -> Option<&NonTerminal> {
        match self {
            Symbol::NonTerminal(e) => Some(e),
            _ => None,
        }
    }

    pub fn mut_non_terminal(&mut self) -> Option<&mut NonTerminal> {
        match self {
            Symbol::NonTerminal(e) => Some(e),
            _ => None,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Symbol::Epsilon => EPSILON,
            Symbol::EndMarker => END_MARK,
            Symbol::Terminal(name) => name.as_str(),
            Symbol::NonTerminal(nt) => nt.name.as_str(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Production {
    pub id: ProductionId,
    pub lhs: SymbolId,
    /// Dense index of `lhs` among the non-terminals.
    pub lhs_index: usize,
    /// Never empty: the empty right side is stored as the single Epsilon.
    pub rhs: Vec<SymbolId>,
}

impl Production {
    pub fn is_epsilon(&self) -> bool {
        self.rhs == [EPSILON_ID]
    }
}

/// Symbol universe plus the ordered productions over it.
///
/// Symbol 0 is always Epsilon and symbol 1 the end marker; terminals and
/// non-terminals follow in registration order.
#[derive(Debug, Clone)]
pub struct Grammar {
    symbols: Vec<Symbol>,
    symbol_table: HashMap<String, SymbolId>,
    terminals: Vec<SymbolId>,
    non_terminals: Vec<SymbolId>,
    productions: Vec<Production>,
    production_table: HashMap<ProductionId, usize>,
    start_symbol: Option<SymbolId>,
}

impl Default for Grammar {
    fn default() -> Self {
        Self::new()
    }
}

impl Grammar {
    pub fn new() -> Self {
        let mut symbol_table = HashMap::new();
        symbol_table.insert(EPSILON.to_string(), EPSILON_ID);
        symbol_table.insert(EPSILON_ALIAS.to_string(), EPSILON_ID);
        symbol_table.insert(END_MARK.to_string(), END_MARK_ID);

        Self {
            symbols: vec![Symbol::Epsilon, Symbol::EndMarker],
            symbol_table,
            terminals: Vec::new(),
            non_terminals: Vec::new(),
            productions: Vec::new(),
            production_table: HashMap::new(),
            start_symbol: None,
        }
    }

    fn check_new_name(&self, name: &str) -> Result<(), GrammarError> {
        match self.symbol_table.get(name) {
            Some(&idx) if idx == EPSILON_ID || idx == END_MARK_ID => {
                Err(GrammarError::ReservedSymbol(name.to_string()))
            }
            Some(_) => Err(GrammarError::DuplicateSymbol(name.to_string())),
            None if name.trim().is_empty() || name.split_whitespace().count() != 1 => {
                Err(GrammarError::Definition(format!(
                    "\"{}\" is not a valid symbol name",
                    name
                )))
            }
            None => Ok(()),
        }
    }

    pub fn add_terminal(&mut self, name: &str) -> Result<SymbolId, GrammarError> {
        self.check_new_name(name)?;
        let idx = self.symbols.len();
        self.symbols.push(Symbol::Terminal(name.to_string()));
        self.symbol_table.insert(name.to_string(), idx);
        self.terminals.push(idx);
        Ok(idx)
    }

    /// Registers a non-terminal. The first one registered becomes the start
    /// symbol unless `set_start` says otherwise.
    pub fn add_non_terminal(&mut self, name: &str) -> Result<SymbolId, GrammarError> {
        self.check_new_name(name)?;
        let idx = self.symbols.len();
        self.symbols.push(Symbol::NonTerminal(NonTerminal::new(
            self.non_terminals.len(),
            name.to_string(),
        )));
        self.symbol_table.insert(name.to_string(), idx);
        self.non_terminals.push(idx);
        if self.start_symbol.is_none() {
            self.start_symbol = Some(idx);
        }
        Ok(idx)
    }

    pub fn add_production(
        &mut self,
        id: ProductionId,
        lhs: SymbolId,
        mut rhs: Vec<SymbolId>,
    ) -> Result<(), GrammarError> {
        if self.production_table.contains_key(&id) {
            return Err(GrammarError::DuplicateProductionId(id));
        }
        let lhs_index = match self.symbols.get(lhs) {
            Some(Symbol::NonTerminal(nt)) => nt.index,
            Some(s) => {
                return Err(GrammarError::LeftNotNonTerminal {
                    production: id,
                    name: s.name().to_string(),
                })
            }
            None => {
                return Err(GrammarError::UnknownSymbol {
                    production: id,
                    name: format!("#{}", lhs),
                })
            }
        };
        if let Some(&unknown) = rhs.iter().find(|&&s| s >= self.symbols.len()) {
            return Err(GrammarError::UnknownSymbol {
                production: id,
                name: format!("#{}", unknown),
            });
        }
        if rhs.contains(&END_MARK_ID) {
            return Err(GrammarError::MalformedProduction {
                production: id,
                reason: format!("the end marker {} cannot appear on a right side", END_MARK),
            });
        }
        if rhs.len() > 1 && rhs.contains(&EPSILON_ID) {
            return Err(GrammarError::MalformedProduction {
                production: id,
                reason: format!("{} must be the only symbol of its right side", EPSILON),
            });
        }
        if rhs.is_empty() {
            rhs.push(EPSILON_ID);
        }

        let position = self.productions.len();
        self.productions.push(Production {
            id,
            lhs,
            lhs_index,
            rhs,
        });
        self.production_table.insert(id, position);
        if let Some(nt) = self.symbols[lhs].mut_non_terminal() {
            nt.productions.push(position);
        }
        Ok(())
    }

    pub fn set_start(&mut self, name: &str) -> Result<(), GrammarError> {
        match self.get_symbol_index(name) {
            Some(idx) if self.symbols[idx].non_terminal().is_some() => {
                self.start_symbol = Some(idx);
                Ok(())
            }
            _ => Err(GrammarError::Definition(format!(
                "start symbol \"{}\" is not a non-terminal",
                name
            ))),
        }
    }

    pub fn start_symbol(&self) -> Option<SymbolId> {
        self.start_symbol
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn symbol(&self, index: SymbolId) -> &Symbol {
        &self.symbols[index]
    }

    pub fn get_symbol_index(&self, name: &str) -> Option<SymbolId> {
        self.symbol_table.get(name).cloned()
    }

    pub fn get_symbol_name(&self, index: SymbolId) -> &str {
        self.symbols[index].name()
    }

    pub fn is_terminal(&self, name: &str) -> bool {
        matches!(
            self.get_symbol_index(name).map(|i| &self.symbols[i]),
            Some(Symbol::Terminal(_))
        )
    }

    pub fn is_non_terminal(&self, name: &str) -> bool {
        matches!(
            self.get_symbol_index(name).map(|i| &self.symbols[i]),
            Some(Symbol::NonTerminal(_))
        )
    }

    /// Stable dense index of a non-terminal, used for table rows.
    pub fn index_of(&self, non_terminal: &str) -> Option<usize> {
        self.get_symbol_index(non_terminal)
            .and_then(|i| self.symbols[i].non_terminal())
            .map(|nt| nt.index)
    }

    pub fn non_terminal(&self, index: SymbolId) -> Option<&NonTerminal> {
        self.symbols.get(index).and_then(|s| s.non_terminal())
    }

    /// Symbol ids of the terminals, in registration order.
    pub fn terminals(&self) -> &[SymbolId] {
        &self.terminals
    }

    /// Symbol ids of the non-terminals, ordered by their dense index.
    pub fn non_terminals(&self) -> &[SymbolId] {
        &self.non_terminals
    }

    pub fn terminal_iter(&self) -> impl Iterator<Item = &str> {
        self.terminals.iter().map(|&t| self.get_symbol_name(t))
    }

    pub fn non_terminal_iter(&self) -> impl Iterator<Item = &NonTerminal> {
        self.non_terminals
            .iter()
            .filter_map(|&idx| self.symbols[idx].non_terminal())
    }

    pub fn productions(&self) -> &[Production] {
        &self.productions
    }

    pub fn production(&self, id: ProductionId) -> Option<&Production> {
        self.production_table
            .get(&id)
            .map(|&position| &self.productions[position])
    }

    pub fn productions_of<'a>(
        &'a self,
        non_terminal: &'a NonTerminal,
    ) -> impl Iterator<Item = &'a Production> + 'a {
        non_terminal
            .productions
            .iter()
            .map(move |&position| &self.productions[position])
    }

    pub fn production_to_vec_str(&self, production: &Production) -> Vec<&str> {
        production
            .rhs
            .iter()
            .map(|&s| self.get_symbol_name(s))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinels_are_registered_first() {
        let g = Grammar::new();
        assert_eq!(g.get_symbol_index(EPSILON), Some(EPSILON_ID));
        assert_eq!(g.get_symbol_index(EPSILON_ALIAS), Some(EPSILON_ID));
        assert_eq!(g.get_symbol_index(END_MARK), Some(END_MARK_ID));
        assert!(!g.is_terminal(END_MARK));
        assert!(!g.is_non_terminal(EPSILON));
    }

    #[test]
    fn registration_order_fixes_indices() {
        let mut g = Grammar::new();
        let a = g.add_terminal("a").unwrap();
        let s = g.add_non_terminal("S").unwrap();
        let t = g.add_non_terminal("T").unwrap();
        assert_eq!(g.index_of("S"), Some(0));
        assert_eq!(g.index_of("T"), Some(1));
        assert_eq!(g.index_of("a"), None);
        assert_eq!(g.non_terminals(), &[s, t]);
        assert_eq!(g.terminals(), &[a]);
        assert_eq!(g.start_symbol(), Some(s));
    }

    #[test]
    fn duplicate_and_reserved_names_are_rejected() {
        let mut g = Grammar::new();
        g.add_terminal("a").unwrap();
        assert_eq!(
            g.add_terminal("a"),
            Err(GrammarError::DuplicateSymbol("a".to_string()))
        );
        assert_eq!(
            g.add_non_terminal("a"),
            Err(GrammarError::DuplicateSymbol("a".to_string()))
        );
        assert_eq!(
            g.add_terminal(END_MARK),
            Err(GrammarError::ReservedSymbol(END_MARK.to_string()))
        );
        assert_eq!(
            g.add_non_terminal(EPSILON),
            Err(GrammarError::ReservedSymbol(EPSILON.to_string()))
        );
    }

    #[test]
    fn empty_right_side_becomes_epsilon() {
        let mut g = Grammar::new();
        let s = g.add_non_terminal("S").unwrap();
        g.add_production(7, s, vec![]).unwrap();
        let p = g.production(7).unwrap();
        assert!(p.is_epsilon());
        assert_eq!(p.lhs_index, 0);
    }

    #[test]
    fn malformed_productions_are_rejected() {
        let mut g = Grammar::new();
        let a = g.add_terminal("a").unwrap();
        let s = g.add_non_terminal("S").unwrap();
        g.add_production(1, s, vec![a]).unwrap();

        assert_eq!(
            g.add_production(1, s, vec![a]),
            Err(GrammarError::DuplicateProductionId(1))
        );
        assert!(matches!(
            g.add_production(2, a, vec![a]),
            Err(GrammarError::LeftNotNonTerminal { production: 2, .. })
        ));
        assert!(matches!(
            g.add_production(3, s, vec![a, EPSILON_ID]),
            Err(GrammarError::MalformedProduction { production: 3, .. })
        ));
        assert!(matches!(
            g.add_production(4, s, vec![END_MARK_ID]),
            Err(GrammarError::MalformedProduction { production: 4, .. })
        ));
        assert!(matches!(
            g.add_production(5, s, vec![99]),
            Err(GrammarError::UnknownSymbol { production: 5, .. })
        ));
        assert_eq!(g.productions().len(), 1);
    }
}
