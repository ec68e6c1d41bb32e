use serde::{Deserialize, Serialize};

use crate::error::GrammarError;

use super::{Grammar, ProductionId, SymbolId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionDefinition {
    pub id: ProductionId,
    pub lhs: String,
    #[serde(default)]
    pub rhs: Vec<String>,
}

/// Explicit-list form of a grammar, as read from a JSON definition file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrammarDefinition {
    pub terminals: Vec<String>,
    pub non_terminals: Vec<String>,
    #[serde(default)]
    pub start: Option<String>,
    pub productions: Vec<ProductionDefinition>,
}

impl Grammar {
    /// Registers terminals, then non-terminals, then the productions in
    /// declaration order. The start symbol is the first non-terminal.
    pub fn load<'a>(
        terminals: &[&str],
        non_terminals: &[&str],
        productions: &[(ProductionId, &'a str, Vec<&'a str>)],
    ) -> Result<Self, GrammarError> {
        let mut g = Self::new();
        for t in terminals {
            g.add_terminal(t)?;
        }
        for nt in non_terminals {
            g.add_non_terminal(nt)?;
        }
        if g.start_symbol().is_none() {
            return Err(GrammarError::NoStartSymbol);
        }
        for (id, lhs, rhs) in productions {
            g.add_named_production(*id, lhs, rhs.iter().cloned())?;
        }
        Ok(g)
    }

    pub fn from_definition(def: &GrammarDefinition) -> Result<Self, GrammarError> {
        let mut g = Self::new();
        for t in &def.terminals {
            g.add_terminal(t)?;
        }
        for nt in &def.non_terminals {
            g.add_non_terminal(nt)?;
        }
        if let Some(start) = &def.start {
            g.set_start(start)?;
        }
        if g.start_symbol().is_none() {
            return Err(GrammarError::NoStartSymbol);
        }
        for p in &def.productions {
            g.add_named_production(p.id, &p.lhs, p.rhs.iter().map(|s| s.as_str()))?;
        }
        Ok(g)
    }

    pub fn from_json(json: &str) -> Result<Self, GrammarError> {
        let def: GrammarDefinition = serde_json::from_str(json)?;
        Self::from_definition(&def)
    }

    pub fn to_definition(&self) -> GrammarDefinition {
        GrammarDefinition {
            terminals: self.terminal_iter().map(|t| t.to_string()).collect(),
            non_terminals: self.non_terminal_iter().map(|nt| nt.name.clone()).collect(),
            start: self
                .start_symbol()
                .map(|s| self.get_symbol_name(s).to_string()),
            productions: self
                .productions()
                .iter()
                .map(|p| ProductionDefinition {
                    id: p.id,
                    lhs: self.get_symbol_name(p.lhs).to_string(),
                    rhs: self
                        .production_to_vec_str(p)
                        .into_iter()
                        .map(|s| s.to_string())
                        .collect(),
                })
                .collect(),
        }
    }

    fn add_named_production<'a>(
        &mut self,
        id: ProductionId,
        lhs: &str,
        rhs: impl Iterator<Item = &'a str>,
    ) -> Result<(), GrammarError> {
        let resolve = |name: &str| -> Result<SymbolId, GrammarError> {
            self.get_symbol_index(name)
                .ok_or_else(|| GrammarError::UnknownSymbol {
                    production: id,
                    name: name.to_string(),
                })
        };
        let left = resolve(lhs)?;
        let right = rhs.map(resolve).collect::<Result<Vec<_>, _>>()?;
        self.add_production(id, left, right)
    }
}

#[cfg(test)]
mod tests {
    use crate::error::GrammarError;
    use crate::grammar::{Grammar, EPSILON};

    #[test]
    fn load_keeps_caller_ids() {
        let g = Grammar::load(
            &["+", "id"],
            &["E", "E'", "T"],
            &[
                (10, "E", vec!["T", "E'"]),
                (20, "E'", vec!["+", "T", "E'"]),
                (30, "E'", vec![EPSILON]),
                (40, "T", vec!["id"]),
            ],
        )
        .unwrap();

        assert_eq!(g.productions().len(), 4);
        assert!(g.production(30).unwrap().is_epsilon());
        assert_eq!(g.production_to_vec_str(g.production(20).unwrap()), vec!["+", "T", "E'"]);
        assert!(g.production(1).is_none());
    }

    #[test]
    fn load_rejects_unknown_symbols() {
        let err = Grammar::load(&["a"], &["S"], &[(1, "S", vec!["b"])]).unwrap_err();
        assert_eq!(
            err,
            GrammarError::UnknownSymbol {
                production: 1,
                name: "b".to_string()
            }
        );
    }

    #[test]
    fn load_requires_a_non_terminal() {
        assert_eq!(
            Grammar::load(&["a"], &[], &[]).unwrap_err(),
            GrammarError::NoStartSymbol
        );
    }

    #[test]
    fn json_definition_with_explicit_start() {
        let g = Grammar::from_json(
            r#"{
                "terminals": ["a"],
                "non_terminals": ["A", "S"],
                "start": "S",
                "productions": [
                    {"id": 1, "lhs": "S", "rhs": ["A"]},
                    {"id": 2, "lhs": "A", "rhs": ["a"]},
                    {"id": 3, "lhs": "A"}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(g.start_symbol(), g.get_symbol_index("S"));
        assert!(g.production(3).unwrap().is_epsilon());

        let def = g.to_definition();
        assert_eq!(def.start.as_deref(), Some("S"));
        assert_eq!(def.productions[2].rhs, vec![EPSILON.to_string()]);
    }

    #[test]
    fn malformed_json_is_a_definition_error() {
        assert!(matches!(
            Grammar::from_json("{\"terminals\": 3}"),
            Err(GrammarError::Definition(_))
        ));
    }
}
