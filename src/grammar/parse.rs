use crate::error::GrammarError;
use crate::Grammar;

use super::EPSILON_ID;

impl Grammar {
    /// Reads the `A -> x y | z` text format. Left sides are non-terminals,
    /// every other name is a terminal, and production ids count up from 1
    /// in declaration order.
    pub fn parse(grammar: &str) -> Result<Self, GrammarError> {
        let mut g = Self::new();

        let mut raw_productions: Vec<(usize, &str, &str)> = Vec::new();

        let mut previous_left: Option<&str> = None;
        for (i, line) in grammar.lines().enumerate() {
            if line.chars().all(|c| c.is_whitespace()) {
                continue;
            }
            let parts: Vec<&str> = line.split("->").collect();
            if parts.len() > 2 {
                return Err(GrammarError::Syntax {
                    line: i + 1,
                    message: "too many \"->\"".to_string(),
                });
            }
            let (left, rights): (&str, &str) = if parts.len() == 2 {
                let left_str = parts[0].trim();
                if left_str.is_empty() {
                    return Err(GrammarError::Syntax {
                        line: i + 1,
                        message: "empty left side".to_string(),
                    });
                } else if left_str.split_whitespace().count() != 1 {
                    return Err(GrammarError::Syntax {
                        line: i + 1,
                        message: "left side contains whitespace".to_string(),
                    });
                }
                if g.get_symbol_index(left_str).is_none() {
                    g.add_non_terminal(left_str)?;
                }
                if !g.is_non_terminal(left_str) {
                    return Err(GrammarError::ReservedSymbol(left_str.to_string()));
                }
                (left_str, parts[1].trim())
            } else {
                match (previous_left, parts[0].trim().strip_prefix('|')) {
                    (Some(left), Some(rights)) => (left, rights.trim()),
                    (None, _) => {
                        return Err(GrammarError::Syntax {
                            line: i + 1,
                            message: "cannot find left side".to_string(),
                        })
                    }
                    (Some(_), None) => {
                        return Err(GrammarError::Syntax {
                            line: i + 1,
                            message: "expected \"->\" or a leading \"|\"".to_string(),
                        })
                    }
                }
            };

            previous_left = Some(left);

            raw_productions.push((i + 1, left, rights));
        }

        if g.start_symbol().is_none() {
            return Err(GrammarError::NoStartSymbol);
        }

        for (_, _, rights) in &raw_productions {
            for name in rights.split('|').flat_map(|r| r.split_whitespace()) {
                if g.get_symbol_index(name).is_none() {
                    g.add_terminal(name)?;
                }
            }
        }

        let mut id = 0;
        for (line, left, rights) in raw_productions {
            let lhs = g
                .get_symbol_index(left)
                .ok_or_else(|| GrammarError::Syntax {
                    line,
                    message: format!("unknown left side \"{}\"", left),
                })?;
            for right in rights.split('|') {
                id += 1;
                let symbols: Vec<usize> = right
                    .split_whitespace()
                    .filter_map(|s| g.get_symbol_index(s))
                    .collect();
                if symbols.len() > 1 && symbols.contains(&EPSILON_ID) {
                    return Err(GrammarError::Syntax {
                        line,
                        message: "ε must be the only symbol of its alternative".to_string(),
                    });
                }
                g.add_production(id, lhs, symbols)?;
            }
        }

        Ok(g)
    }
}
