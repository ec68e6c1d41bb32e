use std::collections::HashSet;

use crowbook_text_processing::escape;
use serde::Serialize;

use super::{FirstFollow, Grammar, ParseTable, Production, ProductionId, SymbolSet, EPSILON};
use crate::parser::{Step, TraceRow};

#[derive(Debug, Clone, Serialize)]
pub struct ProductionOutput<'a> {
    pub id: ProductionId,
    pub left: &'a str,
    pub right: Vec<&'a str>,
}

impl ProductionOutput<'_> {
    pub fn to_plaintext(&self, left_width: usize) -> String {
        format!(
            "{:>width$} -> {}",
            self.left,
            self.right.join(" "),
            width = left_width
        )
    }

    pub fn to_latex(&self, and_sign: bool, terminal_set: &HashSet<&str>) -> String {
        let left = if and_sign {
            format!("{} & \\rightarrow &", escape::tex(self.left))
        } else {
            format!("{} \\rightarrow ", escape::tex(self.left))
        };
        let right = self
            .right
            .iter()
            .map(|s| {
                if terminal_set.contains(s) {
                    format!("\\text{{{}}}", escape::tex(*s))
                } else {
                    escape::tex(*s).to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(" \\ ");

        (left + &right).replace(EPSILON, "\\epsilon")
    }
}

#[derive(Serialize)]
pub struct ProductionOutputVec<'a> {
    productions: Vec<ProductionOutput<'a>>,
}

impl ProductionOutputVec<'_> {
    pub fn to_plaintext(&self) -> String {
        let left_max_len = self
            .productions
            .iter()
            .map(|p| p.left.chars().count())
            .max()
            .unwrap_or(0);
        let id_max_len = self
            .productions
            .iter()
            .map(|p| p.id.to_string().len())
            .max()
            .unwrap_or(0);
        self.productions
            .iter()
            .map(|p| {
                format!(
                    "{:>width$}: {}",
                    p.id,
                    p.to_plaintext(left_max_len),
                    width = id_max_len
                )
            })
            .collect::<Vec<String>>()
            .join("\n")
    }

    pub fn to_latex(&self, terminal_set: &HashSet<&str>) -> String {
        std::iter::once("\\[\\begin{array}{rcll}".to_string())
            .chain(
                self.productions
                    .iter()
                    .map(|p| format!("({}) & {}", p.id, p.to_latex(true, terminal_set))),
            )
            .chain(std::iter::once("\\end{array}\\]".to_string()))
            .collect::<Vec<String>>()
            .join("\\\\\n")
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

impl Grammar {
    pub fn terminal_set(&self) -> HashSet<&str> {
        self.terminal_iter().collect()
    }

    pub fn to_production_output(&self, production: &Production) -> ProductionOutput<'_> {
        ProductionOutput {
            id: production.id,
            left: self.get_symbol_name(production.lhs),
            right: self.production_to_vec_str(production),
        }
    }

    pub fn to_production_output_vec(&self) -> ProductionOutputVec<'_> {
        ProductionOutputVec {
            productions: self
                .productions()
                .iter()
                .map(|p| self.to_production_output(p))
                .collect(),
        }
    }
}

#[derive(Serialize)]
struct NonTerminalOutput<'a> {
    name: &'a str,
    nullable: bool,
    first: Vec<&'a str>,
    follow: Vec<&'a str>,
}

impl NonTerminalOutput<'_> {
    fn to_plaintext(&self, name_width: usize) -> String {
        format!(
            "{:>width$} | {:>5} | {} | {}",
            self.name,
            self.nullable,
            self.first.join(", "),
            self.follow.join(", "),
            width = name_width
        )
    }

    fn to_latex(&self) -> String {
        fn f(a: &[&str]) -> String {
            a.iter()
                .map(|s| escape::tex(*s))
                .collect::<Vec<_>>()
                .join(r"\ ")
                .replace(EPSILON, r"$\epsilon$")
        }

        format!(
            "{} & {} & {} & {}",
            escape::tex(self.name),
            self.nullable,
            f(&self.first),
            f(&self.follow)
        )
    }
}

#[derive(Serialize)]
pub struct NonTerminalOutputVec<'a> {
    data: Vec<NonTerminalOutput<'a>>,
}

impl NonTerminalOutputVec<'_> {
    pub fn to_plaintext(&self) -> String {
        let width = self
            .data
            .iter()
            .map(|s| s.name.chars().count())
            .max()
            .unwrap_or(0);
        self.data
            .iter()
            .map(|s| s.to_plaintext(width))
            .collect::<Vec<String>>()
            .join("\n")
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    pub fn to_latex(&self) -> String {
        let content = self
            .data
            .iter()
            .map(|e| e.to_latex())
            .collect::<Vec<_>>()
            .join("\\\\\n ");

        "\\begin{tabular}{c|c|c|c}\n".to_string()
            + "Symbol & Nullable & First & Follow\\\\\\hline\n"
            + &content
            + "\\\\\n\\end{tabular}"
    }
}

impl Grammar {
    fn sorted_names(&self, set: &SymbolSet) -> Vec<&str> {
        let mut names: Vec<&str> = set.iter().map(|&s| self.get_symbol_name(s)).collect();
        names.sort();
        names
    }

    pub fn to_non_terminal_output_vec<'a>(&'a self, sets: &FirstFollow) -> NonTerminalOutputVec<'a> {
        let data = self
            .non_terminal_iter()
            .map(|nt| NonTerminalOutput {
                name: nt.name.as_str(),
                nullable: sets.is_nullable(nt.index),
                first: self.sorted_names(sets.first_of(nt.index)),
                follow: self.sorted_names(sets.follow_of(nt.index)),
            })
            .collect();
        NonTerminalOutputVec { data }
    }
}

#[derive(Serialize)]
struct LL1RowOutput<'a> {
    non_terminal: &'a str,
    cells: Vec<Vec<ProductionOutput<'a>>>,
}

#[derive(Serialize)]
pub struct LL1ParsingTableOutput<'a> {
    terminals: Vec<&'a str>,
    rows: Vec<LL1RowOutput<'a>>,
}

impl LL1ParsingTableOutput<'_> {
    pub fn to_plaintext(&self) -> String {
        let mut header: Vec<String> = vec![String::new()];
        header.extend(self.terminals.iter().map(|&t| t.to_string()));
        let mut output: Vec<Vec<String>> = vec![header];
        for row in &self.rows {
            let mut line: Vec<String> = vec![row.non_terminal.to_string()];
            line.extend(row.cells.iter().map(|productions| {
                productions
                    .iter()
                    .map(|p| p.to_plaintext(0))
                    .collect::<Vec<_>>()
                    .join("; ")
            }));
            output.push(line);
        }

        let width: Vec<usize> = (0..output[0].len())
            .map(|j| {
                output
                    .iter()
                    .map(|line| line[j].chars().count())
                    .max()
                    .unwrap_or(0)
            })
            .collect();
        output
            .iter()
            .map(|line| {
                line.iter()
                    .enumerate()
                    .map(|(i, s)| format!("{:>width$}", s, width = width[i]))
                    .collect::<Vec<_>>()
                    .join(" | ")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn to_latex(&self) -> String {
        let mut header: Vec<String> = vec![format!(
            "\\[\\begin{{array}}{{c{}}}\n",
            "|l".repeat(self.terminals.len()),
        )];
        header.extend(
            self.terminals
                .iter()
                .map(|&t| format!("\\text{{{}}}", escape::tex(t))),
        );
        let header = header.join(" & ");

        let terminal_set: HashSet<&str> = self.terminals.iter().cloned().collect();
        let output = self
            .rows
            .iter()
            .map(|row| {
                let mut line: Vec<String> = vec![escape::tex(row.non_terminal).to_string()];
                line.extend(row.cells.iter().map(|productions| {
                    let cell = productions
                        .iter()
                        .map(|p| p.to_latex(false, &terminal_set))
                        .collect::<Vec<_>>()
                        .join("; ");
                    if productions.len() > 1 {
                        format!("{{\\color{{red}}{}}}", cell)
                    } else {
                        cell
                    }
                }));
                line.join(" & ")
            })
            .collect::<Vec<_>>()
            .join("\\\\\n");

        header + "\\\\\\hline\n" + &output + "\n\\end{array}\\]"
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

impl Grammar {
    pub fn to_ll1_parsing_table_output<'a>(&'a self, table: &ParseTable) -> LL1ParsingTableOutput<'a> {
        let terminals = table
            .columns()
            .iter()
            .map(|&t| self.get_symbol_name(t))
            .collect();
        let rows = self
            .non_terminal_iter()
            .map(|nt| LL1RowOutput {
                non_terminal: nt.name.as_str(),
                cells: (0..table.columns().len())
                    .map(|col| {
                        table
                            .candidates(nt.index, col)
                            .iter()
                            .filter_map(|&id| self.production(id))
                            .map(|p| self.to_production_output(p))
                            .collect()
                    })
                    .collect(),
            })
            .collect();
        LL1ParsingTableOutput { terminals, rows }
    }
}

impl Grammar {
    /// `STACK | INPUT | ACTION` listing of a traced derivation.
    pub fn trace_to_plaintext(&self, rows: &[TraceRow]) -> String {
        let lines: Vec<[String; 3]> = rows
            .iter()
            .map(|row| {
                let action = match &row.step {
                    Step::Expand { production, .. } => {
                        let rule = self
                            .production(*production)
                            .map(|p| self.to_production_output(p).to_plaintext(0))
                            .unwrap_or_default();
                        format!("Output Rule {} ({})", production, rule)
                    }
                    Step::Match { literal, .. } => format!("Match '{}'", literal),
                    Step::SkipEpsilon { .. } => format!("Skip {}", EPSILON),
                };
                [row.stack.join(" "), row.input.join(" "), action]
            })
            .collect();

        let width = |column: usize, title: &str| {
            lines
                .iter()
                .map(|line| line[column].chars().count())
                .chain(std::iter::once(title.len()))
                .max()
                .unwrap_or(0)
        };
        let (stack_width, input_width) = (width(0, "STACK"), width(1, "INPUT"));
        let row = |stack: &str, input: &str, action: &str| {
            format!(
                "{:<sw$} | {:<iw$} | {}",
                stack,
                input,
                action,
                sw = stack_width,
                iw = input_width
            )
        };

        let mut output = vec![
            row("STACK", "INPUT", "ACTION"),
            "-".repeat(stack_width + input_width + 16),
        ];
        output.extend(lines.iter().map(|[s, i, a]| row(s, i, a)));
        output.join("\n")
    }
}
