use std::{
    fs,
    io::{self, Read},
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use ll1_engine::{ConflictPolicy, Engine, Grammar, TokenStream};

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Report {
    /// Productions with their ids
    Prod,
    /// Nullable, first and follow sets
    Sets,
    /// LL(1) parsing table
    Table,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Plain,
    Latex,
    Json,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Conflicts {
    /// Refuse grammars that are not LL(1)
    Reject,
    /// Let the first production claiming a cell win
    KeepFirst,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum TreeStyle {
    Table,
    Visual,
}

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Grammar file: `.json` definitions or the `A -> x | y` text format ("-" reads stdin)
    grammar: PathBuf,

    /// Token file, one `category [literal]` per line (`.json` for a token array)
    tokens: Option<PathBuf>,

    /// Reports to print before parsing
    #[arg(short, long, value_enum, value_delimiter = ',')]
    show: Vec<Report>,

    #[arg(short, long, value_enum, default_value = "plain")]
    format: OutputFormat,

    #[arg(long, value_enum, default_value = "reject")]
    conflicts: Conflicts,

    /// How a plain-format parse tree is printed
    #[arg(long, value_enum, default_value = "table")]
    tree: TreeStyle,

    /// Print every automaton step to stderr
    #[arg(long)]
    trace: bool,
}

fn is_json(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == "json")
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut input = String::new();
        io::stdin()
            .read_to_string(&mut input)
            .context("Failed to read standard input")?;
        Ok(input)
    } else {
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
    }
}

fn load_grammar(path: &Path) -> Result<Grammar> {
    let input = read_input(path)?;
    let grammar = if is_json(path) {
        Grammar::from_json(&input)
    } else {
        Grammar::parse(&input)
    };
    grammar.with_context(|| format!("Invalid grammar in {}", path.display()))
}

fn load_tokens(path: &Path) -> Result<TokenStream> {
    let input = read_input(path)?;
    if is_json(path) {
        TokenStream::from_json(&input).with_context(|| format!("Invalid tokens in {}", path.display()))
    } else {
        Ok(TokenStream::from_lines(&input))
    }
}

fn print_reports(engine: &Engine, cli: &Cli) {
    let g = engine.grammar();
    for report in &cli.show {
        let text = match report {
            Report::Prod => {
                let t = g.to_production_output_vec();
                match cli.format {
                    OutputFormat::Plain => t.to_plaintext(),
                    OutputFormat::Latex => t.to_latex(&g.terminal_set()),
                    OutputFormat::Json => t.to_json(),
                }
            }
            Report::Sets => {
                let t = g.to_non_terminal_output_vec(engine.sets());
                match cli.format {
                    OutputFormat::Plain => t.to_plaintext(),
                    OutputFormat::Latex => t.to_latex(),
                    OutputFormat::Json => t.to_json(),
                }
            }
            Report::Table => {
                let t = g.to_ll1_parsing_table_output(engine.table());
                match cli.format {
                    OutputFormat::Plain => t.to_plaintext(),
                    OutputFormat::Latex => t.to_latex(),
                    OutputFormat::Json => t.to_json(),
                }
            }
        };
        println!("{}", text);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let grammar = load_grammar(&cli.grammar)?;
    let policy = match cli.conflicts {
        Conflicts::Reject => ConflictPolicy::Reject,
        Conflicts::KeepFirst => ConflictPolicy::KeepFirst,
    };
    let engine = Engine::new(grammar, policy)?;
    for conflict in engine.table().conflicts() {
        eprintln!("warning: {}", conflict);
    }

    print_reports(&engine, cli);

    let Some(tokens_path) = &cli.tokens else {
        return Ok(());
    };
    let tokens = load_tokens(tokens_path)?;
    let mut derivation = engine.parser().derivation(&tokens)?;
    if cli.trace {
        let rows = derivation.run_traced();
        eprintln!("{}", engine.grammar().trace_to_plaintext(&rows));
    }
    let sequence = derivation.productions();
    let tree = derivation.finish()?;

    let text = match (cli.format, cli.tree) {
        (OutputFormat::Json, _) => tree.to_json(),
        (OutputFormat::Latex, _) => tree.to_latex(),
        (OutputFormat::Plain, TreeStyle::Table) => tree.to_plaintext(),
        (OutputFormat::Plain, TreeStyle::Visual) => tree.to_visual(),
    };
    if cli.format == OutputFormat::Plain {
        println!("Parsing successful: {} tokens, {} nodes", tokens.len(), tree.len());
        let sequence: Vec<String> = sequence.iter().map(|id| id.to_string()).collect();
        println!("Sequence: {}", sequence.join(" "));
    }
    println!("{}", text);
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
