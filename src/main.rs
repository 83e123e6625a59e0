//! condp - command line front end for the conditional command parser

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};

use cond_parser::feedback::Report;
use cond_parser::frontend::lexer::tokenize;
use cond_parser::frontend::semantic::SemanticType;
use cond_parser::frontend::symbols::Symbol;
use cond_parser::grammar::FirstFollow;
use cond_parser::{render, render_typed, Pipeline, Position};

/// Conditional command parser
#[derive(Parser, Debug)]
#[command(name = "condp")]
#[command(author = "Z1529")]
#[command(version = "0.1.0")]
#[command(about = "Parse and type-check conditional commands: if (E) S else S | id = E")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    input: InputArgs,

    /// Pre-declare a global as NAME:TYPE (TYPE is number, float, string or char)
    #[arg(long = "declare", value_name = "NAME:TYPE", value_parser = parse_declaration)]
    declarations: Vec<Symbol>,

    /// Emit the full report as JSON
    #[arg(long)]
    json: bool,

    /// Show inferred types in the tree
    #[arg(long)]
    types: bool,
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Input source file ("-" or omitted reads stdin)
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Inline source instead of a file
    #[arg(short = 'e', long = "expr", value_name = "SOURCE", conflicts_with = "file")]
    expr: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the token stream
    Tokens {
        #[command(flatten)]
        input: InputArgs,
    },
    /// Print the FIRST and FOLLOW sets of the grammar
    Sets {
        /// Emit the sets as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match &cli.command {
        Some(Commands::Tokens { input }) => dump_tokens(input),
        Some(Commands::Sets { json }) => print_sets(*json),
        None => check_input(&cli),
    };

    match result {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("error: {:#}", e);
            process::exit(2);
        }
    }
}

fn parse_declaration(arg: &str) -> std::result::Result<Symbol, String> {
    let (name, ty) = arg
        .split_once(':')
        .ok_or_else(|| format!("expected NAME:TYPE, got '{}'", arg))?;
    let name = name.trim();
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(format!("invalid identifier '{}'", name));
    }
    let ty = SemanticType::from_name(ty.trim())
        .ok_or_else(|| format!("unknown type '{}' (expected number, float, string or char)", ty))?;
    Ok(Symbol::new(name, ty, Position::start()))
}

/// Returns the source text and a name describing where it came from
fn read_source(input: &InputArgs) -> Result<(String, String)> {
    if let Some(expr) = &input.expr {
        return Ok((expr.clone(), "<expr>".to_string()));
    }
    match &input.file {
        Some(path) if path.as_os_str() != "-" => {
            let source = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            Ok((source, path.display().to_string()))
        }
        _ => {
            let mut source = String::new();
            io::stdin()
                .read_to_string(&mut source)
                .context("failed to read stdin")?;
            Ok((source, "<stdin>".to_string()))
        }
    }
}

/// Run the whole pipeline. Returns whether the input was error-free.
fn check_input(cli: &Cli) -> Result<bool> {
    let (source, name) = read_source(&cli.input)?;
    let pipeline = Pipeline::with_globals(cli.declarations.clone());
    let response = pipeline.run(&source);

    if cli.json {
        println!("{}", Report::from_response(name, &response).to_json());
        return Ok(response.is_success());
    }

    let tree = if cli.types {
        render_typed(response.ast.as_ref(), &response.types)
    } else {
        render(response.ast.as_ref())
    };
    print!("{}", tree);

    if response.is_success() {
        println!("✅ No errors found");
    } else {
        for message in &response.errors {
            eprintln!("{}", message);
        }
    }
    Ok(response.is_success())
}

fn dump_tokens(input: &InputArgs) -> Result<bool> {
    let (source, name) = read_source(input)?;
    let tokens = match tokenize(&source) {
        Ok(tokens) => tokens,
        Err(e) => bail!("{}: Lexical error: {}", name, e),
    };
    for token in &tokens {
        println!("{:>4}:{:<4} {:<7} {}", token.pos.line, token.pos.column, token.kind.as_str(), token.lexeme);
    }
    Ok(true)
}

fn print_sets(json: bool) -> Result<bool> {
    let sets = FirstFollow::shared();
    if json {
        let text = serde_json::to_string_pretty(sets).context("failed to serialize sets")?;
        println!("{}", text);
    } else {
        print!("{}", sets.render_table());
    }
    Ok(true)
}
