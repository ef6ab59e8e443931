use clap::{CommandFactory, Parser as ClapParser, Subcommand};
use clap_complete::Shell;
use sorth::ast::{Expr, Scope};
use sorth::parser::Parser;
use sorth::Program;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, ClapParser)]
#[command(author, version, about)]
struct Cli {
    /// Increase log output (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parse and type-check a source file
    Check {
        input: PathBuf,

        /// Print every function's signature
        #[arg(short, long)]
        signatures: bool,
    },

    /// Print the typed AST of a source file
    Ast { input: PathBuf },

    /// Generate shell completions
    Completions { shell: Shell },
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Check { input, signatures } => {
            let program = load(&input)?;
            println!(
                "{}: ok, {} function{}",
                input.display(),
                program.len(),
                if program.len() == 1 { "" } else { "s" }
            );
            if signatures {
                for function in program.sorted() {
                    println!("  {} ( {} )", function.name, function.signature);
                }
            }
        }
        Command::Ast { input } => {
            let program = load(&input)?;
            for function in program.sorted() {
                println!("func {} ( {} )", function.name, function.signature);
                print_scope(&function.body, 1);
            }
        }
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
        }
    }

    Ok(())
}

/// Read and parse a file, exiting with status 1 on a parse error
fn load(path: &Path) -> Result<Program, Box<dyn std::error::Error>> {
    let source = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;

    info!(file = %path.display(), bytes = source.len(), "parsing");
    let filename = path.display().to_string();
    let mut parser = Parser::new_with_filename(&source, &filename);
    match parser.parse() {
        Ok(program) => Ok(program),
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}

fn print_scope(scope: &Scope, depth: usize) {
    let indent = "  ".repeat(depth);
    println!("{}{{ ( {} )", indent, scope.signature);
    for expr in &scope.exprs {
        print_expr(expr, depth + 1);
    }
    println!("{}}}", indent);
}

fn print_expr(expr: &Expr, depth: usize) {
    let indent = "  ".repeat(depth);
    match expr {
        Expr::Scope(scope) => print_scope(scope, depth),
        Expr::Conditional(cond) => {
            println!("{}if ( {} )", indent, cond.signature);
            for (i, branch) in cond.branches().enumerate() {
                println!("{}{}", indent, if i == 0 { "cond" } else { "elif" });
                print_scope(&branch.condition, depth + 1);
                print_scope(&branch.body, depth + 1);
            }
            println!("{}else", indent);
            print_scope(&cond.else_body, depth + 1);
        }
        Expr::Loop(lp) => {
            println!("{}while ( {} )", indent, lp.signature);
            print_scope(&lp.condition, depth + 1);
            print_scope(&lp.body, depth + 1);
        }
        other => println!("{}{}", indent, other),
    }
}
