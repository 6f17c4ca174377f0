//! Caju Compiler
//!
//! Reads a Caju parse tree, reports semantic diagnostics and writes the
//! equivalent C program.

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::Context;
use clap::{Parser, Subcommand};
use log::debug;

use cajuc::driver;
use cajuc::feedback::AnalysisReport;
use cajuc::utils::{Error, ErrorCategory, SemanticError};

/// Caju Compiler
#[derive(Parser, Debug)]
#[command(name = "cajuc")]
#[command(version = "0.1.0")]
#[command(about = "Caju compiler - semantic analysis and C code generation")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input parse tree (.caju, .cj, optionally followed by .json)
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output file
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Do not echo the generated code
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compile a source file to C
    Build {
        /// Input source file
        input: PathBuf,

        /// Output file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Do not echo the generated code
        #[arg(short, long)]
        quiet: bool,
    },
    /// Check a source file for errors
    Check {
        /// Input source file
        input: PathBuf,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print version information
    Version,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Build {
            input,
            output,
            quiet,
        }) => compile_file(&input, output, quiet),
        Some(Commands::Check { input, json }) => check_file(&input, json),
        Some(Commands::Version) => {
            println!("cajuc 0.1.0");
            println!("Caju Compiler");
            println!("License: Apache-2.0");
            Ok(true)
        }
        None => match cli.input {
            Some(input) => compile_file(&input, cli.output, cli.quiet),
            None => {
                eprintln!("Error: No input file specified");
                eprintln!("Usage: cajuc <FILE> or cajuc build <FILE>");
                process::exit(1);
            }
        },
    };

    match result {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(err) => {
            eprintln!("{}: {:#}", category_of(&err), err);
            process::exit(1);
        }
    }
}

/// Analyze and generate. Diagnostics never stop the output from being written.
fn compile_file(input: &Path, output: Option<PathBuf>, quiet: bool) -> anyhow::Result<bool> {
    let program = driver::load_program(input)?;
    let out_path = match output {
        Some(path) => path,
        None => driver::default_output_path(input)?,
    };
    debug!("compiling {} -> {}", input.display(), out_path.display());

    let compilation = driver::compile(&program);
    print_diagnostics(&compilation.diagnostics);

    fs::write(&out_path, &compilation.generated)
        .with_context(|| format!("cannot write '{}'", out_path.display()))?;
    if !quiet {
        print!("{}", compilation.generated);
    }
    eprintln!("Generated C code: {}", out_path.display());

    Ok(true)
}

/// Analyze only; false when any diagnostic was produced
fn check_file(input: &Path, json: bool) -> anyhow::Result<bool> {
    let program = driver::load_program(input)?;
    let diagnostics = driver::check(&program);

    if json {
        let report = AnalysisReport::new(&input.to_string_lossy(), &diagnostics);
        println!("{}", report.to_json()?);
    } else {
        print_diagnostics(&diagnostics);
    }

    Ok(diagnostics.is_empty())
}

fn print_diagnostics(diagnostics: &[SemanticError]) {
    if diagnostics.is_empty() {
        eprintln!("semantic analysis finished without errors");
        return;
    }
    eprintln!("semantic analysis found {} error(s):", diagnostics.len());
    for diagnostic in diagnostics {
        eprintln!("- {}", diagnostic);
    }
}

fn category_of(err: &anyhow::Error) -> ErrorCategory {
    if let Some(err) = err.downcast_ref::<Error>() {
        return err.category();
    }
    if err.chain().any(|cause| cause.is::<std::io::Error>()) {
        return ErrorCategory::FileAccess;
    }
    ErrorCategory::Unclassified
}
