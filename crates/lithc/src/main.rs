//! Lithium Compiler - front end for `.li` sources
//!
//! Usage: lithc [OPTIONS] <input>

use anyhow::{Context, Result};
use clap::{Parser as ClapParser, ValueEnum};
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};
use lithium_compiler::driver::Pipeline;
use lithium_compiler::frontend::FrontendConfig;
use std::io;
use std::path::PathBuf;
use std::process;

/// How diagnostics are printed
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Default)]
enum MessageFormat {
    /// Labelled source snippets
    #[default]
    Human,
    /// One `file:line:column: severity: message` entry per diagnostic
    Short,
}

#[derive(ClapParser, Debug)]
#[command(name = "lithc")]
#[command(author = "Lithium Team")]
#[command(version)]
#[command(about = "Lithium Compiler: scans, parses and type-checks Lithium sources", long_about = None)]
struct Args {
    /// Input source file (.li)
    #[arg(required = true)]
    input: PathBuf,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Dump tokens (for debugging)
    #[arg(long)]
    dump_tokens: bool,

    /// Dump AST (for debugging)
    #[arg(long)]
    dump_ast: bool,

    /// Dump global symbols after analysis (for debugging)
    #[arg(long)]
    dump_symbols: bool,

    /// Additional directory searched for `include` files (repeatable)
    #[arg(short = 'I', long = "include-path", value_name = "DIR")]
    include_paths: Vec<PathBuf>,

    /// Additional directory searched for imported modules (repeatable)
    #[arg(short = 'M', long = "module-path", value_name = "DIR")]
    module_paths: Vec<PathBuf>,

    /// Diagnostic output format
    #[arg(long, value_enum, default_value = "human")]
    message_format: MessageFormat,
}

fn main() {
    let args = Args::parse();

    match run(&args) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("error: {e:#}");
            process::exit(1);
        }
    }
}

/// Compile the input; `Ok(false)` means diagnostics reached error severity
fn run(args: &Args) -> Result<bool> {
    if args.verbose {
        eprintln!("Lithium Compiler");
        eprintln!("Compiling {}", args.input.display());
    }

    let config = FrontendConfig {
        dump_tokens: args.dump_tokens,
        dump_ast: args.dump_ast,
        dump_symbols: args.dump_symbols,
        verbose: args.verbose,
        include_paths: args.include_paths.clone(),
        module_paths: args.module_paths.clone(),
    };

    let pipeline = Pipeline::new(config);
    let output = pipeline.compile_file(&args.input);

    match args.message_format {
        MessageFormat::Human => {
            let mut stderr = StandardStream::stderr(ColorChoice::Auto);
            output
                .reporter
                .emit(&mut stderr)
                .context("failed to render diagnostics")?;
        }
        MessageFormat::Short => {
            output
                .reporter
                .emit_short(&mut io::stderr().lock())
                .context("failed to write diagnostics")?;
        }
    }

    let errors = output.reporter.error_count();
    let warnings = output.reporter.diagnostics().len() - errors;
    if !output.succeeded() {
        eprintln!(
            "{}: {errors} error(s), {warnings} warning(s)",
            args.input.display()
        );
        return Ok(false);
    }

    if args.verbose {
        eprintln!(
            "Successfully checked {} ({warnings} warning(s), {} include(s), {} import(s))",
            args.input.display(),
            output.includes.len(),
            output.imports.len()
        );
    }

    Ok(true)
}
