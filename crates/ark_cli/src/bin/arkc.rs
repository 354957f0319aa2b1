//! `arkc` entry point.

use std::path::PathBuf;
use std::process::ExitCode;

use ark_cli::commands::{check_file, compile_file, config_for, disasm_file};
use ark_cli::{CliError, Repl};
use ark_language::CompilerConfig;
use clap::{Parser, Subcommand};
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

#[derive(Parser)]
#[command(name = "arkc", version, about = "Bytecode compiler for the Ark Lisp dialect")]
struct Cli {
    /// Increase log verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Maximum list nesting depth
    #[arg(long, global = true)]
    max_depth: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a source file into a bytecode image
    Compile {
        /// Source file
        input: PathBuf,
        /// Output path (defaults to the input with an .arkc extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print a human-readable listing of a bytecode image
    Disasm {
        /// Image file
        file: PathBuf,
    },
    /// Parse and generate code without writing anything
    Check {
        /// Source file
        input: PathBuf,
    },
    /// Start an interactive session that shows the bytecode of each input
    Repl,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError: {e}\x1b[0m");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .init();
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Compile { input, output } => {
            let config = config_for(&input, cli.max_depth);
            let written = compile_file(&input, output.as_deref(), config)?;
            println!("{}", written.display());
        }
        Commands::Disasm { file } => {
            print!("{}", disasm_file(&file)?);
        }
        Commands::Check { input } => {
            let program = check_file(&input, config_for(&input, cli.max_depth))?;
            println!(
                "{}: ok ({} symbols, {} constants, {} pages, {} instructions)",
                input.display(),
                program.symbols.len(),
                program.constants.len(),
                program.pages.len(),
                program.instruction_count()
            );
        }
        Commands::Repl => {
            let mut config = CompilerConfig::default().with_source_name("<repl>");
            if let Some(depth) = cli.max_depth {
                config = config.with_max_depth(depth);
            }
            Repl::new()?.with_config(config).run()?;
        }
    }
    Ok(())
}
