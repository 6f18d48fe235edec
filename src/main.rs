use clap::{ArgAction, Parser, Subcommand};
use std::path::{Path, PathBuf};

use jolang::config::Config;
use jolang::diagnostics::{render_error, Error};
use jolang::interpreter::builtins::StdHost;
use jolang::preprocessor::MacroTable;

#[derive(Parser)]
#[command(name = "jolang", version, about = "The JoLang interpreter")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a jolang.toml (skips discovery)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Maximum nested call depth before RecursionError
    #[arg(long, global = true)]
    max_depth: Option<usize>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a JoLang program
    Run {
        /// Source file path
        file: PathBuf,
    },
    /// Start the interactive shell
    Repl,
    /// Print the macro-expanded token stream of a file
    Tokens {
        /// Source file path
        file: PathBuf,
    },
    /// Print the parsed AST of a file
    Ast {
        /// Source file path
        file: PathBuf,
        /// Emit JSON instead of debug output
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_ansi(false)
        .init();
}

fn read_source(file: &Path) -> String {
    match std::fs::read_to_string(file) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("error: cannot read {}: {e}", file.display());
            std::process::exit(1);
        }
    }
}

fn load_config(explicit: Option<&Path>, file: Option<&Path>) -> Config {
    let start = match file.and_then(Path::parent) {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    };
    match Config::discover(explicit, &start) {
        Ok(config) => config,
        Err(err) => {
            render_error("", "jolang.toml", &err);
            std::process::exit(1);
        }
    }
}

fn fail(source: &str, file: &Path, err: Error) -> ! {
    render_error(source, &file.to_string_lossy(), &err);
    std::process::exit(1);
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let command = cli.command.unwrap_or(Commands::Repl);
    let file = match &command {
        Commands::Run { file } | Commands::Tokens { file } | Commands::Ast { file, .. } => Some(file.clone()),
        Commands::Repl => None,
    };
    let mut config = load_config(cli.config.as_deref(), file.as_deref());
    if let Some(depth) = cli.max_depth {
        config.interpreter.max_call_depth = depth.max(1);
    }

    match command {
        Commands::Run { file } => {
            let source = read_source(&file);
            let name = file.to_string_lossy();
            if let Err(err) = jolang::run_source(&name, &source, Box::new(StdHost), &config) {
                fail(&source, &file, err);
            }
        }
        Commands::Repl => {
            let mut session = jolang::Session::with_config(Box::new(StdHost), &config);
            if let Err(e) = jolang::repl::run(&mut session, &config.repl) {
                eprintln!("error: {e}");
                std::process::exit(1);
            }
        }
        Commands::Tokens { file } => {
            let source = read_source(&file);
            let mut macros = MacroTable::new();
            match jolang::expand_tokens(&source, &mut macros) {
                Ok(tokens) => {
                    for tok in tokens {
                        println!("{}:{}\t{}\t{}", tok.span.line, tok.span.column, tok.kind, tok.lexeme());
                    }
                }
                Err(err) => fail(&source, &file, err.into()),
            }
        }
        Commands::Ast { file, json } => {
            let source = read_source(&file);
            let mut macros = MacroTable::new();
            let program = match jolang::parse_source(&source, &mut macros) {
                Ok(program) => program,
                Err(err) => fail(&source, &file, err.into()),
            };
            if json {
                match serde_json::to_string_pretty(&program) {
                    Ok(text) => println!("{text}"),
                    Err(e) => {
                        eprintln!("error: cannot serialize AST: {e}");
                        std::process::exit(1);
                    }
                }
            } else {
                println!("{program:#?}");
            }
        }
    }
}
