// ABOUTME: Command-line driver and REPL for the Toy language interpreter

use clap::Parser;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{Config, Editor};
use std::path::PathBuf;
use std::process;
use toy_lang::config;
use toy_lang::diagnostics::Diagnostic;
use toy_lang::eval::Interpreter;
use toy_lang::extensions::{self, ExtensionRegistry};
use toy_lang::lexer::Lexer;
use toy_lang::parser;
use toy_lang::resolver::Resolver;

/// Toy programming language interpreter
#[derive(Parser, Debug)]
#[command(name = "toy")]
#[command(version = config::VERSION)]
#[command(about = "Toy Programming Language Interpreter")]
struct CliArgs {
    /// Script file to execute (optional - if not provided, starts REPL)
    #[arg(value_name = "FILE")]
    script: Option<PathBuf>,

    /// Enable verbose output (token trace)
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug mode (runs the semantic lint pass)
    #[arg(short, long)]
    debug: bool,

    /// Start interactive REPL after running script
    #[arg(long)]
    interactive: bool,

    /// Show example programs
    #[arg(long)]
    examples: bool,
}

/// One interpreter session: the persistent global environment, the installed
/// extensions, and the driver flags. REPL lines and script runs share it.
struct Session {
    interpreter: Interpreter,
    registry: ExtensionRegistry,
    verbose: bool,
    debug: bool,
}

impl Session {
    fn new(verbose: bool, debug: bool) -> Self {
        let interpreter = Interpreter::new();
        let registry = extensions::register_extensions(interpreter.globals());
        Session {
            interpreter,
            registry,
            verbose,
            debug,
        }
    }

    /// Runs one source unit through the full pipeline and returns the process
    /// exit code: 0 success, 65 lexical/syntactic failure, 70 runtime failure.
    fn run(&mut self, source: &str) -> i32 {
        let (tokens, lex_diagnostics) = Lexer::new(source).scan_tokens();

        if self.verbose {
            println!("Tokens:");
            for token in &tokens {
                println!("  {}", token);
            }
        }

        // The parser still runs over an erroneous token stream so lexical and
        // syntactic diagnostics surface together in one pass.
        let (statements, parse_diagnostics) = parser::parse(tokens);

        if !lex_diagnostics.is_empty() {
            println!("Lexical errors:");
            for diagnostic in &lex_diagnostics {
                println!("  {}", diagnostic);
            }
        }
        if !parse_diagnostics.is_empty() {
            println!("Syntax errors:");
            for diagnostic in &parse_diagnostics {
                println!("  {}", diagnostic);
            }
        }
        if !lex_diagnostics.is_empty() || !parse_diagnostics.is_empty() {
            return 65;
        }

        if self.verbose {
            println!("Syntax tree created successfully");
        }

        if self.debug {
            let warnings = Resolver::new(&self.registry.function_names()).analyze(&statements);
            for warning in &warnings {
                eprintln!("Warning: {}", warning);
            }
        }

        match self.interpreter.interpret(&statements) {
            Ok(()) => 0,
            Err(error) => {
                let diagnostic = Diagnostic::runtime(error.to_string());
                eprintln!("Runtime Error: {}", diagnostic);
                70
            }
        }
    }
}

fn main() {
    let args = CliArgs::parse();

    if args.interactive || args.script.is_none() || args.examples {
        println!("{}", config::BANNER);
    }

    if args.examples {
        show_examples();
        return;
    }

    let mut session = Session::new(args.verbose, args.debug);

    if let Some(path) = &args.script {
        let source = match std::fs::read_to_string(path) {
            Ok(source) => source,
            Err(_) => {
                eprintln!("Error: File '{}' not found.", path.display());
                process::exit(1);
            }
        };

        let code = session.run(&source);
        if code != 0 {
            process::exit(code);
        }
    }

    if args.interactive || args.script.is_none() {
        run_repl(&mut session);
    }
}

fn show_examples() {
    for (title, code) in config::EXAMPLES {
        println!("\n=== {} ===", title);
        println!("{}", code);
    }
}

/// Interactive loop: each line is an independent run against the session's
/// persistent globals, and errors reset per iteration.
fn run_repl(session: &mut Session) {
    println!("{}", config::REPL_GREETING);
    println!("{}", config::REPL_HINT);

    let config = Config::builder().auto_add_history(true).build();
    let mut rl: Editor<(), DefaultHistory> = match Editor::with_config(config) {
        Ok(editor) => editor,
        Err(error) => {
            eprintln!("Failed to initialize REPL: {}", error);
            return;
        }
    };

    let history_file = ".toy_history";
    let _ = rl.load_history(history_file);

    loop {
        match rl.readline("> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }

                match trimmed {
                    "exit" | "quit" => break,
                    "help" => {
                        println!("{}", config::HELP_TEXT);
                        continue;
                    }
                    _ => {}
                }

                session.run(&line);
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("\nExiting REPL.");
                break;
            }
            Err(error) => {
                eprintln!("Error: {}", error);
                break;
            }
        }
    }

    let _ = rl.save_history(history_file);
}
