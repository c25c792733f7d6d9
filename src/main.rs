//! Ordlang - CLI entry point
//!
//! Commands:
//! - `ordlang run <program>` - validate against the dictionary and execute
//! - `ordlang check <program>` - show which lines the dictionary accepts
//! - `ordlang value <words>...` - print the lexical value of words

use clap::{Parser, Subcommand};
use ordlang::{lex_value, lex_value_traced, Engine, Loader, Memory, WordDictionary};

/// The word list shipped with the interpreter, used when no `--dictionary`
/// is given.
const DEFAULT_DICTIONARY: &str = include_str!("../resources/dictionary.txt");

#[derive(Parser)]
#[command(name = "ordlang")]
#[command(version = "0.1.0")]
#[command(about = "An interpreter for a word-based esoteric programming language")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a program until it finishes
    Run {
        /// Path to the program file to execute
        program: String,
        /// Path to a word list replacing the built-in dictionary
        #[arg(short, long)]
        dictionary: Option<String>,
        /// Number of cells on the tape
        #[arg(short, long, default_value = "1024")]
        memory_size: usize,
        /// Stop after this many instructions (unlimited if not set)
        #[arg(long)]
        max_steps: Option<u64>,
        /// Trace every decoded line to stderr
        #[arg(long)]
        debug: bool,
        /// Write the final engine state to this file as JSON
        #[arg(long)]
        dump_state: Option<String>,
    },
    /// Check which lines of a program the dictionary accepts
    Check {
        /// Path to the program file to check
        program: String,
        /// Path to a word list replacing the built-in dictionary
        #[arg(short, long)]
        dictionary: Option<String>,
    },
    /// Print the lexical value of words
    Value {
        /// Words to evaluate
        words: Vec<String>,
        /// Show the letter-by-letter calculation
        #[arg(long)]
        debug: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Run {
            program,
            dictionary,
            memory_size,
            max_steps,
            debug,
            dump_state,
        }) => {
            run_program(
                &program,
                dictionary.as_deref(),
                memory_size,
                max_steps,
                debug,
                dump_state.as_deref(),
            );
        }
        Some(Commands::Check { program, dictionary }) => {
            check_program(&program, dictionary.as_deref());
        }
        Some(Commands::Value { words, debug }) => {
            show_values(&words, debug);
        }
        None => {
            println!("Ordlang v0.1.0");
            println!("A word-based esoteric language interpreter");
            println!();
            println!("Use --help for available commands");
            println!();
            demo_lexical_values();
        }
    }
}

fn load_dictionary(path: Option<&str>) -> WordDictionary {
    match path {
        Some(p) => match WordDictionary::load(p) {
            Ok(dict) => dict,
            Err(e) => {
                eprintln!("❌ Failed to load dictionary {}: {}", p, e);
                std::process::exit(1);
            }
        },
        None => WordDictionary::from_text(DEFAULT_DICTIONARY),
    }
}

fn read_source(path: &str) -> String {
    match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("❌ Failed to read {}: {}", path, e);
            std::process::exit(1);
        }
    }
}

fn run_program(
    path: &str,
    dictionary: Option<&str>,
    memory_size: usize,
    max_steps: Option<u64>,
    debug: bool,
    dump_state: Option<&str>,
) {
    if memory_size == 0 {
        eprintln!("❌ Memory size must be at least 1");
        std::process::exit(1);
    }

    let dict = load_dictionary(dictionary);
    let source = read_source(path);
    let (program, dropped) = Loader::new(&dict).load_traced(&source);

    if debug {
        for d in &dropped {
            eprintln!(
                "dropped line {}: {:?} (unknown word {:?})",
                d.line_number, d.text, d.unknown_word
            );
        }
        eprintln!("loaded {} line(s), dropped {}", program.len(), dropped.len());
    }

    let mut engine = Engine::with_memory(Memory::with_size(memory_size), std::io::stdout());
    if debug {
        engine.set_trace(Box::new(std::io::stderr()));
    }

    let result = match max_steps {
        Some(limit) => engine.run_limited(&program, limit),
        None => engine.run(&program),
    };

    match result {
        Ok(steps) => {
            if debug {
                eprintln!("finished after {} step(s)", steps);
            }
            if engine.pc() < program.len() {
                eprintln!(
                    "⚠️  Reached the step limit after {} step(s). Use --max-steps to raise it.",
                    steps
                );
            }
        }
        Err(e) => {
            eprintln!("❌ Execution error at line {}: {}", engine.pc(), e);
            std::process::exit(1);
        }
    }

    if let Some(out_path) = dump_state {
        let snapshot = engine.snapshot();
        let json = match serde_json::to_string_pretty(&snapshot) {
            Ok(json) => json,
            Err(e) => {
                eprintln!("❌ Failed to serialize state: {}", e);
                std::process::exit(1);
            }
        };
        if let Err(e) = std::fs::write(out_path, json) {
            eprintln!("❌ Failed to write {}: {}", out_path, e);
            std::process::exit(1);
        }
        if debug {
            eprintln!("state written to {}", out_path);
        }
    }
}

fn check_program(path: &str, dictionary: Option<&str>) {
    let dict = load_dictionary(dictionary);
    let source = read_source(path);
    let (program, dropped) = Loader::new(&dict).load_traced(&source);

    for (index, raw) in source.lines().enumerate() {
        if raw.split(' ').all(|t| t.is_empty()) {
            continue;
        }
        match dropped.iter().find(|d| d.line_number == index + 1) {
            Some(d) => println!(
                "✗ {:>4}  {}  (unknown word {:?})",
                index + 1,
                raw,
                d.unknown_word
            ),
            None => println!("✓ {:>4}  {}", index + 1, raw),
        }
    }

    println!();
    println!("{} line(s) accepted, {} dropped", program.len(), dropped.len());
}

fn show_values(words: &[String], debug: bool) {
    for word in words {
        if debug {
            let (value, steps) = lex_value_traced(word);
            for (letter, contribution) in &steps {
                print!("{}={} ", letter, contribution);
            }
            println!();
            println!("{} = {}", word, value);
        } else {
            println!("{} = {}", word, lex_value(word));
        }
    }
}

fn demo_lexical_values() {
    println!("━━━ Lexical Values ━━━");
    println!();

    for word in ["cat", "say", "add", "jump", "write"] {
        println!("  {:<6} = {}", word, lex_value(word));
    }
    println!();

    println!("A line like \"cat\" sets the current cell to 24 ('c' selects");
    println!("Set and the word's letters sum to 24); \"say\" prints it.");
    println!();
    println!("Try: ordlang run demos/count.lex");
}
