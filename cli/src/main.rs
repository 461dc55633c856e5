//! A small command-line front end for `prolog-core`: loads a file of
//! clauses, then either runs one query (`query`) or drops into an
//! interactive loop (`repl`).

use std::fs;
use std::path::{Path, PathBuf};

use clap::{arg, crate_version, Arg, Command};
use codespan_reporting::diagnostic::{Diagnostic, Label};
use codespan_reporting::files::SimpleFile;
use codespan_reporting::term::{self, termcolor::ColorChoice, termcolor::StandardStream, Config};
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::Editor;

use prolog_core::clause::Clause;
use prolog_core::db::{ClauseStore, MemoryDatabase};
use prolog_core::env::Environment;
use prolog_core::error::EngineError;
use prolog_core::parser::parse_goal;
use prolog_core::runtime::{EngineConfig, Runtime};
use prolog_core::sld;
use prolog_core::term::Term;

const MODULE: &str = "cli";

fn load_database(path: &Path) -> Result<MemoryDatabase, String> {
    let text = fs::read_to_string(path).map_err(|e| format!("reading {}: {}", path.display(), e))?;
    let mut db = MemoryDatabase::new();
    for (lineno, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('%') {
            continue;
        }
        let clause: Clause = line
            .parse()
            .map_err(|e| format!("{}:{}: {}", path.display(), lineno + 1, e))?;
        db.store(MODULE, clause);
    }
    Ok(db)
}

fn print_diagnostic(path: &Path, message: &str) {
    let file = SimpleFile::new(path.display().to_string(), String::new());
    let diagnostic: Diagnostic<()> = Diagnostic::error()
        .with_message(message)
        .with_labels(vec![Label::primary((), 0..0).with_message("here")]);
    let writer = StandardStream::stderr(ColorChoice::Auto);
    let _ = term::emit(&mut writer.lock(), &Config::default(), &file, &diagnostic);
}

fn print_solution(env: &Environment) {
    if env.is_empty() {
        println!("{}", "true.".green());
        return;
    }
    let mut bindings: Vec<(String, String)> =
        env.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    bindings.sort();
    for (name, value) in bindings {
        println!("{} = {}", name.cyan(), value);
    }
}

fn run_query(runtime: &Runtime, goal_text: &str) -> Result<Vec<Environment>, String> {
    let goal: Term = parse_goal(goal_text)?;
    let query = Clause {
        head: Term::atom("query"),
        body: Some(goal),
    };
    sld::search(&query, Environment::new(), runtime).map_err(|e: EngineError| e.to_string())
}

fn cmd_query(file: &str, goal: &str, max_steps: Option<usize>) {
    let path = PathBuf::from(file);
    let db = match load_database(&path) {
        Ok(db) => db,
        Err(e) => {
            print_diagnostic(&path, &e);
            std::process::exit(1);
        }
    };
    let config = EngineConfig {
        max_steps,
        trace: log::log_enabled!(log::Level::Trace),
    };
    let runtime =
        Runtime::new(Box::new(db), prolog_core::builtin::with_minimal_builtins()).with_config(config);

    match run_query(&runtime, goal) {
        Ok(solutions) if solutions.is_empty() => {
            println!("{}", "false.".red());
        }
        Ok(solutions) => {
            for env in &solutions {
                print_solution(env);
            }
            println!("{}", format!("{} solution(s).", solutions.len()).dimmed());
        }
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            std::process::exit(1);
        }
    }
}

fn cmd_repl(file: Option<&str>) {
    let db = match file {
        Some(file) => match load_database(&PathBuf::from(file)) {
            Ok(db) => db,
            Err(e) => {
                eprintln!("{} {}", "error:".red().bold(), e);
                std::process::exit(1);
            }
        },
        None => MemoryDatabase::new(),
    };
    let runtime = Runtime::new(Box::new(db), prolog_core::builtin::with_minimal_builtins());

    let mut rl = Editor::<()>::new().expect("failed to initialize the line editor");
    println!("{}", "prolog-cli repl — ^D to exit".dimmed());
    loop {
        match rl.readline("?- ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                rl.add_history_entry(line);
                match run_query(&runtime, line.trim_end_matches('.')) {
                    Ok(solutions) if solutions.is_empty() => println!("{}", "false.".red()),
                    Ok(solutions) => {
                        for env in &solutions {
                            print_solution(env);
                        }
                    }
                    Err(e) => eprintln!("{} {}", "error:".red().bold(), e),
                }
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{} {}", "error:".red().bold(), e);
                break;
            }
        }
    }
}

fn main() {
    env_logger::init();

    let matches = Command::new("prolog")
        .version(crate_version!())
        .about("A small Prolog-family logic engine")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("query")
                .about("Load a clause file and run a single query")
                .arg(Arg::new("FILE").required(true).help("Clause file to load").index(1))
                .arg(
                    Arg::new("GOAL")
                        .required(true)
                        .help("Query goal, e.g. parent(tom, X)")
                        .index(2),
                )
                .arg(arg!(--"max-steps" <N> "Abort after this many resolution steps").required(false)),
        )
        .subcommand(
            Command::new("repl")
                .about("Start an interactive query loop")
                .arg(Arg::new("FILE").required(false).help("Clause file to preload").index(1)),
        )
        .get_matches();

    match matches.subcommand() {
        Some(("query", sub)) => {
            let file = sub.value_of("FILE").unwrap();
            let goal = sub.value_of("GOAL").unwrap();
            let max_steps = sub.value_of("max-steps").and_then(|s| s.parse().ok());
            cmd_query(file, goal, max_steps);
        }
        Some(("repl", sub)) => {
            cmd_repl(sub.value_of("FILE"));
        }
        _ => unreachable!("subcommand_required(true) guarantees a match above"),
    }
}
