use clap::{Parser, Subcommand};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use lispy::{Interpreter, LispyError, Value};

#[derive(Parser)]
#[command(name = "lispy", about = "Lispy: an embeddable Lisp interpreter", version)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// File to execute
    file: Option<String>,

    /// Evaluate an expression and print result (if non-nil)
    #[arg(short, long, conflicts_with = "print")]
    eval: Option<String>,

    /// Evaluate an expression and always print result
    #[arg(short, long, conflicts_with = "eval")]
    print: Option<String>,

    /// Load file(s) before executing
    #[arg(short, long = "load", action = clap::ArgAction::Append)]
    load: Vec<String>,

    /// Suppress REPL banner
    #[arg(short, long)]
    quiet: bool,

    /// Enter REPL after running file or eval
    #[arg(short, long)]
    interactive: bool,

    /// Emit an indented trace of every evaluation step
    #[arg(long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse source and display the expression tree
    Ast {
        /// File to parse
        file: Option<String>,

        /// Expression to parse
        #[arg(short, long)]
        eval: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Some(command) = cli.command {
        match command {
            Commands::Ast { file, eval } => run_ast(file, eval),
        }
        return;
    }

    let interpreter = Interpreter::new();
    lispy::set_debug(cli.debug);

    for load_file in &cli.load {
        if let Err(e) = interpreter.load_file(load_file) {
            eprint!("Error loading {load_file}: ");
            print_error(&e);
            std::process::exit(1);
        }
    }

    if let Some(expr) = &cli.eval {
        match interpreter.eval_str(expr) {
            Ok(val) => {
                if !matches!(val, Value::Nil) {
                    println!("{val}");
                }
            }
            Err(e) => {
                print_error(&e);
                std::process::exit(1);
            }
        }
        if cli.interactive {
            repl(interpreter, cli.quiet);
        }
        return;
    }

    if let Some(expr) = &cli.print {
        match interpreter.eval_str(expr) {
            Ok(val) => println!("{val}"),
            Err(e) => {
                print_error(&e);
                std::process::exit(1);
            }
        }
        if cli.interactive {
            repl(interpreter, cli.quiet);
        }
        return;
    }

    if let Some(file) = &cli.file {
        if let Err(e) = interpreter.load_file(file) {
            print_error(&e);
            std::process::exit(1);
        }
        if cli.interactive {
            repl(interpreter, cli.quiet);
        }
        return;
    }

    repl(interpreter, cli.quiet);
}

fn run_ast(file: Option<String>, eval: Option<String>) {
    let source = match (&file, &eval) {
        (Some(path), None) => match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("Error reading {path}: {e}");
                std::process::exit(1);
            }
        },
        (None, Some(expr)) => expr.clone(),
        (Some(_), Some(_)) => {
            eprintln!("Error: cannot specify both a file and --eval");
            std::process::exit(1);
        }
        (None, None) => {
            eprintln!("Error: provide a file or --eval expression");
            std::process::exit(1);
        }
    };

    match lispy::parse_many(&source) {
        Ok(exprs) => {
            for (i, expr) in exprs.iter().enumerate() {
                if i > 0 {
                    println!();
                }
                print_ast(expr, 0);
            }
        }
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}

fn print_ast(val: &Value, indent: usize) {
    let pad = "  ".repeat(indent);
    match val {
        Value::List(items) => {
            println!("{pad}List");
            for item in items.iter() {
                print_ast(item, indent + 1);
            }
        }
        Value::Symbol(spur) => println!("{pad}Symbol {}", lispy::resolve(*spur)),
        Value::Number(n) => println!("{pad}Number {n}"),
        Value::String(s) => println!("{pad}String {s:?}"),
        other => println!("{pad}{}", other.type_name()),
    }
}

fn print_error(e: &LispyError) {
    eprintln!("Error: {}", e.inner());
}

fn repl(interpreter: Interpreter, quiet: bool) {
    let mut rl = match DefaultEditor::new() {
        Ok(editor) => editor,
        Err(e) => {
            eprintln!("Error: failed to create line editor: {e}");
            std::process::exit(1);
        }
    };
    let history_path = dirs_path().join("history.txt");
    let _ = rl.load_history(&history_path);

    if !quiet {
        println!("Lispy v{}", env!("CARGO_PKG_VERSION"));
        println!("Type ,help for help, ,quit to exit\n");
    }

    let mut buffer = String::new();
    let mut in_multiline = false;
    let mut last_error: Option<LispyError> = None;

    loop {
        let prompt = if in_multiline { "  ... " } else { "lispy> " };
        match rl.readline(prompt) {
            Ok(line) => {
                let trimmed = line.trim();

                if !in_multiline {
                    match trimmed {
                        ",quit" | ",exit" | ",q" => break,
                        ",help" | ",h" => {
                            print_help();
                            continue;
                        }
                        ",env" => {
                            print_env(&interpreter);
                            continue;
                        }
                        ",stack" | "\\s" => {
                            match last_error.as_ref().and_then(|e| e.stack_trace()) {
                                Some(stack) => print!("{stack}"),
                                None => println!("(no stack recorded)"),
                            }
                            continue;
                        }
                        _ => {}
                    }
                }

                if in_multiline {
                    buffer.push('\n');
                    buffer.push_str(&line);
                } else {
                    buffer = line.clone();
                }

                if !is_balanced(&buffer) {
                    in_multiline = true;
                    continue;
                }

                in_multiline = false;
                let input = buffer.trim().to_string();
                buffer.clear();

                if input.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(&input);

                match interpreter.eval_str(&input) {
                    Ok(val) => {
                        if !matches!(val, Value::Nil) {
                            println!("{val}");
                        }
                    }
                    Err(e) => {
                        print_error(&e);
                        last_error = Some(e);
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                if in_multiline {
                    buffer.clear();
                    in_multiline = false;
                    println!("^C");
                    continue;
                }
                break;
            }
            Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("Error: {e}");
                break;
            }
        }
    }

    let _ = std::fs::create_dir_all(dirs_path());
    let _ = rl.save_history(&history_path);
    println!("Goodbye!");
}

/// Rough balance check so the REPL can accept multi-line forms: counts
/// bracket depth outside of string literals.
fn is_balanced(input: &str) -> bool {
    let mut depth = 0i32;
    let mut in_string = false;
    let mut escape = false;
    for ch in input.chars() {
        if escape {
            escape = false;
            continue;
        }
        if ch == '\\' && in_string {
            escape = true;
            continue;
        }
        if ch == '"' {
            in_string = !in_string;
            continue;
        }
        if in_string {
            continue;
        }
        match ch {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth -= 1,
            _ => {}
        }
    }
    depth <= 0 && !in_string
}

fn print_help() {
    println!("Lispy REPL Commands:");
    println!("  ,quit / ,q    Exit the REPL");
    println!("  ,help / ,h    Show this help");
    println!("  ,env          Show user-defined bindings");
    println!("  ,stack        Show the stack of the last error");
    println!();
    println!("Special forms:");
    println!("  {}", lispy::SPECIAL_FORM_NAMES.join(", "));
    println!();
    println!("Toggle the evaluation trace with (kernel:debug).");
}

fn print_env(interpreter: &Interpreter) {
    let members = interpreter.global_env().members.borrow();
    let mut user_bindings: Vec<(String, String)> = members
        .iter()
        .filter(|(_, v)| !matches!(v, Value::NativeFn(_) | Value::SpecialFn(_)))
        .map(|(spur, val)| (lispy::resolve(*spur), format!("{val}")))
        .collect();
    drop(members);
    user_bindings.sort();
    if user_bindings.is_empty() {
        println!("(no user-defined bindings)");
    } else {
        for (name, val) in user_bindings {
            println!("  {name} = {val}");
        }
    }
}

fn dirs_path() -> std::path::PathBuf {
    std::env::var("HOME")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|_| std::path::PathBuf::from("."))
        .join(".lispy")
}
