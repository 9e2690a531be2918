//! Interactive shell: read an expression, evaluate it with the
//! selected backend, print the value.

use std::io::Write;
use std::time::Instant;

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use exprjit::ast::Node;
use exprjit::bytecode::{disasm, Compiler};
use exprjit::frontend::{Lexer, Parser, ParseError};
use exprjit::jit;
use exprjit::vm::Vm;

/// Which execution tier evaluates plain input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Tree,
    Vm,
    Jit,
}

impl Mode {
    fn name(self) -> &'static str {
        match self {
            Mode::Tree => "tree",
            Mode::Vm => "vm",
            Mode::Jit => "jit",
        }
    }
}

/// The benchmark expression evaluated by the `test` command.
const BENCH_EXPR: &str = "2 * (3 + 1 / 2) - 6 + 2 * (3 + 1 / 2) - 6 + 2 * (3 + 1 / 2) - 6 \
                          + 2 * (3 + 1 / 2) - 6 + 2 * (3 + 1 / 2) - 6";
const BENCH_ITERATIONS: u32 = 1_000_000;

fn parse(expr: &str) -> Result<Node, ParseError> {
    Parser::parse(Lexer::new(expr).tokenize())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut editor = match DefaultEditor::new() {
        Ok(editor) => editor,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    };

    let mut vm = Vm::new();
    // Calling JITted code needs a 32-bit x86 process; elsewhere the
    // bytecode VM is the default and the JIT stays available for
    // inspection via `dump`.
    let mut mode = if cfg!(target_arch = "x86") {
        Mode::Jit
    } else {
        Mode::Vm
    };

    loop {
        let line = match editor.readline("$ ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("error: {}", e);
                break;
            }
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let _ = editor.add_history_entry(line);

        match line {
            "exit" => break,
            "cls" => {
                clear_terminal();
                continue;
            }
            "test" => {
                run_benchmark(&mut vm);
            }
            "mode" => {
                println!("mode: {}", mode.name());
            }
            _ => {
                if let Some(name) = line.strip_prefix("mode ") {
                    match name.trim() {
                        "tree" => mode = Mode::Tree,
                        "vm" => mode = Mode::Vm,
                        "jit" => mode = Mode::Jit,
                        other => {
                            println!("error: unknown mode '{}' (tree, vm, jit)", other);
                        }
                    }
                    println!("mode: {}", mode.name());
                } else if let Some(expr) = line.strip_prefix("dump ") {
                    dump(expr);
                } else {
                    evaluate(line, mode, &mut vm);
                }
            }
        }

        println!();
    }
}

fn evaluate(expr: &str, mode: Mode, vm: &mut Vm) {
    let node = match parse(expr) {
        Ok(node) => node,
        Err(e) => {
            println!("error: {}", e);
            return;
        }
    };

    match mode {
        Mode::Tree => println!("{}", node.eval()),
        Mode::Vm => {
            let program = Compiler::new().compile(&node);
            match vm.run(&program) {
                Ok(value) => println!("{}", value),
                Err(e) => println!("error: {}", e),
            }
        }
        Mode::Jit => {
            let program = Compiler::new().compile(&node);
            match jit::compile(&program) {
                Ok(func) => println!("{}", func.call()),
                // A failed JIT means broken codegen or an unusable
                // address space, not bad user input.
                Err(e) => {
                    eprintln!("error: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }
}

/// Evaluate [`BENCH_EXPR`] a million times per tier and report the
/// accumulated sum next to the elapsed wall-clock time.
fn run_benchmark(vm: &mut Vm) {
    let node = match parse(BENCH_EXPR) {
        Ok(node) => node,
        Err(e) => {
            println!("error: {}", e);
            return;
        }
    };
    let program = Compiler::new().compile(&node);

    let start = Instant::now();
    let mut sum = 0.0;
    for _ in 0..BENCH_ITERATIONS {
        sum += node.eval();
    }
    println!("tree: sum = {}, {} ms", sum, start.elapsed().as_millis());

    let start = Instant::now();
    let mut sum = 0.0;
    for _ in 0..BENCH_ITERATIONS {
        match vm.run(&program) {
            Ok(value) => sum += value,
            Err(e) => {
                println!("error: {}", e);
                return;
            }
        }
    }
    println!("vm:   sum = {}, {} ms", sum, start.elapsed().as_millis());

    match jit::compile(&program) {
        Ok(func) => {
            let start = Instant::now();
            let mut sum = 0.0;
            for _ in 0..BENCH_ITERATIONS {
                sum += func.call();
            }
            println!("jit:  sum = {}, {} ms", sum, start.elapsed().as_millis());
        }
        Err(e) => println!("jit:  unavailable ({})", e),
    }
}

/// Show every stage of the pipeline for one expression.
fn dump(expr: &str) {
    let node = match parse(expr) {
        Ok(node) => node,
        Err(e) => {
            println!("error: {}", e);
            return;
        }
    };
    println!("ast: {}", node);

    let program = Compiler::new().compile(&node);
    print!("{}", disasm::listing(&program));

    match jit::emit(&program) {
        Ok(asm) => {
            println!("; native code, {} bytes + {} pool doubles",
                asm.pool_offset().unwrap_or_else(|| asm.len()),
                asm.pool_len());
            for (i, chunk) in asm.code().chunks(16).enumerate() {
                println!("{:04x}: {:02x?}", i * 16, chunk);
            }
        }
        Err(e) => println!("error: {}", e),
    }
}

fn clear_terminal() {
    print!("\x1b[2J\x1b[1;1H");
    let _ = std::io::stdout().flush();
}
