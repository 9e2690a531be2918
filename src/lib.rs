//! # exprjit
//!
//! An interactive arithmetic expression evaluator that runs the same
//! expression through three execution strategies:
//!
//! - **Tree walk**: direct recursive evaluation of the AST
//! - **Bytecode VM**: a stack machine over a compact linear ISA
//! - **JIT**: translation of the bytecode into 32-bit x86 (x87 FPU)
//!   machine code, loaded into executable memory and called as a
//!   `fn() -> f64`
//!
//! ## Pipeline
//!
//! ```text
//! text ──lexer──▶ tokens ──parser──▶ AST ──┬─▶ eval()
//!                                          └─▶ bytecode ──┬─▶ Vm::run()
//!                                                         └─▶ jit::compile() ──▶ CompiledFn::call()
//! ```
//!
//! The x86 assembler is host-independent: machine code can be emitted
//! and inspected on any host. Executing it requires a 32-bit x86
//! process (cdecl, EBP frames, x87 result in `ST0`).
//!
//! ## Usage
//!
//! ```rust
//! use exprjit::bytecode::Compiler;
//! use exprjit::frontend::{Lexer, Parser};
//! use exprjit::vm::Vm;
//!
//! let tokens = Lexer::new("2 + 3 * 4").tokenize();
//! let ast = Parser::parse(tokens).unwrap();
//! assert_eq!(ast.eval(), 14.0);
//!
//! let program = Compiler::new().compile(&ast);
//! let mut vm = Vm::new();
//! assert_eq!(vm.run(&program).unwrap(), 14.0);
//! ```

pub mod ast;
pub mod bytecode;
pub mod common;
pub mod frontend;
pub mod jit;
pub mod vm;
pub mod x86;
