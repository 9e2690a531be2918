//! Human-readable bytecode listing, used by the REPL's `dump`
//! command.

use std::fmt::Write;

use super::{Op, Program};

/// Render a program as one operation per line with byte offsets.
pub fn listing(program: &Program) -> String {
    let code = program.code();
    let mut out = String::new();
    let mut ip = 0;

    let _ = writeln!(out, "; stack size: {} bytes", program.stack_size());

    while ip < code.len() {
        let offset = ip;
        match Op::from_byte(code[ip]) {
            Some(Op::Push) => {
                ip += 1;
                if ip + 8 <= code.len() {
                    let mut raw = [0u8; 8];
                    raw.copy_from_slice(&code[ip..ip + 8]);
                    let value = f64::from_ne_bytes(raw);
                    ip += 8;
                    let _ = writeln!(out, "{:04}: push {}", offset, value);
                } else {
                    let _ = writeln!(out, "{:04}: push <truncated>", offset);
                    break;
                }
            }
            Some(op) => {
                ip += 1;
                let _ = writeln!(out, "{:04}: {}", offset, op);
            }
            None => {
                let _ = writeln!(out, "{:04}: .byte {:#04x}", offset, code[ip]);
                ip += 1;
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BinOp, Node};
    use crate::bytecode::Compiler;

    #[test]
    fn test_listing_shape() {
        let node = Node::binary(BinOp::Add, Node::Value(2.0), Node::Value(3.0));
        let program = Compiler::new().compile(&node);
        let text = listing(&program);

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "; stack size: 16 bytes");
        assert_eq!(lines[1], "0000: push 2");
        assert_eq!(lines[2], "0009: push 3");
        assert_eq!(lines[3], "0018: add");
        assert_eq!(lines[4], "0019: ret");
    }
}
