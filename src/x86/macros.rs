//! Assembler macro interface.
//!
//! Provides a compact syntax for emitting straight-line x86 through
//! [`crate::x86::Assembler`] method calls.

/// Build an [`crate::x86::Assembler`] from a block of mnemonics.
///
/// Usage:
/// ```rust
/// use exprjit::x86::{reg, Mem};
///
/// let asm = exprjit::x86_asm! {
///     push(reg::EBP);
///     mov(reg::EBP, reg::ESP);
///     fldl(Mem::base_disp(reg::EBP, 8));
///     leave();
///     ret();
/// };
/// assert!(!asm.is_empty());
/// ```
#[macro_export]
macro_rules! x86_asm {
    ($($method:ident($($args:expr),*);)*) => {{
        let mut asm = $crate::x86::Assembler::new();
        $(asm.$method($($args),*);)*
        asm
    }};
}
