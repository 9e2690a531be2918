//! Executable-memory loading shared by the JIT backend.
//!
//! Emission happens into an ordinary byte buffer; this module owns the
//! transition of those bytes into callable machine code. The allocator
//! hands out two views of the same span: a writable one and an
//! executable one. Bytes go in through the writable view and are only
//! ever run through the executable view, so the mapping used for
//! execution is never writable.
//!
//! Loading is split in two steps because relocation needs the final
//! execute address before the bytes are final:
//!
//! 1. [`ExecRegion::reserve`] allocates the span and exposes
//!    [`ExecRegion::base`], the address the code will run at;
//! 2. [`ExecRegion::commit`] copies the patched bytes in and returns
//!    the owning [`CompiledFn`] handle.

use std::fmt;
use std::marker::PhantomData;

use jit_allocator2::JitAllocator;

/// A reserved span of executable memory awaiting its final bytes.
pub struct ExecRegion {
    allocator: Box<JitAllocator>,
    exec_ptr: *const u8,
    write_ptr: *mut u8,
    len: usize,
}

impl ExecRegion {
    /// Reserve a span large enough for `len` bytes of code.
    pub fn reserve(len: usize) -> Result<Self, LoadError> {
        let mut allocator = JitAllocator::new(Default::default());
        let (exec_ptr, write_ptr) = allocator
            .alloc(len)
            .map_err(LoadError::AllocationFailed)?;

        Ok(Self {
            allocator,
            exec_ptr,
            write_ptr,
            len,
        })
    }

    /// The address the committed code will execute at.
    pub fn base(&self) -> *const u8 {
        self.exec_ptr
    }

    /// Number of bytes reserved.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Copy `code` into the span and seal it as a callable function.
    pub fn commit(self, code: &[u8]) -> Result<CompiledFn, LoadError> {
        if code.len() > self.len {
            return Err(LoadError::RegionTooSmall {
                reserved: self.len,
                needed: code.len(),
            });
        }

        unsafe {
            std::ptr::copy_nonoverlapping(code.as_ptr(), self.write_ptr, code.len());
        }

        Ok(CompiledFn {
            _allocator: self.allocator,
            entry: self.exec_ptr,
            _signature: PhantomData,
        })
    }
}

/// An owning handle over JIT-compiled machine code.
///
/// The span stays mapped for as long as the handle lives; dropping it
/// returns the memory to the allocator. The type parameter records the
/// function signature the code was emitted for.
pub struct CompiledFn<F = extern "C" fn() -> f64> {
    _allocator: Box<JitAllocator>,
    entry: *const u8,
    _signature: PhantomData<F>,
}

impl<F> CompiledFn<F> {
    /// Reinterpret the entry point with the recorded signature.
    ///
    /// # Safety
    ///
    /// The emitted code must actually follow the ABI and signature `F`
    /// describes, and must be valid for the executing architecture.
    pub unsafe fn as_fn(&self) -> F {
        std::mem::transmute_copy(&self.entry)
    }

    /// Raw entry point, for inspection and relocation checks.
    pub fn entry(&self) -> *const u8 {
        self.entry
    }
}

impl CompiledFn<extern "C" fn() -> f64> {
    /// Call the compiled code as a zero-argument double-returning
    /// cdecl function.
    pub fn call(&self) -> f64 {
        let f: extern "C" fn() -> f64 = unsafe { self.as_fn() };
        f()
    }
}

impl<F> fmt::Debug for CompiledFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledFn")
            .field("entry", &self.entry)
            .finish()
    }
}

/// Errors raised while materializing executable memory.
#[derive(Debug)]
pub enum LoadError {
    AllocationFailed(jit_allocator2::Error),
    RegionTooSmall { reserved: usize, needed: usize },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::AllocationFailed(e) => {
                write!(f, "failed to allocate executable memory: {:?}", e)
            }
            LoadError::RegionTooSmall { reserved, needed } => {
                write!(
                    f,
                    "reserved executable region of {} bytes cannot hold {} bytes of code",
                    reserved, needed
                )
            }
        }
    }
}

impl std::error::Error for LoadError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserve_exposes_a_nonnull_base() {
        let region = ExecRegion::reserve(64).expect("reserve failed");
        assert!(!region.base().is_null());
        assert_eq!(region.len(), 64);
    }

    #[test]
    fn commit_rejects_oversized_code() {
        let region = ExecRegion::reserve(4).expect("reserve failed");
        let code = [0u8; 64];
        match region.commit(&code) {
            Err(LoadError::RegionTooSmall { reserved, needed }) => {
                assert_eq!(reserved, 4);
                assert_eq!(needed, 64);
            }
            Ok(_) => panic!("expected RegionTooSmall"),
            Err(e) => panic!("expected RegionTooSmall, got {}", e),
        }
    }

    // Executing freshly written code only makes sense on the target
    // the assembler emits for; a bare x87 load + ret is enough to
    // prove the span is runnable there.
    #[test]
    #[cfg(target_arch = "x86")]
    fn committed_code_is_callable() {
        // fldz; ret  -> returns 0.0 in ST0
        let code = [0xD9, 0xEE, 0xC3];
        let region = ExecRegion::reserve(code.len()).expect("reserve failed");
        let func = region.commit(&code).expect("commit failed");
        assert_eq!(func.call(), 0.0);
    }
}
