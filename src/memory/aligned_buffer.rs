use std::{
    alloc::{self, Layout},
    fmt,
    marker::PhantomData,
    ops::{Deref, DerefMut},
    ptr::NonNull,
};

use thiserror::Error;

/// Byte boundary every [`AlignedBuffer`] starts on.
pub const ALIGNMENT: usize = 128;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AllocError {
    #[error("{len} elements of {elem_size} bytes overflow the address space")]
    LengthOverflow { len: usize, elem_size: usize },
    #[error("{bytes} bytes cannot be laid out on a {}-byte boundary", ALIGNMENT)]
    InvalidSize { bytes: usize },
    #[error("system allocator could not provide {bytes} bytes")]
    OutOfMemory { bytes: usize },
}

/// Element types whose all-zero bit pattern is a valid value, so a freshly
/// zeroed allocation can be handed out as `[T]`.
///
/// # Safety
///
/// Implementors must be plain-old-data with no invalid bit patterns for zero.
pub unsafe trait ZeroValid: Copy + 'static {}

unsafe impl ZeroValid for u8 {}
unsafe impl ZeroValid for f32 {}
unsafe impl ZeroValid for f64 {}

/// An owned, zero-initialised, fixed-length buffer whose first element sits
/// on a [`ALIGNMENT`]-byte boundary.
///
/// Dereferences to `[T]`, so it can be passed directly to the kernels.
/// Dropping the buffer returns the memory to the global allocator.
pub struct AlignedBuffer<T: ZeroValid> {
    ptr: NonNull<T>,
    len: usize,
    layout: Layout,
    _owns: PhantomData<T>,
}

// SAFETY: the buffer uniquely owns its allocation, like a `Box<[T]>`.
unsafe impl<T: ZeroValid + Send> Send for AlignedBuffer<T> {}
unsafe impl<T: ZeroValid + Sync> Sync for AlignedBuffer<T> {}

impl<T: ZeroValid> AlignedBuffer<T> {
    /// Allocates `len` zeroed elements.
    ///
    /// A zero-length request still allocates a small block, so the pointer of
    /// an empty buffer is aligned too.
    ///
    /// # Errors
    /// - [`AllocError::LengthOverflow`] if `len * size_of::<T>()` overflows
    /// - [`AllocError::InvalidSize`] if the byte size exceeds what a
    ///   [`Layout`] can describe
    /// - [`AllocError::OutOfMemory`] if the system allocator returns null
    pub fn zeroed(len: usize) -> Result<Self, AllocError> {
        let bytes = len
            .checked_mul(size_of::<T>())
            .ok_or(AllocError::LengthOverflow {
                len,
                elem_size: size_of::<T>(),
            })?;

        let layout = Layout::from_size_align(bytes.max(1), ALIGNMENT)
            .map_err(|_| AllocError::InvalidSize { bytes })?;

        // SAFETY: layout has a non-zero size.
        let raw = unsafe { alloc::alloc_zeroed(layout) };
        let ptr = NonNull::new(raw.cast::<T>()).ok_or(AllocError::OutOfMemory { bytes })?;

        Ok(AlignedBuffer {
            ptr,
            len,
            layout,
            _owns: PhantomData,
        })
    }

    /// Allocates a buffer holding a copy of `data`.
    pub fn from_slice(data: &[T]) -> Result<Self, AllocError> {
        let mut buffer = Self::zeroed(data.len())?;
        buffer.copy_from_slice(data);
        Ok(buffer)
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_ptr(&self) -> *const T {
        self.ptr.as_ptr()
    }

    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.ptr.as_ptr()
    }
}

/// Requests `bytes` bytes aligned on [`ALIGNMENT`].
///
/// The returned memory is zeroed. There is no matching free function: drop
/// the buffer when done.
pub fn aligned_alloc(bytes: usize) -> Result<AlignedBuffer<u8>, AllocError> {
    AlignedBuffer::zeroed(bytes)
}

impl<T: ZeroValid> Deref for AlignedBuffer<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        // SAFETY: ptr is valid for `len` zero-initialised (hence valid) elements
        // and we hold shared access.
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }
}

impl<T: ZeroValid> DerefMut for AlignedBuffer<T> {
    fn deref_mut(&mut self) -> &mut [T] {
        // SAFETY: as above, with unique access through &mut self.
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }
}

impl<T: ZeroValid> Drop for AlignedBuffer<T> {
    fn drop(&mut self) {
        // SAFETY: allocated in `zeroed` with exactly this layout.
        unsafe { alloc::dealloc(self.ptr.as_ptr().cast::<u8>(), self.layout) }
    }
}

impl<T: ZeroValid + fmt::Debug> fmt::Debug for AlignedBuffer<T> {
    #[cfg_attr(coverage_nightly, coverage(off))]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlignedBuffer")
            .field("len", &self.len)
            .field("data", &&**self)
            .finish()
    }
}
