//! `TypedRange`: a memory range tagged with an element size.

use memrange_common::{Error, Result, verify_arg};

use crate::{range::MemoryRange, view::MemoryView};

/// A [`MemoryRange`] whose bytes are interpreted as fixed-size elements.
///
/// The element size is fixed at construction. Operations that combine two
/// typed ranges fail with `DifferentElementSize` unless both agree on it.
#[derive(Debug)]
pub struct TypedRange<'a> {
    range: MemoryRange<'a>,
    elem_size: usize,
}

impl<'a> TypedRange<'a> {
    /// Wraps `range` with the given element size.
    ///
    /// Fails with `InvalidArgument` if `elem_size` is zero or does not divide
    /// the size of the range, and with `InvalidRange` if the range is invalid.
    pub fn new(range: MemoryRange<'a>, elem_size: usize) -> Result<TypedRange<'a>> {
        verify_arg!(elem_size, elem_size != 0);
        let size = range.size()?;
        verify_arg!(elem_size, size % elem_size == 0);
        Ok(TypedRange { range, elem_size })
    }

    /// Wraps a typed slice, using `size_of::<T>()` as the element size.
    pub fn from_slice<T>(data: &'a mut [T]) -> Result<TypedRange<'a>>
    where
        T: bytemuck::Pod,
    {
        Self::new(MemoryRange::from_typed(data), std::mem::size_of::<T>())
    }

    #[inline]
    pub fn elem_size(&self) -> usize {
        self.elem_size
    }

    /// Number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.byte_size() / self.elem_size
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.byte_size() == 0
    }

    pub fn view(&self) -> MemoryView<'_> {
        self.range.as_view()
    }

    pub fn into_inner(self) -> MemoryRange<'a> {
        self.range
    }

    /// Address of the first byte of element `index`.
    pub fn at(&mut self, index: usize) -> Result<*mut u8> {
        let len = self.len();
        if index >= len {
            return Err(Error::out_of_range("TypedRange::at", index, len));
        }
        self.range.at_begin(index * self.elem_size)
    }

    /// Byte range of element `index`.
    pub fn element(&mut self, index: usize) -> Result<MemoryRange<'_>> {
        let len = self.len();
        if index >= len {
            return Err(Error::out_of_range("TypedRange::element", index, len));
        }
        let elem_size = self.elem_size;
        self.range.slice(index * elem_size, elem_size)
    }

    /// Takes over `other`'s bounds. Both must have the same element size.
    pub fn assign(&mut self, other: TypedRange<'a>) -> Result<()> {
        self.verify_same_size("TypedRange::assign", other.elem_size)?;
        self.range.assign(other.range);
        Ok(())
    }

    /// Copies the first `min(len, other.len)` elements of `other`, returning
    /// the number of elements copied.
    pub fn copy_from(&mut self, other: &TypedRange<'_>) -> Result<usize> {
        self.verify_same_size("TypedRange::copy_from", other.elem_size)?;
        let count = self.len().min(other.len());
        self.range.copy_from(&other.view())?;
        Ok(count)
    }

    /// Reads element `index` as `T`. `T` must have the range's element size.
    pub fn get<T>(&self, index: usize) -> Result<T>
    where
        T: bytemuck::AnyBitPattern,
    {
        self.verify_same_size("TypedRange::get", std::mem::size_of::<T>())?;
        let len = self.len();
        if index >= len {
            return Err(Error::out_of_range("TypedRange::get", index, len));
        }
        let bytes = self.range.as_slice()?;
        let start = index * self.elem_size;
        Ok(bytemuck::pod_read_unaligned(&bytes[start..start + self.elem_size]))
    }

    /// The elements as a `&[T]`.
    ///
    /// Fails with `DifferentElementSize` unless `size_of::<T>()` equals the
    /// element size, and with `InvalidAlignment` if the memory is not aligned
    /// for `T`.
    pub fn as_typed<T>(&self) -> Result<&[T]>
    where
        T: bytemuck::AnyBitPattern,
    {
        self.verify_same_size("TypedRange::as_typed", std::mem::size_of::<T>())?;
        bytemuck::try_cast_slice(self.range.as_slice()?).map_err(|_| {
            Error::invalid_alignment("TypedRange::as_typed", std::mem::align_of::<T>())
        })
    }

    /// The elements as a `&mut [T]`; same checks as [`as_typed`](TypedRange::as_typed).
    pub fn as_typed_mut<T>(&mut self) -> Result<&mut [T]>
    where
        T: bytemuck::Pod,
    {
        self.verify_same_size("TypedRange::as_typed_mut", std::mem::size_of::<T>())?;
        bytemuck::try_cast_slice_mut(self.range.as_mut_slice()?).map_err(|_| {
            Error::invalid_alignment("TypedRange::as_typed_mut", std::mem::align_of::<T>())
        })
    }

    fn verify_same_size(&self, op: &'static str, other: usize) -> Result<()> {
        if self.elem_size != other {
            return Err(Error::different_element_size(op, self.elem_size, other));
        }
        Ok(())
    }

    fn byte_size(&self) -> usize {
        let (begin, end) = self.range.unpack();
        memrange_rawops::span_len(begin as *const u8, end as *const u8)
    }
}
