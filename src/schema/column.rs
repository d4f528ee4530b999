use std::fmt;

use crate::writer::WriterError;

use super::types::{NativeElement, WireType};

/// Per-element copy out of borrowed column storage.
trait ElementSource: Send + Sync {
    fn copy_element(&self, index: usize, dest: &mut [u8]);
}

impl<'a, T: NativeElement> ElementSource for &'a [T] {
    #[inline]
    fn copy_element(&self, index: usize, dest: &mut [u8]) {
        self[index].write_native(dest);
    }
}

enum ColumnData<'a> {
    Typed(Box<dyn ElementSource + 'a>),
    Raw(&'a [u8]),
}

/// One field of a dataset: N fixed-size elements of a single wire type.
///
/// A column borrows the caller's storage; nothing is copied until rows are
/// packed during a write.
pub struct Column<'a> {
    wire_type: WireType,
    element_size: usize,
    len: usize,
    data: ColumnData<'a>,
}

impl<'a> Column<'a> {
    /// Create a column over a typed slice. The wire type comes from the registry.
    pub fn new<T: NativeElement>(values: &'a [T]) -> Self {
        Self {
            wire_type: T::WIRE_TYPE,
            element_size: std::mem::size_of::<T>(),
            len: values.len(),
            data: ColumnData::Typed(Box::new(values)),
        }
    }

    /// Create a half precision column from raw IEEE 754 binary16 bit patterns
    pub fn half(bits: &'a [u16]) -> Self {
        Self {
            wire_type: WireType::Half,
            ..Self::new(bits)
        }
    }

    /// Create a column over raw native-order bytes.
    ///
    /// `element_size` must be non-zero, must divide `bytes.len()`, and must match
    /// the implied size of `wire_type` unless it is [`WireType::Unknown`].
    pub fn raw(
        wire_type: WireType,
        element_size: usize,
        bytes: &'a [u8],
    ) -> Result<Self, WriterError> {
        if element_size == 0 {
            return Err(WriterError::InvalidData(
                "raw column element size must be non-zero".to_string(),
            ));
        }
        if let Some(expected) = wire_type.element_size() {
            if expected != element_size {
                return Err(WriterError::InvalidData(format!(
                    "{} elements are {} bytes, got element size {}",
                    wire_type, expected, element_size
                )));
            }
        }
        if bytes.len() % element_size != 0 {
            return Err(WriterError::InvalidData(format!(
                "raw column of {} bytes is not a whole number of {}-byte elements",
                bytes.len(),
                element_size
            )));
        }

        Ok(Self {
            wire_type,
            element_size,
            len: bytes.len() / element_size,
            data: ColumnData::Raw(bytes),
        })
    }

    /// Wire type recorded in the header for this column
    pub fn wire_type(&self) -> WireType {
        self.wire_type
    }

    /// Size in bytes of one element
    pub fn element_size(&self) -> usize {
        self.element_size
    }

    /// Number of elements (rows)
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when the column holds no elements
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Copy element `index` into `dest`, which is exactly `element_size` bytes.
    #[inline]
    pub(crate) fn copy_element(&self, index: usize, dest: &mut [u8]) {
        match &self.data {
            ColumnData::Typed(source) => source.copy_element(index, dest),
            ColumnData::Raw(bytes) => {
                let start = index * self.element_size;
                dest.copy_from_slice(&bytes[start..start + self.element_size]);
            }
        }
    }
}

impl fmt::Debug for Column<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("wire_type", &self.wire_type)
            .field("element_size", &self.element_size)
            .field("len", &self.len)
            .field(
                "storage",
                &match self.data {
                    ColumnData::Typed(_) => "typed",
                    ColumnData::Raw(_) => "raw",
                },
            )
            .finish()
    }
}
