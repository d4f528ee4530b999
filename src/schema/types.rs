//! Wire type registry.
//!
//! Maps the native element type of a column to the fixed `u16` code stored in
//! the header's `types[]` table. Every lookup is a pure function of the type.

use std::fmt;

/// On-disk element type of a column.
///
/// The discriminant is the wire code written to the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum WireType {
    /// Signed 8-bit integer
    Int8 = 0,
    /// Signed 16-bit integer
    Int16 = 1,
    /// Signed 32-bit integer
    Int32 = 2,
    /// Signed 64-bit integer
    Int64 = 3,
    /// Unsigned 8-bit integer
    Uint8 = 4,
    /// Unsigned 16-bit integer
    Uint16 = 5,
    /// Unsigned 32-bit integer
    Uint32 = 6,
    /// Unsigned 64-bit integer
    Uint64 = 7,
    /// IEEE 754 half precision float
    Half = 8,
    /// IEEE 754 single precision float
    Float = 9,
    /// IEEE 754 double precision float
    Double = 10,
    /// Element type without a registered code; carries no implied size
    Unknown = 11,
}

impl WireType {
    /// All wire types in code order
    pub const ALL: [WireType; 12] = [
        WireType::Int8,
        WireType::Int16,
        WireType::Int32,
        WireType::Int64,
        WireType::Uint8,
        WireType::Uint16,
        WireType::Uint32,
        WireType::Uint64,
        WireType::Half,
        WireType::Float,
        WireType::Double,
        WireType::Unknown,
    ];

    /// The `u16` code written to the header
    #[inline]
    pub const fn code(self) -> u16 {
        self as u16
    }

    /// Map a header code back to its wire type. Unrecognized codes map to `Unknown`.
    pub fn from_code(code: u16) -> Self {
        Self::ALL
            .get(code as usize)
            .copied()
            .unwrap_or(WireType::Unknown)
    }

    /// Size in bytes of one element, or `None` for `Unknown`
    pub const fn element_size(self) -> Option<usize> {
        match self {
            WireType::Int8 | WireType::Uint8 => Some(1),
            WireType::Int16 | WireType::Uint16 | WireType::Half => Some(2),
            WireType::Int32 | WireType::Uint32 | WireType::Float => Some(4),
            WireType::Int64 | WireType::Uint64 | WireType::Double => Some(8),
            WireType::Unknown => None,
        }
    }

    /// Lowercase name used in logs and diagnostics
    pub const fn name(self) -> &'static str {
        match self {
            WireType::Int8 => "int8",
            WireType::Int16 => "int16",
            WireType::Int32 => "int32",
            WireType::Int64 => "int64",
            WireType::Uint8 => "uint8",
            WireType::Uint16 => "uint16",
            WireType::Uint32 => "uint32",
            WireType::Uint64 => "uint64",
            WireType::Half => "half",
            WireType::Float => "float",
            WireType::Double => "double",
            WireType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A native element type with a registered wire code.
///
/// Implemented for the primitive integer and float types. Half precision data is
/// passed as raw `u16` bit patterns through [`Column::half`](super::Column::half).
pub trait NativeElement: Copy + Send + Sync + 'static {
    /// Wire type recorded for columns of this element type
    const WIRE_TYPE: WireType;

    /// Write the element's native-order bytes into `dest`, which is exactly
    /// `size_of::<Self>()` bytes long.
    fn write_native(self, dest: &mut [u8]);
}

macro_rules! impl_native_element {
    ($($ty:ty => $wire:expr),* $(,)?) => {
        $(
            impl NativeElement for $ty {
                const WIRE_TYPE: WireType = $wire;

                #[inline]
                fn write_native(self, dest: &mut [u8]) {
                    dest.copy_from_slice(&self.to_ne_bytes());
                }
            }
        )*
    };
}

impl_native_element! {
    i8 => WireType::Int8,
    i16 => WireType::Int16,
    i32 => WireType::Int32,
    i64 => WireType::Int64,
    u8 => WireType::Uint8,
    u16 => WireType::Uint16,
    u32 => WireType::Uint32,
    u64 => WireType::Uint64,
    f32 => WireType::Float,
    f64 => WireType::Double,
}

/// Registry lookup: the wire type of native element type `T`
#[inline]
pub fn wire_type_of<T: NativeElement>() -> WireType {
    T::WIRE_TYPE
}
