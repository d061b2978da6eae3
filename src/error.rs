use inkmesh_geometry::{ErrorKind, MeshError, MeshFormatError, PartitionedMeshError};

/// Errors decoding wire messages.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("Numeric run has non-finite offset {offset} or scale {scale}")]
    NonFiniteRun { offset: f64, scale: f64 },
    #[error("Integer numeric run has non-integral offset {offset} or scale {scale}")]
    NonIntegralRun { offset: f64, scale: f64 },
    #[error("Packed numeric run has invalid coding params: offset = {offset}, scale = {scale}")]
    InvalidCodingParams { offset: f64, scale: f64 },
    #[error("Packed numeric run value {index} = {value} does not fit in {bits} bits")]
    QuantizedOutOfRange { index: usize, value: i64, bits: u8 },
    #[error("{left} has {left_len} values, but {right} has {right_len}")]
    MismatchedLengths {
        left: &'static str,
        left_len: usize,
        right: &'static str,
        right_len: usize,
    },
    #[error("Unrecognized {field} value: {value}")]
    UnrecognizedEnumValue { field: &'static str, value: i32 },
    #[error("Unspecified {field} value")]
    UnspecifiedEnumValue { field: &'static str },
    #[error("Expected {expected} other_attribute_components for the mesh format, got {actual}")]
    OtherComponentCount { expected: usize, actual: usize },
    #[error("other_attribute_components[{index}] has {actual} values, but the mesh has {expected} vertices")]
    OtherComponentLength {
        index: usize,
        expected: usize,
        actual: usize,
    },
    #[error("triangle_index[{index}] = {value} is negative")]
    NegativeTriangleIndex { index: usize, value: i32 },
    #[error("{field}[0] = {value} must start with zero")]
    GroupMarkerNonzeroStart { field: &'static str, value: u32 },
    #[error("{field}[{index}] = {value} is out of bounds of {size_field} = {size}")]
    GroupMarkerOutOfBounds {
        field: &'static str,
        index: usize,
        value: u32,
        size_field: &'static str,
        size: usize,
    },
    #[error("{field}[{index}] = {value} must be monotonically nondecreasing, but the previous value is {previous}")]
    GroupMarkerDecreasing {
        field: &'static str,
        index: usize,
        value: u32,
        previous: u32,
    },
    #[error(transparent)]
    Format(#[from] MeshFormatError),
    #[error(transparent)]
    Mesh(#[from] MeshError),
    #[error(transparent)]
    PartitionedMesh(#[from] PartitionedMeshError),
}

impl Error {
    /// Every decoding failure is caused by malformed input.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Format(e) => e.kind(),
            Error::Mesh(e) => e.kind(),
            Error::PartitionedMesh(e) => e.kind(),
            _ => ErrorKind::InvalidArgument,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
