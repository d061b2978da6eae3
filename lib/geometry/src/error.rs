use crate::{AttributeId, AttributeType, ComponentCodingParams, IndexFormat, MAX_ATTRIBUTES};

/// The category of an error.
///
/// Every failure in this workspace is caused by malformed or out-of-range input; there is no
/// internal error reachable from any input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidArgument,
}

/// Errors constructing a [MeshFormat](crate::MeshFormat).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MeshFormatError {
    #[error("Empty attributes; a mesh format needs at least a position attribute")]
    EmptyAttributes,
    #[error("Too many attributes: {0} > {max}", max = MAX_ATTRIBUTES)]
    TooManyAttributes(usize),
    #[error("Duplicate attribute id {0:?}")]
    DuplicateId(AttributeId),
    #[error("No attribute has id Position")]
    MissingPosition,
    #[error("Position attribute must have 2 components, but {0:?} has {1}")]
    PositionComponentCount(AttributeType, usize),
    #[error("The position attribute cannot be removed")]
    RemovePosition,
    #[error("Cannot remove attribute {0:?}, which is not in the format")]
    AbsentId(AttributeId),
}

/// Errors constructing a [Mesh](crate::Mesh).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MeshError {
    #[error("Expected {expected} component columns for the mesh format, got {actual}")]
    ColumnCount { expected: usize, actual: usize },
    #[error("Component column {column} has {actual} values, but column 0 has {expected}")]
    ColumnLength {
        column: usize,
        expected: usize,
        actual: usize,
    },
    #[error("Too many vertices for {index_format:?} indices: {count} > {max}")]
    TooManyVertices {
        index_format: IndexFormat,
        count: usize,
        max: usize,
    },
    #[error("Triangle index count {0} is not a multiple of 3")]
    PartialTriangle(usize),
    #[error("Triangle {triangle} references vertex {index}, but the mesh has {vertex_count} vertices")]
    TriangleIndexOutOfBounds {
        triangle: usize,
        index: u32,
        vertex_count: usize,
    },
    #[error("Attribute {attribute} component {component} has non-finite value {value} at vertex {vertex}")]
    NonFiniteValue {
        attribute: usize,
        component: usize,
        vertex: usize,
        value: f32,
    },
    #[error("Attribute {attribute} has unpacked type {ty:?} and cannot take quantized values")]
    QuantizedUnpackedAttribute { attribute: usize, ty: AttributeType },
    #[error("Attribute {attribute} component {component} has invalid coding params {params:?}")]
    InvalidCodingParams {
        attribute: usize,
        component: usize,
        params: ComponentCodingParams,
    },
    #[error("Attribute {attribute} component {component} has value {value} at vertex {vertex}, which does not fit in {bits} bits")]
    QuantizedOutOfRange {
        attribute: usize,
        component: usize,
        vertex: usize,
        value: u32,
        bits: u8,
    },
}

/// Errors constructing a [PartitionedMesh](crate::PartitionedMesh).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PartitionedMeshError {
    #[error("Mesh {mesh} of render group {group} does not use the group's format")]
    FormatMismatch { group: usize, mesh: usize },
    #[error("Render group {group} has {count} meshes; outlines can address at most {max}", max = u16::MAX as usize + 1)]
    TooManyMeshes { group: usize, count: usize },
    #[error("Outline {outline} of render group {group} references mesh {mesh_index} at point {point}, but the group has {mesh_count} meshes")]
    OutlineMeshOutOfBounds {
        group: usize,
        outline: usize,
        point: usize,
        mesh_index: u16,
        mesh_count: usize,
    },
    #[error("Outline {outline} of render group {group} references vertex {vertex_index} of mesh {mesh_index} at point {point}, but that mesh has {vertex_count} vertices")]
    OutlineVertexOutOfBounds {
        group: usize,
        outline: usize,
        point: usize,
        mesh_index: u16,
        vertex_index: u16,
        vertex_count: u32,
    },
}

impl MeshFormatError {
    /// Every format error is caused by invalid input.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::InvalidArgument
    }
}

impl MeshError {
    /// Every mesh error is caused by invalid input.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::InvalidArgument
    }
}

impl PartitionedMeshError {
    /// Every partitioned mesh error is caused by invalid input.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::InvalidArgument
    }
}
