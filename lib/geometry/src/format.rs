//! Vertex layouts of [Meshes](crate::Mesh).
//!
//! A [MeshFormat] lists the attributes stored for every vertex, in order, and derives where each
//! attribute lives in both the unpacked (all floats) and the packed vertex layout.

mod attribute;
pub use attribute::*;

use std::sync::OnceLock;

use crate::MeshFormatError;

/// The maximum number of attributes in a [MeshFormat].
pub const MAX_ATTRIBUTES: usize = 16;

/// Width of triangle indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IndexFormat {
    Bits16,
    #[default]
    Bits32,
}

impl IndexFormat {
    /// The largest number of vertices a mesh using this index format may hold.
    ///
    /// 32-bit indices are limited to the non-negative `i32` range so that they survive decoding
    /// through an integer numeric run.
    #[inline]
    pub const fn max_vertex_count(self) -> usize {
        match self {
            IndexFormat::Bits16 => 1 << 16,
            IndexFormat::Bits32 => i32::MAX as usize,
        }
    }
}

/// One attribute of a [MeshFormat], along with its position in each vertex layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Attribute {
    pub(crate) ty: AttributeType,
    pub(crate) id: AttributeId,
    pub(crate) unpacked_offset: usize,
    pub(crate) packed_offset: usize,
}

impl Attribute {
    #[inline]
    pub fn ty(&self) -> AttributeType {
        self.ty
    }

    #[inline]
    pub fn id(&self) -> AttributeId {
        self.id
    }

    #[inline]
    pub fn component_count(&self) -> usize {
        self.ty.component_count()
    }

    /// Byte offset of this attribute within an unpacked vertex.
    #[inline]
    pub fn unpacked_offset(&self) -> usize {
        self.unpacked_offset
    }

    #[inline]
    pub fn unpacked_width(&self) -> usize {
        self.ty.unpacked_size()
    }

    /// Byte offset of this attribute within a packed vertex.
    #[inline]
    pub fn packed_offset(&self) -> usize {
        self.packed_offset
    }

    #[inline]
    pub fn packed_width(&self) -> usize {
        self.ty.packed_size()
    }
}

/// The attributes of each vertex of a mesh, and the width of its triangle indices.
///
/// # Invariants
///
/// * 1 ≤ `attributes.len()` ≤ [MAX_ATTRIBUTES]
/// * attribute ids are unique
/// * exactly one attribute is [AttributeId::Position], and it has 2 components
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MeshFormat {
    attributes: Vec<Attribute>,
    index_format: IndexFormat,
    position_attribute_index: usize,
    unpacked_vertex_stride: usize,
    packed_vertex_stride: usize,
}

impl Default for MeshFormat {
    /// A single unpacked 2D position, with 32-bit indices.
    fn default() -> Self {
        default_format().clone()
    }
}

/// The shared default [MeshFormat]; see [MeshFormat::default].
pub fn default_format() -> &'static MeshFormat {
    static DEFAULT: OnceLock<MeshFormat> = OnceLock::new();
    DEFAULT.get_or_init(|| MeshFormat {
        attributes: vec![Attribute {
            ty: AttributeType::Float2Unpacked,
            id: AttributeId::Position,
            unpacked_offset: 0,
            packed_offset: 0,
        }],
        index_format: IndexFormat::Bits32,
        position_attribute_index: 0,
        unpacked_vertex_stride: AttributeType::Float2Unpacked.unpacked_size(),
        packed_vertex_stride: AttributeType::Float2Unpacked.packed_size(),
    })
}

impl MeshFormat {
    /// Construct a format from its attributes, in vertex order.
    ///
    /// # Errors
    ///
    /// * [EmptyAttributes](MeshFormatError::EmptyAttributes) if `attributes` is empty
    /// * [TooManyAttributes](MeshFormatError::TooManyAttributes) if there are more than [MAX_ATTRIBUTES]
    /// * [DuplicateId](MeshFormatError::DuplicateId) if two attributes share an id
    /// * [MissingPosition](MeshFormatError::MissingPosition) /
    ///   [PositionComponentCount](MeshFormatError::PositionComponentCount) if there is no 2-component
    ///   position attribute
    pub fn create(
        attributes: &[(AttributeType, AttributeId)],
        index_format: IndexFormat,
    ) -> Result<Self, MeshFormatError> {
        if attributes.is_empty() {
            return Err(MeshFormatError::EmptyAttributes);
        }
        if attributes.len() > MAX_ATTRIBUTES {
            return Err(MeshFormatError::TooManyAttributes(attributes.len()));
        }

        let mut position_attribute_index = None;
        let mut laid_out = Vec::with_capacity(attributes.len());
        let mut unpacked_offset = 0;
        let mut packed_offset = 0;
        for (i, &(ty, id)) in attributes.iter().enumerate() {
            if attributes[..i].iter().any(|&(_, prev)| prev == id) {
                return Err(MeshFormatError::DuplicateId(id));
            }
            if id == AttributeId::Position {
                if ty.component_count() != 2 {
                    return Err(MeshFormatError::PositionComponentCount(
                        ty,
                        ty.component_count(),
                    ));
                }
                position_attribute_index = Some(i);
            }
            laid_out.push(Attribute {
                ty,
                id,
                unpacked_offset,
                packed_offset,
            });
            unpacked_offset += ty.unpacked_size();
            packed_offset += ty.packed_size();
        }

        Ok(Self {
            attributes: laid_out,
            index_format,
            position_attribute_index: position_attribute_index
                .ok_or(MeshFormatError::MissingPosition)?,
            unpacked_vertex_stride: unpacked_offset,
            packed_vertex_stride: packed_offset,
        })
    }

    /// Construct a copy of `self` without the attributes with the given ids.
    ///
    /// # Errors
    ///
    /// * [RemovePosition](MeshFormatError::RemovePosition) if `ids` contains [AttributeId::Position]
    /// * [AbsentId](MeshFormatError::AbsentId) if `self` has no attribute with one of `ids`
    pub fn without_attributes(&self, ids: &[AttributeId]) -> Result<Self, MeshFormatError> {
        for &id in ids {
            if id == AttributeId::Position {
                return Err(MeshFormatError::RemovePosition);
            }
            if self.attribute_index(id).is_none() {
                return Err(MeshFormatError::AbsentId(id));
            }
        }
        let kept: Vec<_> = self
            .attributes
            .iter()
            .filter(|attr| !ids.contains(&attr.id))
            .map(|attr| (attr.ty, attr.id))
            .collect();
        Self::create(&kept, self.index_format)
    }

    #[inline]
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    #[inline]
    pub fn index_format(&self) -> IndexFormat {
        self.index_format
    }

    /// The index of the attribute with the given id, if present.
    pub fn attribute_index(&self, id: AttributeId) -> Option<usize> {
        self.attributes.iter().position(|attr| attr.id == id)
    }

    #[inline]
    pub fn position_attribute_index(&self) -> usize {
        self.position_attribute_index
    }

    #[inline]
    pub fn position_attribute(&self) -> &Attribute {
        &self.attributes[self.position_attribute_index]
    }

    /// The number of float components across all attributes.
    pub fn total_component_count(&self) -> usize {
        self.attributes.iter().map(Attribute::component_count).sum()
    }

    /// Bytes per vertex with every attribute unpacked to floats.
    #[inline]
    pub fn unpacked_vertex_stride(&self) -> usize {
        self.unpacked_vertex_stride
    }

    /// Bytes per vertex in packed vertex memory.
    #[inline]
    pub fn packed_vertex_stride(&self) -> usize {
        self.packed_vertex_stride
    }

    /// Whether `self` and `other` lay out packed vertex memory identically.
    pub fn is_packed_equivalent(&self, other: &Self) -> bool {
        self.attributes.len() == other.attributes.len()
            && self.position_attribute_index == other.position_attribute_index
            && self.attributes.iter().zip(&other.attributes).all(|(a, b)| {
                a.packed_offset() == b.packed_offset() && a.packed_width() == b.packed_width()
            })
    }

    /// Whether `self` and `other` have the same attributes once unpacked, regardless of packing
    /// scheme.
    pub fn is_unpacked_equivalent(&self, other: &Self) -> bool {
        self.attributes.len() == other.attributes.len()
            && self
                .attributes
                .iter()
                .zip(&other.attributes)
                .all(|(a, b)| a.id == b.id && a.component_count() == b.component_count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_unpacked_position() {
        let format = MeshFormat::default();
        assert_eq!(format.attributes().len(), 1);
        assert_eq!(format.position_attribute().ty(), AttributeType::Float2Unpacked);
        assert_eq!(format.index_format(), IndexFormat::Bits32);
        assert_eq!(format.unpacked_vertex_stride(), 8);
        assert_eq!(format.packed_vertex_stride(), 8);
        assert_eq!(
            format,
            MeshFormat::create(
                &[(AttributeType::Float2Unpacked, AttributeId::Position)],
                IndexFormat::Bits32
            )
            .unwrap()
        );
        assert!(std::ptr::eq(default_format(), default_format()));
    }

    #[test]
    fn offsets_accumulate_independently() {
        let format = MeshFormat::create(
            &[
                (AttributeType::Float3PackedInFourUnsignedBytesXyz10, AttributeId::ColorShiftHsl),
                (AttributeType::Float2PackedInThreeUnsignedBytesXy12, AttributeId::Position),
                (AttributeType::Float1Unpacked, AttributeId::OpacityShift),
            ],
            IndexFormat::Bits16,
        )
        .unwrap();
        let offsets: Vec<_> = format
            .attributes()
            .iter()
            .map(|a| (a.unpacked_offset(), a.packed_offset()))
            .collect();
        assert_eq!(offsets, vec![(0, 0), (12, 4), (20, 7)]);
        assert_eq!(format.unpacked_vertex_stride(), 24);
        assert_eq!(format.packed_vertex_stride(), 11);
        assert_eq!(format.position_attribute_index(), 1);
        assert_eq!(format.total_component_count(), 6);
    }
}
