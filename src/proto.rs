//! Wire messages, field for field.
//!
//! These mirror the persisted message schema. Enum fields carry raw `i32` values, since a message
//! from an untrusted source may hold values no enum here knows about; the codecs convert them with
//! the fallible conversions below.

use inkmesh_geometry as geom;

/// A sequence of numbers stored as `offset + scale × Σ deltas[0..=i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct CodedNumericRun {
    pub offset: f64,
    pub scale: f64,
    pub deltas: Vec<i64>,
}

impl Default for CodedNumericRun {
    fn default() -> Self {
        Self {
            offset: 0.0,
            scale: 1.0,
            deltas: Vec::new(),
        }
    }
}

/// A [MeshFormat](geom::MeshFormat): one type and id per attribute, in order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MeshFormatProto {
    /// Raw [AttributeType] values, parallel to `attribute_ids`.
    pub attribute_types: Vec<i32>,
    /// Raw [AttributeId] values, parallel to `attribute_types`.
    pub attribute_ids: Vec<i32>,
    /// Raw [IndexFormat] value.
    pub index_format: i32,
}

/// A [Mesh](geom::Mesh) with one run per vertex component.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CodedMesh {
    /// Absent for meshes stored inside a render group, which carries the format instead.
    pub format: Option<MeshFormatProto>,
    /// Position x of each vertex.
    pub x_stroke_space: Option<CodedNumericRun>,
    /// Position y of each vertex.
    pub y_stroke_space: Option<CodedNumericRun>,
    /// Three vertex indices per triangle.
    pub triangle_index: Option<CodedNumericRun>,
    /// One run per component of every non-position attribute, in attribute then component order.
    pub other_attribute_components: Vec<CodedNumericRun>,
}

/// A partitioned mesh: meshes and outlines of all render groups in flat lists, with each group's
/// format and the index of its first mesh and outline.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CodedModeledShape {
    /// Meshes of every group, each without its format.
    pub meshes: Vec<CodedMesh>,
    /// Outlines of every group; each value is a packed [VertexIndexPair](geom::VertexIndexPair).
    pub outlines: Vec<CodedNumericRun>,
    /// The format of each group.
    pub group_formats: Vec<MeshFormatProto>,
    /// Index into `meshes` of each group's first mesh.
    pub group_first_mesh_indices: Vec<u32>,
    /// Index into `outlines` of each group's first outline.
    pub group_first_outline_indices: Vec<u32>,
}

inkmesh_common::wire_enum! {
    pub enum AttributeType {
        Unspecified = 0,
        Float1Unpacked = 1,
        Float1PackedInOneUnsignedByte = 2,
        Float2Unpacked = 3,
        Float2PackedInOneFloat = 4,
        Float2PackedInThreeUnsignedBytesXy12 = 5,
        Float2PackedInFourUnsignedBytesX12Y20 = 6,
        Float3Unpacked = 7,
        Float3PackedInOneFloat = 8,
        Float3PackedInTwoFloats = 9,
        Float3PackedInFourUnsignedBytesXyz10 = 10,
        Float4Unpacked = 11,
        Float4PackedInTwoFloats = 12,
        Float4PackedInThreeFloats = 13,
    }
}

inkmesh_common::wire_enum! {
    pub enum AttributeId {
        Unspecified = 0,
        Position = 1,
        ColorShiftHsl = 2,
        OpacityShift = 3,
        Texture = 4,
        SideDerivative = 5,
        SideLabel = 6,
        ForwardDerivative = 7,
        ForwardLabel = 8,
        SurfaceUv = 9,
        AnimationOffset = 10,
        Custom0 = 11,
        Custom1 = 12,
        Custom2 = 13,
        Custom3 = 14,
        Custom4 = 15,
        Custom5 = 16,
        Custom6 = 17,
        Custom7 = 18,
        Custom8 = 19,
        Custom9 = 20,
    }
}

inkmesh_common::wire_enum! {
    pub enum IndexFormat {
        /// Treated as [Bits32](IndexFormat::Bits32), which is what data predating this field used.
        Unspecified = 0,
        Bits16 = 1,
        Bits32 = 2,
    }
}

/// Implement the infallible domain → wire conversion and the fallible wire → domain conversion
/// for a pair of enums with identically-named variants. `Unspecified` has no domain counterpart.
macro_rules! domain_conversions {
    ($Wire:ident <=> $Domain:ident { $($Variant:ident),+ $(,)? }) => {
        impl From<geom::$Domain> for $Wire {
            #[inline]
            fn from(value: geom::$Domain) -> Self {
                match value {
                    $(geom::$Domain::$Variant => $Wire::$Variant,)+
                }
            }
        }

        impl TryFrom<$Wire> for geom::$Domain {
            type Error = $Wire;

            #[inline]
            fn try_from(value: $Wire) -> Result<Self, $Wire> {
                match value {
                    $($Wire::$Variant => Ok(geom::$Domain::$Variant),)+
                    $Wire::Unspecified => Err(value),
                }
            }
        }
    };
}

domain_conversions!(AttributeType <=> AttributeType {
    Float1Unpacked,
    Float1PackedInOneUnsignedByte,
    Float2Unpacked,
    Float2PackedInOneFloat,
    Float2PackedInThreeUnsignedBytesXy12,
    Float2PackedInFourUnsignedBytesX12Y20,
    Float3Unpacked,
    Float3PackedInOneFloat,
    Float3PackedInTwoFloats,
    Float3PackedInFourUnsignedBytesXyz10,
    Float4Unpacked,
    Float4PackedInTwoFloats,
    Float4PackedInThreeFloats,
});

domain_conversions!(AttributeId <=> AttributeId {
    Position,
    ColorShiftHsl,
    OpacityShift,
    Texture,
    SideDerivative,
    SideLabel,
    ForwardDerivative,
    ForwardLabel,
    SurfaceUv,
    AnimationOffset,
    Custom0,
    Custom1,
    Custom2,
    Custom3,
    Custom4,
    Custom5,
    Custom6,
    Custom7,
    Custom8,
    Custom9,
});

domain_conversions!(IndexFormat <=> IndexFormat { Bits16, Bits32 });
