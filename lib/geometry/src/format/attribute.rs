/// The maximum number of components in any vertex attribute.
pub const MAX_COMPONENTS: usize = 4;

/// The shape of a vertex attribute's value and, for packed types, the fixed-precision scheme used
/// to store it.
///
/// Every type unpacks to `f32` components; packed types store each component as an unsigned
/// integer of a fixed bit width, which is mapped back to a float through per-component
/// [coding params](crate::ComponentCodingParams).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeType {
    Float1Unpacked,
    /// 8 bits in one byte.
    Float1PackedInOneUnsignedByte,
    Float2Unpacked,
    /// 12 bits per component, stored as the 24-bit integer value of one float.
    Float2PackedInOneFloat,
    /// 12 bits per component in three bytes.
    Float2PackedInThreeUnsignedBytesXy12,
    /// 12 bits for X and 20 bits for Y, in four bytes.
    Float2PackedInFourUnsignedBytesX12Y20,
    Float3Unpacked,
    /// 8 bits per component, stored as the 24-bit integer value of one float.
    Float3PackedInOneFloat,
    /// 16 bits per component, split across the integer values of two floats.
    Float3PackedInTwoFloats,
    /// 10 bits per component in four bytes.
    Float3PackedInFourUnsignedBytesXyz10,
    Float4Unpacked,
    /// 12 bits per component, split across the integer values of two floats.
    Float4PackedInTwoFloats,
    /// 18 bits per component, split across the integer values of three floats.
    Float4PackedInThreeFloats,
}

/// Where the bits of a packed attribute live within a vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PackedStorage {
    /// Big-endian in this many bytes.
    Bytes(usize),
    /// In 24-bit chunks, each stored as the exact float value of the chunk.
    Floats(usize),
}

impl PackedStorage {
    #[inline]
    pub const fn size_bytes(self) -> usize {
        match self {
            PackedStorage::Bytes(n) => n,
            PackedStorage::Floats(n) => n * 4,
        }
    }

    /// The number of bits available to packed components.
    #[inline]
    pub const fn capacity_bits(self) -> usize {
        match self {
            PackedStorage::Bytes(n) => n * 8,
            PackedStorage::Floats(n) => n * 24,
        }
    }
}

/// The bit widths and storage of a packed [AttributeType].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PackingScheme {
    pub bits: &'static [u8],
    pub storage: PackedStorage,
}

impl PackingScheme {
    /// Total number of bits used by all components.
    pub const fn total_bits(&self) -> usize {
        let mut total = 0;
        let mut i = 0;
        while i < self.bits.len() {
            total += self.bits[i] as usize;
            i += 1;
        }
        total
    }
}

impl AttributeType {
    pub const ALL: [AttributeType; 13] = [
        AttributeType::Float1Unpacked,
        AttributeType::Float1PackedInOneUnsignedByte,
        AttributeType::Float2Unpacked,
        AttributeType::Float2PackedInOneFloat,
        AttributeType::Float2PackedInThreeUnsignedBytesXy12,
        AttributeType::Float2PackedInFourUnsignedBytesX12Y20,
        AttributeType::Float3Unpacked,
        AttributeType::Float3PackedInOneFloat,
        AttributeType::Float3PackedInTwoFloats,
        AttributeType::Float3PackedInFourUnsignedBytesXyz10,
        AttributeType::Float4Unpacked,
        AttributeType::Float4PackedInTwoFloats,
        AttributeType::Float4PackedInThreeFloats,
    ];

    pub const fn component_count(self) -> usize {
        use AttributeType::*;
        match self {
            Float1Unpacked | Float1PackedInOneUnsignedByte => 1,
            Float2Unpacked
            | Float2PackedInOneFloat
            | Float2PackedInThreeUnsignedBytesXy12
            | Float2PackedInFourUnsignedBytesX12Y20 => 2,
            Float3Unpacked
            | Float3PackedInOneFloat
            | Float3PackedInTwoFloats
            | Float3PackedInFourUnsignedBytesXyz10 => 3,
            Float4Unpacked | Float4PackedInTwoFloats | Float4PackedInThreeFloats => 4,
        }
    }

    /// The packing scheme of this type, or `None` if its components are stored as plain floats.
    pub const fn packing_scheme(self) -> Option<PackingScheme> {
        use AttributeType::*;
        use PackedStorage::*;
        let (bits, storage): (&'static [u8], PackedStorage) = match self {
            Float1Unpacked | Float2Unpacked | Float3Unpacked | Float4Unpacked => return None,
            Float1PackedInOneUnsignedByte => (&[8], Bytes(1)),
            Float2PackedInOneFloat => (&[12, 12], Floats(1)),
            Float2PackedInThreeUnsignedBytesXy12 => (&[12, 12], Bytes(3)),
            Float2PackedInFourUnsignedBytesX12Y20 => (&[12, 20], Bytes(4)),
            Float3PackedInOneFloat => (&[8, 8, 8], Floats(1)),
            Float3PackedInTwoFloats => (&[16, 16, 16], Floats(2)),
            Float3PackedInFourUnsignedBytesXyz10 => (&[10, 10, 10], Bytes(4)),
            Float4PackedInTwoFloats => (&[12, 12, 12, 12], Floats(2)),
            Float4PackedInThreeFloats => (&[18, 18, 18, 18], Floats(3)),
        };
        Some(PackingScheme { bits, storage })
    }

    /// Bits used by each packed component, or `None` for unpacked types.
    #[inline]
    pub const fn packed_bits_per_component(self) -> Option<&'static [u8]> {
        match self.packing_scheme() {
            Some(scheme) => Some(scheme.bits),
            None => None,
        }
    }

    #[inline]
    pub const fn is_unpacked(self) -> bool {
        self.packing_scheme().is_none()
    }

    /// Size in bytes of one value of this type once unpacked to floats.
    #[inline]
    pub const fn unpacked_size(self) -> usize {
        self.component_count() * std::mem::size_of::<f32>()
    }

    /// Size in bytes of one value of this type in packed vertex memory.
    #[inline]
    pub const fn packed_size(self) -> usize {
        match self.packing_scheme() {
            Some(scheme) => scheme.storage.size_bytes(),
            None => self.unpacked_size(),
        }
    }
}

// every packing scheme must fit its storage and never be wider than the unpacked value
const fn layout_tables_consistent() -> bool {
    let mut i = 0;
    while i < AttributeType::ALL.len() {
        let ty = AttributeType::ALL[i];
        if ty.packed_size() > ty.unpacked_size() {
            return false;
        }
        if let Some(scheme) = ty.packing_scheme() {
            if scheme.bits.len() != ty.component_count() {
                return false;
            }
            if scheme.total_bits() > scheme.storage.capacity_bits() {
                return false;
            }
        }
        i += 1;
    }
    true
}

static_assertions::const_assert!(layout_tables_consistent());

/// What a vertex attribute means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeId {
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
}

impl AttributeId {
    pub const ALL: [AttributeId; 20] = [
        AttributeId::Position,
        AttributeId::ColorShiftHsl,
        AttributeId::OpacityShift,
        AttributeId::Texture,
        AttributeId::SideDerivative,
        AttributeId::SideLabel,
        AttributeId::ForwardDerivative,
        AttributeId::ForwardLabel,
        AttributeId::SurfaceUv,
        AttributeId::AnimationOffset,
        AttributeId::Custom0,
        AttributeId::Custom1,
        AttributeId::Custom2,
        AttributeId::Custom3,
        AttributeId::Custom4,
        AttributeId::Custom5,
        AttributeId::Custom6,
        AttributeId::Custom7,
        AttributeId::Custom8,
        AttributeId::Custom9,
    ];
}
