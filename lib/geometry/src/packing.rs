//! Fixed-precision packing of float attribute components.
//!
//! A packed component is an unsigned integer `q` of some bit width, and unpacks to
//! `offset + scale × q` using the [ComponentCodingParams] of that component. For a component with
//! values in `[min, max]` packed with `bits` bits, [ComponentCodingParams::for_range] guarantees a
//! maximum unpacking error of `0.5 × (max − min) / (2^bits − 1)`.

use crate::{format::PackedStorage, AttributeType, ComponentArray};

/// The largest integer representable by `bits` bits.
#[inline]
pub const fn max_quantized(bits: u8) -> u32 {
    if bits >= 32 {
        u32::MAX
    } else {
        (1u32 << bits) - 1
    }
}

/// The affine transform mapping one packed integer component back to its float value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComponentCodingParams {
    pub offset: f32,
    pub scale: f32,
}

/// The coding params of each component of one packed attribute.
pub type AttributeCodingParams = ComponentArray<ComponentCodingParams>;

impl Default for ComponentCodingParams {
    fn default() -> Self {
        Self {
            offset: 0.0,
            scale: 1.0,
        }
    }
}

impl ComponentCodingParams {
    #[inline]
    pub fn new(offset: f32, scale: f32) -> Self {
        Self { offset, scale }
    }

    /// Params are usable iff both values are finite and the scale is positive.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.offset.is_finite() && self.scale.is_finite() && self.scale > 0.0
    }

    /// Choose params which spread `bits` bits of precision evenly over `[min, max]`.
    ///
    /// A zero-width range (e.g. the bounds of a single vertex) gets a scale of 1, so that the
    /// params are always [valid](Self::is_valid) for finite inputs.
    pub fn for_range(min: f32, max: f32, bits: u8) -> Self {
        let range = f64::from(max) - f64::from(min);
        if range <= 0.0 {
            return Self::new(min, 1.0);
        }
        let scale = (range / f64::from(max_quantized(bits))) as f32;
        Self {
            offset: min,
            // a range narrower than the smallest subnormal step can't be spread any further
            scale: if scale > 0.0 {
                scale
            } else {
                f32::from_bits(1)
            },
        }
    }

    /// The packed integer nearest to `value`, clamped to `bits` bits.
    pub fn quantize(&self, value: f32, bits: u8) -> u32 {
        let q = ((f64::from(value) - f64::from(self.offset)) / f64::from(self.scale)).round();
        q.clamp(0.0, f64::from(max_quantized(bits))) as u32
    }

    /// The float value of a packed integer, computed in double precision.
    #[inline]
    pub fn dequantize(&self, quantized: u32) -> f32 {
        (f64::from(self.offset) + f64::from(self.scale) * f64::from(quantized)) as f32
    }
}

/// Write the components of one attribute value of type `ty` into `out`.
///
/// `out` must be exactly `ty.packed_size()` bytes long. Unpacked types write `floats`; packed
/// types write `quantized`.
pub(crate) fn write_attribute(ty: AttributeType, floats: &[f32], quantized: &[u32], out: &mut [u8]) {
    let Some(scheme) = ty.packing_scheme() else {
        for (chunk, value) in out.chunks_exact_mut(4).zip(floats) {
            chunk.copy_from_slice(&value.to_le_bytes());
        }
        return;
    };

    // concatenate components, most significant first
    let mut word: u128 = 0;
    for (&q, &bits) in quantized.iter().zip(scheme.bits) {
        word = (word << bits) | u128::from(q & max_quantized(bits));
    }

    match scheme.storage {
        PackedStorage::Bytes(n) => {
            for (i, byte) in out.iter_mut().enumerate().take(n) {
                *byte = (word >> (8 * (n - 1 - i))) as u8;
            }
        }
        PackedStorage::Floats(n) => {
            for (i, chunk) in out.chunks_exact_mut(4).enumerate().take(n) {
                let value = ((word >> (24 * (n - 1 - i))) & 0xFF_FFFF) as u32;
                // exact: value < 2²⁴
                chunk.copy_from_slice(&(value as f32).to_le_bytes());
            }
        }
    }
}

/// Read the packed integer components of one attribute value of a packed type `ty` from `bytes`.
///
/// Returns `None` if `ty` is unpacked.
pub(crate) fn read_quantized(ty: AttributeType, bytes: &[u8]) -> Option<ComponentArray<u32>> {
    let scheme = ty.packing_scheme()?;
    let mut word: u128 = 0;
    match scheme.storage {
        PackedStorage::Bytes(n) => {
            for &byte in bytes.iter().take(n) {
                word = (word << 8) | u128::from(byte);
            }
        }
        PackedStorage::Floats(n) => {
            for chunk in bytes.chunks_exact(4).take(n) {
                let value = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
                word = (word << 24) | u128::from(value as u32 & 0xFF_FFFF);
            }
        }
    }

    let mut remaining = scheme.total_bits();
    Some(ComponentArray::from_fn(scheme.bits.len(), |i| {
        let bits = scheme.bits[i];
        remaining -= bits as usize;
        (word >> remaining) as u32 & max_quantized(bits)
    }))
}

/// Read the float components of one attribute value of an unpacked type from `bytes`.
pub(crate) fn read_floats(ty: AttributeType, bytes: &[u8]) -> ComponentArray<f32> {
    ComponentArray::from_fn(ty.component_count(), |i| {
        let b = &bytes[4 * i..4 * i + 4];
        f32::from_le_bytes([b[0], b[1], b[2], b[3]])
    })
}
