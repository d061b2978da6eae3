//! Delta coding of numeric sequences.
//!
//! A [CodedNumericRun] stores value `i` as `offset + scale × Σ deltas[0..=i]`. Every coordinate,
//! attribute component and index stream of a mesh is stored this way, so that smoothly-varying
//! values become small deltas.
//!
//! Decoded sequences are lazy iterators borrowing the run they decode; re-decode the run to
//! restart one.

use std::iter::FusedIterator;

use inkmesh_geometry::{packing::max_quantized, ComponentCodingParams};
use num_traits::AsPrimitive;

use crate::{proto::CodedNumericRun, Error, Result};

fn deltas<I, T>(values: I) -> Vec<i64>
where
    I: IntoIterator<Item = T>,
    T: AsPrimitive<i64>,
{
    let mut prev = 0i64;
    values
        .into_iter()
        .map(|v| {
            let v: i64 = v.as_();
            let delta = v.wrapping_sub(prev);
            prev = v;
            delta
        })
        .collect()
}

/// Encode integers with offset 0 and scale 1.
pub fn encode_int<I, T>(values: I) -> CodedNumericRun
where
    I: IntoIterator<Item = T>,
    T: AsPrimitive<i64>,
{
    CodedNumericRun {
        offset: 0.0,
        scale: 1.0,
        deltas: deltas(values),
    }
}

/// The power of two by which every nonzero finite `value` is an integer multiple.
fn trailing_exponent(value: f32) -> i32 {
    let bits = value.to_bits();
    let biased = ((bits >> 23) & 0xFF) as i32;
    let mantissa = bits & 0x7F_FFFF;
    let (significand, exponent) = match biased {
        0 => (mantissa, -149),
        _ => (mantissa | 0x80_0000, biased - 150),
    };
    exponent + significand.trailing_zeros() as i32
}

/// The largest power-of-two scale (at most 1) on which every value lies, coarsened only if the
/// largest magnitude would otherwise need more than 2⁵³ steps.
fn float_run_scale(values: &[f32]) -> f64 {
    let finite = values.iter().copied().filter(|v| v.is_finite());
    let mut exponent = finite
        .clone()
        .filter(|&v| v != 0.0)
        .map(trailing_exponent)
        .min()
        .unwrap_or(0)
        .min(0);
    let magnitude = finite.map(|v| f64::from(v.abs())).fold(0.0, f64::max);
    while magnitude / 2f64.powi(exponent) > 2f64.powi(53) {
        exponent += 1;
    }
    2f64.powi(exponent)
}

/// Encode floats with offset 0 and a power-of-two scale fitted to the values.
///
/// For finite values whose magnitudes span fewer than 53 binary orders, decoding reproduces
/// every value exactly. The scale is always finite and positive, including for a single value or
/// a constant sequence.
pub fn encode_float(values: &[f32]) -> CodedNumericRun {
    let scale = float_run_scale(values);
    let mut prev = 0i64;
    let deltas = values
        .iter()
        .map(|&v| {
            // `as` saturates, and maps NaN to 0
            let steps = (f64::from(v) / scale).round() as i64;
            let delta = steps.wrapping_sub(prev);
            prev = steps;
            delta
        })
        .collect();
    CodedNumericRun {
        offset: 0.0,
        scale,
        deltas,
    }
}

/// Encode packed integer components, keeping the params which unpack them.
pub fn encode_quantized(
    values: impl IntoIterator<Item = u32>,
    params: ComponentCodingParams,
) -> CodedNumericRun {
    CodedNumericRun {
        offset: f64::from(params.offset),
        scale: f64::from(params.scale),
        deltas: deltas(values),
    }
}

/// Lazily decoded floats of a [CodedNumericRun]; see [decode_float].
#[derive(Debug, Clone)]
pub struct DecodedFloats<'run> {
    offset: f64,
    scale: f64,
    sum: i64,
    deltas: std::slice::Iter<'run, i64>,
}

impl Iterator for DecodedFloats<'_> {
    type Item = f32;

    #[inline]
    fn next(&mut self) -> Option<f32> {
        self.sum = self.sum.saturating_add(*self.deltas.next()?);
        Some((self.offset + self.scale * self.sum as f64) as f32)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.deltas.size_hint()
    }
}

impl ExactSizeIterator for DecodedFloats<'_> {}
impl FusedIterator for DecodedFloats<'_> {}

/// Decode a run as floats, each computed in double precision and then narrowed.
///
/// # Errors
///
/// * [NonFiniteRun](Error::NonFiniteRun) if the offset or scale is NaN or infinite
pub fn decode_float(run: &CodedNumericRun) -> Result<DecodedFloats<'_>> {
    if !run.offset.is_finite() || !run.scale.is_finite() {
        return Err(Error::NonFiniteRun {
            offset: run.offset,
            scale: run.scale,
        });
    }
    Ok(DecodedFloats {
        offset: run.offset,
        scale: run.scale,
        sum: 0,
        deltas: run.deltas.iter(),
    })
}

/// Lazily decoded integers of a [CodedNumericRun]; see [decode_int].
#[derive(Debug, Clone)]
pub struct DecodedInts<'run> {
    offset: i64,
    scale: i64,
    sum: i64,
    deltas: std::slice::Iter<'run, i64>,
}

impl Iterator for DecodedInts<'_> {
    type Item = i32;

    #[inline]
    fn next(&mut self) -> Option<i32> {
        self.sum = self.sum.saturating_add(*self.deltas.next()?);
        let value = self.offset.saturating_add(self.scale.saturating_mul(self.sum));
        Some(value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.deltas.size_hint()
    }
}

impl ExactSizeIterator for DecodedInts<'_> {}
impl FusedIterator for DecodedInts<'_> {}

/// `value` as an `i64`, if it is an integer within range.
fn exact_i64(value: f64) -> Option<i64> {
    // -2⁶³ is exact in f64, 2⁶³ - 1 is not
    let in_range = value >= i64::MIN as f64 && value < -(i64::MIN as f64);
    (value.is_finite() && value.fract() == 0.0 && in_range).then_some(value as i64)
}

/// Decode a run as integers.
///
/// Values are computed in saturating 64-bit arithmetic and clamped to the `i32` range, so that
/// adversarial runs decode without overflow.
///
/// # Errors
///
/// * [NonIntegralRun](Error::NonIntegralRun) if the offset or scale is not an integer
pub fn decode_int(run: &CodedNumericRun) -> Result<DecodedInts<'_>> {
    match (exact_i64(run.offset), exact_i64(run.scale)) {
        (Some(offset), Some(scale)) => Ok(DecodedInts {
            offset,
            scale,
            sum: 0,
            deltas: run.deltas.iter(),
        }),
        _ => Err(Error::NonIntegralRun {
            offset: run.offset,
            scale: run.scale,
        }),
    }
}

/// Decode a run of packed integer components with `bits` bits each, along with the params which
/// unpack them.
///
/// # Errors
///
/// * [InvalidCodingParams](Error::InvalidCodingParams) if the offset and scale aren't
///   [valid](ComponentCodingParams::is_valid) once narrowed to `f32`
/// * [QuantizedOutOfRange](Error::QuantizedOutOfRange) if any value is outside `0..2^bits`
pub fn decode_quantized(
    run: &CodedNumericRun,
    bits: u8,
) -> Result<(ComponentCodingParams, Vec<u32>)> {
    let params = ComponentCodingParams::new(run.offset as f32, run.scale as f32);
    if !run.offset.is_finite() || !run.scale.is_finite() || !params.is_valid() {
        return Err(Error::InvalidCodingParams {
            offset: run.offset,
            scale: run.scale,
        });
    }

    let max = i64::from(max_quantized(bits));
    let mut sum = 0i64;
    let values = run
        .deltas
        .iter()
        .enumerate()
        .map(|(index, &delta)| {
            sum = sum.saturating_add(delta);
            if (0..=max).contains(&sum) {
                Ok(sum as u32)
            } else {
                Err(Error::QuantizedOutOfRange {
                    index,
                    value: sum,
                    bits,
                })
            }
        })
        .collect::<Result<Vec<_>>>()?;
    Ok((params, values))
}
