//! Encoding of [Mesh]es.
//!
//! Position components go to `x_stroke_space` and `y_stroke_space`, the components of every other
//! attribute to `other_attribute_components`, and triangle indices to `triangle_index`. Unpacked
//! attributes are stored as floats; packed attributes as their packed integers along with the
//! mesh's coding params, so that decoding reproduces the packed vertex data exactly.

use inkmesh_geometry::{
    default_format, ComponentCodingParams, ComponentColumn, Mesh, MeshFormat,
};

use crate::{
    format::{decode_mesh_format, encode_mesh_format},
    proto::{CodedMesh, CodedNumericRun, MeshFormatProto},
    run, Error, Result,
};

fn encode_component(mesh: &Mesh, attribute: usize, component: usize) -> CodedNumericRun {
    let vertices = 0..mesh.vertex_count();
    match mesh.coding_params(attribute) {
        Some(params) => run::encode_quantized(
            vertices
                .filter_map(|v| mesh.quantized_vertex_attribute(v, attribute))
                .map(|q| q[component]),
            params[component],
        ),
        None => {
            let values: Vec<f32> = vertices
                .map(|v| mesh.float_vertex_attribute(v, attribute)[component])
                .collect();
            run::encode_float(&values)
        }
    }
}

/// Write `mesh` into `out` without its format, replacing any previous contents.
///
/// A mesh without vertices clears every run.
pub fn encode_mesh_omitting_format(mesh: &Mesh, out: &mut CodedMesh) {
    out.format = None;
    out.other_attribute_components.clear();
    if mesh.vertex_count() == 0 {
        out.x_stroke_space = None;
        out.y_stroke_space = None;
        out.triangle_index = None;
        return;
    }
    tracing::trace!(
        vertex_count = mesh.vertex_count(),
        triangle_count = mesh.triangle_count(),
        "encoding mesh"
    );

    let format = mesh.format();
    for (a, attr) in format.attributes().iter().enumerate() {
        let mut runs = (0..attr.component_count()).map(|c| encode_component(mesh, a, c));
        if a == format.position_attribute_index() {
            out.x_stroke_space = runs.next();
            out.y_stroke_space = runs.next();
        } else {
            out.other_attribute_components.extend(runs);
        }
    }
    out.triangle_index = Some(run::encode_int(mesh.triangle_index_data().iter().copied()));
}

/// Write `mesh` into `out` along with its format.
pub fn encode_mesh(mesh: &Mesh, out: &mut CodedMesh) {
    encode_mesh_omitting_format(mesh, out);
    let mut format = MeshFormatProto::default();
    encode_mesh_format(mesh.format(), &mut format);
    out.format = Some(format);
}

/// Decoded values of one component, owned until they're handed to [Mesh::create_from_components].
enum DecodedColumn {
    Floats(Vec<f32>),
    Quantized(Vec<u32>, ComponentCodingParams),
}

impl DecodedColumn {
    fn decode(run: &CodedNumericRun, bits: Option<u8>) -> Result<Self> {
        Ok(match bits {
            Some(bits) => {
                let (params, values) = run::decode_quantized(run, bits)?;
                DecodedColumn::Quantized(values, params)
            }
            None => DecodedColumn::Floats(run::decode_float(run)?.collect()),
        })
    }

    fn as_column(&self) -> ComponentColumn<'_> {
        match self {
            DecodedColumn::Floats(values) => ComponentColumn::Values(values),
            DecodedColumn::Quantized(values, params) => ComponentColumn::Quantized {
                values,
                params: *params,
            },
        }
    }
}

/// Read a mesh with the given `format` from `coded`, ignoring any format stored in `coded`.
///
/// Absent runs are empty. Data without `other_attribute_components` decodes every non-position
/// attribute as zeros.
///
/// # Errors
///
/// * [NonFiniteRun](Error::NonFiniteRun), [NonIntegralRun](Error::NonIntegralRun),
///   [InvalidCodingParams](Error::InvalidCodingParams) or
///   [QuantizedOutOfRange](Error::QuantizedOutOfRange) if a run can't be decoded
/// * [MismatchedLengths](Error::MismatchedLengths),
///   [OtherComponentCount](Error::OtherComponentCount) or
///   [OtherComponentLength](Error::OtherComponentLength) if the runs don't agree on a vertex count
/// * [NegativeTriangleIndex](Error::NegativeTriangleIndex) if a triangle index is negative
/// * [Mesh](Error::Mesh) if the decoded values don't form a valid mesh
pub fn decode_mesh_using_format(format: &MeshFormat, coded: &CodedMesh) -> Result<Mesh> {
    let empty = CodedNumericRun::default();
    let x = coded.x_stroke_space.as_ref().unwrap_or(&empty);
    let y = coded.y_stroke_space.as_ref().unwrap_or(&empty);
    let triangles = coded.triangle_index.as_ref().unwrap_or(&empty);

    let vertex_count = x.deltas.len();
    if y.deltas.len() != vertex_count {
        return Err(Error::MismatchedLengths {
            left: "x_stroke_space",
            left_len: vertex_count,
            right: "y_stroke_space",
            right_len: y.deltas.len(),
        });
    }
    tracing::trace!(
        vertex_count,
        index_count = triangles.deltas.len(),
        "decoding mesh"
    );

    let others = &coded.other_attribute_components;
    if !others.is_empty() {
        let expected = format.total_component_count() - format.position_attribute().component_count();
        if others.len() != expected {
            return Err(Error::OtherComponentCount {
                expected,
                actual: others.len(),
            });
        }
        if let Some((index, run)) = others
            .iter()
            .enumerate()
            .find(|(_, run)| run.deltas.len() != vertex_count)
        {
            return Err(Error::OtherComponentLength {
                index,
                expected: vertex_count,
                actual: run.deltas.len(),
            });
        }
    }

    let mut columns = Vec::with_capacity(format.total_component_count());
    let mut others = others.iter();
    for (a, attr) in format.attributes().iter().enumerate() {
        let bits = attr.ty().packed_bits_per_component();
        for c in 0..attr.component_count() {
            let run = match a == format.position_attribute_index() {
                true if c == 0 => Some(x),
                true => Some(y),
                false => others.next(),
            };
            columns.push(match run {
                Some(run) => DecodedColumn::decode(run, bits.map(|bits| bits[c]))?,
                None => DecodedColumn::Floats(vec![0.0; vertex_count]),
            });
        }
    }

    let triangle_indices = run::decode_int(triangles)?
        .enumerate()
        .map(|(index, value)| {
            u32::try_from(value).map_err(|_| Error::NegativeTriangleIndex { index, value })
        })
        .collect::<Result<Vec<_>>>()?;

    let columns: Vec<_> = columns.iter().map(DecodedColumn::as_column).collect();
    Ok(Mesh::create_from_components(
        format.clone(),
        &columns,
        &triangle_indices,
    )?)
}

/// Read a mesh from `coded`, using its stored format, or the [default format](default_format) if
/// it has none.
pub fn decode_mesh(coded: &CodedMesh) -> Result<Mesh> {
    let res = match &coded.format {
        Some(format) => decode_mesh_format(format)
            .and_then(|format| decode_mesh_using_format(&format, coded)),
        None => decode_mesh_using_format(default_format(), coded),
    };
    if let Err(error) = &res {
        tracing::debug!(%error, "rejected coded mesh");
    }
    res
}
