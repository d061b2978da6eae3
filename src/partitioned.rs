//! Encoding of [PartitionedMesh]es.
//!
//! Meshes and outlines of every render group are stored in flat lists. Each group stores its
//! format and the indices of its first mesh and first outline within those lists; a group spans
//! from its first index to the next group's. Shapes stored before render groups existed have no
//! group fields at all, and decode as a single group with the default format.

use std::ops::Range;

use inkmesh_geometry::{default_format, MeshFormat, PartitionedMesh, RenderGroup, VertexIndexPair};

use crate::{
    format::{decode_mesh_format, encode_mesh_format},
    mesh::{decode_mesh_using_format, encode_mesh_omitting_format},
    proto::{CodedMesh, CodedModeledShape, CodedNumericRun, MeshFormatProto},
    run, Error, Result,
};

/// Write `shape` into `out`, replacing any previous contents.
pub fn encode_partitioned_mesh(shape: &PartitionedMesh, out: &mut CodedModeledShape) {
    out.meshes.clear();
    out.outlines.clear();
    out.group_formats.clear();
    out.group_first_mesh_indices.clear();
    out.group_first_outline_indices.clear();
    tracing::trace!(
        group_count = shape.render_group_count(),
        mesh_count = shape.meshes().len(),
        outline_count = shape.outlines().len(),
        "encoding partitioned mesh"
    );

    for g in 0..shape.render_group_count() {
        out.group_first_mesh_indices.push(out.meshes.len() as u32);
        out.group_first_outline_indices
            .push(out.outlines.len() as u32);

        let mut format = MeshFormatProto::default();
        encode_mesh_format(shape.render_group_format(g), &mut format);
        out.group_formats.push(format);

        for mesh in shape.render_group_meshes(g) {
            let mut coded = CodedMesh::default();
            encode_mesh_omitting_format(mesh, &mut coded);
            out.meshes.push(coded);
        }
        for outline in shape.render_group_outlines(g) {
            // stored as i32 so that mesh indices ≥ 2¹⁵ survive the i32 decode
            out.outlines
                .push(run::encode_int(outline.iter().map(|p| p.to_packed() as i32)));
        }
    }
}

/// Validate one list of group first indices against the length of the flat list it indexes, and
/// return the span of each group.
fn group_ranges(
    field: &'static str,
    markers: &[u32],
    size_field: &'static str,
    size: usize,
) -> Result<Vec<Range<usize>>> {
    if let Some(&value) = markers.first() {
        if value != 0 {
            return Err(Error::GroupMarkerNonzeroStart { field, value });
        }
    }
    for (i, pair) in markers.windows(2).enumerate() {
        let (previous, value) = (pair[0], pair[1]);
        if value as usize > size {
            return Err(Error::GroupMarkerOutOfBounds {
                field,
                index: i + 1,
                value,
                size_field,
                size,
            });
        }
        if value < previous {
            return Err(Error::GroupMarkerDecreasing {
                field,
                index: i + 1,
                value,
                previous,
            });
        }
    }
    Ok(markers
        .iter()
        .enumerate()
        .map(|(i, &start)| {
            let end = markers.get(i + 1).map_or(size, |&end| end as usize);
            start as usize..end
        })
        .collect())
}

fn decode_outline(coded: &CodedNumericRun) -> Result<Vec<VertexIndexPair>> {
    Ok(run::decode_int(coded)?
        .map(|value| VertexIndexPair::from_packed(value as u32))
        .collect())
}

fn decode_group(
    format: MeshFormat,
    meshes: &[CodedMesh],
    outlines: &[CodedNumericRun],
) -> Result<RenderGroup> {
    Ok(RenderGroup {
        meshes: meshes
            .iter()
            .map(|mesh| decode_mesh_using_format(&format, mesh))
            .collect::<Result<_>>()?,
        outlines: outlines.iter().map(decode_outline).collect::<Result<_>>()?,
        format,
    })
}

fn decode_shape(coded: &CodedModeledShape) -> Result<PartitionedMesh> {
    let group_count = coded.group_formats.len();
    for (field, len) in [
        ("group_first_mesh_indices", coded.group_first_mesh_indices.len()),
        ("group_first_outline_indices", coded.group_first_outline_indices.len()),
    ] {
        if len != group_count {
            return Err(Error::MismatchedLengths {
                left: "group_formats",
                left_len: group_count,
                right: field,
                right_len: len,
            });
        }
    }
    tracing::trace!(
        group_count,
        mesh_count = coded.meshes.len(),
        outline_count = coded.outlines.len(),
        "decoding partitioned mesh"
    );

    if group_count == 0 {
        if coded.meshes.is_empty() {
            return Ok(PartitionedMesh::default());
        }
        tracing::debug!(
            mesh_count = coded.meshes.len(),
            "partitioned mesh has no render groups; decoding as one group with the default format"
        );
        let group = decode_group(default_format().clone(), &coded.meshes, &coded.outlines)?;
        return Ok(PartitionedMesh::from_groups(vec![group])?);
    }

    let mesh_ranges = group_ranges(
        "group_first_mesh_indices",
        &coded.group_first_mesh_indices,
        "meshes_size",
        coded.meshes.len(),
    )?;
    let outline_ranges = group_ranges(
        "group_first_outline_indices",
        &coded.group_first_outline_indices,
        "outlines_size",
        coded.outlines.len(),
    )?;

    let groups = coded
        .group_formats
        .iter()
        .zip(mesh_ranges)
        .zip(outline_ranges)
        .map(|((format, meshes), outlines)| {
            decode_group(
                decode_mesh_format(format)?,
                &coded.meshes[meshes],
                &coded.outlines[outlines],
            )
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(PartitionedMesh::from_groups(groups)?)
}

/// Read a partitioned mesh from `coded`.
///
/// # Errors
///
/// * [MismatchedLengths](Error::MismatchedLengths) if the `group_*` lists differ in length
/// * [GroupMarkerNonzeroStart](Error::GroupMarkerNonzeroStart),
///   [GroupMarkerOutOfBounds](Error::GroupMarkerOutOfBounds) or
///   [GroupMarkerDecreasing](Error::GroupMarkerDecreasing) if the group first indices don't
///   describe consecutive spans of the flat lists
/// * any error decoding a group format, mesh or outline
/// * [PartitionedMesh](Error::PartitionedMesh) if an outline references a missing vertex
pub fn decode_partitioned_mesh(coded: &CodedModeledShape) -> Result<PartitionedMesh> {
    let res = decode_shape(coded);
    if let Err(error) = &res {
        tracing::debug!(%error, "rejected coded partitioned mesh");
    }
    res
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranges_span_to_next_marker() {
        assert_eq!(
            group_ranges("m", &[0, 0, 2, 5], "s", 5),
            Ok(vec![0..0, 0..2, 2..5, 5..5])
        );
        assert_eq!(group_ranges("m", &[], "s", 3), Ok(vec![]));
    }

    #[test]
    fn ranges_reject_bad_markers() {
        assert_eq!(
            group_ranges("m", &[1], "s", 3),
            Err(Error::GroupMarkerNonzeroStart { field: "m", value: 1 })
        );
        assert_eq!(
            group_ranges("m", &[0, 4], "s", 3),
            Err(Error::GroupMarkerOutOfBounds {
                field: "m",
                index: 1,
                value: 4,
                size_field: "s",
                size: 3
            })
        );
        assert_eq!(
            group_ranges("m", &[0, 2, 1], "s", 3),
            Err(Error::GroupMarkerDecreasing {
                field: "m",
                index: 2,
                value: 1,
                previous: 2
            })
        );
    }

    #[test]
    fn high_mesh_indices_survive_outline_coding() {
        let outline = vec![
            VertexIndexPair::new(0xFFFF, 0xFFFF),
            VertexIndexPair::new(0x8000, 1),
            VertexIndexPair::new(0, 0),
        ];
        let coded = run::encode_int(outline.iter().map(|p| p.to_packed() as i32));
        assert_eq!(decode_outline(&coded), Ok(outline));
    }
}
