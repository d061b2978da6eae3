use inkmesh::{
    decode_mesh, decode_mesh_using_format, encode_mesh, encode_mesh_omitting_format,
    proto::{CodedMesh, CodedNumericRun},
    run, Error,
};
use inkmesh_geometry::{
    packing::max_quantized, AttributeId, AttributeType, ErrorKind, IndexFormat, Mesh, MeshError,
    MeshFormat,
};
use nalgebra::Point2;
use quickcheck_macros::quickcheck;

fn packed_format() -> MeshFormat {
    MeshFormat::create(
        &[
            (AttributeType::Float3PackedInFourUnsignedBytesXyz10, AttributeId::ColorShiftHsl),
            (AttributeType::Float2PackedInThreeUnsignedBytesXy12, AttributeId::Position),
            (AttributeType::Float1Unpacked, AttributeId::OpacityShift),
            (AttributeType::Float4PackedInThreeFloats, AttributeId::Custom2),
        ],
        IndexFormat::Bits16,
    )
    .unwrap()
}

fn packed_mesh() -> Mesh {
    Mesh::create(
        packed_format(),
        &[
            &[0.0, 0.5, 1.0, 0.25],
            &[-1.0, 0.0, 1.0, 0.5],
            &[0.1, 0.2, 0.3, 0.4],
            &[10.0, 20.5, 31.0, -4.0],
            &[-2.0, 3.0, 7.75, 0.0],
            &[1.0, 0.75, 0.5, 0.25],
            &[0.0, 0.0, 0.0, 0.0],
            &[1.0, 2.0, 3.0, 4.0],
            &[-1.0, -2.0, -3.0, -4.0],
            &[100.0, 0.0, 50.0, 25.0],
        ],
        &[0, 1, 2, 2, 3, 0],
    )
    .unwrap()
}

#[test]
fn default_format_deltas() {
    let mesh = Mesh::create(
        MeshFormat::default(),
        &[&[1.0, 3.0, 5.0], &[2.0, 4.0, 6.0]],
        &[0, 1, 2],
    )
    .unwrap();
    let mut coded = CodedMesh::default();
    encode_mesh_omitting_format(&mesh, &mut coded);

    let x = coded.x_stroke_space.as_ref().unwrap();
    let y = coded.y_stroke_space.as_ref().unwrap();
    assert_eq!(x.offset, 0.0);
    assert_eq!(x.deltas, vec![1, 2, 2]);
    assert_eq!(y.offset, 0.0);
    assert_eq!(y.deltas, vec![2, 2, 2]);
    assert_eq!(coded.triangle_index.as_ref().unwrap().deltas, vec![0, 1, 1]);
    assert!(coded.format.is_none());
    assert!(coded.other_attribute_components.is_empty());

    assert_eq!(decode_mesh(&coded), Ok(mesh));
}

#[test]
fn unpacked_round_trip_is_exact() {
    let format = MeshFormat::create(
        &[
            (AttributeType::Float2Unpacked, AttributeId::Position),
            (AttributeType::Float3Unpacked, AttributeId::ColorShiftHsl),
            (AttributeType::Float1Unpacked, AttributeId::OpacityShift),
        ],
        IndexFormat::Bits32,
    )
    .unwrap();
    let mesh = Mesh::create(
        format,
        &[
            &[0.1, 1e-3, -7.0e5],
            &[3.3, 0.0, 1.0 / 3.0],
            &[0.0, -0.5, 0.5],
            &[0.25, 0.25, 0.25],
            &[1.0, 1.0, -1.0],
            &[0.9, 1e-3, 12.0],
        ],
        &[2, 1, 0],
    )
    .unwrap();

    let mut coded = CodedMesh::default();
    encode_mesh(&mesh, &mut coded);
    assert!(coded.format.is_some());
    assert_eq!(coded.other_attribute_components.len(), 4);

    let decoded = decode_mesh(&coded).unwrap();
    assert_eq!(decoded.raw_vertex_data(), mesh.raw_vertex_data());
    assert_eq!(decoded, mesh);
}

#[test]
fn packed_round_trip_keeps_packed_data() {
    let mesh = packed_mesh();
    let mut coded = CodedMesh::default();
    encode_mesh(&mesh, &mut coded);

    // packed runs carry the mesh's own params
    let params = mesh.coding_params(1).unwrap();
    let x = coded.x_stroke_space.as_ref().unwrap();
    assert_eq!(x.offset, f64::from(params[0].offset));
    assert_eq!(x.scale, f64::from(params[0].scale));

    let decoded = decode_mesh(&coded).unwrap();
    assert_eq!(decoded.raw_vertex_data(), mesh.raw_vertex_data());
    for a in 0..mesh.format().attributes().len() {
        assert_eq!(decoded.coding_params(a), mesh.coding_params(a));
    }
    assert_eq!(decoded, mesh);
}

#[test]
fn packed_positions_within_bound() {
    let mesh = packed_mesh();
    let mut coded = CodedMesh::default();
    encode_mesh_omitting_format(&mesh, &mut coded);
    let decoded = decode_mesh_using_format(mesh.format(), &coded).unwrap();

    let xs = [10.0f32, 20.5, 31.0, -4.0];
    let ys = [-2.0f32, 3.0, 7.75, 0.0];
    let x_bound = 0.5 * 35.0 / f64::from(max_quantized(12)) + 1e-5;
    let y_bound = 0.5 * 9.75 / f64::from(max_quantized(12)) + 1e-5;
    for v in 0..4 {
        let p = decoded.vertex_position(v);
        assert!(f64::from((p.x - xs[v as usize]).abs()) <= x_bound);
        assert!(f64::from((p.y - ys[v as usize]).abs()) <= y_bound);
    }
}

#[test]
fn empty_mesh() {
    let no_values: &[f32] = &[];
    let mesh = Mesh::create(packed_format(), &[no_values; 10], &[]).unwrap();
    let mut coded = CodedMesh::default();
    encode_mesh(&mesh, &mut coded);
    assert!(coded.x_stroke_space.is_none());
    assert!(coded.y_stroke_space.is_none());
    assert!(coded.triangle_index.is_none());
    assert!(coded.other_attribute_components.is_empty());
    assert_eq!(decode_mesh(&coded), Ok(mesh));
}

#[test]
fn missing_format_means_default() {
    let coded = CodedMesh {
        x_stroke_space: Some(run::encode_int([0, 4, 0])),
        y_stroke_space: Some(run::encode_int([0, 0, 3])),
        triangle_index: Some(run::encode_int([0, 1, 2])),
        ..Default::default()
    };
    let mesh = decode_mesh(&coded).unwrap();
    assert_eq!(mesh.format(), &MeshFormat::default());
    assert_eq!(mesh.vertex_position(1), Point2::new(4.0, 0.0));
    assert_eq!(mesh.vertex_position(2), Point2::new(0.0, 3.0));
}

#[test]
fn missing_other_components_decode_as_zero() {
    let format = MeshFormat::create(
        &[
            (AttributeType::Float2Unpacked, AttributeId::Position),
            (AttributeType::Float1PackedInOneUnsignedByte, AttributeId::OpacityShift),
        ],
        IndexFormat::Bits32,
    )
    .unwrap();
    let coded = CodedMesh {
        x_stroke_space: Some(run::encode_int([1, 2])),
        y_stroke_space: Some(run::encode_int([1, 2])),
        ..Default::default()
    };
    let mesh = decode_mesh_using_format(&format, &coded).unwrap();
    assert_eq!(mesh.vertex_count(), 2);
    assert_eq!(&*mesh.float_vertex_attribute(1, 1), &[0.0]);
}

#[test]
fn rejects_inconsistent_runs() {
    let mesh = packed_mesh();
    let mut coded = CodedMesh::default();
    encode_mesh(&mesh, &mut coded);

    let mut dropped = coded.clone();
    dropped.other_attribute_components.pop();
    assert_eq!(
        decode_mesh(&dropped),
        Err(Error::OtherComponentCount {
            expected: 8,
            actual: 7
        })
    );

    let mut short = coded.clone();
    short.other_attribute_components[3].deltas.pop();
    assert_eq!(
        decode_mesh(&short),
        Err(Error::OtherComponentLength {
            index: 3,
            expected: 4,
            actual: 3
        })
    );

    let mut overflowing = coded.clone();
    overflowing.other_attribute_components[0].deltas[0] = 1 << 20;
    assert!(matches!(
        decode_mesh(&overflowing),
        Err(Error::QuantizedOutOfRange { bits: 10, .. })
    ));

    let mut non_finite = coded;
    non_finite.other_attribute_components[3] = CodedNumericRun {
        offset: f64::NAN,
        ..non_finite.other_attribute_components[3].clone()
    };
    assert!(matches!(
        decode_mesh(&non_finite),
        Err(Error::NonFiniteRun { .. })
    ));
}

#[test]
fn packed_runs_must_unpack_to_finite_values() {
    let format = MeshFormat::create(
        &[(AttributeType::Float2PackedInOneFloat, AttributeId::Position)],
        IndexFormat::Bits16,
    )
    .unwrap();
    let huge = CodedNumericRun {
        offset: 3e38,
        scale: 3e38,
        deltas: vec![4095],
    };
    let coded = CodedMesh {
        x_stroke_space: Some(huge.clone()),
        y_stroke_space: Some(huge),
        ..Default::default()
    };
    let err = decode_mesh_using_format(&format, &coded).unwrap_err();
    assert!(matches!(
        err,
        Error::Mesh(MeshError::NonFiniteValue {
            attribute: 0,
            vertex: 0,
            ..
        })
    ));
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    // the same params are fine while every value stays in range
    let coded = CodedMesh {
        x_stroke_space: Some(CodedNumericRun {
            offset: 3e38,
            scale: 1e33,
            deltas: vec![4095],
        }),
        y_stroke_space: Some(run::encode_int([0])),
        ..Default::default()
    };
    let mesh = decode_mesh_using_format(&format, &coded).unwrap();
    assert!(mesh.vertex_position(0).x.is_finite());
}

#[test]
fn mesh_validation_failures_are_invalid_argument() {
    let coded = CodedMesh {
        x_stroke_space: Some(run::encode_int([0, 1])),
        y_stroke_space: Some(run::encode_int([0, 1])),
        triangle_index: Some(run::encode_int([0, 1, 2])),
        ..Default::default()
    };
    let err = decode_mesh(&coded).unwrap_err();
    assert!(matches!(
        err,
        Error::Mesh(MeshError::TriangleIndexOutOfBounds { index: 2, .. })
    ));
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

#[quickcheck]
fn packed_round_trip_is_within_bound(points: Vec<(i16, i16)>) -> bool {
    let xs: Vec<f32> = points.iter().map(|&(x, _)| f32::from(x) / 8.0).collect();
    let ys: Vec<f32> = points.iter().map(|&(_, y)| f32::from(y) / 8.0).collect();
    let format = MeshFormat::create(
        &[(AttributeType::Float2PackedInFourUnsignedBytesX12Y20, AttributeId::Position)],
        IndexFormat::Bits32,
    )
    .unwrap();
    let mesh = Mesh::create(format, &[&xs, &ys], &[]).unwrap();

    let mut coded = CodedMesh::default();
    encode_mesh(&mesh, &mut coded);
    let Ok(decoded) = decode_mesh(&coded) else {
        return false;
    };

    let bound = |values: &[f32], bits: u8| {
        let min = values.iter().copied().fold(f32::INFINITY, f32::min);
        let max = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        0.5 * (f64::from(max) - f64::from(min)) / f64::from(max_quantized(bits)) + 1e-4
    };
    let (x_bound, y_bound) = (bound(&xs, 12), bound(&ys, 20));
    decoded == mesh
        && (0..mesh.vertex_count()).all(|v| {
            let p = decoded.vertex_position(v);
            f64::from((p.x - xs[v as usize]).abs()) <= x_bound
                && f64::from((p.y - ys[v as usize]).abs()) <= y_bound
        })
}
