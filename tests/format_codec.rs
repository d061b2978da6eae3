use inkmesh::{decode_mesh_format, encode_mesh_format, proto::MeshFormatProto};
use inkmesh_geometry::{AttributeId, AttributeType, IndexFormat, MeshFormat, MAX_ATTRIBUTES};
use quickcheck_macros::quickcheck;

/// Build a valid format from arbitrary bytes: the first byte picks the position type and where
/// the position attribute lands; every other byte picks a type and an id.
fn arbitrary_format(choices: &[u8], wide_indices: bool) -> MeshFormat {
    let first = choices.first().copied().unwrap_or(0) as usize;
    let position_types: Vec<AttributeType> = AttributeType::ALL
        .iter()
        .copied()
        .filter(|ty| ty.component_count() == 2)
        .collect();
    let mut attributes = vec![(position_types[first % position_types.len()], AttributeId::Position)];
    for &c in choices.iter().skip(1).take(MAX_ATTRIBUTES - 1) {
        let ty = AttributeType::ALL[c as usize % AttributeType::ALL.len()];
        let id = AttributeId::ALL[1 + c as usize % (AttributeId::ALL.len() - 1)];
        if attributes.iter().all(|&(_, existing)| existing != id) {
            attributes.push((ty, id));
        }
    }
    let attribute_count = attributes.len();
    attributes.rotate_left(first % attribute_count);
    let index_format = match wide_indices {
        true => IndexFormat::Bits32,
        false => IndexFormat::Bits16,
    };
    MeshFormat::create(&attributes, index_format).unwrap()
}

#[quickcheck]
fn formats_survive_encoding(choices: Vec<u8>, wide_indices: bool) -> bool {
    let format = arbitrary_format(&choices, wide_indices);
    let mut coded = MeshFormatProto::default();
    encode_mesh_format(&format, &mut coded);
    coded.attribute_types.len() == format.attributes().len()
        && decode_mesh_format(&coded) == Ok(format)
}

#[test]
fn reencoding_overwrites_previous_format() {
    let mut coded = MeshFormatProto::default();
    encode_mesh_format(&arbitrary_format(&[3, 40, 41, 42], false), &mut coded);
    encode_mesh_format(&MeshFormat::default(), &mut coded);
    assert_eq!(decode_mesh_format(&coded), Ok(MeshFormat::default()));
}
