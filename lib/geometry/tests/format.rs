use inkmesh_geometry::{
    AttributeId, AttributeType, IndexFormat, MeshFormat, MeshFormatError, MAX_ATTRIBUTES,
};
use quickcheck_macros::quickcheck;

fn position() -> (AttributeType, AttributeId) {
    (AttributeType::Float2Unpacked, AttributeId::Position)
}

#[test]
fn create_rejects_invalid_attributes() {
    assert_eq!(
        MeshFormat::create(&[], IndexFormat::Bits32),
        Err(MeshFormatError::EmptyAttributes)
    );
    assert_eq!(
        MeshFormat::create(
            &[(AttributeType::Float1Unpacked, AttributeId::OpacityShift)],
            IndexFormat::Bits32
        ),
        Err(MeshFormatError::MissingPosition)
    );
    assert_eq!(
        MeshFormat::create(
            &[
                position(),
                (AttributeType::Float1Unpacked, AttributeId::Custom3),
                (AttributeType::Float4Unpacked, AttributeId::Custom3),
            ],
            IndexFormat::Bits32
        ),
        Err(MeshFormatError::DuplicateId(AttributeId::Custom3))
    );
    assert_eq!(
        MeshFormat::create(
            &[(AttributeType::Float3Unpacked, AttributeId::Position)],
            IndexFormat::Bits32
        ),
        Err(MeshFormatError::PositionComponentCount(
            AttributeType::Float3Unpacked,
            3
        ))
    );

    let too_many: Vec<_> = std::iter::once(position())
        .chain(
            AttributeId::ALL
                .into_iter()
                .filter(|&id| id != AttributeId::Position)
                .map(|id| (AttributeType::Float1Unpacked, id)),
        )
        .collect();
    assert!(too_many.len() > MAX_ATTRIBUTES);
    assert_eq!(
        MeshFormat::create(&too_many, IndexFormat::Bits32),
        Err(MeshFormatError::TooManyAttributes(too_many.len()))
    );
}

#[test]
fn without_attributes_keeps_order() {
    let format = MeshFormat::create(
        &[
            (AttributeType::Float1Unpacked, AttributeId::OpacityShift),
            position(),
            (AttributeType::Float4PackedInThreeFloats, AttributeId::Custom0),
            (AttributeType::Float2PackedInOneFloat, AttributeId::SurfaceUv),
        ],
        IndexFormat::Bits16,
    )
    .unwrap();

    let trimmed = format
        .without_attributes(&[AttributeId::OpacityShift, AttributeId::Custom0])
        .unwrap();
    let ids: Vec<_> = trimmed.attributes().iter().map(|a| a.id()).collect();
    assert_eq!(ids, vec![AttributeId::Position, AttributeId::SurfaceUv]);
    assert_eq!(trimmed.index_format(), IndexFormat::Bits16);
    assert_eq!(trimmed.position_attribute_index(), 0);
    assert_eq!(trimmed.attributes()[1].packed_offset(), 8);

    assert_eq!(
        format.without_attributes(&[AttributeId::Position]),
        Err(MeshFormatError::RemovePosition)
    );
    assert_eq!(
        format.without_attributes(&[AttributeId::Texture]),
        Err(MeshFormatError::AbsentId(AttributeId::Texture))
    );
}

#[test]
fn equivalence() {
    let packed = MeshFormat::create(
        &[(AttributeType::Float2PackedInOneFloat, AttributeId::Position)],
        IndexFormat::Bits32,
    )
    .unwrap();
    let relabeled = MeshFormat::create(
        &[(AttributeType::Float2PackedInOneFloat, AttributeId::Position)],
        IndexFormat::Bits16,
    )
    .unwrap();
    let unpacked = MeshFormat::default();

    assert!(packed.is_packed_equivalent(&relabeled));
    assert!(!packed.is_packed_equivalent(&unpacked));
    assert!(packed.is_unpacked_equivalent(&unpacked));
}

/// Build a valid format from arbitrary bytes: each byte picks a type and an id.
fn arbitrary_format(choices: &[u8]) -> MeshFormat {
    let mut attributes = vec![position()];
    for &c in choices.iter().take(MAX_ATTRIBUTES - 1) {
        let ty = AttributeType::ALL[c as usize % AttributeType::ALL.len()];
        let id = AttributeId::ALL[1 + c as usize % (AttributeId::ALL.len() - 1)];
        if attributes.iter().all(|&(_, existing)| existing != id) {
            attributes.push((ty, id));
        }
    }
    let rotate = choices.first().map_or(0, |&c| c as usize % attributes.len());
    attributes.rotate_left(rotate);
    MeshFormat::create(&attributes, IndexFormat::Bits32).unwrap()
}

#[quickcheck]
fn strides_are_sums_of_widths(choices: Vec<u8>) -> bool {
    let format = arbitrary_format(&choices);
    let mut unpacked = 0;
    let mut packed = 0;
    for attr in format.attributes() {
        if attr.unpacked_offset() != unpacked || attr.packed_offset() != packed {
            return false;
        }
        unpacked += attr.unpacked_width();
        packed += attr.packed_width();
    }
    format.unpacked_vertex_stride() == unpacked
        && format.packed_vertex_stride() == packed
        && format.packed_vertex_stride() <= format.unpacked_vertex_stride()
        && format.attributes()[format.position_attribute_index()].id() == AttributeId::Position
}
