//! Encoding of [MeshFormat]s.

use inkmesh_geometry::{AttributeId, AttributeType, IndexFormat, MeshFormat};

use crate::{
    proto::{self, MeshFormatProto},
    Error, Result,
};

/// Write `format` into `out`, replacing its contents.
pub fn encode_mesh_format(format: &MeshFormat, out: &mut MeshFormatProto) {
    out.attribute_types.clear();
    out.attribute_ids.clear();
    for attr in format.attributes() {
        out.attribute_types
            .push(proto::AttributeType::from(attr.ty()).into());
        out.attribute_ids.push(proto::AttributeId::from(attr.id()).into());
    }
    out.index_format = proto::IndexFormat::from(format.index_format()).into();
}

/// Convert a raw wire enum value to its domain value.
fn decode_enum<W, D>(field: &'static str, raw: i32) -> Result<D>
where
    W: TryFrom<i32, Error = i32>,
    D: TryFrom<W>,
{
    let wire = W::try_from(raw).map_err(|value| Error::UnrecognizedEnumValue { field, value })?;
    D::try_from(wire).map_err(|_| Error::UnspecifiedEnumValue { field })
}

/// Read a [MeshFormat] from `coded`.
///
/// # Errors
///
/// * [MismatchedLengths](Error::MismatchedLengths) if the attribute types and ids differ in length
/// * [UnrecognizedEnumValue](Error::UnrecognizedEnumValue) /
///   [UnspecifiedEnumValue](Error::UnspecifiedEnumValue) for unusable enum values
/// * [Format](Error::Format) if the attributes don't form a valid format
pub fn decode_mesh_format(coded: &MeshFormatProto) -> Result<MeshFormat> {
    if coded.attribute_types.len() != coded.attribute_ids.len() {
        return Err(Error::MismatchedLengths {
            left: "attribute_types",
            left_len: coded.attribute_types.len(),
            right: "attribute_ids",
            right_len: coded.attribute_ids.len(),
        });
    }

    let attributes = coded
        .attribute_types
        .iter()
        .zip(&coded.attribute_ids)
        .map(|(&ty, &id)| {
            Ok((
                decode_enum::<proto::AttributeType, AttributeType>("attribute_types", ty)?,
                decode_enum::<proto::AttributeId, AttributeId>("attribute_ids", id)?,
            ))
        })
        .collect::<Result<Vec<_>>>()?;

    let index_format = match proto::IndexFormat::try_from(coded.index_format) {
        Ok(proto::IndexFormat::Unspecified) => IndexFormat::Bits32,
        _ => decode_enum::<proto::IndexFormat, IndexFormat>("index_format", coded.index_format)?,
    };

    Ok(MeshFormat::create(&attributes, index_format)?)
}
