//! Triangle meshes with packed vertex storage.

use nalgebra::Point2;

use crate::{
    packing::{self, max_quantized},
    AttributeCodingParams, ComponentArray, ComponentCodingParams, MeshError, MeshFormat,
};

/// The values of one vertex attribute component, one per vertex, as given to
/// [Mesh::create_from_components].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ComponentColumn<'a> {
    /// Float values. For packed attributes, coding params are derived from their bounds.
    Values(&'a [f32]),
    /// Already-packed integers and the params which unpack them; only valid for packed
    /// attributes.
    Quantized {
        values: &'a [u32],
        params: ComponentCodingParams,
    },
}

impl ComponentColumn<'_> {
    #[inline]
    pub fn len(&self) -> usize {
        match self {
            ComponentColumn::Values(v) => v.len(),
            ComponentColumn::Quantized { values, .. } => values.len(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Per-component minimum and maximum of one attribute over all vertices of a mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttributeBounds {
    pub min: ComponentArray<f32>,
    pub max: ComponentArray<f32>,
}

/// An immutable triangle mesh.
///
/// Vertices are stored in the packed layout of the mesh's [MeshFormat]; packed attributes keep
/// the [coding params](ComponentCodingParams) needed to unpack them.
///
/// # Invariants
///
/// * `vertex_data.len()` == `vertex_count` × `format.packed_vertex_stride()`
/// * `triangle_indices.len()` % 3 == 0, and every index < `vertex_count`
/// * `coding_params[a]` is `Some` ⟺ attribute `a` is packed
/// * every unpacked value is finite
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    format: MeshFormat,
    vertex_count: u32,
    vertex_data: Vec<u8>,
    triangle_indices: Vec<u32>,
    coding_params: Vec<Option<AttributeCodingParams>>,
    bounds: Vec<Option<AttributeBounds>>,
}

impl Mesh {
    /// Construct a mesh from one column of float values per format component, in attribute then
    /// component order, and a flat list of triangle indices.
    ///
    /// Packed attributes get coding params spreading their precision over each component's
    /// bounds.
    pub fn create(
        format: MeshFormat,
        columns: &[&[f32]],
        triangle_indices: &[u32],
    ) -> Result<Self, MeshError> {
        let columns: Vec<_> = columns.iter().map(|&c| ComponentColumn::Values(c)).collect();
        Self::create_from_components(format, &columns, triangle_indices)
    }

    /// Construct a mesh from one [ComponentColumn] per format component, in attribute then
    /// component order, and a flat list of triangle indices.
    ///
    /// # Errors
    ///
    /// Fails if the columns don't match the format, if there are more vertices than the index
    /// format can address, if any value is non-finite or doesn't fit its packed width, or if any
    /// triangle is incomplete or references a missing vertex.
    pub fn create_from_components(
        format: MeshFormat,
        columns: &[ComponentColumn<'_>],
        triangle_indices: &[u32],
    ) -> Result<Self, MeshError> {
        let expected = format.total_component_count();
        if columns.len() != expected {
            return Err(MeshError::ColumnCount {
                expected,
                actual: columns.len(),
            });
        }
        // a format always has a position attribute, so there's at least one column
        let vertex_count = columns.first().map_or(0, ComponentColumn::len);
        if let Some((column, c)) = columns
            .iter()
            .enumerate()
            .find(|(_, c)| c.len() != vertex_count)
        {
            return Err(MeshError::ColumnLength {
                column,
                expected: vertex_count,
                actual: c.len(),
            });
        }
        let max = format.index_format().max_vertex_count();
        if vertex_count > max {
            return Err(MeshError::TooManyVertices {
                index_format: format.index_format(),
                count: vertex_count,
                max,
            });
        }
        if triangle_indices.len() % 3 != 0 {
            return Err(MeshError::PartialTriangle(triangle_indices.len()));
        }
        if let Some((i, &index)) = triangle_indices
            .iter()
            .enumerate()
            .find(|(_, &index)| index as usize >= vertex_count)
        {
            return Err(MeshError::TriangleIndexOutOfBounds {
                triangle: i / 3,
                index,
                vertex_count,
            });
        }

        let stride = format.packed_vertex_stride();
        let mut vertex_data = vec![0u8; vertex_count * stride];
        let mut coding_params = Vec::with_capacity(format.attributes().len());

        let mut first_column = 0;
        for (a, attr) in format.attributes().iter().enumerate() {
            let attr_columns = &columns[first_column..first_column + attr.component_count()];
            first_column += attr.component_count();

            let packed = prepare_attribute(a, attr.ty(), attr_columns)?;
            let write_range = attr.packed_offset()..attr.packed_offset() + attr.packed_width();
            let vertices = vertex_data
                .chunks_exact_mut(stride)
                .map(|vertex| &mut vertex[write_range.clone()]);
            match &packed {
                PreparedAttribute::Floats(values) => {
                    for (v, out) in vertices.enumerate() {
                        let floats = ComponentArray::from_fn(values.len(), |c| values[c][v]);
                        packing::write_attribute(attr.ty(), &floats, &[], out);
                    }
                }
                PreparedAttribute::Packed { quantized, .. } => {
                    for (v, out) in vertices.enumerate() {
                        let q = ComponentArray::from_fn(quantized.len(), |c| quantized[c][v]);
                        packing::write_attribute(attr.ty(), &[], &q, out);
                    }
                }
            }
            coding_params.push(match packed {
                PreparedAttribute::Packed { params, .. } => Some(params),
                PreparedAttribute::Floats(_) => None,
            });
        }

        let mut mesh = Self {
            format,
            vertex_count: vertex_count as u32,
            vertex_data,
            triangle_indices: triangle_indices.to_vec(),
            coding_params,
            bounds: Vec::new(),
        };
        let bounds = (0..mesh.format.attributes().len())
            .map(|a| mesh.compute_bounds(a))
            .collect();
        mesh.bounds = bounds;
        tracing::trace!(
            vertex_count = mesh.vertex_count,
            triangle_count = mesh.triangle_count(),
            stride,
            "created mesh"
        );
        Ok(mesh)
    }

    #[inline]
    pub fn format(&self) -> &MeshFormat {
        &self.format
    }

    #[inline]
    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    #[inline]
    pub fn triangle_count(&self) -> u32 {
        (self.triangle_indices.len() / 3) as u32
    }

    /// The vertex indices of one triangle.
    ///
    /// # Panics
    ///
    /// * `triangle` >= `self.triangle_count()`
    #[inline]
    pub fn triangle_indices(&self, triangle: u32) -> [u32; 3] {
        let i = triangle as usize * 3;
        [
            self.triangle_indices[i],
            self.triangle_indices[i + 1],
            self.triangle_indices[i + 2],
        ]
    }

    /// All triangle indices, three per triangle.
    #[inline]
    pub fn triangle_index_data(&self) -> &[u32] {
        &self.triangle_indices
    }

    /// Vertex memory in the format's packed layout.
    #[inline]
    pub fn raw_vertex_data(&self) -> &[u8] {
        &self.vertex_data
    }

    /// Coding params of a packed attribute, or `None` if the attribute is unpacked.
    ///
    /// # Panics
    ///
    /// * `attribute` >= `self.format().attributes().len()`
    #[inline]
    pub fn coding_params(&self, attribute: usize) -> Option<&AttributeCodingParams> {
        self.coding_params[attribute].as_ref()
    }

    /// Bounds of an attribute's unpacked values, or `None` if the mesh has no vertices.
    ///
    /// # Panics
    ///
    /// * `attribute` >= `self.format().attributes().len()`
    #[inline]
    pub fn attribute_bounds(&self, attribute: usize) -> Option<&AttributeBounds> {
        self.bounds[attribute].as_ref()
    }

    fn attribute_bytes(&self, vertex: u32, attribute: usize) -> &[u8] {
        let attr = &self.format.attributes()[attribute];
        let start = vertex as usize * self.format.packed_vertex_stride() + attr.packed_offset();
        &self.vertex_data[start..start + attr.packed_width()]
    }

    /// The unpacked value of one attribute of one vertex.
    ///
    /// # Panics
    ///
    /// * `vertex` >= `self.vertex_count()`
    /// * `attribute` >= `self.format().attributes().len()`
    pub fn float_vertex_attribute(&self, vertex: u32, attribute: usize) -> ComponentArray<f32> {
        let ty = self.format.attributes()[attribute].ty();
        let bytes = self.attribute_bytes(vertex, attribute);
        match (
            packing::read_quantized(ty, bytes),
            &self.coding_params[attribute],
        ) {
            (Some(quantized), Some(params)) => {
                ComponentArray::from_fn(quantized.len(), |c| params[c].dequantize(quantized[c]))
            }
            _ => packing::read_floats(ty, bytes),
        }
    }

    /// The packed integer value of one attribute of one vertex, or `None` if the attribute is
    /// unpacked.
    ///
    /// # Panics
    ///
    /// * `vertex` >= `self.vertex_count()`
    /// * `attribute` >= `self.format().attributes().len()`
    pub fn quantized_vertex_attribute(
        &self,
        vertex: u32,
        attribute: usize,
    ) -> Option<ComponentArray<u32>> {
        let ty = self.format.attributes()[attribute].ty();
        packing::read_quantized(ty, self.attribute_bytes(vertex, attribute))
    }

    /// The position of a vertex.
    ///
    /// # Panics
    ///
    /// * `vertex` >= `self.vertex_count()`
    pub fn vertex_position(&self, vertex: u32) -> Point2<f32> {
        let p = self.float_vertex_attribute(vertex, self.format.position_attribute_index());
        Point2::new(p[0], p[1])
    }

    fn compute_bounds(&self, attribute: usize) -> Option<AttributeBounds> {
        let mut vertices = 0..self.vertex_count;
        let first = self.float_vertex_attribute(vertices.next()?, attribute);
        let mut bounds = AttributeBounds {
            min: first,
            max: first,
        };
        for v in vertices {
            let value = self.float_vertex_attribute(v, attribute);
            for (c, &x) in value.iter().enumerate() {
                bounds.min[c] = bounds.min[c].min(x);
                bounds.max[c] = bounds.max[c].max(x);
            }
        }
        Some(bounds)
    }
}

enum PreparedAttribute<'a> {
    Floats(Vec<&'a [f32]>),
    Packed {
        params: AttributeCodingParams,
        quantized: Vec<Vec<u32>>,
    },
}

/// Validate the columns of one attribute, and quantize them if the attribute is packed.
fn prepare_attribute<'a>(
    attribute: usize,
    ty: crate::AttributeType,
    columns: &[ComponentColumn<'a>],
) -> Result<PreparedAttribute<'a>, MeshError> {
    for (component, column) in columns.iter().enumerate() {
        if let ComponentColumn::Values(values) = column {
            if let Some((vertex, &value)) = values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
                return Err(MeshError::NonFiniteValue {
                    attribute,
                    component,
                    vertex,
                    value,
                });
            }
        }
    }

    let Some(bits) = ty.packed_bits_per_component() else {
        return columns
            .iter()
            .map(|column| match *column {
                ComponentColumn::Values(values) => Ok(values),
                ComponentColumn::Quantized { .. } => {
                    Err(MeshError::QuantizedUnpackedAttribute { attribute, ty })
                }
            })
            .collect::<Result<_, _>>()
            .map(PreparedAttribute::Floats);
    };

    let mut params = [ComponentCodingParams::default(); 4];
    let mut quantized = Vec::with_capacity(columns.len());
    for (component, (column, &bits)) in columns.iter().zip(bits).enumerate() {
        match *column {
            ComponentColumn::Values(values) => {
                let (min, max) = values
                    .iter()
                    .fold(None, |acc: Option<(f32, f32)>, &v| match acc {
                        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
                        None => Some((v, v)),
                    })
                    .unwrap_or((0.0, 0.0));
                let p = ComponentCodingParams::for_range(min, max, bits);
                params[component] = p;
                quantized.push(values.iter().map(|&v| p.quantize(v, bits)).collect());
            }
            ComponentColumn::Quantized { values, params: p } => {
                if !p.is_valid() {
                    return Err(MeshError::InvalidCodingParams {
                        attribute,
                        component,
                        params: p,
                    });
                }
                if let Some((vertex, &value)) = values
                    .iter()
                    .enumerate()
                    .find(|(_, &q)| q > max_quantized(bits))
                {
                    return Err(MeshError::QuantizedOutOfRange {
                        attribute,
                        component,
                        vertex,
                        value,
                        bits,
                    });
                }
                // params may be valid yet unpack some value past f32::MAX
                if let Some((vertex, value)) = values
                    .iter()
                    .map(|&q| p.dequantize(q))
                    .enumerate()
                    .find(|(_, value)| !value.is_finite())
                {
                    return Err(MeshError::NonFiniteValue {
                        attribute,
                        component,
                        vertex,
                        value,
                    });
                }
                params[component] = p;
                quantized.push(values.to_vec());
            }
        }
    }

    Ok(PreparedAttribute::Packed {
        params: ComponentArray::from_slice(&params[..columns.len()]),
        quantized,
    })
}
