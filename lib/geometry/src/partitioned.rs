//! Meshes partitioned into render groups.

use nalgebra::Point2;

use crate::{Mesh, MeshFormat, PartitionedMeshError};

/// A reference to one vertex of one mesh within a render group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct VertexIndexPair {
    pub mesh_index: u16,
    pub vertex_index: u16,
}

impl VertexIndexPair {
    #[inline]
    pub fn new(mesh_index: u16, vertex_index: u16) -> Self {
        Self {
            mesh_index,
            vertex_index,
        }
    }

    /// `mesh_index` in the high 16 bits, `vertex_index` in the low 16 bits.
    #[inline]
    pub fn to_packed(self) -> u32 {
        (u32::from(self.mesh_index) << 16) | u32::from(self.vertex_index)
    }

    #[inline]
    pub fn from_packed(packed: u32) -> Self {
        Self {
            mesh_index: (packed >> 16) as u16,
            vertex_index: (packed & 0xFFFF) as u16,
        }
    }
}

/// The contents of one render group, as given to [PartitionedMesh::from_groups].
#[derive(Debug, Clone, PartialEq)]
pub struct RenderGroup {
    pub format: MeshFormat,
    pub meshes: Vec<Mesh>,
    /// Ordered boundary paths; each point addresses a vertex of one of `meshes`.
    pub outlines: Vec<Vec<VertexIndexPair>>,
}

#[derive(Debug, Clone, PartialEq)]
struct GroupInfo {
    format: MeshFormat,
    first_mesh_index: usize,
    first_outline_index: usize,
}

/// An ordered collection of render groups, each a set of meshes sharing one [MeshFormat] plus
/// outlines over those meshes.
///
/// Meshes and outlines of all groups are stored in flat lists; each group owns the contiguous
/// range starting at its first index and ending at the next group's.
///
/// # Invariants
///
/// * group first indices are monotonically nondecreasing
/// * every mesh of a group has the group's format
/// * every outline point references an existing vertex of a mesh in the same group
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PartitionedMesh {
    meshes: Vec<Mesh>,
    outlines: Vec<Vec<VertexIndexPair>>,
    groups: Vec<GroupInfo>,
}

impl PartitionedMesh {
    /// Construct a partitioned mesh from its render groups, in order.
    ///
    /// # Errors
    ///
    /// * [FormatMismatch](PartitionedMeshError::FormatMismatch) if a mesh doesn't use its group's format
    /// * [TooManyMeshes](PartitionedMeshError::TooManyMeshes) if a group has more meshes than an
    ///   outline can address
    /// * [OutlineMeshOutOfBounds](PartitionedMeshError::OutlineMeshOutOfBounds) /
    ///   [OutlineVertexOutOfBounds](PartitionedMeshError::OutlineVertexOutOfBounds) if an outline
    ///   references a missing mesh or vertex
    pub fn from_groups(groups: Vec<RenderGroup>) -> Result<Self, PartitionedMeshError> {
        let mut res = Self::default();
        for (g, group) in groups.into_iter().enumerate() {
            validate_group(g, &group)?;
            res.groups.push(GroupInfo {
                format: group.format,
                first_mesh_index: res.meshes.len(),
                first_outline_index: res.outlines.len(),
            });
            res.meshes.extend(group.meshes);
            res.outlines.extend(group.outlines);
        }
        Ok(res)
    }

    /// Whether `self` has no render groups.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    #[inline]
    pub fn render_group_count(&self) -> usize {
        self.groups.len()
    }

    /// # Panics
    ///
    /// * `group` >= `self.render_group_count()`
    #[inline]
    pub fn render_group_format(&self, group: usize) -> &MeshFormat {
        &self.groups[group].format
    }

    fn mesh_range(&self, group: usize) -> std::ops::Range<usize> {
        let end = self
            .groups
            .get(group + 1)
            .map_or(self.meshes.len(), |next| next.first_mesh_index);
        self.groups[group].first_mesh_index..end
    }

    fn outline_range(&self, group: usize) -> std::ops::Range<usize> {
        let end = self
            .groups
            .get(group + 1)
            .map_or(self.outlines.len(), |next| next.first_outline_index);
        self.groups[group].first_outline_index..end
    }

    /// # Panics
    ///
    /// * `group` >= `self.render_group_count()`
    #[inline]
    pub fn render_group_meshes(&self, group: usize) -> &[Mesh] {
        &self.meshes[self.mesh_range(group)]
    }

    /// # Panics
    ///
    /// * `group` >= `self.render_group_count()`
    #[inline]
    pub fn render_group_outlines(&self, group: usize) -> &[Vec<VertexIndexPair>] {
        &self.outlines[self.outline_range(group)]
    }

    /// # Panics
    ///
    /// * `group` >= `self.render_group_count()`
    #[inline]
    pub fn outline_count(&self, group: usize) -> usize {
        self.outline_range(group).len()
    }

    /// # Panics
    ///
    /// * `group` >= `self.render_group_count()`
    /// * `outline` >= `self.outline_count(group)`
    #[inline]
    pub fn outline(&self, group: usize, outline: usize) -> &[VertexIndexPair] {
        &self.render_group_outlines(group)[outline]
    }

    /// The position of one point of an outline.
    ///
    /// # Panics
    ///
    /// * any index is out of range
    pub fn outline_position(&self, group: usize, outline: usize, point: usize) -> Point2<f32> {
        let VertexIndexPair {
            mesh_index,
            vertex_index,
        } = self.outline(group, outline)[point];
        self.render_group_meshes(group)[mesh_index as usize]
            .vertex_position(u32::from(vertex_index))
    }

    /// Meshes of all groups, in group order.
    #[inline]
    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    /// Outlines of all groups, in group order.
    #[inline]
    pub fn outlines(&self) -> &[Vec<VertexIndexPair>] {
        &self.outlines
    }
}

fn validate_group(g: usize, group: &RenderGroup) -> Result<(), PartitionedMeshError> {
    if let Some(mesh) = group.meshes.iter().position(|m| m.format() != &group.format) {
        return Err(PartitionedMeshError::FormatMismatch { group: g, mesh });
    }
    if group.meshes.len() > u16::MAX as usize + 1 {
        return Err(PartitionedMeshError::TooManyMeshes {
            group: g,
            count: group.meshes.len(),
        });
    }
    for (o, outline) in group.outlines.iter().enumerate() {
        for (p, &VertexIndexPair {
            mesh_index,
            vertex_index,
        }) in outline.iter().enumerate()
        {
            let mesh = group.meshes.get(mesh_index as usize).ok_or(
                PartitionedMeshError::OutlineMeshOutOfBounds {
                    group: g,
                    outline: o,
                    point: p,
                    mesh_index,
                    mesh_count: group.meshes.len(),
                },
            )?;
            if u32::from(vertex_index) >= mesh.vertex_count() {
                return Err(PartitionedMeshError::OutlineVertexOutOfBounds {
                    group: g,
                    outline: o,
                    point: p,
                    mesh_index,
                    vertex_index,
                    vertex_count: mesh.vertex_count(),
                });
            }
        }
    }
    Ok(())
}
