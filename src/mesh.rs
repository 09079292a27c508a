//! Triangulation and texture mapping of a city's grid.

use crate::error::GridError;
use crate::grid_data::{GridData, GridEntry};
use log::info;

/// Everything the triangle renderer needs once per city.
#[derive(Debug, Clone, PartialEq)]
pub struct GridMesh {
    /// The grid rows, as given by the city's data.
    pub grid: Vec<Vec<GridEntry>>,
    /// Triangles over movable vertex indices, all wound the same way.
    pub triangles: Vec<[u32; 3]>,
    /// Texture coordinates `[u0, v0, u1, v1, ...]` in vertex index order.
    pub uvs: Vec<f32>,
}

impl GridMesh {
    /// Triangulates a city's grid.
    ///
    /// Every 2x2 block of neighbouring cells becomes two triangles:
    /// `[i, i + 1, i + size]` and `[i + 1, i + size + 1, i + size]`.
    pub fn build(data: &GridData) -> Result<Self, GridError> {
        data.validate()?;
        let size = data.size;

        let mut triangles = Vec::with_capacity(2 * (size - 1) * (size - 1));
        for y in 0..size - 1 {
            for x in 0..size - 1 {
                let i = (y * size + x) as u32;
                let s = size as u32;
                triangles.push([i, i + 1, i + s]);
                triangles.push([i + 1, i + s + 1, i + s]);
            }
        }

        let uvs = data
            .entries()
            .flat_map(|entry| [entry.uv_x, entry.uv_y])
            .collect();

        info!(
            "Built {0}x{0} mesh with {1} triangles",
            size,
            triangles.len()
        );
        Ok(Self {
            grid: data.grid.clone(),
            triangles,
            uvs,
        })
    }

    /// Number of movable vertices the triangles index into.
    pub fn vertex_count(&self) -> usize {
        self.grid.iter().map(Vec::len).sum()
    }

    /// Texture coordinates of one vertex.
    pub fn uv(&self, index: usize) -> Option<[f32; 2]> {
        let u = *self.uvs.get(2 * index)?;
        let v = *self.uvs.get(2 * index + 1)?;
        Some([u, v])
    }
}
