//! # Solid Mesh Module
//!
//! Tessellates extruded solids into indexed triangle meshes ready for GPU
//! upload. Caps are filled with lyon (section outlines are concave), side
//! walls are one quad per outline edge with flat normals.

use super::color::Color;
use super::geometry::{ExtrudedSolid, Placement};
use bracekit_core::GeometryError;
use glam::{Vec2, Vec3};
use lyon::math::point;
use lyon::path::Path;
use lyon::tessellation::{BuffersBuilder, FillOptions, FillTessellator, FillVertex, VertexBuffers};

/// Floats per vertex: position, normal, RGBA
pub const VERTEX_STRIDE: usize = 10;

/// A renderable 3D mesh for visualization
#[derive(Debug, Clone)]
pub struct RenderableMesh {
    /// Vertex data: [x, y, z, nx, ny, nz, r, g, b, a] per vertex
    pub vertices: Vec<f32>,
    /// Index data for triangles
    pub indices: Vec<u32>,
    pub bounds_min: Vec3,
    pub bounds_max: Vec3,
    pub material: MeshMaterial,
}

/// Material properties for mesh rendering
#[derive(Debug, Clone, PartialEq)]
pub struct MeshMaterial {
    /// Diffuse color (RGBA)
    pub diffuse_color: [f32; 4],
    /// Ambient color (RGBA)
    pub ambient_color: [f32; 4],
    pub metalness: f32,
    pub roughness: f32,
}

impl Default for MeshMaterial {
    fn default() -> Self {
        Self::steel(Color::NEUTRAL)
    }
}

impl MeshMaterial {
    /// Brushed steel look tinted by the utilization color
    pub fn steel(color: Color) -> Self {
        Self {
            diffuse_color: color.to_rgba(1.0),
            ambient_color: [color.r * 0.3, color.g * 0.3, color.b * 0.3, 1.0],
            metalness: 1.0,
            roughness: 0.9,
        }
    }
}

enum Facing {
    Down,
    Up,
}

impl RenderableMesh {
    /// Tessellate `solid`, move it by `placement` and tint it with `color`
    pub fn from_solid(
        solid: &ExtrudedSolid,
        placement: &Placement,
        color: Color,
    ) -> Result<Self, GeometryError> {
        let outline: Vec<Vec2> = solid
            .footprint()
            .loop_points()
            .into_iter()
            .map(|(x, y)| Vec2::new(x as f32, y as f32))
            .collect();
        if outline.len() < 3 {
            return Err(GeometryError::invalid(format!(
                "outline with {} distinct vertices has no area",
                outline.len()
            )));
        }
        let area = signed_area(&outline);
        if area.abs() <= f32::EPSILON {
            return Err(GeometryError::invalid("outline has zero area"));
        }

        let cap = tessellate_cap(&outline)?;
        let depth = solid.depth() as f32;
        let mut mesh = Self {
            vertices: Vec::with_capacity((cap.vertices.len() * 2 + outline.len() * 4) * VERTEX_STRIDE),
            indices: Vec::new(),
            bounds_min: Vec3::splat(f32::MAX),
            bounds_max: Vec3::splat(f32::MIN),
            material: MeshMaterial::steel(color),
        };
        let rgba = color.to_rgba(1.0);

        mesh.push_cap(&cap, 0.0, Facing::Down, placement, rgba);
        mesh.push_cap(&cap, depth, Facing::Up, placement, rgba);

        // counter-clockwise outlines have their outside to the right of each edge
        let orientation = area.signum();
        for (i, &a) in outline.iter().enumerate() {
            let b = outline[(i + 1) % outline.len()];
            let edge = b - a;
            if edge.length_squared() <= f32::EPSILON {
                continue;
            }
            let normal =
                placement.transform_normal(Vec3::new(edge.y, -edge.x, 0.0).normalize() * orientation);
            let base = mesh.vertex_count();
            for (p, z) in [(a, 0.0), (b, 0.0), (b, depth), (a, depth)] {
                let position = placement.transform_point(Vec3::new(p.x, p.y, z));
                mesh.push_vertex(position, normal, rgba);
            }
            if orientation > 0.0 {
                mesh.indices
                    .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
            } else {
                mesh.indices
                    .extend_from_slice(&[base, base + 3, base + 2, base + 2, base + 1, base]);
            }
        }

        Ok(mesh)
    }

    pub fn vertex_count(&self) -> u32 {
        (self.vertices.len() / VERTEX_STRIDE) as u32
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Vertex buffer as raw bytes for upload
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Index buffer as raw bytes for upload
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    /// Position of vertex `index`
    pub fn position(&self, index: u32) -> Vec3 {
        let offset = index as usize * VERTEX_STRIDE;
        Vec3::from_slice(&self.vertices[offset..offset + 3])
    }

    fn push_vertex(&mut self, position: Vec3, normal: Vec3, rgba: [f32; 4]) {
        self.vertices.extend_from_slice(&position.to_array());
        self.vertices.extend_from_slice(&normal.to_array());
        self.vertices.extend_from_slice(&rgba);
        self.bounds_min = self.bounds_min.min(position);
        self.bounds_max = self.bounds_max.max(position);
    }

    fn push_cap(
        &mut self,
        cap: &VertexBuffers<[f32; 2], u32>,
        z: f32,
        facing: Facing,
        placement: &Placement,
        rgba: [f32; 4],
    ) {
        let local_normal = match facing {
            Facing::Down => Vec3::NEG_Z,
            Facing::Up => Vec3::Z,
        };
        let normal = placement.transform_normal(local_normal);
        let base = self.vertex_count();
        for &[x, y] in &cap.vertices {
            self.push_vertex(placement.transform_point(Vec3::new(x, y, z)), normal, rgba);
        }
        for tri in cap.indices.chunks_exact(3) {
            let (a, b, c) = (tri[0], tri[1], tri[2]);
            let ccw = triangle_area(cap, a, b, c) > 0.0;
            // up-facing caps wind counter-clockwise seen from +Z
            let keep = matches!(facing, Facing::Up) == ccw;
            if keep {
                self.indices.extend_from_slice(&[base + a, base + b, base + c]);
            } else {
                self.indices.extend_from_slice(&[base + a, base + c, base + b]);
            }
        }
    }
}

fn signed_area(outline: &[Vec2]) -> f32 {
    let n = outline.len();
    (0..n)
        .map(|i| outline[i].perp_dot(outline[(i + 1) % n]))
        .sum::<f32>()
        * 0.5
}

fn triangle_area(cap: &VertexBuffers<[f32; 2], u32>, a: u32, b: u32, c: u32) -> f32 {
    let p = |i: u32| Vec2::from_array(cap.vertices[i as usize]);
    (p(b) - p(a)).perp_dot(p(c) - p(a))
}

fn tessellate_cap(outline: &[Vec2]) -> Result<VertexBuffers<[f32; 2], u32>, GeometryError> {
    let mut builder = Path::builder();
    builder.begin(point(outline[0].x, outline[0].y));
    for p in &outline[1..] {
        builder.line_to(point(p.x, p.y));
    }
    builder.end(true);
    let path = builder.build();

    let mut buffers: VertexBuffers<[f32; 2], u32> = VertexBuffers::new();
    FillTessellator::new()
        .tessellate_path(
            &path,
            &FillOptions::default(),
            &mut BuffersBuilder::new(&mut buffers, |vertex: FillVertex| {
                vertex.position().to_array()
            }),
        )
        .map_err(|e| GeometryError::invalid(format!("cap tessellation failed: {:?}", e)))?;
    Ok(buffers)
}
