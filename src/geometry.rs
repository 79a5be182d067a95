//! CPU-side vertex data for the demo geometry.
//!
//! Everything rendered by the demo is generated in code: a floor grid built
//! as a line list and a unit cube with per-face normals. The [`Vertex`] trait
//! describes how each vertex type is laid out in GPU memory.

use std::mem;

/// Describes the GPU memory layout of a vertex type.
pub trait Vertex {
    fn desc() -> wgpu::VertexBufferLayout<'static>;
}

/// Vertex of an unlit line: position and color.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LineVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

impl Vertex for LineVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<LineVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

/// Vertex of a lit mesh: position and normal.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex for MeshVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

/// Color of the regular grid lines (0x888888).
pub const GRID_COLOR: [f32; 3] = [0.533, 0.533, 0.533];
/// Color of the two center lines (0x444444).
pub const GRID_CENTER_COLOR: [f32; 3] = [0.267, 0.267, 0.267];

/// Line-list vertices for a square floor grid in the XZ plane, centered at
/// the origin.
///
/// Produces `divisions + 1` lines along each axis (two vertices per line).
/// The two lines crossing the origin are drawn in the darker center color.
pub fn grid_helper(size: f32, divisions: u32) -> Vec<LineVertex> {
    let half = size / 2.0;
    // Zero divisions degenerates to the outline: one line pair per edge.
    let divisions = divisions.max(1);
    let step = size / divisions as f32;

    let mut vertices = Vec::with_capacity(((divisions + 1) * 4) as usize);
    for i in 0..=divisions {
        let offset = i as f32 * step - half;
        let color = if offset == 0.0 {
            GRID_CENTER_COLOR
        } else {
            GRID_COLOR
        };
        // Line parallel to the Z axis, then its counterpart along X.
        vertices.push(LineVertex {
            position: [offset, 0.0, -half],
            color,
        });
        vertices.push(LineVertex {
            position: [offset, 0.0, half],
            color,
        });
        vertices.push(LineVertex {
            position: [-half, 0.0, offset],
            color,
        });
        vertices.push(LineVertex {
            position: [half, 0.0, offset],
            color,
        });
    }
    vertices
}

/// Axis-aligned unit cube centered at the origin with per-face normals.
///
/// Four vertices per face so each face gets a flat normal, indexed as two
/// triangles per face.
pub fn unit_cube() -> (Vec<MeshVertex>, Vec<u16>) {
    // (normal, four corners in counter-clockwise order seen from outside)
    let faces: [([f32; 3], [[f32; 3]; 4]); 6] = [
        (
            [0.0, 0.0, 1.0],
            [
                [-0.5, -0.5, 0.5],
                [0.5, -0.5, 0.5],
                [0.5, 0.5, 0.5],
                [-0.5, 0.5, 0.5],
            ],
        ),
        (
            [0.0, 0.0, -1.0],
            [
                [0.5, -0.5, -0.5],
                [-0.5, -0.5, -0.5],
                [-0.5, 0.5, -0.5],
                [0.5, 0.5, -0.5],
            ],
        ),
        (
            [1.0, 0.0, 0.0],
            [
                [0.5, -0.5, 0.5],
                [0.5, -0.5, -0.5],
                [0.5, 0.5, -0.5],
                [0.5, 0.5, 0.5],
            ],
        ),
        (
            [-1.0, 0.0, 0.0],
            [
                [-0.5, -0.5, -0.5],
                [-0.5, -0.5, 0.5],
                [-0.5, 0.5, 0.5],
                [-0.5, 0.5, -0.5],
            ],
        ),
        (
            [0.0, 1.0, 0.0],
            [
                [-0.5, 0.5, 0.5],
                [0.5, 0.5, 0.5],
                [0.5, 0.5, -0.5],
                [-0.5, 0.5, -0.5],
            ],
        ),
        (
            [0.0, -1.0, 0.0],
            [
                [-0.5, -0.5, -0.5],
                [0.5, -0.5, -0.5],
                [0.5, -0.5, 0.5],
                [-0.5, -0.5, 0.5],
            ],
        ),
    ];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (face, (normal, corners)) in faces.iter().enumerate() {
        let base = (face * 4) as u16;
        for corner in corners {
            vertices.push(MeshVertex {
                position: *corner,
                normal: *normal,
            });
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    (vertices, indices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_has_one_line_pair_per_division_boundary() {
        let vertices = grid_helper(10.0, 10);
        // 11 lines per axis, 2 axes, 2 vertices per line.
        assert_eq!(vertices.len(), 44);
    }

    #[test]
    fn grid_center_lines_use_center_color() {
        let vertices = grid_helper(10.0, 10);
        let center: Vec<_> = vertices
            .iter()
            .filter(|v| v.color == GRID_CENTER_COLOR)
            .collect();
        // One center line per axis.
        assert_eq!(center.len(), 4);
        for v in center {
            assert!(v.position[0] == 0.0 || v.position[2] == 0.0);
        }
    }

    #[test]
    fn grid_spans_the_requested_size() {
        let vertices = grid_helper(10.0, 10);
        for v in &vertices {
            assert!(v.position[0].abs() <= 5.0);
            assert!(v.position[2].abs() <= 5.0);
            assert_eq!(v.position[1], 0.0);
        }
    }

    #[test]
    fn degenerate_grid_still_yields_the_outline() {
        let vertices = grid_helper(10.0, 0);
        // Both border line pairs survive, same as a one-division grid.
        assert_eq!(vertices.len(), 8);
        for v in &vertices {
            assert!(v.position[0].abs() == 5.0 || v.position[2].abs() == 5.0);
        }
    }

    #[test]
    fn cube_has_four_vertices_per_face() {
        let (vertices, indices) = unit_cube();
        assert_eq!(vertices.len(), 24);
        assert_eq!(indices.len(), 36);
        assert!(indices.iter().all(|i| (*i as usize) < vertices.len()));
    }

    #[test]
    fn cube_normals_are_unit_length() {
        let (vertices, _) = unit_cube();
        for v in vertices {
            let [x, y, z] = v.normal;
            let len = (x * x + y * y + z * z).sqrt();
            assert!((len - 1.0).abs() < 1e-6);
        }
    }
}
