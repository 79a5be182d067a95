//! GPU scene contents: the floor grid, solid boxes (the demo cube or the
//! furniture of a layout) and the directional light.
//!
//! A [`SceneDef`] is the CPU-side description of what the scene contains and
//! can be inspected without a GPU. [`Scene::new`] turns it into buffers and
//! bind groups once, at startup. Nothing else in the crate adds or removes
//! scene objects afterwards; resize and input paths only touch camera and
//! surface state.

use std::collections::HashSet;

use cgmath::{InnerSpace, Matrix4, Vector3};
use wgpu::util::DeviceExt;

use crate::{geometry, layout, risk};

/// Floor grid description: side length and number of divisions.
#[derive(Clone, Debug)]
pub struct GridDef {
    pub size: f32,
    pub divisions: u32,
}

/// Directional light description.
#[derive(Clone, Debug)]
pub struct LightDef {
    pub direction: Vector3<f32>,
    pub color: [f32; 3],
}

/// Box description: where it sits, how it is scaled and its base color.
#[derive(Clone, Debug)]
pub struct CubeDef {
    pub position: Vector3<f32>,
    pub scale: Vector3<f32>,
    pub color: [f32; 3],
}

/// Base color of the demo cube and of unremarkable furniture.
pub const NEUTRAL_COLOR: [f32; 3] = [0.8, 0.8, 0.8];
/// Color of furniture named in a risk violation.
pub const FLAGGED_COLOR: [f32; 3] = [0.8, 0.25, 0.2];

/// CPU-side scene description, built once and handed to [`Scene::new`].
#[derive(Clone, Debug)]
pub struct SceneDef {
    pub grids: Vec<GridDef>,
    pub lights: Vec<LightDef>,
    pub cubes: Vec<CubeDef>,
}

/// Object counts of a scene, used by the smoke tests.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Census {
    pub grids: usize,
    pub lights: usize,
    pub cubes: usize,
}

impl SceneDef {
    /// The demo scene: one 10x10 grid, one white light shining from
    /// (5, 10, 5) towards the origin, one unit cube resting on the grid.
    pub fn demo() -> Self {
        Self {
            grids: vec![GridDef {
                size: 10.0,
                divisions: 10,
            }],
            lights: vec![LightDef {
                direction: -Vector3::new(5.0, 10.0, 5.0).normalize(),
                color: [1.0, 1.0, 1.0],
            }],
            cubes: vec![CubeDef {
                position: Vector3::new(0.5, 0.5, 0.5),
                scale: Vector3::new(1.0, 1.0, 1.0),
                color: NEUTRAL_COLOR,
            }],
        }
    }

    /// Build a scene from a furniture layout: a grid sized to the room, one
    /// box per item (one grid cell per layout cell) and the demo light.
    /// Items named in a risk violation are tinted [`FLAGGED_COLOR`].
    pub fn from_layout(
        room: &layout::Room,
        furniture: &[layout::Furniture],
    ) -> anyhow::Result<Self> {
        layout::validate_layout(room, furniture)?;
        let report = risk::assess(room, furniture)?;
        let flagged: HashSet<&str> = report
            .violations
            .iter()
            .map(|v| v.subject.as_str())
            .collect();

        let half_w = room.width as f32 / 2.0;
        let half_h = room.height as f32 / 2.0;
        let cubes = furniture
            .iter()
            .map(|f| {
                let center = f.center();
                CubeDef {
                    // Layout north (+y) points into -z, away from the camera.
                    position: Vector3::new(
                        center.x - half_w,
                        f.height as f32 / 2.0,
                        half_h - center.y,
                    ),
                    scale: Vector3::new(f.width as f32, f.height as f32, f.depth as f32),
                    color: if flagged.contains(f.name.as_str()) {
                        FLAGGED_COLOR
                    } else {
                        NEUTRAL_COLOR
                    },
                }
            })
            .collect();

        let side = room.width.max(room.height);
        Ok(Self {
            grids: vec![GridDef {
                size: side as f32,
                divisions: side,
            }],
            lights: vec![LightDef {
                direction: -Vector3::new(5.0, 10.0, 5.0).normalize(),
                color: [1.0, 1.0, 1.0],
            }],
            cubes,
        })
    }

    pub fn census(&self) -> Census {
        Census {
            grids: self.grids.len(),
            lights: self.lights.len(),
            cubes: self.cubes.len(),
        }
    }
}

/// Directional light data in the layout the shaders expect.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    pub direction: [f32; 3],
    // Uniforms require 16 byte (4 float) spacing, hence the padding fields
    pub _padding: u32,
    pub color: [f32; 3],
    pub _padding2: u32,
}

impl From<&LightDef> for LightUniform {
    fn from(def: &LightDef) -> Self {
        Self {
            direction: def.direction.normalize().into(),
            _padding: 0,
            color: def.color,
            _padding2: 0,
        }
    }
}

/// GPU bundle for the directional light: uniform, buffer and bind group.
#[derive(Debug)]
pub struct LightResources {
    pub uniform: LightUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl LightResources {
    pub fn new(device: &wgpu::Device, uniform: LightUniform) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Light Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group_layout = uniform_bind_group_layout(device, "light_bind_group_layout");
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("light_bind_group"),
        });
        Self {
            uniform,
            buffer,
            bind_group,
            bind_group_layout,
        }
    }
}

/// Bind group layout for a single uniform buffer visible to both shader
/// stages. Camera, light and model bindings all share this shape.
pub fn uniform_bind_group_layout(device: &wgpu::Device, label: &str) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
        label: Some(label),
    })
}

/// An indexed triangle mesh on the GPU.
#[derive(Debug)]
pub struct Mesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub num_elements: u32,
}

/// Line-list grid geometry on the GPU.
#[derive(Debug)]
pub struct GridHelper {
    pub vertex_buffer: wgpu::Buffer,
    pub num_vertices: u32,
}

impl GridHelper {
    pub fn new(device: &wgpu::Device, def: &GridDef) -> Self {
        let vertices = geometry::grid_helper(def.size, def.divisions);
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Grid Vertex Buffer"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        Self {
            vertex_buffer,
            num_vertices: vertices.len() as u32,
        }
    }
}

/// Model matrix and base color in the layout the shaders expect.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelUniform {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 3],
    pub _padding: u32,
}

/// Per-object transform bundle: model matrix uniform with its bind group.
#[derive(Debug)]
pub struct ModelResources {
    pub uniform: ModelUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

impl ModelResources {
    pub fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        matrix: Matrix4<f32>,
        color: [f32; 3],
    ) -> Self {
        let uniform = ModelUniform {
            model: matrix.into(),
            color,
            _padding: 0,
        };
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Model Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("model_bind_group"),
        });
        Self {
            uniform,
            buffer,
            bind_group,
        }
    }
}

/// The scene as it lives on the GPU. Constructed once per context.
#[derive(Debug)]
pub struct Scene {
    pub grids: Vec<GridHelper>,
    pub cubes: Vec<(Mesh, ModelResources)>,
    pub light: LightResources,
    pub model_bind_group_layout: wgpu::BindGroupLayout,
    num_lights: usize,
}

impl Scene {
    pub fn new(device: &wgpu::Device, def: &SceneDef) -> Self {
        let grids = def
            .grids
            .iter()
            .map(|grid| GridHelper::new(device, grid))
            .collect();

        // The shaders bind a single directional light.
        if def.lights.len() > 1 {
            log::warn!(
                "scene defines {} lights, only the first is rendered",
                def.lights.len()
            );
        }
        let light_uniform = def.lights.first().map(LightUniform::from).unwrap_or(
            LightUniform {
                direction: [0.0, -1.0, 0.0],
                _padding: 0,
                color: [1.0, 1.0, 1.0],
                _padding2: 0,
            },
        );
        let light = LightResources::new(device, light_uniform);

        let model_bind_group_layout = uniform_bind_group_layout(device, "model_bind_group_layout");

        let cubes = def
            .cubes
            .iter()
            .map(|cube| {
                let (vertices, indices) = geometry::unit_cube();
                let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Cube Vertex Buffer"),
                    contents: bytemuck::cast_slice(&vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                });
                let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Cube Index Buffer"),
                    contents: bytemuck::cast_slice(&indices),
                    usage: wgpu::BufferUsages::INDEX,
                });
                let mesh = Mesh {
                    vertex_buffer,
                    index_buffer,
                    num_elements: indices.len() as u32,
                };
                let matrix = Matrix4::from_translation(cube.position)
                    * Matrix4::from_nonuniform_scale(cube.scale.x, cube.scale.y, cube.scale.z);
                let transform =
                    ModelResources::new(device, &model_bind_group_layout, matrix, cube.color);
                (mesh, transform)
            })
            .collect();

        Self {
            grids,
            cubes,
            light,
            model_bind_group_layout,
            num_lights: def.lights.len().min(1),
        }
    }

    pub fn census(&self) -> Census {
        Census {
            grids: self.grids.len(),
            lights: self.num_lights,
            cubes: self.cubes.len(),
        }
    }

    /// Record draw commands for the whole scene into `render_pass`. Camera
    /// bind group 0 must already be set; the grid goes first so the cube
    /// depth-tests against it.
    pub fn draw<'pass>(
        &'pass self,
        pipelines: &'pass crate::pipelines::Pipelines,
        render_pass: &mut wgpu::RenderPass<'pass>,
    ) {
        render_pass.set_pipeline(&pipelines.line);
        for grid in &self.grids {
            render_pass.set_vertex_buffer(0, grid.vertex_buffer.slice(..));
            render_pass.draw(0..grid.num_vertices, 0..1);
        }

        render_pass.set_pipeline(&pipelines.solid);
        render_pass.set_bind_group(1, &self.light.bind_group, &[]);
        for (mesh, transform) in &self.cubes {
            render_pass.set_bind_group(2, &transform.bind_group, &[]);
            render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
            render_pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
            render_pass.draw_indexed(0..mesh.num_elements, 0, 0..1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_scene_has_one_of_each() {
        let census = SceneDef::demo().census();
        assert_eq!(
            census,
            Census {
                grids: 1,
                lights: 1,
                cubes: 1,
            }
        );
    }

    #[test]
    fn demo_light_direction_is_normalized() {
        let def = SceneDef::demo();
        let uniform = LightUniform::from(&def.lights[0]);
        let [x, y, z] = uniform.direction;
        let len = (x * x + y * y + z * z).sqrt();
        assert!((len - 1.0).abs() < 1e-6);
        // Shines downward onto the grid.
        assert!(y < 0.0);
    }

    #[test]
    fn demo_cube_rests_on_the_grid() {
        let def = SceneDef::demo();
        let cube = &def.cubes[0];
        // Bottom face of the unit cube touches y = 0.
        assert_eq!(cube.position.y - cube.scale.y / 2.0, 0.0);
    }

    #[test]
    fn layout_scene_has_one_box_per_item() {
        let (room, furniture) = crate::layout::sample_room();
        let def = SceneDef::from_layout(&room, &furniture).unwrap();
        assert_eq!(
            def.census(),
            Census {
                grids: 1,
                lights: 1,
                cubes: furniture.len(),
            }
        );
        // One grid cell per layout cell.
        assert_eq!(def.grids[0].size, 10.0);
        assert_eq!(def.grids[0].divisions, 10);
        // Every box rests on the floor.
        for cube in &def.cubes {
            assert_eq!(cube.position.y - cube.scale.y / 2.0, 0.0);
        }
    }

    #[test]
    fn layout_scene_tints_flagged_items() {
        let (room, furniture) = crate::layout::sample_room();
        let def = SceneDef::from_layout(&room, &furniture).unwrap();
        // The shelf violates two rules, the bed and the TV stand none.
        assert_eq!(def.cubes[0].color, FLAGGED_COLOR);
        assert_eq!(def.cubes[1].color, NEUTRAL_COLOR);
        assert_eq!(def.cubes[2].color, NEUTRAL_COLOR);
    }

    #[test]
    fn invalid_layout_never_becomes_a_scene() {
        let (room, mut furniture) = crate::layout::sample_room();
        furniture[0].x = 20;
        assert!(SceneDef::from_layout(&room, &furniture).is_err());
    }
}
