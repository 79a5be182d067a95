#[cfg(feature = "integration-tests")]
mod common;

/// Renders the demo scene to an offscreen texture and checks the frame
/// composition: the cube is lit and visible, the background keeps the clear
/// colour, and the whole frame is opaque.
#[test]
#[cfg(feature = "integration-tests")]
fn renders_demo_scene_offscreen() {
    use cgmath::Vector4;
    use gridview::camera::{CameraUniform, demo_camera, demo_projection};
    use gridview::pipelines::Pipelines;
    use gridview::scene::{Scene, SceneDef, uniform_bind_group_layout};
    use gridview::texture::Texture;
    use wgpu::util::DeviceExt;

    const WIDTH: u32 = 256;
    const HEIGHT: u32 = 256;

    let runtime = tokio::runtime::Runtime::new().expect("Failed to create async runtime");
    runtime.block_on(async {
        let (device, queue) = common::test_utils::request_test_device().await;

        let format = wgpu::TextureFormat::Rgba8UnormSrgb;
        let config = common::test_utils::test_surface_config(format, WIDTH, HEIGHT);

        let camera = demo_camera();
        let projection = demo_projection(WIDTH, HEIGHT);
        let mut camera_uniform = CameraUniform::new();
        camera_uniform.update_view_proj(&camera, &projection);

        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[camera_uniform]),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let camera_layout = uniform_bind_group_layout(&device, "camera_bind_group_layout");
        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &camera_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
            label: Some("camera_bind_group"),
        });

        let scene = Scene::new(&device, &SceneDef::demo());
        let pipelines = Pipelines::new(
            &device,
            &config,
            &camera_layout,
            &scene.light.bind_group_layout,
            &scene.model_bind_group_layout,
        );

        let color_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Offscreen Color Texture"),
            size: wgpu::Extent3d {
                width: WIDTH,
                height: HEIGHT,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let color_view = color_texture.create_view(&wgpu::TextureViewDescriptor::default());
        let depth_texture = Texture::create_depth_texture(&device, [WIDTH, HEIGHT], "test_depth");

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Test Render Encoder"),
        });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Test Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &color_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_bind_group(0, &camera_bind_group, &[]);
            scene.draw(&pipelines, &mut render_pass);
        }

        let frame = common::test_utils::read_texture_rgba(
            &device,
            &queue,
            encoder,
            &color_texture,
            WIDTH,
            HEIGHT,
        )
        .await;

        // Every pixel is opaque.
        assert!(frame.pixels().all(|p| p.0[3] == 255));

        // The pixel under the cube's center is lit, never the clear colour.
        let clip = projection.calc_matrix()
            * camera.calc_matrix()
            * Vector4::new(0.5, 0.5, 0.5, 1.0);
        let ndc_x = clip.x / clip.w;
        let ndc_y = clip.y / clip.w;
        let px = ((ndc_x * 0.5 + 0.5) * WIDTH as f32) as u32;
        let py = ((1.0 - (ndc_y * 0.5 + 0.5)) * HEIGHT as f32) as u32;
        let cube_pixel = frame.get_pixel(px, py);
        assert!(
            cube_pixel.0[0] > 0 || cube_pixel.0[1] > 0 || cube_pixel.0[2] > 0,
            "cube pixel at ({px}, {py}) kept the clear colour"
        );

        // The scene does not fill the frame: some background must remain.
        let background = frame
            .pixels()
            .filter(|p| p.0[0] == 0 && p.0[1] == 0 && p.0[2] == 0)
            .count();
        assert!(background > 0);
    });
}
