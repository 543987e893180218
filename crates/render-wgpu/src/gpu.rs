use crate::atlas::GpuAtlas;
use crate::context::{GpuContext, RenderError};
use crate::shaders;
use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use hexmap_common::{Color, TileImage};
use hexmap_grid::HexLayout;
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct ViewUniforms {
    view_proj: [[f32; 4]; 4],
}

/// Parameters of the hex grid material, laid out for a WGSL uniform block.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct HexMaterialUniforms {
    pub outline_color: [f32; 3],
    pub inner_radius: f32,
    pub world_size: [f32; 3],
    pub outline_width: f32,
    /// 1.0 once every tile cycle has finished; selects atlas over base map.
    pub map_ready: f32,
    pub tile_span: f32,
    pub _pad: [f32; 2],
}

impl HexMaterialUniforms {
    pub fn new(layout: &HexLayout, outline_width: f32, outline_color: Color, tile_span: u32) -> Self {
        Self {
            outline_color: outline_color.to_rgb_array(),
            inner_radius: layout.inner_radius(),
            world_size: layout.world_size().to_array(),
            outline_width,
            map_ready: 0.0,
            tile_span: tile_span as f32,
            _pad: [0.0; 2],
        }
    }

    pub fn with_map_ready(mut self, ready: bool) -> Self {
        self.map_ready = if ready { 1.0 } else { 0.0 };
        self
    }
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct HexVertex {
    position: [f32; 3],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct InstanceData {
    model_0: [f32; 4],
    model_1: [f32; 4],
    model_2: [f32; 4],
    model_3: [f32; 4],
    color: [f32; 4],
}

impl InstanceData {
    fn new(model: Mat4, color: Color) -> Self {
        let cols = model.to_cols_array_2d();
        Self {
            model_0: cols[0],
            model_1: cols[1],
            model_2: cols[2],
            model_3: cols[3],
            color: color.to_array(),
        }
    }
}

/// Pointy-top hexagon on the x/z plane: center plus six corners, drawn as a
/// six-triangle fan.
fn hex_mesh(outer_radius: f32) -> (Vec<HexVertex>, Vec<u16>) {
    let r = outer_radius;
    let i = r * hexmap_grid::INNER_RADIUS_RATIO;
    #[rustfmt::skip]
    let vertices = vec![
        HexVertex { position: [0.0, 0.0, 0.0] },
        HexVertex { position: [0.0, 0.0, r] },
        HexVertex { position: [i, 0.0, 0.5 * r] },
        HexVertex { position: [i, 0.0, -0.5 * r] },
        HexVertex { position: [0.0, 0.0, -r] },
        HexVertex { position: [-i, 0.0, -0.5 * r] },
        HexVertex { position: [-i, 0.0, 0.5 * r] },
    ];
    #[rustfmt::skip]
    let indices: Vec<u16> = vec![
        1, 2, 0,
        2, 3, 0,
        3, 4, 0,
        4, 5, 0,
        5, 6, 0,
        6, 1, 0,
    ];
    (vertices, indices)
}

/// Bytes per row of a readback buffer, padded to wgpu's copy alignment.
fn padded_bytes_per_row(width: u32) -> u32 {
    let unpadded = width * TileImage::BYTES_PER_PIXEL as u32;
    unpadded.div_ceil(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT) * wgpu::COPY_BYTES_PER_ROW_ALIGNMENT
}

/// Instanced hex grid renderer.
pub struct HexRenderer {
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    bind_group: Option<(wgpu::BindGroup, u64)>,
    view_buffer: wgpu::Buffer,
    material_buffer: wgpu::Buffer,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    instance_buffer: wgpu::Buffer,
    max_instances: u32,
    instance_count: u32,
    depth_texture: wgpu::TextureView,
    target_format: wgpu::TextureFormat,
}

impl HexRenderer {
    pub fn new(
        device: &wgpu::Device,
        target_format: wgpu::TextureFormat,
        layout: &HexLayout,
        material: HexMaterialUniforms,
        width: u32,
        height: u32,
    ) -> Self {
        let view_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("view_uniform_buffer"),
            contents: bytemuck::bytes_of(&ViewUniforms {
                view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let material_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("hex_material_buffer"),
            contents: bytemuck::bytes_of(&material),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_entry = |binding: u32, visibility: wgpu::ShaderStages| wgpu::BindGroupLayoutEntry {
            binding,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };
        let texture_entry = |binding: u32, view_dimension: wgpu::TextureViewDimension| {
            wgpu::BindGroupLayoutEntry {
                binding,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension,
                    multisampled: false,
                },
                count: None,
            }
        };
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("hex_bind_group_layout"),
            entries: &[
                uniform_entry(0, wgpu::ShaderStages::VERTEX),
                uniform_entry(1, wgpu::ShaderStages::FRAGMENT),
                texture_entry(2, wgpu::TextureViewDimension::D2),
                texture_entry(3, wgpu::TextureViewDimension::D2Array),
                wgpu::BindGroupLayoutEntry {
                    binding: 4,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("hex_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("hex_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::HEX_SHADER.into()),
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("hex_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<HexVertex>() as u64,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &wgpu::vertex_attr_array![0 => Float32x3],
                    },
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<InstanceData>() as u64,
                        step_mode: wgpu::VertexStepMode::Instance,
                        attributes: &wgpu::vertex_attr_array![
                            1 => Float32x4,
                            2 => Float32x4,
                            3 => Float32x4,
                            4 => Float32x4,
                            5 => Float32x4,
                        ],
                    },
                ],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: target_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth32Float,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        let (hex_verts, hex_indices) = hex_mesh(layout.outer_radius());
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("hex_vertex_buffer"),
            contents: bytemuck::cast_slice(&hex_verts),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("hex_index_buffer"),
            contents: bytemuck::cast_slice(&hex_indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        // One instance per cell
        let max_instances = layout.cell_count() as u32;
        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("instance_buffer"),
            size: (max_instances as u64) * std::mem::size_of::<InstanceData>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let depth_texture = Self::create_depth_texture(device, width, height);

        Self {
            pipeline,
            bind_group_layout,
            bind_group: None,
            view_buffer,
            material_buffer,
            vertex_buffer,
            index_buffer,
            index_count: hex_indices.len() as u32,
            instance_buffer,
            max_instances,
            instance_count: 0,
            depth_texture,
            target_format,
        }
    }

    /// Renderer targeting RGBA8 textures, for [`render_to_image`](Self::render_to_image).
    pub fn offscreen(
        device: &wgpu::Device,
        layout: &HexLayout,
        material: HexMaterialUniforms,
        width: u32,
        height: u32,
    ) -> Self {
        Self::new(device, crate::atlas::ATLAS_FORMAT, layout, material, width, height)
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_texture = Self::create_depth_texture(device, width, height);
    }

    pub fn target_format(&self) -> wgpu::TextureFormat {
        self.target_format
    }

    pub fn instance_count(&self) -> u32 {
        self.instance_count
    }

    /// Replace the per-cell transform and color buffer. Instances past the
    /// grid's cell count are dropped.
    pub fn upload_instances(
        &mut self,
        queue: &wgpu::Queue,
        instances: impl IntoIterator<Item = (Mat4, Color)>,
    ) -> u32 {
        let mut data: Vec<InstanceData> = instances
            .into_iter()
            .map(|(model, color)| InstanceData::new(model, color))
            .collect();
        if data.len() > self.max_instances as usize {
            tracing::warn!(
                given = data.len(),
                max = self.max_instances,
                "truncating instance upload"
            );
            data.truncate(self.max_instances as usize);
        }
        if !data.is_empty() {
            queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&data));
        }
        self.instance_count = data.len() as u32;
        self.instance_count
    }

    pub fn set_material(&self, queue: &wgpu::Queue, material: &HexMaterialUniforms) {
        queue.write_buffer(&self.material_buffer, 0, bytemuck::bytes_of(material));
    }

    /// Bind the atlas and base map. Rebuilds only if the base map changed
    /// since the last call.
    pub fn bind_atlas(&mut self, device: &wgpu::Device, atlas: &GpuAtlas) {
        if let Some((_, revision)) = &self.bind_group {
            if *revision == atlas.base_revision() {
                return;
            }
        }
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("hex_bind_group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: self.view_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: self.material_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(atlas.base_view()),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(atlas.view()),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::Sampler(atlas.sampler()),
                },
            ],
        });
        self.bind_group = Some((bind_group, atlas.base_revision()));
    }

    /// Render one frame of the grid into `view`. Does nothing until an atlas is bound.
    pub fn render(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        view_proj: Mat4,
    ) {
        let Some((bind_group, _)) = &self.bind_group else {
            tracing::warn!("render skipped: no atlas bound");
            return;
        };
        queue.write_buffer(
            &self.view_buffer,
            0,
            bytemuck::bytes_of(&ViewUniforms {
                view_proj: view_proj.to_cols_array_2d(),
            }),
        );

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("hex_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.1,
                            g: 0.1,
                            b: 0.15,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            if self.instance_count > 0 {
                pass.set_pipeline(&self.pipeline);
                pass.set_bind_group(0, bind_group, &[]);
                pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
                pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
                pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
                pass.draw_indexed(0..self.index_count, 0, 0..self.instance_count);
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
    }

    /// Render into an offscreen texture of the renderer's target format and
    /// read it back as RGBA8. The depth buffer must match `width × height`.
    pub fn render_to_image(
        &self,
        ctx: &GpuContext,
        width: u32,
        height: u32,
        view_proj: Mat4,
    ) -> Result<TileImage, RenderError> {
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let target = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("offscreen_target"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: self.target_format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let target_view = target.create_view(&Default::default());
        self.render(&ctx.device, &ctx.queue, &target_view, view_proj);

        let padded = padded_bytes_per_row(width);
        let readback = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("readback_buffer"),
            size: padded as u64 * height as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("readback_encoder"),
            });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &target,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &readback,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded),
                    rows_per_image: Some(height),
                },
            },
            size,
        );
        ctx.queue.submit(std::iter::once(encoder.finish()));

        let slice = readback.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        let _ = ctx.device.poll(wgpu::Maintain::Wait);
        rx.recv().unwrap_or(Err(wgpu::BufferAsyncError))?;

        let row_len = width as usize * TileImage::BYTES_PER_PIXEL;
        let mut pixels = Vec::with_capacity(row_len * height as usize);
        {
            let mapped = slice.get_mapped_range();
            for row in mapped.chunks(padded as usize) {
                pixels.extend_from_slice(&row[..row_len]);
            }
        }
        readback.unmap();

        if matches!(
            self.target_format,
            wgpu::TextureFormat::Bgra8Unorm | wgpu::TextureFormat::Bgra8UnormSrgb
        ) {
            for px in pixels.chunks_mut(TileImage::BYTES_PER_PIXEL) {
                px.swap(0, 2);
            }
        }

        Ok(TileImage::from_rgba8(width, height, pixels)?)
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }
}
