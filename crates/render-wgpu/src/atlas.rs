use crate::shaders;
use hexmap_common::TileImage;
use hexmap_render::{AtlasExtent, LayeredAtlas};

pub(crate) const ATLAS_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// Tile atlas as a GPU texture array, plus the low-resolution base map.
///
/// Tiles are copied by drawing them into a single-layer view of the array,
/// so a source of any size is resampled to the layer size.
pub struct GpuAtlas {
    device: wgpu::Device,
    queue: wgpu::Queue,
    extent: AtlasExtent,
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    base_texture: wgpu::Texture,
    base_view: wgpu::TextureView,
    base_revision: u64,
    blit_pipeline: wgpu::RenderPipeline,
    blit_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
}

impl GpuAtlas {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, extent: AtlasExtent) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("tile_atlas"),
            size: wgpu::Extent3d {
                width: extent.width,
                height: extent.height,
                depth_or_array_layers: extent.depth,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: ATLAS_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_DST
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("tile_atlas_view"),
            dimension: Some(wgpu::TextureViewDimension::D2Array),
            ..Default::default()
        });

        // 1x1 black until the real base map arrives
        let (base_texture, base_view) =
            upload_texture(device, queue, "base_map", &TileImage::filled(1, 1, [0, 0, 0, 255]));

        let blit_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("blit_bind_group_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("blit_pipeline_layout"),
            bind_group_layouts: &[&blit_layout],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("blit_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::BLIT_SHADER.into()),
        });

        let blit_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("blit_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_blit"),
                compilation_options: Default::default(),
                buffers: &[],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_blit"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ATLAS_FORMAT,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("map_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        tracing::debug!(
            width = extent.width,
            height = extent.height,
            layers = extent.depth,
            "GPU atlas created"
        );

        Self {
            device: device.clone(),
            queue: queue.clone(),
            extent,
            texture,
            view,
            base_texture,
            base_view,
            base_revision: 0,
            blit_pipeline,
            blit_layout,
            sampler,
        }
    }

    /// Array view over every layer, for binding in the hex material.
    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn texture(&self) -> &wgpu::Texture {
        &self.texture
    }

    pub fn base_view(&self) -> &wgpu::TextureView {
        &self.base_view
    }

    pub fn base_texture(&self) -> &wgpu::Texture {
        &self.base_texture
    }

    /// Bumped whenever the base map texture is replaced; bind groups built
    /// against an older revision must be rebuilt.
    pub fn base_revision(&self) -> u64 {
        self.base_revision
    }

    /// Linear clamp-to-edge sampler shared by the blit and the hex material.
    pub fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }
}

impl LayeredAtlas for GpuAtlas {
    fn extent(&self) -> AtlasExtent {
        self.extent
    }

    fn blit_layer(&mut self, layer: u32, image: &TileImage) {
        if image.width() == 0 || image.height() == 0 {
            tracing::warn!(layer, "skipping blit of empty image");
            return;
        }
        let (_source, source_view) = upload_texture(&self.device, &self.queue, "blit_source", image);

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("blit_bind_group"),
            layout: &self.blit_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&source_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });

        let layer_view = self.texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("atlas_layer_view"),
            dimension: Some(wgpu::TextureViewDimension::D2),
            base_array_layer: layer,
            array_layer_count: Some(1),
            ..Default::default()
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("blit_encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("blit_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &layer_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                ..Default::default()
            });
            pass.set_pipeline(&self.blit_pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            pass.draw(0..3, 0..1);
        }
        self.queue.submit(std::iter::once(encoder.finish()));
    }

    fn upload_base_map(&mut self, image: &TileImage) {
        if image.width() == 0 || image.height() == 0 {
            tracing::warn!("ignoring empty base map");
            return;
        }
        let (texture, view) = upload_texture(&self.device, &self.queue, "base_map", image);
        self.base_texture = texture;
        self.base_view = view;
        self.base_revision += 1;
    }
}

/// Create a sampled 2D texture holding `image`.
fn upload_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    label: &str,
    image: &TileImage,
) -> (wgpu::Texture, wgpu::TextureView) {
    let size = wgpu::Extent3d {
        width: image.width(),
        height: image.height(),
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: ATLAS_FORMAT,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        image.pixels(),
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(TileImage::BYTES_PER_PIXEL as u32 * image.width()),
            rows_per_image: Some(image.height()),
        },
        size,
    );
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    (texture, view)
}
