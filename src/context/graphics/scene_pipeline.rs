use std::borrow::Cow;

use cgmath::Vector4;

use super::{Vertex3, ViewProjection, COLOR_FORMAT, DEPTH_FORMAT};
use crate::transform::ModelTransform;

/// Per-object uniform: placement plus material color.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct ObjectUniform {
    pub transform: ModelTransform,
    pub tint: Vector4<f32>,
}

unsafe impl bytemuck::Pod for ObjectUniform {}
unsafe impl bytemuck::Zeroable for ObjectUniform {}

impl Default for ObjectUniform {
    fn default() -> Self {
        Self {
            transform: ModelTransform::default(),
            tint: Vector4::new(1.0, 1.0, 1.0, 1.0),
        }
    }
}

/// A lit pipeline and a mirror pipeline for one front-face winding.
struct Winding {
    lit: wgpu::RenderPipeline,
    mirror: wgpu::RenderPipeline,
}

/// Scene pipelines in both windings. Passes drawn through a mirrored view
/// flip every triangle on screen and use the clockwise pair.
pub struct ScenePipeline {
    ccw: Winding,
    cw: Winding,
    sky: wgpu::RenderPipeline,
    pub camera_layout: wgpu::BindGroupLayout,
    pub object_layout: wgpu::BindGroupLayout,
    pub texture_layout: wgpu::BindGroupLayout,
    pub sampler: wgpu::Sampler,
}

fn uniform_layout(
    device: &wgpu::Device,
    label: &str,
    visibility: wgpu::ShaderStages,
) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    })
}

fn depth_state(
    write: bool,
    compare: wgpu::CompareFunction,
) -> wgpu::DepthStencilState {
    wgpu::DepthStencilState {
        format: DEPTH_FORMAT,
        depth_write_enabled: write,
        depth_compare: compare,
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    }
}

impl ScenePipeline {
    pub fn new(device: &wgpu::Device) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("mirrorprobe.scene.shader"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(include_str!(
                "shaders/scene.wgsl"
            ))),
        });

        let camera_layout = uniform_layout(
            device,
            "mirrorprobe.camera.layout",
            wgpu::ShaderStages::VERTEX_FRAGMENT,
        );
        let object_layout = uniform_layout(
            device,
            "mirrorprobe.object.layout",
            wgpu::ShaderStages::VERTEX,
        );
        let texture_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("mirrorprobe.reflection.layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float {
                                filterable: true,
                            },
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(
                            wgpu::SamplerBindingType::Filtering,
                        ),
                        count: None,
                    },
                ],
            });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("mirrorprobe.reflection.sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let lit_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("mirrorprobe.lit.layout"),
                bind_group_layouts: &[&camera_layout, &object_layout],
                push_constant_ranges: &[],
            });
        let mirror_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("mirrorprobe.mirror.layout"),
                bind_group_layouts: &[
                    &camera_layout,
                    &object_layout,
                    &texture_layout,
                ],
                push_constant_ranges: &[],
            });
        let sky_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("mirrorprobe.sky.layout"),
                bind_group_layouts: &[&camera_layout],
                push_constant_ranges: &[],
            });

        let mesh_pipeline = |layout: &wgpu::PipelineLayout,
                             fragment: &str,
                             front_face: wgpu::FrontFace| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("mirrorprobe.scene.pipeline"),
                layout: Some(layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: "vs_main",
                    compilation_options: Default::default(),
                    buffers: &[Vertex3::desc()],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: fragment,
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: COLOR_FORMAT,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    front_face,
                    cull_mode: Some(wgpu::Face::Back),
                    ..Default::default()
                },
                depth_stencil: Some(depth_state(
                    true,
                    wgpu::CompareFunction::Less,
                )),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        };

        let ccw = Winding {
            lit: mesh_pipeline(&lit_layout, "fs_main", wgpu::FrontFace::Ccw),
            mirror: mesh_pipeline(
                &mirror_layout,
                "fs_mirror",
                wgpu::FrontFace::Ccw,
            ),
        };
        let cw = Winding {
            lit: mesh_pipeline(&lit_layout, "fs_main", wgpu::FrontFace::Cw),
            mirror: mesh_pipeline(
                &mirror_layout,
                "fs_mirror",
                wgpu::FrontFace::Cw,
            ),
        };

        let sky =
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("mirrorprobe.sky.pipeline"),
                layout: Some(&sky_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: "vs_sky",
                    compilation_options: Default::default(),
                    buffers: &[],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: "fs_sky",
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: COLOR_FORMAT,
                        blend: None,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState::default(),
                depth_stencil: Some(depth_state(
                    false,
                    wgpu::CompareFunction::Always,
                )),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            });

        Self {
            ccw,
            cw,
            sky,
            camera_layout,
            object_layout,
            texture_layout,
            sampler,
        }
    }

    fn winding(&self, inverted: bool) -> &Winding {
        if inverted {
            &self.cw
        } else {
            &self.ccw
        }
    }

    pub fn lit(&self, inverted: bool) -> &wgpu::RenderPipeline {
        &self.winding(inverted).lit
    }

    pub fn mirror(&self, inverted: bool) -> &wgpu::RenderPipeline {
        &self.winding(inverted).mirror
    }

    pub fn sky(&self) -> &wgpu::RenderPipeline {
        &self.sky
    }

    pub fn camera_bind_group(
        &self,
        device: &wgpu::Device,
        buffer: &wgpu::Buffer,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("mirrorprobe.camera.bind_group"),
            layout: &self.camera_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        })
    }

    pub fn object_bind_group(
        &self,
        device: &wgpu::Device,
        buffer: &wgpu::Buffer,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("mirrorprobe.object.bind_group"),
            layout: &self.object_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        })
    }

    pub fn reflection_bind_group(
        &self,
        device: &wgpu::Device,
        view: &wgpu::TextureView,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("mirrorprobe.reflection.bind_group"),
            layout: &self.texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        })
    }
}

/// Keeps the camera uniform size in sync with the WGSL struct.
pub const CAMERA_UNIFORM_SIZE: usize = std::mem::size_of::<ViewProjection>();
