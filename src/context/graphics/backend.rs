use std::collections::HashMap;

use anyhow::{anyhow, Result};
use slotmap::{SecondaryMap, SlotMap};
use wgpu::util::DeviceExt;

use super::{
    shape_mesh, GraphicsContext, ObjectUniform, ReflectionTarget, ScenePipeline,
    ViewProjection,
};
use crate::camera::{ClearMode, Skybox};
use crate::context::{ProbeView, RenderBackend, TargetDescriptor, TargetId};
use crate::material::{Material, BASE_MAP, MAIN_TEXTURE};
use crate::probe::{bound_slot, SlotTable};
use crate::transform::ModelTransform;
use crate::world::{CameraId, Shape, SurfaceId, World};

const UNTEXTURED: [f32; 4] = [0.7, 0.7, 0.7, 1.0];

/// How a pass starts: what it does with the previous color and depth, and
/// whether the sky gradient is painted before geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClearOps {
    pub color: wgpu::LoadOp<wgpu::Color>,
    pub depth: wgpu::LoadOp<f32>,
    pub sky: bool,
}

fn to_color(c: [f32; 4]) -> wgpu::Color {
    wgpu::Color {
        r: c[0] as f64,
        g: c[1] as f64,
        b: c[2] as f64,
        a: c[3] as f64,
    }
}

pub fn clear_ops(clear: ClearMode, skybox: Option<&Skybox>) -> ClearOps {
    let depth = wgpu::LoadOp::Clear(1.0);
    match clear {
        ClearMode::Skybox => match skybox {
            Some(sky) if sky.enabled => ClearOps {
                color: wgpu::LoadOp::Clear(to_color(sky.horizon)),
                depth,
                sky: true,
            },
            _ => ClearOps {
                color: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                depth,
                sky: false,
            },
        },
        ClearMode::Color(c) => ClearOps {
            color: wgpu::LoadOp::Clear(to_color(c)),
            depth,
            sky: false,
        },
        ClearMode::DepthOnly => ClearOps {
            color: wgpu::LoadOp::Load,
            depth,
            sky: false,
        },
        // Fresh targets hold zero depth, so depth is reset regardless.
        ClearMode::Nothing => ClearOps {
            color: wgpu::LoadOp::Load,
            depth,
            sky: false,
        },
    }
}

/// GPU buffers for one surface.
struct DrawObject {
    shape: Shape,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl DrawObject {
    fn new(
        ctx: &GraphicsContext,
        pipeline: &ScenePipeline,
        shape: Shape,
    ) -> Self {
        let (vertices, indices) = shape_mesh(&shape);
        let vertex_buffer =
            ctx.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("mirrorprobe.object.vertices"),
                    contents: bytemuck::cast_slice(&vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                });
        let index_buffer =
            ctx.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("mirrorprobe.object.indices"),
                    contents: bytemuck::cast_slice(&indices),
                    usage: wgpu::BufferUsages::INDEX,
                });
        let uniform_buffer =
            ctx.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("mirrorprobe.object.uniform"),
                    contents: bytemuck::cast_slice(&[
                        ObjectUniform::default(),
                    ]),
                    usage: wgpu::BufferUsages::UNIFORM
                        | wgpu::BufferUsages::COPY_DST,
                });
        let bind_group =
            pipeline.object_bind_group(&ctx.device, &uniform_buffer);

        Self {
            shape,
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
            uniform_buffer,
            bind_group,
        }
    }
}

/// What a surface looks like in one pass.
enum Look {
    Lit,
    Mirror(wgpu::BindGroup),
}

/// Draws worlds with wgpu into off-screen targets.
pub struct WgpuBackend {
    ctx: GraphicsContext,
    pipeline: ScenePipeline,
    targets: SlotMap<TargetId, ReflectionTarget>,
    /// The observer cameras' own color buffers.
    frames: SecondaryMap<CameraId, ReflectionTarget>,
    objects: SecondaryMap<SurfaceId, DrawObject>,
    /// Published images by global name, refreshed before each camera pass.
    globals: HashMap<String, TargetId>,
    invert_culling: bool,
}

impl WgpuBackend {
    pub fn new(ctx: GraphicsContext) -> Self {
        let pipeline = ScenePipeline::new(&ctx.device);
        Self {
            ctx,
            pipeline,
            targets: SlotMap::with_key(),
            frames: SecondaryMap::new(),
            objects: SecondaryMap::new(),
            globals: HashMap::new(),
            invert_culling: false,
        }
    }

    pub fn context(&self) -> &GraphicsContext {
        &self.ctx
    }

    pub fn target(&self, id: TargetId) -> Option<&ReflectionTarget> {
        self.targets.get(id)
    }

    /// The last image drawn for `camera`.
    pub fn frame(&self, camera: CameraId) -> Option<&ReflectionTarget> {
        self.frames.get(camera)
    }

    pub fn global_texture(&self, name: &str) -> Option<TargetId> {
        self.globals.get(name).copied()
    }

    pub fn live_targets(&self) -> usize {
        self.targets.len()
    }

    /// Creates or refreshes GPU state for every surface and uploads this
    /// frame's transforms.
    fn sync_objects(&mut self, world: &World) {
        let stale: Vec<SurfaceId> = self
            .objects
            .keys()
            .filter(|id| !world.surfaces.contains_key(*id))
            .collect();
        for id in stale {
            self.objects.remove(id);
        }

        for (id, surface) in world.surfaces.iter() {
            let rebuild = match self.objects.get(id) {
                Some(object) => object.shape != surface.shape,
                None => true,
            };
            if rebuild {
                let object =
                    DrawObject::new(&self.ctx, &self.pipeline, surface.shape);
                self.objects.insert(id, object);
            }
            if let Some(object) = self.objects.get(id) {
                let uniform = ObjectUniform {
                    transform: ModelTransform::from(&surface.transform),
                    tint: surface
                        .material
                        .as_ref()
                        .map_or(UNTEXTURED, |m| m.color)
                        .into(),
                };
                self.ctx.queue.write_buffer(
                    &object.uniform_buffer,
                    0,
                    bytemuck::cast_slice(&[uniform]),
                );
            }
        }
    }

    /// The image a mirror material samples in the observer's pass.
    fn mirror_source(
        &self,
        material: &Material,
    ) -> Option<&ReflectionTarget> {
        let id = match bound_slot(material) {
            Some(slot) => self.globals.get(&slot.global_name()).copied(),
            None => material
                .texture(MAIN_TEXTURE)
                .or_else(|| material.texture(BASE_MAP)),
        }?;
        self.targets.get(id)
    }

    fn looks(&self, world: &World, mirrors: bool) -> Vec<(SurfaceId, Look)> {
        world
            .surfaces
            .iter()
            .map(|(id, surface)| {
                let source = surface
                    .material
                    .as_ref()
                    .filter(|_| mirrors)
                    .and_then(|m| self.mirror_source(m));
                let look = match source {
                    Some(target) => {
                        Look::Mirror(self.pipeline.reflection_bind_group(
                            &self.ctx.device,
                            &target.color_view,
                        ))
                    }
                    None => Look::Lit,
                };
                (id, look)
            })
            .collect()
    }

    fn draw(
        &self,
        color_view: &wgpu::TextureView,
        depth_view: &wgpu::TextureView,
        camera: &ViewProjection,
        ops: ClearOps,
        looks: &[(SurfaceId, Look)],
    ) {
        let device = &self.ctx.device;
        let camera_buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("mirrorprobe.camera.uniform"),
                contents: bytemuck::cast_slice(&[*camera]),
                usage: wgpu::BufferUsages::UNIFORM,
            });
        let camera_bind_group =
            self.pipeline.camera_bind_group(device, &camera_buffer);

        let mut encoder =
            device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("mirrorprobe.pass.encoder"),
            });
        {
            let mut pass =
                encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("mirrorprobe.pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: color_view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: ops.color,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: Some(
                        wgpu::RenderPassDepthStencilAttachment {
                            view: depth_view,
                            depth_ops: Some(wgpu::Operations {
                                load: ops.depth,
                                store: wgpu::StoreOp::Store,
                            }),
                            stencil_ops: None,
                        },
                    ),
                    timestamp_writes: None,
                    occlusion_query_set: None,
                });

            pass.set_bind_group(0, &camera_bind_group, &[]);
            if ops.sky {
                pass.set_pipeline(self.pipeline.sky());
                pass.draw(0..3, 0..1);
            }

            for (id, look) in looks.iter() {
                let object = match self.objects.get(*id) {
                    Some(object) => object,
                    None => continue,
                };
                match look {
                    Look::Lit => {
                        pass.set_pipeline(
                            self.pipeline.lit(self.invert_culling),
                        );
                    }
                    Look::Mirror(bind_group) => {
                        pass.set_pipeline(
                            self.pipeline.mirror(self.invert_culling),
                        );
                        pass.set_bind_group(2, bind_group, &[]);
                    }
                }
                pass.set_bind_group(1, &object.bind_group, &[]);
                pass.set_vertex_buffer(0, object.vertex_buffer.slice(..));
                pass.set_index_buffer(
                    object.index_buffer.slice(..),
                    wgpu::IndexFormat::Uint16,
                );
                pass.draw_indexed(0..object.index_count, 0, 0..1);
            }
        }
        self.ctx.queue.submit(std::iter::once(encoder.finish()));
    }
}

impl RenderBackend for WgpuBackend {
    fn create_target(&mut self, desc: &TargetDescriptor) -> Result<TargetId> {
        let limit = self.ctx.device.limits().max_texture_dimension_2d;
        if desc.width > limit || desc.height > limit {
            return Err(anyhow!(
                "{}x{} exceeds the device limit of {}",
                desc.width,
                desc.height,
                limit
            ));
        }
        let target = ReflectionTarget::new(&self.ctx.device, desc);
        Ok(self.targets.insert(target))
    }

    fn release_target(&mut self, target: TargetId) {
        if let Some(released) = self.targets.remove(target) {
            released.color.destroy();
            released.depth.destroy();
        }
        self.globals.retain(|_, published| *published != target);
    }

    fn invert_culling(&self) -> bool {
        self.invert_culling
    }

    fn set_invert_culling(&mut self, invert: bool) {
        self.invert_culling = invert;
    }

    fn render_view(
        &mut self,
        world: &World,
        view: &ProbeView,
        target: TargetId,
    ) -> Result<()> {
        self.sync_objects(world);
        let target = self
            .targets
            .get(target)
            .ok_or_else(|| anyhow!("unknown target {:?}", target))?;

        let mut camera = ViewProjection::for_probe(
            &view.pose,
            (target.width, target.height),
        );
        if let Some(sky) = view.skybox.as_ref() {
            camera = camera.with_sky(sky);
        }
        // Mirrors show their material color from inside a reflection.
        let looks = self.looks(world, false);
        self.draw(
            &target.color_view,
            &target.depth_view,
            &camera,
            clear_ops(view.clear, view.skybox.as_ref()),
            &looks,
        );
        Ok(())
    }

    fn render_camera(
        &mut self,
        world: &World,
        camera_id: CameraId,
        slots: &SlotTable,
    ) -> Result<()> {
        let camera = world
            .cameras
            .get(camera_id)
            .ok_or_else(|| anyhow!("unknown camera {:?}", camera_id))?;
        if camera.pixel_width == 0 || camera.pixel_height == 0 {
            return Ok(());
        }

        self.globals.clear();
        for (slot, image) in slots.iter() {
            self.globals.insert(slot.global_name(), image);
        }
        self.sync_objects(world);

        let resize = match self.frames.get(camera_id) {
            Some(frame) => {
                !frame.matches(camera.pixel_width, camera.pixel_height)
            }
            None => true,
        };
        if resize {
            let frame = ReflectionTarget::new(
                &self.ctx.device,
                &TargetDescriptor::new(camera.pixel_width, camera.pixel_height),
            );
            self.frames.insert(camera_id, frame);
        }
        let frame = self
            .frames
            .get(camera_id)
            .ok_or_else(|| anyhow!("no frame for camera {:?}", camera_id))?;

        let mut uniform = ViewProjection::for_observer(&camera.pose());
        if let Some(sky) = camera.skybox.as_ref() {
            uniform = uniform.with_sky(sky);
        }
        let looks = self.looks(world, true);
        self.draw(
            &frame.color_view,
            &frame.depth_view,
            &uniform,
            clear_ops(camera.clear, camera.skybox.as_ref()),
            &looks,
        );
        Ok(())
    }
}
