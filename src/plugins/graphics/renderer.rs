use std::mem::size_of;
use std::sync::Arc;
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use tracing::instrument;
use wgpu::util::{BufferInitDescriptor, DeviceExt};
use wgpu::*;
use crate::math::Transform;
use crate::{reserve_buffer, Color, GraphicsState, HasId, HashMap, HudQuad, Mesh, Model, NodeId, Scene, Vertex};

const INSTANCE_SLOT: u32 = 0;
const VERTEX_SLOT: u32 = 1;
const CAMERA_GROUP: u32 = 0;

const INSTANCE_LAYOUT: VertexBufferLayout<'static> = VertexBufferLayout {
    array_stride: size_of::<Instance>() as u64,
    step_mode: VertexStepMode::Instance,
    attributes: &[
        VertexAttribute {
            format: VertexFormat::Float32x4,
            offset: 0*4*4,
            shader_location: 0,
        },
        VertexAttribute {
            format: VertexFormat::Float32x4,
            offset: 1*4*4,
            shader_location: 1,
        },
        VertexAttribute {
            format: VertexFormat::Float32x4,
            offset: 2*4*4,
            shader_location: 2,
        },
        VertexAttribute {
            format: VertexFormat::Float32x4,
            offset: 3*4*4,
            shader_location: 3,
        },
        VertexAttribute {
            format: VertexFormat::Float32x4,
            offset: 4*4*4,
            shader_location: 4,
        },
    ],
};

const HUD_VERTEX_LAYOUT: VertexBufferLayout<'static> = VertexBufferLayout {
    array_stride: size_of::<HudVertex>() as u64,
    step_mode: VertexStepMode::Vertex,
    attributes: &[
        VertexAttribute {
            format: VertexFormat::Float32x2,
            offset: 0,
            shader_location: 0,
        },
        VertexAttribute {
            format: VertexFormat::Float32x4,
            offset: 2*4,
            shader_location: 1,
        },
    ],
};

/**
 * Object that can be rendered.
 * Nodes without a model only group their children.
 */
#[derive(Clone, PartialEq, Debug)]
pub struct Renderable {
    pub model: Option<Model>,
    pub color: Color,
    pub transform: Transform,
}

impl Renderable {

    /// Renderable with nothing to draw.
    pub fn empty() -> Self {
        Self {
            model: None,
            color: Color::WHITE,
            transform: Transform::IDENTITY,
        }
    }

    pub fn model(model: Model, color: Color) -> Self {
        Self {
            model: Some(model),
            color,
            transform: Transform::IDENTITY,
        }
    }
}

impl HasId for Renderable {
    type Id = NodeId;
}

/// A model to draw, with its transform propagated.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct FlatRenderable {
    pub model: Model,
    pub color: Color,
    pub global_transform: Mat4,
}

/// Propagates transforms down the scene, and collects everything that has a model.
#[instrument(skip_all)]
pub fn flatten_scene(scene: &Scene<Renderable>) -> Vec<FlatRenderable> {
    let mut flat = Vec::with_capacity(scene.len());
    scene.graph.propagate(Mat4::IDENTITY, |parent_transform, renderable| {
        let global_transform = parent_transform * Mat4::from(renderable.transform);
        if let Some(model) = renderable.model {
            flat.push(FlatRenderable {
                model,
                color: renderable.color,
                global_transform,
            });
        }
        global_transform
    });
    flat
}

/// Per-instance data.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct Instance {
    model: [[f32; 4]; 4],
    color: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct CameraUniform {
    view_proj: [[f32; 4]; 4],
    light_dir: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct HudVertex {
    position: [f32; 2],
    color: [f32; 4],
}

/// GPU meshes for every built-in [`Model`].
pub struct ModelLibrary {
    meshes: HashMap<Model, Mesh>,
}

impl ModelLibrary {

    pub fn new(device: &Device) -> Self {
        let meshes = Model::ALL
            .into_iter()
            .map(|model| {
                let data = model.mesh_data();
                log::debug!("Generated {model} with {} vertices", data.vertex_count());
                (model, Mesh::from_data(&data, device))
            })
            .collect();
        Self { meshes }
    }

    pub fn get(&self, model: Model) -> Option<&Mesh> {
        self.meshes.get(&model)
    }
}

/// Batch of instances sharing a model.
struct Batch {
    model: Model,
    instances: std::ops::Range<u32>,
}

/// Draws the 3D scene, then the HUD over it.
pub struct Renderer {
    device: Arc<Device>,
    queue: Arc<Queue>,
    models: ModelLibrary,
    scene_pipeline: RenderPipeline,
    hud_pipeline: RenderPipeline,
    camera_buffer: Buffer,
    camera_bind_group: BindGroup,
    instances: Buffer,
    hud_vertices: Buffer,
    light_dir: Vec3,
    pub clear_color: Color,
}

impl Renderer {

    pub fn new(state: &GraphicsState) -> Self {
        let device = state.device.clone();
        let queue = state.queue.clone();
        let camera_buffer = device.create_buffer_init(&BufferInitDescriptor {
            label: Some("camera_buffer"),
            contents: bytemuck::bytes_of(&CameraUniform::zeroed()),
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
        });
        let camera_layout = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("camera_layout"),
            entries: &[BindGroupLayoutEntry {
                binding: 0,
                visibility: ShaderStages::VERTEX_FRAGMENT,
                ty: BindingType::Buffer {
                    ty: BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let camera_bind_group = device.create_bind_group(&BindGroupDescriptor {
            label: Some("camera_bind_group"),
            layout: &camera_layout,
            entries: &[BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });
        let scene_pipeline = create_scene_pipeline(&device, &camera_layout, state.surface_format(), state.depth_format());
        let hud_pipeline = create_hud_pipeline(&device, state.surface_format(), state.depth_format());
        Self {
            models: ModelLibrary::new(&device),
            scene_pipeline,
            hud_pipeline,
            camera_buffer,
            camera_bind_group,
            instances: create_vertex_buffer(&device, "instance_buffer"),
            hud_vertices: create_vertex_buffer(&device, "hud_buffer"),
            light_dir: Vec3::new(-0.3, 0.5, -1.0).normalize(),
            clear_color: Color::SKY,
            device,
            queue,
        }
    }

    /// Encodes and submits commands that draw the scene and HUD to the texture view.
    #[instrument(skip_all)]
    pub fn render(
        &mut self,
        state: &GraphicsState,
        view: &TextureView,
        view_proj: Mat4,
        flat_scene: &[FlatRenderable],
        hud_quads: &[HudQuad],
    ) {
        // Uploads camera
        let camera = CameraUniform {
            view_proj: view_proj.to_cols_array_2d(),
            light_dir: self.light_dir.extend(0.0).to_array(),
        };
        self.queue.write_buffer(&self.camera_buffer, 0, bytemuck::bytes_of(&camera));

        // Groups instances by model, and uploads them
        let mut by_model: HashMap<Model, Vec<Instance>> = HashMap::default();
        for flat in flat_scene {
            by_model.entry(flat.model).or_default().push(Instance {
                model: flat.global_transform.to_cols_array_2d(),
                color: flat.color.to_array(),
            });
        }
        let mut instance_data = Vec::with_capacity(flat_scene.len());
        let mut batches = Vec::with_capacity(by_model.len());
        for (model, instances) in by_model {
            let start = instance_data.len() as u32;
            instance_data.extend(instances);
            batches.push(Batch { model, instances: start..instance_data.len() as u32 });
        }
        let instance_bytes: &[u8] = bytemuck::cast_slice(&instance_data);
        if !instance_bytes.is_empty() {
            reserve_buffer(&mut self.instances, instance_bytes.len() as u64, &self.device);
            self.queue.write_buffer(&self.instances, 0, instance_bytes);
        }

        // Uploads HUD
        let hud_data = hud_vertices(hud_quads);
        let hud_bytes: &[u8] = bytemuck::cast_slice(&hud_data);
        if !hud_bytes.is_empty() {
            reserve_buffer(&mut self.hud_vertices, hud_bytes.len() as u64, &self.device);
            self.queue.write_buffer(&self.hud_vertices, 0, hud_bytes);
        }

        let mut encoder = self.device.create_command_encoder(&CommandEncoderDescriptor::default());
        {
            let mut pass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: None,
                color_attachments: &[
                    Some(RenderPassColorAttachment {
                        view,
                        resolve_target: None,
                        ops: Operations {
                            load: LoadOp::Clear(self.clear_color.into()),
                            store: StoreOp::Store,
                        },
                    })
                ],
                depth_stencil_attachment: Some(RenderPassDepthStencilAttachment {
                    view: state.depth_view(),
                    depth_ops: Some(Operations {
                        load: LoadOp::Clear(1.0),
                        store: StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            // Encodes 3D scene
            if !batches.is_empty() {
                pass.set_pipeline(&self.scene_pipeline);
                pass.set_bind_group(CAMERA_GROUP, &self.camera_bind_group, &[]);
                pass.set_vertex_buffer(INSTANCE_SLOT, self.instances.slice(..));
                for batch in &batches {
                    let Some(mesh) = self.models.get(batch.model) else { continue };
                    pass.set_vertex_buffer(VERTEX_SLOT, mesh.vertices.slice(..));
                    pass.set_index_buffer(mesh.indices.slice(..), mesh.index_format);
                    pass.draw_indexed(0..mesh.num_indices, 0, batch.instances.clone());
                }
            }

            // Encodes HUD
            if !hud_data.is_empty() {
                pass.set_pipeline(&self.hud_pipeline);
                pass.set_vertex_buffer(0, self.hud_vertices.slice(..));
                pass.draw(0..hud_data.len() as u32, 0..1);
            }
        }
        self.queue.submit([encoder.finish()]);
    }
}

/// Two triangles per quad.
fn hud_vertices(quads: &[HudQuad]) -> Vec<HudVertex> {
    let mut vertices = Vec::with_capacity(quads.len() * 6);
    for quad in quads {
        let color = quad.color.to_array();
        let corners = [
            [quad.min.x, quad.min.y],
            [quad.max.x, quad.min.y],
            [quad.max.x, quad.max.y],
            [quad.min.x, quad.max.y],
        ];
        for i in [0, 1, 2, 2, 3, 0] {
            vertices.push(HudVertex { position: corners[i], color });
        }
    }
    vertices
}

fn create_vertex_buffer(device: &Device, label: &str) -> Buffer {
    device.create_buffer(&BufferDescriptor {
        label: Some(label),
        size: 0,
        usage: BufferUsages::VERTEX | BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_scene_pipeline(
    device: &Device,
    camera_layout: &BindGroupLayout,
    texture_format: TextureFormat,
    depth_format: TextureFormat,
) -> RenderPipeline {
    let module = device.create_shader_module(ShaderModuleDescriptor {
        label: Some("scene_module"),
        source: ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
    });
    let layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
        label: Some("scene_layout"),
        bind_group_layouts: &[camera_layout],
        push_constant_ranges: &[],
    });
    device.create_render_pipeline(&RenderPipelineDescriptor {
        label: Some("scene_pipeline"),
        layout: Some(&layout),
        vertex: VertexState {
            module: &module,
            entry_point: "vertex_main",
            buffers: &[INSTANCE_LAYOUT, Vertex::LAYOUT],
        },
        fragment: Some(FragmentState {
            module: &module,
            entry_point: "fragment_main",
            targets: &[Some(ColorTargetState {
                format: texture_format,
                blend: Some(BlendState::REPLACE),
                write_mask: ColorWrites::ALL,
            })],
        }),
        primitive: PrimitiveState {
            topology: PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: FrontFace::Ccw,
            cull_mode: Some(Face::Back),
            unclipped_depth: false,
            polygon_mode: PolygonMode::Fill,
            conservative: false,
        },
        depth_stencil: Some(DepthStencilState {
            format: depth_format,
            depth_write_enabled: true,
            depth_compare: CompareFunction::LessEqual,
            stencil: StencilState::default(),
            bias: DepthBiasState::default(),
        }),
        multisample: MultisampleState::default(),
        multiview: None,
    })
}

fn create_hud_pipeline(
    device: &Device,
    texture_format: TextureFormat,
    depth_format: TextureFormat,
) -> RenderPipeline {
    let module = device.create_shader_module(ShaderModuleDescriptor {
        label: Some("hud_module"),
        source: ShaderSource::Wgsl(include_str!("hud.wgsl").into()),
    });
    device.create_render_pipeline(&RenderPipelineDescriptor {
        label: Some("hud_pipeline"),
        layout: None,
        vertex: VertexState {
            module: &module,
            entry_point: "vertex_main",
            buffers: &[HUD_VERTEX_LAYOUT],
        },
        fragment: Some(FragmentState {
            module: &module,
            entry_point: "fragment_main",
            targets: &[Some(ColorTargetState {
                format: texture_format,
                blend: Some(BlendState::ALPHA_BLENDING),
                write_mask: ColorWrites::ALL,
            })],
        }),
        primitive: PrimitiveState::default(),
        depth_stencil: Some(DepthStencilState {
            format: depth_format,
            depth_write_enabled: false,
            depth_compare: CompareFunction::Always,
            stencil: StencilState::default(),
            bias: DepthBiasState::default(),
        }),
        multisample: MultisampleState::default(),
        multiview: None,
    })
}


#[cfg(test)]
mod test {
    use std::mem::size_of;
    use glam::{Vec2, Vec3};
    use crate::math::Transform;
    use crate::{flatten_scene, Color, HudQuad, Model, Renderable, Scene};
    use super::{hud_vertices, Instance};

    #[test]
    fn flatten_propagates_transforms() {
        let mut scene = Scene::new();
        let mut group = Renderable::empty();
        group.transform = Transform::IDENTITY.with_xyz(0.0, 10.0, 0.0);
        let group = scene.insert(group);
        let mut bullet = Renderable::model(Model::Ball, Color::YELLOW);
        bullet.transform = Transform::IDENTITY.with_xyz(1.0, 0.0, 1.5).with_uniform_scale(0.2);
        let _bullet = scene.insert_child(bullet, group.id()).unwrap();

        let flat = flatten_scene(&scene);
        assert_eq!(1, flat.len());
        assert_eq!(Model::Ball, flat[0].model);
        assert_eq!(Color::YELLOW, flat[0].color);
        let position = flat[0].global_transform.transform_point3(Vec3::ZERO);
        assert!(position.abs_diff_eq(Vec3::new(1.0, 10.0, 1.5), 1e-5));
        let edge = flat[0].global_transform.transform_point3(Vec3::Z);
        assert!((edge.z - 1.7).abs() < 1e-5);
    }

    #[test]
    fn hud_quads_become_triangles() {
        let quad = HudQuad { min: Vec2::ZERO, max: Vec2::ONE, color: Color::WHITE };
        let vertices = hud_vertices(&[quad, quad]);
        assert_eq!(12, vertices.len());
        assert_eq!([1.0, 1.0], vertices[2].position);
        assert_eq!(80, size_of::<Instance>());
    }
}
