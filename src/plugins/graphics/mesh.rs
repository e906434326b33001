use std::mem::size_of;
use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use wgpu::util::{BufferInitDescriptor, DeviceExt};
use wgpu::{Buffer, BufferUsages, Device, IndexFormat, VertexAttribute, VertexBufferLayout, VertexFormat, VertexStepMode};
use crate::Color;

/**
 * A 3D mesh on the CPU.
 * Every vertex has a position, a normal and a color.
*/
#[derive(Clone, Default, Debug)]
pub struct MeshData {
    pub indices:    Vec<u32>,
    pub positions:  Vec<Vec3>,
    pub normals:    Vec<Vec3>,
    pub colors:     Vec<Color>,
}

impl MeshData {

    pub fn new() -> Self {
        Self::default()
    }

    /// Number of vertices stored.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Appends the contents of another mesh, offsetting its indices.
    pub fn append(&mut self, other: MeshData) {
        let offset = self.positions.len() as u32;
        self.positions.extend(other.positions);
        self.normals.extend(other.normals);
        self.colors.extend(other.colors);
        self.indices.extend(other.indices.into_iter().map(|index| index + offset));
    }

    /// Smallest and largest corners of the box containing every vertex.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let first = *self.positions.first()?;
        let bounds = self.positions.iter().fold((first, first), |(min, max), pos| {
            (min.min(*pos), max.max(*pos))
        });
        Some(bounds)
    }

    /**
     * Interleaves vertex data.
     * Panics if the vertex buffers differ in length.
     */
    pub fn vertices(&self) -> Vec<Vertex> {
        let count = self.positions.len();
        if self.normals.len() != count || self.colors.len() != count {
            panic!("Vertex buffers had different lengths");
        }
        self.positions.iter()
            .zip(&self.normals)
            .zip(&self.colors)
            .map(|((position, normal), color)| Vertex {
                position: position.to_array(),
                normal: normal.to_array(),
                color: color.to_array(),
            })
            .collect()
    }
}

/// Interleaved vertex as stored on the GPU.
#[repr(C)]
#[derive(Copy, Clone, PartialEq, Debug, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 4],
}

impl Vertex {
    const POSITION_LOCATION: u32    = 5;
    const NORMAL_LOCATION: u32      = 6;
    const COLOR_LOCATION: u32       = 7;

    pub const LAYOUT: VertexBufferLayout<'static> = VertexBufferLayout {
        array_stride: size_of::<Vertex>() as u64,
        step_mode: VertexStepMode::Vertex,
        attributes: &[
            VertexAttribute {
                format: VertexFormat::Float32x3,
                offset: 0,
                shader_location: Self::POSITION_LOCATION,
            },
            VertexAttribute {
                format: VertexFormat::Float32x3,
                offset: 3*4,
                shader_location: Self::NORMAL_LOCATION,
            },
            VertexAttribute {
                format: VertexFormat::Float32x4,
                offset: 6*4,
                shader_location: Self::COLOR_LOCATION,
            },
        ],
    };
}

/// GPU representation of [`MeshData`].
pub struct Mesh {
    pub(crate) vertices: Buffer,
    pub(crate) indices: Buffer,
    pub(crate) index_format: IndexFormat,
    pub(crate) num_indices: u32,
}

impl Mesh {
    pub fn from_data(mesh: &MeshData, device: &Device) -> Self {
        let vertices = mesh.vertices();
        Self {
            vertices: device.create_buffer_init(&BufferInitDescriptor {
                label: Some("vertex_buffer"),
                contents: bytemuck::cast_slice(&vertices),
                usage: BufferUsages::COPY_DST | BufferUsages::VERTEX,
            }),
            indices: device.create_buffer_init(&BufferInitDescriptor {
                label: Some("index_buffer"),
                contents: bytemuck::cast_slice(&mesh.indices),
                usage: BufferUsages::COPY_DST | BufferUsages::INDEX,
            }),
            index_format: IndexFormat::Uint32,
            num_indices: mesh.indices.len() as u32,
        }
    }
}
