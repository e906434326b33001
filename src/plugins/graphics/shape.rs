use std::f32::consts::{PI, TAU};
use glam::{Vec2, Vec3};
use crate::{Color, MeshData};

/**
 * A simple cuboid shape.
 */
#[derive(Copy, Clone, PartialEq, Default, Debug)]
pub struct Cuboid {
    pub center: Vec3,
    pub half_extents: Vec3,
    pub color: Color,
}

impl Cuboid {
    pub fn new(center: Vec3, half_extents: Vec3, color: Color) -> Self {
        Self { center, half_extents, color }
    }
}

impl From<Cuboid> for MeshData {
    fn from(cuboid: Cuboid) -> Self {
        let mut mesh = MeshData::new();
        let center = cuboid.center;
        let half = cuboid.half_extents;
        let color = cuboid.color;

        // 8 points on a cube
        let lbf = center + Vec3::new(-half.x,   -half.y,    -half.z);
        let rbf = center + Vec3::new( half.x,   -half.y,    -half.z);
        let ltf = center + Vec3::new(-half.x,    half.y,    -half.z);
        let rtf = center + Vec3::new( half.x,    half.y,    -half.z);
        let lbn = center + Vec3::new(-half.x,   -half.y,     half.z);
        let rbn = center + Vec3::new( half.x,   -half.y,     half.z);
        let ltn = center + Vec3::new(-half.x,    half.y,     half.z);
        let rtn = center + Vec3::new( half.x,    half.y,     half.z);

        push_quad(&mut mesh, [lbf, lbn, ltn, ltf], Vec3::NEG_X, color);
        push_quad(&mut mesh, [rbn, rbf, rtf, rtn], Vec3::X, color);
        push_quad(&mut mesh, [lbf, rbf, rbn, lbn], Vec3::NEG_Y, color);
        push_quad(&mut mesh, [ltn, rtn, rtf, ltf], Vec3::Y, color);
        push_quad(&mut mesh, [lbn, rbn, rtn, ltn], Vec3::Z, color);
        push_quad(&mut mesh, [rbf, lbf, ltf, rtf], Vec3::NEG_Z, color);
        mesh
    }
}

/**
 * Sphere made of rings of latitude and longitude, with poles on the Z axis.
 */
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct UvSphere {
    pub radius: f32,
    pub sectors: u32,
    pub stacks: u32,
    pub color: Color,
}

impl Default for UvSphere {
    fn default() -> Self {
        Self {
            radius: 1.0,
            sectors: 24,
            stacks: 16,
            color: Color::WHITE,
        }
    }
}

impl From<UvSphere> for MeshData {
    fn from(sphere: UvSphere) -> Self {
        let mut mesh = MeshData::new();
        let sectors = sphere.sectors.max(3);
        let stacks = sphere.stacks.max(2);
        for stack in 0..=stacks {
            let phi = PI * stack as f32 / stacks as f32;
            for sector in 0..=sectors {
                let theta = TAU * sector as f32 / sectors as f32;
                let normal = Vec3::new(phi.sin() * theta.cos(), phi.sin() * theta.sin(), phi.cos());
                mesh.positions.push(normal * sphere.radius);
                mesh.normals.push(normal);
                mesh.colors.push(sphere.color);
            }
        }
        for stack in 0..stacks {
            for sector in 0..sectors {
                let k1 = stack * (sectors + 1) + sector;
                let k2 = k1 + sectors + 1;
                mesh.indices.extend([k1, k2, k1 + 1, k1 + 1, k2, k2 + 1]);
            }
        }
        mesh
    }
}

/**
 * Flat square on the XY plane facing +Z, split into tiles of alternating colors.
 */
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Checkerboard {
    pub center: Vec2,
    pub half_extent: f32,
    pub tile_size: f32,
    pub colors: [Color; 2],
}

impl From<Checkerboard> for MeshData {
    fn from(board: Checkerboard) -> Self {
        let mut mesh = MeshData::new();
        let tiles = ((2.0 * board.half_extent) / board.tile_size).ceil().max(1.0) as u32;
        let tile = 2.0 * board.half_extent / tiles as f32;
        let origin = board.center - Vec2::splat(board.half_extent);
        for row in 0..tiles {
            for col in 0..tiles {
                let min = origin + Vec2::new(col as f32, row as f32) * tile;
                let max = min + Vec2::splat(tile);
                let color = board.colors[((row + col) % 2) as usize];
                push_quad(&mut mesh, [
                    min.extend(0.0),
                    Vec3::new(max.x, min.y, 0.0),
                    max.extend(0.0),
                    Vec3::new(min.x, max.y, 0.0),
                ], Vec3::Z, color);
            }
        }
        mesh
    }
}

/// Appends a quad whose corners wind counter-clockwise when viewed from the side `normal` points to.
fn push_quad(mesh: &mut MeshData, corners: [Vec3; 4], normal: Vec3, color: Color) {
    let base = mesh.positions.len() as u32;
    mesh.positions.extend(corners);
    mesh.normals.extend([normal; 4]);
    mesh.colors.extend([color; 4]);
    mesh.indices.extend([base, base + 1, base + 2, base + 2, base + 3, base]);
}
