use std::fmt;
use std::str::FromStr;
use derive_more::*;
use glam::{Vec2, Vec3};
use serde::Deserialize;
use crate::{Checkerboard, Color, Cuboid, MeshData, UvSphere};

/**
 * A built-in model, referenced by name like "models/ball".
 * Meshes are generated rather than loaded from disk.
 */
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Deserialize)]
#[serde(try_from = "String")]
pub enum Model {
    /// Sphere of radius 1.
    Ball,
    /// Cube with a half extent of 1.
    Box,
    /// Black and white character standing on the origin, facing +Y.
    Panda,
    /// Large ground plane.
    Environment,
}

impl Model {

    pub const ALL: [Model; 4] = [Model::Ball, Model::Box, Model::Panda, Model::Environment];

    pub fn name(self) -> &'static str {
        match self {
            Model::Ball => "models/ball",
            Model::Box => "models/box",
            Model::Panda => "models/panda",
            Model::Environment => "models/environment",
        }
    }

    /// Generates the model's mesh.
    pub fn mesh_data(self) -> MeshData {
        match self {
            Model::Ball => UvSphere::default().into(),
            Model::Box => Cuboid::new(Vec3::ZERO, Vec3::ONE, Color::WHITE).into(),
            Model::Panda => panda(),
            Model::Environment => Checkerboard {
                center: Vec2::new(80.0, -420.0),
                half_extent: 1500.0,
                tile_size: 100.0,
                colors: [Color::GRASS, Color::DARK_GRASS],
            }.into(),
        }
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Model {
    type Err = ModelError;
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Model::ALL
            .into_iter()
            .find(|model| model.name() == name)
            .ok_or_else(|| ModelError::UnknownModel { name: name.to_owned() })
    }
}

impl TryFrom<String> for Model {
    type Error = ModelError;
    fn try_from(name: String) -> Result<Self, Self::Error> {
        name.parse()
    }
}

#[derive(Error, Display, Debug)]
pub enum ModelError {
    #[display(fmt="Unknown model '{name}'")]
    UnknownModel { name: String },
}

fn panda() -> MeshData {
    const WHITE: Color = Color::WHITE;
    const BLACK: Color = Color::new(0.08, 0.08, 0.08, 1.0);
    let parts = [
        // Legs
        Cuboid::new(Vec3::new(-0.2, 0.0, 0.25), Vec3::new(0.14, 0.16, 0.25), BLACK),
        Cuboid::new(Vec3::new(0.2, 0.0, 0.25), Vec3::new(0.14, 0.16, 0.25), BLACK),
        // Body, shoulders and arms
        Cuboid::new(Vec3::new(0.0, 0.0, 0.8), Vec3::new(0.38, 0.26, 0.3), WHITE),
        Cuboid::new(Vec3::new(0.0, 0.0, 1.02), Vec3::new(0.4, 0.28, 0.08), BLACK),
        Cuboid::new(Vec3::new(-0.5, 0.0, 0.82), Vec3::new(0.12, 0.12, 0.28), BLACK),
        Cuboid::new(Vec3::new(0.5, 0.0, 0.82), Vec3::new(0.12, 0.12, 0.28), BLACK),
        // Head
        Cuboid::new(Vec3::new(0.0, 0.0, 1.325), Vec3::new(0.3, 0.27, 0.225), WHITE),
        Cuboid::new(Vec3::new(-0.22, 0.0, 1.6), Vec3::new(0.08, 0.05, 0.08), BLACK),
        Cuboid::new(Vec3::new(0.22, 0.0, 1.6), Vec3::new(0.08, 0.05, 0.08), BLACK),
        // Face
        Cuboid::new(Vec3::new(-0.12, 0.28, 1.37), Vec3::new(0.07, 0.02, 0.06), BLACK),
        Cuboid::new(Vec3::new(0.12, 0.28, 1.37), Vec3::new(0.07, 0.02, 0.06), BLACK),
        Cuboid::new(Vec3::new(0.0, 0.28, 1.24), Vec3::new(0.04, 0.02, 0.03), BLACK),
    ];
    let mut mesh = MeshData::new();
    for part in parts {
        mesh.append(part.into());
    }
    mesh
}
