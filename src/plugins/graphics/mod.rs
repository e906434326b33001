//! Module that defines graphics primitives, and a small 3D renderer that makes use of them.
//! Gameplay code never touches the GPU. Entities with a [`Visual`] or [`SceneGroup`] are mirrored
//! into a [`Scene`] each frame, which the [`Renderer`] then draws.

mod state;
mod color;
mod scene;
mod buffer;
mod mesh;
mod shape;
mod model;
mod renderer;

pub use state::*;
pub use color::*;
pub use scene::*;
pub use buffer::*;
pub use mesh::*;
pub use shape::*;
pub use model::*;
pub use renderer::*;

use glam::Mat4;
use hecs::{Entity, World};
use tracing::instrument;
use wgpu::{SurfaceError, TextureFormat};
use winit::window::Window as WinitWindow;
use crate::math::Transform;
use crate::{global_transform, AppBuilder, Camera, Game, Hud, Parent, Plugin, RunContext, SceneGroup, Stage, Tracker};

/// Adds a [`Scene`] that mirrors the world, and renders it once a window provides a [`GraphicsState`].
pub struct GraphicsPlugin;
impl Plugin for GraphicsPlugin {
    fn install(&mut self, builder: &mut AppBuilder) {
        builder.game().init(|_| Scene::<Renderable>::new());
        builder
            .system(Stage::Render, sync_scene)
            .system(Stage::Render, render_scene);
    }
}

/// Creates the [`GraphicsState`] and [`Renderer`] for a window.
pub fn init_graphics(game: &mut Game, window: &WinitWindow) -> anyhow::Result<()> {
    let state = GraphicsState::new(window, TextureFormat::Depth24Plus)?;
    let renderer = Renderer::new(&state);
    game.add(state).add(renderer);
    Ok(())
}

/// What an entity looks like.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Visual {
    pub model: Model,
    pub color: Color,
}

impl Visual {
    pub fn new(model: Model, color: Color) -> Self {
        Self { model, color }
    }
}

fn sync_scene(game: &mut Game, _ctx: RunContext) {
    let (mut world, mut scene) = game.all::<(&mut World, &mut Scene<Renderable>)>();
    scene.prune_nodes();
    attach_renderables(&mut world, &mut scene);
    for (_, (transform, tracker, visual)) in world.query_mut::<(&Transform, &Tracker<Renderable>, Option<&Visual>)>() {
        let Some(renderable) = scene.get_mut(tracker.id()) else { continue };
        renderable.transform = *transform;
        if let Some(visual) = visual {
            renderable.model = Some(visual.model);
            renderable.color = visual.color;
        }
    }
}

/**
 * Gives each drawable entity without a scene node a [`Tracker`] to a new node.
 * Children are attached under their parent's node, so parents are attached first.
 * An entity whose parent can never be drawn is attached as a root.
 */
#[instrument(skip_all)]
fn attach_renderables(world: &mut World, scene: &mut Scene<Renderable>) {
    loop {
        let mut ready = Vec::new();
        for (entity, (visual, group, parent)) in world
            .query::<(Option<&Visual>, Option<&SceneGroup>, Option<&Parent>)>()
            .with::<&Transform>()
            .without::<&Tracker<Renderable>>()
            .iter()
        {
            if visual.is_none() && group.is_none() { continue }
            let renderable = match visual {
                Some(visual) => Renderable::model(visual.model, visual.color),
                None => Renderable::empty(),
            };
            let parent_node = match parent {
                Some(parent) => match parent_node(world, parent.0) {
                    ParentNode::Attached(node_id) => Some(node_id),
                    ParentNode::Pending => continue,
                    ParentNode::Undrawable => None,
                },
                None => None,
            };
            ready.push((entity, renderable, parent_node));
        }
        if ready.is_empty() {
            break;
        }

        let mut attached = 0;
        for (entity, renderable, parent_node) in ready {
            let tracker = match parent_node {
                Some(parent_node) => match scene.insert_child(renderable, parent_node) {
                    Ok(tracker) => tracker,
                    Err(err) => {
                        log::warn!("Could not attach {entity:?} to its parent: {err}");
                        continue;
                    },
                },
                None => scene.insert(renderable),
            };
            if world.insert_one(entity, tracker).is_ok() {
                attached += 1;
            }
        }
        if attached == 0 {
            break;
        }
    }
}

enum ParentNode {
    Attached(NodeId),
    Pending,
    Undrawable,
}

fn parent_node(world: &World, parent: Entity) -> ParentNode {
    if let Ok(tracker) = world.get::<&Tracker<Renderable>>(parent) {
        return ParentNode::Attached(tracker.id());
    }
    let Ok(parent) = world.entity(parent) else { return ParentNode::Undrawable };
    let drawable = parent.has::<Transform>() && (parent.has::<Visual>() || parent.has::<SceneGroup>());
    match drawable {
        true => ParentNode::Pending,
        false => ParentNode::Undrawable,
    }
}

fn render_scene(game: &mut Game, _ctx: RunContext) {
    let Some(mut state) = game.try_get::<&mut GraphicsState>() else { return };
    let Some(mut renderer) = game.try_get::<&mut Renderer>() else { return };
    let (scene, world) = game.all::<(&Scene<Renderable>, &World)>();
    let surface_tex = state.surface().get_current_texture();
    let surface_tex = match surface_tex {
        Ok(surface_tex) => surface_tex,
        Err(SurfaceError::Lost | SurfaceError::Outdated) => {
            log::debug!("Surface lost, reconfiguring");
            state.reconfigure();
            return;
        },
        Err(err) => {
            log::error!("{err}");
            return;
        }
    };
    let aspect = state.surface_aspect_ratio();
    let view_proj = camera_view_proj(&world, aspect);
    let flat_scene = flatten_scene(&scene);
    let hud_quads = match game.try_get::<&Hud>() {
        Some(hud) => hud.quads(aspect),
        None => Vec::new(),
    };
    let view = surface_tex.texture.create_view(&Default::default());
    renderer.render(&state, &view, view_proj, &flat_scene, &hud_quads);
    surface_tex.present();
}

/// Projection * view of the first camera in the world.
/// Identity if there is none.
fn camera_view_proj(world: &World, aspect: f32) -> Mat4 {
    let mut query = world.query::<&Camera>();
    let Some((entity, camera)) = query.iter().next() else {
        return Mat4::IDENTITY;
    };
    let Some(world_from_view) = global_transform(world, entity) else {
        return Mat4::IDENTITY;
    };
    camera.projection(aspect) * world_from_view.inverse()
}


#[cfg(test)]
mod test {
    use hecs::World;
    use crate::math::Transform;
    use crate::{spawn_group, Color, Model, Parent, Renderable, Scene, SceneGroup, Tracker, Visual};
    use super::attach_renderables;

    #[test]
    fn children_attach_under_parents() {
        let mut world = World::new();
        let mut scene = Scene::<Renderable>::new();

        // Child spawned before its group.
        let group = world.reserve_entity();
        let bullet = world.spawn((
            Transform::IDENTITY,
            Visual::new(Model::Ball, Color::YELLOW),
            Parent(group),
        ));
        world.insert(group, (Transform::IDENTITY, SceneGroup::new("bullets"))).unwrap();
        attach_renderables(&mut world, &mut scene);

        assert_eq!(2, scene.len());
        let group_node = world.get::<&Tracker<Renderable>>(group).unwrap().id();
        let bullet_node = world.get::<&Tracker<Renderable>>(bullet).unwrap().id();
        let node = scene.graph.get_node(bullet_node).unwrap();
        assert_eq!(Some(group_node), node.parent_id());
        assert_eq!(Some(Model::Ball), node.value().model);
    }

    #[test]
    fn despawn_prunes_node() {
        let mut world = World::new();
        let mut scene = Scene::<Renderable>::new();
        let group = spawn_group(&mut world, "targets", None);
        let target = world.spawn((
            Transform::IDENTITY,
            Visual::new(Model::Box, Color::RED),
            Parent(group),
        ));
        attach_renderables(&mut world, &mut scene);
        assert_eq!(2, scene.len());

        world.despawn(target).unwrap();
        scene.prune_nodes();
        assert_eq!(1, scene.len());
    }

    #[test]
    fn undrawable_parent_attaches_as_root() {
        let mut world = World::new();
        let mut scene = Scene::<Renderable>::new();
        let parent = world.spawn((Transform::IDENTITY,));
        world.spawn((Transform::IDENTITY, Visual::new(Model::Panda, Color::WHITE), Parent(parent)));
        world.spawn((Visual::new(Model::Panda, Color::WHITE),));
        attach_renderables(&mut world, &mut scene);
        assert_eq!(1, scene.len());
        assert_eq!(1, scene.graph.root_ids().len());
    }
}
