use hecs::World;
use crate::{CollisionEvent, Game, Hud, LabelId, RunContext};
use super::{destroy_bullet, respawn_target, GameRng, ShooterConfig};

/// Name of collision events where a bullet struck a target.
pub const HIT_EVENT: &str = "bullet-into-target";

/// Points earned so far, and the label showing them.
#[derive(Default, Debug)]
pub struct Score {
    pub points: u32,
    pub label: Option<LabelId>,
}

impl Score {
    pub fn text(points: u32) -> String {
        format!("SCORE: {points}")
    }
}

/**
 * Handles a bullet hitting a target.
 * Every contact scores and moves its target, even when one bullet touches two targets in the same tick.
 */
pub(crate) fn on_collision(game: &mut Game, event: &CollisionEvent, _ctx: &mut RunContext) {
    if event.name != HIT_EVENT { return }
    let (mut world, config, mut rng, mut score) = game.all::<(&mut World, &ShooterConfig, &mut GameRng, &mut Score)>();
    if !destroy_bullet(&mut world, event.from) {
        log::debug!("Bullet {:?} was already destroyed", event.from);
    }
    if !respawn_target(&mut world, &config.targets, &mut rng.0, event.into) {
        log::warn!("{:?} was hit, but is not a target", event.into);
    }
    score.points += 1;
    log::info!("Hit! Score: {}", score.points);
    if let Some(label) = score.label {
        game.get::<&mut Hud>().set_text(label, Score::text(score.points));
    }
}
