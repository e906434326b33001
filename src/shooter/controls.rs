use glam::Vec3;
use hecs::{Entity, World};
use winit::keyboard::KeyCode;
use crate::{Game, HashMap, Keyboard, RunContext};

/// Something the player can do.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Action {
    Forward,
    Backward,
    Left,
    Right,
    Shoot,
    Quit,
}

/// Maps keys to [`Action`]s. Several keys may map to the same action.
#[derive(Clone, Debug)]
pub struct KeyBindings {
    bindings: HashMap<KeyCode, Action>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        let mut bindings = Self { bindings: HashMap::default() };
        bindings
            .bind(KeyCode::KeyW, Action::Forward)
            .bind(KeyCode::KeyS, Action::Backward)
            .bind(KeyCode::KeyA, Action::Left)
            .bind(KeyCode::KeyD, Action::Right)
            .bind(KeyCode::Space, Action::Shoot)
            .bind(KeyCode::Escape, Action::Quit);
        bindings
    }
}

impl KeyBindings {

    pub fn bind(&mut self, key: KeyCode, action: Action) -> &mut Self {
        self.bindings.insert(key, action);
        self
    }

    pub fn action(&self, key: KeyCode) -> Option<Action> {
        self.bindings.get(&key).copied()
    }

    /// True if any key bound to the action is held.
    pub fn is_active(&self, keyboard: &Keyboard, action: Action) -> bool {
        self.bindings
            .iter()
            .any(|(key, bound)| *bound == action && keyboard.is_pressed(*key))
    }

    /// True if any key bound to the action went down this tick.
    pub fn is_just_activated(&self, keyboard: &Keyboard, action: Action) -> bool {
        self.bindings
            .iter()
            .any(|(key, bound)| *bound == action && keyboard.is_just_pressed(*key))
    }
}

/// Directions a player is being asked to walk in this tick.
#[derive(Copy, Clone, Eq, PartialEq, Default, Debug)]
pub struct MoveInput {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
}

impl MoveInput {

    fn from_keyboard(keyboard: &Keyboard, bindings: &KeyBindings) -> Self {
        Self {
            forward: bindings.is_active(keyboard, Action::Forward),
            backward: bindings.is_active(keyboard, Action::Backward),
            left: bindings.is_active(keyboard, Action::Left),
            right: bindings.is_active(keyboard, Action::Right),
        }
    }

    /// Unnormalized walking direction. Opposite directions cancel.
    pub fn direction(&self) -> Vec3 {
        let axis = |positive: bool, negative: bool| positive as i32 as f32 - negative as i32 as f32;
        Vec3::new(
            axis(self.right, self.left),
            axis(self.forward, self.backward),
            0.0,
        )
    }
}

/// Fired when an entity wants to shoot.
#[derive(Copy, Clone, Debug)]
pub struct ShootEvent {
    pub shooter: Entity,
}

/// Turns key state into [`MoveInput`]s, shots, and quit requests.
pub(crate) fn read_controls(game: &mut Game, mut ctx: RunContext) {
    let (keyboard, bindings, mut world) = game.all::<(&Keyboard, &KeyBindings, &mut World)>();
    let input = MoveInput::from_keyboard(&keyboard, &bindings);
    let shoot = bindings.is_just_activated(&keyboard, Action::Shoot);
    for (entity, move_input) in world.query_mut::<&mut MoveInput>() {
        *move_input = input;
        if shoot {
            ctx.fire(ShootEvent { shooter: entity });
        }
    }
    if bindings.is_just_activated(&keyboard, Action::Quit) {
        log::info!("Quit pressed");
        ctx.quit();
    }
}
