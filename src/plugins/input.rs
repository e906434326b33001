use std::hash::Hash;
use winit::keyboard::KeyCode;
use crate::{AppBuilder, Game, HashSet, Plugin, RunContext, Stage};

/// Adds the [`Keyboard`] domain, and keeps its "just pressed" state in step with game ticks.
pub struct InputPlugin;
impl Plugin for InputPlugin {
    fn install(&mut self, builder: &mut AppBuilder) {
        builder.game().init(|_| Keyboard::default());
        builder.system(Stage::Cleanup, sync_inputs);
    }
}

/// Keys held down on the keyboard, fed by the window.
#[derive(Default)]
pub struct Keyboard {
    keys: ButtonState<KeyCode>,
}

impl Keyboard {

    /**
     * True if a key is pressed.
    */
    pub fn is_pressed(&self, key: KeyCode) -> bool {
        self.keys.is_pressed(key)
    }

    /**
     * True if a key went down since the previous tick, even if it has already been released.
    */
    pub fn is_just_pressed(&self, key: KeyCode) -> bool {
        self.keys.is_just_pressed(key)
    }

    /**
     * True if a key is not pressed, but was in the previous tick.
    */
    pub fn is_just_released(&self, key: KeyCode) -> bool {
        self.keys.is_just_released(key)
    }

    /**
     * Simulates a key press.
    */
    pub fn press(&mut self, key: KeyCode) {
        self.keys.press(key);
    }

    /**
     * Simulates a key release.
    */
    pub fn release(&mut self, key: KeyCode) {
        self.keys.release(key);
    }

    /**
     * Sync previous key state with current key state.
    */
    pub fn sync_previous_state(&mut self) {
        self.keys.sync_previous_state()
    }
}

/**
 * The state of a collection of buttons coming from some device.
 * For example, the buttons on a controller, or the keys on a keyboard.
 */
pub struct ButtonState<B> {
    previous_state: HashSet<B>,
    current_state: HashSet<B>,
    pressed_since_sync: HashSet<B>,
}

impl<B> Default for ButtonState<B> {
    fn default() -> Self {
        Self {
            previous_state: HashSet::default(),
            current_state: HashSet::default(),
            pressed_since_sync: HashSet::default(),
        }
    }
}

impl<B> ButtonState<B>
where
    B: Copy + Clone + Eq + Hash
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Repeated presses of a held button are ignored.
    pub fn press(&mut self, button: B) {
        if self.current_state.insert(button) {
            self.pressed_since_sync.insert(button);
        }
    }

    pub fn release(&mut self, button: B) {
        self.current_state.remove(&button);
    }

    pub fn is_pressed(&self, button: B) -> bool {
        self.current_state.contains(&button)
    }

    pub fn is_just_pressed(&self, button: B) -> bool {
        self.pressed_since_sync.contains(&button)
    }

    pub fn is_just_released(&self, button: B) -> bool {
        !self.current_state.contains(&button) && self.previous_state.contains(&button)
    }

    pub fn sync_previous_state(&mut self) {
        self.previous_state.clone_from(&self.current_state);
        self.pressed_since_sync.clear();
    }
}


fn sync_inputs(game: &mut Game, _ctx: RunContext) {
    let mut keyboard = game.get::<&mut Keyboard>();
    keyboard.sync_previous_state();
}


#[cfg(test)]
mod test {
    use winit::keyboard::KeyCode;
    use crate::{App, InputPlugin, Keyboard};

    #[test]
    fn just_pressed_lasts_one_tick() {
        let mut builder = App::builder();
        builder.plugin(InputPlugin);
        let mut app = builder.build();

        app.game.get::<&mut Keyboard>().press(KeyCode::Space);
        assert!(app.game.get::<&Keyboard>().is_just_pressed(KeyCode::Space));
        app.run_tick();
        let keyboard = app.game.get::<&Keyboard>();
        assert!(keyboard.is_pressed(KeyCode::Space));
        assert!(!keyboard.is_just_pressed(KeyCode::Space));
    }

    #[test]
    fn tap_between_ticks_is_seen() {
        let mut keyboard = Keyboard::default();
        keyboard.press(KeyCode::Space);
        keyboard.release(KeyCode::Space);
        assert!(!keyboard.is_pressed(KeyCode::Space));
        assert!(keyboard.is_just_pressed(KeyCode::Space));
        keyboard.sync_previous_state();
        assert!(!keyboard.is_just_pressed(KeyCode::Space));
    }

    #[test]
    fn held_key_repeats_are_ignored() {
        let mut keyboard = Keyboard::default();
        keyboard.press(KeyCode::Space);
        keyboard.sync_previous_state();
        keyboard.press(KeyCode::Space);
        assert!(!keyboard.is_just_pressed(KeyCode::Space));

        // Released and pressed again within one tick.
        keyboard.release(KeyCode::Space);
        keyboard.press(KeyCode::Space);
        assert!(keyboard.is_just_pressed(KeyCode::Space));
    }

    #[test]
    fn release() {
        let mut keyboard = Keyboard::default();
        keyboard.press(KeyCode::KeyW);
        keyboard.sync_previous_state();
        keyboard.release(KeyCode::KeyW);
        assert!(!keyboard.is_pressed(KeyCode::KeyW));
        assert!(keyboard.is_just_released(KeyCode::KeyW));
        keyboard.sync_previous_state();
        assert!(!keyboard.is_just_released(KeyCode::KeyW));
    }
}
