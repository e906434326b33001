use std::collections::VecDeque;
use std::time::Duration;
use anyhow::bail;
use crate::{DynEvent, Event, EventBus, EventHandler, Game, HashMap, StartEvent};

/// Upper bound on ticks run in a single frame.
/// Time accumulated beyond this is dropped.
const MAX_TICKS_PER_FRAME: u32 = 8;

/**
 * Adds logic to a [`Game`] by executing [`System`]s across it.
 * This happens when invoking run_tick() and run_frame().
 */
pub struct App {
    pub game: Game,                                     // Game to update state via systems.
    tick: u64,                                          // Current tick.
    tick_accum: Duration,                               // Time accumulated for current tick.
    tick_duration: Duration,                            // Length of time for a single game tick.
    systems: HashMap<Stage, Vec<System>>,               // Systems that manipulate the state of the Game.
    event_bus: EventBus,                                // Event handlers, keyed by event type.
    events: VecDeque<DynEvent>,                         // Events fired, but not yet handled.
    commands: VecDeque<Box<dyn Command>>,
    quit_requested: bool,
}

impl App {

    pub fn builder() -> AppBuilder {
        AppBuilder {
            app: Self {
                game: Game::new(),
                tick: 1,
                tick_accum: Duration::ZERO,
                tick_duration: Duration::from_secs_f64(1.0/60.0),
                systems: HashMap::default(),
                event_bus: EventBus::default(),
                events: VecDeque::new(),
                commands: VecDeque::new(),
                quit_requested: false,
            },
            runner: None,
        }
    }

    pub fn tick_duration(&self) -> Duration { self.tick_duration }

    /// Number of ticks run so far.
    pub fn ticks_run(&self) -> u64 { self.tick - 1 }

    /// True if a system or event handler asked the app to stop.
    pub fn quit_requested(&self) -> bool { self.quit_requested }

    /**
     * Runs all per-frame [`Stage`]s.
     * If enough time has accumulated, each per-tick [`Stage`]s as well.
     * The very first frame always runs a tick so that [`StartEvent`] fires immediately.
     */
    pub fn run_frame(&mut self, delta: Duration) {
        log::trace!("----- FRAME: {}, DELTA: {}ms -----", self.tick, delta.as_millis());
        self.tick_accum += delta;
        if self.tick == 1 && self.tick_accum < self.tick_duration {
            self.tick_accum = self.tick_duration;
        }

        self.run_stage(Stage::Input, delta);

        let mut ticks_this_frame = 0;
        while self.tick_accum >= self.tick_duration {
            if ticks_this_frame == MAX_TICKS_PER_FRAME {
                log::warn!("Fell behind by {}ms, skipping ticks", self.tick_accum.as_millis());
                self.tick_accum = Duration::ZERO;
                break;
            }
            log::trace!("--- TICK ---");
            if self.tick == 1 {
                self.events.push_back(DynEvent::new(StartEvent));
            }
            for stage in Stage::TICK_STAGES {
                self.run_stage(stage, self.tick_duration);
            }
            self.tick_accum -= self.tick_duration;
            self.tick += 1;
            ticks_this_frame += 1;
        }

        self.run_stage(Stage::Render, delta);
    }

    /**
     * Runs exactly one frame containing exactly one tick.
     * Good for headless applications and tests.
     */
    pub fn run_tick(&mut self) {
        self.run_frame(self.tick_duration)
    }

    /**
     * Runs all [`System`]s within a [`Stage`], then executes enqueued commands and events.
     */
    fn run_stage(&mut self, stage: Stage, delta: Duration) {

        // Runs systems for stage specified.
        if let Some(systems) = self.systems.get(&stage) {
            for system in systems {
                let ctx = RunContext {
                    commands: &mut self.commands,
                    events: &mut self.events,
                    quit_requested: &mut self.quit_requested,
                    delta,
                };
                system(&mut self.game, ctx);
            }
        }

        // Handlers may fire more events and emit more commands, so drain until both are empty.
        loop {
            while let Some(mut command) = self.commands.pop_front() {
                command.run(&mut self.game);
            }
            let Some(event) = self.events.pop_front() else { break };
            let mut ctx = RunContext {
                commands: &mut self.commands,
                events: &mut self.events,
                quit_requested: &mut self.quit_requested,
                delta,
            };
            self.event_bus.handle_event(&mut self.game, &event, &mut ctx);
        }
    }
}


pub struct AppBuilder {
    app: App,
    runner: Option<Box<dyn AppRunner>>,
}

impl AppBuilder {

    /**
     * Reference to underlying [`Game`].
     */
    pub fn game(&mut self) -> &mut Game { &mut self.app.game }

    /// Adds a system to the stage specified.
    /// Systems in the same stage run in the order they were added.
    pub fn system(&mut self, stage: Stage, system: System) -> &mut Self {
        self.app.systems
            .entry(stage)
            .or_default()
            .push(system);
        self
    }

    pub fn event_handler<E: Event>(&mut self, handler: EventHandler<E>) -> &mut Self {
        self.app.event_bus.add_handler(handler);
        self
    }

    pub fn plugin(&mut self, mut plugin: impl Plugin) -> &mut Self {
        plugin.install(self);
        self
    }

    pub fn tick_duration(&mut self, tick_duration: Duration) -> &mut Self {
        self.app.tick_duration = tick_duration;
        self
    }

    pub fn tick_rate(&mut self, tick_rate: f32) -> &mut Self {
        self.app.tick_duration = Duration::from_secs_f32(1.0 / tick_rate);
        self
    }

    pub fn runner(&mut self, runner: impl AppRunner + 'static) -> &mut Self {
        self.runner = Some(Box::new(runner));
        self
    }

    /// Finishes building [`App`] without running it.
    pub fn build(self) -> App {
        self.app
    }

    /// Finishes building [`App`] and immediately runs it.
    pub fn run(mut self) -> anyhow::Result<()> {
        let Some(mut runner) = self.runner.take() else {
            bail!("Runner not configured");
        };
        runner.run(self.app)
    }
}

/// Responsible for running an [`App`].
pub trait AppRunner {
    fn run(&mut self, app: App) -> anyhow::Result<()>;
}

/**
 * Some function or object that adds functionality to an [`App`].
 */
pub trait Plugin {
    fn install(&mut self, builder: &mut AppBuilder);
}

impl<F> Plugin for F
where F: FnMut(&mut AppBuilder)
{
    fn install(&mut self, builder: &mut AppBuilder) {
        self(builder);
    }
}

pub struct RunContext<'a> {
    commands: &'a mut VecDeque<Box<dyn Command>>,
    events: &'a mut VecDeque<DynEvent>,
    quit_requested: &'a mut bool,
    delta: Duration,
}

impl<'a> RunContext<'a> {

    /**
     * Time since the last frame or tick, depending on the [`Stage`].
     */
    pub fn delta(&self) -> Duration {
        self.delta
    }

    /**
     * Time since the last frame or tick, depending on the [`Stage`].
     */
    pub fn delta_secs(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    /**
     * Requests that the following [`Command`] be executed at the end of the current [`Stage`].
     */
    pub fn run_command(&mut self, command: impl Command) {
        self.commands.push_back(Box::new(command));
    }

    /**
     * Requests that the [`App`] quit.
     */
    pub fn quit(&mut self) {
        *self.quit_requested = true;
    }

    /**
     * Queues an event to be handled at the end of the current [`Stage`].
     */
    pub fn fire<E: Event>(&mut self, event: E) {
        self.events.push_back(DynEvent::new(event));
    }
}

/// Function that runs over a [`Game`] and updates its state.
pub type System = fn(&mut Game, ctx: RunContext);

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Stage {
    /// Per frame.
    /// Reads input devices.
    Input,
    /// Per tick.
    /// Maps inputs to "decisions".
    PreUpdate,
    /// Per tick.
    /// Execution of decisions in PreUpdate.
    /// Main logic.
    Update,
    /// Per tick.
    /// Collision traversal.
    UpdatePhysics,
    /// Per tick.
    /// Runs code that depends on final positions, like cameras.
    PostUpdate,
    /// Per tick.
    /// Clears per-tick state and removes dead objects.
    Cleanup,
    /// Per frame.
    /// Syncs graphics with game state and renders.
    Render,
}

impl Stage {
    /// Stages run once per tick, in order.
    pub const TICK_STAGES: [Stage; 5] = [
        Stage::PreUpdate,
        Stage::Update,
        Stage::UpdatePhysics,
        Stage::PostUpdate,
        Stage::Cleanup,
    ];
}


/**
 * A command to run once at the end of the current stage.
 */
pub trait Command: 'static {
    fn run(&mut self, game: &mut Game);
}

impl<F> Command for F
where
    F: FnMut(&mut Game) + 'static
{
    fn run(&mut self, game: &mut Game) {
        self(game);
    }
}


#[cfg(test)]
mod test {
    use std::time::Duration;
    use crate::{App, Game, RunContext, Stage, StartEvent};

    struct Counter {
        ticks: u32,
        frames: u32,
        starts: u32,
    }

    fn count_ticks(game: &mut Game, _ctx: RunContext) {
        game.get::<&mut Counter>().ticks += 1;
    }

    fn count_frames(game: &mut Game, _ctx: RunContext) {
        game.get::<&mut Counter>().frames += 1;
    }

    fn count_starts(game: &mut Game, _event: &StartEvent, _ctx: &mut RunContext) {
        game.get::<&mut Counter>().starts += 1;
    }

    fn counting_app() -> App {
        let mut builder = App::builder();
        builder.game().add(Counter { ticks: 0, frames: 0, starts: 0 });
        builder
            .system(Stage::Update, count_ticks)
            .system(Stage::Render, count_frames)
            .event_handler::<StartEvent>(count_starts)
            .tick_duration(Duration::from_millis(100));
        builder.build()
    }

    #[test]
    fn first_frame_always_ticks() {
        let mut app = counting_app();
        app.run_frame(Duration::ZERO);
        let counter = app.game.get::<&Counter>();
        assert_eq!(1, counter.ticks);
        assert_eq!(1, counter.frames);
        assert_eq!(1, counter.starts);
    }

    #[test]
    fn ticks_follow_accumulated_time() {
        let mut app = counting_app();
        app.run_tick();
        app.run_frame(Duration::from_millis(50));
        app.run_frame(Duration::from_millis(60));
        app.run_frame(Duration::from_millis(200));
        let counter = app.game.get::<&Counter>();
        assert_eq!(4, counter.ticks);
        assert_eq!(4, counter.frames);
        assert_eq!(1, counter.starts);
    }

    #[test]
    fn long_stalls_are_capped() {
        let mut app = counting_app();
        app.run_tick();
        app.run_frame(Duration::from_secs(60));
        assert_eq!(1 + super::MAX_TICKS_PER_FRAME as u64, app.ticks_run());
    }

    #[test]
    fn commands_and_quit() {
        fn request_quit(_game: &mut Game, mut ctx: RunContext) {
            ctx.run_command(|game: &mut Game| game.get::<&mut Counter>().ticks += 100);
            ctx.quit();
        }
        let mut builder = App::builder();
        builder.game().add(Counter { ticks: 0, frames: 0, starts: 0 });
        builder.system(Stage::PostUpdate, request_quit);
        let mut app = builder.build();
        assert!(!app.quit_requested());
        app.run_tick();
        assert!(app.quit_requested());
        assert_eq!(100, app.game.get::<&Counter>().ticks);
    }
}
