use std::any::{Any, TypeId};
use crate::{Game, HashMap, RunContext};

/// Event that is fired the first tick the game runs.
#[derive(Copy, Clone, Debug)]
pub struct StartEvent;

/**
 * Represents someting that happened in the [`Game`] to be reacted to.
 */
pub trait Event: Any + Clone {}
impl<E: Any + Clone> Event for E {}

pub(crate) struct DynEvent {
    event: Box<dyn Any>,
    type_id: TypeId,
}

impl DynEvent {
    pub fn new<E: Event>(event: E) -> Self {
        Self {
            event: Box::new(event),
            type_id: TypeId::of::<E>(),
        }
    }
}


/// Callback that handles an event.
pub type EventHandler<E> = fn(&mut Game, &E, &mut RunContext);


pub(crate) trait DynEventHandler {
    fn handle_dyn(&self, game: &mut Game, event: &DynEvent, ctx: &mut RunContext);
}

impl<E: Event> DynEventHandler for EventHandler<E> {
    fn handle_dyn(&self, game: &mut Game, event: &DynEvent, ctx: &mut RunContext) {
        let Some(event) = event.event.downcast_ref::<E>() else { return };
        self(game, event, ctx);
    }
}

/// Event handlers grouped by the type of event they handle.
#[derive(Default)]
pub(crate) struct EventBus {
    handlers: HashMap<TypeId, Vec<Box<dyn DynEventHandler>>>
}

impl EventBus {

    /// Adds an event handler.
    pub fn add_handler<E: Event>(&mut self, handler: EventHandler<E>) {
        let event_type = TypeId::of::<E>();
        let handlers_for_event = self.handlers.entry(event_type).or_default();
        handlers_for_event.push(Box::new(handler));
    }

    /// Passes an event to every handler registered for its type, in registration order.
    pub fn handle_event(&self, game: &mut Game, event: &DynEvent, ctx: &mut RunContext) {
        let Some(handlers_for_event) = self.handlers.get(&event.type_id) else {
            log::trace!("Event with no handlers dropped");
            return
        };
        for handler in handlers_for_event {
            handler.handle_dyn(game, event, ctx);
        }
    }
}
