use std::collections::VecDeque;

use foundation::time::TimeMs;

/// An event stamped with the time it was emitted.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope<E> {
    pub at: TimeMs,
    pub event: E,
}

/// Typed, ordered event queue.
///
/// Producers (map callbacks, loader completions, camera rest) `emit`; the
/// owner drains in emission order. Nothing is dispatched re-entrantly.
#[derive(Debug)]
pub struct EventBus<E> {
    events: VecDeque<Envelope<E>>,
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self {
            events: VecDeque::new(),
        }
    }
}

impl<E> EventBus<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, at: TimeMs, event: E) {
        self.events.push_back(Envelope { at, event });
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn pop(&mut self) -> Option<Envelope<E>> {
        self.events.pop_front()
    }

    pub fn drain(&mut self) -> Vec<Envelope<E>> {
        self.events.drain(..).collect()
    }
}
