//! Notifications published by the view.
//!
//! Handlers subscribe per [`EventKind`] and receive every matching
//! [`Event`] synchronously, in subscription order.

use std::collections::HashSet;

use crate::peaks::Envelope;
use crate::viewport::PointerEvent;

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Peaks were drawn across `width` device pixels.
    Redraw { peaks: Envelope, width: u32 },
    /// The viewport scrolled to `offset` CSS pixels.
    Scroll { offset: f64 },
    Finish,
    Play,
    Pause,
    /// Periodic progress while playing.
    AudioProcess { time: f64 },
    /// A click landed at normalised `progress`.
    Click { event: PointerEvent, progress: f64 },
    Seek { progress: f64 },
    /// Audio loaded and first draw done.
    Ready,
    Volume(f32),
    Mute(bool),
    Destroy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Redraw,
    Scroll,
    Finish,
    Play,
    Pause,
    AudioProcess,
    Click,
    Seek,
    Ready,
    Volume,
    Mute,
    Destroy,
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Redraw { .. } => EventKind::Redraw,
            Event::Scroll { .. } => EventKind::Scroll,
            Event::Finish => EventKind::Finish,
            Event::Play => EventKind::Play,
            Event::Pause => EventKind::Pause,
            Event::AudioProcess { .. } => EventKind::AudioProcess,
            Event::Click { .. } => EventKind::Click,
            Event::Seek { .. } => EventKind::Seek,
            Event::Ready => EventKind::Ready,
            Event::Volume(_) => EventKind::Volume,
            Event::Mute(_) => EventKind::Mute,
            Event::Destroy => EventKind::Destroy,
        }
    }
}

/// Handle returned by [`EventBus::on`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Handler = Box<dyn FnMut(&Event)>;

struct Listener {
    id: ListenerId,
    kind: EventKind,
    once: bool,
    handler: Handler,
}

#[derive(Default)]
pub struct EventBus {
    listeners: Vec<Listener>,
    next_id: u64,
    disabled: HashSet<EventKind>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .field("disabled", &self.disabled)
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on<F>(&mut self, kind: EventKind, handler: F) -> ListenerId
    where
        F: FnMut(&Event) + 'static,
    {
        self.subscribe(kind, false, Box::new(handler))
    }

    /// Subscribe for a single delivery.
    pub fn once<F>(&mut self, kind: EventKind, handler: F) -> ListenerId
    where
        F: FnMut(&Event) + 'static,
    {
        self.subscribe(kind, true, Box::new(handler))
    }

    fn subscribe(&mut self, kind: EventKind, once: bool, handler: Handler) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push(Listener {
            id,
            kind,
            once,
            handler,
        });
        id
    }

    /// Remove one listener. Returns false if it was already gone.
    pub fn un(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| l.id != id);
        self.listeners.len() != before
    }

    pub fn un_all(&mut self) {
        self.listeners.clear();
    }

    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.listeners.iter().filter(|l| l.kind == kind).count()
    }

    /// Suppress (or re-enable) delivery of `kind`.
    pub fn set_disabled(&mut self, kind: EventKind, disabled: bool) {
        if disabled {
            self.disabled.insert(kind);
        } else {
            self.disabled.remove(&kind);
        }
    }

    pub fn is_disabled(&self, kind: EventKind) -> bool {
        self.disabled.contains(&kind)
    }

    pub fn fire(&mut self, event: Event) {
        let kind = event.kind();
        if self.disabled.contains(&kind) {
            return;
        }
        let mut fired_once = Vec::new();
        for listener in self.listeners.iter_mut().filter(|l| l.kind == kind) {
            (listener.handler)(&event);
            if listener.once {
                fired_once.push(listener.id);
            }
        }
        if !fired_once.is_empty() {
            self.listeners.retain(|l| !fired_once.contains(&l.id));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder() -> (Rc<RefCell<Vec<Event>>>, impl FnMut(&Event) + 'static) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        (seen, move |e: &Event| sink.borrow_mut().push(e.clone()))
    }

    #[test]
    fn test_on_receives_matching_kind_only() {
        let mut bus = EventBus::new();
        let (seen, handler) = recorder();
        bus.on(EventKind::Play, handler);

        bus.fire(Event::Pause);
        bus.fire(Event::Play);
        bus.fire(Event::Play);

        assert_eq!(*seen.borrow(), vec![Event::Play, Event::Play]);
    }

    #[test]
    fn test_once_fires_a_single_time() {
        let mut bus = EventBus::new();
        let (seen, handler) = recorder();
        bus.once(EventKind::Finish, handler);

        bus.fire(Event::Finish);
        bus.fire(Event::Finish);

        assert_eq!(seen.borrow().len(), 1);
        assert_eq!(bus.listener_count(EventKind::Finish), 0);
    }

    #[test]
    fn test_un_and_un_all() {
        let mut bus = EventBus::new();
        let (seen, handler) = recorder();
        let id = bus.on(EventKind::Seek, handler);

        assert!(bus.un(id));
        assert!(!bus.un(id));
        bus.fire(Event::Seek { progress: 0.5 });
        assert!(seen.borrow().is_empty());

        bus.on(EventKind::Ready, |_| {});
        bus.on(EventKind::Destroy, |_| {});
        bus.un_all();
        assert_eq!(bus.listener_count(EventKind::Ready), 0);
    }

    #[test]
    fn test_disabled_kind_is_suppressed() {
        let mut bus = EventBus::new();
        let (seen, handler) = recorder();
        bus.on(EventKind::Scroll, handler);

        bus.set_disabled(EventKind::Scroll, true);
        bus.fire(Event::Scroll { offset: 10.0 });
        bus.set_disabled(EventKind::Scroll, false);
        bus.fire(Event::Scroll { offset: 20.0 });

        assert_eq!(*seen.borrow(), vec![Event::Scroll { offset: 20.0 }]);
    }
}
