use std::any::Any;
use std::fmt::Debug;

/// Access to the concrete type behind a trait object.
pub trait AsAny {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// An immutable fact produced by a successful mutation.
///
/// Events carry only what changed. Turning them into integration payloads is
/// the job of the schema registry, so constructing one can never fail.
pub trait DomainEvent: AsAny + Debug + Send + Sync {
    fn event_type(&self) -> &'static str;
}

/// A domain operation's result together with the events it produced.
#[derive(Debug)]
#[must_use = "events are lost unless dispatched"]
pub struct Emitted<T> {
    pub value: T,
    pub events: Vec<Box<dyn DomainEvent>>,
}

impl<T> Emitted<T> {
    pub fn new(value: T, event: impl DomainEvent + 'static) -> Self {
        Self {
            value,
            events: vec![Box::new(event)],
        }
    }

    pub fn none(value: T) -> Self {
        Self {
            value,
            events: Vec::new(),
        }
    }

    pub fn and(mut self, event: impl DomainEvent + 'static) -> Self {
        self.events.push(Box::new(event));
        self
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Emitted<U> {
        Emitted {
            value: f(self.value),
            events: self.events,
        }
    }

    pub fn event_types(&self) -> Vec<&'static str> {
        self.events.iter().map(|e| e.event_type()).collect()
    }
}
