use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{info, warn};

use super::ConsumerError;
use crate::bus::Delivery;
use crate::context::Context;
use crate::error::Result;

type Handler = Box<dyn Fn(&Context, &Delivery) -> Result<(), ConsumerError> + Send + Sync>;

/// Static dispatch table from integration event type to typed handler.
///
/// Built once at startup. Each entry decodes the JSON payload into its
/// schema type before calling the handler, so handlers only see well-formed
/// input.
///
/// ```ignore
/// let handlers = EventHandlers::new()
///     .on("user_created", move |ctx, e: UserCreatedSchema| payments.store_user_balance(ctx, e.user_id()?, 100))
///     .on("order_paid", move |ctx, e: OrderPaidSchema| notifications.order_paid(ctx, &e));
/// ```
#[derive(Default)]
pub struct EventHandlers {
    handlers: HashMap<String, Handler>,
}

impl EventHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route `event_type` to `handler`. A second registration replaces the first.
    pub fn on<T, F>(mut self, event_type: &str, handler: F) -> Self
    where
        T: DeserializeOwned + 'static,
        F: Fn(&Context, T) -> Result<()> + Send + Sync + 'static,
    {
        let name = event_type.to_string();
        let wrapped: Handler = Box::new(move |ctx: &Context, delivery: &Delivery| {
            let payload: T = delivery.decode().map_err(|e| ConsumerError::Malformed {
                event_type: name.clone(),
                reason: e.to_string(),
            })?;
            handler(ctx, payload).map_err(|source| ConsumerError::Handler {
                event_type: name.clone(),
                source,
            })
        });
        self.handlers.insert(event_type.to_string(), wrapped);
        self
    }

    /// Combine two tables. Entries of `other` win on conflict.
    pub fn merge(mut self, other: EventHandlers) -> Self {
        self.handlers.extend(other.handlers);
        self
    }

    pub fn handles(&self, event_type: &str) -> bool {
        self.handlers.contains_key(event_type)
    }

    /// Registered event types, sorted.
    pub fn event_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }
}

impl fmt::Debug for EventHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHandlers")
            .field("event_types", &self.event_types())
            .finish()
    }
}

/// Outcome of a successfully consumed delivery. Both mean "acknowledge".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Consumed {
    Handled,
    /// No handler is registered for the type. Logged and skipped.
    Ignored,
}

/// Applies deliveries to a handler table.
#[derive(Clone, Debug)]
pub struct EventConsumer {
    name: String,
    handlers: Arc<EventHandlers>,
}

impl EventConsumer {
    pub fn new(name: impl Into<String>, handlers: EventHandlers) -> Self {
        Self {
            name: name.into(),
            handlers: Arc::new(handlers),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn handlers(&self) -> &EventHandlers {
        &self.handlers
    }

    pub fn handle(&self, ctx: &Context, delivery: &Delivery) -> Result<Consumed, ConsumerError> {
        let Some(handler) = self.handlers.handlers.get(&delivery.event_type) else {
            warn!(
                consumer = %self.name,
                event_type = %delivery.event_type,
                message_id = %delivery.id,
                "no handler registered, skipping"
            );
            return Ok(Consumed::Ignored);
        };

        info!(
            consumer = %self.name,
            event_type = %delivery.event_type,
            message_id = %delivery.id,
            "handling event"
        );
        handler(ctx, delivery)?;
        Ok(Consumed::Handled)
    }
}
