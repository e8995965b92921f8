use anyhow::Result;
use std::sync::Arc;

use crate::model::LinkEvent;

/// Observer notified synchronously around property reference mutations.
///
/// Returning an error from a before event aborts the mutation; errors from
/// after events are logged and ignored since the save already happened.
pub trait LinkEventListener: Send + Sync {
    fn on_link_event(&self, event: &LinkEvent) -> Result<()>;
}

#[derive(Clone, Default)]
pub struct EventPublisher {
    listeners: Vec<Arc<dyn LinkEventListener>>,
}

impl EventPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: Arc<dyn LinkEventListener>) {
        self.listeners.push(listener);
    }

    pub fn with_listener(mut self, listener: Arc<dyn LinkEventListener>) -> Self {
        self.subscribe(listener);
        self
    }

    pub fn publish(&self, event: &LinkEvent) -> Result<()> {
        for listener in &self.listeners {
            if let Err(e) = listener.on_link_event(event) {
                if event.kind.is_before() {
                    return Err(e.context(format!(
                        "{} listener rejected change to {} '{}'",
                        event.kind, event.entity.class_id, event.entity.id
                    )));
                }
                log::error!(
                    "{} listener failed for {} '{}': {:#}",
                    event.kind,
                    event.entity.class_id,
                    event.entity.id,
                    e
                );
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for EventPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventPublisher")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// Logs every link event at info level
#[derive(Debug, Default)]
pub struct LoggingListener;

impl LinkEventListener for LoggingListener {
    fn on_link_event(&self, event: &LinkEvent) -> Result<()> {
        log::info!(
            "{}: {} '{}' property '{}'",
            event.kind,
            event.entity.class_id,
            event.entity.id,
            event.property
        );
        Ok(())
    }
}
