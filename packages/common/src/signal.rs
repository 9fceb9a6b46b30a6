use anyhow::Result;
use async_trait::async_trait;
use std::{collections::HashMap, sync::Arc};
use tracing::debug;

use crate::event::{Event, GenericEvent};

/// Typed receiver, connected for a specific event type.
#[async_trait]
pub trait Receiver<E: Event>: Send + Sync {
    /// Receiver identifier, used to disconnect it again.
    fn id(&self) -> &str;
    /// Topics this receiver listens to.
    fn topics(&self) -> &[&str];

    async fn on_signal(&self, e: &E) -> Result<()>;
}

/// Type-erased receiver stored in the registry.
#[async_trait]
pub trait GenericReceiver: Send + Sync {
    fn id(&self) -> &str;
    fn topics(&self) -> &[&str];

    async fn on_signal(&self, e: &GenericEvent) -> Result<()>;
}

/// Adapter to convert typed Receiver<E> into GenericReceiver
struct ReceiverAdapter<E: Event, R: Receiver<E>> {
    receiver: Arc<R>,
    _phantom: std::marker::PhantomData<E>,
}

#[async_trait]
impl<E: Event, R: Receiver<E>> GenericReceiver for ReceiverAdapter<E, R> {
    fn id(&self) -> &str {
        self.receiver.id()
    }

    fn topics(&self) -> &[&str] {
        self.receiver.topics()
    }

    async fn on_signal(&self, generic_event: &GenericEvent) -> Result<()> {
        let typed_event: E = E::from_generic_event(generic_event)?;
        self.receiver.on_signal(&typed_event).await
    }
}

/// Topic-keyed registry of receivers. Sending runs every receiver of the
/// topic in connection order and stops at the first failure.
#[derive(Clone, Default)]
pub struct SignalRegistry {
    receivers: HashMap<String, Vec<Arc<dyn GenericReceiver>>>,
}

impl SignalRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connect a typed receiver.
    pub fn connect<E: Event + 'static, R: Receiver<E> + 'static>(&mut self, receiver: R) {
        let adapter: Arc<dyn GenericReceiver> = Arc::new(ReceiverAdapter::<E, R> {
            receiver: Arc::new(receiver),
            _phantom: std::marker::PhantomData,
        });
        self.connect_generic(adapter);
    }

    /// Connect an already type-erased receiver.
    pub fn connect_generic(&mut self, receiver: Arc<dyn GenericReceiver>) {
        for &topic in receiver.topics() {
            self.receivers
                .entry(topic.to_string())
                .or_default()
                .push(receiver.clone());
        }
    }

    /// Disconnect a receiver by id from every topic. Returns false if unknown.
    pub fn disconnect(&mut self, receiver_id: &str) -> bool {
        let mut removed = false;
        for list in self.receivers.values_mut() {
            let before = list.len();
            list.retain(|r| r.id() != receiver_id);
            removed |= list.len() != before;
        }
        removed
    }

    /// Number of receivers listening to a topic.
    pub fn receiver_count(&self, topic: &str) -> usize {
        self.receivers.get(topic).map(Vec::len).unwrap_or(0)
    }

    /// Deliver an event to every receiver of its topic.
    /// @return number of receivers that handled the event
    pub async fn send<E: Event>(&self, event: &E) -> Result<usize> {
        let topic = event.topic();
        let receivers = match self.receivers.get(topic) {
            Some(r) if !r.is_empty() => r,
            _ => return Ok(0),
        };

        let generic_event = event.to_generic_event();
        for receiver in receivers {
            debug!(topic, receiver = receiver.id(), "Dispatching signal");
            receiver.on_signal(&generic_event).await.map_err(|e| {
                anyhow::anyhow!("Receiver {} failed on {}: {}", receiver.id(), topic, e)
            })?;
        }

        Ok(receivers.len())
    }
}
