use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// A signal payload that can be routed by topic.
pub trait Event: Send + Sync + Sized + Serialize + DeserializeOwned {
    /// Topic receivers subscribe to (e.g., "score_saved").
    fn topic(&self) -> &str;

    /// Erase the payload type so it can travel through a registry.
    fn to_generic_event(&self) -> GenericEvent {
        GenericEvent {
            topic: self.topic().to_string(),
            payload: serde_json::to_value(self).unwrap_or_default(),
        }
    }

    /// Recover the typed payload from a generic event.
    fn from_generic_event(e: &GenericEvent) -> Result<Self, anyhow::Error> {
        let payload: Self = serde_json::from_value(e.payload.clone())?;
        Ok(payload)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenericEvent {
    pub topic: String,
    pub payload: serde_json::Value,
}

impl Event for GenericEvent {
    fn topic(&self) -> &str {
        &self.topic
    }

    fn from_generic_event(e: &GenericEvent) -> Result<Self, anyhow::Error> {
        Ok(e.clone())
    }
}
