//! Query request types

use serde::{Deserialize, Serialize};

/// Question about an event
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryRequest {
    /// The question to answer
    pub question: String,

    /// Event to answer about; the currently selected event when omitted
    #[serde(default)]
    pub event_id: Option<String>,
}

impl QueryRequest {
    /// Create a new query
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            event_id: None,
        }
    }

    /// Target a specific event
    pub fn for_event(mut self, event_id: impl Into<String>) -> Self {
        self.event_id = Some(event_id.into());
        self
    }
}

/// Event selection request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventSelection {
    /// Event to select; `None` clears the selection
    #[serde(default)]
    pub event_id: Option<String>,
}
