#![deny(unsafe_code)]

/// What produced a stored artifact: the inputs it used and the code revision
/// that was executed.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ProvenanceRecord {
    /// Activity name, e.g. "Split REDCap labelled data by instruments".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Identifiers or links of every input read to produce the artifact.
    pub used: Vec<String>,
    /// Link to the exact code revision that ran.
    pub executed: String,
}

impl ProvenanceRecord {
    pub fn new(executed: impl Into<String>) -> Self {
        Self {
            description: None,
            used: Vec::new(),
            executed: executed.into(),
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds an input, ignoring repeats while keeping first-seen order.
    #[must_use]
    pub fn used(mut self, id: impl Into<String>) -> Self {
        let id = id.into();
        if !self.used.contains(&id) {
            self.used.push(id);
        }
        self
    }
}
