use crate::types::{ClassifierError, ReferenceExample, Result};
use std::path::Path;
use tracing::{info, warn};

const BUILTIN_EXAMPLES: &str = include_str!("../data/reference_examples.json");

/// Labeled screenshots shown to the model ahead of every target image.
#[derive(Debug, Clone, Default)]
pub struct ReferenceSet {
    examples: Vec<ReferenceExample>,
}

impl ReferenceSet {
    pub fn new(examples: Vec<ReferenceExample>) -> Self {
        Self { examples }
    }

    /// The curated set shipped with the crate.
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_EXAMPLES)
    }

    /// Parses a JSON array of examples.
    ///
    /// Only a document that is not an array is an error. Entries that are
    /// `null` or have the wrong shape are dropped with a warning.
    pub fn from_json(content: &str) -> Result<Self> {
        let entries: Vec<serde_json::Value> = serde_json::from_str(content)
            .map_err(|e| ClassifierError::ReferenceSet(e.to_string()))?;

        let mut examples = Vec::with_capacity(entries.len());
        for (index, entry) in entries.into_iter().enumerate() {
            if entry.is_null() {
                warn!("Skipping null reference example at index {}", index);
                continue;
            }
            match serde_json::from_value::<ReferenceExample>(entry) {
                Ok(example) => examples.push(example),
                Err(e) => warn!("Skipping malformed reference example at index {}: {}", index, e),
            }
        }
        let set = Self::new(examples);

        let unusable = set.len() - set.usable_count();
        if unusable > 0 {
            warn!("{} reference examples are missing a label or image and will be skipped", unusable);
        }
        Ok(set)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ClassifierError::ReferenceSet(format!("{}: {}", path.display(), e)))?;
        let set = Self::from_json(&content)?;
        info!("Loaded {} reference examples from {}", set.len(), path.display());
        Ok(set)
    }

    pub fn examples(&self) -> &[ReferenceExample] {
        &self.examples
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    pub fn usable_count(&self) -> usize {
        self.examples.iter().filter(|example| example.usable_parts().is_some()).count()
    }
}
