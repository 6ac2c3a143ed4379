use super::parse_record;
use crate::ComponentIdentity;
use crate::OverrideSource;
use crate::OverrideValue;
use crate::Result;

/// Ordered in-memory (pattern string, value) pairs — for embedding
/// applications that assemble overrides from their own configuration tree
/// rather than a file. Same parse and error rules as the file source.
pub struct MemoryOverrideSource<V> {
    entries: Vec<(String, V)>,
}

impl<V: OverrideValue> MemoryOverrideSource<V> {
    pub fn new<S, I>(entries: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = (S, V)>,
    {
        Self {
            entries: entries.into_iter().map(|(name, value)| (name.into(), value)).collect(),
        }
    }
}

impl<V: OverrideValue> OverrideSource<V> for MemoryOverrideSource<V> {
    fn load(&self) -> Result<Vec<(ComponentIdentity, V)>> {
        self.entries
            .iter()
            .map(|(name, value)| parse_record(name, *value))
            .collect()
    }
}
