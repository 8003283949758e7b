//! Destination for flags produced by the flagger

use std::sync::RwLock;

use shared_types::{FlagSummary, RiskFlag, RiskFlagStatus};

pub trait FlagSink: Send + Sync {
    fn accept(&self, flags: &[RiskFlag]);
}

/// Keeps accepted flags in arrival order and tracks their review status
#[derive(Debug, Default)]
pub struct MemoryFlagSink {
    flags: RwLock<Vec<RiskFlag>>,
}

impl MemoryFlagSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flags for one document, or all flags when `document_id` is `None`
    pub fn list(&self, document_id: Option<&str>) -> Vec<RiskFlag> {
        let flags = self.flags.read().unwrap_or_else(|e| e.into_inner());
        flags
            .iter()
            .filter(|flag| document_id.map_or(true, |id| flag.document_id == id))
            .cloned()
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<RiskFlag> {
        let flags = self.flags.read().unwrap_or_else(|e| e.into_inner());
        flags.iter().find(|flag| flag.id == id).cloned()
    }

    /// Replace the stored flag with a copy carrying `status`
    pub fn set_status(&self, id: &str, status: RiskFlagStatus) -> Option<RiskFlag> {
        let mut flags = self.flags.write().unwrap_or_else(|e| e.into_inner());
        let slot = flags.iter_mut().find(|flag| flag.id == id)?;
        *slot = slot.with_status(status);
        Some(slot.clone())
    }

    pub fn summary(&self, document_id: Option<&str>) -> FlagSummary {
        FlagSummary::from_flags(&self.list(document_id))
    }
}

impl FlagSink for MemoryFlagSink {
    fn accept(&self, flags: &[RiskFlag]) {
        let mut stored = self.flags.write().unwrap_or_else(|e| e.into_inner());
        stored.extend_from_slice(flags);
    }
}
