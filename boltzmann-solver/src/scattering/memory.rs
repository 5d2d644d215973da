use super::{Channel, ScatteringTableError, ScatteringTables, TransitionRecord};
use std::collections::HashMap;

/// Transition records held in memory. States without records scatter nowhere.
#[derive(Clone, Debug, Default)]
pub struct InMemoryTables {
    records: HashMap<(Channel, usize), Vec<TransitionRecord>>,
}

impl InMemoryTables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record to those of `state` in `channel`
    pub fn push(&mut self, channel: Channel, state: usize, record: TransitionRecord) {
        self.records
            .entry((channel, state))
            .or_insert_with(Vec::new)
            .push(record);
    }

    pub fn with_records(
        mut self,
        channel: Channel,
        state: usize,
        records: impl IntoIterator<Item = TransitionRecord>,
    ) -> Self {
        self.records
            .entry((channel, state))
            .or_insert_with(Vec::new)
            .extend(records);
        self
    }

    pub fn number_of_records(&self) -> usize {
        self.records.values().map(Vec::len).sum()
    }
}

impl ScatteringTables for InMemoryTables {
    fn fetch(
        &self,
        channel: Channel,
        state: usize,
    ) -> Result<Vec<TransitionRecord>, ScatteringTableError> {
        Ok(self
            .records
            .get(&(channel, state))
            .cloned()
            .unwrap_or_default())
    }
}
