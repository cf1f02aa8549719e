//! Categorical filtering over an enriched table. Pure: the source table is
//! only read, the result holds clones of the matching rows in input order.

use campaign_core::{Channel, EnrichedRecord, EnrichedTable};
use std::borrow::Borrow;
use std::collections::BTreeSet;

/// Selected values for one categorical column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection<T: Ord> {
    /// No restriction.
    All,
    /// Only these values. An empty set matches nothing.
    Only(BTreeSet<T>),
}

impl<T: Ord> Selection<T> {
    pub fn only(values: impl IntoIterator<Item = T>) -> Self {
        Self::Only(values.into_iter().collect())
    }

    pub fn matches<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        match self {
            Self::All => true,
            Self::Only(values) => values.contains(value),
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }
}

impl<T: Ord> Default for Selection<T> {
    fn default() -> Self {
        Self::All
    }
}

/// Channel / region / device selection for one dashboard render.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub channels: Selection<Channel>,
    pub regions: Selection<String>,
    pub devices: Selection<String>,
}

impl FilterCriteria {
    /// Criteria that keep every row.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_channels(mut self, channels: impl IntoIterator<Item = Channel>) -> Self {
        self.channels = Selection::only(channels);
        self
    }

    pub fn with_regions<S: Into<String>>(mut self, regions: impl IntoIterator<Item = S>) -> Self {
        self.regions = Selection::only(regions.into_iter().map(Into::into));
        self
    }

    pub fn with_devices<S: Into<String>>(mut self, devices: impl IntoIterator<Item = S>) -> Self {
        self.devices = Selection::only(devices.into_iter().map(Into::into));
        self
    }

    pub fn matches(&self, record: &EnrichedRecord) -> bool {
        self.channels.matches(&record.channel)
            && self.regions.matches(record.region.as_str())
            && self.devices.matches(record.device.as_str())
    }
}

/// Rows of `table` that satisfy every selection.
pub fn filter(table: &EnrichedTable, criteria: &FilterCriteria) -> EnrichedTable {
    let records = table
        .iter()
        .filter(|record| criteria.matches(record))
        .cloned()
        .collect();
    EnrichedTable::new(table.source_digest.clone(), records)
}
