//! Filter, merge and rank catalog records into one group per display location.

use std::collections::HashMap;

use serde::Serialize;

use crate::{
    catalog::{self, CreatureRecord},
    criteria::FilterCriteria,
    locations::{self, DISPLAY_LOCATIONS, WEATHERS},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedEntry {
    pub name: String,
    pub size: Option<String>,
    pub time: String,
    pub kind: String,
    pub fishid: String,
    /// Known weathers the first matching record is flagged for.
    pub weathers: Vec<String>,
    pub weight: f64,
    /// Percentage of the group's total weight, unrounded.
    pub share: f64,
}

impl AggregatedEntry {
    fn from_record(record: &CreatureRecord) -> Self {
        Self {
            name: record.name.clone(),
            size: record.size.clone(),
            time: record.time.clone(),
            kind: record.kind.clone(),
            fishid: record.fishid.clone(),
            weathers: WEATHERS
                .iter()
                .filter(|weather| record.flag(weather))
                .map(|weather| weather.to_string())
                .collect(),
            weight: record.weight,
            share: 0.0,
        }
    }

    pub fn size_rank(&self) -> u8 {
        locations::size_rank(self.size.as_deref())
    }

    pub fn icon_path(&self) -> String {
        catalog::icon_path(&self.fishid, &self.kind)
    }

    pub fn available_in(&self, weather: &str) -> bool {
        self.weathers.iter().any(|w| w == weather)
    }

    /// Share as shown to users: one decimal place.
    pub fn share_label(&self) -> String {
        let share = if self.share.is_finite() { self.share } else { 0.0 };
        format!("{share:.1}%")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationGroup {
    pub location: String,
    pub total_weight: f64,
    pub entries: Vec<AggregatedEntry>,
}

impl LocationGroup {
    fn new(location: &str) -> Self {
        Self {
            location: location.to_string(),
            total_weight: 0.0,
            entries: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn rank_entries(&mut self) {
        // Names are unique per group after merging, so this is a strict order.
        self.entries.sort_by(|a, b| {
            b.weight
                .total_cmp(&a.weight)
                .then_with(|| a.size_rank().cmp(&b.size_rank()))
                .then_with(|| a.name.cmp(&b.name))
        });
    }

    fn assign_shares(&mut self) {
        self.total_weight = self
            .entries
            .iter()
            .fold(0.0, |total, entry| saturating_add(total, entry.weight));
        let total = self.total_weight;
        for entry in &mut self.entries {
            entry.share = if total > 0.0 {
                entry.weight / total * 100.0
            } else {
                0.0
            };
        }
    }
}

/// Every display location in display order, including empty ones.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupedTables {
    pub groups: Vec<LocationGroup>,
}

impl GroupedTables {
    pub fn get(&self, location: &str) -> Option<&LocationGroup> {
        self.groups.iter().find(|group| group.location == location)
    }

    pub fn non_empty(&self) -> impl Iterator<Item = &LocationGroup> {
        self.groups.iter().filter(|group| !group.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(LocationGroup::is_empty)
    }

    pub fn entry_count(&self) -> usize {
        self.groups.iter().map(|group| group.entries.len()).sum()
    }
}

/// Record weights are finite; sums clamp to the finite range so shares
/// never divide infinities.
fn saturating_add(a: f64, b: f64) -> f64 {
    (a + b).clamp(f64::MIN, f64::MAX)
}

pub fn matches(record: &CreatureRecord, criteria: &FilterCriteria) -> bool {
    record
        .toollevel
        .is_some_and(|required| criteria.tool_power >= required)
        && record.flag(&criteria.season)
        && record.flag(&criteria.weather)
        && locations::is_display_location(&record.location)
}

pub fn filter_and_group(records: &[CreatureRecord], criteria: &FilterCriteria) -> GroupedTables {
    let mut groups: Vec<LocationGroup> = DISPLAY_LOCATIONS
        .iter()
        .map(|location| LocationGroup::new(location))
        .collect();
    let mut index: Vec<HashMap<&str, usize>> = vec![HashMap::new(); groups.len()];

    for record in records.iter().filter(|record| matches(record, criteria)) {
        let Some(slot) = DISPLAY_LOCATIONS
            .iter()
            .position(|location| *location == record.location)
        else {
            continue;
        };
        let group = &mut groups[slot];
        let existing = index[slot].get(record.name.as_str()).copied();
        match existing {
            Some(at) => {
                let entry = &mut group.entries[at];
                entry.weight = saturating_add(entry.weight, record.weight);
            }
            None => {
                index[slot].insert(record.name.as_str(), group.entries.len());
                group.entries.push(AggregatedEntry::from_record(record));
            }
        }
    }

    for group in &mut groups {
        group.rank_entries();
        group.assign_shares();
    }

    GroupedTables { groups }
}
