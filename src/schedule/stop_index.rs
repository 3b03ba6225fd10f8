use std::collections::HashMap;

use tracing::warn;

use crate::config::Lookups;
use crate::upstream::Stop;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedStop {
    pub id: String,
    pub name: String,
}

/// Stops keyed by name, used to line timetable columns up with stop ids.
#[derive(Debug, Default, Clone)]
pub struct StopIndex {
    by_name: HashMap<String, ResolvedStop>,
}

impl StopIndex {
    /// Stops missing an id or a name cannot be matched and are skipped. When two
    /// stops share a name the later one wins.
    pub fn from_stops(stops: &[Stop]) -> Self {
        let mut by_name = HashMap::with_capacity(stops.len());
        for stop in stops {
            let (Some(id), Some(name)) = (&stop.id, &stop.name) else {
                continue;
            };
            let resolved = ResolvedStop {
                id: id.clone(),
                name: name.clone(),
            };
            if let Some(previous) = by_name.insert(name.clone(), resolved) {
                warn!(stop_name = %name, replaced = %previous.id, by = %id, "Duplicate stop name");
            }
        }
        Self { by_name }
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Resolves a timetable column label, applying the stop-name corrections first.
    pub fn resolve(&self, label: &str, lookups: &Lookups) -> Option<&ResolvedStop> {
        self.by_name.get(lookups.canonical_stop_name(label))
    }
}
