use std::collections::HashMap;
use std::sync::Arc;

use tracing::warn;

use super::cache::{CachedView, QueryCache, QueryKey};
use super::domain::{location_key, Location, LocationGroup};
use super::store::RegistrationStore;

/// Group locations by the literal `"{city}, {state}"` key.
///
/// Matching is case- and whitespace-sensitive: "Pune" and "pune" are distinct
/// groups. Each group keeps the country of its first location. Groups come out
/// in first-seen order.
pub fn group_locations(locations: &[Location]) -> Vec<LocationGroup> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<LocationGroup> = Vec::new();

    for location in locations {
        let key = location_key(&location.city, &location.state);
        match index.get(&key) {
            Some(&position) => groups[position].count += 1,
            None => {
                index.insert(key, groups.len());
                groups.push(LocationGroup {
                    city: location.city.clone(),
                    state: location.state.clone(),
                    country: location.country.clone(),
                    count: 1,
                });
            }
        }
    }

    groups
}

/// Builds the location summary behind the directory map.
pub struct LocationAggregator<S> {
    store: Arc<S>,
    cache: Arc<QueryCache>,
}

impl<S> LocationAggregator<S>
where
    S: RegistrationStore + 'static,
{
    pub fn new(store: Arc<S>, cache: Arc<QueryCache>) -> Self {
        Self { store, cache }
    }

    pub async fn list_location_groups(&self) -> Vec<LocationGroup> {
        let key = QueryKey::LocationGroups;
        if let Some(CachedView::Locations(groups)) = self.cache.fresh(&key) {
            return groups;
        }

        let generation = self.cache.generation(&key);
        match self.store.approved_locations().await {
            Ok(locations) => {
                let groups = group_locations(&locations);
                self.cache
                    .store(key, generation, CachedView::Locations(groups.clone()));
                groups
            }
            Err(err) => {
                warn!(error = %err, "approved locations unavailable, serving empty summary");
                Vec::new()
            }
        }
    }
}
