//! In-memory fuel station index.

use crate::models::FuelStation;
use std::collections::{HashMap, HashSet};

/// Read-only station index, built once at startup and shared by
/// reference across requests. A by-state secondary index backs the
/// coarse corridor filter.
#[derive(Debug, Default)]
pub struct StationIndex {
    stations: Vec<FuelStation>,
    by_state: HashMap<String, Vec<usize>>,
}

impl StationIndex {
    pub fn new(stations: Vec<FuelStation>) -> Self {
        let mut by_state: HashMap<String, Vec<usize>> = HashMap::new();
        for (idx, station) in stations.iter().enumerate() {
            by_state.entry(station.state.clone()).or_default().push(idx);
        }
        Self { stations, by_state }
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    pub fn all(&self) -> &[FuelStation] {
        &self.stations
    }

    pub fn in_state(&self, state: &str) -> Vec<&FuelStation> {
        self.by_state
            .get(state)
            .map(|indices| indices.iter().map(|&i| &self.stations[i]).collect())
            .unwrap_or_default()
    }

    /// Stations in any of the given states, in stable input order.
    pub fn in_states(&self, states: &HashSet<&str>) -> Vec<&FuelStation> {
        self.stations
            .iter()
            .filter(|s| states.contains(s.state.as_str()))
            .collect()
    }

    /// The `n` cheapest stations, price ascending.
    pub fn cheapest(&self, n: usize) -> Vec<&FuelStation> {
        let mut sorted: Vec<&FuelStation> = self.stations.iter().collect();
        sorted.sort_by(|a, b| a.price_per_gallon.total_cmp(&b.price_per_gallon));
        sorted.truncate(n);
        sorted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn station(id: u64, state: &str, price: f64) -> FuelStation {
        FuelStation {
            id,
            name: format!("Stop {id}"),
            city: "Testville".to_string(),
            state: state.to_string(),
            lat: 40.0,
            lon: -100.0,
            price_per_gallon: price,
        }
    }

    #[test]
    fn filters_by_state() {
        let index = StationIndex::new(vec![
            station(1, "CO", 3.10),
            station(2, "KS", 2.90),
            station(3, "CO", 3.50),
        ]);
        let co = index.in_state("CO");
        assert_eq!(co.len(), 2);
        assert!(index.in_state("FL").is_empty());

        let states: HashSet<&str> = ["CO", "KS"].into_iter().collect();
        assert_eq!(index.in_states(&states).len(), 3);
    }

    #[test]
    fn cheapest_sorts_by_price() {
        let index = StationIndex::new(vec![
            station(1, "CO", 3.10),
            station(2, "KS", 2.90),
            station(3, "NE", 3.50),
        ]);
        let cheapest = index.cheapest(2);
        assert_eq!(cheapest[0].id, 2);
        assert_eq!(cheapest[1].id, 1);
    }
}
