//! Shared server state, built once at startup.

use crate::config::Config;
use crate::data::{self, CityGazetteer};
use crate::geocode::Geocoder;
use crate::providers::RoutingChain;
use anyhow::Result;
use fuelstop_core::{CorridorFilter, FuelStation, StationIndex};

pub struct AppState {
    config: Config,
    index: StationIndex,
    geocoder: Geocoder,
    routing: RoutingChain,
}

impl AppState {
    /// Load reference data from disk and build the full state.
    pub fn load(config: Config) -> Result<Self> {
        let gazetteer = CityGazetteer::load(&config.cities_json_path)?;
        let stations = data::load_stations(&config.stations_csv_path, &gazetteer)?;
        tracing::info!(
            cities = gazetteer.len(),
            stations = stations.len(),
            "loaded reference data"
        );
        Ok(Self::from_parts(config, gazetteer, stations))
    }

    /// Assemble state from already-loaded tables. Tests use this to
    /// avoid touching the filesystem.
    pub fn from_parts(
        config: Config,
        gazetteer: CityGazetteer,
        stations: Vec<FuelStation>,
    ) -> Self {
        let geocoder = Geocoder::new(&config, gazetteer);
        let routing = RoutingChain::from_config(&config);
        Self {
            index: StationIndex::new(stations),
            geocoder,
            routing,
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn index(&self) -> &StationIndex {
        &self.index
    }

    pub fn geocoder(&self) -> &Geocoder {
        &self.geocoder
    }

    pub fn routing(&self) -> &RoutingChain {
        &self.routing
    }

    pub fn corridor(&self) -> CorridorFilter {
        CorridorFilter::new(self.config.corridor_radius_miles)
    }
}
