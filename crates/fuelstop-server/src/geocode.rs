//! Place lookup: local city gazetteer first, Nominatim as fallback.
//!
//! The gazetteer answers `"City, ST"` inputs without I/O, which covers
//! the vast majority of requests. Anything else goes to Nominatim with
//! a bounded, TTL-pruned result cache so repeated lookups of the same
//! free-text address stay cheap.

use crate::config::Config;
use crate::data::CityGazetteer;
use crate::error::ApiError;
use dashmap::DashMap;
use reqwest::Client;
use serde::Deserialize;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
struct GeocodeEntry {
    fetched_at: Instant,
    coords: (f64, f64),
}

#[derive(Debug, Deserialize)]
struct NominatimHit {
    lat: String,
    lon: String,
}

pub struct Geocoder {
    gazetteer: CityGazetteer,
    client: Client,
    nominatim_url: String,
    api_fallback: bool,
    cache: DashMap<String, GeocodeEntry>,
    cache_max_entries: usize,
    cache_ttl: Duration,
}

impl Geocoder {
    pub fn new(config: &Config, gazetteer: CityGazetteer) -> Self {
        Self {
            gazetteer,
            client: Client::builder()
                .user_agent(config.geocode_user_agent.clone())
                .timeout(Duration::from_secs(15))
                .build()
                .expect("Failed to create HTTP client"),
            nominatim_url: config.nominatim_url.trim_end_matches('/').to_string(),
            api_fallback: config.geocode_api_fallback,
            cache: DashMap::new(),
            cache_max_entries: config.geocode_cache_max_entries,
            cache_ttl: Duration::from_secs(config.geocode_cache_ttl_s),
        }
    }

    pub fn gazetteer(&self) -> &CityGazetteer {
        &self.gazetteer
    }

    /// Resolve a free-text place name to `(lat, lon)`.
    pub async fn resolve(&self, place: &str) -> Result<(f64, f64), ApiError> {
        let place = place.trim();
        if place.is_empty() {
            return Err(ApiError::bad_request("location must not be empty", None));
        }

        if let Some(coords) = self.gazetteer.lookup_key(place) {
            return Ok(coords);
        }

        if !self.api_fallback {
            return Err(ApiError::UnknownLocation(place.to_string()));
        }

        let key = place.to_uppercase();
        if let Some(entry) = self.cache.get(&key) {
            if entry.fetched_at.elapsed() <= self.cache_ttl {
                return Ok(entry.coords);
            }
        }

        let coords = self.query_nominatim(place).await?;
        self.cache.insert(
            key,
            GeocodeEntry {
                fetched_at: Instant::now(),
                coords,
            },
        );
        self.prune_cache();
        Ok(coords)
    }

    async fn query_nominatim(&self, place: &str) -> Result<(f64, f64), ApiError> {
        let url = format!("{}/search", self.nominatim_url);
        let query = format!("{place}, USA");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", query.as_str()),
                ("format", "json"),
                ("limit", "1"),
                ("countrycodes", "us"),
            ])
            .send()
            .await
            .map_err(|err| {
                tracing::warn!("Nominatim request failed for {place}: {err}");
                ApiError::UnknownLocation(place.to_string())
            })?;

        if !response.status().is_success() {
            tracing::warn!("Nominatim returned {} for {place}", response.status());
            return Err(ApiError::UnknownLocation(place.to_string()));
        }

        let hits: Vec<NominatimHit> = response
            .json()
            .await
            .map_err(|_| ApiError::UnknownLocation(place.to_string()))?;

        hits.first()
            .and_then(|hit| {
                let lat = hit.lat.parse::<f64>().ok()?;
                let lon = hit.lon.parse::<f64>().ok()?;
                Some((lat, lon))
            })
            .ok_or_else(|| ApiError::UnknownLocation(place.to_string()))
    }

    /// Drop expired entries, then oldest-first until under the cap.
    fn prune_cache(&self) {
        let now = Instant::now();
        let mut entries: Vec<(String, Instant)> = self
            .cache
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().fetched_at))
            .collect();

        for (key, fetched_at) in &entries {
            if now.duration_since(*fetched_at) > self.cache_ttl {
                self.cache.remove(key);
            }
        }

        if self.cache.len() <= self.cache_max_entries {
            return;
        }

        entries.sort_by_key(|(_, fetched_at)| *fetched_at);
        for (key, _) in entries {
            if self.cache.len() <= self.cache_max_entries {
                break;
            }
            self.cache.remove(&key);
        }
    }
}
