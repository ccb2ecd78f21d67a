//! External routing providers with an explicit fallback chain.
//!
//! GraphHopper is the primary (fastest, keyed); each configured OSRM
//! server is tried after it. Provider failure here is typically
//! availability or quota, not a transient blip, so the chain moves on
//! to the next provider instead of retrying with backoff.

use crate::config::Config;
use crate::error::ApiError;
use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

const METERS_PER_MILE: f64 = 1609.34;

/// Raw geometry and totals as reported by a routing provider.
#[derive(Debug, Clone)]
pub struct RawRoute {
    /// Ordered `(lat, lon)` polyline.
    pub points: Vec<(f64, f64)>,
    pub distance_miles: f64,
    pub duration_hours: f64,
}

#[derive(Debug, Clone)]
enum Provider {
    GraphHopper { url: String, api_key: String },
    Osrm { base_url: String },
}

impl Provider {
    fn label(&self) -> String {
        match self {
            Self::GraphHopper { .. } => "graphhopper".to_string(),
            Self::Osrm { base_url } => format!("osrm ({base_url})"),
        }
    }
}

/// Ordered list of providers tried in sequence until one succeeds.
pub struct RoutingChain {
    client: Client,
    providers: Vec<Provider>,
}

impl RoutingChain {
    pub fn from_config(config: &Config) -> Self {
        let mut providers = Vec::new();
        if let Some(api_key) = config.graphhopper_api_key.clone() {
            providers.push(Provider::GraphHopper {
                url: config.graphhopper_url.clone(),
                api_key,
            });
        }
        for base_url in &config.osrm_urls {
            providers.push(Provider::Osrm {
                base_url: base_url.clone(),
            });
        }

        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(config.provider_timeout_s))
                .build()
                .expect("Failed to create HTTP client"),
            providers,
        }
    }

    /// Fetch a driving route between two coordinates, falling through
    /// the provider chain on failure.
    pub async fn fetch_route(
        &self,
        start: (f64, f64),
        end: (f64, f64),
    ) -> Result<RawRoute, ApiError> {
        if self.providers.is_empty() {
            return Err(ApiError::Provider("no routing providers configured".to_string()));
        }

        let mut last_error = String::new();
        for provider in &self.providers {
            let result = match provider {
                Provider::GraphHopper { url, api_key } => {
                    self.try_graphhopper(url, api_key, start, end).await
                }
                Provider::Osrm { base_url } => self.try_osrm(base_url, start, end).await,
            };

            match result {
                Ok(route) => {
                    tracing::debug!(
                        provider = %provider.label(),
                        distance_miles = route.distance_miles,
                        "routing provider succeeded"
                    );
                    return Ok(route);
                }
                Err(err) => {
                    tracing::warn!(
                        provider = %provider.label(),
                        "routing provider failed: {err:#}"
                    );
                    last_error = format!("{err:#}");
                }
            }
        }

        Err(ApiError::Provider(last_error))
    }

    async fn try_graphhopper(
        &self,
        url: &str,
        api_key: &str,
        start: (f64, f64),
        end: (f64, f64),
    ) -> Result<RawRoute> {
        let start_point = format!("{},{}", start.0, start.1);
        let end_point = format!("{},{}", end.0, end.1);
        let response = self
            .client
            .get(url)
            .query(&[
                ("point", start_point.as_str()),
                ("point", end_point.as_str()),
                ("vehicle", "car"),
                ("locale", "en"),
                ("calc_points", "true"),
                ("points_encoded", "false"),
                ("key", api_key),
            ])
            .send()
            .await
            .context("GraphHopper request failed")?;

        if !response.status().is_success() {
            return Err(anyhow!("GraphHopper returned {}", response.status()));
        }

        let payload: GraphHopperResponse = response
            .json()
            .await
            .context("failed to parse GraphHopper response")?;

        if let Some(message) = payload.message {
            return Err(anyhow!("GraphHopper error: {message}"));
        }
        let path = payload
            .paths
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("GraphHopper returned no paths"))?;

        Ok(RawRoute {
            points: lonlat_to_latlon(path.points.coordinates),
            distance_miles: path.distance / METERS_PER_MILE,
            // GraphHopper reports milliseconds.
            duration_hours: path.time as f64 / 1000.0 / 3600.0,
        })
    }

    async fn try_osrm(
        &self,
        base_url: &str,
        start: (f64, f64),
        end: (f64, f64),
    ) -> Result<RawRoute> {
        // OSRM takes lon,lat pairs.
        let url = format!(
            "{}/route/v1/driving/{},{};{},{}",
            base_url, start.1, start.0, end.1, end.0
        );
        let response = self
            .client
            .get(&url)
            .query(&[("overview", "full"), ("geometries", "geojson")])
            .send()
            .await
            .context("OSRM request failed")?;

        if !response.status().is_success() {
            return Err(anyhow!("OSRM returned {}", response.status()));
        }

        let payload: OsrmResponse = response
            .json()
            .await
            .context("failed to parse OSRM response")?;

        if payload.code != "Ok" {
            return Err(anyhow!("OSRM error code: {}", payload.code));
        }
        let route = payload
            .routes
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("OSRM returned no routes"))?;

        Ok(RawRoute {
            points: lonlat_to_latlon(route.geometry.coordinates),
            distance_miles: route.distance / METERS_PER_MILE,
            duration_hours: route.duration / 3600.0,
        })
    }
}

fn lonlat_to_latlon(coordinates: Vec<[f64; 2]>) -> Vec<(f64, f64)> {
    coordinates
        .into_iter()
        .map(|[lon, lat]| (lat, lon))
        .collect()
}

#[derive(Debug, Deserialize)]
struct GraphHopperResponse {
    #[serde(default)]
    paths: Vec<GraphHopperPath>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GraphHopperPath {
    distance: f64,
    time: i64,
    points: GeoJsonLine,
}

#[derive(Debug, Deserialize)]
struct OsrmResponse {
    code: String,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    distance: f64,
    duration: f64,
    geometry: GeoJsonLine,
}

#[derive(Debug, Deserialize)]
struct GeoJsonLine {
    #[serde(default)]
    coordinates: Vec<[f64; 2]>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geojson_coordinates_flip_to_lat_lon() {
        let points = lonlat_to_latlon(vec![[-104.99, 39.74], [-94.58, 39.10]]);
        assert_eq!(points[0], (39.74, -104.99));
        assert_eq!(points[1], (39.10, -94.58));
    }

    #[test]
    fn chain_skips_graphhopper_without_key() {
        let mut config = Config::from_env();
        config.graphhopper_api_key = None;
        config.osrm_urls = vec!["http://127.0.0.1:9".to_string()];
        let chain = RoutingChain::from_config(&config);
        assert_eq!(chain.providers.len(), 1);
        assert!(matches!(chain.providers[0], Provider::Osrm { .. }));
    }

    #[tokio::test]
    async fn exhausted_chain_surfaces_provider_error() {
        let mut config = Config::from_env();
        config.graphhopper_api_key = None;
        // Unroutable loopback port: fails fast without leaving the host.
        config.osrm_urls = vec!["http://127.0.0.1:9".to_string()];
        config.provider_timeout_s = 2;
        let chain = RoutingChain::from_config(&config);
        let err = chain
            .fetch_route((39.7392, -104.9903), (39.0997, -94.5786))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Provider(_)));
    }
}
