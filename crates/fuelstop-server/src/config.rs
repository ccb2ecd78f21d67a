//! Server configuration from environment.

use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    /// OPIS-style retail price CSV, loaded once at startup.
    pub stations_csv_path: String,
    /// City centroid gazetteer JSON (`"CITY, ST": [lat, lon]`).
    pub cities_json_path: String,

    /// GraphHopper is tried first when a key is configured.
    pub graphhopper_api_key: Option<String>,
    pub graphhopper_url: String,
    /// OSRM fallback servers, tried in order after GraphHopper.
    pub osrm_urls: Vec<String>,
    pub provider_timeout_s: u64,

    pub nominatim_url: String,
    pub geocode_user_agent: String,
    /// When false, unknown cities fail immediately instead of hitting
    /// Nominatim (useful for tests and offline runs).
    pub geocode_api_fallback: bool,
    pub geocode_cache_max_entries: usize,
    pub geocode_cache_ttl_s: u64,

    pub default_max_range_miles: f64,
    pub default_mpg: f64,
    pub downsample_threshold: usize,
    pub corridor_radius_miles: f64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            server_port: env_parse("FUELSTOP_PORT", 3000),
            stations_csv_path: env::var("FUELSTOP_STATIONS_CSV")
                .unwrap_or_else(|_| "data/fuel_prices.csv".to_string()),
            cities_json_path: env::var("FUELSTOP_CITIES_JSON")
                .unwrap_or_else(|_| "data/city_coordinates.json".to_string()),
            graphhopper_api_key: env::var("GRAPHHOPPER_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            graphhopper_url: env::var("GRAPHHOPPER_URL")
                .unwrap_or_else(|_| "https://graphhopper.com/api/1/route".to_string()),
            osrm_urls: env::var("OSRM_URLS")
                .map(|urls| {
                    urls.split(',')
                        .map(|url| url.trim().trim_end_matches('/').to_string())
                        .filter(|url| !url.is_empty())
                        .collect()
                })
                .unwrap_or_else(|_| vec!["https://router.project-osrm.org".to_string()]),
            provider_timeout_s: env_parse("FUELSTOP_PROVIDER_TIMEOUT_S", 30),
            nominatim_url: env::var("NOMINATIM_URL")
                .unwrap_or_else(|_| "https://nominatim.openstreetmap.org".to_string()),
            geocode_user_agent: env::var("FUELSTOP_USER_AGENT")
                .unwrap_or_else(|_| "fuelstop-server/0.1".to_string()),
            geocode_api_fallback: env_parse("FUELSTOP_GEOCODE_FALLBACK", 1u8) != 0,
            geocode_cache_max_entries: env_parse("FUELSTOP_GEOCODE_CACHE_MAX", 10_000),
            geocode_cache_ttl_s: env_parse("FUELSTOP_GEOCODE_CACHE_TTL_S", 86_400),
            default_max_range_miles: env_parse("FUELSTOP_MAX_RANGE_MILES", 500.0),
            default_mpg: env_parse("FUELSTOP_MPG", 10.0),
            downsample_threshold: env_parse(
                "FUELSTOP_DOWNSAMPLE_THRESHOLD",
                fuelstop_core::RoutePath::DEFAULT_DOWNSAMPLE_THRESHOLD,
            ),
            corridor_radius_miles: env_parse("FUELSTOP_CORRIDOR_RADIUS_MILES", 20.0),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}
