//! Startup loading of read-only reference tables: the station price CSV
//! and the city coordinate gazetteer. Load failures here are fatal; the
//! service is useless without its reference data.

use anyhow::{Context, Result};
use fuelstop_core::{regions, FuelStation};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

/// One row of the OPIS-style retail price export.
#[derive(Debug, Deserialize)]
struct StationRecord {
    #[serde(rename = "OPIS Truckstop ID")]
    id: u64,
    #[serde(rename = "Truckstop Name")]
    name: String,
    #[serde(rename = "City")]
    city: String,
    #[serde(rename = "State")]
    state: String,
    #[serde(rename = "Retail Price")]
    retail_price: f64,
}

/// City centroid lookup table, keyed `"CITY, ST"`. Station coordinates
/// resolve through this at load time; the price export carries no
/// coordinates of its own.
#[derive(Debug, Default)]
pub struct CityGazetteer {
    cities: HashMap<String, (f64, f64)>,
}

impl CityGazetteer {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("failed to open city gazetteer {}", path.display()))?;
        let raw: HashMap<String, [f64; 2]> = serde_json::from_reader(file)
            .with_context(|| format!("failed to parse city gazetteer {}", path.display()))?;
        let cities = raw
            .into_iter()
            .map(|(key, [lat, lon])| (key.trim().to_uppercase(), (lat, lon)))
            .collect();
        Ok(Self { cities })
    }

    #[cfg(test)]
    pub fn from_entries(entries: &[(&str, f64, f64)]) -> Self {
        Self {
            cities: entries
                .iter()
                .map(|&(key, lat, lon)| (key.to_uppercase(), (lat, lon)))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    pub fn lookup(&self, city: &str, state: &str) -> Option<(f64, f64)> {
        self.lookup_key(&format!("{}, {}", city.trim(), state.trim()))
    }

    /// Lookup by a raw `"City, ST"` string, case-insensitive.
    pub fn lookup_key(&self, key: &str) -> Option<(f64, f64)> {
        self.cities.get(&normalize_key(key)).copied()
    }
}

fn normalize_key(key: &str) -> String {
    key.split(',')
        .map(str::trim)
        .collect::<Vec<_>>()
        .join(", ")
        .to_uppercase()
}

/// Load the station table, resolving coordinates through the gazetteer.
///
/// Mirrors the source export's quirks: rows outside the US state list
/// are dropped, duplicate station ids keep the minimum retail price, and
/// rows whose city the gazetteer does not know are dropped with a
/// warning tally.
pub fn load_stations(path: impl AsRef<Path>, gazetteer: &CityGazetteer) -> Result<Vec<FuelStation>> {
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("failed to open station table {}", path.display()))?;

    let mut by_id: HashMap<u64, FuelStation> = HashMap::new();
    let mut order: Vec<u64> = Vec::new();
    let mut unknown_cities = 0usize;
    let mut skipped_states = 0usize;

    for record in reader.deserialize() {
        let record: StationRecord =
            record.with_context(|| format!("malformed row in {}", path.display()))?;

        if !regions::is_us_state(&record.state) {
            skipped_states += 1;
            continue;
        }

        let Some((lat, lon)) = gazetteer.lookup(&record.city, &record.state) else {
            unknown_cities += 1;
            continue;
        };

        match by_id.get_mut(&record.id) {
            Some(existing) => {
                if record.retail_price < existing.price_per_gallon {
                    existing.price_per_gallon = record.retail_price;
                }
            }
            None => {
                order.push(record.id);
                by_id.insert(
                    record.id,
                    FuelStation {
                        id: record.id,
                        name: record.name,
                        city: record.city,
                        state: record.state,
                        lat,
                        lon,
                        price_per_gallon: record.retail_price,
                    },
                );
            }
        }
    }

    if unknown_cities > 0 || skipped_states > 0 {
        tracing::warn!(
            unknown_cities,
            skipped_states,
            "dropped station rows during load"
        );
    }

    // Stable first-seen order keeps downstream tie-breaks deterministic
    // across restarts.
    let stations = order
        .into_iter()
        .filter_map(|id| by_id.remove(&id))
        .collect();
    Ok(stations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!(
            "fuelstop-test-{}-{name}",
            std::process::id()
        ));
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes()).expect("write temp file");
        path
    }

    fn gazetteer() -> CityGazetteer {
        CityGazetteer::from_entries(&[
            ("BIG CABIN, OK", 36.53, -95.22),
            ("AMARILLO, TX", 35.22, -101.83),
        ])
    }

    #[test]
    fn loads_and_filters_station_rows() {
        let csv = "\
OPIS Truckstop ID,Truckstop Name,Address,City,State,Rack ID,Retail Price
100,BIG CABIN TRAVEL PLAZA,I-44 EXIT 283,Big Cabin,OK,307,3.15
200,LOVE'S #278,I-40 EXIT 74,Amarillo,TX,601,2.95
300,MAPLE LEAF STOP,HWY 401,Toronto,ON,900,3.50
400,GHOST TOWN FUEL,MAIN ST,Nowhereville,TX,601,2.80
";
        let path = write_temp("stations.csv", csv);
        let stations = load_stations(&path, &gazetteer()).unwrap();
        std::fs::remove_file(&path).ok();

        // Canadian row and unknown-city row are dropped.
        assert_eq!(stations.len(), 2);
        assert_eq!(stations[0].id, 100);
        assert_eq!(stations[1].id, 200);
        assert!((stations[1].lat - 35.22).abs() < 1e-9);
    }

    #[test]
    fn duplicate_ids_keep_minimum_price() {
        let csv = "\
OPIS Truckstop ID,Truckstop Name,Address,City,State,Rack ID,Retail Price
100,BIG CABIN TRAVEL PLAZA,I-44 EXIT 283,Big Cabin,OK,307,3.15
100,BIG CABIN TRAVEL PLAZA,I-44 EXIT 283,Big Cabin,OK,308,3.05
";
        let path = write_temp("stations-dup.csv", csv);
        let stations = load_stations(&path, &gazetteer()).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(stations.len(), 1);
        assert!((stations[0].price_per_gallon - 3.05).abs() < 1e-9);
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(load_stations("/nonexistent/stations.csv", &gazetteer()).is_err());
    }

    #[test]
    fn gazetteer_lookup_is_case_insensitive() {
        let g = gazetteer();
        assert!(g.lookup("big cabin", "ok").is_some());
        assert!(g.lookup_key("amarillo,tx").is_some());
        assert!(g.lookup("Springfield", "IL").is_none());
    }
}
