//! Interactive Leaflet map rendering for a planned trip.

use fuelstop_core::{FuelPlan, RoutePath};
use serde::Serialize;

#[derive(Serialize)]
struct MapStop {
    name: String,
    city: String,
    state: String,
    price: f64,
    lat: f64,
    lon: f64,
    distance_from_start: f64,
}

/// Render a self-contained HTML page showing the route polyline, the
/// endpoints, and every selected fuel stop.
pub fn render(start: &str, finish: &str, route: &RoutePath, plan: &FuelPlan) -> String {
    let start_label = escape_html(start);
    let finish_label = escape_html(finish);
    let (start_lat, start_lon) = route.start();
    let (end_lat, end_lon) = route.end();

    let route_coords: Vec<[f64; 2]> = route
        .points()
        .iter()
        .map(|p| [p.lat, p.lon])
        .collect();
    let stops: Vec<MapStop> = plan
        .fuel_stops
        .iter()
        .map(|stop| MapStop {
            name: stop.name.clone(),
            city: stop.city.clone(),
            state: stop.state.clone(),
            price: stop.price_per_gallon,
            lat: stop.lat,
            lon: stop.lon,
            distance_from_start: stop.distance_from_start_miles,
        })
        .collect();

    // Serialization of plain numbers and strings cannot fail.
    let route_json = serde_json::to_string(&route_coords).unwrap_or_else(|_| "[]".to_string());
    let stops_json = serde_json::to_string(&stops).unwrap_or_else(|_| "[]".to_string());

    let cost_value = plan
        .total_fuel_cost
        .map(|cost| format!("${cost:.2}"))
        .unwrap_or_else(|| "n/a".to_string());

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>Fuel Route: {start_label} to {finish_label}</title>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css" />
    <script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
    <style>
        body {{ margin: 0; padding: 0; font-family: Arial, sans-serif; }}
        #map {{ height: 70vh; width: 100%; }}
        .info-panel {{ padding: 20px; background: #f5f5f5; border-top: 2px solid #333; }}
        .info-panel h2 {{ margin-top: 0; color: #333; }}
        .stats {{ display: flex; flex-wrap: wrap; gap: 20px; margin-bottom: 15px; }}
        .stat-box {{
            background: white;
            padding: 15px;
            border-radius: 8px;
            box-shadow: 0 2px 4px rgba(0,0,0,0.1);
            min-width: 150px;
        }}
        .stat-box h4 {{ margin: 0 0 5px 0; color: #666; font-size: 12px; }}
        .stat-box .value {{ font-size: 24px; font-weight: bold; color: #2196F3; }}
        .fuel-stops-list {{ margin-top: 15px; }}
        .fuel-stop {{
            background: white;
            padding: 10px 15px;
            margin: 5px 0;
            border-radius: 4px;
            border-left: 4px solid #4CAF50;
        }}
        .fuel-stop .name {{ font-weight: bold; }}
        .fuel-stop .details {{ color: #666; font-size: 14px; }}
        .fuel-stop .price {{ color: #4CAF50; font-weight: bold; }}
    </style>
</head>
<body>
    <div id="map"></div>
    <div class="info-panel">
        <h2>Route: {start_label} &rarr; {finish_label}</h2>
        <div class="stats">
            <div class="stat-box">
                <h4>TOTAL DISTANCE</h4>
                <div class="value">{total_distance:.1} mi</div>
            </div>
            <div class="stat-box">
                <h4>DRIVE TIME</h4>
                <div class="value">{total_duration:.1} hrs</div>
            </div>
            <div class="stat-box">
                <h4>FUEL NEEDED</h4>
                <div class="value">{total_gallons:.1} gal</div>
            </div>
            <div class="stat-box">
                <h4>TOTAL FUEL COST</h4>
                <div class="value">{cost_value}</div>
            </div>
            <div class="stat-box">
                <h4>FUEL STOPS</h4>
                <div class="value">{stop_count}</div>
            </div>
        </div>
        <div class="fuel-stops-list" id="fuel-stops-list"></div>
    </div>

    <script>
        var map = L.map('map').setView([{center_lat}, {center_lon}], 6);

        L.tileLayer('https://{{s}}.tile.openstreetmap.org/{{z}}/{{x}}/{{y}}.png', {{
            maxZoom: 19,
            attribution: '&copy; OpenStreetMap contributors'
        }}).addTo(map);

        var routeCoords = {route_json};

        var route = L.polyline(routeCoords, {{
            color: '#2196F3',
            weight: 5,
            opacity: 0.8
        }}).addTo(map);

        map.fitBounds(route.getBounds().pad(0.1));

        var startIcon = L.divIcon({{
            className: 'custom-div-icon',
            html: '<div style="background-color:#4CAF50;width:20px;height:20px;border-radius:50%;border:3px solid white;box-shadow:0 2px 4px rgba(0,0,0,0.3);"></div>',
            iconSize: [26, 26],
            iconAnchor: [13, 13]
        }});
        L.marker([{start_lat}, {start_lon}], {{icon: startIcon}})
            .bindPopup('<b>Start:</b> {start_label}')
            .addTo(map);

        var endIcon = L.divIcon({{
            className: 'custom-div-icon',
            html: '<div style="background-color:#f44336;width:20px;height:20px;border-radius:50%;border:3px solid white;box-shadow:0 2px 4px rgba(0,0,0,0.3);"></div>',
            iconSize: [26, 26],
            iconAnchor: [13, 13]
        }});
        L.marker([{end_lat}, {end_lon}], {{icon: endIcon}})
            .bindPopup('<b>Destination:</b> {finish_label}')
            .addTo(map);

        var fuelStops = {stops_json};
        var fuelStopsList = document.getElementById('fuel-stops-list');

        if (fuelStops.length > 0) {{
            fuelStopsList.innerHTML = '<h3>Recommended Fuel Stops:</h3>';

            fuelStops.forEach(function(stop, index) {{
                var fuelIcon = L.divIcon({{
                    className: 'custom-div-icon',
                    html: '<div style="background-color:#FF9800;width:24px;height:24px;border-radius:50%;border:3px solid white;box-shadow:0 2px 4px rgba(0,0,0,0.3);display:flex;align-items:center;justify-content:center;color:white;font-weight:bold;font-size:12px;">' + (index + 1) + '</div>',
                    iconSize: [30, 30],
                    iconAnchor: [15, 15]
                }});

                L.marker([stop.lat, stop.lon], {{icon: fuelIcon}})
                    .bindPopup('<b>' + stop.name + '</b><br>' + stop.city + ', ' + stop.state + '<br>Price: <b>$' + stop.price.toFixed(3) + '/gal</b><br>Distance from start: ' + stop.distance_from_start.toFixed(1) + ' mi')
                    .addTo(map);

                fuelStopsList.innerHTML += '<div class="fuel-stop">' +
                    '<span class="name">' + (index + 1) + '. ' + stop.name + '</span>' +
                    '<div class="details">' + stop.city + ', ' + stop.state + ' | ' + stop.distance_from_start.toFixed(1) + ' miles from start</div>' +
                    '<div class="price">$' + stop.price.toFixed(3) + ' per gallon</div>' +
                    '</div>';
            }});
        }} else {{
            fuelStopsList.innerHTML = '<p style="color: #4CAF50;">No fuel stops needed - route is within vehicle range.</p>';
        }}
    </script>
</body>
</html>"#,
        total_distance = plan.total_distance_miles,
        total_duration = plan.total_duration_hours,
        total_gallons = plan.total_gallons,
        stop_count = plan.fuel_stops.len(),
        center_lat = (start_lat + end_lat) / 2.0,
        center_lon = (start_lon + end_lon) / 2.0,
    )
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use fuelstop_core::{FuelStop, RoutePoint};

    fn sample_route() -> RoutePath {
        let points = vec![
            RoutePoint { lat: 39.74, lon: -104.99, cumulative_distance_miles: 0.0 },
            RoutePoint { lat: 39.40, lon: -99.80, cumulative_distance_miles: 300.0 },
            RoutePoint { lat: 39.10, lon: -94.58, cumulative_distance_miles: 600.0 },
        ];
        RoutePath::with_cumulative_distances(points, 9.0, 500).unwrap()
    }

    fn sample_plan(stops: Vec<FuelStop>) -> FuelPlan {
        let has_stops = !stops.is_empty();
        FuelPlan {
            total_distance_miles: 600.0,
            total_duration_hours: 9.0,
            fuel_stops: stops,
            total_gallons: 60.0,
            total_fuel_cost: has_stops.then_some(180.0),
            average_price_per_gallon: has_stops.then_some(3.0),
        }
    }

    #[test]
    fn renders_stops_and_stats() {
        let plan = sample_plan(vec![FuelStop {
            id: 42,
            name: "Prairie Plaza".to_string(),
            city: "Hays".to_string(),
            state: "KS".to_string(),
            lat: 38.88,
            lon: -99.32,
            price_per_gallon: 2.95,
            distance_from_start_miles: 310.0,
        }]);
        let html = render("Denver, CO", "Kansas City, MO", &sample_route(), &plan);
        assert!(html.contains("Prairie Plaza"));
        assert!(html.contains("$180.00"));
        assert!(html.contains("Denver, CO"));
    }

    #[test]
    fn zero_stop_plan_shows_no_cost() {
        let html = render("A", "B", &sample_route(), &sample_plan(Vec::new()));
        assert!(html.contains("n/a"));
        assert!(html.contains("var fuelStops = []"));
    }

    #[test]
    fn labels_are_html_escaped() {
        let html = render(
            "<script>alert(1)</script>",
            "B",
            &sample_route(),
            &sample_plan(Vec::new()),
        );
        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;"));
    }
}
