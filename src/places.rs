//! Restaurant discovery around a location.
//!
//! Live results come from an Overpass query selecting restaurants tagged
//! vegetarian or vegan; every field of an element degrades independently
//! (missing address, rating, or hours never drop the record, only a missing
//! name does). A failed or empty query falls back to the static Delhi
//! demonstration list when `places.mock_fallback` is enabled.
//!
//! Geolocation is an injected collaborator. When it fails, the flow keeps
//! going with the demonstration location and list rather than an empty
//! screen; the typed failure is carried along for display.

use async_trait::async_trait;
use chrono::Timelike;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::PlacesConfig;
use crate::errors::{AppError, DeviceError, Result};
use crate::models::{Coordinates, Restaurant};

/// Demonstration location (Delhi) used when geolocation fails.
pub const DELHI: Coordinates = Coordinates {
    lat: 28.6139,
    lng: 77.2090,
};

/// Default open window applied to every record: open 8 AM to 10 PM local
/// time. `opening_hours` tag content is never parsed.
const OPEN_FROM_HOUR: u32 = 8;
const OPEN_UNTIL_HOUR: u32 = 22;

// ============ Geolocation ============

/// Options for a one-shot position fetch.
#[derive(Debug, Clone, Copy)]
pub struct GeoOptions {
    pub high_accuracy: bool,
    pub timeout_secs: u64,
}

/// One-shot position source. Real device bindings live with the caller;
/// tests inject fakes.
#[async_trait]
pub trait GeolocationSource: Send + Sync {
    async fn current_position(&self, options: GeoOptions) -> Result<Coordinates, DeviceError>;
}

/// Outcome of the locate-then-search flow.
#[derive(Debug)]
pub struct NearbySearch {
    pub location: Coordinates,
    pub restaurants: Vec<Restaurant>,
    /// Human-readable geolocation failure, set when the demonstration
    /// location was used instead of a real position.
    pub location_error: Option<String>,
}

/// Locate the user, then search around the position.
///
/// Geolocation failure is not an error: the search continues from [`DELHI`]
/// with the demonstration list and the failure message attached.
///
/// # Errors
///
/// Only the live query can fail here, and only when `mock_fallback` is off.
pub async fn find_nearby_with_location(
    client: &reqwest::Client,
    config: &PlacesConfig,
    geolocation: &dyn GeolocationSource,
) -> Result<NearbySearch> {
    let options = GeoOptions {
        high_accuracy: true,
        timeout_secs: config.geolocation_timeout_secs,
    };

    debug!(
        high_accuracy = options.high_accuracy,
        timeout_secs = options.timeout_secs,
        "requesting device position"
    );

    match geolocation.current_position(options).await {
        Ok(location) => {
            let restaurants = search_nearby(client, config, location).await?;
            Ok(NearbySearch {
                location,
                restaurants,
                location_error: None,
            })
        }
        Err(device) => {
            warn!(error = %device, "geolocation failed, using demonstration location");
            Ok(NearbySearch {
                location: DELHI,
                restaurants: mock_restaurants_near(DELHI, config),
                location_error: Some(device.to_string()),
            })
        }
    }
}

// ============ Live query ============

/// Search for vegetarian restaurants around a location.
///
/// Runs the Overpass query and converts, filters, and sorts the hits. An
/// empty result set or a failed query substitutes the demonstration list
/// when `mock_fallback` is enabled.
///
/// # Errors
///
/// Availability or malformed-response errors from the Overpass call, only
/// when `mock_fallback` is disabled.
pub async fn search_nearby(
    client: &reqwest::Client,
    config: &PlacesConfig,
    location: Coordinates,
) -> Result<Vec<Restaurant>> {
    match query_overpass(client, config, location).await {
        Ok(list) if list.is_empty() && config.mock_fallback => {
            debug!("no live results, using demonstration listings");
            Ok(mock_restaurants_near(location, config))
        }
        Ok(list) => Ok(list),
        Err(e) if config.mock_fallback => {
            warn!(error = %e, "Overpass query failed, using demonstration listings");
            Ok(mock_restaurants_near(location, config))
        }
        Err(e) => Err(e),
    }
}

fn build_overpass_query(location: Coordinates, radius_km: f64, timeout_secs: u64) -> String {
    let radius_m = (radius_km * 1000.0) as u32;
    let around = format!(
        "(around:{radius_m},{lat},{lng})",
        lat = location.lat,
        lng = location.lng
    );
    let filters = [
        "[\"amenity\"=\"restaurant\"][\"diet:vegetarian\"=\"yes\"]",
        "[\"amenity\"=\"restaurant\"][\"diet:vegan\"=\"yes\"]",
        "[\"amenity\"=\"restaurant\"][\"cuisine\"~\"vegetarian|vegan\"]",
    ];

    let mut query = format!("[out:json][timeout:{timeout_secs}];\n(\n");
    for kind in ["node", "way"] {
        for filter in filters {
            query.push_str(&format!("  {kind}{filter}{around};\n"));
        }
    }
    query.push_str(");\nout geom;");
    query
}

async fn query_overpass(
    client: &reqwest::Client,
    config: &PlacesConfig,
    location: Coordinates,
) -> Result<Vec<Restaurant>> {
    let query = build_overpass_query(location, config.radius_km, config.timeout_secs);

    debug!(url = %config.overpass_url, radius_km = config.radius_km, "querying Overpass");

    let response = client
        .post(&config.overpass_url)
        .form(&[("data", query.as_str())])
        .timeout(Duration::from_secs(config.timeout_secs))
        .send()
        .await
        .map_err(|e| AppError::unavailable("Overpass", e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(AppError::unavailable("Overpass", format!("HTTP {status}")));
    }

    let parsed: OverpassResponse = response
        .json()
        .await
        .map_err(|e| AppError::MalformedResponse(format!("Overpass reply was not JSON: {e}")))?;

    let hour = chrono::Local::now().hour();
    let mut restaurants: Vec<Restaurant> = parsed
        .elements
        .iter()
        .enumerate()
        .filter_map(|(index, element)| element_to_restaurant(element, location, index, hour))
        .filter(|restaurant| restaurant.distance <= config.radius_km)
        .collect();
    restaurants.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    restaurants.truncate(config.max_results);
    Ok(restaurants)
}

// ============ Element conversion ============

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<OverpassElement>,
}

#[derive(Debug, Deserialize)]
struct OverpassElement {
    id: Option<u64>,
    lat: Option<f64>,
    lon: Option<f64>,
    center: Option<OverpassCenter>,
    tags: Option<HashMap<String, String>>,
}

#[derive(Debug, Deserialize)]
struct OverpassCenter {
    lat: f64,
    lon: f64,
}

/// Convert one element, degrading each missing field independently.
/// Elements without a `name` tag are skipped entirely.
fn element_to_restaurant(
    element: &OverpassElement,
    origin: Coordinates,
    index: usize,
    local_hour: u32,
) -> Option<Restaurant> {
    let tags = element.tags.as_ref()?;
    let name = tags.get("name")?.clone();

    let lat = element
        .lat
        .or_else(|| element.center.as_ref().map(|c| c.lat))
        .unwrap_or(0.0);
    let lng = element
        .lon
        .or_else(|| element.center.as_ref().map(|c| c.lon))
        .unwrap_or(0.0);
    let coordinates = Coordinates { lat, lng };

    let rating = tags
        .get("contact:rating")
        .or_else(|| tags.get("rating"))
        .and_then(|raw| raw.parse::<f32>().ok())
        .unwrap_or(4.0);
    let price_level = tags
        .get("price:level")
        .and_then(|raw| raw.parse::<u8>().ok())
        .unwrap_or(2);

    Some(Restaurant {
        id: element
            .id
            .map(|id| id.to_string())
            .unwrap_or_else(|| index.to_string()),
        name,
        address: format_address(tags),
        rating,
        price_level,
        distance: haversine_km(origin, coordinates),
        is_open: default_open_window(local_hour),
        cuisine: parse_cuisine(tags.get("cuisine").map(String::as_str)),
        phone: tags
            .get("phone")
            .or_else(|| tags.get("contact:phone"))
            .cloned(),
        website: tags
            .get("website")
            .or_else(|| tags.get("contact:website"))
            .cloned(),
        coordinates,
    })
}

fn format_address(tags: &HashMap<String, String>) -> String {
    let keys = [
        "addr:housenumber",
        "addr:street",
        "addr:city",
        "addr:state",
        "addr:country",
    ];
    let parts: Vec<&str> = keys
        .iter()
        .filter_map(|key| tags.get(*key).map(String::as_str))
        .collect();
    if parts.is_empty() {
        "Address not available".to_string()
    } else {
        parts.join(", ")
    }
}

fn parse_cuisine(raw: Option<&str>) -> Vec<String> {
    let parsed: Vec<String> = raw
        .unwrap_or("vegetarian")
        .split(';')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect();
    if parsed.is_empty() {
        vec!["vegetarian".to_string()]
    } else {
        parsed
    }
}

fn default_open_window(local_hour: u32) -> bool {
    (OPEN_FROM_HOUR..=OPEN_UNTIL_HOUR).contains(&local_hour)
}

/// Great-circle distance in kilometers, rounded to one decimal.
pub fn haversine_km(from: Coordinates, to: Coordinates) -> f64 {
    const EARTH_RADIUS_KM: f64 = 6371.0;
    let d_lat = (to.lat - from.lat).to_radians();
    let d_lng = (to.lng - from.lng).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + from.lat.to_radians().cos() * to.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    (EARTH_RADIUS_KM * c * 10.0).round() / 10.0
}

// ============ Demonstration data ============

/// The static demonstration list with distances recomputed from `origin`,
/// filtered to the configured radius and sorted nearest-first.
pub fn mock_restaurants_near(origin: Coordinates, config: &PlacesConfig) -> Vec<Restaurant> {
    let mut list: Vec<Restaurant> = mock_restaurants()
        .into_iter()
        .map(|mut restaurant| {
            restaurant.distance = haversine_km(origin, restaurant.coordinates);
            restaurant
        })
        .filter(|restaurant| restaurant.distance <= config.radius_km)
        .collect();
    list.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    list
}

fn mock_restaurants() -> Vec<Restaurant> {
    vec![
        Restaurant {
            id: "1".to_string(),
            name: "Green Garden Restaurant".to_string(),
            address: "123 Vegetarian Street, Delhi, India".to_string(),
            rating: 4.5,
            price_level: 2,
            distance: 0.0,
            is_open: true,
            cuisine: vec![
                "Indian".to_string(),
                "North Indian".to_string(),
                "Vegetarian".to_string(),
            ],
            phone: Some("+91-11-12345678".to_string()),
            website: Some("https://greengarden.com".to_string()),
            coordinates: Coordinates {
                lat: 28.6139,
                lng: 77.2090,
            },
        },
        Restaurant {
            id: "2".to_string(),
            name: "Pure Veg Delight".to_string(),
            address: "456 Health Street, Delhi, India".to_string(),
            rating: 4.2,
            price_level: 1,
            distance: 0.0,
            is_open: true,
            cuisine: vec![
                "South Indian".to_string(),
                "Vegetarian".to_string(),
                "Vegan".to_string(),
            ],
            phone: Some("+91-11-87654321".to_string()),
            website: None,
            coordinates: Coordinates {
                lat: 28.6129,
                lng: 77.2295,
            },
        },
        Restaurant {
            id: "3".to_string(),
            name: "Organic Kitchen".to_string(),
            address: "789 Organic Lane, Delhi, India".to_string(),
            rating: 4.7,
            price_level: 3,
            distance: 0.0,
            is_open: false,
            cuisine: vec![
                "Continental".to_string(),
                "Organic".to_string(),
                "Vegan".to_string(),
            ],
            phone: Some("+91-11-11111111".to_string()),
            website: Some("https://organickitchen.com".to_string()),
            coordinates: Coordinates {
                lat: 28.6219,
                lng: 77.2088,
            },
        },
        Restaurant {
            id: "4".to_string(),
            name: "Sattvic Cafe".to_string(),
            address: "321 Wellness Road, Delhi, India".to_string(),
            rating: 4.0,
            price_level: 2,
            distance: 0.0,
            is_open: true,
            cuisine: vec![
                "Sattvic".to_string(),
                "Ayurvedic".to_string(),
                "Vegetarian".to_string(),
            ],
            phone: Some("+91-11-22222222".to_string()),
            website: None,
            coordinates: Coordinates {
                lat: 28.6339,
                lng: 77.2288,
            },
        },
        Restaurant {
            id: "5".to_string(),
            name: "Plant Based Paradise".to_string(),
            address: "654 Green Avenue, Delhi, India".to_string(),
            rating: 4.8,
            price_level: 2,
            distance: 0.0,
            is_open: true,
            cuisine: vec![
                "Plant-based".to_string(),
                "Raw Food".to_string(),
                "Vegan".to_string(),
            ],
            phone: None,
            website: Some("https://plantparadise.com".to_string()),
            coordinates: Coordinates {
                lat: 28.6439,
                lng: 77.2190,
            },
        },
    ]
}

// ============ Map links ============

/// OpenStreetMap directions URL from the user position to a restaurant.
pub fn directions_url(osm_base_url: &str, from: Coordinates, to: Coordinates) -> String {
    format!(
        "{}/directions?from={},{}&to={},{}",
        osm_base_url.trim_end_matches('/'),
        from.lat,
        from.lng,
        to.lat,
        to.lng
    )
}

/// OpenStreetMap URL centered on a single location.
pub fn map_url(osm_base_url: &str, location: Coordinates) -> String {
    format!(
        "{}/?mlat={}&mlon={}&zoom=16",
        osm_base_url.trim_end_matches('/'),
        location.lat,
        location.lng
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> PlacesConfig {
        PlacesConfig::default()
    }

    #[test]
    fn test_haversine_zero_for_same_point() {
        assert_eq!(haversine_km(DELHI, DELHI), 0.0);
    }

    #[test]
    fn test_haversine_delhi_to_mumbai() {
        let mumbai = Coordinates {
            lat: 19.0760,
            lng: 72.8777,
        };
        let distance = haversine_km(DELHI, mumbai);
        assert!(distance > 1100.0 && distance < 1200.0, "got {distance}");
    }

    #[test]
    fn test_mock_distances_recomputed_and_sorted() {
        let list = mock_restaurants_near(DELHI, &config());
        let names: Vec<&str> = list.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(
            names,
            [
                "Green Garden Restaurant",
                "Organic Kitchen",
                "Pure Veg Delight",
                "Sattvic Cafe",
                "Plant Based Paradise",
            ]
        );
        let distances: Vec<f64> = list.iter().map(|r| r.distance).collect();
        assert_eq!(distances, [0.0, 0.9, 2.0, 2.9, 3.5]);
    }

    #[test]
    fn test_mock_list_respects_radius() {
        let mut tight = config();
        tight.radius_km = 1.0;
        let list = mock_restaurants_near(DELHI, &tight);
        assert_eq!(list.len(), 2);
        assert_eq!(list[1].name, "Organic Kitchen");
    }

    #[test]
    fn test_overpass_query_shape() {
        let query = build_overpass_query(DELHI, 5.0, 25);
        assert!(query.starts_with("[out:json][timeout:25];"));
        assert!(query.contains(
            "node[\"amenity\"=\"restaurant\"][\"diet:vegetarian\"=\"yes\"](around:5000,28.6139,77.209);"
        ));
        assert!(query.contains("way[\"amenity\"=\"restaurant\"][\"cuisine\"~\"vegetarian|vegan\"]"));
        assert!(query.ends_with("out geom;"));
        assert_eq!(query.matches("(around:5000,").count(), 6);
    }

    #[test]
    fn test_element_conversion_degrades_missing_fields() {
        let raw = r#"{
            "elements": [
                {"type": "node", "id": 123, "lat": 28.6219, "lon": 77.2088,
                 "tags": {"name": "Veg Corner", "cuisine": "indian;vegan",
                          "addr:street": "MG Road", "addr:city": "Delhi",
                          "contact:phone": "+91-11-5555"}},
                {"type": "node", "id": 124, "lat": 28.62, "lon": 77.21,
                 "tags": {"amenity": "restaurant"}},
                {"type": "way", "id": 125,
                 "center": {"lat": 28.6339, "lon": 77.2288},
                 "tags": {"name": "Sprout House"}}
            ]
        }"#;
        let parsed: OverpassResponse = serde_json::from_str(raw).unwrap();
        let converted: Vec<Restaurant> = parsed
            .elements
            .iter()
            .enumerate()
            .filter_map(|(i, e)| element_to_restaurant(e, DELHI, i, 12))
            .collect();

        // The unnamed element is dropped.
        assert_eq!(converted.len(), 2);

        let corner = &converted[0];
        assert_eq!(corner.id, "123");
        assert_eq!(corner.address, "MG Road, Delhi");
        assert_eq!(corner.cuisine, ["indian", "vegan"]);
        assert_eq!(corner.phone.as_deref(), Some("+91-11-5555"));
        assert_eq!(corner.rating, 4.0);
        assert_eq!(corner.price_level, 2);
        assert_eq!(corner.distance, 0.9);
        assert!(corner.is_open);

        let sprout = &converted[1];
        assert_eq!(sprout.coordinates.lat, 28.6339);
        assert_eq!(sprout.address, "Address not available");
        assert_eq!(sprout.cuisine, ["vegetarian"]);
        assert_eq!(sprout.distance, 2.9);
    }

    #[test]
    fn test_parse_cuisine_splits_and_defaults() {
        assert_eq!(parse_cuisine(Some("indian; vegan ;")), ["indian", "vegan"]);
        assert_eq!(parse_cuisine(Some("")), ["vegetarian"]);
        assert_eq!(parse_cuisine(None), ["vegetarian"]);
    }

    #[test]
    fn test_default_open_window() {
        assert!(!default_open_window(7));
        assert!(default_open_window(8));
        assert!(default_open_window(15));
        assert!(default_open_window(22));
        assert!(!default_open_window(23));
    }

    #[test]
    fn test_map_links() {
        let to = Coordinates {
            lat: 28.6219,
            lng: 77.2088,
        };
        assert_eq!(
            directions_url("https://www.openstreetmap.org", DELHI, to),
            "https://www.openstreetmap.org/directions?from=28.6139,77.209&to=28.6219,77.2088"
        );
        assert_eq!(
            map_url("https://www.openstreetmap.org/", to),
            "https://www.openstreetmap.org/?mlat=28.6219&mlon=77.2088&zoom=16"
        );
    }

    #[tokio::test]
    async fn test_query_failure_without_fallback_is_error() {
        let client = reqwest::Client::new();
        let mut unreachable = config();
        unreachable.overpass_url = "http://127.0.0.1:9".to_string();
        unreachable.timeout_secs = 1;
        unreachable.mock_fallback = false;
        let err = search_nearby(&client, &unreachable, DELHI).await.unwrap_err();
        match err {
            AppError::Unavailable { service, .. } => assert_eq!(service, "Overpass"),
            other => panic!("expected Unavailable, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_query_failure_with_fallback_uses_mocks() {
        let client = reqwest::Client::new();
        let mut unreachable = config();
        unreachable.overpass_url = "http://127.0.0.1:9".to_string();
        unreachable.timeout_secs = 1;
        let list = search_nearby(&client, &unreachable, DELHI).await.unwrap();
        assert_eq!(list.len(), 5);
        assert_eq!(list[0].name, "Green Garden Restaurant");
    }

    struct DeniedGeolocation;

    #[async_trait]
    impl GeolocationSource for DeniedGeolocation {
        async fn current_position(
            &self,
            _options: GeoOptions,
        ) -> Result<Coordinates, DeviceError> {
            Err(DeviceError::LocationDenied)
        }
    }

    #[tokio::test]
    async fn test_geolocation_failure_falls_back_to_demo_location() {
        let client = reqwest::Client::new();
        let search = find_nearby_with_location(&client, &config(), &DeniedGeolocation)
            .await
            .unwrap();
        assert_eq!(search.location.lat, DELHI.lat);
        assert_eq!(search.restaurants.len(), 5);
        let message = search.location_error.unwrap();
        assert!(message.contains("Location access denied"));
    }
}
