//! services/api/src/web/buildings.rs
//!
//! Loads the static building reference data consumed by the map UI.
//! Read once at startup; the core never mutates it.

use crate::error::ApiError;
use campusflow_core::domain::Building;
use std::path::Path;

/// Reads the building list from a JSON file.
pub fn load_buildings(path: &Path) -> Result<Vec<Building>, ApiError> {
    let raw = std::fs::read_to_string(path)?;
    serde_json::from_str(&raw).map_err(|e| {
        ApiError::Internal(format!("invalid buildings file {}: {e}", path.display()))
    })
}

#[cfg(test)]
mod tests {
    use campusflow_core::domain::{Building, BuildingStatus};

    #[test]
    fn parses_the_reference_data_shape() {
        let raw = r#"[
            {
                "id": "ikb",
                "name": "Irving K. Barber Learning Centre",
                "lat": 49.2606,
                "lon": -123.246,
                "status": "busy",
                "amenities": ["study rooms", "outlets"]
            },
            {
                "id": "lib",
                "name": "Main Library",
                "lat": 49.2648,
                "lon": -123.2534,
                "status": "quiet"
            }
        ]"#;
        let buildings: Vec<Building> = serde_json::from_str(raw).unwrap();
        assert_eq!(buildings.len(), 2);
        assert_eq!(buildings[0].status, BuildingStatus::Busy);
        assert_eq!(buildings[0].amenities.len(), 2);
        // amenities are optional in the file
        assert!(buildings[1].amenities.is_empty());
    }
}
