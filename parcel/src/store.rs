//! Static definitions of the two polygons and the initial map view.
//!
//! The built-in data describes a proposed development site inside a
//! rectangular planning boundary, in Web Mercator meters. A host may replace
//! any section by loading JSON with [`GeometryStore::from_json`].

use crate::error::ParcelError;
use crate::model::{Attributes, Color, FillPattern, Ring, Style};
use serde::{Deserialize, Serialize};
use serde_json::json;

pub const DEFAULT_MARKER_KEY: &str = "newDevelopment";

const EDITABLE_VERTICES: [[f64; 2]; 5] = [
    [-13040270.324055556, 4040357.7882640623],
    [-13038653.725694647, 4040689.513023534],
    [-13038063.204863824, 4038017.2028549737],
    [-13040097.818223165, 4037990.629044359],
    [-13040270.324055556, 4040357.7882640623],
];

const BOUNDARY_VERTICES: [[f64; 2]; 5] = [
    [-13048353.166569024, 4041363.935436187],
    [-13036929.861699322, 4041363.935436187],
    [-13036929.861699322, 4030232.5692555667],
    [-13048353.166569024, 4030232.5692555667],
    [-13048353.166569024, 4041363.935436187],
];

/// Initial camera and basemap. Environment independent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Longitude, latitude.
    pub center: [f64; 2],
    pub zoom: u8,
    pub basemap: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        MapConfig {
            center: [-117.1708, 34.0574],
            zoom: 12,
            basemap: "streets-night-vector".to_string(),
        }
    }
}

/// One polygon's vertex data, symbol and attributes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegionDef {
    pub rings: Vec<Ring>,
    pub symbol: Style,
    #[serde(default)]
    pub attributes: Attributes,
}

impl RegionDef {
    fn editable() -> Self {
        let mut attributes = Attributes::new();
        attributes.insert(DEFAULT_MARKER_KEY.to_string(), json!("new store"));
        RegionDef {
            rings: vec![Ring::from_coords(&EDITABLE_VERTICES)],
            symbol: Style::simple_fill(
                Color::rgba(0, 170, 255, 0.8),
                FillPattern::Solid,
                2.0,
                Color::WHITE,
            ),
            attributes,
        }
    }

    fn boundary() -> Self {
        RegionDef {
            rings: vec![Ring::from_coords(&BOUNDARY_VERTICES)],
            symbol: Style::simple_fill(
                Color::rgba(255, 255, 255, 0.0),
                FillPattern::Solid,
                2.0,
                Color::WHITE,
            ),
            attributes: Attributes::new(),
        }
    }

    fn normalize(&mut self, region: &'static str) -> Result<(), ParcelError> {
        if self.rings.is_empty() {
            return Err(ParcelError::InvalidRing { region, reason: "no rings" });
        }
        for ring in &mut self.rings {
            ring.close();
            if let Some(reason) = ring.defect() {
                return Err(ParcelError::InvalidRing { region, reason });
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GeometryStore {
    map: MapConfig,
    marker_key: String,
    editable: RegionDef,
    boundary: RegionDef,
}

impl Default for GeometryStore {
    fn default() -> Self {
        GeometryStore {
            map: MapConfig::default(),
            marker_key: DEFAULT_MARKER_KEY.to_string(),
            editable: RegionDef::editable(),
            boundary: RegionDef::boundary(),
        }
    }
}

impl GeometryStore {
    /// Load a store from JSON. Missing sections keep their defaults and open
    /// rings are closed.
    pub fn from_json(text: &str) -> Result<Self, ParcelError> {
        let mut store: GeometryStore = serde_json::from_str(text)?;
        store.editable.normalize("editable")?;
        store.boundary.normalize("boundary")?;
        if !crate::model::marker_set(Some(&store.editable.attributes), &store.marker_key) {
            return Err(ParcelError::MissingMarker { key: store.marker_key });
        }
        Ok(store)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    pub fn editable_region(&self) -> &RegionDef {
        &self.editable
    }

    pub fn boundary(&self) -> &RegionDef {
        &self.boundary
    }

    pub fn map(&self) -> &MapConfig {
        &self.map
    }

    pub fn marker_key(&self) -> &str {
        &self.marker_key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let s = GeometryStore::default();
        for ring in s.editable_region().rings.iter().chain(&s.boundary().rings) {
            assert_eq!(ring.defect(), None);
        }
        assert!(s.editable_region().attributes.contains_key(s.marker_key()));
        assert!(s.boundary().attributes.is_empty());
        assert_eq!(s.map().zoom, 12);
    }

    #[test]
    fn default_survives_json() {
        let s = GeometryStore::default();
        let back = GeometryStore::from_json(&s.to_json()).unwrap();
        assert_eq!(back, s);
    }
}
