//! Geofence containment and seasonal harvest windows.
//!
//! Zones are either circles (haversine distance against a radius in metres)
//! or polygons (even-odd ray casting with `x = lng`, `y = lat`). Ray casting
//! is boundary sensitive: for an axis-aligned square, points on the west and
//! south edges count as inside, points on the east and north edges as outside.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, Local};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::errors::CoreError;
use crate::model::GeoPoint;

/// Mean Earth radius used by [`haversine_distance`], in metres.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance between two points, in metres.
pub fn haversine_distance(a: GeoPoint, b: GeoPoint) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let d_phi = (b.lat - a.lat).to_radians();
    let d_lambda = (b.lng - a.lng).to_radians();

    let h = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_M * c
}

/// Even-odd point-in-polygon test. Vertices are used as given, with an edge
/// from the last vertex back to the first. Fewer than three vertices enclose
/// nothing.
pub fn point_in_polygon(point: GeoPoint, polygon: &[GeoPoint]) -> bool {
    if polygon.len() < 3 {
        return false;
    }
    let (x, y) = (point.lng, point.lat);
    let mut inside = false;

    let mut j = polygon.len() - 1;
    for (i, vi) in polygon.iter().enumerate() {
        let vj = polygon[j];
        let (xi, yi, xj, yj) = (vi.lng, vi.lat, vj.lng, vj.lat);
        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }

    inside
}

/// Shape of a zone.
#[derive(Debug, Clone, PartialEq)]
pub enum Boundary {
    /// Polygon vertices in order.
    Polygon(Vec<GeoPoint>),
    /// Circle around `center`.
    Circle {
        /// Centre point.
        center: GeoPoint,
        /// Radius in metres, positive.
        radius_m: f64,
    },
}

impl Boundary {
    /// Circle boundary; the radius must be positive and finite.
    pub fn circle(center: GeoPoint, radius_m: f64) -> Result<Self, CoreError> {
        if !radius_m.is_finite() || radius_m <= 0.0 {
            return Err(CoreError::InvalidZone(format!(
                "radius must be a positive number of metres, got {}",
                radius_m
            )));
        }
        Ok(Boundary::Circle { center, radius_m })
    }

    /// True when `point` lies within the boundary.
    pub fn contains(&self, point: GeoPoint) -> bool {
        match self {
            Boundary::Circle { center, radius_m } => haversine_distance(point, *center) <= *radius_m,
            Boundary::Polygon(vertices) => point_in_polygon(point, vertices),
        }
    }
}

/// Months in which a species may be harvested, inclusive.
///
/// `start_month > end_month` wraps the year boundary (e.g. November to February).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSeason")]
pub struct SeasonWindow {
    /// First permitted month, 1-12.
    pub start_month: u32,
    /// Last permitted month, 1-12.
    pub end_month: u32,
}

#[derive(Deserialize)]
struct RawSeason {
    #[serde(alias = "startMonth")]
    start_month: u32,
    #[serde(alias = "endMonth")]
    end_month: u32,
}

impl TryFrom<RawSeason> for SeasonWindow {
    type Error = CoreError;

    fn try_from(raw: RawSeason) -> Result<Self, Self::Error> {
        SeasonWindow::new(raw.start_month, raw.end_month)
    }
}

impl SeasonWindow {
    /// Validated window; both months must be in 1-12.
    pub fn new(start_month: u32, end_month: u32) -> Result<Self, CoreError> {
        for month in [start_month, end_month] {
            if !(1..=12).contains(&month) {
                return Err(CoreError::InvalidZone(format!(
                    "month must be between 1 and 12, got {}",
                    month
                )));
            }
        }
        Ok(Self {
            start_month,
            end_month,
        })
    }

    /// True when `month` (1-12) falls inside the window.
    pub fn contains(&self, month: u32) -> bool {
        if self.start_month <= self.end_month {
            month >= self.start_month && month <= self.end_month
        } else {
            month >= self.start_month || month <= self.end_month
        }
    }
}

/// Approved harvesting zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawZone", into = "RawZone")]
pub struct GeofenceZone {
    /// Zone identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Administrative region.
    pub region: Option<String>,
    /// Shape.
    pub boundary: Boundary,
    /// Species that may be harvested here.
    pub allowed_species: BTreeSet<String>,
    /// Per-species harvest seasons.
    pub seasonal_restrictions: BTreeMap<String, SeasonWindow>,
}

/// Stored shape of a zone: a circle is `coordinates[0]` plus a non-zero
/// `radius`. A missing or zero radius means `coordinates` is a polygon.
#[derive(Serialize, Deserialize)]
struct RawZone {
    id: String,
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    region: Option<String>,
    #[serde(alias = "polygon")]
    coordinates: Vec<GeoPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    radius: Option<f64>,
    #[serde(default, alias = "allowedSpecies", alias = "species_allowed")]
    allowed_species: BTreeSet<String>,
    #[serde(default, alias = "seasonalRestrictions")]
    seasonal_restrictions: BTreeMap<String, SeasonWindow>,
}

impl TryFrom<RawZone> for GeofenceZone {
    type Error = CoreError;

    fn try_from(raw: RawZone) -> Result<Self, Self::Error> {
        let boundary = match raw.radius {
            Some(radius) if radius != 0.0 => {
                let center = raw.coordinates.first().copied().ok_or_else(|| {
                    CoreError::InvalidZone(format!("zone {} has a radius but no centre", raw.id))
                })?;
                Boundary::circle(center, radius)?
            }
            _ => Boundary::Polygon(raw.coordinates),
        };
        Ok(GeofenceZone {
            id: raw.id,
            name: raw.name,
            region: raw.region,
            boundary,
            allowed_species: raw.allowed_species,
            seasonal_restrictions: raw.seasonal_restrictions,
        })
    }
}

impl From<GeofenceZone> for RawZone {
    fn from(zone: GeofenceZone) -> Self {
        let (coordinates, radius) = match zone.boundary {
            Boundary::Polygon(vertices) => (vertices, None),
            Boundary::Circle { center, radius_m } => (vec![center], Some(radius_m)),
        };
        RawZone {
            id: zone.id,
            name: zone.name,
            region: zone.region,
            coordinates,
            radius,
            allowed_species: zone.allowed_species,
            seasonal_restrictions: zone.seasonal_restrictions,
        }
    }
}

impl GeofenceZone {
    /// Zone with no species and no seasonal rules.
    pub fn new(id: impl Into<String>, name: impl Into<String>, boundary: Boundary) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            region: None,
            boundary,
            allowed_species: BTreeSet::new(),
            seasonal_restrictions: BTreeMap::new(),
        }
    }

    /// Adds a permitted species.
    pub fn allow_species(mut self, species: impl Into<String>) -> Self {
        self.allowed_species.insert(species.into());
        self
    }

    /// Restricts `species` to `window`.
    pub fn with_season(mut self, species: impl Into<String>, window: SeasonWindow) -> Self {
        self.seasonal_restrictions.insert(species.into(), window);
        self
    }

    /// True when `species` is on the allow-list.
    pub fn permits(&self, species: &str) -> bool {
        self.allowed_species.contains(species)
    }
}

/// True when `point` lies inside `zone`.
pub fn is_inside_geofence(point: GeoPoint, zone: &GeofenceZone) -> bool {
    let inside = zone.boundary.contains(point);
    trace!(zone = %zone.id, lat = point.lat, lng = point.lng, inside, "geofence check");
    inside
}

/// Result of a harvest location check.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HarvestValidation {
    /// True iff `errors` is empty.
    pub is_valid: bool,
    /// First zone that permits the species at the point.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone: Option<GeofenceZone>,
    /// Problems found.
    pub errors: Vec<String>,
}

/// Harvest check against the current month in the host's local time zone.
pub fn validate_harvest_location(
    point: GeoPoint,
    species: &str,
    zones: &[GeofenceZone],
) -> HarvestValidation {
    validate_harvest_location_in(point, species, zones, Local::now().month())
}

/// Harvest check for a given calendar month (1-12).
///
/// The first zone in input order that allows `species` and contains `point`
/// is selected. An out-of-season harvest is reported as an error and makes
/// the result invalid.
pub fn validate_harvest_location_in(
    point: GeoPoint,
    species: &str,
    zones: &[GeofenceZone],
    month: u32,
) -> HarvestValidation {
    let Some(zone) = zones
        .iter()
        .find(|zone| zone.permits(species) && is_inside_geofence(point, zone))
    else {
        debug!(species, "no approved zone");
        return HarvestValidation {
            is_valid: false,
            zone: None,
            errors: vec![format!(
                "No approved harvesting zone found for {} at current location",
                species
            )],
        };
    };

    let mut errors = Vec::new();
    if let Some(window) = zone.seasonal_restrictions.get(species) {
        if !window.contains(month) {
            errors.push(format!(
                "Harvesting {} is not allowed in current season",
                species
            ));
        }
    }

    debug!(species, zone = %zone.id, month, errors = errors.len(), "harvest location checked");
    HarvestValidation {
        is_valid: errors.is_empty(),
        zone: Some(zone.clone()),
        errors,
    }
}
