//! Geofence command implementation.

use chrono::{Datelike, Local};
use herbtrace_core::{validate_harvest_location_in, GeoPoint, GeofenceZone};
use tracing::info;

use super::read_json;
use crate::output;

pub fn run(
    zones: String,
    species: String,
    lat: f64,
    lng: f64,
    month: Option<u32>,
    strict: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let zones: Vec<GeofenceZone> = read_json(Some(&zones))?;
    let point = GeoPoint::new(lat, lng)?;
    let month = month.unwrap_or_else(|| Local::now().month());

    let result = validate_harvest_location_in(point, &species, &zones, month);
    info!(
        species = %species,
        month,
        zone = result.zone.as_ref().map(|z| z.id.as_str()).unwrap_or("-"),
        valid = result.is_valid,
        "harvest location checked"
    );

    println!("{}", output::format_json(&result));

    if strict && !result.is_valid {
        std::process::exit(1);
    }

    Ok(())
}
