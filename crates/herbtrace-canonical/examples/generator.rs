use herbtrace_canonical::{sha256_hex, Canonicalizer};
use serde_json::json;

fn main() {
    let canonicalizer = Canonicalizer::new();
    let payload = json!({
        "entity_type": "collection",
        "species": "Ashwagandha",
        "botanical_name": "Withania somnifera",
        "quantity_kg": 12.5,
        "harvested_at": "2025-11-02T05:30:00.000Z",
        "coordinates": { "lat": 26.9124, "lng": 75.7873 }
    });

    match canonicalizer.canonicalize(&payload) {
        Ok(bytes) => {
            println!("{}", String::from_utf8_lossy(&bytes));
            println!("sha256: {}", sha256_hex(&[&bytes]));
        }
        Err(err) => {
            eprintln!("canonicalization failed: {}", err);
            std::process::exit(1);
        }
    }
}
