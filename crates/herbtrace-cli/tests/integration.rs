//! Integration tests for CLI commands.

use herbtrace_canonical::{canonical_bytes, sha256_hex};
use serde_json::{json, Value};
use std::path::Path;
use std::process::{Command, Stdio};
use tempfile::TempDir;

fn run_cli(args: &[&str]) -> (bool, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_herbtrace"))
        .args(["--commit-latency-ms", "0", "--log-level", "warn"])
        .args(args)
        .stdin(Stdio::null())
        .output()
        .expect("Failed to execute CLI");

    let stdout = String::from_utf8(output.stdout).unwrap();
    let stderr = String::from_utf8(output.stderr).unwrap();
    let success = output.status.success();

    (success, stdout, stderr)
}

fn write_json(dir: &TempDir, name: &str, value: &Value) -> String {
    write_text(dir, name, &serde_json::to_string(value).unwrap())
}

fn write_text(dir: &TempDir, name: &str, text: &str) -> String {
    let path = dir.path().join(name);
    std::fs::write(&path, text).unwrap();
    path_str(&path)
}

fn path_str(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

fn hash_entity(dir: &TempDir, name: &str, entity: &Value, stage: &str, previous: Option<&str>) -> Value {
    let input = write_json(dir, name, entity);
    let mut args = vec!["hash", input.as_str(), "--entity-type", stage];
    if let Some(previous) = previous {
        args.extend(["--previous", previous]);
    }
    let (success, stdout, stderr) = run_cli(&args);
    assert!(success, "hash failed: {}", stderr);
    serde_json::from_str(&stdout).unwrap()
}

fn build_chain(dir: &TempDir) -> Vec<Value> {
    let first = hash_entity(
        dir,
        "collection.json",
        &json!({"species": "Tulsi", "quantity_kg": 4.0, "coordinates": {"lat": 26.9, "lng": 75.8}}),
        "collection",
        None,
    );
    let second = hash_entity(
        dir,
        "processing.json",
        &json!({"collection_event_id": "col-1", "step_type": "drying"}),
        "processing",
        first["hash"].as_str(),
    );
    vec![first, second]
}

fn square_zones() -> Value {
    json!([{
        "id": "sq",
        "name": "Square",
        "coordinates": [
            {"lat": 0.0, "lng": 0.0}, {"lat": 0.0, "lng": 10.0},
            {"lat": 10.0, "lng": 10.0}, {"lat": 10.0, "lng": 0.0}
        ],
        "allowed_species": ["Ashwagandha"],
        "seasonal_restrictions": {"Ashwagandha": {"startMonth": 11, "endMonth": 2}}
    }])
}

fn record(seconds: u32, stage: &str, payload: Value) -> Value {
    let mut data = payload;
    data["entity_type"] = json!(stage);
    json!({
        "transaction_id": format!("tx-{}", seconds),
        "entity_type": stage,
        "entity_id": format!("e-{}", seconds),
        "data": data,
        "timestamp": format!("2024-01-01T00:00:{:02}Z", seconds),
        "block_hash": "",
    })
}

fn packaging() -> Value {
    json!({"product_id": "p-1", "batch_ids": ["b-1"], "packaged_at": "2024-01-05T00:00:00Z"})
}

#[test]
fn test_canonicalize_command() {
    let dir = TempDir::new().unwrap();
    let input = write_json(&dir, "in.json", &json!({"b": 2, "a": [1.5, "x"]}));

    let (success, stdout, _) = run_cli(&["canonicalize", &input]);
    assert!(success);
    assert_eq!(stdout.trim(), r#"{"a":["1.5","x"],"b":"2"}"#);
}

#[test]
fn test_hash_command_links_previous() {
    let dir = TempDir::new().unwrap();
    let chain = build_chain(&dir);

    assert_eq!(chain[0]["previous_hash"], json!(""));
    assert_eq!(chain[0]["data"]["entity_type"], json!("collection"));
    assert_eq!(chain[0]["data"]["location"], json!({"lat": 26.9, "lng": 75.8}));
    assert_eq!(chain[1]["previous_hash"], chain[0]["hash"]);
    assert_eq!(chain[1]["hash"].as_str().unwrap().len(), 64);
}

#[test]
fn test_hash_command_rejects_bad_previous() {
    let dir = TempDir::new().unwrap();
    let input = write_json(&dir, "in.json", &json!({"species": "Tulsi"}));

    let (success, _, stderr) = run_cli(&[
        "hash",
        &input,
        "--entity-type",
        "collection",
        "--previous",
        "not-a-hash",
    ]);
    assert!(!success);
    assert!(stderr.contains("Error"));
}

#[test]
fn test_verify_command() {
    let dir = TempDir::new().unwrap();
    let chain = build_chain(&dir);
    let input = write_json(&dir, "chain.json", &json!(chain));

    let (success, stdout, _) = run_cli(&["verify", &input, "--strict"]);
    assert!(success);
    assert!(stdout.contains("TRANSACTION_ID"));
    assert!(stdout.contains("valid"));

    let (success, stdout, _) = run_cli(&["verify", &input, "--json"]);
    assert!(success);
    let parsed: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["is_valid"], json!(true));
    assert_eq!(parsed["transactions"][1]["hash_ok"], json!(true));
}

#[test]
fn test_verify_command_detects_tampering() {
    let dir = TempDir::new().unwrap();
    let mut chain = build_chain(&dir);
    chain[0]["data"]["species"] = json!("Brahmi");
    let input = write_json(&dir, "chain.json", &json!(chain));

    let (success, stdout, _) = run_cli(&["verify", &input, "--json"]);
    assert!(success);
    let parsed: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["is_valid"], json!(false));
    assert_eq!(parsed["errors"], json!(["Hash mismatch at index 0"]));

    let (success, _, _) = run_cli(&["verify", &input, "--strict"]);
    assert!(!success);
}

#[test]
fn test_verify_anchored_segment() {
    let dir = TempDir::new().unwrap();
    let chain = build_chain(&dir);
    let input = write_json(&dir, "segment.json", &json!([chain[1].clone()]));

    let (success, _, _) = run_cli(&["verify", &input, "--strict"]);
    assert!(!success);

    let (success, _, _) = run_cli(&["verify", &input, "--strict", "--anchored"]);
    assert!(success);
}

#[test]
fn test_verify_rejects_malformed_ids_and_nonces() {
    let dir = TempDir::new().unwrap();
    let chain = build_chain(&dir);

    let mut accented = chain.clone();
    accented[0]["id"] = json!("\u{e9}".repeat(23));
    let input = write_json(&dir, "accented.json", &json!(accented));
    let (success, _, stderr) = run_cli(&["verify", &input]);
    assert!(!success);
    assert!(stderr.contains("Error"), "{}", stderr);
    assert!(!stderr.contains("panicked"), "{}", stderr);

    let mut short_nonce = chain;
    let nonce = short_nonce[1]["nonce"].as_str().unwrap()[1..].to_string();
    short_nonce[1]["nonce"] = json!(nonce);
    let input = write_json(&dir, "short_nonce.json", &json!(short_nonce));
    let (success, _, stderr) = run_cli(&["verify", &input, "--json"]);
    assert!(!success);
    assert!(stderr.contains("Error"), "{}", stderr);
}

#[test]
fn test_merkle_command() {
    let dir = TempDir::new().unwrap();
    let items = json!(["a", "b"]);
    let input = write_json(&dir, "items.json", &items);

    let leaf = |v: &Value| sha256_hex(&[&canonical_bytes(v).unwrap()]);
    let (a, b) = (leaf(&items[0]), leaf(&items[1]));
    let expected = sha256_hex(&[a.as_str().as_bytes(), b.as_str().as_bytes()]);

    let (success, stdout, _) = run_cli(&["merkle", &input]);
    assert!(success);
    assert_eq!(stdout.trim(), expected.as_str());

    let (success, stdout, _) = run_cli(&["merkle", &input, "--proof", "1"]);
    assert!(success);
    let parsed: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["root"], json!(expected.as_str()));
    assert_eq!(parsed["proof"]["steps"][0]["side"], json!("left"));

    let (success, _, stderr) = run_cli(&["merkle", &input, "--proof", "2"]);
    assert!(!success);
    assert!(stderr.contains("out of range"));
}

#[test]
fn test_merkle_command_empty_array() {
    let dir = TempDir::new().unwrap();
    let input = write_json(&dir, "empty.json", &json!([]));

    let (success, stdout, _) = run_cli(&["merkle", &input]);
    assert!(success);
    assert_eq!(stdout.trim(), "");
}

#[test]
fn test_validate_command() {
    let dir = TempDir::new().unwrap();
    let records = json!([
        record(1, "packaging", packaging()),
        record(2, "packaging", packaging()),
    ]);
    let input = write_json(&dir, "records.json", &records);

    let (success, stdout, _) = run_cli(&["validate", &input, "--strict", "--fields"]);
    assert!(success);
    assert_eq!(stdout.trim(), "valid");
}

#[test]
fn test_validate_command_reports_order_errors() {
    let dir = TempDir::new().unwrap();
    let testing = json!({
        "sample_id": "s-1", "test_type": "purity", "result": {"value": 99.0},
        "passed": true, "tested_at": "2024-01-03T00:00:00Z", "lab_id": "lab-1"
    });
    let collection = json!({
        "species": "Tulsi", "quantity_kg": 1.0, "harvested_at": "2024-01-01T00:00:00Z",
        "coordinates": {"lat": 1.0, "lng": 1.0}, "collector_id": "c-1"
    });
    let records = json!([
        record(5, "testing", testing),
        record(3, "collection", collection),
    ]);
    let input = write_json(&dir, "records.json", &records);

    let (success, stdout, _) = run_cli(&["validate", &input, "--json"]);
    assert!(success);
    let parsed: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["is_valid"], json!(false));
    assert_eq!(
        parsed["errors"],
        json!([
            "Invalid timestamp order at index 1",
            "Invalid supply chain progression: testing -> collection"
        ])
    );

    let (success, _, _) = run_cli(&["validate", &input, "--strict"]);
    assert!(!success);
}

#[test]
fn test_validate_command_field_checks() {
    let dir = TempDir::new().unwrap();
    let records = json!([record(
        1,
        "packaging",
        json!({"product_id": "", "batch_ids": [], "packaged_at": "2024-01-05T00:00:00Z"})
    )]);
    let input = write_json(&dir, "records.json", &records);

    let (success, stdout, _) = run_cli(&["validate", &input]);
    assert!(success);
    assert_eq!(stdout.trim(), "valid");

    let (success, stdout, _) = run_cli(&["validate", &input, "--fields", "--json"]);
    assert!(success);
    let parsed: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(
        parsed["errors"],
        json!([
            "Record 0: Product is required",
            "Record 0: At least one batch is required"
        ])
    );
}

#[test]
fn test_geofence_command() {
    let dir = TempDir::new().unwrap();
    let zones = write_json(&dir, "zones.json", &square_zones());

    let (success, stdout, _) = run_cli(&[
        "geofence", "--zones", &zones, "--species", "Ashwagandha", "--lat", "5", "--lng", "5",
        "--month", "12", "--strict",
    ]);
    assert!(success);
    let parsed: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["is_valid"], json!(true));
    assert_eq!(parsed["zone"]["id"], json!("sq"));

    let (success, stdout, _) = run_cli(&[
        "geofence", "--zones", &zones, "--species", "Ashwagandha", "--lat", "5", "--lng", "5",
        "--month", "6",
    ]);
    assert!(success);
    let parsed: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["is_valid"], json!(false));
    assert_eq!(
        parsed["errors"],
        json!(["Harvesting Ashwagandha is not allowed in current season"])
    );
}

#[test]
fn test_geofence_command_outside_zone() {
    let dir = TempDir::new().unwrap();
    let zones = write_json(&dir, "zones.json", &square_zones());

    let (success, stdout, _) = run_cli(&[
        "geofence", "--zones", &zones, "--species", "Ashwagandha", "--lat", "-5", "--lng", "15",
        "--month", "1", "--strict",
    ]);
    assert!(!success);
    assert!(stdout.contains("No approved harvesting zone found for Ashwagandha"));
}

#[test]
fn test_geofence_command_rejects_bad_zone_file() {
    let dir = TempDir::new().unwrap();
    let zones = write_json(
        &dir,
        "zones.json",
        &json!([{"id": "c", "name": "C", "coordinates": [{"lat": 1.0, "lng": 1.0}], "radius": -1.0}]),
    );

    let (success, _, stderr) = run_cli(&[
        "geofence", "--zones", &zones, "--species", "Tulsi", "--lat", "1", "--lng", "1",
    ]);
    assert!(!success);
    assert!(stderr.contains("Error"));
}

#[test]
fn test_qr_encode_decode() {
    let dir = TempDir::new().unwrap();
    let label = write_json(
        &dir,
        "label.json",
        &json!({
            "productId": "P-1",
            "name": "Tulsi Drops",
            "type": "tincture",
            "batchIds": ["B-1"],
            "packagingDate": "2024-04-10"
        }),
    );
    let root = sha256_hex(&[b"root"]);

    let (success, encoded, stderr) = run_cli(&[
        "qr", "encode", &label, "--kind", "product", "--hash", root.as_str(),
    ]);
    assert!(success, "encode failed: {}", stderr);
    assert!(!encoded.trim().contains('\n'));

    let text = write_text(&dir, "scanned.txt", &encoded);
    let (success, stdout, _) = run_cli(&["qr", "decode", &text]);
    assert!(success);
    let parsed: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["id"], json!("P-1"));
    assert_eq!(parsed["type"], json!("product"));
    assert_eq!(parsed["hash"], json!(root.as_str()));
    assert_eq!(parsed["data"]["batchIds"], json!(["B-1"]));
}

#[test]
fn test_qr_encode_writes_svg() {
    let dir = TempDir::new().unwrap();
    let label = write_json(
        &dir,
        "batch.json",
        &json!({
            "batchId": "B-7",
            "productName": "Brahmi Churna",
            "manufacturingDate": "2024-05-02",
            "provenanceHash": sha256_hex(&[b"batch"]).as_str()
        }),
    );
    let svg_path = path_str(&dir.path().join("label.svg"));

    let (success, encoded, stderr) = run_cli(&[
        "qr", "encode", &label, "--kind", "batch", "--svg", &svg_path, "--width", "240",
    ]);
    assert!(success, "encode failed: {}", stderr);
    assert!(encoded.contains(r#""type":"batch""#));

    let svg = std::fs::read_to_string(&svg_path).unwrap();
    assert!(svg.starts_with("<svg "));
    assert!(svg.contains(r#"width="240" height="240""#));
    assert!(svg.contains(r##"fill="#2D4A3E""##));

    let (success, _, _) = run_cli(&[
        "qr", "encode", &label, "--kind", "batch", "--svg", &svg_path, "--width", "0",
    ]);
    assert!(!success);
}

#[test]
fn test_qr_decode_rejects_garbage() {
    let dir = TempDir::new().unwrap();
    let text = write_text(&dir, "scanned.txt", "https://example.org/not-a-payload");

    let (success, _, stderr) = run_cli(&["qr", "decode", &text]);
    assert!(!success);
    assert!(stderr.contains("Invalid QR code format"));
}
