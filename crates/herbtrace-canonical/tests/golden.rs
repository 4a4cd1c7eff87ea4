use herbtrace_canonical::{
    canonical_bytes, sha256_hex, CanonicalizationError, Canonicalizer, EntityId, HashString,
    Timestamp, TransactionId,
};
use serde::Serialize;
use serde_json::json;

#[test]
fn hash_string_serializes_as_bare_hex() {
    let hash = sha256_hex(&[b"abc"]);
    assert_eq!(
        serde_json::to_string(&hash).unwrap(),
        r#""ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad""#
    );
    assert_eq!(serde_json::to_string(&HashString::empty()).unwrap(), r#""""#);
}

#[test]
fn canonical_bytes_are_independent_of_key_order() {
    let a = json!({"species": "tulsi", "quantity_kg": 3, "notes": {"z": 1, "a": 2}});
    let b = json!({"notes": {"a": 2, "z": 1}, "quantity_kg": 3, "species": "tulsi"});
    assert_eq!(canonical_bytes(&a).unwrap(), canonical_bytes(&b).unwrap());
}

#[test]
fn canonicalizer_produces_golden_bytes() {
    let value = json!({"lng": 75.5, "lat": 26, "tags": ["b", "a"]});
    let bytes = Canonicalizer::new().canonicalize(&value).unwrap();
    assert_eq!(bytes, br#"{"lat":"26","lng":"75.5","tags":["b","a"]}"#.to_vec());
}

#[test]
fn serializable_structs_canonicalize_like_their_json() {
    #[derive(Serialize)]
    struct Sample {
        transaction_id: TransactionId,
        entity_id: EntityId,
        timestamp: Timestamp,
    }

    let sample = Sample {
        transaction_id: TransactionId::parse("tx-1").unwrap(),
        entity_id: EntityId::parse("collection-7").unwrap(),
        timestamp: Timestamp::parse("2024-01-01T00:00:00Z").unwrap(),
    };

    let bytes = canonical_bytes(&sample).unwrap();
    assert_eq!(
        String::from_utf8(bytes).unwrap(),
        r#"{"entity_id":"collection-7","timestamp":"2024-01-01T00:00:00.000Z","transaction_id":"tx-1"}"#
    );
}

#[test]
fn non_finite_floats_are_rejected_not_nulled() {
    assert!(matches!(
        canonical_bytes(&f64::NAN),
        Err(CanonicalizationError::NonFiniteNumber(_))
    ));

    #[derive(Serialize)]
    struct Harvest {
        species: &'static str,
        quantity_kg: f64,
    }

    let err = canonical_bytes(&Harvest {
        species: "tulsi",
        quantity_kg: f64::INFINITY,
    })
    .unwrap_err();
    assert_eq!(err.to_string(), "non-finite number detected at quantity_kg");
}
