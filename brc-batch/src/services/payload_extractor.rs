//! Lenient payload field extraction
//!
//! Expected payload shape: a JSON object with a `data` array whose first
//! element carries a `shipment` with a `brand` string and a `lots` array,
//! each lot holding a `good.merchantGoodsId`.
//!
//! A malformed root is a parse error carried by both fields. Past that,
//! the two extractions are independent and lenient: an absent or
//! wrong-typed segment is `Missing`/`NoLots`, not an error, so one broken
//! field never hides the other.

use crate::types::{BrandField, ExtractedPayload, GoodIdsField};
use serde_json::Value;

/// Extract classification fields from a downloaded object's bytes.
/// Never fails past this boundary.
pub fn extract(bytes: &[u8]) -> ExtractedPayload {
    let root: Value = match serde_json::from_slice(bytes) {
        Ok(value) => value,
        Err(e) => {
            return ExtractedPayload {
                brand: BrandField::ParseFailed(e.to_string()),
                good_ids: GoodIdsField::Error(e.to_string()),
            }
        }
    };

    ExtractedPayload {
        brand: extract_brand(&root),
        good_ids: extract_good_ids(&root),
    }
}

fn shipment(root: &Value) -> Option<&Value> {
    root.get("data")?.get(0)?.get("shipment")
}

fn extract_brand(root: &Value) -> BrandField {
    match shipment(root).and_then(|s| s.get("brand")).and_then(Value::as_str) {
        Some(brand) => BrandField::Found(brand.to_string()),
        None => BrandField::Missing,
    }
}

fn extract_good_ids(root: &Value) -> GoodIdsField {
    let lots = match shipment(root).and_then(|s| s.get("lots")) {
        None | Some(Value::Null) => return GoodIdsField::NoLots,
        Some(Value::Array(lots)) => lots,
        Some(_) => return GoodIdsField::Error("lots is not an array".to_string()),
    };
    if lots.is_empty() {
        return GoodIdsField::NoLots;
    }

    // Dedup preserving first-seen order; lot counts are small
    let mut ids: Vec<String> = Vec::new();
    for lot in lots {
        let id = lot
            .get("good")
            .and_then(|g| g.get("merchantGoodsId"))
            .and_then(Value::as_str)
            .map(str::trim)
            .unwrap_or("");
        if !id.is_empty() && !ids.iter().any(|seen| seen == id) {
            ids.push(id.to_string());
        }
    }
    GoodIdsField::Found(ids)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(shipment: &str) -> Vec<u8> {
        format!(r#"{{"data":[{{"shipment":{shipment}}}]}}"#).into_bytes()
    }

    #[test]
    fn test_full_payload() {
        let bytes = payload(
            r#"{"brand":"Digitalpay","lots":[
                {"good":{"merchantGoodsId":"A"}},
                {"good":{"merchantGoodsId":"B"}}
            ]}"#,
        );
        let extracted = extract(&bytes);
        assert_eq!(extracted.brand, BrandField::Found("Digitalpay".into()));
        assert_eq!(
            extracted.good_ids,
            GoodIdsField::Found(vec!["A".into(), "B".into()])
        );
    }

    #[test]
    fn test_good_ids_dedup_preserves_first_seen_order() {
        let bytes = payload(
            r#"{"brand":"x","lots":[
                {"good":{"merchantGoodsId":"A"}},
                {"good":{"merchantGoodsId":"B"}},
                {"good":{"merchantGoodsId":"A"}}
            ]}"#,
        );
        let extracted = extract(&bytes);
        assert_eq!(extracted.good_ids.render(), "A, B");
    }

    #[test]
    fn test_malformed_json_marks_both_fields() {
        let extracted = extract(b"{\"data\":[{\"ship");
        assert!(matches!(extracted.brand, BrandField::ParseFailed(_)));
        assert!(matches!(extracted.good_ids, GoodIdsField::Error(_)));
        assert_eq!(extracted.brand.render(), "parse error");
        assert_eq!(extracted.good_ids.render(), "error");
    }

    #[test]
    fn test_missing_brand_segment() {
        let extracted = extract(&payload(r#"{"lots":[{"good":{"merchantGoodsId":"A"}}]}"#));
        assert_eq!(extracted.brand, BrandField::Missing);
        // Brand absence does not affect good-id extraction
        assert_eq!(extracted.good_ids, GoodIdsField::Found(vec!["A".into()]));
    }

    #[test]
    fn test_non_string_brand_is_missing_not_error() {
        let extracted = extract(&payload(r#"{"brand":42,"lots":[]}"#));
        assert_eq!(extracted.brand, BrandField::Missing);
    }

    #[test]
    fn test_absent_or_empty_lots() {
        assert_eq!(
            extract(&payload(r#"{"brand":"x"}"#)).good_ids,
            GoodIdsField::NoLots
        );
        assert_eq!(
            extract(&payload(r#"{"brand":"x","lots":[]}"#)).good_ids,
            GoodIdsField::NoLots
        );
        assert_eq!(
            extract(&payload(r#"{"brand":"x","lots":null}"#)).good_ids,
            GoodIdsField::NoLots
        );
        assert_eq!(extract(br#"{"data":[]}"#).good_ids, GoodIdsField::NoLots);
    }

    #[test]
    fn test_lots_not_an_array_is_error_distinct_from_empty() {
        let extracted = extract(&payload(r#"{"brand":"x","lots":"oops"}"#));
        assert!(matches!(extracted.good_ids, GoodIdsField::Error(_)));
        // The broken lots field does not hide the brand
        assert_eq!(extracted.brand, BrandField::Found("x".into()));
    }

    #[test]
    fn test_lots_without_usable_ids_is_empty_found() {
        let bytes = payload(r#"{"brand":"x","lots":[{"good":{}},{"good":{"merchantGoodsId":""}}]}"#);
        let extracted = extract(&bytes);
        assert_eq!(extracted.good_ids, GoodIdsField::Found(vec![]));
        assert_eq!(extracted.good_ids.render(), "");
    }
}
