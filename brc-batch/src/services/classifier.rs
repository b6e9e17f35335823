//! Brand classification
//!
//! A record is a problem when its brand was extracted but does not match
//! the expected brand, case-insensitively. Records whose file never made
//! it to the local cache stay `Unknown` so they never show up as false
//! positives. Missing and unparseable brands fail the equality test and
//! are flagged.

use crate::types::{BrandField, ObjectKey, Problem};

pub struct Classifier {
    expected_brand: String,
}

impl Classifier {
    pub fn new(expected_brand: impl Into<String>) -> Classifier {
        Classifier {
            expected_brand: expected_brand.into(),
        }
    }

    /// Derive the problem flag and the order id for one record.
    /// The order id is the key's file stem parsed as an integer.
    pub fn classify(&self, brand: &BrandField, key: &ObjectKey) -> (Problem, Option<i64>) {
        let problem = match brand {
            BrandField::Found(b) if b.eq_ignore_ascii_case(&self.expected_brand) => Problem::No,
            BrandField::Unavailable => Problem::Unknown,
            _ => Problem::Yes,
        };
        let order_id = key.file_stem().parse::<i64>().ok();
        (problem, order_id)
    }
}
