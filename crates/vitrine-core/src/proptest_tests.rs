//! Property-based tests for vitrine-core types.
//!
//! These tests use proptest to verify invariants across many randomly generated inputs.

use proptest::prelude::*;

use crate::image::parse_key_value;
use crate::{ImageFilters, ImageMeta, LocationCipher};

/// Strategy for generating storage locations.
fn location_strategy() -> impl Strategy<Value = String> {
    "(file|swift|s3|rbd|http)://[a-z0-9:@./_-]{1,80}"
}

/// Strategy for generating property keys.
fn property_key_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,20}"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn sealed_location_opens_to_original(secret in "[ -~]{1,40}", location in location_strategy()) {
        let cipher = LocationCipher::new(&secret).unwrap();
        let sealed = cipher.encrypt(&location).unwrap();
        prop_assert!(!sealed.contains(&location));
        prop_assert_eq!(cipher.decrypt(&sealed).unwrap(), location);
    }

    #[test]
    fn properties_are_prefixed_in_query(keys in prop::collection::btree_set(property_key_strategy(), 0..8)) {
        let filters = keys
            .iter()
            .fold(ImageFilters::new(), |f, k| f.with_property(k.clone(), "v"));
        let query = filters.to_query();

        prop_assert_eq!(query.len(), keys.len());
        for (name, _) in &query {
            prop_assert!(name.starts_with("property-"));
        }
    }

    #[test]
    fn key_value_splits_on_first_equals(key in property_key_strategy(), value in "[ -~]{0,30}") {
        let (k, v) = parse_key_value(&format!("{key}={value}")).unwrap();
        prop_assert_eq!(k, key);
        prop_assert_eq!(v, value);
    }

    #[test]
    fn meta_json_preserves_properties(key in property_key_strategy(), value in "[a-zA-Z0-9 ]{0,30}") {
        let meta = ImageMeta::new().with_property(key.clone(), value.clone());
        let back: ImageMeta = serde_json::from_str(&serde_json::to_string(&meta).unwrap()).unwrap();
        prop_assert_eq!(back.properties.get(&key), Some(&value));
    }
}
