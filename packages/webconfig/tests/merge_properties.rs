//! Property tests for the combine primitives.

use cms_webconfig::merge::{append_if_absent, union_list, union_map};
use cms_webconfig::{Combine, GenericConfigElement, LanguagesConfigElement};
use indexmap::IndexMap;
use proptest::prelude::*;

fn locales() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-d]{2}_[A-D]{2}", 0..8)
}

fn languages(locales: &[String], label: &str) -> LanguagesConfigElement {
    let mut element = LanguagesConfigElement::default();
    for locale in locales {
        element.add_language(locale.clone(), format!("{label} {locale}"));
    }
    element
}

proptest! {
    #[test]
    fn test_languages_combine_keeps_base_prefix(base in locales(), other in locales()) {
        let base = languages(&base, "base");
        let other = languages(&other, "other");
        let (base_before, other_before) = (base.clone(), other.clone());
        let combined = base.combine(&other);
        prop_assert_eq!(&base, &base_before);
        prop_assert_eq!(&other, &other_before);

        let base_locales = base.locales();
        let combined_locales = combined.locales();
        prop_assert_eq!(&combined_locales[..base_locales.len()], &base_locales[..]);
        for locale in base_locales {
            prop_assert_eq!(combined.label_for_language(locale), base.label_for_language(locale));
        }
        for locale in other.locales() {
            prop_assert!(combined_locales.contains(&locale));
        }
    }

    #[test]
    fn test_combine_with_self_is_identity(values in locales()) {
        let element = languages(&values, "x");
        prop_assert_eq!(element.combine(&element), element);
    }

    #[test]
    fn test_append_if_absent_appends_only_new_keys(base in locales(), other in locales()) {
        let merged = append_if_absent(&base, &other, |s: &String| s.clone());
        prop_assert_eq!(&merged[..base.len()], &base[..]);

        let mut seen = std::collections::HashSet::new();
        for value in &merged[base.len()..] {
            prop_assert!(!base.contains(value));
            prop_assert!(seen.insert(value.clone()));
        }
    }

    #[test]
    fn test_union_map_other_wins(
        base in prop::collection::vec(("[a-e]", 0u8..10), 0..6),
        other in prop::collection::vec(("[a-e]", 10u8..20), 0..6),
    ) {
        let base: IndexMap<String, u8> = base.into_iter().collect();
        let other: IndexMap<String, u8> = other.into_iter().collect();
        let merged = union_map(&base, &other);

        for (key, value) in &other {
            prop_assert_eq!(merged.get(key), Some(value));
        }
        for (index, key) in base.keys().enumerate() {
            prop_assert_eq!(merged.get_index_of(key), Some(index));
        }
    }

    #[test]
    fn test_generic_combine_leaves_inputs_alone(
        base in prop::collection::vec(("[a-e]", "[0-9]{1,3}"), 0..6),
        other in prop::collection::vec(("[a-e]", "[0-9]{1,3}"), 0..6),
    ) {
        let element = |entries: &[(String, String)]| {
            entries.iter().fold(GenericConfigElement::new("box"), |e, (name, value)| {
                e.with_attribute(name.as_str(), value.as_str())
                    .with_child(GenericConfigElement::new(name.as_str()).with_value(value.as_str()))
            })
        };
        let (base, other) = (element(&base), element(&other));
        let (base_before, other_before) = (base.clone(), other.clone());

        let combined = base.combine(&other);
        prop_assert_eq!(&base, &base_before);
        prop_assert_eq!(&other, &other_before);
        prop_assert_eq!(
            combined.children().len(),
            base.children().len() + other.children().len()
        );
        for (name, value) in other.attributes() {
            prop_assert_eq!(combined.attribute(name), Some(value.as_str()));
        }
    }

    #[test]
    fn test_union_list_keys_match_union_map(
        base in prop::collection::vec(("[a-e]", 0u8..10), 0..6),
        other in prop::collection::vec(("[a-e]", 10u8..20), 0..6),
    ) {
        let (base_before, other_before) = (base.clone(), other.clone());
        let listed = union_list(&base, &other, |entry: &(String, u8)| entry.0.clone());
        prop_assert_eq!(&base, &base_before);
        prop_assert_eq!(&other, &other_before);

        let as_map = |entries: &[(String, u8)]| -> IndexMap<String, u8> {
            entries.iter().cloned().collect()
        };
        let expected = union_map(&as_map(&base), &as_map(&other));
        let listed: IndexMap<String, u8> = as_map(&listed);
        prop_assert_eq!(listed.keys().collect::<Vec<_>>(), expected.keys().collect::<Vec<_>>());
        for (key, value) in &as_map(&other) {
            prop_assert_eq!(listed.get(key), Some(value));
        }
    }
}
