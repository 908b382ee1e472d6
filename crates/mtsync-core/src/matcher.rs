//! Item matcher (component C): scores how well a current item and a
//! desired item agree, which the list reconciler uses as its notion of
//! identity — two items are "the same logical item" when their score is
//! the highest among all unmatched pairs on the table.

use crate::item::{self, Item};

/// Number of keys (excluding `.id`) present in both `a` and `b` with equal
/// values. Symmetric: iterates the smaller map for efficiency, but the
/// result does not depend on which argument is smaller.
pub fn score(a: &Item, b: &Item) -> usize {
    let (smaller, larger) = if a.len() <= b.len() { (a, b) } else { (b, a) };

    smaller
        .iter()
        .filter(|(k, v)| k.as_str() != item::ID_KEY && larger.get(*k) == Some(*v))
        .count()
}

/// True iff every non-`.id` key of `a` and `b` agree, and both have the
/// same non-`.id` key count. Two all-empty items are equal.
pub fn equal(a: &Item, b: &Item) -> bool {
    let a_stripped = item::without_id(a);
    let b_stripped = item::without_id(b);
    a_stripped.len() == b_stripped.len() && score(a, b) == a_stripped.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn item(fields: &[(&str, &str)]) -> Item {
        fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<BTreeMap<_, _>>()
    }

    #[test]
    fn score_is_symmetric() {
        let a = item(&[(".id", "1"), ("x", "1"), ("y", "2")]);
        let b = item(&[("x", "1"), ("y", "3"), ("z", "4")]);
        assert_eq!(score(&a, &b), score(&b, &a));
        assert_eq!(score(&a, &b), 1);
    }

    #[test]
    fn equal_ignores_id() {
        let a = item(&[(".id", "1"), ("field-a", "a"), ("field-b", "b")]);
        let b = item(&[("field-a", "a"), ("field-b", "b")]);
        assert!(equal(&a, &b));
    }

    #[test]
    fn not_equal_on_value_mismatch() {
        let a = item(&[(".id", "1"), ("field-a", "a"), ("field-b", "b")]);
        let b = item(&[(".id", "1"), ("field-a", "a"), ("field-b", "bbb")]);
        assert!(!equal(&a, &b));
    }

    #[test]
    fn empty_items_are_equal() {
        assert!(equal(&Item::new(), &Item::new()));
    }

    #[test]
    fn equal_implies_score_equals_key_count() {
        let a = item(&[(".id", "1"), ("x", "1")]);
        let b = item(&[("x", "1")]);
        assert!(equal(&a, &b));
        assert_eq!(score(&a, &b), item::without_id(&a).len());
    }
}
