use std::cmp::Ordering;

use crate::firestore::value::{FirestoreValue, ValueKind};

/// Firestore value equality.
///
/// Deep and structural: arrays compare element-wise, maps by key set and
/// per-key value. Integers and doubles are distinct kinds, `NaN` equals
/// `NaN`, and `0.0` differs from `-0.0`.
pub fn values_equal(left: &FirestoreValue, right: &FirestoreValue) -> bool {
    match (left.kind(), right.kind()) {
        (ValueKind::Null, ValueKind::Null) => true,
        (ValueKind::Boolean(a), ValueKind::Boolean(b)) => a == b,
        (ValueKind::Integer(a), ValueKind::Integer(b)) => a == b,
        (ValueKind::Double(a), ValueKind::Double(b)) => a.to_bits() == b.to_bits() || (a.is_nan() && b.is_nan()),
        (ValueKind::Timestamp(a), ValueKind::Timestamp(b)) => a == b,
        (ValueKind::String(a), ValueKind::String(b)) => a == b,
        (ValueKind::Bytes(a), ValueKind::Bytes(b)) => a == b,
        (ValueKind::Reference(a), ValueKind::Reference(b)) => a == b,
        (ValueKind::GeoPoint(a), ValueKind::GeoPoint(b)) => a == b,
        (ValueKind::Array(a), ValueKind::Array(b)) => {
            a.values().len() == b.values().len()
                && a.values()
                    .iter()
                    .zip(b.values())
                    .all(|(l, r)| values_equal(l, r))
        }
        (ValueKind::Map(a), ValueKind::Map(b)) => {
            a.fields().len() == b.fields().len()
                && a.fields().iter().all(|(key, value)| {
                    b.fields()
                        .get(key)
                        .is_some_and(|other| values_equal(value, other))
                })
        }
        _ => false,
    }
}

/// Total order over Firestore values.
///
/// Values of different kinds order by kind: null, boolean, number,
/// timestamp, string, bytes, reference, geo point, array, map. Integers and
/// doubles share the number slot and compare numerically, with NaN before
/// every other number.
pub fn compare_values(left: &FirestoreValue, right: &FirestoreValue) -> Ordering {
    let by_kind = type_order(left.kind()).cmp(&type_order(right.kind()));
    if by_kind != Ordering::Equal {
        return by_kind;
    }

    match (left.kind(), right.kind()) {
        (ValueKind::Boolean(a), ValueKind::Boolean(b)) => a.cmp(b),
        (ValueKind::Integer(a), ValueKind::Integer(b)) => a.cmp(b),
        (ValueKind::Integer(a), ValueKind::Double(b)) => compare_integer_to_double(*a, *b),
        (ValueKind::Double(a), ValueKind::Integer(b)) => compare_integer_to_double(*b, *a).reverse(),
        (ValueKind::Double(a), ValueKind::Double(b)) => compare_doubles(*a, *b),
        (ValueKind::Timestamp(a), ValueKind::Timestamp(b)) => a.cmp(b),
        (ValueKind::String(a), ValueKind::String(b)) => a.cmp(b),
        (ValueKind::Bytes(a), ValueKind::Bytes(b)) => a.cmp(b),
        (ValueKind::Reference(a), ValueKind::Reference(b)) => a.cmp(b),
        (ValueKind::GeoPoint(a), ValueKind::GeoPoint(b)) => a.compare(b),
        (ValueKind::Array(a), ValueKind::Array(b)) => {
            for (l, r) in a.values().iter().zip(b.values()) {
                let ordering = compare_values(l, r);
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            a.values().len().cmp(&b.values().len())
        }
        (ValueKind::Map(a), ValueKind::Map(b)) => {
            // BTreeMap iterates in key order, matching Firestore's map ordering.
            for ((lk, lv), (rk, rv)) in a.fields().iter().zip(b.fields()) {
                let ordering = lk.cmp(rk).then_with(|| compare_values(lv, rv));
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            a.fields().len().cmp(&b.fields().len())
        }
        _ => Ordering::Equal,
    }
}

fn type_order(kind: &ValueKind) -> u8 {
    match kind {
        ValueKind::Null => 0,
        ValueKind::Boolean(_) => 1,
        ValueKind::Integer(_) | ValueKind::Double(_) => 2,
        ValueKind::Timestamp(_) => 3,
        ValueKind::String(_) => 4,
        ValueKind::Bytes(_) => 5,
        ValueKind::Reference(_) => 6,
        ValueKind::GeoPoint(_) => 7,
        ValueKind::Array(_) => 8,
        ValueKind::Map(_) => 9,
    }
}

fn compare_doubles(left: f64, right: f64) -> Ordering {
    match (left.is_nan(), right.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => left.partial_cmp(&right).unwrap_or(Ordering::Equal),
    }
}

// Exact comparison: an i64 above 2^53 has no lossless f64 form.
fn compare_integer_to_double(integer: i64, double: f64) -> Ordering {
    // i64 spans [-2^63, 2^63).
    const LOWER: f64 = -9_223_372_036_854_775_808.0;
    const UPPER: f64 = 9_223_372_036_854_775_808.0;

    if double.is_nan() {
        return Ordering::Greater;
    }
    if double >= UPPER {
        return Ordering::Less;
    }
    if double < LOWER {
        return Ordering::Greater;
    }
    let whole = double.trunc();
    integer.cmp(&(whole as i64)).then_with(|| {
        let fraction = double - whole;
        if fraction > 0.0 {
            Ordering::Less
        } else if fraction < 0.0 {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn numbers_follow_firestore_equality() {
        let nan = FirestoreValue::from_double(f64::NAN);
        assert!(values_equal(&nan, &nan.clone()));
        assert!(!values_equal(
            &FirestoreValue::from_double(0.0),
            &FirestoreValue::from_double(-0.0)
        ));
        assert!(!values_equal(
            &FirestoreValue::from_integer(1),
            &FirestoreValue::from_double(1.0)
        ));
    }

    #[test]
    fn nested_values_compare_deeply() {
        let build = |flag: bool| {
            let mut inner = BTreeMap::new();
            inner.insert("flag".to_string(), FirestoreValue::from_bool(flag));
            FirestoreValue::from_array(vec![FirestoreValue::from_map(inner)])
        };
        assert!(values_equal(&build(true), &build(true)));
        assert!(!values_equal(&build(true), &build(false)));
    }

    #[test]
    fn orders_across_kinds() {
        let ordered = [
            FirestoreValue::null(),
            FirestoreValue::from_bool(true),
            FirestoreValue::from_double(f64::NAN),
            FirestoreValue::from_integer(1),
            FirestoreValue::from_double(1.5),
            FirestoreValue::from_string("a"),
            FirestoreValue::from_array(vec![]),
        ];
        for pair in ordered.windows(2) {
            assert_eq!(compare_values(&pair[0], &pair[1]), Ordering::Less, "{pair:?}");
        }
    }

    #[test]
    fn integers_and_doubles_compare_numerically() {
        assert_eq!(
            compare_values(&FirestoreValue::from_integer(2), &FirestoreValue::from_double(2.0)),
            Ordering::Equal
        );
        assert_eq!(
            compare_values(&FirestoreValue::from_integer(3), &FirestoreValue::from_double(2.5)),
            Ordering::Greater
        );
    }

    #[test]
    fn large_integers_keep_precision_against_doubles() {
        let power = 9_007_199_254_740_992_i64; // 2^53
        let double = FirestoreValue::from_double(power as f64);
        assert_eq!(
            compare_values(&FirestoreValue::from_integer(power + 1), &double),
            Ordering::Greater
        );
        assert_eq!(
            compare_values(&double, &FirestoreValue::from_integer(power + 1)),
            Ordering::Less
        );
        assert_eq!(
            compare_values(&FirestoreValue::from_integer(power), &double),
            Ordering::Equal
        );
        assert_eq!(
            compare_values(&FirestoreValue::from_integer(i64::MAX), &FirestoreValue::from_double(9.3e18)),
            Ordering::Less
        );
        assert_eq!(
            compare_values(&FirestoreValue::from_integer(-3), &FirestoreValue::from_double(-2.5)),
            Ordering::Less
        );
        assert_eq!(
            compare_values(&FirestoreValue::from_integer(i64::MIN), &FirestoreValue::from_double(f64::NEG_INFINITY)),
            Ordering::Greater
        );
    }
}
