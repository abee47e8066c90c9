use std::collections::HashMap;
use std::hash::Hash;
use tracing::debug;

/// Left outer join of `left` (the driving table) against `right`.
///
/// Output has exactly one entry per left row, in left order. The right side
/// is indexed by key keeping its first row per key, so callers reduce the
/// right table to one row per key (latest, earliest upcoming, ...) first.
pub fn left_join<'l, 'r, L, R, K, FL, FR>(
    left: &'l [L],
    right: &'r [R],
    left_key: FL,
    right_key: FR,
) -> Vec<(&'l L, Option<&'r R>)>
where
    K: Eq + Hash,
    FL: Fn(&L) -> K,
    FR: Fn(&R) -> K,
{
    let mut index: HashMap<K, &'r R> = HashMap::with_capacity(right.len());
    let mut shadowed = 0usize;
    for row in right {
        let key = right_key(row);
        if index.contains_key(&key) {
            shadowed += 1;
        } else {
            index.insert(key, row);
        }
    }
    if shadowed > 0 {
        debug!("{} right-hand rows shared a key with an earlier row and were not joined", shadowed);
    }

    left.iter()
        .map(|row| {
            let matched = index.get(&left_key(row)).copied();
            (row, matched)
        })
        .collect()
}

/// Count of joined pairs with no right-hand match.
pub fn unmatched<L, R>(joined: &[(L, Option<R>)]) -> usize {
    joined.iter().filter(|(_, r)| r.is_none()).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_every_left_row_in_order() {
        let left = ["Chad", "Mali", "Peru"];
        let right = [("Peru", 1), ("Chad", 2), ("Narnia", 3)];
        let joined = left_join(&left, &right, |l| l.to_string(), |r| r.0.to_string());
        assert_eq!(joined.len(), 3);
        assert_eq!(joined[0].1.map(|r| r.1), Some(2));
        assert_eq!(joined[1].1, None);
        assert_eq!(joined[2].1.map(|r| r.1), Some(1));
        assert_eq!(unmatched(&joined), 1);
        // right-only keys never appear
        assert!(joined.iter().all(|(l, _)| **l != "Narnia"));
    }

    #[test]
    fn first_right_row_per_key_wins() {
        let left = ["Chad"];
        let right = [("Chad", 1), ("Chad", 2)];
        let joined = left_join(&left, &right, |l| *l, |r| r.0);
        assert_eq!(joined.len(), 1);
        assert_eq!(joined[0].1.map(|r| r.1), Some(1));
    }

    #[test]
    fn empty_tables_join_to_empty() {
        let left: [&str; 0] = [];
        let right = [("Chad", 1)];
        assert!(left_join(&left, &right, |l| *l, |r| r.0).is_empty());

        let left = ["Chad"];
        let right: [(&str, i32); 0] = [];
        let joined = left_join(&left, &right, |l| *l, |r| r.0);
        assert_eq!(joined.len(), 1);
        assert!(joined[0].1.is_none());
    }

    #[test]
    fn composite_keys() {
        let left = [("Chad", 2018, 9), ("Chad", 2018, 10)];
        let right = [("Chad", 2018, 10, "x")];
        let joined = left_join(
            &left,
            &right,
            |l| (l.0, l.1, l.2),
            |r| (r.0, r.1, r.2),
        );
        assert!(joined[0].1.is_none());
        assert_eq!(joined[1].1.map(|r| r.3), Some("x"));
    }
}
