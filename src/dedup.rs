use std::{collections::HashSet, hash::Hash};

pub fn unique_by<T, K, F>(items: impl IntoIterator<Item = T>, mut key_fn: F) -> Vec<T>
where
    K: Eq + Hash,
    F: FnMut(&T) -> K,
{
    let mut seen = HashSet::new();
    let mut result = Vec::new();
    for item in items {
        if seen.insert(key_fn(&item)) {
            result.push(item);
        }
    }
    result
}
