//! The uniform target-matching rule used for players, rooms, NPCs, and
//! items: exact match, then unique case-insensitive prefix, then first
//! case-insensitive substring, ties broken by iteration (insertion) order.

/// `names` is iterated in insertion order; `key(&T) -> &str` extracts the
/// name to match against.
pub fn find_match<'a, T>(token: &str, items: impl Iterator<Item = &'a T>, key: impl Fn(&'a T) -> &'a str) -> Option<&'a T> {
    let needle = token.to_ascii_lowercase();
    let items: Vec<&T> = items.collect();

    for item in &items {
        if key(item).eq_ignore_ascii_case(&needle) {
            return Some(item);
        }
    }

    let prefix_hits: Vec<&&T> = items.iter().filter(|i| key(i).to_ascii_lowercase().starts_with(&needle)).collect();
    if prefix_hits.len() == 1 {
        return Some(prefix_hits[0]);
    }

    for item in &items {
        if key(item).to_ascii_lowercase().contains(&needle) {
            return Some(item);
        }
    }

    None
}

/// Same matching rule, but against mutable items via index resolution: a
/// first pass finds the matching index (borrowing immutably), the caller
/// then re-borrows mutably by that index.
pub fn find_match_index<T>(token: &str, items: &[T], key: impl Fn(&T) -> &str) -> Option<usize> {
    let needle = token.to_ascii_lowercase();

    for (i, item) in items.iter().enumerate() {
        if key(item).eq_ignore_ascii_case(&needle) {
            return Some(i);
        }
    }

    let prefix_hits: Vec<usize> = items
        .iter()
        .enumerate()
        .filter(|(_, i)| key(i).to_ascii_lowercase().starts_with(&needle))
        .map(|(idx, _)| idx)
        .collect();
    if prefix_hits.len() == 1 {
        return Some(prefix_hits[0]);
    }

    for (i, item) in items.iter().enumerate() {
        if key(item).to_ascii_lowercase().contains(&needle) {
            return Some(i);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match_wins_over_prefix() {
        let names = vec!["Hero".to_string(), "Heroine".to_string()];
        let found = find_match_index("hero", &names, |s| s.as_str());
        assert_eq!(found, Some(0));
    }

    #[test]
    fn unique_prefix_resolves() {
        let names = vec!["Watcher".to_string(), "Greeter".to_string()];
        let found = find_match_index("wat", &names, |s| s.as_str());
        assert_eq!(found, Some(0));
    }

    #[test]
    fn ambiguous_prefix_falls_through_to_substring() {
        let names = vec!["Goblin Archer".to_string(), "Goblin Brute".to_string()];
        // "gob" is an ambiguous prefix for both; substring pass then picks
        // the first insertion-order match containing it, which is index 0.
        let found = find_match_index("gob", &names, |s| s.as_str());
        assert_eq!(found, Some(0));
    }

    #[test]
    fn no_match_returns_none() {
        let names = vec!["Hero".to_string()];
        assert_eq!(find_match_index("zzz", &names, |s| s.as_str()), None);
    }
}
