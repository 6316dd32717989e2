//! Tags common to every item of a selection.

use std::collections::HashSet;

use crate::models::TagRef;

/// Tags present on every item in `item_ids`, compared by id.
///
/// The result follows the tag order of the first item and contains each id
/// once. An empty selection yields an empty list.
pub fn intersect<F>(item_ids: &[i64], mut tags_of: F) -> Vec<TagRef>
where
    F: FnMut(i64) -> Vec<TagRef>,
{
    let Some((&first, rest)) = item_ids.split_first() else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut common: Vec<TagRef> = tags_of(first)
        .into_iter()
        .filter(|tag| seen.insert(tag.id))
        .collect();

    for &item_id in rest {
        if common.is_empty() {
            break;
        }
        let present: HashSet<i64> = tags_of(item_id).iter().map(|tag| tag.id).collect();
        common.retain(|tag| present.contains(&tag.id));
    }

    common
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(table: &HashMap<i64, Vec<TagRef>>) -> impl FnMut(i64) -> Vec<TagRef> + '_ {
        move |id| table.get(&id).cloned().unwrap_or_default()
    }

    fn ids(tags: &[TagRef]) -> Vec<i64> {
        tags.iter().map(|t| t.id).collect()
    }

    fn sample() -> HashMap<i64, Vec<TagRef>> {
        HashMap::from([
            (10, vec![TagRef::new(5, "easy"), TagRef::new(6, "exam")]),
            (11, vec![TagRef::new(6, "exam")]),
            (
                12,
                vec![
                    TagRef::new(7, "algebra"),
                    TagRef::new(6, "exam"),
                    TagRef::new(5, "easy"),
                ],
            ),
            (13, vec![]),
        ])
    }

    #[test]
    fn test_empty_selection_yields_nothing() {
        let table = sample();
        assert!(intersect(&[], lookup(&table)).is_empty());
    }

    #[test]
    fn test_two_items_scenario() {
        let table = sample();
        let common = intersect(&[10, 11], lookup(&table));
        assert_eq!(common, vec![TagRef::new(6, "exam")]);
    }

    #[test]
    fn test_single_item_is_deduplicated() {
        let table = HashMap::from([(
            1,
            vec![
                TagRef::new(3, "a"),
                TagRef::new(4, "b"),
                TagRef::new(3, "a"),
            ],
        )]);
        assert_eq!(ids(&intersect(&[1], lookup(&table))), vec![3, 4]);
    }

    #[test]
    fn test_order_follows_first_item() {
        let table = sample();
        assert_eq!(ids(&intersect(&[10, 12], lookup(&table))), vec![5, 6]);
        assert_eq!(ids(&intersect(&[12, 10], lookup(&table))), vec![6, 5]);
    }

    #[test]
    fn test_membership_is_commutative() {
        let table = sample();
        let selections: [&[i64]; 3] = [&[10, 11, 12], &[12, 11, 10], &[11, 12, 10]];
        let sets: Vec<HashSet<i64>> = selections
            .iter()
            .map(|sel| ids(&intersect(sel, lookup(&table))).into_iter().collect())
            .collect();
        assert!(sets.iter().all(|s| *s == HashSet::from([6])));
    }

    #[test]
    fn test_untagged_item_empties_result() {
        let table = sample();
        assert!(intersect(&[10, 13], lookup(&table)).is_empty());
    }

    #[test]
    fn test_lookup_called_once_per_item() {
        let table = sample();
        let mut calls = Vec::new();
        intersect(&[10, 11, 12], |id| {
            calls.push(id);
            table.get(&id).cloned().unwrap_or_default()
        });
        assert_eq!(calls, vec![10, 11, 12]);
    }
}
