//! Container invariants under random mutation sequences.

use proptest::prelude::*;
use relstore_core::{Relation, RelationList, RelationMap, RelationOrderedList, RelationSet, Status};

fn value() -> impl Strategy<Value = String> {
    // A tiny domain so removes and re-adds collide often.
    prop::sample::select(vec!["a", "b", "c", "d"]).prop_map(str::to_owned)
}

#[derive(Debug, Clone)]
enum ListOp {
    Push(String),
    Remove(String),
    RemoveAt(usize),
    Clear,
    Canonicalize,
}

fn list_op() -> impl Strategy<Value = ListOp> {
    prop_oneof![
        4 => value().prop_map(ListOp::Push),
        2 => value().prop_map(ListOp::Remove),
        1 => (0usize..8).prop_map(ListOp::RemoveAt),
        1 => Just(ListOp::Clear),
        1 => Just(ListOp::Canonicalize),
    ]
}

fn apply_list(ops: &[ListOp]) -> RelationList<String> {
    let mut list = RelationList::new();
    for op in ops {
        match op {
            ListOp::Push(v) => list.push(v.clone()),
            ListOp::Remove(v) => {
                list.remove(v);
            }
            ListOp::RemoveAt(i) => {
                let _ = list.remove_at(*i);
            }
            ListOp::Clear => list.clear(),
            ListOp::Canonicalize => list.canonicalize(),
        }
    }
    list
}

#[derive(Debug, Clone)]
enum SetOp {
    Insert(String),
    Remove(String),
    Clear,
    Canonicalize,
}

fn set_op() -> impl Strategy<Value = SetOp> {
    prop_oneof![
        4 => value().prop_map(SetOp::Insert),
        2 => value().prop_map(SetOp::Remove),
        1 => Just(SetOp::Clear),
        1 => Just(SetOp::Canonicalize),
    ]
}

fn apply_set(ops: &[SetOp]) -> RelationSet<String> {
    let mut set = RelationSet::new();
    for op in ops {
        match op {
            SetOp::Insert(v) => {
                set.insert(v.clone());
            }
            SetOp::Remove(v) => {
                set.remove(v);
            }
            SetOp::Clear => set.clear(),
            SetOp::Canonicalize => set.canonicalize(),
        }
    }
    set
}

#[derive(Debug, Clone)]
enum MapOp {
    Insert(String, i64),
    Remove(String),
    Clear,
    Canonicalize,
}

fn map_op() -> impl Strategy<Value = MapOp> {
    prop_oneof![
        4 => (value(), 0i64..4).prop_map(|(k, v)| MapOp::Insert(k, v)),
        2 => value().prop_map(MapOp::Remove),
        1 => Just(MapOp::Clear),
        1 => Just(MapOp::Canonicalize),
    ]
}

fn apply_map(ops: &[MapOp]) -> RelationMap<String, i64> {
    let mut map = RelationMap::new();
    for op in ops {
        match op {
            MapOp::Insert(k, v) => {
                map.insert(k.clone(), *v);
            }
            MapOp::Remove(k) => {
                let _ = map.remove(k);
            }
            MapOp::Clear => map.clear(),
            MapOp::Canonicalize => map.canonicalize(),
        }
    }
    map
}

#[derive(Debug, Clone)]
enum OrderedOp {
    Push(i64),
    Insert(usize, i64),
    Set(usize, i64),
    Remove(usize),
    Clear,
    Canonicalize,
}

fn ordered_op() -> impl Strategy<Value = OrderedOp> {
    prop_oneof![
        4 => (0i64..10).prop_map(OrderedOp::Push),
        2 => ((0usize..8), 0i64..10).prop_map(|(i, v)| OrderedOp::Insert(i, v)),
        2 => ((0usize..8), 0i64..10).prop_map(|(i, v)| OrderedOp::Set(i, v)),
        2 => (0usize..8).prop_map(OrderedOp::Remove),
        1 => Just(OrderedOp::Clear),
        1 => Just(OrderedOp::Canonicalize),
    ]
}

fn apply_ordered(ops: &[OrderedOp]) -> RelationOrderedList<i64> {
    let mut list = RelationOrderedList::new();
    for op in ops {
        match op {
            OrderedOp::Push(v) => list.push(*v),
            OrderedOp::Insert(i, v) => {
                let _ = list.insert(*i, *v);
            }
            OrderedOp::Set(i, v) => {
                let _ = list.set(*i, *v);
            }
            OrderedOp::Remove(i) => {
                let _ = list.remove(*i);
            }
            OrderedOp::Clear => list.clear(),
            OrderedOp::Canonicalize => list.canonicalize(),
        }
    }
    list
}

/// Every pending deletion precedes every live entry.
fn deletions_lead<E>(diff: &[(E, Status)]) -> bool {
    let first_live = diff
        .iter()
        .position(|(_, status)| *status != Status::Deleted)
        .unwrap_or(diff.len());
    diff[first_live..]
        .iter()
        .all(|(_, status)| *status != Status::Deleted)
}

fn all_saved<E>(diff: &[(E, Status)]) -> bool {
    diff.iter().all(|(_, status)| *status == Status::Saved)
}

/// Checks the shared contract on an arbitrarily mutated container: the
/// diff is repeatable with deletions leading, and canonicalization is
/// idempotent and settles everything as saved.
fn check_contract<R: Relation>(mut relation: R) -> Result<(), TestCaseError>
where
    R::Elem: PartialEq + std::fmt::Debug,
{
    let diff = relation.diff();
    prop_assert_eq!(&relation.diff(), &diff);
    prop_assert!(deletions_lead(&diff));

    relation.canonicalize();
    let settled = relation.diff();
    prop_assert!(all_saved(&settled));
    prop_assert!(relation.is_clean());
    prop_assert_eq!(relation.unsaved_entries(), 0);

    relation.canonicalize();
    prop_assert_eq!(&relation.diff(), &settled);
    Ok(())
}

/// Checks that feeding a canonical container's diff through `repopulate`
/// rebuilds an identical container.
fn check_repopulate<R: Relation + Default>(mut relation: R) -> Result<(), TestCaseError>
where
    R::Elem: PartialEq + std::fmt::Debug,
{
    relation.canonicalize();
    let mut rebuilt = R::default();
    for (elem, _) in relation.diff() {
        rebuilt
            .repopulate(elem)
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
    }
    prop_assert_eq!(rebuilt.diff(), relation.diff());
    prop_assert!(rebuilt.is_clean());
    Ok(())
}

proptest! {
    #[test]
    fn list_contract(ops in prop::collection::vec(list_op(), 0..40)) {
        check_contract(apply_list(&ops))?;
    }

    #[test]
    fn set_contract(ops in prop::collection::vec(set_op(), 0..40)) {
        check_contract(apply_set(&ops))?;
    }

    #[test]
    fn map_contract(ops in prop::collection::vec(map_op(), 0..40)) {
        check_contract(apply_map(&ops))?;
    }

    #[test]
    fn ordered_contract(ops in prop::collection::vec(ordered_op(), 0..40)) {
        check_contract(apply_ordered(&ops))?;
    }

    #[test]
    fn list_repopulates_to_identity(ops in prop::collection::vec(list_op(), 0..40)) {
        check_repopulate(apply_list(&ops))?;
    }

    #[test]
    fn set_repopulates_to_identity(ops in prop::collection::vec(set_op(), 0..40)) {
        check_repopulate(apply_set(&ops))?;
    }

    #[test]
    fn map_repopulates_to_identity(ops in prop::collection::vec(map_op(), 0..40)) {
        check_repopulate(apply_map(&ops))?;
    }

    #[test]
    fn ordered_repopulates_to_identity(ops in prop::collection::vec(ordered_op(), 0..40)) {
        check_repopulate(apply_ordered(&ops))?;
    }

    #[test]
    fn set_remove_then_reinsert_is_invisible(
        values in prop::collection::btree_set(value(), 1..5),
    ) {
        let mut set: RelationSet<String> = RelationSet::new();
        for v in &values {
            set.insert(v.clone());
        }
        set.canonicalize();
        for v in &values {
            prop_assert!(set.remove(v));
            prop_assert!(set.insert(v.clone()));
        }
        prop_assert!(set.is_clean());
        prop_assert!(all_saved(&set.diff()));
    }

    #[test]
    fn map_same_value_overwrite_is_invisible(
        entries in prop::collection::btree_map(value(), 0i64..10, 1..5),
    ) {
        let mut map: RelationMap<String, i64> = RelationMap::new();
        for (k, v) in &entries {
            map.insert(k.clone(), *v);
        }
        map.canonicalize();
        for (k, v) in &entries {
            map.insert(k.clone(), *v);
        }
        prop_assert!(map.is_clean());
        prop_assert!(all_saved(&map.diff()));
    }

    #[test]
    fn ordered_self_write_keeps_saved(
        values in prop::collection::vec(0i64..10, 1..10),
        pick in 0usize..10,
    ) {
        let mut list = RelationOrderedList::new();
        for &v in &values {
            list.push(v);
        }
        list.canonicalize();
        let index = pick % values.len();
        list.set(index, values[index]).unwrap();
        prop_assert_eq!(list.status(index), Some(Status::Saved));
        prop_assert!(list.is_clean());
    }
}
