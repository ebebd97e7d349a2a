//! Property tests for the task store

use std::collections::HashSet;

use chrono::NaiveDate;
use proptest::prelude::*;
use taskboard::domain::{
    visible_tasks, BoardSnapshot, Category, FilterCriteria, Priority, Stage, TaskDraft, TaskId,
    TaskStore,
};

#[derive(Debug, Clone)]
enum Op {
    Add {
        title: String,
        stage: Stage,
        category: Category,
        priority: Priority,
    },
    Remove(usize),
    Move(usize, Stage),
    Reorder(Stage, usize, usize),
}

fn stage() -> impl Strategy<Value = Stage> {
    prop::sample::select(Stage::ALL.to_vec())
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (
            "[a-z ]{0,12}",
            stage(),
            prop::sample::select(Category::ALL.to_vec()),
            prop::sample::select(Priority::ALL.to_vec()),
        )
            .prop_map(|(title, stage, category, priority)| Op::Add {
                title,
                stage,
                category,
                priority,
            }),
        1 => any::<usize>().prop_map(Op::Remove),
        1 => (any::<usize>(), stage()).prop_map(|(i, s)| Op::Move(i, s)),
        2 => (stage(), 0usize..8, 0usize..8).prop_map(|(s, a, b)| Op::Reorder(s, a, b)),
    ]
}

fn due() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
}

/// Picks an existing id by index, if there are any tasks
fn nth_id(store: &TaskStore, index: usize) -> Option<TaskId> {
    let ids: Vec<_> = store.tasks_in_order().map(|t| t.id.clone()).collect();
    if ids.is_empty() {
        None
    } else {
        Some(ids[index % ids.len()].clone())
    }
}

fn build(ops: &[Op]) -> (TaskStore, Vec<TaskId>) {
    let mut store = TaskStore::new();
    let mut issued = Vec::new();

    for op in ops {
        match op {
            Op::Add {
                title,
                stage,
                category,
                priority,
            } => {
                let draft = TaskDraft::new(title.clone(), due())
                    .in_stage(*stage)
                    .with_category(*category)
                    .with_priority(*priority);
                issued.push(store.add(draft).unwrap().id);
            }
            Op::Remove(i) => {
                if let Some(id) = nth_id(&store, *i) {
                    store.remove(&id).unwrap();
                }
            }
            Op::Move(i, stage) => {
                if let Some(id) = nth_id(&store, *i) {
                    store.move_to(&id, *stage).unwrap();
                }
            }
            Op::Reorder(stage, from, to) => {
                // Out-of-range indices must be rejected without effect
                let before = store.snapshot();
                if store.reorder(*stage, *from, *to).is_err() {
                    assert_eq!(store.snapshot(), before);
                }
            }
        }
    }

    (store, issued)
}

fn assert_consistent(store: &TaskStore) {
    let mut seen = HashSet::new();
    for stage in Stage::ALL {
        for id in store.stage_order(stage) {
            assert!(seen.insert(id.clone()), "{} listed twice", id);
            assert_eq!(store.get(id).map(|t| t.stage), Some(stage));
        }
    }
    assert_eq!(seen.len(), store.len());
}

proptest! {
    #[test]
    fn every_task_sits_in_exactly_one_stage(ops in prop::collection::vec(op(), 0..40)) {
        let (store, _) = build(&ops);
        assert_consistent(&store);
    }

    #[test]
    fn issued_ids_are_never_reused(ops in prop::collection::vec(op(), 0..40)) {
        let (_, issued) = build(&ops);
        let unique: HashSet<_> = issued.iter().collect();
        prop_assert_eq!(unique.len(), issued.len());
    }

    #[test]
    fn reorder_is_undone_by_its_inverse(
        ops in prop::collection::vec(op(), 0..30),
        s in stage(),
        a in 0usize..8,
        b in 0usize..8,
    ) {
        let (mut store, _) = build(&ops);
        let len = store.stage_order(s).len();
        prop_assume!(a < len && b < len);

        let before = store.stage_order(s).to_vec();
        store.reorder(s, a, b).unwrap();
        store.reorder(s, b, a).unwrap();
        prop_assert_eq!(store.stage_order(s), before.as_slice());
    }

    #[test]
    fn remove_only_touches_its_stage(ops in prop::collection::vec(op(), 1..30), pick in any::<usize>()) {
        let (mut store, _) = build(&ops);
        let Some(id) = nth_id(&store, pick) else {
            return Ok(());
        };
        let stage = store.get(&id).map(|t| t.stage).unwrap();
        let before: Vec<Vec<TaskId>> = Stage::ALL.iter().map(|s| store.stage_order(*s).to_vec()).collect();

        store.remove(&id).unwrap();

        for other in Stage::ALL {
            let expected: Vec<TaskId> = before[other.index()]
                .iter()
                .filter(|i| other != stage || **i != id)
                .cloned()
                .collect();
            prop_assert_eq!(store.stage_order(other), expected.as_slice());
        }
    }

    #[test]
    fn empty_filter_keeps_everything_in_order(ops in prop::collection::vec(op(), 0..30)) {
        let (store, _) = build(&ops);
        let all: Vec<_> = store.tasks_in_order().collect();
        let visible = visible_tasks(all.iter().copied(), &FilterCriteria::default());
        prop_assert_eq!(visible, all);
    }

    #[test]
    fn filtering_is_a_stable_subsequence(
        ops in prop::collection::vec(op(), 0..30),
        search in "[a-z]{0,2}",
        priority in prop::option::of(prop::sample::select(Priority::ALL.to_vec())),
    ) {
        let (store, _) = build(&ops);
        let criteria = FilterCriteria { search: search.clone(), category: None, priority };

        let all: Vec<_> = store.tasks_in_order().collect();
        let visible = visible_tasks(all.iter().copied(), &criteria);

        let needle = search.to_lowercase();
        let expected: Vec<_> = all
            .iter()
            .copied()
            .filter(|t| {
                t.title.to_lowercase().contains(&needle)
                    || t.description.to_lowercase().contains(&needle)
            })
            .filter(|t| priority.map_or(true, |p| t.priority == p))
            .collect();
        prop_assert_eq!(visible, expected);
    }

    #[test]
    fn snapshot_survives_json(ops in prop::collection::vec(op(), 0..30)) {
        let (store, _) = build(&ops);
        let snapshot = store.snapshot();

        let text = snapshot.to_json().unwrap();
        let restored = TaskStore::from_snapshot(BoardSnapshot::from_json(&text).unwrap()).unwrap();

        prop_assert_eq!(restored.snapshot(), snapshot);
        assert_consistent(&restored);
    }
}
