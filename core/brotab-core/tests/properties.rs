use brotab_core::lis::longest_increasing_positions;
use brotab_core::{apply_all, infer_all, longest_increasing_subsequence, Tab};
use proptest::collection::vec;
use proptest::prelude::*;

fn listed_tab(index: usize, window_id: u64) -> Tab {
    Tab::new(
        "f",
        window_id,
        index as u64,
        format!("title {}", index),
        format!("https://example.org/{}", index),
    )
}

#[derive(Debug, Clone)]
struct Edit {
    before: Vec<Tab>,
    after: Vec<Tab>,
}

/// A listing of up to 12 tabs over three windows, and an edit of it that
/// deletes, reorders, re-windows and re-urls tabs at random.
fn arb_edit() -> impl Strategy<Value = Edit> {
    (0usize..12)
        .prop_flat_map(|n| {
            (
                vec(0u64..3, n),
                vec(any::<bool>(), n),
                Just((0..n).collect::<Vec<usize>>()).prop_shuffle(),
                vec(proptest::option::of(0u64..3), n),
                vec(any::<bool>(), n),
            )
        })
        .prop_map(|(windows, keep, order, new_windows, new_urls)| {
            let before: Vec<Tab> = windows
                .iter()
                .enumerate()
                .map(|(index, &window)| listed_tab(index, window))
                .collect();
            let after = order
                .into_iter()
                .filter(|&index| keep[index])
                .map(|index| {
                    let mut tab = before[index].clone();
                    if let Some(window) = new_windows[index] {
                        tab.window_id = window;
                    }
                    if new_urls[index] {
                        tab.url.push_str("#edited");
                    }
                    tab
                })
                .collect();
            Edit { before, after }
        })
}

/// Length of a longest strictly increasing subsequence, quadratic DP.
fn lis_length_quadratic(sequence: &[i32]) -> usize {
    let mut best = vec![1usize; sequence.len()];
    for i in 0..sequence.len() {
        for j in 0..i {
            if sequence[j] < sequence[i] {
                best[i] = best[i].max(best[j] + 1);
            }
        }
    }
    best.into_iter().max().unwrap_or(0)
}

proptest! {
    #[test]
    fn lis_is_strictly_increasing_subsequence_of_max_length(sequence in vec(0i32..20, 0..40)) {
        let positions = longest_increasing_positions(&sequence);
        let values = longest_increasing_subsequence(&sequence);

        prop_assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
        prop_assert!(values.windows(2).all(|pair| pair[0] < pair[1]));
        prop_assert_eq!(
            positions.iter().map(|&p| sequence[p]).collect::<Vec<_>>(),
            values.clone()
        );
        prop_assert_eq!(values.len(), lis_length_quadratic(&sequence));
    }

    #[test]
    fn plan_replays_to_edited_tabs(edit in arb_edit()) {
        let plan = infer_all(&edit.before, &edit.after).unwrap();
        prop_assert_eq!(apply_all(&edit.before, &plan).unwrap(), edit.after);
    }

    #[test]
    fn deleting_in_order_needs_no_moves_or_updates(
        keep in vec(any::<bool>(), 0..16)
    ) {
        let before: Vec<Tab> = (0..keep.len()).map(|index| listed_tab(index, 0)).collect();
        let after: Vec<Tab> = before
            .iter()
            .zip(&keep)
            .filter(|(_, kept)| **kept)
            .map(|(tab, _)| tab.clone())
            .collect();

        let plan = infer_all(&before, &after).unwrap();
        prop_assert!(plan.moves.is_empty());
        prop_assert!(plan.updates.is_empty());
        prop_assert_eq!(plan.deletes.len(), before.len() - after.len());
    }

    #[test]
    fn pure_reorder_needs_no_deletes(
        order in Just((0..10).collect::<Vec<usize>>()).prop_shuffle()
    ) {
        let before: Vec<Tab> = (0..10).map(|index| listed_tab(index, index as u64 % 2)).collect();
        let after: Vec<Tab> = order.iter().map(|&index| before[index].clone()).collect();

        let plan = infer_all(&before, &after).unwrap();
        prop_assert!(plan.deletes.is_empty());
        prop_assert!(plan.updates.is_empty());
        prop_assert_eq!(apply_all(&before, &plan).unwrap(), after);
    }

    #[test]
    fn window_change_forces_move(len in 1usize..10, pick in any::<prop::sample::Index>()) {
        let before: Vec<Tab> = (0..len).map(|index| listed_tab(index, 0)).collect();
        let moved = pick.index(len);
        let mut after = before.clone();
        after[moved].window_id = 1;

        let plan = infer_all(&before, &after).unwrap();
        prop_assert!(plan.moves.iter().any(|command| command.tab_id == moved as u64 && command.window_id == 1));
        prop_assert_eq!(apply_all(&before, &plan).unwrap(), after);
    }
}
