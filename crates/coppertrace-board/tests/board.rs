use std::collections::{HashMap, HashSet};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use coppertrace_board::{BoardError, Item, ItemId, ItemKind, RoutingBoard};
use coppertrace_geometry::{IntBox, Shape};
use coppertrace_rules::LayerStructure;

fn two_layer_board() -> RoutingBoard {
    let _ = env_logger::builder().is_test(true).try_init();
    RoutingBoard::new("test", LayerStructure::two_sided())
}

fn boxed_trace(layer: usize, bbox: IntBox, net: u32, class: usize) -> Item {
    Item::on_layer(ItemKind::Trace, layer, 2, Shape::Box(bbox), Some(net), class)
}

/// Everything observable about a board, for bit-identical undo checks.
fn snapshot(board: &RoutingBoard) -> (HashMap<ItemId, Item>, Vec<i32>, Vec<ItemId>) {
    let items: HashMap<ItemId, Item> = board.items().map(|(id, i)| (id, i.clone())).collect();
    let matrix = &board.rules.clearance_matrix;
    let mut values = Vec::new();
    for i in 0..matrix.get_class_count() {
        for j in 0..matrix.get_class_count() {
            for l in 0..board.layer_count() {
                values.push(matrix.value(i, j, l));
            }
        }
    }
    let probe = Shape::Box(IntBox::new(-50, -50, 50, 50));
    let query = board.find_overlapping(&probe, 0, None, 0).unwrap_or_default();
    (items, values, query)
}

#[test]
fn undo_roundtrip_restores_observable_state() {
    let mut board = two_layer_board();
    board.append_clearance_class("signal").unwrap();
    board.set_clearance_value_all_layers(2, 2, 10).unwrap();
    board.commit();

    let before = snapshot(&board);

    // A sequence of structural mutations in three batches.
    let a = board
        .insert_item(boxed_trace(0, IntBox::new(0, 0, 10, 2), 1, 2))
        .unwrap();
    let b = board
        .insert_item(boxed_trace(0, IntBox::new(20, 0, 30, 2), 2, 2))
        .unwrap();
    board.commit();

    board.change_item_shape(a, 0, Shape::Box(IntBox::new(0, 0, 14, 2))).unwrap();
    board.set_clearance_value(2, 2, 0, 25).unwrap();
    board.commit();

    board.remove_item(b).unwrap();
    board.commit();

    assert!(board.undo().unwrap());
    assert!(board.undo().unwrap());
    assert!(board.undo().unwrap());

    assert_eq!(snapshot(&board), before);
    assert!(!board.items().any(|(id, _)| id == a));

    // Redo brings the whole sequence back.
    assert!(board.redo().unwrap());
    assert!(board.redo().unwrap());
    assert!(board.redo().unwrap());
    assert_eq!(board.item_count(), 1);
    assert_eq!(board.rules.clearance_matrix.value(2, 2, 0), 25);
}

#[test]
fn undo_requires_committed_state() {
    let mut board = two_layer_board();
    board
        .insert_item(boxed_trace(0, IntBox::new(0, 0, 4, 4), 1, 0))
        .unwrap();
    assert_eq!(board.undo(), Err(BoardError::PendingChanges));
    board.commit();
    assert!(board.undo().unwrap());
    assert_eq!(board.item_count(), 0);
}

#[test]
fn rollback_discards_speculative_trial() {
    let mut board = two_layer_board();
    let fixed = board
        .insert_item(boxed_trace(0, IntBox::new(0, 0, 10, 10), 1, 0))
        .unwrap();
    board.commit();

    // Speculative trial: place a candidate, discover it collides, roll back.
    let candidate = board
        .insert_item(boxed_trace(0, IntBox::new(5, 5, 20, 20), 2, 0))
        .unwrap();
    let hits = board
        .find_overlapping(
            board.item(candidate).unwrap().shape_on_layer(0).unwrap(),
            0,
            Some(2),
            0,
        )
        .unwrap();
    assert!(hits.contains(&fixed));
    board.rollback();

    assert_eq!(board.item_count(), 1);
    assert_eq!(board.item(candidate), Err(BoardError::StaleObject(candidate)));
    let probe = Shape::Box(IntBox::new(12, 12, 18, 18));
    assert!(board.find_overlapping(&probe, 0, None, 0).unwrap().is_empty());
}

#[test]
fn find_overlapping_matches_brute_force() {
    let mut rng = StdRng::seed_from_u64(0xb0a2d);
    let mut board = two_layer_board();
    board.append_clearance_class("signal").unwrap();
    board.append_clearance_class("power").unwrap();
    board.set_clearance_value_all_layers(2, 2, 4).unwrap();
    board.set_clearance_value_all_layers(2, 3, 9).unwrap();
    board.set_clearance_value(3, 3, 1, 15).unwrap();
    board.commit();

    let classes = [0usize, 2, 3];
    for _ in 0..500 {
        let x = rng.gen_range(-300..=300);
        let y = rng.gen_range(-300..=300);
        let w = rng.gen_range(1..=20);
        let h = rng.gen_range(1..=20);
        let layer = rng.gen_range(0..2);
        let net = rng.gen_range(1..=20);
        let class = classes[rng.gen_range(0..classes.len())];
        board
            .insert_item(boxed_trace(layer, IntBox::new(x, y, x + w, y + h), net, class))
            .unwrap();
    }
    board.commit();

    let matrix = board.rules.clearance_matrix.clone();
    for _ in 0..200 {
        let x = rng.gen_range(-300..=300);
        let y = rng.gen_range(-300..=300);
        let probe = Shape::Box(IntBox::new(x, y, x + rng.gen_range(1..=30), y + rng.gen_range(1..=30)));
        let layer = rng.gen_range(0..2);
        let net = Some(rng.gen_range(1..=20u32));
        let class = classes[rng.gen_range(0..classes.len())];

        let fast: HashSet<ItemId> = board
            .find_overlapping(&probe, layer, net, class)
            .unwrap()
            .into_iter()
            .collect();
        let slow: HashSet<ItemId> = board
            .items()
            .filter(|(_, item)| !item.shares_net(net))
            .filter_map(|(id, item)| {
                let shape = item.shape_on_layer(layer)?;
                let clearance = matrix.value(item.clearance_class, class, layer);
                shape.intersects_with_clearance(&probe, clearance).then_some(id)
            })
            .collect();
        assert_eq!(fast, slow);
    }
}

#[test]
fn class_removal_blocked_while_referenced() {
    let mut board = two_layer_board();
    board.append_clearance_class("signal").unwrap();
    board.append_clearance_class("power").unwrap();
    let x = board
        .insert_item(boxed_trace(0, IntBox::new(0, 0, 5, 5), 1, 3))
        .unwrap();
    board.commit();

    // Item x is on "power" (index 3): removal must fail without mutation.
    assert_eq!(
        board.remove_clearance_class(3),
        Err(BoardError::ClassInUse {
            class: 3,
            item_count: 1
        })
    );
    assert_eq!(board.rules.clearance_matrix.get_class_count(), 4);

    // After reassigning x to "signal", removal succeeds and renumbers.
    board.change_item_class(x, 2).unwrap();
    board.remove_clearance_class(3).unwrap();
    board.commit();
    assert_eq!(board.rules.clearance_matrix.get_class_count(), 3);
    let names: Vec<_> = (0..3)
        .filter_map(|i| board.rules.clearance_matrix.get_name(i))
        .collect();
    assert_eq!(names, vec!["default", "null", "signal"]);
    assert_eq!(board.item(x).unwrap().clearance_class, 2);
}

#[test]
fn compensation_follows_clearance_edits() {
    let mut board = two_layer_board();
    board.append_clearance_class("signal").unwrap();
    let a = board
        .insert_item(boxed_trace(0, IntBox::new(0, 0, 10, 10), 1, 2))
        .unwrap();
    board.commit();

    // 6 units away from the item; clearance 0 passes.
    let probe = Shape::Box(IntBox::new(16, 0, 24, 10));
    assert!(board.find_overlapping(&probe, 0, Some(2), 2).unwrap().is_empty());

    // Raising the clearance must be visible on the very next query.
    board.set_clearance_value(2, 2, 0, 8).unwrap();
    assert_eq!(board.find_overlapping(&probe, 0, Some(2), 2).unwrap(), vec![a]);

    // And lowering it again releases the violation.
    board.set_clearance_value(2, 2, 0, 5).unwrap();
    assert!(board.find_overlapping(&probe, 0, Some(2), 2).unwrap().is_empty());
    board.commit();

    // The null class never requires clearance.
    assert_eq!(board.clearance_value(2, 1, 0), 0);
}

#[test]
fn stale_tree_handles_are_reported() {
    let mut board = two_layer_board();
    let a = board
        .insert_item(boxed_trace(0, IntBox::new(0, 0, 5, 5), 1, 0))
        .unwrap();
    board.remove_item(a).unwrap();
    assert_eq!(board.remove_item(a), Err(BoardError::NotInTree(a)));
    assert_eq!(board.move_item(a, coppertrace_geometry::Vector::new(1, 0)), Err(BoardError::NotInTree(a)));
}
