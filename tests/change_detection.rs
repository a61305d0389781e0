use gasgrid::core::{
    apply_changes, create_grid_with, detect_changes, diff, step, ChangeSet, GasRegistry, Grid,
};
use gasgrid::error::Result;
use rand::{rngs::StdRng, SeedableRng};

/// Soundness on equal shapes: a position is reported iff its kind differs, and the
/// reported cell is the new content.
#[test]
fn diff_reports_exactly_the_differing_positions() -> Result<()> {
    let registry = GasRegistry::default();
    let mut rng = StdRng::seed_from_u64(31337);
    for _ in 0..20 {
        let a = create_grid_with(&registry, 9, 7, &mut rng)?;
        let b = create_grid_with(&registry, 9, 7, &mut rng)?;
        let changes = diff(&a, &b);

        let expected: Vec<_> = a
            .iter()
            .zip(b.iter())
            .filter(|((_, ca), (_, cb))| ca != cb)
            .map(|(_, (p, cb))| (p, cb))
            .collect();
        let got: Vec<_> = changes.iter().map(|c| (c.position, c.cell)).collect();
        assert_eq!(got, expected);
        assert!(diff(&a, &a).is_empty());
    }
    Ok(())
}

/// Reshape falls back to the whole new grid, in scan order.
#[test]
fn diff_of_reshaped_grids_is_full_new_grid() -> Result<()> {
    let registry = GasRegistry::default();
    let mut rng = StdRng::seed_from_u64(8);
    let small = create_grid_with(&registry, 3, 3, &mut rng)?;
    let large = create_grid_with(&registry, 4, 3, &mut rng)?;

    let changes = diff(&small, &large);
    assert_eq!(changes.len(), large.len());
    for (change, (pos, cell)) in changes.iter().zip(large.iter()) {
        assert_eq!((change.position, change.cell), (pos, cell));
    }
    assert!(matches!(
        detect_changes(&large, &small),
        ChangeSet::Reshaped(ref cells) if cells.len() == small.len()
    ));
    Ok(())
}

/// Replaying a tick's delta onto the pre-step grid reproduces the post-step grid,
/// and replaying it again changes nothing.
#[test]
fn step_delta_replays_idempotently() -> Result<()> {
    let registry = GasRegistry::default();
    let mut rng = StdRng::seed_from_u64(4);
    let before = create_grid_with(&registry, 20, 15, &mut rng)?;
    let after = step(&before, &registry);
    let changes = diff(&before, &after);
    assert!(!changes.is_empty());

    let mut view: Grid = before.clone();
    apply_changes(&mut view, &changes)?;
    assert_eq!(view, after);
    apply_changes(&mut view, &changes)?;
    assert_eq!(view, after);
    Ok(())
}
