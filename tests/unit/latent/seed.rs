use super::*;

#[test]
fn same_seed_yields_identical_latents() {
    let a = sample_latent(42, 512);
    let b = sample_latent(42, 512);
    assert_eq!(a.dim(), 512);
    let bits_a: Vec<u32> = a.as_slice().iter().map(|v| v.to_bits()).collect();
    let bits_b: Vec<u32> = b.as_slice().iter().map(|v| v.to_bits()).collect();
    assert_eq!(bits_a, bits_b);
}

#[test]
fn different_seeds_yield_different_latents() {
    assert_ne!(sample_latent(1, 64), sample_latent(2, 64));
}

#[test]
fn sampling_is_independent_of_call_order() {
    let first = sample_latent(7, 16);
    let _ = sample_latent(8, 16);
    let _ = sample_latent(9, 16);
    assert_eq!(sample_latent(7, 16), first);
}

#[test]
fn samples_look_standard_normal() {
    let z = sample_latent(3, 4096);
    let n = z.dim() as f64;
    let mean = z.as_slice().iter().map(|&v| f64::from(v)).sum::<f64>() / n;
    let var = z
        .as_slice()
        .iter()
        .map(|&v| (f64::from(v) - mean).powi(2))
        .sum::<f64>()
        / n;
    assert!(mean.abs() < 0.1, "mean = {mean}");
    assert!((var - 1.0).abs() < 0.15, "var = {var}");
}

#[test]
fn seed_count_must_divide_grid_without_explicit_keyframes() {
    let grid = GridDims::new(2, 2).unwrap();
    let err = expand_keyframes(&[1, 2, 3, 4, 5], grid, None, None).unwrap_err();
    assert!(matches!(err, WalkError::Configuration(_)));

    let seeds: Vec<u32> = (0..8).collect();
    let expanded = expand_keyframes(&seeds, grid, None, None).unwrap();
    assert_eq!(expanded.num_keyframes(), 2);
    assert_eq!(expanded.as_slice().len(), 8);
}

#[test]
fn explicit_keyframes_cycle_through_seeds() {
    let grid = GridDims::new(2, 1).unwrap();
    let expanded = expand_keyframes(&[10, 20, 30], grid, Some(4), None).unwrap();
    assert_eq!(expanded.as_slice(), &[10, 20, 30, 10, 20, 30, 10, 20]);
    assert_eq!(expanded.cell(0, 0), &[10, 20, 30, 10]);
    assert_eq!(expanded.cell(0, 1), &[20, 30, 10, 20]);
}

#[test]
fn cells_are_row_major() {
    let grid = GridDims::new(2, 2).unwrap();
    let seeds: Vec<u32> = (0..8).collect();
    let expanded = expand_keyframes(&seeds, grid, None, None).unwrap();
    assert_eq!(expanded.cell(0, 0), &[0, 1]);
    assert_eq!(expanded.cell(0, 1), &[2, 3]);
    assert_eq!(expanded.cell(1, 0), &[4, 5]);
    assert_eq!(expanded.cell(1, 1), &[6, 7]);
}

#[test]
fn shuffle_is_deterministic_per_shuffle_seed() {
    let seeds: Vec<u32> = (0..32).collect();
    let grid = GridDims::new(4, 2).unwrap();
    let a = expand_keyframes(&seeds, grid, None, Some(5)).unwrap();
    let b = expand_keyframes(&seeds, grid, None, Some(5)).unwrap();
    let c = expand_keyframes(&seeds, grid, None, Some(6)).unwrap();
    assert_eq!(a, b);
    assert_ne!(a.as_slice(), c.as_slice());

    let mut sorted = a.as_slice().to_vec();
    sorted.sort_unstable();
    assert_eq!(sorted, seeds);
}

#[test]
fn rejects_empty_seeds_and_zero_keyframes() {
    assert!(expand_keyframes(&[], GridDims::SINGLE, None, None).is_err());
    assert!(expand_keyframes(&[1], GridDims::SINGLE, Some(0), None).is_err());
}

#[test]
fn oversized_keyframe_counts_are_configuration_errors() {
    let grid = GridDims::new(2, 1).unwrap();
    let err = expand_keyframes(&[1, 2], grid, Some(usize::MAX / 2 + 1), None).unwrap_err();
    assert!(matches!(err, WalkError::Configuration(_)), "{err}");
}
