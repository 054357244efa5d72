use super::*;

fn keyframes() -> Vec<Latent> {
    vec![
        Latent::from_vec(vec![0.0, 1.0, -2.0]),
        Latent::from_vec(vec![3.0, -1.0, 0.5]),
        Latent::from_vec(vec![-1.5, 2.0, 4.0]),
    ]
}

fn assert_close(a: &Latent, b: &Latent, tol: f32) {
    assert_eq!(a.dim(), b.dim());
    for (x, y) in a.as_slice().iter().zip(b.as_slice()) {
        assert!((x - y).abs() <= tol, "{a:?} vs {b:?}");
    }
}

#[test]
fn path_closes_after_one_cycle() {
    let keys = keyframes();
    for kind in [SplineKind::Nearest, SplineKind::Linear, SplineKind::Cubic] {
        let path = SplinePath::new(&keys, 1, kind).unwrap();
        let start = path.sample(0.0).unwrap();
        let end = path.sample(keys.len() as f64).unwrap();
        assert_eq!(start, end, "{kind:?}");
    }
}

#[test]
fn path_passes_through_keyframes() {
    let keys = keyframes();
    let path = SplinePath::new(&keys, 2, SplineKind::Cubic).unwrap();
    for (i, key) in keys.iter().enumerate() {
        assert_close(&path.sample(i as f64).unwrap(), key, 1e-5);
    }
}

#[test]
fn path_is_continuous_across_the_loop_point() {
    let keys = keyframes();
    let k = keys.len() as f64;
    let path = SplinePath::new(&keys, 2, SplineKind::Cubic).unwrap();
    let before = path.sample(k - 1e-4).unwrap();
    let after = path.sample(1e-4).unwrap();
    assert_close(&before, &after, 1e-2);
}

#[test]
fn domain_spans_the_tiled_axis() {
    let path = SplinePath::new(&keyframes(), 2, SplineKind::Cubic).unwrap();
    assert_eq!(path.domain(), (-6.0, 8.0));
    assert!(path.sample(-6.5).is_err());
    assert!(path.sample(8.5).is_err());
    assert!(path.sample(8.0).is_ok());
}

#[test]
fn linear_interpolates_midpoints() {
    let path = SplinePath::new(&keyframes(), 1, SplineKind::Linear).unwrap();
    let mid = path.sample(0.5).unwrap();
    assert_close(&mid, &Latent::from_vec(vec![1.5, 0.0, -0.75]), 1e-6);
}

#[test]
fn nearest_snaps_and_breaks_ties_downwards() {
    let keys = keyframes();
    let path = SplinePath::new(&keys, 1, SplineKind::Nearest).unwrap();
    assert_eq!(path.sample(0.5).unwrap(), keys[0]);
    assert_eq!(path.sample(0.51).unwrap(), keys[1]);
    assert_eq!(path.sample(1.49).unwrap(), keys[1]);
}

#[test]
fn cubic_needs_four_points() {
    let one = vec![Latent::from_vec(vec![1.0])];
    let err = SplinePath::new(&one, 1, SplineKind::Cubic).unwrap_err();
    assert!(matches!(err, WalkError::Configuration(_)));
    assert!(SplinePath::new(&one, 2, SplineKind::Cubic).is_ok());
    assert!(SplinePath::new(&one, 0, SplineKind::Linear).is_err());
    assert!(SplinePath::new(&one, 0, SplineKind::Nearest).is_ok());
}

#[test]
fn rejects_empty_and_ragged_keyframes() {
    assert!(SplinePath::new(&[], 2, SplineKind::Cubic).is_err());
    let ragged = vec![Latent::from_vec(vec![1.0, 2.0]), Latent::from_vec(vec![1.0])];
    assert!(SplinePath::new(&ragged, 2, SplineKind::Cubic).is_err());
}

#[test]
fn not_a_knot_reproduces_cubic_polynomials() {
    // y = x^3 - 2x on x = 0..7 has second derivative 6x everywhere.
    let n = 8;
    let values: Vec<f64> = (0..n)
        .map(|i| {
            let x = i as f64;
            x * x * x - 2.0 * x
        })
        .collect();
    let m = not_a_knot_curvature(&values, n, 1);
    for (i, mi) in m.iter().enumerate() {
        assert!((mi - 6.0 * i as f64).abs() < 1e-9, "M[{i}] = {mi}");
    }
}

#[test]
fn not_a_knot_handles_the_minimum_point_count() {
    let values = [1.0, 8.0, 27.0, 64.0];
    let m = not_a_knot_curvature(&values, 4, 1);
    // y = (x + 1)^3 => y'' = 6(x + 1).
    for (i, mi) in m.iter().enumerate() {
        assert!((mi - 6.0 * (i as f64 + 1.0)).abs() < 1e-9, "M[{i}] = {mi}");
    }
}

#[test]
fn oversized_wraps_are_configuration_errors() {
    let err = SplinePath::new(&keyframes(), usize::MAX / 2, SplineKind::Cubic).unwrap_err();
    assert!(matches!(err, WalkError::Configuration(_)), "{err}");
    let err = SplinePath::new(&keyframes(), usize::MAX / 4, SplineKind::Linear).unwrap_err();
    assert!(matches!(err, WalkError::Configuration(_)), "{err}");
}
