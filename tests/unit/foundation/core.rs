use super::*;

#[test]
fn fps_rejects_zero_parts() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(60, 0).is_err());
    let fps = Fps::new(60, 1).unwrap();
    assert_eq!(fps.as_f64(), 60.0);
    assert_eq!(fps.frames_to_secs(120), 2.0);
}

#[test]
fn grid_rejects_empty_dimensions() {
    assert!(GridDims::new(0, 2).is_err());
    assert!(GridDims::new(2, 0).is_err());
    let g = GridDims::new(4, 2).unwrap();
    assert_eq!(g.cells(), 8);
    assert_eq!(g.cell_index(1, 3), 7);
    assert_eq!(GridDims::default(), GridDims::SINGLE);
}

#[test]
fn latent_distance_and_direction() {
    let a = Latent::from_vec(vec![3.0, 4.0]);
    let b = Latent::from_vec(vec![0.0, 0.0]);
    assert_eq!(a.norm(), 5.0);
    assert_eq!(a.distance(&b).unwrap(), 5.0);

    let dir = a.direction_from(&b).unwrap();
    assert!((dir[0] - 0.6).abs() < 1e-12);
    assert!((dir[1] - 0.8).abs() < 1e-12);
}

#[test]
fn direction_between_identical_latents_fails() {
    let a = Latent::from_vec(vec![1.0, 2.0]);
    let err = a.direction_from(&a.clone()).unwrap_err();
    assert!(matches!(err, WalkError::Configuration(_)));
}

#[test]
fn dimension_mismatch_is_reported() {
    let a = Latent::from_vec(vec![1.0, 2.0]);
    let b = Latent::from_vec(vec![1.0]);
    assert!(a.distance(&b).is_err());
}
