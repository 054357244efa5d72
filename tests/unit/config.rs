use super::*;

#[test]
fn parses_seeds_and_ranges() {
    assert_eq!(
        parse_seed_list("1,2,5-10").unwrap(),
        vec![1, 2, 5, 6, 7, 8, 9, 10]
    );
    assert_eq!(parse_seed_list("3-3").unwrap(), vec![3]);
    assert_eq!(parse_seed_list("0-31").unwrap().len(), 32);
    assert_eq!(parse_seed_list(" 4 , 7").unwrap(), vec![4, 7]);
}

#[test]
fn malformed_seed_lists_are_configuration_errors() {
    for bad in ["a-b", "", "1,,2", "-3", "5-", "1-2-3", "4-2", "99999999999"] {
        let err = parse_seed_list(bad).unwrap_err();
        assert!(
            matches!(err, WalkError::Configuration(_)),
            "input {bad:?} gave {err}"
        );
    }
}

#[test]
fn parses_grid_tuples() {
    assert_eq!(parse_grid("4x2").unwrap(), GridDims::new(4, 2).unwrap());
    assert_eq!(parse_grid("4,2").unwrap(), GridDims::new(4, 2).unwrap());
}

#[test]
fn malformed_grid_tuples_are_configuration_errors() {
    for bad in ["4", "4x", "x2", "4x2x1", "0x2", "ax2", "4;2"] {
        let err = parse_grid(bad).unwrap_err();
        assert!(
            matches!(err, WalkError::Configuration(_)),
            "input {bad:?} gave {err}"
        );
    }
}

#[test]
fn defaults_match_command_line_defaults() {
    let cfg = WalkConfig::new(vec![1, 2, 3]);
    assert_eq!(cfg.interpolation, Interpolation::Lerp);
    assert_eq!(cfg.grid, GridDims::SINGLE);
    assert_eq!(cfg.w_frames, 120);
    assert_eq!(cfg.kind, SplineKind::Cubic);
    assert_eq!(cfg.wraps, 2);
    assert_eq!(cfg.diameter, 100.0);
    assert_eq!(cfg.truncation_psi, 1.0);
    assert!(!cfg.stabilize);
    cfg.validate().unwrap();
}

#[test]
fn validation_rejects_bad_settings() {
    let mut cfg = WalkConfig::new(vec![1, 2, 3]);
    cfg.w_frames = 0;
    assert!(cfg.validate().is_err());

    let mut cfg = WalkConfig::new(vec![1, 2, 3]);
    cfg.wraps = 0;
    assert!(cfg.validate().is_err());

    let mut cfg = WalkConfig::new(vec![1, 2]);
    cfg.interpolation = Interpolation::CircularLoop;
    assert!(cfg.validate().is_err());

    let cfg = WalkConfig::new(vec![]);
    assert!(cfg.validate().is_err());
}

#[test]
fn circular_loop_ignores_grid() {
    let mut cfg = WalkConfig::new(vec![1, 2, 3]);
    cfg.grid = GridDims::new(3, 2).unwrap();
    assert_eq!(cfg.effective_grid(), cfg.grid);
    cfg.interpolation = Interpolation::CircularLoop;
    assert_eq!(cfg.effective_grid(), GridDims::SINGLE);
}

#[test]
fn config_serializes_to_json() {
    let mut cfg = WalkConfig::new(vec![1, 2, 3]);
    cfg.interpolation = Interpolation::CircularLoop;
    let json = serde_json::to_value(&cfg).unwrap();
    assert_eq!(json["interpolation"], "circularloop");
    assert_eq!(json["kind"], "cubic");
    let back: WalkConfig = serde_json::from_value(json).unwrap();
    assert_eq!(back.seeds, vec![1, 2, 3]);
}

#[test]
fn validation_caps_wraps_and_keyframes() {
    let mut cfg = WalkConfig::new(vec![1, 2, 3]);
    cfg.wraps = MAX_WRAPS;
    cfg.validate().unwrap();
    cfg.wraps = MAX_WRAPS + 1;
    assert!(matches!(cfg.validate(), Err(WalkError::Configuration(_))));

    let mut cfg = WalkConfig::new(vec![1, 2, 3]);
    cfg.num_keyframes = Some(MAX_KEYFRAMES);
    cfg.validate().unwrap();
    cfg.num_keyframes = Some(usize::MAX / 2 + 1);
    assert!(matches!(cfg.validate(), Err(WalkError::Configuration(_))));
}
