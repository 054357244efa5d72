use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        WalkError::configuration("x")
            .to_string()
            .contains("configuration error:")
    );
    assert!(
        WalkError::resource("x")
            .to_string()
            .contains("resource error:")
    );
    assert!(
        WalkError::runtime("x")
            .to_string()
            .contains("runtime error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = WalkError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn candle_errors_are_runtime_errors() {
    let err: WalkError = candle_core::Error::Msg("bad shape".to_string()).into();
    assert!(matches!(err, WalkError::Runtime(_)));
    assert!(err.to_string().contains("bad shape"));
}
