use super::*;

fn cfg(width: u32, height: u32, channels: u32) -> SinkConfig {
    SinkConfig {
        width,
        height,
        channels,
        fps: Fps::new(60, 1).unwrap(),
    }
}

fn frame(width: u32, height: u32, channels: u32, fill: u8) -> Frame {
    Frame {
        width,
        height,
        channels,
        data: vec![fill; (width * height * channels) as usize],
    }
}

#[test]
fn check_frame_catches_mismatches() {
    let c = cfg(4, 2, 3);
    assert_eq!(c.frame_bytes(), 24);
    c.check_frame(&frame(4, 2, 3, 0)).unwrap();
    assert!(c.check_frame(&frame(2, 4, 3, 0)).is_err());
    assert!(c.check_frame(&frame(4, 2, 1, 0)).is_err());

    let mut short = frame(4, 2, 3, 0);
    short.data.pop();
    assert!(c.check_frame(&short).is_err());
}

#[test]
fn in_memory_sink_records_lifecycle() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg(2, 2, 3)).unwrap();
    sink.push_frame(FrameIndex(0), &frame(2, 2, 3, 1)).unwrap();
    sink.push_frame(FrameIndex(1), &frame(2, 2, 3, 2)).unwrap();
    sink.end().unwrap();

    assert_eq!(sink.config(), Some(&cfg(2, 2, 3)));
    assert_eq!(sink.frames().len(), 2);
    assert_eq!(sink.frames()[1].1.data[0], 2);
    assert!(sink.finished());
    assert!(!sink.aborted());
}

#[test]
fn png_sink_writes_numbered_frames() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("frames");
    let mut sink = PngSequenceSink::new(&out);
    sink.begin(cfg(4, 2, 3)).unwrap();
    sink.push_frame(FrameIndex(0), &frame(4, 2, 3, 10)).unwrap();
    sink.push_frame(FrameIndex(1), &frame(4, 2, 3, 20)).unwrap();
    sink.end().unwrap();

    let path = sink.frame_path(FrameIndex(1));
    assert!(path.ends_with("frame_000001.png"));
    let img = image::open(&path).unwrap().to_rgb8();
    assert_eq!(img.dimensions(), (4, 2));
    assert_eq!(img.get_pixel(3, 1).0, [20, 20, 20]);
}

#[test]
fn png_sink_rejects_out_of_order_frames() {
    let dir = tempfile::tempdir().unwrap();
    let mut sink = PngSequenceSink::new(dir.path());
    sink.begin(cfg(2, 2, 1)).unwrap();
    sink.push_frame(FrameIndex(3), &frame(2, 2, 1, 0)).unwrap();
    assert!(sink.push_frame(FrameIndex(3), &frame(2, 2, 1, 0)).is_err());
    assert!(sink.push_frame(FrameIndex(2), &frame(2, 2, 1, 0)).is_err());
}

#[test]
fn png_write_failures_carry_the_frame_path() {
    let dir = tempfile::tempdir().unwrap();
    let mut sink = PngSequenceSink::new(dir.path());
    sink.begin(cfg(2, 2, 3)).unwrap();
    // A directory squatting on the frame path makes the write fail.
    std::fs::create_dir(sink.frame_path(FrameIndex(0))).unwrap();

    let err = sink
        .push_frame(FrameIndex(0), &frame(2, 2, 3, 0))
        .unwrap_err();
    assert!(matches!(err, WalkError::Other(_)), "{err}");
    assert!(err.to_string().contains("frame_000000.png"), "{err}");
}

#[test]
fn png_sink_rejects_unsupported_channel_counts() {
    let dir = tempfile::tempdir().unwrap();
    let mut sink = PngSequenceSink::new(dir.path());
    let err = sink.begin(cfg(2, 2, 2)).unwrap_err();
    assert!(matches!(err, WalkError::Configuration(_)));
}

#[test]
fn png_sink_requires_begin() {
    let dir = tempfile::tempdir().unwrap();
    let mut sink = PngSequenceSink::new(dir.path());
    assert!(sink.push_frame(FrameIndex(0), &frame(2, 2, 3, 0)).is_err());
}
