extern crate bvr_bridge;

use image::ImageFormat;
use bvr_bridge::common::{BvrImage, DetectionLayout, ModelConfig};
use bvr_bridge::data::{encode_frame_line, InputType, LabelMap, OutputLine};
use bvr_bridge::detection_runners::{BvrSsd, InferenceProcess};
use bvr_bridge::BvrError;

mod common;
use common::*;

#[test]
fn detection() {
    let engine = FakeEngine::new(InputType::Uint8)
        .replying(ssd_outputs(&[[0.1, 0.1, 0.5, 0.5]], &[1.], &[0.9]));
    let mut ssd = detector(engine, &["cat", "dog"]);

    let detections = ssd.detect_encoded(&png(320, 320)).unwrap();
    let json = OutputLine::from(detections).to_json().unwrap();

    assert_eq!(json, r#"[{"object_name":"dog","confidence":0.9,"xmin":32,"ymin":32,"xmax":160,"ymax":160}]"#);
}

#[test]
fn detection_end_to_end() {
    let engine = FakeEngine::new(InputType::Uint8)
        .replying(ssd_outputs(&[[0.1, 0.1, 0.5, 0.5]], &[1.], &[0.9]));
    let mut ssd = detector(engine, &["cat", "dog"]);

    let input = format!("{}\n", encode_frame_line(&png(320, 320)));
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let stats = bvr_bridge::serve(&mut ssd, input.as_bytes(), &mut stdout, &mut stderr).unwrap();

    assert_eq!(
        String::from_utf8(stdout).unwrap(),
        "[{\"object_name\":\"dog\",\"confidence\":0.9,\"xmin\":32,\"ymin\":32,\"xmax\":160,\"ymax\":160}]\n"
    );
    assert!(stderr.is_empty());
    assert_eq!(stats.frames_ok, 1);
    assert_eq!(stats.timing.n(), 1);
}

#[test]
fn boxes_use_original_frame_size() {
    let engine = FakeEngine::new(InputType::Uint8)
        .replying(ssd_outputs(&[[0.5, 0.25, 1.0, 0.75]], &[0.], &[0.8]));
    let mut ssd = detector(engine, &["cat"]);

    let jpeg = encode(&solid(640, 480, [10, 200, 30]), ImageFormat::Jpeg);
    let dets = ssd.detect_encoded(&jpeg).unwrap();

    assert_eq!(dets.len(), 1);
    assert_eq!((dets[0].xmin, dets[0].ymin, dets[0].xmax, dets[0].ymax), (160, 240, 480, 480));
    assert_eq!(ssd.engine().inputs[0].shape(), &[1, 320, 320, 3]);
}

#[test]
fn quantized_model_gets_raw_pixels() {
    let mut ssd = detector(FakeEngine::new(InputType::Uint8), &["cat"]);
    ssd.detect(&BvrImage::from(solid(100, 50, [255, 0, 77]))).unwrap();

    let x = ssd.engine().inputs[0].as_quantized().unwrap();
    assert_eq!((x[[0, 160, 160, 0]], x[[0, 160, 160, 1]], x[[0, 160, 160, 2]]), (255, 0, 77));
}

#[test]
fn float_model_gets_normalized_pixels() {
    let mut ssd = detector(FakeEngine::new(InputType::Float32), &["cat"]);
    ssd.detect(&BvrImage::from(solid(100, 50, [255, 0, 0]))).unwrap();

    let x = ssd.engine().inputs[0].as_float().unwrap();
    assert_eq!(x.shape(), &[1, 320, 320, 3]);
    assert_eq!((x[[0, 7, 9, 0]], x[[0, 7, 9, 1]]), (1.0, -1.0));
}

#[test]
fn unknown_class_fails_the_frame() {
    let engine = FakeEngine::new(InputType::Uint8)
        .replying(ssd_outputs(&[[0.1, 0.1, 0.5, 0.5]], &[4.], &[0.9]));
    let mut ssd = detector(engine, &["cat", "dog"]);

    let err = ssd.detect_encoded(&png(32, 32)).unwrap_err();
    assert!(matches!(err, BvrError::UnknownClass { class_id: 4, labels: 2 }));
}

#[test]
fn low_and_invalid_scores_are_dropped() {
    let engine = FakeEngine::new(InputType::Uint8).replying(ssd_outputs(
        &[[0.1, 0.1, 0.2, 0.2], [0.2, 0.2, 0.4, 0.4], [0.3, 0.3, 0.6, 0.6], [0.0, 0.0, 1.0, 1.0]],
        &[0., 1., 0., 1.],
        &[0.3, 0.75, 1.5, 1.0],
    ));
    let mut ssd = detector(engine, &["cat", "dog"]);

    let dets = ssd.detect_encoded(&png(100, 100)).unwrap();
    assert_eq!(dets.len(), 2);
    assert_eq!((dets[0].object_name.as_str(), dets[0].confidence), ("dog", 0.75));
    assert_eq!((dets[1].object_name.as_str(), dets[1].confidence), ("dog", 1.0));
    // full-frame box is clamped to the frame
    assert_eq!((dets[1].xmin, dets[1].ymin, dets[1].xmax, dets[1].ymax), (1, 1, 100, 100));
    for det in &dets {
        assert!(det.confidence > 0.5 && det.confidence <= 1.0);
    }
}

#[test]
fn collapsed_box_does_not_crash() {
    let engine = FakeEngine::new(InputType::Uint8)
        .replying(ssd_outputs(&[[0.0, 0.0, 0.001, 0.001]], &[0.], &[0.9]));
    let mut ssd = detector(engine, &["cat"]);

    let dets = ssd.detect_encoded(&png(200, 200)).unwrap();
    assert_eq!((dets[0].xmin, dets[0].ymin, dets[0].xmax, dets[0].ymax), (1, 1, 0, 0));
}

#[test]
fn warmup_discards_outputs() {
    // an unresolvable class would fail a real frame
    let engine = FakeEngine::new(InputType::Float32)
        .replying(ssd_outputs(&[[0.1, 0.1, 0.5, 0.5]], &[9.], &[0.9]));
    let mut ssd = detector(engine, &["cat"]);

    ssd.warmup(3).unwrap();
    assert_eq!(ssd.engine().runs(), 3);
    assert!(ssd.ts().ts().is_empty());
}

#[test]
fn run_matches_forward() {
    let engine = FakeEngine::new(InputType::Uint8)
        .replying(ssd_outputs(&[[0.1, 0.1, 0.5, 0.5]], &[0.], &[0.6]));
    let mut ssd = detector(engine, &["cat"]);
    let frame = BvrImage::from(solid(64, 64, [1, 2, 3]));

    let a = ssd.run(&frame).unwrap();
    let b = ssd.forward(&frame, true).unwrap();
    assert_eq!(a, b);
    assert_eq!(ssd.ts().n(), 1);
}

#[test]
fn layout_must_fit_model_outputs() {
    let config = ModelConfig::default().with_layout(DetectionLayout::new(1, 4, 0));
    let result = BvrSsd::new(FakeEngine::new(InputType::Uint8), LabelMap::from(&["cat"][..]), &config);
    assert!(result.is_err());
}
