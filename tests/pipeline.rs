//! End-to-end tests for the landmark classification pipeline.
//!
//! These tests drive the public API the way a frame loop would: load weights
//! once, then push tracker frames through per-stream state.

use std::sync::Arc;
use std::thread;

use approx::assert_relative_eq;
use hand_gesture::{
    decide, Classification, FeatureVector, FrameScheduler, GestureError, GestureStream,
    LinearClassifier, PipelineConfig, WeightMatrix, FEATURE_DIM, HAND_LANDMARKS,
};

// =============================================================================
// FIXTURES
// =============================================================================

/// Weights with row 0 = e0, row 1 = e1.
fn unit_weights_json() -> String {
    let mut w = vec![vec![0.0; FEATURE_DIM]; 2];
    w[0][0] = 1.0;
    w[1][1] = 1.0;
    serde_json::json!({ "W": w, "b": [0.0, 0.0], "labels": ["A", "B"] }).to_string()
}

/// Three letters keyed on the direction the fingers point from the wrist.
fn letter_weights() -> WeightMatrix {
    let mut right = vec![0.0; FEATURE_DIM];
    let mut up = vec![0.0; FEATURE_DIM];
    for i in 1..HAND_LANDMARKS {
        right[i * 3] = 1.0;
        up[i * 3 + 1] = 1.0;
    }
    WeightMatrix::new(
        vec![right, up, vec![0.0; FEATURE_DIM]],
        vec![0.0, 0.0, 2.0],
        vec!["A".into(), "B".into(), "C".into()],
    )
    .unwrap()
}

/// A hand whose landmarks fan out from `wrist` along `dir`.
fn pose(wrist: [f64; 3], dir: [f64; 3], spread: f64) -> Vec<[f64; 3]> {
    (0..HAND_LANDMARKS)
        .map(|i| {
            let t = spread * i as f64;
            [wrist[0] + dir[0] * t, wrist[1] + dir[1] * t, wrist[2] + dir[2] * t]
        })
        .collect()
}

// =============================================================================
// SCENARIOS
// =============================================================================

#[test]
fn test_unit_weights_scenario() {
    let mut clf = LinearClassifier::new();
    clf.load_json_str(&unit_weights_json()).unwrap();

    let mut x = [0.0; FEATURE_DIM];
    x[0] = 1.0;
    let pred = clf.classify(&FeatureVector::from_array(x)).unwrap();

    assert_eq!(clf.logits(&FeatureVector::from_array(x)).unwrap(), vec![1.0, 0.0]);
    assert_relative_eq!(pred.probs.get(0).unwrap(), 0.731, epsilon = 1e-3);
    assert_relative_eq!(pred.probs.get(1).unwrap(), 0.269, epsilon = 1e-3);
    assert_relative_eq!(pred.probs.sum(), 1.0, epsilon = 1e-6);
    assert_eq!(decide(&pred.labels, pred.probs.as_slice(), 0.7).unwrap(), Some("A"));
}

#[test]
fn test_missing_labels_leaves_classifier_not_ready() {
    let mut w = vec![vec![0.0; FEATURE_DIM]; 2];
    w[0][0] = 1.0;
    let json = serde_json::json!({ "W": w, "b": [0.0, 0.0] }).to_string();

    let mut clf = LinearClassifier::new();
    let err = clf.load_json_str(&json).unwrap_err();
    assert!(matches!(err, GestureError::Format(_)));

    let x = FeatureVector::from_array([0.0; FEATURE_DIM]);
    assert!(matches!(clf.classify(&x), Err(GestureError::NotReady)));
}

#[test]
fn test_weights_file_round_trip() {
    let path = std::env::temp_dir().join(format!("hand_gesture_weights_{}.json", std::process::id()));
    std::fs::write(&path, letter_weights().to_json_string().unwrap()).unwrap();

    let mut clf = LinearClassifier::new();
    clf.load_path(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(clf.labels().unwrap(), letter_weights().labels());
}

#[test]
fn test_stream_settles_on_held_gesture() {
    let clf = LinearClassifier::with_weights(letter_weights());
    let mut stream = GestureStream::new(PipelineConfig::default()).unwrap();

    let right = pose([0.5, 0.5, 0.0], [1.0, 0.0, 0.0], 0.01);
    let up = pose([0.5, 0.5, 0.0], [0.0, 1.0, 0.0], 0.01);

    for _ in 0..10 {
        let out = stream.process(&clf, &right).unwrap();
        assert_eq!(out.label(), Some("A"));
    }

    // Switching gesture: EMA delays the new label, then commits to it
    let first = stream.process(&clf, &up).unwrap();
    assert_ne!(first.label(), Some("B"));
    let mut settled = first;
    for _ in 0..10 {
        settled = stream.process(&clf, &up).unwrap();
    }
    assert_eq!(settled.label(), Some("B"));
    assert!(settled.confidence >= 0.7);
}

#[test]
fn test_dropouts_present_as_no_gesture() {
    let clf = LinearClassifier::with_weights(letter_weights());
    let mut stream = GestureStream::new(PipelineConfig::default()).unwrap();
    let right = pose([0.2, 0.7, 0.0], [1.0, 0.0, 0.0], 0.02);

    let frames: Vec<Vec<[f64; 3]>> = vec![right.clone(), vec![], right[..20].to_vec(), right.clone()];
    let labels: Vec<Option<String>> = frames
        .iter()
        .map(|f| stream.process(&clf, f).unwrap().label)
        .collect();

    assert_eq!(labels, vec![Some("A".into()), None, None, Some("A".into())]);
    assert_eq!(stream.stats().frames_without_hand, 2);
}

#[test]
fn test_distance_from_camera_does_not_matter() {
    let clf = LinearClassifier::with_weights(letter_weights());
    let mut near = GestureStream::new(PipelineConfig::default()).unwrap();
    let mut far = GestureStream::new(PipelineConfig::default()).unwrap();

    let a = near.process(&clf, &pose([0.5, 0.5, 0.0], [0.6, 0.8, 0.0], 0.03)).unwrap();
    let b = far.process(&clf, &pose([0.1, 0.9, 0.2], [0.6, 0.8, 0.0], 0.004)).unwrap();
    assert_eq!(a.label, b.label);
    assert_relative_eq!(a.confidence, b.confidence, epsilon = 1e-9);
}

#[test]
fn test_mirroring_maps_left_hand_onto_right() {
    let clf = LinearClassifier::with_weights(letter_weights());
    let mut stream = GestureStream::new(PipelineConfig::default().with_mirror_x(true)).unwrap();
    let left = pose([0.5, 0.5, 0.0], [-1.0, 0.0, 0.0], 0.01);
    assert_eq!(stream.process(&clf, &left).unwrap().label(), Some("A"));
}

#[test]
fn test_camera_preset_recovers_after_dropout() {
    let clf = LinearClassifier::with_weights(letter_weights());
    let mut stream = GestureStream::new(PipelineConfig::camera()).unwrap();
    let held = pose([0.2, 0.7, 0.0], [1.0, 0.0, 0.0], 0.02);

    assert_eq!(stream.process(&clf, &held).unwrap().label(), Some("A"));
    assert_eq!(stream.process(&clf, &[]).unwrap(), Classification::none());

    // Same pose after the tracker loses the hand: reported again at once
    let labels: Vec<Option<String>> = (0..5)
        .map(|_| stream.process(&clf, &held).unwrap().label)
        .collect();
    assert_eq!(labels, vec![Some("A".into()); 5]);

    let stats = stream.stats();
    assert_eq!(stats.frames_without_hand, 1);
    assert_eq!(stats.frames_classified, 2);
    assert_eq!(stats.frames_skipped, 4);
}

#[test]
fn test_camera_preset_with_mirroring() {
    let clf = LinearClassifier::with_weights(letter_weights());
    let config = PipelineConfig::camera().with_mirror_x(true);
    let mut stream = GestureStream::new(config).unwrap();
    let left = pose([0.6, 0.4, 0.0], [-1.0, 0.0, 0.0], 0.015);

    let first = stream.process(&clf, &left).unwrap();
    assert_eq!(first.label(), Some("A"));
    // Gate compares mirrored features, so a still left hand is skipped
    assert_eq!(stream.process(&clf, &left).unwrap(), first);
    assert_eq!(stream.stats().frames_skipped, 1);

    stream.process(&clf, &left[..3]).unwrap();
    assert_eq!(stream.process(&clf, &left).unwrap().label(), Some("A"));
    assert_eq!(stream.stats().frames_classified, 2);
}

#[test]
fn test_stable_preset_suppresses_flicker() {
    let clf = LinearClassifier::with_weights(letter_weights());
    let mut stream = GestureStream::new(PipelineConfig::stable()).unwrap();
    let right = pose([0.5, 0.5, 0.0], [1.0, 0.0, 0.0], 0.01);
    let up = pose([0.5, 0.5, 0.0], [0.0, 1.0, 0.0], 0.01);

    let mut reported = Vec::new();
    for _ in 0..8 {
        reported.push(stream.process(&clf, &right).unwrap().label);
    }
    // A two-frame glitch does not move the reported label
    for _ in 0..2 {
        reported.push(stream.process(&clf, &up).unwrap().label);
    }
    reported.push(stream.process(&clf, &right).unwrap().label);

    assert_eq!(reported.last().unwrap().as_deref(), Some("A"));
    assert!(reported[3..].iter().all(|l| l.as_deref() == Some("A")));
}

#[test]
fn test_not_ready_until_loaded() {
    let mut clf = LinearClassifier::new();
    let mut stream = GestureStream::new(PipelineConfig::default()).unwrap();
    let right = pose([0.5, 0.5, 0.0], [1.0, 0.0, 0.0], 0.01);

    assert!(stream.process(&clf, &right).unwrap_err().is_not_ready());
    // No-hand frames are still fine while loading
    assert_eq!(stream.process(&clf, &[]).unwrap(), Classification::none());

    clf.load(letter_weights());
    assert_eq!(stream.process(&clf, &right).unwrap().label(), Some("A"));
}

#[test]
fn test_streams_share_weights_across_threads() {
    let clf = Arc::new(LinearClassifier::with_weights(letter_weights()));
    let dirs = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];

    let handles: Vec<_> = dirs
        .into_iter()
        .map(|dir| {
            let clf = Arc::clone(&clf);
            thread::spawn(move || {
                let scheduler = FrameScheduler::new();
                let mut stream = GestureStream::new(PipelineConfig::default()).unwrap();
                let hand = pose([0.5, 0.5, 0.0], dir, 0.01);
                let mut last = Classification::none();
                for _ in 0..5 {
                    let ticket = scheduler.try_begin().expect("frame slot free");
                    last = stream.process(&clf, &hand).unwrap();
                    drop(ticket);
                }
                scheduler.cancel();
                stream.teardown();
                assert!(scheduler.try_begin().is_none());
                last.label
            })
        })
        .collect();

    let labels: Vec<Option<String>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(labels, vec![Some("A".into()), Some("B".into())]);
}

#[test]
fn test_camera_variant_skips_static_scene() {
    let mut stream = GestureStream::new(PipelineConfig::camera()).unwrap();
    let still = vec![100u8; 128 * 128 * 3];
    let mut moved = still.clone();
    for p in moved.iter_mut().take(128 * 128) {
        *p = 200;
    }

    let decisions: Vec<bool> = [&still, &still, &still, &moved, &moved]
        .iter()
        .map(|f| stream.should_process_pixels(f))
        .collect();
    assert_eq!(decisions, vec![true, false, false, true, false]);

    stream.teardown();
    assert!(!stream.has_frame_baseline());
    assert!(stream.should_process_pixels(&still));
}
