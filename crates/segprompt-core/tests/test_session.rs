mod common;

use segprompt_core::error::SegError;
use segprompt_core::geometry::{DisplayPoint, ImagePoint, Viewport};
use segprompt_core::io::SourceImage;
use segprompt_core::prompt::{ModeSwitchPolicy, Prompt, PromptMode};
use segprompt_core::session::{segment_session, SegmentationSession};

use common::{gradient_image, scene_predictor, scene_source};

fn scene_session(policy: ModeSwitchPolicy) -> SegmentationSession {
    SegmentationSession::new(&scene_source(), Viewport::default(), policy)
}

/// Canvas coordinates for a scene pixel (the scene is 120x80, the canvas 600x400).
fn canvas(x: f32, y: f32) -> DisplayPoint {
    DisplayPoint::new(x * 5.0, y * 5.0)
}

// ---------------------------------------------------------------------------
// Display state
// ---------------------------------------------------------------------------

#[test]
fn test_new_session_shows_fitted_image() {
    let s = scene_session(ModeSwitchPolicy::Keep);
    assert_eq!(s.display().dimensions(), (600, 400));
    assert_eq!(s.revision(), 0);
    assert!(!s.showing_result());
    assert_eq!(s.collector().mode(), PromptMode::Everything);
    assert_eq!(s.collector().text(), "");
}

#[test]
fn test_run_everything_replaces_display() {
    let mut predictor = scene_predictor();
    let mut s = scene_session(ModeSwitchPolicy::Keep);
    let before = s.display().clone();

    s.run(&mut predictor).unwrap();
    assert_eq!(s.revision(), 1);
    assert!(s.showing_result());
    assert_eq!(s.display().dimensions(), (600, 400));
    assert_ne!(*s.display(), before);
}

#[test]
fn test_empty_prompt_leaves_display_unchanged() {
    let mut predictor = scene_predictor();
    let mut s = scene_session(ModeSwitchPolicy::Keep);
    let before = s.display().clone();

    for mode in [PromptMode::Point, PromptMode::Box, PromptMode::Text] {
        s.collector_mut().set_mode(mode);
        let err = s.run(&mut predictor).unwrap_err();
        assert!(matches!(err, SegError::EmptyPrompt(_)));
    }
    assert_eq!(*s.display(), before);
    assert_eq!(s.revision(), 0);
}

#[test]
fn test_clear_restores_base_and_is_idempotent() {
    let mut predictor = scene_predictor();
    let mut s = scene_session(ModeSwitchPolicy::Keep);
    let base = s.display().clone();

    s.collector_mut().set_mode(PromptMode::Point);
    s.collector_mut().pointer_down(canvas(25.0, 25.0));
    s.run(&mut predictor).unwrap();
    assert_ne!(*s.display(), base);

    s.clear();
    assert_eq!(*s.display(), base);
    assert!(s.markers().is_empty());
    let revision = s.revision();

    s.clear();
    assert_eq!(*s.display(), base);
    assert_eq!(s.revision(), revision);
}

// ---------------------------------------------------------------------------
// Prompt resolution
// ---------------------------------------------------------------------------

#[test]
fn test_prompt_is_rescaled_to_image_space() {
    let mut s = scene_session(ModeSwitchPolicy::Keep);
    s.collector_mut().set_mode(PromptMode::Box);
    s.collector_mut().pointer_down(canvas(50.0, 50.0));
    s.collector_mut().pointer_drag(canvas(30.0, 20.0));
    s.collector_mut().pointer_up(canvas(10.0, 10.0));

    let Prompt::Box(b) = s.resolve_prompt().unwrap() else {
        panic!("expected a box prompt");
    };
    assert_eq!(b.as_array(), [10, 10, 50, 50]);
}

#[test]
fn test_display_position_of_image_pixel() {
    let s = scene_session(ModeSwitchPolicy::Keep);
    let d = s.display_position(ImagePoint::new(60, 40));
    assert_eq!(d, DisplayPoint::new(300.0, 200.0));
}

#[test]
fn test_mode_switch_scenario_keep() {
    let mut predictor = scene_predictor();
    let mut s = scene_session(ModeSwitchPolicy::Keep);
    s.collector_mut().set_mode(PromptMode::Point);
    s.collector_mut().pointer_down(canvas(25.0, 25.0));
    s.collector_mut().pointer_down(canvas(100.0, 20.0));

    s.collector_mut().set_mode(PromptMode::Box);
    assert!(matches!(
        s.run(&mut predictor),
        Err(SegError::EmptyPrompt(PromptMode::Box))
    ));

    s.collector_mut().set_mode(PromptMode::Point);
    assert_eq!(s.markers().len(), 2);
    s.run(&mut predictor).unwrap();
}

#[test]
fn test_mode_switch_scenario_reset() {
    let mut predictor = scene_predictor();
    let mut s = scene_session(ModeSwitchPolicy::Reset);
    s.collector_mut().set_mode(PromptMode::Point);
    s.collector_mut().pointer_down(canvas(25.0, 25.0));
    s.collector_mut().pointer_down(canvas(100.0, 20.0));

    s.collector_mut().set_mode(PromptMode::Box);
    assert!(matches!(
        s.run(&mut predictor),
        Err(SegError::EmptyPrompt(PromptMode::Box))
    ));

    s.collector_mut().set_mode(PromptMode::Point);
    assert!(s.markers().is_empty());
}

// ---------------------------------------------------------------------------
// Missing session / image
// ---------------------------------------------------------------------------

#[test]
fn test_no_session_is_silent_no_image() {
    let mut predictor = scene_predictor();
    let err = segment_session(&mut predictor, None).unwrap_err();
    assert!(matches!(err, SegError::NoImageSelected));
    assert!(err.is_silent());
}

#[test]
fn test_session_for_other_image_is_rejected() {
    let mut predictor = scene_predictor();
    let other = SourceImage::from_pixels("other.png", gradient_image(120, 80)).unwrap();
    let mut s = SegmentationSession::new(&other, Viewport::default(), ModeSwitchPolicy::Keep);
    assert!(matches!(
        segment_session(&mut predictor, Some(&mut s)),
        Err(SegError::NoImageSelected)
    ));
}
