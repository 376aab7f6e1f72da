use segprompt_core::config::{AppConfig, ModelConfig, RenderConfig};
use segprompt_core::error::SegError;
use segprompt_core::model::DevicePreference;
use segprompt_core::prompt::{ModeSwitchPolicy, PromptMode};

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

#[test]
fn test_model_defaults() {
    let m = ModelConfig::default();
    assert_eq!(m.imgsz, 1024);
    assert!((m.conf - 0.4).abs() < 1e-6);
    assert!((m.iou - 0.9).abs() < 1e-6);
    assert!(m.retina_masks);
    assert_eq!(m.device, DevicePreference::Auto);
    assert_eq!(m.weights.to_str(), Some("weights/FastSAM-x.onnx"));
}

#[test]
fn test_render_defaults() {
    let r = RenderConfig::default();
    assert!(r.random_color);
    assert!(r.better_quality);
    assert!(r.with_contours);
    assert!((r.alpha - 0.6).abs() < 1e-6);
}

#[test]
fn test_app_defaults() {
    let c = AppConfig::default();
    assert_eq!((c.viewport.width, c.viewport.height), (600, 400));
    assert_eq!(c.mode_switch, ModeSwitchPolicy::Keep);
    assert!(c.text.is_none());
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

#[test]
fn test_prompt_mode_display() {
    let names: Vec<String> = PromptMode::ALL.iter().map(|m| m.to_string()).collect();
    assert_eq!(names, ["Everything", "Point", "Box", "Text"]);
}

#[test]
fn test_device_display() {
    assert_eq!(DevicePreference::CoreMl.to_string(), "CoreML");
    assert_eq!(DevicePreference::Cuda.to_string(), "CUDA");
}

#[test]
fn test_cpu_is_always_available() {
    assert!(DevicePreference::Cpu.is_available());
    assert!(DevicePreference::Auto.is_available());
}

// ---------------------------------------------------------------------------
// TOML
// ---------------------------------------------------------------------------

#[test]
fn test_toml_roundtrip() {
    let mut config = AppConfig::default();
    config.model.conf = 0.25;
    config.mode_switch = ModeSwitchPolicy::Reset;
    config.render.seed = 9;

    let text = config.to_toml().unwrap();
    let parsed = AppConfig::from_toml(&text).unwrap();
    assert!((parsed.model.conf - 0.25).abs() < 1e-6);
    assert_eq!(parsed.mode_switch, ModeSwitchPolicy::Reset);
    assert_eq!(parsed.render.seed, 9);
}

#[test]
fn test_partial_toml_uses_defaults() {
    let parsed = AppConfig::from_toml(
        r#"
mode_switch = "reset"

[model]
device = "cpu"
imgsz = 640

[text]
image_encoder = "clip/image.onnx"
text_encoder = "clip/text.onnx"
tokenizer = "clip/tokenizer.json"
"#,
    )
    .unwrap();
    assert_eq!(parsed.model.imgsz, 640);
    assert_eq!(parsed.model.device, DevicePreference::Cpu);
    assert!((parsed.model.iou - 0.9).abs() < 1e-6);
    assert_eq!(parsed.viewport.width, 600);
    assert_eq!(parsed.mode_switch, ModeSwitchPolicy::Reset);
    let text = parsed.text.unwrap();
    assert_eq!(text.tokenizer.to_str(), Some("clip/tokenizer.json"));
}

#[test]
fn test_empty_toml_is_default() {
    let parsed = AppConfig::from_toml("").unwrap();
    assert_eq!(parsed.model.imgsz, 1024);
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[test]
fn test_invalid_imgsz_rejected() {
    let err = AppConfig::from_toml("[model]\nimgsz = 1000\n").unwrap_err();
    assert!(matches!(err, SegError::Config(_)));
}

#[test]
fn test_out_of_range_conf_rejected() {
    assert!(AppConfig::from_toml("[model]\nconf = 1.5\n").is_err());
}

#[test]
fn test_zero_viewport_rejected() {
    let err = AppConfig::from_toml("[viewport]\nwidth = 0\nheight = 400\n").unwrap_err();
    assert!(matches!(err, SegError::InvalidDimensions { .. }));
}

#[test]
fn test_unknown_mode_switch_rejected() {
    assert!(AppConfig::from_toml("mode_switch = \"sometimes\"\n").is_err());
}

#[test]
fn test_save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("segprompt.toml");
    let mut config = AppConfig::default();
    config.render.with_contours = false;
    config.save(&path).unwrap();

    let loaded = AppConfig::load(&path).unwrap();
    assert!(!loaded.render.with_contours);
}
