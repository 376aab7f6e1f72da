/// Default display canvas width in pixels.
pub const DEFAULT_VIEWPORT_WIDTH: u32 = 600;

/// Default display canvas height in pixels.
pub const DEFAULT_VIEWPORT_HEIGHT: u32 = 400;

/// Image file extensions accepted by the file picker and loader (lowercase).
pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "gif", "tiff", "tif"];

/// Default square model input size for FastSAM.
pub const DEFAULT_IMGSZ: u32 = 1024;

/// Default detection confidence threshold.
pub const DEFAULT_CONF: f32 = 0.4;

/// Default NMS IoU threshold. FastSAM keeps heavily overlapping proposals.
pub const DEFAULT_IOU: f32 = 0.9;

/// Maximum detections kept after NMS.
pub const DEFAULT_MAX_DET: usize = 300;

/// Letterbox padding value (grey) used by YOLO-style preprocessing.
pub const LETTERBOX_FILL: u8 = 114;

/// Number of prototype mask coefficients per detection.
pub const MASK_COEFFICIENTS: usize = 32;

/// Boxes closer than this to an image border (pixels) are snapped to it.
pub const BORDER_SNAP_THRESHOLD: f32 = 20.0;

/// Sigmoid probability above which a mask pixel is foreground.
pub const MASK_THRESHOLD: f32 = 0.5;

/// Masks at or below this area are skipped for text prompts.
pub const TEXT_MIN_MASK_AREA: usize = 100;

/// CLIP image encoder input size.
pub const CLIP_INPUT_SIZE: u32 = 224;

/// CLIP context length in tokens.
pub const CLIP_CONTEXT_LENGTH: usize = 77;

/// CLIP end-of-text token, also used for padding.
pub const CLIP_EOT_TOKEN: i64 = 49407;

/// CLIP per-channel normalization mean (RGB).
pub const CLIP_MEAN: [f32; 3] = [0.481_454_66, 0.457_827_5, 0.408_210_73];

/// CLIP per-channel normalization std (RGB).
pub const CLIP_STD: [f32; 3] = [0.268_629_54, 0.261_302_58, 0.275_777_11];

/// CLIP logit scale applied before softmax.
pub const CLIP_LOGIT_SCALE: f32 = 100.0;

/// Overlay opacity of mask colours.
pub const DEFAULT_MASK_ALPHA: f32 = 0.6;

/// Fixed mask colour when random colouring is disabled.
pub const FIXED_MASK_COLOR: [u8; 3] = [30, 144, 255];

/// Contour colour (blue) and opacity.
pub const CONTOUR_COLOR: [u8; 3] = [0, 0, 255];
pub const CONTOUR_ALPHA: f32 = 0.8;

/// Contour stroke width in pixels.
pub const CONTOUR_WIDTH: usize = 2;

/// Closing/opening passes applied when smoothing masks for display.
pub const SMOOTHING_PASSES: usize = 2;

/// Default model weights location.
pub const DEFAULT_WEIGHTS_PATH: &str = "weights/FastSAM-x.onnx";
