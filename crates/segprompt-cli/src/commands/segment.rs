use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use segprompt_core::config::AppConfig;
use segprompt_core::error::SegError;
use segprompt_core::geometry::{
    box_to_image_space, to_image_space, DisplayBox, DisplayPoint, ImageBox, ImageSize, Viewport,
};
use segprompt_core::io::{load_source_image, save_rgb};
use segprompt_core::model::DevicePreference;
use segprompt_core::predictor::SegPredictor;
use segprompt_core::prompt::{LabeledPoint, PointLabel, Prompt, PromptMode};
use segprompt_core::render::fit_to_viewport;
use tracing::debug;

use crate::summary::{print_segment_summary, SegmentSummary};

#[derive(Clone, Copy, ValueEnum)]
pub enum ModeArg {
    /// Every segment the model finds (default)
    Everything,
    /// Segments under the given points
    Point,
    /// The segment best matching a box
    Box,
    /// The segment best matching a description
    Text,
}

impl From<ModeArg> for PromptMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Everything => PromptMode::Everything,
            ModeArg::Point => PromptMode::Point,
            ModeArg::Box => PromptMode::Box,
            ModeArg::Text => PromptMode::Text,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum DeviceArg {
    Auto,
    Cpu,
    Cuda,
    Coreml,
}

impl From<DeviceArg> for DevicePreference {
    fn from(device: DeviceArg) -> Self {
        match device {
            DeviceArg::Auto => DevicePreference::Auto,
            DeviceArg::Cpu => DevicePreference::Cpu,
            DeviceArg::Cuda => DevicePreference::Cuda,
            DeviceArg::Coreml => DevicePreference::CoreMl,
        }
    }
}

#[derive(Args)]
pub struct SegmentArgs {
    /// Input image (jpg, png, bmp, gif, tiff)
    pub file: PathBuf,

    /// Output image (auto-generated if not provided)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Prompt mode
    #[arg(long, value_enum, default_value = "everything")]
    pub mode: ModeArg,

    /// Foreground point, repeatable
    #[arg(long = "point", value_name = "X,Y", value_parser = parse_point)]
    pub points: Vec<(f32, f32)>,

    /// Background point, repeatable
    #[arg(long = "bg-point", value_name = "X,Y", value_parser = parse_point)]
    pub bg_points: Vec<(f32, f32)>,

    /// Box prompt corners
    #[arg(long = "box", value_name = "X1,Y1,X2,Y2", value_parser = parse_box)]
    pub bbox: Option<[f32; 4]>,

    /// Text prompt
    #[arg(long)]
    pub text: Option<String>,

    /// Interpret point and box coordinates in canvas space instead of image pixels
    #[arg(long)]
    pub display_coords: bool,

    /// Save the result scaled to the canvas size instead of the source size
    #[arg(long)]
    pub fit_viewport: bool,

    /// TOML config file (defaults are used otherwise)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override the model weights path
    #[arg(long)]
    pub weights: Option<PathBuf>,

    /// Override the execution device
    #[arg(long, value_enum)]
    pub device: Option<DeviceArg>,
}

pub fn run(args: &SegmentArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => AppConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => AppConfig::default(),
    };
    if let Some(ref weights) = args.weights {
        config.model.weights = weights.clone();
    }
    if let Some(device) = args.device {
        config.model.device = device.into();
    }

    let source = load_source_image(&args.file)
        .with_context(|| format!("Failed to open {}", args.file.display()))?;
    let prompt = build_prompt(args, config.viewport, source.size)?;
    debug!("Resolved prompt: {prompt:?}");

    let start = Instant::now();
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner} {msg} [{elapsed}]")
            .unwrap(),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));

    spinner.set_message("Loading model");
    let mut predictor = SegPredictor::from_config(&config).context("Failed to load model")?;

    spinner.set_message("Segmenting everything");
    predictor.set_image(source.clone())?;
    let mask_count = predictor.base_masks().len();

    spinner.set_message(format!("Applying {} prompt", prompt.mode()));
    let result = predictor.segment(&prompt);
    spinner.finish_and_clear();
    let result = result?;

    let result = if args.fit_viewport {
        fit_to_viewport(&result, config.viewport)
    } else {
        result
    };

    let output_path = args
        .output
        .clone()
        .unwrap_or_else(|| segment_output_path(&args.file, prompt.mode()));
    save_rgb(&result, &output_path)
        .with_context(|| format!("Failed to save {}", output_path.display()))?;

    print_segment_summary(&SegmentSummary {
        input: &args.file,
        output: &output_path,
        size: source.size,
        prompt: &prompt,
        masks: mask_count,
        device: config.model.device,
        elapsed: start.elapsed(),
    });
    Ok(())
}

fn build_prompt(args: &SegmentArgs, viewport: Viewport, size: ImageSize) -> Result<Prompt> {
    let mode: PromptMode = args.mode.into();
    // Image-pixel coordinates go through an identity canvas so they get the same clamping.
    let canvas = if args.display_coords {
        viewport
    } else {
        Viewport {
            width: size.width,
            height: size.height,
        }
    };
    let to_image = |(x, y): (f32, f32)| to_image_space(DisplayPoint::new(x, y), canvas, size);

    let prompt = match mode {
        PromptMode::Everything => Prompt::Everything,
        PromptMode::Point => {
            let points: Vec<LabeledPoint> = args
                .points
                .iter()
                .map(|&p| (p, PointLabel::Foreground))
                .chain(args.bg_points.iter().map(|&p| (p, PointLabel::Background)))
                .map(|(p, label)| LabeledPoint {
                    point: to_image(p),
                    label,
                })
                .collect();
            if points.is_empty() {
                return Err(SegError::EmptyPrompt(mode)).context("Pass at least one --point");
            }
            Prompt::Points(points)
        }
        PromptMode::Box => {
            let Some([x1, y1, x2, y2]) = args.bbox else {
                return Err(SegError::EmptyPrompt(mode)).context("Pass --box x1,y1,x2,y2");
            };
            let corners = DisplayBox::from_corners(DisplayPoint::new(x1, y1), DisplayPoint::new(x2, y2));
            if args.display_coords {
                Prompt::Box(box_to_image_space(corners, viewport, size))
            } else {
                let px = |v: f32| v.max(0.0).round() as u32;
                let bbox = ImageBox::new(px(corners.x1), px(corners.y1), px(corners.x2), px(corners.y2));
                Prompt::Box(bbox.clamp_to(size))
            }
        }
        PromptMode::Text => match args.text.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => Prompt::Text(text.to_string()),
            _ => return Err(SegError::EmptyPrompt(mode)).context("Pass a non-empty --text"),
        },
    };
    Ok(prompt)
}

fn parse_numbers<const N: usize>(s: &str) -> Result<[f32; N]> {
    let values: Vec<f32> = s
        .split(',')
        .map(|v| v.trim().parse::<f32>())
        .collect::<std::result::Result<_, _>>()
        .with_context(|| format!("'{s}' is not a comma-separated list of numbers"))?;
    let Ok(array) = <[f32; N]>::try_from(values) else {
        bail!("expected {N} comma-separated numbers, got '{s}'");
    };
    Ok(array)
}

fn parse_point(s: &str) -> Result<(f32, f32)> {
    let [x, y] = parse_numbers::<2>(s)?;
    Ok((x, y))
}

fn parse_box(s: &str) -> Result<[f32; 4]> {
    parse_numbers::<4>(s)
}

fn segment_output_path(source: &Path, mode: PromptMode) -> PathBuf {
    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    let parent = source.parent().unwrap_or(Path::new("."));
    parent.join(format!("{stem}_{}.png", mode.to_string().to_lowercase()))
}
