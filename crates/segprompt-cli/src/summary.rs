use std::path::Path;
use std::time::Duration;

use console::Style;
use segprompt_core::geometry::ImageSize;
use segprompt_core::model::DevicePreference;
use segprompt_core::prompt::{PointLabel, Prompt};

struct Styles {
    title: Style,
    label: Style,
    value: Style,
    method: Style,
    path: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            method: Style::new().green(),
            path: Style::new().underlined(),
        }
    }
}

pub struct SegmentSummary<'a> {
    pub input: &'a Path,
    pub output: &'a Path,
    pub size: ImageSize,
    pub prompt: &'a Prompt,
    pub masks: usize,
    pub device: DevicePreference,
    pub elapsed: Duration,
}

pub fn print_segment_summary(summary: &SegmentSummary<'_>) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to("Segmentation"));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(12)));
    println!();

    println!(
        "  {:<12}{}",
        s.label.apply_to("Input"),
        s.path.apply_to(summary.input.display())
    );
    println!(
        "  {:<12}{}",
        s.label.apply_to("Size"),
        s.value.apply_to(summary.size)
    );
    println!(
        "  {:<12}{}",
        s.label.apply_to("Device"),
        s.method.apply_to(summary.device)
    );
    println!(
        "  {:<12}{}",
        s.label.apply_to("Mode"),
        s.method.apply_to(summary.prompt.mode())
    );
    println!(
        "  {:<12}{}",
        s.label.apply_to("Prompt"),
        s.value.apply_to(describe_prompt(summary.prompt))
    );
    println!(
        "  {:<12}{}",
        s.label.apply_to("Masks"),
        s.value.apply_to(summary.masks)
    );
    println!(
        "  {:<12}{}",
        s.label.apply_to("Time"),
        s.value.apply_to(format!("{:.2}s", summary.elapsed.as_secs_f32()))
    );
    println!(
        "  {:<12}{}",
        s.label.apply_to("Output"),
        s.path.apply_to(summary.output.display())
    );
    println!();
}

fn describe_prompt(prompt: &Prompt) -> String {
    match prompt {
        Prompt::Everything => "all segments".to_string(),
        Prompt::Points(points) => points
            .iter()
            .map(|p| {
                let sign = match p.label {
                    PointLabel::Foreground => '+',
                    PointLabel::Background => '-',
                };
                format!("{sign}({}, {})", p.point.x, p.point.y)
            })
            .collect::<Vec<_>>()
            .join(" "),
        Prompt::Box(bbox) => bbox.to_string(),
        Prompt::Text(text) => format!("\"{text}\""),
    }
}
