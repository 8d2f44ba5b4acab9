use std::error::Error;
use std::fs::create_dir_all;
use std::path::{Path, PathBuf};

use clap::Parser;
use plotters::prelude::*;
use tracing::{info, warn};

use reversal::analysis::{self, AccuracyCurve, PhaseAccuracy, RtCell};
use reversal::cli::init_tracing;
use reversal::config::ExperimentConfig;
use reversal::task::Phase;

#[derive(Parser, Debug)]
#[command(author, version, about = "Render summary figures from trial logs")]
struct Args {
    /// Directory of per-subject CSV logs (overrides config)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Output directory for PNG figures (overrides config)
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Moving-average window in trials (overrides config)
    #[arg(long)]
    window: Option<usize>,

    /// Path to config TOML
    #[arg(long, default_value = "reversal.toml")]
    config: String,
}

fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();
    let args = Args::parse();
    let cfg = ExperimentConfig::load_or_default(&args.config);

    let data_dir = args
        .data_dir
        .unwrap_or_else(|| PathBuf::from(&cfg.output.data_dir));
    let out_dir = args
        .out_dir
        .unwrap_or_else(|| PathBuf::from(&cfg.output.figures_dir));
    let window = args.window.unwrap_or(cfg.output.moving_average_window);

    let data = analysis::load_dir(&data_dir)?;
    if data.is_empty() {
        warn!(dir = %data_dir.display(), "no trial logs found; nothing to plot");
        return Ok(());
    }
    create_dir_all(&out_dir)?;

    render_accuracy_barplot(
        &out_dir.join("accuracy_barplot.png"),
        &data.accuracy_by_phase(),
    )?;
    render_accuracy_trials_plot(
        &out_dir.join("accuracy_trials_plot.png"),
        &data.accuracy_curve(window),
    )?;
    render_response_time_barplot(
        &out_dir.join("response_time_barplot.png"),
        &data.response_time_by_phase_and_correct(),
    )?;

    info!(dir = %out_dir.display(), "saved figures");
    println!("Done!");
    Ok(())
}

fn phase_slot(phase: Phase) -> f32 {
    match phase {
        Phase::Pre => 0.0,
        Phase::Post => 1.0,
    }
}

fn phase_label(x: &f32) -> String {
    let slot = x.round();
    if (x - slot).abs() > 0.01 {
        return String::new();
    }
    match slot as i32 {
        0 => Phase::Pre.to_string(),
        1 => Phase::Post.to_string(),
        _ => String::new(),
    }
}

fn render_accuracy_barplot(out_path: &Path, rows: &[PhaseAccuracy]) -> Result<(), Box<dyn Error>> {
    let root = BitMapBackend::new(out_path, (600, 400)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption("Accuracy Pre and Post Reversal", ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(-0.5f32..1.5f32, 0.0f32..1.05f32)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(5)
        .x_label_formatter(&phase_label)
        .x_desc("phase")
        .y_desc("Accuracy")
        .draw()?;

    for row in rows {
        let x = phase_slot(row.phase);
        let color = match row.phase {
            Phase::Pre => BLUE,
            Phase::Post => RED,
        };
        chart.draw_series(std::iter::once(Rectangle::new(
            [(x - 0.35, 0.0), (x + 0.35, row.accuracy as f32)],
            color.mix(0.6).filled(),
        )))?;
    }

    root.present()?;
    Ok(())
}

fn render_accuracy_trials_plot(out_path: &Path, curve: &AccuracyCurve) -> Result<(), Box<dyn Error>> {
    let x_max = curve
        .points
        .iter()
        .map(|(nr, _)| *nr as f32)
        .fold(curve.reversal_trial.unwrap_or(0) as f32, f32::max)
        .max(1.0);

    let root = BitMapBackend::new(out_path, (600, 400)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("Moving average of accuracy, W={}", curve.window),
            ("sans-serif", 20),
        )
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0f32..x_max, 0.0f32..1.05f32)?;

    chart
        .configure_mesh()
        .x_desc("Trial number")
        .y_desc("Accuracy")
        .draw()?;

    chart.draw_series(LineSeries::new(
        curve.points.iter().map(|(nr, acc)| (*nr as f32, *acc as f32)),
        &BLUE,
    ))?;

    if let Some(rev) = curve.reversal_trial {
        let x = rev as f32;
        chart
            .draw_series(std::iter::once(PathElement::new(
                vec![(x, 0.0), (x, 1.05)],
                RED,
            )))?
            .label("Reversal")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED));

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }

    root.present()?;
    Ok(())
}

fn render_response_time_barplot(out_path: &Path, cells: &[RtCell]) -> Result<(), Box<dyn Error>> {
    let y_max = cells
        .iter()
        .map(|c| c.mean_rt as f32)
        .fold(0.0f32, f32::max)
        .max(0.1)
        * 1.1;

    let root = BitMapBackend::new(out_path, (600, 400)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(-0.5f32..1.5f32, 0.0f32..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(5)
        .x_label_formatter(&phase_label)
        .x_desc("Phase")
        .y_desc("Mean Response Time [s]")
        .draw()?;

    for correct in [0u8, 1] {
        let (offset, color) = if correct == 0 {
            (-0.2f32, RED)
        } else {
            (0.2f32, BLUE)
        };
        chart
            .draw_series(cells.iter().filter(|c| c.correct == correct).map(|c| {
                let x = phase_slot(c.phase) + offset;
                Rectangle::new(
                    [(x - 0.18, 0.0), (x + 0.18, c.mean_rt as f32)],
                    color.mix(0.6).filled(),
                )
            }))?
            .label(format!("correct = {correct}"))
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 15, y + 5)], color.filled()));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}
