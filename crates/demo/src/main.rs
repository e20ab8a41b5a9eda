// File: crates/demo/src/main.rs
// Summary: Demo loads county hospitalization records (file or open-data URL) and renders the chart to SVG/PNG.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chart_core::{Chart, ChartConfig, FileSource, HttpSource, LoadOutcome, PointerEvent, Series};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "county-chart", version, about = "Render cumulative county hospitalization series")]
struct Cli {
    /// Config file (TOML/JSON/YAML); defaults to ./county-chart.* when present.
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Read a saved JSON payload instead of fetching.
    #[arg(long, short)]
    input: Option<PathBuf>,

    /// Payload URL; overrides the configured source.
    #[arg(long, conflicts_with = "input")]
    url: Option<String>,

    /// Y scale: `lin` or `log`.
    #[arg(long)]
    scale: Option<String>,

    /// Theme preset name.
    #[arg(long)]
    theme: Option<String>,

    /// SVG output path.
    #[arg(long, short, default_value = "county_chart.svg")]
    out: PathBuf,

    /// Also rasterise to this PNG path (needs the `raster` feature).
    #[arg(long)]
    png: Option<PathBuf>,

    /// Simulate hovering at plot coordinates `x,y`.
    #[arg(long, value_parser = parse_point)]
    hover: Option<(f64, f64)>,

    /// Write the derived series as CSV.
    #[arg(long)]
    export_csv: Option<PathBuf>,
}

fn parse_point(s: &str) -> Result<(f64, f64), String> {
    let (x, y) = s.split_once(',').ok_or_else(|| format!("expected `x,y`, got `{s}`"))?;
    let x = x.trim().parse::<f64>().map_err(|e| format!("bad x: {e}"))?;
    let y = y.trim().parse::<f64>().map_err(|e| format!("bad y: {e}"))?;
    Ok((x, y))
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .try_init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut config = ChartConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(scale) = &cli.scale {
        config.scale = scale.clone();
    }
    if let Some(theme) = &cli.theme {
        config.theme = theme.clone();
    }
    if let Some(url) = &cli.url {
        config.source_url = url.clone();
    }

    let mut chart = new_chart(&config);
    let outcome = match &cli.input {
        Some(path) => chart.load(&FileSource::new(path)).await,
        None => {
            let source = HttpSource::new(config.source_url(), config.timeout())?;
            chart.load(&source).await
        }
    };

    match outcome {
        LoadOutcome::Committed(diff) => {
            println!("Loaded {} series ({} entered)", chart.series().len(), diff.entered.len());
        }
        LoadOutcome::Failed(alert) => {
            // Keep the failed spinner visible in the output, like the page does.
            chart.write_svg(&cli.out)?;
            bail!("{}\n{}", alert.message, alert.detail);
        }
        LoadOutcome::Stale { generation, latest } => {
            bail!("load {generation} was superseded by {latest}");
        }
    }

    if let Some((x, y)) = cli.hover {
        chart.pointer(PointerEvent::Enter);
        chart.pointer(PointerEvent::Move { x, y });
        for entry in chart.legend() {
            println!("  {:<16} {:>10.1}", entry.key, entry.value);
        }
    }

    chart
        .write_svg(&cli.out)
        .with_context(|| format!("failed to write '{}'", cli.out.display()))?;
    println!("Wrote {}", cli.out.display());

    if let Some(png) = &cli.png {
        write_png(&chart, png)?;
        println!("Wrote {}", png.display());
    }

    if let Some(csv_path) = &cli.export_csv {
        export_csv(chart.series(), csv_path)
            .with_context(|| format!("failed to export CSV '{}'", csv_path.display()))?;
        println!("Wrote {}", csv_path.display());
    }
    Ok(())
}

#[cfg(feature = "raster")]
fn new_chart(config: &ChartConfig) -> Chart {
    Chart::new(config).with_text_measure(Box::new(chart_render_skia::TextShaper::new()))
}

#[cfg(not(feature = "raster"))]
fn new_chart(config: &ChartConfig) -> Chart {
    Chart::new(config)
}

#[cfg(feature = "raster")]
fn write_png(chart: &Chart, path: &Path) -> Result<()> {
    use chart_render_skia::{RenderOptions, SkiaRenderer};
    SkiaRenderer::new()
        .render_to_png(chart.scene(), &RenderOptions::default(), path)
        .with_context(|| format!("failed to render '{}'", path.display()))
}

#[cfg(not(feature = "raster"))]
fn write_png(_chart: &Chart, path: &Path) -> Result<()> {
    bail!("cannot write '{}': rebuild with `--features raster` for PNG output", path.display())
}

fn export_csv(series: &[Series], path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(["county", "date", "confirmed", "suspected", "display"])?;
    for s in series {
        for p in &s.points {
            wtr.write_record([
                s.key.clone(),
                p.date.format("%Y-%m-%d").to_string(),
                format!("{}", p.confirmed),
                format!("{:.1}", p.suspected),
                format!("{}", p.display_value()),
            ])?;
        }
    }
    wtr.flush()?;
    Ok(())
}
