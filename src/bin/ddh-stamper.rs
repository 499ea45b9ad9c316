//! CLI binary for ddh-stamper.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `StampConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use ddh_stamper::{
    preview_label, run_to_file, DuplicatePolicy, OverlayRect, RunInputs, RunProgress,
    RunProgressCallback, StampConfig, ValidationMode,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar across the record loop plus a
/// per-record log line.
struct CliProgressCallback {
    bar: ProgressBar,
    skips: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0); // length set in on_run_start
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>3}/{len} records  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ");
        bar.set_style(style);
        bar.set_prefix("Stamping");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self {
            bar,
            skips: AtomicUsize::new(0),
        })
    }
}

impl RunProgressCallback for CliProgressCallback {
    fn on_run_start(&self, total_records: usize) {
        self.bar.set_length(total_records as u64);
    }

    fn on_record_start(&self, _index: usize, _total: usize, code: &str) {
        self.bar.set_message(code.to_string());
    }

    fn on_record_stamped(&self, index: usize, total: usize, code: &str) {
        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {}",
            green("✓"),
            index,
            total,
            code
        ));
        self.bar.inc(1);
    }

    fn on_record_skipped(&self, index: usize, total: usize, code: &str) {
        self.skips.fetch_add(1, Ordering::SeqCst);
        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {}  {}",
            yellow("−"),
            index,
            total,
            code,
            dim("no layout PDF, skipped")
        ));
        self.bar.inc(1);
    }

    fn on_run_complete(&self, stamped: usize, skipped: usize) {
        self.bar.finish_and_clear();
        if skipped == 0 {
            eprintln!(
                "{} {} record(s) stamped",
                green("✔"),
                bold(&stamped.to_string())
            );
        } else {
            eprintln!(
                "{} {} stamped, {} skipped",
                yellow("⚠"),
                bold(&stamped.to_string()),
                skipped
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Stamp every record; every '<code> Layout.pdf' must be present
  ddh-stamper projects.xlsx layouts/ -o stamped-layouts.zip

  # Skip records whose layout PDF is missing instead of aborting
  ddh-stamper --lenient projects.xlsx layouts/

  # Keep the last row when a code appears twice
  ddh-stamper --allow-duplicates projects.xlsx layouts/

  # Preview one record's label without touching any PDF
  ddh-stamper --preview DDH-001 projects.xlsx layouts/

  # Caption in a specific TrueType font, bigger QR modules
  ddh-stamper --font /usr/share/fonts/TTF/DejaVuSans.ttf --qr-module-px 10 \
      projects.xlsx layouts/

  # Reject layouts whose page cannot contain the overlay rectangle
  ddh-stamper --enforce-page-bounds projects.xlsx layouts/

EXPECTED INPUTS:
  Workbook columns (fixed, case-sensitive):
    EE, Cod Sondaje, Tipo, Target, Veta, Nivel, Labor, Categoria,
    Inclinacion, Azimut
  Layout PDFs named exactly '<Cod Sondaje> Layout.pdf'.

BUNDLE CONTENTS (per record):
  <code>.png             composed QR label
  <code> Layout QR.pdf   layout with the label stamped on page one
"#;

/// Stamp QR labels from a project workbook onto layout PDFs.
#[derive(Parser, Debug)]
#[command(
    name = "ddh-stamper",
    version,
    about = "Stamp QR labels from a drill-hole workbook onto layout PDFs",
    long_about = "Reads a project workbook (.xlsx), composes a QR label per record (ten \
metadata fields plus a caption), stamps it into the fixed corner of the matching \
'<code> Layout.pdf', and bundles all labels and stamped PDFs into one ZIP.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Project workbook (.xlsx).
    workbook: PathBuf,

    /// Directory containing the '<code> Layout.pdf' files.
    layouts: PathBuf,

    /// Write the bundle ZIP to this path.
    #[arg(short, long, env = "DDH_STAMPER_OUTPUT", default_value = "stamped-layouts.zip")]
    output: PathBuf,

    /// Skip records whose layout PDF is missing instead of aborting.
    #[arg(long, env = "DDH_STAMPER_LENIENT")]
    lenient: bool,

    /// Keep the last row when a drill-hole code appears more than once.
    #[arg(long, env = "DDH_STAMPER_ALLOW_DUPLICATES")]
    allow_duplicates: bool,

    /// Worksheet name (default: first sheet in the workbook).
    #[arg(long, env = "DDH_STAMPER_SHEET")]
    sheet: Option<String>,

    /// TrueType font file for the caption (default: built-in bitmap font).
    #[arg(long, env = "DDH_STAMPER_FONT")]
    font: Option<PathBuf>,

    /// Caption pixel height.
    #[arg(long, env = "DDH_STAMPER_CAPTION_SIZE", default_value_t = 28.0)]
    caption_size: f32,

    /// Pixels per QR module.
    #[arg(long, env = "DDH_STAMPER_QR_MODULE_PX", default_value_t = 8,
          value_parser = clap::value_parser!(u32).range(1..=32))]
    qr_module_px: u32,

    /// Overlay rectangle in page coordinates: x0,y0,x1,y1.
    #[arg(long, env = "DDH_STAMPER_RECT", default_value = "600,870,750,1030")]
    rect: String,

    /// Reject documents whose first page cannot contain the rectangle.
    #[arg(long, env = "DDH_STAMPER_ENFORCE_BOUNDS")]
    enforce_page_bounds: bool,

    /// Compose this record's label as '<code>.png' and exit (no stamping).
    #[arg(long, value_name = "CODE")]
    preview: Option<String>,

    /// Print run statistics as JSON to stdout.
    #[arg(long, env = "DDH_STAMPER_JSON")]
    json: bool,

    /// Disable the progress bar.
    #[arg(long, env = "DDH_STAMPER_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "DDH_STAMPER_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "DDH_STAMPER_QUIET")]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs while the progress bar is active;
    // the bar and its per-record lines carry the same information.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && cli.preview.is_none();
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let config = build_config(&cli, show_progress)?;
    let inputs = RunInputs::from_paths(&cli.workbook, &cli.layouts)
        .context("Failed to load inputs")?;

    // ── Preview mode ─────────────────────────────────────────────────────
    if let Some(ref code) = cli.preview {
        let records = ddh_stamper::pipeline::input::parse_workbook(
            &inputs.workbook,
            config.sheet.as_deref(),
        )
        .context("Failed to parse workbook")?;
        let record = records
            .iter()
            .find(|r| r.code == *code)
            .with_context(|| format!("No record with code '{code}' in the workbook"))?;

        let label = preview_label(record, &config).context("Failed to compose label")?;
        let out = PathBuf::from(record.image_name());
        label
            .save(&out)
            .with_context(|| format!("Failed to write {}", out.display()))?;
        if !cli.quiet {
            eprintln!(
                "{} {}  {}",
                green("✔"),
                bold(&out.display().to_string()),
                dim(&format!("{}x{}", label.width(), label.height()))
            );
        }
        return Ok(());
    }

    // ── Run the pipeline ─────────────────────────────────────────────────
    let stats = run_to_file(&inputs, &config, &cli.output).context("Run failed")?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&stats).context("Failed to serialise stats")?
        );
    } else if !cli.quiet {
        eprintln!(
            "{}  {}/{} record(s)  {}ms  →  {}",
            if stats.records_skipped == 0 {
                green("✔")
            } else {
                yellow("⚠")
            },
            stats.records_stamped,
            stats.records_total,
            stats.total_duration_ms,
            bold(&cli.output.display().to_string()),
        );
        eprintln!(
            "   {} label  /  {} stamp",
            dim(&format!("{}ms", stats.label_duration_ms)),
            dim(&format!("{}ms", stats.stamp_duration_ms)),
        );
    }

    Ok(())
}

/// Map CLI args to `StampConfig`.
fn build_config(cli: &Cli, show_progress: bool) -> Result<StampConfig> {
    let mut builder = StampConfig::builder()
        .validation(if cli.lenient {
            ValidationMode::Lenient
        } else {
            ValidationMode::Strict
        })
        .duplicates(if cli.allow_duplicates {
            DuplicatePolicy::LastWins
        } else {
            DuplicatePolicy::Reject
        })
        .overlay(parse_rect(&cli.rect)?)
        .enforce_page_bounds(cli.enforce_page_bounds)
        .caption_scale(cli.caption_size)
        .qr_module_px(cli.qr_module_px);

    if let Some(ref sheet) = cli.sheet {
        builder = builder.sheet(sheet.clone());
    }
    if let Some(ref font) = cli.font {
        builder = builder.font(font.clone());
    }
    if show_progress {
        let cb: RunProgress = CliProgressCallback::new();
        builder = builder.progress(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Parse `--rect` "x0,y0,x1,y1" into an `OverlayRect`.
fn parse_rect(s: &str) -> Result<OverlayRect> {
    let parts: Vec<f32> = s
        .split(',')
        .map(|p| {
            p.trim()
                .parse::<f32>()
                .with_context(|| format!("Invalid rect coordinate: '{}'", p.trim()))
        })
        .collect::<Result<Vec<_>>>()?;

    if parts.len() != 4 {
        anyhow::bail!("--rect expects four comma-separated numbers, got '{s}'");
    }
    if parts[2] <= parts[0] || parts[3] <= parts[1] {
        anyhow::bail!("--rect must satisfy x0 < x1 and y0 < y1, got '{s}'");
    }

    Ok(OverlayRect::new(parts[0], parts[1], parts[2], parts[3]))
}
