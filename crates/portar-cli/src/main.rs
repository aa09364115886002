//! portar: port-migration status tracker.
//!
//! Classifies examples ported from a C reference implementation, verifies
//! visual equivalence of their rendered output, and optionally monitors the
//! whole set live in the terminal.
//!
//! Run: cargo run -p portar-cli --bin portar -- --help

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;

use portar_core::{classify_set, Freshness, Layout, LayoutConfig, Status, Verdict};
use portar_terminal::MonitorOptions;

/// Port migration status tracker
#[derive(Parser)]
#[command(name = "portar", version, about, long_about = None)]
struct Cli {
    /// Example name to evaluate; omit to list the whole set
    example: Option<String>,

    /// Monitor mode: continuously update status every N seconds
    #[arg(long, value_name = "SECS", num_args = 0..=1, default_missing_value = "5")]
    monitor: Option<u64>,

    /// Move the freshly generated output document into its canonical
    /// directory (requires an example name)
    #[arg(long)]
    cleanup: bool,

    /// Port workspace root
    #[arg(long, default_value = ".", value_name = "PATH")]
    root: PathBuf,

    /// Path to a custom layout config (YAML)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let layout = match build_layout(&cli) {
        Ok(layout) => layout,
        Err(err) => {
            eprintln!("portar: {err}");
            return ExitCode::FAILURE;
        }
    };

    if let Some(secs) = cli.monitor {
        let options = MonitorOptions {
            interval: Duration::from_secs(secs.max(1)),
        };
        return match portar_terminal::run(&layout, options) {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                eprintln!("portar: monitor failed: {err}");
                ExitCode::FAILURE
            }
        };
    }

    let Some(example) = cli.example else {
        print!("{}", portar_terminal::render_list(&portar_core::summarize(&layout)));
        return ExitCode::SUCCESS;
    };

    if cli.cleanup {
        return match layout.relocate_output(&example) {
            Ok(dest) => {
                println!("moved output to {}", dest.display());
                ExitCode::SUCCESS
            }
            Err(err) => {
                eprintln!("portar: {err}");
                ExitCode::FAILURE
            }
        };
    }

    evaluate(&layout, &example)
}

fn build_layout(cli: &Cli) -> Result<Layout, portar_core::CoreError> {
    let config = match &cli.config {
        Some(path) => LayoutConfig::load_from_file(path)?,
        None => LayoutConfig::default(),
    };
    Ok(Layout::with_config(cli.root.clone(), config))
}

/// Single-example detail mode. Exit code mirrors the status: 0 done,
/// 1 in progress, 2 not started.
fn evaluate(layout: &Layout, example: &str) -> ExitCode {
    let set = layout.locate(example);
    let classification = classify_set(&set);

    println!("{}", classification.message);
    println!();
    print_artifact("implementation", set.implementation.exists, &set.implementation.path);
    print_artifact("reference", set.reference.exists, &set.reference.path);

    if let Some(freshness) = layout.freshness(example) {
        println!("{}", freshness_line(freshness));
    }

    print_artifact("screenshot", set.screenshot.exists, &set.screenshot.path);
    print_artifact("result text", set.result_text.exists, &set.result_text.path);
    println!(
        "comparison result: {}",
        match classification.signals.text_verdict {
            Verdict::Match => "visual comparison indicates a match",
            Verdict::Mismatch => "visual comparison indicates differences",
            Verdict::Unknown => "no readable comparison result",
        }
    );
    print_artifact("output document", set.output.exists, &set.output.path);
    print_artifact(
        "reference output",
        set.reference_output.exists,
        &set.reference_output.path,
    );

    // Direct image comparison is an independent second opinion; the textual
    // result above is what gates the status.
    let direct = portar_compare::compare_files(
        &set.reference_screenshot.path,
        &set.target_screenshot.path,
    );
    println!("image comparison: {}", direct.message);

    match classification.status {
        Status::Done => ExitCode::SUCCESS,
        Status::InProgress => ExitCode::from(1),
        Status::NotStarted => ExitCode::from(2),
    }
}

fn print_artifact(label: &str, exists: bool, path: &std::path::Path) {
    let mark = if exists { "✓" } else { "✗" };
    println!("{mark} {label}: {}", path.display());
}

fn freshness_line(freshness: Freshness) -> String {
    let days = freshness.lag_secs / 86_400;
    let hours = (freshness.lag_secs % 86_400) / 3_600;
    if freshness.target_is_newer {
        format!("target implementation is newer ({days}d {hours}h)")
    } else {
        format!("reference implementation is newer ({days}d {hours}h) - port may be stale")
    }
}
