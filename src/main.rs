/*!
 * Command-line interface for flatmd
 */

use std::io;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use clap::{CommandFactory, Parser};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::ThreadPoolBuilder;

use flatmd::config::{Args, Config};
use flatmd::flatten::Flattener;
use flatmd::report::{FlattenReport, Reporter};
use flatmd::utils::sanitize_message;

fn main() -> io::Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Shell completion generation short-circuits everything else
    if let Some(shell) = args.generate {
        let mut cmd = Args::command();
        let name = cmd.get_name().to_string();
        clap_complete::generate(shell, &mut cmd, name, &mut io::stdout());
        return Ok(());
    }

    // Create and validate configuration
    let config = Config::from_args(args).map_err(io::Error::from)?;
    config.validate()?;

    // Configure thread pool
    if let Err(e) = ThreadPoolBuilder::new()
        .num_threads(config.num_threads)
        .build_global()
    {
        eprintln!("Warning: Failed to set thread pool size: {}", e);
    }

    // Progress bar driven by the pipeline's fractional deltas
    let progress = ProgressBar::new(1000);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} {wide_msg:.dim.white} ({percent}%) ⏱️  Elapsed: {elapsed_precise}")
            .unwrap(),
    );
    progress.enable_steady_tick(std::time::Duration::from_millis(100));
    progress.set_prefix("📑 Flattening");
    progress.set_message(format!(
        "📂 Scanning workspace: {}",
        config.workspace_dir.display()
    ));

    let cancel = Arc::new(AtomicBool::new(false));
    let flattener = Flattener::new(&config, cancel);

    let bar = progress.clone();
    let mut report_progress = |message: &str, delta: f64| {
        bar.set_message(sanitize_message(message));
        bar.inc((delta * 1000.0) as u64);
    };

    let outcome = flattener.run(&mut report_progress).map_err(|e| {
        io::Error::new(io::ErrorKind::Other, sanitize_message(&e.to_string()))
    })?;

    progress.finish_and_clear();

    // Print the final report
    let reporter = Reporter::new();
    reporter.print_report(&FlattenReport {
        output_file: outcome.output_file.display().to_string(),
        duration: outcome.duration,
        files_processed: outcome.files_processed,
        files_skipped: outcome.files_skipped,
        directories: outcome.directories,
        total_bytes: outcome.total_bytes,
        parts_written: outcome.parts_written,
    });

    Ok(())
}
