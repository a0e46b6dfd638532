use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use kv2csv_log::{discover_fields, write_csv, Progress};

#[derive(Parser)]
#[command(name = "kv2csv")]
#[command(about = "Convert a key=value log file to CSV", long_about = None)]
struct Cli {
    /// Path to the log file to convert
    #[arg(value_name = "FILE")]
    input: PathBuf,
}

/// Renders a pass as an in-place "<phase>: <percent>%" line on stdout.
struct PhaseBar(ProgressBar);

impl PhaseBar {
    fn new(phase: &'static str) -> Self {
        let bar = ProgressBar::with_draw_target(None, ProgressDrawTarget::stdout());
        bar.set_style(ProgressStyle::with_template("{msg}: {percent:>3}%").expect("static template"));
        bar.set_message(phase);
        Self(bar)
    }
}

impl Progress for PhaseBar {
    fn update(&mut self, bytes_read: u64, total_bytes: u64) {
        if self.0.length() != Some(total_bytes) {
            self.0.set_length(total_bytes);
        }
        self.0.set_position(bytes_read);
    }

    fn finish(&mut self) {
        self.0.finish();
    }
}

/// Output lands in the working directory as `<input basename>.csv`,
/// regardless of where the input lives.
fn output_path_for(input: &Path, cwd: &Path) -> PathBuf {
    let mut name = input
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".csv");
    cwd.join(name)
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    anyhow::ensure!(
        cli.input.exists(),
        "file not found: {}",
        cli.input.display()
    );

    let cwd = env::current_dir().context("cannot determine working directory")?;
    let output = output_path_for(&cli.input, &cwd);
    println!("Input : {}", cli.input.display());
    println!("Output: {}", output.display());

    println!("\nAnalyzing fields...");
    let mut bar = PhaseBar::new("Scanning fields");
    let fields = discover_fields(&cli.input, &mut bar)?;
    println!("Found {} unique fields.", fields.len());

    println!("\nConverting to CSV...");
    let mut bar = PhaseBar::new("Writing CSV");
    let rows = write_csv(&cli.input, &fields, &output, &mut bar)?;
    log::debug!("{rows} data rows written");

    println!("\nDone! Output written to '{}'", output.display());
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    // A usage error must exit with code 1, not clap's default 2. Help and
    // version displays are not failures.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
