//! portail CLI - export a maintenance workbook to the offline technician portal
//!
//! Reads the workbook, regenerates `index.html` and `sw.js` in the output
//! directory, and prints a summary of what changed.

use clap::Parser;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use portail::assets::ManifestCopy;
use portail::{ExportOptions, ExportReport, SetReport};
use std::path::{Path, PathBuf};

/// Export a maintenance workbook to the offline technician portal
#[derive(Parser)]
#[command(
    name = "portail",
    version,
    about = "Export a maintenance workbook to the offline technician portal",
    long_about = "portail - Offline technician portal exporter.\n\n\
                  Reads the Etalons and Materiels sheets of an XLSX/XLSM workbook and \
                  regenerates index.html and sw.js in the output directory."
)]
struct Cli {
    /// Workbook to export (.xlsx or .xlsm)
    workbook: PathBuf,

    /// Output directory (default: directory of the executable)
    output_dir: Option<PathBuf>,

    /// Directory holding template.html, sw.js, label images and manifest.json
    /// (default: directory of the executable)
    #[arg(long)]
    assets_dir: Option<PathBuf>,

    /// Forms subdirectory of the output directory
    #[arg(long, default_value = "forms")]
    forms_dir: String,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only print errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli);

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = match (cli.quiet, cli.verbose) {
        (true, _) => "portail=error",
        (false, 0) => "portail=warn",
        (false, 1) => "portail=info",
        _ => "portail=debug",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let exe_dir = executable_dir()?;
    let output_dir = cli.output_dir.unwrap_or_else(|| exe_dir.clone());
    let assets_dir = cli.assets_dir.unwrap_or(exe_dir);

    let options = ExportOptions::new(&cli.workbook)
        .with_output_dir(&output_dir)
        .with_assets_dir(&assets_dir)
        .with_forms_dir(cli.forms_dir);

    let pb = if cli.quiet {
        ProgressBar::hidden()
    } else {
        create_spinner("Exporting workbook...")
    };
    let report = portail::run_export(&options);
    pb.finish_and_clear();
    let report = report?;

    if !cli.quiet {
        print_report(&cli.workbook, &report);
    }

    Ok(())
}

fn executable_dir() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let exe = std::env::current_exe()?;
    let dir = exe
        .parent()
        .map(Path::to_path_buf)
        .ok_or("cannot locate the executable directory")?;
    Ok(dir)
}

fn print_report(workbook: &Path, report: &ExportReport) {
    println!("{}", "Portal Export".cyan().bold());
    println!("{}", "─".repeat(40));
    println!(
        "{}: {}",
        "Source".bold(),
        workbook.file_name().unwrap_or_default().to_string_lossy()
    );

    println!("\n{}", "Standards".cyan().bold());
    for (category, count) in &report.categories {
        println!("  • {}: {}", category, count);
    }
    print_set(&report.etalons);

    println!("\n{}", "Equipment".cyan().bold());
    for (site, count) in &report.sites {
        let site = if site.is_empty() { "(vide)" } else { site };
        println!("  • {}: {}", site, count);
    }
    print_set(&report.materiels);

    println!("\n{}", "Forms".cyan().bold());
    for form in &report.forms {
        println!("  • {} ({})", form.title, form.filename);
    }
    print_set(&report.constats);
    if report.injected > 0 {
        println!(
            "  {} {} sources injected into {} form(s)",
            "→".blue(),
            report.sources,
            report.injected
        );
    }

    println!();
    println!("{} {}", "✓".green().bold(), report.page.display());
    match &report.worker {
        Some(path) => println!(
            "{} {} (v{}, {} form(s) cached)",
            "✓".green().bold(),
            path.display(),
            report.worker_version,
            report.constats.count
        ),
        None => println!("{} sw.js not updated", "!".yellow().bold()),
    }
    if report.manifest == ManifestCopy::Copied {
        println!("{} manifest.json copied", "✓".green().bold());
    }

    for warning in &report.warnings {
        println!("{} {}", "!".yellow().bold(), warning);
    }
}

fn print_set(set: &SetReport) {
    println!("  {} {} exported", "✓".green().bold(), set.count);
    if set.changed {
        println!("  {} Changed, updated {}", "→".blue(), set.last_changed);
    } else {
        println!("  {} Unchanged since {}", "→".blue(), set.last_changed);
    }
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
            .template("{spinner:.blue} {msg}")
            .unwrap(),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}
