use anyhow::Result;
use clap::{CommandFactory, Parser};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use metaclean::config::Config;
use metaclean::scrub::ScrubResult;
use metaclean::{metadata, pipeline, report, scrub};

#[derive(Parser, Debug)]
#[command(
    name = "metaclean",
    version,
    about = "Clean metadata from image files."
)]
struct Cli {
    /// Path to a single file to clean
    #[arg(short, long, value_name = "PATH")]
    file: Option<PathBuf>,

    /// Path to a directory to clean all images in
    #[arg(short, long, value_name = "PATH")]
    dir: Option<PathBuf>,

    /// Output path (for single file mode)
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Path to config file (default: metaclean.json next to binary)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Initialize a default config file and exit
    #[arg(long)]
    init: bool,

    /// Display identifying metadata of each image before cleaning it
    #[arg(long = "show-metadata")]
    show_metadata: bool,

    /// Output results as JSON
    #[arg(long)]
    json: bool,

    /// Do not print the banner
    #[arg(long = "no-banner")]
    no_banner: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// At least one of `--file` / `--dir` was given.
    fn has_target(&self) -> bool {
        self.file.is_some() || self.dir.is_some()
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    if !cli.no_banner {
        print!("{}", report::banner());
    }

    // Handle --init
    if cli.init {
        let path = Config::default().save(cli.config.as_deref())?;
        println!("Default config written to {}", path.display());
        return Ok(ExitCode::SUCCESS);
    }

    if !cli.has_target() {
        Cli::command().print_help()?;
        return Ok(ExitCode::FAILURE);
    }

    let config = Config::load(cli.config.as_deref())?;
    let mut results = Vec::new();

    if let Some(ref file) = cli.file {
        results.push(clean_one(file, cli.output.as_deref(), &config, cli.show_metadata));
    }

    if let Some(ref dir) = cli.dir {
        println!("{}", report::directory_header(dir));
        if cli.output.is_some() {
            log::debug!("--output only applies to --file; directory mode writes beside each image");
        }

        let images = pipeline::collect_directory_images(dir, &config.scan.extensions)?;
        log::debug!("Found {} image(s) in {}", images.len(), dir.display());

        for image_path in &images {
            results.push(clean_one(image_path, None, &config, cli.show_metadata));
        }
    }

    // JSON output
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    }

    log::debug!("{}", report::summary_line(&results));

    // Per-file failures are reported in their status line, not the exit code
    Ok(ExitCode::SUCCESS)
}

/// Scrub one image and print its status line.
fn clean_one(
    path: &Path,
    output: Option<&Path>,
    config: &Config,
    show_metadata: bool,
) -> ScrubResult {
    if show_metadata {
        match metadata::read_metadata(path) {
            Ok(summary) => print!("{}", report::metadata_listing(path, &summary)),
            Err(e) => log::warn!("Failed to read metadata from {}: {e:#}", path.display()),
        }
    }

    let result = scrub::scrub_image(path, output, &config.output);
    println!("{}", report::status_line(&result));
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_flags_has_no_target() {
        let cli = Cli::try_parse_from(["metaclean"]).unwrap();
        assert!(!cli.has_target());
    }

    #[test]
    fn output_alone_has_no_target() {
        let cli = Cli::try_parse_from(["metaclean", "-o", "out.png"]).unwrap();
        assert!(!cli.has_target());
    }

    #[test]
    fn short_flags() {
        let cli = Cli::try_parse_from(["metaclean", "-f", "a.jpg", "-o", "b.jpg"]).unwrap();
        assert_eq!(cli.file, Some(PathBuf::from("a.jpg")));
        assert_eq!(cli.output, Some(PathBuf::from("b.jpg")));
        assert!(cli.dir.is_none());
        assert!(cli.has_target());
    }

    #[test]
    fn file_and_dir_together() {
        let cli = Cli::try_parse_from(["metaclean", "--file", "a.png", "--dir", "pics"]).unwrap();
        assert_eq!(cli.file, Some(PathBuf::from("a.png")));
        assert_eq!(cli.dir, Some(PathBuf::from("pics")));
    }

    #[test]
    fn optional_switches() {
        let cli = Cli::try_parse_from([
            "metaclean",
            "-d",
            "pics",
            "--json",
            "--no-banner",
            "--show-metadata",
            "-v",
            "-c",
            "conf.json",
        ])
        .unwrap();
        assert!(cli.json);
        assert!(cli.no_banner);
        assert!(cli.show_metadata);
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("conf.json")));
    }

    #[test]
    fn clean_one_reports_failure_without_panicking() {
        let dir = tempfile::TempDir::new().unwrap();
        let broken = dir.path().join("broken.png");
        std::fs::write(&broken, b"nope").unwrap();

        let result = clean_one(&broken, None, &Config::default(), true);
        assert!(!result.success());
        assert_eq!(result.file_name(), "broken.png");
    }
}
