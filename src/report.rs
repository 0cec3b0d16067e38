//! Terminal presentation: banner, status lines and metadata listings.
//!
//! Everything here only formats strings; printing is left to the caller.

use crate::metadata::MetadataSummary;
use crate::scrub::ScrubResult;
use std::path::Path;

// ANSI color codes
const MAGENTA: &str = "\x1b[95m";
const GREY: &str = "\x1b[90m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

const LOGO: [&str; 6] = [
    " ███╗   ███╗███████╗████████╗ █████╗  ██████╗██╗     ███████╗ █████╗ ███╗   ██╗",
    " ████╗ ████║██╔════╝╚══██╔══╝██╔══██╗██╔════╝██║     ██╔════╝██╔══██╗████╗  ██║",
    " ██╔████╔██║█████╗     ██║   ███████║██║     ██║     █████╗  ███████║██╔██╗ ██║",
    " ██║╚██╔╝██║██╔══╝     ██║   ██╔══██║██║     ██║     ██╔══╝  ██╔══██║██║╚██╗██║",
    " ██║ ╚═╝ ██║███████╗   ██║   ██║  ██║╚██████╗███████╗███████╗██║  ██║██║ ╚████║",
    " ╚═╝     ╚═╝╚══════╝   ╚═╝   ╚═╝  ╚═╝ ╚═════╝╚══════╝╚══════╝╚═╝  ╚═╝╚═╝  ╚═══╝",
];

/// The start-up banner, colored with ANSI escapes.
pub fn banner() -> String {
    let mut out = String::from("\n");
    for line in LOGO {
        out.push_str(&format!("    {MAGENTA}{line}\n"));
    }
    out.push_str(&format!(
        "{RESET}{:>34}{GREY}Professional Metadata Sanitizer{RESET}\n",
        ""
    ));
    out
}

/// One line per scrubbed file, naming the input by its base name.
pub fn status_line(result: &ScrubResult) -> String {
    match &result.error {
        None => format!("  [✓] Successfully cleaned: {}", result.file_name()),
        Some(err) => format!("  [✗] Failed to clean {}: {err}", result.file_name()),
    }
}

pub fn directory_header(dir: &Path) -> String {
    format!("Cleaning all images in: {}", dir.display())
}

/// The identifying tags of one image, or a note that there are none.
pub fn metadata_listing(path: &Path, summary: &MetadataSummary) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let mut out = format!("  {BOLD}{name}{RESET}\n");
    if summary.is_empty() {
        out.push_str(&format!("    {DIM}no identifying metadata found{RESET}\n"));
        return out;
    }

    for (tag, value) in summary.entries() {
        out.push_str(&format!("    {DIM}{tag:<14}{RESET} {value}\n"));
    }
    out
}

/// Closing tally across all processed files.
pub fn summary_line(results: &[ScrubResult]) -> String {
    let succeeded = results.iter().filter(|r| r.success()).count();
    let failed = results.len() - succeeded;
    format!(
        "Done: {succeeded} succeeded, {failed} failed out of {} images",
        results.len()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn result(input: &str, error: Option<&str>) -> ScrubResult {
        ScrubResult {
            input: PathBuf::from(input),
            output: None,
            error: error.map(str::to_string),
        }
    }

    #[test]
    fn success_line_uses_base_name() {
        let line = status_line(&result("/photos/trip/beach.jpg", None));
        assert_eq!(line, "  [✓] Successfully cleaned: beach.jpg");
    }

    #[test]
    fn failure_line_carries_error() {
        let line = status_line(&result("broken.png", Some("Failed to decode image")));
        assert_eq!(line, "  [✗] Failed to clean broken.png: Failed to decode image");
    }

    #[test]
    fn banner_is_colored_and_reset() {
        let banner = banner();
        assert!(banner.contains(MAGENTA));
        assert!(banner.contains("Professional Metadata Sanitizer"));
        assert!(banner.trim_end().ends_with(RESET));
    }

    #[test]
    fn listing_without_metadata() {
        let out = metadata_listing(Path::new("a/plain.png"), &MetadataSummary::default());
        assert!(out.contains("plain.png"));
        assert!(out.contains("no identifying metadata found"));
    }

    #[test]
    fn listing_with_metadata() {
        let summary = MetadataSummary {
            model: Some("EOS R5".to_string()),
            gps_latitude: Some(1.5),
            ..MetadataSummary::default()
        };
        let out = metadata_listing(Path::new("shot.jpg"), &summary);
        assert!(out.contains("Model"));
        assert!(out.contains("EOS R5"));
        assert!(out.contains("1.500000"));
    }

    #[test]
    fn summary_counts() {
        let results = vec![
            result("a.jpg", None),
            result("b.jpg", Some("boom")),
            result("c.jpg", None),
        ];
        assert_eq!(
            summary_line(&results),
            "Done: 2 succeeded, 1 failed out of 3 images"
        );
    }

    #[test]
    fn directory_header_names_dir() {
        assert_eq!(
            directory_header(Path::new("./pics")),
            "Cleaning all images in: ./pics"
        );
    }
}
