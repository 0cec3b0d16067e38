use anyhow::{Context, Result, bail};
use image::ImageFormat;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extensions directory mode picks up when no config overrides them.
pub const DEFAULT_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

/// The container format of an image file, determined by its extension.
///
/// Output format follows the *output* path's extension, so a cleaned copy
/// written to `out.png` is PNG-encoded whatever the input was.
///
/// # Example
///
/// ```rust
/// use metaclean::pipeline::ImageKind;
/// use std::path::Path;
///
/// assert_eq!(ImageKind::from_path(Path::new("photo.JPG")), Some(ImageKind::Jpeg));
/// assert_eq!(ImageKind::from_path(Path::new("notes.txt")), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
    WebP,
}

impl ImageKind {
    /// Determine the image kind from a file path extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "webp" => Some(Self::WebP),
            _ => None,
        }
    }

    /// Map an encoder format onto the containers metadata can be inspected in.
    ///
    /// Catches extensions `image` accepts but the allow-list does not, such
    /// as `.jfif`.
    pub fn from_format(format: ImageFormat) -> Option<Self> {
        match format {
            ImageFormat::Jpeg => Some(Self::Jpeg),
            ImageFormat::Png => Some(Self::Png),
            ImageFormat::WebP => Some(Self::WebP),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::WebP => "webp",
        }
    }
}

/// Check if a file's extension is in `extensions` (case-insensitive).
///
/// `extensions` holds lowercase entries without the leading dot.
pub fn has_allowed_extension<S: AsRef<str>>(path: &Path, extensions: &[S]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_lowercase();
            extensions.iter().any(|allowed| allowed.as_ref() == ext)
        })
        .unwrap_or(false)
}

/// List the images directly inside `dir` whose extension is allowed.
///
/// The listing is not recursive and keeps the order the filesystem returns
/// entries in. Subdirectories are skipped even when their name looks like an
/// image. Entries that cannot be read are logged and skipped; failing to read
/// `dir` itself is an error.
///
/// # Example
///
/// ```rust,no_run
/// use metaclean::pipeline::{collect_directory_images, DEFAULT_EXTENSIONS};
/// use std::path::Path;
///
/// let images = collect_directory_images(Path::new("./photos"), DEFAULT_EXTENSIONS).unwrap();
/// println!("Found {} images", images.len());
/// ```
pub fn collect_directory_images<S: AsRef<str>>(
    dir: &Path,
    extensions: &[S],
) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        bail!("Not a directory: {}", dir.display());
    }

    let mut images = Vec::new();

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                return Err(e).with_context(|| format!("Failed to list {}", dir.display()));
            }
            Err(e) => {
                log::warn!("Skipping unreadable entry in {}: {e}", dir.display());
                continue;
            }
        };

        let path = entry.path();
        if !entry.file_type().is_file() {
            log::debug!("Skipping non-file entry: {}", path.display());
            continue;
        }

        if has_allowed_extension(path, extensions) {
            images.push(path.to_path_buf());
        } else {
            log::debug!("Skipping unsupported file: {}", path.display());
        }
    }

    Ok(images)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    // ── ImageKind::from_path ──────────────────────────────────────────

    #[test]
    fn image_kind_jpeg() {
        assert_eq!(ImageKind::from_path(Path::new("photo.jpg")), Some(ImageKind::Jpeg));
        assert_eq!(ImageKind::from_path(Path::new("photo.jpeg")), Some(ImageKind::Jpeg));
        assert_eq!(ImageKind::from_path(Path::new("PHOTO.JPG")), Some(ImageKind::Jpeg));
    }

    #[test]
    fn image_kind_png_and_webp() {
        assert_eq!(ImageKind::from_path(Path::new("image.PNG")), Some(ImageKind::Png));
        assert_eq!(ImageKind::from_path(Path::new("image.webp")), Some(ImageKind::WebP));
    }

    #[test]
    fn image_kind_unsupported() {
        assert_eq!(ImageKind::from_path(Path::new("scan.tiff")), None);
        assert_eq!(ImageKind::from_path(Path::new("notes.txt")), None);
        assert_eq!(ImageKind::from_path(Path::new("noext")), None);
    }

    #[test]
    fn image_kind_from_format() {
        assert_eq!(ImageKind::from_format(ImageFormat::Jpeg), Some(ImageKind::Jpeg));
        assert_eq!(ImageKind::from_format(ImageFormat::Png), Some(ImageKind::Png));
        assert_eq!(ImageKind::from_format(ImageFormat::WebP), Some(ImageKind::WebP));
        assert_eq!(ImageKind::from_format(ImageFormat::Bmp), None);
    }

    // ── has_allowed_extension ────────────────────────────────────────

    #[test]
    fn allowed_extensions_case_insensitive() {
        assert!(has_allowed_extension(Path::new("a.jpg"), DEFAULT_EXTENSIONS));
        assert!(has_allowed_extension(Path::new("a.JPEG"), DEFAULT_EXTENSIONS));
        assert!(has_allowed_extension(Path::new("a.Png"), DEFAULT_EXTENSIONS));
        assert!(has_allowed_extension(Path::new("a.WEBP"), DEFAULT_EXTENSIONS));
    }

    #[test]
    fn disallowed_extensions() {
        assert!(!has_allowed_extension(Path::new("notes.txt"), DEFAULT_EXTENSIONS));
        assert!(!has_allowed_extension(Path::new("scan.tif"), DEFAULT_EXTENSIONS));
        assert!(!has_allowed_extension(Path::new("jpg"), DEFAULT_EXTENSIONS));
        assert!(!has_allowed_extension(Path::new("photo.jpg.bak"), DEFAULT_EXTENSIONS));
    }

    #[test]
    fn custom_extension_list() {
        let extensions = vec!["tiff".to_string()];
        assert!(has_allowed_extension(Path::new("scan.TIFF"), &extensions));
        assert!(!has_allowed_extension(Path::new("photo.jpg"), &extensions));
    }

    // ── collect_directory_images ─────────────────────────────────────

    #[test]
    fn collect_filters_by_extension() {
        let dir = TempDir::new().unwrap();
        for name in ["a.jpg", "b.JPEG", "c.png", "d.webp", "notes.txt", "e.gif"] {
            fs::write(dir.path().join(name), b"fake").unwrap();
        }

        let mut names: Vec<String> = collect_directory_images(dir.path(), DEFAULT_EXTENSIONS)
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        names.sort();

        assert_eq!(names, vec!["a.jpg", "b.JPEG", "c.png", "d.webp"]);
    }

    #[test]
    fn collect_is_not_recursive() {
        let dir = TempDir::new().unwrap();
        let sub = dir.path().join("nested");
        fs::create_dir(&sub).unwrap();
        fs::write(dir.path().join("top.png"), b"fake").unwrap();
        fs::write(sub.join("deep.png"), b"fake").unwrap();

        let images = collect_directory_images(dir.path(), DEFAULT_EXTENSIONS).unwrap();
        assert_eq!(images, vec![dir.path().join("top.png")]);
    }

    #[test]
    fn collect_skips_directories_named_like_images() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("album.jpg")).unwrap();

        let images = collect_directory_images(dir.path(), DEFAULT_EXTENSIONS).unwrap();
        assert!(images.is_empty());
    }

    #[test]
    fn collect_empty_dir() {
        let dir = TempDir::new().unwrap();
        let images = collect_directory_images(dir.path(), DEFAULT_EXTENSIONS).unwrap();
        assert!(images.is_empty());
    }

    #[test]
    fn collect_nonexistent_dir_is_an_error() {
        let result = collect_directory_images(Path::new("/nonexistent/path"), DEFAULT_EXTENSIONS);
        assert!(result.is_err());
    }

    #[test]
    fn collect_file_path_is_an_error() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("photo.jpg");
        fs::write(&file, b"fake").unwrap();

        assert!(collect_directory_images(&file, DEFAULT_EXTENSIONS).is_err());
    }
}
