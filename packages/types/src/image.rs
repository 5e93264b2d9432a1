use bytes::Bytes;
use std::path::{Path, PathBuf};

/// Reference to the photo being identified
#[derive(Debug, Clone)]
pub enum ImageInput {
    /// Local file, usually straight from the camera or gallery
    Path(PathBuf),
    /// In-memory image; the file name drives MIME inference
    Buffer { bytes: Bytes, file_name: String },
}

impl ImageInput {
    /// Accepts plain paths as well as `file://` URIs
    pub fn from_uri(uri: &str) -> Self {
        let path = uri.strip_prefix("file://").unwrap_or(uri);
        ImageInput::Path(PathBuf::from(path))
    }

    pub fn from_bytes(bytes: impl Into<Bytes>, file_name: impl Into<String>) -> Self {
        ImageInput::Buffer {
            bytes: bytes.into(),
            file_name: file_name.into(),
        }
    }

    pub fn file_name(&self) -> String {
        match self {
            ImageInput::Path(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "photo.jpg".to_string()),
            ImageInput::Buffer { file_name, .. } => file_name.clone(),
        }
    }

    pub fn mime_type(&self) -> &'static str {
        mime_for_file_name(&self.file_name())
    }

    /// Short form for log lines
    pub fn describe(&self) -> String {
        let full = match self {
            ImageInput::Path(path) => path.display().to_string(),
            ImageInput::Buffer { bytes, file_name } => {
                format!("{} ({} bytes in memory)", file_name, bytes.len())
            }
        };
        if full.chars().count() > 100 {
            let head: String = full.chars().take(100).collect();
            format!("{}...", head)
        } else {
            full
        }
    }
}

impl From<PathBuf> for ImageInput {
    fn from(path: PathBuf) -> Self {
        ImageInput::Path(path)
    }
}

impl From<&Path> for ImageInput {
    fn from(path: &Path) -> Self {
        ImageInput::Path(path.to_path_buf())
    }
}

/// `.png` uploads as `image/png`, everything else as `image/jpeg`
pub fn mime_for_file_name(file_name: &str) -> &'static str {
    let is_png = Path::new(file_name)
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("png"))
        .unwrap_or(false);
    if is_png { "image/png" } else { "image/jpeg" }
}
