use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::core::ImagePayload;
use crate::utils::formats::{extract_filename, media_type_from_path};

const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

/// Default per-file limit used by [`validate_file_size`] callers (5 MB).
pub const DEFAULT_MAX_FILE_KB: f64 = 5120.0;

/// Anything with a byte size that can be checked against upload limits.
pub trait FileSize {
    fn file_size(&self) -> u64;
}

impl FileSize for u64 {
    fn file_size(&self) -> u64 {
        *self
    }
}

impl FileSize for ImagePayload {
    fn file_size(&self) -> u64 {
        self.size()
    }
}

impl FileSize for std::fs::Metadata {
    fn file_size(&self) -> u64 {
        self.len()
    }
}

impl<T: FileSize + ?Sized> FileSize for &T {
    fn file_size(&self) -> u64 {
        (**self).file_size()
    }
}

/// True when `file` is at most `max_size_kb` KB.
pub fn validate_file_size(file: &impl FileSize, max_size_kb: f64) -> bool {
    file.file_size() as f64 <= max_size_kb * 1024.0
}

/// True when the combined size of `files` is at most `max_total_kb` KB.
///
/// An empty list always validates.
pub fn validate_total_size<T: FileSize>(files: &[T], max_total_kb: f64) -> bool {
    let total: u64 = files.iter().map(FileSize::file_size).sum();
    total as f64 <= max_total_kb * 1024.0
}

/// Renders a byte count with binary units and one decimal, e.g. `1.5 KB`.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    format!("{value:.1} {}", UNITS[unit])
}

/// Reads a file into a payload, inferring its media type from the extension.
pub async fn read_payload(path: impl AsRef<Path>) -> std::io::Result<ImagePayload> {
    let path = path.as_ref();
    let bytes = fs::read(path).await?;
    let display = path.to_string_lossy();
    let mut payload = ImagePayload::new(extract_filename(&display), media_type_from_path(path), bytes);

    if let Ok(modified) = fs::metadata(path).await.and_then(|m| m.modified()) {
        payload = payload.with_last_modified(modified.into());
    }

    Ok(payload)
}

/// Picks one output path per payload inside `dir`, in input order.
///
/// Payloads sharing a name get a numeric suffix before the extension
/// (`foto.jpg`, `foto-2.jpg`, ...), so no output overwrites another.
pub fn output_paths(dir: impl AsRef<Path>, payloads: &[ImagePayload]) -> Vec<PathBuf> {
    let dir = dir.as_ref();
    let mut taken = HashSet::with_capacity(payloads.len());

    payloads
        .iter()
        .map(|payload| {
            let name = payload.name();
            let mut candidate = name.to_string();
            let mut n = 2;
            while !taken.insert(candidate.clone()) {
                candidate = suffixed(name, n);
                n += 1;
            }
            dir.join(candidate)
        })
        .collect()
}

fn suffixed(name: &str, n: usize) -> String {
    let path = Path::new(name);
    match (
        path.file_stem().and_then(|s| s.to_str()),
        path.extension().and_then(|e| e.to_str()),
    ) {
        (Some(stem), Some(ext)) => format!("{stem}-{n}.{ext}"),
        _ => format!("{name}-{n}"),
    }
}

/// Writes `payload` to `target`, creating the parent directory if needed.
pub async fn write_payload(target: impl AsRef<Path>, payload: &ImagePayload) -> std::io::Result<()> {
    let target = target.as_ref();
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).await?;
    }
    fs::write(target, payload.bytes()).await
}
