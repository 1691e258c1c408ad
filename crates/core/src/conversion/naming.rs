//! File naming rules shared by every deployment variant.

use std::path::{Path, PathBuf};

/// Recognized point-cloud input extensions, compared case-insensitively.
pub const POINT_CLOUD_EXTENSIONS: [&str; 2] = ["las", "laz"];

/// Extension given to converted files. Replaces the input extension.
pub const COPC_EXTENSION: &str = "copc.laz";

/// Whether the path has a `.las` or `.laz` extension.
pub fn is_point_cloud(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| {
            POINT_CLOUD_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

/// Default output for an input: `terrain.las` becomes `terrain.copc.laz`.
pub fn default_output_path(input: &Path) -> PathBuf {
    input.with_extension(COPC_EXTENSION)
}

/// Default output file name for an input file name.
pub fn default_output_name(file_name: &str) -> String {
    default_output_path(Path::new(file_name))
        .to_string_lossy()
        .into_owned()
}

/// Trailing path segment of an object key.
pub fn key_file_name(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}

/// Folder part of an object key, without a trailing slash.
pub fn key_folder(key: &str) -> &str {
    key.rsplit_once('/').map(|(folder, _)| folder).unwrap_or("")
}

/// Joins an object-store prefix and a relative key with exactly one slash.
pub fn join_key(prefix: &str, key: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    let key = key.trim_start_matches('/');
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}/{}", prefix, key)
    }
}

/// Destination key that mirrors the source folder of `key`.
///
/// `site/2024/a.laz` with output `a.copc.laz` maps to `site/2024/a.copc.laz`,
/// or `2024/a.copc.laz` when the leading folder is trimmed.
pub fn mirrored_key(key: &str, output_name: &str, trim_leading_folder: bool) -> String {
    let folder = key_folder(key);
    let relative = if folder.is_empty() {
        output_name.to_string()
    } else {
        format!("{}/{}", folder, output_name)
    };

    if trim_leading_folder {
        if let Some((_, rest)) = relative.split_once('/') {
            return rest.to_string();
        }
    }
    relative
}
