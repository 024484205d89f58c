use serde::{Deserialize, Serialize};

/// How images are grouped into `Group` rows (wells/folders) before being
/// attached to a `Plate`. Grounded on the legacy results pipeline's own
/// grouping pass, which the distilled spec's §3.5 table elides but which
/// the Result Sink needs in order to populate `Group.name`/`wellX`/`wellY`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode")]
pub enum GroupBy {
    /// Every image belongs to a single synthetic group.
    Off,
    /// Group name is the image's parent directory name.
    Directory,
    /// Group name is extracted from the image's file name via a
    /// user-configured regex; the first capture group is the group key.
    FileName { pattern: String },
}

impl GroupBy {
    /// Derives a group key from an image's absolute path. Returns `None`
    /// when `FileName`'s pattern has no match or no capture group — the
    /// caller falls back to a single ungrouped bucket in that case.
    pub fn group_key(&self, absolute_path: &str) -> Option<String> {
        match self {
            GroupBy::Off => Some("default".to_string()),
            GroupBy::Directory => std::path::Path::new(absolute_path)
                .parent()
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned()),
            GroupBy::FileName { .. } => {
                // Regex evaluation lives with the caller (the Result Sink),
                // which already depends on a regex engine for settings
                // validation; this crate stays dependency-light.
                None
            }
        }
    }
}
