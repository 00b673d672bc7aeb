//! Listing normalization: flat delimiter listings become folder/file entries.

use gallery_store::{extension_of, file_name_of, RawListing};
use serde::{Deserialize, Serialize};

/// One row of a folder view.
///
/// Entries are derived from a listing response and never persisted;
/// every fetch rebuilds them from scratch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Full key from the bucket root. Folder keys end with `/`,
    /// file keys never do.
    pub key: String,
    /// Display name: the last path segment.
    pub name: String,
    pub is_folder: bool,
    pub size: Option<u64>,
    /// Unix timestamp in seconds.
    pub last_modified: Option<i64>,
    /// Lowercased extension; empty for folders and extension-less files.
    pub extension: String,
}

impl Entry {
    fn folder(key: String) -> Self {
        Self {
            name: file_name_of(&key).to_string(),
            key,
            is_folder: true,
            size: None,
            last_modified: None,
            extension: String::new(),
        }
    }

    /// Whether the photo viewer can preview this entry inline.
    pub fn is_image(&self) -> bool {
        matches!(
            self.extension.as_str(),
            "jpg" | "jpeg" | "png" | "gif" | "webp" | "bmp" | "svg"
        )
    }
}

/// Convert one raw listing into display entries.
///
/// Common prefixes become folder entries (no size or date), content items
/// become file entries. The item whose key exactly equals the queried
/// prefix is that folder's own zero-byte marker object and is dropped.
pub fn normalize_listing(prefix: &str, listing: &RawListing) -> Vec<Entry> {
    let mut entries =
        Vec::with_capacity(listing.common_prefixes.len() + listing.objects.len());

    for cp in &listing.common_prefixes {
        entries.push(Entry::folder(cp.clone()));
    }

    for obj in listing.objects.iter().filter(|o| o.key != prefix) {
        entries.push(Entry {
            name: file_name_of(&obj.key).to_string(),
            extension: extension_of(&obj.key),
            key: obj.key.clone(),
            is_folder: false,
            size: obj.size.map(|s| s.max(0) as u64),
            last_modified: obj.last_modified,
        });
    }

    entries
}
