//! Command dispatch for the gallery binary.
//!
//! Each subcommand builds one `Gallery` over the environment-configured
//! bucket, runs a single operation, and prints a human-readable result.

use anyhow::{Context, Result};
use bytes::Bytes;
use chrono::DateTime;
use clap::{Parser, Subcommand, ValueEnum};
use gallery_core::{
    Entry, Gallery, GalleryConfig, KeyPolicy, ListQuery, Preferences, SortBy, SortDirection,
    UploadCoordinator, UploadFile, UploadProgress,
};
use gallery_store::{ObjectStore, S3Store};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "bucket-gallery", version, about = "Browse and manage an S3 file gallery")]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List a folder of the bucket
    Ls {
        /// Folder prefix to list (defaults to the bucket root)
        #[arg(default_value = "")]
        prefix: String,
        /// Case-insensitive substring filter on object keys
        #[arg(short, long)]
        search: Option<String>,
        /// Only show files with these extensions (e.g. jpg png)
        #[arg(short = 't', long = "type")]
        types: Vec<String>,
        /// Sort field (defaults to the saved preference)
        #[arg(long, value_enum)]
        sort: Option<SortArg>,
        /// Sort descending instead of ascending
        #[arg(long)]
        desc: bool,
    },
    /// Upload local files into a folder
    Upload {
        /// Destination folder prefix
        prefix: String,
        /// Files to upload, in order
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Keep file names as-is instead of timestamp-prefixing them
        #[arg(long)]
        raw_names: bool,
    },
    /// Create a folder
    Mkdir {
        /// Parent folder prefix
        prefix: String,
        /// New folder name
        name: String,
    },
    /// Delete objects (folder markers included)
    Rm {
        /// Keys to delete
        #[arg(required = true)]
        keys: Vec<String>,
    },
    /// Print a signed download URL for a file
    Url {
        /// Object key
        key: String,
        /// URL lifetime in seconds (defaults to the saved preference)
        #[arg(long)]
        expiry_secs: Option<u64>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SortArg {
    Name,
    Size,
    Date,
}

impl From<SortArg> for SortBy {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Name => SortBy::Name,
            SortArg::Size => SortBy::Size,
            SortArg::Date => SortBy::Date,
        }
    }
}

pub async fn run(cli: Cli) -> Result<()> {
    let config = GalleryConfig::from_env()?;
    let prefs = Preferences::load().unwrap_or_default();
    let store: Arc<dyn ObjectStore> = Arc::new(S3Store::new(config.to_s3_config())?);
    let mut gallery = Gallery::new(Arc::clone(&store))
        .with_url_ttl(Duration::from_secs(prefs.signed_url_ttl_secs));

    match cli.command {
        Commands::Ls {
            prefix,
            search,
            types,
            sort,
            desc,
        } => {
            *gallery.query_mut() = build_query(&prefs, search, types, sort, desc);

            let entries = if prefix.is_empty() {
                gallery.load().await?
            } else {
                gallery.jump_to(&prefix).await?
            };
            print_listing(&gallery, &entries);
        }
        Commands::Upload {
            prefix,
            files,
            raw_names,
        } => {
            let policy = if raw_names {
                KeyPolicy::Raw
            } else {
                KeyPolicy::TimestampPrefixed
            };
            let coordinator = UploadCoordinator::with_policy(store, policy);

            let mut batch = Vec::with_capacity(files.len());
            for path in &files {
                batch.push(read_upload_file(path)?);
            }

            let urls = coordinator
                .upload_batch(&prefix, batch, print_progress)
                .await?;
            println!();
            for url in urls {
                println!("{}", url);
            }
        }
        Commands::Mkdir { prefix, name } => {
            if !prefix.is_empty() {
                gallery.jump_to(&prefix).await?;
            }
            let key = gallery.create_folder(&name).await?;
            println!("created {}", key);
        }
        Commands::Rm { keys } => {
            gallery
                .selection_mut()
                .select_all(keys.iter().map(String::as_str));
            let outcome = gallery.delete_selected().await;
            println!("{}", outcome.summary());
            for (key, error) in &outcome.failed {
                eprintln!("  {}: {}", key, error);
            }
            if !outcome.all_ok() {
                anyhow::bail!("some deletes failed");
            }
        }
        Commands::Url { key, expiry_secs } => {
            let expiry = expiry_secs.unwrap_or(prefs.signed_url_ttl_secs);
            let url = store.signed_url(&key, Duration::from_secs(expiry)).await?;
            println!("{}", url);
        }
    }

    Ok(())
}

/// Saved preferences supply the sort defaults; flags override them.
fn build_query(
    prefs: &Preferences,
    search: Option<String>,
    types: Vec<String>,
    sort: Option<SortArg>,
    desc: bool,
) -> ListQuery {
    ListQuery {
        search_term: search.unwrap_or_default(),
        file_type_filter: types.into_iter().map(|t| t.to_lowercase()).collect(),
        sort_by: sort.map(Into::into).unwrap_or(prefs.sort_by),
        sort_direction: if desc {
            SortDirection::Descending
        } else {
            prefs.sort_direction
        },
    }
}

fn print_listing(gallery: &Gallery, entries: &[Entry]) {
    let crumbs: Vec<String> = gallery
        .breadcrumbs()
        .into_iter()
        .map(|c| c.name)
        .collect();
    println!("{}", crumbs.join(" / "));

    for entry in entries {
        if entry.is_folder {
            println!("  {:>10}  {:>16}  {}/", "-", "-", entry.name);
        } else {
            println!(
                "  {:>10}  {:>16}  {}",
                entry.size.map_or_else(|| "-".to_string(), format_size),
                entry.last_modified.map_or_else(|| "-".to_string(), format_time),
                entry.name
            );
        }
    }
    println!("{} items", entries.len());
}

fn print_progress(progress: UploadProgress) {
    use std::io::Write;

    print!(
        "\r[{:>3}%] {}/{} files",
        progress.percent, progress.completed_files, progress.total_files
    );
    let _ = std::io::stdout().flush();
}

fn read_upload_file(path: &PathBuf) -> Result<UploadFile> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("invalid file name: {}", path.display()))?
        .to_string();
    let body = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let content_type = content_type_for(&name).map(String::from);

    Ok(UploadFile {
        name,
        content_type,
        body: Bytes::from(body),
    })
}

/// Best-effort content type from the file extension.
fn content_type_for(name: &str) -> Option<&'static str> {
    match gallery_store::extension_of(name).as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "svg" => Some("image/svg+xml"),
        "pdf" => Some("application/pdf"),
        "txt" => Some("text/plain"),
        "json" => Some("application/json"),
        "mp4" => Some("video/mp4"),
        _ => None,
    }
}

fn format_size(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = KIB * 1024;
    const GIB: u64 = MIB * 1024;
    match bytes {
        b if b >= GIB => format!("{:.1} GiB", b as f64 / GIB as f64),
        b if b >= MIB => format!("{:.1} MiB", b as f64 / MIB as f64),
        b if b >= KIB => format!("{:.1} KiB", b as f64 / KIB as f64),
        b => format!("{} B", b),
    }
}

fn format_time(epoch_secs: i64) -> String {
    DateTime::from_timestamp(epoch_secs, 0)
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_render_human_readable() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KiB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MiB");
    }

    #[test]
    fn content_types_cover_gallery_formats() {
        assert_eq!(content_type_for("cat.JPG"), Some("image/jpeg"));
        assert_eq!(content_type_for("doc.pdf"), Some("application/pdf"));
        assert_eq!(content_type_for("archive.tar.gz"), None);
    }

    #[test]
    fn cli_parses_ls_with_filters() {
        let cli = Cli::try_parse_from([
            "bucket-gallery",
            "ls",
            "photos/",
            "--search",
            "cat",
            "-t",
            "jpg",
            "--sort",
            "date",
            "--desc",
        ])
        .unwrap();

        match cli.command {
            Commands::Ls {
                prefix,
                search,
                types,
                sort,
                desc,
            } => {
                assert_eq!(prefix, "photos/");
                assert_eq!(search.as_deref(), Some("cat"));
                assert_eq!(types, vec!["jpg"]);
                assert!(matches!(sort, Some(SortArg::Date)));
                assert!(desc);
            }
            _ => panic!("expected ls"),
        }
    }

    #[test]
    fn saved_preferences_feed_the_query_unless_flags_override() {
        let prefs = Preferences {
            sort_by: SortBy::Date,
            sort_direction: SortDirection::Descending,
            ..Default::default()
        };

        // No flags: the saved sort settings apply.
        let query = build_query(&prefs, None, vec![], None, false);
        assert_eq!(query.sort_by, SortBy::Date);
        assert_eq!(query.sort_direction, SortDirection::Descending);

        // --sort overrides the field, the saved direction stays.
        let query = build_query(&prefs, None, vec!["JPG".to_string()], Some(SortArg::Size), false);
        assert_eq!(query.sort_by, SortBy::Size);
        assert_eq!(query.sort_direction, SortDirection::Descending);
        assert!(query.file_type_filter.contains("jpg"));
    }
}
