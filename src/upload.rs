//! Mirrors a local directory into a staging folder on the cloud drive,
//! publishes the folder to lStore and removes the staging copy.
//!
//! The run is strictly sequential and all-or-nothing: the first failing
//! call aborts it and later steps never happen. A failure after the staging
//! folder was created leaves that folder behind on the remote side.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use walkdir::WalkDir;

use crate::api::{ApiClient, Transport};
use crate::error::{Error, Result};
use crate::names::RandomNameSequence;
use crate::store::Listing;

/// Local file or directory and where it lands under the staging prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub local: PathBuf,
    /// Forward-slash path relative to the source directory.
    pub relative: String,
}

/// Everything under a source directory, split by kind. Both lists are
/// sorted by relative path, so a directory always precedes its children.
#[derive(Debug, Default)]
pub struct Plan {
    pub dirs: Vec<Entry>,
    pub files: Vec<Entry>,
}

impl Plan {
    /// Enumerate `source` recursively. Only metadata is read here; file
    /// contents are read right before each upload.
    pub fn scan(source: &Path) -> Result<Self> {
        let meta = fs::metadata(source).map_err(|e| Error::filesystem(source, e))?;
        if !meta.is_dir() {
            return Err(Error::filesystem(
                source,
                io::Error::new(io::ErrorKind::InvalidInput, "not a directory"),
            ));
        }

        let mut plan = Plan::default();
        for entry in WalkDir::new(source).min_depth(1).follow_links(true).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(source).to_path_buf();
                Error::filesystem(path, io::Error::from(e))
            })?;
            let item = Entry {
                relative: relative_remote_path(source, entry.path())?,
                local: entry.path().to_path_buf(),
            };
            if entry.file_type().is_dir() {
                plan.dirs.push(item);
            } else {
                plan.files.push(item);
            }
        }

        plan.dirs.sort_by(|a, b| a.relative.cmp(&b.relative));
        plan.files.sort_by(|a, b| a.relative.cmp(&b.relative));
        Ok(plan)
    }
}

fn relative_remote_path(root: &Path, path: &Path) -> Result<String> {
    let relative = path
        .strip_prefix(root)
        .map_err(|_| Error::NonUtf8Path(path.to_path_buf()))?;
    let parts = relative
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| Error::NonUtf8Path(path.to_path_buf()))?;
    Ok(parts.join("/"))
}

pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// What to publish.
pub struct UploadJob {
    pub title: String,
    pub source: PathBuf,
    pub listing: Listing,
}

/// Progress notifications, in the order they happen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event<'a> {
    Scanned { dirs: usize, files: usize },
    LoggingIn,
    CreatingStaging(&'a str),
    CreatingFolder(&'a str),
    Uploading(&'a str),
    Publishing,
    CleaningUp(&'a str),
}

/// Outcome of a successful run. The project can be fetched by either
/// `id` or `title`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Published {
    pub id: String,
    pub title: String,
    pub staging: String,
}

impl Published {
    /// The two equivalent commands that download the project.
    pub fn retrieval_commands(&self) -> [String; 2] {
        [format!("lStore get {}", self.title), format!("lStore get {}", self.id)]
    }
}

/// Run the whole upload: scan, login, stage, mirror, publish, clean up.
pub fn run<T: Transport>(
    api: &mut ApiClient<T>,
    credentials: &Credentials,
    job: &UploadJob,
    names: &mut RandomNameSequence,
    on_event: &mut dyn FnMut(Event<'_>),
) -> Result<Published> {
    let plan = Plan::scan(&job.source)?;
    on_event(Event::Scanned {
        dirs: plan.dirs.len(),
        files: plan.files.len(),
    });

    on_event(Event::LoggingIn);
    api.login(&credentials.username, &credentials.password)?;

    let staging = names.staging_prefix();
    on_event(Event::CreatingStaging(&staging));
    let cloud = api.cloud();
    cloud.mkdir(&staging)?;

    for dir in &plan.dirs {
        let remote = format!("{}/{}", staging, dir.relative);
        on_event(Event::CreatingFolder(&remote));
        cloud.mkdir(&remote)?;
    }

    for file in &plan.files {
        let remote = format!("{}/{}", staging, file.relative);
        let content = fs::read_to_string(&file.local).map_err(|e| Error::filesystem(&file.local, e))?;
        on_event(Event::Uploading(&remote));
        debug!(path = %remote, bytes = content.len(), "uploading");
        cloud.upload(&remote, &content, None)?;
    }

    on_event(Event::Publishing);
    let response = api.store().put(&job.title, &staging, job.listing, None)?;
    let id = response.text().trim().to_string();
    info!(title = %job.title, id = %id, "published");

    on_event(Event::CleaningUp(&staging));
    cloud.delete(&staging)?;

    Ok(Published {
        id,
        title: job.title.clone(),
        staging,
    })
}
