// lStore: publishes an uploaded folder as a named project.

use std::fmt;

use clap::ValueEnum;
use serde::Serialize;

use crate::api::{timestamp_or_now, ApiClient, ApiResponse, Transport};
use crate::error::Result;

const PROJECT_ENDPOINT: &str = "sProject.php";

/// Whether a project shows up in public listings or only by identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Listing {
    #[default]
    Public,
    Unlisted,
}

impl Listing {
    pub fn as_str(&self) -> &'static str {
        match self {
            Listing::Public => "public",
            Listing::Unlisted => "unlisted",
        }
    }
}

impl fmt::Display for Listing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Project record submitted to lStore.
#[derive(Serialize, Debug)]
pub struct ProjectRequest<'a> {
    pub title: &'a str,
    pub path: &'a str,
    pub timestamp: i64,
    pub listing: Listing,
}

pub struct LStore<'a, T: Transport> {
    api: &'a ApiClient<T>,
}

impl<'a, T: Transport> LStore<'a, T> {
    pub(crate) fn new(api: &'a ApiClient<T>) -> Self {
        LStore { api }
    }

    /// Register the folder at `path` as project `title`. The response body
    /// is the project's published identifier.
    pub fn put(&self, title: &str, path: &str, listing: Listing, timestamp: Option<i64>) -> Result<ApiResponse> {
        let form = ProjectRequest {
            title,
            path,
            timestamp: timestamp_or_now(timestamp),
            listing,
        };
        self.api.post(PROJECT_ENDPOINT, &form)
    }
}
