// LevelCloud: file operations on the remote drive, each a single POST.

use serde::Serialize;

use crate::api::{timestamp_or_now, ApiClient, ApiResponse, Transport};
use crate::error::Result;

const UPLOAD_ENDPOINT: &str = "cUpload.php";
const MKDIR_ENDPOINT: &str = "cMkDir.php";
const DELETE_ENDPOINT: &str = "cDelete.php";

#[derive(Serialize, Debug)]
pub struct UploadRequest<'a> {
    pub path: &'a str,
    pub content: &'a str,
    pub timestamp: i64,
}

/// Body of the calls that take nothing but a path.
#[derive(Serialize, Debug)]
pub struct PathRequest<'a> {
    pub path: &'a str,
}

/// Borrowed view of an authenticated [`ApiClient`] exposing drive calls.
pub struct LevelCloud<'a, T: Transport> {
    api: &'a ApiClient<T>,
}

impl<'a, T: Transport> LevelCloud<'a, T> {
    pub(crate) fn new(api: &'a ApiClient<T>) -> Self {
        LevelCloud { api }
    }

    /// Write `content` to the file at `path`. `timestamp` defaults to now.
    pub fn upload(&self, path: &str, content: &str, timestamp: Option<i64>) -> Result<ApiResponse> {
        let form = UploadRequest {
            path,
            content,
            timestamp: timestamp_or_now(timestamp),
        };
        self.api.post(UPLOAD_ENDPOINT, &form)
    }

    pub fn mkdir(&self, path: &str) -> Result<ApiResponse> {
        self.api.post(MKDIR_ENDPOINT, &PathRequest { path })
    }

    /// Remove `path` and everything under it.
    pub fn delete(&self, path: &str) -> Result<ApiResponse> {
        self.api.post(DELETE_ENDPOINT, &PathRequest { path })
    }
}
