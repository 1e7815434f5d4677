// Command-line configuration. Every flag falls back to the `INPUT_*`
// environment variables a CI workflow step would set.

use std::path::PathBuf;

use clap::Parser;

use crate::api::DEFAULT_URL;
use crate::error::{Error, Result};
use crate::store::Listing;
use crate::upload::{Credentials, UploadJob};

#[derive(Parser, Debug)]
#[command(author, version, about = "Upload a directory to LevelOS cloud and publish it on lStore")]
pub struct Config {
    /// Project title on lStore
    #[arg(long, env = "INPUT_TITLE")]
    pub title: String,

    /// LevelOS account name
    #[arg(long, env = "INPUT_USERNAME")]
    pub username: String,

    /// LevelOS password; prompted for when missing and running on a terminal
    #[arg(long, env = "INPUT_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Local directory to upload
    #[arg(long = "path", env = "INPUT_PATH")]
    pub source: PathBuf,

    /// Base URL of the LevelOS API
    #[arg(long, env = "INPUT_URL", default_value = DEFAULT_URL)]
    pub url: String,

    /// Listing visibility of the published project
    #[arg(long, env = "INPUT_LISTING", value_enum, default_value_t = Listing::Public)]
    pub listing: Listing,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Only print the final result
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Config {
    /// The password if one was given. An empty value counts as missing,
    /// since CI runners export unset inputs as empty strings.
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref().filter(|p| !p.is_empty())
    }

    /// Build credentials, asking `prompt` for the password when none was
    /// configured.
    pub fn credentials<F>(&self, prompt: F) -> Result<Credentials>
    where
        F: FnOnce() -> Option<String>,
    {
        if self.username.is_empty() {
            return Err(Error::Config("username is required".into()));
        }
        let password = match self.password() {
            Some(p) => p.to_string(),
            None => prompt().ok_or_else(|| Error::Config("password is required".into()))?,
        };
        Ok(Credentials {
            username: self.username.clone(),
            password,
        })
    }

    pub fn job(&self) -> Result<UploadJob> {
        if self.title.trim().is_empty() {
            return Err(Error::Config("title is required".into()));
        }
        Ok(UploadJob {
            title: self.title.clone(),
            source: self.source.clone(),
            listing: self.listing,
        })
    }
}
