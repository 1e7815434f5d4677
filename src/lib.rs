// Library root
// -----------
// The binary (`main.rs`) wires these modules together; everything that
// talks to the network goes through `api::Transport` so the upload flow can
// be exercised without a server.
//
// Module responsibilities:
// - `api`: session handling and status validation for the LevelOS API.
// - `cloud` / `store`: the cloud drive calls and lStore publishing.
// - `names`: random staging-folder names.
// - `upload`: the scan / stage / mirror / publish / clean-up sequence.
// - `config` / `ui`: command-line flags and console output.
pub mod api;
pub mod cloud;
pub mod config;
pub mod error;
pub mod names;
pub mod store;
pub mod ui;
pub mod upload;

pub use error::{Error, Rejection, Result};
