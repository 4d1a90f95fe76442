pub mod archive;
pub mod download;
pub mod error;
pub mod http;
pub mod install;
pub mod locator;
pub mod platform;
pub mod runtime;
pub mod version;
