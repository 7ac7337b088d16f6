pub mod apk;
pub mod errors;
pub mod models;

pub use apk::Apk;
pub use errors::APKError;
pub use models::{ApkJson, OpenOptions, Provider, Receiver, Service, XAPKManifest};
