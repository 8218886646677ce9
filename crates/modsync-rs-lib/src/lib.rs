pub mod error;
pub use error::Result;
pub use error::Error;

pub mod config;
pub use config::ModSyncOptions;

pub mod path_helper;
pub mod archive;

pub mod component;
pub use component::Component;

pub mod conflict_resolver;
pub mod install_order;
pub mod validation;
pub mod manifest;
pub mod installer;
