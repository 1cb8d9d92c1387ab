pub mod annotate;
pub mod config;
pub mod export;
pub mod folder;
pub mod info;
