pub mod cache;
pub mod folder;
pub mod normalize;
pub mod reconcile;

pub use cache::{CacheStats, PlaneCache, PlaneKey};
pub use folder::FolderStack;
pub use normalize::{NormalizedStack, PlaneRef, StackShape};
pub use reconcile::{reconcile_channels, ChannelMap};
