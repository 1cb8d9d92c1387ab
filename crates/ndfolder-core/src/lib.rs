pub mod acquisition;
pub mod align;
pub mod consts;
pub mod error;
pub mod experiment;
pub mod io;
pub mod layers;
pub mod pipeline;
pub mod stack;
