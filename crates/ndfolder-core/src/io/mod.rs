pub mod descriptor;
pub mod image_io;
pub mod labels;
pub mod ser;
pub mod ser_acquisition;
pub mod ser_writer;

pub use descriptor::LoopDescriptor;
pub use ser_acquisition::SerAcquisition;
