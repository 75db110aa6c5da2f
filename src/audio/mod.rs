// Module audio - Sample storage, paging and the CPAL-facing callbacks

pub mod capture;
pub mod device;
pub mod input;
pub mod output;
pub mod page;
pub mod render;
pub mod sample_buffer;
