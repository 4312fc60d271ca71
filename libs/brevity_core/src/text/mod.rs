pub mod length;
pub mod reply;
