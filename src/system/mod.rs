pub mod config;
pub mod sync;
pub mod time;
pub mod timer;
