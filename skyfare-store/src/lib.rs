pub mod app_config;
pub mod memory;
pub mod sample;

pub use app_config::Config;
pub use memory::MemoryStore;
