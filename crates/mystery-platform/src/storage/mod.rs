pub mod memory;
pub mod rest;
pub mod auto;

pub use memory::MemoryRepository;
pub use rest::RestRepository;
pub use auto::auto_detect_repository;
