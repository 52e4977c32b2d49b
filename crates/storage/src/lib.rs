#![forbid(unsafe_code)]

pub mod fs;
pub mod http;
pub mod repository;

pub use fs::FsTestRepository;
pub use http::HttpTestRepository;
pub use repository::{InMemoryRepository, LoadedTest, StorageError, TestListing, TestRepository};
