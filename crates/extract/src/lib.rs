pub mod parser;
pub mod store;
pub mod tiered;

pub use store::LocalFileStore;
pub use tiered::TieredExtractor;
