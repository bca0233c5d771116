pub mod collection;
pub mod document;
pub mod json_file;
pub mod memory;
pub mod sampling;
pub mod store;

pub use collection::Collection;
pub use document::{lookup, Document, DocumentId, Filter, Query, SortDirection, ID_FIELD};
pub use json_file::JsonFileStore;
pub use memory::MemoryStore;
pub use sampling::{RandomSource, SeededRandom, ThreadRandom};
pub use store::{DocumentStore, StoreError, StoreResult};
