pub mod completion_llm;
pub mod kv_store;

pub use completion_llm::OpenAiCompletionAdapter;
pub use kv_store::SqliteKvStore;
