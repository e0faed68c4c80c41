pub mod http;
pub mod session_store;

pub use http::HttpLinkResolver;
pub use session_store::{FileSessionStore, MemorySessionStore};
