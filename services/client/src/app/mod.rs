pub mod bootstrap;
pub mod catalog;
pub mod session;
pub mod slot;
pub mod store;

// Re-export the pieces a view layer wires together at startup.
pub use bootstrap::{apply_root, bootstrap};
pub use catalog::{check_draft, Catalog};
pub use session::{SessionError, SessionService};
pub use slot::{Phase, ResourceSlot, SlotState, Ticket};
pub use store::{Navigation, Store};
