pub mod auth;
pub mod catalog;
pub mod orders;
pub mod sanitize;
pub mod sessions;
pub mod storage;

pub use auth::{CredentialError, CredentialService};
pub use catalog::{CatalogService, Storefront};
pub use orders::{OrderRejection, OrderValidator, StatusChangeError};
pub use sessions::{Clock, MemorySessionStore, SessionError, SessionStore, SystemClock};
pub use storage::{DisabledStorage, MediaStorage, SignedUpload, StorageError, SupabaseStorage};
