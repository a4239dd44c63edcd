//! Client side of the hosted data and auth service.
//!
//! `DataStore`, `AuthProvider` and `ChangeFeed` are the seams the
//! business modules program against. `RestStore`/`RestAuth` talk to the
//! hosted service; `MemoryStore`/`MemoryAuth` implement the same
//! contracts in process.

pub mod backend;
pub mod error;
pub mod feed;
pub mod gotrue;
pub mod memory;
pub mod query;
pub mod rest;
pub mod token;
pub mod traits;

pub use backend::Backend;
pub use error::ApiError;
pub use feed::PollingFeed;
pub use gotrue::RestAuth;
pub use memory::{MemoryAuth, MemoryStore};
pub use query::{Order, Query};
pub use rest::RestStore;
pub use token::{NoAuth, SessionToken, StaticToken, TokenSource};
pub use traits::{AuthProvider, ChangeEvent, ChangeFeed, ChangeKind, DataStore, Identity, Session, Subscription};
