//! Ccmd Host - in-memory collaborators for the template engine.
//!
//! [`MemoryPlatform`] and [`MemoryStore`] implement the engine's
//! [`Platform`](ccmd_eval::Platform) and [`Store`](ccmd_eval::Store) traits
//! without any network. They back the `ccmd` command line tool and are
//! handy in tests that need to observe what a template did.
//!
//! A [`Seed`] loads both from one JSON document:
//!
//! ```
//! use ccmd_host::Seed;
//!
//! let seed = Seed::from_json_str(r#"{
//!     "members": [{"id": "42", "username": "nova", "roles": ["vip"]}],
//!     "entries": [{"key": "motd", "value": "hi"}],
//!     "tables": {"scores": [{"user": "42", "points": 10}]}
//! }"#).unwrap();
//! let (platform, store) = seed.into_hosts().unwrap();
//! assert!(platform.member("42").is_some());
//! assert_eq!(store.table_len("scores"), 1);
//! ```

mod platform;
mod seed;
mod store;

pub use platform::{Event, MemoryPlatform};
pub use seed::{EntrySeed, Seed, SeedError};
pub use store::{Entry, MemoryStore};
