//! kvorm key-value backend protocol
//!
//! This is the narrow waist between the record mapping layer and whatever
//! actually holds the data. Everything at this level is flat strings: keys,
//! hash field names and hash field values. No record shapes, no field kinds.
//!
//! The protocol is the four commands the mapping layer needs:
//! - `INCR key` - atomic counter, used to mint primary keys
//! - `HMSET key field value ...` - write a flat hash
//! - `HGETALL key` - read a flat hash (empty when missing)
//! - `DEL key` - remove a key, reporting how many keys went away
//!
//! # Example
//!
//! ```rust
//! use kvorm_kv_store::{KvStore, MemoryKv};
//!
//! let kv = MemoryKv::new();
//! assert_eq!(kv.incr("app:Widget").unwrap(), 1);
//!
//! kv.hmset("app:Widget:1", &[("name".to_string(), "gear".to_string())]).unwrap();
//! let fields = kv.hgetall("app:Widget:1").unwrap();
//! assert_eq!(fields.get("name").map(String::as_str), Some("gear"));
//!
//! assert_eq!(kv.del("app:Widget:1").unwrap(), 1);
//! assert_eq!(kv.del("app:Widget:1").unwrap(), 0);
//! ```

mod error;
mod memory;
mod traits;

pub use error::KvError;
pub use memory::MemoryKv;
pub use traits::{FieldPairs, KvStore};
