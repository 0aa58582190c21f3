//! Record types served by the demo binary.

use chrono::{DateTime, Utc};

use kvorm_core::{record, Error, KvRecordStore, MemoryKv, PrimaryKey};
use kvorm_http::{Server, ServerConfig};

record! {
    #[derive(Debug, Clone, PartialEq)]
    pub struct Widget {
        pub id: PrimaryKey,
        pub name: String,
        pub count: i64,
        pub price: f64,
        pub active: bool,
    }
}

record! {
    #[derive(Debug, Clone, PartialEq)]
    pub struct Note {
        pub id: PrimaryKey,
        pub title: String,
        pub body: String,
        pub created: DateTime<Utc>,
        pub attachment: Vec<u8>,
    }
}

pub type DemoServer = Server<KvRecordStore<MemoryKv>>;

/// An in-memory server with `Widget` at `/widget` and `Note` at `/note`.
pub fn demo_server(config: ServerConfig) -> Result<DemoServer, Error> {
    let mut server = Server::with_kv(config, MemoryKv::new());
    server.register_type::<Widget>(None)?;
    server.register_type::<Note>(None)?;
    Ok(server)
}
