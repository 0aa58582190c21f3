//! # kvorm-http
//!
//! REST routing for kvorm record types.
//!
//! A [`Server`] maps requests onto registered record types:
//!
//! | Request              | Effect                                 |
//! |----------------------|----------------------------------------|
//! | `GET /{type}/{id}`   | load and return the record             |
//! | `POST /{type}`       | create a record from the JSON body     |
//! | `PUT /{type}/{id}`   | load, apply the JSON body, save        |
//! | `DELETE /{type}/{id}`| delete the record                      |
//!
//! Requests and responses are plain [`http`] types with [`bytes::Bytes`]
//! bodies, so the server can sit behind any HTTP front end.
//!
//! ```rust
//! use bytes::Bytes;
//! use http::{Request, StatusCode};
//! use kvorm_core::{record, MemoryKv, PrimaryKey};
//! use kvorm_http::{Server, ServerConfig};
//!
//! record! {
//!     pub struct Widget {
//!         pub id: PrimaryKey,
//!         pub name: String,
//!     }
//! }
//!
//! let mut server = Server::with_kv(ServerConfig::default(), MemoryKv::new());
//! server.register_type::<Widget>(None).unwrap();
//!
//! let request = Request::post("/widget")
//!     .body(Bytes::from_static(br#"{"name": "gear"}"#))
//!     .unwrap();
//! let response = server.handle(request);
//! assert_eq!(response.status(), StatusCode::OK);
//! assert_eq!(&response.body()[..], b"{\"id\":1,\"name\":\"gear\"}\n");
//! ```

pub mod config;
pub mod error;

mod server;

pub use config::ServerConfig;
pub use error::RouteError;
pub use server::Server;
