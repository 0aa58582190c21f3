use std::sync::Arc;

use bytes::Bytes;
use http::{header, Method, Request, Response, StatusCode};

use kvorm_core::{
    Error, KvRecordStore, KvStore, Record, RecordStore, RecordValue, Resolved, ResolvedObject,
    Resolver, TypeDescriptor, TypeRegistry,
};

use crate::config::ServerConfig;
use crate::error::RouteError;

/// Routes REST requests for registered record types to a record store.
///
/// Types are registered through `&mut self` before serving; `handle` only
/// needs `&self` and may be called from many threads at once.
pub struct Server<S> {
    config: ServerConfig,
    registry: TypeRegistry,
    store: S,
}

impl<K: KvStore> Server<KvRecordStore<K>> {
    /// A server storing records in `kv` under `config.namespace`.
    pub fn with_kv(config: ServerConfig, kv: K) -> Self {
        let store = KvRecordStore::new(kv, config.namespace.clone());
        Self::new(config, store)
    }
}

impl<S: RecordStore> Server<S> {
    pub fn new(config: ServerConfig, store: S) -> Self {
        Self {
            config,
            registry: TypeRegistry::new(),
            store,
        }
    }

    /// Expose `T` at `/{name}`; the name defaults to the lowercased type name.
    pub fn register_type<T: Record>(
        &mut self,
        name: Option<&str>,
    ) -> Result<Arc<TypeDescriptor>, Error> {
        self.registry.register::<T>(name)
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Serve one request. Failures become plain-text error responses.
    pub fn handle(&self, request: Request<Bytes>) -> Response<Bytes> {
        let method = request.method().clone();
        let path = request.uri().path().to_string();

        let response = match self.route(&method, &path, request.body()) {
            Ok(response) => response,
            Err(err) => {
                if err.status_code().is_server_error() {
                    tracing::error!(%method, %path, error = %err, "request failed");
                }
                error_response(&err)
            }
        };

        tracing::debug!(%method, %path, status = response.status().as_u16(), "request handled");
        response
    }

    /// Close the underlying store.
    pub fn close(&self) {
        self.store.close();
    }

    fn route(
        &self,
        method: &Method,
        path: &str,
        body: &Bytes,
    ) -> Result<Response<Bytes>, RouteError> {
        let path = self.strip_prefix(path)?;
        let resolver = Resolver::new(&self.registry, &self.store);

        match method {
            &Method::GET => match resolver.resolve_path_object(path)? {
                ResolvedObject {
                    record: Some(record),
                    ..
                } => json_response(&record),
                // Collection queries are not supported.
                ResolvedObject { descriptor, .. } => Err(RouteError::status(
                    StatusCode::NOT_IMPLEMENTED,
                    descriptor.type_name(),
                )),
            },

            &Method::POST => {
                let Resolved { descriptor, id } = resolver.resolve_path(path)?;
                if id.is_some() {
                    return Err(RouteError::bad_request("You can't POST to an id."));
                }
                let mut record = RecordValue::new(descriptor);
                kvorm_wire::decode(body, &mut record)?;
                self.store.save(&mut record)?;
                json_response(&record)
            }

            &Method::PUT => {
                let Some(mut record) = resolver.resolve_path_object(path)?.record else {
                    return Err(RouteError::bad_request("No object id was given."));
                };
                kvorm_wire::decode(body, &mut record)?;
                self.store.save(&mut record)?;
                json_response(&record)
            }

            &Method::DELETE => {
                let Resolved { descriptor, id } = resolver.resolve_path(path)?;
                let Some(id) = id else {
                    return Err(RouteError::bad_request("Missing id."));
                };
                self.store.delete(descriptor.type_name(), id)?;
                Ok(Response::new(Bytes::new()))
            }

            _ => Err(RouteError::status(
                StatusCode::METHOD_NOT_ALLOWED,
                "Method not allowed.",
            )),
        }
    }

    fn strip_prefix<'p>(&self, path: &'p str) -> Result<&'p str, RouteError> {
        let Some(prefix) = self.config.normalized_prefix() else {
            return Ok(path);
        };
        match path.strip_prefix(prefix) {
            Some(rest) if rest.is_empty() || rest.starts_with('/') => Ok(rest),
            _ => Err(RouteError::Core(Error::not_found("Not found."))),
        }
    }
}

fn json_response(record: &RecordValue) -> Result<Response<Bytes>, RouteError> {
    let body = kvorm_wire::to_json_bytes(record)?;
    let mut response = Response::new(Bytes::from(body));
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static("application/json"),
    );
    Ok(response)
}

fn error_response(err: &RouteError) -> Response<Bytes> {
    let mut response = Response::new(Bytes::from(format!("{}\n", err)));
    *response.status_mut() = err.status_code();
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    response
}
