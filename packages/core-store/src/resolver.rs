//! Request paths -> (descriptor, id, record).
//!
//! A path is `/{type}` or `/{type}/{id}`: the external name of a registered
//! type, optionally followed by a base-10 primary key. Nothing may follow the
//! id.

use std::sync::Arc;

use crate::descriptor::TypeDescriptor;
use crate::record_value::RecordValue;
use crate::registry::TypeRegistry;
use crate::storage::RecordStore;
use crate::Error;

/// A path resolved to a type and, possibly, a primary key.
#[derive(Clone, Debug)]
pub struct Resolved {
    pub descriptor: Arc<TypeDescriptor>,
    pub id: Option<u64>,
}

/// A path resolved to a type and, when it named an id, the loaded record.
#[derive(Debug)]
pub struct ResolvedObject {
    pub descriptor: Arc<TypeDescriptor>,
    pub record: Option<RecordValue>,
}

/// Resolves paths against a registry, loading records from a store.
pub struct Resolver<'a, S: ?Sized> {
    registry: &'a TypeRegistry,
    store: &'a S,
}

impl<'a, S: RecordStore + ?Sized> Resolver<'a, S> {
    pub fn new(registry: &'a TypeRegistry, store: &'a S) -> Self {
        Self { registry, store }
    }

    /// Parse `path` without touching the store.
    ///
    /// # Errors
    ///
    /// * `NotFound` - empty path or unregistered type name.
    /// * `BadRequest` - malformed id or trailing path segments.
    pub fn resolve_path(&self, path: &str) -> Result<Resolved, Error> {
        resolve_path(self.registry, path)
    }

    /// Like [`Resolver::resolve_path`], then load the record when the path
    /// names an id. The store's `NotFound` is passed through unchanged.
    pub fn resolve_path_object(&self, path: &str) -> Result<ResolvedObject, Error> {
        let Resolved { descriptor, id } = self.resolve_path(path)?;
        let record = match id {
            Some(id) => Some(self.store.load(id, &descriptor)?),
            None => None,
        };
        Ok(ResolvedObject { descriptor, record })
    }
}

/// Parse `path` against `registry`.
pub fn resolve_path(registry: &TypeRegistry, path: &str) -> Result<Resolved, Error> {
    let mut tokens: Vec<&str> = path.split('/').collect();

    // An absolute path splits into a leading empty token.
    if tokens.len() > 1 && tokens[0].is_empty() {
        tokens.remove(0);
    }

    let mut tokens = tokens.into_iter();
    let name = match tokens.next() {
        Some(name) if !name.is_empty() => name,
        _ => return Err(Error::not_found("Not found.")),
    };

    let descriptor = registry
        .get(name)
        .cloned()
        .ok_or_else(|| Error::not_found(format!("No type is registered at '{}'.", name)))?;

    let Some(id_token) = tokens.next() else {
        return Ok(Resolved {
            descriptor,
            id: None,
        });
    };

    let id = parse_id(id_token)?;

    if tokens.next().is_some() {
        return Err(Error::bad_request("Extra characters in path."));
    }

    Ok(Resolved {
        descriptor,
        id: Some(id),
    })
}

/// Base-10 digits only: no sign, no whitespace, must fit in a `u64`.
fn parse_id(token: &str) -> Result<u64, Error> {
    let malformed = || Error::bad_request(format!("Malformed id '{}'.", token));

    // `str::parse` takes a leading '+', ids are digits only. Prefixing a digit
    // turns any sign into an invalid-digit error.
    let parsed = if token.bytes().all(|b| b.is_ascii_digit()) {
        token.parse::<u64>()
    } else {
        format!("0{}", token).parse::<u64>()
    };
    parsed.map_err(|e| malformed().with_source(e))
}
