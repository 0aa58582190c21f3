//! The type registry: external path name -> descriptor.

use std::collections::HashMap;
use std::sync::Arc;

use crate::descriptor::TypeDescriptor;
use crate::record::Record;
use crate::Error;

/// All registered record types, keyed by external path name.
///
/// Populated during start-up through `&mut self`, then only read, so shared
/// references can be handed to concurrent requests without locking.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: HashMap<String, Arc<TypeDescriptor>>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the descriptor for `T` and install it under `name`, or under the
    /// lower-cased type name when `name` is `None`. An existing entry with the
    /// same name is replaced.
    ///
    /// # Errors
    ///
    /// The [`Error::Configuration`] raised by [`TypeDescriptor::build`], or a
    /// `Configuration` error when the path name is unusable or a different
    /// type with the same type name is already registered elsewhere.
    pub fn register<T: Record>(
        &mut self,
        name: Option<&str>,
    ) -> Result<Arc<TypeDescriptor>, Error> {
        let descriptor = TypeDescriptor::build::<T>()?;
        let path_name = match name {
            Some(name) => name.to_string(),
            None => descriptor.type_name().to_lowercase(),
        };

        if path_name.is_empty() || path_name.contains('/') {
            return Err(Error::configuration(format!(
                "Type '{}' cannot be registered with path name '{}'.",
                descriptor.type_name(),
                path_name
            )));
        }

        // Storage keys are built from the bare type name, so two distinct types
        // sharing one would read and overwrite each other's records.
        let clash = self.types.iter().find(|(other, existing)| {
            **other != path_name
                && existing.type_name() == descriptor.type_name()
                && existing.type_id() != descriptor.type_id()
        });
        if let Some((other, _)) = clash {
            return Err(Error::configuration(format!(
                "Type '{}' cannot be registered at '{}': a different type named '{}' \
                 is already registered at '{}'.",
                std::any::type_name::<T>(),
                path_name,
                descriptor.type_name(),
                other
            )));
        }

        let descriptor = Arc::new(descriptor.with_path_name(path_name.clone()));
        let previous = self.types.insert(path_name.clone(), Arc::clone(&descriptor));
        if let Some(previous) = previous {
            tracing::warn!(
                path = %path_name,
                previous = previous.type_name(),
                "replacing registered type"
            );
        }
        tracing::info!(
            type_name = descriptor.type_name(),
            path = %path_name,
            "registered type"
        );
        Ok(descriptor)
    }

    pub fn get(&self, path_name: &str) -> Option<&Arc<TypeDescriptor>> {
        self.types.get(path_name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Registered path names, sorted.
    pub fn path_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.types.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
