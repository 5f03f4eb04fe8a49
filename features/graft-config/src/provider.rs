use std::{any::TypeId, collections::HashMap, sync::Arc};

use graft_di::{ContractKey, Injectable, Instance, Lifetime, Registry, Target, TypeInfo};

use crate::errors::ConfigError;

/// A provider to register all configs.
///
/// Configs can be registered and retrieved based on type,
/// and are installed into a [Registry] so constructors can depend on them.
#[derive(Debug, Default)]
pub struct ConfigProvider {
    configs: HashMap<TypeId, Instance>,
    /// Config types in the order they were added
    order: Vec<TypeId>,
}

impl ConfigProvider {
    /// Initializes an empty Config Provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Retrieve a config with specified type.
    ///
    /// If the config type is not available, it will return [`ConfigError::Missing`]
    pub fn get_config<T: Injectable>(&self) -> Result<Arc<T>, ConfigError> {
        let missing = || ConfigError::Missing(TypeInfo::of::<T>());

        self.configs
            .get(&TypeId::of::<T>())
            .ok_or_else(missing)?
            .downcast()
            .map_err(|_| missing())
    }

    /// Add a config to the registry.
    ///
    /// If the config type is already registered, it will return [`ConfigError::AlreadyRegistered`]
    pub fn add_config<T: Injectable>(&mut self, config: T) -> Result<&mut Self, ConfigError> {
        let type_id = TypeId::of::<T>();

        if self.configs.contains_key(&type_id) {
            return Err(ConfigError::AlreadyRegistered(TypeInfo::of::<T>()));
        }

        tracing::debug!("Adding config '{}'", TypeInfo::of::<T>());
        self.configs.insert(type_id, Instance::of(Arc::new(config)));
        self.order.push(type_id);
        Ok(self)
    }

    /// Can optionally add a config to the registry.
    ///
    /// If the config provided is `Some(T)`, it will be the same as calling [`ConfigProvider::add_config`]
    /// If the config provided is `None`, then the function just returns `Ok(self)` for chaining
    pub fn maybe_add_config<T: Injectable>(
        &mut self,
        config: Option<T>,
    ) -> Result<&mut Self, ConfigError> {
        match config {
            Some(c) => self.add_config(c),
            None => Ok(self),
        }
    }

    /// Registers every config as a shared instance of its own type
    pub fn install(&self, registry: &mut Registry) -> Result<(), ConfigError> {
        for config in self.order.iter().filter_map(|id| self.configs.get(id)) {
            registry.register_descriptor(
                ContractKey::Type(config.info),
                Target::Instance(config.clone()),
                Lifetime::Singleton,
            )?;
        }

        Ok(())
    }

    /// Number of registered configs
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct HttpConfig {
        port: u16,
    }

    #[test]
    fn configs_are_retrieved_by_type() {
        let mut provider = ConfigProvider::new();
        provider
            .add_config(HttpConfig { port: 8080 })
            .unwrap()
            .maybe_add_config::<String>(None)
            .unwrap();

        assert_eq!(provider.get_config::<HttpConfig>().unwrap().port, 8080);
        assert!(matches!(
            provider.get_config::<String>(),
            Err(ConfigError::Missing(_))
        ));
        assert_eq!(provider.len(), 1);
    }

    #[test]
    fn configs_can_only_be_added_once() {
        let mut provider = ConfigProvider::new();
        provider.add_config(HttpConfig { port: 80 }).unwrap();

        let again = provider.add_config(HttpConfig { port: 443 });
        assert!(matches!(again, Err(ConfigError::AlreadyRegistered(_))));
        assert_eq!(provider.get_config::<HttpConfig>().unwrap().port, 80);
    }

    #[test]
    fn installs_configs_as_instances() {
        let mut provider = ConfigProvider::new();
        provider.add_config(HttpConfig { port: 80 }).unwrap();

        let mut registry = Registry::new();
        provider.install(&mut registry).unwrap();

        assert!(registry.contains(&ContractKey::of::<HttpConfig>()));

        // Installing the same configs twice registers a second instance
        provider.install(&mut registry).unwrap();
        let registrations = registry.lookup(&ContractKey::of::<HttpConfig>()).unwrap();
        assert_eq!(registrations.len(), 2);
    }
}
