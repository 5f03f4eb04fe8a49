use std::{ops::Deref, sync::Arc};

use graft_di::{ArgumentError, ContractKey, Inject, Injectable, Parameter, Resolved};

/// A wrapper type to allow for config injections
///
/// This provides a simple way to depend on configs installed by a [ConfigProvider](crate::provider::ConfigProvider).
///
/// # Example
/// ```rust
/// use graft_config::{config::Config, provider::ConfigProvider};
/// use graft_di::{Implementation, Lifetime, Registry, Resolver, Constructable};
///
/// pub struct MyModuleConfig {
///     enabled: bool,
/// }
///
/// pub struct MyModule {
///     enabled: bool,
/// }
/// impl Constructable for MyModule {
///     fn implementation() -> Implementation {
///         Implementation::builder::<MyModule>()
///             .constructor(|config: Config<MyModuleConfig>| MyModule {
///                 enabled: config.enabled,
///             })
///             .build()
///     }
/// }
///
/// let mut provider = ConfigProvider::new();
/// provider.add_config(MyModuleConfig { enabled: true }).unwrap();
///
/// let mut registry = Registry::new();
/// provider.install(&mut registry).unwrap();
/// registry.register::<MyModule, MyModule>(Lifetime::Singleton).unwrap();
///
/// let module = Resolver::new(registry).resolve::<MyModule>().unwrap();
/// assert!(module.enabled);
/// ```
pub struct Config<T> {
    inner: Arc<T>,
}
impl<T> Deref for Config<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
impl<T> Config<T> {
    pub fn inner(&self) -> Arc<T> {
        self.inner.clone()
    }

    pub fn into_inner(self) -> Arc<T> {
        self.inner
    }
}

impl<T: Injectable> Inject for Config<T> {
    fn parameter() -> Parameter {
        Parameter::single(ContractKey::of::<T>())
    }

    fn extract(resolved: Resolved) -> Result<Self, ArgumentError> {
        Arc::<T>::extract(resolved).map(|inner| Config { inner })
    }
}
