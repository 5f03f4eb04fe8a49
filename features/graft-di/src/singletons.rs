use std::any::TypeId;

use dashmap::DashMap;

use crate::{factories::Erased, types::TypeInfo};

/// Shared instances, one per concrete implementation type
#[derive(Default)]
pub struct SingletonCache {
    instances: DashMap<TypeId, Erased>,
}
impl SingletonCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, implementation: &TypeInfo) -> Option<Erased> {
        self.instances
            .get(&implementation.type_id)
            .map(|entry| entry.value().clone())
    }

    /// Returns the cached instance or builds and publishes one.
    ///
    /// `build` runs without holding any lock, as it resolves further singletons.
    /// When two callers race, the first published instance wins and is returned to both.
    pub fn get_or_try_insert<E>(
        &self,
        implementation: TypeInfo,
        build: impl FnOnce() -> Result<Erased, E>,
    ) -> Result<Erased, E> {
        if let Some(existing) = self.get(&implementation) {
            tracing::debug!("Reusing singleton '{implementation}'");
            return Ok(existing);
        }

        let built = build()?;
        let published = self
            .instances
            .entry(implementation.type_id)
            .or_insert(built)
            .value()
            .clone();

        tracing::debug!("Published singleton '{implementation}'");
        Ok(published)
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}
