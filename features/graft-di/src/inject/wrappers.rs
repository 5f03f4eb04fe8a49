use std::{fmt::Debug, ops::Deref, sync::Arc};

use crate::{
    errors::ArgumentError,
    inject::{Inject, Parameter, Resolved},
    types::{ContractKey, Family, Injectable, Instance},
};

/// A dependency on the closed contract `F::Applied<A>`.
///
/// Unlike `Arc<F::Applied<A>>`, the parameter knows its family,
/// so it is satisfied by an open registration of `F` when the closed form itself is not registered.
pub struct Closed<F: Family, A: ?Sized + 'static> {
    inner: Arc<F::Applied<A>>,
}
impl<F: Family, A: ?Sized + 'static> Closed<F, A> {
    pub fn inner(&self) -> Arc<F::Applied<A>> {
        self.inner.clone()
    }

    pub fn into_inner(self) -> Arc<F::Applied<A>> {
        self.inner
    }
}
impl<F: Family, A: ?Sized + 'static> Deref for Closed<F, A> {
    type Target = F::Applied<A>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
impl<F: Family, A: ?Sized + 'static> Inject for Closed<F, A> {
    fn parameter() -> Parameter {
        Parameter::single(ContractKey::closed::<F, A>())
    }

    fn extract(resolved: Resolved) -> Result<Self, ArgumentError> {
        Arc::<F::Applied<A>>::extract(resolved).map(|inner| Closed { inner })
    }
}

/// A dependency which is default constructed when nothing is registered for it
#[derive(Clone)]
pub struct OrDefault<T>(Arc<T>);
impl<T: Debug> Debug for OrDefault<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("OrDefault").field(&self.0).finish()
    }
}
impl<T> OrDefault<T> {
    pub fn into_inner(self) -> Arc<T> {
        self.0
    }
}
impl<T> Deref for OrDefault<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
impl<T: Injectable + Default> Inject for OrDefault<T> {
    fn parameter() -> Parameter {
        Parameter::single(ContractKey::of::<T>()).with_fallback(default_instance::<T>)
    }

    fn extract(resolved: Resolved) -> Result<Self, ArgumentError> {
        Arc::<T>::extract(resolved).map(OrDefault)
    }
}

fn default_instance<T: Injectable + Default>() -> Option<Instance> {
    Some(Instance::of(Arc::new(T::default())))
}
