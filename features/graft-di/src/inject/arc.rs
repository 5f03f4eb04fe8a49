use std::{any::type_name, sync::Arc};

use crate::{
    errors::ArgumentError,
    inject::{Inject, Parameter, Resolved},
    types::{Contract, ContractKey, Instance},
};

fn downcast<C: ?Sized + Contract>(instance: &Instance) -> Result<Arc<C>, ArgumentError> {
    instance
        .downcast::<C>()
        .map_err(|actual_type| ArgumentError::DowncastFailed {
            required_type: type_name::<C>(),
            actual_type,
        })
}

impl<C: ?Sized + Contract> Inject for Arc<C> {
    fn parameter() -> Parameter {
        Parameter::single(ContractKey::of::<C>())
    }

    fn extract(resolved: Resolved) -> Result<Self, ArgumentError> {
        match resolved {
            Resolved::Single(instance) => downcast(&instance),
            Resolved::Many(_) => Err(ArgumentError::UnexpectedSequence(type_name::<C>())),
            Resolved::Absent => Err(ArgumentError::Absent(type_name::<C>())),
        }
    }
}

impl<Injected: Inject> Inject for Option<Injected> {
    fn parameter() -> Parameter {
        Injected::parameter().optional()
    }

    fn extract(resolved: Resolved) -> Result<Self, ArgumentError> {
        match resolved {
            // Absent values do not fail an optional parameter
            Resolved::Absent => Ok(None),
            resolved => Injected::extract(resolved).map(Some),
        }
    }
}

impl<C: ?Sized + Contract> Inject for Vec<Arc<C>> {
    fn parameter() -> Parameter {
        Parameter::sequence(ContractKey::of::<C>())
    }

    fn extract(resolved: Resolved) -> Result<Self, ArgumentError> {
        match resolved {
            Resolved::Many(instances) => instances.iter().map(downcast::<C>).collect(),
            Resolved::Single(_) => Err(ArgumentError::UnexpectedSingle(type_name::<C>())),
            Resolved::Absent => Err(ArgumentError::Absent(type_name::<C>())),
        }
    }
}
