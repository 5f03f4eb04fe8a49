use std::vec;

use crate::{
    errors::ArgumentError,
    types::{ContractKey, Instance},
};

pub mod arc;
pub mod wrappers;

/// What a constructor parameter asks the resolver for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    /// One instance of the contract
    Single(ContractKey),
    /// Every registered implementation of the contract, in registration order
    Sequence(ContractKey),
}
impl Request {
    /// The contract being requested, or the element contract of a sequence
    pub fn key(&self) -> &ContractKey {
        match self {
            Request::Single(key) | Request::Sequence(key) => key,
        }
    }
}

/// Builds a value for a parameter whose contract is not registered
pub type Fallback = fn() -> Option<Instance>;

/// A single constructor parameter
#[derive(Debug, Clone, Copy)]
pub struct Parameter {
    pub request: Request,
    /// If the constructor accepts an absent value
    pub optional: bool,
    /// Used when nothing is registered for the requested contract
    pub fallback: Option<Fallback>,
}
impl Parameter {
    pub fn single(key: ContractKey) -> Self {
        Parameter {
            request: Request::Single(key),
            optional: false,
            fallback: None,
        }
    }

    pub fn sequence(key: ContractKey) -> Self {
        Parameter {
            request: Request::Sequence(key),
            optional: false,
            fallback: None,
        }
    }

    pub fn optional(self) -> Self {
        Parameter {
            optional: true,
            ..self
        }
    }

    pub fn with_fallback(self, fallback: Fallback) -> Self {
        Parameter {
            fallback: Some(fallback),
            ..self
        }
    }
}

/// Outcome of resolving one request.
///
/// `Absent` is produced when a dependency re-enters a contract which is still under construction,
/// or when an unregistered parameter has no fallback.
#[derive(Debug, Clone)]
pub enum Resolved {
    Single(Instance),
    Many(Vec<Instance>),
    Absent,
}

/// Resolved arguments for one constructor call, in parameter order
#[derive(Debug)]
pub struct Arguments {
    values: vec::IntoIter<Resolved>,
}
impl Arguments {
    pub(crate) fn new(values: Vec<Resolved>) -> Self {
        Arguments {
            values: values.into_iter(),
        }
    }

    /// Takes the next argument
    pub fn take(&mut self) -> Result<Resolved, ArgumentError> {
        self.values.next().ok_or(ArgumentError::Exhausted)
    }
}

/// A type which can be used as a constructor parameter.
///
/// The parameter declares what it needs from the resolver, and is then extracted from whatever was resolved for it.
pub trait Inject: Sized {
    fn parameter() -> Parameter;

    fn extract(resolved: Resolved) -> Result<Self, ArgumentError>;
}
