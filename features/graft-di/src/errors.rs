use std::sync::Arc;

use thiserror::Error;

use crate::types::{ContractKey, DynError, TypeInfo};

/// Errors when registering an implementation for a contract
#[derive(Error, Debug, Clone)]
pub enum RegistrationError {
    /// The implementation declares no constructors
    #[error("'{implementation}' has no constructors and cannot be built")]
    Abstract { implementation: TypeInfo },

    /// Concrete contracts can only be registered to themselves
    #[error("'{contract}' is a concrete type and can only be implemented by itself, not by '{implementation}'")]
    ConcreteContract {
        contract: ContractKey,
        implementation: TypeInfo,
    },

    /// The implementation does not provide the contract
    #[error("'{implementation}' does not satisfy '{contract}'")]
    NotAssignable {
        contract: ContractKey,
        implementation: TypeInfo,
    },

    /// Open template and open family disagree on their number of type parameters
    #[error("'{contract}' takes {expected} type arguments but '{implementation}' takes {actual}")]
    ArityMismatch {
        contract: ContractKey,
        implementation: TypeInfo,
        expected: usize,
        actual: usize,
    },

    /// A specialization of an open template does not provide the closed contract
    #[error("'{implementation}' closed over '{argument}' does not satisfy '{contract}'")]
    IncompatibleSpecialization {
        contract: ContractKey,
        implementation: TypeInfo,
        argument: TypeInfo,
    },
}

/// Errors when resolving a contract
#[derive(Error, Debug, Clone)]
pub enum ResolveError {
    /// Neither the contract nor its open family is registered
    #[error("Nothing is registered for '{contract}'")]
    UnregisteredDependency { contract: ContractKey },

    /// The selected implementation could not be built
    #[error(transparent)]
    Construction(#[from] ConstructionError),

    #[error("Failed to downcast, required: '{required_type}' actual: '{actual_type}'")]
    DowncastFailed {
        required_type: &'static str,
        actual_type: &'static str,
    },
}

/// Errors while building an implementation
#[derive(Error, Debug, Clone)]
pub enum ConstructionError {
    /// Every constructor candidate failed
    #[error("Every constructor of '{implementation}' failed - errors: {failures:?}")]
    ConstructorsExhausted {
        implementation: TypeInfo,
        failures: Vec<Arc<DynError>>,
    },

    /// An open template has no specialization for the requested argument
    #[error("'{template}' cannot be closed to build '{contract}'")]
    NotClosable {
        template: TypeInfo,
        contract: ContractKey,
    },
}

/// Errors when extracting a typed constructor argument
#[derive(Error, Debug, Clone)]
pub enum ArgumentError {
    /// Nothing was resolved, either due to a cycle or a missing registration
    #[error("No value was resolved for '{0}'")]
    Absent(&'static str),

    #[error("Expected a single '{0}' but resolved a sequence")]
    UnexpectedSequence(&'static str),

    #[error("Expected a sequence of '{0}' but resolved a single value")]
    UnexpectedSingle(&'static str),

    /// The constructor takes more arguments than were resolved for it
    #[error("Ran out of resolved arguments")]
    Exhausted,

    #[error("Failed to downcast, required: '{required_type}' actual: '{actual_type}'")]
    DowncastFailed {
        required_type: &'static str,
        actual_type: &'static str,
    },
}
