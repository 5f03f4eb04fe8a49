use graft_di::{RegistrationError, TypeInfo};

/// Errors when registering, retrieving or installing configs
#[derive(thiserror::Error, Debug, Clone)]
pub enum ConfigError {
    /// The Config type is already registered
    #[error("The Config type '{0}' is already registered")]
    AlreadyRegistered(TypeInfo),

    /// The required Config is not known
    #[error("The required Config type '{0}' is not known")]
    Missing(TypeInfo),

    /// The Config could not be installed into a registry
    #[error(transparent)]
    Registration(#[from] RegistrationError),
}
