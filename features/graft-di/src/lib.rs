//! Graft DI builds object graphs from a registry of contracts and their implementations.
//!
//! Graft DI is split into two parts:
//! 1. Registry: binds contracts (trait objects or concrete types) to implementations and their lifetime
//! 2. Resolver: builds implementations on demand, resolving every constructor argument transitively
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use graft_di::{Constructable, Implementation, Lifetime, Registry, Resolver};
//!
//! trait Greeter: Send + Sync {
//!     fn greet(&self) -> String;
//! }
//!
//! struct Name(String);
//!
//! struct Polite {
//!     name: Arc<Name>,
//! }
//! impl Greeter for Polite {
//!     fn greet(&self) -> String {
//!         format!("Good day, {}", self.name.0)
//!     }
//! }
//! impl Constructable for Polite {
//!     fn implementation() -> Implementation {
//!         Implementation::builder::<Polite>()
//!             .constructor(|name: Arc<Name>| Polite { name })
//!             .provides::<dyn Greeter>(|this| this)
//!             .build()
//!     }
//! }
//!
//! let mut registry = Registry::new();
//! registry
//!     .register::<dyn Greeter, Polite>(Lifetime::PerRequest)
//!     .unwrap()
//!     .register_instance(Arc::new(Name("Ada".to_string())))
//!     .unwrap();
//!
//! let resolver = Resolver::new(registry);
//! let greeter = resolver.resolve::<dyn Greeter>().unwrap();
//!
//! assert_eq!(greeter.greet(), "Good day, Ada");
//! ```
//!
//! Graft DI consists of the following components:
//!
//! 1. Types - contract keys, type information and type erased instances
//! 2. Factories - implementations, their constructors and open templates
//! 3. Inject - the parameter types a constructor can declare
//! 4. Registry - registration and validation
//! 5. Container - the resolver itself, with its singleton cache and resolution stack
//! 6. Dependency Graph - diagnostics of unsatisfiable parameters and cycles

pub mod container;
pub mod dependency_graph;
pub mod errors;
pub mod factories;
pub mod inject;
pub mod options;
pub mod registry;
pub mod singletons;
pub mod stack;
pub mod types;

pub use container::Resolver;
pub use dependency_graph::{DependencyGraph, DependencyGraphIssue, DependencyGraphReport};
pub use errors::{ArgumentError, ConstructionError, RegistrationError, ResolveError};
pub use factories::{
    Constructable, Constructor, ConstructorFn, Implementation, ImplementationBuilder,
    OpenImplementation, OpenImplementationBuilder, Specialization, Template,
};
pub use inject::{
    wrappers::{Closed, OrDefault},
    Arguments, Inject, Parameter, Request, Resolved,
};
pub use options::{ConstructorOrder, ResolverOptions};
pub use registry::{ImplementationDescriptor, Registry, Target};
pub use types::{Contract, ContractKey, DynError, Family, Injectable, Instance, Lifetime, TypeInfo};
