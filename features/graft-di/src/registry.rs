use std::{collections::HashMap, fmt, sync::Arc};

use crate::{
    errors::RegistrationError,
    factories::{Constructable, Implementation, OpenImplementation, Template},
    types::{Contract, ContractKey, Family, Injectable, Instance, Lifetime, TypeInfo},
};

/// What a contract is bound to
#[derive(Debug, Clone)]
pub enum Target {
    /// A concrete implementation
    Closed(Implementation),
    /// A template closed over the argument of the requested contract
    Open(OpenImplementation),
    /// An already built instance
    Instance(Instance),
}
impl Target {
    pub fn info(&self) -> TypeInfo {
        match self {
            Target::Closed(implementation) => implementation.info(),
            Target::Open(template) => template.info(),
            Target::Instance(instance) => instance.info,
        }
    }
}
impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Closed(implementation) => write!(f, "{}", implementation.info()),
            Target::Open(template) => write!(f, "{}<_>", template.info()),
            Target::Instance(instance) => write!(f, "instance of {}", instance.info),
        }
    }
}

/// One registration of a contract
#[derive(Debug, Clone)]
pub struct ImplementationDescriptor {
    pub lifetime: Lifetime,
    pub target: Target,
}

/// Maps contracts to the implementations registered for them.
///
/// Contracts may have any number of implementations, kept in registration order.
///
/// ```rust
/// use graft_di::{Constructable, Implementation, Lifetime, Registry};
///
/// trait Clock: Send + Sync {}
/// struct SystemClock;
/// impl Clock for SystemClock {}
/// impl Constructable for SystemClock {
///     fn implementation() -> Implementation {
///         Implementation::builder::<SystemClock>()
///             .constructor(|| SystemClock)
///             .provides::<dyn Clock>(|this| this)
///             .build()
///     }
/// }
///
/// let mut registry = Registry::new();
/// registry.register::<dyn Clock, SystemClock>(Lifetime::Singleton).unwrap();
///
/// assert_eq!(registry.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: HashMap<ContractKey, Vec<ImplementationDescriptor>>,
    /// Contracts in the order they were first registered
    order: Vec<ContractKey>,
    /// Closed contracts provided by registered templates, so they are found by their plain type as well
    closed_forms: HashMap<ContractKey, ContractKey>,
}
impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `target` to `contract`, after checking that it can actually provide it
    pub fn register_descriptor(
        &mut self,
        contract: ContractKey,
        target: Target,
        lifetime: Lifetime,
    ) -> Result<&mut Self, RegistrationError> {
        validate(&contract, &target)?;

        tracing::debug!("Registering '{target}' for '{contract}' as {lifetime:?}");

        if let Target::Open(template) = &target {
            for specialization in template.specializations() {
                self.closed_forms
                    .entry(specialization.contract)
                    .or_insert(specialization.contract);
            }
        }

        let descriptor = ImplementationDescriptor { lifetime, target };
        match self.entries.get_mut(&contract) {
            Some(descriptors) => descriptors.push(descriptor),
            None => {
                self.entries.insert(contract, vec![descriptor]);
                self.order.push(contract);
            }
        }

        Ok(self)
    }

    /// Registers `I` for the contract `C`
    pub fn register<C: ?Sized + Contract, I: Constructable>(
        &mut self,
        lifetime: Lifetime,
    ) -> Result<&mut Self, RegistrationError> {
        self.register_descriptor(
            ContractKey::of::<C>(),
            Target::Closed(I::implementation()),
            lifetime,
        )
    }

    /// Registers `I` for the closed contract `F::Applied<A>`
    pub fn register_closed<F: Family, A: ?Sized + 'static, I: Constructable>(
        &mut self,
        lifetime: Lifetime,
    ) -> Result<&mut Self, RegistrationError> {
        self.register_descriptor(
            ContractKey::closed::<F, A>(),
            Target::Closed(I::implementation()),
            lifetime,
        )
    }

    /// Registers the template `T` for every closed form of the family `F`
    pub fn register_open<F: Family, T: Template>(
        &mut self,
        lifetime: Lifetime,
    ) -> Result<&mut Self, RegistrationError> {
        self.register_descriptor(
            ContractKey::open::<F>(),
            Target::Open(T::template()),
            lifetime,
        )
    }

    /// Registers an already built instance, shared by every resolution of `C`.
    ///
    /// The concrete type is not known here, so the instance reports `C` as its type.
    /// Use [Registry::register_shared] to keep the concrete type.
    pub fn register_instance<C: ?Sized + Contract>(
        &mut self,
        instance: Arc<C>,
    ) -> Result<&mut Self, RegistrationError> {
        self.register_descriptor(
            ContractKey::of::<C>(),
            Target::Instance(Instance::new(TypeInfo::of::<C>(), instance)),
            Lifetime::Singleton,
        )
    }

    /// Registers an already built `T`, shared by every resolution of `C`
    pub fn register_shared<C: ?Sized + Contract, T: Injectable>(
        &mut self,
        instance: Arc<T>,
        upcast: fn(Arc<T>) -> Arc<C>,
    ) -> Result<&mut Self, RegistrationError> {
        self.register_descriptor(
            ContractKey::of::<C>(),
            Target::Instance(Instance::new(TypeInfo::of::<T>(), upcast(instance))),
            Lifetime::Singleton,
        )
    }

    /// The closed form of a plain key, when a registered template provides it
    pub fn closed_form(&self, contract: &ContractKey) -> ContractKey {
        match contract {
            ContractKey::Type(_) => self.closed_forms.get(contract).copied().unwrap_or(*contract),
            _ => *contract,
        }
    }

    /// Registrations for a contract, falling back to its open family
    pub fn lookup(&self, contract: &ContractKey) -> Option<&[ImplementationDescriptor]> {
        let contract = self.closed_form(contract);
        self.entries
            .get(&contract)
            .or_else(|| {
                contract
                    .open_form()
                    .and_then(|open| self.entries.get(&open))
            })
            .map(Vec::as_slice)
    }

    pub fn contains(&self, contract: &ContractKey) -> bool {
        self.lookup(contract).is_some()
    }

    /// Registered contracts, in the order they were first registered
    pub fn contracts(&self) -> impl Iterator<Item = &ContractKey> + '_ {
        self.order.iter()
    }

    /// Number of registered contracts
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

fn validate(contract: &ContractKey, target: &Target) -> Result<(), RegistrationError> {
    match (contract, target) {
        (ContractKey::Open(family), Target::Open(template)) => {
            if template.family() != *family {
                return Err(RegistrationError::NotAssignable {
                    contract: *contract,
                    implementation: template.info(),
                });
            }

            if template.arity() != family.arity {
                return Err(RegistrationError::ArityMismatch {
                    contract: *contract,
                    implementation: template.info(),
                    expected: family.arity,
                    actual: template.arity(),
                });
            }

            for specialization in template.specializations() {
                let implementation = &specialization.implementation;
                if implementation.is_abstract() {
                    return Err(RegistrationError::Abstract {
                        implementation: implementation.info(),
                    });
                }

                if specialization.contract.open_form().as_ref() != Some(contract)
                    || !implementation.satisfies(&specialization.contract)
                {
                    return Err(RegistrationError::IncompatibleSpecialization {
                        contract: specialization.contract,
                        implementation: implementation.info(),
                        argument: specialization.argument,
                    });
                }
            }

            Ok(())
        }
        (ContractKey::Open(_), target) | (_, target @ Target::Open(_)) => {
            Err(RegistrationError::NotAssignable {
                contract: *contract,
                implementation: target.info(),
            })
        }
        (_, Target::Closed(implementation)) => {
            if implementation.is_abstract() {
                return Err(RegistrationError::Abstract {
                    implementation: implementation.info(),
                });
            }

            let required = contract.info();
            if !required.is_abstract && required.type_id != implementation.info().type_id {
                return Err(RegistrationError::ConcreteContract {
                    contract: *contract,
                    implementation: implementation.info(),
                });
            }

            if !implementation.satisfies(contract) {
                return Err(RegistrationError::NotAssignable {
                    contract: *contract,
                    implementation: implementation.info(),
                });
            }

            Ok(())
        }
        (_, Target::Instance(instance)) => {
            if instance.contract().type_id != contract.info().type_id {
                return Err(RegistrationError::NotAssignable {
                    contract: *contract,
                    implementation: instance.info,
                });
            }

            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Engine: Send + Sync {}
    trait Wheel: Send + Sync {}

    struct Diesel;
    impl Engine for Diesel {}
    impl Constructable for Diesel {
        fn implementation() -> Implementation {
            Implementation::builder::<Diesel>()
                .constructor(|| Diesel)
                .provides::<dyn Engine>(|this| this)
                .build()
        }
    }

    struct Electric;
    impl Engine for Electric {}
    impl Constructable for Electric {
        fn implementation() -> Implementation {
            Implementation::builder::<Electric>()
                .constructor(|| Electric)
                .provides::<dyn Engine>(|this| this)
                .build()
        }
    }

    /// Declares no constructors
    struct Blueprint;
    impl Engine for Blueprint {}
    impl Constructable for Blueprint {
        fn implementation() -> Implementation {
            Implementation::builder::<Blueprint>()
                .provides::<dyn Engine>(|this| this)
                .build()
        }
    }

    #[test]
    fn registrations_append_in_order() {
        let mut registry = Registry::new();
        registry
            .register::<dyn Engine, Diesel>(Lifetime::Singleton)
            .unwrap()
            .register::<dyn Engine, Electric>(Lifetime::PerRequest)
            .unwrap()
            .register::<Diesel, Diesel>(Lifetime::PerRequest)
            .unwrap();

        let engines = registry.lookup(&ContractKey::of::<dyn Engine>()).unwrap();
        assert_eq!(engines.len(), 2);
        assert_eq!(engines[0].target.info(), TypeInfo::of::<Diesel>());
        assert_eq!(engines[0].lifetime, Lifetime::Singleton);
        assert_eq!(engines[1].target.info(), TypeInfo::of::<Electric>());

        let contracts: Vec<_> = registry.contracts().copied().collect();
        assert_eq!(
            contracts,
            vec![ContractKey::of::<dyn Engine>(), ContractKey::of::<Diesel>()]
        );
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn rejects_abstract_implementations() {
        let mut registry = Registry::new();
        let result = registry.register::<dyn Engine, Blueprint>(Lifetime::PerRequest);

        assert!(matches!(result, Err(RegistrationError::Abstract { .. })));
        assert!(registry.is_empty());
    }

    #[test]
    fn rejects_contracts_the_implementation_does_not_provide() {
        let mut registry = Registry::new();
        let result = registry.register::<dyn Wheel, Diesel>(Lifetime::PerRequest);

        assert!(matches!(result, Err(RegistrationError::NotAssignable { .. })));
    }

    #[test]
    fn concrete_contracts_only_accept_themselves() {
        let mut registry = Registry::new();
        let result = registry.register::<Electric, Diesel>(Lifetime::PerRequest);

        assert!(matches!(
            result,
            Err(RegistrationError::ConcreteContract { .. })
        ));
    }

    #[test]
    fn instances_must_match_their_contract() {
        let mut registry = Registry::new();
        registry
            .register_instance::<dyn Engine>(Arc::new(Diesel))
            .unwrap();

        let mismatched = registry.register_descriptor(
            ContractKey::of::<dyn Wheel>(),
            Target::Instance(Instance::of(Arc::new(Diesel))),
            Lifetime::Singleton,
        );
        assert!(matches!(
            mismatched,
            Err(RegistrationError::NotAssignable { .. })
        ));
    }

    #[test]
    fn shared_instances_keep_their_concrete_type() {
        let mut registry = Registry::new();
        registry
            .register_shared::<dyn Engine, Diesel>(Arc::new(Diesel), |this| this)
            .unwrap()
            .register_instance::<dyn Engine>(Arc::new(Electric))
            .unwrap();

        let engines = registry.lookup(&ContractKey::of::<dyn Engine>()).unwrap();
        assert_eq!(engines[0].target.info(), TypeInfo::of::<Diesel>());
        assert_eq!(engines[1].target.info(), TypeInfo::of::<dyn Engine>());
    }
}
