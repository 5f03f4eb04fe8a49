use std::{any::type_name, fmt::Debug, sync::Arc};

use crate::{
    dependency_graph::DependencyGraph,
    errors::{ConstructionError, ResolveError},
    factories::{Erased, Implementation, OpenImplementation},
    inject::{Arguments, Parameter, Request, Resolved},
    options::ResolverOptions,
    registry::{ImplementationDescriptor, Registry, Target},
    singletons::SingletonCache,
    stack::ResolutionStack,
    types::{Contract, ContractKey, Family, Instance, Lifetime},
};

/// Builds object graphs from a [Registry].
///
/// Cheap to clone, all clones share the same registry and singletons.
#[derive(Clone)]
pub struct Resolver(Arc<ResolverInner>);
struct ResolverInner {
    registry: Registry,
    singletons: SingletonCache,
    options: ResolverOptions,
}
impl Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_struct("Resolver");
        for contract in self.0.registry.contracts() {
            let registrations = self.0.registry.lookup(contract).map_or(0, <[_]>::len);
            map.field(&contract.to_string(), &registrations);
        }
        map.field("singletons", &self.0.singletons.len());
        map.finish()
    }
}

impl Resolver {
    pub fn new(registry: Registry) -> Self {
        Self::with_options(registry, ResolverOptions::default())
    }

    /// Binds the registry, which can no longer change afterwards.
    ///
    /// Problems in the dependency graph are logged, they only surface as errors when resolving.
    pub fn with_options(registry: Registry, options: ResolverOptions) -> Self {
        match DependencyGraph::new(&registry).check() {
            Ok(()) => tracing::debug!(
                "Resolver bound to {} contracts, dependency graph is complete",
                registry.len()
            ),
            Err(report) => tracing::warn!("{report}"),
        }

        Self(Arc::new(ResolverInner {
            registry,
            singletons: SingletonCache::new(),
            options,
        }))
    }

    pub fn registry(&self) -> &Registry {
        &self.0.registry
    }

    pub fn options(&self) -> &ResolverOptions {
        &self.0.options
    }

    /// Resolves the first implementation registered for `C`
    pub fn resolve<C: ?Sized + Contract>(&self) -> Result<Arc<C>, ResolveError> {
        self.resolve_single(ContractKey::of::<C>())
    }

    /// Resolves the closed contract `F::Applied<A>`, specializing an open registration of `F` if needed
    pub fn resolve_closed<F: Family, A: ?Sized + 'static>(
        &self,
    ) -> Result<Arc<F::Applied<A>>, ResolveError> {
        self.resolve_single(ContractKey::closed::<F, A>())
    }

    /// Resolves every implementation registered for `C`, in registration order
    pub fn resolve_all<C: ?Sized + Contract>(&self) -> Result<Vec<Arc<C>>, ResolveError> {
        self.resolve_sequence(ContractKey::of::<C>())
    }

    pub fn resolve_all_closed<F: Family, A: ?Sized + 'static>(
        &self,
    ) -> Result<Vec<Arc<F::Applied<A>>>, ResolveError> {
        self.resolve_sequence(ContractKey::closed::<F, A>())
    }

    /// Resolves a request without knowing its type
    pub fn resolve_request(&self, request: &Request) -> Result<Resolved, ResolveError> {
        let mut stack = ResolutionStack::new();
        self.resolve_in(request, &mut stack)
    }

    fn resolve_single<C: ?Sized + Contract>(
        &self,
        contract: ContractKey,
    ) -> Result<Arc<C>, ResolveError> {
        match self.resolve_request(&Request::Single(contract))? {
            Resolved::Single(instance) => downcast(&instance),
            _ => Err(ResolveError::DowncastFailed {
                required_type: type_name::<C>(),
                actual_type: "no value",
            }),
        }
    }

    fn resolve_sequence<C: ?Sized + Contract>(
        &self,
        contract: ContractKey,
    ) -> Result<Vec<Arc<C>>, ResolveError> {
        match self.resolve_request(&Request::Sequence(contract))? {
            Resolved::Many(instances) => instances.iter().map(downcast::<C>).collect(),
            _ => Err(ResolveError::DowncastFailed {
                required_type: type_name::<Vec<Arc<C>>>(),
                actual_type: "no value",
            }),
        }
    }

    fn resolve_in(
        &self,
        request: &Request,
        stack: &mut ResolutionStack,
    ) -> Result<Resolved, ResolveError> {
        let contract = self.0.registry.closed_form(request.key());
        let descriptors = self
            .0
            .registry
            .lookup(&contract)
            .ok_or(ResolveError::UnregisteredDependency { contract })?;

        if stack.contains(&contract) {
            tracing::debug!("'{contract}' is already being resolved ({stack}), resolving it as absent");
            return Ok(Resolved::Absent);
        }

        tracing::debug!("Resolving {request:?}");

        stack.push(contract);
        let resolved = match request {
            Request::Single(_) => descriptors
                .first()
                .ok_or(ResolveError::UnregisteredDependency { contract })
                .and_then(|descriptor| self.activate(descriptor, &contract, stack))
                .map(Resolved::Single),
            Request::Sequence(_) => descriptors
                .iter()
                .map(|descriptor| self.activate(descriptor, &contract, stack))
                .collect::<Result<Vec<_>, _>>()
                .map(Resolved::Many),
        };
        stack.pop();

        resolved
    }

    /// Produces an instance of one registration, handed out as `contract`
    fn activate(
        &self,
        descriptor: &ImplementationDescriptor,
        contract: &ContractKey,
        stack: &mut ResolutionStack,
    ) -> Result<Instance, ResolveError> {
        let implementation = match &descriptor.target {
            Target::Instance(instance) => return Ok(instance.clone()),
            Target::Closed(implementation) => implementation,
            Target::Open(template) => close(template, contract)?,
        };

        let built = match descriptor.lifetime {
            Lifetime::Singleton => self
                .0
                .singletons
                .get_or_try_insert(implementation.info(), || self.construct(implementation, stack))?,
            Lifetime::PerRequest => self.construct(implementation, stack)?,
        };

        implementation
            .upcast(&built, contract)
            .ok_or(ResolveError::DowncastFailed {
                required_type: contract.info().type_name,
                actual_type: implementation.info().type_name,
            })
    }

    /// Tries every constructor until one succeeds
    fn construct(
        &self,
        implementation: &Implementation,
        stack: &mut ResolutionStack,
    ) -> Result<Erased, ResolveError> {
        let mut failures = Vec::new();

        let constructors = self
            .0
            .options
            .constructor_order
            .arrange(implementation.constructors());

        for constructor in constructors {
            let arguments = self.assemble(constructor.parameters(), stack)?;

            match constructor.build(arguments) {
                Ok(built) => return Ok(built),
                Err(error) => {
                    tracing::debug!(
                        "Constructor of '{}' with {} parameters failed - error: {error}",
                        implementation.info(),
                        constructor.parameters().len()
                    );
                    failures.push(Arc::new(error));
                }
            }
        }

        Err(ConstructionError::ConstructorsExhausted {
            implementation: implementation.info(),
            failures,
        }
        .into())
    }

    fn assemble(
        &self,
        parameters: &[Parameter],
        stack: &mut ResolutionStack,
    ) -> Result<Arguments, ResolveError> {
        parameters
            .iter()
            .map(|parameter| self.resolve_parameter(parameter, stack))
            .collect::<Result<Vec<_>, _>>()
            .map(Arguments::new)
    }

    fn resolve_parameter(
        &self,
        parameter: &Parameter,
        stack: &mut ResolutionStack,
    ) -> Result<Resolved, ResolveError> {
        if self.0.registry.contains(parameter.request.key()) {
            return self.resolve_in(&parameter.request, stack);
        }

        let fallback = parameter.fallback.and_then(|fallback| fallback());
        Ok(fallback.map_or(Resolved::Absent, Resolved::Single))
    }
}

fn close<'a>(
    template: &'a OpenImplementation,
    contract: &ContractKey,
) -> Result<&'a Implementation, ConstructionError> {
    contract
        .argument()
        .and_then(|argument| template.close(&argument))
        .ok_or(ConstructionError::NotClosable {
            template: template.info(),
            contract: *contract,
        })
}

fn downcast<C: ?Sized + Contract>(instance: &Instance) -> Result<Arc<C>, ResolveError> {
    instance
        .downcast()
        .map_err(|actual_type| ResolveError::DowncastFailed {
            required_type: type_name::<C>(),
            actual_type,
        })
}
