use std::{any::Any, fmt::Debug, marker::PhantomData, sync::Arc};

use crate::{
    errors::ArgumentError,
    inject::{Arguments, Inject, Parameter},
    types::{Contract, ContractKey, DynError, Family, FamilyInfo, Injectable, Instance, TypeInfo},
};

/// A built implementation before it is handed out as one of its contracts.
///
/// Always holds the concrete type itself, never an `Arc` of it.
pub type Erased = Arc<dyn Any + Send + Sync>;

type Build = dyn Fn(Arguments) -> Result<Erased, DynError> + Send + Sync;
type Upcast = dyn Fn(&Erased) -> Option<Instance> + Send + Sync;

/// A type which describes how to build itself
pub trait Constructable: Injectable + Sized {
    fn implementation() -> Implementation;
}

/// An open implementation, closed over its type argument when resolved.
///
/// Implemented by a marker for the generic type, e.g. `FooTemplate` for `Foo<T>`.
pub trait Template: 'static {
    /// The open contract family the template provides
    type Family: Family;

    /// Number of type parameters of the template
    const ARITY: usize = 1;

    fn template() -> OpenImplementation;
}

/// A function usable as a constructor: every parameter implements [Inject]
pub trait ConstructorFn<Args>: Send + Sync + 'static {
    type Output;

    /// The parameters, in the order they are passed
    fn parameters() -> Vec<Parameter>;

    fn invoke(&self, arguments: &mut Arguments) -> Result<Self::Output, ArgumentError>;
}

macro_rules! impl_constructor_fn {
    ($($arg:ident),*) => {
        impl<Func, Out, $($arg: Inject),*> ConstructorFn<($($arg,)*)> for Func
        where
            Func: Fn($($arg),*) -> Out + Send + Sync + 'static,
        {
            type Output = Out;

            fn parameters() -> Vec<Parameter> {
                vec![$($arg::parameter()),*]
            }

            #[allow(non_snake_case, unused_variables)]
            fn invoke(&self, arguments: &mut Arguments) -> Result<Out, ArgumentError> {
                $(let $arg = $arg::extract(arguments.take()?)?;)*
                Ok(self($($arg),*))
            }
        }
    };
}

impl_constructor_fn!();
impl_constructor_fn!(T1);
impl_constructor_fn!(T1, T2);
impl_constructor_fn!(T1, T2, T3);
impl_constructor_fn!(T1, T2, T3, T4);
impl_constructor_fn!(T1, T2, T3, T4, T5);
impl_constructor_fn!(T1, T2, T3, T4, T5, T6);

/// One way of building an implementation
#[derive(Clone)]
pub struct Constructor {
    parameters: Vec<Parameter>,
    build: Arc<Build>,
}
impl Constructor {
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Calls the constructor with arguments resolved for its parameters
    pub fn build(&self, arguments: Arguments) -> Result<Erased, DynError> {
        (self.build)(arguments)
    }
}
impl Debug for Constructor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Constructor")
            .field("parameters", &self.parameters)
            .finish()
    }
}

/// A contract an implementation can be handed out as
#[derive(Clone)]
struct Capability {
    contract: ContractKey,
    upcast: Arc<Upcast>,
}

/// A concrete, constructable type together with the contracts it satisfies
#[derive(Clone)]
pub struct Implementation {
    info: TypeInfo,
    constructors: Vec<Constructor>,
    capabilities: Vec<Capability>,
}
impl Implementation {
    pub fn builder<I: Injectable>() -> ImplementationBuilder<I> {
        ImplementationBuilder {
            implementation: Implementation {
                info: TypeInfo::of::<I>(),
                constructors: Vec::new(),
                capabilities: Vec::new(),
            },
            _implements: PhantomData,
        }
    }

    pub fn info(&self) -> TypeInfo {
        self.info
    }

    /// Constructors in declaration order
    pub fn constructors(&self) -> &[Constructor] {
        &self.constructors
    }

    /// An implementation without constructors can never be built
    pub fn is_abstract(&self) -> bool {
        self.constructors.is_empty()
    }

    pub fn satisfies(&self, contract: &ContractKey) -> bool {
        self.capabilities.iter().any(|c| &c.contract == contract)
    }

    pub fn contracts(&self) -> impl Iterator<Item = &ContractKey> + '_ {
        self.capabilities.iter().map(|c| &c.contract)
    }

    /// Hands out a built value as the given contract
    pub fn upcast(&self, value: &Erased, contract: &ContractKey) -> Option<Instance> {
        self.capabilities
            .iter()
            .find(|c| &c.contract == contract)
            .and_then(|c| (c.upcast)(value))
    }
}
impl Debug for Implementation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Implementation")
            .field("type", &self.info.type_name)
            .field("constructors", &self.constructors.len())
            .field(
                "contracts",
                &self.contracts().map(ToString::to_string).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Describes an [Implementation] of `I`.
///
/// ```rust
/// use std::sync::Arc;
/// use graft_di::Implementation;
///
/// trait Clock: Send + Sync {}
/// struct SystemClock;
/// impl Clock for SystemClock {}
///
/// let implementation = Implementation::builder::<SystemClock>()
///     .constructor(|| SystemClock)
///     .provides::<dyn Clock>(|this| this)
///     .build();
///
/// assert_eq!(implementation.constructors().len(), 1);
/// ```
pub struct ImplementationBuilder<I> {
    implementation: Implementation,
    _implements: PhantomData<fn() -> I>,
}
impl<I: Injectable> ImplementationBuilder<I> {
    /// Adds a constructor which always succeeds once its arguments are resolved
    pub fn constructor<Args: 'static, F>(mut self, constructor: F) -> Self
    where
        F: ConstructorFn<Args, Output = I>,
    {
        let build = move |mut arguments: Arguments| -> Result<Erased, DynError> {
            let built = constructor.invoke(&mut arguments)?;
            Ok(Arc::new(built))
        };

        self.implementation.constructors.push(Constructor {
            parameters: F::parameters(),
            build: Arc::new(build),
        });
        self
    }

    /// Adds a constructor which may fail, the next constructor is tried if it does
    pub fn try_constructor<Args: 'static, F, E>(mut self, constructor: F) -> Self
    where
        F: ConstructorFn<Args, Output = Result<I, E>>,
        E: Into<DynError> + 'static,
    {
        let build = move |mut arguments: Arguments| -> Result<Erased, DynError> {
            let built = constructor.invoke(&mut arguments)?.map_err(Into::<DynError>::into)?;
            Ok(Arc::new(built))
        };

        self.implementation.constructors.push(Constructor {
            parameters: F::parameters(),
            build: Arc::new(build),
        });
        self
    }

    /// Declares that `I` can be handed out as `C`
    pub fn provides<C: ?Sized + Contract>(self, upcast: fn(Arc<I>) -> Arc<C>) -> Self {
        self.capability(ContractKey::of::<C>(), upcast)
    }

    /// Declares that `I` can be handed out as the closed contract `F::Applied<A>`
    pub fn provides_closed<F: Family, A: ?Sized + 'static>(
        self,
        upcast: fn(Arc<I>) -> Arc<F::Applied<A>>,
    ) -> Self {
        self.capability(ContractKey::closed::<F, A>(), upcast)
    }

    fn capability<C: ?Sized + Contract>(
        mut self,
        contract: ContractKey,
        upcast: fn(Arc<I>) -> Arc<C>,
    ) -> Self {
        let upcast = move |value: &Erased| {
            let concrete = value.clone().downcast::<I>().ok()?;
            Some(Instance::new(TypeInfo::of::<I>(), upcast(concrete)))
        };

        self.implementation
            .capabilities
            .retain(|c| c.contract != contract);
        self.implementation.capabilities.push(Capability {
            contract,
            upcast: Arc::new(upcast),
        });
        self
    }

    /// Finishes the implementation, which always provides itself
    pub fn build(self) -> Implementation {
        let own = ContractKey::of::<I>();
        if self.implementation.satisfies(&own) {
            return self.implementation;
        }

        self.provides::<I>(|this| this).implementation
    }
}

/// An [Implementation] of the template closed over one type argument
#[derive(Debug, Clone)]
pub struct Specialization {
    pub argument: TypeInfo,
    /// The closed contract this specialization has to satisfy
    pub contract: ContractKey,
    pub implementation: Implementation,
}

/// A parametric implementation registered for an open contract family.
///
/// Rust cannot create new instantiations of a generic type at runtime,
/// so every argument the template can be closed over is declared upfront as a [Specialization].
#[derive(Debug, Clone)]
pub struct OpenImplementation {
    info: TypeInfo,
    family: FamilyInfo,
    arity: usize,
    specializations: Vec<Specialization>,
}
impl OpenImplementation {
    pub fn builder<T: Template>() -> OpenImplementationBuilder<T> {
        OpenImplementationBuilder {
            template: OpenImplementation {
                info: TypeInfo::of::<T>(),
                family: FamilyInfo::of::<T::Family>(),
                arity: T::ARITY,
                specializations: Vec::new(),
            },
            _template: PhantomData,
        }
    }

    pub fn info(&self) -> TypeInfo {
        self.info
    }

    pub fn family(&self) -> FamilyInfo {
        self.family
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    pub fn specializations(&self) -> &[Specialization] {
        &self.specializations
    }

    /// The implementation for the given type argument, if the template can be closed over it
    pub fn close(&self, argument: &TypeInfo) -> Option<&Implementation> {
        self.specializations
            .iter()
            .find(|s| s.argument.type_id == argument.type_id)
            .map(|s| &s.implementation)
    }
}

pub struct OpenImplementationBuilder<T> {
    template: OpenImplementation,
    _template: PhantomData<fn() -> T>,
}
impl<T: Template> OpenImplementationBuilder<T> {
    /// Declares the implementation used when the template is closed over `A`
    pub fn specialize<A: ?Sized + 'static>(mut self, implementation: Implementation) -> Self {
        let argument = TypeInfo::of::<A>();
        self.template
            .specializations
            .retain(|s| s.argument.type_id != argument.type_id);
        self.template.specializations.push(Specialization {
            argument,
            contract: ContractKey::closed::<T::Family, A>(),
            implementation,
        });
        self
    }

    pub fn build(self) -> OpenImplementation {
        self.template
    }
}
