use std::{
    any::{Any, TypeId},
    fmt::{self, Debug},
    hash::{Hash, Hasher},
    mem::size_of,
    sync::Arc,
};

/// Error returned by a failing constructor
pub type DynError = Box<dyn std::error::Error + Send + Sync>;

/// Concrete types the resolver builds.
///
/// Instances are shared between threads, so anything injectable needs to be Send + Sync + 'static
pub trait Injectable: Send + Sync + 'static {}
impl<T: Send + Sync + 'static> Injectable for T {}

/// Anything that can be requested from the resolver - concrete types as well as trait objects
pub trait Contract: Send + Sync + 'static {}
impl<T: ?Sized + Send + Sync + 'static> Contract for T {}

/// A family of contracts abstracted over one type parameter, e.g. `dyn Repository<T>`.
///
/// The family itself is a marker type. Its closed forms are named through [Family::Applied]:
///
/// ```rust
/// use graft_di::Family;
///
/// trait Repository<T: ?Sized>: Send + Sync {}
///
/// struct AnyRepository;
/// impl Family for AnyRepository {
///     type Applied<A: ?Sized + 'static> = dyn Repository<A>;
/// }
/// ```
pub trait Family: 'static {
    /// The closed contract for the argument `A`
    type Applied<A: ?Sized + 'static>: ?Sized + Contract;

    /// Number of type parameters of the family
    const ARITY: usize = 1;
}

/// Registration lifetime of an implementation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Lifetime {
    /// One shared instance per concrete implementation type
    Singleton,
    /// A fresh instance on every resolution
    #[default]
    PerRequest,
}

/// Type Name and Type Id
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct TypeInfo {
    pub type_name: &'static str,
    pub type_id: TypeId,
    /// Unsized types (trait objects) can never be built, only requested
    pub is_abstract: bool,
}
impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name)
    }
}
impl TypeInfo {
    pub fn of<T: 'static + ?Sized>() -> TypeInfo {
        TypeInfo {
            type_name: std::any::type_name::<T>(),
            type_id: TypeId::of::<T>(),
            // References to unsized types are fat pointers
            is_abstract: size_of::<&T>() != size_of::<&()>(),
        }
    }
}

/// Identity and arity of an open family
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct FamilyInfo {
    pub info: TypeInfo,
    pub arity: usize,
}
impl FamilyInfo {
    pub fn of<F: Family>() -> FamilyInfo {
        FamilyInfo {
            info: TypeInfo::of::<F>(),
            arity: F::ARITY,
        }
    }
}
impl fmt::Display for FamilyInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}<_>", self.info.type_name)
    }
}

/// Identifies what is being depended upon
#[derive(Debug, Clone, Copy)]
pub enum ContractKey {
    /// A plain type or trait object
    Type(TypeInfo),
    /// The closed form of a parametric family
    Closed {
        info: TypeInfo,
        family: FamilyInfo,
        argument: TypeInfo,
    },
    /// A parametric family with its argument unbound
    Open(FamilyInfo),
}

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
enum Identity {
    Contract(TypeId),
    Family(TypeId),
}

impl ContractKey {
    pub fn of<C: ?Sized + 'static>() -> Self {
        Self::Type(TypeInfo::of::<C>())
    }

    pub fn closed<F: Family, A: ?Sized + 'static>() -> Self {
        Self::Closed {
            info: TypeInfo::of::<F::Applied<A>>(),
            family: FamilyInfo::of::<F>(),
            argument: TypeInfo::of::<A>(),
        }
    }

    pub fn open<F: Family>() -> Self {
        Self::Open(FamilyInfo::of::<F>())
    }

    /// The requested type, or the family marker for open keys
    pub fn info(&self) -> TypeInfo {
        match self {
            Self::Type(info) | Self::Closed { info, .. } => *info,
            Self::Open(family) => family.info,
        }
    }

    /// The type argument of a closed key
    pub fn argument(&self) -> Option<TypeInfo> {
        match self {
            Self::Closed { argument, .. } => Some(*argument),
            _ => None,
        }
    }

    /// The open form of a closed key
    pub fn open_form(&self) -> Option<ContractKey> {
        match self {
            Self::Closed { family, .. } => Some(Self::Open(*family)),
            _ => None,
        }
    }

    fn identity(&self) -> Identity {
        match self {
            Self::Type(info) | Self::Closed { info, .. } => Identity::Contract(info.type_id),
            Self::Open(family) => Identity::Family(family.info.type_id),
        }
    }
}

// Keys compare by the identity of the requested type, however they were built
impl PartialEq for ContractKey {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}
impl Eq for ContractKey {}
impl Hash for ContractKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity().hash(state);
    }
}
impl fmt::Display for ContractKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Type(info) | Self::Closed { info, .. } => fmt::Display::fmt(info, f),
            Self::Open(family) => fmt::Display::fmt(family, f),
        }
    }
}

/// A resolved value with its type erased.
///
/// Holds an `Arc<C>` where `C` is the contract it was resolved as.
#[derive(Clone)]
pub struct Instance {
    /// The concrete type behind the value.
    /// Instances registered only by their contract report the contract instead.
    pub info: TypeInfo,
    contract: TypeInfo,
    value: Arc<dyn Any + Send + Sync>,
}

impl Instance {
    pub fn new<C: ?Sized + Contract>(info: TypeInfo, value: Arc<C>) -> Self {
        Instance {
            info,
            contract: TypeInfo::of::<C>(),
            value: Arc::new(value),
        }
    }

    /// Wraps a value which is its own contract
    pub fn of<T: Injectable>(value: Arc<T>) -> Self {
        Self::new(TypeInfo::of::<T>(), value)
    }

    /// The contract this instance can be downcast to
    pub fn contract(&self) -> TypeInfo {
        self.contract
    }

    pub fn downcast<C: ?Sized + Contract>(&self) -> Result<Arc<C>, &'static str> {
        self.value
            .downcast_ref::<Arc<C>>()
            .cloned()
            .ok_or(self.info.type_name)
    }
}
impl Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("type", &self.info.type_name)
            .field("as", &self.contract.type_name)
            .finish()
    }
}
