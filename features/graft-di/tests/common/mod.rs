#![allow(dead_code)]

use std::{
    any::type_name,
    marker::PhantomData,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use graft_di::{Constructable, Family, Implementation, OpenImplementation, Template};
use tracing_subscriber::EnvFilter;

/// Shows resolver logs when running tests with `RUST_LOG=debug`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

static NEXT_ID: AtomicUsize = AtomicUsize::new(0);

/// Every built fixture gets a distinct id, so identity can be compared through trait objects
pub fn next_id() -> usize {
    NEXT_ID.fetch_add(1, Ordering::SeqCst)
}

pub trait Identified: Send + Sync {
    fn id(&self) -> usize;
}

// Smth

pub trait Smth: Identified {}

pub struct SmthImpl {
    id: usize,
}
impl Identified for SmthImpl {
    fn id(&self) -> usize {
        self.id
    }
}
impl Smth for SmthImpl {}
impl Constructable for SmthImpl {
    fn implementation() -> Implementation {
        Implementation::builder::<SmthImpl>()
            .constructor(|| SmthImpl { id: next_id() })
            .provides::<dyn Smth>(|this| this)
            .provides::<dyn Identified>(|this| this)
            .build()
    }
}

// Service

pub trait Service: Identified {
    fn name(&self) -> &'static str;
}

pub struct FirstService {
    id: usize,
}
impl Identified for FirstService {
    fn id(&self) -> usize {
        self.id
    }
}
impl Service for FirstService {
    fn name(&self) -> &'static str {
        "first"
    }
}
impl Constructable for FirstService {
    fn implementation() -> Implementation {
        Implementation::builder::<FirstService>()
            .constructor(|| FirstService { id: next_id() })
            .provides::<dyn Service>(|this| this)
            .build()
    }
}

pub struct SecondService {
    id: usize,
}
impl Identified for SecondService {
    fn id(&self) -> usize {
        self.id
    }
}
impl Service for SecondService {
    fn name(&self) -> &'static str {
        "second"
    }
}
impl Constructable for SecondService {
    fn implementation() -> Implementation {
        Implementation::builder::<SecondService>()
            .constructor(|| SecondService { id: next_id() })
            .provides::<dyn Service>(|this| this)
            .build()
    }
}

/// Depends on every registered service
pub struct ServiceDirectory {
    pub services: Vec<Arc<dyn Service>>,
}
impl Constructable for ServiceDirectory {
    fn implementation() -> Implementation {
        Implementation::builder::<ServiceDirectory>()
            .constructor(|services: Vec<Arc<dyn Service>>| ServiceDirectory { services })
            .build()
    }
}

// Client and Data depend on each other

pub trait Client: Send + Sync {
    fn data(&self) -> Arc<dyn Data>;
}

pub trait Data: Send + Sync {
    fn client(&self) -> Option<Arc<dyn Client>>;
}

pub struct FirstClient {
    data: Arc<dyn Data>,
}
impl Client for FirstClient {
    fn data(&self) -> Arc<dyn Data> {
        self.data.clone()
    }
}
impl Constructable for FirstClient {
    fn implementation() -> Implementation {
        Implementation::builder::<FirstClient>()
            .constructor(|data: Arc<dyn Data>| FirstClient { data })
            .provides::<dyn Client>(|this| this)
            .build()
    }
}

pub struct DataImpl {
    client: Option<Arc<dyn Client>>,
}
impl Data for DataImpl {
    fn client(&self) -> Option<Arc<dyn Client>> {
        self.client.clone()
    }
}
impl Constructable for DataImpl {
    fn implementation() -> Implementation {
        Implementation::builder::<DataImpl>()
            .constructor(|client: Option<Arc<dyn Client>>| DataImpl { client })
            .provides::<dyn Data>(|this| this)
            .build()
    }
}

// Foo<T> is an open family, implemented by Second<T>

pub trait Foo<T: ?Sized>: Send + Sync {
    /// Name of the type argument the implementation was closed over
    fn argument(&self) -> &'static str;
}

pub struct AnyFoo;
impl Family for AnyFoo {
    type Applied<A: ?Sized + 'static> = dyn Foo<A>;
}

pub struct Second<T: ?Sized> {
    _argument: PhantomData<fn() -> Arc<T>>,
}
impl<T: ?Sized> Foo<T> for Second<T> {
    fn argument(&self) -> &'static str {
        type_name::<T>()
    }
}
impl<T: ?Sized + 'static> Constructable for Second<T> {
    fn implementation() -> Implementation {
        Implementation::builder::<Second<T>>()
            .constructor(|| Second {
                _argument: PhantomData,
            })
            .provides_closed::<AnyFoo, T>(|this| this)
            .build()
    }
}

pub struct SecondTemplate;
impl Template for SecondTemplate {
    type Family = AnyFoo;

    fn template() -> OpenImplementation {
        OpenImplementation::builder::<SecondTemplate>()
            .specialize::<dyn Service>(Second::<dyn Service>::implementation())
            .specialize::<u32>(Second::<u32>::implementation())
            .build()
    }
}

// Human has a name, which falls back to a default when it is not registered

#[derive(Debug, Clone, PartialEq)]
pub struct Name(pub String);
impl Default for Name {
    fn default() -> Self {
        Name("anonymous".to_string())
    }
}

pub struct Human {
    pub name: Arc<Name>,
}
impl Constructable for Human {
    fn implementation() -> Implementation {
        Implementation::builder::<Human>()
            .constructor(|name: graft_di::OrDefault<Name>| Human {
                name: name.into_inner(),
            })
            .build()
    }
}
