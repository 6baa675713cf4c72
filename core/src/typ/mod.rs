//! Runtime type metadata.
//!
//! A [`Type`] is an interned handle to everything the call layer needs to know about a
//! Rust type at runtime: identity, display name, [`Kind`], how to build its zero value and
//! which methods it exports. Metadata is built once per type from its [`Reflect`] impl and
//! leaked, so handles are `Copy` and compare by `TypeId`.

use std::{
    any::{Any, TypeId},
    fmt,
    hash::{Hash, Hasher},
};

use once_cell::sync::Lazy;

use crate::{
    call::{MethodDecl, MethodSet},
    util::fast_map::{FastDashMap, fast_dash_map_new},
    val::Value,
};

mod iface;
mod names;
mod reflect;

#[cfg(test)]
mod typ_test;

pub use iface::Iface;
pub use names::short_type_name;
pub use reflect::{ErrorValue, FuncValue, Reflect, SharedError, error_value};

/// Erased storage used for every runtime value.
pub type AnyValue = dyn Any + Send + Sync;

/// Coarse classification of a type. Only [`Kind::Interface`] changes how arguments are
/// synthesized: such parameters get one shared nil value instead of a fresh zero value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Bool,
    Int,
    Uint,
    Float,
    Char,
    String,
    Struct,
    Pointer,
    Slice,
    Map,
    Interface,
    Func,
}

impl Kind {
    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Bool => "bool",
            Kind::Int => "int",
            Kind::Uint => "uint",
            Kind::Float => "float",
            Kind::Char => "char",
            Kind::String => "string",
            Kind::Struct => "struct",
            Kind::Pointer => "pointer",
            Kind::Slice => "slice",
            Kind::Map => "map",
            Kind::Interface => "interface",
            Kind::Func => "func",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub(crate) struct TypeInfo {
    id: TypeId,
    name: String,
    kind: Kind,
    zero: fn(Type) -> Value,
    is_nil: fn(&AnyValue) -> bool,
    as_error: fn(&AnyValue) -> Option<SharedError>,
    clone_boxed: fn(&AnyValue) -> Box<AnyValue>,
    methods: fn() -> Vec<MethodDecl>,
}

impl TypeInfo {
    fn of<T: Reflect>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: T::type_name(),
            kind: T::kind(),
            zero: zero_of::<T>,
            is_nil: is_nil_of::<T>,
            as_error: as_error_of::<T>,
            clone_boxed: clone_boxed_of::<T>,
            methods: methods_of::<T>,
        }
    }
}

fn zero_of<T: Reflect>(ty: Type) -> Value {
    Value::from_box(ty, Box::new(T::default()))
}

fn is_nil_of<T: Reflect>(value: &AnyValue) -> bool {
    value.downcast_ref::<T>().is_some_and(T::is_nil)
}

fn as_error_of<T: Reflect>(value: &AnyValue) -> Option<SharedError> {
    value.downcast_ref::<T>().and_then(T::as_error)
}

fn clone_boxed_of<T: Reflect>(value: &AnyValue) -> Box<AnyValue> {
    match value.downcast_ref::<T>() {
        Some(v) => Box::new(v.clone()),
        // Type and payload always travel together inside `Value`.
        None => unreachable!("payload does not match its type metadata"),
    }
}

fn methods_of<T: Reflect>() -> Vec<MethodDecl> {
    let mut set = MethodSet::<T>::new();
    T::methods(&mut set);
    set.into_decls()
}

static TYPES: Lazy<FastDashMap<TypeId, &'static TypeInfo>> = Lazy::new(fast_dash_map_new);

/// Interned runtime type handle.
#[derive(Clone, Copy)]
pub struct Type(&'static TypeInfo);

impl Type {
    /// Metadata handle for `T`, built on first use.
    pub fn of<T: Reflect>() -> Type {
        let id = TypeId::of::<T>();
        if let Some(info) = TYPES.get(&id) {
            return Type(*info);
        }
        // Racing first uses may each leak one `TypeInfo`; only the stored one is handed out.
        let info: &'static TypeInfo = Box::leak(Box::new(TypeInfo::of::<T>()));
        Type(*TYPES.entry(id).or_insert(info))
    }

    pub fn id(self) -> TypeId {
        self.0.id
    }

    pub fn name(self) -> &'static str {
        &self.0.name
    }

    pub fn kind(self) -> Kind {
        self.0.kind
    }

    pub fn is_interface(self) -> bool {
        self.0.kind == Kind::Interface
    }

    /// Fresh owned zero value (`Default::default()`) of this type.
    pub fn zero(self) -> Value {
        (self.0.zero)(self)
    }

    pub(crate) fn is_nil(self, value: &AnyValue) -> bool {
        (self.0.is_nil)(value)
    }

    pub(crate) fn as_error(self, value: &AnyValue) -> Option<SharedError> {
        (self.0.as_error)(value)
    }

    pub(crate) fn clone_boxed(self, value: &AnyValue) -> Box<AnyValue> {
        (self.0.clone_boxed)(value)
    }

    /// Exported methods in declaration order.
    pub(crate) fn method_decls(self) -> Vec<MethodDecl> {
        (self.0.methods)()
    }
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for Type {}

impl Hash for Type {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.id.hash(state);
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Type({})", self.0.name)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.name)
    }
}
