use std::{any::type_name, fmt, sync::Arc};

use super::{Kind, Reflect, short_type_name};

/// Interface-typed parameter: a nullable shared trait object, usually `Iface<dyn Trait>`.
///
/// Parameters of this type are never auto-created. Every `args()` call hands them the same
/// nil placeholder without a handle; prune the type and supply a value to pass something
/// real.
///
/// ```ignore
/// pub trait Store: Send + Sync {
///     fn put(&self, key: &str);
/// }
/// pub type StoreRef = Iface<dyn Store>;
/// ```
pub struct Iface<T: ?Sized>(pub Option<Arc<T>>);

impl<T: ?Sized> Iface<T> {
    pub fn new(value: Arc<T>) -> Self {
        Iface(Some(value))
    }

    pub fn nil() -> Self {
        Iface(None)
    }

    pub fn is_nil(&self) -> bool {
        self.0.is_none()
    }

    pub fn get(&self) -> Option<&T> {
        self.0.as_deref()
    }

    pub fn as_arc(&self) -> Option<&Arc<T>> {
        self.0.as_ref()
    }

    pub fn into_inner(self) -> Option<Arc<T>> {
        self.0
    }
}

impl<T: ?Sized> Clone for Iface<T> {
    fn clone(&self) -> Self {
        Iface(self.0.clone())
    }
}

impl<T: ?Sized> Default for Iface<T> {
    fn default() -> Self {
        Iface(None)
    }
}

impl<T: ?Sized> From<Arc<T>> for Iface<T> {
    fn from(value: Arc<T>) -> Self {
        Iface(Some(value))
    }
}

impl<T: ?Sized> fmt::Debug for Iface<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(_) => write!(f, "Iface({})", iface_name::<T>()),
            None => write!(f, "Iface({}, nil)", iface_name::<T>()),
        }
    }
}

impl<T: ?Sized + Send + Sync + 'static> Reflect for Iface<T> {
    fn kind() -> Kind {
        Kind::Interface
    }

    fn type_name() -> String {
        iface_name::<T>()
    }

    fn is_nil(&self) -> bool {
        self.0.is_none()
    }
}

/// `dyn my_crate::Store` is displayed as `Store`.
fn iface_name<T: ?Sized>() -> String {
    let short = short_type_name(type_name::<T>());
    match short.strip_prefix("dyn ") {
        Some(name) => name.to_string(),
        None => short,
    }
}
