//! Process-wide memoization of per-type method descriptors.

use std::{any::TypeId, fmt, sync::Arc};

use once_cell::sync::Lazy;
use tracing::{debug, trace};

use crate::{
    call::{ArgAllocator, Func, Instance, IntoFunc, Method, Receiver, default_allocator},
    typ::{FuncValue, Reflect, Type},
    util::fast_map::{FastDashMap, fast_dash_map_new},
    val::Value,
};


/// Global cache used by the free functions of this module.
pub static TYPE_CACHE: Lazy<TypeCache> = Lazy::new(TypeCache::new);

/// Maps a type to its template [`Instance`].
///
/// Templates are built on first sight of a type and then shared read-only. Two threads
/// missing on the same type at once both build a template; the later insert wins, which
/// is harmless since both are equivalent.
pub struct TypeCache {
    templates: FastDashMap<TypeId, Arc<Instance>>,
    alloc: Arc<dyn ArgAllocator>,
}

impl TypeCache {
    pub fn new() -> Self {
        Self::with_allocator(default_allocator())
    }

    /// A cache whose signatures draw argument containers from `alloc`.
    pub fn with_allocator(alloc: Arc<dyn ArgAllocator>) -> Self {
        Self {
            templates: fast_dash_map_new(),
            alloc,
        }
    }

    pub fn allocator(&self) -> &Arc<dyn ArgAllocator> {
        &self.alloc
    }

    /// Template for `ty`, bound to the type's zero value.
    pub fn stat_type(&self, ty: Type) -> Arc<Instance> {
        if let Some(template) = self.templates.get(&ty.id()) {
            trace!(target: "callset::cache", type_name = %ty, "type_cache.hit");
            return Arc::clone(&template);
        }
        let template = Arc::new(self.build(ty));
        debug!(
            target: "callset::cache",
            type_name = %ty,
            methods = template.methods().len(),
            "type_cache.build"
        );
        self.templates.insert(ty.id(), Arc::clone(&template));
        template
    }

    /// Working copy of the template for `T`, bound to `value`.
    pub fn stat<T: Reflect>(&self, value: T) -> Instance {
        self.bind(Value::new(value))
    }

    /// Like [`TypeCache::stat`] for an erased value; `None` for an absent or nil value.
    pub fn stat_value(&self, value: Option<Value>) -> Option<Instance> {
        let value = value?;
        if value.is_nil() {
            return None;
        }
        Some(self.bind(value))
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn contains(&self, ty: Type) -> bool {
        self.templates.contains_key(&ty.id())
    }

    pub fn clear(&self) {
        self.templates.clear();
    }

    fn bind(&self, value: Value) -> Instance {
        let mut instance = self.stat_type(value.ty()).copy();
        instance.rebind_value(value);
        instance
    }

    fn build(&self, ty: Type) -> Instance {
        let receiver = Arc::new(Receiver::new(ty.zero()));
        let methods = ty
            .method_decls()
            .into_iter()
            .map(|decl| {
                let func = Func::from_callable(decl.callable, true, Arc::clone(&self.alloc));
                Method::new(decl.name, func, Arc::clone(&receiver))
            })
            .collect();
        Instance::new(receiver, methods)
    }
}

impl Default for TypeCache {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TypeCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeCache")
            .field("types", &self.templates.len())
            .field("alloc", &self.alloc)
            .finish()
    }
}

pub fn stat<T: Reflect>(value: T) -> Instance {
    TYPE_CACHE.stat(value)
}

pub fn stat_value(value: Option<Value>) -> Option<Instance> {
    TYPE_CACHE.stat_value(value)
}

pub fn stat_type(ty: Type) -> Arc<Instance> {
    TYPE_CACHE.stat_type(ty)
}

/// Signature of a free function or closure, using the process-wide argument pool.
///
/// Callables with more than eight parameters are not supported; see [`IntoFunc`].
pub fn stat_func<M, F: IntoFunc<M>>(f: F) -> Func {
    stat_func_with(f, default_allocator())
}

pub fn stat_func_with<M, F: IntoFunc<M>>(f: F, alloc: Arc<dyn ArgAllocator>) -> Func {
    Func::from_callable(f.into_callable(), false, alloc)
}

/// Signature of a function carried as a value. Panics unless `value` is a non-nil
/// [`FuncValue`].
pub fn stat_func_value(value: &Value) -> Func {
    match value.downcast_ref::<FuncValue>().and_then(FuncValue::callable) {
        Some(callable) => Func::from_callable(callable.clone(), false, default_allocator()),
        None => panic!("function argument expected, got {}", value.ty()),
    }
}
