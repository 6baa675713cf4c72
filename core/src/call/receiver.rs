use std::{
    fmt, mem,
    sync::{Arc, PoisonError, RwLock, RwLockReadGuard},
};

use crate::{typ::Type, val::Value};

/// The value a set of methods currently operates on.
///
/// Shared by an [`Instance`](super::Instance) and all of its methods, so a rebind is seen
/// by every method on its next `args()`. The captured type never changes.
pub struct Receiver {
    ty: Type,
    value: RwLock<Value>,
}

impl Receiver {
    pub(crate) fn new(value: Value) -> Self {
        Self {
            ty: value.ty(),
            value: RwLock::new(value.into_shared()),
        }
    }

    pub fn ty(&self) -> Type {
        self.ty
    }

    /// The current value; shares the receiver's allocation.
    pub fn value(&self) -> Value {
        self.read().clone()
    }

    pub fn get<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.read().downcast_arc::<T>()
    }

    /// Panics if `value` is not of the captured type; the current binding is kept.
    pub(crate) fn rebind(&self, value: Value) {
        if value.ty() != self.ty {
            panic!(
                "Instance::rebind expects the same receiver type: bound to {}, got {}",
                self.ty,
                value.ty()
            );
        }
        let value = value.into_shared();
        let mut guard = self.value.write().unwrap_or_else(PoisonError::into_inner);
        let previous = mem::replace(&mut *guard, value);
        drop(guard);
        drop(previous);
    }

    fn read(&self) -> RwLockReadGuard<'_, Value> {
        self.value.read().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for Receiver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Receiver").field("ty", &self.ty).finish()
    }
}
