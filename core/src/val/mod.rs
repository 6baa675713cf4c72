//! Type-tagged erased values.

use std::{any::Any, fmt, sync::Arc};

use crate::typ::{AnyValue, Reflect, SharedError, Type};


enum Data {
    /// Exclusively owned; writable through an argument handle.
    Owned(Box<AnyValue>),
    /// Shared between holders: bound receivers and nil placeholders.
    Shared(Arc<AnyValue>),
}

/// A runtime value together with its [`Type`].
pub struct Value {
    ty: Type,
    data: Data,
}

impl Value {
    pub fn new<T: Reflect>(value: T) -> Self {
        Self::from_box(Type::of::<T>(), Box::new(value))
    }

    pub fn shared<T: Reflect>(value: Arc<T>) -> Self {
        Self {
            ty: Type::of::<T>(),
            data: Data::Shared(value),
        }
    }

    pub(crate) fn from_box(ty: Type, boxed: Box<AnyValue>) -> Self {
        Self {
            ty,
            data: Data::Owned(boxed),
        }
    }

    pub fn ty(&self) -> Type {
        self.ty
    }

    pub fn is_shared(&self) -> bool {
        matches!(self.data, Data::Shared(_))
    }

    /// True for nil interfaces, pointers and functions.
    pub fn is_nil(&self) -> bool {
        self.ty.is_nil(self.as_any())
    }

    pub fn as_any(&self) -> &AnyValue {
        match &self.data {
            Data::Owned(boxed) => &**boxed,
            Data::Shared(shared) => &**shared,
        }
    }

    /// Mutable access, only for owned values.
    pub fn as_any_mut(&mut self) -> Option<&mut AnyValue> {
        match &mut self.data {
            Data::Owned(boxed) => Some(&mut **boxed),
            Data::Shared(_) => None,
        }
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.as_any_mut()?.downcast_mut::<T>()
    }

    /// The shared allocation behind this value, if it is shared and holds a `T`.
    pub fn downcast_arc<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        match &self.data {
            Data::Shared(shared) => shared.clone().downcast::<T>().ok(),
            Data::Owned(_) => None,
        }
    }

    /// Moves an owned `T` out, or clones it out of a shared value. A value of another
    /// type is handed back unchanged.
    pub fn take<T: Reflect>(self) -> Result<T, Value> {
        let ty = self.ty;
        match self.data {
            Data::Owned(boxed) => boxed.downcast::<T>().map(|v| *v).map_err(|boxed| Value {
                ty,
                data: Data::Owned(boxed),
            }),
            Data::Shared(shared) => {
                if let Some(v) = shared.downcast_ref::<T>() {
                    return Ok(v.clone());
                }
                Err(Value {
                    ty,
                    data: Data::Shared(shared),
                })
            }
        }
    }

    pub fn into_shared(self) -> Value {
        let Value { ty, data } = self;
        let data = match data {
            Data::Owned(boxed) => Data::Shared(Arc::from(boxed)),
            shared => shared,
        };
        Value { ty, data }
    }

    pub fn as_error(&self) -> Option<SharedError> {
        self.ty.as_error(self.as_any())
    }

    /// Same allocation, for shared values.
    pub fn ptr_eq(&self, other: &Value) -> bool {
        match (&self.data, &other.data) {
            (Data::Shared(a), Data::Shared(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Clone for Value {
    fn clone(&self) -> Self {
        match &self.data {
            Data::Owned(boxed) => Self::from_box(self.ty, self.ty.clone_boxed(&**boxed)),
            Data::Shared(shared) => Self {
                ty: self.ty,
                data: Data::Shared(Arc::clone(shared)),
            },
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Value")
            .field("ty", &self.ty)
            .field("shared", &self.is_shared())
            .field("nil", &self.is_nil())
            .finish()
    }
}
