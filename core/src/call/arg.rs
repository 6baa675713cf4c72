use std::any::Any;

use crate::{
    error::CallError,
    typ::{AnyValue, Reflect, Type},
    val::Value,
};

/// One parameter position of a signature: index, type and, for shared placeholders, the
/// value reused on every `args()` call.
#[derive(Debug, Clone)]
pub struct Arg {
    pub n: usize,
    pub ty: Type,
    pub value: Option<Value>,
}

/// Marks an addressable argument slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Handle {
    ty: Type,
}

impl Handle {
    pub fn ty(&self) -> Type {
        self.ty
    }
}

/// Write access to one addressable slot, for populating or decoding into it.
pub struct HandleMut<'a> {
    ty: Type,
    target: &'a mut AnyValue,
}

impl<'a> HandleMut<'a> {
    pub fn ty(&self) -> Type {
        self.ty
    }

    pub fn as_any_mut(&mut self) -> &mut AnyValue {
        self.target
    }

    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.target.downcast_mut::<T>()
    }

    pub fn into_mut<T: Any>(self) -> Option<&'a mut T> {
        let HandleMut { target, .. } = self;
        target.downcast_mut::<T>()
    }

    pub fn set<T: Reflect>(&mut self, value: T) -> Result<(), CallError> {
        match self.target.downcast_mut::<T>() {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(CallError::HandleType {
                expected: self.ty,
                found: Type::of::<T>(),
            }),
        }
    }
}

/// Argument container: parallel value and handle sequences.
///
/// Obtained from `Func::args()` / `Method::args()` and consumed by exactly one `call`,
/// which clears it and returns it to its allocator.
#[derive(Debug, Default)]
pub struct Args {
    values: Vec<Option<Value>>,
    handles: Vec<Option<Handle>>,
}

impl Args {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: Vec::with_capacity(capacity),
            handles: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.values.capacity().min(self.handles.capacity())
    }

    pub fn values(&self) -> &[Option<Value>] {
        &self.values
    }

    pub fn handles(&self) -> &[Option<Handle>] {
        &self.handles
    }

    pub fn value(&self, k: usize) -> Option<&Value> {
        self.values.get(k)?.as_ref()
    }

    pub fn handle(&self, k: usize) -> Option<Handle> {
        *self.handles.get(k)?
    }

    /// Supplies the value for slot `k`, typically a pruned one. The slot is not
    /// addressable afterwards.
    pub fn set<T: Reflect>(&mut self, k: usize, value: T) {
        self.set_value(k, Value::new(value));
    }

    pub fn set_value(&mut self, k: usize, value: Value) {
        self.values[k] = Some(value);
        self.handles[k] = None;
    }

    pub fn handle_mut(&mut self, k: usize) -> Option<HandleMut<'_>> {
        let handle = self.handle(k)?;
        let target = self.values.get_mut(k)?.as_mut()?.as_any_mut()?;
        Some(HandleMut { ty: handle.ty, target })
    }

    /// Typed shortcut for `handle_mut(k)` followed by a downcast.
    pub fn get_mut<T: Any>(&mut self, k: usize) -> Option<&mut T> {
        self.handle_mut(k)?.into_mut::<T>()
    }

    pub(crate) fn grow(&mut self, min_size: usize) {
        self.values.reserve(min_size.saturating_sub(self.values.len()));
        self.handles.reserve(min_size.saturating_sub(self.handles.len()));
    }

    /// Sizes the container to `len` empty slots.
    pub(crate) fn reset(&mut self, len: usize) {
        self.clear();
        self.values.resize_with(len, || None);
        self.handles.resize(len, None);
    }

    /// Drops every value and handle; capacity is kept.
    pub(crate) fn clear(&mut self) {
        self.values.clear();
        self.handles.clear();
    }

    pub(crate) fn fill(&mut self, k: usize, value: Value, addressable: bool) {
        let handle = addressable.then(|| Handle { ty: value.ty() });
        self.values[k] = Some(value);
        self.handles[k] = handle;
    }

    pub(crate) fn slots_mut(&mut self) -> &mut [Option<Value>] {
        &mut self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_writes_land_in_the_value_slot() {
        let mut args = Args::with_capacity(2);
        args.reset(2);
        args.fill(0, Type::of::<String>().zero(), true);
        args.fill(1, Type::of::<i64>().zero(), true);

        *args.get_mut::<String>(0).unwrap() = "Hi!".to_string();
        args.handle_mut(1).unwrap().set(42_i64).unwrap();

        assert_eq!(args.value(0).unwrap().downcast_ref::<String>().unwrap(), "Hi!");
        assert_eq!(args.value(1).unwrap().downcast_ref::<i64>(), Some(&42));
    }

    #[test]
    fn mistyped_handle_write_is_reported() {
        let mut args = Args::default();
        args.reset(1);
        args.fill(0, Type::of::<i64>().zero(), true);

        let err = args.handle_mut(0).unwrap().set("nope".to_string()).unwrap_err();
        assert_eq!(
            err,
            CallError::HandleType {
                expected: Type::of::<i64>(),
                found: Type::of::<String>(),
            }
        );
    }

    #[test]
    fn supplied_values_are_not_addressable() {
        let mut args = Args::default();
        args.reset(1);
        args.set(0, "key".to_string());

        assert!(args.handle(0).is_none());
        assert!(args.handle_mut(0).is_none());
        assert_eq!(args.value(0).unwrap().downcast_ref::<String>().unwrap(), "key");
    }

    #[test]
    fn reset_keeps_capacity() {
        let mut args = Args::with_capacity(8);
        args.reset(3);
        assert_eq!(args.len(), 3);
        args.clear();
        assert!(args.is_empty());
        assert!(args.capacity() >= 8);
    }
}
