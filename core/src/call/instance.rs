use std::sync::Arc;

use crate::{
    typ::{Reflect, Type},
    val::Value,
};

use super::{Method, Methods, Receiver};

/// The methods of one type, all bound to the same [`Receiver`].
///
/// Templates held by the type cache are only reachable through `Arc<Instance>`; every
/// mutation (pruning, rebinding) needs an owned working copy from [`Instance::copy`].
#[derive(Debug)]
pub struct Instance {
    methods: Methods,
    receiver: Arc<Receiver>,
}

impl Instance {
    pub(crate) fn new(receiver: Arc<Receiver>, methods: Vec<Method>) -> Self {
        Self {
            methods: Methods::new(methods),
            receiver,
        }
    }

    pub fn methods(&self) -> &Methods {
        &self.methods
    }

    pub fn methods_mut(&mut self) -> &mut Methods {
        &mut self.methods
    }

    pub fn receiver(&self) -> &Arc<Receiver> {
        &self.receiver
    }

    pub fn ty(&self) -> Type {
        self.receiver.ty()
    }

    /// Working copy with its own receiver (holding the current value) and independently
    /// cloned signatures.
    pub fn copy(&self) -> Instance {
        let receiver = Arc::new(Receiver::new(self.receiver.value()));
        let methods = self
            .methods
            .iter()
            .map(|method| {
                let mut method = method.clone();
                method.attach(Arc::clone(&receiver));
                method
            })
            .collect();
        Instance::new(receiver, methods)
    }

    /// Binds every method to `value`. Panics if `T` is not the instance's type.
    pub fn rebind<T: Reflect>(&mut self, value: T) {
        self.rebind_value(Value::new(value));
    }

    pub fn rebind_shared<T: Reflect>(&mut self, value: Arc<T>) {
        self.rebind_value(Value::shared(value));
    }

    pub fn rebind_value(&mut self, value: Value) {
        self.receiver.rebind(value);
    }
}
