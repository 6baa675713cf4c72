use std::{
    ops::{Deref, DerefMut},
    sync::Arc,
};

use crate::{error::CallError, typ::Type};

use super::{Arg, Args, CallResult, Func, Receiver};

/// A [`Func`] bound to a name and a shared [`Receiver`].
///
/// Clones share the receiver, so they follow rebinds of the instance they came from.
#[derive(Debug, Clone)]
pub struct Method {
    name: Arc<str>,
    func: Func,
    receiver: Arc<Receiver>,
}

impl Method {
    pub(crate) fn new(name: Arc<str>, func: Func, receiver: Arc<Receiver>) -> Self {
        Self { name, func, receiver }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn func(&self) -> &Func {
        &self.func
    }

    pub fn receiver(&self) -> &Arc<Receiver> {
        &self.receiver
    }

    pub(crate) fn attach(&mut self, receiver: Arc<Receiver>) {
        self.receiver = receiver;
    }

    /// Same as [`Func::args`], with slot 0 holding the receiver's current value. The
    /// receiver slot never has a handle.
    pub fn args(&self) -> Args {
        let mut args = self.func.args();
        args.fill(0, self.receiver.value(), false);
        args
    }

    pub fn call(&self, args: Args) -> CallResult {
        self.func.call(args)
    }

    pub fn prune_in(&mut self, types: &[Type]) -> Vec<Arg> {
        self.func.prune_in(types)
    }

    /// `Name(Recv, A) R`.
    pub fn pretty(&self) -> String {
        self.func.render(&self.name)
    }
}

/// Methods of one type in declaration order.
#[derive(Debug, Clone, Default)]
pub struct Methods(Vec<Method>);

impl Methods {
    pub(crate) fn new(methods: Vec<Method>) -> Self {
        Self(methods)
    }

    pub fn named(&self, name: &str) -> Result<&Method, CallError> {
        self.0
            .iter()
            .find(|m| m.name() == name)
            .ok_or_else(|| CallError::not_found(name))
    }

    pub fn named_mut(&mut self, name: &str) -> Result<&mut Method, CallError> {
        self.0
            .iter_mut()
            .find(|m| m.name() == name)
            .ok_or_else(|| CallError::not_found(name))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(Method::name)
    }
}

impl Deref for Methods {
    type Target = [Method];

    fn deref(&self) -> &[Method] {
        &self.0
    }
}

impl DerefMut for Methods {
    fn deref_mut(&mut self) -> &mut [Method] {
        &mut self.0
    }
}

impl<'a> IntoIterator for &'a Methods {
    type Item = &'a Method;
    type IntoIter = std::slice::Iter<'a, Method>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
