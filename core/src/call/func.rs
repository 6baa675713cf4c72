use std::{fmt, sync::Arc};

use tracing::trace;

use crate::{
    typ::{Kind, Type},
    val::Value,
};

use super::{Arg, ArgAllocator, Args, CallResult, Callable, bind::Invoke};

/// Signature of one callable plus the plan for synthesizing its arguments.
///
/// Parameters are split into auto-created positions (a fresh zero value and a handle on
/// every `args()`) and shared placeholders (interface parameters, which always receive
/// the same nil value and no handle). For a method, position 0 is the receiver and belongs
/// to neither set.
#[derive(Clone)]
pub struct Func {
    invoke: Invoke,
    in_types: Arc<[Type]>,
    out_types: Arc<[Type]>,
    in_create: Vec<Arg>,
    in_cache: Vec<Arg>,
    alloc: Arc<dyn ArgAllocator>,
}

impl Func {
    pub(crate) fn from_callable(callable: Callable, bound: bool, alloc: Arc<dyn ArgAllocator>) -> Self {
        let mut in_create = Vec::new();
        let mut in_cache = Vec::new();
        for (n, &ty) in callable.ins.iter().enumerate().skip(usize::from(bound)) {
            if ty.kind() == Kind::Interface {
                in_cache.push(Arg {
                    n,
                    ty,
                    value: Some(ty.zero().into_shared()),
                });
            } else {
                in_create.push(Arg { n, ty, value: None });
            }
        }
        Self {
            invoke: callable.invoke,
            in_types: callable.ins,
            out_types: callable.outs,
            in_create,
            in_cache,
            alloc,
        }
    }

    pub fn num_in(&self) -> usize {
        self.in_types.len()
    }

    pub fn in_types(&self) -> &[Type] {
        &self.in_types
    }

    pub fn in_kinds(&self) -> impl Iterator<Item = Kind> + '_ {
        self.in_types.iter().map(|ty| ty.kind())
    }

    pub fn num_out(&self) -> usize {
        self.out_types.len()
    }

    pub fn out_types(&self) -> &[Type] {
        &self.out_types
    }

    /// Positions that get a fresh zero value on every `args()`.
    pub fn in_create(&self) -> &[Arg] {
        &self.in_create
    }

    /// Positions that reuse one shared nil value.
    pub fn in_cache(&self) -> &[Arg] {
        &self.in_cache
    }

    pub fn allocator(&self) -> &Arc<dyn ArgAllocator> {
        &self.alloc
    }

    /// Checks out a container and fills it according to the partition. Pruned positions
    /// stay empty.
    pub fn args(&self) -> Args {
        let num_in = self.num_in();
        let mut args = self.alloc.checkout(num_in);
        args.reset(num_in);
        for arg in &self.in_create {
            args.fill(arg.n, arg.ty.zero(), true);
        }
        for arg in &self.in_cache {
            if let Some(value) = &arg.value {
                args.fill(arg.n, value.clone(), false);
            }
        }
        args
    }

    /// Invokes the callable with the container's values.
    ///
    /// The container is cleared and released on every exit path, including a panic
    /// raised by the callee. Panics if a slot is empty or holds a value of the wrong
    /// type.
    pub fn call(&self, args: Args) -> CallResult {
        let mut reclaim = Reclaim {
            args: Some(args),
            alloc: &*self.alloc,
        };
        let slots = reclaim.slots();
        if slots.len() != self.num_in() {
            panic!(
                "{} expects {} arguments, container holds {}",
                self.pretty(),
                self.num_in(),
                slots.len()
            );
        }
        CallResult::from_returns((self.invoke)(slots))
    }

    /// Removes every position whose type is in `types` from argument synthesis and returns
    /// the removed entries (placeholders first, then auto-created positions). The caller
    /// must supply those slots before `call`.
    pub fn prune_in(&mut self, types: &[Type]) -> Vec<Arg> {
        let mut pruned = Vec::new();
        prune(&mut self.in_cache, types, &mut pruned);
        prune(&mut self.in_create, types, &mut pruned);
        if !pruned.is_empty() {
            trace!(target: "callset::call", pruned = pruned.len(), signature = %self.pretty(), "func.prune_in");
        }
        pruned
    }

    /// `func(A, B) R`, with the return list parenthesised when there are several.
    pub fn pretty(&self) -> String {
        self.render("func")
    }

    pub(crate) fn render(&self, name: &str) -> String {
        let mut out = String::with_capacity(name.len() + 16 * (self.num_in() + self.num_out()));
        out.push_str(name);
        out.push('(');
        push_joined(&mut out, &self.in_types);
        out.push(')');
        match self.out_types.len() {
            0 => {}
            1 => {
                out.push(' ');
                out.push_str(self.out_types[0].name());
            }
            _ => {
                out.push_str(" (");
                push_joined(&mut out, &self.out_types);
                out.push(')');
            }
        }
        out
    }
}

impl fmt::Debug for Func {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Func")
            .field("signature", &self.pretty())
            .field("in_create", &self.in_create.iter().map(|a| a.n).collect::<Vec<_>>())
            .field("in_cache", &self.in_cache.iter().map(|a| a.n).collect::<Vec<_>>())
            .finish()
    }
}

fn push_joined(out: &mut String, types: &[Type]) {
    for (idx, ty) in types.iter().enumerate() {
        if idx > 0 {
            out.push_str(", ");
        }
        out.push_str(ty.name());
    }
}

fn prune(args: &mut Vec<Arg>, types: &[Type], pruned: &mut Vec<Arg>) {
    for ty in types {
        let mut k = 0;
        while k < args.len() {
            if args[k].ty == *ty {
                pruned.push(args.remove(k));
            } else {
                k += 1;
            }
        }
    }
}

/// Returns the container to its allocator when dropped.
struct Reclaim<'a> {
    args: Option<Args>,
    alloc: &'a dyn ArgAllocator,
}

impl Reclaim<'_> {
    fn slots(&mut self) -> &mut [Option<Value>] {
        match self.args.as_mut() {
            Some(args) => args.slots_mut(),
            None => &mut [],
        }
    }
}

impl Drop for Reclaim<'_> {
    fn drop(&mut self) {
        if let Some(args) = self.args.take() {
            self.alloc.release(args);
        }
    }
}
