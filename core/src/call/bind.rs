//! Turning closures and fn items into erased callables.

use std::{marker::PhantomData, sync::Arc};

use crate::{
    typ::{Reflect, Type},
    val::Value,
};

pub(crate) type Invoke = Arc<dyn Fn(&mut [Option<Value>]) -> Vec<Value> + Send + Sync>;

/// An erased callable with its parameter and return types.
#[derive(Clone)]
pub struct Callable {
    pub(crate) invoke: Invoke,
    pub(crate) ins: Arc<[Type]>,
    pub(crate) outs: Arc<[Type]>,
}

impl Callable {
    fn new(invoke: Invoke, ins: Vec<Type>, outs: Vec<Type>) -> Self {
        Self {
            invoke,
            ins: ins.into(),
            outs: outs.into(),
        }
    }
}

pub(crate) struct MethodDecl {
    pub(crate) name: Arc<str>,
    pub(crate) callable: Callable,
}

/// Collects the exported methods of `R` inside [`Reflect::methods`].
pub struct MethodSet<R> {
    decls: Vec<MethodDecl>,
    _receiver: PhantomData<fn(&R)>,
}

impl<R: Reflect> MethodSet<R> {
    pub(crate) fn new() -> Self {
        Self {
            decls: Vec::new(),
            _receiver: PhantomData,
        }
    }

    /// Declares method `name`. `f` takes `&R` followed by at most eight parameters, each a
    /// [`Reflect`] type, and returns `()`, one `Reflect` value or a tuple of two to four.
    pub fn method<M, F: IntoMethod<R, M>>(&mut self, name: &str, f: F) -> &mut Self {
        self.decls.push(MethodDecl {
            name: Arc::from(name),
            callable: f.into_callable(),
        });
        self
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    pub(crate) fn into_decls(self) -> Vec<MethodDecl> {
        self.decls
    }
}

/// Marker for callables returning exactly one value.
pub struct Single;

/// Return shapes: `()` for none, any [`Reflect`] type for one, tuples for several.
pub trait Returns<M>: 'static {
    fn types() -> Vec<Type>;

    fn collect(self, out: &mut Vec<Value>);
}

impl Returns<()> for () {
    fn types() -> Vec<Type> {
        Vec::new()
    }

    fn collect(self, _out: &mut Vec<Value>) {}
}

impl<T: Reflect> Returns<Single> for T {
    fn types() -> Vec<Type> {
        vec![Type::of::<T>()]
    }

    fn collect(self, out: &mut Vec<Value>) {
        out.push(Value::new(self));
    }
}

macro_rules! impl_returns_tuple {
    ($($T:ident $v:ident),+) => {
        impl<$($T: Reflect),+> Returns<($($T,)+)> for ($($T,)+) {
            fn types() -> Vec<Type> {
                vec![$(Type::of::<$T>()),+]
            }

            fn collect(self, out: &mut Vec<Value>) {
                let ($($v,)+) = self;
                $(out.push(Value::new($v));)+
            }
        }
    };
}

impl_returns_tuple!(A a, B b);
impl_returns_tuple!(A a, B b, C c);
impl_returns_tuple!(A a, B b, C c, D d);

/// Free functions and closures usable with `stat_func`: up to eight [`Reflect`]
/// parameters and a [`Returns`] shape. Larger signatures do not implement this trait.
pub trait IntoFunc<M>: Send + Sync + 'static {
    fn into_callable(self) -> Callable;
}

/// Functions taking `&R` first, usable as methods of `R`; at most eight parameters after
/// the receiver.
pub trait IntoMethod<R, M>: Send + Sync + 'static {
    fn into_callable(self) -> Callable;
}

fn take_arg<T: Reflect>(slots: &mut [Option<Value>], n: usize) -> T {
    let Some(value) = slots[n].take() else {
        panic!(
            "argument {} ({}) is empty; pruned arguments must be supplied before call",
            n,
            Type::of::<T>()
        );
    };
    match value.take::<T>() {
        Ok(v) => v,
        Err(other) => panic!("argument {} expects {}, got {}", n, Type::of::<T>(), other.ty()),
    }
}

fn receiver_arg<R: Reflect>(slots: &[Option<Value>]) -> &R {
    match slots[0].as_ref().and_then(Value::downcast_ref::<R>) {
        Some(receiver) => receiver,
        None => panic!("receiver slot does not hold a {}", Type::of::<R>()),
    }
}

macro_rules! impl_into_callables {
    ($($A:ident $a:ident $n:tt),*) => {
        impl<F, Out, OM, $($A,)*> IntoFunc<(OM, Out, $($A,)*)> for F
        where
            F: Fn($($A),*) -> Out + Send + Sync + 'static,
            Out: Returns<OM>,
            $($A: Reflect,)*
        {
            fn into_callable(self) -> Callable {
                #[allow(unused_variables)]
                let invoke: Invoke = Arc::new(move |slots: &mut [Option<Value>]| {
                    $(let $a = take_arg::<$A>(slots, $n);)*
                    let mut out = Vec::new();
                    (self)($($a),*).collect(&mut out);
                    out
                });
                Callable::new(invoke, vec![$(Type::of::<$A>()),*], Out::types())
            }
        }

        impl<R, F, Out, OM, $($A,)*> IntoMethod<R, (OM, Out, $($A,)*)> for F
        where
            R: Reflect,
            F: Fn(&R, $($A),*) -> Out + Send + Sync + 'static,
            Out: Returns<OM>,
            $($A: Reflect,)*
        {
            fn into_callable(self) -> Callable {
                let invoke: Invoke = Arc::new(move |slots: &mut [Option<Value>]| {
                    $(let $a = take_arg::<$A>(slots, $n + 1);)*
                    let receiver = receiver_arg::<R>(slots);
                    let mut out = Vec::new();
                    (self)(receiver, $($a),*).collect(&mut out);
                    out
                });
                Callable::new(invoke, vec![Type::of::<R>(), $(Type::of::<$A>()),*], Out::types())
            }
        }
    };
}

impl_into_callables!();
impl_into_callables!(A0 a0 0);
impl_into_callables!(A0 a0 0, A1 a1 1);
impl_into_callables!(A0 a0 0, A1 a1 1, A2 a2 2);
impl_into_callables!(A0 a0 0, A1 a1 1, A2 a2 2, A3 a3 3);
impl_into_callables!(A0 a0 0, A1 a1 1, A2 a2 2, A3 a3 3, A4 a4 4);
impl_into_callables!(A0 a0 0, A1 a1 1, A2 a2 2, A3 a3 3, A4 a4 4, A5 a5 5);
impl_into_callables!(A0 a0 0, A1 a1 1, A2 a2 2, A3 a3 3, A4 a4 4, A5 a5 5, A6 a6 6);
impl_into_callables!(A0 a0 0, A1 a1 1, A2 a2 2, A3 a3 3, A4 a4 4, A5 a5 5, A6 a6 6, A7 a7 7);
