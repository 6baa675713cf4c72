//! Signatures, argument synthesis and invocation.
//!
//! [`Func`] describes one callable and produces [`Args`] for it; [`Method`] is a `Func`
//! bound to a shared [`Receiver`]; [`Instance`] groups the methods of one type around a
//! single receiver. Argument containers come from an [`ArgAllocator`] and go back to it
//! when the call finishes.

mod arg;
mod bind;
mod func;
mod instance;
mod method;
mod pool;
mod receiver;
mod result;

#[cfg(test)]
mod func_test;

pub use arg::{Arg, Args, Handle, HandleMut};
pub use bind::{Callable, IntoFunc, IntoMethod, MethodSet, Returns, Single};
pub(crate) use bind::MethodDecl;
pub use func::Func;
pub use instance::Instance;
pub use method::{Method, Methods};
pub use pool::{ArgAllocator, ArgPool, Unpooled, default_allocator, default_pool};
pub use receiver::Receiver;
pub use result::CallResult;
