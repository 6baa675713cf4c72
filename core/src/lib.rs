//! Runtime discovery and generic invocation of functions and methods.
//!
//! Types describe themselves through [`typ::Reflect`]; the [`cache::TypeCache`] turns that
//! description into a reusable set of [`call::Method`] descriptors per type, and
//! [`call::Func`] does the same for free functions. Argument buffers are pooled through
//! [`call::ArgAllocator`] so a hot `args()`/`call()` loop does not allocate containers.

pub mod cache;
pub mod call;
pub mod config;
pub mod demo;
pub mod error;
pub mod typ;
pub mod util;
pub mod val;

pub use cache::{TYPE_CACHE, TypeCache, stat, stat_func, stat_func_value, stat_func_with, stat_type, stat_value};
pub use call::{
    Arg, ArgAllocator, ArgPool, Args, CallResult, Func, Handle, HandleMut, Instance, Method, MethodSet, Methods,
    Receiver, Unpooled,
};
pub use config::CallConfig;
pub use error::CallError;
pub use typ::{ErrorValue, FuncValue, Iface, Kind, Reflect, SharedError, Type, error_value};
pub use val::Value;
