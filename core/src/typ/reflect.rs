use std::{any::Any, collections::HashMap, sync::Arc};

use crate::call::{Callable, IntoFunc, MethodSet};

use super::{Kind, short_type_name};

/// Error shared out of a call result.
pub type SharedError = Arc<dyn std::error::Error + Send + Sync + 'static>;

/// Return type carrying the error capability: `None` means success and is not reported
/// as an error.
pub type ErrorValue = Option<SharedError>;

/// Runtime description of a type.
///
/// `Default` supplies the zero value synthesized for auto-created arguments; `Clone` is
/// used when a shared value (the receiver or a nil placeholder) is passed by value.
///
/// ```ignore
/// impl Reflect for Person {
///     fn methods(set: &mut MethodSet<Self>) {
///         set.method("Greet", Person::greet);
///     }
/// }
/// ```
pub trait Reflect: Any + Clone + Default + Send + Sync {
    fn kind() -> Kind {
        Kind::Struct
    }

    fn type_name() -> String {
        short_type_name(std::any::type_name::<Self>())
    }

    /// Declares the exported methods, in the order they should be enumerated.
    fn methods(_set: &mut MethodSet<Self>) {}

    fn is_nil(&self) -> bool {
        false
    }

    /// Error capability: a non-`None` return marks this value as the call's error.
    fn as_error(&self) -> Option<SharedError> {
        None
    }
}

macro_rules! reflect_scalar {
    ($($ty:ty => $kind:ident, $name:literal;)*) => {
        $(
            impl Reflect for $ty {
                fn kind() -> Kind {
                    Kind::$kind
                }

                fn type_name() -> String {
                    String::from($name)
                }
            }
        )*
    };
}

reflect_scalar! {
    bool => Bool, "bool";
    i8 => Int, "i8";
    i16 => Int, "i16";
    i32 => Int, "i32";
    i64 => Int, "i64";
    isize => Int, "isize";
    u8 => Uint, "u8";
    u16 => Uint, "u16";
    u32 => Uint, "u32";
    u64 => Uint, "u64";
    usize => Uint, "usize";
    f32 => Float, "f32";
    f64 => Float, "f64";
    char => Char, "char";
    String => String, "String";
}

impl<T: Reflect> Reflect for Vec<T> {
    fn kind() -> Kind {
        Kind::Slice
    }

    fn type_name() -> String {
        format!("Vec<{}>", T::type_name())
    }
}

impl<T: Reflect> Reflect for HashMap<String, T> {
    fn kind() -> Kind {
        Kind::Map
    }

    fn type_name() -> String {
        format!("HashMap<String, {}>", T::type_name())
    }
}

/// Nullable owned pointer; the zero value is `None`.
impl<T: Reflect> Reflect for Option<Box<T>> {
    fn kind() -> Kind {
        Kind::Pointer
    }

    fn type_name() -> String {
        format!("Option<Box<{}>>", T::type_name())
    }

    fn is_nil(&self) -> bool {
        self.is_none()
    }
}

impl Reflect for ErrorValue {
    fn kind() -> Kind {
        Kind::Interface
    }

    fn type_name() -> String {
        String::from("error")
    }

    fn is_nil(&self) -> bool {
        self.is_none()
    }

    fn as_error(&self) -> Option<SharedError> {
        self.clone()
    }
}

/// Wraps any error into an [`ErrorValue`].
pub fn error_value(err: impl Into<anyhow::Error>) -> ErrorValue {
    let boxed: Box<dyn std::error::Error + Send + Sync + 'static> = err.into().into();
    Some(Arc::from(boxed))
}

/// A function carried as a runtime value; the zero value is a nil function.
#[derive(Clone, Default)]
pub struct FuncValue(Option<Arc<Callable>>);

impl FuncValue {
    pub fn new<M, F: IntoFunc<M>>(f: F) -> Self {
        FuncValue(Some(Arc::new(f.into_callable())))
    }

    pub(crate) fn callable(&self) -> Option<&Callable> {
        self.0.as_deref()
    }
}

impl Reflect for FuncValue {
    fn kind() -> Kind {
        Kind::Func
    }

    fn type_name() -> String {
        String::from("func")
    }

    fn is_nil(&self) -> bool {
        self.0.is_none()
    }
}
