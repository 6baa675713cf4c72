#[cfg(test)]
mod tests {
    use crate::demo::{Person, Request, RequestRef, ResponseRef, SessionRef, Talker};
    use crate::typ::{ErrorValue, FuncValue, Kind, Type, error_value};
    use std::collections::HashMap;
    use std::thread;

    #[test]
    fn test_type_identity_is_interned() {
        assert_eq!(Type::of::<Person>(), Type::of::<Person>());
        assert_ne!(Type::of::<Person>(), Type::of::<Request>());
        assert_ne!(Type::of::<i32>(), Type::of::<i64>());
    }

    #[test]
    fn test_type_names() {
        assert_eq!(Type::of::<Person>().name(), "Person");
        assert_eq!(Type::of::<RequestRef>().name(), "Option<Box<Request>>");
        assert_eq!(Type::of::<ResponseRef>().name(), "Response");
        assert_eq!(Type::of::<SessionRef>().name(), "Session");
        assert_eq!(Type::of::<ErrorValue>().name(), "error");
        assert_eq!(Type::of::<Vec<String>>().name(), "Vec<String>");
        assert_eq!(Type::of::<HashMap<String, i64>>().name(), "HashMap<String, i64>");
        assert_eq!(format!("{:?}", Type::of::<Talker>()), "Type(Talker)");
    }

    #[test]
    fn test_kinds() {
        assert_eq!(Type::of::<bool>().kind(), Kind::Bool);
        assert_eq!(Type::of::<u8>().kind(), Kind::Uint);
        assert_eq!(Type::of::<String>().kind(), Kind::String);
        assert_eq!(Type::of::<Person>().kind(), Kind::Struct);
        assert_eq!(Type::of::<RequestRef>().kind(), Kind::Pointer);
        assert_eq!(Type::of::<Vec<u8>>().kind(), Kind::Slice);
        assert_eq!(Type::of::<FuncValue>().kind(), Kind::Func);
        assert!(Type::of::<ResponseRef>().is_interface());
        assert!(Type::of::<ErrorValue>().is_interface());
        assert!(!Type::of::<Request>().is_interface());
        assert_eq!(Kind::Interface.to_string(), "interface");
    }

    #[test]
    fn test_zero_values() {
        let zero = Type::of::<Person>().zero();
        assert_eq!(zero.downcast_ref::<Person>(), Some(&Person::default()));
        assert!(!zero.is_shared());

        assert!(Type::of::<RequestRef>().zero().is_nil());
        assert!(Type::of::<SessionRef>().zero().is_nil());
        assert!(!Type::of::<i64>().zero().is_nil());
    }

    #[test]
    fn test_method_declarations_keep_order() {
        let names: Vec<_> = Type::of::<Talker>()
            .method_decls()
            .into_iter()
            .map(|decl| decl.name.to_string())
            .collect();
        assert_eq!(names, ["Error", "Goodbye", "Hello"]);
        assert!(Type::of::<String>().method_decls().is_empty());
    }

    #[test]
    fn test_error_capability() {
        let ty = Type::of::<ErrorValue>();
        let failed = error_value(anyhow::anyhow!("boom"));
        assert_eq!(ty.as_error(&failed).map(|e| e.to_string()).as_deref(), Some("boom"));
        let ok: ErrorValue = None;
        assert!(ty.as_error(&ok).is_none());
        assert!(Type::of::<String>().as_error(&String::from("boom")).is_none());
    }

    #[test]
    fn test_concurrent_first_use() {
        #[derive(Clone, Default)]
        struct Fresh;
        impl crate::typ::Reflect for Fresh {}

        let seen: Vec<Type> = thread::scope(|s| {
            let workers: Vec<_> = (0..8).map(|_| s.spawn(Type::of::<Fresh>)).collect();
            workers.into_iter().map(|w| w.join().unwrap()).collect()
        });
        assert!(seen.iter().all(|ty| *ty == seen[0] && ty.name() == "Fresh"));
    }
}
