#[cfg(test)]
mod tests {
    use crate::cache::{stat_func, stat_func_value, stat_func_with};
    use crate::call::{ArgAllocator, ArgPool, Unpooled};
    use crate::demo::{LoginForm, MapSession, Recorder, Request, RequestRef, ResponseRef, Session, SessionRef};
    use crate::typ::{ErrorValue, FuncValue, Kind, Type, error_value};
    use crate::val::Value;
    use std::panic::{AssertUnwindSafe, catch_unwind};
    use std::sync::{Arc, Mutex};

    fn log() -> Arc<Mutex<Vec<String>>> {
        Arc::new(Mutex::new(Vec::new()))
    }

    #[test]
    fn test_zero_arguments_are_created() {
        let out = log();
        let sink = Arc::clone(&out);
        let f = stat_func(move |s: String, n: i64| {
            sink.lock().unwrap().push(format!("str={} num={}", s, n));
        });

        let result = f.call(f.args());
        assert!(result.values.is_empty());
        assert!(!result.is_err());
        assert_eq!(out.lock().unwrap().as_slice(), ["str= num=0"]);
    }

    #[test]
    fn test_handles_write_before_call() {
        let out = log();
        let sink = Arc::clone(&out);
        let f = stat_func(move |s: String, n: i64| {
            sink.lock().unwrap().push(format!("str={} num={}", s, n));
        });

        let mut args = f.args();
        assert_eq!(args.handle(0).map(|h| h.ty()), Some(Type::of::<String>()));
        assert_eq!(args.handle(1).map(|h| h.ty()), Some(Type::of::<i64>()));
        *args.get_mut::<String>(0).unwrap() = "Hi!".to_string();
        args.handle_mut(1).unwrap().set(42_i64).unwrap();
        assert_eq!(args.value(0).unwrap().downcast_ref::<String>().unwrap(), "Hi!");

        f.call(args);
        assert_eq!(out.lock().unwrap().as_slice(), ["str=Hi! num=42"]);
    }

    #[test]
    fn test_interface_parameters_share_a_nil_placeholder() {
        let f = stat_func(|res: ResponseRef, _req: Request| res.is_nil());
        assert_eq!(f.in_cache().len(), 1);
        assert_eq!(f.in_create().len(), 1);
        assert_eq!(f.in_cache()[0].n, 0);
        assert_eq!(f.in_create()[0].n, 1);

        let first = f.args();
        let second = f.args();
        assert!(first.value(0).unwrap().is_nil());
        assert!(first.handle(0).is_none());
        assert!(first.value(0).unwrap().ptr_eq(second.value(0).unwrap()));
        assert!(first.handle(1).is_some());

        assert_eq!(f.call(first).get::<bool>(0), Some(&true));
        assert_eq!(f.call(second).get::<bool>(0), Some(&true));
    }

    #[test]
    fn test_metadata() {
        let f = stat_func(|_s: String, _res: ResponseRef, _req: RequestRef| -> (bool, ErrorValue) { (true, None) });
        assert_eq!(f.num_in(), 3);
        assert_eq!(f.num_out(), 2);
        assert_eq!(f.in_kinds().collect::<Vec<_>>(), [Kind::String, Kind::Interface, Kind::Pointer]);
        assert_eq!(f.out_types(), [Type::of::<bool>(), Type::of::<ErrorValue>()]);
    }

    #[test]
    fn test_pretty() {
        let f = stat_func(|_req: Request, _res: ResponseRef| {});
        assert_eq!(f.pretty(), "func(Request, Response)");

        let f = stat_func(|| 1_i64);
        assert_eq!(f.pretty(), "func() i64");

        let f = stat_func(|_s: String| -> (bool, ErrorValue) { (false, None) });
        assert_eq!(f.pretty(), "func(String) (bool, error)");
    }

    #[test]
    fn test_error_classification() {
        let f = stat_func(|fail: bool| -> (i64, ErrorValue) {
            if fail { (0, error_value(anyhow::anyhow!("failed"))) } else { (7, None) }
        });

        let mut args = f.args();
        args.handle_mut(0).unwrap().set(true).unwrap();
        let result = f.call(args);
        assert_eq!(result.values.len(), 2);
        assert_eq!(result.error.as_ref().unwrap().to_string(), "failed");
        assert!(result.into_anyhow().is_err());

        let result = f.call(f.args());
        assert!(result.error.is_none());
        assert_eq!(result.get::<i64>(0), Some(&7));
    }

    #[test]
    fn test_last_error_wins() {
        let f = stat_func(|| -> (ErrorValue, ErrorValue, ErrorValue) {
            (
                error_value(anyhow::anyhow!("first")),
                error_value(anyhow::anyhow!("second")),
                None,
            )
        });
        let result = f.call(f.args());
        assert_eq!(result.error.unwrap().to_string(), "second");
    }

    #[test]
    fn test_prune_then_supply() {
        let out = log();
        let sink = Arc::clone(&out);
        let mut f = stat_func(move |req: Request, store: SessionRef| {
            sink.lock().unwrap().push(format!("origin={:?}", req.origin));
            match store.get() {
                Some(store) => store.set("message", "Hello, World!".to_string()),
                None => sink.lock().unwrap().push("nil store".to_string()),
            }
        });
        f.call(f.args());

        let session = Type::of::<SessionRef>();
        let pruned = f.prune_in(&[session]);
        assert_eq!(pruned.len(), 1);
        assert_eq!((pruned[0].n, pruned[0].ty), (1, session));
        assert!(pruned[0].value.as_ref().unwrap().is_nil());
        assert!(f.in_cache().is_empty());

        let args = f.args();
        assert!(args.value(1).is_none());
        assert!(catch_unwind(AssertUnwindSafe(|| f.call(args))).is_err());

        let sess = MapSession::new();
        let mut args = f.args();
        for arg in &pruned {
            if arg.ty == session {
                let supplied = SessionRef::new(Arc::new(sess.clone()));
                args.set(arg.n, supplied);
            }
        }
        f.call(args);

        assert_eq!(Session::get(&sess, "message").as_deref(), Some("Hello, World!"));
        assert_eq!(out.lock().unwrap().as_slice(), ["origin=\"\"", "nil store", "origin=\"\""]);
    }

    #[test]
    fn test_prune_removes_every_occurrence() {
        let mut f = stat_func(|_a: RequestRef, _s: String, _b: RequestRef, _res: ResponseRef| {});
        let pruned = f.prune_in(&[Type::of::<ResponseRef>(), Type::of::<RequestRef>()]);
        let positions: Vec<_> = pruned.iter().map(|a| a.n).collect();
        assert_eq!(positions, [3, 0, 2]);
        assert_eq!(f.in_create().len(), 1);
        assert!(f.prune_in(&[Type::of::<bool>()]).is_empty());
    }

    #[test]
    fn test_clones_prune_independently() {
        let f = stat_func(|_s: String, _n: i64| {});
        let mut copy = f.clone();
        copy.prune_in(&[Type::of::<String>()]);
        assert_eq!(f.in_create().len(), 2);
        assert_eq!(copy.in_create().len(), 1);
    }

    #[test]
    fn test_container_returns_to_pool_after_panic() {
        let pool = Arc::new(ArgPool::new(2, 8));
        let alloc: Arc<dyn ArgAllocator> = pool.clone();
        let f = stat_func_with(|n: i64| if n == 0 { panic!("callee failed") }, alloc);

        let args = f.args();
        assert!(catch_unwind(AssertUnwindSafe(|| f.call(args))).is_err());
        assert_eq!(pool.pooled(), 1);

        let mut args = f.args();
        assert_eq!(pool.allocated(), 1);
        args.handle_mut(0).unwrap().set(1_i64).unwrap();
        f.call(args);
        assert_eq!(pool.pooled(), 1);
    }

    #[test]
    fn test_unpooled_allocator() {
        let alloc = Arc::new(Unpooled::new());
        let f = stat_func_with(|_s: String| {}, alloc.clone());
        for _ in 0..3 {
            f.call(f.args());
        }
        assert_eq!(alloc.allocated(), 3);
    }

    #[test]
    fn test_decode_into_handle() {
        let out = log();
        let sink = Arc::clone(&out);
        let f = stat_func(move |res: ResponseRef, form: LoginForm| {
            sink.lock().unwrap().push(format!("{} {}", form.username, form.password));
            res.is_nil()
        });

        let mut args = f.args();
        for arg in f.in_create() {
            if arg.ty.kind() != Kind::Struct {
                continue;
            }
            let target = args.get_mut::<LoginForm>(arg.n).unwrap();
            *target = serde_json::from_str(r#"{"username":"test","password":"s3cr3t"}"#).unwrap();
        }
        assert_eq!(f.call(args).get::<bool>(0), Some(&true));
        assert_eq!(out.lock().unwrap().as_slice(), ["test s3cr3t"]);
    }

    #[test]
    fn test_supplied_interface_reaches_callee() {
        let mut f = stat_func(|res: ResponseRef| {
            if let Some(res) = res.get() {
                res.write("Logged out!");
            }
        });
        let pruned = f.prune_in(&[Type::of::<ResponseRef>()]);

        let recorder = Recorder::new();
        let mut args = f.args();
        let res = ResponseRef::new(Arc::new(recorder.clone()));
        args.set(pruned[0].n, res);
        f.call(args);
        assert_eq!(recorder.body(), "Logged out!");
    }

    #[test]
    fn test_function_values() {
        let f = stat_func_value(&Value::new(FuncValue::new(|a: i64, b: i64| a + b)));
        assert_eq!(f.pretty(), "func(i64, i64) i64");
        let mut args = f.args();
        args.handle_mut(0).unwrap().set(40_i64).unwrap();
        args.handle_mut(1).unwrap().set(2_i64).unwrap();
        assert_eq!(f.call(args).get::<i64>(0), Some(&42));
    }

    #[test]
    #[should_panic(expected = "function argument expected, got i64")]
    fn test_non_function_value_panics() {
        stat_func_value(&Value::new(42_i64));
    }

    #[test]
    #[should_panic(expected = "function argument expected, got func")]
    fn test_nil_function_value_panics() {
        stat_func_value(&Value::new(FuncValue::default()));
    }

    #[test]
    #[should_panic(expected = "expects 2 arguments, container holds 1")]
    fn test_foreign_container_panics() {
        let one = stat_func(|_s: String| {});
        let two = stat_func(|_s: String, _n: i64| {});
        two.call(one.args());
    }

    #[test]
    #[should_panic(expected = "argument 0 expects String, got i64")]
    fn test_mistyped_slot_panics() {
        let f = stat_func(|_s: String| {});
        let mut args = f.args();
        args.set(0, 5_i64);
        f.call(args);
    }
}
