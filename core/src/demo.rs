//! Handler types used by the tests, the benchmarks and the `callset` binary.

use std::{
    fmt,
    sync::{Arc, Mutex, PoisonError},
};

use anyhow::anyhow;
use serde::Deserialize;

use crate::{
    call::MethodSet,
    typ::{ErrorValue, Iface, Reflect, Type, error_value},
    util::fast_map::{FastHashMap, fast_hash_map_new},
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Request {
    #[serde(default)]
    pub origin: String,
    #[serde(default)]
    pub token: String,
}

impl Reflect for Request {}

/// Nullable request pointer, the zero value is `None`.
pub type RequestRef = Option<Box<Request>>;

pub trait Response: Send + Sync {
    fn write(&self, body: &str);
}

pub trait Session: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: String);
}

pub type ResponseRef = Iface<dyn Response>;
pub type SessionRef = Iface<dyn Session>;

/// Collects everything written to it.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    body: Arc<Mutex<String>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn body(&self) -> String {
        self.body.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl Response for Recorder {
    fn write(&self, body: &str) {
        self.body.lock().unwrap_or_else(PoisonError::into_inner).push_str(body);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Farewell {
    pub string_field: String,
    pub num_field: i64,
}

impl Reflect for Farewell {}

/// Three methods, one of which always fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Talker;

impl Talker {
    fn error(&self, _res: ResponseRef, _req: RequestRef) -> ErrorValue {
        error_value(anyhow!("Talker made an error"))
    }

    fn goodbye(&self, _req: RequestRef, _farewell: Farewell) {}

    fn hello(&self, _res: ResponseRef, _req: RequestRef) -> (bool, ErrorValue) {
        (false, None)
    }
}

impl Reflect for Talker {
    fn methods(set: &mut MethodSet<Self>) {
        set.method("Error", Talker::error)
            .method("Goodbye", Talker::goodbye)
            .method("Hello", Talker::hello);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Person {
    pub name: String,
    pub age: i64,
}

impl Person {
    pub fn new(name: impl Into<String>, age: i64) -> Self {
        Self { name: name.into(), age }
    }

    pub fn greet(&self) -> String {
        format!("Hello! My name is {} and I am {} year(s) old.", self.name, self.age)
    }
}

impl Reflect for Person {
    fn methods(set: &mut MethodSet<Self>) {
        set.method("Greet", Person::greet);
    }
}

/// In-memory [`Session`]; clones share the same map.
#[derive(Clone, Default)]
pub struct MapSession {
    entries: Arc<Mutex<FastHashMap<String, String>>>,
}

impl MapSession {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(fast_hash_map_new())),
        }
    }

    fn get_method(&self, key: String) -> String {
        Session::get(self, &key).unwrap_or_default()
    }

    fn set_method(&self, key: String, value: String) {
        Session::set(self, &key, value);
    }
}

impl Session for MapSession {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: String) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value);
    }
}

impl fmt::Debug for MapSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let len = self.entries.lock().unwrap_or_else(PoisonError::into_inner).len();
        f.debug_struct("MapSession").field("entries", &len).finish()
    }
}

impl Reflect for MapSession {
    fn methods(set: &mut MethodSet<Self>) {
        set.method("Get", MapSession::get_method)
            .method("Set", MapSession::set_method);
    }
}

/// One method with six parameters; used to measure the call path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ManyArgs;

impl ManyArgs {
    fn many(
        &self,
        _res: ResponseRef,
        _req: RequestRef,
        _sess: SessionRef,
        _a: RequestRef,
        _b: RequestRef,
        _c: RequestRef,
    ) {
    }
}

impl Reflect for ManyArgs {
    fn methods(set: &mut MethodSet<Self>) {
        set.method("Many", ManyArgs::many);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

impl Reflect for LoginForm {}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Accounts;

impl Accounts {
    fn login(&self, res: ResponseRef, form: LoginForm) -> ErrorValue {
        if form.username.is_empty() {
            return error_value(anyhow!("username is required"));
        }
        if let Some(res) = res.get() {
            res.write(&format!("welcome {}", form.username));
        }
        None
    }
}

impl Reflect for Accounts {
    fn methods(set: &mut MethodSet<Self>) {
        set.method("Login", Accounts::login);
    }
}

/// Every demo type with methods, by display name.
pub fn catalog() -> Vec<(&'static str, Type)> {
    vec![
        ("Talker", Type::of::<Talker>()),
        ("Person", Type::of::<Person>()),
        ("MapSession", Type::of::<MapSession>()),
        ("ManyArgs", Type::of::<ManyArgs>()),
        ("Accounts", Type::of::<Accounts>()),
    ]
}
