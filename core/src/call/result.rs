use std::any::Any;

use crate::{typ::SharedError, val::Value};

/// Outcome of one call: every returned value in declaration order, and the last returned
/// value that reported an error.
#[derive(Debug, Clone, Default)]
pub struct CallResult {
    pub values: Vec<Value>,
    pub error: Option<SharedError>,
}

impl CallResult {
    pub(crate) fn from_returns(values: Vec<Value>) -> Self {
        let error = values.iter().rev().find_map(Value::as_error);
        Self { values, error }
    }

    pub fn is_err(&self) -> bool {
        self.error.is_some()
    }

    pub fn get<T: Any>(&self, k: usize) -> Option<&T> {
        self.values.get(k)?.downcast_ref::<T>()
    }

    pub fn into_anyhow(self) -> anyhow::Result<Vec<Value>> {
        match self.error {
            Some(err) => Err(anyhow::Error::new(err)),
            None => Ok(self.values),
        }
    }
}
