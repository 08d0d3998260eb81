//! The answer store: a flat mapping from field name to string value.
//!
//! This is a pure fact store. It performs no validation; it only records
//! values and tells registered observers when one changes.

use std::collections::HashMap;
use std::fmt;

use chrono::NaiveDateTime;

use crate::datetime;

/// Emitted to observers whenever [`FormData::set_value`] runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataChange {
    pub field: String,
    pub old_value: String,
    pub new_value: String,
}

type DataObserver = Box<dyn Fn(&DataChange)>;

/// Field name to string value store. Absent keys read as the empty string.
#[derive(Default)]
pub struct FormData {
    values: HashMap<String, String>,
    observers: Vec<DataObserver>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value for a field; empty string when nothing was stored.
    pub fn get_value(&self, name: &str) -> String {
        self.values.get(name).cloned().unwrap_or_default()
    }

    /// Store a value, overwriting any previous one, and notify observers.
    pub fn set_value(&mut self, name: &str, value: &str) {
        let old_value = self.get_value(name);
        self.values.insert(name.to_string(), value.to_string());

        let change = DataChange {
            field: name.to_string(),
            old_value,
            new_value: value.to_string(),
        };
        for observer in &self.observers {
            observer(&change);
        }
    }

    /// Register a change observer for the lifetime of this store.
    pub fn subscribe<F>(&mut self, observer: F)
    where
        F: Fn(&DataChange) + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    /// Drop all stored values. Observers stay registered.
    pub fn reset(&mut self) {
        self.values.clear();
    }

    /// Parse the stored value of a field as a date/time.
    pub fn value_as_datetime(&self, name: &str) -> Option<NaiveDateTime> {
        datetime::parse_datetime(&self.get_value(name))
    }
}

impl fmt::Debug for FormData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormData")
            .field("values", &self.values)
            .field("observers", &self.observers.len())
            .finish()
    }
}
