//! Ambient per-thread context copied into every record.
//!
//! Values put here appear as extra string fields on JSON records emitted
//! from the same thread until removed.

use std::cell::RefCell;
use std::collections::BTreeMap;

thread_local! {
    static CONTEXT: RefCell<BTreeMap<String, String>> = const { RefCell::new(BTreeMap::new()) };
}

pub fn put(key: impl Into<String>, value: impl Into<String>) {
    CONTEXT.with(|ctx| {
        ctx.borrow_mut().insert(key.into(), value.into());
    });
}

pub fn get(key: &str) -> Option<String> {
    CONTEXT.with(|ctx| ctx.borrow().get(key).cloned())
}

pub fn remove(key: &str) -> Option<String> {
    CONTEXT.with(|ctx| ctx.borrow_mut().remove(key))
}

pub fn clear() {
    CONTEXT.with(|ctx| ctx.borrow_mut().clear());
}

/// Copy of the current thread's context, in key order.
pub fn snapshot() -> Vec<(String, String)> {
    CONTEXT.with(|ctx| {
        ctx.borrow()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    })
}

/// Put a value for the lifetime of the returned guard.
///
/// Dropping the guard restores whatever value the key held before.
pub fn scoped(key: impl Into<String>, value: impl Into<String>) -> MdcGuard {
    let key = key.into();
    let previous = CONTEXT.with(|ctx| ctx.borrow_mut().insert(key.clone(), value.into()));
    MdcGuard { key, previous }
}

/// A RAII guard that undoes a [`scoped`] put.
#[derive(Debug)]
#[must_use = "the value is removed when the guard is dropped"]
pub struct MdcGuard {
    key: String,
    previous: Option<String>,
}

impl Drop for MdcGuard {
    fn drop(&mut self) {
        let previous = self.previous.take();
        CONTEXT.with(|ctx| {
            let mut ctx = ctx.borrow_mut();
            match previous {
                Some(value) => {
                    ctx.insert(std::mem::take(&mut self.key), value);
                }
                None => {
                    ctx.remove(&self.key);
                }
            }
        });
    }
}
