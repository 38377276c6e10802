use std::collections::HashMap;
use std::sync::Mutex;

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Applies a set of environment overrides for the duration of `f`.
///
/// A process-wide lock keeps concurrently running tests from stepping on
/// each other's variables, and a drop guard puts the previous values back
/// even when `f` panics.
///
/// Each entry in `changes` is `(name, Some(value))` to set a variable or
/// `(name, None)` to unset it.
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    // A panicking closure poisons the lock; the guard has already restored
    // the environment by then, so the poison itself is harmless.
    let _lock = ENV_LOCK
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    let _guard = EnvGuard::apply(changes);
    f()
}

struct EnvGuard {
    saved: HashMap<String, Option<String>>,
}

impl EnvGuard {
    fn apply(changes: &[(&str, Option<&str>)]) -> Self {
        let mut saved = HashMap::new();
        for (key, value) in changes {
            saved
                .entry(key.to_string())
                .or_insert_with(|| std::env::var(key).ok());
            match value {
                Some(v) => std::env::set_var(key, v),
                None => std::env::remove_var(key),
            }
        }
        Self { saved }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, original) in self.saved.drain() {
            match original {
                Some(v) => std::env::set_var(&key, v),
                None => std::env::remove_var(&key),
            }
        }
    }
}
