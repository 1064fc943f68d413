//! Sources of raw environment values.

use std::collections::{BTreeMap, HashMap};
use std::env;

/// Key-value oracle the binder reads raw strings from.
///
/// Returning `Some("")` is the same as returning `None`: the binder does not
/// distinguish a variable set to the empty string from an unset one.
pub trait Lookup {
    fn lookup(&self, key: &str) -> Option<String>;
}

/// The process environment.
///
/// Values that are not valid UTF-8 are treated as unset.
#[derive(Debug, Clone, Copy, Default)]
pub struct Env;

impl Lookup for Env {
    fn lookup(&self, key: &str) -> Option<String> {
        if key.is_empty() {
            return None;
        }
        env::var(key).ok()
    }
}

impl<S: std::hash::BuildHasher> Lookup for HashMap<String, String, S> {
    fn lookup(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl Lookup for BTreeMap<String, String> {
    fn lookup(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl<F> Lookup for F
where
    F: Fn(&str) -> Option<String>,
{
    fn lookup(&self, key: &str) -> Option<String> {
        self(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_env_lookup() {
        env::set_var("ENVBIND_LOOKUP_TEST", "value");
        assert_eq!(Env.lookup("ENVBIND_LOOKUP_TEST"), Some("value".to_string()));
        env::remove_var("ENVBIND_LOOKUP_TEST");
        assert_eq!(Env.lookup("ENVBIND_LOOKUP_TEST"), None);
    }

    #[test]
    fn test_env_lookup_empty_key() {
        assert_eq!(Env.lookup(""), None);
    }

    #[test]
    fn test_map_lookup() {
        let map = HashMap::from([("A".to_string(), "1".to_string())]);
        assert_eq!(map.lookup("A"), Some("1".to_string()));
        assert_eq!(map.lookup("B"), None);
    }

    #[test]
    fn test_closure_lookup() {
        let lookup = |key: &str| (key == "HOME").then(|| "/root".to_string());
        assert_eq!(lookup.lookup("HOME"), Some("/root".to_string()));
        assert_eq!(lookup.lookup("PATH"), None);
    }
}
