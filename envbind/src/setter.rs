//! Registry of named setters referenced by `setter=<name>` in field tags.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;

use crate::EnvBind;

type SetterFn = Box<dyn Fn(&mut dyn Any, &str) -> anyhow::Result<()> + Send + Sync>;

/// Named setters, keyed by record type and name.
///
/// A setter receives the record that owns the tagged field (not the field
/// itself) together with the resolved raw string, so it can populate any
/// field of that record.
///
/// ```rust
/// use envbind::{Binder, EnvBind, Setters};
/// use std::collections::HashMap;
///
/// #[derive(Default, EnvBind)]
/// struct Config {
///     #[env("HOSTS,setter=split_hosts")]
///     pub hosts_raw: String,
///     pub hosts: Vec<String>,
/// }
///
/// let mut setters = Setters::new();
/// setters.register::<Config, _>("split_hosts", |config, raw| {
///     config.hosts = raw.split(';').map(str::to_string).collect();
///     Ok(())
/// });
///
/// let env = HashMap::from([("HOSTS".to_string(), "a;b".to_string())]);
/// let mut config = Config::default();
/// Binder::new(&env).with_setters(&setters).bind(&mut config).unwrap();
/// assert_eq!(config.hosts, ["a", "b"]);
/// ```
#[derive(Default)]
pub struct Setters {
    entries: HashMap<(TypeId, String), SetterFn>,
}

impl Setters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `setter` under `name` for records of type `R`.
    ///
    /// Registering the same name twice for one record type replaces the
    /// earlier setter.
    pub fn register<R, F>(&mut self, name: impl Into<String>, setter: F) -> &mut Self
    where
        R: EnvBind,
        F: Fn(&mut R, &str) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let callback: SetterFn = Box::new(move |record: &mut dyn Any, raw: &str| {
            match record.downcast_mut::<R>() {
                Some(record) => setter(record, raw),
                None => anyhow::bail!(
                    "setter registered for {} received another record type",
                    std::any::type_name::<R>()
                ),
            }
        });
        self.entries.insert((TypeId::of::<R>(), name.into()), callback);
        self
    }

    /// Invoke the setter `name` registered for `R`.
    ///
    /// Returns `None` when no such setter exists.
    pub(crate) fn call<R: EnvBind>(
        &self,
        record: &mut R,
        name: &str,
        raw: &str,
    ) -> Option<anyhow::Result<()>> {
        let setter = self.entries.get(&(TypeId::of::<R>(), name.to_string()))?;
        Some(setter(record, raw))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl fmt::Debug for Setters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Setters")
            .field("names", &self.entries.keys().map(|(_, name)| name).collect::<Vec<_>>())
            .finish()
    }
}
