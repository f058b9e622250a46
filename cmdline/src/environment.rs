use std::collections::BTreeMap;

/// Read access to environment variables.
pub trait Environment {
    /// Value of `name`, if it is defined.
    fn variable(&self, name: &str) -> Option<String>;

    /// Values of every name in `names` that is defined. Undefined names are
    /// left out.
    fn variables(&self, names: &[&str]) -> BTreeMap<String, String> {
        names
            .iter()
            .filter_map(|name| self.variable(name).map(|v| (name.to_string(), v)))
            .collect()
    }
}

/// The environment of the current process.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnvironment;

impl Environment for ProcessEnvironment {
    // Non-UTF-8 values count as undefined.
    fn variable(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// A fixed set of variables.
#[derive(Debug, Clone, Default)]
pub struct StaticEnvironment {
    vars: BTreeMap<String, String>,
}

impl StaticEnvironment {
    pub fn new<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        StaticEnvironment {
            vars: vars
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl Environment for StaticEnvironment {
    fn variable(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}
