use std::collections::HashMap;

/// Ordered environment variable list handed to a container via `-e` flags.
///
/// Entries are emitted in insertion order and duplicates are kept, so the
/// container's environment loader sees the last assignment for a key. Lookup
/// of the effective value is constant time through an index of the latest
/// position of each key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvList {
    entries: Vec<(String, String)>,
    /// key → index of its last entry
    latest: HashMap<String, usize>,
}

impl EnvList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an assignment. An earlier assignment of the same key stays in
    /// the list but is shadowed.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        self.latest.insert(key.clone(), self.entries.len());
        self.entries.push((key, value.into()));
    }

    /// Parse a `KEY=VALUE` assignment and append it. Only the first `=`
    /// separates key from value. Returns `false` (and appends nothing) when
    /// there is no `=` or the key is empty.
    pub fn push_assignment(&mut self, assignment: &str) -> bool {
        match assignment.split_once('=') {
            Some((key, value)) if !key.is_empty() => {
                self.push(key, value);
                true
            }
            _ => false,
        }
    }

    pub fn extend(&mut self, other: &EnvList) {
        for (key, value) in other.iter() {
            self.push(key, value);
        }
    }

    /// The effective (last written) value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.latest
            .get(key)
            .map(|&idx| self.entries[idx].1.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.latest.contains_key(key)
    }

    /// Number of entries, duplicates included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// All entries formatted as `KEY=VALUE`, in emission order.
    pub fn assignments(&self) -> Vec<String> {
        self.iter().map(|(k, v)| format!("{k}={v}")).collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for EnvList {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut list = EnvList::new();
        for (key, value) in iter {
            list.push(key, value);
        }
        list
    }
}

/// Read access to an environment, so callers can swap the process
/// environment for a fixed map in tests.
pub trait EnvSource {
    /// Value of `key`, or `None` when unset.
    fn var(&self, key: &str) -> Option<String>;
}

/// The invoking process's environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// Fixed in-memory environment.
#[derive(Debug, Clone, Default)]
pub struct MemoryEnv {
    vars: HashMap<String, String>,
}

impl MemoryEnv {
    pub fn new(vars: HashMap<String, String>) -> Self {
        Self { vars }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MemoryEnv {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl EnvSource for MemoryEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_duplicates_in_order_and_last_write_wins() {
        let mut env = EnvList::new();
        env.push("FN_MEMORY", "128");
        env.push("DB_URL", "postgres://db");
        env.push("FN_MEMORY", "512");

        assert_eq!(env.len(), 3);
        assert_eq!(env.get("FN_MEMORY"), Some("512"));
        assert_eq!(
            env.assignments(),
            vec!["FN_MEMORY=128", "DB_URL=postgres://db", "FN_MEMORY=512"]
        );
    }

    #[test]
    fn assignment_splits_on_first_equals() {
        let mut env = EnvList::new();
        assert!(env.push_assignment("QUERY=a=b"));
        assert!(env.push_assignment("EMPTY="));
        assert_eq!(env.get("QUERY"), Some("a=b"));
        assert_eq!(env.get("EMPTY"), Some(""));
    }

    #[test]
    fn rejects_assignment_without_key() {
        let mut env = EnvList::new();
        assert!(!env.push_assignment("NO_EQUALS"));
        assert!(!env.push_assignment("=value"));
        assert!(env.is_empty());
    }

    #[test]
    fn extend_preserves_shadowing() {
        let mut base: EnvList = [("A", "1"), ("B", "2")].into_iter().collect();
        let overrides: EnvList = [("A", "3")].into_iter().collect();
        base.extend(&overrides);

        assert_eq!(base.get("A"), Some("3"));
        assert_eq!(base.get("B"), Some("2"));
        assert_eq!(base.len(), 3);
    }

    #[test]
    fn memory_env_lookup() {
        let env: MemoryEnv = [("DOCKER_HOST", "tcp://10.0.0.2:2376")].into_iter().collect();
        assert_eq!(env.var("DOCKER_HOST").as_deref(), Some("tcp://10.0.0.2:2376"));
        assert_eq!(env.var("DOCKER_CERT_PATH"), None);
    }
}
