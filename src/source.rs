//! Key-value sources the decoder reads variables from.

use crate::error::SourceError;
use std::{
    collections::{BTreeMap, BTreeSet},
    env,
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
    sync::{Mutex, PoisonError},
};

/// Provider of named string values
pub trait Source {
    /// Value of `key`, `None` when absent. Callers treat an empty value as absent.
    fn get(&self, key: &str) -> Option<String>;

    /// Names of all defined variables
    fn list(&self) -> Vec<String>;
}

impl<S: Source + ?Sized> Source for &S {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn list(&self) -> Vec<String> {
        (**self).list()
    }
}

/// The process environment. Variables that are not valid unicode are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsEnv;

impl Source for OsEnv {
    fn get(&self, key: &str) -> Option<String> {
        env::var(key).ok()
    }

    fn list(&self) -> Vec<String> {
        env::vars_os()
            .filter_map(|(name, _)| name.into_string().ok())
            .filter(|name| !name.is_empty())
            .collect()
    }
}

/// In-memory variables, mostly for tests
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapEnv(pub BTreeMap<String, String>);

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }
}

impl Source for MapEnv {
    fn get(&self, key: &str) -> Option<String> {
        self.0.get(key).cloned()
    }

    fn list(&self) -> Vec<String> {
        self.0.keys().cloned().collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapEnv {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for MapEnv {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

/// Variables read once from a `KEY=VALUE` file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileEnv {
    vars: MapEnv,
}

impl FileEnv {
    /// Read `path`. Lines are trimmed, blank lines and `#` comments are skipped,
    /// and the first `=` splits name from value. Values are taken verbatim: no
    /// quoting, interpolation or inline comments. A line without `=` is an error.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let io_error = |source| SourceError::Io {
            path: path.to_path_buf(),
            source,
        };

        let file = File::open(path).map_err(io_error)?;
        let mut vars = MapEnv::new();
        for line in BufReader::new(file).lines() {
            let line = line.map_err(io_error)?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                return Err(SourceError::Line {
                    path: path.to_path_buf(),
                    line: line.to_string(),
                });
            };
            vars.insert(key, value);
        }
        Ok(Self { vars })
    }
}

impl Source for FileEnv {
    fn get(&self, key: &str) -> Option<String> {
        self.vars.get(key)
    }

    fn list(&self) -> Vec<String> {
        self.vars.list()
    }
}

/// Tries `primary` first and falls back to `fallback` per key
#[derive(Debug, Clone, Default)]
pub struct FallbackEnv<P, F> {
    pub primary: P,
    pub fallback: F,
}

impl<P: Source, F: Source> FallbackEnv<P, F> {
    pub fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }
}

impl<P: Source, F: Source> Source for FallbackEnv<P, F> {
    fn get(&self, key: &str) -> Option<String> {
        match self.primary.get(key) {
            Some(value) if !value.is_empty() => Some(value),
            _ => self.fallback.get(key),
        }
    }

    fn list(&self) -> Vec<String> {
        let mut seen = BTreeSet::new();
        self.primary
            .list()
            .into_iter()
            .chain(self.fallback.list())
            .filter(|name| seen.insert(name.clone()))
            .collect()
    }
}

/// Records which variables were fetched, whether or not they existed
#[derive(Debug, Default)]
pub struct TrackingSource<S> {
    inner: S,
    fetched: Mutex<BTreeSet<String>>,
}

impl<S: Source> TrackingSource<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            fetched: Mutex::new(BTreeSet::new()),
        }
    }

    /// Names that have been fetched, sorted
    pub fn fetched(&self) -> Vec<String> {
        self.fetched
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    /// Defined names that have never been fetched, in source order
    pub fn unfetched(&self) -> Vec<String> {
        let fetched = self.fetched.lock().unwrap_or_else(PoisonError::into_inner);
        self.inner
            .list()
            .into_iter()
            .filter(|name| !fetched.contains(name))
            .collect()
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: Source> Source for TrackingSource<S> {
    fn get(&self, key: &str) -> Option<String> {
        self.fetched
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string());
        self.inner.get(key)
    }

    fn list(&self) -> Vec<String> {
        self.inner.list()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn env_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_map_env() {
        let env = MapEnv::from([("B", "b"), ("A", "a")]);

        assert_eq!(env.get("A").as_deref(), Some("a"));
        assert_eq!(env.get("C"), None);
        assert_eq!(env.list(), vec!["A", "B"]);
    }

    #[test]
    fn test_os_env_reads_process_environment() {
        // SAFETY: the variable name is unique to this test
        unsafe { env::set_var("ENVDECODE_SOURCE_TEST_OS", "yes") };

        assert_eq!(OsEnv.get("ENVDECODE_SOURCE_TEST_OS").as_deref(), Some("yes"));
        assert!(OsEnv.list().contains(&"ENVDECODE_SOURCE_TEST_OS".to_string()));
        assert_eq!(OsEnv.get("ENVDECODE_SOURCE_TEST_MISSING"), None);
    }

    #[test]
    fn test_file_env_parses_lines() {
        let file =
            env_file("# comment\n\nHOST=localhost\nURL=postgres://u:p@h/db?a=b\n  PORT=8080\n");
        let env = FileEnv::from_path(file.path()).unwrap();

        assert_eq!(env.get("HOST").as_deref(), Some("localhost"));
        assert_eq!(env.get("URL").as_deref(), Some("postgres://u:p@h/db?a=b"));
        assert_eq!(env.get("PORT").as_deref(), Some("8080"));
        assert_eq!(env.list(), vec!["HOST", "PORT", "URL"]);
    }

    #[test]
    fn test_file_env_rejects_line_without_equals() {
        let file = env_file("HOST=localhost\nNOT_A_PAIR\n");
        let err = FileEnv::from_path(file.path()).unwrap_err();

        assert!(matches!(&err, SourceError::Line { line, .. } if line == "NOT_A_PAIR"));
        assert!(err.to_string().starts_with("invalid line in env file"));
    }

    #[test]
    fn test_file_env_values_are_verbatim() {
        let file = env_file(
            "PASSWORD=pa$word\nGREETING=hello # world\nQUOTED=\"x\"\nexport NAME=n\nEMPTY=\n",
        );
        let env = FileEnv::from_path(file.path()).unwrap();

        assert_eq!(env.get("PASSWORD").as_deref(), Some("pa$word"));
        assert_eq!(env.get("GREETING").as_deref(), Some("hello # world"));
        assert_eq!(env.get("QUOTED").as_deref(), Some("\"x\""));
        assert_eq!(env.get("export NAME").as_deref(), Some("n"));
        assert_eq!(env.get("EMPTY").as_deref(), Some(""));
    }

    #[test]
    fn test_file_env_missing_file() {
        let err = FileEnv::from_path("/definitely/not/here.env").unwrap_err();
        assert!(matches!(err, SourceError::Io { .. }));
    }

    #[test]
    fn test_fallback_env() {
        let env = FallbackEnv::new(
            MapEnv::from([("A", "primary"), ("B", "")]),
            MapEnv::from([("A", "fallback"), ("B", "b"), ("C", "c")]),
        );

        assert_eq!(env.get("A").as_deref(), Some("primary"));
        assert_eq!(env.get("B").as_deref(), Some("b"));
        assert_eq!(env.get("C").as_deref(), Some("c"));
        assert_eq!(env.get("D"), None);
        assert_eq!(env.list(), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_tracking_source() {
        let env = TrackingSource::new(MapEnv::from([("A", "a"), ("B", "b")]));

        assert_eq!(env.get("A").as_deref(), Some("a"));
        assert_eq!(env.get("MISSING"), None);

        assert_eq!(env.fetched(), vec!["A", "MISSING"]);
        assert_eq!(env.unfetched(), vec!["B"]);

        let inner = env.into_inner();
        assert_eq!(inner.list(), vec!["A", "B"]);
    }
}
