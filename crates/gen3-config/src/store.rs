//! parameter store access
//!
//! The declaration pass only ever reads from the store, and only to learn whether a seeded path already holds a value.
//! Those reads are collected up front into an [ExistenceSnapshot] so that everything after them is pure.
use crate::decision::Existence;
use crate::parameter::ParameterPath;
use crate::seed::BlankParameters;
use indexmap::IndexMap;
use std::path::Path;

#[cfg(feature = "ssm")]
pub mod ssm;

/// Read access to a remote key-value parameter store
#[async_trait::async_trait]
pub trait ParameterStore: Send + Sync {
    /// Current value at `path`
    ///
    /// Returns `Ok(None)` when the store reports the path as not found. Every other failure is an error.
    async fn get_parameter(&self, path: &ParameterPath) -> Result<Option<String>, LookupError>;
}

#[derive(thiserror::Error, Debug)]
#[error("Lookup of parameter {path} failed")]
pub struct LookupError {
    pub path: ParameterPath,
    pub source: Box<dyn std::error::Error + Send + Sync>,
}

/// Parameter values held in memory
///
/// Used instead of the live store when the operator passes a file of known parameters.
#[derive(Debug, Default, Clone)]
pub struct StaticParameterStore {
    parameters: IndexMap<String, String>,
}

impl StaticParameterStore {
    pub fn new(parameters: IndexMap<String, String>) -> Self {
        Self { parameters }
    }

    /// Reads a path -> value map from a JSON or YAML file
    pub fn load_file(file_path: &Path) -> Result<Self, crate::config::LoadError> {
        use crate::config::LoadError;

        tracing::info!(path=%file_path.display(), "loading known parameters");
        let file_contents = std::fs::read_to_string(file_path).map_err(|source| LoadError::Io {
            path: file_path.to_owned(),
            source,
        })?;

        let is_json = file_path
            .extension()
            .is_some_and(|extension| extension.eq_ignore_ascii_case("json"));

        let parameters = if is_json {
            serde_json::from_str(&file_contents).map_err(|source| LoadError::Json {
                path: file_path.to_owned(),
                source,
            })?
        } else {
            serde_yaml::from_str(&file_contents).map_err(|source| LoadError::Yaml {
                path: file_path.to_owned(),
                source,
            })?
        };

        Ok(Self::new(parameters))
    }
}

impl<P: Into<String>, V: Into<String>> FromIterator<(P, V)> for StaticParameterStore {
    fn from_iter<T: IntoIterator<Item = (P, V)>>(iter: T) -> Self {
        Self::new(
            iter.into_iter()
                .map(|(path, value)| (path.into(), value.into()))
                .collect(),
        )
    }
}

#[async_trait::async_trait]
impl ParameterStore for StaticParameterStore {
    async fn get_parameter(&self, path: &ParameterPath) -> Result<Option<String>, LookupError> {
        Ok(self.parameters.get(path.as_str()).cloned())
    }
}

/// Existence of every seeded path, taken once per run
///
/// Can only be built from [BlankParameters], which makes seeding an explicit precondition of distribution.
#[derive(Debug, Clone)]
pub struct ExistenceSnapshot {
    entries: IndexMap<ParameterPath, Existence>,
}

impl ExistenceSnapshot {
    /// Looks up every path covered by `seeded`
    ///
    /// Stops at the first lookup error.
    pub async fn probe<S>(store: &S, seeded: &BlankParameters) -> Result<Self, LookupError>
    where
        S: ParameterStore + ?Sized,
    {
        let mut entries = IndexMap::new();
        for path in seeded.paths() {
            let existence = match store.get_parameter(path).await? {
                Some(_) => Existence::Present,
                None => Existence::Absent,
            };
            tracing::debug!(%path, ?existence, "probed parameter");
            entries.insert(path.clone(), existence);
        }

        Ok(Self { entries })
    }

    /// `None` when `path` was never seeded
    pub fn existence(&self, path: &ParameterPath) -> Option<Existence> {
        self.entries.get(path).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
