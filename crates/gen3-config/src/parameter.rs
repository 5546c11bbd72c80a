//! parameter paths, categories and operator supplied run flags
//!
//! Parameter paths are derived from an environment name and a [Category]:
//!
//! | category  | path                          |
//! |-----------|-------------------------------|
//! | `config`  | `/gen3/config`                |
//! | `roles`   | `/gen3/{env}/iamRolesConfig`  |
//! | `cluster` | `/gen3/{env}/cluster-config`  |
use serde::Serialize;
use std::fmt::Formatter;

/// Class of configuration document distributed to the parameter store
#[derive(clap::ValueEnum, Serialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// global environment map, one path for all environments
    Config,
    /// IAM roles, one path per environment
    Roles,
    /// cluster sizing, one path per environment
    Cluster,
}

impl Category {
    /// Categories that have one path per environment
    pub const PER_ENVIRONMENT: [Category; 2] = [Category::Roles, Category::Cluster];

    /// Last path segment for per-environment categories
    pub fn parameter_name(&self) -> &'static str {
        match self {
            Category::Config => "config",
            Category::Roles => "iamRolesConfig",
            Category::Cluster => "cluster-config",
        }
    }

    /// Prefix used when naming the put-parameter declaration
    pub(crate) fn declaration_prefix(&self) -> &'static str {
        match self {
            Category::Config => "config",
            Category::Roles => "iamRoles",
            Category::Cluster => "clusterConfig",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Config => f.write_str("config"),
            Category::Roles => f.write_str("roles"),
            Category::Cluster => f.write_str("cluster"),
        }
    }
}

/// Hierarchical key into the parameter store
#[derive(Serialize, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct ParameterPath(String);

impl ParameterPath {
    const ROOT: &'static str = "/gen3";

    /// The global `/gen3/config` path
    pub fn global() -> Self {
        Self(format!("{}/config", Self::ROOT))
    }

    /// Path of `category` for `environment`
    ///
    /// [Category::Config] is not per environment and always resolves to [ParameterPath::global].
    pub fn of(environment: &str, category: Category) -> Self {
        match category {
            Category::Config => Self::global(),
            _ => Self(format!(
                "{}/{environment}/{}",
                Self::ROOT,
                category.parameter_name()
            )),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ParameterPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Categories the operator allows to overwrite existing values during this run
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UpdateFlagSet {
    categories: Vec<Category>,
}

impl UpdateFlagSet {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn contains(&self, category: Category) -> bool {
        self.categories.contains(&category)
    }
}

impl FromIterator<Category> for UpdateFlagSet {
    fn from_iter<T: IntoIterator<Item = Category>>(iter: T) -> Self {
        let mut categories = vec![];
        for category in iter {
            if !categories.contains(&category) {
                categories.push(category);
            }
        }
        Self { categories }
    }
}

/// Ordered, duplicate free list of environment names
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Environments(Vec<String>);

impl Environments {
    /// Validates names and drops repeated ones, keeping the first occurrence
    pub fn new<I, S>(names: I) -> Result<Self, InvalidEnvironments>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut environments: Vec<String> = vec![];
        for name in names {
            let name = name.as_ref().trim();
            if name.is_empty() {
                return Err(InvalidEnvironments::EmptyName);
            }
            if environments.iter().any(|existing| existing == name) {
                tracing::debug!(environment = name, "ignoring repeated environment");
                continue;
            }
            environments.push(name.to_string());
        }

        if environments.is_empty() {
            return Err(InvalidEnvironments::NoneGiven);
        }

        Ok(Self(environments))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum InvalidEnvironments {
    #[error("No environments provided")]
    NoneGiven,
    #[error("Environment names must not be empty")]
    EmptyName,
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn paths() {
        assert_eq!(ParameterPath::global().as_str(), "/gen3/config");
        assert_eq!(
            ParameterPath::of("uat", Category::Roles).as_str(),
            "/gen3/uat/iamRolesConfig"
        );
        assert_eq!(
            ParameterPath::of("uat", Category::Cluster).as_str(),
            "/gen3/uat/cluster-config"
        );
        assert_eq!(
            ParameterPath::of("uat", Category::Config),
            ParameterPath::global()
        );
    }

    #[test]
    fn update_flags() {
        let flags: UpdateFlagSet = [Category::Roles, Category::Roles].into_iter().collect();
        assert!(flags.contains(Category::Roles));
        assert!(!flags.contains(Category::Cluster));
        assert!(!UpdateFlagSet::none().contains(Category::Config));
    }

    #[test]
    fn environments_keep_order_and_drop_repeats() {
        let environments = Environments::new(["test", "prod", "test", " staging "]).unwrap();
        assert_eq!(
            environments.iter().collect::<Vec<_>>(),
            vec!["test", "prod", "staging"]
        );
    }

    #[test]
    fn environments_reject_empty() {
        assert_eq!(
            Environments::new(["test", ""]),
            Err(InvalidEnvironments::EmptyName)
        );
        assert_eq!(
            Environments::new(Vec::<String>::new()),
            Err(InvalidEnvironments::NoneGiven)
        );
    }
}
