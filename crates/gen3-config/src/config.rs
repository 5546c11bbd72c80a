//! configuration documents read from the config directory
//!
//! [ConfigDocuments] holds
//! - the global environment map (`config.json`)
//! - the IAM roles map (`iamRolesConfig.yaml`)
//! - the cluster sizing map (`clusterConfig.yaml`)
//!
//! All maps keep the order of the source document.
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const GLOBAL_CONFIG_FILE: &str = "config.json";
pub const IAM_ROLES_FILE: &str = "iamRolesConfig.yaml";
pub const CLUSTER_CONFIG_FILE: &str = "clusterConfig.yaml";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct AwsConfig {
    pub account: String,
    pub region: String,
}

/// Descriptor of one deployment environment
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentConfig {
    pub name: String,
    pub cluster_name: String,
    pub aws: AwsConfig,
    pub platform_role_name: String,
    pub vpc_id: String,
    pub namespace: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_subnets: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_group_subnets: Option<Vec<String>>,
}

/// Global environment map, keyed by environment name
pub type GlobalConfig = IndexMap<String, EnvironmentConfig>;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IamRoleConfig {
    pub service_name: String,
    pub policies: Vec<String>,
}

/// `services` -> environment -> role group -> roles
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct IamRolesConfig {
    #[serde(default)]
    pub services: IndexMap<String, IndexMap<String, Vec<IamRoleConfig>>>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClusterConfigDetails {
    pub version: String,
    pub min_size: u32,
    pub max_size: u32,
    pub desired_size: u32,
    pub disk_size: u32,
    pub ami_release_version: String,
    pub instance_type: String,
    #[serde(default)]
    pub tags: IndexMap<String, String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ClusterConfig {
    #[serde(default)]
    pub clusters: IndexMap<String, ClusterConfigDetails>,
}

/// All documents needed for one declaration pass
#[derive(Serialize, Debug, Clone, derive_new::new)]
#[serde(rename_all = "camelCase")]
pub struct ConfigDocuments {
    pub global: GlobalConfig,
    pub iam_roles: IamRolesConfig,
    pub clusters: ClusterConfig,
}

impl ConfigDocuments {
    /// Loads the three documents from `dir_path`
    pub fn load_directory(dir_path: &Path) -> Result<Self, LoadError> {
        let global = load_file(&dir_path.join(GLOBAL_CONFIG_FILE), Format::Json)?;
        let iam_roles = load_file(&dir_path.join(IAM_ROLES_FILE), Format::Yaml)?;
        let clusters = load_file(&dir_path.join(CLUSTER_CONFIG_FILE), Format::Yaml)?;

        Ok(Self {
            global,
            iam_roles,
            clusters,
        })
    }

    pub fn environment(&self, name: &str) -> Option<&EnvironmentConfig> {
        self.global.get(name)
    }
}

#[derive(Clone, Copy)]
enum Format {
    Json,
    Yaml,
}

fn load_file<T: serde::de::DeserializeOwned>(file_path: &Path, format: Format) -> Result<T, LoadError> {
    tracing::info!(path=%file_path.display(), "loading file");

    let file_contents = std::fs::read_to_string(file_path).map_err(|source| LoadError::Io {
        path: file_path.to_owned(),
        source,
    })?;

    match format {
        Format::Json => serde_json::from_str(&file_contents).map_err(|source| LoadError::Json {
            path: file_path.to_owned(),
            source,
        }),
        Format::Yaml => serde_yaml::from_str(&file_contents).map_err(|source| LoadError::Yaml {
            path: file_path.to_owned(),
            source,
        }),
    }
}

#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("Unable to read {}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Unable to parse json document {}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Unable to parse yaml document {}", path.display())]
    Yaml {
        path: PathBuf,
        source: serde_yaml::Error,
    },
}
