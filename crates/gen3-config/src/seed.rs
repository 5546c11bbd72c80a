//! placeholder parameters declared ahead of distribution
//!
//! Every path the distributor may write gets a `String` parameter with the value [PLACEHOLDER_VALUE]. Seeding never
//! looks at the remote store, so the same environments always yield the same declarations.
use crate::parameter::{Category, Environments, ParameterPath};
use crate::stack::{logical_id, DuplicateDeclaration, Stack, StringParameter};

pub const STACK_NAME: &str = "Gen3SSMParameters";
pub const PLACEHOLDER_VALUE: &str = "0";

/// Seeded stack together with the paths it covers
#[derive(Debug, Clone)]
pub struct BlankParameters {
    stack: Stack,
    paths: Vec<ParameterPath>,
}

impl BlankParameters {
    pub fn declare(environments: &Environments) -> Result<Self, DuplicateDeclaration> {
        let mut blank = Self {
            stack: Stack::new(STACK_NAME),
            paths: vec![],
        };

        for environment in environments.iter() {
            blank.seed(
                format!("IamRolesConfigParam-{environment}"),
                ParameterPath::of(environment, Category::Roles),
            )?;
            blank.seed(
                format!("ClusterConfigParam-{environment}"),
                ParameterPath::of(environment, Category::Cluster),
            )?;
        }

        blank.seed("ConfigParam".to_string(), ParameterPath::global())?;

        tracing::info!(count = blank.paths.len(), "seeded blank parameters");
        Ok(blank)
    }

    fn seed(&mut self, id: String, path: ParameterPath) -> Result<(), DuplicateDeclaration> {
        self.stack.declare(
            logical_id(&[&id]),
            StringParameter::new(path.clone(), PLACEHOLDER_VALUE.to_string()),
        )?;
        self.paths.push(path);
        Ok(())
    }

    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    pub fn into_stack(self) -> Stack {
        self.stack
    }

    /// Seeded paths in declaration order
    pub fn paths(&self) -> &[ParameterPath] {
        &self.paths
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::stack::Declaration;
    use pretty_assertions::assert_eq;

    fn environments() -> Environments {
        Environments::new(["test", "staging"]).unwrap()
    }

    #[test]
    fn seeds_every_path() {
        let blank = BlankParameters::declare(&environments()).unwrap();

        let paths: Vec<_> = blank.paths().iter().map(ParameterPath::as_str).collect();
        assert_eq!(
            paths,
            vec![
                "/gen3/test/iamRolesConfig",
                "/gen3/test/cluster-config",
                "/gen3/staging/iamRolesConfig",
                "/gen3/staging/cluster-config",
                "/gen3/config",
            ]
        );

        for (_id, declaration) in blank.stack().declarations() {
            let Declaration::StringParameter(parameter) = declaration else {
                panic!("unexpected declaration {declaration:?}");
            };
            assert_eq!(parameter.value, PLACEHOLDER_VALUE);
        }
        assert_eq!(blank.stack().len(), 5);
        assert!(blank.stack().get("IamRolesConfigParamstaging").is_some());
        assert!(blank.stack().get("ConfigParam").is_some());
    }

    #[test]
    fn seeding_is_idempotent() {
        let first = BlankParameters::declare(&environments()).unwrap();
        let second = BlankParameters::declare(&environments()).unwrap();

        assert_eq!(first.paths(), second.paths());
        assert_eq!(
            first.stack().declarations().collect::<Vec<_>>(),
            second.stack().declarations().collect::<Vec<_>>()
        );
    }

    #[test]
    fn colliding_environment_names() {
        let environments = Environments::new(["ci-test", "ci_test"]).unwrap();
        let err = BlankParameters::declare(&environments).unwrap_err();
        assert_eq!(err.id, "IamRolesConfigParamcitest");
    }
}
