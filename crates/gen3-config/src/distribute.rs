//! config distribution and event routing
//!
//! For the global config and for the roles and cluster documents of each environment, [ConfigDistribution] applies
//! [decide] against the [ExistenceSnapshot] and declares a put-parameter action for every `Apply`.
//!
//! It then declares one event bus and, per environment, one forwarding rule for each per-environment parameter. The
//! rules forward `Parameter Store Change` notifications to the environment's own bus in its account and region.
//! The global `/gen3/config` path never gets a rule.
use crate::config::ConfigDocuments;
use crate::decision::{decide, Decision, Existence};
use crate::parameter::{Category, Environments, ParameterPath, UpdateFlagSet};
use crate::stack::{logical_id, DuplicateDeclaration, EventBus, ForwardingRule, PutParameter, Stack};
use crate::store::ExistenceSnapshot;
use serde::Serialize;

pub const STACK_NAME: &str = "Gen3CdkConfigStack";
pub const DEFAULT_EVENT_BUS_NAME: &str = "gen3Config";
const EVENT_BUS_ID: &str = "Gen3ConfigEventBus";

#[derive(Debug, Clone)]
pub struct DistributionOptions {
    pub update: UpdateFlagSet,
    pub event_bus_name: String,
    pub event_rules_enabled: bool,
}

impl Default for DistributionOptions {
    fn default() -> Self {
        Self {
            update: UpdateFlagSet::none(),
            event_bus_name: DEFAULT_EVENT_BUS_NAME.to_string(),
            event_rules_enabled: true,
        }
    }
}

/// Outcome of the decision rule for one path
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct PlannedParameter {
    pub path: ParameterPath,
    pub category: Category,
    pub existence: Existence,
    pub decision: Decision,
}

/// The config stack under construction
///
/// Declarations made before a failing step stay in the stack.
#[derive(Debug, Clone)]
pub struct ConfigDistribution {
    stack: Stack,
    plan: Vec<PlannedParameter>,
}

impl Default for ConfigDistribution {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigDistribution {
    pub fn new() -> Self {
        Self {
            stack: Stack::new(STACK_NAME),
            plan: vec![],
        }
    }

    pub fn declare(
        &mut self,
        documents: &ConfigDocuments,
        environments: &Environments,
        options: &DistributionOptions,
        snapshot: &ExistenceSnapshot,
    ) -> Result<(), DistributeError> {
        let global = serde_json::to_string(&documents.global)?;
        self.distribute(
            ParameterPath::global(),
            Category::Config,
            "",
            global,
            options,
            snapshot,
        )?;

        for environment in environments.iter() {
            let roles = serde_json::to_string(&documents.iam_roles.services.get(environment))?;
            self.distribute(
                ParameterPath::of(environment, Category::Roles),
                Category::Roles,
                environment,
                roles,
                options,
                snapshot,
            )?;
        }

        for environment in environments.iter() {
            let cluster = serde_json::to_string(&documents.clusters.clusters.get(environment))?;
            self.distribute(
                ParameterPath::of(environment, Category::Cluster),
                Category::Cluster,
                environment,
                cluster,
                options,
                snapshot,
            )?;
        }

        self.stack
            .declare(EVENT_BUS_ID, EventBus::new(options.event_bus_name.clone()))?;

        for environment in environments.iter() {
            let Some(descriptor) = documents.environment(environment) else {
                tracing::error!(environment, "environment missing from global config");
                return Err(DistributeError::MissingEnvironment(environment.to_string()));
            };

            let target_arn = format!(
                "arn:aws:events:{}:{}:event-bus/{environment}-gen3-config-eventbus",
                descriptor.aws.region, descriptor.aws.account
            );

            for category in [Category::Cluster, Category::Roles] {
                let parameter = category.parameter_name();

                self.stack.declare(
                    logical_id(&[&format!("{parameter}-{environment}-forwardingRule")]),
                    ForwardingRule::new(
                        EVENT_BUS_ID.to_string(),
                        options.event_rules_enabled,
                        ParameterPath::of(environment, category),
                        target_arn.clone(),
                    ),
                )?;
            }

            tracing::info!(environment, "declared forwarding rules");
        }

        Ok(())
    }

    fn distribute(
        &mut self,
        path: ParameterPath,
        category: Category,
        environment: &str,
        value: String,
        options: &DistributionOptions,
        snapshot: &ExistenceSnapshot,
    ) -> Result<(), DistributeError> {
        let Some(existence) = snapshot.existence(&path) else {
            return Err(DistributeError::NotSeeded(path));
        };

        let decision = decide(existence, options.update.contains(category));
        match decision {
            Decision::Skip => {
                tracing::info!(%path, %category, "skipping parameter deployment");
            }
            Decision::Apply { overwrite } => {
                tracing::info!(
                    %path,
                    %category,
                    value = %value,
                    "{} parameter",
                    if overwrite { "updating" } else { "creating" }
                );
                self.stack.declare(
                    logical_id(&[category.declaration_prefix(), "SSM", path.as_str(), environment]),
                    PutParameter::new(path.clone(), value, overwrite),
                )?;
            }
        }

        self.plan.push(PlannedParameter {
            path,
            category,
            existence,
            decision,
        });

        Ok(())
    }

    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    pub fn plan(&self) -> &[PlannedParameter] {
        &self.plan
    }

    pub fn into_parts(self) -> (Stack, Vec<PlannedParameter>) {
        (self.stack, self.plan)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum DistributeError {
    #[error("Environment {0} is not defined in the global config")]
    MissingEnvironment(String),
    #[error("Parameter {0} was not seeded before distribution")]
    NotSeeded(ParameterPath),
    #[error(transparent)]
    Duplicate(#[from] DuplicateDeclaration),
    #[error("Unable to serialize parameter value")]
    Serialize(#[from] serde_json::Error),
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::test::documents;
    use crate::seed::BlankParameters;
    use crate::stack::Declaration;
    use crate::store::StaticParameterStore;
    use pretty_assertions::assert_eq;

    async fn snapshot(environments: &Environments, store: &StaticParameterStore) -> ExistenceSnapshot {
        let seeded = BlankParameters::declare(environments).unwrap();
        ExistenceSnapshot::probe(store, &seeded).await.unwrap()
    }

    fn all_seeded(environments: &Environments) -> StaticParameterStore {
        let seeded = BlankParameters::declare(environments).unwrap();
        seeded
            .paths()
            .iter()
            .map(|path| (path.to_string(), "0"))
            .collect()
    }

    fn puts(stack: &Stack) -> Vec<&PutParameter> {
        stack
            .declarations()
            .filter_map(|(_, declaration)| match declaration {
                Declaration::PutParameter(put) => Some(put),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn update_roles_only_overwrites_roles() {
        let environments = Environments::new(["uat"]).unwrap();
        let snapshot = snapshot(&environments, &all_seeded(&environments)).await;
        let options = DistributionOptions {
            update: [Category::Roles].into_iter().collect(),
            ..Default::default()
        };

        let mut distribution = ConfigDistribution::new();
        distribution
            .declare(&documents(), &environments, &options, &snapshot)
            .unwrap();

        let decisions: Vec<_> = distribution
            .plan()
            .iter()
            .map(|planned| (planned.path.as_str(), planned.decision))
            .collect();
        assert_eq!(
            decisions,
            vec![
                ("/gen3/config", Decision::Skip),
                ("/gen3/uat/iamRolesConfig", Decision::Apply { overwrite: true }),
                ("/gen3/uat/cluster-config", Decision::Skip),
            ]
        );

        let puts = puts(distribution.stack());
        assert_eq!(puts.len(), 1);
        assert_eq!(puts[0].path.as_str(), "/gen3/uat/iamRolesConfig");
        assert!(puts[0].overwrite);
        assert_eq!(
            puts[0].value,
            r#"{"fence":[{"serviceName":"fence","policies":["s3-read","sqs-send"]}]}"#
        );
        assert!(distribution
            .stack()
            .get("iamRolesSSMgen3uatiamRolesConfiguat")
            .is_some());
    }

    #[tokio::test]
    async fn absent_paths_are_created() {
        let environments = Environments::new(["test"]).unwrap();
        let snapshot = snapshot(&environments, &StaticParameterStore::default()).await;

        let mut distribution = ConfigDistribution::new();
        distribution
            .declare(&documents(), &environments, &Default::default(), &snapshot)
            .unwrap();

        let puts = puts(distribution.stack());
        assert_eq!(puts.len(), 3);
        assert!(puts.iter().all(|put| !put.overwrite));

        // `test` has neither roles nor cluster sizing
        assert_eq!(puts[1].value, "null");
        assert_eq!(puts[2].value, "null");
        assert!(puts[0].value.starts_with(r#"{"test":{"name":"test","clusterName":"test-cluster""#));
    }

    #[tokio::test]
    async fn forwarding_rules_per_environment() {
        let environments = Environments::new(["test", "uat"]).unwrap();
        let snapshot = snapshot(&environments, &all_seeded(&environments)).await;

        let mut distribution = ConfigDistribution::new();
        distribution
            .declare(&documents(), &environments, &Default::default(), &snapshot)
            .unwrap();

        let rules: Vec<_> = distribution
            .stack()
            .declarations()
            .filter_map(|(id, declaration)| match declaration {
                Declaration::ForwardingRule(rule) => Some((id, rule)),
                _ => None,
            })
            .collect();

        let ids: Vec<_> = rules.iter().map(|(id, _)| *id).collect();
        assert_eq!(
            ids,
            vec![
                "clusterconfigtestforwardingRule",
                "iamRolesConfigtestforwardingRule",
                "clusterconfiguatforwardingRule",
                "iamRolesConfiguatforwardingRule",
            ]
        );

        let (_, uat_roles) = rules[3];
        assert_eq!(uat_roles.parameter.as_str(), "/gen3/uat/iamRolesConfig");
        assert_eq!(
            uat_roles.target_arn,
            "arn:aws:events:us-west-2:222222222222:event-bus/uat-gen3-config-eventbus"
        );
        assert!(uat_roles.enabled);
        assert!(rules
            .iter()
            .all(|(_, rule)| rule.parameter != ParameterPath::global()));

        assert_eq!(
            distribution.stack().get("Gen3ConfigEventBus"),
            Some(&Declaration::EventBus(EventBus::new("gen3Config".into())))
        );
    }

    #[tokio::test]
    async fn missing_environment_fails_after_parameters() {
        let environments = Environments::new(["test", "ci_test"]).unwrap();
        let snapshot = snapshot(&environments, &StaticParameterStore::default()).await;

        let mut distribution = ConfigDistribution::new();
        let err = distribution
            .declare(&documents(), &environments, &Default::default(), &snapshot)
            .unwrap_err();

        assert!(matches!(&err, DistributeError::MissingEnvironment(name) if name == "ci_test"));
        assert!(err.to_string().contains("ci_test"));

        let stack = distribution.stack();
        assert!(stack
            .get("iamRolesSSMgen3citestiamRolesConfigcitest")
            .is_some());
        assert!(stack
            .get("clusterConfigSSMgen3citestclusterconfigcitest")
            .is_some());
        assert!(stack.get("clusterconfigtestforwardingRule").is_some());
        assert!(stack.get("clusterconfigcitestforwardingRule").is_none());
        assert!(stack.get("iamRolesConfigcitestforwardingRule").is_none());
    }

    #[tokio::test]
    async fn unseeded_paths_are_rejected() {
        let seeded = Environments::new(["test"]).unwrap();
        let snapshot = snapshot(&seeded, &StaticParameterStore::default()).await;

        let requested = Environments::new(["test", "uat"]).unwrap();
        let err = ConfigDistribution::new()
            .declare(&documents(), &requested, &Default::default(), &snapshot)
            .unwrap_err();

        assert!(
            matches!(err, DistributeError::NotSeeded(path) if path == ParameterPath::of("uat", Category::Roles))
        );
    }

    #[tokio::test]
    async fn disabled_rules() {
        let environments = Environments::new(["uat"]).unwrap();
        let snapshot = snapshot(&environments, &all_seeded(&environments)).await;
        let options = DistributionOptions {
            event_rules_enabled: false,
            event_bus_name: "custom".into(),
            ..Default::default()
        };

        let mut distribution = ConfigDistribution::new();
        distribution
            .declare(&documents(), &environments, &options, &snapshot)
            .unwrap();

        let Some(Declaration::ForwardingRule(rule)) =
            distribution.stack().get("iamRolesConfiguatforwardingRule")
        else {
            panic!("rule must be declared");
        };
        assert!(!rule.enabled);
        assert_eq!(
            distribution.stack().get("Gen3ConfigEventBus"),
            Some(&Declaration::EventBus(EventBus::new("custom".into())))
        );
    }
}
