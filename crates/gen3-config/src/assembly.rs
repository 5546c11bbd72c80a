//! one full declaration pass
//!
//! Runs the units in order:
//! 1. seed blank parameters
//! 2. probe the parameter store for every seeded path
//! 3. distribute config and declare event routing, depending on the seeded stack
//! 4. declare credential placeholders
use crate::config::ConfigDocuments;
use crate::distribute::{ConfigDistribution, DistributeError, DistributionOptions, PlannedParameter};
use crate::parameter::Environments;
use crate::seed::BlankParameters;
use crate::stack::{DuplicateDeclaration, Stack};
use crate::store::{ExistenceSnapshot, LookupError, ParameterStore};
use serde::Serialize;

/// Synthesized stacks in deployment order plus the decisions that shaped them
#[derive(Serialize, Debug, Clone)]
pub struct Assembly {
    pub stacks: Vec<Stack>,
    #[serde(skip)]
    pub plan: Vec<PlannedParameter>,
}

impl Assembly {
    pub fn stack(&self, name: &str) -> Option<&Stack> {
        self.stacks.iter().find(|stack| stack.name() == name)
    }
}

pub async fn synthesize<S>(
    documents: &ConfigDocuments,
    environments: &Environments,
    options: &DistributionOptions,
    store: &S,
) -> Result<Assembly, SynthError>
where
    S: ParameterStore + ?Sized,
{
    let seeded = BlankParameters::declare(environments)?;
    let snapshot = ExistenceSnapshot::probe(store, &seeded).await?;

    let mut distribution = ConfigDistribution::new();
    distribution.declare(documents, environments, options, &snapshot)?;
    let (mut config_stack, plan) = distribution.into_parts();
    config_stack.add_dependency(seeded.stack());

    let credentials = crate::credentials::declare(environments)?;

    Ok(Assembly {
        stacks: vec![seeded.into_stack(), config_stack, credentials],
        plan,
    })
}

#[derive(thiserror::Error, Debug)]
pub enum SynthError {
    #[error(transparent)]
    Lookup(#[from] LookupError),
    #[error(transparent)]
    Distribute(#[from] DistributeError),
    #[error(transparent)]
    Duplicate(#[from] DuplicateDeclaration),
}
