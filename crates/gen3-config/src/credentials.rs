//! admin credential placeholders for the continuous delivery tool
use crate::parameter::Environments;
use crate::stack::{logical_id, DuplicateDeclaration, Secret, Stack};

pub const STACK_NAME: &str = "Gen3EnvironmentCredentials";

pub fn secret_name(environment: &str) -> String {
    format!("argocdAdmin-{environment}")
}

/// One secret per environment, without a value
pub fn declare(environments: &Environments) -> Result<Stack, DuplicateDeclaration> {
    let mut stack = Stack::new(STACK_NAME);

    for environment in environments.iter() {
        let name = secret_name(environment);
        stack.declare(logical_id(&["ArgoCdCredentials", &name]), Secret::new(name))?;
    }

    Ok(stack)
}
