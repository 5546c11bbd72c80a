//! declared resources and their rendering
//!
//! A [Stack] is an ordered collection of [Declaration]s keyed by logical id. Rendering a stack produces a
//! CloudFormation shaped document:
//!
//! ```yaml
//! name: Gen3SSMParameters
//! dependencies: []
//! template:
//!   Resources:
//!     ConfigParam:
//!       Type: AWS::SSM::Parameter
//!       Properties:
//!         Name: /gen3/config
//!         Type: String
//!         Value: '0'
//! ```
//!
//! Stacks only describe intent. Nothing here talks to a remote service.
use crate::parameter::ParameterPath;
use indexmap::IndexMap;
use serde::{
    ser::{SerializeMap, SerializeStruct},
    Serializer,
};
use serde_json::json;

/// Placeholder parameter with a fixed value
#[derive(Debug, Clone, PartialEq, derive_new::new)]
pub struct StringParameter {
    pub path: ParameterPath,
    pub value: String,
}

/// Custom resource that writes `value` to `path` when the stack is applied
#[derive(Debug, Clone, PartialEq, derive_new::new)]
pub struct PutParameter {
    pub path: ParameterPath,
    pub value: String,
    pub overwrite: bool,
}

#[derive(Debug, Clone, PartialEq, derive_new::new)]
pub struct EventBus {
    pub name: String,
}

/// Rule on a bus of the same stack forwarding parameter change notifications to another bus
#[derive(Debug, Clone, PartialEq, derive_new::new)]
pub struct ForwardingRule {
    /// logical id of the bus the rule is attached to
    pub event_bus: String,
    pub enabled: bool,
    /// the parameter whose change notifications are matched
    pub parameter: ParameterPath,
    pub target_arn: String,
}

#[derive(Debug, Clone, PartialEq, derive_new::new)]
pub struct Secret {
    pub name: String,
}

/// All declarable resource kinds
#[derive(Debug, Clone, PartialEq)]
pub enum Declaration {
    StringParameter(StringParameter),
    PutParameter(PutParameter),
    EventBus(EventBus),
    ForwardingRule(ForwardingRule),
    Secret(Secret),
}

impl Declaration {
    pub fn resource_type(&self) -> &'static str {
        match self {
            Declaration::StringParameter(_) => "AWS::SSM::Parameter",
            Declaration::PutParameter(_) => "Custom::AWS",
            Declaration::EventBus(_) => "AWS::Events::EventBus",
            Declaration::ForwardingRule(_) => "AWS::Events::Rule",
            Declaration::Secret(_) => "AWS::SecretsManager::Secret",
        }
    }

    pub fn properties(&self) -> serde_json::Value {
        match self {
            Declaration::StringParameter(parameter) => json!({
                "Name": parameter.path,
                "Type": "String",
                "Value": parameter.value,
            }),
            Declaration::PutParameter(put) => {
                let call = json!({
                    "service": "SSM",
                    "action": "putParameter",
                    "parameters": {
                        "Name": put.path,
                        "Value": put.value,
                        "Type": "String",
                        "Overwrite": put.overwrite,
                    },
                    "physicalResourceId": { "id": put.path },
                });
                let resource = format!(
                    "arn:aws:ssm:${{AWS::Region}}:${{AWS::AccountId}}:parameter{}",
                    put.path
                );
                json!({
                    "Create": call,
                    "Update": call,
                    "Policy": {
                        "Version": "2012-10-17",
                        "Statement": [{
                            "Action": ["ssm:PutParameter", "ssm:GetParameter"],
                            "Effect": "Allow",
                            "Resource": { "Fn::Sub": resource },
                        }],
                    },
                })
            }
            Declaration::EventBus(bus) => json!({ "Name": bus.name }),
            Declaration::ForwardingRule(rule) => {
                let state = if rule.enabled { "ENABLED" } else { "DISABLED" };
                json!({
                    "EventBusName": { "Ref": rule.event_bus },
                    "State": state,
                    "EventPattern": {
                        "source": ["aws.ssm"],
                        "detail-type": ["Parameter Store Change"],
                        "detail": { "name": [rule.parameter] },
                    },
                    "Targets": [{ "Arn": rule.target_arn, "Id": "Target0" }],
                })
            }
            Declaration::Secret(secret) => json!({ "Name": secret.name }),
        }
    }
}

macro_rules! declaration_from {
    ($($kind:ident),+) => {
        $(
            impl From<$kind> for Declaration {
                fn from(value: $kind) -> Self {
                    Declaration::$kind(value)
                }
            }
        )+
    };
}

declaration_from!(StringParameter, PutParameter, EventBus, ForwardingRule, Secret);

impl serde::ser::Serialize for Declaration {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut ser = serializer.serialize_map(Some(2))?;
        ser.serialize_entry("Type", self.resource_type())?;
        ser.serialize_entry("Properties", &self.properties())?;
        ser.end()
    }
}

/// Named unit of declarations, deployed as a whole by the external engine
#[derive(Debug, Clone)]
pub struct Stack {
    name: String,
    dependencies: Vec<String>,
    declarations: IndexMap<String, Declaration>,
}

impl Stack {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dependencies: vec![],
            declarations: Default::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stacks that must be deployed before this one
    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    pub fn add_dependency(&mut self, other: &Stack) {
        if !self.dependencies.iter().any(|name| name == other.name()) {
            self.dependencies.push(other.name.clone());
        }
    }

    /// Adds a declaration under `id`
    ///
    /// Declarations are never replaced: a second declaration with the same id is rejected.
    pub fn declare(
        &mut self,
        id: impl Into<String>,
        declaration: impl Into<Declaration>,
    ) -> Result<(), DuplicateDeclaration> {
        let id = id.into();
        if self.declarations.contains_key(&id) {
            tracing::debug!(stack = %self.name, id = %id, "collision");
            return Err(DuplicateDeclaration {
                stack: self.name.clone(),
                id,
            });
        }

        let declaration = declaration.into();
        tracing::trace!(stack = %self.name, id = %id, kind = declaration.resource_type(), "declared");
        self.declarations.insert(id, declaration);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Declaration> {
        self.declarations.get(id)
    }

    pub fn declarations(&self) -> impl Iterator<Item = (&str, &Declaration)> {
        self.declarations
            .iter()
            .map(|(id, declaration)| (id.as_str(), declaration))
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }
}

struct Template<'a>(&'a IndexMap<String, Declaration>);

impl serde::ser::Serialize for Template<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut ser = serializer.serialize_map(Some(1))?;
        ser.serialize_entry("Resources", self.0)?;
        ser.end()
    }
}

impl serde::ser::Serialize for Stack {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut ser = serializer.serialize_struct("Stack", 3)?;
        ser.serialize_field("name", &self.name)?;
        ser.serialize_field("dependencies", &self.dependencies)?;
        ser.serialize_field("template", &Template(&self.declarations))?;
        ser.end()
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
#[error("Duplicate declaration {id} in stack {stack}")]
pub struct DuplicateDeclaration {
    pub stack: String,
    pub id: String,
}

/// Builds a logical id from `parts`, keeping ascii alphanumerics only
pub fn logical_id(parts: &[&str]) -> String {
    parts
        .iter()
        .flat_map(|part| part.chars())
        .filter(char::is_ascii_alphanumeric)
        .collect()
}
