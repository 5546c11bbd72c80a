//! # gen3-config - configuration distribution for gen3 environments
//!
//! ## Introduction for developers
//!
//! Read this to understand how `gen3-config` works internally.
//!
//! The tool never changes anything remotely. It reads configuration documents, asks the parameter store which paths
//! already hold a value and declares what a deployment engine should do. The output is a list of [stack::Stack]s.
//!
//! ### Loading documents
//!
//! see [config::ConfigDocuments::load_directory]
//!
//! Three documents are read from the config directory:
//!
//! | file                  | content                                      |
//! |-----------------------|----------------------------------------------|
//! | `config.json`         | environment name -> account, region, cluster |
//! | `iamRolesConfig.yaml` | `services` -> environment -> roles            |
//! | `clusterConfig.yaml`  | `clusters` -> environment -> node group size  |
//!
//! ### Seeding
//!
//! see [seed::BlankParameters]
//!
//! Every parameter path gets a placeholder declaration, so that the path exists before anything checks for it.
//!
//! | path                          | category  |
//! |-------------------------------|-----------|
//! | `/gen3/config`                | `config`  |
//! | `/gen3/{env}/iamRolesConfig`  | `roles`   |
//! | `/gen3/{env}/cluster-config`  | `cluster` |
//!
//! ### Probing
//!
//! see [store::ExistenceSnapshot::probe]
//!
//! Each seeded path is looked up once through a [store::ParameterStore]. A not-found answer means absent. Any other
//! error ends the run. The snapshot is the only input from the outside world the remaining steps see.
//!
//! ### Distribution
//!
//! see [distribute::ConfigDistribution]
//!
//! Per path, [decision::decide] turns existence and the operator's update flags into `Skip` or `Apply`:
//!
//! | exists | update flag | decision                     |
//! |--------|-------------|------------------------------|
//! | no     | any         | `Apply { overwrite: flag }`  |
//! | yes    | no          | `Skip`                       |
//! | yes    | yes         | `Apply { overwrite: true }`  |
//!
//! Afterwards an event bus and one forwarding rule per environment and per-environment parameter are declared.
//! Environments without a descriptor in `config.json` are an error at this point.
//!
//! ### Credentials
//!
//! see [credentials::declare]
//!
//! ### Output
//!
//! [assembly::synthesize] runs all of the above and returns the stacks, which serialize into CloudFormation shaped
//! templates via [serde].
//!
pub mod assembly;
pub mod config;
pub mod credentials;
pub mod decision;
pub mod distribute;
pub mod parameter;
pub mod seed;
pub mod stack;
pub mod store;
