//! gen3-config cli interface

use clap::{Parser, Subcommand, ValueEnum};
use gen3_config::parameter::Category;
use std::fmt::Formatter;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Change the work directory
    ///
    /// Can be specified multiple times. Note that all
    /// paths on the way to the final path must exist.
    ///
    /// This is equivalent to running { cd <directory>; gen3-config ... }
    #[clap(short = 'C', long = "directory", global(true))]
    pub directory: Vec<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Declare parameters, event routing and credentials
    ///
    /// Prints the synthesized stacks
    Synth(SynthCommand),

    /// Print the create/update decision for every parameter
    Plan(SynthCommand),

    /// Print debug information for development
    Dev(DevCommand),
}

#[derive(Parser, Debug)]
pub struct SynthCommand {
    #[clap(flatten)]
    pub input: InputArgs,

    #[clap(flatten)]
    pub store: StoreArgs,

    /// Name of the shared event bus
    #[clap(long = "event-bus-name", default_value = gen3_config::distribute::DEFAULT_EVENT_BUS_NAME)]
    pub event_bus_name: String,

    /// Declare forwarding rules in disabled state
    #[clap(long = "disable-event-rules")]
    pub disable_event_rules: bool,

    #[clap(flatten)]
    pub output: OutputArgs,
}

#[derive(Parser, Debug)]
pub struct InputArgs {
    /// Environments to deploy or update, comma separated
    #[clap(short = 'e', long = "environments", value_delimiter = ',', required = true)]
    pub environments: Vec<String>,

    /// Categories allowed to overwrite existing parameters, comma separated
    #[clap(short = 'u', long = "update", value_delimiter = ',')]
    pub update: Vec<Category>,

    /// Directory containing config.json, iamRolesConfig.yaml and clusterConfig.yaml
    #[clap(short = 'c', long = "config-dir", default_value = ".secrets/config")]
    pub config_dir: PathBuf,
}

#[derive(Parser, Debug)]
pub struct StoreArgs {
    /// Use parameters from a json or yaml file (path -> value) instead of the parameter store
    #[clap(long = "existing-parameters")]
    pub existing_parameters: Option<PathBuf>,

    /// Region of the parameter store
    #[clap(long = "region", conflicts_with("existing_parameters"))]
    pub region: Option<String>,
}

#[derive(Parser, Debug)]
pub struct OutputArgs {
    #[arg(short = 'F', long = "output-format", default_value_t)]
    pub format: OutputFormat,
}

#[derive(ValueEnum, Clone, Default, Debug)]
pub enum OutputFormat {
    Json,
    #[default]
    Yaml,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => f.write_str("json"),
            OutputFormat::Yaml => f.write_str("yaml"),
        }
    }
}

#[derive(Parser, Debug)]
pub struct DevCommand {
    #[command(subcommand)]
    pub command: DevSubCommand,
}

#[derive(Subcommand, Debug)]
pub enum DevSubCommand {
    /// Print the loaded configuration documents
    Documents {
        #[clap(short = 'c', long = "config-dir", default_value = ".secrets/config")]
        config_dir: PathBuf,
    },
}
