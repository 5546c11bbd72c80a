mod cli;

use gen3_config::config::ConfigDocuments;
use gen3_config::distribute::DistributionOptions;
use gen3_config::parameter::Environments;
use gen3_config::store::{ParameterStore, StaticParameterStore};
use serde::Serialize;

#[tokio::main]
async fn main() {
    use clap::Parser;
    let cli = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(tracing_subscriber::filter::LevelFilter::INFO.into())
                .with_env_var("GEN3_CONFIG_LOG")
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();

    for new_path in cli.directory.iter() {
        match new_path.canonicalize() {
            Err(e) => {
                eprintln!(
                    "Failed to resolve path for -C/--directory {}\n{}",
                    new_path.display(),
                    e
                );
                std::process::exit(1);
            }
            Ok(cwd) => {
                if let Err(err) = std::env::set_current_dir(&cwd) {
                    eprintln!("Failed to set work directory to {}\n{}", cwd.display(), err,);
                    std::process::exit(1);
                }

                tracing::info!(directory=%cwd.display(), "Changed working directory");
            }
        }
    }

    let command_result = match cli.command {
        cli::Command::Synth(synth_cli) => synth(synth_cli).await,
        cli::Command::Plan(plan_cli) => plan(plan_cli).await,
        cli::Command::Dev(dev_cli) => dev(dev_cli),
    };

    if let Err(e) = command_result {
        for error in e.chain() {
            eprintln!("{error}")
        }
        std::process::exit(1);
    }
}

pub async fn synth(cli: cli::SynthCommand) -> anyhow::Result<()> {
    let assembly = run(&cli).await?;
    output(&cli.output, &assembly)
}

pub async fn plan(cli: cli::SynthCommand) -> anyhow::Result<()> {
    let assembly = run(&cli).await?;
    output(&cli.output, &assembly.plan)
}

async fn run(cli: &cli::SynthCommand) -> anyhow::Result<gen3_config::assembly::Assembly> {
    let environments = Environments::new(&cli.input.environments)?;
    let documents = ConfigDocuments::load_directory(&cli.input.config_dir)?;

    let options = DistributionOptions {
        update: cli.input.update.iter().copied().collect(),
        event_bus_name: cli.event_bus_name.clone(),
        event_rules_enabled: !cli.disable_event_rules,
    };

    let store = store(&cli.store).await?;
    let assembly =
        gen3_config::assembly::synthesize(&documents, &environments, &options, store.as_ref())
            .await?;

    Ok(assembly)
}

async fn store(args: &cli::StoreArgs) -> anyhow::Result<Box<dyn ParameterStore>> {
    if let Some(path) = &args.existing_parameters {
        return Ok(Box::new(StaticParameterStore::load_file(path)?));
    }

    #[cfg(feature = "ssm")]
    return Ok(Box::new(
        gen3_config::store::ssm::SsmParameterStore::from_env(args.region.clone()).await,
    ));

    #[cfg(not(feature = "ssm"))]
    anyhow::bail!("Built without parameter store support, use --existing-parameters")
}

fn output<T: Serialize>(output: &cli::OutputArgs, value: &T) -> anyhow::Result<()> {
    match output.format {
        cli::OutputFormat::Yaml => serde_yaml::to_writer(std::io::stdout(), value)?,
        cli::OutputFormat::Json => serde_json::to_writer_pretty(std::io::stdout(), value)?,
    };

    Ok(())
}

/// (gen3-config-)developer utilities
///
/// A quick way to expose internal structures for debugging purposes
pub fn dev(cli: cli::DevCommand) -> anyhow::Result<()> {
    use cli::DevSubCommand::*;

    match cli.command {
        Documents { config_dir } => {
            let documents = ConfigDocuments::load_directory(&config_dir)?;
            serde_yaml::to_writer(std::io::stdout(), &documents)?;
        }
    }

    Ok(())
}
