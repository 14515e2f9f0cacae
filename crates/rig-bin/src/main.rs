//! CLI Entry Point for rig
//!
//! `rigd` is the composition root: it loads settings, installs tracing,
//! links the driver crates into a [`DriverLibrary`], builds the
//! [`HardwareContext`] once, and answers read-only introspection commands.
//!
//! # Usage
//!
//! ```bash
//! rigd check
//! rigd plugins --interface DimmerPluginInterface
//! rigd operations dimmer
//! rigd params SimSerial
//! rigd --config /etc/rig/rig.toml check
//! ```
//!
//! Results are printed to stdout as JSON; logs go to stderr.

mod tracing_setup;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rig_core::driver::DriverLibrary;
use rig_hardware::config::DEFAULT_CONFIG_PATH;
use rig_hardware::{HardwareContext, PluginSummary, RigSettings};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "rigd")]
#[command(about = "Capability-based equipment control daemon", long_about = None)]
struct Cli {
    /// Settings file (TOML); RIG_* environment variables override it
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the plugin tree and report what was registered
    Check,

    /// List registered plugins
    Plugins {
        /// Only plugins bound to this capability interface
        #[arg(long)]
        interface: Option<String>,
    },

    /// Show the operation schema of an actuator category
    Operations {
        /// Actuator category, e.g. `dimmer`
        category: String,
    },

    /// Show the configuration parameters of a plugin class
    Params {
        /// Plugin class name
        class_name: String,
    },
}

/// Every driver crate linked into this binary.
fn driver_library() -> Result<DriverLibrary> {
    let mut library = DriverLibrary::new();
    rig_driver_mock::register_all(&mut library)?;
    Ok(library)
}

fn check(context: &HardwareContext) -> Value {
    let by_interface: serde_json::Map<String, Value> = context
        .interface_names()
        .into_iter()
        .map(|name| (name.to_string(), json!(context.plugin_names_by_interface(name))))
        .collect();
    let categories: Vec<_> = context
        .actuators()
        .categories()
        .iter()
        .map(|c| {
            json!({
                "name": c.name,
                "shape": c.shape.as_str(),
                "required_interface": c.required_interface.name,
            })
        })
        .collect();

    json!({
        "plugins": context.plugins().len(),
        "interfaces": by_interface,
        "categories": categories,
    })
}

fn plugins(context: &HardwareContext, interface: Option<&str>) -> Value {
    let summaries: Vec<PluginSummary> = match interface {
        Some(name) => context
            .plugins()
            .get_plugins_by_interface(name)
            .iter()
            .map(|p| p.summary())
            .collect(),
        None => context.plugins().plugins().iter().map(|p| p.summary()).collect(),
    };
    json!(summaries)
}

fn operations(context: &HardwareContext, category: &str) -> Result<Value> {
    Ok(json!(context.list_operations(category)?))
}

fn params(context: &HardwareContext, class_name: &str) -> Result<Value> {
    Ok(json!(context.plugin_configuration_params(class_name)?))
}

fn run(cli: Cli, context: &HardwareContext) -> Result<Value> {
    match cli.command {
        Commands::Check => Ok(check(context)),
        Commands::Plugins { interface } => Ok(plugins(context, interface.as_deref())),
        Commands::Operations { category } => operations(context, &category),
        Commands::Params { class_name } => params(context, &class_name),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = RigSettings::load_from(&cli.config)
        .with_context(|| format!("loading settings from {}", cli.config.display()))?;
    settings.validate()?;
    tracing_setup::init_from_settings(&settings)?;

    tracing::info!(
        name = %settings.application.name,
        config = %cli.config.display(),
        plugin_root = %settings.plugins.root.display(),
        "rigd starting"
    );

    let library = driver_library()?;
    let context = HardwareContext::initialize(&settings.plugins, &library)?;

    let output = run(cli, &context)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rig_hardware::config::PluginSettings;

    const UNIT: &str = "unit: bench\nexports:\n  - class_name: SimSerial\n    symbol: mock.serial_channel\n  - class_name: SimDimmer\n    symbol: mock.dimmer\n";

    fn context() -> (tempfile::TempDir, HardwareContext) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bench.yaml"), UNIT).unwrap();
        let settings = PluginSettings {
            root: dir.path().to_path_buf(),
            ..PluginSettings::default()
        };
        let context = HardwareContext::initialize(&settings, &driver_library().unwrap()).unwrap();
        (dir, context)
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from(["rigd", "--config", "x.toml", "plugins", "--interface", "I"])
            .unwrap();
        assert_eq!(cli.config, PathBuf::from("x.toml"));
        assert!(matches!(cli.command, Commands::Plugins { interface: Some(ref i) } if i == "I"));

        let cli = Cli::try_parse_from(["rigd", "check"]).unwrap();
        assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG_PATH));
    }

    #[test]
    fn test_check_reports_counts() {
        let (_dir, ctx) = context();
        let report = check(&ctx);
        assert_eq!(report["plugins"], 2);
        assert_eq!(report["interfaces"]["DimmerPluginInterface"], json!(["SimDimmer"]));
        assert_eq!(report["categories"][0]["name"], "switch");
    }

    #[test]
    fn test_plugins_filter() {
        let (_dir, ctx) = context();
        let all = plugins(&ctx, None);
        assert_eq!(all.as_array().unwrap().len(), 2);
        let channels = plugins(&ctx, Some("ChannelPluginInterface"));
        assert_eq!(channels[0]["class_name"], "SimSerial");
        assert_eq!(plugins(&ctx, Some("Nope")), json!([]));
    }

    #[test]
    fn test_operations_and_params() {
        let (_dir, ctx) = context();
        let ops = operations(&ctx, "dimmer").unwrap();
        assert_eq!(ops["set_level"][0]["name"], "level");
        assert_eq!(ops["set_level"][0]["type"], "int");
        assert!(operations(&ctx, "heater").is_err());

        let params = params(&ctx, "SimSerial").unwrap();
        assert!(params["port"].is_string());
        assert!(params["baud_rate"].is_string());
        assert!(super::params(&ctx, "Missing").is_err());
    }
}
