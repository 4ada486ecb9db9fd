use clap::{Args, Subcommand};

use super::OutputFormat;
use amata::config::{Config, ConfigSource, ConfigValue};

#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show current configuration values
    Show {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

fn print_value<T: std::fmt::Display>(name: &str, value: &ConfigValue<T>) {
    println!("{}: {}", name, value.value);
    println!("  source: {}", value.source);
    println!();
}

impl ConfigCommand {
    pub fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            ConfigSubcommand::Show { format } => {
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(config)?);
                    }
                    OutputFormat::Text => {
                        println!("Configuration");
                        println!("=============\n");

                        if let Some(path) = &config.config_file {
                            println!("Config file: {}", path.display());
                        } else {
                            println!(
                                "Config file: {} (not found)",
                                Config::default_config_path().display()
                            );
                        }
                        println!();

                        let database_path = ConfigValue::new(
                            config.database_path.value.display(),
                            config.database_path.source,
                        );
                        print_value("database_path", &database_path);
                        print_value("port", &config.port);
                        print_value("env", &config.env);
                        print_value("created_by", &config.created_by);

                        if config.env.source == ConfigSource::Default {
                            println!("(set AMATA_ENV to record a different environment)");
                        }
                    }
                }
                Ok(())
            }
        }
    }
}
