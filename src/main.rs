use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use amata::config::Config;
use amata::db::{init_db, Collection};
use amata::services::{DietService, ProgramService, WorkoutService};
use commands::{ConfigCommand, DietCommand, ImportCommand, ProgramCommand, WorkoutCommand};

#[derive(Parser)]
#[command(name = "amata")]
#[command(version)]
#[command(about = "Admin CLI for diets, programs and workouts", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage diet plans
    Diet(DietCommand),

    /// Browse training programs
    Program(ProgramCommand),

    /// Browse workouts and update their stats
    Workout(WorkoutCommand),

    /// Seed collections from JSON exports
    Import(ImportCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "amata=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config)?;

    match cli.command {
        Some(Commands::Diet(cmd)) => {
            let pool = init_db(&config.database_path.value).await?;
            let service = DietService::new(Collection::new(pool), config.audit());
            cmd.run(&service).await?;
        }
        Some(Commands::Program(cmd)) => {
            let pool = init_db(&config.database_path.value).await?;
            cmd.run(&ProgramService::new(Collection::new(pool))).await?;
        }
        Some(Commands::Workout(cmd)) => {
            let pool = init_db(&config.database_path.value).await?;
            cmd.run(&WorkoutService::new(Collection::new(pool))).await?;
        }
        Some(Commands::Import(cmd)) => {
            let pool = init_db(&config.database_path.value).await?;
            cmd.run(&Collection::new(pool.clone()), &Collection::new(pool))
                .await?;
        }
        Some(Commands::Config(cmd)) => {
            cmd.run(&config)?;
        }
        None => {
            println!("Use --help to see available commands");
        }
    }

    Ok(())
}
