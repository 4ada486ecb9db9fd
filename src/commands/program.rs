use clap::{Args, Subcommand};

use super::{print_footer, truncate, OutputFormat};
use amata::services::{ListProgramsQuery, Pagination, ProgramService};

#[derive(Args)]
pub struct ProgramCommand {
    #[command(subcommand)]
    pub command: ProgramSubcommand,
}

#[derive(Subcommand)]
pub enum ProgramSubcommand {
    /// List programs
    List {
        /// Difficulty level
        #[arg(long)]
        difficulty: Option<String>,

        /// Minimum length in days
        #[arg(long)]
        min_duration: Option<f64>,

        /// Maximum length in days
        #[arg(long)]
        max_duration: Option<f64>,

        #[arg(long)]
        page: Option<u64>,

        #[arg(long)]
        limit: Option<u64>,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show a program's details
    Show {
        /// Store ID, program ID or slug
        identifier: String,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

impl ProgramCommand {
    pub async fn run(&self, service: &ProgramService) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            ProgramSubcommand::List {
                difficulty,
                min_duration,
                max_duration,
                page,
                limit,
                format,
            } => {
                let query = ListProgramsQuery {
                    pagination: Pagination {
                        page: *page,
                        limit: *limit,
                    },
                    difficulty_level: difficulty.clone(),
                    min_duration: *min_duration,
                    max_duration: *max_duration,
                };
                let result = service.list(&query).await?;

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&result)?);
                    }
                    OutputFormat::Text => {
                        if result.data.is_empty() {
                            println!("No programs found");
                            return Ok(());
                        }
                        println!("{:<30}  {:<30}  {:>5}  {:>8}", "SLUG", "TITLE", "DAYS", "WORKOUTS");
                        println!("{}", "-".repeat(80));
                        for program in &result.data {
                            println!(
                                "{:<30}  {:<30}  {:>5}  {:>8}",
                                truncate(&program.slug, 30),
                                truncate(&program.title, 30),
                                program.duration_days,
                                program.total_workouts
                            );
                        }
                        print_footer(result.total, result.page, result.limit, result.data.len(), "program");
                    }
                }
                Ok(())
            }

            ProgramSubcommand::Show { identifier, format } => {
                let program = service.find_one(identifier).await?;
                match format {
                    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&program)?),
                    OutputFormat::Text => println!("{}", program),
                }
                Ok(())
            }
        }
    }
}
