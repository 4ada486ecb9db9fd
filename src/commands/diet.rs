use clap::{Args, Subcommand};
use std::path::PathBuf;

use super::{print_footer, truncate, OutputFormat};
use amata::models::DietDay;
use amata::services::{CreateDiet, DietService, ListDietsQuery, Pagination};

#[derive(Args)]
pub struct DietCommand {
    #[command(subcommand)]
    pub command: DietSubcommand,
}

#[derive(Subcommand)]
pub enum DietSubcommand {
    /// List diets (public ones unless --org is given)
    List {
        /// Organization ID
        #[arg(long)]
        org: Option<String>,

        /// Branch ID
        #[arg(long)]
        branch: Option<String>,

        /// Difficulty level
        #[arg(long)]
        difficulty: Option<String>,

        /// Minimum calories per day
        #[arg(long)]
        min_calories: Option<f64>,

        /// Maximum calories per day
        #[arg(long)]
        max_calories: Option<f64>,

        #[arg(long)]
        page: Option<u64>,

        #[arg(long)]
        limit: Option<u64>,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show a diet's details
    Show {
        /// Diet ID (UUID)
        diet_id: String,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Create a new diet
    Create {
        /// Title of the diet
        title: String,

        /// Owning organization ID
        #[arg(long)]
        org: String,

        /// Branch ID
        #[arg(long)]
        branch: Option<String>,

        #[arg(long)]
        description: Option<String>,

        /// Explicit slug (derived from the title otherwise)
        #[arg(long)]
        slug: Option<String>,

        #[arg(long)]
        duration_days: Option<u32>,

        #[arg(long)]
        difficulty: Option<String>,

        #[arg(long)]
        goal: Option<String>,

        #[arg(long)]
        calories: Option<u32>,

        /// Tags (can be repeated)
        #[arg(long = "tag", value_name = "TAG")]
        tags: Vec<String>,

        /// Hide the diet from public listings
        #[arg(long)]
        private: bool,

        /// JSON file with the day-by-day meal plan
        #[arg(long, value_name = "FILE")]
        meals_file: Option<PathBuf>,
    },

    /// Check that a diet exists (nothing is deleted)
    Remove {
        /// Store ID of the diet
        id: String,
    },
}

impl DietCommand {
    pub async fn run(&self, service: &DietService) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            DietSubcommand::List {
                org,
                branch,
                difficulty,
                min_calories,
                max_calories,
                page,
                limit,
                format,
            } => {
                let query = ListDietsQuery {
                    pagination: Pagination {
                        page: *page,
                        limit: *limit,
                    },
                    org_id: org.clone(),
                    branch_id: branch.clone(),
                    difficulty_level: difficulty.clone(),
                    min_calories: *min_calories,
                    max_calories: *max_calories,
                };
                let result = service.list(&query).await?;

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&result)?);
                    }
                    OutputFormat::Text => {
                        if result.data.is_empty() {
                            println!("No diets found");
                            return Ok(());
                        }
                        println!("{:<36}  {:<30}  {:>8}  STATUS", "DIET ID", "TITLE", "KCAL");
                        println!("{}", "-".repeat(90));
                        for diet in &result.data {
                            println!(
                                "{:<36}  {:<30}  {:>8}  {}",
                                diet.diet_id,
                                truncate(&diet.title, 30),
                                diet.calories_per_day,
                                diet.status
                            );
                        }
                        print_footer(result.total, result.page, result.limit, result.data.len(), "diet");
                    }
                }
                Ok(())
            }

            DietSubcommand::Show { diet_id, format } => {
                let diet = service.find_one(diet_id).await?;
                match format {
                    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&diet)?),
                    OutputFormat::Text => println!("{}", diet),
                }
                Ok(())
            }

            DietSubcommand::Create {
                title,
                org,
                branch,
                description,
                slug,
                duration_days,
                difficulty,
                goal,
                calories,
                tags,
                private,
                meals_file,
            } => {
                let meals = match meals_file {
                    Some(path) => {
                        let contents = std::fs::read_to_string(path).map_err(|e| {
                            format!("Failed to read meals file '{}': {}", path.display(), e)
                        })?;
                        Some(serde_json::from_str::<Vec<DietDay>>(&contents)?)
                    }
                    None => None,
                };

                let input = CreateDiet {
                    org_id: org.clone(),
                    branch_id: branch.clone(),
                    title: title.trim().to_string(),
                    description: description.clone(),
                    slug: slug.clone(),
                    duration_days: *duration_days,
                    difficulty_level: difficulty.clone(),
                    primary_goal: goal.clone(),
                    calories_per_day: *calories,
                    macros: None,
                    meals,
                    status: None,
                    is_public: Some(!private),
                    tags: (!tags.is_empty()).then(|| tags.clone()),
                };

                let created = service.create(input).await?;
                println!("Created diet:");
                println!("{}", created);
                Ok(())
            }

            DietSubcommand::Remove { id } => {
                service.remove(id).await?;
                println!("Diet {} exists; removal is not supported, nothing was changed", id);
                Ok(())
            }
        }
    }
}
