use clap::{Args, Subcommand};

use super::{print_footer, truncate, OutputFormat};
use amata::services::{ListWorkoutsQuery, Pagination, UpdateWorkoutStats, WorkoutService};

#[derive(Args)]
pub struct WorkoutCommand {
    #[command(subcommand)]
    pub command: WorkoutSubcommand,
}

#[derive(Subcommand)]
pub enum WorkoutSubcommand {
    /// List workouts
    List {
        /// Difficulty
        #[arg(long)]
        difficulty: Option<String>,

        /// Minimum length in minutes
        #[arg(long)]
        min_duration: Option<f64>,

        /// Maximum length in minutes
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

    /// Show a workout's details
    Show {
        /// Workout UID
        uid: String,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Add to a workout's engagement counters
    Stats {
        /// Workout UID
        uid: String,

        #[arg(long)]
        views: Option<u64>,

        #[arg(long)]
        completions: Option<u64>,

        #[arg(long)]
        favorites: Option<u64>,

        /// Amount added to avg_rating
        #[arg(long)]
        rating: Option<f64>,
    },
}

impl WorkoutCommand {
    pub async fn run(&self, service: &WorkoutService) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            WorkoutSubcommand::List {
                difficulty,
                min_duration,
                max_duration,
                page,
                limit,
                format,
            } => {
                let query = ListWorkoutsQuery {
                    pagination: Pagination {
                        page: *page,
                        limit: *limit,
                    },
                    difficulty: difficulty.clone(),
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
                            println!("No workouts found");
                            return Ok(());
                        }
                        println!("{:<36}  {:<30}  {:>4}  DIFFICULTY", "UID", "TITLE", "MIN");
                        println!("{}", "-".repeat(90));
                        for workout in &result.data {
                            let minutes = workout
                                .duration_minutes
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| "-".to_string());
                            println!(
                                "{:<36}  {:<30}  {:>4}  {}",
                                workout.uid,
                                truncate(&workout.title, 30),
                                minutes,
                                workout.difficulty.as_deref().unwrap_or("-")
                            );
                        }
                        print_footer(result.total, result.page, result.limit, result.data.len(), "workout");
                    }
                }
                Ok(())
            }

            WorkoutSubcommand::Show { uid, format } => {
                let workout = service.find_one(uid).await?;
                match format {
                    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&workout)?),
                    OutputFormat::Text => println!("{}", workout),
                }
                Ok(())
            }

            WorkoutSubcommand::Stats {
                uid,
                views,
                completions,
                favorites,
                rating,
            } => {
                let delta = UpdateWorkoutStats {
                    views: views.map(|v| v as f64),
                    completions: completions.map(|v| v as f64),
                    favorites: favorites.map(|v| v as f64),
                    avg_rating: *rating,
                };
                if delta.is_empty() {
                    return Err("Nothing to update. Provide at least one counter.".into());
                }

                let workout = service.update_stats(uid, delta).await?;
                println!(
                    "{}: views {}, completions {}, favorites {}, rating {:.2}",
                    workout.uid,
                    workout.stats.views,
                    workout.stats.completions,
                    workout.stats.favorites,
                    workout.stats.avg_rating
                );
                Ok(())
            }
        }
    }
}
