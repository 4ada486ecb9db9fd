use clap::{Args, Subcommand};
use serde_json::Value;
use std::path::{Path, PathBuf};

use amata::db::Collection;
use amata::models::{Program, Workout};
use amata::services::{import_documents, ImportReport};

#[derive(Args)]
pub struct ImportCommand {
    #[command(subcommand)]
    pub command: ImportSubcommand,
}

#[derive(Subcommand)]
pub enum ImportSubcommand {
    /// Import programs from a JSON array
    Programs {
        /// Path to the JSON file
        file: PathBuf,
    },

    /// Import workouts from a JSON array
    Workouts {
        /// Path to the JSON file
        file: PathBuf,
    },
}

fn read_documents(path: &Path) -> Result<Vec<Value>, Box<dyn std::error::Error>> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read '{}': {}", path.display(), e))?;
    match serde_json::from_str::<Value>(&contents)? {
        Value::Array(docs) => Ok(docs),
        _ => Err(format!("'{}' must contain a JSON array", path.display()).into()),
    }
}

fn print_report(report: &ImportReport, noun: &str) {
    println!("Imported {} {}(s)", report.inserted, noun);
    if !report.duplicates.is_empty() {
        println!(
            "Skipped {} duplicate(s): {}",
            report.duplicates.len(),
            report.duplicates.join(", ")
        );
    }
    for (index, reason) in &report.rejected {
        println!("Rejected entry {}: {}", index, reason);
    }
}

impl ImportCommand {
    pub async fn run(
        &self,
        programs: &Collection<Program>,
        workouts: &Collection<Workout>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            ImportSubcommand::Programs { file } => {
                let docs = read_documents(file)?;
                let report = import_documents(programs, docs, |program: &mut Program| {
                    if !program.days.is_empty() {
                        program.recompute_totals();
                    }
                })
                .await?;
                print_report(&report, "program");
            }
            ImportSubcommand::Workouts { file } => {
                let docs = read_documents(file)?;
                let report = import_documents(workouts, docs, |_: &mut Workout| {}).await?;
                print_report(&report, "workout");
            }
        }
        Ok(())
    }
}
