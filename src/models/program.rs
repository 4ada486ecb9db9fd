use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::common::{default_true, Audit, Stats, Taxonomy};
use crate::db::Document;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramExercise {
    pub exercise_id: String,
    pub name: String,
    #[serde(default)]
    pub sets: u32,
    #[serde(default)]
    pub reps: u32,
    #[serde(default)]
    pub duration_seconds: u32,
    #[serde(default)]
    pub rest_seconds: u32,
    #[serde(default)]
    pub instructions: Vec<String>,
    #[serde(default)]
    pub tips: Vec<String>,
}

/// A workout as embedded in a program day. Carries its own exercise list so
/// a program can be rendered without touching the workouts collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramWorkout {
    pub workout_id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(default)]
    pub duration_minutes: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,
    #[serde(default)]
    pub equipment_required: Vec<String>,
    #[serde(default)]
    pub target_muscles: Vec<String>,
    #[serde(default)]
    pub calories_burned: u32,
    #[serde(default)]
    pub exercises: Vec<ProgramExercise>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default = "default_true")]
    pub is_public: bool,
    #[serde(default)]
    pub order_in_day: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramDay {
    pub day_number: u32,
    #[serde(default)]
    pub workouts: Vec<ProgramWorkout>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    #[serde(rename = "_id")]
    pub id: String,
    pub program_id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub slug: String,
    #[serde(default)]
    pub duration_days: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_goal: Option<String>,
    #[serde(default)]
    pub category: Vec<String>,
    #[serde(default)]
    pub target_audience: Vec<String>,
    #[serde(default)]
    pub days: Vec<ProgramDay>,
    #[serde(default)]
    pub total_workouts: u32,
    #[serde(default)]
    pub total_exercises: u32,
    #[serde(default)]
    pub estimated_total_calories: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub stats: Stats,
    #[serde(default)]
    pub audit: Audit,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taxonomy: Option<Taxonomy>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Program {
    /// Rebuild the rollup counters from the embedded days. Sums saturate at
    /// `u32::MAX`.
    pub fn recompute_totals(&mut self) {
        let workouts = self.days.iter().flat_map(|day| day.workouts.iter());

        let (count, exercises, calories) =
            workouts.fold((0u32, 0u32, 0u32), |(count, exercises, calories), w| {
                let len = u32::try_from(w.exercises.len()).unwrap_or(u32::MAX);
                (
                    count.saturating_add(1),
                    exercises.saturating_add(len),
                    calories.saturating_add(w.calories_burned),
                )
            });

        self.total_workouts = count;
        self.total_exercises = exercises;
        self.estimated_total_calories = calories;
    }
}

impl Document for Program {
    const COLLECTION: &'static str = "programs";
    const KEY_FIELD: &'static str = "program_id";

    fn id(&self) -> &str {
        &self.id
    }

    fn key(&self) -> &str {
        &self.program_id
    }

    fn slug(&self) -> Option<&str> {
        Some(&self.slug)
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(f, "{}", "=".repeat(self.title.len()))?;
        writeln!(f, "ID: {} ({})", self.program_id, self.id)?;
        writeln!(f, "Slug: {}", self.slug)?;
        writeln!(f, "Duration: {} day(s)", self.duration_days)?;
        if let Some(level) = &self.difficulty_level {
            writeln!(f, "Difficulty: {}", level)?;
        }
        writeln!(
            f,
            "Workouts: {}, exercises: {}, est. calories: {}",
            self.total_workouts, self.total_exercises, self.estimated_total_calories
        )?;

        for day in &self.days {
            writeln!(f, "\nDay {}:", day.day_number)?;
            for workout in &day.workouts {
                writeln!(
                    f,
                    "  - {} ({} min, {} exercise(s))",
                    workout.title,
                    workout.duration_minutes,
                    workout.exercises.len()
                )?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Program {
        serde_json::from_value(serde_json::json!({
            "_id": "65a1f0c2e4b0a1b2c3d4e5f6",
            "program_id": "p1",
            "title": "Couch to 5k",
            "slug": "couch-to-5k",
            "duration_days": 2,
            "days": [
                { "day_number": 1, "workouts": [
                    { "workout_id": "w1", "title": "Walk", "calories_burned": 120,
                      "exercises": [
                        { "exercise_id": "e1", "name": "Brisk walk" },
                        { "exercise_id": "e2", "name": "Stretch" }
                      ]}
                ]},
                { "day_number": 2, "workouts": [
                    { "workout_id": "w2", "title": "Jog", "calories_burned": 200,
                      "exercises": [{ "exercise_id": "e3", "name": "Jog" }] },
                    { "workout_id": "w3", "title": "Cool down" }
                ]}
            ],
            "created_at": "2025-01-01T00:00:00Z",
            "updated_at": "2025-01-01T00:00:00Z"
        }))
        .unwrap()
    }

    #[test]
    fn test_recompute_totals() {
        let mut program = sample();
        assert_eq!(program.total_workouts, 0);

        program.recompute_totals();
        assert_eq!(program.total_workouts, 3);
        assert_eq!(program.total_exercises, 3);
        assert_eq!(program.estimated_total_calories, 320);
    }

    #[test]
    fn test_recompute_totals_saturates() {
        let mut program = sample();
        for day in &mut program.days {
            for workout in &mut day.workouts {
                workout.calories_burned = u32::MAX;
            }
        }

        program.recompute_totals();
        assert_eq!(program.total_workouts, 3);
        assert_eq!(program.estimated_total_calories, u32::MAX);
    }

    #[test]
    fn test_defaults() {
        let program = sample();
        assert!(!program.is_public);
        assert!(program.days[1].workouts[1].is_public);
        assert!(program.taxonomy.is_none());
    }

    #[test]
    fn test_display() {
        let output = format!("{}", sample());
        assert!(output.contains("Couch to 5k"));
        assert!(output.contains("Walk (0 min, 2 exercise(s))"));
    }
}
