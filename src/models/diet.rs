use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::common::{default_true, Audit, Stats};
use crate::db::Document;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MacroBreakdown {
    pub protein: u32,
    pub carbs: u32,
    pub fats: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meal {
    pub meal_type: String,
    pub name: String,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub calories: u32,
    #[serde(default)]
    pub macros: MacroBreakdown,
    #[serde(default)]
    pub instructions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DietDay {
    pub day_number: u32,
    #[serde(default)]
    pub meals: Vec<Meal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diet {
    #[serde(rename = "_id")]
    pub id: String,
    pub org_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_id: Option<String>,
    pub diet_id: String,
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
    pub calories_per_day: u32,
    #[serde(default)]
    pub macros: MacroBreakdown,
    #[serde(default)]
    pub meals: Vec<DietDay>,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default = "default_true")]
    pub is_public: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub stats: Stats,
    #[serde(default)]
    pub audit: Audit,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub const DEFAULT_DIET_STATUS: &str = "draft";

fn default_status() -> String {
    DEFAULT_DIET_STATUS.to_string()
}

impl Diet {
    /// Total number of meals across every day of the plan.
    pub fn meal_count(&self) -> usize {
        self.meals.iter().map(|day| day.meals.len()).sum()
    }
}

impl Document for Diet {
    const COLLECTION: &'static str = "diets";
    const KEY_FIELD: &'static str = "diet_id";

    fn id(&self) -> &str {
        &self.id
    }

    fn key(&self) -> &str {
        &self.diet_id
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

impl fmt::Display for Diet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(f, "{}", "=".repeat(self.title.len()))?;
        writeln!(f, "ID: {} ({})", self.diet_id, self.id)?;
        writeln!(f, "Slug: {}", self.slug)?;
        writeln!(f, "Organization: {}", self.org_id)?;
        if let Some(branch) = &self.branch_id {
            writeln!(f, "Branch: {}", branch)?;
        }
        writeln!(
            f,
            "Status: {}{}",
            self.status,
            if self.is_public { " (public)" } else { "" }
        )?;
        if let Some(level) = &self.difficulty_level {
            writeln!(f, "Difficulty: {}", level)?;
        }
        if self.calories_per_day > 0 {
            writeln!(
                f,
                "Calories/day: {} (P {}g / C {}g / F {}g)",
                self.calories_per_day, self.macros.protein, self.macros.carbs, self.macros.fats
            )?;
        }
        if !self.tags.is_empty() {
            writeln!(f, "Tags: {}", self.tags.join(", "))?;
        }

        for day in &self.meals {
            writeln!(f, "\nDay {}:", day.day_number)?;
            for meal in &day.meals {
                write!(f, "  - [{}] {}", meal.meal_type, meal.name)?;
                if meal.calories > 0 {
                    write!(f, " ({} kcal)", meal.calories)?;
                }
                writeln!(f)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Diet {
        serde_json::from_value(serde_json::json!({
            "_id": "65a1f0c2e4b0a1b2c3d4e5f6",
            "org_id": "o1",
            "diet_id": "d1",
            "title": "Keto Plan",
            "slug": "keto-plan-1",
            "meals": [
                { "day_number": 1, "meals": [
                    { "meal_type": "breakfast", "name": "Eggs", "calories": 300 },
                    { "meal_type": "lunch", "name": "Salad" }
                ]},
                { "day_number": 2, "meals": [
                    { "meal_type": "dinner", "name": "Steak" }
                ]}
            ],
            "created_at": "2025-01-01T00:00:00Z",
            "updated_at": "2025-01-01T00:00:00Z"
        }))
        .unwrap()
    }

    #[test]
    fn test_defaults_applied_on_decode() {
        let diet = sample();
        assert_eq!(diet.status, "draft");
        assert!(diet.is_public);
        assert_eq!(diet.stats, Stats::default());
        assert_eq!(diet.meals[0].meals[1].calories, 0);
    }

    #[test]
    fn test_meal_count() {
        assert_eq!(sample().meal_count(), 3);
    }

    #[test]
    fn test_store_id_serialized_as_underscore_id() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["_id"], "65a1f0c2e4b0a1b2c3d4e5f6");
        assert!(json.get("branch_id").is_none());
    }

    #[test]
    fn test_display() {
        let output = format!("{}", sample());
        assert!(output.contains("Keto Plan"));
        assert!(output.contains("Day 1:"));
        assert!(output.contains("[breakfast] Eggs (300 kcal)"));
    }
}
