use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::common::{default_true, Audit, Stats, Taxonomy};
use crate::db::Document;

/// One encoded rendition of a workout video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaVariant {
    pub variant: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_status: Option<String>,
    #[serde(default)]
    pub duration_seconds: Option<f64>,
    #[serde(default)]
    pub available_resolutions: Vec<String>,
    #[serde(default)]
    pub mp4_keys: Vec<String>,
    #[serde(default)]
    pub captions: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Media {
    #[serde(default)]
    pub variants: Vec<MediaVariant>,
}

impl Media {
    pub fn variant(&self, name: &str) -> Option<&MediaVariant> {
        self.variants.iter().find(|v| v.variant == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    pub step_number: u32,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    #[serde(rename = "_id")]
    pub id: String,
    pub uid: String,
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<String>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taxonomy: Option<Taxonomy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
    #[serde(default)]
    pub equipment_needed: Vec<String>,
    #[serde(default)]
    pub primary_muscles: Vec<String>,
    #[serde(default)]
    pub secondary_muscles: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default = "default_true")]
    pub is_public: bool,
    #[serde(default)]
    pub available_variants: Vec<String>,
    #[serde(default)]
    pub stats: Stats,
    #[serde(default)]
    pub media: Media,
    #[serde(default)]
    pub instructions: Vec<Instruction>,
    #[serde(default)]
    pub audit: Audit,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document for Workout {
    const COLLECTION: &'static str = "workouts";
    const KEY_FIELD: &'static str = "uid";

    fn id(&self) -> &str {
        &self.id
    }

    fn key(&self) -> &str {
        &self.uid
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

impl fmt::Display for Workout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(f, "{}", "=".repeat(self.title.len()))?;
        writeln!(f, "UID: {} ({})", self.uid, self.id)?;
        writeln!(f, "Slug: {}", self.slug)?;
        if let Some(difficulty) = &self.difficulty {
            writeln!(f, "Difficulty: {}", difficulty)?;
        }
        if let Some(minutes) = self.duration_minutes {
            writeln!(f, "Duration: {} min", minutes)?;
        }
        if !self.equipment_needed.is_empty() {
            writeln!(f, "Equipment: {}", self.equipment_needed.join(", "))?;
        }
        writeln!(
            f,
            "Stats: {} view(s), {} completion(s), {} favorite(s), rating {:.1}",
            self.stats.views, self.stats.completions, self.stats.favorites, self.stats.avg_rating
        )?;

        if !self.instructions.is_empty() {
            writeln!(f, "\nInstructions:")?;
            for step in &self.instructions {
                writeln!(f, "  {}. {}: {}", step.step_number, step.title, step.description)?;
            }
        }

        Ok(())
    }
}
