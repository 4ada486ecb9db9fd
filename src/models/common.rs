use serde::{Deserialize, Serialize};

/// Engagement counters shared by diets, programs and workouts.
///
/// Counters only ever move through atomic increments at the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stats {
    pub views: u64,
    pub completions: u64,
    pub favorites: u64,
    pub avg_rating: f64,
}

/// Who touched a document and in which environment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Audit {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub org_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
}

impl Audit {
    pub fn created(env: impl Into<String>, created_by: Option<String>) -> Self {
        Self {
            env: Some(env.into()),
            created_by,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxonomyItem {
    pub id: String,
    pub name: String,
    pub slug: String,
}

/// Category/type classification of a program or workout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Taxonomy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<TaxonomyItem>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<TaxonomyItem>,
}

pub(crate) fn default_true() -> bool {
    true
}
