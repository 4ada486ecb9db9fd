//! Workouts: listing, lookup and engagement counters.

use serde::Deserialize;

use super::pagination::{Page, Pagination};
use crate::db::{Collection, Field, Filter, Scalar, StoreError};
use crate::error::{Result, ServiceError};
use crate::models::Workout;
use crate::validation::{FromQueryParams, QueryParams, Validate, ValidationErrors};

/// Filters accepted by `GET /workouts`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListWorkoutsQuery {
    pub pagination: Pagination,
    pub difficulty: Option<String>,
    /// Bounds on `duration_minutes`.
    pub min_duration: Option<f64>,
    pub max_duration: Option<f64>,
}

impl ListWorkoutsQuery {
    pub fn filter(&self) -> Filter {
        let mut filter = Filter::new();
        if let Some(difficulty) = &self.difficulty {
            filter = filter.eq(Field::Path("difficulty"), difficulty.as_str());
        }
        filter.range(
            Field::Path("duration_minutes"),
            self.min_duration,
            self.max_duration,
        )
    }
}

impl FromQueryParams for ListWorkoutsQuery {
    fn from_query_params(params: &QueryParams) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let query = Self {
            pagination: Pagination::from_params(params, &mut errors),
            difficulty: params.string("difficulty"),
            min_duration: params.number(&mut errors, "min_duration", 0.0),
            max_duration: params.number(&mut errors, "max_duration", 0.0),
        };
        errors.finish(query)
    }
}

/// Body of `PATCH /workouts/:id/stats`. Each present field is added to the
/// stored counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct UpdateWorkoutStats {
    pub views: Option<f64>,
    pub completions: Option<f64>,
    pub favorites: Option<f64>,
    pub avg_rating: Option<f64>,
}

impl UpdateWorkoutStats {
    pub fn is_empty(&self) -> bool {
        self.views.is_none()
            && self.completions.is_none()
            && self.favorites.is_none()
            && self.avg_rating.is_none()
    }

    fn deltas(&self) -> Vec<(&'static str, Scalar)> {
        let mut deltas = Vec::new();
        for (path, value) in [
            ("stats.views", self.views),
            ("stats.completions", self.completions),
            ("stats.favorites", self.favorites),
        ] {
            if let Some(v) = value {
                deltas.push((path, Scalar::Integer(v as i64)));
            }
        }
        if let Some(rating) = self.avg_rating {
            deltas.push(("stats.avg_rating", Scalar::Real(rating)));
        }
        deltas
    }
}

impl Validate for UpdateWorkoutStats {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        for (field, value) in [
            ("views", self.views),
            ("completions", self.completions),
            ("favorites", self.favorites),
        ] {
            if let Some(v) = value {
                if v.fract() != 0.0 || v > i64::MAX as f64 {
                    errors.add(field, format!("{} must be an integer number", field));
                } else {
                    errors.min(field, v, 0.0);
                }
            }
        }
        if let Some(rating) = self.avg_rating {
            if !rating.is_finite() {
                errors.add("avg_rating", "avg_rating must be a number");
            } else {
                errors.min("avg_rating", rating, 0.0);
            }
        }
        errors.finish(())
    }
}

#[derive(Debug, Clone)]
pub struct WorkoutService {
    workouts: Collection<Workout>,
}

impl WorkoutService {
    pub fn new(workouts: Collection<Workout>) -> Self {
        Self { workouts }
    }

    pub fn collection(&self) -> &Collection<Workout> {
        &self.workouts
    }

    pub async fn list(&self, query: &ListWorkoutsQuery) -> Result<Page<Workout>> {
        let window = query.pagination.window();
        let filter = query.filter();

        let (data, total) = tokio::try_join!(
            self.workouts.find(&filter, window.skip, window.limit),
            self.workouts.count(&filter)
        )?;

        Ok(Page::new(data, total, window))
    }

    /// Look a workout up by its `uid`.
    pub async fn find_one(&self, uid: &str) -> Result<Workout> {
        self.workouts
            .find_one(&Filter::new().eq(Field::Key, uid))
            .await?
            .ok_or_else(|| ServiceError::not_found("Workout not found"))
    }

    /// Add `delta` to the counters of the workout with `uid` and return the
    /// workout as stored afterwards. `avg_rating` is incremented like the
    /// counters, not averaged.
    pub async fn update_stats(&self, uid: &str, delta: UpdateWorkoutStats) -> Result<Workout> {
        if delta.is_empty() {
            return Err(ServiceError::bad_request("No stat fields provided for update"));
        }
        delta.validate()?;

        let workout = self
            .workouts
            .increment(&Filter::new().eq(Field::Key, uid), &delta.deltas())
            .await
            .map_err(|e| match e {
                StoreError::OutOfRange { .. } => ServiceError::Conflict(
                    "Stats update would exceed the supported range".to_string(),
                ),
                other => other.into(),
            })?
            .ok_or_else(|| ServiceError::not_found("Workout not found"))?;

        tracing::debug!(
            "Workout {} stats now views={} completions={} favorites={}",
            workout.uid,
            workout.stats.views,
            workout.stats.completions,
            workout.stats.favorites
        );
        Ok(workout)
    }
}
