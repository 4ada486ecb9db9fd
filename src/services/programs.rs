//! Training programs: read-only listing and lookup.

use super::pagination::{Page, Pagination};
use crate::db::{is_object_id, Collection, Field, Filter};
use crate::error::{Result, ServiceError};
use crate::models::Program;
use crate::validation::{FromQueryParams, QueryParams, ValidationErrors};

/// Filters accepted by `GET /programs`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListProgramsQuery {
    pub pagination: Pagination,
    pub difficulty_level: Option<String>,
    /// Bounds on `duration_days`.
    pub min_duration: Option<f64>,
    pub max_duration: Option<f64>,
}

impl ListProgramsQuery {
    pub fn filter(&self) -> Filter {
        let mut filter = Filter::new();
        if let Some(level) = &self.difficulty_level {
            filter = filter.eq(Field::Path("difficulty_level"), level.as_str());
        }
        filter.range(
            Field::Path("duration_days"),
            self.min_duration,
            self.max_duration,
        )
    }
}

impl FromQueryParams for ListProgramsQuery {
    fn from_query_params(params: &QueryParams) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let query = Self {
            pagination: Pagination::from_params(params, &mut errors),
            difficulty_level: params.string("difficulty_level"),
            min_duration: params.number(&mut errors, "min_duration", 0.0),
            max_duration: params.number(&mut errors, "max_duration", 0.0),
        };
        errors.finish(query)
    }
}

#[derive(Debug, Clone)]
pub struct ProgramService {
    programs: Collection<Program>,
}

impl ProgramService {
    pub fn new(programs: Collection<Program>) -> Self {
        Self { programs }
    }

    pub fn collection(&self) -> &Collection<Program> {
        &self.programs
    }

    pub async fn list(&self, query: &ListProgramsQuery) -> Result<Page<Program>> {
        let window = query.pagination.window();
        let filter = query.filter();

        let (data, total) = tokio::try_join!(
            self.programs.find(&filter, window.skip, window.limit),
            self.programs.count(&filter)
        )?;

        Ok(Page::new(data, total, window))
    }

    /// A well-formed store id is looked up as such; anything else is tried
    /// as a `program_id` or a slug.
    pub async fn find_one(&self, id: &str) -> Result<Program> {
        let filter = if is_object_id(id) {
            Filter::new().eq(Field::Id, id)
        } else {
            Filter::new().any(vec![
                Filter::new().eq(Field::Key, id),
                Filter::new().eq(Field::Slug, id),
            ])
        };

        self.programs
            .find_one(&filter)
            .await?
            .ok_or_else(|| ServiceError::not_found("Program not found"))
    }
}
