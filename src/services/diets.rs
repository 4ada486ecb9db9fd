//! Diet plans: list, fetch, create, update and the (inert) remove.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::pagination::{Page, Pagination};
use crate::db::{is_object_id, new_object_id, Collection, Field, Filter, StoreError};
use crate::error::{Result, ServiceError};
use crate::models::{Audit, Diet, DietDay, MacroBreakdown, Stats, DEFAULT_DIET_STATUS};
use crate::slug::unique_slug;
use crate::validation::{FromQueryParams, QueryParams, Validate, ValidationErrors};

pub const MAX_TITLE_LENGTH: usize = 200;

/// Filters accepted by `GET /diets`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListDietsQuery {
    pub pagination: Pagination,
    pub org_id: Option<String>,
    pub branch_id: Option<String>,
    pub difficulty_level: Option<String>,
    pub min_calories: Option<f64>,
    pub max_calories: Option<f64>,
}

impl ListDietsQuery {
    /// Diets of one organization, paginated, nothing else.
    pub fn for_organization(org_id: impl Into<String>, pagination: Pagination) -> Self {
        Self {
            pagination,
            org_id: Some(org_id.into()),
            ..Self::default()
        }
    }

    /// Without an organization scope only public diets are listed.
    pub fn filter(&self) -> Filter {
        let mut filter = match &self.org_id {
            Some(org_id) => Filter::new().eq(Field::Path("org_id"), org_id.as_str()),
            None => Filter::new().eq(Field::Path("is_public"), true),
        };
        if let Some(branch_id) = &self.branch_id {
            filter = filter.eq(Field::Path("branch_id"), branch_id.as_str());
        }
        if let Some(level) = &self.difficulty_level {
            filter = filter.eq(Field::Path("difficulty_level"), level.as_str());
        }
        filter.range(
            Field::Path("calories_per_day"),
            self.min_calories,
            self.max_calories,
        )
    }
}

impl FromQueryParams for ListDietsQuery {
    fn from_query_params(params: &QueryParams) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let query = Self {
            pagination: Pagination::from_params(params, &mut errors),
            org_id: params.string("orgId"),
            branch_id: params.string("branchId"),
            difficulty_level: params.string("difficulty_level"),
            min_calories: params.number(&mut errors, "min_calories", 0.0),
            max_calories: params.number(&mut errors, "max_calories", 0.0),
        };
        errors.finish(query)
    }
}

/// Body of `POST /diets`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateDiet {
    #[serde(default)]
    pub org_id: String,
    pub branch_id: Option<String>,
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
    pub slug: Option<String>,
    pub duration_days: Option<u32>,
    pub difficulty_level: Option<String>,
    pub primary_goal: Option<String>,
    pub calories_per_day: Option<u32>,
    pub macros: Option<MacroBreakdown>,
    pub meals: Option<Vec<DietDay>>,
    pub status: Option<String>,
    pub is_public: Option<bool>,
    pub tags: Option<Vec<String>>,
}

impl Validate for CreateDiet {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require_non_empty("org_id", &self.org_id);
        errors.require_non_empty("title", &self.title);
        errors.max_length("title", &self.title, MAX_TITLE_LENGTH);
        if let Some(days) = self.duration_days {
            errors.min("duration_days", days, 1);
        }
        if let Some(days) = &self.meals {
            validate_days(&mut errors, days);
        }
        errors.finish(())
    }
}

/// Body of `PUT`/`PATCH /diets/:id`. Absent fields are left as stored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateDiet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub org_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_days: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_goal: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calories_per_day: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub macros: Option<MacroBreakdown>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meals: Option<Vec<DietDay>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl Validate for UpdateDiet {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(org_id) = &self.org_id {
            errors.require_non_empty("org_id", org_id);
        }
        if let Some(title) = &self.title {
            errors.require_non_empty("title", title);
            errors.max_length("title", title, MAX_TITLE_LENGTH);
        }
        if let Some(days) = self.duration_days {
            errors.min("duration_days", days, 1);
        }
        if let Some(days) = &self.meals {
            validate_days(&mut errors, days);
        }
        errors.finish(())
    }
}

fn validate_days(errors: &mut ValidationErrors, days: &[DietDay]) {
    for (i, day) in days.iter().enumerate() {
        errors.min(&format!("meals[{}].day_number", i), day.day_number, 1);
        if day.meals.is_empty() {
            errors.add(
                format!("meals[{}].meals", i),
                format!("meals[{}].meals must contain at least 1 elements", i),
            );
        }
        for (j, meal) in day.meals.iter().enumerate() {
            errors.require_non_empty(&format!("meals[{}].meals[{}].meal_type", i, j), &meal.meal_type);
            errors.require_non_empty(&format!("meals[{}].meals[{}].name", i, j), &meal.name);
        }
    }
}

#[derive(Debug, Clone)]
pub struct DietService {
    diets: Collection<Diet>,
    audit: Audit,
}

impl DietService {
    /// `audit` is stamped onto every diet this service creates.
    pub fn new(diets: Collection<Diet>, audit: Audit) -> Self {
        Self { diets, audit }
    }

    pub async fn create(&self, input: CreateDiet) -> Result<Diet> {
        input.validate()?;

        let now = Utc::now();
        let slug = input
            .slug
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| unique_slug(&input.title, now));

        let diet = Diet {
            id: new_object_id(),
            org_id: input.org_id,
            branch_id: input.branch_id,
            diet_id: Uuid::new_v4().to_string(),
            title: input.title,
            description: input.description,
            slug,
            duration_days: input.duration_days.unwrap_or_default(),
            difficulty_level: input.difficulty_level,
            primary_goal: input.primary_goal,
            calories_per_day: input.calories_per_day.unwrap_or_default(),
            macros: input.macros.unwrap_or_default(),
            meals: input.meals.unwrap_or_default(),
            status: input
                .status
                .unwrap_or_else(|| DEFAULT_DIET_STATUS.to_string()),
            is_public: input.is_public.unwrap_or(true),
            tags: input.tags.unwrap_or_default(),
            stats: Stats::default(),
            audit: self.audit.clone(),
            created_at: now,
            updated_at: now,
        };

        let created = self.diets.insert(&diet).await.map_err(conflict_on_duplicate)?;
        tracing::info!("Created diet {} ({})", created.diet_id, created.slug);
        Ok(created)
    }

    pub async fn list(&self, query: &ListDietsQuery) -> Result<Page<Diet>> {
        let window = query.pagination.window();
        let filter = query.filter();

        tracing::debug!(
            "Listing diets page={} limit={} org={:?}",
            window.page,
            window.limit,
            query.org_id
        );

        let (data, total) = tokio::try_join!(
            self.diets.find(&filter, window.skip, window.limit),
            self.diets.count(&filter)
        )?;

        Ok(Page::new(data, total, window))
    }

    /// Look a diet up by its `diet_id`.
    pub async fn find_one(&self, diet_id: &str) -> Result<Diet> {
        self.diets
            .find_one(&Filter::new().eq(Field::Key, diet_id))
            .await?
            .ok_or_else(|| ServiceError::not_found("Diet not found"))
    }

    /// Apply `input` to the diet with store id `id`. Retitling without an
    /// explicit slug derives a fresh slug from the new title.
    pub async fn update(&self, id: &str, input: UpdateDiet) -> Result<Diet> {
        if !is_object_id(id) {
            return Err(ServiceError::bad_request("Invalid diet id"));
        }
        input.validate()?;

        let mut patch = match serde_json::to_value(&input).map_err(StoreError::from)? {
            serde_json::Value::Object(map) => map,
            _ => serde_json::Map::new(),
        };
        if input.slug.as_deref().map_or(true, str::is_empty) {
            patch.remove("slug");
            if let Some(title) = &input.title {
                patch.insert(
                    "slug".to_string(),
                    serde_json::Value::String(unique_slug(title, Utc::now())),
                );
            }
        }

        let updated = self
            .diets
            .update_by_id(id, &patch)
            .await
            .map_err(conflict_on_duplicate)?
            .ok_or_else(|| ServiceError::not_found("Diet not found"))?;

        tracing::info!("Updated diet {} ({} field(s))", updated.diet_id, patch.len());
        Ok(updated)
    }

    /// Check that the diet exists. Nothing is deleted or archived.
    pub async fn remove(&self, id: &str) -> Result<()> {
        if !is_object_id(id) {
            return Err(ServiceError::bad_request("Invalid diet id"));
        }

        let exists = self.diets.exists(&Filter::new().eq(Field::Id, id)).await?;
        if !exists {
            return Err(ServiceError::not_found("Diet not found"));
        }

        tracing::warn!("Remove requested for diet {}; deletion is not implemented", id);
        Ok(())
    }
}

fn conflict_on_duplicate(err: StoreError) -> ServiceError {
    if err.is_duplicate_key() {
        tracing::debug!("{}", err);
        ServiceError::Conflict("Diet with provided unique fields already exists".to_string())
    } else {
        ServiceError::Store(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{setup_db, TestDb};
    use crate::models::Meal;

    async fn setup() -> (DietService, TestDb) {
        let db = setup_db().await;
        let service = DietService::new(
            Collection::new(db.pool.clone()),
            Audit::created("test", Some("tester".to_string())),
        );
        (service, db)
    }

    fn keto() -> CreateDiet {
        CreateDiet {
            org_id: "o1".to_string(),
            title: "Keto Plan".to_string(),
            meals: Some(vec![DietDay {
                day_number: 1,
                meals: vec![Meal {
                    meal_type: "breakfast".to_string(),
                    name: "Eggs".to_string(),
                    ingredients: vec![],
                    calories: 0,
                    macros: MacroBreakdown::default(),
                    instructions: vec![],
                }],
            }]),
            ..CreateDiet::default()
        }
    }

    fn titled(org_id: &str, title: &str) -> CreateDiet {
        CreateDiet {
            org_id: org_id.to_string(),
            title: title.to_string(),
            ..CreateDiet::default()
        }
    }

    #[tokio::test]
    async fn test_create_generates_id_and_slug() {
        let (service, _db) = setup().await;

        let diet = service.create(keto()).await.unwrap();

        assert!(Uuid::parse_str(&diet.diet_id).is_ok());
        assert!(diet.slug.starts_with("keto-plan-"));
        assert_eq!(diet.status, "draft");
        assert!(diet.is_public);
        assert_eq!(diet.audit.env.as_deref(), Some("test"));
        assert_eq!(diet.meals[0].meals[0].name, "Eggs");
    }

    #[tokio::test]
    async fn test_create_same_title_gets_distinct_slugs() {
        let (service, _db) = setup().await;

        let a = service.create(titled("o1", "Keto Plan")).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let b = service.create(titled("o1", "Keto Plan")).await.unwrap();

        assert_ne!(a.slug, b.slug);
        assert_ne!(a.diet_id, b.diet_id);
    }

    #[tokio::test]
    async fn test_create_duplicate_explicit_slug_conflicts() {
        let (service, _db) = setup().await;

        let mut first = titled("o1", "One");
        first.slug = Some("shared".to_string());
        service.create(first).await.unwrap();

        let mut second = titled("o1", "Two");
        second.slug = Some("shared".to_string());
        let err = service.create(second).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_payload() {
        let (service, _db) = setup().await;

        let mut input = keto();
        input.org_id = String::new();
        input.title = "x".repeat(201);
        if let Some(days) = input.meals.as_mut() {
            days[0].day_number = 0;
        }

        match service.create(input).await.unwrap_err() {
            ServiceError::Invalid(errors) => {
                assert!(errors.has_field("org_id"));
                assert!(errors.has_field("title"));
                assert!(errors.has_field("meals[0].day_number"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_find_one_by_diet_id() {
        let (service, _db) = setup().await;
        let created = service.create(keto()).await.unwrap();

        let found = service.find_one(&created.diet_id).await.unwrap();
        assert_eq!(found.id, created.id);

        let err = service.find_one("missing").await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_partial_keeps_other_fields() {
        let (service, _db) = setup().await;
        let mut input = keto();
        input.slug = Some("keep-me".to_string());
        input.difficulty_level = Some("easy".to_string());
        let created = service.create(input).await.unwrap();

        let updated = service
            .update(
                &created.id,
                UpdateDiet {
                    calories_per_day: Some(1800),
                    ..UpdateDiet::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.calories_per_day, 1800);
        assert_eq!(updated.slug, "keep-me");
        assert_eq!(updated.title, "Keto Plan");
        assert_eq!(updated.difficulty_level.as_deref(), Some("easy"));
        assert_eq!(updated.meals, created.meals);
    }

    #[tokio::test]
    async fn test_update_title_rederives_slug() {
        let (service, _db) = setup().await;
        let created = service.create(keto()).await.unwrap();

        let updated = service
            .update(
                &created.id,
                UpdateDiet {
                    title: Some("Paleo Plan".to_string()),
                    ..UpdateDiet::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.title, "Paleo Plan");
        assert!(updated.slug.starts_with("paleo-plan-"));
    }

    #[tokio::test]
    async fn test_update_explicit_slug_wins_over_title() {
        let (service, _db) = setup().await;
        let created = service.create(keto()).await.unwrap();

        let updated = service
            .update(
                &created.id,
                UpdateDiet {
                    title: Some("Paleo Plan".to_string()),
                    slug: Some("custom".to_string()),
                    ..UpdateDiet::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.slug, "custom");
    }

    #[tokio::test]
    async fn test_update_nonexistent_is_not_found() {
        let (service, _db) = setup().await;

        let err = service
            .update(&new_object_id(), UpdateDiet::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_malformed_id_is_bad_request() {
        let (service, _db) = setup().await;

        let err = service
            .update("not-an-id", UpdateDiet::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_update_to_taken_slug_conflicts() {
        let (service, _db) = setup().await;
        let mut first = titled("o1", "One");
        first.slug = Some("taken".to_string());
        service.create(first).await.unwrap();
        let second = service.create(titled("o1", "Two")).await.unwrap();

        let err = service
            .update(
                &second.id,
                UpdateDiet {
                    slug: Some("taken".to_string()),
                    ..UpdateDiet::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_list_defaults_to_public_without_org() {
        let (service, _db) = setup().await;
        service.create(titled("o1", "Public")).await.unwrap();
        let mut private = titled("o1", "Private");
        private.is_public = Some(false);
        service.create(private).await.unwrap();

        let page = service.list(&ListDietsQuery::default()).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.data[0].title, "Public");

        let scoped = service
            .list(&ListDietsQuery::for_organization("o1", Pagination::default()))
            .await
            .unwrap();
        assert_eq!(scoped.total, 2);
    }

    #[tokio::test]
    async fn test_list_filters_and_paginates() {
        let (service, _db) = setup().await;
        for (title, calories, level) in [
            ("A", 1200, "easy"),
            ("B", 1800, "easy"),
            ("C", 2200, "easy"),
            ("D", 1900, "hard"),
        ] {
            let mut input = titled("o1", title);
            input.calories_per_day = Some(calories);
            input.difficulty_level = Some(level.to_string());
            input.branch_id = Some("b1".to_string());
            service.create(input).await.unwrap();
        }
        service.create(titled("o2", "Other org")).await.unwrap();

        let query = ListDietsQuery {
            org_id: Some("o1".to_string()),
            branch_id: Some("b1".to_string()),
            difficulty_level: Some("easy".to_string()),
            min_calories: Some(1500.0),
            max_calories: Some(2200.0),
            pagination: Pagination::new(1, 1),
        };
        let page = service.list(&query).await.unwrap();

        assert_eq!(page.total, 2);
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].title, "C");
        assert_eq!(page.limit, 1);

        let next = service
            .list(&ListDietsQuery {
                pagination: Pagination::new(2, 1),
                ..query
            })
            .await
            .unwrap();
        assert_eq!(next.data[0].title, "B");
    }

    #[tokio::test]
    async fn test_list_limit_is_clamped() {
        let (service, _db) = setup().await;
        service.create(titled("o1", "Only")).await.unwrap();

        let page = service
            .list(&ListDietsQuery {
                pagination: Pagination::new(1, 1000),
                ..ListDietsQuery::default()
            })
            .await
            .unwrap();
        assert_eq!(page.limit, 100);
        assert!(page.data.len() <= 100);
    }

    #[tokio::test]
    async fn test_remove_checks_existence_only() {
        let (service, _db) = setup().await;
        let created = service.create(keto()).await.unwrap();

        service.remove(&created.id).await.unwrap();
        // still there
        assert!(service.find_one(&created.diet_id).await.is_ok());

        let err = service.remove(&new_object_id()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));

        let err = service.remove("bogus").await.unwrap_err();
        assert!(matches!(err, ServiceError::BadRequest(_)));
    }

    #[test]
    fn test_list_query_from_params() {
        let params = QueryParams::from([
            ("orgId", "o1"),
            ("branchId", "b1"),
            ("min_calories", "1000"),
            ("page", "2"),
        ]);
        let query = ListDietsQuery::from_query_params(&params).unwrap();
        assert_eq!(query.org_id.as_deref(), Some("o1"));
        assert_eq!(query.branch_id.as_deref(), Some("b1"));
        assert_eq!(query.min_calories, Some(1000.0));
        assert_eq!(query.max_calories, None);
        assert_eq!(query.pagination.page, Some(2));
    }

    #[test]
    fn test_list_query_rejects_negative_calories() {
        let params = QueryParams::from([("max_calories", "-5")]);
        let errors = ListDietsQuery::from_query_params(&params).unwrap_err();
        assert!(errors.has_field("max_calories"));
    }

    #[test]
    fn test_update_payload_strips_absent_fields() {
        let input = UpdateDiet {
            title: Some("New".to_string()),
            ..UpdateDiet::default()
        };
        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json, serde_json::json!({ "title": "New" }));
    }
}
