//! Business logic for each content collection.

mod diets;
pub mod import;
pub mod pagination;
mod programs;
mod workouts;

pub use diets::{CreateDiet, DietService, ListDietsQuery, UpdateDiet, MAX_TITLE_LENGTH};
pub use import::{import_documents, ImportReport};
pub use pagination::{Page, Pagination};
pub use programs::{ListProgramsQuery, ProgramService};
pub use workouts::{ListWorkoutsQuery, UpdateWorkoutStats, WorkoutService};
