mod common;
mod diet;
mod program;
mod workout;

pub use common::{Audit, Stats, Taxonomy, TaxonomyItem};
pub use diet::{Diet, DietDay, MacroBreakdown, Meal, DEFAULT_DIET_STATUS};
pub use program::{Program, ProgramDay, ProgramExercise, ProgramWorkout};
pub use workout::{Instruction, Media, MediaVariant, Workout};
