use sqlx::{QueryBuilder, Sqlite};

/// A scalar bound into a query.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Text(String),
    Integer(i64),
    Real(f64),
    Bool(bool),
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Text(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Integer(value)
    }
}

impl From<u64> for Scalar {
    fn from(value: u64) -> Self {
        Scalar::Integer(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Real(value)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

impl Scalar {
    pub(crate) fn push_bind(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        match self {
            Scalar::Text(s) => qb.push_bind(s.clone()),
            Scalar::Integer(i) => qb.push_bind(*i),
            Scalar::Real(r) => qb.push_bind(*r),
            Scalar::Bool(b) => qb.push_bind(*b),
        };
    }
}

/// Something a filter can constrain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// The store id (`_id`).
    Id,
    /// The collection's domain identifier.
    Key,
    Slug,
    /// A dotted path inside the document, e.g. `stats.views`.
    Path(&'static str),
}

impl Field {
    pub(crate) fn push_sql(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        match self {
            Field::Id => {
                qb.push("id");
            }
            Field::Key => {
                qb.push("doc_key");
            }
            Field::Slug => {
                qb.push("slug");
            }
            // Paths are compile-time constants. Written inline so the
            // expression matches the json_extract indexes in the schema.
            Field::Path(path) => {
                debug_assert!(!path.contains('\''));
                qb.push(format!("json_extract(doc, '{}')", json_path(path)));
            }
        }
    }
}

pub(crate) fn json_path(path: &str) -> String {
    format!("$.{}", path)
}

#[derive(Debug, Clone, PartialEq)]
enum Condition {
    Eq(Field, Scalar),
    Range {
        field: Field,
        min: Option<f64>,
        max: Option<f64>,
    },
    Any(Vec<Filter>),
}

/// Conjunction of conditions over a collection.
///
/// ```ignore
/// let filter = Filter::new()
///     .eq(Field::Path("difficulty"), "hard")
///     .range(Field::Path("duration_minutes"), Some(20.0), Some(40.0));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: Field, value: impl Into<Scalar>) -> Self {
        self.conditions.push(Condition::Eq(field, value.into()));
        self
    }

    /// Closed interval `[min, max]`; an absent bound is left open. With both
    /// bounds absent the filter is unchanged.
    pub fn range(mut self, field: Field, min: Option<f64>, max: Option<f64>) -> Self {
        if min.is_some() || max.is_some() {
            self.conditions.push(Condition::Range { field, min, max });
        }
        self
    }

    /// Match when any of `alternatives` matches.
    pub fn any(mut self, alternatives: Vec<Filter>) -> Self {
        self.conditions.push(Condition::Any(alternatives));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Append ` WHERE ...` (nothing for an empty filter).
    pub(crate) fn push_where(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        if self.is_empty() {
            return;
        }
        qb.push(" WHERE ");
        self.push_conjunction(qb);
    }

    fn push_conjunction(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        if self.is_empty() {
            qb.push("1 = 1");
            return;
        }
        for (i, condition) in self.conditions.iter().enumerate() {
            if i > 0 {
                qb.push(" AND ");
            }
            push_condition(condition, qb);
        }
    }
}

fn push_condition(condition: &Condition, qb: &mut QueryBuilder<'_, Sqlite>) {
    match condition {
        Condition::Eq(field, value) => {
            field.push_sql(qb);
            qb.push(" = ");
            value.push_bind(qb);
        }
        Condition::Range { field, min, max } => {
            qb.push("(");
            let mut first = true;
            if let Some(min) = min {
                field.push_sql(qb);
                qb.push(" >= ");
                qb.push_bind(*min);
                first = false;
            }
            if let Some(max) = max {
                if !first {
                    qb.push(" AND ");
                }
                field.push_sql(qb);
                qb.push(" <= ");
                qb.push_bind(*max);
            }
            qb.push(")");
        }
        Condition::Any(alternatives) => {
            if alternatives.is_empty() {
                qb.push("1 = 0");
                return;
            }
            qb.push("(");
            for (i, alternative) in alternatives.iter().enumerate() {
                if i > 0 {
                    qb.push(" OR ");
                }
                qb.push("(");
                alternative.push_conjunction(qb);
                qb.push(")");
            }
            qb.push(")");
        }
    }
}
