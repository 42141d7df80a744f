//! Dynamic WHERE clause construction.

use domain::services::ScopeFilter;

/// Collects SQL conditions and tracks parameter positions.
///
/// Conditions are templates in which `{}` stands for the next positional
/// parameter; values must be bound in the order conditions were added.
#[derive(Debug, Default)]
pub(crate) struct FilterBuilder {
    conditions: Vec<String>,
    param_count: usize,
}

impl FilterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts numbering after `n` parameters already used by the query.
    pub fn after(n: usize) -> Self {
        Self {
            conditions: Vec::new(),
            param_count: n,
        }
    }

    /// Adds a condition that takes one parameter.
    pub fn param(&mut self, template: &str) -> &mut Self {
        self.param_count += 1;
        self.conditions
            .push(template.replace("{}", &format!("${}", self.param_count)));
        self
    }

    /// Adds a condition without parameters.
    pub fn raw(&mut self, condition: &str) -> &mut Self {
        self.conditions.push(condition.to_string());
        self
    }

    /// Adds the scope restriction. Returns the id to bind, if the scope
    /// needs one.
    pub fn scope(&mut self, scope: &ScopeFilter, company: &str, location: &str) -> Option<i64> {
        match scope {
            ScopeFilter::Global => None,
            ScopeFilter::Company(id) => {
                self.param(company);
                Some(*id)
            }
            ScopeFilter::Location(id) => {
                self.param(location);
                Some(*id)
            }
            ScopeFilter::Empty => {
                self.raw("FALSE");
                None
            }
        }
    }

    pub fn where_clause(&self) -> String {
        if self.conditions.is_empty() {
            "TRUE".to_string()
        } else {
            self.conditions.join(" AND ")
        }
    }

    pub fn param_count(&self) -> usize {
        self.param_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_builder_matches_everything() {
        assert_eq!(FilterBuilder::new().where_clause(), "TRUE");
    }

    #[test]
    fn test_parameters_are_numbered_in_order() {
        let mut builder = FilterBuilder::after(1);
        builder.param("action = {}").param("created_at >= {}");
        assert_eq!(builder.where_clause(), "action = $2 AND created_at >= $3");
        assert_eq!(builder.param_count(), 3);
    }

    #[test]
    fn test_scope_conditions() {
        let mut builder = FilterBuilder::new();
        let bind = builder.scope(&ScopeFilter::Company(7), "l.company_id = {}", "d.location_id = {}");
        assert_eq!(bind, Some(7));
        assert_eq!(builder.where_clause(), "l.company_id = $1");

        let mut builder = FilterBuilder::new();
        let bind = builder.scope(&ScopeFilter::Location(3), "l.company_id = {}", "d.location_id = {}");
        assert_eq!(bind, Some(3));
        assert_eq!(builder.where_clause(), "d.location_id = $1");

        let mut builder = FilterBuilder::new();
        assert_eq!(builder.scope(&ScopeFilter::Global, "a = {}", "b = {}"), None);
        assert_eq!(builder.where_clause(), "TRUE");

        let mut builder = FilterBuilder::new();
        assert_eq!(builder.scope(&ScopeFilter::Empty, "a = {}", "b = {}"), None);
        assert_eq!(builder.where_clause(), "FALSE");
    }
}
