//! Template binding: named markers to driver-ready positional SQL
//!
//! Templates are opaque text with `#{name}` markers; nothing else is parsed.
//! The builder only extracts names; whether a name exists in the parameter
//! value is checked at execution time by the parameter handler.

use crate::error::{MapperError, Result};

/// Driver-ready SQL plus the ordered parameter names it was built from.
///
/// Derived per invocation from a mapped statement and never mutated after
/// construction.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundSql {
    sql: String,
    param_names: Vec<String>,
}

impl BoundSql {
    /// Replaces every `#{name}` marker, left to right, with the positional
    /// marker `?` and records the names in substitution order.
    pub fn build(template: &str) -> Result<Self> {
        let mut sql = String::with_capacity(template.len());
        let mut param_names = Vec::new();
        let mut rest = template;

        while let Some(start) = rest.find("#{") {
            sql.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let end = after.find('}').ok_or_else(|| {
                MapperError::Statement(format!(
                    "unterminated parameter marker in template: {}",
                    template
                ))
            })?;
            let name = after[..end].trim();
            if name.is_empty() {
                return Err(MapperError::Statement(format!(
                    "empty parameter marker in template: {}",
                    template
                )));
            }
            param_names.push(name.to_string());
            sql.push('?');
            rest = &after[end + 1..];
        }
        sql.push_str(rest);

        Ok(Self { sql, param_names })
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitution_preserves_order() {
        let bound =
            BoundSql::build("select * from user where name = #{name} and age = #{age}").unwrap();
        assert_eq!(
            bound.sql(),
            "select * from user where name = ? and age = ?"
        );
        assert_eq!(bound.param_names(), ["name", "age"]);
    }

    #[test]
    fn plain_sql_passes_through_verbatim() {
        let bound = BoundSql::build("select * from user").unwrap();
        assert_eq!(bound.sql(), "select * from user");
        assert!(bound.param_names().is_empty());
    }

    #[test]
    fn repeated_names_are_kept_per_occurrence() {
        let bound = BoundSql::build("select #{id}, #{id} from user").unwrap();
        assert_eq!(bound.sql(), "select ?, ? from user");
        assert_eq!(bound.param_names(), ["id", "id"]);
    }

    #[test]
    fn marker_names_are_trimmed() {
        let bound = BoundSql::build("update user set age = #{ age } where id = #{id}").unwrap();
        assert_eq!(bound.param_names(), ["age", "id"]);
    }

    #[test]
    fn unterminated_marker_is_an_error() {
        assert!(matches!(
            BoundSql::build("select * from user where id = #{id"),
            Err(MapperError::Statement(_))
        ));
    }

    #[test]
    fn empty_marker_is_an_error() {
        assert!(matches!(
            BoundSql::build("select * from user where id = #{}"),
            Err(MapperError::Statement(_))
        ));
    }

    #[test]
    fn unknown_names_are_not_validated_at_build_time() {
        // Existence is the parameter handler's concern, not the builder's.
        let bound = BoundSql::build("select * from user where id = #{no_such_field}").unwrap();
        assert_eq!(bound.param_names(), ["no_such_field"]);
    }
}
