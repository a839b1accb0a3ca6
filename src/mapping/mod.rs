//! Declarative statement mappings

mod bound_sql;
mod statement;

pub use bound_sql::BoundSql;
pub use statement::{MappedStatement, MappedStatementBuilder, SqlCommandType};
