//! Query builder utilities
//!
//! This module provides SQL query construction utilities.

pub mod builder;
pub mod filter;
pub mod ordering;
pub mod sql_generation;


pub use builder::QueryBuilder;
pub use filter::{LogicalOperator, QueryCondition, QueryFilter, QueryOperator};
pub use ordering::SortOrder;
pub use sql_generation::SqlGenerator;
