//! Sort order for ORDER BY clauses

use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

impl FromStr for SortOrder {
    type Err = ();

    /// Parses `asc` / `desc` in any case; anything else is rejected
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("asc") {
            Ok(SortOrder::Asc)
        } else if s.trim().eq_ignore_ascii_case("desc") {
            Ok(SortOrder::Desc)
        } else {
            Err(())
        }
    }
}
