use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use hellodesk_base::{DeskError, DeskResult};

/// The closed set of item categories accepted by `/categories/{category}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemCategory {
    Electronics,
    Clothing,
    Toys,
    Books,
}

impl ItemCategory {
    pub const ALL: [ItemCategory; 4] = [
        ItemCategory::Electronics,
        ItemCategory::Clothing,
        ItemCategory::Toys,
        ItemCategory::Books,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Electronics => "electronics",
            Self::Clothing => "clothing",
            Self::Toys => "toys",
            Self::Books => "books",
        }
    }

    /// `'electronics', 'clothing', 'toys' or 'books'`
    pub fn expected_values() -> String {
        let quoted: Vec<String> = Self::ALL.iter().map(|c| format!("'{}'", c.as_str())).collect();
        match quoted.split_last() {
            Some((last, rest)) if !rest.is_empty() => format!("{} or {}", rest.join(", "), last),
            _ => quoted.join(""),
        }
    }
}

impl fmt::Display for ItemCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemCategory {
    type Err = Box<DeskError>;

    /// Exact, case-sensitive match on the lowercase name.
    fn from_str(s: &str) -> DeskResult<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| Box::new(DeskError::parse(format!("unknown item category '{}'", s))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_categories() {
        for category in ItemCategory::ALL {
            assert_eq!(category.as_str().parse::<ItemCategory>().unwrap(), category);
        }
    }

    #[test]
    fn test_parse_rejects_unknown_and_wrong_case() {
        assert!("food".parse::<ItemCategory>().is_err());
        assert!("Books".parse::<ItemCategory>().is_err());
        assert!("".parse::<ItemCategory>().is_err());
    }

    #[test]
    fn test_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&ItemCategory::Electronics).unwrap(),
            r#""electronics""#
        );
    }
}
