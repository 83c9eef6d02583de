use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Identifies one editable cell by row name and column name.
/// Serializes to a string format like "Working Capital:SBA 7(a)".
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct CellKey {
    row: String,
    column: String,
}

impl CellKey {
    pub fn new(row: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            row: row.into(),
            column: column.into(),
        }
    }

    pub fn row(&self) -> &str {
        &self.row
    }

    pub fn column(&self) -> &str {
        &self.column
    }
}

impl fmt::Display for CellKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.row, self.column)
    }
}

impl FromStr for CellKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Expected format: "row:column". Row names do not contain colons;
        // the split is at the first one.
        let Some((row, column)) = s.split_once(':') else {
            anyhow::bail!("CellKey must be in format 'row:column', got: {s}");
        };
        let row = row.trim();
        let column = column.trim();
        if row.is_empty() || column.is_empty() {
            anyhow::bail!("CellKey must name both a row and a column, got: {s}");
        }
        Ok(CellKey::new(row, column))
    }
}

impl Serialize for CellKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for CellKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        CellKey::from_str(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_key_display() {
        let key = CellKey::new("Working Capital", "Borrower Equity");
        assert_eq!(key.to_string(), "Working Capital:Borrower Equity");
    }

    #[test]
    fn test_cell_key_from_str() {
        let key: CellKey = "Working Capital:SBA 7(a)".parse().unwrap();
        assert_eq!(key, CellKey::new("Working Capital", "SBA 7(a)"));

        // Test with extra whitespace
        let key: CellKey = " Inventory : Borrower Equity ".parse().unwrap();
        assert_eq!(key, CellKey::new("Inventory", "Borrower Equity"));
    }

    #[test]
    fn test_cell_key_from_str_invalid() {
        assert!("no separator".parse::<CellKey>().is_err());
        assert!(":missing row".parse::<CellKey>().is_err());
        assert!("missing column:".parse::<CellKey>().is_err());
    }

    #[test]
    fn test_cell_key_roundtrip() {
        let original = CellKey::new("Closing Costs", "Seller Note");
        let serialized = serde_json::to_string(&original).unwrap();
        assert_eq!(serialized, r#""Closing Costs:Seller Note""#);
        let deserialized: CellKey = serde_json::from_str(&serialized).unwrap();
        assert_eq!(original, deserialized);
    }
}
