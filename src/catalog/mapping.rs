use std::collections::{BTreeMap, HashMap};

use crate::catalog::parser::RawRow;
use crate::domain::field::CanonicalField;

/// Per-run table of canonical field to source column name.
///
/// Only fields the caller named are stored; the rest use their canonical key
/// as the column name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMapping {
    columns: BTreeMap<CanonicalField, String>,
}

impl ColumnMapping {
    /// Builds a mapping from a flat `{canonicalField: sourceColumn}` table.
    ///
    /// Unknown canonical keys and blank column names are logged and skipped.
    pub fn from_table<K, V>(table: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut mapping = Self::default();
        for (key, column) in table {
            let column = column.as_ref().trim();
            match CanonicalField::try_from(key.as_ref()) {
                Ok(_) if column.is_empty() => {
                    log::warn!("Ignoring blank source column for field '{}'", key.as_ref());
                }
                Ok(field) => {
                    mapping.columns.insert(field, column.to_string());
                }
                Err(e) => log::warn!("Ignoring column mapping entry: {e}"),
            }
        }
        mapping
    }

    /// Parses a JSON object mapping. Absent, blank or malformed input yields
    /// the default mapping; malformed input is logged rather than rejected.
    pub fn from_json(input: Option<&str>) -> Self {
        let Some(input) = input.map(str::trim).filter(|input| !input.is_empty()) else {
            return Self::default();
        };

        match serde_json::from_str::<HashMap<String, String>>(input) {
            Ok(table) => Self::from_table(table),
            Err(e) => {
                log::warn!("Malformed column mapping, using defaults: {e}");
                Self::default()
            }
        }
    }

    /// Layers `overrides` on top of this mapping. Every field `overrides`
    /// names wins, even when it names the canonical key.
    pub fn merged_with(mut self, overrides: &ColumnMapping) -> Self {
        for (field, column) in &overrides.columns {
            self.columns.insert(*field, column.clone());
        }
        self
    }

    pub fn with_column(mut self, field: CanonicalField, column: impl Into<String>) -> Self {
        self.columns.insert(field, column.into());
        self
    }

    /// Configured source column for `field`.
    pub fn source_column(&self, field: CanonicalField) -> &str {
        self.columns
            .get(&field)
            .map(String::as_str)
            .unwrap_or(field.as_str())
    }

    /// Value of `field` in `row`: the mapped column if the row has it, then
    /// the canonical key, then the first historical alternate the row has,
    /// else an empty string.
    pub fn resolve<'r>(&self, field: CanonicalField, row: &'r RawRow) -> &'r str {
        std::iter::once(self.source_column(field))
            .chain(std::iter::once(field.as_str()))
            .chain(field.fallback_columns().iter().copied())
            .find_map(|column| row.get(column))
            .unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(fields: &[(&str, &str)]) -> RawRow {
        RawRow::new(
            2,
            fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn default_mapping_uses_canonical_keys() {
        let mapping = ColumnMapping::default();
        let row = row(&[("ref", "A"), ("unit_price", "9.90")]);

        assert_eq!(mapping.resolve(CanonicalField::Ref, &row), "A");
        assert_eq!(mapping.resolve(CanonicalField::UnitPrice, &row), "9.90");
    }

    #[test]
    fn mapped_column_wins_over_fallbacks() {
        let mapping = ColumnMapping::default().with_column(CanonicalField::Ref, "Code article");
        let row = row(&[("sku", "FALLBACK"), ("Code article", "MAPPED")]);

        assert_eq!(mapping.resolve(CanonicalField::Ref, &row), "MAPPED");
    }

    #[test]
    fn canonical_key_is_tried_when_mapped_column_is_absent() {
        let mapping = ColumnMapping::default()
            .with_column(CanonicalField::Ref, "Code article")
            .with_column(CanonicalField::UnitPrice, "Tarif");
        let row = row(&[("ref", "A"), ("unit_price", "2.00"), ("sku", "OTHER")]);

        assert_eq!(mapping.resolve(CanonicalField::Ref, &row), "A");
        assert_eq!(mapping.resolve(CanonicalField::UnitPrice, &row), "2.00");
    }

    #[test]
    fn falls_back_to_historical_names_in_order() {
        let mapping = ColumnMapping::default();
        let row = row(&[("prix", "3"), ("price", "4")]);

        assert_eq!(mapping.resolve(CanonicalField::UnitPrice, &row), "4");
    }

    #[test]
    fn missing_column_resolves_to_empty() {
        let mapping = ColumnMapping::default();
        let row = row(&[("ref", "A")]);

        assert_eq!(mapping.resolve(CanonicalField::Description, &row), "");
    }

    #[test]
    fn present_but_empty_mapped_column_is_used() {
        let mapping = ColumnMapping::default();
        let row = row(&[("ref", ""), ("sku", "B")]);

        assert_eq!(mapping.resolve(CanonicalField::Ref, &row), "");
    }

    #[test]
    fn parses_json_mapping() {
        let mapping =
            ColumnMapping::from_json(Some(r#"{"ref": "Référence", "primaryName": "Nom"}"#));

        assert_eq!(mapping.source_column(CanonicalField::Ref), "Référence");
        assert_eq!(mapping.source_column(CanonicalField::PrimaryName), "Nom");
        assert_eq!(mapping.source_column(CanonicalField::Size), "size");
    }

    #[test]
    fn malformed_json_falls_back_to_default() {
        assert_eq!(
            ColumnMapping::from_json(Some("{not json")),
            ColumnMapping::default()
        );
        assert_eq!(ColumnMapping::from_json(None), ColumnMapping::default());
        assert_eq!(ColumnMapping::from_json(Some("  ")), ColumnMapping::default());
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let mapping = ColumnMapping::from_table([("colour", "Couleur"), ("size", "Contenance")]);

        assert_eq!(mapping.source_column(CanonicalField::Size), "Contenance");
    }

    #[test]
    fn overrides_replace_only_customized_fields() {
        let base = ColumnMapping::default().with_column(CanonicalField::Ref, "Code");
        let overrides = ColumnMapping::default().with_column(CanonicalField::Size, "Volume");

        let merged = base.merged_with(&overrides);

        assert_eq!(merged.source_column(CanonicalField::Ref), "Code");
        assert_eq!(merged.source_column(CanonicalField::Size), "Volume");
    }

    #[test]
    fn override_naming_the_canonical_key_still_wins() {
        let base = ColumnMapping::from_table([("ref", "Code")]);
        let overrides = ColumnMapping::from_json(Some(r#"{"ref": "ref"}"#));

        let merged = base.merged_with(&overrides);

        assert_eq!(merged.source_column(CanonicalField::Ref), "ref");
    }
}
