//! Table plate immuable : colonnes nommées, lignes de valeurs JSON
//!
//! Les transformations (`drop_columns`, `with_column`) renvoient une nouvelle
//! table, la table source n'est jamais modifiée.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::JsonApiError;

/// Table plate, une ligne par ressource
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Crée une table vide avec les colonnes données
    pub fn new(columns: Vec<String>) -> Result<Self, JsonApiError> {
        let mut index = HashMap::with_capacity(columns.len());
        for (i, name) in columns.iter().enumerate() {
            if index.insert(name.clone(), i).is_some() {
                return Err(JsonApiError::ColumnCollision(name.clone()));
            }
        }
        Ok(Self {
            columns,
            index,
            rows: Vec::new(),
        })
    }

    /// Ajoute une ligne (doit avoir une valeur par colonne)
    pub fn push_row(&mut self, row: Vec<Value>) -> Result<(), JsonApiError> {
        if row.len() != self.columns.len() {
            return Err(JsonApiError::RowLength {
                expected: self.columns.len(),
                actual: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Nombre de lignes
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Valeur d'une cellule (`None` si la ligne ou la colonne n'existe pas)
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let col = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[col])
    }

    pub fn row(&self, row: usize) -> Option<&[Value]> {
        self.rows.get(row).map(Vec::as_slice)
    }

    /// Itère sur les lignes dans l'ordre
    pub fn rows(&self) -> impl Iterator<Item = &[Value]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Itère sur les valeurs d'une colonne
    pub fn column(&self, name: &str) -> Result<impl Iterator<Item = &Value>, JsonApiError> {
        let col = self
            .column_index(name)
            .ok_or_else(|| JsonApiError::UnknownColumn(name.to_string()))?;
        Ok(self.rows.iter().map(move |r| &r[col]))
    }

    /// Ligne sous forme d'objet JSON `{colonne: valeur}` (ordre des colonnes conservé)
    pub fn record(&self, row: usize) -> Option<Map<String, Value>> {
        let values = self.rows.get(row)?;
        Some(
            self.columns
                .iter()
                .cloned()
                .zip(values.iter().cloned())
                .collect(),
        )
    }

    /// Nouvelle table sans les colonnes données
    pub fn drop_columns(&self, names: &[&str]) -> Result<Table, JsonApiError> {
        let mut dropped = Vec::with_capacity(names.len());
        for name in names {
            let col = self
                .column_index(name)
                .ok_or_else(|| JsonApiError::UnknownColumn(name.to_string()))?;
            dropped.push(col);
        }

        let keep: Vec<usize> = (0..self.columns.len())
            .filter(|i| !dropped.contains(i))
            .collect();

        let mut table = Table::new(keep.iter().map(|&i| self.columns[i].clone()).collect())?;
        table.rows = self
            .rows
            .iter()
            .map(|r| keep.iter().map(|&i| r[i].clone()).collect())
            .collect();
        Ok(table)
    }

    /// Nouvelle table avec une colonne ajoutée à droite
    pub fn with_column(&self, name: &str, values: Vec<Value>) -> Result<Table, JsonApiError> {
        if values.len() != self.rows.len() {
            return Err(JsonApiError::RowLength {
                expected: self.rows.len(),
                actual: values.len(),
            });
        }

        let mut columns = self.columns.clone();
        columns.push(name.to_string());
        let mut table = Table::new(columns)?;
        table.rows = self
            .rows
            .iter()
            .zip(values)
            .map(|(r, v)| {
                let mut row = r.clone();
                row.push(v);
                row
            })
            .collect();
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Table {
        let mut table = Table::new(vec!["id".into(), "name".into(), "east".into()]).unwrap();
        table
            .push_row(vec![json!("1"), json!("Ekorren"), json!(153000)])
            .unwrap();
        table
            .push_row(vec![json!("2"), Value::Null, json!(154000)])
            .unwrap();
        table
    }

    #[test]
    fn test_duplicate_column() {
        let err = Table::new(vec!["id".into(), "id".into()]).unwrap_err();
        assert!(matches!(err, JsonApiError::ColumnCollision(name) if name == "id"));
    }

    #[test]
    fn test_push_row_length() {
        let mut table = Table::new(vec!["id".into()]).unwrap();
        let err = table.push_row(vec![json!(1), json!(2)]).unwrap_err();
        assert!(matches!(err, JsonApiError::RowLength { expected: 1, actual: 2 }));
    }

    #[test]
    fn test_get_and_column() {
        let table = sample();
        assert_eq!(table.get(0, "name"), Some(&json!("Ekorren")));
        assert_eq!(table.get(1, "name"), Some(&Value::Null));
        assert_eq!(table.get(2, "name"), None);
        assert_eq!(table.get(0, "missing"), None);

        let ids: Vec<_> = table.column("id").unwrap().cloned().collect();
        assert_eq!(ids, vec![json!("1"), json!("2")]);
        assert!(table.column("missing").is_err());
    }

    #[test]
    fn test_drop_columns_keeps_source() {
        let table = sample();
        let dropped = table.drop_columns(&["east"]).unwrap();

        assert_eq!(dropped.columns(), ["id", "name"]);
        assert_eq!(dropped.len(), 2);
        assert!(dropped.column_index("east").is_none());
        assert_eq!(table.columns().len(), 3);
        assert!(table.drop_columns(&["nope"]).is_err());
    }

    #[test]
    fn test_with_column() {
        let table = sample();
        let extended = table.with_column("lon", vec![json!(18.0), json!(18.1)]).unwrap();

        assert_eq!(extended.columns().last().unwrap(), "lon");
        assert_eq!(extended.get(1, "lon"), Some(&json!(18.1)));
        assert!(table.with_column("name", vec![json!(1), json!(2)]).is_err());
        assert!(table.with_column("x", vec![json!(1)]).is_err());
    }

    #[test]
    fn test_record_order() {
        let record = sample().record(0).unwrap();
        let keys: Vec<_> = record.keys().cloned().collect();
        assert_eq!(keys, ["id", "name", "east"]);
    }
}
