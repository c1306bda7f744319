//! Types de données JSON:API (pages et ressources)

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::JsonApiError;

/// Une ressource JSON:API telle que renvoyée par l'API
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Resource {
    /// Identifiant (les identifiants numériques sont convertis en chaîne)
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,

    /// Attributs de la ressource
    #[serde(default, deserialize_with = "nullable_map")]
    pub attributes: Map<String, Value>,

    /// Relations vers d'autres ressources
    #[serde(default, deserialize_with = "nullable_map")]
    pub relationships: Map<String, Value>,

    /// Liens associés
    #[serde(default, deserialize_with = "nullable_map")]
    pub links: Map<String, Value>,
}

impl Resource {
    /// Crée une ressource sans relations ni liens
    pub fn new(id: impl Into<String>, attributes: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            attributes,
            relationships: Map::new(),
            links: Map::new(),
        }
    }

    /// Retourne le groupe demandé
    pub fn group(&self, group: Group) -> &Map<String, Value> {
        match group {
            Group::Attributes => &self.attributes,
            Group::Relationships => &self.relationships,
            Group::Links => &self.links,
        }
    }
}

/// Les trois groupes imbriqués d'une ressource, dans l'ordre des colonnes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Group {
    Attributes,
    Relationships,
    Links,
}

impl Group {
    /// Tous les groupes, dans l'ordre d'aplatissement
    pub const ALL: [Group; 3] = [Group::Attributes, Group::Relationships, Group::Links];

    /// Nom du groupe, utilisé comme préfixe de colonne
    pub fn name(self) -> &'static str {
        match self {
            Group::Attributes => "attributes",
            Group::Relationships => "relationships",
            Group::Links => "links",
        }
    }
}

/// Métadonnées de pagination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Meta {
    /// Nombre total de ressources de la collection filtrée
    #[serde(rename = "totalCount")]
    pub total_count: u64,
}

/// Une page de réponse `{meta: {totalCount}, data: [...]}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageResponse {
    pub meta: Meta,
    pub data: Vec<Resource>,
}

impl PageResponse {
    /// Parse une page depuis des octets bruts
    pub fn from_slice(bytes: &[u8]) -> Result<Self, JsonApiError> {
        let value: Value = serde_json::from_slice(bytes)?;
        Self::from_value(value)
    }

    /// Valide et convertit une valeur JSON en page
    ///
    /// `meta.totalCount` et `data` sont obligatoires : une page sans l'un des deux
    /// est rejetée plutôt que traitée comme vide.
    pub fn from_value(value: Value) -> Result<Self, JsonApiError> {
        let mut root = match value {
            Value::Object(root) => root,
            other => {
                return Err(JsonApiError::invalid_field(
                    "$",
                    format!("expected an object, got {}", kind(&other)),
                ))
            }
        };

        let total = root
            .get("meta")
            .and_then(|meta| meta.get("totalCount"))
            .ok_or(JsonApiError::MissingField("meta.totalCount"))?;
        let total_count = total.as_u64().ok_or_else(|| {
            JsonApiError::invalid_field(
                "meta.totalCount",
                format!("expected a non-negative integer, got {}", total),
            )
        })?;

        let data = match root.remove("data") {
            Some(Value::Array(items)) => items,
            Some(other) => {
                return Err(JsonApiError::invalid_field(
                    "data",
                    format!("expected an array, got {}", kind(&other)),
                ))
            }
            None => return Err(JsonApiError::MissingField("data")),
        };

        let data = data
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                serde_json::from_value(item)
                    .map_err(|e| JsonApiError::invalid_resource(index, e.to_string()))
            })
            .collect::<Result<Vec<Resource>, _>>()?;

        Ok(Self {
            meta: Meta { total_count },
            data,
        })
    }
}

/// Nom lisible du type d'une valeur JSON
fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn id_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "id must be a string or a number, got {}",
            kind(&other)
        ))),
    }
}

fn nullable_map<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Map<String, Value>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_page() {
        let page = PageResponse::from_value(json!({
            "meta": {"totalCount": 2},
            "data": [
                {"id": "a", "attributes": {"name": "Ekorren"}},
                {"id": 42, "attributes": null, "links": {"self": "/42"}}
            ]
        }))
        .unwrap();

        assert_eq!(page.meta.total_count, 2);
        assert_eq!(page.data.len(), 2);
        assert_eq!(page.data[0].id, "a");
        assert_eq!(page.data[1].id, "42");
        assert!(page.data[1].attributes.is_empty());
        assert!(page.data[0].relationships.is_empty());
        assert_eq!(page.data[1].links["self"], json!("/42"));
    }

    #[test]
    fn test_missing_total_count() {
        let err = PageResponse::from_value(json!({"meta": {}, "data": []})).unwrap_err();
        assert!(matches!(err, JsonApiError::MissingField("meta.totalCount")));

        let err = PageResponse::from_value(json!({"data": []})).unwrap_err();
        assert!(matches!(err, JsonApiError::MissingField("meta.totalCount")));
    }

    #[test]
    fn test_missing_data() {
        let err = PageResponse::from_value(json!({"meta": {"totalCount": 0}})).unwrap_err();
        assert!(matches!(err, JsonApiError::MissingField("data")));
    }

    #[test]
    fn test_negative_total_count() {
        let err =
            PageResponse::from_value(json!({"meta": {"totalCount": -1}, "data": []})).unwrap_err();
        assert!(matches!(err, JsonApiError::InvalidField { .. }));
    }

    #[test]
    fn test_invalid_json() {
        let err = PageResponse::from_slice(b"{not json").unwrap_err();
        assert!(matches!(err, JsonApiError::InvalidJson(_)));
    }

    #[test]
    fn test_resource_without_id() {
        let err = PageResponse::from_value(json!({
            "meta": {"totalCount": 1},
            "data": [{"attributes": {}}]
        }))
        .unwrap_err();
        assert!(matches!(err, JsonApiError::InvalidResource { index: 0, .. }));
    }

    #[test]
    fn test_group_names() {
        let names: Vec<_> = Group::ALL.iter().map(|g| g.name()).collect();
        assert_eq!(names, ["attributes", "relationships", "links"]);
    }
}
