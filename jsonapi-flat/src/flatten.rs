//! Aplatissement des ressources JSON:API en table
//!
//! Chaque ressource donne une ligne : `id`, puis les colonnes des attributs,
//! des relations et des liens. Les objets imbriqués deviennent des noms pointés
//! (`location.east`), les tableaux et scalaires sont des feuilles.
//!
//! Gestion des collisions : une clé présente dans plusieurs groupes (ou égale à
//! `id`) est préfixée par le nom du groupe partout où elle apparaît
//! (`attributes.name`, `links.name`). Les autres clés gardent leur nom nu.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::types::{Group, Resource};
use crate::{JsonApiError, Table};

/// Nom de la colonne identifiant
pub const ID_COLUMN: &str = "id";

/// Politique de nommage des colonnes en cas de collision entre groupes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionPolicy {
    /// Préfixe uniquement les clés en collision
    #[default]
    PrefixColliding,
    /// Préfixe toutes les colonnes par leur groupe
    PrefixAll,
}

/// Aplatit récursivement un objet en paires `(nom.pointé, valeur)`
pub fn flatten_object(map: &Map<String, Value>, prefix: &str, out: &mut Vec<(String, Value)>) {
    for (key, value) in map {
        let name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };
        match value {
            Value::Object(inner) => flatten_object(inner, &name, out),
            leaf => out.push((name, leaf.clone())),
        }
    }
}

/// Clés aplaties d'un groupe, dans l'ordre de première apparition
#[derive(Default)]
struct GroupKeys {
    order: Vec<String>,
    seen: HashSet<String>,
}

impl GroupKeys {
    fn add(&mut self, key: &str) {
        if !self.seen.contains(key) {
            self.seen.insert(key.to_string());
            self.order.push(key.to_string());
        }
    }
}

/// Aplatit une liste de ressources en une table (une ligne par ressource)
pub fn flatten_resources(
    items: &[Resource],
    policy: CollisionPolicy,
) -> Result<Table, JsonApiError> {
    // Aplatissement de chaque groupe de chaque ressource
    let flat: Vec<[Vec<(String, Value)>; 3]> = items
        .iter()
        .map(|item| {
            Group::ALL.map(|group| {
                let mut out = Vec::new();
                flatten_object(item.group(group), "", &mut out);
                out
            })
        })
        .collect();

    // `{"location.east": 1, "location": {"east": 2}}` donne deux fois le même nom
    for groups in &flat {
        for pairs in groups {
            let mut names = HashSet::with_capacity(pairs.len());
            if let Some((name, _)) = pairs.iter().find(|(name, _)| !names.insert(name.as_str())) {
                return Err(JsonApiError::ColumnCollision(name.clone()));
            }
        }
    }

    let mut keys: [GroupKeys; 3] = Default::default();
    for groups in &flat {
        for (g, pairs) in groups.iter().enumerate() {
            for (key, _) in pairs {
                keys[g].add(key);
            }
        }
    }

    // Nombre de groupes où chaque clé apparaît
    let mut occurrences: HashMap<&str, usize> = HashMap::new();
    for group_keys in &keys {
        for key in &group_keys.order {
            *occurrences.entry(key.as_str()).or_default() += 1;
        }
    }

    let mut columns = vec![ID_COLUMN.to_string()];
    let mut positions: [HashMap<&str, usize>; 3] = Default::default();
    for (g, group) in Group::ALL.iter().enumerate() {
        for key in &keys[g].order {
            let colliding = key == ID_COLUMN || occurrences[key.as_str()] > 1;
            let name = match policy {
                CollisionPolicy::PrefixAll => format!("{}.{}", group.name(), key),
                CollisionPolicy::PrefixColliding if colliding => {
                    debug!(key = %key, group = group.name(), "Prefixing colliding column");
                    format!("{}.{}", group.name(), key)
                }
                CollisionPolicy::PrefixColliding => key.clone(),
            };
            positions[g].insert(key.as_str(), columns.len());
            columns.push(name);
        }
    }

    // Table::new refuse les doublons restants (ex: `links.self` nu contre préfixé)
    let mut table = Table::new(columns)?;
    let width = table.columns().len();

    for (item, groups) in items.iter().zip(flat) {
        let mut row = vec![Value::Null; width];
        row[0] = Value::String(item.id.clone());
        for (g, pairs) in groups.into_iter().enumerate() {
            for (key, value) in pairs {
                row[positions[g][key.as_str()]] = value;
            }
        }
        table.push_row(row)?;
    }

    debug!(
        rows = table.len(),
        columns = table.columns().len(),
        "Flattened resources"
    );
    Ok(table)
}
