//! Cache LRU à expiration
//!
//! Le cache est un objet explicite, possédé par le pipeline, avec une durée de
//! vie, une capacité bornée et une invalidation manuelle.

use std::hash::Hash;
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use lru::LruCache;

use crate::config::QueryParam;

/// Capacité par défaut (nombre de requêtes distinctes gardées)
pub const DEFAULT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(16) {
    Some(n) => n,
    None => unreachable!(),
};

/// Clé de cache : la requête qui a produit la donnée
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub endpoint: String,
    pub filters: Vec<QueryParam>,
    pub sort: Option<String>,
}

/// Cache LRU dont les entrées expirent après `ttl`
#[derive(Debug)]
pub struct TtlCache<K: Hash + Eq, V> {
    ttl: Duration,
    entries: LruCache<K, (Instant, V)>,
}

impl<K: Eq + Hash, V: Clone> TtlCache<K, V> {
    pub fn new(capacity: NonZeroUsize, ttl: Duration) -> Self {
        Self {
            ttl,
            entries: LruCache::new(capacity),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Valeur en cache si elle n'a pas expiré (une entrée expirée est supprimée)
    pub fn get(&mut self, key: &K) -> Option<V> {
        self.get_at(key, Instant::now())
    }

    fn get_at(&mut self, key: &K, now: Instant) -> Option<V> {
        let expired = match self.entries.peek(key) {
            Some((inserted, _)) => now.saturating_duration_since(*inserted) >= self.ttl,
            None => return None,
        };
        if expired {
            self.entries.pop(key);
            return None;
        }
        // get promeut l'entrée en tête (MRU)
        self.entries.get(key).map(|(_, value)| value.clone())
    }

    /// Insère une valeur, la moins récemment utilisée est évincée si plein
    pub fn insert(&mut self, key: K, value: V) {
        self.insert_at(key, value, Instant::now());
    }

    fn insert_at(&mut self, key: K, value: V, now: Instant) {
        self.entries.put(key, (now, value));
    }

    /// Supprime une entrée, retourne vrai si elle existait
    pub fn invalidate(&mut self, key: &K) -> bool {
        self.entries.pop(key).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Nombre d'entrées (expirées comprises tant qu'elles n'ont pas été lues)
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
