//! Récupération paginée d'une collection JSON:API
//!
//! Une première page (`offset=0`) donne `meta.totalCount`, puis les pages
//! suivantes sont demandées tant que `offset < totalCount`. Les pages sont
//! concaténées dans l'ordre, sans réessai ni résultat partiel.

pub mod http;

use async_trait::async_trait;
use jsonapi_flat::{PageResponse, Resource};
use tracing::{debug, info, warn};

use crate::config::QueryParam;
use crate::error::{ForskolorError, Result};

pub use http::HttpPageSource;

/// Paramètres d'une requête de page
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageQuery {
    /// Filtres statiques, envoyés tels quels
    pub filters: Vec<QueryParam>,
    /// Tri (`sort`)
    pub sort: Option<String>,
    /// `page[limit]`
    pub limit: usize,
    /// `page[offset]`
    pub offset: u64,
}

impl PageQuery {
    /// Paires de la query string, dans l'ordre : filtres, limit, offset, sort
    pub fn params(&self) -> Vec<(String, String)> {
        let mut params: Vec<(String, String)> = self
            .filters
            .iter()
            .map(|f| (f.name.clone(), f.value.clone()))
            .collect();
        params.push(("page[limit]".to_string(), self.limit.to_string()));
        params.push(("page[offset]".to_string(), self.offset.to_string()));
        if let Some(sort) = &self.sort {
            params.push(("sort".to_string(), sort.clone()));
        }
        params
    }
}

/// Source de pages JSON:API
#[async_trait]
pub trait PageSource: Send + Sync {
    /// URL de la collection (sert aussi de clé de cache)
    fn endpoint(&self) -> &str;

    /// Récupère et valide une page
    async fn fetch_page(&self, query: &PageQuery) -> Result<PageResponse>;
}

/// Résultat d'une récupération complète
#[derive(Debug, Clone, PartialEq)]
pub struct FetchOutcome {
    /// Ressources, dans l'ordre des pages
    pub items: Vec<Resource>,
    /// `meta.totalCount` de la première page
    pub total_count: u64,
    /// Nombre de requêtes effectuées
    pub requests: usize,
}

/// Récupère toutes les ressources de la collection filtrée
pub async fn fetch_all<S: PageSource + ?Sized>(
    source: &S,
    filters: &[QueryParam],
    sort: Option<&str>,
    batch_size: usize,
) -> Result<FetchOutcome> {
    if batch_size == 0 {
        return Err(ForskolorError::Config("batch_size must be positive".into()));
    }

    let query = |offset: u64| PageQuery {
        filters: filters.to_vec(),
        sort: sort.map(str::to_string),
        limit: batch_size,
        offset,
    };

    let first = source.fetch_page(&query(0)).await?;
    let total_count = first.meta.total_count;
    let mut items = first.data;
    let mut requests = 1;
    debug!(offset = 0, items = items.len(), total_count, "Fetched page");

    let step = batch_size as u64;
    let mut next = Some(step);
    while let Some(offset) = next.filter(|offset| *offset < total_count) {
        let page = source.fetch_page(&query(offset)).await?;
        debug!(offset, items = page.data.len(), "Fetched page");
        items.extend(page.data);
        requests += 1;
        // Dépassement de u64 : plus aucune page à demander
        next = offset.checked_add(step);
    }

    if items.len() as u64 != total_count {
        warn!(
            endpoint = source.endpoint(),
            expected = total_count,
            received = items.len(),
            "Collection changed during pagination"
        );
    }

    info!(
        endpoint = source.endpoint(),
        requests,
        items = items.len(),
        "Fetched collection"
    );

    Ok(FetchOutcome {
        items,
        total_count,
        requests,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonapi_flat::Meta;
    use serde_json::Map;
    use std::sync::Mutex;

    /// Source en mémoire qui enregistre les offsets demandés
    struct FakeSource {
        total: u64,
        offsets: Mutex<Vec<u64>>,
    }

    impl FakeSource {
        fn new(total: u64) -> Self {
            Self {
                total,
                offsets: Mutex::new(Vec::new()),
            }
        }

        fn offsets(&self) -> Vec<u64> {
            self.offsets.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PageSource for FakeSource {
        fn endpoint(&self) -> &str {
            "memory://fake"
        }

        async fn fetch_page(&self, query: &PageQuery) -> Result<PageResponse> {
            self.offsets.lock().unwrap().push(query.offset);
            let end = (query.offset + query.limit as u64).min(self.total);
            let data = (query.offset..end)
                .map(|i| Resource::new(i.to_string(), Map::new()))
                .collect();
            Ok(PageResponse {
                meta: Meta {
                    total_count: self.total,
                },
                data,
            })
        }
    }

    #[test]
    fn test_query_params_order() {
        let query = PageQuery {
            filters: vec![QueryParam::new("filter[servicetype.id]", "2,1")],
            sort: Some("name".into()),
            limit: 100,
            offset: 200,
        };
        let params = query.params();
        let keys: Vec<_> = params.iter().map(|(k, _)| k.as_str()).collect();

        assert_eq!(
            keys,
            ["filter[servicetype.id]", "page[limit]", "page[offset]", "sort"]
        );
        assert_eq!(params[0].1, "2,1");
        assert_eq!(params[2].1, "200");
    }

    #[tokio::test]
    async fn test_offsets_250_by_100() {
        let source = FakeSource::new(250);
        let outcome = fetch_all(&source, &[], Some("name"), 100).await.unwrap();

        assert_eq!(source.offsets(), vec![0, 100, 200]);
        assert_eq!(outcome.requests, 3);
        assert_eq!(outcome.items.len(), 250);
        assert_eq!(outcome.items[0].id, "0");
        assert_eq!(outcome.items[249].id, "249");
    }

    #[tokio::test]
    async fn test_exact_multiple() {
        let source = FakeSource::new(200);
        let outcome = fetch_all(&source, &[], None, 100).await.unwrap();

        assert_eq!(source.offsets(), vec![0, 100]);
        assert_eq!(outcome.items.len(), 200);
    }

    #[tokio::test]
    async fn test_empty_collection_single_request() {
        let source = FakeSource::new(0);
        let outcome = fetch_all(&source, &[], None, 100).await.unwrap();

        assert_eq!(source.offsets(), vec![0]);
        assert_eq!(outcome.requests, 1);
        assert!(outcome.items.is_empty());
    }

    #[tokio::test]
    async fn test_request_count_is_ceil() {
        for (total, batch) in [(1u64, 1usize), (7, 3), (99, 100), (101, 100), (1000, 7)] {
            let source = FakeSource::new(total);
            let outcome = fetch_all(&source, &[], None, batch).await.unwrap();
            let expected = (total as usize).div_ceil(batch).max(1);

            assert_eq!(outcome.requests, expected, "total={} batch={}", total, batch);
            assert_eq!(outcome.items.len() as u64, total);
        }
    }

    /// Annonce un `totalCount` énorme sans jamais renvoyer de ressource
    struct HugeCountSource {
        offsets: Mutex<Vec<u64>>,
    }

    #[async_trait]
    impl PageSource for HugeCountSource {
        fn endpoint(&self) -> &str {
            "memory://huge"
        }

        async fn fetch_page(&self, query: &PageQuery) -> Result<PageResponse> {
            self.offsets.lock().unwrap().push(query.offset);
            Ok(PageResponse {
                meta: Meta {
                    total_count: u64::MAX,
                },
                data: Vec::new(),
            })
        }
    }

    #[cfg(target_pointer_width = "64")]
    #[tokio::test]
    async fn test_offset_overflow_stops_paging() {
        let source = HugeCountSource {
            offsets: Mutex::new(Vec::new()),
        };
        let batch = (1usize << 63) + 1;
        let outcome = fetch_all(&source, &[], None, batch).await.unwrap();

        assert_eq!(outcome.requests, 2);
        assert_eq!(*source.offsets.lock().unwrap(), vec![0, batch as u64]);
    }

    #[tokio::test]
    async fn test_zero_batch_size() {
        let source = FakeSource::new(10);
        let err = fetch_all(&source, &[], None, 0).await.unwrap_err();

        assert!(matches!(err, ForskolorError::Config(_)));
        assert!(source.offsets().is_empty());
    }
}
