//! Source de pages HTTP (reqwest)

use std::time::Duration;

use async_trait::async_trait;
use jsonapi_flat::PageResponse;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Request};
use tracing::trace;

use super::{PageQuery, PageSource};
use crate::error::{ForskolorError, Result};

/// User agent envoyé avec chaque requête
pub const DEFAULT_USER_AGENT: &str = concat!("forskolor/", env!("CARGO_PKG_VERSION"));

/// Source de pages sur une API JSON:API réelle
#[derive(Debug, Clone)]
pub struct HttpPageSource {
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl HttpPageSource {
    /// Crée une source avec un délai explicite par requête
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(DEFAULT_USER_AGENT)
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .map_err(|e| ForskolorError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            timeout,
        })
    }

    /// Construit la requête GET d'une page (corps vide, `Content-Type: application/json`)
    pub fn build_request(&self, query: &PageQuery) -> Result<Request> {
        self.client
            .get(&self.endpoint)
            .query(&query.params())
            .header(CONTENT_TYPE, "application/json")
            .build()
            .map_err(|e| self.convert_error(&e, &self.endpoint))
    }

    /// Convertit une erreur reqwest en erreur du pipeline
    fn convert_error(&self, error: &reqwest::Error, url: &str) -> ForskolorError {
        if error.is_timeout() {
            return ForskolorError::Timeout {
                url: url.to_owned(),
                timeout_secs: self.timeout.as_secs(),
            };
        }

        if let Some(status) = error.status() {
            return ForskolorError::HttpStatus {
                url: url.to_owned(),
                status: status.as_u16(),
            };
        }

        ForskolorError::Network {
            url: url.to_owned(),
            message: error.to_string(),
        }
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn fetch_page(&self, query: &PageQuery) -> Result<PageResponse> {
        let request = self.build_request(query)?;
        let url = request.url().to_string();
        trace!(url = %url, "GET");

        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| self.convert_error(&e, &url))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ForskolorError::HttpStatus {
                url,
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| self.convert_error(&e, &url))?;

        PageResponse::from_slice(&body)
            .map_err(|source| ForskolorError::MalformedResponse { url, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QueryParam;

    fn source() -> HttpPageSource {
        HttpPageSource::new("http://units.example.com/serviceunits", Duration::from_secs(5))
            .expect("source should build")
    }

    #[test]
    fn test_build_request() {
        let query = PageQuery {
            filters: vec![QueryParam::new("filter[servicetype.id]", "2,1")],
            sort: Some("name".into()),
            limit: 100,
            offset: 300,
        };
        let request = source().build_request(&query).unwrap();

        assert_eq!(request.method(), reqwest::Method::GET);
        assert_eq!(request.url().path(), "/serviceunits");
        assert_eq!(
            request.headers().get(CONTENT_TYPE).unwrap(),
            "application/json"
        );
        assert!(request.body().is_none());

        let pairs: Vec<(String, String)> = request
            .url()
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("filter[servicetype.id]".to_string(), "2,1".to_string()),
                ("page[limit]".to_string(), "100".to_string()),
                ("page[offset]".to_string(), "300".to_string()),
                ("sort".to_string(), "name".to_string()),
            ]
        );
    }

    /// Serveur local qui répond une seule fois avec `status` et `body`
    async fn serve_once(status: &str, body: &str) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio::net::TcpListener;

        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });

        format!("http://{}/serviceunits", addr)
    }

    fn first_page() -> PageQuery {
        PageQuery {
            filters: vec![QueryParam::new("filter[servicetype.id]", "2,1")],
            sort: Some("name".into()),
            limit: 100,
            offset: 0,
        }
    }

    #[tokio::test]
    async fn test_valid_page() {
        let endpoint = serve_once(
            "200 OK",
            r#"{"meta":{"totalCount":1},"data":[{"id":"7","attributes":{"name":"Ekorren"}}]}"#,
        )
        .await;
        let source = HttpPageSource::new(endpoint, Duration::from_secs(5)).unwrap();

        let page = source.fetch_page(&first_page()).await.unwrap();
        assert_eq!(page.meta.total_count, 1);
        assert_eq!(page.data[0].id, "7");
    }

    #[tokio::test]
    async fn test_non_2xx_status() {
        let endpoint = serve_once("503 Service Unavailable", "").await;
        let source = HttpPageSource::new(endpoint, Duration::from_secs(5)).unwrap();

        let err = source.fetch_page(&first_page()).await.unwrap_err();
        assert!(
            matches!(err, ForskolorError::HttpStatus { status: 503, .. }),
            "unexpected error: {:?}",
            err
        );
        assert!(err.is_network());
    }

    #[tokio::test]
    async fn test_missing_total_count_is_malformed() {
        let endpoint = serve_once("200 OK", r#"{"data":[]}"#).await;
        let source = HttpPageSource::new(endpoint, Duration::from_secs(5)).unwrap();

        let err = source.fetch_page(&first_page()).await.unwrap_err();
        assert!(
            matches!(err, ForskolorError::MalformedResponse { .. }),
            "unexpected error: {:?}",
            err
        );
    }

    #[tokio::test]
    async fn test_invalid_json_is_malformed() {
        let endpoint = serve_once("200 OK", "<html>maintenance</html>").await;
        let source = HttpPageSource::new(endpoint, Duration::from_secs(5)).unwrap();

        let err = source.fetch_page(&first_page()).await.unwrap_err();
        assert!(matches!(err, ForskolorError::MalformedResponse { .. }));
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        // Port 9 (discard) n'écoute normalement pas en local
        let source = HttpPageSource::new("http://127.0.0.1:9/serviceunits", Duration::from_secs(2))
            .unwrap();
        let query = PageQuery {
            filters: vec![],
            sort: None,
            limit: 10,
            offset: 0,
        };

        let err = source.fetch_page(&query).await.unwrap_err();
        assert!(err.is_network(), "unexpected error: {:?}", err);
    }
}
