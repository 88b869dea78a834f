//! HTTP implementation of the itinerary service

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::error::ServiceError;
use crate::models::{
    CreatedItinerary, GenerationRequest, ItineraryDetail, ItineraryRoute, ItinerarySummary,
};
use crate::traits::{ClientConfig, ItineraryService};

/// Itinerary service reached over HTTP/JSON
pub struct HttpItineraryService {
    client: Client,
    config: ClientConfig,
}

impl HttpItineraryService {
    pub fn new(config: ClientConfig) -> anyhow::Result<Self> {
        let client = Client::builder().user_agent(&config.user_agent).build()?;

        Ok(Self { client, config })
    }

    /// Check the status, then decode the body. A decode failure is `Malformed`,
    /// everything before it is `Transport`.
    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ServiceError> {
        let status = response.status();
        let url = response.url().clone();

        if !status.is_success() {
            return Err(ServiceError::Transport(format!(
                "{} returned {}",
                url.path(),
                status
            )));
        }

        let body = response.text().await?;
        debug!("Received {} bytes from {}", body.len(), url.path());

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl ItineraryService for HttpItineraryService {
    fn config(&self) -> &ClientConfig {
        &self.config
    }

    async fn create_itinerary(
        &self,
        request: &GenerationRequest,
    ) -> Result<CreatedItinerary, ServiceError> {
        info!(
            "Requesting a {}-day itinerary for {}",
            request.duration_days, request.destination
        );

        let response = self
            .client
            .post(self.build_url("/api/create-itinerary/"))
            .json(request)
            .send()
            .await?;

        Self::decode(response).await
    }

    async fn list_itineraries(
        &self,
        limit: Option<usize>,
    ) -> Result<Vec<ItinerarySummary>, ServiceError> {
        let mut builder = self.client.get(self.build_url("/api/itineraries"));
        if let Some(limit) = limit {
            builder = builder.query(&[("limit", limit)]);
        }

        let rows: Vec<ItinerarySummary> = Self::decode(builder.send().await?).await?;
        info!("Fetched {} itineraries", rows.len());
        Ok(rows)
    }

    async fn get_itinerary(&self, route: &ItineraryRoute) -> Result<ItineraryDetail, ServiceError> {
        let path = format!(
            "/api/itinerary/{}/{}/{}/",
            urlencoding::encode(&route.destination_slug),
            route.duration_segment(),
            urlencoding::encode(&route.id)
        );

        let response = self.client.get(self.build_url(&path)).send().await?;
        Self::decode(response).await
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    use super::*;

    /// Serve one canned HTTP response on a local port. The task yields the raw
    /// request it received.
    async fn serve_once(
        status: &'static str,
        body: &'static str,
    ) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut chunk = [0u8; 1024];

            let head_end = loop {
                let n = socket.read(&mut chunk).await.unwrap();
                assert!(n > 0, "connection closed before the request head");
                request.extend_from_slice(&chunk[..n]);
                if let Some(pos) = request.windows(4).position(|w| w == b"\r\n\r\n") {
                    break pos + 4;
                }
            };

            let head = String::from_utf8_lossy(&request[..head_end]).to_lowercase();
            let content_length = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .map_or(0, |len| len.trim().parse::<usize>().unwrap());
            while request.len() < head_end + content_length {
                let n = socket.read(&mut chunk).await.unwrap();
                request.extend_from_slice(&chunk[..n]);
            }

            let response = format!(
                "HTTP/1.1 {status}\r\n\
                 content-type: application/json\r\n\
                 content-length: {}\r\n\
                 connection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();

            String::from_utf8(request).unwrap()
        });

        (base_url, handle)
    }

    fn service(base_url: &str) -> HttpItineraryService {
        HttpItineraryService::new(ClientConfig::new(base_url)).unwrap()
    }

    #[test]
    fn urls_are_joined_onto_the_base() {
        assert_eq!(
            service("http://api.test/").build_url("/api/create-itinerary/"),
            "http://api.test/api/create-itinerary/"
        );
    }

    #[tokio::test]
    async fn create_posts_the_request_body() {
        let (base_url, server) =
            serve_once("200 OK", r#"{"destination_slug": "london", "duration": 3, "id": 42}"#)
                .await;
        let request = GenerationRequest::new("London", 3, vec!["Food".to_string()]);

        let created = service(&base_url).create_itinerary(&request).await.unwrap();
        let raw = server.await.unwrap();

        assert_eq!(created.destination_slug, "london");
        assert_eq!(created.id, "42");
        assert!(raw.starts_with("POST /api/create-itinerary/ HTTP/1.1\r\n"));
        let body = &raw[raw.find("\r\n\r\n").unwrap() + 4..];
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(body).unwrap(),
            serde_json::json!({"destination": "London", "duration": 3, "interests": ["Food"]})
        );
    }

    #[tokio::test]
    async fn list_sends_the_limit() {
        let (base_url, server) = serve_once("200 OK", "[]").await;

        let rows = service(&base_url).list_itineraries(Some(3)).await.unwrap();

        assert!(rows.is_empty());
        assert!(server.await.unwrap().starts_with("GET /api/itineraries?limit=3 HTTP/1.1\r\n"));
    }

    #[tokio::test]
    async fn detail_path_carries_the_duration_segment() {
        let (base_url, server) = serve_once("200 OK", r#"{"id": 42, "itinerary_plan": []}"#).await;
        let route = ItineraryRoute::parse("/itinerary/london/3-days/42").unwrap();

        let detail = service(&base_url).get_itinerary(&route).await.unwrap();

        assert_eq!(detail.id, "42");
        assert!(
            server
                .await
                .unwrap()
                .starts_with("GET /api/itinerary/london/3-days/42/ HTTP/1.1\r\n")
        );
    }

    #[tokio::test]
    async fn error_status_is_a_transport_failure() {
        let (base_url, server) = serve_once("503 Service Unavailable", "{}").await;

        let err = service(&base_url).list_itineraries(None).await.unwrap_err();

        assert!(matches!(err, ServiceError::Transport(msg) if msg.contains("503")));
        assert!(server.await.unwrap().starts_with("GET /api/itineraries HTTP/1.1\r\n"));
    }

    #[tokio::test]
    async fn undecodable_body_is_malformed() {
        let (base_url, server) = serve_once("200 OK", "not json").await;

        let err = service(&base_url).list_itineraries(None).await.unwrap_err();

        assert!(matches!(err, ServiceError::Malformed(_)));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn unreachable_service_is_a_transport_failure() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let err = service(&base_url).list_itineraries(Some(3)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Transport(_)));
    }
}
