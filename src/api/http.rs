//! Implements the `Server` trait with `reqwest`.

use crate::api::{schema, BulkCreated, Created, Deleted, Server};
use crate::error::{ErrorType, IntoResult};
use crate::model::{CandidateRecord, Domain, ListedRecord, NewRecord};
use crate::{Config, Result};
use anyhow::Context;
use reqwest::header::ACCEPT;
use reqwest::{Client, RequestBuilder};
use serde_json::json;
use tracing::{debug, trace};
use url::Url;

/// Talks to a tally server at the configured base URL. Endpoint paths are absolute, so any path
/// on the base URL is replaced.
pub struct HttpServer {
    client: Client,
    base: Url,
    access_token: Option<String>,
}

impl HttpServer {
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .context("Unable to create the HTTP client")
            .pub_result(ErrorType::Config)?;
        Ok(Self {
            client,
            base: config.server_url().clone(),
            access_token: config.access_token().map(String::from),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base
            .join(path)
            .with_context(|| format!("Unable to join '{}' and '{path}'", self.base))
            .pub_result(ErrorType::Config)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request.header(ACCEPT, "application/json");
        match &self.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Sends `request` and returns the status code and body text.
    async fn send(&self, request: RequestBuilder, url: &Url) -> Result<(u16, String)> {
        let response = self
            .authorize(request)
            .send()
            .await
            .with_context(|| format!("The request to {url} failed"))
            .pub_result(ErrorType::Request)?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .with_context(|| format!("Unable to read the response from {url}"))
            .pub_result(ErrorType::Request)?;
        trace!("{url} responded with {status}: {body}");
        Ok((status, body))
    }
}

#[async_trait::async_trait]
impl Server for HttpServer {
    async fn list(&mut self, domain: Domain) -> Result<Vec<ListedRecord>> {
        let url = self.endpoint(domain.listing_path())?;
        let (status, body) = self.send(self.client.get(url.clone()), &url).await?;
        let records: Vec<ListedRecord> = schema::decode(domain.listing_path(), status, &body)?;
        debug!("Fetched {} {domain}", records.len());
        Ok(records)
    }

    async fn bulk_create(
        &mut self,
        domain: Domain,
        records: &[CandidateRecord],
    ) -> Result<BulkCreated> {
        let url = self.endpoint(domain.bulk_path())?;
        debug!("Submitting {} {domain} to {url}", records.len());
        let request = self.client.post(url.clone()).json(records);
        let (status, body) = self.send(request, &url).await?;
        schema::decode(domain.bulk_path(), status, &body)
    }

    async fn create(&mut self, domain: Domain, record: &NewRecord) -> Result<Created> {
        let url = self.endpoint(domain.listing_path())?;
        debug!("Creating one {} at {url}", domain.singular());
        let request = self.client.post(url.clone()).json(record);
        let (status, body) = self.send(request, &url).await?;
        schema::decode(domain.listing_path(), status, &body)
    }

    async fn delete(&mut self, domain: Domain, id: i64) -> Result<Deleted> {
        let url = self.endpoint(domain.delete_path())?;
        debug!("Deleting {} {id}", domain.singular());
        let request = self.client.post(url.clone()).json(&json!({ "id": id }));
        let (status, body) = self.send(request, &url).await?;
        schema::decode(domain.delete_path(), status, &body)
    }

    async fn bulk_delete(&mut self, domain: Domain, ids: &[i64]) -> Result<Deleted> {
        let url = self.endpoint(domain.bulk_delete_path())?;
        debug!("Deleting {} {domain}", ids.len());
        let request = self.client.post(url.clone()).json(&json!({ "ids": ids }));
        let (status, body) = self.send(request, &url).await?;
        schema::decode(domain.bulk_delete_path(), status, &body)
    }
}
