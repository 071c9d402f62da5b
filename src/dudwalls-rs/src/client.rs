use crate::{ClientError, Result};
use dudwalls_core::{Config, Document, ErrorResponse, NameRequest};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client as HttpClient, Method, RequestBuilder, StatusCode, Url};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

const API_PREFIX: [&str; 2] = ["api", "dudwalls"];
const HEALTH_PATH: [&str; 2] = ["api", "health"];
const REQUEST_ID_HEADER: &str = "x-request-id";

/// Keys that may sit next to `data` in a response envelope
const ENVELOPE_KEYS: [&str; 6] = ["data", "success", "message", "count", "total", "status"];

/// Dudwalls REST API Client
pub struct Client {
    config: Config,
    endpoint: Url,
    client: HttpClient,
}

/// Outcome of a sequential batch insert
#[derive(Debug, Default)]
pub struct InsertManyReport {
    /// Server representations of the documents that were stored, in input order
    pub inserted: Vec<Document>,
    /// Input position and cause of every insert that failed
    pub failed: Vec<(usize, ClientError)>,
}

impl InsertManyReport {
    pub fn attempted(&self) -> usize {
        self.inserted.len() + self.failed.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

impl Client {
    /// Create a new client from a full configuration
    pub fn new(config: Config) -> Result<Self> {
        let endpoint = Url::parse(config.normalized_endpoint())
            .map_err(|e| ClientError::InvalidEndpoint(format!("{}: {}", config.endpoint, e)))?;

        if !matches!(endpoint.scheme(), "http" | "https") || endpoint.cannot_be_a_base() {
            return Err(ClientError::InvalidEndpoint(format!(
                "{}: expected an http(s) base URL",
                config.endpoint
            )));
        }

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.api_key))
            .map_err(|_| ClientError::InvalidApiKey)?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = HttpClient::builder()
            .default_headers(headers)
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout())
            .danger_accept_invalid_certs(config.insecure_skip_verify)
            .build()?;

        Ok(Self {
            config,
            endpoint,
            client,
        })
    }

    /// Create a client for `endpoint` with default settings
    pub fn connect(endpoint: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        Self::new(Config::new(endpoint, api_key))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Test the connection to the server
    pub async fn ping(&self) -> Result<Value> {
        let url = self.url(&HEALTH_PATH)?;
        self.send(self.build(Method::GET, url)).await
    }

    /// List all databases
    pub async fn list_databases(&self) -> Result<Vec<String>> {
        let url = self.api_root()?;
        let body = self.send(self.build(Method::GET, url)).await?;
        into_names(body)
    }

    /// Create a new database
    pub async fn create_database(&self, name: &str) -> Result<Value> {
        let url = self.api_root()?;
        let req = NameRequest {
            name: name.to_string(),
        };
        self.send(self.build(Method::POST, url).json(&req)).await
    }

    /// Delete a database and everything in it
    pub async fn delete_database(&self, name: &str) -> Result<Value> {
        let url = self.api_url(&[name])?;
        self.send(self.build(Method::DELETE, url)).await
    }

    /// List all collections in a database
    pub async fn list_collections(&self, database: &str) -> Result<Vec<String>> {
        let url = self.api_url(&[database])?;
        let body = self.send(self.build(Method::GET, url)).await?;
        into_names(body)
    }

    /// Create a new collection
    pub async fn create_collection(&self, database: &str, collection: &str) -> Result<Value> {
        let url = self.api_url(&[database])?;
        let req = NameRequest {
            name: collection.to_string(),
        };
        self.send(self.build(Method::POST, url).json(&req)).await
    }

    /// Delete a collection
    pub async fn delete_collection(&self, database: &str, collection: &str) -> Result<Value> {
        let url = self.api_url(&[database, collection])?;
        self.send(self.build(Method::DELETE, url)).await
    }

    /// Fetch every document in a collection, in server order
    pub async fn find(&self, database: &str, collection: &str) -> Result<Vec<Document>> {
        let url = self.api_url(&[database, collection])?;
        let body = self.send(self.build(Method::GET, url)).await?;
        into_documents(body)
    }

    /// Get a document by ID
    ///
    /// Returns `Ok(None)` when the server answers 404; every other failure
    /// is returned as an error.
    pub async fn find_one(
        &self,
        database: &str,
        collection: &str,
        id: &str,
    ) -> Result<Option<Document>> {
        let url = self.api_url(&[database, collection, id])?;

        match self.send(self.build(Method::GET, url)).await {
            Ok(body) => into_document(body).map(Some),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Insert a single document, returning it with its assigned ID
    pub async fn insert_one<T>(
        &self,
        database: &str,
        collection: &str,
        document: &T,
    ) -> Result<Document>
    where
        T: Serialize + ?Sized,
    {
        let url = self.api_url(&[database, collection])?;
        let body = self.send(self.build(Method::POST, url).json(document)).await?;
        into_document(body)
    }

    /// Insert documents one at a time, skipping any that fail
    ///
    /// Never fails as a whole: the result holds only the stored documents.
    /// Failures are logged; use [`Client::try_insert_many`] to inspect them.
    pub async fn insert_many<T>(
        &self,
        database: &str,
        collection: &str,
        documents: &[T],
    ) -> Vec<Document>
    where
        T: Serialize,
    {
        self.try_insert_many(database, collection, documents)
            .await
            .inserted
    }

    /// Insert documents one at a time and report every failure
    #[tracing::instrument(skip(self, documents), fields(count = documents.len()))]
    pub async fn try_insert_many<T>(
        &self,
        database: &str,
        collection: &str,
        documents: &[T],
    ) -> InsertManyReport
    where
        T: Serialize,
    {
        let mut report = InsertManyReport::default();

        for (index, document) in documents.iter().enumerate() {
            match self.insert_one(database, collection, document).await {
                Ok(doc) => report.inserted.push(doc),
                Err(e) => {
                    tracing::warn!(index, error = %e, "Failed to insert document");
                    report.failed.push((index, e));
                }
            }
        }

        report
    }

    /// Update a document by ID
    pub async fn update_one<T>(
        &self,
        database: &str,
        collection: &str,
        id: &str,
        update: &T,
    ) -> Result<Document>
    where
        T: Serialize + ?Sized,
    {
        let url = self.api_url(&[database, collection, id])?;
        let body = self.send(self.build(Method::PUT, url).json(update)).await?;
        into_document(body)
    }

    /// Delete a document by ID
    pub async fn delete_one(&self, database: &str, collection: &str, id: &str) -> Result<Value> {
        let url = self.api_url(&[database, collection, id])?;
        self.send(self.build(Method::DELETE, url)).await
    }

    /// Count documents by fetching the whole collection
    pub async fn count(&self, database: &str, collection: &str) -> Result<usize> {
        Ok(self.find(database, collection).await?.len())
    }

    /// `{endpoint}/api/dudwalls/`
    fn api_root(&self) -> Result<Url> {
        self.url(&[API_PREFIX[0], API_PREFIX[1], ""])
    }

    /// `{endpoint}/api/dudwalls/{names...}`, one path segment per name
    fn api_url(&self, names: &[&str]) -> Result<Url> {
        for name in names {
            check_name(name)?;
        }
        let path: Vec<&str> = API_PREFIX.iter().chain(names).copied().collect();
        self.url(&path)
    }

    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidEndpoint(self.config.endpoint.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn build(&self, method: Method, url: Url) -> RequestBuilder {
        let request_id = Uuid::new_v4().to_string();
        tracing::debug!(%method, %url, %request_id, "Sending request");
        self.client
            .request(method, url)
            .header(REQUEST_ID_HEADER, request_id)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Value> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(status = status.as_u16(), "Request failed");
            return Err(server_error(status, &body));
        }

        let bytes = response.bytes().await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }

        let body: Value = serde_json::from_slice(&bytes)?;
        Ok(unwrap_envelope(body))
    }
}

/// Empty and dot names would be dropped or collapsed by URL normalization,
/// addressing the parent container instead
fn check_name(name: &str) -> Result<()> {
    let decoded = name.to_ascii_lowercase().replace("%2e", ".");
    if decoded.is_empty() || decoded == "." || decoded == ".." {
        return Err(ClientError::InvalidName(name.to_string()));
    }
    Ok(())
}

fn server_error(status: StatusCode, body: &str) -> ClientError {
    let message = serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .and_then(ErrorResponse::into_message)
        .or_else(|| {
            let text = body.trim();
            (!text.is_empty()).then(|| text.to_string())
        })
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown status").to_string());

    ClientError::Server {
        status: status.as_u16(),
        message,
    }
}

/// `{"success": true, "data": X}` becomes `X`; anything else is returned as is
fn unwrap_envelope(body: Value) -> Value {
    match body {
        Value::Object(mut map)
            if map.contains_key("data")
                && map.keys().all(|k| ENVELOPE_KEYS.contains(&k.as_str())) =>
        {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn into_document(body: Value) -> Result<Document> {
    Document::try_from(body).map_err(|other| {
        ClientError::InvalidResponse(format!("expected a document object, got {}", describe(&other)))
    })
}

/// List payloads are never objects, so any `data` field is the payload
fn list_payload(body: Value) -> Value {
    match body {
        Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

fn into_documents(body: Value) -> Result<Vec<Document>> {
    match list_payload(body) {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => items.into_iter().map(into_document).collect(),
        other => Err(ClientError::InvalidResponse(format!(
            "expected a list of documents, got {}",
            describe(&other)
        ))),
    }
}

/// Accepts `["a", "b"]` or `[{"name": "a"}, ...]`
fn into_names(body: Value) -> Result<Vec<String>> {
    let items = match list_payload(body) {
        Value::Null => return Ok(Vec::new()),
        Value::Array(items) => items,
        other => {
            return Err(ClientError::InvalidResponse(format!(
                "expected a list of names, got {}",
                describe(&other)
            )))
        }
    };

    items
        .into_iter()
        .map(|item| match item {
            Value::String(name) => Ok(name),
            Value::Object(mut map) => match map.remove("name") {
                Some(Value::String(name)) => Ok(name),
                _ => Err(ClientError::InvalidResponse(
                    "list entry has no string `name` field".to_string(),
                )),
            },
            other => Err(ClientError::InvalidResponse(format!(
                "expected a name, got {}",
                describe(&other)
            ))),
        })
        .collect()
}
