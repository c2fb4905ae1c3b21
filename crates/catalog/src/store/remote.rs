use crate::{BookStore, CatalogError, CatalogResult};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::Method;
use serde_json::Value;
use shelfscan_config::StorageConfig;
use shelfscan_core::{BookId, CatalogBook};
use std::collections::BTreeMap;
use std::time::Duration;

const REQUEST_TIMEOUT_SECS: u64 = 15;

/// Realtime-database REST store.
///
/// Books live under `{database_url}/users/{owner}/books/{id}.json`.
pub struct RemoteStore {
    base_url: String,
    owner: String,
    auth_token: Option<String>,
    client: Client,
}

impl RemoteStore {
    pub fn from_config(config: &StorageConfig) -> CatalogResult<Self> {
        let base_url = config.database_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(CatalogError::Remote("database_url is not set".to_string()));
        }
        let owner = config.owner_id.trim().to_string();
        if owner.is_empty() {
            return Err(CatalogError::Remote("owner_id is not set".to_string()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION"),
            ))
            .build()
            .map_err(|e| CatalogError::Remote(format!("HTTP client unavailable: {}", e)))?;

        Ok(Self {
            base_url,
            owner,
            auth_token: Some(config.auth_token.trim().to_string()).filter(|t| !t.is_empty()),
            client,
        })
    }

    fn collection_url(&self) -> String {
        format!("{}/users/{}/books.json", self.base_url, self.owner)
    }

    fn book_url(&self, id: &BookId) -> String {
        format!("{}/users/{}/books/{}.json", self.base_url, self.owner, id)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.auth_token {
            Some(token) => builder.query(&[("auth", token.as_str())]),
            None => builder,
        }
    }

    fn send(builder: RequestBuilder) -> CatalogResult<Response> {
        let response = builder
            .send()
            .map_err(|e| CatalogError::Remote(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Remote(format!(
                "HTTP {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }
        Ok(response)
    }

    fn body(response: Response) -> CatalogResult<String> {
        response
            .text()
            .map_err(|e| CatalogError::Remote(format!("Failed to read body: {}", e)))
    }
}

impl BookStore for RemoteStore {
    fn list(&mut self) -> CatalogResult<Vec<CatalogBook>> {
        let response = Self::send(self.request(Method::GET, &self.collection_url()))?;
        parse_books_snapshot(&Self::body(response)?)
    }

    fn get(&mut self, id: &BookId) -> CatalogResult<Option<CatalogBook>> {
        let response = Self::send(self.request(Method::GET, &self.book_url(id)))?;
        let value: Value = serde_json::from_str(&Self::body(response)?)
            .map_err(|e| CatalogError::Remote(format!("Unexpected response: {}", e)))?;
        if value.is_null() {
            return Ok(None);
        }
        Ok(book_from_value(&id.to_string(), value))
    }

    fn create(&mut self, book: &CatalogBook) -> CatalogResult<()> {
        Self::send(self.request(Method::PUT, &self.book_url(&book.id)).json(book))?;
        Ok(())
    }

    fn update(&mut self, book: &CatalogBook) -> CatalogResult<()> {
        self.create(book)
    }

    fn delete(&mut self, id: &BookId) -> CatalogResult<()> {
        Self::send(self.request(Method::DELETE, &self.book_url(id)))?;
        Ok(())
    }

    fn replace_all(&mut self, books: &[CatalogBook]) -> CatalogResult<()> {
        let by_id: BTreeMap<String, &CatalogBook> =
            books.iter().map(|b| (b.id.to_string(), b)).collect();
        Self::send(self.request(Method::PUT, &self.collection_url()).json(&by_id))?;
        Ok(())
    }
}

/// Parses the `books` node: `null` or an object keyed by book id.
///
/// Entries that lack an `id` take their key; entries that do not parse are
/// skipped with a warning. Books come back oldest first.
pub fn parse_books_snapshot(body: &str) -> CatalogResult<Vec<CatalogBook>> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| CatalogError::Remote(format!("Unexpected response: {}", e)))?;

    let entries = match value {
        Value::Null => return Ok(Vec::new()),
        Value::Object(entries) => entries,
        other => {
            return Err(CatalogError::Remote(format!(
                "Unexpected books node: {}",
                json_kind(&other)
            )))
        }
    };

    let mut books: Vec<CatalogBook> = entries
        .into_iter()
        .filter_map(|(key, value)| book_from_value(&key, value))
        .collect();
    books.sort_by_key(|b| b.added_at);
    Ok(books)
}

fn book_from_value(key: &str, mut value: Value) -> Option<CatalogBook> {
    if let Value::Object(map) = &mut value {
        map.entry("id")
            .or_insert_with(|| Value::String(key.to_string()));
    }

    match serde_json::from_value(value) {
        Ok(book) => Some(book),
        Err(e) => {
            log::warn!("Skipping remote book {}: {}", key, e);
            None
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
