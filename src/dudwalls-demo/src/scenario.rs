//! End-to-end walkthrough of the client API
//!
//! Creates a database and collection, stores a handful of users, then reads,
//! updates, counts and filters them the way an application would.

use anyhow::{Context, Result};
use chrono::Utc;
use dudwalls_rs::{Client, Document};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScenarioOptions {
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default = "default_collection")]
    pub collection: String,
    /// Drop the collection and database once finished
    #[serde(default)]
    pub cleanup: bool,
}

fn default_database() -> String {
    "rust-app".to_string()
}

fn default_collection() -> String {
    "users".to_string()
}

impl Default for ScenarioOptions {
    fn default() -> Self {
        Self {
            database: default_database(),
            collection: default_collection(),
            cleanup: false,
        }
    }
}

/// What the scenario observed on the server
#[derive(Debug, Clone, Default)]
pub struct ScenarioReport {
    pub health: Value,
    pub inserted: usize,
    pub total: usize,
    pub active: usize,
    pub databases: Vec<String>,
    pub collections: Vec<String>,
}

fn user(name: &str, email: &str, age: u32, active: bool) -> Document {
    let mut doc = Document::new();
    doc.insert("name", name);
    doc.insert("email", email);
    doc.insert("age", age);
    doc.insert("active", active);
    doc
}

fn is_active(doc: &Document) -> bool {
    doc.get("active").and_then(Value::as_bool).unwrap_or(false)
}

/// One-line summary of a user document, tolerant of missing fields
pub fn describe_user(doc: &Document) -> String {
    let name = doc.get("name").and_then(Value::as_str).unwrap_or("<unnamed>");
    let age = doc
        .get("age")
        .map(|age| age.to_string())
        .unwrap_or_else(|| "?".to_string());
    let status = if is_active(doc) { "Active" } else { "Inactive" };
    format!("{} ({}) - {}", name, age, status)
}

/// Run the walkthrough against `client`, stopping at the first error
pub async fn run(client: &Client, options: &ScenarioOptions) -> Result<ScenarioReport> {
    let db = options.database.as_str();
    let coll = options.collection.as_str();
    let mut report = ScenarioReport::default();

    tracing::info!("🔗 Testing connection...");
    report.health = client.ping().await.context("connection check failed")?;
    println!("✅ Connected successfully: {}", report.health);

    tracing::info!(database = db, "📁 Creating database...");
    client
        .create_database(db)
        .await
        .with_context(|| format!("failed to create database {}", db))?;

    tracing::info!(database = db, collection = coll, "📄 Creating collection...");
    client
        .create_collection(db, coll)
        .await
        .with_context(|| format!("failed to create collection {}/{}", db, coll))?;

    tracing::info!("➕ Inserting documents...");
    let john = client
        .insert_one(db, coll, &user("John Doe", "john@example.com", 30, true))
        .await
        .context("failed to insert user")?;
    println!("Inserted user: {}", Value::from(john.clone()));

    let jane = client
        .insert_one(db, coll, &user("Jane Smith", "jane@example.com", 25, true))
        .await
        .context("failed to insert user")?;
    println!("Inserted user: {}", Value::from(jane));

    let more_users = vec![
        user("Bob Wilson", "bob@example.com", 35, false),
        user("Alice Brown", "alice@example.com", 28, true),
    ];
    let more = client.insert_many(db, coll, &more_users).await;
    println!("Inserted multiple users: {}", more.len());
    report.inserted = 2 + more.len();

    tracing::info!("🔍 Finding all users...");
    let all_users = client.find(db, coll).await?;
    println!("All users: {} found", all_users.len());
    for doc in &all_users {
        println!("  - {}", describe_user(doc));
    }

    let john_id = john
        .id()
        .context("server did not assign an id to the inserted user")?;

    tracing::info!(id = %john_id, "🔍 Finding one user...");
    match client.find_one(db, coll, &john_id).await? {
        Some(doc) => println!("Found user: {}", Value::from(doc)),
        None => println!("User {} not found", john_id),
    }

    tracing::info!(id = %john_id, "✏️ Updating user...");
    let update = json!({
        "age": 31,
        "last_login": Utc::now().format("%Y-%m-%d %H:%M:%S").to_string(),
    });
    let updated = client.update_one(db, coll, &john_id, &update).await?;
    println!("Updated user: {}", Value::from(updated));

    tracing::info!("🔢 Counting documents...");
    report.total = client.count(db, coll).await?;
    println!("Total users: {}", report.total);

    // Filtering happens client-side; the API has no query language
    tracing::info!("🔍 Finding active users...");
    let active: Vec<Document> = client
        .find(db, coll)
        .await?
        .into_iter()
        .filter(is_active)
        .collect();
    report.active = active.len();
    println!("Active users: {}", report.active);
    for doc in &active {
        println!("  - {}", describe_user(doc));
    }

    tracing::info!("📋 Listing databases...");
    report.databases = client.list_databases().await?;
    println!("Databases: {:?}", report.databases);

    report.collections = client.list_collections(db).await?;
    println!("Collections in {}: {:?}", db, report.collections);

    if options.cleanup {
        tracing::info!("🧹 Cleaning up...");
        client.delete_collection(db, coll).await?;
        client.delete_database(db).await?;
    }

    Ok(report)
}
