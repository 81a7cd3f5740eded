//! DynamoDB implementations of the store traits. Each store owns a client and
//! a table name; `new()` reads the table name from the environment while
//! `with_client_and_table` exists for tests pointed at local DynamoDB.
//!
//! Items cross the wire through `serde_dynamo`, so numeric attributes come
//! back as native Rust numbers with no custom conversion layer.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_dynamodb::{types::AttributeValue, Client};
use serde_dynamo::{from_item, from_items, to_item};
use std::collections::HashMap;

use crate::config::table_name;
use crate::error::StoreError;
use crate::models::{AuthCode, Event, Minor, Rsvp, Session, Waiver};
use crate::store::{AuthCodeStore, EventStore, MinorStore, RsvpStore, SessionStore, WaiverStore};

/// GSI on the RSVP table keyed by account email.
const RSVP_EMAIL_INDEX: &str = "email-index";
/// GSI on the RSVP table keyed by attendee id.
const RSVP_ATTENDEE_INDEX: &str = "attendee_id-index";

async fn default_client() -> Client {
    let config = aws_config::defaults(BehaviorVersion::latest()).load().await;
    Client::new(&config)
}

fn db_err<E: std::fmt::Debug>(e: E) -> StoreError {
    StoreError::Database(format!("{:?}", e))
}

fn ser_err<E: std::fmt::Debug>(e: E) -> StoreError {
    StoreError::Serialization(format!("{:?}", e))
}

async fn put<T: serde::Serialize>(
    client: &Client,
    table: &str,
    value: &T,
) -> Result<(), StoreError> {
    let item: HashMap<String, AttributeValue> = to_item(value).map_err(ser_err)?;
    client
        .put_item()
        .table_name(table)
        .set_item(Some(item))
        .send()
        .await
        .map_err(db_err)?;
    Ok(())
}

async fn get_by_key<T: serde::de::DeserializeOwned>(
    client: &Client,
    table: &str,
    key: Vec<(&str, String)>,
) -> Result<Option<T>, StoreError> {
    let mut request = client.get_item().table_name(table);
    for (name, value) in key {
        request = request.key(name, AttributeValue::S(value));
    }
    let result = request.send().await.map_err(db_err)?;
    match result.item {
        Some(item) => Ok(Some(from_item(item).map_err(ser_err)?)),
        None => Ok(None),
    }
}

async fn delete_by_key(
    client: &Client,
    table: &str,
    key: Vec<(&str, String)>,
) -> Result<(), StoreError> {
    let mut request = client.delete_item().table_name(table);
    for (name, value) in key {
        request = request.key(name, AttributeValue::S(value));
    }
    request.send().await.map_err(db_err)?;
    Ok(())
}

async fn query_by_partition<T: serde::de::DeserializeOwned>(
    client: &Client,
    table: &str,
    index: Option<&str>,
    key_name: &str,
    key_value: &str,
) -> Result<Vec<T>, StoreError> {
    let mut request = client
        .query()
        .table_name(table)
        .key_condition_expression(format!("{} = :v", key_name))
        .expression_attribute_values(":v", AttributeValue::S(key_value.to_string()));
    if let Some(index_name) = index {
        request = request.index_name(index_name);
    }
    let result = request.send().await.map_err(db_err)?;
    from_items(result.items.unwrap_or_default()).map_err(ser_err)
}

async fn scan_all<T: serde::de::DeserializeOwned>(
    client: &Client,
    table: &str,
) -> Result<Vec<T>, StoreError> {
    let mut items = Vec::new();
    let mut exclusive_start_key = None;
    loop {
        let result = client
            .scan()
            .table_name(table)
            .set_exclusive_start_key(exclusive_start_key)
            .send()
            .await
            .map_err(db_err)?;
        items.extend(result.items.unwrap_or_default());
        exclusive_start_key = result.last_evaluated_key;
        if exclusive_start_key.is_none() {
            break;
        }
    }
    from_items(items).map_err(ser_err)
}

pub struct DynamoSessionStore {
    client: Client,
    table_name: String,
}

impl DynamoSessionStore {
    pub async fn new() -> Self {
        Self {
            client: default_client().await,
            table_name: table_name("SESSIONS_TABLE_NAME", "user_sessions"),
        }
    }

    pub fn with_client_and_table(client: Client, table_name: String) -> Self {
        Self { client, table_name }
    }
}

#[async_trait]
impl SessionStore for DynamoSessionStore {
    async fn put_session(&self, session: Session) -> Result<(), StoreError> {
        put(&self.client, &self.table_name, &session).await
    }

    async fn get_session(&self, token: &str) -> Result<Option<Session>, StoreError> {
        get_by_key(
            &self.client,
            &self.table_name,
            vec![("session_token", token.to_string())],
        )
        .await
    }

    async fn delete_session(&self, token: &str) -> Result<(), StoreError> {
        delete_by_key(
            &self.client,
            &self.table_name,
            vec![("session_token", token.to_string())],
        )
        .await
    }

    async fn touch_session(&self, token: &str, last_accessed: &str) -> Result<(), StoreError> {
        self.client
            .update_item()
            .table_name(&self.table_name)
            .key("session_token", AttributeValue::S(token.to_string()))
            .update_expression("SET last_accessed = :ts")
            .expression_attribute_values(":ts", AttributeValue::S(last_accessed.to_string()))
            .send()
            .await
            .map_err(db_err)?;
        Ok(())
    }
}

pub struct DynamoAuthCodeStore {
    client: Client,
    table_name: String,
}

impl DynamoAuthCodeStore {
    pub async fn new() -> Self {
        Self {
            client: default_client().await,
            table_name: table_name("AUTH_CODES_TABLE_NAME", "auth_codes"),
        }
    }

    pub fn with_client_and_table(client: Client, table_name: String) -> Self {
        Self { client, table_name }
    }
}

#[async_trait]
impl AuthCodeStore for DynamoAuthCodeStore {
    async fn put_code(&self, code: AuthCode) -> Result<(), StoreError> {
        put(&self.client, &self.table_name, &code).await
    }

    async fn get_code(&self, email: &str) -> Result<Option<AuthCode>, StoreError> {
        get_by_key(
            &self.client,
            &self.table_name,
            vec![("email", email.to_string())],
        )
        .await
    }

    async fn delete_code(&self, email: &str) -> Result<(), StoreError> {
        delete_by_key(
            &self.client,
            &self.table_name,
            vec![("email", email.to_string())],
        )
        .await
    }
}

pub struct DynamoMinorStore {
    client: Client,
    table_name: String,
}

impl DynamoMinorStore {
    pub async fn new() -> Self {
        Self {
            client: default_client().await,
            table_name: table_name("MINORS_TABLE_NAME", "minors"),
        }
    }

    pub fn with_client_and_table(client: Client, table_name: String) -> Self {
        Self { client, table_name }
    }
}

#[async_trait]
impl MinorStore for DynamoMinorStore {
    async fn put_minor(&self, minor: Minor) -> Result<(), StoreError> {
        put(&self.client, &self.table_name, &minor).await
    }

    async fn get_minor(
        &self,
        guardian_email: &str,
        minor_id: &str,
    ) -> Result<Option<Minor>, StoreError> {
        get_by_key(
            &self.client,
            &self.table_name,
            vec![
                ("guardian_email", guardian_email.to_string()),
                ("minor_id", minor_id.to_string()),
            ],
        )
        .await
    }

    async fn delete_minor(&self, guardian_email: &str, minor_id: &str) -> Result<(), StoreError> {
        delete_by_key(
            &self.client,
            &self.table_name,
            vec![
                ("guardian_email", guardian_email.to_string()),
                ("minor_id", minor_id.to_string()),
            ],
        )
        .await
    }

    async fn get_minors_by_guardian(
        &self,
        guardian_email: &str,
    ) -> Result<Vec<Minor>, StoreError> {
        query_by_partition(
            &self.client,
            &self.table_name,
            None,
            "guardian_email",
            guardian_email,
        )
        .await
    }

    async fn list_minors(&self) -> Result<Vec<Minor>, StoreError> {
        scan_all(&self.client, &self.table_name).await
    }
}

pub struct DynamoWaiverStore {
    client: Client,
    table_name: String,
}

impl DynamoWaiverStore {
    pub async fn new() -> Self {
        Self {
            client: default_client().await,
            table_name: table_name("WAIVERS_TABLE_NAME", "volunteer_waivers"),
        }
    }

    pub fn with_client_and_table(client: Client, table_name: String) -> Self {
        Self { client, table_name }
    }
}

#[async_trait]
impl WaiverStore for DynamoWaiverStore {
    async fn put_waiver(&self, waiver: Waiver) -> Result<(), StoreError> {
        put(&self.client, &self.table_name, &waiver).await
    }

    async fn get_waivers_by_email(&self, email: &str) -> Result<Vec<Waiver>, StoreError> {
        query_by_partition(&self.client, &self.table_name, None, "email", email).await
    }

    async fn list_waivers(&self) -> Result<Vec<Waiver>, StoreError> {
        scan_all(&self.client, &self.table_name).await
    }
}

pub struct DynamoEventStore {
    client: Client,
    table_name: String,
}

impl DynamoEventStore {
    pub async fn new() -> Self {
        Self {
            client: default_client().await,
            table_name: table_name("EVENTS_TABLE_NAME", "events"),
        }
    }

    pub fn with_client_and_table(client: Client, table_name: String) -> Self {
        Self { client, table_name }
    }
}

#[async_trait]
impl EventStore for DynamoEventStore {
    async fn get_event(&self, event_id: &str) -> Result<Option<Event>, StoreError> {
        get_by_key(
            &self.client,
            &self.table_name,
            vec![("event_id", event_id.to_string())],
        )
        .await
    }
}

pub struct DynamoRsvpStore {
    client: Client,
    table_name: String,
}

impl DynamoRsvpStore {
    pub async fn new() -> Self {
        Self {
            client: default_client().await,
            table_name: table_name("EVENT_RSVPS_TABLE_NAME", "event_rsvps"),
        }
    }

    pub fn with_client_and_table(client: Client, table_name: String) -> Self {
        Self { client, table_name }
    }
}

#[async_trait]
impl RsvpStore for DynamoRsvpStore {
    async fn put_rsvp(&self, rsvp: Rsvp) -> Result<(), StoreError> {
        put(&self.client, &self.table_name, &rsvp).await
    }

    async fn get_rsvp(
        &self,
        event_id: &str,
        attendee_id: &str,
    ) -> Result<Option<Rsvp>, StoreError> {
        get_by_key(
            &self.client,
            &self.table_name,
            vec![
                ("event_id", event_id.to_string()),
                ("attendee_id", attendee_id.to_string()),
            ],
        )
        .await
    }

    async fn get_rsvps_by_event(&self, event_id: &str) -> Result<Vec<Rsvp>, StoreError> {
        query_by_partition(&self.client, &self.table_name, None, "event_id", event_id).await
    }

    async fn get_rsvps_by_email(&self, email: &str) -> Result<Vec<Rsvp>, StoreError> {
        query_by_partition(
            &self.client,
            &self.table_name,
            Some(RSVP_EMAIL_INDEX),
            "email",
            email,
        )
        .await
    }

    async fn get_rsvps_by_attendee(&self, attendee_id: &str) -> Result<Vec<Rsvp>, StoreError> {
        query_by_partition(
            &self.client,
            &self.table_name,
            Some(RSVP_ATTENDEE_INDEX),
            "attendee_id",
            attendee_id,
        )
        .await
    }
}
