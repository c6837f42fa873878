//! DynamoDB release store driver.

use std::{collections::HashMap, time::Duration};

use aws_sdk_dynamodb::{
    error::DisplayErrorContext,
    types::{
        AttributeDefinition, AttributeValue, KeySchemaElement, KeyType, ProvisionedThroughput,
        PutRequest, ScalarAttributeType, Select, TableStatus, WriteRequest,
    },
    Client,
};
use helmstash_config::DynamoConfig;
use helmstash_core::release::{Release, Releases};
use tracing::debug;

use super::codec;
use crate::{
    batch::load_batched,
    error::{StoreError, StoreResult},
};

/// DynamoDB caps BatchWriteItem at 25 items per call.
const MAX_BATCH_SIZE: usize = 25;

const SETUP_POLL_ATTEMPTS: usize = 60;
const SETUP_POLL_INTERVAL: Duration = Duration::from_secs(2);

const BACKEND: &str = "dynamodb";

/// Stores and retrieves releases from a DynamoDB table.
pub struct DynamoReleaseStore {
    client: Client,
    table: String,
}

impl DynamoReleaseStore {
    /// Builds a client from the standard AWS environment/config chain and
    /// the given driver settings.
    pub async fn connect(config: &DynamoConfig) -> StoreResult<Self> {
        let mut loader = aws_config::from_env();
        if let Some(endpoint) = &config.endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }
        let sdk_config = loader.load().await;
        Ok(Self {
            client: Client::new(&sdk_config),
            table: config.table.clone(),
        })
    }

    pub fn with_client(client: Client, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
        }
    }

    pub async fn get(&self, unique_id: &str) -> StoreResult<Release> {
        let resp = self
            .client
            .get_item()
            .table_name(&self.table)
            .key(
                codec::ATTR_UNIQUE_ID,
                AttributeValue::S(unique_id.to_string()),
            )
            .consistent_read(true)
            .send()
            .await
            .map_err(|err| StoreError::backend(BACKEND, "get", DisplayErrorContext(err)))?;

        match resp.item() {
            Some(item) if !item.is_empty() => Ok(codec::decode(item)),
            _ => {
                Err(StoreError::NotFound {
                    unique_id: unique_id.to_string(),
                })
            }
        }
    }

    pub async fn put(&self, release: &Release) -> StoreResult<()> {
        self.client
            .put_item()
            .table_name(&self.table)
            .set_item(Some(codec::encode(release)))
            .send()
            .await
            .map_err(|err| StoreError::backend(BACKEND, "put", DisplayErrorContext(err)))?;
        Ok(())
    }

    pub async fn delete(&self, unique_id: &str) -> StoreResult<()> {
        self.client
            .delete_item()
            .table_name(&self.table)
            .key(
                codec::ATTR_UNIQUE_ID,
                AttributeValue::S(unique_id.to_string()),
            )
            .send()
            .await
            .map_err(|err| StoreError::backend(BACKEND, "delete", DisplayErrorContext(err)))?;
        Ok(())
    }

    /// Full table scan, filtered client-side. DynamoDB cannot index map
    /// attributes, so the label selector is applied after decoding.
    pub async fn list(&self, selector: &HashMap<String, String>) -> StoreResult<Releases> {
        let mut releases = Vec::new();
        let mut start_key: Option<HashMap<String, AttributeValue>> = None;
        loop {
            let resp = self
                .client
                .scan()
                .table_name(&self.table)
                .consistent_read(true)
                .select(Select::AllAttributes)
                .set_exclusive_start_key(start_key.take())
                .send()
                .await
                .map_err(|err| StoreError::backend(BACKEND, "list", DisplayErrorContext(err)))?;

            for item in resp.items() {
                let release = codec::decode(item);
                if release.unique_id.is_empty() {
                    continue;
                }
                if release.matches_selector(selector) {
                    releases.push(release);
                }
            }

            match resp.last_evaluated_key() {
                Some(key) if !key.is_empty() => start_key = Some(key.clone()),
                _ => break,
            }
        }
        Ok(releases)
    }

    pub async fn load(&self, releases: &[Release]) -> StoreResult<()> {
        let mut requests = Vec::with_capacity(releases.len());
        for release in releases {
            let put = PutRequest::builder()
                .set_item(Some(codec::encode(release)))
                .build()
                .map_err(|err| StoreError::backend(BACKEND, "load", err))?;
            requests.push(WriteRequest::builder().put_request(put).build());
        }

        load_batched(requests, MAX_BATCH_SIZE, |chunk| {
            let client = self.client.clone();
            let table = self.table.clone();
            async move {
                client
                    .batch_write_item()
                    .request_items(table, chunk)
                    .send()
                    .await
                    .map(|_| ())
                    .map_err(|err| StoreError::backend(BACKEND, "load", DisplayErrorContext(err)))
            }
        })
        .await
    }

    /// Creates the table if it does not exist and blocks until it is
    /// usable.
    pub async fn setup(&self) -> StoreResult<()> {
        if self.table_exists().await? {
            return Ok(());
        }
        debug!("Creating DynamoDB table {}", self.table);
        self.create_table().await?;
        self.wait_until_active().await
    }

    async fn table_exists(&self) -> StoreResult<bool> {
        match self
            .client
            .describe_table()
            .table_name(&self.table)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(err)
                if err
                    .as_service_error()
                    .is_some_and(|e| e.is_resource_not_found_exception()) =>
            {
                Ok(false)
            }
            Err(err) => {
                Err(StoreError::backend(
                    BACKEND,
                    "describe-table",
                    DisplayErrorContext(err),
                ))
            }
        }
    }

    async fn create_table(&self) -> StoreResult<()> {
        let attribute = AttributeDefinition::builder()
            .attribute_name(codec::ATTR_UNIQUE_ID)
            .attribute_type(ScalarAttributeType::S)
            .build()
            .map_err(|err| StoreError::backend(BACKEND, "create-table", err))?;
        let key_schema = KeySchemaElement::builder()
            .attribute_name(codec::ATTR_UNIQUE_ID)
            .key_type(KeyType::Hash)
            .build()
            .map_err(|err| StoreError::backend(BACKEND, "create-table", err))?;
        let throughput = ProvisionedThroughput::builder()
            .read_capacity_units(5)
            .write_capacity_units(5)
            .build()
            .map_err(|err| StoreError::backend(BACKEND, "create-table", err))?;

        self.client
            .create_table()
            .table_name(&self.table)
            .attribute_definitions(attribute)
            .key_schema(key_schema)
            .provisioned_throughput(throughput)
            .send()
            .await
            .map_err(|err| StoreError::backend(BACKEND, "create-table", DisplayErrorContext(err)))?;
        Ok(())
    }

    async fn wait_until_active(&self) -> StoreResult<()> {
        for _ in 0..SETUP_POLL_ATTEMPTS {
            let resp = self
                .client
                .describe_table()
                .table_name(&self.table)
                .send()
                .await
                .map_err(|err| StoreError::backend(BACKEND, "setup", DisplayErrorContext(err)))?;
            let active = resp
                .table()
                .and_then(|table| table.table_status())
                .map(|status| *status == TableStatus::Active)
                .unwrap_or(false);
            if active {
                return Ok(());
            }
            tokio::time::sleep(SETUP_POLL_INTERVAL).await;
        }
        Err(StoreError::backend(
            BACKEND,
            "setup",
            format!("table {} did not become active", self.table),
        ))
    }
}
