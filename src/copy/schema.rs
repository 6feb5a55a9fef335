use std::time::Duration;

use aws_sdk_dynamodb::types::{
    AttributeDefinition, GlobalSecondaryIndex, KeySchemaElement, LocalSecondaryIndex,
    ProvisionedThroughput, StreamSpecification, TableDescription, TableStatus,
};
use aws_sdk_dynamodb::Client;
use tracing::{info, warn};

use crate::error::CopyError;

/// Interval between describe-table polls while waiting for ACTIVE.
const ACTIVE_POLL_INTERVAL: Duration = Duration::from_secs(5);
/// Poll attempts before giving up on table creation (10 minutes total).
const ACTIVE_POLL_LIMIT: u32 = 120;

/// Capacity values written into the destination table and its global
/// secondary indexes, regardless of what the source table provisions.
#[derive(Debug, Clone, Copy)]
pub struct CapacityOverrides {
    pub read_capacity_units: i64,
    pub write_capacity_units: i64,
}

/// Immutable creation request derived from a source table description.
#[derive(Debug, Clone)]
pub struct TableDefinition {
    pub key_schema: Vec<KeySchemaElement>,
    pub attribute_definitions: Vec<AttributeDefinition>,
    pub global_secondary_indexes: Vec<GlobalSecondaryIndex>,
    pub local_secondary_indexes: Vec<LocalSecondaryIndex>,
    pub provisioned_throughput: ProvisionedThroughput,
    pub stream_specification: Option<StreamSpecification>,
}

/// Outcome of the schema phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Replication {
    /// Destination was created and is now ACTIVE.
    Created,
    /// Destination already exists; the run stops without mutating anything.
    AlreadyExists,
}

/// Replicate the source table's schema into a new destination table.
///
/// Describes the source, derives a creation request from it, and creates
/// the destination unless it already exists (in which case the whole run
/// is a no-op). Blocks until the new table reports ACTIVE.
pub async fn replicate(
    client: &Client,
    source: &str,
    dest: &str,
    overrides: CapacityOverrides,
) -> Result<Replication, CopyError> {
    info!("describing source table '{source}'");
    let description = describe_source(client, source).await?;
    let definition = derive_definition(&description, overrides)?;

    if table_exists(client, dest).await? {
        warn!("destination table '{dest}' already exists, nothing to do");
        return Ok(Replication::AlreadyExists);
    }

    info!(
        gsis = definition.global_secondary_indexes.len(),
        lsis = definition.local_secondary_indexes.len(),
        stream = definition.stream_specification.is_some(),
        "creating destination table '{dest}'"
    );
    create_table(client, dest, definition).await?;
    wait_for_active(client, dest).await?;
    info!("table '{dest}' is now active");

    Ok(Replication::Created)
}

/// Fetch the source table description, distinguishing a missing table from
/// any other describe failure.
pub async fn describe_source(
    client: &Client,
    table: &str,
) -> Result<TableDescription, CopyError> {
    match client.describe_table().table_name(table).send().await {
        Ok(output) => output.table.ok_or_else(|| CopyError::Describe {
            table: table.to_string(),
            message: "empty describe-table response".to_string(),
        }),
        Err(err) => {
            let err = err.into_service_error();
            if err.is_resource_not_found_exception() {
                Err(CopyError::SourceNotFound(table.to_string()))
            } else {
                Err(CopyError::Describe {
                    table: table.to_string(),
                    message: err.to_string(),
                })
            }
        }
    }
}

/// Derive the destination's creation request from the source description.
///
/// Key schema and attribute definitions are copied verbatim. GSIs keep
/// their name, key schema and projection but get the override throughput;
/// LSIs keep name, key schema and projection only, since they share the
/// table's capacity. The table-level throughput is always the override,
/// never the source's. A stream specification is carried over verbatim.
pub fn derive_definition(
    table: &TableDescription,
    overrides: CapacityOverrides,
) -> Result<TableDefinition, CopyError> {
    let key_schema = table
        .key_schema
        .clone()
        .filter(|keys| !keys.is_empty())
        .ok_or_else(|| CopyError::Definition("source table has no key schema".to_string()))?;

    let throughput = ProvisionedThroughput::builder()
        .read_capacity_units(overrides.read_capacity_units)
        .write_capacity_units(overrides.write_capacity_units)
        .build()
        .map_err(definition_error)?;

    let mut global_secondary_indexes = Vec::new();
    for index in table.global_secondary_indexes() {
        let gsi = GlobalSecondaryIndex::builder()
            .set_index_name(index.index_name.clone())
            .set_key_schema(index.key_schema.clone())
            .set_projection(index.projection.clone())
            .provisioned_throughput(throughput.clone())
            .build()
            .map_err(definition_error)?;
        global_secondary_indexes.push(gsi);
    }

    let mut local_secondary_indexes = Vec::new();
    for index in table.local_secondary_indexes() {
        let lsi = LocalSecondaryIndex::builder()
            .set_index_name(index.index_name.clone())
            .set_key_schema(index.key_schema.clone())
            .set_projection(index.projection.clone())
            .build()
            .map_err(definition_error)?;
        local_secondary_indexes.push(lsi);
    }

    Ok(TableDefinition {
        key_schema,
        attribute_definitions: table.attribute_definitions.clone().unwrap_or_default(),
        global_secondary_indexes,
        local_secondary_indexes,
        provisioned_throughput: throughput,
        stream_specification: table.stream_specification.clone(),
    })
}

async fn table_exists(client: &Client, table: &str) -> Result<bool, CopyError> {
    match client.describe_table().table_name(table).send().await {
        Ok(_) => Ok(true),
        Err(err) => {
            let err = err.into_service_error();
            if err.is_resource_not_found_exception() {
                Ok(false)
            } else {
                Err(CopyError::Describe {
                    table: table.to_string(),
                    message: err.to_string(),
                })
            }
        }
    }
}

async fn create_table(
    client: &Client,
    dest: &str,
    definition: TableDefinition,
) -> Result<(), CopyError> {
    // DynamoDB rejects empty index lists, so unset beats empty here.
    let gsis = (!definition.global_secondary_indexes.is_empty())
        .then_some(definition.global_secondary_indexes);
    let lsis = (!definition.local_secondary_indexes.is_empty())
        .then_some(definition.local_secondary_indexes);

    client
        .create_table()
        .table_name(dest)
        .set_key_schema(Some(definition.key_schema))
        .set_attribute_definitions(Some(definition.attribute_definitions))
        .set_global_secondary_indexes(gsis)
        .set_local_secondary_indexes(lsis)
        .provisioned_throughput(definition.provisioned_throughput)
        .set_stream_specification(definition.stream_specification)
        .send()
        .await
        .map_err(|err| CopyError::Create {
            table: dest.to_string(),
            message: err.into_service_error().to_string(),
        })?;

    Ok(())
}

/// Poll describe-table until the table reports ACTIVE, bounded by
/// [`ACTIVE_POLL_LIMIT`] attempts.
async fn wait_for_active(client: &Client, table: &str) -> Result<(), CopyError> {
    for _ in 0..ACTIVE_POLL_LIMIT {
        let output = client
            .describe_table()
            .table_name(table)
            .send()
            .await
            .map_err(|err| CopyError::Describe {
                table: table.to_string(),
                message: err.into_service_error().to_string(),
            })?;

        let status = output.table.as_ref().and_then(|t| t.table_status.as_ref());
        if matches!(status, Some(TableStatus::Active)) {
            return Ok(());
        }

        tokio::time::sleep(ACTIVE_POLL_INTERVAL).await;
    }

    Err(CopyError::CreationTimeout(
        table.to_string(),
        ACTIVE_POLL_INTERVAL * ACTIVE_POLL_LIMIT,
    ))
}

fn definition_error(err: aws_sdk_dynamodb::error::BuildError) -> CopyError {
    CopyError::Definition(err.to_string())
}
