#[cfg(test)]
mod integration_tests {
    //! End-to-end tests against DynamoDB Local.
    //!
    //! Run with: docker run -p 8000:8000 amazon/dynamodb-local
    //!           cargo test -- --ignored --nocapture

    use std::collections::HashMap;
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    use aws_sdk_dynamodb::types::{
        AttributeDefinition, AttributeValue, KeySchemaElement, KeyType, ProvisionedThroughput,
        ScalarAttributeType, TableStatus,
    };
    use aws_sdk_dynamodb::Client;

    use crate::copy::{self, RunReport};
    use crate::utils::Config;

    fn local_config() -> Config {
        Config {
            skip_creation: false,
            use_local: true,
            access_key_id: None,
            secret_access_key: None,
            region: "us-east-1".to_string(),
            parallelism: 4,
            page_size: 10,
            read_capacity: 3,
            write_capacity: 1200,
        }
    }

    /// Unique table name per test run so reruns don't collide.
    fn table_name(prefix: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        format!("{prefix}-{nanos}")
    }

    async fn create_source_table(client: &Client, name: &str) -> anyhow::Result<()> {
        client
            .create_table()
            .table_name(name)
            .key_schema(
                KeySchemaElement::builder()
                    .attribute_name("pk")
                    .key_type(KeyType::Hash)
                    .build()?,
            )
            .attribute_definitions(
                AttributeDefinition::builder()
                    .attribute_name("pk")
                    .attribute_type(ScalarAttributeType::S)
                    .build()?,
            )
            .provisioned_throughput(
                ProvisionedThroughput::builder()
                    .read_capacity_units(5)
                    .write_capacity_units(5)
                    .build()?,
            )
            .send()
            .await?;

        for _ in 0..20 {
            let output = client.describe_table().table_name(name).send().await?;
            let status = output.table.as_ref().and_then(|t| t.table_status.as_ref());
            if matches!(status, Some(TableStatus::Active)) {
                return Ok(());
            }
            tokio::time::sleep(Duration::from_millis(200)).await;
        }
        anyhow::bail!("table {name} never became active")
    }

    async fn put_items(client: &Client, name: &str, count: usize) -> anyhow::Result<()> {
        for i in 0..count {
            let mut address = HashMap::new();
            address.insert("city".to_string(), AttributeValue::S("Berlin".to_string()));

            client
                .put_item()
                .table_name(name)
                .item("pk", AttributeValue::S(format!("item-{i}")))
                .item("n", AttributeValue::N(i.to_string()))
                .item(
                    "tags",
                    AttributeValue::L(vec![AttributeValue::S("copy-test".to_string())]),
                )
                .item("address", AttributeValue::M(address))
                .send()
                .await?;
        }
        Ok(())
    }

    async fn scan_all(
        client: &Client,
        name: &str,
    ) -> anyhow::Result<Vec<HashMap<String, AttributeValue>>> {
        let mut items = Vec::new();
        let mut pages = client
            .scan()
            .table_name(name)
            .consistent_read(true)
            .into_paginator()
            .send();
        while let Some(page) = pages.next().await {
            items.extend(page?.items.unwrap_or_default());
        }
        Ok(items)
    }

    #[tokio::test]
    #[ignore]
    async fn copies_schema_and_items() -> anyhow::Result<()> {
        let config = local_config();
        let client = crate::client::build_client(&config).await;

        let source = table_name("copy-src");
        let dest = table_name("copy-dst");
        create_source_table(&client, &source).await?;
        put_items(&client, &source, 37).await?;

        let report = copy::run(&client, &config, &source, &dest).await?;
        let summary = match report {
            RunReport::Completed(summary) => summary,
            other => anyhow::bail!("unexpected report: {other:?}"),
        };

        assert_eq!(summary.copied, 37);
        assert_eq!(summary.workers, 4);
        assert_eq!(summary.failed_workers, 0);

        // Every item must arrive byte-for-byte identical.
        let mut source_items = scan_all(&client, &source).await?;
        let mut dest_items = scan_all(&client, &dest).await?;
        let key = |item: &HashMap<String, AttributeValue>| {
            item.get("pk").and_then(|v| v.as_s().ok()).cloned()
        };
        source_items.sort_by_key(key);
        dest_items.sort_by_key(key);
        assert_eq!(source_items, dest_items);

        Ok(())
    }

    #[tokio::test]
    #[ignore]
    async fn second_run_aborts_without_mutation() -> anyhow::Result<()> {
        let config = local_config();
        let client = crate::client::build_client(&config).await;

        let source = table_name("abort-src");
        let dest = table_name("abort-dst");
        create_source_table(&client, &source).await?;
        put_items(&client, &source, 5).await?;

        let first = copy::run(&client, &config, &source, &dest).await?;
        assert!(matches!(first, RunReport::Completed(_)));

        // Add an extra source item; the second run must not copy it.
        put_items(&client, &source, 6).await?;
        let second = copy::run(&client, &config, &source, &dest).await?;
        assert_eq!(second, RunReport::DestinationExists);

        let dest_items = scan_all(&client, &dest).await?;
        assert_eq!(dest_items.len(), 5);

        Ok(())
    }

    #[tokio::test]
    #[ignore]
    async fn missing_source_is_reported() {
        let config = local_config();
        let client = crate::client::build_client(&config).await;

        let result = copy::run(&client, &config, "no-such-table", "never-created").await;
        assert!(matches!(
            result,
            Err(crate::error::CopyError::SourceNotFound(_))
        ));
    }
}
