use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_dynamodb::Client;

use crate::utils::Config;

/// Endpoint used when `USE_LOCAL` is set (DynamoDB Local default port).
const LOCAL_ENDPOINT: &str = "http://localhost:8000";

/// Build a DynamoDB client for either the hosted service or a local
/// emulator, depending on the config.
pub async fn build_client(config: &Config) -> Client {
    if config.use_local {
        // DynamoDB Local accepts any credentials but the SDK requires some.
        let shared = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(Credentials::new("local", "local", None, None, "local"))
            .endpoint_url(LOCAL_ENDPOINT)
            .load()
            .await;
        return Client::new(&shared);
    }

    let mut loader =
        aws_config::defaults(BehaviorVersion::latest()).region(Region::new(config.region.clone()));

    // Explicit keys win; otherwise fall back to the default provider chain
    // (instance profile, AWS_* variables, shared config).
    if let (Some(key), Some(secret)) = (&config.access_key_id, &config.secret_access_key) {
        loader = loader.credentials_provider(Credentials::new(
            key.clone(),
            secret.clone(),
            None,
            None,
            "env",
        ));
    }

    Client::new(&loader.load().await)
}
