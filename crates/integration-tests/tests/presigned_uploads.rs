//! Presigned upload URLs as a browser client would consume them.

use secrecy::SecretString;

use harvestline_admin::config::StorageConfig;
use harvestline_admin::services::presign_put;

fn storage_config() -> StorageConfig {
    StorageConfig {
        endpoint: "s3.eu-central-1.amazonaws.com".to_string(),
        region: "eu-central-1".to_string(),
        bucket: "harvestline-assets".to_string(),
        access_key_id: "AKIDEXAMPLE".to_string(),
        secret_access_key: SecretString::from("wJalrXUtnFEMI/K7MDENG/bPxRfiCYzR8kQw"),
        public_base_url: "https://assets.harvestline.example".to_string(),
        upload_url_expiry_seconds: 900,
    }
}

#[test]
fn test_upload_url_targets_the_bucket_path() {
    let upload = presign_put(&storage_config(), "uploads/2026/08/feed.png");

    assert!(upload.upload_url.starts_with(
        "https://s3.eu-central-1.amazonaws.com/harvestline-assets/uploads/2026/08/feed.png?"
    ));
    assert_eq!(upload.object_key, "uploads/2026/08/feed.png");
    assert_eq!(upload.expires_in_seconds, 900);
}

#[test]
fn test_upload_url_carries_sigv4_query_parameters() {
    let upload = presign_put(&storage_config(), "uploads/feed.png");

    for param in [
        "X-Amz-Algorithm=AWS4-HMAC-SHA256",
        "X-Amz-Credential=AKIDEXAMPLE%2F",
        "X-Amz-Expires=900",
        "X-Amz-SignedHeaders=host",
        "X-Amz-Signature=",
    ] {
        assert!(
            upload.upload_url.contains(param),
            "missing query parameter: {param}"
        );
    }
}

#[test]
fn test_public_url_is_served_from_the_cdn_prefix() {
    let upload = presign_put(&storage_config(), "uploads/f eed.png");
    // Spaces are percent-encoded in both URLs
    assert_eq!(
        upload.public_url,
        "https://assets.harvestline.example/uploads/f%20eed.png"
    );
}

#[test]
fn test_different_keys_get_different_signatures() {
    let config = storage_config();
    let a = presign_put(&config, "uploads/a.png");
    let b = presign_put(&config, "uploads/b.png");

    let signature = |url: &str| {
        url.rsplit("X-Amz-Signature=")
            .next()
            .map(ToString::to_string)
            .unwrap_or_default()
    };
    assert_ne!(signature(&a.upload_url), signature(&b.upload_url));
}
