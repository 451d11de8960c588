//! Presigned uploads to S3-compatible object storage.
//!
//! Mints AWS Signature Version 4 query-signed PUT URLs so the browser
//! uploads directly to the bucket; this service never proxies file bytes.
//! Only the `host` header is signed, with an unsigned payload, which is the
//! standard shape for browser-facing presigned uploads.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use secrecy::ExposeSecret;
use sha2::{Digest, Sha256};

use crate::config::StorageConfig;

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";
const SERVICE: &str = "s3";
const UNSIGNED_PAYLOAD: &str = "UNSIGNED-PAYLOAD";

/// A minted upload URL plus the durable public URL to store on the asset
/// record once the upload completes.
#[derive(Debug, Clone)]
pub struct PresignedUpload {
    /// Signed PUT URL, valid for `expires_in_seconds`.
    pub upload_url: String,
    /// Where the object will be publicly served from.
    pub public_url: String,
    pub object_key: String,
    pub expires_in_seconds: u64,
}

/// Presign a PUT of `object_key` into the configured bucket.
#[must_use]
pub fn presign_put(config: &StorageConfig, object_key: &str) -> PresignedUpload {
    presign_put_at(config, object_key, Utc::now())
}

/// Presign with an explicit signing time. Split out for deterministic tests.
fn presign_put_at(
    config: &StorageConfig,
    object_key: &str,
    now: DateTime<Utc>,
) -> PresignedUpload {
    let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
    let date_stamp = now.format("%Y%m%d").to_string();
    let scope = format!("{date_stamp}/{}/{SERVICE}/aws4_request", config.region);
    let credential = format!("{}/{scope}", config.access_key_id);

    // Path-style addressing: /{bucket}/{key}, key segments encoded
    let canonical_path = format!(
        "/{}/{}",
        uri_encode(&config.bucket, false),
        uri_encode(object_key, false)
    );

    // Already in canonical (byte-sorted) key order
    let query_pairs = [
        ("X-Amz-Algorithm", ALGORITHM.to_string()),
        ("X-Amz-Credential", credential),
        ("X-Amz-Date", amz_date.clone()),
        ("X-Amz-Expires", config.upload_url_expiry_seconds.to_string()),
        ("X-Amz-SignedHeaders", "host".to_string()),
    ];
    let canonical_query = query_pairs
        .iter()
        .map(|(k, v)| format!("{}={}", uri_encode(k, true), uri_encode(v, true)))
        .collect::<Vec<_>>()
        .join("&");

    let canonical_request = format!(
        "PUT\n{canonical_path}\n{canonical_query}\nhost:{}\n\nhost\n{UNSIGNED_PAYLOAD}",
        config.endpoint
    );

    let string_to_sign = format!(
        "{ALGORITHM}\n{amz_date}\n{scope}\n{}",
        hex::encode(Sha256::digest(canonical_request.as_bytes()))
    );

    let signing_key = derive_signing_key(
        config.secret_access_key.expose_secret(),
        &date_stamp,
        &config.region,
    );
    let signature = hex::encode(hmac_sha256(&signing_key, string_to_sign.as_bytes()));

    let upload_url = format!(
        "https://{}{canonical_path}?{canonical_query}&X-Amz-Signature={signature}",
        config.endpoint
    );
    let public_url = format!(
        "{}/{}",
        config.public_base_url,
        uri_encode(object_key, false)
    );

    PresignedUpload {
        upload_url,
        public_url,
        object_key: object_key.to_string(),
        expires_in_seconds: config.upload_url_expiry_seconds,
    }
}

/// SigV4 key derivation: HMAC chain over date, region, and service.
fn derive_signing_key(secret: &str, date_stamp: &str, region: &str) -> Vec<u8> {
    let k_date = hmac_sha256(format!("AWS4{secret}").as_bytes(), date_stamp.as_bytes());
    let k_region = hmac_sha256(&k_date, region.as_bytes());
    let k_service = hmac_sha256(&k_region, SERVICE.as_bytes());
    hmac_sha256(&k_service, b"aws4_request")
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts keys of any length");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

/// AWS canonical URI encoding.
///
/// Unreserved characters pass through; everything else becomes uppercase
/// percent escapes. `/` is kept literal in paths and encoded in query
/// values (`encode_slash`).
fn uri_encode(input: &str, encode_slash: bool) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(byte as char);
            }
            b'/' if !encode_slash => out.push('/'),
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    fn test_config() -> StorageConfig {
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

    fn fixed_now() -> DateTime<Utc> {
        chrono::NaiveDate::from_ymd_opt(2026, 8, 28)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap()
            .and_utc()
    }

    #[test]
    fn test_uri_encode() {
        assert_eq!(uri_encode("uploads/img 1.png", false), "uploads/img%201.png");
        assert_eq!(uri_encode("a/b", true), "a%2Fb");
        assert_eq!(uri_encode("safe-._~chars", true), "safe-._~chars");
    }

    #[test]
    fn test_presign_url_shape() {
        let upload = presign_put_at(&test_config(), "uploads/feed.png", fixed_now());

        assert!(upload.upload_url.starts_with(
            "https://s3.eu-central-1.amazonaws.com/harvestline-assets/uploads/feed.png?"
        ));
        assert!(upload.upload_url.contains("X-Amz-Algorithm=AWS4-HMAC-SHA256"));
        assert!(
            upload
                .upload_url
                .contains("X-Amz-Credential=AKIDEXAMPLE%2F20260828%2Feu-central-1%2Fs3%2Faws4_request")
        );
        assert!(upload.upload_url.contains("X-Amz-Date=20260828T103000Z"));
        assert!(upload.upload_url.contains("X-Amz-Expires=900"));
        assert!(upload.upload_url.contains("X-Amz-SignedHeaders=host"));
        assert_eq!(
            upload.public_url,
            "https://assets.harvestline.example/uploads/feed.png"
        );
    }

    #[test]
    fn test_presign_signature_is_hex_and_deterministic() {
        let a = presign_put_at(&test_config(), "uploads/feed.png", fixed_now());
        let b = presign_put_at(&test_config(), "uploads/feed.png", fixed_now());
        assert_eq!(a.upload_url, b.upload_url);

        let signature = a
            .upload_url
            .rsplit("X-Amz-Signature=")
            .next()
            .unwrap()
            .to_string();
        assert_eq!(signature.len(), 64);
        assert!(signature.bytes().all(|b| b.is_ascii_hexdigit()));
    }

    #[test]
    fn test_signature_changes_with_key() {
        let a = presign_put_at(&test_config(), "uploads/a.png", fixed_now());
        let b = presign_put_at(&test_config(), "uploads/b.png", fixed_now());
        assert_ne!(a.upload_url, b.upload_url);
    }
}
