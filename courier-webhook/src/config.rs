use courier_core::CourierConfig;

/// Generic override prefix: `COURIER__SECTION__NAME` sets `section.name`.
pub const ENV_PREFIX: &str = "COURIER__";

/// Well-known environment variables and the config keys they feed.
const ENV_KEYS: [(&str, &str); 10] = [
    ("HTTP_HOST", "http.host"),
    ("PORT", "http.port"),
    ("AWS_REGION", "s3.region"),
    ("AWS_ACCESS_KEY_ID", "s3.access_key_id"),
    ("AWS_SECRET_ACCESS_KEY", "s3.secret_access_key"),
    ("S3_BUCKET_NAME", "s3.bucket"),
    ("S3_ENDPOINT_URL", "s3.endpoint_url"),
    ("STORAGE_BACKEND", "storage.backend"),
    ("MAX_BLOB_MB", "storage.max_blob_mb"),
    ("MEDIA_FETCH_TIMEOUT_SECS", "media.timeout_secs"),
];

const DEFAULTS: [(&str, &str); 4] = [
    ("http.host", "0.0.0.0"),
    ("http.port", "3000"),
    ("storage.backend", "s3"),
    ("storage.max_blob_mb", "100"),
];

pub fn config_from_env() -> CourierConfig {
    config_from_vars(std::env::vars())
}

/// Build the configuration from `vars`.
///
/// Precedence, lowest first: defaults, well-known variables, `COURIER__*`.
pub fn config_from_vars<I>(vars: I) -> CourierConfig
where
    I: IntoIterator<Item = (String, String)>,
{
    let vars: Vec<(String, String)> = vars.into_iter().collect();
    let mut config = CourierConfig::new();

    for (var, key) in ENV_KEYS {
        config.map_var(vars.iter().cloned(), var, key);
    }
    for (key, value) in DEFAULTS {
        config.set_default(key, value);
    }
    config.load_prefixed(ENV_PREFIX, vars);

    config
}
