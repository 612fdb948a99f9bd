use std::path::PathBuf;

pub fn default_input() -> PathBuf {
    PathBuf::from("controls.csv")
}

pub fn default_concurrency() -> usize {
    // Sequential by default; raising this fans records out across tasks
    // without changing the output order.
    1
}

pub fn default_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

pub fn default_model() -> String {
    "gpt-4o".to_string()
}

pub fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

pub fn default_timeout_sec() -> u64 {
    120
}

pub fn default_max_attempts() -> u32 {
    5
}

pub fn default_backoff_base_ms() -> u64 {
    1000
}

pub fn default_backoff_max_ms() -> u64 {
    60_000
}
