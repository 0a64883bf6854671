use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{Local, NaiveDate};
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};

fn random_alphanumeric(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

pub fn generate_code_verifier() -> String {
    random_alphanumeric(128)
}

pub fn generate_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// Opaque value echoed back by the authorization server to tie the callback to
/// the request that started it.
pub fn generate_state() -> String {
    random_alphanumeric(16)
}

/// The local calendar date, used once per run to place the search window.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Lenient boolean parsing for environment values.
///
/// Accepts `1/0`, `t/f`, `true/false` and `yes/no` in any case.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "t" | "true" | "yes" | "y" => Some(true),
        "0" | "f" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}
