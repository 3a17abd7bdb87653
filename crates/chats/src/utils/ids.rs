use chrono::Utc;
use rand::distributions::{Alphanumeric, DistString};
use rand::Rng;

const LOWER_ALPHANUMERIC: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

fn lower_token(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| LOWER_ALPHANUMERIC[rng.gen_range(0..LOWER_ALPHANUMERIC.len())] as char)
        .collect()
}

/// `server_<ms>_<6 chars>`
pub fn server_id(now: i64) -> String {
    format!("server_{now}_{}", lower_token(6))
}

/// `msg_<ms>_<9 chars>`
pub fn message_id(now: i64) -> String {
    format!("msg_{now}_{}", lower_token(9))
}

pub fn invite_code() -> String {
    Alphanumeric.sample_string(&mut rand::thread_rng(), 8)
}
