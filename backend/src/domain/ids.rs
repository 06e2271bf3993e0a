//! Opaque id and invite-code generation.
//!
//! Ids look like `event_lxk3f2a9q1b2` — a prefix, the current epoch
//! millis in base 36, and a short random suffix. Invite codes are a
//! 4-letter tag (`HARU` for parent codes, `CHLD` for child-profile
//! codes) followed by four random uppercase alphanumerics.

use rand::Rng;

const CODE_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

pub const PARENT_CODE_PREFIX: &str = "HARU";
pub const LEGACY_PARENT_CODE_PREFIX: &str = "PRNT";
pub const CHILD_CODE_PREFIX: &str = "CHLD";

pub fn generate_id(prefix: &str) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let suffix: String = {
        let mut rng = rand::thread_rng();
        (0..6)
            .map(|_| {
                let idx = rng.gen_range(0..CODE_CHARS.len());
                (CODE_CHARS[idx] as char).to_ascii_lowercase()
            })
            .collect()
    };
    format!("{}_{}{}", prefix, base36(millis), suffix)
}

pub fn generate_invite_code(prefix: &str) -> String {
    let mut rng = rand::thread_rng();
    let mut code = String::from(prefix);
    for _ in 0..4 {
        let idx = rng.gen_range(0..CODE_CHARS.len());
        code.push(CODE_CHARS[idx] as char);
    }
    code
}

fn base36(mut value: i64) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value <= 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}
