use rand::Rng;
use ulid::Ulid;

/// Characters used in room codes. Uppercase alphanumerics only, so codes are
/// easy to read out loud and type on a VR keyboard.
const ROOM_CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Length of a generated room code.
pub const ROOM_CODE_LEN: usize = 6;

/// Generates a new ULID-based ID with the given prefix.
///
/// # Examples
/// ```
/// let id = dilemma_common::id::prefixed_ulid("conn");
/// assert!(id.starts_with("conn_"));
/// ```
pub fn prefixed_ulid(prefix: &str) -> String {
    format!("{}_{}", prefix, Ulid::new().to_string())
}

/// Generates a short shareable room code (e.g. `K7QX2M`).
///
/// Codes are not guaranteed unique; callers must retry on collision against
/// whatever store holds live rooms.
pub fn room_code() -> String {
    let mut rng = rand::thread_rng();
    (0..ROOM_CODE_LEN)
        .map(|_| {
            let idx = rng.gen_range(0..ROOM_CODE_CHARSET.len());
            ROOM_CODE_CHARSET[idx] as char
        })
        .collect()
}

/// Well-known ID prefixes.
pub mod prefix {
    pub const CONNECTION: &str = "conn";
}
