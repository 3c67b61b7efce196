use rand::RngCore;

/// Generate a session token: 32 random bytes, hex-encoded (64 chars).
pub fn generate_session_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
