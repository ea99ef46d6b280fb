use crate::error::RelayError;
use crate::store::MessageStore;
use rand::Rng;

const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
pub const CODE_LENGTH: usize = 4;

// 36^4 candidates; the cap only triggers once the code space is nearly full.
const MAX_ATTEMPTS: usize = 10_000;

/// One uniform draw of a 4-character uppercase-alphanumeric code.
///
/// `rand::rng()` is a CSPRNG, so codes are not guessable from earlier ones.
pub fn random_code() -> String {
    let mut rng = rand::rng();
    (0..CODE_LENGTH)
        .map(|_| {
            let idx = rng.random_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

/// Rejection-samples codes until one is absent from the store.
///
/// Read-only against the store; the caller is responsible for persisting
/// the returned code before handing it out.
pub async fn generate_unique_code(store: &MessageStore) -> Result<String, RelayError> {
    for _ in 0..MAX_ATTEMPTS {
        let code = random_code();
        if !store.code_exists(&code).await {
            return Ok(code);
        }
    }
    Err(RelayError::CapacityExhausted)
}
