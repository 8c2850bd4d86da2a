use hmac::{Hmac, Mac};
use sha1::Sha1;
use std::fmt;

type HmacSha1 = Hmac<Sha1>;

/// The operator token that authorizes add/remove calls.
///
/// Candidates are compared by HMAC digest with `verify_slice`, which runs in
/// constant time, so response timing does not reveal how much of a guess matched.
#[derive(Clone)]
pub struct SharedSecret {
    secret: String,
    expected: Vec<u8>,
}

impl SharedSecret {
    pub fn new(secret: String) -> Self {
        // An empty digest never verifies
        let expected = HmacSha1::new_from_slice(secret.as_bytes())
            .map(|mut mac| {
                mac.update(secret.as_bytes());
                mac.finalize().into_bytes().to_vec()
            })
            .unwrap_or_default();
        Self { secret, expected }
    }

    pub fn matches(&self, candidate: &str) -> bool {
        let mut mac = match HmacSha1::new_from_slice(self.secret.as_bytes()) {
            Ok(mac) => mac,
            Err(_) => return false,
        };
        mac.update(candidate.as_bytes());
        mac.verify_slice(&self.expected).is_ok()
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedSecret(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_exact_secret_only() {
        let secret = SharedSecret::new("bot-token-123".to_string());

        assert!(secret.matches("bot-token-123"));
        assert!(!secret.matches("bot-token-12"));
        assert!(!secret.matches("bot-token-1234"));
        assert!(!secret.matches("BOT-TOKEN-123"));
        assert!(!secret.matches(""));
    }

    #[test]
    fn test_debug_does_not_leak_secret() {
        let secret = SharedSecret::new("hunter2".to_string());
        let rendered = format!("{:?}", secret);

        assert!(!rendered.contains("hunter2"));
    }
}
