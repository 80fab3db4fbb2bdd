use sha2::{Digest, Sha256};

/// SHA-256 of "password".
pub const DEFAULT_PASSWORD_HASH: &str =
    "5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8";

#[derive(Debug, Clone)]
pub struct AdminCredential {
    pub username: String,
    pub password_sha256_hex: String,
}

impl AdminCredential {
    pub fn verify(&self, username: &str, password: &str) -> bool {
        username == self.username
            && hash_password(password).eq_ignore_ascii_case(self.password_sha256_hex.trim())
    }
}

pub fn hash_password(password: &str) -> String {
    format!("{:x}", Sha256::digest(password.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credential() -> AdminCredential {
        AdminCredential {
            username: "admin".to_string(),
            password_sha256_hex: DEFAULT_PASSWORD_HASH.to_uppercase(),
        }
    }

    #[test]
    fn default_hash_matches_default_password() {
        assert_eq!(hash_password("password"), DEFAULT_PASSWORD_HASH);
    }

    #[test]
    fn verify_requires_both_fields() {
        let admin = credential();
        assert!(admin.verify("admin", "password"));
        assert!(!admin.verify("admin", "Password"));
        assert!(!admin.verify("root", "password"));
    }
}
