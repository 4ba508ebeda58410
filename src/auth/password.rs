use bcrypt::{hash, verify, DEFAULT_COST};

/// Hash a plaintext password with bcrypt. The salt is generated per call.
pub fn hash_password(plain: &str) -> Result<String, bcrypt::BcryptError> {
    hash(plain, DEFAULT_COST)
}

/// Check a plaintext password against a stored bcrypt hash.
pub fn verify_password(plain: &str, hashed: &str) -> Result<bool, bcrypt::BcryptError> {
    verify(plain, hashed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_roundtrip() {
        let hashed = hash_password("hunter2").unwrap();
        assert_ne!(hashed, "hunter2");
        assert!(verify_password("hunter2", &hashed).unwrap());
    }

    #[test]
    fn wrong_password_does_not_verify() {
        let hashed = hash_password("hunter2").unwrap();
        assert!(!verify_password("hunter3", &hashed).unwrap());
    }

    #[test]
    fn same_password_hashes_differently() {
        // bcrypt salts per call
        let h1 = hash_password("hunter2").unwrap();
        let h2 = hash_password("hunter2").unwrap();
        assert_ne!(h1, h2);
    }
}
