use sha2::{Digest, Sha256};

/// SHA-256 of the UTF-8 bytes of `content`, lower-case hex
#[must_use]
pub fn hash_content(content: &str) -> String {
    hash_bytes(content.as_bytes())
}

#[must_use]
pub fn hash_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_digest() {
        assert_eq!(
            hash_content(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(
            hash_content("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn sensitive_to_single_byte() {
        assert_ne!(hash_content("print(\"v1\")"), hash_content("print(\"v2\")"));
        assert_eq!(hash_content("same"), hash_content("same"));
        assert_eq!(hash_content("x").len(), 64);
    }
}
