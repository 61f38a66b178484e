use crc32fast::Hasher;

/// Stable short seed for a document name using CRC32
pub fn document_seed(name: &str) -> String {
    let mut hasher = Hasher::new();
    hasher.update(name.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Sequential id generator for block nodes within a document
#[derive(Debug, Clone)]
pub struct IdGenerator {
    prefix: String,
    seed: String,
    count: u32,
}

impl IdGenerator {
    pub fn new(prefix: &str, document_name: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            seed: document_seed(document_name),
            count: 0,
        }
    }

    /// Generate next sequential id
    pub fn new_id(&mut self) -> String {
        self.count += 1;
        format!("{}-{}-{}", self.prefix, self.seed, self.count)
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new("lk", "untitled")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_seed() {
        let a = document_seed("lesson-1.json");
        assert_eq!(a, document_seed("lesson-1.json"));
        assert_ne!(a, document_seed("lesson-2.json"));
    }

    #[test]
    fn test_sequential_ids() {
        let mut gen = IdGenerator::new("lk", "lesson");

        let id1 = gen.new_id();
        let id2 = gen.new_id();

        assert!(id1.ends_with("-1"));
        assert!(id2.ends_with("-2"));
        assert!(id1.starts_with(&format!("lk-{}", gen.seed())));
    }
}
