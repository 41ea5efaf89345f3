use sha2::{Digest, Sha256};

use formal_concept::ContextHash;

/// Incremental SHA-256 over the parts that identify a context.
pub(crate) struct ContextHasher {
    inner: Sha256,
}

impl ContextHasher {
    pub(crate) fn new(kind: &str) -> Self {
        let mut inner = Sha256::new();
        inner.update(kind.as_bytes());
        Self { inner }
    }

    pub(crate) fn names(&mut self, names: &[String]) {
        self.inner.update((names.len() as u64).to_le_bytes());
        for name in names {
            self.inner.update((name.len() as u64).to_le_bytes());
            self.inner.update(name.as_bytes());
        }
    }

    pub(crate) fn indices(&mut self, indices: impl IntoIterator<Item = usize>) {
        for index in indices {
            self.inner.update((index as u64).to_le_bytes());
        }
        self.inner.update(u64::MAX.to_le_bytes());
    }

    pub(crate) fn value(&mut self, value: f64) {
        self.inner.update((value + 0.0).to_bits().to_le_bytes());
    }

    pub(crate) fn finish(self) -> ContextHash {
        let digest = self.inner.finalize();
        let mut head = [0u8; 8];
        head.copy_from_slice(&digest[..8]);
        ContextHash(u64::from_be_bytes(head))
    }
}
