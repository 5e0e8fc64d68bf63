//! Content fingerprints of generated files.
//!
//! Regenerating from an unchanged registry must produce byte-identical
//! output, so a BLAKE3 hash of the text is enough to detect drift between
//! the checked-in files and what the generator would write today.

use std::fmt;
use std::path::Path;

/// A 256-bit BLAKE3 hash of emitted text.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fingerprint(pub [u8; 32]);

impl Fingerprint {
    pub fn of(text: &str) -> Self {
        Self(*blake3::hash(text.as_bytes()).as_bytes())
    }

    /// Display as full hex.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02x}", b)).collect()
    }

    /// Display as short base-32 (8 characters, 40 bits).
    pub fn to_short(&self) -> String {
        const ALPHABET: &[u8] = b"0123456789abcdefghjkmnpqrstvwxyz";
        let val = u64::from_be_bytes([
            0, 0, 0, self.0[0], self.0[1], self.0[2], self.0[3], self.0[4],
        ]);
        (0..8)
            .rev()
            .map(|i| ALPHABET[((val >> (i * 5)) & 0x1F) as usize] as char)
            .collect()
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.to_short())
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_short())
    }
}

/// How a file on disk compares with freshly generated text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Drift {
    Unchanged,
    Changed {
        on_disk: Fingerprint,
        generated: Fingerprint,
    },
    Missing,
}

impl Drift {
    pub fn is_unchanged(&self) -> bool {
        matches!(self, Drift::Unchanged)
    }
}

/// Compare `path` with `generated`. Unreadable files count as missing.
pub fn drift(path: &Path, generated: &str) -> Drift {
    let on_disk = match std::fs::read_to_string(path) {
        Ok(text) => Fingerprint::of(&text),
        Err(_) => return Drift::Missing,
    };
    let fresh = Fingerprint::of(generated);
    if on_disk == fresh {
        Drift::Unchanged
    } else {
        Drift::Changed {
            on_disk,
            generated: fresh,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_text_same_fingerprint() {
        let a = Fingerprint::of("case 1:\n");
        let b = Fingerprint::of("case 1:\n");
        assert_eq!(a, b);
        assert_ne!(a, Fingerprint::of("case 2:\n"));
    }

    #[test]
    fn test_hex_and_short_forms() {
        let fp = Fingerprint::of("");
        // BLAKE3 of the empty input
        assert_eq!(
            fp.to_hex(),
            "af1349b9f5f9a1a6a0404dea36dcc9499bcb25c9adc112b7cc9a93cae41f3262"
        );
        assert_eq!(fp.to_short().len(), 8);
        assert_eq!(format!("{}", fp), fp.to_short());
        assert_eq!(format!("{:?}", fp), format!("#{}", fp.to_short()));
    }

    #[test]
    fn test_drift_detection() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("CopyCPU.cpp");
        assert_eq!(drift(&path, "x"), Drift::Missing);

        std::fs::write(&path, "x").unwrap();
        assert!(drift(&path, "x").is_unchanged());
        assert!(matches!(drift(&path, "y"), Drift::Changed { .. }));
    }
}
