//! Assessment records produced by the calculator service.

use serde::{Deserialize, Serialize};

use super::indices::DerivedIndices;
use super::score::ScoreResult;

/// One completed FOSSI calculation.
///
/// Wraps the deterministic [`ScoreResult`] with per-request metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assessment {
    /// Unique identifier
    pub id: String,

    /// Score and category
    pub result: ScoreResult,

    /// CMI/VAI when computed from raw measurements
    pub indices: Option<DerivedIndices>,

    /// When the calculation ran
    pub evaluated_at: chrono::DateTime<chrono::Utc>,
}

impl Assessment {
    #[must_use]
    pub fn new(result: ScoreResult) -> Self {
        Self {
            id: uuid_v4(),
            result,
            indices: None,
            evaluated_at: chrono::Utc::now(),
        }
    }

    #[must_use]
    pub fn with_indices(result: ScoreResult, indices: DerivedIndices) -> Self {
        Self {
            indices: Some(indices),
            ..Self::new(result)
        }
    }
}

/// Random (v4) UUID string.
pub(crate) fn uuid_v4() -> String {
    use rand::Rng;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    let mut rng = ChaCha20Rng::from_entropy();
    let mut bytes: [u8; 16] = rng.gen();
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;

    let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
    format!(
        "{}-{}-{}-{}-{}",
        &hex[0..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..32]
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RiskCategory, Sex};

    fn result() -> ScoreResult {
        ScoreResult {
            sex: Sex::Male,
            score: 0.2213,
            category: RiskCategory::GreyZone,
        }
    }

    #[test]
    fn test_assessment_creation() {
        let a = Assessment::new(result());
        assert_eq!(a.result, result());
        assert!(a.indices.is_none());
    }

    #[test]
    fn test_uuid_format() {
        let id1 = uuid_v4();
        let id2 = uuid_v4();
        assert_ne!(id1, id2);
        assert_eq!(id1.len(), 36);
        assert_eq!(&id1[14..15], "4");
    }
}
