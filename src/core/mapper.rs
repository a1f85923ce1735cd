use crate::domain::model::{Diagnosis, MappingPolicy, RawOutput};
use crate::utils::error::{PredictError, Result};

/// Normalizes classifier output into a [`Diagnosis`].
///
/// `1` and `"M"` are Malignant, `0` and `"B"` are Benign. A probability counts
/// as a code only when it equals 0.0 or 1.0 exactly. Everything else depends on
/// the [`MappingPolicy`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DecisionMapper {
    policy: MappingPolicy,
}

impl DecisionMapper {
    pub fn new(policy: MappingPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> MappingPolicy {
        self.policy
    }

    pub fn map(&self, raw: &RawOutput) -> Result<Diagnosis> {
        if let Some(diagnosis) = recognize(raw) {
            return Ok(diagnosis);
        }

        match self.policy {
            MappingPolicy::Strict => Err(PredictError::MappingError {
                raw: raw.to_string(),
            }),
            MappingPolicy::Lenient => {
                tracing::warn!("⚠️ Unrecognized classifier output {}, defaulting to Benign", raw);
                Ok(Diagnosis::Benign)
            }
        }
    }
}

fn recognize(raw: &RawOutput) -> Option<Diagnosis> {
    match raw {
        RawOutput::Code(1) => Some(Diagnosis::Malignant),
        RawOutput::Code(0) => Some(Diagnosis::Benign),
        RawOutput::Probability(p) if *p == 1.0 => Some(Diagnosis::Malignant),
        RawOutput::Probability(p) if *p == 0.0 => Some(Diagnosis::Benign),
        RawOutput::Label(label) => Diagnosis::from_code(label),
        _ => None,
    }
}
