//! Recommender output

use crate::{FormationProvenance, ParticipantId};
use serde::{Deserialize, Serialize};

/// One cluster suggested by the external recommender
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SuggestedGroup {
    pub member_ids: Vec<ParticipantId>,
    pub compatibility_score: f64,
    pub formation_reason: String,
}

impl SuggestedGroup {
    pub fn provenance(&self) -> FormationProvenance {
        FormationProvenance {
            reason: self.formation_reason.clone(),
            compatibility_score: self.compatibility_score,
        }
    }
}
