//! Company-fit preview — the local, approximate match estimate between a
//! student's skill radar and a job's required-skill profile.
//!
//! The authoritative match score is computed server-side and arrives via
//! `api::ApiClient::get_job_matches`; this estimate only feeds the fit
//! preview panel, where it must render instantly on every profile or
//! requirement change.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// How much a requirement counts toward the fit score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Importance {
    #[serde(rename = "must-have")]
    MustHave,
    #[serde(rename = "nice-to-have")]
    NiceToHave,
}

impl Importance {
    fn weight(self) -> f64 {
        match self {
            Importance::MustHave => 1.5,
            Importance::NiceToHave => 1.0,
        }
    }
}

/// One required skill on a job posting. `proficiency_level` is on the 0–5
/// scale recruiters pick in the posting form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillRequirement {
    pub skill_name: String,
    pub proficiency_level: f64,
    pub importance: Importance,
}

/// Raw skill-radar scores are 0–100; requirements are 0–5.
const RAW_SCORE_PER_LEVEL: f64 = 20.0;

/// Computes the 0–100 fit estimate.
///
/// Per requirement, credit is `min(candidate_level, required_level)` times
/// the importance weight — being over-qualified on one skill cannot make up
/// for a deficit on another within that skill's own term. A missing skill
/// scores 0 for that requirement. A job with no requirements scores 0.
pub fn compute_match_score(
    requirements: &[SkillRequirement],
    skill_scores: &HashMap<String, f64>,
) -> u32 {
    let mut earned = 0.0f64;
    let mut possible = 0.0f64;

    for req in requirements {
        let weight = req.importance.weight();
        let candidate_level =
            skill_scores.get(&req.skill_name).copied().unwrap_or(0.0) / RAW_SCORE_PER_LEVEL;
        earned += candidate_level.min(req.proficiency_level) * weight;
        possible += req.proficiency_level * weight;
    }

    if possible <= 0.0 {
        return 0;
    }

    ((earned / possible) * 100.0).round().clamp(0.0, 100.0) as u32
}
