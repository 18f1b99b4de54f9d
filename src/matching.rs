use crate::models::DEFAULT_MATCH_SCORE;

const MIN_MATCH_SCORE: u32 = 60;
const MAX_MATCH_SCORE: u32 = 100;

/// Skill overlap between a job seeker and a job, in `60..=100`.
///
/// A requester skill counts as matching when it contains, or is contained in,
/// any job skill (case-insensitive), so "React" matches "React Native". The
/// score is the matching count over the number of job skills. Without
/// requester skills, or for a job that lists none, the score is 85.
pub fn match_score(job_skills: &[String], requester_skills: Option<&[String]>) -> u32 {
    let Some(requester_skills) = requester_skills else {
        return DEFAULT_MATCH_SCORE;
    };
    if job_skills.is_empty() {
        return DEFAULT_MATCH_SCORE;
    }

    let job_skills: Vec<String> = job_skills.iter().map(|s| s.to_lowercase()).collect();
    let matching = requester_skills
        .iter()
        .map(|skill| skill.to_lowercase())
        .filter(|skill| {
            job_skills.iter().any(|job_skill| {
                job_skill.contains(skill.as_str()) || skill.contains(job_skill.as_str())
            })
        })
        .count();

    let percentage = (matching as f64 / job_skills.len() as f64 * 100.0).round() as u32;
    percentage.clamp(MIN_MATCH_SCORE, MAX_MATCH_SCORE)
}

/// Decodes the `userSkills` query value, a JSON array of strings. Anything
/// blank or undecodable means the requester supplied no skills.
pub fn parse_requester_skills(raw: Option<&str>) -> Option<Vec<String>> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    serde_json::from_str(raw).ok()
}
