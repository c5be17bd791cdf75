// Subject line for every stage notification. The body is the stage's
// auto-email template (or the recruiter's edit of it) sent verbatim.
pub const STAGE_SUBJECT_PREFIX: &str = "Application Update: ";

pub fn stage_subject(stage_name: &str) -> String {
    format!("{STAGE_SUBJECT_PREFIX}{stage_name}")
}
