// Onboarding profiles: the student preference survey and the professional
// experience intake, plus archiving of mentor profiles for retrieval.

pub mod archive;
pub mod handlers;
pub mod majors;
pub mod professional;
pub mod student;
pub mod survey;
