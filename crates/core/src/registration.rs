//! Registration wizard session.
//!
//! [`RegistrationSession`] is the explicit context object carried between
//! the five wizard stages:
//!
//! ```text
//! Info -> Photo -> Generating -> Review -> Complete
//!           ^          |           |
//!           +----------+-----------+   (failure / retry)
//! ```
//!
//! Every generation attempt gets a fresh [`AttemptId`]. Results tagged with
//! an older id are ignored, so a late response for an abandoned task can
//! never overwrite the state of a newer one.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::image_prep::ImageUpload;
use crate::types::DbId;
use crate::validation::{validate_http_url, validate_required, validate_text, MAX_PROFILE_FIELD_LEN};

/// Message shown when generation is requested without a photo.
pub const NO_PHOTO_MESSAGE: &str = "Please select a profile picture to enhance.";

// ---------------------------------------------------------------------------
// Stage
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationStage {
    Info,
    Photo,
    Generating,
    Review,
    Complete,
}

impl fmt::Display for RegistrationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RegistrationStage::Info => "info",
            RegistrationStage::Photo => "photo",
            RegistrationStage::Generating => "generating",
            RegistrationStage::Review => "review",
            RegistrationStage::Complete => "complete",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Profile form and submission payload
// ---------------------------------------------------------------------------

/// Attendee details entered in the Info stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileForm {
    pub name: String,
    pub role: String,
    pub company: String,
    #[serde(default)]
    pub linkedin: Option<String>,
}

impl ProfileForm {
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_text("name", &self.name, MAX_PROFILE_FIELD_LEN)?;
        validate_text("role", &self.role, MAX_PROFILE_FIELD_LEN)?;
        validate_text("company", &self.company, MAX_PROFILE_FIELD_LEN)?;
        if let Some(url) = self.linkedin.as_deref().filter(|u| !u.trim().is_empty()) {
            validate_http_url("linkedin", url)?;
        }
        Ok(())
    }

    /// LinkedIn URL with blank values treated as absent.
    pub fn linkedin_url(&self) -> Option<&str> {
        self.linkedin.as_deref().map(str::trim).filter(|u| !u.is_empty())
    }
}

/// Body of `POST /api/v1/attendees`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendeeSubmission {
    pub event_id: DbId,
    pub name: String,
    pub role: String,
    pub company: String,
    #[serde(default)]
    pub linkedin: Option<String>,
    pub image_url: String,
}

impl AttendeeSubmission {
    pub fn validate(&self) -> Result<(), CoreError> {
        ProfileForm {
            name: self.name.clone(),
            role: self.role.clone(),
            company: self.company.clone(),
            linkedin: self.linkedin.clone(),
        }
        .validate()?;
        validate_required("imageUrl", &self.image_url)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Generation attempts
// ---------------------------------------------------------------------------

/// Identifies one generation attempt within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttemptId(u64);

impl AttemptId {
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Terminal result of one generation attempt as seen by the wizard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationResult {
    Generated { image_url: String },
    Failed { message: String },
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// State of one attendee's pass through the registration wizard.
#[derive(Debug, Clone)]
pub struct RegistrationSession {
    event_id: DbId,
    stage: RegistrationStage,
    form: ProfileForm,
    photo: Option<ImageUpload>,
    next_attempt: u64,
    active_attempt: Option<AttemptId>,
    task_id: Option<String>,
    final_image: Option<String>,
    error: Option<String>,
}

impl RegistrationSession {
    pub fn new(event_id: DbId) -> Self {
        Self {
            event_id,
            stage: RegistrationStage::Info,
            form: ProfileForm::default(),
            photo: None,
            next_attempt: 1,
            active_attempt: None,
            task_id: None,
            final_image: None,
            error: None,
        }
    }

    // ---- accessors ----

    pub fn event_id(&self) -> DbId {
        self.event_id
    }

    pub fn stage(&self) -> RegistrationStage {
        self.stage
    }

    pub fn form(&self) -> &ProfileForm {
        &self.form
    }

    pub fn photo(&self) -> Option<&ImageUpload> {
        self.photo.as_ref()
    }

    pub fn active_attempt(&self) -> Option<AttemptId> {
        self.active_attempt
    }

    pub fn task_id(&self) -> Option<&str> {
        self.task_id.as_deref()
    }

    pub fn final_image(&self) -> Option<&str> {
        self.final_image.as_deref()
    }

    /// Last error shown to the user, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    // ---- Info ----

    /// Validate and store the profile form, advancing to Photo.
    pub fn submit_info(&mut self, form: ProfileForm) -> Result<(), CoreError> {
        self.expect_stage(&[RegistrationStage::Info, RegistrationStage::Photo], "submit info")?;
        form.validate()?;
        self.form = form;
        self.stage = RegistrationStage::Photo;
        Ok(())
    }

    /// Return from Photo to Info, keeping everything entered so far.
    pub fn back_to_info(&mut self) -> Result<(), CoreError> {
        self.expect_stage(&[RegistrationStage::Photo], "go back to info")?;
        self.stage = RegistrationStage::Info;
        Ok(())
    }

    // ---- Photo ----

    /// Select the single photo to enhance, replacing any previous choice.
    pub fn select_photo(&mut self, photo: ImageUpload) -> Result<(), CoreError> {
        self.expect_stage(&[RegistrationStage::Photo], "select a photo")?;
        self.photo = Some(photo);
        self.error = None;
        Ok(())
    }

    /// Start a generation attempt. Fails locally if no photo is selected.
    pub fn begin_generation(&mut self) -> Result<AttemptId, CoreError> {
        self.expect_stage(&[RegistrationStage::Photo], "generate a headshot")?;
        if self.photo.is_none() {
            self.error = Some(NO_PHOTO_MESSAGE.to_string());
            return Err(CoreError::Validation(NO_PHOTO_MESSAGE.to_string()));
        }

        let attempt = AttemptId(self.next_attempt);
        self.next_attempt += 1;
        self.active_attempt = Some(attempt);
        self.task_id = None;
        self.final_image = None;
        self.error = None;
        self.stage = RegistrationStage::Generating;
        Ok(attempt)
    }

    /// Skip AI generation and keep the original photo at `image_url`.
    pub fn keep_original(&mut self, image_url: impl Into<String>) -> Result<(), CoreError> {
        self.expect_stage(&[RegistrationStage::Photo], "keep the original photo")?;
        let image_url = image_url.into();
        validate_required("image URL", &image_url)?;
        self.final_image = Some(image_url);
        self.error = None;
        self.stage = RegistrationStage::Review;
        Ok(())
    }

    // ---- Generating ----

    /// Record the provider task id for `attempt`. Returns `false` if the
    /// attempt is no longer current.
    pub fn record_task(&mut self, attempt: AttemptId, task_id: impl Into<String>) -> bool {
        if !self.is_current(attempt) {
            return false;
        }
        self.task_id = Some(task_id.into());
        true
    }

    /// Apply the result of `attempt`. Returns `false` (and changes nothing)
    /// if the attempt has been abandoned or superseded.
    pub fn finish_generation(&mut self, attempt: AttemptId, result: GenerationResult) -> bool {
        if !self.is_current(attempt) {
            return false;
        }
        self.active_attempt = None;

        match result {
            GenerationResult::Generated { image_url } => {
                self.final_image = Some(image_url);
                self.error = None;
                self.stage = RegistrationStage::Review;
            }
            GenerationResult::Failed { message } => {
                self.task_id = None;
                self.final_image = None;
                self.error = Some(message);
                self.stage = RegistrationStage::Photo;
            }
        }
        true
    }

    /// Abandon the in-flight attempt and return to Photo. Any result that
    /// arrives later for it is ignored.
    pub fn abandon_generation(&mut self) -> Result<(), CoreError> {
        self.expect_stage(&[RegistrationStage::Generating], "abandon generation")?;
        self.active_attempt = None;
        self.task_id = None;
        self.stage = RegistrationStage::Photo;
        Ok(())
    }

    // ---- Review ----

    /// Discard the result and return to Photo with all image state cleared.
    pub fn retry(&mut self) -> Result<(), CoreError> {
        self.expect_stage(&[RegistrationStage::Review], "retry")?;
        self.photo = None;
        self.task_id = None;
        self.final_image = None;
        self.error = None;
        self.stage = RegistrationStage::Photo;
        Ok(())
    }

    /// Build the persistence payload for the reviewed profile.
    pub fn submission(&self) -> Result<AttendeeSubmission, CoreError> {
        self.expect_stage(&[RegistrationStage::Review], "submit the profile")?;
        let image_url = self
            .final_image
            .clone()
            .ok_or_else(|| CoreError::Validation("No headshot to submit".into()))?;

        Ok(AttendeeSubmission {
            event_id: self.event_id,
            name: self.form.name.trim().to_string(),
            role: self.form.role.trim().to_string(),
            company: self.form.company.trim().to_string(),
            linkedin: self.form.linkedin_url().map(str::to_string),
            image_url,
        })
    }

    /// Persistence succeeded: the registration is complete.
    pub fn submission_succeeded(&mut self) -> Result<(), CoreError> {
        self.expect_stage(&[RegistrationStage::Review], "complete registration")?;
        self.error = None;
        self.stage = RegistrationStage::Complete;
        Ok(())
    }

    /// Persistence failed: stay in Review with all data kept so the user can
    /// resubmit without redoing the photo.
    pub fn submission_failed(&mut self, message: impl Into<String>) {
        if self.stage == RegistrationStage::Review {
            self.error = Some(message.into());
        }
    }

    // ---- helpers ----

    fn is_current(&self, attempt: AttemptId) -> bool {
        self.stage == RegistrationStage::Generating && self.active_attempt == Some(attempt)
    }

    fn expect_stage(&self, allowed: &[RegistrationStage], action: &str) -> Result<(), CoreError> {
        if allowed.contains(&self.stage) {
            Ok(())
        } else {
            Err(CoreError::Conflict(format!(
                "Cannot {action} while in the {} stage",
                self.stage
            )))
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn form() -> ProfileForm {
        ProfileForm {
            name: "Jane Doe".into(),
            role: "Product Manager".into(),
            company: "TechCorp Inc.".into(),
            linkedin: Some("https://linkedin.com/in/janedoe".into()),
        }
    }

    fn photo() -> ImageUpload {
        ImageUpload {
            file_name: "selfie.jpg".into(),
            content_type: "image/jpeg".into(),
            bytes: vec![0xFF, 0xD8, 0xFF],
        }
    }

    fn at_photo() -> RegistrationSession {
        let mut session = RegistrationSession::new(7);
        session.submit_info(form()).unwrap();
        session
    }

    fn at_review() -> RegistrationSession {
        let mut session = at_photo();
        session.select_photo(photo()).unwrap();
        let attempt = session.begin_generation().unwrap();
        assert!(session.finish_generation(
            attempt,
            GenerationResult::Generated {
                image_url: "https://img/1.png".into()
            }
        ));
        session
    }

    #[test]
    fn starts_in_info() {
        let session = RegistrationSession::new(1);
        assert_eq!(session.stage(), RegistrationStage::Info);
        assert!(session.error().is_none());
    }

    #[test]
    fn invalid_form_stays_in_info() {
        let mut session = RegistrationSession::new(1);
        let bad = ProfileForm {
            name: " ".into(),
            ..form()
        };
        assert_matches!(session.submit_info(bad), Err(CoreError::Validation(_)));
        assert_eq!(session.stage(), RegistrationStage::Info);
    }

    #[test]
    fn invalid_linkedin_is_rejected_but_blank_is_allowed() {
        let bad = ProfileForm {
            linkedin: Some("not a url".into()),
            ..form()
        };
        assert!(bad.validate().is_err());

        let blank = ProfileForm {
            linkedin: Some("  ".into()),
            ..form()
        };
        assert!(blank.validate().is_ok());
        assert_eq!(blank.linkedin_url(), None);
    }

    #[test]
    fn generation_without_photo_fails_validation() {
        let mut session = at_photo();
        assert_matches!(session.begin_generation(), Err(CoreError::Validation(msg)) if msg == NO_PHOTO_MESSAGE);
        assert_eq!(session.stage(), RegistrationStage::Photo);
        assert_eq!(session.error(), Some(NO_PHOTO_MESSAGE));
    }

    #[test]
    fn successful_generation_moves_to_review() {
        let session = at_review();
        assert_eq!(session.stage(), RegistrationStage::Review);
        assert_eq!(session.final_image(), Some("https://img/1.png"));
    }

    #[test]
    fn failed_generation_returns_to_photo_with_message() {
        let mut session = at_photo();
        session.select_photo(photo()).unwrap();
        let attempt = session.begin_generation().unwrap();
        assert!(session.record_task(attempt, "T2"));
        assert!(session.finish_generation(
            attempt,
            GenerationResult::Failed {
                message: "bad image".into()
            }
        ));
        assert_eq!(session.stage(), RegistrationStage::Photo);
        assert_eq!(session.error(), Some("bad image"));
        assert_eq!(session.task_id(), None);
        // Photo is kept so the user can try again directly.
        assert!(session.photo().is_some());
    }

    #[test]
    fn late_result_for_abandoned_attempt_is_ignored() {
        let mut session = at_photo();
        session.select_photo(photo()).unwrap();
        let old = session.begin_generation().unwrap();
        session.abandon_generation().unwrap();

        let new = session.begin_generation().unwrap();
        assert_ne!(old, new);
        assert!(session.record_task(new, "T-new"));

        assert!(!session.record_task(old, "T-old"));
        assert!(!session.finish_generation(
            old,
            GenerationResult::Generated {
                image_url: "https://img/old.png".into()
            }
        ));
        assert_eq!(session.stage(), RegistrationStage::Generating);
        assert_eq!(session.task_id(), Some("T-new"));
        assert_eq!(session.final_image(), None);
    }

    #[test]
    fn retry_clears_all_image_state() {
        let mut session = at_review();
        session.retry().unwrap();
        assert_eq!(session.stage(), RegistrationStage::Photo);
        assert!(session.photo().is_none());
        assert!(session.final_image().is_none());
        assert!(session.task_id().is_none());
        assert_eq!(session.form(), &form());
    }

    #[test]
    fn retry_starts_a_new_attempt() {
        let mut session = at_review();
        session.retry().unwrap();
        session.select_photo(photo()).unwrap();
        let attempt = session.begin_generation().unwrap();
        assert_eq!(attempt.value(), 2);
    }

    #[test]
    fn keep_original_skips_generation() {
        let mut session = at_photo();
        session.keep_original("https://cdn.example.com/me.jpg").unwrap();
        assert_eq!(session.stage(), RegistrationStage::Review);
        assert_eq!(session.final_image(), Some("https://cdn.example.com/me.jpg"));
    }

    #[test]
    fn submission_payload_trims_fields() {
        let mut session = RegistrationSession::new(3);
        session
            .submit_info(ProfileForm {
                name: "  Jane Doe ".into(),
                linkedin: Some(" ".into()),
                ..form()
            })
            .unwrap();
        session.keep_original("https://img/me.png").unwrap();

        let submission = session.submission().unwrap();
        assert_eq!(submission.event_id, 3);
        assert_eq!(submission.name, "Jane Doe");
        assert_eq!(submission.linkedin, None);
        assert_eq!(submission.image_url, "https://img/me.png");
    }

    #[test]
    fn submission_not_available_before_review() {
        let session = at_photo();
        assert_matches!(session.submission(), Err(CoreError::Conflict(_)));
    }

    #[test]
    fn failed_persistence_keeps_review_state() {
        let mut session = at_review();
        session.submission_failed("database unavailable");
        assert_eq!(session.stage(), RegistrationStage::Review);
        assert_eq!(session.error(), Some("database unavailable"));
        assert_eq!(session.final_image(), Some("https://img/1.png"));
        assert_eq!(session.form(), &form());

        session.submission_succeeded().unwrap();
        assert_eq!(session.stage(), RegistrationStage::Complete);
        assert!(session.error().is_none());
    }

    #[test]
    fn submission_serializes_camel_case() {
        let session = at_review();
        let json = serde_json::to_value(session.submission().unwrap()).unwrap();
        assert_eq!(json["eventId"], 7);
        assert_eq!(json["imageUrl"], "https://img/1.png");
        assert_eq!(json["linkedin"], "https://linkedin.com/in/janedoe");
    }
}
