use std::fmt;

use crate::models::period::Period;

/// The parts of an attachment that decide whether it is a valid entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentMeta {
    pub filename: String,
    /// Only images and videos carry dimensions.
    pub width: Option<u64>,
}

impl AttachmentMeta {
    pub fn is_spoiler(&self) -> bool {
        self.filename.starts_with("SPOILER_")
    }
}

/// Why a message in the submission channel was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// No attachment, or more than one.
    AttachmentCount,
    NoPeriod,
    /// The channel should have been locked; removed without notice.
    OutsideSubmissions,
    Spoiler,
    NotImage,
}

impl Rejection {
    /// Whether the author should be told why their message was removed.
    pub fn notifies_author(self) -> bool {
        self != Rejection::OutsideSubmissions
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Rejection::AttachmentCount => "Each submission must contain exactly one image.",
            Rejection::NoPeriod => {
                "A period has not been started. Submissions should not be allowed at this moment."
            }
            Rejection::OutsideSubmissions => "Submissions are not being accepted right now.",
            Rejection::Spoiler => "Attachment must not make use of a spoiler.",
            Rejection::NotImage => "Attachment must be a image or video.",
        };
        f.write_str(text)
    }
}

/// Checks a message posted in the submission channel against the current period.
pub fn check_submission(
    attachments: &[AttachmentMeta],
    period: Option<&Period>,
) -> Result<(), Rejection> {
    let [attachment] = attachments else {
        return Err(Rejection::AttachmentCount);
    };

    let period = period.ok_or(Rejection::NoPeriod)?;
    if !period.is_accepting_submissions() {
        return Err(Rejection::OutsideSubmissions);
    }

    if attachment.is_spoiler() {
        return Err(Rejection::Spoiler);
    }
    if attachment.width.is_none() {
        return Err(Rejection::NotImage);
    }

    Ok(())
}
