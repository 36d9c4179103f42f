use contestbot_core::intake::{check_submission, AttachmentMeta, Rejection};
use contestbot_core::models::period::Period;
use rstest::rstest;

fn image(name: &str) -> AttachmentMeta {
    AttachmentMeta {
        filename: name.to_string(),
        width: Some(1024),
    }
}

fn open_period() -> Period {
    let mut period = Period::new(1);
    period.advance_state().unwrap();
    period
}

#[test]
fn test_accepts_single_image() {
    let period = open_period();

    assert_eq!(check_submission(&[image("sunset.png")], Some(&period)), Ok(()));
}

#[rstest]
#[case(vec![])]
#[case(vec![image("a.png"), image("b.png")])]
fn test_rejects_attachment_count(#[case] attachments: Vec<AttachmentMeta>) {
    let period = open_period();

    assert_eq!(
        check_submission(&attachments, Some(&period)),
        Err(Rejection::AttachmentCount)
    );
}

#[test]
fn test_rejects_without_period() {
    assert_eq!(
        check_submission(&[image("a.png")], None),
        Err(Rejection::NoPeriod)
    );
}

#[test]
fn test_rejects_outside_submissions_silently() {
    let mut period = open_period();
    period.advance_state().unwrap();

    let result = check_submission(&[image("a.png")], Some(&period));

    assert_eq!(result, Err(Rejection::OutsideSubmissions));
    assert!(!Rejection::OutsideSubmissions.notifies_author());
}

#[test]
fn test_rejects_when_period_closed_early() {
    let mut period = open_period();
    period.deactivate().unwrap();

    assert_eq!(
        check_submission(&[image("a.png")], Some(&period)),
        Err(Rejection::OutsideSubmissions)
    );
}

#[test]
fn test_rejects_spoiler() {
    let period = open_period();

    assert_eq!(
        check_submission(&[image("SPOILER_a.png")], Some(&period)),
        Err(Rejection::Spoiler)
    );
}

#[test]
fn test_rejects_non_image() {
    let period = open_period();
    let document = AttachmentMeta {
        filename: "notes.txt".to_string(),
        width: None,
    };

    assert_eq!(
        check_submission(&[document], Some(&period)),
        Err(Rejection::NotImage)
    );
}

#[test]
fn test_rejection_messages() {
    assert_eq!(
        Rejection::AttachmentCount.to_string(),
        "Each submission must contain exactly one image."
    );
    assert!(Rejection::Spoiler.notifies_author());
}
