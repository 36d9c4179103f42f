use chrono::Utc;
use contestbot_core::leaderboard::leaderboard;
use contestbot_core::models::{period::PeriodState, submission::Submission};
use contestbot_discord_bot::handlers::contest::{
    advance_message, channel_overwrite, is_privileged, jump_url, leaderboard_line,
};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serenity::model::{
    channel::PermissionOverwriteType,
    id::{ChannelId, GuildId, MessageId, RoleId},
    permissions::Permissions,
};
use uuid::Uuid;

#[rstest]
#[case(None, false)]
#[case(Some(Permissions::empty()), false)]
#[case(Some(Permissions::SEND_MESSAGES | Permissions::ADD_REACTIONS), false)]
#[case(Some(Permissions::MANAGE_GUILD), true)]
#[case(Some(Permissions::ADMINISTRATOR), true)]
fn test_is_privileged(#[case] permissions: Option<Permissions>, #[case] expected: bool) {
    assert_eq!(is_privileged(permissions), expected);
}

#[rstest]
#[case(PeriodState::Ready, Permissions::empty())]
#[case(PeriodState::Submissions, Permissions::SEND_MESSAGES)]
#[case(PeriodState::Paused, Permissions::empty())]
#[case(PeriodState::Voting, Permissions::ADD_REACTIONS)]
#[case(PeriodState::Finished, Permissions::empty())]
fn test_channel_overwrite(#[case] state: PeriodState, #[case] allowed: Permissions) {
    let overwrite = channel_overwrite(GuildId(42), state);

    assert_eq!(overwrite.allow, allowed);
    assert_eq!(
        overwrite.deny,
        (Permissions::SEND_MESSAGES | Permissions::ADD_REACTIONS) - allowed
    );
    assert!(matches!(
        overwrite.kind,
        PermissionOverwriteType::Role(role) if role == RoleId(42)
    ));
}

#[test]
fn test_advance_message_per_state() {
    assert!(advance_message(PeriodState::Submissions).contains("submissions allowed"));
    assert!(advance_message(PeriodState::Voting).contains("reactions allowed"));
    assert!(advance_message(PeriodState::Finished).contains("start a new period"));
}

#[test]
fn test_jump_url() {
    assert_eq!(
        jump_url(GuildId(1), ChannelId(2), MessageId(3)),
        "https://discord.com/channels/1/2/3"
    );
}

#[test]
fn test_leaderboard_lines() {
    let period_id = Uuid::new_v4();
    let now = Utc::now();

    let mut first = Submission::new(100, 10, period_id, now);
    first.set_votes(vec![1, 2]);
    let mut second = Submission::new(200, 20, period_id, now);
    second.set_votes(vec![3]);
    let fourth = Submission::new(400, 40, period_id, now);
    let third = Submission::new(300, 30, period_id, now);

    let standings = leaderboard(vec![fourth, second, first, third], 10, 0);
    let lines: Vec<String> = standings
        .iter()
        .map(|standing| leaderboard_line(GuildId(1), ChannelId(2), standing))
        .collect();

    assert_eq!(
        lines,
        vec![
            "`01` 🏆 <@10> 2 votes [Jump](https://discord.com/channels/1/2/100)",
            "`02` 🥈 <@20> 1 vote [Jump](https://discord.com/channels/1/2/200)",
            "`03` 🥉 <@30> 0 votes [Jump](https://discord.com/channels/1/2/300)",
            "`04` <@40> 0 votes [Jump](https://discord.com/channels/1/2/400)",
        ]
    );
}
