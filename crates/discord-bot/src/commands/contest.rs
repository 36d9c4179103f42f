use contestbot_core::leaderboard::{DEFAULT_COUNT, MAX_COUNT};
use serenity::{
    builder::CreateApplicationCommand,
    model::{
        application::command::CommandOptionType, channel::ChannelType, permissions::Permissions,
    },
};

/// Create command for running the contest in a server
pub fn contest_command() -> CreateApplicationCommand {
    let mut command = CreateApplicationCommand::default();
    command
        .name("contest")
        .description("Run the photo contest in this server")
        .dm_permission(false)
        .default_member_permissions(Permissions::MANAGE_GUILD)
        // Advance subcommand
        .create_option(|option| {
            option
                .name("advance")
                .description("Advance the current period to its next state")
                .kind(CommandOptionType::SubCommand)
                .create_sub_option(|sub_option| {
                    sub_option
                        .name("after")
                        .description("Advance once more after this many seconds")
                        .kind(CommandOptionType::Integer)
                        .required(false)
                })
                .create_sub_option(|sub_option| {
                    sub_option
                        .name("pingback")
                        .description("Mention you when the delayed advance runs (default: true)")
                        .kind(CommandOptionType::Boolean)
                        .required(false)
                })
        })
        // Close subcommand
        .create_option(|option| {
            option
                .name("close")
                .description("Close the current period")
                .kind(CommandOptionType::SubCommand)
        })
        // Channel subcommand
        .create_option(|option| {
            option
                .name("channel")
                .description("Set the channel submissions are posted in")
                .kind(CommandOptionType::SubCommand)
                .create_sub_option(|sub_option| {
                    sub_option
                        .name("channel")
                        .description("The submission channel")
                        .kind(CommandOptionType::Channel)
                        .channel_types(&[ChannelType::Text])
                        .required(true)
                })
        })
        // Resync subcommand
        .create_option(|option| {
            option
                .name("resync")
                .description("Recount every submission's votes from its reactions")
                .kind(CommandOptionType::SubCommand)
        });

    command
}

/// Create command for showing the contest status
pub fn status_command() -> CreateApplicationCommand {
    let mut command = CreateApplicationCommand::default();
    command
        .name("status")
        .description("Show the submission channel and the state of the current period")
        .dm_permission(false);

    command
}

/// Create command for showing the current period's leaderboard
pub fn leaderboard_command() -> CreateApplicationCommand {
    let mut command = CreateApplicationCommand::default();
    command
        .name("leaderboard")
        .description("Show the submissions with the most votes")
        .dm_permission(false)
        .create_option(|option| {
            option
                .name("count")
                .description(format!(
                    "Submissions per page (1-{}, default: {})",
                    MAX_COUNT, DEFAULT_COUNT
                ))
                .kind(CommandOptionType::Integer)
                .required(false)
        })
        .create_option(|option| {
            option
                .name("page")
                .description("Page to show, starting at 0")
                .kind(CommandOptionType::Integer)
                .required(false)
        });

    command
}
