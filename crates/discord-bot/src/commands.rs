use serenity::builder::CreateApplicationCommands;

pub mod contest;

/// Register all commands for the bot.
///
/// `/contest` is limited to members who can manage the server; `/status` and
/// `/leaderboard` are open to everyone.
///
/// # Arguments
///
/// * `commands` - The builder the commands are added to, either for one
///                guild or globally.
///
/// # Returns
///
/// The same builder with the contest commands added.
pub fn register_commands(commands: &mut CreateApplicationCommands) -> &mut CreateApplicationCommands {
    commands.create_application_command(|command| {
        *command = contest::contest_command();
        command
    });

    commands.create_application_command(|command| {
        *command = contest::status_command();
        command
    });

    commands.create_application_command(|command| {
        *command = contest::leaderboard_command();
        command
    });

    commands
}
