use contestbot_discord_bot::commands::{self, contest};
use pretty_assertions::assert_eq;
use serde_json::Value;
use serenity::builder::{CreateApplicationCommand, CreateApplicationCommands};

fn option_names(command: &CreateApplicationCommand) -> Vec<String> {
    command
        .0
        .get("options")
        .and_then(Value::as_array)
        .map(|options| {
            options
                .iter()
                .filter_map(|option| option["name"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

#[test]
fn test_register_commands() {
    let mut commands = CreateApplicationCommands::default();
    commands::register_commands(&mut commands);

    let names: Vec<&str> = commands
        .0
        .iter()
        .filter_map(|command| command["name"].as_str())
        .collect();
    assert_eq!(names, vec!["contest", "status", "leaderboard"]);
}

#[test]
fn test_contest_command_subcommands() {
    let command = contest::contest_command();

    assert_eq!(command.0.get("name"), Some(&Value::from("contest")));
    assert_eq!(command.0.get("dm_permission"), Some(&Value::Bool(false)));
    assert!(command.0.contains_key("default_member_permissions"));
    assert_eq!(
        option_names(&command),
        vec!["advance", "close", "channel", "resync"]
    );
}

#[test]
fn test_leaderboard_command_options() {
    let command = contest::leaderboard_command();

    assert_eq!(option_names(&command), vec!["count", "page"]);
    assert!(!command.0.contains_key("default_member_permissions"));
}

#[test]
fn test_status_command_has_no_options() {
    let command = contest::status_command();

    assert!(option_names(&command).is_empty());
}

#[test]
fn test_advance_sub_options() {
    let command = contest::contest_command();
    let advance = command.0["options"]
        .as_array()
        .and_then(|options| options.iter().find(|option| option["name"] == "advance"))
        .expect("advance subcommand missing");

    let sub_options: Vec<(&str, bool)> = advance["options"]
        .as_array()
        .expect("advance has no options")
        .iter()
        .map(|option| {
            (
                option["name"].as_str().unwrap_or_default(),
                option["required"].as_bool().unwrap_or(false),
            )
        })
        .collect();

    assert_eq!(sub_options, vec![("after", false), ("pingback", false)]);
}
