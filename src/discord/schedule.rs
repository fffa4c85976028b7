use chrono::Utc;
use serenity::all::{
    CommandInteraction, CommandOptionType, Context, CreateCommand, CreateCommandOption,
    CreateInteractionResponse, CreateInteractionResponseMessage, ResolvedValue,
};

use crate::hoyo::Game;
use crate::scheduler::SubscriptionV1;
use crate::state::BotState;

pub async fn run(bot: &BotState, ctx: &Context, command: &CommandInteraction) {
    let mut game = None;
    let mut uid = None;
    let mut server = None;
    let mut cookie = None;
    let mut threshold_power = None;
    let mut threshold_expedition = None;
    let mut check_daily = false;
    let mut check_universe = false;
    let mut check_echo_of_war = false;

    for option in command.data.options() {
        match (option.name, option.value) {
            ("game", ResolvedValue::String(value)) => game = Game::from_key(value),
            ("uid", ResolvedValue::String(value)) => uid = Some(value.to_string()),
            ("server", ResolvedValue::String(value)) => server = Some(value.to_string()),
            ("cookie", ResolvedValue::String(value)) => cookie = Some(value.to_string()),
            ("threshold_power", ResolvedValue::Integer(value)) => threshold_power = Some(value),
            ("threshold_expedition", ResolvedValue::Integer(value)) => {
                threshold_expedition = Some(value)
            }
            ("check_daily", ResolvedValue::Boolean(value)) => check_daily = value,
            ("check_universe", ResolvedValue::Boolean(value)) => check_universe = value,
            ("check_echo_of_war", ResolvedValue::Boolean(value)) => check_echo_of_war = value,
            _ => {}
        }
    }

    let reply = match (game, uid, server, cookie) {
        (Some(game), Some(uid), Some(server), Some(cookie)) => {
            let now = Utc::now();
            let subscription = SubscriptionV1 {
                discord_user_id: command.user.id.get(),
                discord_channel_id: command.channel_id.get(),
                game,
                uid,
                server,
                cookie,
                threshold_power,
                threshold_expedition,
                /* Enabled periodic checks start on the next tick and settle
                 * into their daily/weekly cadence from there. */
                check_daily_time: check_daily.then_some(now),
                check_universe_time: check_universe.then_some(now),
                check_echo_of_war_time: check_echo_of_war.then_some(now),
                next_check_time: now,
            };

            match bot.insert_subscription(subscription).await {
                Ok(()) => {
                    "Subscription saved. Your realtime notes will be checked within a minute, and I will post in this channel whenever a threshold is crossed.".to_string()
                }
                Err(error) => format!("Failed to save your subscription: {}", error),
            }
        }
        _ => "Missing required options.".to_string(),
    };

    let _ = command
        .create_response(
            &ctx.http,
            CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new()
                    .content(reply)
                    .ephemeral(true),
            ),
        )
        .await;
}

pub fn register() -> CreateCommand {
    CreateCommand::new("schedule")
        .description("Get notified about your realtime notes.")
        .add_option(
            CreateCommandOption::new(CommandOptionType::String, "game", "Which game to check.")
                .required(true)
                .add_string_choice("Genshin Impact", "genshin")
                .add_string_choice("Honkai: Star Rail", "starrail"),
        )
        .add_option(
            CreateCommandOption::new(CommandOptionType::String, "uid", "Your in-game UID.")
                .required(true),
        )
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::String,
                "server",
                "The server your account lives on, e.g. prod_official_asia.",
            )
            .required(true),
        )
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::String,
                "cookie",
                "Your HoYoLAB cookie (ltoken + ltuid).",
            )
            .required(true),
        )
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::Integer,
                "threshold_power",
                "Notify when your resource is within this many hours of full.",
            )
            .min_int_value(0)
            .max_int_value(24),
        )
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::Integer,
                "threshold_expedition",
                "Notify when your last expedition is within this many hours of done.",
            )
            .min_int_value(0)
            .max_int_value(24),
        )
        .add_option(CreateCommandOption::new(
            CommandOptionType::Boolean,
            "check_daily",
            "Remind you once a day if dailies are unfinished.",
        ))
        .add_option(CreateCommandOption::new(
            CommandOptionType::Boolean,
            "check_universe",
            "Remind you once a week if the weekly activity is unfinished.",
        ))
        .add_option(CreateCommandOption::new(
            CommandOptionType::Boolean,
            "check_echo_of_war",
            "Remind you once a week if weekly boss discounts are unused.",
        ))
}
