use crate::cli::{Cli, Command, RegisterArgs};
use serde::Serialize;
use serde_json::{json, Value};
use socialgraph_api::{ApiConfig, SocialApi};
use socialgraph_core::NewAccount;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let output = execute(cli, |key| std::env::var(key).ok())?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Runs one command as a fresh process would, reading settings via `lookup`.
pub fn execute(cli: Cli, lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Value> {
    let config = ApiConfig::from_lookup_with_db_path(cli.db, lookup)?;
    let api = SocialApi::new(config)?;
    if let Some(log_dir) = cli.log_dir.as_deref() {
        api.init_logging(&cli.log_level, log_dir)?;
    }

    match cli.command {
        Command::Ping => Ok(json!({
            "ping": api.ping(),
            "version": api.core_version(),
        })),
        Command::RegisterUser(args) => to_json(&api.register_user(&new_account(args))?),
        Command::RegisterAdmin(args) => to_json(&api.register_admin(&new_account(args))?),
        Command::Login(args) => to_json(&api.login(&args.username, &args.password)?),
        Command::Profile(args) => to_json(&api.get_profile(&args.token)?),
        Command::AdminProfile(args) => to_json(&api.get_admin_profile(&args.token)?),
        Command::Follow(args) => to_json(&api.follow_user(&args.token, args.target)?),
        Command::Unfollow(args) => to_json(&api.unfollow_user(&args.token, args.target)?),
        Command::Post(args) => to_json(&api.create_post(&args.token, &args.content)?),
        Command::PostShow(args) => to_json(&api.get_post(args.post)?),
        Command::Like(args) => to_json(&api.like_post(&args.token, args.post)?),
        Command::Unlike(args) => to_json(&api.unlike_post(&args.token, args.post)?),
        Command::Feed(args) => to_json(&api.get_feed(&args.token)?),
        Command::Posts(args) => to_json(&api.get_user_posts(args.user)?),
        Command::Followers(args) => to_json(&api.list_followers(&args.token, args.user)?),
        Command::Following(args) => to_json(&api.list_following(&args.token, args.user)?),
    }
}

fn new_account(args: RegisterArgs) -> NewAccount {
    NewAccount {
        username: args.username,
        email: args.email,
        password: args.password,
    }
}

fn to_json(value: &impl Serialize) -> anyhow::Result<Value> {
    Ok(serde_json::to_value(value)?)
}
