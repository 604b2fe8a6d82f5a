use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Parser)]
#[command(
    name = "socialgraph",
    about = "Drive the social graph engine from a shell",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Database file; overrides SOCIALGRAPH_DB_PATH
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Absolute directory for rolling log files
    #[arg(long, global = true)]
    pub log_dir: Option<String>,

    /// Log level used with --log-dir
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,
}

#[derive(Subcommand)]
pub enum Command {
    /// Check core linkage and print its version
    Ping,
    /// Register an ordinary user
    RegisterUser(RegisterArgs),
    /// Register an administrator
    RegisterAdmin(RegisterArgs),
    /// Log in and print a session token
    Login(LoginArgs),
    /// Follow another user
    Follow(TargetArgs),
    /// Stop following a user
    Unfollow(TargetArgs),
    /// Show the caller's own profile
    Profile(TokenArgs),
    /// Show the caller's admin profile
    AdminProfile(TokenArgs),
    /// Publish a post
    Post(PostArgs),
    /// Show one post with its like count
    PostShow(PostShowArgs),
    /// Like a post
    Like(PostRefArgs),
    /// Remove a like
    Unlike(PostRefArgs),
    /// Show the caller's feed
    Feed(TokenArgs),
    /// List a user's posts
    Posts(UserArgs),
    /// List a user's followers
    Followers(UserListArgs),
    /// List who a user follows
    Following(UserListArgs),
}

#[derive(Args)]
pub struct RegisterArgs {
    pub username: String,
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub password: String,
}

#[derive(Args)]
pub struct LoginArgs {
    pub username: String,
    #[arg(long)]
    pub password: String,
}

#[derive(Args)]
pub struct TokenArgs {
    /// Session token from `login`, with or without the Bearer prefix
    #[arg(long)]
    pub token: String,
}

#[derive(Args)]
pub struct TargetArgs {
    pub target: Uuid,
    #[arg(long)]
    pub token: String,
}

#[derive(Args)]
pub struct PostArgs {
    pub content: String,
    #[arg(long)]
    pub token: String,
}

#[derive(Args)]
pub struct PostRefArgs {
    pub post: Uuid,
    #[arg(long)]
    pub token: String,
}

#[derive(Args)]
pub struct PostShowArgs {
    pub post: Uuid,
}

#[derive(Args)]
pub struct UserArgs {
    pub user: Uuid,
}

#[derive(Args)]
pub struct UserListArgs {
    pub user: Uuid,
    #[arg(long)]
    pub token: String,
}
