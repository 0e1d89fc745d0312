//! `agora`: terminal client for the Agora REST backend.
//!
//! Tokens persist in a JSON session file between runs, so `agora login` once
//! and every later command is authenticated (and refreshed) automatically.

mod error;
mod render;
mod store;
mod transport;
mod upload;


use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use api::config::{DEFAULT_BASE_URL, MESSAGE_POLL_INTERVAL_MS};
use api::poll::Poller;
use api::types::{Credentials, NewPost, PostId, ProfileUpdate, Registration, User, UserId};
use api::{ApiClient, ApiConfig, Session};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use time::OffsetDateTime;

use crate::error::CliError;
use crate::store::FileStore;
use crate::transport::ReqwestTransport;

type Client = ApiClient<ReqwestTransport>;

/// Floor for `messages --watch --interval-ms`.
const MIN_WATCH_INTERVAL_MS: u64 = 250;

#[derive(Parser, Debug)]
#[command(name = "agora", about = "Agora social network CLI")]
struct Cli {
    #[arg(long, env = "AGORA_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    #[arg(long, env = "AGORA_SESSION_FILE", default_value = ".agora-session.json")]
    session_file: PathBuf,

    /// Print raw JSON instead of text.
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        #[arg(long)]
        username: String,
        #[arg(long, env = "AGORA_PASSWORD")]
        password: String,
    },
    Register(RegisterArgs),
    Logout,
    Whoami,
    /// Find people by name or username.
    Search {
        query: String,
    },
    User(UserCommand),
    Profile(ProfileArgs),
    Feed,
    Post(PostCommand),
    Comment(CommentCommand),
    Conversations,
    /// Show the thread with a user; `--watch` keeps polling for new messages.
    Messages {
        user_id: UserId,
        #[arg(long, default_value_t = false)]
        watch: bool,
        #[arg(
            long,
            default_value_t = MESSAGE_POLL_INTERVAL_MS,
            value_parser = clap::value_parser!(u64).range(MIN_WATCH_INTERVAL_MS..)
        )]
        interval_ms: u64,
    },
    Send {
        user_id: UserId,
        content: String,
    },
}

#[derive(Args, Debug)]
struct RegisterArgs {
    #[arg(long)]
    username: String,
    #[arg(long)]
    email: String,
    #[arg(long, default_value = "")]
    first_name: String,
    #[arg(long, default_value = "")]
    last_name: String,
    #[arg(long, env = "AGORA_PASSWORD")]
    password: String,
    /// Confirmation; must match `--password`.
    #[arg(long)]
    confirm: String,
}

#[derive(Args, Debug)]
struct UserCommand {
    #[command(subcommand)]
    command: UserSubcommand,
}

#[derive(Subcommand, Debug)]
enum UserSubcommand {
    Show { user_id: UserId },
    Posts { user_id: UserId },
}

/// Update your own profile. Omitted fields are left unchanged.
#[derive(Args, Debug)]
struct ProfileArgs {
    #[arg(long)]
    first_name: Option<String>,
    #[arg(long)]
    last_name: Option<String>,
    #[arg(long)]
    bio: Option<String>,
    #[arg(long)]
    avatar: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct PostCommand {
    #[command(subcommand)]
    command: PostSubcommand,
}

#[derive(Subcommand, Debug)]
enum PostSubcommand {
    Create {
        #[arg(long, default_value = "")]
        content: String,
        #[arg(long)]
        image: Option<PathBuf>,
    },
    Delete {
        post_id: PostId,
    },
    /// Toggle your like on a post.
    Like {
        post_id: PostId,
    },
}

#[derive(Args, Debug)]
struct CommentCommand {
    #[command(subcommand)]
    command: CommentSubcommand,
}

#[derive(Subcommand, Debug)]
enum CommentSubcommand {
    Add { post_id: PostId, content: String },
    Delete { comment_id: i64 },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), CliError> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let store = FileStore::open(&cli.session_file)?;
    let client = ApiClient::new(ReqwestTransport::new(), ApiConfig::new(&cli.base_url), Session::new(Arc::new(store)));
    let out = Output { json: cli.json, config: client.config().clone() };

    run(&client, &out, cli.command).await
}

struct Output {
    json: bool,
    config: ApiConfig,
}

impl Output {
    fn emit<T: serde::Serialize>(&self, value: &T, text: impl FnOnce() -> String) -> Result<(), CliError> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            println!("{}", text());
        }
        Ok(())
    }

    fn emit_list<T: serde::Serialize>(&self, items: &[T], line: impl Fn(&T) -> String) -> Result<(), CliError> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(items)?);
        } else if items.is_empty() {
            println!("(none)");
        } else {
            items.iter().for_each(|item| println!("{}", line(item)));
        }
        Ok(())
    }

    fn done(&self, what: &str) -> Result<(), CliError> {
        self.emit(&Value::Bool(true), || what.to_owned())
    }
}

fn require_login(client: &Client) -> Result<(), CliError> {
    if client.session().access_token().is_none() {
        return Err(CliError::NotLoggedIn);
    }
    Ok(())
}

fn registration(args: RegisterArgs) -> Registration {
    Registration {
        username: args.username,
        email: args.email,
        first_name: args.first_name,
        last_name: args.last_name,
        password: args.password,
        password2: args.confirm,
    }
}

fn profile_update(args: ProfileArgs) -> Result<ProfileUpdate, CliError> {
    let avatar = args.avatar.as_deref().map(upload::load_upload).transpose()?;
    let update = ProfileUpdate { first_name: args.first_name, last_name: args.last_name, bio: args.bio, avatar };
    if update == ProfileUpdate::default() {
        return Err(CliError::InvalidArgument("nothing to update".to_owned()));
    }
    Ok(update)
}

async fn run(client: &Client, out: &Output, command: Command) -> Result<(), CliError> {
    let now = OffsetDateTime::now_utc();
    match command {
        Command::Login { username, password } => {
            let user = client.login(&Credentials { username, password }).await?;
            out.emit(&user, || format!("logged in as {}", render::user_line(&user)))
        }
        Command::Register(args) => {
            let user = client.register(&registration(args)).await?;
            out.emit(&user, || format!("registered {}", render::user_line(&user)))
        }
        Command::Logout => {
            client.logout();
            out.done("logged out")
        }
        Command::Whoami => {
            require_login(client)?;
            let user = session_user(client).await?;
            out.emit(&user, || render::profile_block(&user))
        }
        Command::Search { query } => {
            require_login(client)?;
            let users = client.search_users(&query).await?;
            out.emit_list(&users, render::user_line)
        }
        Command::User(user) => {
            require_login(client)?;
            match user.command {
                UserSubcommand::Show { user_id } => {
                    let user = client.get_user(user_id).await?;
                    out.emit(&user, || render::profile_block(&user))
                }
                UserSubcommand::Posts { user_id } => {
                    let posts = client.user_posts(user_id).await?;
                    out.emit_list(&posts, |p| render::post_block(p, &out.config, now))
                }
            }
        }
        Command::Profile(args) => {
            require_login(client)?;
            let user = client.update_profile(profile_update(args)?).await?;
            out.emit(&user, || render::profile_block(&user))
        }
        Command::Feed => {
            require_login(client)?;
            let posts = client.feed().await?;
            out.emit_list(&posts, |p| render::post_block(p, &out.config, now))
        }
        Command::Post(post) => {
            require_login(client)?;
            run_post(client, out, post.command, now).await
        }
        Command::Comment(comment) => {
            require_login(client)?;
            match comment.command {
                CommentSubcommand::Add { post_id, content } => {
                    let comment = client.add_comment(post_id, &content).await?;
                    out.emit(&comment, || format!("comment #{} added to post #{post_id}", comment.id))
                }
                CommentSubcommand::Delete { comment_id } => {
                    client.delete_comment(comment_id).await?;
                    out.done(&format!("comment #{comment_id} deleted"))
                }
            }
        }
        Command::Conversations => {
            require_login(client)?;
            let partners = client.conversations().await?;
            out.emit_list(&partners, render::user_line)
        }
        Command::Messages { user_id, watch, interval_ms } => {
            require_login(client)?;
            if watch {
                watch_messages(client, user_id, Duration::from_millis(interval_ms)).await
            } else {
                let viewer = session_user(client).await?;
                let messages = client.messages_with(user_id).await?;
                out.emit_list(&messages, |m| render::message_line(m, Some(&viewer), now))
            }
        }
        Command::Send { user_id, content } => {
            require_login(client)?;
            let message = client.send_message(user_id, &content).await?;
            out.emit(&message, || format!("sent message #{} to #{user_id}", message.id))
        }
    }
}

async fn run_post(client: &Client, out: &Output, command: PostSubcommand, now: OffsetDateTime) -> Result<(), CliError> {
    match command {
        PostSubcommand::Create { content, image } => {
            let image = image.as_deref().map(upload::load_upload).transpose()?;
            let post = client.create_post(NewPost { content, image }).await?;
            out.emit(&post, || render::post_block(&post, &out.config, now))
        }
        PostSubcommand::Delete { post_id } => {
            client.delete_post(post_id).await?;
            out.done(&format!("post #{post_id} deleted"))
        }
        PostSubcommand::Like { post_id } => {
            let result = client.like_post(post_id).await?;
            out.emit(&result, || render::like_line(post_id, result))
        }
    }
}

/// Print the thread, then only new messages, until Ctrl-C.
async fn watch_messages(client: &Client, partner: UserId, interval: Duration) -> Result<(), CliError> {
    let viewer = session_user(client).await?;
    let poller = Poller::new();
    let mut seen = HashSet::new();
    tracing::info!(partner, interval_ms = interval.as_millis(), "watching conversation");

    let watch = client.watch_conversation(partner, poller.token(), interval, tokio::time::sleep, |_, messages| {
        let now = OffsetDateTime::now_utc();
        for message in render::unseen(&mut seen, messages) {
            println!("{}", render::message_line(&message, Some(&viewer), now));
        }
    });

    tokio::select! {
        () = watch => {}
        _ = tokio::signal::ctrl_c() => poller.cancel(),
    }
    Ok(())
}

/// The signed-in user, validating the stored token once if needed.
async fn session_user(client: &Client) -> Result<User, CliError> {
    if let Some(user) = client.session().current_user() {
        return Ok(user);
    }
    client.restore_session().await.user.ok_or(CliError::NotLoggedIn)
}
