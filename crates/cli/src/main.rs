mod render;

use anyhow::{anyhow, Result};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use jokebox_api_client::{
    feed::JokeFeed,
    result_to_option,
    session::Session,
    social::SocialTarget,
    user::{LoginParams, RegisterError, RegisterParams},
    ApiClient,
};
use jokebox_common::{
    admin::{LogsTable, UsersTable},
    config::JokeboxConfig,
    newtypes::{CommentId, JokeId, UserId},
    pagination::{Sort, SortField, SortOrder},
    social::{ReactionKind, SocialAggregate, Vote},
    thread::JokeThread,
};
use log::{warn, LevelFilter};

#[derive(Parser)]
#[command(name = "jokebox")]
#[command(about = "Read and post jokes from the terminal", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List jokes, newest first unless configured otherwise
    Feed {
        /// Number of pages to fetch
        #[arg(long, default_value_t = 1)]
        pages: u32,
        #[arg(long)]
        sort: Option<SortArg>,
        #[arg(long)]
        order: Option<OrderArg>,
        #[arg(long)]
        page_size: Option<u32>,
    },
    /// Show a joke with all of its comments
    Joke { id: i64 },
    /// Post a new joke
    Post { body: String },
    /// Delete one of your jokes, or any joke as admin
    DeleteJoke { id: i64 },
    /// Vote on a joke, or on one of its comments. Voting twice retracts the vote.
    Vote {
        joke: i64,
        #[arg(long)]
        comment: Option<i64>,
        vote: VoteArg,
    },
    /// Toggle an emoji reaction on a joke or comment
    React {
        joke: i64,
        #[arg(long)]
        comment: Option<i64>,
        /// One of laugh, heart, neutral, surprised, fire, poop, angry, monkey, thumbs_up,
        /// thumbs_down
        kind: ReactionKind,
    },
    /// Write a comment, or a reply to another comment
    Comment {
        joke: i64,
        #[arg(long)]
        parent: Option<i64>,
        body: String,
    },
    /// Delete a comment, it stays visible as deleted
    DeleteComment { joke: i64, comment: i64 },
    /// Log in and print the token, store it as `auth.token` in config.toml
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Print the url for logging in with an external provider
    OauthUrl { provider: String },
    /// Read the token from the url the provider redirected to
    OauthCallback { url: url::Url },
    #[command(subcommand)]
    Admin(AdminCommands),
}

#[derive(Subcommand)]
enum AdminCommands {
    Stats,
    Users {
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Grant or revoke admin status
    ToggleAdmin { user_id: i64 },
    Logs {
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SortArg {
    New,
    Top,
}

#[derive(Clone, Copy, ValueEnum)]
enum OrderArg {
    Asc,
    Desc,
}

#[derive(Clone, Copy, ValueEnum)]
enum VoteArg {
    Plus,
    Minus,
}

impl From<VoteArg> for Vote {
    fn from(value: VoteArg) -> Self {
        match value {
            VoteArg::Plus => Vote::Plus,
            VoteArg::Minus => Vote::Minus,
        }
    }
}

#[tokio::main]
pub async fn main() -> Result<()> {
    if std::env::args().collect::<Vec<_>>().get(1) == Some(&"--print-config".to_string()) {
        println!("{}", doku::to_toml::<JokeboxConfig>());
        std::process::exit(0);
    }

    env_logger::builder()
        .filter_level(LevelFilter::Warn)
        .filter_module("jokebox", LevelFilter::Info)
        .filter_module("jokebox_api_client", LevelFilter::Info)
        .parse_default_env()
        .init();

    let cli = Cli::parse();
    let config = JokeboxConfig::read().map_err(|e| e.0)?;
    let client = ApiClient::new(&config.api.base_url);
    if let Some(token) = &config.auth.token {
        let session = Session::restore(token, Utc::now());
        if !session.is_logged_in() {
            warn!("Configured token is invalid or expired, continuing anonymously");
        }
        client.set_session(session);
    }

    match cli.command {
        Commands::Feed {
            pages,
            sort,
            order,
            page_size,
        } => {
            let mut sort_config = config.feed.sort();
            if let Some(sort) = sort {
                sort_config.field = match sort {
                    SortArg::New => SortField::CreatedAt,
                    SortArg::Top => SortField::Score,
                };
            }
            if let Some(order) = order {
                sort_config.order = match order {
                    OrderArg::Asc => SortOrder::Asc,
                    OrderArg::Desc => SortOrder::Desc,
                };
            }
            feed(&client, sort_config, page_size.unwrap_or(config.feed.page_size), pages).await;
        }
        Commands::Joke { id } => {
            let thread = load_thread(&client, id).await?;
            print!("{}", render::joke(&thread.joke));
            print!("{}", render::comment_tree(&thread.tree()));
        }
        Commands::Post { body } => {
            let id = client.create_joke(body).await?;
            println!("Posted joke {id}");
        }
        Commands::DeleteJoke { id } => {
            let identity = client.identity().ok_or_else(|| anyhow!("Login required"))?;
            let thread = load_thread(&client, id).await?;
            if identity.can_delete_joke(&thread.joke) {
                client.delete_joke(thread.joke.id).await?;
            } else if identity.is_admin {
                client.admin_delete_joke(thread.joke.id).await?;
            } else {
                return Err(anyhow!("Only the author can delete this joke"));
            }
            println!("Deleted joke {id}");
        }
        Commands::Vote {
            joke,
            comment,
            vote,
        } => {
            let mut thread = load_thread(&client, joke).await?;
            let (target, social) = social_target(&mut thread, comment)?;
            let update = client.vote(target, social, vote.into()).await?;
            println!("Score of {target} is now {}", update.local.score);
            if !update.is_synced() {
                println!("Vote could not be saved");
            }
        }
        Commands::React {
            joke,
            comment,
            kind,
        } => {
            let mut thread = load_thread(&client, joke).await?;
            let (target, social) = social_target(&mut thread, comment)?;
            let update = client.react(target, social, kind).await?;
            println!("{}", render::reactions(&social.reaction_display()));
            if !update.is_synced() {
                println!("Reaction could not be saved");
            }
        }
        Commands::Comment { joke, parent, body } => {
            let mut thread = load_thread(&client, joke).await?;
            let res = client
                .submit_comment(&mut thread, &body, parent.map(CommentId))
                .await;
            print!("{}", render::comment_tree(&thread.tree()));
            let id = res?;
            println!("Posted comment {id}");
        }
        Commands::DeleteComment { joke, comment } => {
            let mut thread = load_thread(&client, joke).await?;
            client
                .delete_comment_in(&mut thread, CommentId(comment))
                .await?;
            print!("{}", render::comment_tree(&thread.tree()));
        }
        Commands::Login { email, password } => {
            let identity = client.login(LoginParams { email, password }).await?;
            println!("Logged in as {}", identity.username);
            print_token(&client);
        }
        Commands::Register {
            username,
            email,
            password,
        } => {
            let params = RegisterParams {
                username,
                email,
                password,
            };
            match client.register(params).await {
                Ok(identity) => {
                    println!("Registered {}", identity.username);
                    print_token(&client);
                }
                Err(RegisterError::Validation(errors)) => {
                    for message in errors
                        .username
                        .iter()
                        .chain(&errors.email)
                        .chain(&errors.password)
                    {
                        println!("{message}");
                    }
                    return Err(anyhow!("Invalid registration"));
                }
                Err(e) => return Err(e.into()),
            }
        }
        Commands::OauthUrl { provider } => {
            let url = client.oauth_login_url(&provider, &config.api.oauth_redirect_uri)?;
            println!("{url}");
        }
        Commands::OauthCallback { url } => {
            let identity = client.complete_oauth(&url)?;
            println!("Logged in as {}", identity.username);
            print_token(&client);
        }
        Commands::Admin(command) => admin(&client, command).await?,
    }
    Ok(())
}

async fn feed(client: &ApiClient, sort: Sort, page_size: u32, pages: u32) {
    let mut feed = JokeFeed::new(sort, page_size);
    for _ in 0..pages {
        match result_to_option(feed.load_more(client).await) {
            Some(0) | None => break,
            Some(_) => {}
        }
    }
    for joke in feed.jokes() {
        println!("{}", render::joke(joke));
    }
    if !feed.has_more() {
        println!("No more jokes");
    }
}

async fn admin(client: &ApiClient, command: AdminCommands) -> Result<()> {
    match command {
        AdminCommands::Stats => {
            let stats = client.user_stats().await?;
            print!("{}", render::stats(&stats));
        }
        AdminCommands::Users { page } => {
            let mut table = users_page(client, page).await?;
            client.load_users(&mut table).await?;
            print!("{}", render::users(&table));
        }
        AdminCommands::ToggleAdmin { user_id } => {
            let user_id = UserId(user_id);
            let mut table = UsersTable::default();
            // the user needs to be on the loaded page
            loop {
                client.load_users(&mut table).await?;
                if table.users.iter().any(|u| u.id == user_id) || !table.pager.has_next() {
                    break;
                }
                table.pager.next();
            }
            let is_admin = client.toggle_admin(&mut table, user_id).await?;
            println!("User {user_id} is admin: {is_admin}");
        }
        AdminCommands::Logs { page } => {
            let mut table = LogsTable::default();
            for _ in 1..page {
                table.pager.next();
            }
            client.load_logs(&mut table).await?;
            print!("{}", render::logs(&table.logs));
        }
    }
    Ok(())
}

async fn users_page(client: &ApiClient, page: u32) -> Result<UsersTable> {
    let mut table = UsersTable::default();
    if page > 1 {
        // total page count is only known after the first fetch
        client.load_users(&mut table).await?;
        while table.pager.page() < page && table.pager.has_next() {
            table.pager.next();
        }
    }
    Ok(table)
}

async fn load_thread(client: &ApiClient, id: i64) -> Result<JokeThread> {
    Ok(client.get_joke(JokeId(id)).await?.into())
}

fn social_target(
    thread: &mut JokeThread,
    comment: Option<i64>,
) -> Result<(SocialTarget, &mut SocialAggregate)> {
    match comment {
        None => Ok((SocialTarget::Joke(thread.joke.id), &mut thread.joke.social)),
        Some(id) => {
            let id = CommentId(id);
            let comment = thread
                .comment_mut(id)
                .ok_or_else(|| anyhow!("Comment {id} not found"))?;
            Ok((SocialTarget::Comment(id), &mut comment.social))
        }
    }
}

fn print_token(client: &ApiClient) {
    if let Some(token) = client.session().token() {
        println!("{token}");
    }
}
