use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{anyhow, Context};
use clap::{ArgAction, Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use matgwiazda_client::models::{
    CreateLearningLevel, LoginRequest, RegisterRequest, TaskQuery, UpdateLearningLevel,
    UpdateProfile, User,
};
use matgwiazda_client::play::{PlayApi, ProgressSink};
use matgwiazda_client::services::AdminService;
use matgwiazda_client::{display, ApiError, ClientState, Config, PlayController, PlayerIdentity};

/// MatGwiazda terminal client
#[derive(Parser, Debug)]
#[command(name = "matgwiazda")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Backend base URL, overrides configuration
    #[arg(long, global = true, value_name = "URL")]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in and store the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account and log in
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        user_name: String,
    },
    /// Forget the stored session
    Logout,
    /// Show the current user
    Me,
    /// Manage your profile
    Profile {
        #[command(subcommand)]
        action: ProfileCommand,
    },
    /// Answer tasks interactively
    Play,
    /// Exchange the stored refresh token for a new access token
    Refresh,
    /// Browse and manage the task catalogue
    Tasks {
        #[command(subcommand)]
        action: TaskCommand,
    },
    /// Show your answer history
    History,
    /// Administrator commands
    Admin {
        #[command(subcommand)]
        action: AdminCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ProfileCommand {
    Update {
        #[arg(long)]
        user_name: Option<String>,
        #[arg(long)]
        password: Option<String>,
    },
    Delete,
}

#[derive(Subcommand, Debug)]
enum TaskCommand {
    /// List tasks
    List {
        #[arg(long)]
        level: Option<u16>,
        #[arg(long)]
        active: Option<bool>,
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        size: Option<u32>,
    },
    /// Show one task with its answer key
    Show { id: String },
    /// Generate a new task at a level
    Generate {
        #[arg(long, default_value_t = 1)]
        level: u16,
    },
    /// Activate or deactivate a task
    SetActive {
        id: String,
        #[arg(action = ArgAction::Set)]
        active: bool,
    },
}

#[derive(Subcommand, Debug)]
enum AdminCommand {
    /// List all users
    Users,
    /// Activate or deactivate a user
    SetActive {
        id: String,
        #[arg(action = ArgAction::Set)]
        active: bool,
    },
    /// Manage learning levels
    Levels {
        #[command(subcommand)]
        action: LevelCommand,
    },
}

#[derive(Subcommand, Debug)]
enum LevelCommand {
    List,
    Show {
        level: u16,
    },
    Create {
        level: u16,
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
    },
    Update {
        level: u16,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    Delete {
        level: u16,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr so stdout carries only command output.
    let default_filter = if cli.verbose {
        "matgwiazda_client=debug,matgwiazda=debug"
    } else {
        "matgwiazda_client=info,matgwiazda=info"
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("Error: {e:#}");
            ExitCode::from(1)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load().context("Failed to load configuration")?;
    if let Some(url) = cli.api_url {
        config.api_base_url = url;
    }
    let state = ClientState::new(config).context("Failed to initialize client")?;

    match cli.command {
        Command::Login { email, password } => {
            let user = login(&state, LoginRequest { email, password }).await?;
            print_welcome(user.as_ref());
        }
        Command::Register {
            email,
            password,
            user_name,
        } => {
            // A rejected registration leaves any existing session alone.
            let user = state
                .auth
                .register(RegisterRequest {
                    email,
                    password,
                    user_name,
                })
                .await?;
            print_welcome(user.as_ref());
        }
        Command::Logout => {
            state.auth.logout()?;
            println!("Logged out.");
        }
        Command::Me => {
            let user = require_user(&state).await?;
            println!("{}", display::profile_summary(&user));
        }
        Command::Profile { action } => {
            require_user(&state).await?;
            match action {
                ProfileCommand::Update {
                    user_name,
                    password,
                } => {
                    let user = state
                        .profile
                        .update_me(&UpdateProfile {
                            user_name,
                            password,
                        })
                        .await
                        .map_err(|e| fail(&state, e))?;
                    state.auth.set_user(Some(user.clone()));
                    println!("{}", display::profile_summary(&user));
                }
                ProfileCommand::Delete => {
                    state
                        .profile
                        .delete_me()
                        .await
                        .map_err(|e| fail(&state, e))?;
                    state.auth.logout()?;
                    println!("Account deleted.");
                }
            }
        }
        Command::Play => play(&state).await?,
        Command::Refresh => {
            let auth = state.auth.refresh().await?;
            match auth.expires_in {
                Some(secs) => println!("Session refreshed, access token valid for {}s.", secs),
                None => println!("Session refreshed."),
            }
        }
        Command::Tasks { action } => tasks(&state, action).await?,
        Command::History => {
            require_user(&state).await?;
            let records = state
                .play
                .list_progress()
                .await
                .map_err(|e| fail(&state, e))?;
            println!("{}", display::progress_table(&records));
        }
        Command::Admin { action } => admin(&state, action).await?,
    }

    Ok(())
}

async fn tasks(state: &ClientState, action: TaskCommand) -> anyhow::Result<()> {
    match action {
        TaskCommand::List {
            level,
            active,
            page,
            size,
        } => {
            let query = TaskQuery {
                level,
                active,
                page,
                size,
            };
            let tasks = state
                .play
                .list_tasks(&query)
                .await
                .map_err(|e| fail(state, e))?;
            println!("{}", display::tasks_table(&tasks));
        }
        TaskCommand::Show { id } => {
            let task = state.play.get_task(&id).await.map_err(|e| fail(state, e))?;
            println!("{}", display::task_details(&task));
        }
        TaskCommand::Generate { level } => {
            let user = require_user(state).await?;
            let generated = state
                .play
                .generate_task(level, Some(user.id))
                .await
                .map_err(|e| fail(state, e))?;
            println!("{}", display::task_details(&generated.task));
            println!("Progress id: {}", generated.progress_id);
        }
        TaskCommand::SetActive { id, active } => {
            let task = state
                .play
                .set_task_active(&id, active)
                .await
                .map_err(|e| fail(state, e))?;
            println!("{}", display::task_details(&task));
        }
    }
    Ok(())
}

async fn admin(state: &ClientState, action: AdminCommand) -> anyhow::Result<()> {
    let user = require_user(state).await?;
    AdminService::ensure_admin(Some(&user))?;

    match action {
        AdminCommand::Users => {
            let users = state
                .admin
                .list_users()
                .await
                .map_err(|e| fail(state, e))?;
            println!("{}", display::users_table(&users));
        }
        AdminCommand::SetActive { id, active } => {
            state
                .admin
                .update_user_active(&id, active)
                .await
                .map_err(|e| fail(state, e))?;
            println!(
                "User {} {}.",
                id,
                if active { "activated" } else { "deactivated" }
            );
        }
        AdminCommand::Levels { action } => match action {
            LevelCommand::List => {
                let levels = state
                    .admin
                    .list_levels()
                    .await
                    .map_err(|e| fail(state, e))?;
                println!("{}", display::levels_table(&levels));
            }
            LevelCommand::Show { level } => {
                let level = state
                    .admin
                    .get_level(level)
                    .await
                    .map_err(|e| fail(state, e))?;
                println!("{}", display::levels_table(std::slice::from_ref(&level)));
            }
            LevelCommand::Create {
                level,
                title,
                description,
            } => {
                let created = state
                    .admin
                    .create_level(&CreateLearningLevel {
                        level,
                        title,
                        description,
                    })
                    .await
                    .map_err(|e| fail(state, e))?;
                println!("{}", display::levels_table(std::slice::from_ref(&created)));
            }
            LevelCommand::Update {
                level,
                title,
                description,
            } => {
                let updated = state
                    .admin
                    .update_level(level, &UpdateLearningLevel { title, description })
                    .await
                    .map_err(|e| fail(state, e))?;
                println!("{}", display::levels_table(std::slice::from_ref(&updated)));
            }
            LevelCommand::Delete { level } => {
                state
                    .admin
                    .delete_level(level)
                    .await
                    .map_err(|e| fail(state, e))?;
                println!("Level {} deleted.", level);
            }
        },
    }
    Ok(())
}

async fn play(state: &ClientState) -> anyhow::Result<()> {
    let user = require_user(state).await?;
    let api: Arc<dyn PlayApi> = state.play.clone();
    let sink: Arc<dyn ProgressSink> = state.auth.clone();
    let mut controller = PlayController::new(api, sink, Some(PlayerIdentity::from(&user)));

    if let Err(err) = controller.mount().await {
        if state.auth.handle_failure(&err) {
            return Err(login_required());
        }
    }
    show(&mut controller);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read input")? {
        let result = match line.trim() {
            "" => continue,
            "q" | "quit" => break,
            "n" | "next" if controller.current_task().is_none() => {
                controller.mount().await.map(|_| ())
            }
            "n" | "next" => controller.advance().await.map(|_| ()),
            other => match other.parse::<usize>() {
                Ok(number) if number >= 1 => match controller.select_option(number - 1) {
                    Ok(()) => controller.submit().await.map(|_| ()),
                    Err(err) => Err(err),
                },
                _ => {
                    println!("Unknown input '{}'", other);
                    continue;
                }
            },
        };

        if let Err(err) = result {
            if state.auth.handle_failure(&err) {
                controller.mount_handle().unmount();
                return Err(login_required());
            }
        }
        show(&mut controller);
    }

    controller.mount_handle().unmount();
    if let Some(user) = state.auth.current_user() {
        println!(
            "Level {}, {} point(s), {} star(s).",
            user.current_level, user.points, user.stars
        );
    }
    Ok(())
}

fn show(controller: &mut PlayController) {
    println!("{}\n", display::play_screen(controller));
    // Banners are shown once.
    controller.dismiss_level_up();
    controller.clear_error();
}

/// Logs in without touching the stored session on failure: a rejected
/// password says nothing about the tokens already on disk.
async fn login(state: &ClientState, request: LoginRequest) -> anyhow::Result<Option<User>> {
    state
        .auth
        .login(request)
        .await
        .map_err(anyhow::Error::new)
}

async fn require_user(state: &ClientState) -> anyhow::Result<User> {
    match state.auth.restore().await {
        Ok(Some(user)) => Ok(user),
        Ok(None) => Err(login_required()),
        Err(err) => Err(fail(state, err)),
    }
}

fn fail(state: &ClientState, err: ApiError) -> anyhow::Error {
    if state.auth.handle_failure(&err) {
        return anyhow!("{}. Please log in again with `matgwiazda login`.", err);
    }
    anyhow::Error::new(err)
}

fn login_required() -> anyhow::Error {
    anyhow!("Not logged in. Run `matgwiazda login` first.")
}

fn print_welcome(user: Option<&User>) {
    match user {
        Some(user) => println!(
            "Logged in as {} (level {}, {} point(s)).",
            user.display_name(),
            user.current_level,
            user.points
        ),
        None => println!("Logged in."),
    }
}
