//! Booktrack CLI - track your reading list from the terminal.
//!
//! Each command drives the same screen view-models a graphical front end
//! would, and prints their notices instead of showing alerts.

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use booktrack_core::auth::{Session, TokenBackend};
use booktrack_core::config::API_URL_ENV;
use booktrack_core::screens::{
    BookDetailScreen, HomeScreen, LoginScreen, NoticeKind, Outcome, ProfileScreen,
    RegisterScreen, Route, SplashScreen, Transition,
};
use booktrack_core::utils::pad_right;
use booktrack_core::{ApiClient, Config};

// ============================================================================
// Constants
// ============================================================================

const TITLE_WIDTH: usize = 32;
const AUTHOR_WIDTH: usize = 20;
const GENRE_WIDTH: usize = 12;
const ID_WIDTH: usize = 24;

// ============================================================================
// Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "booktrack", version, about = "Track your personal reading list")]
struct Cli {
    /// Backend base URL
    #[arg(long, global = true, env = API_URL_ENV)]
    api_url: Option<String>,

    /// Where to keep the login token: keyring, file or memory
    #[arg(long, global = true)]
    token_backend: Option<TokenBackend>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in and remember the session
    Login {
        #[arg(short, long)]
        username: Option<String>,
    },
    /// Create an account
    Register {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        email: String,
    },
    /// Forget the saved session
    Logout,
    /// Show or edit your profile
    #[command(subcommand)]
    Profile(ProfileCommand),
    /// Manage your books
    #[command(subcommand)]
    Books(BooksCommand),
}

#[derive(Subcommand, Debug)]
enum ProfileCommand {
    Show,
    Update {
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum BooksCommand {
    /// List all books
    List,
    /// Add a book
    Add(BookFields),
    /// Show one book
    Show { id: String },
    /// Change fields of a book
    Update {
        id: String,
        #[command(flatten)]
        fields: BookFields,
    },
    /// Delete a book
    Delete { id: String },
}

#[derive(Args, Debug, Default)]
struct BookFields {
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    author: Option<String>,
    #[arg(long)]
    genre: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    pages: Option<String>,
}

// ============================================================================
// Setup
// ============================================================================

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing();

    let mut config = Config::load()?;
    config.override_api_url(cli.api_url.clone());
    if let Some(backend) = cli.token_backend {
        config.token_backend = backend;
    }
    debug!(api = %config.api_base_url, backend = ?config.token_backend, "Configuration loaded");

    let session = config.open_session()?;
    let client = ApiClient::from_config(&config, session.clone())?;

    match cli.command {
        Command::Login { username } => login(&client, &mut config, username).await,
        Command::Register { username, email } => register(&client, username, email).await,
        Command::Logout => {
            let outcome = ProfileScreen::new().logout(&client);
            finish(outcome)?;
            println!("Logged out.");
            Ok(())
        }
        Command::Profile(cmd) => {
            require_login(&session)?;
            profile(&client, cmd).await
        }
        Command::Books(cmd) => {
            require_login(&session)?;
            books(&client, cmd).await
        }
    }
}

/// Same decision the splash screen makes on launch.
fn require_login(session: &Arc<Session>) -> Result<()> {
    let outcome = SplashScreen::resolve(session);
    if outcome.transition == Transition::Reset(Route::Login) {
        finish(outcome)?;
        anyhow::bail!("Not logged in. Run `booktrack login` first.");
    }
    Ok(())
}

/// Print the outcome's notice; error notices become the command's error.
fn finish(outcome: Outcome) -> Result<Outcome> {
    if let Some(ref notice) = outcome.notice {
        match notice.kind {
            NoticeKind::Success => println!("{}", notice.message),
            NoticeKind::Error => {
                if outcome.transition == Transition::Reset(Route::Login) {
                    anyhow::bail!("{}\nRun `booktrack login` to sign in again.", notice.message);
                }
                anyhow::bail!("{}", notice.message);
            }
        }
    }
    Ok(outcome)
}

fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

// ============================================================================
// Commands
// ============================================================================

async fn login(client: &ApiClient, config: &mut Config, username: Option<String>) -> Result<()> {
    let username = match username {
        Some(u) => u,
        None => match config.last_username.clone() {
            Some(last) => {
                let input = prompt(&format!("Username [{}]: ", last))?;
                if input.is_empty() { last } else { input }
            }
            None => prompt("Username: ")?,
        },
    };

    let mut screen = LoginScreen::new(Some(username));
    screen.password = rpassword::prompt_password("Password: ").context("Failed to read password")?;

    println!("Logging in...");
    finish(screen.submit(client).await)?;

    if let Err(e) = config.remember_username(screen.username.trim()) {
        warn!(error = %e, "Failed to save config");
    }
    info!("Logged in");
    println!("Logged in as {}.", screen.username.trim());
    Ok(())
}

async fn register(client: &ApiClient, username: String, email: String) -> Result<()> {
    let password = rpassword::prompt_password("Password: ").context("Failed to read password")?;
    let confirm = rpassword::prompt_password("Confirm password: ").context("Failed to read password")?;
    if password != confirm {
        anyhow::bail!("Passwords do not match");
    }

    let mut screen = RegisterScreen {
        username,
        email,
        password,
    };
    finish(screen.submit(client).await)?;
    println!("You can now run `booktrack login`.");
    Ok(())
}

async fn profile(client: &ApiClient, cmd: ProfileCommand) -> Result<()> {
    let mut screen = ProfileScreen::new();
    finish(screen.load(client).await)?;

    if let ProfileCommand::Update { username, email } = cmd {
        if let Some(username) = username {
            screen.username = username;
        }
        if let Some(email) = email {
            screen.email = email;
        }
        finish(screen.update(client).await)?;
    }

    if let Some(error) = screen.error() {
        anyhow::bail!("{}", error);
    }
    match screen.profile() {
        Some(p) => {
            println!("Username:     {}", p.username);
            println!("Email:        {}", p.email);
            println!("Member since: {}", p.member_since());
        }
        None => println!("No user data available."),
    }
    Ok(())
}

async fn books(client: &ApiClient, cmd: BooksCommand) -> Result<()> {
    let mut home = HomeScreen::new();

    match cmd {
        BooksCommand::List => {
            finish(home.refresh(client).await)?;
            print_books(&home);
        }
        BooksCommand::Add(fields) => {
            fields.fill(&mut home.draft);
            finish(home.add_book(client).await)?;
            print_books(&home);
        }
        BooksCommand::Show { id } => {
            let detail = open_book(client, &mut home, &id).await?;
            let book = detail.book();
            println!("Title:       {}", book.title);
            println!("Author:      {}", book.author);
            println!("Genre:       {}", book.genre_display());
            println!("Pages:       {}", book.pages_display());
            println!("Description: {}", book.description.as_deref().unwrap_or(""));
        }
        BooksCommand::Update { id, fields } => {
            let mut detail = open_book(client, &mut home, &id).await?;
            fields.fill(&mut detail.draft);
            finish(detail.update(client).await)?;
        }
        BooksCommand::Delete { id } => {
            let mut detail = open_book(client, &mut home, &id).await?;
            finish(detail.delete(client).await)?;
        }
    }
    Ok(())
}

/// Fetch the list and open the detail screen for `id`, as tapping a row would.
async fn open_book(client: &ApiClient, home: &mut HomeScreen, id: &str) -> Result<BookDetailScreen> {
    finish(home.refresh(client).await)?;
    let index = home
        .books()
        .iter()
        .position(|b| b.id == id)
        .ok_or_else(|| anyhow::anyhow!("No book with id {}", id))?;

    match home.select(index).transition {
        Transition::Navigate(Route::BookDetail(book)) => Ok(BookDetailScreen::new(book)),
        other => anyhow::bail!("Unexpected navigation: {:?}", other),
    }
}

fn print_books(home: &HomeScreen) {
    let rows = home.rows();
    if rows.is_empty() {
        println!("No books yet. Add one with `booktrack books add`.");
        return;
    }
    println!(
        "{} {} {} {} Pages",
        pad_right("ID", ID_WIDTH),
        pad_right("Title", TITLE_WIDTH),
        pad_right("Author", AUTHOR_WIDTH),
        pad_right("Genre", GENRE_WIDTH),
    );
    for row in rows {
        println!(
            "{} {} {} {} {}",
            pad_right(&row.id, ID_WIDTH),
            pad_right(&row.title, TITLE_WIDTH),
            pad_right(&row.author, AUTHOR_WIDTH),
            pad_right(&row.genre, GENRE_WIDTH),
            row.pages,
        );
    }
}

impl BookFields {
    /// Overwrite only the form fields given on the command line.
    fn fill(self, draft: &mut booktrack_core::models::BookDraft) {
        if let Some(title) = self.title {
            draft.title = title;
        }
        if let Some(author) = self.author {
            draft.author = author;
        }
        if let Some(genre) = self.genre {
            draft.genre = genre;
        }
        if let Some(description) = self.description {
            draft.description = description;
        }
        if let Some(pages) = self.pages {
            draft.total_pages = pages;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use booktrack_core::models::BookDraft;

    #[test]
    fn test_cli_parses_book_update() {
        let cli = Cli::try_parse_from([
            "booktrack", "--token-backend", "file", "books", "update", "42", "--pages", "500",
        ])
        .unwrap();
        assert_eq!(cli.token_backend, Some(TokenBackend::File));
        match cli.command {
            Command::Books(BooksCommand::Update { id, fields }) => {
                assert_eq!(id, "42");
                assert_eq!(fields.pages.as_deref(), Some("500"));
                assert!(fields.title.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_fill_only_overwrites_given_fields() {
        let mut draft = BookDraft {
            title: "Dune".to_string(),
            author: "Herbert".to_string(),
            total_pages: "412".to_string(),
            ..Default::default()
        };
        BookFields {
            pages: Some("500".to_string()),
            ..Default::default()
        }
        .fill(&mut draft);
        assert_eq!(draft.title, "Dune");
        assert_eq!(draft.total_pages, "500");
    }

    #[test]
    fn test_finish_turns_error_notice_into_error() {
        assert!(finish(Outcome::error("nope")).is_err());
        assert!(finish(Outcome::stay()).is_ok());
    }
}
