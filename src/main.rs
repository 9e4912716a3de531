//! `folio-auth` — terminal front end for the two-factor session flow.

use std::sync::Arc;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use dialoguer::{Input, Password};

use folio_auth::{
    AuthConfig, AuthError, AuthSessionManager, AuthState, FileTokenStore, HttpAuthTransport,
    PinPad,
};

#[derive(Parser)]
#[command(name = "folio-auth", version, about = "Sign in to the Folio admin backend")]
struct Cli {
    /// Backend base URL (overrides config and FOLIO_AUTH_URL).
    #[arg(long, global = true)]
    url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in with email + password, then the PIN factor.
    Login,
    /// Show the current session state.
    Status,
    /// Drop the stored session.
    Logout,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let cli = Cli::parse();

    let mut config = AuthConfig::load()?;
    if let Some(url) = cli.url {
        config.base_url = url;
    }

    let manager = build_manager(&config)?;

    match cli.command {
        Command::Login => login(&manager).await,
        Command::Status => status(&manager).await,
        Command::Logout => {
            manager.logout();
            println!("Signed out.");
            Ok(())
        }
    }
}

fn build_manager(config: &AuthConfig) -> Result<AuthSessionManager> {
    let transport = HttpAuthTransport::new(&config.base_url, config.request_timeout())?;
    let store = FileTokenStore::new(config.token_path()?);
    Ok(AuthSessionManager::new(
        Arc::new(transport),
        Arc::new(store),
        config.pin_policy(),
    ))
}

async fn login(manager: &AuthSessionManager) -> Result<()> {
    manager.restore().await?;
    if let Some(session) = manager.session() {
        println!("Already signed in as {}.", session.user.email);
        return Ok(());
    }

    let email: String = Input::new().with_prompt("Email").interact_text()?;
    let password = Password::new().with_prompt("Password").interact()?;

    let challenge = match manager.login(&email, &password).await {
        Ok(challenge) => challenge,
        Err(AuthError::InvalidCredentials) => bail!("Invalid email or password."),
        Err(err) => return Err(err.into()),
    };

    let policy = manager.pin_policy();
    loop {
        let entered = Password::new()
            .with_prompt(format!("PIN ({} digits, empty to cancel)", policy.length))
            .allow_empty_password(true)
            .interact()?;

        if entered.is_empty() {
            manager.cancel_challenge();
            println!("Sign-in cancelled.");
            return Ok(());
        }

        // Feed the line through the pad so the same entry rules apply as
        // in any other front end (non-digits ignored, exact length).
        let mut pad = PinPad::new(policy);
        for c in entered.chars() {
            pad.push(c);
        }
        if !pad.completed() || pad.len() != entered.chars().count() {
            eprintln!("PIN must be exactly {} digits.", policy.length);
            continue;
        }

        match manager
            .verify_pin_factor(&challenge.temporary_token, pad.value())
            .await
        {
            Ok(()) => {
                if let Some(session) = manager.session() {
                    println!("Signed in as {}.", session.user.email);
                }
                return Ok(());
            }
            // Wrong PIN: the challenge survives, clear the pad and retry.
            Err(err) if err.challenge_still_valid() => {
                eprintln!("Incorrect PIN, try again.");
            }
            Err(AuthError::ChallengeExpired) => {
                manager.cancel_challenge();
                bail!("The sign-in challenge expired. Run `folio-auth login` again.");
            }
            Err(err) => {
                manager.cancel_challenge();
                return Err(err.into());
            }
        }
    }
}

async fn status(manager: &AuthSessionManager) -> Result<()> {
    manager.restore().await?;
    match manager.state() {
        AuthState::Authenticated(session) => {
            println!("Signed in as {} ({}).", session.user.email, session.user.user_id);
        }
        AuthState::Unauthenticated => println!("Not signed in."),
        // `status` never leaves restore in a transient state, but render
        // them honestly if it ever does.
        AuthState::Restoring => println!("Validating stored session..."),
        AuthState::CredentialsSubmitted(_) => println!("Waiting on second factor."),
    }
    Ok(())
}
