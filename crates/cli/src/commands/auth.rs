//! Session and account commands.
//!
//! # Usage
//!
//! ```bash
//! parish login -e maria@parish.org
//! parish whoami
//! parish register -n "Maria Lopez" -e maria@parish.org --claim-code ABC123
//! parish link ABC123
//! parish logout
//! ```

use parish_client::{
    ClientConfig, FileSessionStore, LinkOutcome, ParishClient, Registration, Screen,
    SessionManager,
};
use parish_core::{Email, UserRecord};

use crate::app;
use crate::error::CliError;
use crate::prompt;
use crate::render;

const LINK_REMINDER: &str =
    "Your account is not linked to a member record yet. Run `parish link <claim-code>`.";

fn describe(user: &UserRecord) -> String {
    format!("{} <{}> ({})", user.name, user.email, user.role)
}

fn remind_if_unlinked(user: &UserRecord) -> Result<(), CliError> {
    if user.needs_member_link() {
        render::line(LINK_REMINDER)?;
    }
    Ok(())
}

/// Sign in and save the session.
pub async fn login(
    client: &ParishClient,
    email: &Email,
    password: Option<String>,
) -> Result<(), CliError> {
    let password = prompt::password(password)?;
    let user = client.auth().login(email, &password).await?;

    tracing::info!(user_id = %user.id, "Signed in");
    render::line(format_args!("Signed in as {}", describe(&user)))?;
    remind_if_unlinked(&user)
}

/// Sign out and remove the saved session.
pub async fn logout(client: &ParishClient) -> Result<(), CliError> {
    let was_signed_in = client.session().is_authenticated().await;
    client.auth().logout().await?;

    if was_signed_in {
        render::line("Signed out")?;
    } else {
        render::line("Not signed in")?;
    }
    Ok(())
}

/// Show the account as the backend reports it.
pub async fn whoami(client: &ParishClient) -> Result<(), CliError> {
    app::enter(client, Screen::Home).await?;
    let user = client.auth().me().await?;

    let mut out = std::io::stdout().lock();
    render::write_details(
        &mut out,
        &["ID", "Name", "Email", "Role", "Member"],
        &[
            user.id.to_string(),
            user.name.clone(),
            user.email.to_string(),
            user.role.to_string(),
            render::opt(user.member_id.as_ref()),
        ],
    )?;
    drop(out);

    remind_if_unlinked(&user)
}

/// Show the saved session without contacting the backend.
pub async fn status(config: &ClientConfig) -> Result<(), CliError> {
    let session = SessionManager::new(FileSessionStore::new(&config.session_file));

    match session.restore().await {
        Some(user) => {
            render::line(format_args!("Signed in as {}", describe(&user)))?;
            render::line(format_args!("Server: {}", config.base_url))?;
            remind_if_unlinked(&user)?;
        }
        None => render::line("Not signed in")?,
    }
    Ok(())
}

/// Create an account. The user signs in separately.
pub async fn register(
    client: &ParishClient,
    name: String,
    email: Email,
    password: Option<String>,
    claim_code: Option<String>,
) -> Result<(), CliError> {
    if name.trim().is_empty() {
        return Err(CliError::Invalid("Name must not be empty".into()));
    }

    let registration = Registration {
        name,
        email,
        password: prompt::password(password)?,
        claim_code,
    };
    let registered = client.auth().register(&registration).await?;

    render::line(format_args!(
        "Account created (user {}).",
        registered.user_id
    ))?;
    if let Some(member_id) = registered.member_id {
        render::line(format_args!("Linked to member record {member_id}."))?;
    }
    render::line("Run `parish login` to sign in.")?;
    Ok(())
}

/// Link the signed-in account to a member record.
pub async fn link(client: &ParishClient, claim_code: &str) -> Result<(), CliError> {
    if claim_code.trim().is_empty() {
        return Err(CliError::Invalid("Claim code must not be empty".into()));
    }
    app::enter(client, Screen::LinkProfile).await?;

    match client.auth().link_profile(claim_code).await? {
        LinkOutcome::AlreadyLinked(user) => render::line(format_args!(
            "Already linked to member record {}.",
            render::opt(user.member_id.as_ref())
        ))?,
        LinkOutcome::Linked(user) => render::line(format_args!(
            "Linked to member record {}.",
            render::opt(user.member_id.as_ref())
        ))?,
    }
    Ok(())
}
