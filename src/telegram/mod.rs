//! Telegram integration: the MTProto client for reading channel history and
//! the Bot API client for publishing the report.

pub mod collector;
pub mod publisher;

use std::io::{BufRead, Write};
use std::path::PathBuf;

use grammers_client::{Client, Config, SignInError};
use grammers_session::Session;
use tracing::info;

use crate::core::config::TelegramConfig;
use crate::errors::{DigestError, Service};

/// Authorized MTProto client plus the session file it persists to.
///
/// The session file is the SDK's artifact; we only choose where it lives and
/// save it after a successful sign-in.
pub struct TelegramClient {
    client: Client,
    session_file: PathBuf,
}

fn telegram_error(reason: impl std::fmt::Display) -> DigestError {
    DigestError::ExternalService {
        service: Service::Telegram,
        reason: reason.to_string(),
    }
}

fn prompt(message: &str) -> Result<String, DigestError> {
    print!("{message}");
    std::io::stdout().flush().map_err(telegram_error)?;

    let mut input = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut input)
        .map_err(telegram_error)?;
    Ok(input.trim().to_string())
}

impl TelegramClient {
    /// Connect and make sure the session is authorized.
    ///
    /// On a fresh session this prompts on stdin for the login code (and the
    /// 2FA password when enabled), then saves the session file so later runs
    /// skip the interactive flow.
    ///
    /// # Errors
    ///
    /// `DigestError::Config` when the session file is unusable,
    /// `DigestError::ExternalService` when connecting or signing in fails.
    pub async fn connect(config: &TelegramConfig) -> Result<Self, DigestError> {
        let session_file = config.session_file();
        let session = Session::load_file_or_create(&session_file).map_err(|e| {
            DigestError::Config(format!(
                "cannot open session file {}: {e}",
                session_file.display()
            ))
        })?;

        let client = Client::connect(Config {
            session,
            api_id: config.api_id,
            api_hash: config.api_hash.clone(),
            params: Default::default(),
        })
        .await
        .map_err(telegram_error)?;

        let this = Self {
            client,
            session_file,
        };
        this.authorize(config).await?;
        Ok(this)
    }

    async fn authorize(&self, config: &TelegramConfig) -> Result<(), DigestError> {
        if self.client.is_authorized().await.map_err(telegram_error)? {
            return Ok(());
        }

        info!("session is not authorized, starting sign-in flow");

        let phone = match &config.phone {
            Some(phone) => phone.clone(),
            None => prompt("Enter your phone number (e.g. +1234567890): ")?,
        };
        let token = self
            .client
            .request_login_code(&phone)
            .await
            .map_err(telegram_error)?;
        let code = prompt("Enter the code you received: ")?;

        match self.client.sign_in(&token, &code).await {
            Ok(_user) => {}
            Err(SignInError::PasswordRequired(password_token)) => {
                let password = prompt("2FA is enabled. Enter your password: ")?;
                self.client
                    .check_password(password_token, password.trim())
                    .await
                    .map_err(telegram_error)?;
            }
            Err(e) => return Err(telegram_error(e)),
        }

        self.save_session()?;
        info!("signed in successfully");
        Ok(())
    }

    /// Persist the session so the next run skips the interactive sign-in.
    ///
    /// # Errors
    ///
    /// `DigestError::ExternalService` when the file cannot be written.
    pub fn save_session(&self) -> Result<(), DigestError> {
        self.client
            .session()
            .save_to_file(&self.session_file)
            .map_err(|e| {
                telegram_error(format!(
                    "cannot save session file {}: {e}",
                    self.session_file.display()
                ))
            })
    }

    pub(crate) fn client(&self) -> &Client {
        &self.client
    }
}
