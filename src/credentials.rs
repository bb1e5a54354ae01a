use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{Error, Result};

/// A registered account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// A signed-in user together with the token that identifies the login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub user: User,
    pub token: String,
}

/// Account store the game resolves its player identity through.
pub trait CredentialStore {
    /// Registers a new account and signs it in.
    ///
    /// Fails when the email or the username is already registered.
    fn signup(&mut self, username: &str, email: &str, password: &str) -> Result<AuthSession>;

    /// Signs in an existing account by email.
    fn login(&mut self, email: &str, password: &str) -> Result<AuthSession>;

    /// Invalidates `token`. Unknown tokens are ignored.
    fn logout(&mut self, token: &str);

    /// Returns the user a live token belongs to.
    fn current_user(&self, token: &str) -> Result<User>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredAccount {
    #[serde(flatten)]
    user: User,
    password: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct AccountFile {
    accounts: Vec<StoredAccount>,
}

/// Accounts kept in memory, optionally backed by a JSON file.
///
/// Passwords are compared verbatim, without hashing. Tokens live only as
/// long as the book itself.
#[derive(Debug, Default)]
pub struct AccountBook {
    accounts: Vec<StoredAccount>,
    tokens: HashMap<String, Uuid>,
    path: Option<PathBuf>,
}

impl AccountBook {
    #[must_use]
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Opens the accounts stored at `path`. A missing file is an empty book.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let accounts = load_accounts(&path)?;

        Ok(Self {
            accounts,
            tokens: HashMap::new(),
            path: Some(path),
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    fn issue_token(&mut self, user: &User) -> AuthSession {
        let token = Uuid::new_v4().simple().to_string();
        self.tokens.insert(token.clone(), user.id);

        AuthSession {
            user: user.clone(),
            token,
        }
    }

    fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let payload = AccountFile {
            accounts: self.accounts.clone(),
        };
        let json = serde_json::to_string_pretty(&payload).map_err(Error::Encode)?;

        fs::write(path, json)?;
        Ok(())
    }
}

impl CredentialStore for AccountBook {
    fn signup(&mut self, username: &str, email: &str, password: &str) -> Result<AuthSession> {
        if self.accounts.iter().any(|account| account.user.email == email) {
            return Err(Error::EmailTaken(email.to_owned()));
        }
        if self.accounts.iter().any(|account| account.user.username == username) {
            return Err(Error::UsernameTaken(username.to_owned()));
        }

        let user = User {
            id: Uuid::new_v4(),
            username: username.to_owned(),
            email: email.to_owned(),
            created_at: Utc::now(),
        };
        self.accounts.push(StoredAccount {
            user: user.clone(),
            password: password.to_owned(),
        });
        self.save()?;

        info!(id = %user.id, username, "account created");
        Ok(self.issue_token(&user))
    }

    fn login(&mut self, email: &str, password: &str) -> Result<AuthSession> {
        let user = self
            .accounts
            .iter()
            .find(|account| account.user.email == email && account.password == password)
            .map(|account| account.user.clone())
            .ok_or(Error::InvalidCredentials)?;

        debug!(id = %user.id, "logged in");
        Ok(self.issue_token(&user))
    }

    fn logout(&mut self, token: &str) {
        if let Some(id) = self.tokens.remove(token) {
            debug!(%id, "logged out");
        }
    }

    fn current_user(&self, token: &str) -> Result<User> {
        let id = self.tokens.get(token).ok_or(Error::InvalidToken)?;

        self.accounts
            .iter()
            .find(|account| account.user.id == *id)
            .map(|account| account.user.clone())
            .ok_or(Error::InvalidToken)
    }
}

fn load_accounts(path: &Path) -> Result<Vec<StoredAccount>> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    serde_json::from_str::<AccountFile>(&raw)
        .map(|file| file.accounts)
        .map_err(|source| Error::Json {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    use crate::driver::Player;
    use crate::error::Error;

    use super::{AccountBook, CredentialStore};

    #[test]
    fn signup_signs_the_new_account_in() {
        let mut book = AccountBook::in_memory();

        let auth = book.signup("ada", "ada@example.com", "hunter2").expect("signup");

        assert_eq!(auth.user.username, "ada");
        assert_eq!(book.current_user(&auth.token).expect("live token"), auth.user);
        assert_eq!(book.len(), 1);
    }

    #[test]
    fn duplicate_email_or_username_is_rejected() {
        let mut book = AccountBook::in_memory();
        book.signup("ada", "ada@example.com", "pw").expect("signup");

        assert!(matches!(
            book.signup("other", "ada@example.com", "pw"),
            Err(Error::EmailTaken(_))
        ));
        assert!(matches!(
            book.signup("ada", "other@example.com", "pw"),
            Err(Error::UsernameTaken(_))
        ));
        assert_eq!(book.len(), 1);
    }

    #[test]
    fn login_requires_matching_password() {
        let mut book = AccountBook::in_memory();
        let created = book.signup("ada", "ada@example.com", "pw").expect("signup");

        assert!(matches!(
            book.login("ada@example.com", "wrong"),
            Err(Error::InvalidCredentials)
        ));
        assert!(matches!(
            book.login("nobody@example.com", "pw"),
            Err(Error::InvalidCredentials)
        ));

        let auth = book.login("ada@example.com", "pw").expect("login");
        assert_eq!(auth.user, created.user);
        assert_ne!(auth.token, created.token);
    }

    #[test]
    fn logout_invalidates_only_that_token() {
        let mut book = AccountBook::in_memory();
        let first = book.signup("ada", "ada@example.com", "pw").expect("signup");
        let second = book.login("ada@example.com", "pw").expect("login");

        book.logout(&first.token);
        book.logout("never-issued");

        assert!(matches!(book.current_user(&first.token), Err(Error::InvalidToken)));
        assert!(book.current_user(&second.token).is_ok());
    }

    #[test]
    fn usernames_differing_in_case_are_distinct_players() {
        let mut book = AccountBook::in_memory();
        let upper = book.signup("ADA", "upper@example.com", "pw").expect("signup");
        let lower = book.signup("Ada", "lower@example.com", "pw").expect("signup");

        let upper = Player::from(&upper.user);
        let lower = Player::from(&lower.user);

        assert_ne!(upper.user_id, lower.user_id);
        assert_eq!(lower.username, "Ada");
    }

    #[test]
    fn file_backed_accounts_survive_reopen() {
        let path = unique_test_path("reopen");

        let mut book = AccountBook::open(&path).expect("missing file opens empty");
        assert!(book.is_empty());
        let created = book.signup("zed", "zed@example.com", "pw").expect("signup");

        let mut reopened = AccountBook::open(&path).expect("reopen");
        assert!(matches!(
            reopened.current_user(&created.token),
            Err(Error::InvalidToken)
        ));
        let auth = reopened.login("zed@example.com", "pw").expect("login after reopen");
        assert_eq!(auth.user, created.user);

        cleanup_test_path(&path);
    }

    fn unique_test_path(label: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time should be after epoch")
            .as_nanos();

        std::env::temp_dir()
            .join("snake-arena-account-tests")
            .join(format!("{label}-{nanos}.json"))
    }

    fn cleanup_test_path(path: &PathBuf) {
        let _ = fs::remove_file(path);
        if let Some(parent) = path.parent() {
            let _ = fs::remove_dir(parent);
        }
    }
}
