//! Accounts and the account directory used at sign-in.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard};

use thiserror::Error;

use conduct_core::{DomainError, Email, Entity, UserId};

use crate::password::{self, PasswordError};
use crate::Role;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccountError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Password(#[from] PasswordError),
}

/// A sign-in identity (admin or student).
///
/// The password hash never leaves this type; callers only get
/// [`Account::verify_password`].
#[derive(Clone, PartialEq, Eq)]
pub struct Account {
    pub id: UserId,
    pub email: Email,
    pub name: String,
    pub role: Role,
    password_hash: String,
}

impl Account {
    /// Create an account, hashing `password`.
    pub fn register(email: Email, name: &str, role: Role, password: &str) -> Result<Self, AccountError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("name must not be empty").into());
        }

        Ok(Self {
            id: UserId::new(),
            email,
            name: name.to_string(),
            role,
            password_hash: password::hash_password(password)?,
        })
    }

    pub fn verify_password(&self, password: &str) -> bool {
        password::verify_password(password, &self.password_hash)
    }
}

impl Entity for Account {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl core::fmt::Debug for Account {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("name", &self.name)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

/// Account storage abstraction.
pub trait AccountDirectory: Send + Sync {
    /// Insert a new account. Emails are unique.
    fn insert(&self, account: Account) -> Result<(), DomainError>;
    fn get(&self, id: &UserId) -> Option<Account>;
    fn find_by_email(&self, email: &Email) -> Option<Account>;
    /// Accounts with `role`, ordered by email.
    fn list_by_role(&self, role: Role) -> Vec<Account>;
}

impl<S> AccountDirectory for Arc<S>
where
    S: AccountDirectory + ?Sized,
{
    fn insert(&self, account: Account) -> Result<(), DomainError> {
        (**self).insert(account)
    }

    fn get(&self, id: &UserId) -> Option<Account> {
        (**self).get(id)
    }

    fn find_by_email(&self, email: &Email) -> Option<Account> {
        (**self).find_by_email(email)
    }

    fn list_by_role(&self, role: Role) -> Vec<Account> {
        (**self).list_by_role(role)
    }
}

/// In-memory directory for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryAccountDirectory {
    inner: RwLock<Accounts>,
}

#[derive(Debug, Default)]
struct Accounts {
    by_id: HashMap<UserId, Account>,
    by_email: HashMap<Email, UserId>,
}

impl InMemoryAccountDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Option<RwLockReadGuard<'_, Accounts>> {
        match self.inner.read() {
            Ok(guard) => Some(guard),
            Err(_) => {
                tracing::error!("account directory lock poisoned; lookup treated as a miss");
                None
            }
        }
    }
}

impl AccountDirectory for InMemoryAccountDirectory {
    fn insert(&self, account: Account) -> Result<(), DomainError> {
        let mut accounts = self
            .inner
            .write()
            .map_err(|_| DomainError::invariant("account directory lock poisoned"))?;

        if accounts.by_email.contains_key(&account.email) {
            return Err(DomainError::conflict(format!("email already registered: {}", account.email)));
        }

        accounts.by_email.insert(account.email.clone(), account.id);
        accounts.by_id.insert(*account.id(), account);
        Ok(())
    }

    fn get(&self, id: &UserId) -> Option<Account> {
        let accounts = self.read()?;
        accounts.by_id.get(id).cloned()
    }

    fn find_by_email(&self, email: &Email) -> Option<Account> {
        let accounts = self.read()?;
        let id = accounts.by_email.get(email)?;
        accounts.by_id.get(id).cloned()
    }

    fn list_by_role(&self, role: Role) -> Vec<Account> {
        let accounts = match self.inner.read() {
            Ok(a) => a,
            Err(_) => {
                tracing::error!(%role, "account directory lock poisoned; returning no accounts");
                return vec![];
            }
        };

        let mut out: Vec<Account> = accounts
            .by_id
            .values()
            .filter(|a| a.role == role)
            .cloned()
            .collect();
        out.sort_by(|a, b| a.email.cmp(&b.email));
        out
    }
}
