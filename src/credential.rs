/// Admin password digests and the checks around them
///
/// Digesting is the only asynchronous step in the crate. A check is split
/// in two: the synchronous field validation that can fail immediately, and
/// a [`PendingCredential`] that owns the digest work. The coordinator holds
/// a busy flag for as long as a pending check exists.
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use sha2::{Digest, Sha256};

#[cfg(any(test, feature = "testing"))]
use mockall::automock;

use crate::catalog::{AdminCredential, AdminError};

/// One-way digest of a candidate password
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    /// Lower-case hex digest of `candidate`
    async fn digest(&self, candidate: String) -> Result<String>;
}

/// Lower-case hex SHA-256 of the UTF-8 bytes of `input`
pub fn sha256_hex(input: &str) -> String {
    hex::encode(Sha256::digest(input.as_bytes()))
}

/// SHA-256 computed off the async executor
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Hasher;

#[async_trait]
impl PasswordHasher for Sha256Hasher {
    async fn digest(&self, candidate: String) -> Result<String> {
        tokio::task::spawn_blocking(move || sha256_hex(&candidate))
            .await
            .context("password digest task failed")
    }
}

/// What the admin gate was asked to do
#[derive(Clone, PartialEq, Eq)]
pub enum CredentialRequest {
    Login {
        password: String,
    },
    /// First-run password
    SetPassword {
        new_password: String,
        confirmation: String,
    },
    ChangePassword {
        current: String,
        new_password: String,
        confirmation: String,
    },
}

impl std::fmt::Debug for CredentialRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.kind())
    }
}

impl CredentialRequest {
    pub fn kind(&self) -> &'static str {
        match self {
            CredentialRequest::Login { .. } => "login",
            CredentialRequest::SetPassword { .. } => "set_password",
            CredentialRequest::ChangePassword { .. } => "change_password",
        }
    }
}

/// Result of a completed credential check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialOutcome {
    LoggedIn,
    PasswordSet,
    PasswordChanged,
}

/// Password rules applied before and after digesting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CredentialPolicy {
    pub min_length: usize,
}

impl CredentialPolicy {
    pub fn new(min_length: usize) -> Self {
        Self { min_length }
    }

    pub fn is_long_enough(&self, password: &str) -> bool {
        !password.is_empty() && password.chars().count() >= self.min_length
    }

    /// Checks that need no digest. Change requests are validated in the
    /// order: all fields present, confirmation matches; the current-password
    /// and length checks run once the digests are known.
    pub fn precheck(&self, credential: &AdminCredential, request: &CredentialRequest) -> Result<(), AdminError> {
        match request {
            CredentialRequest::Login { password } => {
                if password.is_empty() {
                    return Err(AdminError::MissingPassword);
                }
                if !credential.is_set() {
                    return Err(AdminError::PasswordNotSet);
                }
            }
            CredentialRequest::SetPassword {
                new_password,
                confirmation,
            } => {
                if credential.is_set() {
                    return Err(AdminError::PasswordAlreadySet);
                }
                if !self.is_long_enough(new_password) {
                    return Err(AdminError::PasswordTooShort { min: self.min_length });
                }
                if new_password != confirmation {
                    return Err(AdminError::PasswordMismatch);
                }
            }
            CredentialRequest::ChangePassword {
                current,
                new_password,
                confirmation,
            } => {
                if current.is_empty() || new_password.is_empty() || confirmation.is_empty() {
                    return Err(AdminError::MissingPasswordFields);
                }
                if new_password != confirmation {
                    return Err(AdminError::PasswordMismatch);
                }
                if !credential.is_set() {
                    return Err(AdminError::PasswordNotSet);
                }
            }
        }
        Ok(())
    }
}

/// Digests produced by a pending check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialDigests {
    /// Digest of the login password, the new password, or the current
    /// password of a change request
    pub primary: String,
    /// New-password digest of a change request
    pub replacement: Option<String>,
}

type DigestFuture = Pin<Box<dyn Future<Output = Result<CredentialDigests>> + Send + 'static>>;

/// Busy flag shared between the coordinator and its outstanding ticket
pub(crate) type BusyFlag = Arc<AtomicBool>;

/// Holds the busy flag raised; lowers it when dropped
#[derive(Debug)]
pub(crate) struct BusyGuard {
    flag: BusyFlag,
}

impl BusyGuard {
    /// Raise `flag`, or `None` when it is already raised
    pub(crate) fn acquire(flag: &BusyFlag) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag: Arc::clone(flag) })
    }

    fn guards(&self, flag: &BusyFlag) -> bool {
        Arc::ptr_eq(&self.flag, flag)
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// A credential check whose digests are still being computed.
///
/// The issuing coordinator stays busy for as long as the ticket exists;
/// dropping it, even mid-await, lowers the flag.
pub struct PendingCredential {
    request: CredentialRequest,
    work: DigestFuture,
    guard: BusyGuard,
}

impl std::fmt::Debug for PendingCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingCredential")
            .field("request", &self.request)
            .finish_non_exhaustive()
    }
}

impl PendingCredential {
    /// Start digesting the passwords `request` needs
    pub(crate) fn start(hasher: Arc<dyn PasswordHasher>, request: CredentialRequest, guard: BusyGuard) -> Self {
        let work: DigestFuture = match &request {
            CredentialRequest::Login { password } => {
                let password = password.clone();
                Box::pin(async move {
                    let primary = hasher.digest(password).await?;
                    Ok::<_, anyhow::Error>(CredentialDigests {
                        primary,
                        replacement: None,
                    })
                })
            }
            CredentialRequest::SetPassword { new_password, .. } => {
                let new_password = new_password.clone();
                Box::pin(async move {
                    let primary = hasher.digest(new_password).await?;
                    Ok::<_, anyhow::Error>(CredentialDigests {
                        primary,
                        replacement: None,
                    })
                })
            }
            CredentialRequest::ChangePassword {
                current,
                new_password,
                ..
            } => {
                let (current, new_password) = (current.clone(), new_password.clone());
                Box::pin(async move {
                    let primary = hasher.digest(current).await?;
                    let replacement = hasher.digest(new_password).await?;
                    Ok::<_, anyhow::Error>(CredentialDigests {
                        primary,
                        replacement: Some(replacement),
                    })
                })
            }
        };

        Self { request, work, guard }
    }

    pub fn request(&self) -> &CredentialRequest {
        &self.request
    }

    /// Whether this ticket holds `flag` raised
    pub(crate) fn issued_under(&self, flag: &BusyFlag) -> bool {
        self.guard.guards(flag)
    }

    /// Wait for the digests; the busy flag is lowered on return
    pub async fn finish(self) -> (CredentialRequest, Result<CredentialDigests>) {
        let Self { request, work, guard } = self;
        let digests = work.await;
        drop(guard);
        (request, digests)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ABCD_SHA256: &str = "88d4266fd4e6338d13b845fcf289579d209c897823b9217da3e161936f031589";

    fn policy() -> CredentialPolicy {
        CredentialPolicy::new(4)
    }

    fn set_credential() -> AdminCredential {
        AdminCredential {
            password_hash: sha256_hex("abcd"),
        }
    }

    #[test]
    fn test_sha256_hex_known_vector() {
        assert_eq!(sha256_hex("abcd"), ABCD_SHA256);
        assert_eq!(
            sha256_hex(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[tokio::test]
    async fn test_sha256_hasher_matches_sync_digest() {
        let digest = Sha256Hasher.digest("パスワード".to_string()).await.unwrap();
        assert_eq!(digest, sha256_hex("パスワード"));
    }

    #[test]
    fn test_set_password_rules() {
        let unset = AdminCredential::default();
        let set = |new: &str, confirm: &str| CredentialRequest::SetPassword {
            new_password: new.to_string(),
            confirmation: confirm.to_string(),
        };

        assert!(matches!(
            policy().precheck(&unset, &set("abc", "abc")),
            Err(AdminError::PasswordTooShort { min: 4 })
        ));
        assert!(matches!(
            policy().precheck(&unset, &set("abcd", "abce")),
            Err(AdminError::PasswordMismatch)
        ));
        assert!(policy().precheck(&unset, &set("あいうえ", "あいうえ")).is_ok());
        assert!(matches!(
            policy().precheck(&set_credential(), &set("abcd", "abcd")),
            Err(AdminError::PasswordAlreadySet)
        ));
    }

    #[test]
    fn test_change_password_field_checks_come_first() {
        let change = |current: &str, new: &str, confirm: &str| CredentialRequest::ChangePassword {
            current: current.to_string(),
            new_password: new.to_string(),
            confirmation: confirm.to_string(),
        };

        assert!(matches!(
            policy().precheck(&set_credential(), &change("", "x", "x")),
            Err(AdminError::MissingPasswordFields)
        ));
        assert!(matches!(
            policy().precheck(&set_credential(), &change("abcd", "x", "y")),
            Err(AdminError::PasswordMismatch)
        ));
        // too short is only reported after the current password is verified
        assert!(policy().precheck(&set_credential(), &change("abcd", "x", "x")).is_ok());
    }

    #[test]
    fn test_login_requires_password_and_hash() {
        let login = |p: &str| CredentialRequest::Login { password: p.to_string() };

        assert!(matches!(
            policy().precheck(&set_credential(), &login("")),
            Err(AdminError::MissingPassword)
        ));
        assert!(matches!(
            policy().precheck(&AdminCredential::default(), &login("abcd")),
            Err(AdminError::PasswordNotSet)
        ));
    }

    #[tokio::test]
    async fn test_pending_change_digests_both_passwords() {
        let mut hasher = MockPasswordHasher::new();
        hasher
            .expect_digest()
            .times(2)
            .returning(|candidate| Ok(format!("h:{candidate}")));

        let flag = BusyFlag::default();
        let guard = BusyGuard::acquire(&flag).unwrap();
        let pending = PendingCredential::start(
            Arc::new(hasher),
            CredentialRequest::ChangePassword {
                current: "old1".to_string(),
                new_password: "new1".to_string(),
                confirmation: "new1".to_string(),
            },
            guard,
        );
        assert!(pending.issued_under(&flag));
        assert!(!pending.issued_under(&BusyFlag::default()));
        let (request, digests) = pending.finish().await;
        assert!(!flag.load(Ordering::Acquire));

        assert_eq!(request.kind(), "change_password");
        assert_eq!(
            digests.unwrap(),
            CredentialDigests {
                primary: "h:old1".to_string(),
                replacement: Some("h:new1".to_string()),
            }
        );
    }

    #[test]
    fn test_busy_guard_is_exclusive_and_released_on_drop() {
        let flag = BusyFlag::default();
        let guard = BusyGuard::acquire(&flag).unwrap();

        assert!(flag.load(Ordering::Acquire));
        assert!(BusyGuard::acquire(&flag).is_none());

        drop(guard);
        assert!(!flag.load(Ordering::Acquire));
        assert!(BusyGuard::acquire(&flag).is_some());
    }

    #[test]
    fn test_request_debug_hides_passwords() {
        let request = CredentialRequest::Login {
            password: "secret".to_string(),
        };
        assert_eq!(format!("{request:?}"), "login");
    }
}
