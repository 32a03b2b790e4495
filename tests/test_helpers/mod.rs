//! Shared clock, user and environment helpers for integration tests.

use std::env;
use std::ffi::OsString;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, RwLock};

use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use mockable::Clock;
use taskboard::user::{
    adapters::memory::InMemoryUserRepository,
    domain::{Role, User, Username},
    ports::UserRepository,
};

/// Clock pinned to 2026-03-02 09:00 UTC until advanced.
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Arc<RwLock<DateTime<Utc>>>,
}

impl FixedClock {
    /// Creates a clock at the fixture instant.
    pub fn new() -> Self {
        let start = Utc
            .with_ymd_and_hms(2026, 3, 2, 9, 0, 0)
            .single()
            .expect("valid fixture timestamp");
        Self {
            now: Arc::new(RwLock::new(start)),
        }
    }

    /// Moves the clock forward.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.write().expect("clock lock");
        *now += by;
    }
}

impl Default for FixedClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.now.read().expect("clock lock")
    }
}

/// Registers an active user.
///
/// # Errors
///
/// Returns an error if the username is invalid or the store fails.
pub async fn register(
    users: &InMemoryUserRepository,
    name: &str,
    role: Role,
    clock: &FixedClock,
) -> Result<User, eyre::Report> {
    let user = User::new(Username::new(name)?, role, clock);
    users.store(&user).await?;
    Ok(user)
}

static ENV_MUTEX: OnceLock<Mutex<()>> = OnceLock::new();

/// Restores the environment variables it changed when dropped.
///
/// Holds a process-wide lock so concurrent tests never interleave their
/// environment updates.
pub struct EnvVarGuard {
    previous: Vec<(OsString, Option<OsString>)>,
    _lock: MutexGuard<'static, ()>,
}

impl EnvVarGuard {
    /// Sets or removes each variable for the lifetime of the guard.
    pub fn set_many(changes: &[(OsString, Option<OsString>)]) -> Self {
        let lock = ENV_MUTEX
            .get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let previous = changes
            .iter()
            .map(|(key, value)| {
                let old = env::var_os(key);
                apply(key, value.as_ref());
                (key.clone(), old)
            })
            .collect();
        Self {
            previous,
            _lock: lock,
        }
    }
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        for (key, value) in self.previous.drain(..).rev() {
            apply(&key, value.as_ref());
        }
    }
}

fn apply(key: &OsString, value: Option<&OsString>) {
    // SAFETY: `ENV_MUTEX` serializes environment mutations in tests.
    unsafe {
        match value {
            Some(new_value) => env::set_var(key, new_value),
            None => env::remove_var(key),
        }
    }
}
