//! Session cookie settings read from `SESSION_*` environment variables.
//!
//! Debug builds fall back to permissive defaults and log what they replaced.
//! Release builds require every toggle to be present and valid, and refuse
//! to start with a short or generated signing key.

use std::path::PathBuf;

use actix_web::cookie::{Key, SameSite};
use mockable::Env;
use sha2::{Digest, Sha256};
use tracing::warn;
use zeroize::Zeroize;

const KEY_FILE_ENV: &str = "SESSION_KEY_FILE";
const COOKIE_SECURE_ENV: &str = "SESSION_COOKIE_SECURE";
const SAMESITE_ENV: &str = "SESSION_SAMESITE";
const ALLOW_EPHEMERAL_ENV: &str = "SESSION_ALLOW_EPHEMERAL";

const DEFAULT_KEY_PATH: &str = "/var/run/secrets/session_key";
/// Minimum key file length accepted in release builds.
pub const SESSION_KEY_MIN_LEN: usize = 64;
// `Key::derive_from` panics below this length.
const KEY_DERIVE_MIN_LEN: usize = 32;
const FINGERPRINT_BYTES: usize = 8;

const BOOL_EXPECTED: &str = "1|0|true|false|yes|no|y|n";
const SAMESITE_EXPECTED: &str = "Strict|Lax|None";

/// How strictly session toggles are validated.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Missing or invalid toggles fall back to defaults with a warning.
    Debug,
    /// Missing or invalid toggles are fatal.
    Release,
}

impl BuildMode {
    /// Pick the mode matching the current compilation profile.
    ///
    /// # Examples
    /// ```
    /// use campus_qa::inbound::http::session_config::BuildMode;
    ///
    /// let expected = if cfg!(debug_assertions) {
    ///     BuildMode::Debug
    /// } else {
    ///     BuildMode::Release
    /// };
    /// assert_eq!(BuildMode::from_debug_assertions(), expected);
    /// ```
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }
}

/// Validated cookie session settings.
pub struct SessionSettings {
    /// Signing key for the session cookie.
    pub key: Key,
    /// Whether the cookie carries the `Secure` attribute.
    pub cookie_secure: bool,
    /// `SameSite` policy for the cookie.
    pub same_site: SameSite,
}

/// Rejected session configuration.
#[derive(thiserror::Error, Debug)]
pub enum SessionConfigError {
    /// A toggle required in release builds is absent.
    #[error("missing required environment variable: {name}")]
    MissingEnv { name: &'static str },
    /// A toggle holds an unrecognised value.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    /// The key file could not be read.
    #[error("failed to read session key at {path}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The key file is shorter than [`SESSION_KEY_MIN_LEN`].
    #[error("session key at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
    /// `SameSite=None` without `Secure`.
    #[error("SESSION_SAMESITE=None requires SESSION_COOKIE_SECURE=1")]
    InsecureSameSiteNone,
    /// Generated keys are not allowed in release builds.
    #[error("SESSION_ALLOW_EPHEMERAL must be 0 in release builds")]
    EphemeralNotAllowed,
}

impl SessionSettings {
    /// Read and validate session settings.
    ///
    /// # Examples
    /// ```
    /// use campus_qa::inbound::http::session_config::{BuildMode, SessionSettings};
    /// use mockable::MockEnv;
    ///
    /// let mut env = MockEnv::new();
    /// env.expect_string().returning(|_| None);
    ///
    /// let settings = SessionSettings::from_env(&env, BuildMode::Debug).expect("debug defaults");
    /// assert!(settings.cookie_secure);
    /// ```
    pub fn from_env<E: Env>(env: &E, mode: BuildMode) -> Result<Self, SessionConfigError> {
        let reader = Toggles { env, mode };
        let cookie_secure = reader.flag(COOKIE_SECURE_ENV, true)?;
        let same_site = reader.same_site(cookie_secure)?;
        let allow_ephemeral = reader.flag(ALLOW_EPHEMERAL_ENV, false)?;
        if allow_ephemeral && mode == BuildMode::Release {
            return Err(SessionConfigError::EphemeralNotAllowed);
        }
        let key = reader.key(allow_ephemeral)?;

        Ok(Self {
            key,
            cookie_secure,
            same_site,
        })
    }

    /// Short hex digest of the signing key, safe to log.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        key_fingerprint(&self.key)
    }
}

/// Truncated SHA-256 of the key's signing half, as lowercase hex.
///
/// # Examples
/// ```
/// use actix_web::cookie::Key;
/// use campus_qa::inbound::http::session_config::key_fingerprint;
///
/// let fingerprint = key_fingerprint(&Key::generate());
/// assert_eq!(fingerprint.len(), 16);
/// ```
#[must_use]
pub fn key_fingerprint(key: &Key) -> String {
    let digest = Sha256::digest(key.signing());
    hex::encode(&digest[..FINGERPRINT_BYTES])
}

struct Toggles<'a, E> {
    env: &'a E,
    mode: BuildMode,
}

impl<E: Env> Toggles<'_, E> {
    /// Return `fallback` in debug builds, `error` otherwise.
    fn tolerate<T: std::fmt::Debug>(
        &self,
        fallback: T,
        error: SessionConfigError,
    ) -> Result<T, SessionConfigError> {
        match self.mode {
            BuildMode::Debug => {
                warn!(%error, ?fallback, "session setting replaced by default");
                Ok(fallback)
            }
            BuildMode::Release => Err(error),
        }
    }

    fn flag(&self, name: &'static str, fallback: bool) -> Result<bool, SessionConfigError> {
        let Some(value) = self.env.string(name) else {
            return self.tolerate(fallback, SessionConfigError::MissingEnv { name });
        };
        match parse_bool(&value) {
            Some(flag) => Ok(flag),
            None => self.tolerate(
                fallback,
                SessionConfigError::InvalidEnv {
                    name,
                    value,
                    expected: BOOL_EXPECTED,
                },
            ),
        }
    }

    fn same_site(&self, cookie_secure: bool) -> Result<SameSite, SessionConfigError> {
        let fallback = match self.mode {
            BuildMode::Debug => SameSite::Lax,
            BuildMode::Release => SameSite::Strict,
        };
        let Some(value) = self.env.string(SAMESITE_ENV) else {
            return self.tolerate(fallback, SessionConfigError::MissingEnv { name: SAMESITE_ENV });
        };
        match value.to_ascii_lowercase().as_str() {
            "lax" => Ok(SameSite::Lax),
            "strict" => Ok(SameSite::Strict),
            "none" if cookie_secure => Ok(SameSite::None),
            // Browsers drop insecure SameSite=None cookies.
            "none" => self.tolerate(SameSite::None, SessionConfigError::InsecureSameSiteNone),
            _ => self.tolerate(
                fallback,
                SessionConfigError::InvalidEnv {
                    name: SAMESITE_ENV,
                    value,
                    expected: SAMESITE_EXPECTED,
                },
            ),
        }
    }

    fn key(&self, allow_ephemeral: bool) -> Result<Key, SessionConfigError> {
        let path = PathBuf::from(
            self.env
                .string(KEY_FILE_ENV)
                .unwrap_or_else(|| DEFAULT_KEY_PATH.to_owned()),
        );
        let mut bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(source) if self.mode == BuildMode::Debug || allow_ephemeral => {
                warn!(path = %path.display(), error = %source, "using generated session key");
                return Ok(Key::generate());
            }
            Err(source) => return Err(SessionConfigError::KeyRead { path, source }),
        };

        let length = bytes.len();
        let result = if self.mode == BuildMode::Release && length < SESSION_KEY_MIN_LEN {
            Err(SessionConfigError::KeyTooShort {
                path,
                length,
                min_len: SESSION_KEY_MIN_LEN,
            })
        } else if length < KEY_DERIVE_MIN_LEN {
            warn!(path = %path.display(), length, "session key too short; using generated key");
            Ok(Key::generate())
        } else {
            Ok(Key::derive_from(&bytes))
        };
        bytes.zeroize();
        result
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}
