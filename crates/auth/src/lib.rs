//! Session authentication for the AgriSense API
//!
//! Provides the signed session-token codec, header/cookie session
//! extraction, role and admin guards as axum extractors that work with
//! any state implementing `FromRef<S>` for `SessionAuth`, and the
//! root-admin bootstrap routine.

mod backend;
mod bootstrap;
mod claims;
mod codec;
mod config;
mod error;
mod extractors;
mod resolver;
mod session;
mod store;
mod types;

pub use backend::{SessionAuth, ELEVATED_ROLES};
pub use bootstrap::ensure_root_admin;
pub use claims::SessionPayload;
pub use codec::{SessionCodec, TOKEN_VERSION};
pub use config::{AuthConfig, RootAdminConfig, DEFAULT_COOKIE_NAME, MIN_SESSION_TTL_SECONDS};
pub use error::AuthError;
pub use extractors::{AdminUser, ElevatedUser, SessionClaims};
pub use resolver::{IdentityResolver, RevalidateAgainstStore, TrustTokenClaims};
pub use session::{expired_session_cookie, session_cookie, session_from_headers};
pub use store::{MemoryUserStore, NewUser, UserRecord, UserStore};
pub use types::{AuthIdentity, Plan, Role, RoleChange};
