//! Login, registration, and the per-login user session

use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::api::{ApiError, ApplicationApi, Credentials, Registration, User, UserId};
use crate::notify::NotificationLog;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Password do not match")]
    PasswordMismatch,
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// A logged-in user. Lives from a successful login until logout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSession {
    /// Client-side id used to correlate log lines for one login.
    pub id: Uuid,
    pub user: User,
}

impl UserSession {
    pub fn new(user: User) -> Self {
        Self {
            id: Uuid::new_v4(),
            user,
        }
    }

    pub fn user_id(&self) -> &UserId {
        &self.user.user_id
    }

    pub fn display_name(&self) -> &str {
        self.user
            .name
            .as_deref()
            .or(self.user.email.as_deref())
            .unwrap_or_else(|| self.user.user_id.as_str())
    }
}

/// Registration form input, including the confirmation field.
#[derive(Debug, Clone)]
pub struct RegistrationForm {
    pub email: String,
    pub name: String,
    pub password: String,
    pub confirm: String,
}

#[instrument(skip_all, fields(email = %credentials.email))]
pub async fn login<A: ApplicationApi>(
    api: &A,
    credentials: &Credentials,
    notifications: &mut NotificationLog,
) -> Result<UserSession, ApiError> {
    match api.login(credentials).await {
        Ok(user) => {
            let session = UserSession::new(user);
            info!(session = %session.id, user = %session.user_id(), "Logged in");
            notifications.success("Logged in successfully!", "Have a great day!");
            Ok(session)
        }
        Err(err) => {
            warn!(error = %err, "Login failed");
            notifications.failure(&err);
            Err(err)
        }
    }
}

#[instrument(skip_all, fields(email = %form.email))]
pub async fn register<A: ApplicationApi>(
    api: &A,
    form: &RegistrationForm,
    notifications: &mut NotificationLog,
) -> Result<(), AuthError> {
    if form.password != form.confirm {
        warn!("Passwords do not match");
        notifications.error(AuthError::PasswordMismatch.to_string(), None);
        return Err(AuthError::PasswordMismatch);
    }

    let registration = Registration {
        email: form.email.clone(),
        name: form.name.clone(),
        password: form.password.clone(),
    };

    match api.register(&registration).await {
        Ok(()) => {
            info!("Account registered");
            notifications.success("Account registered!", "Login with your account now!");
            Ok(())
        }
        Err(err) => {
            warn!(error = %err, "Registration failed");
            notifications.failure(&err);
            Err(err.into())
        }
    }
}
