use thiserror::Error;

/// Why a press was refused. Messages are shown to clients verbatim.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PressError {
    #[error("Unknown user. Are you using the correct link to the button?")]
    UnknownUser { user_id: String },

    #[error("The button has expired! cheers :)")]
    ButtonExpired,

    #[error("You can't press the button twice in a row. Please wait for someone else to press the button.")]
    PressedTwiceInARow,

    #[error("You must wait 15s between button presses.")]
    PressedTooSoon,

    #[error("Storage error: {message}")]
    Storage { message: String },
}

impl PressError {
    pub fn unknown_user(user_id: impl Into<String>) -> Self {
        Self::UnknownUser {
            user_id: user_id.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Rejections caused by the request itself, as opposed to infrastructure failures.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, Self::Storage { .. })
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("User not found: {user_id}")]
    NotFound { user_id: String },
}

impl DirectoryError {
    pub fn not_found(user_id: impl Into<String>) -> Self {
        Self::NotFound {
            user_id: user_id.into(),
        }
    }
}
