//! Flow error types.

use outpass_core::error::OutpassError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FlowError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("passwords do not match")]
    PasswordMismatch,

    #[error("password must be at least {min} characters")]
    PasswordTooShort { min: usize },

    #[error("a role must be selected first")]
    RoleNotSelected,

    #[error("profile details do not match the selected role")]
    RoleFieldsMismatch,

    #[error("not available at this step (expected {expected})")]
    WrongStep { expected: &'static str },

    #[error("cannot go back from this step")]
    CannotGoBack,

    #[error("verification code does not match")]
    CodeMismatch,

    #[error("verification code has expired")]
    CodeExpired,

    #[error("too many wrong attempts, request a new code")]
    TooManyAttempts,

    #[error("a child is already linked to this account")]
    AlreadyLinked,

    #[error("account is registered under a different role")]
    RoleMismatch,

    #[error("account has not been approved yet")]
    AccountNotApproved,

    #[error("only students may perform this action")]
    NotAStudent,

    #[error("only parents may perform this action")]
    NotAParent,

    #[error("only wardens and administrators may decide requests")]
    NotAnApprover,

    #[error("not allowed to view the request queue")]
    NotQueueViewer,

    #[error("only administrators may perform this action")]
    NotAnAdmin,
}

impl From<FlowError> for OutpassError {
    fn from(err: FlowError) -> Self {
        match err {
            FlowError::MissingField(_)
            | FlowError::PasswordMismatch
            | FlowError::PasswordTooShort { .. }
            | FlowError::RoleNotSelected
            | FlowError::RoleFieldsMismatch
            | FlowError::WrongStep { .. }
            | FlowError::CannotGoBack
            | FlowError::CodeMismatch
            | FlowError::CodeExpired
            | FlowError::TooManyAttempts => OutpassError::Validation {
                message: err.to_string(),
            },
            FlowError::AlreadyLinked
            | FlowError::RoleMismatch
            | FlowError::AccountNotApproved
            | FlowError::NotAStudent
            | FlowError::NotAParent
            | FlowError::NotAnApprover
            | FlowError::NotQueueViewer
            | FlowError::NotAnAdmin => OutpassError::AuthorizationDenied {
                reason: err.to_string(),
            },
        }
    }
}
