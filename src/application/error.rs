use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Profile not found: {0}")]
    ProfileNotFound(String),

    #[error("Profile already exists: {0}")]
    ProfileAlreadyExists(String),

    #[error("Category not found: {0}")]
    CategoryNotFound(String),

    #[error("Category already exists: {0}")]
    CategoryAlreadyExists(String),

    #[error("Expense not found: {0}")]
    ExpenseNotFound(String),

    #[error("Settlement not found: {0}")]
    SettlementNotFound(String),

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Group size must be at least 2, got {0}")]
    InvalidGroupSize(u32),

    #[error("A repayment needs two distinct members; record a pay-down instead")]
    RepaymentToSelf,

    #[error("An account with this email already exists: {0}")]
    EmailTaken(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Not signed in (no valid session)")]
    NotSignedIn,

    #[error("Password hashing failed: {0}")]
    PasswordHash(String),

    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
}
