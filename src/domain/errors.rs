#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    ConsentRequired,
    MissingRequiredField(String),
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DomainError::ConsentRequired => {
                write!(f, "Consent is required before submitting")
            }
            DomainError::MissingRequiredField(label) => {
                write!(f, "{} is required", label)
            }
        }
    }
}

impl std::error::Error for DomainError {}

pub type DomainResult<T> = Result<T, DomainError>;
