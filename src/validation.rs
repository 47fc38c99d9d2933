use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("input address [{0}] is invalid")]
    InvalidAddress(String),
}

/// Checks the canonical account format: `0x` followed by 40 hex characters.
pub fn validate_address(address: &str) -> Result<(), ValidationError> {
    let digits = match address.strip_prefix("0x") {
        Some(digits) => digits,
        None => return Err(ValidationError::InvalidAddress(address.to_string())),
    };

    // 20 bytes
    if digits.len() != 40 || hex::decode(digits).is_err() {
        return Err(ValidationError::InvalidAddress(address.to_string()));
    }

    Ok(())
}

/// Validates and lower-cases an address so it can be used as a store key.
pub fn normalize_address(address: &str) -> Result<String, ValidationError> {
    validate_address(address)?;
    Ok(address.to_ascii_lowercase())
}
