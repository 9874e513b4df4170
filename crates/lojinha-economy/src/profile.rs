use crate::EconomyError;

pub const MAX_NAME_CHARS: usize = 30;

/// Trimmed display name, 1 to 30 characters.
pub fn validate_name(name: &str) -> Result<String, EconomyError> {
    let trimmed = name.trim();
    let len = trimmed.chars().count();
    if len == 0 || len > MAX_NAME_CHARS {
        return Err(EconomyError::InvalidName { max: MAX_NAME_CHARS });
    }
    Ok(trimmed.to_string())
}

/// Name given to accounts created on first login.
pub fn default_name(normalized_number: &str) -> String {
    let tail_start = normalized_number.len().saturating_sub(4);
    format!("Player {}", &normalized_number[tail_start..])
}
