use crate::EconomyError;

const COUNTRY_CODE: &str = "55";

/// Shortest national part (area code + subscriber) we accept.
const MIN_NATIONAL_DIGITS: usize = 8;

/// Canonical form of a WhatsApp number: digits only, a single leading `55`.
///
/// Users type numbers with or without the country code, sometimes twice
/// (`+55 55 11 9...`), so repeated prefixes collapse into one.
pub fn normalize_number(input: &str) -> Result<String, EconomyError> {
    let digits: String = input.chars().filter(|c| c.is_ascii_digit()).collect();

    let mut national = digits.as_str();
    while let Some(rest) = national.strip_prefix(COUNTRY_CODE) {
        national = rest;
    }

    if national.len() < MIN_NATIONAL_DIGITS {
        return Err(EconomyError::InvalidNumber(input.to_string()));
    }

    Ok(format!("{COUNTRY_CODE}{national}"))
}

/// The bot builds the JID itself and expects the number without `55`.
pub fn number_for_bot(normalized: &str) -> &str {
    normalized.strip_prefix(COUNTRY_CODE).unwrap_or(normalized)
}

/// WhatsApp group JID for a configured notification group id.
pub fn group_jid(group: &str) -> String {
    let trimmed = group.trim();
    if trimmed.ends_with("@g.us") {
        return trimmed.to_string();
    }
    let digits: String = trimmed.chars().filter(|c| c.is_ascii_digit()).collect();
    format!("{digits}@g.us")
}
