//! Slot extraction from caller text.

/// Slot holding a patient account number.
pub const ACCOUNT_ID: &str = "account_id";
/// Slot holding the first dollar amount the caller mentioned.
pub const AMOUNT: &str = "amount";

const MIN_ACCOUNT_DIGITS: usize = 5;
/// Words after "account" searched for the number.
const ACCOUNT_LOOKAHEAD: usize = 3;

/// Pull known slots out of one caller utterance.
pub fn extract_slots(text: &str) -> Vec<(&'static str, String)> {
    let mut slots = Vec::new();
    let tokens: Vec<&str> = text.split_whitespace().collect();

    if let Some(account) = account_number(&tokens) {
        slots.push((ACCOUNT_ID, account));
    }
    if let Some(amount) = dollar_amount(&tokens) {
        slots.push((AMOUNT, amount));
    }
    slots
}

fn account_number(tokens: &[&str]) -> Option<String> {
    let position = tokens
        .iter()
        .position(|t| t.to_lowercase().starts_with("account"))?;
    tokens
        .iter()
        .skip(position + 1)
        .take(ACCOUNT_LOOKAHEAD)
        .map(|t| t.trim_matches(|c: char| !c.is_ascii_alphanumeric()))
        .find(|t| t.len() >= MIN_ACCOUNT_DIGITS && t.chars().all(|c| c.is_ascii_digit()))
        .map(str::to_string)
}

fn dollar_amount(tokens: &[&str]) -> Option<String> {
    tokens.iter().find_map(|t| {
        let rest = t.strip_prefix('$')?;
        let digits = rest.trim_end_matches(|c: char| !c.is_ascii_digit());
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit() || c == ',' || c == '.') {
            return None;
        }
        Some(format!("${}", digits))
    })
}
