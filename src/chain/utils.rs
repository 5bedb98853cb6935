use alloy::primitives::utils::format_units;
use alloy::primitives::U256;

/// Format a raw token amount with `decimals`, trimming trailing zeros
/// (`1500000000000000000` with 18 decimals becomes `1.5`).
pub fn format_token_amount(amount: U256, decimals: u8) -> String {
    match format_units(amount, decimals) {
        Ok(formatted) => trim_fraction(&formatted),
        Err(_) => amount.to_string(),
    }
}

fn trim_fraction(formatted: &str) -> String {
    if !formatted.contains('.') {
        return formatted.to_string();
    }
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

// Shorten address for display
pub fn shorten_address(address: &str) -> String {
    if address.len() <= 12 {
        return address.to_string();
    }

    format!("{}...{}", &address[..6], &address[address.len() - 4..])
}
