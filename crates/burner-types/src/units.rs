//! Conversion between user-entered decimal amounts and smallest token units.

use alloy_primitives::utils::{self, ParseUnits};
use alloy_primitives::U256;

use crate::{Result, WalletError};

/// Parse a decimal string ("12.5") into smallest units for a token with `decimals`.
pub fn parse_units(amount: &str, decimals: u8) -> Result<U256> {
    let amount = amount.trim();
    if amount.is_empty() {
        return Err(WalletError::InvalidAmount("empty amount".into()));
    }
    match utils::parse_units(amount, decimals) {
        Ok(ParseUnits::U256(value)) => Ok(value),
        Ok(ParseUnits::I256(_)) => Err(WalletError::InvalidAmount(format!(
            "amount must not be negative: {amount}"
        ))),
        Err(e) => Err(WalletError::InvalidAmount(format!("{amount}: {e}"))),
    }
}

/// Render smallest units as a decimal string with trailing zeros trimmed.
pub fn format_units(amount: U256, decimals: u8) -> Result<String> {
    let formatted = utils::format_units(amount, decimals)
        .map_err(|e| WalletError::InvalidAmount(e.to_string()))?;
    if !formatted.contains('.') {
        return Ok(formatted);
    }
    let trimmed = formatted.trim_end_matches('0');
    Ok(match trimmed.strip_suffix('.') {
        Some(whole) => format!("{whole}.0"),
        None => trimmed.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_units_usdc() {
        assert_eq!(parse_units("1", 6).unwrap(), U256::from(1_000_000u64));
        assert_eq!(parse_units("0.05", 6).unwrap(), U256::from(50_000u64));
        assert_eq!(parse_units(" 12.5 ", 6).unwrap(), U256::from(12_500_000u64));
        assert_eq!(parse_units("0", 6).unwrap(), U256::ZERO);
    }

    #[test]
    fn test_parse_units_rejects_bad_input() {
        assert!(parse_units("", 6).is_err());
        assert!(parse_units("abc", 6).is_err());
        assert!(parse_units("-1", 6).is_err());
    }

    #[test]
    fn test_format_units() {
        assert_eq!(format_units(U256::from(1_500_000u64), 6).unwrap(), "1.5");
        assert_eq!(format_units(U256::from(2_000_000u64), 6).unwrap(), "2.0");
        assert_eq!(format_units(U256::ZERO, 18).unwrap(), "0.0");
    }
}
