//! Claim-link codec.
//!
//! A claim link carries the coordinates of a peanut deposit in its query string:
//! - `c`: chain id (decimal)
//! - `v`: contract version
//! - `p`: password
//! - `i`: deposit index (decimal)
//!
//! Decoding never fails on a well-formed URL. A missing or non-numeric `c`
//! becomes chain id 0, which callers must treat as "unspecified". A missing or
//! non-numeric `i` becomes an absent index, never index 0.

use burner_types::{Result, WalletError};
use serde::{Deserialize, Serialize};
use url::Url;

/// Query parameters of a claim link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimParam {
    Network,
    Version,
    Password,
    DepositIndex,
}

impl ClaimParam {
    /// Encoding order.
    pub const ALL: [ClaimParam; 4] = [
        ClaimParam::Network,
        ClaimParam::Version,
        ClaimParam::Password,
        ClaimParam::DepositIndex,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            ClaimParam::Network => "c",
            ClaimParam::Version => "v",
            ClaimParam::Password => "p",
            ClaimParam::DepositIndex => "i",
        }
    }

    fn is_claim_key(key: &str) -> bool {
        Self::ALL.iter().any(|p| p.key() == key)
    }
}

/// Coordinates needed to claim a deposit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimDescriptor {
    /// 0 means unspecified.
    pub chain_id: u64,
    pub contract_version: Option<String>,
    pub deposit_index: Option<u64>,
    pub password: Option<String>,
}

impl ClaimDescriptor {
    pub fn has_chain(&self) -> bool {
        self.chain_id != 0
    }
}

/// Append the descriptor's parameters to `base`, omitting absent ones.
///
/// Claim parameters already present on `base` are replaced. Chain id 0 is
/// treated as absent.
pub fn encode(base: &Url, descriptor: &ClaimDescriptor) -> Url {
    let mut pairs: Vec<(String, String)> = base
        .query_pairs()
        .filter(|(k, _)| !ClaimParam::is_claim_key(k))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    for param in ClaimParam::ALL {
        let value = match param {
            ClaimParam::Network => descriptor.has_chain().then(|| descriptor.chain_id.to_string()),
            ClaimParam::Version => descriptor.contract_version.clone(),
            ClaimParam::Password => descriptor.password.clone(),
            ClaimParam::DepositIndex => descriptor.deposit_index.map(|i| i.to_string()),
        };
        if let Some(value) = value {
            pairs.push((param.key().to_string(), value));
        }
    }

    let mut url = base.clone();
    url.set_query(None);
    if !pairs.is_empty() {
        url.query_pairs_mut().extend_pairs(pairs);
    }
    url
}

/// Read the claim parameters out of an arbitrary URL.
pub fn decode(url: &Url) -> ClaimDescriptor {
    let first = |param: ClaimParam| {
        url.query_pairs()
            .find(|(k, _)| k == param.key())
            .map(|(_, v)| v.into_owned())
    };

    let chain_id = first(ClaimParam::Network)
        .filter(|v| !v.is_empty())
        .map(|v| parse_leading_int(&v).unwrap_or(0))
        .unwrap_or(0);

    let deposit_index = first(ClaimParam::DepositIndex)
        .filter(|v| !v.is_empty())
        .and_then(|v| parse_leading_int(&v));

    ClaimDescriptor {
        chain_id,
        contract_version: first(ClaimParam::Version),
        deposit_index,
        password: first(ClaimParam::Password),
    }
}

/// Parse a link string, then decode it. Fails only when `link` is not an absolute URL.
pub fn decode_str(link: &str) -> Result<ClaimDescriptor> {
    let url = Url::parse(link.trim())
        .map_err(|e| WalletError::InvalidLink(format!("{link}: {e}")))?;
    Ok(decode(&url))
}

/// Integer prefix of `raw`: optional leading whitespace and `+`, then decimal
/// digits up to the first non-digit. `None` when there are no digits, the value
/// does not fit, or the value is `0x`-prefixed hex.
fn parse_leading_int(raw: &str) -> Option<u64> {
    let s = raw.trim_start();
    let s = s.strip_prefix('+').unwrap_or(s);
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    let (digits, rest) = s.split_at(end);
    if digits == "0" && rest.starts_with(['x', 'X']) {
        return None;
    }
    digits.parse().ok()
}

/// Codec bound to the wallet's claim page.
///
/// The claim page doubles as the "current location" when decoding without an
/// explicit link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimLinkCodec {
    base: Url,
}

impl ClaimLinkCodec {
    pub fn new(base: Url) -> Self {
        Self { base }
    }

    pub fn parse(base: &str) -> Result<Self> {
        let base = Url::parse(base.trim())
            .map_err(|e| WalletError::InvalidLink(format!("{base}: {e}")))?;
        Ok(Self::new(base))
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn encode(&self, descriptor: &ClaimDescriptor) -> Url {
        encode(&self.base, descriptor)
    }

    /// Decode `link`, or the codec's own location when `link` is `None`.
    pub fn decode(&self, link: Option<&str>) -> Result<ClaimDescriptor> {
        match link {
            Some(link) => decode_str(link),
            None => Ok(decode(&self.base)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://wallet.example.org/claim").unwrap()
    }

    #[test]
    fn test_decode_vectors_from_json() {
        let data = include_str!("../../../tests/vectors/claim_links.json");
        let vectors: Vec<serde_json::Value> = serde_json::from_str(data).unwrap();

        for v in &vectors {
            let link = v["link"].as_str().unwrap();
            let expected: ClaimDescriptor = serde_json::from_value(v["expected"].clone()).unwrap();
            let decoded = decode_str(link).unwrap();
            assert_eq!(
                decoded,
                expected,
                "decode mismatch for '{}'",
                v["name"].as_str().unwrap()
            );
        }
    }

    #[test]
    fn test_missing_and_non_numeric_index_are_absent() {
        let missing = decode_str("https://wallet.example.org/claim?c=10").unwrap();
        assert_eq!(missing.deposit_index, None);

        let garbage = decode_str("https://wallet.example.org/claim?c=10&i=abc").unwrap();
        assert_eq!(garbage.deposit_index, None);

        let no_chain = decode_str("https://wallet.example.org/claim?i=1").unwrap();
        assert_eq!(no_chain.chain_id, 0);
        assert!(!no_chain.has_chain());
    }

    #[test]
    fn test_encode_full_descriptor() {
        let d = ClaimDescriptor {
            chain_id: 10,
            contract_version: Some("v3".into()),
            deposit_index: Some(42),
            password: Some("s3cr3t".into()),
        };
        let url = encode(&base(), &d);
        assert_eq!(
            url.as_str(),
            "https://wallet.example.org/claim?c=10&v=v3&p=s3cr3t&i=42"
        );
    }

    #[test]
    fn test_encode_omits_absent_fields() {
        let d = ClaimDescriptor {
            chain_id: 0,
            contract_version: None,
            deposit_index: Some(0),
            password: None,
        };
        assert_eq!(
            encode(&base(), &d).as_str(),
            "https://wallet.example.org/claim?i=0"
        );
        assert_eq!(
            encode(&base(), &ClaimDescriptor::default()).as_str(),
            "https://wallet.example.org/claim"
        );
    }

    #[test]
    fn test_encode_replaces_existing_claim_params() {
        let base = Url::parse("https://wallet.example.org/claim?ref=abc&c=1&i=9").unwrap();
        let d = ClaimDescriptor {
            chain_id: 420,
            deposit_index: Some(3),
            ..ClaimDescriptor::default()
        };
        let url = encode(&base, &d);
        assert_eq!(
            url.as_str(),
            "https://wallet.example.org/claim?ref=abc&c=420&i=3"
        );
        assert_eq!(decode(&url), d);
    }

    #[test]
    fn test_roundtrip_with_awkward_passwords() {
        let passwords = ["plain", "with space", "a+b=c&d", "ünïcødé/?#", ""];
        for password in passwords {
            let d = ClaimDescriptor {
                chain_id: 84531,
                contract_version: Some("v4.2".into()),
                deposit_index: Some(u64::MAX),
                password: Some(password.to_string()),
            };
            assert_eq!(decode(&encode(&base(), &d)), d, "password {password:?}");
        }
    }

    #[test]
    fn test_parse_leading_int() {
        assert_eq!(parse_leading_int("42"), Some(42));
        assert_eq!(parse_leading_int("  7"), Some(7));
        assert_eq!(parse_leading_int("+5"), Some(5));
        assert_eq!(parse_leading_int("12abc"), Some(12));
        assert_eq!(parse_leading_int("abc"), None);
        assert_eq!(parse_leading_int("-3"), None);
        assert_eq!(parse_leading_int(""), None);
        assert_eq!(parse_leading_int("99999999999999999999999"), None);
        assert_eq!(parse_leading_int("0x10"), None);
        assert_eq!(parse_leading_int("0X0a"), None);
        assert_eq!(parse_leading_int("0"), Some(0));
        assert_eq!(parse_leading_int("0abc"), Some(0));
    }

    #[test]
    fn test_codec_decodes_own_location_by_default() {
        let codec = ClaimLinkCodec::parse("https://wallet.example.org/claim?c=1&i=2").unwrap();
        let d = codec.decode(None).unwrap();
        assert_eq!(d.chain_id, 1);
        assert_eq!(d.deposit_index, Some(2));

        let other = codec
            .decode(Some("https://elsewhere.example.org/?c=10"))
            .unwrap();
        assert_eq!(other.chain_id, 10);
    }

    #[test]
    fn test_decode_str_rejects_non_urls() {
        assert!(matches!(
            decode_str("c=10&i=2"),
            Err(WalletError::InvalidLink(_))
        ));
    }
}
