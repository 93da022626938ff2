//! Sponsor references and user lookups.
//!
//! A sponsor can be named either by wallet address or by the numeric user ID
//! the contract assigns at registration. [`SponsorRef::parse`] classifies the
//! raw input once; [`resolve_sponsor`] turns it into a registered address.

use std::fmt;

use alloy_primitives::Address;
use bigbang_chain_client::{BigBangChain, ChainClientError};
use bigbang_types::units::{is_hex_address, lower_hex, to_u64};
use bigbang_types::ZERO_ADDRESS;
use tracing::debug;

use crate::error::SponsorError;

/// Parsed sponsor input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SponsorRef {
    Address(Address),
    UserId(u64),
}

impl SponsorRef {
    /// Classify `input` without touching the chain.
    ///
    /// Surrounding whitespace is ignored. The zero address and the ID 0 are
    /// rejected here since the contract uses them as "no user" sentinels.
    pub fn parse(input: &str) -> Result<Self, SponsorError> {
        let trimmed = input.trim();

        if is_hex_address(trimmed) {
            let address: Address = trimmed
                .parse()
                .map_err(|_| SponsorError::UnrecognizedFormat(trimmed.to_string()))?;
            if address == ZERO_ADDRESS {
                return Err(SponsorError::InvalidSponsor);
            }
            return Ok(Self::Address(address));
        }

        if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return match trimmed.parse::<u64>() {
                Ok(id) if id > 0 => Ok(Self::UserId(id)),
                _ => Err(SponsorError::InvalidSponsorId(trimmed.to_string())),
            };
        }

        Err(SponsorError::UnrecognizedFormat(trimmed.to_string()))
    }
}

impl fmt::Display for SponsorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Address(address) => f.write_str(&lower_hex(address)),
            Self::UserId(id) => write!(f, "{id}"),
        }
    }
}

/// Resolve raw sponsor input into the address of a registered account.
pub async fn resolve_sponsor(chain: &dyn BigBangChain, input: &str) -> Result<Address, SponsorError> {
    let sponsor = SponsorRef::parse(input)?;
    debug!(sponsor = %sponsor, "Resolving sponsor");

    match sponsor {
        SponsorRef::Address(address) => {
            if chain.user_id(address).await?.is_zero() {
                return Err(SponsorError::SponsorNotRegistered(address));
            }
            Ok(address)
        }
        SponsorRef::UserId(id) => {
            let address = chain.user_by_id(id).await?;
            if address == ZERO_ADDRESS {
                return Err(SponsorError::SponsorNotFound(id));
            }
            Ok(address)
        }
    }
}

/// User ID of `address`, 0 when not registered.
pub async fn lookup_user_id(chain: &dyn BigBangChain, address: Address) -> Result<u64, SponsorError> {
    let raw = chain.user_id(address).await?;
    Ok(to_u64(raw).map_err(ChainClientError::from)?)
}

/// Wallet address registered under `user_id`.
pub async fn lookup_user_address(
    chain: &dyn BigBangChain,
    user_id: u64,
) -> Result<Address, SponsorError> {
    let address = chain.user_by_id(user_id).await?;
    if address == ZERO_ADDRESS {
        return Err(SponsorError::UserNotFound(user_id));
    }
    Ok(address)
}

pub async fn is_registered(chain: &dyn BigBangChain, address: Address) -> Result<bool, SponsorError> {
    Ok(chain.is_registered(address).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigbang_simulation::{fixtures::address, ChainCall, MockAccount, MockChain};

    #[test]
    fn test_parse_address_any_case() {
        let upper = format!("  0x{}  ", "AB".repeat(20));
        assert_eq!(
            SponsorRef::parse(&upper).unwrap(),
            SponsorRef::Address(Address::repeat_byte(0xab))
        );
        assert_eq!(
            SponsorRef::parse(&upper).unwrap().to_string(),
            format!("0x{}", "ab".repeat(20))
        );
    }

    #[test]
    fn test_parse_rejects_sentinels() {
        let zero = format!("0x{}", "0".repeat(40));
        assert!(matches!(SponsorRef::parse(&zero), Err(SponsorError::InvalidSponsor)));
        assert!(matches!(
            SponsorRef::parse("0"),
            Err(SponsorError::InvalidSponsorId(_))
        ));
        assert!(matches!(
            SponsorRef::parse("99999999999999999999999"),
            Err(SponsorError::InvalidSponsorId(_))
        ));
    }

    #[test]
    fn test_parse_user_id() {
        assert_eq!(SponsorRef::parse(" 42 ").unwrap(), SponsorRef::UserId(42));
    }

    #[test]
    fn test_parse_unrecognized() {
        for input in ["", "alice", "-5", "0x1234", "12a"] {
            assert!(
                matches!(SponsorRef::parse(input), Err(SponsorError::UnrecognizedFormat(_))),
                "{input:?} should be unrecognized"
            );
        }
    }

    #[tokio::test]
    async fn test_zero_address_makes_no_chain_call() {
        let chain = MockChain::new();
        let zero = format!("0x{}", "0".repeat(40));

        let result = resolve_sponsor(&chain, &zero).await;
        assert!(matches!(result, Err(SponsorError::InvalidSponsor)));
        assert!(chain.calls().is_empty());
    }

    #[tokio::test]
    async fn test_resolve_by_address() {
        let sponsor = address(3);
        let chain = MockChain::new().with_user(sponsor, MockAccount::new(12));

        let resolved = resolve_sponsor(&chain, &lower_hex(&sponsor)).await.unwrap();
        assert_eq!(resolved, sponsor);
        assert_eq!(chain.calls(), vec![ChainCall::UserId(sponsor)]);

        let stranger = lower_hex(&address(4));
        assert!(matches!(
            resolve_sponsor(&chain, &stranger).await,
            Err(SponsorError::SponsorNotRegistered(_))
        ));
    }

    #[tokio::test]
    async fn test_resolve_by_id() {
        let sponsor = address(3);
        let chain = MockChain::new().with_user(sponsor, MockAccount::new(12));

        assert_eq!(resolve_sponsor(&chain, "12").await.unwrap(), sponsor);
        assert!(matches!(
            resolve_sponsor(&chain, "13").await,
            Err(SponsorError::SponsorNotFound(13))
        ));
    }

    #[tokio::test]
    async fn test_lookups() {
        let user = address(5);
        let chain = MockChain::new().with_user(user, MockAccount::new(7));

        assert_eq!(lookup_user_id(&chain, user).await.unwrap(), 7);
        assert_eq!(lookup_user_id(&chain, address(6)).await.unwrap(), 0);
        assert_eq!(lookup_user_address(&chain, 7).await.unwrap(), user);
        assert!(matches!(
            lookup_user_address(&chain, 8).await,
            Err(SponsorError::UserNotFound(8))
        ));
        assert!(is_registered(&chain, user).await.unwrap());
    }
}
