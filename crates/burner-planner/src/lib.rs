//! Transfer planning: turn a transfer request into the calls to submit.
//!
//! - Zero fee: one `transfer(to, amount)` call
//! - Non-zero fee: `transfer(to, amount)` then `transfer(fee_recipient, fee)`,
//!   both against the same token contract, in that order

use alloy_sol_types::{sol, SolCall};
use burner_config::TokenDescriptor;
use burner_types::{Address, Bytes, Call, CallBundle, Result, TransferRequest, WalletError, U256};
use serde::{Deserialize, Serialize};

sol! {
    interface IERC20 {
        function transfer(address to, uint256 amount) external returns (bool);
    }
}

/// ABI-encode `transfer(to, amount)`.
pub fn encode_transfer(to: Address, amount: U256) -> Bytes {
    IERC20::transferCall { to, amount }.abi_encode().into()
}

/// Fee breakdown summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSummary {
    pub amount: U256,
    pub fee: U256,
    /// Amount plus fee; what leaves the account.
    pub total: U256,
}

/// Planned transfer operation.
#[derive(Debug, Clone)]
pub struct TransferPlan {
    pub token: TokenDescriptor,
    pub to: Address,
    pub fee_recipient: Address,
    pub bundle: CallBundle,
    pub fee_summary: FeeSummary,
}

impl TransferPlan {
    /// True when the fee leg forces a batched submission.
    pub fn is_batch(&self) -> bool {
        self.bundle.is_batch()
    }
}

/// Build the call bundle for `request` against `token`.
pub fn plan_transfer(
    token: &TokenDescriptor,
    request: &TransferRequest,
    fee_recipient: Address,
) -> Result<TransferPlan> {
    if token.token != request.token || token.network != request.network {
        return Err(WalletError::Other(format!(
            "descriptor {}/{} does not match request {}/{}",
            token.token, token.network, request.token, request.network
        )));
    }

    let total = request
        .amount
        .checked_add(request.fee)
        .ok_or_else(|| WalletError::InvalidAmount("amount plus fee overflows".into()))?;

    let mut bundle = CallBundle::single(Call::new(
        token.address,
        encode_transfer(request.to, request.amount),
    ));
    if request.has_fee() {
        bundle.push(Call::new(
            token.address,
            encode_transfer(fee_recipient, request.fee),
        ));
    }

    tracing::debug!(
        token = %token.token,
        network = %token.network,
        calls = bundle.len(),
        "planned transfer"
    );

    Ok(TransferPlan {
        token: token.clone(),
        to: request.to,
        fee_recipient,
        bundle,
        fee_summary: FeeSummary {
            amount: request.amount,
            fee: request.fee,
            total,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use burner_types::{address, Network, TokenId};

    const TOKEN: Address = address!("7F5c764cBc14f9669B88837ca1490cCa17c31607");
    const DEST: Address = address!("00000000000000000000000000000000000000d5");
    const FEE_TO: Address = address!("00000000000000000000000000000000000000fe");

    fn usdc() -> TokenDescriptor {
        TokenDescriptor {
            token: TokenId::Usdc,
            network: Network::Optimism,
            address: TOKEN,
            decimals: 6,
        }
    }

    fn request(amount: u64, fee: u64) -> TransferRequest {
        TransferRequest {
            token: TokenId::Usdc,
            network: Network::Optimism,
            to: DEST,
            amount: U256::from(amount),
            fee: U256::from(fee),
        }
    }

    fn decode(call: &Call) -> IERC20::transferCall {
        IERC20::transferCall::abi_decode(&call.data).unwrap()
    }

    #[test]
    fn test_encode_transfer_layout() {
        let data = encode_transfer(DEST, U256::from(100u64));
        assert_eq!(data.len(), 4 + 32 + 32);
        assert_eq!(&data[..4], &[0xa9, 0x05, 0x9c, 0xbb]);
        assert_eq!(&data[16..36], DEST.as_slice());
        assert_eq!(data[67], 100);
    }

    #[test]
    fn test_zero_fee_is_single_call() {
        let plan = plan_transfer(&usdc(), &request(100, 0), FEE_TO).unwrap();
        assert!(!plan.is_batch());
        assert_eq!(plan.bundle.len(), 1);

        let call = &plan.bundle.calls()[0];
        assert_eq!(call.target, TOKEN);
        assert_eq!(call.value, U256::ZERO);
        let decoded = decode(call);
        assert_eq!(decoded.to, DEST);
        assert_eq!(decoded.amount, U256::from(100u64));
        assert_eq!(plan.fee_summary.total, U256::from(100u64));
    }

    #[test]
    fn test_fee_is_second_call() {
        let plan = plan_transfer(&usdc(), &request(100, 5), FEE_TO).unwrap();
        assert!(plan.is_batch());
        assert_eq!(plan.bundle.targets(), vec![TOKEN, TOKEN]);

        let calls = plan.bundle.calls();
        let first = decode(&calls[0]);
        let second = decode(&calls[1]);
        assert_eq!((first.to, first.amount), (DEST, U256::from(100u64)));
        assert_eq!((second.to, second.amount), (FEE_TO, U256::from(5u64)));
        assert_eq!(plan.fee_summary.total, U256::from(105u64));
    }

    #[test]
    fn test_edge_amounts_are_allowed() {
        let zero = plan_transfer(&usdc(), &request(0, 0), FEE_TO).unwrap();
        assert_eq!(decode(&zero.bundle.calls()[0]).amount, U256::ZERO);

        let fee_equals_amount = plan_transfer(&usdc(), &request(5, 5), FEE_TO).unwrap();
        assert_eq!(fee_equals_amount.bundle.len(), 2);
    }

    #[test]
    fn test_destination_may_be_fee_recipient() {
        let mut req = request(10, 1);
        req.to = FEE_TO;
        let plan = plan_transfer(&usdc(), &req, FEE_TO).unwrap();
        let calls = plan.bundle.calls();
        assert_eq!(decode(&calls[0]).to, FEE_TO);
        assert_eq!(decode(&calls[1]).to, FEE_TO);
    }

    #[test]
    fn test_overflowing_total_is_rejected() {
        let mut req = request(0, 1);
        req.amount = U256::MAX;
        assert!(matches!(
            plan_transfer(&usdc(), &req, FEE_TO),
            Err(WalletError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_mismatched_descriptor_is_rejected() {
        let mut req = request(1, 0);
        req.network = Network::Ethereum;
        assert!(plan_transfer(&usdc(), &req, FEE_TO).is_err());
    }
}
