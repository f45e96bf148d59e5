//! ERC-4337 v0.6 user operation and its hash.

use alloy_primitives::keccak256;
use alloy_sol_types::SolValue;
use burner_account::SmartAccount;
use burner_types::{Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};

use crate::rpc::deserialize_quantity;

/// A user operation as accepted by `eth_sendUserOperation` (EntryPoint v0.6).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserOperation {
    pub sender: Address,
    pub nonce: U256,
    pub init_code: Bytes,
    pub call_data: Bytes,
    pub call_gas_limit: U256,
    pub verification_gas_limit: U256,
    pub pre_verification_gas: U256,
    pub max_fee_per_gas: U256,
    pub max_priority_fee_per_gas: U256,
    pub paymaster_and_data: Bytes,
    pub signature: Bytes,
}

impl UserOperation {
    /// Unsigned operation for `account` with zeroed gas fields and a placeholder
    /// signature, ready for estimation.
    pub fn new(account: &SmartAccount, call_data: Bytes) -> Self {
        Self {
            sender: account.address,
            nonce: account.nonce,
            init_code: account.init_code.clone(),
            call_data,
            call_gas_limit: U256::ZERO,
            verification_gas_limit: U256::ZERO,
            pre_verification_gas: U256::ZERO,
            max_fee_per_gas: U256::ZERO,
            max_priority_fee_per_gas: U256::ZERO,
            paymaster_and_data: Bytes::new(),
            signature: dummy_signature(),
        }
    }

    /// ABI encoding of every field except the signature, with dynamic fields hashed.
    pub fn pack(&self) -> Vec<u8> {
        (
            self.sender,
            self.nonce,
            keccak256(&self.init_code),
            keccak256(&self.call_data),
            self.call_gas_limit,
            self.verification_gas_limit,
            self.pre_verification_gas,
            self.max_fee_per_gas,
            self.max_priority_fee_per_gas,
            keccak256(&self.paymaster_and_data),
        )
            .abi_encode()
    }

    /// The hash the owner signs, bound to an entry point and chain.
    pub fn hash(&self, entry_point: Address, chain_id: u64) -> B256 {
        keccak256((keccak256(self.pack()), entry_point, U256::from(chain_id)).abi_encode())
    }

    pub fn apply_gas(&mut self, gas: &GasEstimate) {
        self.call_gas_limit = gas.call_gas_limit;
        self.verification_gas_limit = gas.verification_gas_limit;
        self.pre_verification_gas = gas.pre_verification_gas;
    }
}

/// Well-formed but invalid 65-byte signature used during gas estimation.
pub fn dummy_signature() -> Bytes {
    let mut sig = vec![0xff; 32];
    sig.extend_from_slice(&[0x7a; 32]);
    sig.push(0x1c);
    sig.into()
}

/// Result of `eth_estimateUserOperationGas`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GasEstimate {
    #[serde(deserialize_with = "deserialize_quantity")]
    pub pre_verification_gas: U256,
    #[serde(deserialize_with = "deserialize_quantity")]
    pub verification_gas_limit: U256,
    #[serde(deserialize_with = "deserialize_quantity")]
    pub call_gas_limit: U256,
}

/// Result of `pm_sponsorUserOperation`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sponsorship {
    pub paymaster_and_data: Bytes,
    #[serde(flatten)]
    pub gas: GasEstimate,
}

/// Result of `eth_getUserOperationReceipt` once the operation is mined.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserOperationReceipt {
    pub user_op_hash: B256,
    pub success: bool,
    #[serde(default)]
    pub reason: Option<String>,
    pub receipt: TransactionReceipt,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: B256,
}

#[cfg(test)]
mod tests {
    use super::*;
    use burner_account::StaticSigner;
    use burner_types::address;
    use serde_json::json;
    use std::sync::Arc;

    const ENTRY_POINT: Address = address!("5FF137D4b0FDCD49DcA30c7CF57E578a026d2789");

    fn op() -> UserOperation {
        let account = SmartAccount {
            address: address!("00000000000000000000000000000000000000aa"),
            owner: address!("00000000000000000000000000000000000000bb"),
            chain_id: 10,
            nonce: U256::from(3u64),
            init_code: Bytes::new(),
            signer: Arc::new(StaticSigner::new(Address::ZERO)),
        };
        UserOperation::new(&account, Bytes::from(vec![0xde, 0xad]))
    }

    #[test]
    fn test_pack_is_ten_words() {
        assert_eq!(op().pack().len(), 10 * 32);
    }

    #[test]
    fn test_hash_ignores_signature() {
        let a = op();
        let mut b = op();
        b.signature = Bytes::from(vec![1u8; 65]);
        assert_eq!(a.hash(ENTRY_POINT, 10), b.hash(ENTRY_POINT, 10));
    }

    #[test]
    fn test_hash_binds_chain_entry_point_and_fields() {
        let base = op().hash(ENTRY_POINT, 10);
        assert_ne!(base, op().hash(ENTRY_POINT, 420));
        assert_ne!(base, op().hash(Address::ZERO, 10));

        let mut changed = op();
        changed.call_gas_limit = U256::from(1u64);
        assert_ne!(base, changed.hash(ENTRY_POINT, 10));
    }

    #[test]
    fn test_serializes_camel_case_hex() {
        let value = serde_json::to_value(op()).unwrap();
        assert_eq!(value["nonce"], json!("0x3"));
        assert_eq!(value["callData"], json!("0xdead"));
        assert_eq!(value["initCode"], json!("0x"));
        assert_eq!(value["signature"].as_str().unwrap().len(), 2 + 130);
    }

    #[test]
    fn test_sponsorship_accepts_mixed_quantities() {
        let sponsorship: Sponsorship = serde_json::from_value(json!({
            "paymasterAndData": "0x1234",
            "preVerificationGas": "0xb000",
            "verificationGasLimit": 100000,
            "callGasLimit": "0x11170"
        }))
        .unwrap();
        assert_eq!(sponsorship.paymaster_and_data, Bytes::from(vec![0x12, 0x34]));
        assert_eq!(sponsorship.gas.pre_verification_gas, U256::from(0xb000u64));
        assert_eq!(sponsorship.gas.verification_gas_limit, U256::from(100_000u64));
        assert_eq!(sponsorship.gas.call_gas_limit, U256::from(0x11170u64));
    }
}
