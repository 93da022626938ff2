//! Solidity bindings for the BigBang contract surface consumed by the client.

use alloy_primitives::{Address, Bytes};
use alloy_sol_types::{sol, SolCall};

sol! {
    /// Read and registration entry points of the deployed BigBang contract.
    interface IBigBang {
        struct TeamMember {
            address walletAddress;
            uint256 incomeEarned;
            uint256 registrationTime;
        }

        struct OrbitIncome {
            string coin;
            uint256 amount;
            uint256 usd;
            uint256 level;
            uint256 timestamp;
        }

        function getUserId(address user) external view returns (uint256);
        function getUserById(uint256 userId) external view returns (address);
        function isRegistered(address user) external view returns (bool);
        function registrationTime(address user) external view returns (uint256);
        function upline(address user) external view returns (address);
        function getTotalEarnings(address user) external view returns (uint256);
        function getCurrentOrbitX(address user) external view returns (uint256);
        function getOrbitCount(address user) external view returns (uint256);
        function getRepurchaseCount(address user) external view returns (uint256);
        function getJoinAmountInRAMA() external view returns (uint256);
        function getFullOrbitIncome(address user, uint256 orbitId) external view returns (OrbitIncome[] memory);
        function getTeamAtLevel(address user, uint256 level) external view returns (TeamMember[] memory);
        function registerAndActivate(address sponsor) external payable;
    }
}

/// Calldata for `registerAndActivate(sponsor)`.
///
/// The join amount travels as the transaction value, not as an argument.
pub fn register_and_activate_calldata(sponsor: Address) -> Bytes {
    Bytes::from(IBigBang::registerAndActivateCall { sponsor }.abi_encode())
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::U256;

    #[test]
    fn test_register_calldata_layout() {
        let sponsor = Address::repeat_byte(0x42);
        let data = register_and_activate_calldata(sponsor);

        // selector + one left-padded address word
        assert_eq!(data.len(), 4 + 32);
        assert_eq!(&data[..4], &IBigBang::registerAndActivateCall::SELECTOR);
        assert_eq!(&data[4..16], &[0u8; 12]);
        assert_eq!(&data[16..36], sponsor.as_slice());
    }

    #[test]
    fn test_team_call_encodes_both_arguments() {
        let call = IBigBang::getTeamAtLevelCall {
            user: Address::repeat_byte(0x01),
            level: U256::from(3u64),
        };
        let data = call.abi_encode();
        assert_eq!(data.len(), 4 + 64);
        assert_eq!(data[4 + 63], 3);
    }

    #[test]
    fn test_selectors_are_distinct() {
        assert_ne!(
            IBigBang::getUserIdCall::SELECTOR,
            IBigBang::getUserByIdCall::SELECTOR
        );
        assert_ne!(
            IBigBang::getOrbitCountCall::SELECTOR,
            IBigBang::getCurrentOrbitXCall::SELECTOR
        );
    }
}
