//! Typed contract bindings
//!
//! Only the functions this tool actually calls: the ERC-20 read subset
//! and the hygiene log interface.

use alloy::sol;

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    contract Erc20 {
        function allowance(address owner, address spender) external view returns (uint256);
        function symbol() external view returns (string);
        function decimals() external view returns (uint8);
    }

    #[allow(missing_docs)]
    #[sol(rpc)]
    contract HygieneLog {
        function hasCleanedOnce(address user) external view returns (bool);
        function lastCleanedAt(address user) external view returns (uint256);
        function markCleaned() external;
    }
}
