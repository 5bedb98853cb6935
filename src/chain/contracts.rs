use alloy::primitives::{Address, Bytes, U256};
use alloy::sol;
use alloy::sol_types::SolCall;

sol! {
    interface IERC20 {
        function approve(address spender, uint256 amount) external returns (bool);
        function balanceOf(address account) external view returns (uint256);
    }

    interface ITokenFarm {
        function stakeTokens(uint256 amount, address token) external;
    }
}

/// A state-changing call against a deployed contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractCall {
    pub contract: Address,
    pub function: &'static str,
    pub data: Bytes,
}

impl ContractCall {
    /// `token.approve(spender, amount)`
    pub fn approve(token: Address, spender: Address, amount: U256) -> Self {
        let call = IERC20::approveCall { spender, amount };

        Self {
            contract: token,
            function: "approve",
            data: call.abi_encode().into(),
        }
    }

    /// `farm.stakeTokens(amount, token)`
    pub fn stake_tokens(farm: Address, token: Address, amount: U256) -> Self {
        let call = ITokenFarm::stakeTokensCall { amount, token };

        Self {
            contract: farm,
            function: "stakeTokens",
            data: call.abi_encode().into(),
        }
    }
}

pub fn balance_of_calldata(account: Address) -> Bytes {
    IERC20::balanceOfCall { account }.abi_encode().into()
}
