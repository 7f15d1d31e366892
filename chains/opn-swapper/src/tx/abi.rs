use anyhow::{Context, Result};
use ethers::abi::Abi;
use ethers::contract::BaseContract;

pub const ROUTER_ABI: &str = r#"[
    {"inputs":[{"name":"amountIn","type":"uint256"},{"name":"amountOutMin","type":"uint256"},{"name":"path","type":"address[]"},{"name":"to","type":"address"},{"name":"deadline","type":"uint256"}],"name":"swapExactTokensForTokens","outputs":[{"name":"amounts","type":"uint256[]"}],"stateMutability":"nonpayable","type":"function"},
    {"inputs":[{"name":"amountIn","type":"uint256"},{"name":"path","type":"address[]"}],"name":"getAmountsOut","outputs":[{"name":"amounts","type":"uint256[]"}],"stateMutability":"view","type":"function"}
]"#;

/// ERC-20 subset plus the wrapped-native deposit/withdraw pair.
pub const ERC20_ABI: &str = r#"[
    {"constant":true,"inputs":[{"name":"_owner","type":"address"}],"name":"balanceOf","outputs":[{"name":"balance","type":"uint256"}],"type":"function"},
    {"constant":false,"inputs":[{"name":"_spender","type":"address"},{"name":"_value","type":"uint256"}],"name":"approve","outputs":[{"name":"","type":"bool"}],"type":"function"},
    {"constant":true,"inputs":[{"name":"_owner","type":"address"},{"name":"_spender","type":"address"}],"name":"allowance","outputs":[{"name":"","type":"uint256"}],"type":"function"},
    {"constant":false,"inputs":[],"name":"deposit","outputs":[],"stateMutability":"payable","type":"function"},
    {"constant":false,"inputs":[{"name":"wad","type":"uint256"}],"name":"withdraw","outputs":[],"type":"function"}
]"#;

pub fn router_contract() -> Result<BaseContract> {
    let abi: Abi = serde_json::from_str(ROUTER_ABI).context("Invalid router ABI")?;
    Ok(BaseContract::from(abi))
}

pub fn erc20_contract() -> Result<BaseContract> {
    let abi: Abi = serde_json::from_str(ERC20_ABI).context("Invalid ERC-20 ABI")?;
    Ok(BaseContract::from(abi))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_selectors() {
        let router = router_contract().unwrap();
        let erc20 = erc20_contract().unwrap();

        let selector = |c: &BaseContract, name: &str| c.abi().function(name).unwrap().short_signature();

        assert_eq!(selector(&router, "swapExactTokensForTokens"), [0x38, 0xed, 0x17, 0x39]);
        assert_eq!(selector(&router, "getAmountsOut"), [0xd0, 0x6c, 0xa6, 0x1f]);
        assert_eq!(selector(&erc20, "balanceOf"), [0x70, 0xa0, 0x82, 0x31]);
        assert_eq!(selector(&erc20, "approve"), [0x09, 0x5e, 0xa7, 0xb3]);
        assert_eq!(selector(&erc20, "allowance"), [0xdd, 0x62, 0xed, 0x3e]);
        assert_eq!(selector(&erc20, "withdraw"), [0x2e, 0x1a, 0x7d, 0x4d]);
    }
}
