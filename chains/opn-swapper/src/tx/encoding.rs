use anyhow::Result;
use ethers::abi::{self, Token, Tokenize};
use ethers::contract::BaseContract;
use ethers::types::{Address, Bytes, U256};

/// Router entry points that are not in its published ABI, called by selector.
pub const SWAP_NATIVE_FOR_TOKENS: [u8; 4] = [0xa2, 0x4f, 0xef, 0xef];
pub const SWAP_TOKENS_FOR_NATIVE: [u8; 4] = [0xe0, 0xf4, 0x4d, 0xf2];

/// Calldata for a contract call, either from a known ABI function or from a
/// bare selector with ABI-encoded arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum CallEncoding {
    Standard { function: &'static str, data: Bytes },
    RawSelector { selector: [u8; 4], args: Vec<Token> },
}

impl CallEncoding {
    pub fn standard<T: Tokenize>(
        contract: &BaseContract,
        function: &'static str,
        args: T,
    ) -> Result<Self> {
        let data = contract.encode(function, args)?;
        Ok(CallEncoding::Standard { function, data })
    }

    pub fn calldata(&self) -> Bytes {
        match self {
            CallEncoding::Standard { data, .. } => data.clone(),
            CallEncoding::RawSelector { selector, args } => {
                let mut data = selector.to_vec();
                data.extend(abi::encode(args));
                Bytes::from(data)
            }
        }
    }

    pub fn selector(&self) -> [u8; 4] {
        match self {
            CallEncoding::Standard { data, .. } => {
                let mut selector = [0u8; 4];
                let len = data.len().min(4);
                selector[..len].copy_from_slice(&data[..len]);
                selector
            }
            CallEncoding::RawSelector { selector, .. } => *selector,
        }
    }

    pub fn label(&self) -> String {
        match self {
            CallEncoding::Standard { function, .. } => function.to_string(),
            CallEncoding::RawSelector { selector, .. } => format!("0x{}", hex::encode(selector)),
        }
    }
}

fn path_token(path: &[Address]) -> Token {
    Token::Array(path.iter().copied().map(Token::Address).collect())
}

/// `(uint256 amountOutMin, address[] path, address to, uint256 deadline)`,
/// native value attached by the caller.
pub fn swap_native_for_tokens(
    amount_out_min: U256,
    path: &[Address],
    to: Address,
    deadline: U256,
) -> CallEncoding {
    CallEncoding::RawSelector {
        selector: SWAP_NATIVE_FOR_TOKENS,
        args: vec![
            Token::Uint(amount_out_min),
            path_token(path),
            Token::Address(to),
            Token::Uint(deadline),
        ],
    }
}

/// `(uint256 amountIn, uint256 amountOutMin, address[] path, address to, uint256 deadline)`
pub fn swap_tokens_for_native(
    amount_in: U256,
    amount_out_min: U256,
    path: &[Address],
    to: Address,
    deadline: U256,
) -> CallEncoding {
    CallEncoding::RawSelector {
        selector: SWAP_TOKENS_FOR_NATIVE,
        args: vec![
            Token::Uint(amount_in),
            Token::Uint(amount_out_min),
            path_token(path),
            Token::Address(to),
            Token::Uint(deadline),
        ],
    }
}

pub fn swap_exact_tokens_for_tokens(
    router: &BaseContract,
    amount_in: U256,
    amount_out_min: U256,
    path: &[Address],
    to: Address,
    deadline: U256,
) -> Result<CallEncoding> {
    CallEncoding::standard(
        router,
        "swapExactTokensForTokens",
        (amount_in, amount_out_min, path.to_vec(), to, deadline),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tx::abi::router_contract;

    #[test]
    fn test_raw_selector_matches_standard_layout() {
        // Same argument layout as swapExactTokensForTokens, different selector.
        let router = router_contract().unwrap();
        let path = vec![Address::repeat_byte(1), Address::repeat_byte(2)];
        let to = Address::repeat_byte(3);

        let raw = swap_tokens_for_native(U256::from(10), U256::from(9), &path, to, U256::from(99));
        let standard = swap_exact_tokens_for_tokens(
            &router,
            U256::from(10),
            U256::from(9),
            &path,
            to,
            U256::from(99),
        )
        .unwrap();

        let raw_data = raw.calldata();
        let std_data = standard.calldata();
        assert_eq!(&raw_data[..4], &SWAP_TOKENS_FOR_NATIVE);
        assert_eq!(&std_data[..4], &[0x38, 0xed, 0x17, 0x39]);
        assert_eq!(&raw_data[4..], &std_data[4..]);
    }

    #[test]
    fn test_native_swap_encoding() {
        let path = vec![Address::repeat_byte(1), Address::repeat_byte(2)];
        let call = swap_native_for_tokens(U256::from(5), &path, Address::repeat_byte(3), U256::from(7));
        let data = call.calldata();

        assert_eq!(call.selector(), SWAP_NATIVE_FOR_TOKENS);
        assert_eq!(call.label(), "0xa24fefef");
        // selector + 4 head words + array length + 2 elements
        assert_eq!(data.len(), 4 + 32 * 7);
        let decoded = abi::decode(
            &[
                abi::ParamType::Uint(256),
                abi::ParamType::Array(Box::new(abi::ParamType::Address)),
                abi::ParamType::Address,
                abi::ParamType::Uint(256),
            ],
            &data[4..],
        )
        .unwrap();
        assert_eq!(decoded[0], Token::Uint(U256::from(5)));
        assert_eq!(decoded[3], Token::Uint(U256::from(7)));
    }
}
