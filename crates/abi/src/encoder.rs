use alloy_primitives::U256;
use thk_primitives::keccak256;

use crate::{error::EncodeError, types::AbiType, value::AbiValue, WORD_SIZE};

fn word_from_usize(value: usize) -> [u8; 32] {
    U256::from(value).to_be_bytes::<32>()
}

/// Pad `bytes` on the right to a whole number of words.
fn push_padded(out: &mut Vec<u8>, bytes: &[u8]) {
    out.extend_from_slice(bytes);
    let rem = bytes.len() % WORD_SIZE;
    if rem != 0 {
        out.resize(out.len() + WORD_SIZE - rem, 0);
    }
}

fn head_len(value: &AbiValue) -> usize {
    if value.is_dynamic() {
        return WORD_SIZE;
    }
    match value {
        AbiValue::FixedArray(_, values) | AbiValue::Tuple(values) => values.iter().map(head_len).sum(),
        _ => WORD_SIZE,
    }
}

/// Head/tail block for an ordered sequence of values.
fn encode_sequence(values: &[AbiValue]) -> Vec<u8> {
    let head_size: usize = values.iter().map(head_len).sum();
    let mut head = Vec::with_capacity(head_size);
    let mut tail = Vec::new();
    for value in values {
        if value.is_dynamic() {
            head.extend_from_slice(&word_from_usize(head_size + tail.len()));
            tail.extend(encode_value(value));
        } else {
            head.extend(encode_value(value));
        }
    }
    head.extend(tail);
    head
}

fn encode_value(value: &AbiValue) -> Vec<u8> {
    match value {
        AbiValue::Bool(flag) => word_from_usize(usize::from(*flag)).to_vec(),
        AbiValue::Uint(number, _) => number.to_be_bytes::<32>().to_vec(),
        AbiValue::Int(number, _) => number.into_raw().to_be_bytes::<32>().to_vec(),
        AbiValue::Address(address) => {
            let mut word = vec![0u8; 12];
            word.extend_from_slice(address.as_bytes());
            word
        }
        AbiValue::FixedBytes(bytes) => {
            let mut out = Vec::with_capacity(WORD_SIZE);
            push_padded(&mut out, bytes);
            out
        }
        AbiValue::Bytes(bytes) => encode_blob(bytes),
        AbiValue::String(text) => encode_blob(text.as_bytes()),
        AbiValue::FixedArray(_, values) | AbiValue::Tuple(values) => encode_sequence(values),
        AbiValue::Array(_, values) => {
            let mut out = word_from_usize(values.len()).to_vec();
            out.extend(encode_sequence(values));
            out
        }
    }
}

fn encode_blob(bytes: &[u8]) -> Vec<u8> {
    let mut out = word_from_usize(bytes.len()).to_vec();
    push_padded(&mut out, bytes);
    out
}

/// Encode `values` as a head/tail block. The result length is always a
/// multiple of 32.
pub fn encode(values: &[AbiValue]) -> Result<Vec<u8>, EncodeError> {
    for value in values {
        value.validate()?;
    }
    Ok(encode_sequence(values))
}

/// Check that `values` match `types` one for one.
pub(crate) fn check_types(types: &[AbiType], values: &[AbiValue]) -> Result<(), EncodeError> {
    if types.len() != values.len() {
        return Err(EncodeError::ArityMismatch { expected: types.len(), actual: values.len() });
    }
    for (expected, value) in types.iter().zip(values) {
        let found = value.abi_type();
        if &found != expected {
            return Err(EncodeError::TypeMismatch {
                expected: expected.canonical(),
                found: found.canonical(),
            });
        }
    }
    Ok(())
}

/// `name(type1,type2,...)`
pub(crate) fn signature(name: &str, types: &[AbiType]) -> String {
    let parts: Vec<String> = types.iter().map(AbiType::canonical).collect();
    format!("{name}({})", parts.join(","))
}

/// First four bytes of the hash of a canonical signature.
pub(crate) fn selector(signature: &str) -> [u8; 4] {
    let digest = keccak256(signature.as_bytes());
    [digest[0], digest[1], digest[2], digest[3]]
}

/// Selector followed by the encoded arguments, as `0x` hex.
pub fn encode_function_call(
    name: &str,
    input_types: &[AbiType],
    values: &[AbiValue],
) -> Result<String, EncodeError> {
    check_types(input_types, values)?;
    let mut data = selector(&signature(name, input_types)).to_vec();
    data.extend(encode(values)?);
    Ok(format!("0x{}", hex::encode(data)))
}

/// Encoded constructor arguments as bare hex, ready to append to bytecode.
pub fn encode_constructor(values: &[AbiValue]) -> Result<String, EncodeError> {
    Ok(hex::encode(encode(values)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::I256;
    use thk_primitives::Address;

    fn words(data: &[u8]) -> Vec<String> {
        data.chunks(32).map(hex::encode).collect()
    }

    #[test]
    fn test_static_scalars() {
        let address: Address = "0x08d04fc4513e27854ac19f16b9b8cb8d564e2c68".parse().unwrap();
        let data = encode(&[
            AbiValue::Bool(true),
            AbiValue::Uint(U256::from(0x45u64), 8),
            AbiValue::Int(I256::MINUS_ONE, 256),
            AbiValue::Address(address),
            AbiValue::FixedBytes(b"abc".to_vec()),
        ])
        .unwrap();
        assert_eq!(
            words(&data),
            vec![
                format!("{:0>64}", "1"),
                format!("{:0>64}", "45"),
                "f".repeat(64),
                format!("{:0>64}", "08d04fc4513e27854ac19f16b9b8cb8d564e2c68"),
                format!("{:0<64}", "616263"),
            ]
        );
    }

    #[test]
    fn test_dynamic_string_offset() {
        // (uint256 69, string "dave")
        let data = encode(&[AbiValue::uint256(U256::from(69u64)), "dave".into()]).unwrap();
        assert_eq!(
            words(&data),
            vec![
                format!("{:0>64}", "45"),
                format!("{:0>64}", "40"),
                format!("{:0>64}", "4"),
                format!("{:0<64}", "64617665"),
            ]
        );
    }

    #[test]
    fn test_dynamic_array_of_strings() {
        let value = AbiValue::Array(AbiType::String, vec!["one".into(), "two".into()]);
        let data = encode(&[value]).unwrap();
        assert_eq!(
            words(&data),
            vec![
                format!("{:0>64}", "20"),
                format!("{:0>64}", "2"),
                format!("{:0>64}", "40"),
                format!("{:0>64}", "80"),
                format!("{:0>64}", "3"),
                format!("{:0<64}", "6f6e65"),
                format!("{:0>64}", "3"),
                format!("{:0<64}", "74776f"),
            ]
        );
    }

    #[test]
    fn test_static_tuple_is_inline() {
        let value = AbiValue::Tuple(vec![AbiValue::uint256(U256::from(1u64)), AbiValue::Bool(false)]);
        let data = encode(&[value, AbiValue::uint256(U256::from(2u64))]).unwrap();
        assert_eq!(data.len(), 96);
        assert_eq!(data[95], 2);
    }

    #[test]
    fn test_empty_values() {
        assert_eq!(encode(&[]).unwrap(), Vec::<u8>::new());
        let data = encode(&["".into(), AbiValue::Array(AbiType::Bool, vec![])]).unwrap();
        assert_eq!(
            words(&data),
            vec![
                format!("{:0>64}", "40"),
                format!("{:0>64}", "60"),
                format!("{:0>64}", "0"),
                format!("{:0>64}", "0"),
            ]
        );
    }

    #[test]
    fn test_function_call_selector() {
        let types = [AbiType::Address, AbiType::Uint(256)];
        let to: Address = "0x5dfcfc6f4b48f93213dad643a50228ff873c15b9".parse().unwrap();
        let a = encode_function_call("transfer", &types, &[to.into(), AbiValue::uint256(U256::from(1u64))]).unwrap();
        let b = encode_function_call("transfer", &types, &[Address::ZERO.into(), AbiValue::uint256(U256::from(9u64))])
            .unwrap();
        assert!(a.starts_with("0xa9059cbb"));
        assert_eq!(&a[..10], &b[..10]);
        assert_eq!(a.len(), 2 + 8 + 128);
    }

    #[test]
    fn test_function_call_rejects_mismatch() {
        let err = encode_function_call("f", &[AbiType::Uint(256)], &[AbiValue::Bool(true)]).unwrap_err();
        assert_eq!(err, EncodeError::TypeMismatch { expected: "uint256".into(), found: "bool".into() });
        let err = encode_function_call("f", &[AbiType::Uint(256)], &[]).unwrap_err();
        assert_eq!(err, EncodeError::ArityMismatch { expected: 1, actual: 0 });
    }

    #[test]
    fn test_constructor_has_no_selector() {
        let hex = encode_constructor(&[AbiValue::uint256(U256::from(1u64))]).unwrap();
        assert_eq!(hex, format!("{:0>64}", "1"));
    }
}
