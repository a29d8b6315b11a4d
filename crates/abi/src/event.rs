use thk_primitives::{keccak256, Hash};

use crate::{
    decoder::decode,
    encoder::{encode, signature},
    error::{DecodeError, EncodeError},
    function::Param,
    types::AbiType,
    value::AbiValue,
    WORD_SIZE,
};

/// A contract event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Event {
    /// Event name
    pub name: String,
    /// Parameters in declaration order
    pub inputs: Vec<Param>,
    /// Anonymous events have no signature topic
    pub anonymous: bool,
}

/// Values decoded from one log entry, split by where they were stored.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EventValues {
    /// Values taken from topics, in declaration order
    pub indexed: Vec<AbiValue>,
    /// Values taken from the data section, in declaration order
    pub non_indexed: Vec<AbiValue>,
}

impl Event {
    /// Event with the given parameters.
    pub fn new(name: impl Into<String>, inputs: Vec<Param>) -> Self {
        Self { name: name.into(), inputs, anonymous: false }
    }

    /// `Name(type1,type2,...)`
    pub fn signature(&self) -> String {
        let types: Vec<AbiType> = self.inputs.iter().map(|p| p.kind.clone()).collect();
        signature(&self.name, &types)
    }

    /// Hash of the signature, the first topic of every non-anonymous log.
    pub fn signature_topic(&self) -> Hash {
        keccak256(self.signature().as_bytes())
    }

    /// `0x`-prefixed hex of [`Event::signature_topic`].
    pub fn signature_topic_hex(&self) -> String {
        format!("0x{}", hex::encode(self.signature_topic()))
    }

    /// Decode a log. Returns `None` when the log belongs to another event.
    ///
    /// Indexed dynamic or composite parameters are stored as a hash and come
    /// back as an opaque `bytes32`.
    pub fn decode_log(
        &self,
        topics: &[Hash],
        data: &[u8],
    ) -> Result<Option<EventValues>, DecodeError> {
        let indexed_topics = if self.anonymous {
            topics
        } else {
            match topics.split_first() {
                Some((first, rest)) if *first == self.signature_topic() => rest,
                _ => return Ok(None),
            }
        };

        let indexed_params: Vec<&Param> = self.inputs.iter().filter(|p| p.indexed).collect();
        if indexed_params.len() != indexed_topics.len() {
            return Ok(None);
        }

        let mut indexed = Vec::with_capacity(indexed_params.len());
        for (param, topic) in indexed_params.iter().zip(indexed_topics) {
            if param.kind.is_dynamic() || param.kind.head_size() != WORD_SIZE {
                indexed.push(AbiValue::bytes32(*topic));
            } else {
                let mut values = decode(topic, std::slice::from_ref(&param.kind))?;
                indexed.extend(values.pop());
            }
        }

        let data_types: Vec<AbiType> =
            self.inputs.iter().filter(|p| !p.indexed).map(|p| p.kind.clone()).collect();
        let non_indexed = decode(data, &data_types)?;

        Ok(Some(EventValues { indexed, non_indexed }))
    }
}

/// Topic used to filter logs on an indexed value.
pub fn encode_topic(value: &AbiValue) -> Result<Hash, EncodeError> {
    value.validate()?;
    match value {
        AbiValue::String(text) => Ok(keccak256(text.as_bytes())),
        AbiValue::Bytes(bytes) => Ok(keccak256(bytes)),
        _ => {
            let encoded = encode(std::slice::from_ref(value))?;
            if encoded.len() == WORD_SIZE && !value.is_dynamic() {
                let mut topic = [0u8; 32];
                topic.copy_from_slice(&encoded);
                Ok(topic)
            } else {
                Ok(keccak256(&encoded))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::U256;
    use thk_primitives::Address;

    fn transfer_event() -> Event {
        Event::new(
            "Transfer",
            vec![
                Param::named("from", AbiType::Address).indexed(),
                Param::named("to", AbiType::Address).indexed(),
                Param::named("value", AbiType::Uint(256)),
            ],
        )
    }

    #[test]
    fn test_signature_topic() {
        assert_eq!(
            transfer_event().signature_topic_hex(),
            "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"
        );
    }

    #[test]
    fn test_decode_log() {
        let event = transfer_event();
        let from: Address = "0xf167a1c5c5fab6bddca66118216817af3fa86827".parse().unwrap();
        let to: Address = "0x5dfcfc6f4b48f93213dad643a50228ff873c15b9".parse().unwrap();
        let topics = vec![
            event.signature_topic(),
            encode_topic(&from.into()).unwrap(),
            encode_topic(&to.into()).unwrap(),
        ];
        let data = encode(&[AbiValue::uint256(U256::from(1000u64))]).unwrap();

        let values = event.decode_log(&topics, &data).unwrap().unwrap();
        assert_eq!(values.indexed, vec![AbiValue::Address(from), AbiValue::Address(to)]);
        assert_eq!(values.non_indexed[0].as_uint(), Some(U256::from(1000u64)));
    }

    #[test]
    fn test_decode_log_other_event() {
        let event = transfer_event();
        let topics = vec![keccak256(b"Approval(address,address,uint256)"), [0u8; 32], [0u8; 32]];
        assert_eq!(event.decode_log(&topics, &[]).unwrap(), None);
        assert_eq!(event.decode_log(&[], &[]).unwrap(), None);
    }

    #[test]
    fn test_indexed_string_is_opaque() {
        let event = Event::new("Named", vec![Param::named("name", AbiType::String).indexed()]);
        let hashed = encode_topic(&"alice".into()).unwrap();
        assert_eq!(hashed, keccak256(b"alice"));

        let values = event.decode_log(&[event.signature_topic(), hashed], &[]).unwrap().unwrap();
        assert_eq!(values.indexed, vec![AbiValue::FixedBytes(hashed.to_vec())]);
        assert!(values.non_indexed.is_empty());
    }

    #[test]
    fn test_anonymous_event() {
        let mut event = Event::new("Ping", vec![Param::named("id", AbiType::Uint(64)).indexed()]);
        event.anonymous = true;
        let topic = encode_topic(&AbiValue::Uint(U256::from(3u64), 64)).unwrap();
        let values = event.decode_log(&[topic], &[]).unwrap().unwrap();
        assert_eq!(values.indexed, vec![AbiValue::Uint(U256::from(3u64), 64)]);
    }
}
