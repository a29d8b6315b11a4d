use serde::Deserialize;

use crate::{
    decoder::{decode, decode_hex},
    encoder::{check_types, encode, selector, signature},
    error::{DecodeError, EncodeError},
    types::AbiType,
    value::AbiValue,
};

/// A named, typed parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Param {
    /// Parameter name, may be empty
    pub name: String,
    /// Resolved type
    pub kind: AbiType,
    /// Event parameters only: stored in a topic
    pub indexed: bool,
    /// Source-level type name, e.g. `struct Store.Item`
    pub internal_type: Option<String>,
    /// Named tuple components, empty for non-tuple types
    pub components: Vec<Param>,
}

impl Param {
    /// Unnamed parameter of the given type.
    pub const fn new(kind: AbiType) -> Self {
        Self { name: String::new(), kind, indexed: false, internal_type: None, components: Vec::new() }
    }

    /// Named parameter of the given type.
    pub fn named(name: impl Into<String>, kind: AbiType) -> Self {
        Self { name: name.into(), ..Self::new(kind) }
    }

    /// Mark as an indexed event parameter.
    pub fn indexed(mut self) -> Self {
        self.indexed = true;
        self
    }
}

/// Function state mutability.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateMutability {
    /// Reads nothing
    Pure,
    /// Reads state
    View,
    /// Writes state
    #[default]
    NonPayable,
    /// Writes state and accepts value
    Payable,
}

impl StateMutability {
    /// Pure and view functions can be served by a read-only call.
    pub const fn is_constant(self) -> bool {
        matches!(self, Self::Pure | Self::View)
    }
}

/// A contract function.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Function {
    /// Function name
    pub name: String,
    /// Input parameters
    pub inputs: Vec<Param>,
    /// Output parameters
    pub outputs: Vec<Param>,
    /// Declared mutability
    pub state_mutability: StateMutability,
}

impl Function {
    /// Function with unnamed inputs and outputs.
    pub fn new(name: impl Into<String>, inputs: Vec<AbiType>, outputs: Vec<AbiType>) -> Self {
        Self {
            name: name.into(),
            inputs: inputs.into_iter().map(Param::new).collect(),
            outputs: outputs.into_iter().map(Param::new).collect(),
            state_mutability: StateMutability::default(),
        }
    }

    /// Input types in order.
    pub fn input_types(&self) -> Vec<AbiType> {
        self.inputs.iter().map(|p| p.kind.clone()).collect()
    }

    /// Output types in order.
    pub fn output_types(&self) -> Vec<AbiType> {
        self.outputs.iter().map(|p| p.kind.clone()).collect()
    }

    /// `name(type1,type2,...)`
    pub fn signature(&self) -> String {
        signature(&self.name, &self.input_types())
    }

    /// First four bytes of the signature hash.
    pub fn selector(&self) -> [u8; 4] {
        selector(&self.signature())
    }

    /// Selector followed by the encoded arguments.
    pub fn encode_call(&self, values: &[AbiValue]) -> Result<Vec<u8>, EncodeError> {
        check_types(&self.input_types(), values)?;
        let mut data = self.selector().to_vec();
        data.extend(encode(values)?);
        Ok(data)
    }

    /// Decode return data. An empty payload yields no values.
    pub fn decode_output(&self, data: &[u8]) -> Result<Vec<AbiValue>, DecodeError> {
        if data.is_empty() {
            return Ok(Vec::new());
        }
        decode(data, &self.output_types())
    }

    /// Decode hex return data as produced by a call.
    pub fn decode_output_hex(&self, data: &str) -> Result<Vec<AbiValue>, DecodeError> {
        decode_hex(data, &self.output_types())
    }
}
