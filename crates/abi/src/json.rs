use serde::Deserialize;

use crate::{
    encoder::{check_types, encode_constructor},
    error::{AbiParseError, EncodeError},
    event::Event,
    function::{Function, Param, StateMutability},
    types::AbiType,
    value::AbiValue,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonParam {
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    indexed: bool,
    #[serde(default)]
    components: Vec<JsonParam>,
    #[serde(default)]
    internal_type: Option<String>,
}

fn default_entry_type() -> String {
    "function".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonEntry {
    #[serde(rename = "type", default = "default_entry_type")]
    kind: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    inputs: Vec<JsonParam>,
    #[serde(default)]
    outputs: Vec<JsonParam>,
    #[serde(default)]
    anonymous: bool,
    #[serde(default)]
    state_mutability: Option<StateMutability>,
    // pre-0.5 compilers emit these instead of stateMutability
    #[serde(default)]
    constant: bool,
    #[serde(default)]
    payable: bool,
}

impl JsonEntry {
    fn mutability(&self) -> StateMutability {
        match self.state_mutability {
            Some(mutability) => mutability,
            None if self.constant => StateMutability::View,
            None if self.payable => StateMutability::Payable,
            None => StateMutability::NonPayable,
        }
    }
}

fn resolve(param: &JsonParam) -> Result<Param, EncodeError> {
    let components = param.components.iter().map(resolve).collect::<Result<Vec<_>, _>>()?;
    let kind = match param.kind.strip_prefix("tuple") {
        Some(dims) => {
            let tuple = AbiType::Tuple(components.iter().map(|c| c.kind.clone()).collect());
            AbiType::parse(&format!("{}{dims}", tuple.canonical()))?
        }
        None => AbiType::parse(&param.kind)?,
    };
    Ok(Param {
        name: param.name.clone(),
        kind,
        indexed: param.indexed,
        internal_type: param.internal_type.clone().filter(|t| !t.is_empty()),
        components,
    })
}

fn resolve_all(params: &[JsonParam]) -> Result<Vec<Param>, EncodeError> {
    params.iter().map(resolve).collect()
}

/// Contract constructor.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Constructor {
    /// Constructor arguments
    pub inputs: Vec<Param>,
    /// Declared mutability
    pub state_mutability: StateMutability,
}

impl Constructor {
    /// Encode constructor arguments as bare hex for appending to bytecode.
    pub fn encode_args(&self, values: &[AbiValue]) -> Result<String, EncodeError> {
        let types: Vec<AbiType> = self.inputs.iter().map(|p| p.kind.clone()).collect();
        check_types(&types, values)?;
        encode_constructor(values)
    }
}

/// A parsed contract interface description.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContractAbi {
    /// Constructor, if declared
    pub constructor: Option<Constructor>,
    /// Functions in declaration order
    pub functions: Vec<Function>,
    /// Events in declaration order
    pub events: Vec<Event>,
}

impl ContractAbi {
    /// Parse the JSON array emitted by the compiler. Fallback, receive and
    /// error entries are skipped.
    pub fn from_json(json: &str) -> Result<Self, AbiParseError> {
        let entries: Vec<JsonEntry> = serde_json::from_str(json)?;
        let mut abi = Self::default();
        for entry in &entries {
            match entry.kind.as_str() {
                "function" => abi.functions.push(Function {
                    name: entry.name.clone(),
                    inputs: resolve_all(&entry.inputs)?,
                    outputs: resolve_all(&entry.outputs)?,
                    state_mutability: entry.mutability(),
                }),
                "constructor" => {
                    abi.constructor = Some(Constructor {
                        inputs: resolve_all(&entry.inputs)?,
                        state_mutability: entry.mutability(),
                    });
                }
                "event" => abi.events.push(Event {
                    name: entry.name.clone(),
                    inputs: resolve_all(&entry.inputs)?,
                    anonymous: entry.anonymous,
                }),
                _ => {}
            }
        }
        Ok(abi)
    }

    /// First function called `name`.
    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name == name)
    }

    /// All overloads called `name`.
    pub fn functions_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Function> + 'a {
        self.functions.iter().filter(move |f| f.name == name)
    }

    /// First event called `name`.
    pub fn event(&self, name: &str) -> Option<&Event> {
        self.events.iter().find(|e| e.name == name)
    }
}

#[cfg(test)]
pub(crate) const STORE_ABI: &str = r#"[
    {"type":"constructor","inputs":[{"name":"owner","type":"address","internalType":"address"}],"stateMutability":"nonpayable"},
    {"type":"function","name":"put","stateMutability":"nonpayable",
     "inputs":[{"name":"item","type":"tuple","internalType":"struct Store.Item",
                "components":[{"name":"id","type":"uint256","internalType":"uint256"},
                              {"name":"tags","type":"tuple[]","internalType":"struct Store.Tag[]",
                               "components":[{"name":"key","type":"string","internalType":"string"},
                                             {"name":"weight","type":"uint8","internalType":"uint8"}]}]}],
     "outputs":[]},
    {"type":"function","name":"count","constant":true,"inputs":[],"outputs":[{"name":"","type":"uint256"}]},
    {"type":"event","name":"Put","anonymous":false,
     "inputs":[{"name":"id","type":"uint256","indexed":true},{"name":"note","type":"string","indexed":false}]},
    {"type":"fallback"}
]"#;
