use std::collections::HashSet;

use crate::{function::Param, json::ContractAbi, types::AbiType};

/// A tuple type used somewhere in a contract interface.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StructDef {
    /// Name from `internalType`, or `StructN`
    pub name: String,
    /// The tuple type itself, without array dimensions
    pub kind: AbiType,
    /// Named fields, in order
    pub fields: Vec<Param>,
}

impl StructDef {
    /// Canonical component list, e.g. `(uint256,string)`. Two structs with
    /// the same identifier are the same ABI type.
    pub fn identifier(&self) -> String {
        self.kind.canonical()
    }
}

/// Distinct tuple types of a contract, innermost first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StructRegistry {
    structs: Vec<StructDef>,
}

/// `struct Store.Tag[]` gives `Tag`. Anything not declared as a struct, such
/// as a bare `tuple`, has no name.
fn struct_name(internal_type: &str) -> Option<&str> {
    let declared = internal_type.trim().strip_prefix("struct ")?;
    let without_dims = declared.split('[').next().unwrap_or(declared).trim();
    let name = without_dims.rsplit('.').next().unwrap_or(without_dims);
    (!name.is_empty()).then_some(name)
}

fn collect<'a>(param: &'a Param, seen: &mut HashSet<String>, found: &mut Vec<&'a Param>) {
    if matches!(param.kind.base(), AbiType::Tuple(_)) && seen.insert(param.kind.base().canonical()) {
        found.push(param);
    }
    for component in &param.components {
        collect(component, seen, found);
    }
}

impl StructRegistry {
    /// Extract every tuple type from the constructor, functions and events.
    pub fn from_abi(abi: &ContractAbi) -> Self {
        let params = abi
            .constructor
            .iter()
            .flat_map(|c| c.inputs.iter())
            .chain(abi.functions.iter().flat_map(|f| f.inputs.iter().chain(f.outputs.iter())))
            .chain(abi.events.iter().flat_map(|e| e.inputs.iter()));

        let mut seen = HashSet::new();
        let mut found = Vec::new();
        for param in params {
            collect(param, &mut seen, &mut found);
        }
        found.sort_by_key(|param| param.kind.nesting_depth());

        let structs = found
            .into_iter()
            .enumerate()
            .map(|(index, param)| StructDef {
                name: param
                    .internal_type
                    .as_deref()
                    .and_then(struct_name)
                    .map_or_else(|| format!("Struct{index}"), str::to_string),
                kind: param.kind.base().clone(),
                fields: param.components.clone(),
            })
            .collect();
        Self { structs }
    }

    /// All structs, innermost first.
    pub fn structs(&self) -> &[StructDef] {
        &self.structs
    }

    /// Struct for a tuple type, array dimensions are ignored.
    pub fn get(&self, kind: &AbiType) -> Option<&StructDef> {
        let base = kind.base();
        self.structs.iter().find(|s| &s.kind == base)
    }

    /// Number of distinct structs.
    pub fn len(&self) -> usize {
        self.structs.len()
    }

    /// True if the interface uses no tuples.
    pub fn is_empty(&self) -> bool {
        self.structs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{function::Function, json::STORE_ABI};

    #[test]
    fn test_innermost_first_with_names() {
        let abi = ContractAbi::from_json(STORE_ABI).unwrap();
        let registry = StructRegistry::from_abi(&abi);
        let names: Vec<&str> = registry.structs().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Tag", "Item"]);
        assert_eq!(registry.structs()[0].identifier(), "(string,uint8)");
        assert_eq!(registry.structs()[1].fields[1].name, "tags");

        let tags: AbiType = "(string,uint8)[]".parse().unwrap();
        assert_eq!(registry.get(&tags).unwrap().name, "Tag");
    }

    #[test]
    fn test_identity_ignores_field_names() {
        let point = |x: &str, y: &str| Param {
            components: vec![Param::named(x, AbiType::Int(64)), Param::named(y, AbiType::Int(64))],
            ..Param::new("(int64,int64)".parse().unwrap())
        };
        let mut abi = ContractAbi::default();
        let mut f = Function::new("move", vec![], vec![]);
        f.inputs = vec![point("x", "y"), point("lat", "lon")];
        abi.functions.push(f);

        let registry = StructRegistry::from_abi(&abi);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.structs()[0].name, "Struct0");
        assert_eq!(registry.structs()[0].fields[0].name, "x");
    }

    #[test]
    fn test_struct_name() {
        assert_eq!(struct_name("struct Store.Tag[]"), Some("Tag"));
        assert_eq!(struct_name("struct Item"), Some("Item"));
        assert_eq!(struct_name(""), None);
        assert_eq!(struct_name("tuple"), None);
        assert_eq!(struct_name("tuple[]"), None);
        assert_eq!(struct_name("struct "), None);
    }

    #[test]
    fn test_plain_tuple_internal_type_falls_back() {
        let mut param = Param::new("(uint256,bool)".parse().unwrap());
        param.components = vec![Param::named("amount", AbiType::Uint(256)), Param::named("ok", AbiType::Bool)];
        param.internal_type = Some("tuple[]".to_string());
        let mut abi = ContractAbi::default();
        let mut f = Function::new("settle", vec![], vec![]);
        f.inputs = vec![param];
        abi.functions.push(f);

        let registry = StructRegistry::from_abi(&abi);
        assert_eq!(registry.structs()[0].name, "Struct0");
    }
}
