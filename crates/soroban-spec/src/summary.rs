//! Human-readable summaries of decoded spec entries.
//!
//! The decoder treats entries as opaque; this module is the one place that
//! looks inside them, to render names and signatures for display and JSON
//! output. It performs no semantic validation.

use serde::Serialize;
use stellar_xdr::curr::{ScSpecEntry, ScSpecTypeDef, ScSpecUdtUnionCaseV0, StringM};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpecEntrySummary {
    /// `function`, `struct`, `union`, `enum`, `error_enum`, or the raw variant name.
    pub kind: String,
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub doc: String,
    /// Parameters, fields or cases, one rendered line each.
    pub members: Vec<String>,
    /// Rendered return types, for functions.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub outputs: Vec<String>,
}

impl SpecEntrySummary {
    /// One-line rendering, e.g. `fn transfer(from: address, amount: i128) -> void`.
    pub fn signature(&self) -> String {
        match self.kind.as_str() {
            "function" => {
                let ret = match self.outputs.as_slice() {
                    [] => "void".to_string(),
                    [one] => one.clone(),
                    many => format!("({})", many.join(", ")),
                };
                format!("fn {}({}) -> {}", self.name, self.members.join(", "), ret)
            }
            kind => format!("{} {} {{ {} }}", kind, self.name, self.members.join(", ")),
        }
    }
}

pub fn summarize_all<'a>(entries: impl IntoIterator<Item = &'a ScSpecEntry>) -> Vec<SpecEntrySummary> {
    entries.into_iter().map(summarize).collect()
}

pub fn summarize(entry: &ScSpecEntry) -> SpecEntrySummary {
    match entry {
        ScSpecEntry::FunctionV0(f) => SpecEntrySummary {
            kind: "function".to_string(),
            name: f.name.0.to_utf8_string_lossy(),
            doc: text(&f.doc),
            members: f
                .inputs
                .iter()
                .map(|i| format!("{}: {}", text(&i.name), type_name(&i.type_)))
                .collect(),
            outputs: f.outputs.iter().map(type_name).collect(),
        },
        ScSpecEntry::UdtStructV0(s) => SpecEntrySummary {
            kind: "struct".to_string(),
            name: text(&s.name),
            doc: text(&s.doc),
            members: s
                .fields
                .iter()
                .map(|f| format!("{}: {}", text(&f.name), type_name(&f.type_)))
                .collect(),
            outputs: Vec::new(),
        },
        ScSpecEntry::UdtUnionV0(u) => SpecEntrySummary {
            kind: "union".to_string(),
            name: text(&u.name),
            doc: text(&u.doc),
            members: u
                .cases
                .iter()
                .map(|c| match c {
                    ScSpecUdtUnionCaseV0::VoidV0(v) => text(&v.name),
                    ScSpecUdtUnionCaseV0::TupleV0(t) => format!(
                        "{}({})",
                        text(&t.name),
                        t.type_.iter().map(type_name).collect::<Vec<_>>().join(", ")
                    ),
                })
                .collect(),
            outputs: Vec::new(),
        },
        ScSpecEntry::UdtEnumV0(e) => SpecEntrySummary {
            kind: "enum".to_string(),
            name: text(&e.name),
            doc: text(&e.doc),
            members: e
                .cases
                .iter()
                .map(|c| format!("{} = {}", text(&c.name), c.value))
                .collect(),
            outputs: Vec::new(),
        },
        ScSpecEntry::UdtErrorEnumV0(e) => SpecEntrySummary {
            kind: "error_enum".to_string(),
            name: text(&e.name),
            doc: text(&e.doc),
            members: e
                .cases
                .iter()
                .map(|c| format!("{} = {}", text(&c.name), c.value))
                .collect(),
            outputs: Vec::new(),
        },
        #[allow(unreachable_patterns)]
        other => SpecEntrySummary {
            kind: other.name().to_string(),
            name: String::new(),
            doc: String::new(),
            members: Vec::new(),
            outputs: Vec::new(),
        },
    }
}

/// Render a spec type in Rust-like notation (`vec<address>`, `option<i128>`).
pub fn type_name(ty: &ScSpecTypeDef) -> String {
    match ty {
        ScSpecTypeDef::Option(o) => format!("option<{}>", type_name(&o.value_type)),
        ScSpecTypeDef::Result(r) => format!(
            "result<{}, {}>",
            type_name(&r.ok_type),
            type_name(&r.error_type)
        ),
        ScSpecTypeDef::Vec(v) => format!("vec<{}>", type_name(&v.element_type)),
        ScSpecTypeDef::Map(m) => format!(
            "map<{}, {}>",
            type_name(&m.key_type),
            type_name(&m.value_type)
        ),
        ScSpecTypeDef::Tuple(t) => format!(
            "({})",
            t.value_types
                .iter()
                .map(type_name)
                .collect::<Vec<_>>()
                .join(", ")
        ),
        ScSpecTypeDef::BytesN(b) => format!("bytes<{}>", b.n),
        ScSpecTypeDef::Udt(u) => text(&u.name),
        other => other.name().to_lowercase(),
    }
}

fn text<const MAX: u32>(s: &StringM<MAX>) -> String {
    s.to_utf8_string_lossy()
}

#[cfg(test)]
mod tests {
    use super::*;
    use stellar_xdr::curr::{
        ScSpecFunctionInputV0, ScSpecFunctionV0, ScSpecTypeMap, ScSpecTypeOption, ScSpecTypeUdt,
        ScSpecTypeVec, ScSpecUdtEnumCaseV0, ScSpecUdtEnumV0, ScSpecUdtStructFieldV0,
        ScSpecUdtStructV0, ScSpecUdtUnionCaseTupleV0, ScSpecUdtUnionCaseVoidV0, ScSpecUdtUnionV0,
        ScSymbol,
    };

    fn transfer() -> ScSpecEntry {
        let input = |name: &str, ty: ScSpecTypeDef| ScSpecFunctionInputV0 {
            doc: StringM::default(),
            name: name.try_into().unwrap(),
            type_: ty,
        };
        ScSpecEntry::FunctionV0(ScSpecFunctionV0 {
            doc: "Move tokens".try_into().unwrap(),
            name: ScSymbol("transfer".try_into().unwrap()),
            inputs: vec![
                input("from", ScSpecTypeDef::Address),
                input("amount", ScSpecTypeDef::I128),
            ]
            .try_into()
            .unwrap(),
            outputs: Default::default(),
        })
    }

    #[test]
    fn test_function_summary() {
        let summary = summarize(&transfer());
        assert_eq!(summary.kind, "function");
        assert_eq!(summary.name, "transfer");
        assert_eq!(summary.doc, "Move tokens");
        assert_eq!(summary.members, vec!["from: address", "amount: i128"]);
        assert_eq!(
            summary.signature(),
            "fn transfer(from: address, amount: i128) -> void"
        );
    }

    #[test]
    fn test_struct_and_enum_summaries() {
        let strukt = ScSpecEntry::UdtStructV0(ScSpecUdtStructV0 {
            doc: StringM::default(),
            lib: StringM::default(),
            name: "AllowanceValue".try_into().unwrap(),
            fields: vec![ScSpecUdtStructFieldV0 {
                doc: StringM::default(),
                name: "amount".try_into().unwrap(),
                type_: ScSpecTypeDef::I128,
            }]
            .try_into()
            .unwrap(),
        });
        let summary = summarize(&strukt);
        assert_eq!(summary.kind, "struct");
        assert_eq!(summary.signature(), "struct AllowanceValue { amount: i128 }");

        let enm = ScSpecEntry::UdtEnumV0(ScSpecUdtEnumV0 {
            doc: StringM::default(),
            lib: StringM::default(),
            name: "Color".try_into().unwrap(),
            cases: vec![ScSpecUdtEnumCaseV0 {
                doc: StringM::default(),
                name: "Red".try_into().unwrap(),
                value: 0,
            }]
            .try_into()
            .unwrap(),
        });
        assert_eq!(summarize(&enm).members, vec!["Red = 0"]);
    }

    #[test]
    fn test_union_summary() {
        let union = ScSpecEntry::UdtUnionV0(ScSpecUdtUnionV0 {
            doc: StringM::default(),
            lib: StringM::default(),
            name: "DataKey".try_into().unwrap(),
            cases: vec![
                ScSpecUdtUnionCaseV0::VoidV0(ScSpecUdtUnionCaseVoidV0 {
                    doc: StringM::default(),
                    name: "Admin".try_into().unwrap(),
                }),
                ScSpecUdtUnionCaseV0::TupleV0(ScSpecUdtUnionCaseTupleV0 {
                    doc: StringM::default(),
                    name: "Balance".try_into().unwrap(),
                    type_: vec![ScSpecTypeDef::Address].try_into().unwrap(),
                }),
            ]
            .try_into()
            .unwrap(),
        });
        assert_eq!(summarize(&union).members, vec!["Admin", "Balance(address)"]);
    }

    #[test]
    fn test_nested_type_names() {
        let ty = ScSpecTypeDef::Map(Box::new(ScSpecTypeMap {
            key_type: Box::new(ScSpecTypeDef::Symbol),
            value_type: Box::new(ScSpecTypeDef::Vec(Box::new(ScSpecTypeVec {
                element_type: Box::new(ScSpecTypeDef::Option(Box::new(ScSpecTypeOption {
                    value_type: Box::new(ScSpecTypeDef::Udt(ScSpecTypeUdt {
                        name: "Token".try_into().unwrap(),
                    })),
                }))),
            }))),
        }));
        assert_eq!(type_name(&ty), "map<symbol, vec<option<Token>>>");
    }

    #[test]
    fn test_summary_json_omits_empty_doc() {
        let mut summary = summarize(&transfer());
        summary.doc.clear();
        let json = serde_json::to_value(&summary).unwrap();
        assert!(json.get("doc").is_none());
        assert_eq!(json["kind"], "function");
        assert!(json.get("outputs").is_none());
    }
}
