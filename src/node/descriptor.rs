//! Static input/output schema advertised to the host.

use serde::Serialize;

/// Value type of a node input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InputKind {
    #[serde(rename = "STRING")]
    String,
    #[serde(rename = "INT")]
    Int,
}

/// Default value of a node input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum InputDefault {
    Str(&'static str),
    Int(i64),
    None,
}

/// One declared input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InputSpec {
    pub name: &'static str,
    pub kind: InputKind,
    pub required: bool,
    pub default: InputDefault,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<i64>,
    pub multiline: bool,
}

/// Tensor type of a node output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OutputKind {
    #[serde(rename = "IMAGE")]
    Image,
    #[serde(rename = "MASK")]
    Mask,
}

/// One declared output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OutputSpec {
    pub name: &'static str,
    pub kind: OutputKind,
}

/// Everything the host needs to register and call a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NodeDescriptor {
    pub class_name: &'static str,
    pub display_name: &'static str,
    pub category: &'static str,
    pub function: &'static str,
    pub inputs: &'static [InputSpec],
    pub outputs: &'static [OutputSpec],
}

impl NodeDescriptor {
    /// Look up a declared input by name.
    #[must_use]
    pub fn input(&self, name: &str) -> Option<&'static InputSpec> {
        self.inputs.iter().find(|input| input.name == name)
    }
}
