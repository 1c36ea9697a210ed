//! Host-facing node: schema, inputs, execution, and registration.

mod descriptor;

pub use descriptor::{InputDefault, InputKind, InputSpec, NodeDescriptor, OutputKind, OutputSpec};

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::fetch::{DynTransport, ReqwestTransport};
use crate::image::LoadedBatch;
use crate::pipeline::{Config, Loader, MAX_TIMEOUT_SECS, MIN_TIMEOUT_SECS};

const DEFAULT_TIMEOUT_SECS: i64 = 30;

#[allow(clippy::cast_possible_wrap)]
const TIMEOUT_RANGE: (i64, i64) = (MIN_TIMEOUT_SECS as i64, MAX_TIMEOUT_SECS as i64);

/// Schema of the "load single image from URL" node.
pub static LOAD_IMAGE_FROM_URL: NodeDescriptor = NodeDescriptor {
    class_name: "LoadSingleImageFromURL",
    display_name: "Load Single Image From URL",
    category: "Custom Nodes",
    function: "load_image",
    inputs: &[
        InputSpec {
            name: "url",
            kind: InputKind::String,
            required: true,
            default: InputDefault::Str(""),
            min: None,
            max: None,
            multiline: false,
        },
        InputSpec {
            name: "timeout",
            kind: InputKind::Int,
            required: true,
            default: InputDefault::Int(DEFAULT_TIMEOUT_SECS),
            min: Some(TIMEOUT_RANGE.0),
            max: Some(TIMEOUT_RANGE.1),
            multiline: false,
        },
        InputSpec {
            name: "proxy",
            kind: InputKind::String,
            required: false,
            default: InputDefault::None,
            min: None,
            max: None,
            multiline: false,
        },
    ],
    outputs: &[
        OutputSpec {
            name: "image",
            kind: OutputKind::Image,
        },
        OutputSpec {
            name: "mask",
            kind: OutputKind::Mask,
        },
    ],
};

/// Input values supplied by the host for one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NodeInputs {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_timeout")]
    pub timeout: i64,
    #[serde(default)]
    pub proxy: Option<String>,
}

const fn default_timeout() -> i64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for NodeInputs {
    fn default() -> Self {
        Self {
            url: String::new(),
            timeout: DEFAULT_TIMEOUT_SECS,
            proxy: None,
        }
    }
}

impl NodeInputs {
    /// Parse host-supplied input values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if the values do not match the schema.
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|err| Error::InvalidParameter {
            name: "inputs".to_string(),
            reason: err.to_string(),
        })
    }

    /// Translate the inputs into a validated loader configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if the timeout is out of range.
    pub fn to_config(&self) -> Result<Config> {
        let timeout_secs = u64::try_from(self.timeout).map_err(|_| Error::InvalidParameter {
            name: "timeout".to_string(),
            reason: format!("{} is negative", self.timeout),
        })?;

        let config = Config {
            timeout_secs,
            proxy: self.proxy.clone(),
            ..Config::default()
        };
        config.validate()?;
        Ok(config)
    }
}

/// Executable "load single image from URL" node.
pub struct LoadImageFromUrlNode {
    transport: DynTransport,
}

impl Default for LoadImageFromUrlNode {
    fn default() -> Self {
        Self::with_transport(Arc::new(ReqwestTransport))
    }
}

impl LoadImageFromUrlNode {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_transport(transport: DynTransport) -> Self {
        Self { transport }
    }

    #[must_use]
    pub fn descriptor() -> &'static NodeDescriptor {
        &LOAD_IMAGE_FROM_URL
    }

    /// Run the node: fetch, decode, and normalize the image at `inputs.url`.
    ///
    /// # Errors
    ///
    /// Returns a fetch-kind or decode-kind error; nothing is returned on failure.
    pub fn execute(&self, inputs: &NodeInputs) -> Result<LoadedBatch> {
        let config = inputs.to_config()?;
        Loader::with_transport(config, Arc::clone(&self.transport))?.load(&inputs.url)
    }
}

/// Process-wide table of the nodes this crate provides.
#[derive(Debug, Serialize)]
pub struct NodeRegistry {
    nodes: BTreeMap<&'static str, &'static NodeDescriptor>,
    display_names: BTreeMap<&'static str, &'static str>,
}

impl NodeRegistry {
    fn with_builtin_nodes() -> Self {
        let mut registry = Self {
            nodes: BTreeMap::new(),
            display_names: BTreeMap::new(),
        };
        registry.register(&LOAD_IMAGE_FROM_URL);
        registry
    }

    fn register(&mut self, descriptor: &'static NodeDescriptor) {
        tracing::debug!("Registering node {}", descriptor.class_name);
        self.nodes.insert(descriptor.class_name, descriptor);
        self.display_names
            .insert(descriptor.class_name, descriptor.display_name);
    }

    /// Look up a node by class name.
    #[must_use]
    pub fn get(&self, class_name: &str) -> Option<&'static NodeDescriptor> {
        self.nodes.get(class_name).copied()
    }

    /// Class name to display name.
    #[must_use]
    pub const fn display_names(&self) -> &BTreeMap<&'static str, &'static str> {
        &self.display_names
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &'static NodeDescriptor> + '_ {
        self.nodes.values().copied()
    }
}

/// The registry, built on first use.
pub fn registry() -> &'static NodeRegistry {
    static REGISTRY: OnceLock<NodeRegistry> = OnceLock::new();
    REGISTRY.get_or_init(NodeRegistry::with_builtin_nodes)
}
