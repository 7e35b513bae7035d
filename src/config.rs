//! Codec behavior switches.

/// What to do with a component type that has no registered parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UnknownComponentPolicy {
    /// Keep the type byte and every byte after it as
    /// [FlowSpecComponent::Unknown](crate::models::FlowSpecComponent::Unknown).
    #[default]
    Opaque,
    /// Fail with [ParserError::UnknownComponentType](crate::ParserError::UnknownComponentType).
    Reject,
}

/// Options for [FlowSpecCodec](crate::FlowSpecCodec).
///
/// The default is lenient: unknown components are kept opaque, component order is not checked
/// and no add-path identifier is expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct FlowSpecConfig {
    pub unknown_components: UnknownComponentPolicy,
    /// Require strictly ascending component type bytes within an NLRI.
    pub validate_component_order: bool,
    /// Expect (and write) a 4-byte path identifier in front of every NLRI, RFC 7911.
    pub add_path: bool,
}

impl FlowSpecConfig {
    pub fn with_unknown_components(mut self, policy: UnknownComponentPolicy) -> Self {
        self.unknown_components = policy;
        self
    }

    pub fn with_component_order_validation(mut self, validate: bool) -> Self {
        self.validate_component_order = validate;
        self
    }

    pub fn with_add_path(mut self, add_path: bool) -> Self {
        self.add_path = add_path;
        self
    }
}
