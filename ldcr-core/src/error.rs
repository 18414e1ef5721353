//! Error types for the LDCR core library.
//!
//! Defines the error enum exposed by the public API, its stable error codes,
//! and a convenient result alias.
//!
//! Contract violations (selecting from an empty tree, inserting a duplicate
//! edge, removing a connected node) surface as [`GraphError`] values.
//! Exhaustion conditions such as "no edge left to delete" are not errors and
//! never appear here.

use std::fmt;

use thiserror::Error;

macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident $( { $($pattern:tt)* } )? => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(Self::$ErrVariant $( { $($pattern)* } )? => $CodeTy::$CodeVariant,)+
                }
            }
        }
    };
}

/// Error type produced when configuring or mutating a [`crate::DcrGraph`].
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum GraphError {
    /// Parameters supplied to a builder were rejected.
    #[error("invalid parameters: {reason}")]
    InvalidParameters {
        /// Human-readable explanation of the rejected parameter.
        reason: String,
    },
    /// A weighted selection was requested from an empty or zero-weight tree.
    #[error("cannot select from an empty selection tree")]
    EmptySelection,
    /// A selection-tree handle did not refer to a live entry.
    #[error("selection tree handle {handle} is not live")]
    StaleHandle {
        /// Raw handle value supplied by the caller.
        handle: usize,
    },
    /// An element lies outside the sampler's current domain.
    #[error("element {element} lies outside the domain [0, {max})")]
    ElementOutOfDomain {
        /// Element supplied by the caller.
        element: u64,
        /// Exclusive upper bound of the domain.
        max: u64,
    },
    /// The element is already part of the selected partition.
    #[error("element {element} is already selected")]
    ElementAlreadySelected {
        /// Element supplied by the caller.
        element: u64,
    },
    /// The element is not part of the selected partition.
    #[error("element {element} is not selected")]
    ElementNotSelected {
        /// Element supplied by the caller.
        element: u64,
    },
    /// A random selection was requested but every element is selected.
    #[error("sampler has no unselected element left")]
    SamplerFull,
    /// A random deletion was requested but no element is selected.
    #[error("sampler has no selected element left")]
    SamplerEmpty,
    /// The referenced node does not exist.
    #[error("node {node} does not exist")]
    UnknownNode {
        /// Journal identifier of the missing node.
        node: u64,
    },
    /// The referenced cluster does not exist or is not in the required view.
    #[error("cluster {cluster} does not exist in the requested view")]
    UnknownCluster {
        /// Journal identifier of the missing cluster.
        cluster: u64,
    },
    /// A node still carried edges when its removal was requested.
    #[error("node {node} still has {degree} incident edge(s)")]
    NodeNotIsolated {
        /// Journal identifier of the node.
        node: u64,
        /// Number of incident edges at the time of the request.
        degree: usize,
    },
    /// Both endpoints of a requested edge are the same node.
    #[error("self-loop on node {node} is not permitted")]
    SelfLoop {
        /// Journal identifier of the node.
        node: u64,
    },
    /// The requested edge is already present.
    #[error("edge {first}-{second} already exists")]
    DuplicateEdge {
        /// Journal identifier of the first endpoint.
        first: u64,
        /// Journal identifier of the second endpoint.
        second: u64,
    },
    /// The requested edge is not present.
    #[error("edge {first}-{second} does not exist")]
    MissingEdge {
        /// Journal identifier of the first endpoint.
        first: u64,
        /// Journal identifier of the second endpoint.
        second: u64,
    },
    /// A structural operation targeted a cluster owned by a running operation.
    #[error("cluster {cluster} is locked by a running operation")]
    ClusterLocked {
        /// Journal identifier of the locked cluster.
        cluster: u64,
    },
    /// Internal bookkeeping disagreed with itself.
    #[error("internal invariant violated: {message}")]
    InvariantViolation {
        /// Description of the inconsistent state.
        message: String,
    },
}

define_error_codes! {
    /// Stable codes describing [`GraphError`] variants.
    enum GraphErrorCode for GraphError {
        /// Parameters supplied to a builder were rejected.
        InvalidParameters => InvalidParameters { .. } => "LDCR_INVALID_PARAMETERS",
        /// A weighted selection was requested from an empty tree.
        EmptySelection => EmptySelection => "LDCR_EMPTY_SELECTION",
        /// A selection-tree handle did not refer to a live entry.
        StaleHandle => StaleHandle { .. } => "LDCR_STALE_HANDLE",
        /// An element lies outside the sampler's current domain.
        ElementOutOfDomain => ElementOutOfDomain { .. } => "LDCR_ELEMENT_OUT_OF_DOMAIN",
        /// The element is already selected.
        ElementAlreadySelected => ElementAlreadySelected { .. } => "LDCR_ELEMENT_ALREADY_SELECTED",
        /// The element is not selected.
        ElementNotSelected => ElementNotSelected { .. } => "LDCR_ELEMENT_NOT_SELECTED",
        /// The sampler has no unselected element left.
        SamplerFull => SamplerFull => "LDCR_SAMPLER_FULL",
        /// The sampler has no selected element left.
        SamplerEmpty => SamplerEmpty => "LDCR_SAMPLER_EMPTY",
        /// The referenced node does not exist.
        UnknownNode => UnknownNode { .. } => "LDCR_UNKNOWN_NODE",
        /// The referenced cluster does not exist.
        UnknownCluster => UnknownCluster { .. } => "LDCR_UNKNOWN_CLUSTER",
        /// A node still carried edges when its removal was requested.
        NodeNotIsolated => NodeNotIsolated { .. } => "LDCR_NODE_NOT_ISOLATED",
        /// Self-loops are rejected.
        SelfLoop => SelfLoop { .. } => "LDCR_SELF_LOOP",
        /// The requested edge is already present.
        DuplicateEdge => DuplicateEdge { .. } => "LDCR_DUPLICATE_EDGE",
        /// The requested edge is not present.
        MissingEdge => MissingEdge { .. } => "LDCR_MISSING_EDGE",
        /// The cluster is locked by a running operation.
        ClusterLocked => ClusterLocked { .. } => "LDCR_CLUSTER_LOCKED",
        /// Internal bookkeeping disagreed with itself.
        InvariantViolation => InvariantViolation { .. } => "LDCR_INVARIANT_VIOLATION",
    }
}

impl GraphError {
    pub(crate) fn invariant(message: impl Into<String>) -> Self {
        Self::InvariantViolation {
            message: message.into(),
        }
    }

    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidParameters {
            reason: reason.into(),
        }
    }
}

/// Convenient alias for results returned by the core API.
pub type Result<T> = core::result::Result<T, GraphError>;
