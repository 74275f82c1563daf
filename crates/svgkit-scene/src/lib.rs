//! # SVGKit Scene
//!
//! Scene graph for SVGKit documents.
//!
//! ## Features
//!
//! - **Typed nodes**: shapes, groups, text, images, paint servers, clip groups,
//!   `use` placeholders, style sheets and inert unknown elements
//! - **Deferred children**: group children are built on first access, once
//! - **Named objects**: `id` / `xml:id` registry filled at construction
//! - **References**: cycle-safe `use` resolution, clip and gradient lookup
//! - **Context**: the [`SvgContext`] capability handed to each render pass
//!
//! ## Architecture
//!
//! ```text
//! ElementDefinition tree
//!    └── NodeFactory ──► Node { attributes, transform, id, kind }
//!                            ├── Group ── pending definitions ──► children (OnceLock)
//!                            ├── Placeholder ── target id ──► registry
//!                            └── Gradient ── href chain ──► ResolvedGradient
//! ```

mod context;
mod definition;
mod document;
mod error;
mod factory;
mod gradient;
mod node;
mod resolve;

pub use context::{DocumentContext, SvgContext};
pub use definition::ElementDefinition;
pub use document::{AspectRatio, Document, ViewBox, DEFAULT_HEIGHT, DEFAULT_WIDTH};
pub use error::SceneError;
pub use factory::NodeFactory;
pub use gradient::{
    resolve_gradient, GradientKind, GradientNode, GradientStop, ResolvedGradient,
    ResolvedGradientKind, ResolvedStop, SpreadMethod,
};
pub use node::{
    ClipGroupNode, ClipKind, GroupMode, GroupNode, ImageNode, NamedObjects, Node, NodeKind,
    PlaceholderNode, ShapeKind, ShapeNode, SolidColorNode, TextLayoutMode, TextNode, TextRun, Units,
};
pub use resolve::{resolve_placeholder, Resolution};
