//! # SVGKit Render
//!
//! Rendering and hit-testing for SVGKit scene graphs.
//!
//! ## Features
//!
//! - **Traversal**: depth-first walk with style cascade, transforms, clips
//!   and cycle-safe `use` resolution
//! - **Paint**: solid colors, gradients and `solidColor` paint servers with
//!   fallbacks, dash and line settings, `non-scaling-stroke`
//! - **Text**: inline runs and text on a path through the shaping seam
//! - **Sinks**: the [`DrawingSink`] trait and a recording [`DisplayList`]
//! - **Hit testing**: the topmost painted leaf under a device point
//!
//! ## Architecture
//!
//! ```text
//! Document ──► Renderer ──► Walk<Target>
//!                             ├── Painter ──► DrawingSink (DisplayList, ...)
//!                             └── HitTester ──► Option<Arc<Node>>
//! ```
//!
//! ## Example
//!
//! ```ignore
//! let document = Document::from_definition(&definition, RenderConfig::default())?;
//! let mut context = DocumentContext::new(&document);
//! let mut list = DisplayList::new();
//! let report = Renderer::default().render(&document, &mut list, &mut context);
//! ```

mod display_list;
mod paint;
mod renderer;
mod sink;
mod text;

pub use display_list::{DisplayCommand, DisplayList, DrawState};
pub use renderer::{RenderOptions, RenderReport, Renderer};
pub use sink::{BlendMode, DrawingSink, GlyphRun, LineCap, LineJoin, TextDrawMode};
