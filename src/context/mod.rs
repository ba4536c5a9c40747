//! Read-only views a rule evaluates against.
//!
//! | View | Trait | Bundled implementation |
//! |------|-------|------------------------|
//! | Parsed source | [`SourceTree`] | [`SourceModel`] (JSON) |
//! | Build descriptor | [`Descriptor`] | [`DescriptorModel`] (TOML) |
//! | Component files | [`ResourceRoot`] | [`FsRoot`] (local disk) |
//!
//! The crate never parses source code or build files itself; the bundled
//! implementations load already-extracted models. Rules receive the views as
//! trait objects and never mutate them.

pub mod descriptor;
pub mod resources;
pub mod tree;

pub use descriptor::{Dependency, Descriptor, DescriptorModel};
pub use resources::{FsRoot, ResourceRoot};
pub use tree::{ArgValue, Argument, Marker, Node, NodeKind, SourceModel, SourceTree};
