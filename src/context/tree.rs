//! Parsed source tree abstraction.
//!
//! A [`SourceTree`] enumerates [`Node`]s by kind. Nodes answer the
//! capability queries rules need (marker presence, marker arguments and
//! location) without tying rules to any particular parser's tree shape.

use crate::error::CollaboratorFault;
use crate::issue::Location;
use std::path::{Path, PathBuf};

/// Kinds of declarations a tree can enumerate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Class,
    Method,
}

/// The value of a marker argument.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ArgValue {
    /// A literal such as `"my-connector"` or `42`.
    Literal { value: String },
    /// A class reference such as `Suite.class`.
    ClassRef {
        name: String,
        #[serde(default)]
        qualified: Option<String>,
        #[serde(default)]
        line: Option<usize>,
    },
    /// An array initializer such as `{ A.class, B.class }`.
    Array { items: Vec<ArgValue> },
}

impl ArgValue {
    /// Class references contained in this value, flattening arrays.
    pub fn class_refs(&self) -> Vec<&ArgValue> {
        match self {
            ArgValue::ClassRef { .. } => vec![self],
            ArgValue::Array { items } => items.iter().flat_map(ArgValue::class_refs).collect(),
            ArgValue::Literal { .. } => vec![],
        }
    }
}

/// One argument of a marker; `name` is `None` for positional arguments.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Argument {
    #[serde(default)]
    pub name: Option<String>,
    pub value: ArgValue,
}

/// A declared attribute on a node (an annotation, in most source languages).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Marker {
    /// Simple (`Connector`) or fully qualified (`org.mule.api.annotations.Connector`) name.
    pub name: String,
    #[serde(default)]
    pub arguments: Vec<Argument>,
}

impl Marker {
    pub fn new(name: impl Into<String>) -> Self {
        Marker {
            name: name.into(),
            arguments: vec![],
        }
    }

    pub fn with_argument(mut self, name: Option<&str>, value: ArgValue) -> Self {
        self.arguments.push(Argument {
            name: name.map(str::to_string),
            value,
        });
        self
    }

    /// `true` when this marker is `name`, given either simple or qualified.
    ///
    /// ```
    /// use connector_certify::context::Marker;
    ///
    /// let m = Marker::new("org.mule.api.annotations.Connector");
    /// assert!(m.is("Connector"));
    /// assert!(m.is("org.mule.api.annotations.Connector"));
    /// assert!(!m.is("MyConnector"));
    /// ```
    pub fn is(&self, name: &str) -> bool {
        simple_name(&self.name) == simple_name(name)
            && (!name.contains('.') || !self.name.contains('.') || self.name == name)
    }

    /// The named argument, if present.
    pub fn argument(&self, name: &str) -> Option<&Argument> {
        self.arguments
            .iter()
            .find(|a| a.name.as_deref() == Some(name))
    }

    pub fn has_argument(&self, name: &str) -> bool {
        self.argument(name).is_some()
    }

    /// Positional (unnamed) arguments in declaration order.
    pub fn positional(&self) -> impl Iterator<Item = &ArgValue> {
        self.arguments
            .iter()
            .filter(|a| a.name.is_none())
            .map(|a| &a.value)
    }
}

/// Last segment of a dot-separated name.
pub(crate) fn simple_name(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

/// A class or method declaration.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Node {
    pub kind: NodeKind,
    pub name: String,
    /// Package of the enclosing compilation unit, dot separated.
    #[serde(default)]
    pub package: Option<String>,
    #[serde(default)]
    pub markers: Vec<Marker>,
    /// Methods declared in a class.
    #[serde(default)]
    pub members: Vec<Node>,
    pub file: PathBuf,
    pub line: usize,
}

impl Node {
    pub fn class(name: impl Into<String>, file: impl AsRef<Path>, line: usize) -> Self {
        Node {
            kind: NodeKind::Class,
            name: name.into(),
            package: None,
            markers: vec![],
            members: vec![],
            file: file.as_ref().to_path_buf(),
            line,
        }
    }

    pub fn method(name: impl Into<String>, file: impl AsRef<Path>, line: usize) -> Self {
        Node {
            kind: NodeKind::Method,
            ..Node::class(name, file, line)
        }
    }

    pub fn in_package(mut self, package: impl Into<String>) -> Self {
        self.package = Some(package.into());
        self
    }

    pub fn with_marker(mut self, marker: Marker) -> Self {
        self.markers.push(marker);
        self
    }

    pub fn with_member(mut self, member: Node) -> Self {
        self.members.push(member);
        self
    }

    pub fn marker(&self, name: &str) -> Option<&Marker> {
        self.markers.iter().find(|m| m.is(name))
    }

    pub fn has_marker(&self, name: &str) -> bool {
        self.marker(name).is_some()
    }

    pub fn location(&self) -> Location {
        Location::new(&self.file, self.line)
    }
}

/// Query capability over an already-parsed source tree.
pub trait SourceTree: Send + Sync {
    /// Every node of `kind`, in source order (file order, then line order).
    fn nodes_of_kind(&self, kind: NodeKind) -> Vec<&Node>;
}

/// In-memory source tree, typically deserialized from a JSON model exported
/// by the host's parser.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SourceModel {
    #[serde(default)]
    pub classes: Vec<Node>,
}

impl SourceModel {
    pub fn new(classes: Vec<Node>) -> Self {
        SourceModel { classes }
    }

    /// Loads a model from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`CollaboratorFault::SourceModel`] when the file cannot be
    /// read or is not a valid model.
    pub fn load(path: &Path) -> Result<SourceModel, CollaboratorFault> {
        let content = std::fs::read_to_string(path).map_err(|e| CollaboratorFault::SourceModel {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        serde_json::from_str(&content).map_err(|e| CollaboratorFault::SourceModel {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}

impl SourceTree for SourceModel {
    fn nodes_of_kind(&self, kind: NodeKind) -> Vec<&Node> {
        let mut nodes: Vec<&Node> = match kind {
            NodeKind::Class => self.classes.iter().collect(),
            NodeKind::Method => self
                .classes
                .iter()
                .flat_map(|c| c.members.iter())
                .filter(|m| m.kind == NodeKind::Method)
                .collect(),
        };
        // Stable sort keeps declaration order for nodes on the same line.
        nodes.sort_by(|a, b| a.file.cmp(&b.file).then(a.line.cmp(&b.line)));
        nodes
    }
}
