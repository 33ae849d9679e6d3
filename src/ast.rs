use crate::value::{Attributes, Value};
use serde::Serialize;

/// Node of the built tree
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value")]
pub enum Node<T> {
    Element(Element<T>),
    /// Escaped text
    Text(String),
    /// Interpolated value, passed to the materializer untouched
    Opaque(Value<T>),
}

/// Element with its attributes and children
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Element<T> {
    /// Tag name: a string, or whatever value was interpolated in its place
    pub name: Value<T>,
    pub attributes: Attributes<T>,
    pub children: Vec<Node<T>>,
}

impl<T> Element<T> {
    pub fn new(name: Value<T>) -> Self {
        Self {
            name,
            attributes: Attributes::new(),
            children: Vec::new(),
        }
    }
}

impl<T> Node<T> {
    /// Number of element levels below and including this node
    pub fn depth(&self) -> usize {
        match self {
            Node::Element(element) => {
                1 + element.children.iter().map(Node::depth).max().unwrap_or(0)
            }
            Node::Text(_) | Node::Opaque(_) => 0,
        }
    }
}
