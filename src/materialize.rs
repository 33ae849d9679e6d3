//! Turning a node forest into the caller's output type.

use crate::ast::Node;
use crate::value::{Attributes, Value};

/// Constructs the caller's representation of an element.
///
/// Implemented for any `FnMut(name, attributes, children) -> T`, so a plain
/// closure works as the `h` function.
pub trait Materializer<T> {
    fn element(&mut self, name: Value<T>, attributes: Attributes<T>, children: Vec<Value<T>>) -> T;
}

impl<T, F> Materializer<T> for F
where
    F: FnMut(Value<T>, Attributes<T>, Vec<Value<T>>) -> T,
{
    fn element(&mut self, name: Value<T>, attributes: Attributes<T>, children: Vec<Value<T>>) -> T {
        self(name, attributes, children)
    }
}

/// Materialize every node, children before their parent.
///
/// Elements become `Value::Opaque` of whatever `h` returns. Text becomes
/// `Value::Str` and opaque nodes hand back their value unchanged.
pub fn materialize<T, H>(nodes: Vec<Node<T>>, h: &mut H) -> Vec<Value<T>>
where
    H: Materializer<T> + ?Sized,
{
    nodes
        .into_iter()
        .map(|node| match node {
            Node::Element(element) => {
                let children = materialize(element.children, h);
                Value::Opaque(h.element(element.name, element.attributes, children))
            }
            Node::Text(text) => Value::Str(text),
            Node::Opaque(value) => value,
        })
        .collect()
}

/// A single result is returned as-is; anything else as a list.
pub fn unwrap_single<T>(mut values: Vec<Value<T>>) -> Value<T> {
    if values.len() == 1 {
        values.remove(0)
    } else {
        Value::List(values)
    }
}
