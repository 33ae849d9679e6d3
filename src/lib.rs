//! Tagged-template markup compiler.
//!
//! A template arrives as literal fragments with dynamic values between them,
//! the shape a tagged template literal produces:
//!
//! ```text
//! fragments: ["<div class=\"", "\">", "</div>"]
//! values:    ["cool", <sub-tree>]
//! ```
//!
//! The fragments are scanned by a character-level state machine, each value is
//! merged in at whatever state the scan reached, and the resulting token stream
//! is folded into a tree of elements, text and opaque values. [`Html`] runs the
//! whole pipeline and hands each element to a caller-supplied constructor.

pub mod ast;
pub mod error;
pub mod html;
pub mod materialize;
pub mod parser;
pub mod value;

pub use ast::{Element, Node};
pub use error::{ErrorKind, ParseError};
pub use materialize::{Materializer, materialize, unwrap_single};
pub use parser::{State, Token, TreeBuilder, build_tree, tokenize_template};
pub use value::{Attributes, Value};

use std::marker::PhantomData;

/// Parser configuration.
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Deepest element nesting accepted; `None` means unlimited
    pub max_depth: Option<usize>,
}

/// Tokenize a template without building a tree.
pub fn tokenize<T>(fragments: &[&str], values: Vec<Value<T>>) -> Result<Vec<Token<T>>, ParseError> {
    tokenize_template(fragments, values)
}

/// Tokenize and build the node forest.
pub fn parse<T>(fragments: &[&str], values: Vec<Value<T>>) -> Result<Vec<Node<T>>, ParseError> {
    parse_with(fragments, values, &Options::default())
}

pub fn parse_with<T>(
    fragments: &[&str],
    values: Vec<Value<T>>,
    options: &Options,
) -> Result<Vec<Node<T>>, ParseError> {
    let tokens = tokenize_template(fragments, values)?;
    let (nodes, _) = TreeBuilder::new(tokens)
        .with_max_depth(options.max_depth)
        .build()?;
    Ok(nodes)
}

/// Template front door: parses templates and materializes them through `h`.
///
/// ```
/// use tagged_html::{Attributes, Html, Value};
///
/// let mut html = Html::new(
///     |name: Value<String>, _: Attributes<String>, children: Vec<Value<String>>| {
///         format!("{}:{}", name.to_text().unwrap_or_default(), children.len())
///     },
/// );
/// let out = html.render(&["<p>", "</p>"], vec![Value::from("hi")]).unwrap();
/// assert_eq!(out, Value::Opaque("p:1".to_string()));
/// ```
pub struct Html<T, H> {
    h: H,
    options: Options,
    _output: PhantomData<fn() -> T>,
}

impl<T, H> Html<T, H>
where
    H: Materializer<T>,
{
    pub fn new(h: H) -> Self {
        Self::with_options(h, Options::default())
    }

    pub fn with_options(h: H, options: Options) -> Self {
        Self {
            h,
            options,
            _output: PhantomData,
        }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Parse and materialize a template.
    ///
    /// A template with exactly one top-level node yields that node's value;
    /// otherwise all top-level values come back as a `Value::List`.
    pub fn render(
        &mut self,
        fragments: &[&str],
        values: Vec<Value<T>>,
    ) -> Result<Value<T>, ParseError> {
        let nodes = parse_with(fragments, values, &self.options)?;
        Ok(unwrap_single(materialize(nodes, &mut self.h)))
    }

    /// Render a template that has no interpolated values
    pub fn render_str(&mut self, template: &str) -> Result<Value<T>, ParseError> {
        self.render(&[template], Vec::new())
    }
}
