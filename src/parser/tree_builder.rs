use super::tokenizer::Token;
use crate::ast::{Element, Node};
use crate::error::{ErrorKind, ParseError};
use crate::value::Value;
use std::iter::Peekable;
use std::vec::IntoIter;

/// Builds a node forest from a token stream.
///
/// Malformed input is tolerated: attribute tokens with no element to attach
/// to, stray `CloseTag`s and unmatched closing tags are skipped, never
/// reported.
pub struct TreeBuilder<T> {
    tokens: Peekable<IntoIter<Token<T>>>,
    pos: usize,
    depth: usize,
    max_depth: Option<usize>,
}

impl<T> TreeBuilder<T> {
    pub fn new(tokens: Vec<Token<T>>) -> Self {
        Self {
            tokens: tokens.into_iter().peekable(),
            pos: 0,
            depth: 0,
            max_depth: None,
        }
    }

    /// Reject trees with more than `max_depth` nested elements
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Start building at token `index`, skipping everything before it
    pub fn starting_at(mut self, index: usize) -> Self {
        while self.pos < index && self.advance().is_some() {}
        self
    }

    /// Build the forest, returning it with the index of the first token not
    /// consumed.
    pub fn build(mut self) -> Result<(Vec<Node<T>>, usize), ParseError> {
        let nodes = self.build_level()?;
        log::debug!(
            target: "tagged_html::tree_builder",
            "built {} top-level nodes from {} tokens",
            nodes.len(),
            self.pos
        );
        Ok((nodes, self.pos))
    }

    fn advance(&mut self) -> Option<Token<T>> {
        let token = self.tokens.next();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    /// Take the next token if it is an attribute value
    fn next_attribute_value(&mut self) -> Option<Value<T>> {
        match self.tokens.next_if(|token| matches!(token, Token::AttributeValue(_))) {
            Some(Token::AttributeValue(value)) => {
                self.pos += 1;
                Some(value)
            }
            _ => None,
        }
    }

    /// Collect sibling nodes until a closing tag or the end of input.
    fn build_level(&mut self) -> Result<Vec<Node<T>>, ParseError> {
        let mut nodes: Vec<Node<T>> = Vec::new();

        while let Some(token) = self.advance() {
            match token {
                Token::OpenTag(name) => nodes.push(Node::Element(Element::new(name))),

                Token::Text(text) => nodes.push(Node::Text(text)),

                Token::SubTree(value) => nodes.push(Node::Opaque(value)),

                Token::AttributeName(name) => {
                    let value = self.next_attribute_value();
                    if let Some(Node::Element(element)) = nodes.last_mut() {
                        element.attributes.insert(name, value.unwrap_or(Value::Bool(true)));
                    } else {
                        log::trace!(
                            target: "tagged_html::tree_builder",
                            "dropping attribute '{}' with no open element",
                            name
                        );
                    }
                }

                // Normally consumed with its name above
                Token::AttributeValue(_) => {}

                Token::CloseTag => {
                    if let Some(Node::Element(_)) = nodes.last() {
                        let children = self.build_children()?;
                        if let Some(Node::Element(element)) = nodes.last_mut() {
                            element.children = children;
                        }
                    }
                }

                Token::SelfCloseTag => {}

                // Names are not checked against the open element
                Token::ClosingTag(_) => return Ok(nodes),
            }
        }

        Ok(nodes)
    }

    fn build_children(&mut self) -> Result<Vec<Node<T>>, ParseError> {
        self.depth += 1;
        if let Some(max_depth) = self.max_depth {
            if self.depth > max_depth {
                return Err(ParseError::new(
                    ErrorKind::NestingTooDeep,
                    format!("Elements are nested more than {} levels deep.", max_depth),
                )
                .with_help("Raise `Options::max_depth` or flatten the template."));
            }
        }
        let children = self.build_level()?;
        self.depth -= 1;
        Ok(children)
    }
}

/// Build a forest from `tokens`, starting at index `start`.
///
/// Returns the nodes and the index just past the last consumed token. Without
/// a depth limit this never fails.
pub fn build_tree<T>(
    tokens: Vec<Token<T>>,
    start: usize,
) -> Result<(Vec<Node<T>>, usize), ParseError> {
    TreeBuilder::new(tokens).starting_at(start).build()
}
