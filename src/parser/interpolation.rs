//! Merging dynamic values into the token stream.
//!
//! After a literal fragment has been scanned, the value interpolated right
//! after it is handed to [`absorb`] together with the scanner state and
//! accumulator the fragment left behind. What the value becomes depends on
//! that state: text or a sub-tree between tags, part of a tag name or
//! attribute value, or a whole set of attributes inside a tag.

use super::tokenizer::{Accumulator, Scan, State, Token, flush_text};
use crate::error::ParseError;
use crate::html::escape_html;
use crate::value::{Attributes, Value};

/// Fold one dynamic value into the scan at `state`.
///
/// `None` stands for an absent value (after the last fragment) and leaves
/// everything unchanged.
pub fn absorb<T>(
    value: Option<Value<T>>,
    state: State,
    acc: Accumulator<T>,
) -> Result<Scan<T>, ParseError> {
    let Some(value) = value else {
        return Ok(Scan { tokens: Vec::new(), state, acc });
    };

    log::trace!(
        target: "tagged_html::interpolation",
        "absorb {} in state {}",
        value.kind(),
        state.as_str()
    );

    let mut acc = acc;
    match state {
        State::Text => {
            let tokens = text_tokens(value, &mut acc);
            Ok(Scan { tokens, state, acc })
        }

        State::Tag
        | State::ClosingTag
        | State::AttrValue
        | State::AttrValueSingleQuote
        | State::AttrValueDoubleQuote => {
            acc.append(value, state)?;
            Ok(Scan { tokens: Vec::new(), state, acc })
        }

        State::Attr => match value {
            Value::Map(attributes) => Ok(Scan {
                tokens: object_attrs(attributes),
                state: State::Attr,
                acc,
            }),
            Value::Str(text) => {
                let (tokens, state) = string_attrs(&text);
                Ok(Scan { tokens, state, acc })
            }
            other => Err(
                ParseError::unsupported_interpolation(&other.describe(), state).with_help(
                    "Inside a tag, interpolate a string like \"checked\" or a mapping of attributes.",
                ),
            ),
        },

        State::AttrKey => Err(
            ParseError::unsupported_interpolation(&value.describe(), state).with_help(
                "Separate the interpolation from the attribute name with whitespace or '='.",
            ),
        ),
    }
}

/// A value between tags: pending text first, then the value itself.
fn text_tokens<T>(value: Value<T>, acc: &mut Accumulator<T>) -> Vec<Token<T>> {
    let mut tokens = Vec::new();
    flush_text(&mut tokens, acc);

    match value {
        Value::List(items) => tokens.extend(items.into_iter().map(Token::SubTree)),
        value if !value.is_scalar() => tokens.push(Token::SubTree(value)),
        value => {
            if !value.is_empty() {
                if let Some(text) = value.to_text() {
                    tokens.push(Token::Text(escape_html(&text)));
                }
            }
        }
    }

    tokens
}

/// One name/value pair per entry, in insertion order. Blank names are skipped.
fn object_attrs<T>(attributes: Attributes<T>) -> Vec<Token<T>> {
    let mut tokens = Vec::with_capacity(attributes.len() * 2);
    for (name, value) in attributes {
        if name.trim().is_empty() {
            continue;
        }
        tokens.push(Token::AttributeName(name));
        tokens.push(Token::AttributeValue(value));
    }
    tokens
}

/// Parse `name=value` and bare `name` chunks separated by whitespace.
///
/// A trailing bare name leaves the scanner in `AttrKey`, so a following
/// `="..."` in the template still assigns it a value.
fn string_attrs<T>(text: &str) -> (Vec<Token<T>>, State) {
    let mut tokens = Vec::new();
    let mut state = State::Attr;

    for chunk in text.split_whitespace() {
        match chunk.split_once('=') {
            Some((name, value)) if !value.is_empty() => {
                tokens.push(Token::AttributeName(name.to_string()));
                tokens.push(Token::AttributeValue(Value::Str(value.to_string())));
                state = State::Attr;
            }
            Some((name, _)) => {
                tokens.push(Token::AttributeName(name.to_string()));
                state = State::AttrKey;
            }
            None => {
                tokens.push(Token::AttributeName(chunk.to_string()));
                state = State::AttrKey;
            }
        }
    }

    (tokens, state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use pretty_assertions::assert_eq;

    type V = Value<&'static str>;
    type Tok = Token<&'static str>;

    fn absorb_fresh(value: V, state: State) -> Result<Scan<&'static str>, ParseError> {
        absorb(Some(value), state, Accumulator::default())
    }

    fn s(text: &str) -> V {
        Value::Str(text.to_string())
    }

    #[test]
    fn test_absent_value_is_noop() {
        let acc = Accumulator::Text("pending".into());
        let scan = absorb::<&str>(None, State::AttrKey, acc.clone()).unwrap();
        assert!(scan.tokens.is_empty());
        assert_eq!(scan.state, State::AttrKey);
        assert_eq!(scan.acc, acc);
    }

    #[test]
    fn test_object_attributes_in_order() {
        let attrs: Attributes<&str> = [
            ("class", s("cool")),
            ("autofocus", Value::Bool(true)),
        ]
        .into_iter()
        .collect();

        let scan = absorb_fresh(Value::Map(attrs), State::Attr).unwrap();
        assert_eq!(
            scan.tokens,
            vec![
                Tok::AttributeName("class".into()),
                Tok::AttributeValue(s("cool")),
                Tok::AttributeName("autofocus".into()),
                Tok::AttributeValue(Value::Bool(true)),
            ]
        );
        assert_eq!(scan.state, State::Attr);
        assert!(scan.acc.is_empty());
    }

    #[test]
    fn test_object_attributes_skip_blank_names() {
        let attrs: Attributes<&str> = [("  ", s("x")), ("id", Value::from(7))]
            .into_iter()
            .collect();
        let scan = absorb_fresh(Value::Map(attrs), State::Attr).unwrap();
        assert_eq!(
            scan.tokens,
            vec![
                Tok::AttributeName("id".into()),
                Tok::AttributeValue(Value::Number(7.0)),
            ]
        );
    }

    #[test]
    fn test_string_attributes() {
        let scan = absorb_fresh(s("  type=checkbox   checked "), State::Attr).unwrap();
        assert_eq!(
            scan.tokens,
            vec![
                Tok::AttributeName("type".into()),
                Tok::AttributeValue(s("checkbox")),
                Tok::AttributeName("checked".into()),
            ]
        );
        assert_eq!(scan.state, State::AttrKey);
    }

    #[test]
    fn test_string_attribute_value_keeps_later_equals() {
        let scan = absorb_fresh(s("data-eq=a=b"), State::Attr).unwrap();
        assert_eq!(
            scan.tokens,
            vec![
                Tok::AttributeName("data-eq".into()),
                Tok::AttributeValue(s("a=b")),
            ]
        );
        assert_eq!(scan.state, State::Attr);
    }

    #[test]
    fn test_empty_string_attributes() {
        let scan = absorb_fresh(s(""), State::Attr).unwrap();
        assert!(scan.tokens.is_empty());
        assert_eq!(scan.state, State::Attr);
    }

    #[test]
    fn test_unsupported_in_attr_position() {
        for value in [Value::from(3), Value::Bool(true), Value::Null, Value::Opaque("C")] {
            let err = absorb_fresh(value, State::Attr).unwrap_err();
            assert_eq!(err.kind, ErrorKind::UnsupportedInterpolation);
            assert_eq!(err.state, Some(State::Attr));
        }
    }

    #[test]
    fn test_unsupported_in_attr_key() {
        let err = absorb_fresh(s("suffix"), State::AttrKey).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnsupportedInterpolation);
        assert!(err.message.contains("string 'suffix'"));
        assert!(err.message.contains("AttrKey"));
    }

    #[test]
    fn test_tag_name_keeps_value_identity() {
        let scan = absorb_fresh(Value::Opaque("Custom"), State::Tag).unwrap();
        assert!(scan.tokens.is_empty());
        assert_eq!(scan.acc, Accumulator::Value(Value::Opaque("Custom")));
    }

    #[test]
    fn test_concatenates_onto_pending_text() {
        let acc = Accumulator::Text("btn-".into());
        let scan = absorb(Some(V::from(2)), State::AttrValueDoubleQuote, acc).unwrap();
        assert_eq!(scan.acc, Accumulator::Text("btn-2".into()));
        assert_eq!(scan.state, State::AttrValueDoubleQuote);
    }

    #[test]
    fn test_sequence_cannot_join_text() {
        let acc = Accumulator::Text("x".into());
        let err = absorb(Some(V::List(vec![])), State::AttrValue, acc).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnsupportedInterpolation);
    }

    #[test]
    fn test_text_flushes_pending_then_value() {
        let acc = Accumulator::Text("n° ".into());
        let scan = absorb(Some(V::from(1)), State::Text, acc).unwrap();
        assert_eq!(
            scan.tokens,
            vec![Tok::Text("n° ".into()), Tok::Text("1".into())]
        );
        assert!(scan.acc.is_empty());
        assert_eq!(scan.state, State::Text);
    }

    #[test]
    fn test_text_value_is_escaped() {
        let scan = absorb_fresh(s("<b>"), State::Text).unwrap();
        assert_eq!(scan.tokens, vec![Tok::Text("&lt;b&gt;".into())]);
    }

    #[test]
    fn test_empty_text_values_add_nothing() {
        for value in [s(""), s("   "), Value::Bool(false), Value::Null] {
            let acc = Accumulator::Text("kept".into());
            let scan = absorb(Some(value), State::Text, acc).unwrap();
            assert_eq!(scan.tokens, vec![Tok::Text("kept".into())]);
        }
        let scan = absorb_fresh(V::from(0), State::Text).unwrap();
        assert_eq!(scan.tokens, vec![Tok::Text("0".into())]);
    }

    #[test]
    fn test_subtree_and_sequence() {
        let scan = absorb_fresh(Value::Opaque("tree"), State::Text).unwrap();
        assert_eq!(scan.tokens, vec![Tok::SubTree(Value::Opaque("tree"))]);

        let items = V::List(vec![Value::Opaque("a"), Value::Opaque("b"), Value::Opaque("c")]);
        let scan = absorb(Some(items), State::Text, Accumulator::Text("oh ".into())).unwrap();
        assert_eq!(
            scan.tokens,
            vec![
                Tok::Text("oh ".into()),
                Tok::SubTree(Value::Opaque("a")),
                Tok::SubTree(Value::Opaque("b")),
                Tok::SubTree(Value::Opaque("c")),
            ]
        );
    }
}
