use crate::error::ParseError;
use crate::html::escape_html;
use crate::value::Value;
use serde::Serialize;

/// Tokens produced by the scanner
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value")]
pub enum Token<T> {
    /// Escaped text run
    Text(String),
    /// Start of an opening tag. The name is usually a string but may be any
    /// interpolated value (a component reference, for instance).
    OpenTag(Value<T>),
    AttributeName(String),
    /// Value of the attribute named by the preceding `AttributeName`
    AttributeValue(Value<T>),
    /// End of an opening tag's attribute list; children follow
    CloseTag,
    /// End of an opening tag that has no children: `/>`
    SelfCloseTag,
    /// Explicit closing tag: `</name>`
    ClosingTag(Value<T>),
    /// Interpolated sub-tree, injected verbatim
    SubTree(Value<T>),
}

impl<T> Token<T> {
    pub fn kind(&self) -> &'static str {
        match self {
            Token::Text(_) => "Text",
            Token::OpenTag(_) => "OpenTag",
            Token::AttributeName(_) => "AttributeName",
            Token::AttributeValue(_) => "AttributeValue",
            Token::CloseTag => "CloseTag",
            Token::SelfCloseTag => "SelfCloseTag",
            Token::ClosingTag(_) => "ClosingTag",
            Token::SubTree(_) => "SubTree",
        }
    }
}

/// Scanner state, threaded explicitly between fragments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum State {
    #[default]
    Text,
    Tag,
    ClosingTag,
    Attr,
    AttrKey,
    AttrValue,
    AttrValueSingleQuote,
    AttrValueDoubleQuote,
}

impl State {
    pub fn as_str(&self) -> &'static str {
        match self {
            State::Text => "Text",
            State::Tag => "Tag",
            State::ClosingTag => "ClosingTag",
            State::Attr => "Attr",
            State::AttrKey => "AttrKey",
            State::AttrValue => "AttrValue",
            State::AttrValueSingleQuote => "AttrValueSingleQuote",
            State::AttrValueDoubleQuote => "AttrValueDoubleQuote",
        }
    }
}

/// Partially scanned content.
///
/// Holds text while scanning literal fragments. When a dynamic value is the
/// first thing accumulated it is kept as-is, so a component reference used as a
/// tag name reaches the tree without being stringified.
#[derive(Debug, Clone, PartialEq)]
pub enum Accumulator<T> {
    Text(String),
    Value(Value<T>),
}

impl<T> Default for Accumulator<T> {
    fn default() -> Self {
        Accumulator::Text(String::new())
    }
}

impl<T> Accumulator<T> {
    pub fn is_empty(&self) -> bool {
        matches!(self, Accumulator::Text(text) if text.is_empty())
    }

    /// True when the accumulator holds exactly the text `s`
    fn is_text(&self, s: &str) -> bool {
        matches!(self, Accumulator::Text(text) if text == s)
    }

    /// Append a value with string-concatenation semantics.
    ///
    /// An empty accumulator adopts the value itself. Otherwise both sides must
    /// have a string form.
    pub fn append(&mut self, value: Value<T>, state: State) -> Result<(), ParseError> {
        if self.is_empty() {
            *self = match value {
                Value::Str(text) => Accumulator::Text(text),
                other => Accumulator::Value(other),
            };
            return Ok(());
        }

        let Some(suffix) = value.to_text() else {
            return Err(not_joinable(&value, state));
        };
        self.push_str(&suffix, state)
    }

    fn push(&mut self, c: char, state: State) -> Result<(), ParseError> {
        self.push_str(c.encode_utf8(&mut [0; 4]), state)
    }

    /// Append text, coercing a held scalar value to its string form first.
    fn push_str(&mut self, suffix: &str, state: State) -> Result<(), ParseError> {
        match self {
            Accumulator::Text(text) => text.push_str(suffix),
            Accumulator::Value(value) => {
                let Some(mut text) = value.to_text() else {
                    return Err(not_joinable(value, state));
                };
                text.push_str(suffix);
                *self = Accumulator::Text(text);
            }
        }
        Ok(())
    }

    /// Reset to empty, returning the accumulated content as a value.
    pub fn take_value(&mut self) -> Value<T> {
        match std::mem::take(self) {
            Accumulator::Text(text) => Value::Str(text),
            Accumulator::Value(value) => value,
        }
    }

    /// Reset to empty, returning the accumulated content as text.
    ///
    /// A non-scalar value has no text and yields an empty string.
    pub fn take_text(&mut self) -> String {
        match std::mem::take(self) {
            Accumulator::Text(text) => text,
            Accumulator::Value(value) => value.to_text().unwrap_or_default(),
        }
    }
}

fn not_joinable<T>(value: &Value<T>, state: State) -> ParseError {
    ParseError::unsupported_interpolation(&value.describe(), state)
        .with_help("Only strings, numbers and booleans can be joined with surrounding text.")
}

/// Result of scanning one fragment: tokens plus the state to resume from
#[derive(Debug, Clone, PartialEq)]
pub struct Scan<T> {
    pub tokens: Vec<Token<T>>,
    pub state: State,
    pub acc: Accumulator<T>,
}

/// Push a token, logging it.
fn emit<T>(tokens: &mut Vec<Token<T>>, token: Token<T>) {
    log::trace!(target: "tagged_html::tokenizer", "emit token: {}", token.kind());
    tokens.push(token);
}

/// Flush pending text as an escaped `Text` token, unless it is blank.
pub(crate) fn flush_text<T>(tokens: &mut Vec<Token<T>>, acc: &mut Accumulator<T>) {
    let text = acc.take_text();
    if !text.trim().is_empty() {
        emit(tokens, Token::Text(escape_html(&text)));
    }
}

/// Scan one literal fragment, resuming from `state` and `acc`.
pub fn scan<T>(text: &str, state: State, acc: Accumulator<T>) -> Result<Scan<T>, ParseError> {
    let mut tokens = Vec::new();
    let mut state = state;
    let mut acc = acc;

    for c in text.chars() {
        match state {
            State::Text => {
                if c == '<' {
                    flush_text(&mut tokens, &mut acc);
                    state = State::Tag;
                } else {
                    acc.push(c, state)?;
                }
            }

            State::Tag => {
                if c.is_whitespace() {
                    emit(&mut tokens, Token::OpenTag(acc.take_value()));
                    state = State::Attr;
                } else if c == '>' {
                    emit(&mut tokens, Token::OpenTag(acc.take_value()));
                    emit(&mut tokens, Token::CloseTag);
                    state = State::Text;
                } else if c == '/' && acc.is_empty() {
                    state = State::ClosingTag;
                } else {
                    acc.push(c, state)?;
                }
            }

            State::ClosingTag => {
                if c == '>' {
                    emit(&mut tokens, Token::ClosingTag(acc.take_value()));
                    state = State::Text;
                } else {
                    acc.push(c, state)?;
                }
            }

            State::Attr => {
                if c == '>' {
                    let token = if acc.is_text("/") {
                        Token::SelfCloseTag
                    } else {
                        Token::CloseTag
                    };
                    acc = Accumulator::default();
                    emit(&mut tokens, token);
                    state = State::Text;
                } else if c.is_whitespace() {
                    // Ignored between attributes
                } else if c == '/' {
                    // Kept to detect `/>`
                    acc.push(c, state)?;
                } else {
                    acc.push(c, state)?;
                    state = State::AttrKey;
                }
            }

            State::AttrKey => {
                if c == '=' {
                    // The name may have come from a dynamic value in an
                    // earlier fragment, leaving nothing here
                    let name = acc.take_text();
                    if !name.is_empty() {
                        emit(&mut tokens, Token::AttributeName(name));
                    }
                    state = State::AttrValue;
                } else if c.is_whitespace() {
                    let name = acc.take_text();
                    if !name.is_empty() {
                        emit(&mut tokens, Token::AttributeName(name));
                    }
                    state = State::Attr;
                } else {
                    acc.push(c, state)?;
                }
            }

            State::AttrValue => {
                if c.is_whitespace() {
                    emit(&mut tokens, Token::AttributeValue(acc.take_value()));
                    state = State::Attr;
                } else if c == '>' {
                    emit(&mut tokens, Token::AttributeValue(acc.take_value()));
                    emit(&mut tokens, Token::CloseTag);
                    state = State::Text;
                } else if c == '\'' && acc.is_empty() {
                    state = State::AttrValueSingleQuote;
                } else if c == '"' && acc.is_empty() {
                    state = State::AttrValueDoubleQuote;
                } else {
                    acc.push(c, state)?;
                }
            }

            State::AttrValueSingleQuote | State::AttrValueDoubleQuote => {
                let quote = if state == State::AttrValueSingleQuote { '\'' } else { '"' };
                if c == quote {
                    emit(&mut tokens, Token::AttributeValue(acc.take_value()));
                    state = State::Attr;
                } else {
                    acc.push(c, state)?;
                }
            }
        }
    }

    Ok(Scan { tokens, state, acc })
}
