pub mod interpolation;
pub mod tokenizer;
mod tree_builder;

pub use interpolation::absorb;
pub use tokenizer::{Accumulator, Scan, State, Token, scan};
pub use tree_builder::{TreeBuilder, build_tree};

use crate::error::ParseError;
use crate::value::Value;

/// Tokenize a template given as literal fragments and interpolated values.
///
/// Fragment `i` is scanned, then value `i` is merged in at whatever state the
/// scan stopped in. There should be exactly one fewer value than fragments;
/// surplus values are ignored. Content still pending after the last fragment
/// (an unterminated tag, say) is dropped.
pub fn tokenize_template<T>(
    fragments: &[&str],
    values: Vec<Value<T>>,
) -> Result<Vec<Token<T>>, ParseError> {
    if values.len() >= fragments.len() && !values.is_empty() {
        log::warn!(
            target: "tagged_html::parser",
            "{} values for {} fragments; ignoring the surplus",
            values.len(),
            fragments.len()
        );
    }

    let mut tokens = Vec::new();
    let mut state = State::default();
    let mut acc = Accumulator::default();
    let mut values = values.into_iter();

    for (index, fragment) in fragments.iter().enumerate() {
        // A held value that cannot join the literal text came from the
        // previous interpolation
        let scanned = scan(fragment, state, acc).map_err(|err| match index.checked_sub(1) {
            Some(previous) => err.with_value_index(previous),
            None => err,
        })?;
        tokens.extend(scanned.tokens);

        // The last fragment has no value after it
        let value = if index + 1 < fragments.len() { values.next() } else { None };
        let absorbed = absorb(value, scanned.state, scanned.acc)
            .map_err(|err| err.with_value_index(index))?;
        tokens.extend(absorbed.tokens);

        state = absorbed.state;
        acc = absorbed.acc;
    }

    if !acc.is_empty() {
        log::debug!(
            target: "tagged_html::parser",
            "discarding unflushed content in state {}",
            state.as_str()
        );
    }
    log::debug!(
        target: "tagged_html::parser",
        "tokenized {} fragments into {} tokens",
        fragments.len(),
        tokens.len()
    );

    Ok(tokens)
}
