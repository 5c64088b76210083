//! Wire-text codecs: the array literal codec and the escaping it relies on.

mod array;
mod escape;

pub use array::{parse_array, parse_text_array, serialize_array, MAX_DEPTH};
pub use escape::{escape_array_element, escape_identifier};
