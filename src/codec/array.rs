//! Array literal codec.
//!
//! Grammar handled here:
//!
//! ```text
//! literal  := [dims '='] array
//! array    := '{' [element (sep element)*] '}'
//! element  := array | quoted | bare
//! quoted   := '"' (('\' any) | [^"\\])* '"'
//! bare     := [^{}",]+
//! sep      := ','  (optional between two quoted or nested elements)
//! ```
//!
//! Bare `NULL` (any case) is a null element; a quoted `"NULL"` is text.
//! Nesting deeper than [`MAX_DEPTH`] levels is rejected as malformed.
//! Both directions take the per-element function from the caller, so the
//! same machinery serves arrays of every registered type.

use crate::codec::escape::escape_array_element;
use crate::error::{CodecError, Result};
use crate::types::Value;

/// Deepest nesting `parse_array` accepts.
pub const MAX_DEPTH: usize = 64;

/// Serialize a (possibly nested) sequence into an array literal.
///
/// When the first element is an untagged array every element is rendered as a
/// nested literal. Otherwise each element is passed through
/// `serialize_element` (with any type tag unwrapped), escaped and quoted.
pub fn serialize_array<F>(elements: &[Value], serialize_element: &F) -> String
where
    F: Fn(&Value) -> String + ?Sized,
{
    if elements.is_empty() {
        return "{}".to_string();
    }

    let nested = matches!(elements[0], Value::Array(_));

    let mut out = String::from("{");
    for (i, element) in elements.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        match element {
            Value::Array(inner) if nested => out.push_str(&serialize_array(inner, serialize_element)),
            Value::Null => out.push_str("NULL"),
            other => {
                out.push('"');
                out.push_str(&escape_array_element(&serialize_element(other.untagged())));
                out.push('"');
            }
        }
    }
    out.push('}');
    out
}

/// Parse an array literal into a nested sequence.
///
/// Each scalar is handed to `parse_element`; nested literals become
/// `Value::Array`. Input that does not start with `{` is read as a bare
/// element list, which is how a caller passes a fragment.
pub fn parse_array<F>(text: &str, parse_element: &F) -> Result<Vec<Value>>
where
    F: Fn(&str) -> Result<Value> + ?Sized,
{
    let mut scanner = Scanner::new(text);
    scanner.skip_dimensions()?;

    if scanner.peek() == Some(b'{') {
        scanner.pos += 1;
        let elements = scanner.elements(true, 1, parse_element)?;
        if scanner.pos < text.len() {
            return Err(CodecError::malformed(scanner.pos, "trailing input after array"));
        }
        Ok(elements)
    } else {
        scanner.elements(false, 0, parse_element)
    }
}

/// Parse an array literal keeping scalars as text.
pub fn parse_text_array(text: &str) -> Result<Vec<Value>> {
    parse_array(text, &|s: &str| -> Result<Value> { Ok(Value::Text(s.to_string())) })
}

#[derive(Clone, Copy)]
enum State {
    /// Just after `{` or at the start of a fragment.
    Start,
    /// Just after `,`; an element must follow.
    Separated,
    /// Inside a bare token that began at the given offset.
    Bare(usize),
    /// After a quoted or nested element; only `,`, `}` or another
    /// quoted/nested element may follow.
    Closed,
}

/// Call-local scan state. A fresh scanner is built per call.
struct Scanner<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            bytes: text.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    /// Skip a `[lower:upper]...=` prefix.
    fn skip_dimensions(&mut self) -> Result<()> {
        if self.peek() != Some(b'[') {
            return Ok(());
        }
        match self.text.find('=') {
            Some(eq) => {
                self.pos = eq + 1;
                Ok(())
            }
            None => Err(CodecError::malformed(0, "dimension decoration without '='")),
        }
    }

    /// Read elements up to the matching `}` (when `nested`) or end of input.
    ///
    /// On return from a nested call `pos` is just past the closing brace.
    /// `depth` counts the braces already open.
    fn elements<F>(&mut self, nested: bool, depth: usize, parse_element: &F) -> Result<Vec<Value>>
    where
        F: Fn(&str) -> Result<Value> + ?Sized,
    {
        let mut items = Vec::new();
        let mut state = State::Start;

        loop {
            let Some(c) = self.peek() else {
                if nested {
                    return Err(CodecError::malformed(self.pos, "unterminated array"));
                }
                return match state {
                    State::Bare(start) => {
                        items.push(bare(&self.text[start..], parse_element)?);
                        Ok(items)
                    }
                    State::Separated => Err(CodecError::malformed(self.pos, "trailing separator")),
                    State::Start | State::Closed => Ok(items),
                };
            };

            match (c, state) {
                (b'}', _) if !nested => {
                    return Err(CodecError::malformed(self.pos, "unexpected '}'"));
                }
                (b'}', State::Separated) => {
                    return Err(CodecError::malformed(self.pos, "empty element before '}'"));
                }
                (b'}', State::Bare(start)) => {
                    items.push(bare(&self.text[start..self.pos], parse_element)?);
                    self.pos += 1;
                    return Ok(items);
                }
                (b'}', State::Start | State::Closed) => {
                    self.pos += 1;
                    return Ok(items);
                }
                (b',', State::Bare(start)) => {
                    items.push(bare(&self.text[start..self.pos], parse_element)?);
                    state = State::Separated;
                }
                (b',', State::Closed) => state = State::Separated,
                (b',', State::Start | State::Separated) => {
                    return Err(CodecError::malformed(self.pos, "empty element"));
                }
                (b'"' | b'{', State::Bare(_)) => {
                    return Err(CodecError::malformed(self.pos, "structural character inside bare element"));
                }
                (b'"', _) => {
                    let raw = self.quoted()?;
                    items.push(parse_element(&raw)?);
                    state = State::Closed;
                    continue;
                }
                (b'{', _) => {
                    if depth >= MAX_DEPTH {
                        return Err(CodecError::malformed(self.pos, "array nesting too deep"));
                    }
                    self.pos += 1;
                    items.push(Value::Array(self.elements(true, depth + 1, parse_element)?));
                    state = State::Closed;
                    continue;
                }
                (_, State::Closed) => {
                    return Err(CodecError::malformed(self.pos, "unexpected character after element"));
                }
                (_, State::Start | State::Separated) => state = State::Bare(self.pos),
                (_, State::Bare(_)) => {}
            }
            self.pos += 1;
        }
    }

    /// Read a quoted element starting at the opening quote, unescaping as it
    /// goes. Leaves `pos` just past the closing quote.
    fn quoted(&mut self) -> Result<String> {
        let open = self.pos;
        let mut buf = String::new();
        let mut segment = open + 1;
        let mut i = open + 1;

        while let Some(&c) = self.bytes.get(i) {
            match c {
                b'\\' => {
                    if i + 1 >= self.bytes.len() {
                        break;
                    }
                    buf.push_str(&self.text[segment..i]);
                    // escaped character opens the next segment
                    segment = i + 1;
                    i += 2;
                }
                b'"' => {
                    buf.push_str(&self.text[segment..i]);
                    self.pos = i + 1;
                    return Ok(buf);
                }
                _ => i += 1,
            }
        }

        Err(CodecError::malformed(open, "unterminated quoted element"))
    }
}

fn bare<F>(token: &str, parse_element: &F) -> Result<Value>
where
    F: Fn(&str) -> Result<Value> + ?Sized,
{
    if token.eq_ignore_ascii_case("NULL") {
        Ok(Value::Null)
    } else {
        parse_element(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    fn number(s: &str) -> Result<Value> {
        s.trim()
            .parse::<f64>()
            .map(Value::Number)
            .map_err(|e| CodecError::value_parse(0, s, Box::new(e)))
    }

    fn to_text(v: &Value) -> String {
        v.to_text()
    }

    // =========================================================================
    // Serialization
    // =========================================================================

    #[rstest]
    fn test_serialize_empty() {
        assert_eq!(serialize_array(&[], &to_text), "{}");
    }

    #[rstest]
    fn test_serialize_quotes_every_scalar() {
        let xs = vec![Value::Number(1.0), Value::Number(2.5)];
        assert_eq!(serialize_array(&xs, &to_text), r#"{"1","2.5"}"#);
    }

    #[rstest]
    fn test_serialize_escapes_quote_and_backslash() {
        let xs = vec![text(r#"a"b"#), text(r"c\d")];
        assert_eq!(serialize_array(&xs, &to_text), r#"{"a\"b","c\\d"}"#);
    }

    #[rstest]
    fn test_serialize_nested() {
        let xs = vec![
            Value::Array(vec![text("a"), text("b")]),
            Value::Array(vec![text("c")]),
        ];
        assert_eq!(serialize_array(&xs, &to_text), r#"{{"a","b"},{"c"}}"#);
    }

    #[rstest]
    fn test_serialize_nested_empty() {
        let xs = vec![Value::Array(vec![])];
        assert_eq!(serialize_array(&xs, &to_text), "{{}}");
    }

    #[rstest]
    fn test_serialize_unwraps_type_tag() {
        let xs = vec![Value::typed(20, Value::BigInt(7))];
        assert_eq!(serialize_array(&xs, &to_text), r#"{"7"}"#);
    }

    #[rstest]
    fn test_serialize_tagged_array_first_element_is_quoted() {
        // a tagged array is a scalar to the outer literal
        let xs = vec![Value::typed(3802, Value::Array(vec![Value::Number(1.0)]))];
        let serialize = |v: &Value| v.to_json().to_string();
        assert_eq!(serialize_array(&xs, &serialize), r#"{"[1]"}"#);
    }

    #[rstest]
    fn test_serialize_null_is_bare() {
        let xs = vec![text("a"), Value::Null];
        assert_eq!(serialize_array(&xs, &to_text), r#"{"a",NULL}"#);
    }

    #[rstest]
    fn test_serialize_uses_element_serializer() {
        let xs = vec![Value::Bool(true), Value::Bool(false)];
        let serialize = |v: &Value| match v {
            Value::Bool(true) => "t".to_string(),
            _ => "f".to_string(),
        };
        assert_eq!(serialize_array(&xs, &serialize), r#"{"t","f"}"#);
    }

    // =========================================================================
    // Parsing
    // =========================================================================

    #[rstest]
    fn test_parse_empty() {
        assert_eq!(parse_text_array("{}").unwrap(), vec![]);
    }

    #[rstest]
    fn test_parse_nested_empty() {
        assert_eq!(parse_text_array("{{}}").unwrap(), vec![Value::Array(vec![])]);
    }

    #[rstest]
    fn test_parse_mixed_nesting_with_numbers() {
        let parsed = parse_array("{1,{2,3},4}", &number).unwrap();
        assert_eq!(
            parsed,
            vec![
                Value::Number(1.0),
                Value::Array(vec![Value::Number(2.0), Value::Number(3.0)]),
                Value::Number(4.0),
            ]
        );
    }

    #[rstest]
    fn test_parse_bare_tokens() {
        assert_eq!(
            parse_text_array("{a,b,c}").unwrap(),
            vec![text("a"), text("b"), text("c")]
        );
    }

    #[rstest]
    fn test_parse_quoted_with_structural_characters() {
        assert_eq!(
            parse_text_array(r#"{"a,b","{c}",d}"#).unwrap(),
            vec![text("a,b"), text("{c}"), text("d")]
        );
    }

    #[rstest]
    fn test_parse_escapes() {
        assert_eq!(
            parse_text_array(r#"{"a\"b","c\\d"}"#).unwrap(),
            vec![text(r#"a"b"#), text(r"c\d")]
        );
    }

    #[rstest]
    fn test_parse_adjacent_quoted_without_separator() {
        assert_eq!(
            parse_text_array(r#"{"a""b"}"#).unwrap(),
            vec![text("a"), text("b")]
        );
    }

    #[rstest]
    fn test_parse_nested_then_separator_does_not_emit_empty() {
        assert_eq!(
            parse_text_array("{{a},{b}}").unwrap(),
            vec![Value::Array(vec![text("a")]), Value::Array(vec![text("b")])]
        );
    }

    #[rstest]
    fn test_parse_double_close_does_not_emit_empty() {
        assert_eq!(
            parse_text_array("{{{x}}}").unwrap(),
            vec![Value::Array(vec![Value::Array(vec![text("x")])])]
        );
    }

    #[rstest]
    fn test_parse_empty_quoted_string() {
        assert_eq!(parse_text_array(r#"{"",a}"#).unwrap(), vec![text(""), text("a")]);
    }

    #[rstest]
    #[case("{NULL}")]
    #[case("{null}")]
    fn test_parse_bare_null(#[case] input: &str) {
        assert_eq!(parse_text_array(input).unwrap(), vec![Value::Null]);
    }

    #[rstest]
    fn test_parse_quoted_null_is_text() {
        assert_eq!(parse_text_array(r#"{"NULL"}"#).unwrap(), vec![text("NULL")]);
    }

    #[rstest]
    fn test_parse_multibyte_text() {
        assert_eq!(
            parse_text_array(r#"{héllo,"wörld\"ß"}"#).unwrap(),
            vec![text("héllo"), text("wörld\"ß")]
        );
    }

    #[rstest]
    fn test_parse_skips_dimension_decoration() {
        assert_eq!(
            parse_array("[0:1]={1,2}", &number).unwrap(),
            vec![Value::Number(1.0), Value::Number(2.0)]
        );
    }

    #[rstest]
    fn test_parse_bare_fragment() {
        assert_eq!(
            parse_text_array("a,b").unwrap(),
            vec![text("a"), text("b")]
        );
    }

    #[rstest]
    #[case("{1,2")]
    #[case(r#"{"abc}"#)]
    #[case("{1,,2}")]
    #[case("{1,}")]
    #[case("{,1}")]
    #[case(r#"{"a"b}"#)]
    #[case("{1}}")]
    #[case("{1}x")]
    #[case(r#"{a"b"}"#)]
    #[case("a}")]
    #[case("[1:2]{1,2}")]
    fn test_parse_malformed(#[case] input: &str) {
        let err = parse_text_array(input).unwrap_err();
        assert!(
            matches!(err, CodecError::MalformedArrayLiteral { .. }),
            "expected malformed error for {input:?}, got {err:?}"
        );
    }

    #[rstest]
    #[case("{".repeat(100_000))]
    #[case(format!("{}{}", "{".repeat(MAX_DEPTH + 1), "}".repeat(MAX_DEPTH + 1)))]
    #[case(format!("a,{}", "{".repeat(MAX_DEPTH + 1)))]
    fn test_parse_rejects_deep_nesting(#[case] input: String) {
        let err = parse_text_array(&input).unwrap_err();
        assert!(matches!(err, CodecError::MalformedArrayLiteral { .. }), "got {err:?}");
    }

    #[rstest]
    fn test_parse_accepts_nesting_at_limit() {
        let input = format!("{}x{}", "{".repeat(MAX_DEPTH), "}".repeat(MAX_DEPTH));
        let mut parsed = Value::Array(parse_text_array(&input).unwrap());
        for _ in 1..MAX_DEPTH {
            parsed = match parsed {
                Value::Array(mut xs) if xs.len() == 1 => xs.remove(0),
                other => panic!("Expected single-element array, got {other:?}"),
            };
        }
        assert_eq!(parsed, Value::Array(vec![text("x")]));
    }

    #[rstest]
    fn test_parse_element_error_propagates() {
        let err = parse_array("{1,x}", &number).unwrap_err();
        assert!(matches!(err, CodecError::ValueParse { .. }));
    }

    // =========================================================================
    // Round trips against the serializer
    // =========================================================================

    #[rstest]
    #[case(vec![text("plain"), text("with space"), text("")])]
    #[case(vec![text(r#"a"b"#), text(r"c\d"), text(r#"\""#)])]
    #[case(vec![text("{"), text("}"), text(","), text("{,}")])]
    #[case(vec![text("NULL"), Value::Null])]
    #[case(vec![
        Value::Array(vec![text("a"), text("b")]),
        Value::Array(vec![]),
        Value::Array(vec![Value::Array(vec![text("deep\"")])]),
    ])]
    fn test_round_trip_text(#[case] input: Vec<Value>) {
        let wire = serialize_array(&input, &to_text);
        assert_eq!(parse_text_array(&wire).unwrap(), input, "wire: {wire}");
    }

    const ATOMS: [&str; 10] = ["\"", "\\", "{", "}", ",", " ", "NULL", "", "ünï", "ß\\\"x"];

    /// A scalar built from one or two atoms, or a null.
    fn atom(seed: usize) -> Value {
        let n = seed % (ATOMS.len() + 1);
        if n == ATOMS.len() {
            return Value::Null;
        }
        let m = (seed / 7) % ATOMS.len();
        text(&format!("{}{}", ATOMS[n], ATOMS[m]))
    }

    /// Deterministic array of up to three elements, `depth` levels deep.
    fn tree(seed: usize, depth: usize) -> Vec<Value> {
        (0..seed % 4)
            .map(|i| {
                let next = seed.wrapping_mul(31).wrapping_add(i * 17 + 5);
                if depth > 1 {
                    Value::Array(tree(next, depth - 1))
                } else {
                    atom(next)
                }
            })
            .collect()
    }

    #[rstest]
    fn test_round_trip_generated(#[values(1, 2, 3)] depth: usize) {
        for seed in 0..500 {
            let input = tree(seed, depth);
            let wire = serialize_array(&input, &to_text);
            assert_eq!(
                parse_text_array(&wire).unwrap(),
                input,
                "seed {seed}, wire: {wire}"
            );
        }
    }

    #[rstest]
    fn test_round_trip_numbers() {
        let input = vec![
            Value::Array(vec![Value::Number(1.0), Value::Number(-2.5)]),
            Value::Array(vec![Value::Number(3e10), Value::Number(0.125)]),
        ];
        let wire = serialize_array(&input, &to_text);
        assert_eq!(parse_array(&wire, &number).unwrap(), input);
    }
}
