//! Positional access to wire arrays.
use serde_json::Value as Json;

use crate::error::{WireError, WireResult};

static NULL: Json = Json::Null;

/// Borrowed view of a wire array, with every accessor reporting errors
/// against the whole array.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Node<'a> {
    pub wire: &'a Json,
    pub items: &'a [Json],
}

impl<'a> Node<'a> {
    /// A tagged node: an array whose first element is its string
    /// discriminator.
    pub fn open(wire: &'a Json) -> WireResult<(&'a str, Self)> {
        let node = Self::tuple(wire)?;
        let token = node
            .items
            .first()
            .ok_or_else(|| WireError::malformed("missing discriminator", wire))?
            .as_str()
            .ok_or_else(|| WireError::malformed("discriminator is not a string", wire))?;
        Ok((token, node))
    }

    /// An untagged positional structure.
    pub fn tuple(wire: &'a Json) -> WireResult<Self> {
        let items = wire
            .as_array()
            .ok_or_else(|| WireError::malformed("expected an array", wire))?;
        Ok(Self { wire, items })
    }

    /// Check the element count against the legal arities of `kind`.
    pub fn arity(&self, kind: &'static str, allowed: &[usize]) -> WireResult<usize> {
        let found = self.items.len();
        if allowed.contains(&found) {
            return Ok(found);
        }

        let expected = match allowed {
            [] => String::from("none"),
            [single] => single.to_string(),
            [init @ .., last] => {
                let init: Vec<String> = init.iter().map(ToString::to_string).collect();
                format!("{} or {last}", init.join(", "))
            }
        };
        Err(WireError::Arity {
            kind,
            found,
            expected,
            node: self.wire.clone(),
        })
    }

    /// Element `i`, `null` past the end.
    pub fn field(&self, i: usize) -> &'a Json {
        self.items.get(i).unwrap_or(&NULL)
    }

    /// Element `i` unless missing or `null`.
    pub fn opt(&self, i: usize) -> Option<&'a Json> {
        self.items.get(i).filter(|v| !v.is_null())
    }

    pub fn index(&self, i: usize) -> WireResult<usize> {
        index_of(self.field(i)).ok_or_else(|| self.malformed(format!("element {i} is not an index")))
    }

    pub fn array(&self, i: usize) -> WireResult<&'a [Json]> {
        self.field(i)
            .as_array()
            .map(Vec::as_slice)
            .ok_or_else(|| self.malformed(format!("element {i} is not an array")))
    }

    pub fn string(&self, i: usize) -> WireResult<&'a str> {
        self.field(i)
            .as_str()
            .ok_or_else(|| self.malformed(format!("element {i} is not a string")))
    }

    pub fn boolean(&self, i: usize) -> WireResult<bool> {
        self.field(i)
            .as_bool()
            .ok_or_else(|| self.malformed(format!("element {i} is not a boolean")))
    }

    pub fn malformed(&self, message: impl Into<String>) -> WireError {
        WireError::malformed(message, self.wire)
    }
}

/// A context index: a non-negative integer that fits in `usize`.
pub(crate) fn index_of(value: &Json) -> Option<usize> {
    value.as_u64().and_then(|i| usize::try_from(i).ok())
}

/// Wire array from heterogeneous elements, each converted with `Json::from`.
macro_rules! wire {
    ($($item:expr),* $(,)?) => {
        serde_json::Value::Array(vec![$(serde_json::Value::from($item)),*])
    };
}
pub(crate) use wire;

/// Drop trailing `null` placeholders down to `min` elements.
pub(crate) fn trimmed(mut items: Vec<Json>, min: usize) -> Json {
    while items.len() > min && items.last().is_some_and(Json::is_null) {
        items.pop();
    }
    Json::Array(items)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn trailing_nulls_are_trimmed() {
        let trimmed = trimmed(vec![json!("+"), json!([]), json!([]), Json::Null, Json::Null], 3);
        assert_eq!(trimmed, json!(["+", [], []]));
        assert_eq!(
            super::trimmed(vec![json!("!!"), Json::Null], 2),
            json!(["!!", null])
        );
        assert_eq!(
            super::trimmed(vec![json!("->"), json!(0), json!(1), Json::Null, json!(2)], 3),
            json!(["->", 0, 1, null, 2])
        );
    }

    #[test]
    fn arity_message_lists_alternatives() {
        let wire = json!(["+", 1]);
        let (token, node) = Node::open(&wire).unwrap();
        assert_eq!(token, "+");
        let err = node.arity("Add", &[3, 4, 5]).unwrap_err();
        assert_eq!(err.to_string(), "Node `Add` has 2 elements, expected 3, 4 or 5.");
        assert_eq!(err.node(), Some(&wire));
    }

    #[test]
    fn shape_errors() {
        assert!(Node::open(&json!({"a": 1})).unwrap_err().is_malformed());
        assert!(Node::open(&json!([])).unwrap_err().is_malformed());
        assert!(Node::open(&json!([1, 2])).unwrap_err().is_malformed());
        let wire = json!(["x", -1, "s"]);
        let (_, node) = Node::open(&wire).unwrap();
        assert!(node.index(1).is_err());
        assert_eq!(node.string(2).unwrap(), "s");
        assert!(node.opt(7).is_none());
    }
}
