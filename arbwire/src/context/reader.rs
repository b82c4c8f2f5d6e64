use arbexpr::{Label, Member, Type};
use log::debug;
use serde_json::Value as Json;

use crate::{
    context::IndexSpace,
    error::{WireError, WireResult},
    magic::{
        CONTEXT_LABELS, CONTEXT_MEMBERS, CONTEXT_TYPES, MEMBER_CONSTRUCTOR, MEMBER_FIELD,
        MEMBER_METHOD, MEMBER_PROPERTY, TYPE_ARRAY, TYPE_GENERIC, TYPE_RECORD, TYPE_SIMPLE,
    },
    wire::{Node, index_of},
};

/// Resolution state of one context entry.
#[derive(Debug)]
enum Slot<T> {
    Raw,
    Resolving,
    Ready(T),
}

/// Decoding side of the context.
///
/// Descriptors are materialized on first access and cached, so every
/// reference to a label index yields the same [`Label`] handle. A descriptor
/// that (directly or not) refers back to an entry under resolution is
/// rejected as a self reference.
#[derive(Debug)]
pub struct ContextReader<'a> {
    types: &'a [Json],
    type_slots: Vec<Slot<Type>>,
    members: &'a [Json],
    member_slots: Vec<Slot<Member>>,
    labels: &'a [Json],
    label_slots: Vec<Slot<Label>>,
}

fn slots<T>(len: usize) -> Vec<Slot<T>> {
    std::iter::repeat_with(|| Slot::Raw).take(len).collect()
}

/// Take a cached entry, or mark it as being resolved.
fn claim<T: Clone>(
    slots: &mut [Slot<T>],
    space: IndexSpace,
    index: usize,
    at: &Json,
) -> WireResult<Option<T>> {
    let len = slots.len();
    match slots.get_mut(index) {
        None => Err(WireError::IndexOutOfRange {
            space,
            index: index as u64,
            len,
            node: at.clone(),
        }),
        Some(Slot::Ready(entry)) => Ok(Some(entry.clone())),
        Some(Slot::Resolving) => Err(WireError::SelfReference {
            space,
            index,
            node: at.clone(),
        }),
        Some(slot) => {
            *slot = Slot::Resolving;
            Ok(None)
        }
    }
}

impl<'a> ContextReader<'a> {
    /// Validate the `Context` object of an envelope. Only the `Types`,
    /// `Members` and `Labels` arrays are allowed, each optional.
    pub fn new(context: &'a Json) -> WireResult<Self> {
        let object = context
            .as_object()
            .ok_or_else(|| WireError::malformed("context must be an object", context))?;

        if let Some(key) = object
            .keys()
            .find(|key| ![CONTEXT_TYPES, CONTEXT_MEMBERS, CONTEXT_LABELS].contains(&key.as_str()))
        {
            return Err(WireError::malformed(
                format!("unexpected context field `{key}`"),
                context,
            ));
        }

        let space = |key: &str| -> WireResult<&'a [Json]> {
            match object.get(key) {
                None => Ok(&[]),
                Some(Json::Array(entries)) => Ok(entries.as_slice()),
                Some(_) => Err(WireError::malformed(
                    format!("context field `{key}` must be an array"),
                    context,
                )),
            }
        };

        let types = space(CONTEXT_TYPES)?;
        let members = space(CONTEXT_MEMBERS)?;
        let labels = space(CONTEXT_LABELS)?;
        Ok(Self {
            types,
            type_slots: slots(types.len()),
            members,
            member_slots: slots(members.len()),
            labels,
            label_slots: slots(labels.len()),
        })
    }

    /// Entry counts of the types, members and labels spaces.
    pub fn counts(&self) -> (usize, usize, usize) {
        (self.types.len(), self.members.len(), self.labels.len())
    }

    /// Type at `index`. `at` is the node holding the reference.
    pub fn get_type(&mut self, index: usize, at: &Json) -> WireResult<Type> {
        if let Some(ty) = claim(&mut self.type_slots, IndexSpace::Types, index, at)? {
            return Ok(ty);
        }

        let types: &'a [Json] = self.types;
        let wire = &types[index];
        let (tag, node) = Node::open(wire)?;
        let ty = match tag {
            TYPE_SIMPLE => {
                node.arity("type descriptor", &[2, 3])?;
                let name = node.string(1)?;
                match node.opt(2) {
                    Some(_) => Type::qualified(name, node.string(2)?),
                    None => Type::simple(name),
                }
            }
            TYPE_GENERIC => {
                node.arity("generic type descriptor", &[3])?;
                let definition = self.get_type(node.index(1)?, wire)?;
                let arguments = self.type_list(node.array(2)?, wire)?;
                Type::generic(definition, arguments)
            }
            TYPE_ARRAY => {
                node.arity("array type descriptor", &[2, 3])?;
                let element = self.get_type(node.index(1)?, wire)?;
                match node.opt(2) {
                    Some(rank) => {
                        let rank = rank
                            .as_u64()
                            .and_then(|r| u32::try_from(r).ok())
                            .filter(|r| *r > 0)
                            .ok_or_else(|| node.malformed("array rank must be a positive integer"))?;
                        Type::array_of_rank(element, rank)
                    }
                    None => Type::array(element),
                }
            }
            TYPE_RECORD => {
                node.arity("record type descriptor", &[2, 3])?;
                let anonymous = match node.opt(2) {
                    Some(_) => node.boolean(2)?,
                    None => false,
                };
                let mut fields = Vec::new();
                for field in node.array(1)? {
                    let field = Node::tuple(field)?;
                    field.arity("record field", &[2])?;
                    fields.push((field.string(0)?, self.get_type(field.index(1)?, wire)?));
                }
                if anonymous {
                    Type::anonymous(fields)
                } else {
                    Type::record(fields)
                }
            }
            other => {
                return Err(WireError::UnknownDiscriminator {
                    token: other.to_string(),
                    node: wire.clone(),
                });
            }
        };

        debug!("Materialized type #{index} as `{ty}`");
        self.type_slots[index] = Slot::Ready(ty.clone());
        Ok(ty)
    }

    fn type_list(&mut self, items: &'a [Json], at: &Json) -> WireResult<Vec<Type>> {
        items
            .iter()
            .map(|item| {
                let index = index_of(item)
                    .ok_or_else(|| WireError::malformed("expected a type index", at))?;
                self.get_type(index, at)
            })
            .collect()
    }

    /// Member at `index`. `at` is the node holding the reference.
    pub fn get_member(&mut self, index: usize, at: &Json) -> WireResult<Member> {
        if let Some(member) = claim(&mut self.member_slots, IndexSpace::Members, index, at)? {
            return Ok(member);
        }

        let members: &'a [Json] = self.members;
        let wire = &members[index];
        let (tag, node) = Node::open(wire)?;
        let member = match tag {
            MEMBER_CONSTRUCTOR => {
                node.arity("constructor descriptor", &[3])?;
                let declaring_type = self.get_type(node.index(1)?, wire)?;
                let parameters = self.type_list(node.array(2)?, wire)?;
                Member::constructor(declaring_type, parameters)
            }
            MEMBER_FIELD => {
                node.arity("field descriptor", &[4])?;
                let declaring_type = self.get_type(node.index(1)?, wire)?;
                let field_type = self.get_type(node.index(3)?, wire)?;
                Member::field(declaring_type, node.string(2)?, field_type)
            }
            MEMBER_PROPERTY => {
                node.arity("property descriptor", &[4, 5])?;
                let declaring_type = self.get_type(node.index(1)?, wire)?;
                let property_type = self.get_type(node.index(3)?, wire)?;
                let index_parameters = match node.opt(4) {
                    Some(_) => self.type_list(node.array(4)?, wire)?,
                    None => Vec::new(),
                };
                Member::indexer(declaring_type, node.string(2)?, property_type, index_parameters)
            }
            MEMBER_METHOD => {
                node.arity("method descriptor", &[5, 6])?;
                let declaring_type = self.get_type(node.index(1)?, wire)?;
                let parameters = self.type_list(node.array(3)?, wire)?;
                let return_type = self.get_type(node.index(4)?, wire)?;
                let generic_arguments = match node.opt(5) {
                    Some(_) => self.type_list(node.array(5)?, wire)?,
                    None => Vec::new(),
                };
                Member::generic_method(
                    declaring_type,
                    node.string(2)?,
                    parameters,
                    return_type,
                    generic_arguments,
                )
            }
            other => {
                return Err(WireError::UnknownDiscriminator {
                    token: other.to_string(),
                    node: wire.clone(),
                });
            }
        };

        debug!("Materialized member #{index} as `{member}`");
        self.member_slots[index] = Slot::Ready(member.clone());
        Ok(member)
    }

    /// Label at `index`. Repeated calls return the same handle.
    pub fn get_label(&mut self, index: usize, at: &Json) -> WireResult<Label> {
        if let Some(label) = claim(&mut self.label_slots, IndexSpace::Labels, index, at)? {
            return Ok(label);
        }

        let labels: &'a [Json] = self.labels;
        let wire = &labels[index];
        let node = Node::tuple(wire)?;
        node.arity("label descriptor", &[1, 2])?;
        let ty = self.get_type(node.index(0)?, wire)?;
        let name = match node.opt(1) {
            Some(_) => Some(node.string(1)?),
            None => None,
        };
        let label = Label::new(ty, name);

        debug!("Materialized label #{index} as `{label}`");
        self.label_slots[index] = Slot::Ready(label.clone());
        Ok(label)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn resolves_lazily_and_caches() {
        let context = json!({
            "Types": [["::", "List`1"], ["::", "i32"], ["<>", 0, [1]], ["[]", 1, 2]],
            "Labels": [[1, "exit"]],
        });
        let mut reader = ContextReader::new(&context).unwrap();
        let at = json!(null);
        assert_eq!(
            reader.get_type(2, &at).unwrap(),
            Type::generic(Type::simple("List`1"), [Type::i32()])
        );
        assert_eq!(
            reader.get_type(3, &at).unwrap(),
            Type::array_of_rank(Type::i32(), 2)
        );
        let a = reader.get_label(0, &at).unwrap();
        let b = reader.get_label(0, &at).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.name(), Some("exit"));
    }

    #[test]
    fn rejects_bad_indices() {
        let context = json!({"Types": [["<>", 0, []], ["[]", 7]]});
        let mut reader = ContextReader::new(&context).unwrap();
        let at = json!(["df", 0]);
        assert!(reader.get_type(0, &at).unwrap_err().is_self_reference());
        let err = reader.get_type(1, &at).unwrap_err();
        assert!(err.is_index_out_of_range());
        assert_eq!(err.node(), Some(&json!(["[]", 7])));
        assert!(reader.get_member(0, &at).unwrap_err().is_index_out_of_range());
    }

    #[test]
    fn rejects_unknown_fields() {
        assert!(ContextReader::new(&json!({"Kinds": []})).is_err());
        assert!(ContextReader::new(&json!({"Types": {}})).is_err());
        assert!(ContextReader::new(&json!([])).is_err());
        let context = json!({"Types": [["?", "x"]]});
        let mut reader = ContextReader::new(&context).unwrap();
        assert!(reader
            .get_type(0, &Json::Null)
            .unwrap_err()
            .is_unknown_discriminator());
    }
}
