use std::collections::HashMap;

use arbexpr::{Label, Member, MemberKind, Type, TypeKind};
use log::debug;
use serde_json::{Map, Value as Json, json};

use crate::magic::{
    CONTEXT_LABELS, CONTEXT_MEMBERS, CONTEXT_TYPES, MEMBER_CONSTRUCTOR, MEMBER_FIELD,
    MEMBER_METHOD, MEMBER_PROPERTY, TYPE_ARRAY, TYPE_GENERIC, TYPE_RECORD, TYPE_SIMPLE,
};

/// Encoding side of the context.
///
/// Types and members are deduplicated structurally, labels by identity.
#[derive(Debug, Default)]
pub struct ContextWriter {
    types: Vec<Json>,
    type_indices: HashMap<Type, usize>,
    members: Vec<Json>,
    member_indices: HashMap<Member, usize>,
    labels: Vec<Json>,
    label_indices: HashMap<Label, usize>,
}

impl ContextWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of `ty`, interning it (and its constituents) on first use.
    pub fn add_type(&mut self, ty: &Type) -> usize {
        if let Some(&index) = self.type_indices.get(ty) {
            return index;
        }

        let descriptor = match ty.kind() {
            TypeKind::Simple { name, assembly } => match assembly {
                Some(assembly) => json!([TYPE_SIMPLE, name, assembly]),
                None => json!([TYPE_SIMPLE, name]),
            },
            TypeKind::Generic {
                definition,
                arguments,
            } => {
                let definition = self.add_type(definition);
                let arguments = self.add_types(arguments);
                json!([TYPE_GENERIC, definition, arguments])
            }
            TypeKind::Array { element, rank } => {
                let element = self.add_type(element);
                match rank {
                    Some(rank) => json!([TYPE_ARRAY, element, rank]),
                    None => json!([TYPE_ARRAY, element]),
                }
            }
            TypeKind::Record { fields, anonymous } => {
                let fields: Vec<Json> = fields
                    .iter()
                    .map(|(name, ty)| json!([name, self.add_type(ty)]))
                    .collect();
                if *anonymous {
                    json!([TYPE_RECORD, fields, true])
                } else {
                    json!([TYPE_RECORD, fields])
                }
            }
        };

        let index = self.types.len();
        self.types.push(descriptor);
        self.type_indices.insert(ty.clone(), index);
        debug!("Interned type `{ty}` as #{index}");
        index
    }

    fn add_types(&mut self, types: &[Type]) -> Vec<usize> {
        types.iter().map(|ty| self.add_type(ty)).collect()
    }

    /// Index of `member`, interning its declaring type and signature first.
    pub fn add_member(&mut self, member: &Member) -> usize {
        if let Some(&index) = self.member_indices.get(member) {
            return index;
        }

        let descriptor = match member.kind() {
            MemberKind::Constructor {
                declaring_type,
                parameters,
            } => {
                let declaring_type = self.add_type(declaring_type);
                let parameters = self.add_types(parameters);
                json!([MEMBER_CONSTRUCTOR, declaring_type, parameters])
            }
            MemberKind::Field {
                declaring_type,
                name,
                field_type,
            } => {
                let declaring_type = self.add_type(declaring_type);
                let field_type = self.add_type(field_type);
                json!([MEMBER_FIELD, declaring_type, name, field_type])
            }
            MemberKind::Property {
                declaring_type,
                name,
                property_type,
                index_parameters,
            } => {
                let declaring_type = self.add_type(declaring_type);
                let property_type = self.add_type(property_type);
                if index_parameters.is_empty() {
                    json!([MEMBER_PROPERTY, declaring_type, name, property_type])
                } else {
                    let index_parameters = self.add_types(index_parameters);
                    json!([MEMBER_PROPERTY, declaring_type, name, property_type, index_parameters])
                }
            }
            MemberKind::Method {
                declaring_type,
                name,
                parameters,
                return_type,
                generic_arguments,
            } => {
                let declaring_type = self.add_type(declaring_type);
                let parameters = self.add_types(parameters);
                let return_type = self.add_type(return_type);
                if generic_arguments.is_empty() {
                    json!([MEMBER_METHOD, declaring_type, name, parameters, return_type])
                } else {
                    let generic_arguments = self.add_types(generic_arguments);
                    json!([
                        MEMBER_METHOD,
                        declaring_type,
                        name,
                        parameters,
                        return_type,
                        generic_arguments
                    ])
                }
            }
        };

        let index = self.members.len();
        self.members.push(descriptor);
        self.member_indices.insert(member.clone(), index);
        debug!("Interned member `{member}` as #{index}");
        index
    }

    /// Index of `label`. Two labels with the same name and type are distinct
    /// entries unless they are the same handle.
    pub fn add_label(&mut self, label: &Label) -> usize {
        if let Some(&index) = self.label_indices.get(label) {
            return index;
        }

        let ty = self.add_type(label.ty());
        let descriptor = match label.name() {
            Some(name) => json!([ty, name]),
            None => json!([ty]),
        };

        let index = self.labels.len();
        self.labels.push(descriptor);
        self.label_indices.insert(label.clone(), index);
        debug!("Interned label `{label}` as #{index}");
        index
    }

    /// Entry counts of the types, members and labels spaces.
    pub fn counts(&self) -> (usize, usize, usize) {
        (self.types.len(), self.members.len(), self.labels.len())
    }

    /// The `Context` object of the envelope. Empty spaces are omitted.
    pub fn finalize(self) -> Json {
        let mut context = Map::new();
        for (key, entries) in [
            (CONTEXT_TYPES, self.types),
            (CONTEXT_MEMBERS, self.members),
            (CONTEXT_LABELS, self.labels),
        ] {
            if !entries.is_empty() {
                context.insert(key.to_string(), Json::Array(entries));
            }
        }
        Json::Object(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constituents_come_first() {
        let mut ctx = ContextWriter::new();
        let list = Type::generic(Type::simple("List`1"), [Type::i32()]);
        assert_eq!(ctx.add_type(&list), 2);
        assert_eq!(ctx.add_type(&Type::i32()), 1);
        assert_eq!(
            ctx.finalize(),
            json!({"Types": [["::", "List`1"], ["::", "i32"], ["<>", 0, [1]]]})
        );
    }

    #[test]
    fn members_and_labels_are_deduplicated() {
        let mut ctx = ContextWriter::new();
        let point = Type::qualified("Point", "geometry");
        let x = Member::field(point.clone(), "X", Type::f64());
        assert_eq!(ctx.add_member(&x), 0);
        assert_eq!(ctx.add_member(&Member::field(point, "X", Type::f64())), 0);

        let a = Label::named(Type::void(), "end");
        let b = Label::named(Type::void(), "end");
        assert_eq!(ctx.add_label(&a), 0);
        assert_eq!(ctx.add_label(&b), 1);
        assert_eq!(ctx.add_label(&a), 0);
        assert_eq!(ctx.counts(), (3, 1, 2));
        assert_eq!(
            ctx.finalize(),
            json!({
                "Types": [["::", "Point", "geometry"], ["::", "f64"], ["::", "void"]],
                "Members": [["f", 0, "X", 1]],
                "Labels": [[2, "end"], [2, "end"]],
            })
        );
    }

    #[test]
    fn empty_context_is_empty_object() {
        assert_eq!(ContextWriter::new().finalize(), json!({}));
    }
}
