//! Lexical scope tracking
//!
//! Lambdas, blocks and catch handlers declare variables. Inside the declaring
//! construct a variable is referenced as `["$", name]` or `["$", name, skip]`:
//! walking frames from the innermost outwards, and declarations of each frame
//! in order, the reference designates the `skip`-th declaration whose wire
//! name equals `name` (unnamed declarations have the wire name `""`).
//!
//! The encoder computes `skip` with the same walk, comparing by identity, so
//! shadowed outer variables and duplicate names remain addressable. Both sides
//! skip the push entirely for constructs declaring no variable.
use log::trace;
use smallvec::SmallVec;

use arbexpr::Parameter;

type Frame = SmallVec<[Parameter; 4]>;

/// Stack of scope frames of one session.
#[derive(Debug, Default)]
pub struct Scope {
    frames: Vec<Frame>,
}

/// Name of a parameter on the wire.
pub fn wire_name(parameter: &Parameter) -> &str {
    parameter.name().unwrap_or("")
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a frame holding `declarations`. Returns `false`, and pushes
    /// nothing, when there are none.
    pub fn push(&mut self, declarations: impl IntoIterator<Item = Parameter>) -> bool {
        let frame: Frame = declarations.into_iter().collect();
        if frame.is_empty() {
            return false;
        }
        trace!(
            "Scope push #{} ({} declarations)",
            self.frames.len(),
            frame.len()
        );
        self.frames.push(frame);
        true
    }

    /// Close the innermost frame.
    pub fn pop(&mut self) {
        let frame = self.frames.pop();
        debug_assert!(frame.is_some(), "scope pop without matching push");
        trace!("Scope pop #{}", self.frames.len());
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    fn declarations(&self) -> impl Iterator<Item = &Parameter> {
        self.frames.iter().rev().flat_map(|frame| frame.iter())
    }

    /// Wire name and skip count designating `parameter`, or `None` if it is
    /// not in scope.
    pub fn reference<'p>(&self, parameter: &'p Parameter) -> Option<(&'p str, usize)> {
        let name = wire_name(parameter);
        let mut skip = 0;
        for declaration in self.declarations() {
            if declaration == parameter {
                return Some((name, skip));
            }
            if wire_name(declaration) == name {
                skip += 1;
            }
        }
        None
    }

    /// Declaration designated by `name` and `skip`.
    pub fn resolve(&self, name: &str, skip: usize) -> Option<&Parameter> {
        self.declarations()
            .filter(|declaration| wire_name(declaration) == name)
            .nth(skip)
    }
}

#[cfg(test)]
mod tests {
    use arbexpr::Type;

    use super::*;

    #[test]
    fn shadowing_and_skip() {
        let outer = Parameter::named(Type::i32(), "x");
        let inner = Parameter::named(Type::i32(), "x");
        let other = Parameter::unnamed(Type::bool());

        let mut scope = Scope::new();
        assert!(scope.push([outer.clone()]));
        assert_eq!(scope.reference(&outer), Some(("x", 0)));
        assert!(scope.push([inner.clone(), other.clone()]));
        assert_eq!(scope.reference(&inner), Some(("x", 0)));
        assert_eq!(scope.reference(&outer), Some(("x", 1)));
        assert_eq!(scope.reference(&other), Some(("", 0)));
        assert_eq!(scope.resolve("x", 0), Some(&inner));
        assert_eq!(scope.resolve("x", 1), Some(&outer));
        assert_eq!(scope.resolve("x", 2), None);
        scope.pop();
        assert_eq!(scope.resolve("x", 0), Some(&outer));
        assert_eq!(scope.reference(&inner), None);
        scope.pop();
        assert!(scope.is_empty());
    }

    #[test]
    fn duplicate_names_in_one_frame() {
        let a = Parameter::named(Type::i32(), "v");
        let b = Parameter::named(Type::i32(), "v");
        let mut scope = Scope::new();
        scope.push([a.clone(), b.clone()]);
        assert_eq!(scope.reference(&b), Some(("v", 1)));
        assert_eq!(scope.resolve("v", 1), Some(&b));
        scope.pop();
    }

    #[test]
    fn empty_frames_are_not_pushed() {
        let mut scope = Scope::new();
        assert!(!scope.push([]));
        assert_eq!(scope.depth(), 0);
    }
}
