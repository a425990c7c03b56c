//! Closures are objects with the reserved [UID_CLOSURE]. Slot 1 holds the code address and slot 2
//! the descriptor of the captured environment; neither is counted in the header or traced by the
//! collector. The captured values follow from slot 3 on.

use crate::allocator::Allocator;
use crate::check::check;
use crate::constr::write_header;
use crate::error::Result;
use crate::header::{Header, UID_CLOSURE};
use crate::object::{HeapObject, CLOSURE_EXTRA_FIELDS};
use crate::roots::{RootIndex, Roots};
use crate::word::Word;

/// Address of compiled code.
pub type CodePtr = *const libc::c_void;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Closure(HeapObject);

impl Closure {
    /// # Safety
    /// `obj` must be a fully initialized closure object.
    pub unsafe fn from_object(obj: HeapObject) -> Self {
        check!(obj.header().is_closure(), "{obj:?} is not a closure");
        Self(obj)
    }

    pub fn as_object(self) -> HeapObject {
        self.0
    }

    pub fn as_word(self) -> Word {
        self.0.as_word()
    }

    pub fn code(self) -> CodePtr {
        self.0.get_field(1).raw() as CodePtr
    }

    pub fn descriptor(self) -> usize {
        self.0.get_field(2).raw()
    }

    pub fn ncaptures(self) -> usize {
        self.0.nfields()
    }

    pub fn capture(self, n: usize) -> Word {
        self.0.get_field(1 + CLOSURE_EXTRA_FIELDS + n)
    }

    pub fn set_capture(self, n: usize, value: Word) {
        self.0.set_field(1 + CLOSURE_EXTRA_FIELDS + n, value)
    }
}

/// Allocates a closure over the captured values registered at `captures`. They're read back from
/// the snapshot once the allocation is done, so they're valid even if it collected.
pub fn allocate_closure<A: Allocator + ?Sized>(
    allocator: &mut A,
    code: CodePtr,
    descriptor: usize,
    captures: &[RootIndex],
    roots: &mut Roots,
) -> Result<Closure> {
    let header = Header::try_new(UID_CLOSURE, captures.len())?;
    let ptr = allocator.alloc_words(1 + CLOSURE_EXTRA_FIELDS + captures.len(), roots)?;

    let obj = unsafe { write_header(ptr, header) };
    obj.set_field(1, Word::from_raw(code as usize));
    obj.set_field(2, Word::from_raw(descriptor));

    let closure = Closure(obj);
    for (n, &index) in captures.iter().enumerate() {
        closure.set_capture(n, roots.get(index));
    }

    Ok(closure)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocator::ArenaAllocator;
    use crate::error::Error;
    use crate::word::make_unboxed;

    extern "C" fn add(a: usize, b: usize) -> usize {
        a + b
    }

    #[test]
    fn layout() {
        let mut arena = ArenaAllocator::new();
        let mut roots = Roots::new();
        let a = roots.push(make_unboxed(5));
        let b = roots.push(make_unboxed(3));

        let closure =
            allocate_closure(&mut arena, add as CodePtr, 2, &[a, b], &mut roots).unwrap();
        let obj = closure.as_object();

        assert_eq!(obj.uid(), UID_CLOSURE);
        assert_eq!(obj.nfields(), 2);
        assert_eq!(obj.slot_count(), 5);
        assert_eq!(obj.reference_slots(), 3..5);
        assert_eq!(closure.code(), add as CodePtr);
        assert_eq!(closure.descriptor(), 2);
        assert_eq!(closure.capture(0), make_unboxed(5));
        assert_eq!(closure.capture(1), make_unboxed(3));
        assert_eq!(arena.allocated_words(), 5);
    }

    #[test]
    fn too_many_captures() {
        let mut arena = ArenaAllocator::new();
        let mut roots = Roots::new();
        let captures = (0..256)
            .map(|n| roots.push(make_unboxed(n)))
            .collect::<Vec<_>>();

        assert_eq!(
            allocate_closure(&mut arena, add as CodePtr, 0, &captures, &mut roots),
            Err(Error::TooManyFields(256))
        );
        assert_eq!(arena.allocated_words(), 0);
    }

    #[test]
    fn without_captures() {
        let mut arena = ArenaAllocator::new();
        let closure =
            allocate_closure(&mut arena, add as CodePtr, 0, &[], &mut Roots::new()).unwrap();

        assert_eq!(closure.ncaptures(), 0);
        assert!(closure.as_object().reference_slots().is_empty());
        assert_eq!(unsafe { Closure::from_object(closure.as_object()) }, closure);
    }
}
