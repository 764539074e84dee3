//! Generational node identifiers

use std::fmt;

/// Identifier of a scene node (checker, destroyer, chunk wrapper, ...)
///
/// A node destroyed and recreated in the same slot gets a new generation, so
/// stale ids held by event payloads never alias the new node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Id {
    index: u32,
    generation: u32,
}

impl Id {
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub const fn index(&self) -> u32 {
        self.index
    }

    pub const fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

/// Slot allocator handing out generational ids
///
/// Freed slots are recycled with a bumped generation.
#[derive(Debug, Default)]
pub struct IdGenerator {
    generations: Vec<u32>,
    free: Vec<u32>,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next id, reusing a freed slot when one is available
    pub fn allocate(&mut self) -> Id {
        match self.free.pop() {
            Some(index) => Id::new(index, self.generations[index as usize]),
            None => {
                self.generations.push(0);
                Id::new(self.generations.len() as u32 - 1, 0)
            }
        }
    }

    /// Release an id. Releasing a stale or unknown id is ignored.
    pub fn release(&mut self, id: Id) {
        if !self.is_live(id) {
            return;
        }
        let slot = &mut self.generations[id.index() as usize];
        *slot = slot.wrapping_add(1);
        self.free.push(id.index());
    }

    /// Whether `id` refers to a currently allocated slot
    pub fn is_live(&self, id: Id) -> bool {
        self.generations.get(id.index() as usize) == Some(&id.generation())
            && !self.free.contains(&id.index())
    }
}
