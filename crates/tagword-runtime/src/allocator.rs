// This module defines a trait called [Allocator] that stands for the heap of the runtime. The
// representation layer never reserves memory by itself: it asks an allocator for words, and the
// allocator is free to run a collection first, as long as it keeps everything in the root snapshot
// alive and updates the snapshot if it moves things around.

use std::ptr::NonNull;

use log::{debug, trace, warn};

use crate::error::{Error, Result};
use crate::roots::Roots;
use crate::word::{DWord, Word};

pub trait Allocator {
    /// Reserves `nwords` contiguous, word aligned and uninitialized words.
    ///
    /// May collect. When it does, every word in `roots` must still be valid afterwards, possibly
    /// rewritten to a new location.
    fn alloc_words(&mut self, nwords: usize, roots: &mut Roots) -> Result<NonNull<Word>>;

    /// Reserves `ndwords` contiguous [DWord] blocks. Same contract as [Allocator::alloc_words].
    fn alloc_dwords(&mut self, ndwords: usize, roots: &mut Roots) -> Result<NonNull<DWord>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaConfig {
    /// Words per chunk. Bigger requests get a chunk of their own.
    pub chunk_words: usize,
    /// Total words the arena may hand out.
    pub limit_words: Option<usize>,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            chunk_words: 4096,
            limit_words: None,
        }
    }
}

/// A bump allocator that never collects and never frees before it's dropped. It's the allocator
/// used by the tooling and by tests; a real runtime plugs its collecting heap in instead.
///
/// Chunks are made of [DWord]s so every chunk starts double word aligned.
pub struct ArenaAllocator {
    config: ArenaConfig,
    chunks: Vec<Box<[DWord]>>,
    /// Next free word in the last chunk.
    cursor: usize,
    allocated: usize,
}

impl ArenaAllocator {
    pub fn new() -> Self {
        Self::with_config(ArenaConfig::default())
    }

    pub fn with_config(config: ArenaConfig) -> Self {
        Self {
            config,
            chunks: Vec::new(),
            cursor: 0,
            allocated: 0,
        }
    }

    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    /// Words handed out so far, padding included.
    pub fn allocated_words(&self) -> usize {
        self.allocated
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    fn capacity_words(&self) -> usize {
        self.chunks.last().map_or(0, |chunk| chunk.len() * 2)
    }

    /// Bumps the cursor by `nwords`, starting at a multiple of `align` words.
    fn bump(&mut self, nwords: usize, align: usize) -> Result<NonNull<Word>> {
        if nwords == 0 {
            return Ok(NonNull::dangling());
        }

        let start = self.cursor.next_multiple_of(align);
        let fits = start + nwords <= self.capacity_words();
        let padding = if fits { start - self.cursor } else { 0 };

        if let Some(limit) = self.config.limit_words {
            if self.allocated + padding + nwords > limit {
                warn!(
                    "arena exhausted: {nwords} words requested, {} of {limit} in use",
                    self.allocated
                );
                return Err(Error::OutOfMemory(nwords));
            }
        }

        let start = if fits {
            start
        } else {
            self.grow(nwords);
            0
        };

        let chunk = self
            .chunks
            .last_mut()
            .ok_or(Error::OutOfMemory(nwords))?;

        // SAFETY: `start + nwords` fits in the chunk, which holds twice as many words as dwords.
        let ptr = unsafe { (chunk.as_mut_ptr() as *mut Word).add(start) };

        self.cursor = start + nwords;
        self.allocated += padding + nwords;

        NonNull::new(ptr).ok_or(Error::OutOfMemory(nwords))
    }

    fn grow(&mut self, nwords: usize) {
        let words = nwords.max(self.config.chunk_words).next_multiple_of(2);
        debug!("arena: new chunk of {words} words");

        self.chunks.push(vec![DWord::default(); words / 2].into_boxed_slice());
        self.cursor = 0;
    }
}

impl Default for ArenaAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl Allocator for ArenaAllocator {
    fn alloc_words(&mut self, nwords: usize, roots: &mut Roots) -> Result<NonNull<Word>> {
        trace!("arena: {nwords} words, {} roots", roots.len());
        self.bump(nwords, 1)
    }

    fn alloc_dwords(&mut self, ndwords: usize, roots: &mut Roots) -> Result<NonNull<DWord>> {
        trace!("arena: {ndwords} dwords, {} roots", roots.len());
        if ndwords == 0 {
            return Ok(NonNull::dangling());
        }

        self.bump(ndwords * 2, 2).map(NonNull::cast)
    }
}
