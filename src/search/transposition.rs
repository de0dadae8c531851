use crate::game::card::Card;
use crate::game::seat::State;
use crate::game::spot::Spot;
use crate::Chips;
use crate::Position;
use crate::Utility;
use std::collections::HashMap;

const NIL: usize = usize::MAX;

/// Canonical identity of a decision point for transposition lookups.
///
/// Two textually different action sequences that arrive at the same
/// situation must produce equal keys, so the key is built from the
/// position-independent residue of the history (per-seat commitments and
/// statuses) rather than the ordered action list. Stacks are rounded to
/// [`crate::KEY_GRAIN`] so near-identical chip counts transpose.
///
/// The full key is stored in the table; equality is structural, never
/// just a hash comparison, so colliding hashes cannot corrupt statistics.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Key {
    pot: Chips,
    seats: Vec<(Chips, Chips, State, bool)>,
    board: Vec<Card>,
    actor: Position,
}

impl From<&Spot> for Key {
    fn from(spot: &Spot) -> Self {
        let mut board = spot.board().to_vec();
        board.sort();
        Self {
            pot: grain(spot.pot()),
            seats: spot
                .seats()
                .iter()
                .map(|s| (grain(s.stack()), grain(s.stake()), s.state(), s.has_acted()))
                .collect(),
            board,
            actor: spot.actor(),
        }
    }
}

fn grain(chips: Chips) -> Chips {
    match crate::KEY_GRAIN {
        0 | 1 => chips,
        g => (chips + g / 2) / g * g,
    }
}

/// Aggregated statistics shared across transposed branches.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Entry {
    pub visits: u32,
    pub value: Utility,
}

struct Slot {
    key: Key,
    entry: Entry,
    prev: usize,
    next: usize,
}

/// Bounded key → statistics cache with least-recently-used eviction.
///
/// A HashMap indexes into a slot arena threaded with an intrusive
/// doubly-linked recency list, so lookup, insertion, and eviction are all
/// O(1) amortized.
pub struct Transpositions {
    capacity: usize,
    map: HashMap<Key, usize>,
    slots: Vec<Slot>,
    free: Vec<usize>,
    head: usize,
    tail: usize,
}

impl Transpositions {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "zero-capacity table");
        Self {
            capacity,
            map: HashMap::with_capacity(capacity.min(4096)),
            slots: Vec::with_capacity(capacity.min(4096)),
            free: Vec::new(),
            head: NIL,
            tail: NIL,
        }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
    pub fn clear(&mut self) {
        self.map.clear();
        self.slots.clear();
        self.free.clear();
        self.head = NIL;
        self.tail = NIL;
    }

    /// Look up cached statistics, refreshing recency on a hit.
    pub fn get(&mut self, key: &Key) -> Option<Entry> {
        let index = *self.map.get(key)?;
        self.touch(index);
        Some(self.slots[index].entry)
    }

    /// Fold one observation into the entry for `key`, creating or evicting
    /// as needed. Statistics only ever grow within a search.
    pub fn absorb(&mut self, key: &Key, visits: u32, value: Utility) {
        match self.map.get(key).copied() {
            Some(index) => {
                self.slots[index].entry.visits += visits;
                self.slots[index].entry.value += value;
                self.touch(index);
            }
            None => {
                if self.map.len() >= self.capacity {
                    self.evict();
                }
                let entry = Entry { visits, value };
                let index = match self.free.pop() {
                    Some(index) => {
                        self.slots[index] = Slot {
                            key: key.clone(),
                            entry,
                            prev: NIL,
                            next: NIL,
                        };
                        index
                    }
                    None => {
                        self.slots.push(Slot {
                            key: key.clone(),
                            entry,
                            prev: NIL,
                            next: NIL,
                        });
                        self.slots.len() - 1
                    }
                };
                self.map.insert(key.clone(), index);
                self.attach(index);
            }
        }
    }

    /// Drop exactly the least-recently-used entry.
    fn evict(&mut self) {
        let index = self.tail;
        assert!(index != NIL, "evicting from empty table");
        self.detach(index);
        self.map.remove(&self.slots[index].key);
        self.free.push(index);
    }

    fn touch(&mut self, index: usize) {
        if self.head != index {
            self.detach(index);
            self.attach(index);
        }
    }
    fn attach(&mut self, index: usize) {
        self.slots[index].prev = NIL;
        self.slots[index].next = self.head;
        if self.head != NIL {
            self.slots[self.head].prev = index;
        }
        self.head = index;
        if self.tail == NIL {
            self.tail = index;
        }
    }
    fn detach(&mut self, index: usize) {
        let (prev, next) = (self.slots[index].prev, self.slots[index].next);
        match prev {
            NIL => self.head = next,
            p => self.slots[p].next = next,
        }
        match next {
            NIL => self.tail = prev,
            n => self.slots[n].prev = prev,
        }
    }
}
