/// The counter a successful append increments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Category {
    Odd,
    Even,
    Prime,
}

impl Category {
    pub const ALL: [Self; 3] = [Self::Odd, Self::Even, Self::Prime];

    pub(crate) const fn index(self) -> usize {
        match self {
            Self::Odd => 0,
            Self::Even => 1,
            Self::Prime => 2,
        }
    }
}

/// Per-category tallies of a buffer.
///
/// `odd + even + prime` always equals the buffer length. `total` is only
/// written when a run completes, at which point it equals the same length.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NumberCounts {
    pub odd: usize,
    pub even: usize,
    pub prime: usize,
    pub total: usize,
}

impl NumberCounts {
    /// Sum of the three category counters.
    pub const fn categorized(&self) -> usize {
        self.odd + self.even + self.prime
    }

    pub const fn get(&self, category: Category) -> usize {
        match category {
            Category::Odd => self.odd,
            Category::Even => self.even,
            Category::Prime => self.prime,
        }
    }

    pub(crate) const fn increment(&mut self, category: Category) {
        match category {
            Category::Odd => self.odd += 1,
            Category::Even => self.even += 1,
            Category::Prime => self.prime += 1,
        }
    }
}
