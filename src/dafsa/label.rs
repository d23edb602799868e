use std::fmt::{self, Debug, Display};
use std::hash::Hash;
use std::ops::Deref;

use smallvec::SmallVec;

/// Trait for types that can serve as edge-label symbols in an automaton.
///
/// This trait is automatically implemented for any type satisfying all the
/// required bounds (`char`, `u8`, `u16`, `u32`, etc.).
///
/// - `Copy`: labels store symbols by value
/// - `Eq + Ord`: comparing symbols and ordering labels in reports
/// - `Hash`: label histograms and state deduplication during construction
/// - `Debug`: debug printing of edges
pub trait LabelChar: Copy + Eq + Ord + Hash + Debug {}

impl<T: Copy + Eq + Ord + Hash + Debug> LabelChar for T {}

/// The symbols of a single edge.
///
/// Uncompressed automata carry exactly one symbol per edge; after path
/// compression a label holds the concatenation of a whole chain. Labels
/// are never empty once they are part of an [`Automaton`](super::Automaton).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Label<C: LabelChar>(SmallVec<[C; 8]>);

impl<C: LabelChar> Label<C> {
    /// Creates a one-symbol label.
    pub fn single(symbol: C) -> Self {
        let mut symbols = SmallVec::new();
        symbols.push(symbol);
        Label(symbols)
    }

    /// Number of symbols in the label.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if the label holds no symbols.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The symbol that determines which outgoing edge a lookup follows.
    #[inline]
    pub fn first(&self) -> Option<C> {
        self.0.first().copied()
    }

    /// Appends the symbols of `other` to this label.
    pub fn extend_from(&mut self, other: &Label<C>) {
        self.0.extend_from_slice(&other.0);
    }

    /// The label's symbols as a slice.
    pub fn symbols(&self) -> &[C] {
        &self.0
    }
}

impl<C: LabelChar> Deref for Label<C> {
    type Target = [C];

    fn deref(&self) -> &[C] {
        &self.0
    }
}

impl<C: LabelChar> FromIterator<C> for Label<C> {
    fn from_iter<I: IntoIterator<Item = C>>(iter: I) -> Self {
        Label(iter.into_iter().collect())
    }
}

impl<C: LabelChar> Debug for Label<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.iter()).finish()
    }
}

// Symbols are written back to back, so a `Label<char>` prints as the string it spells.
impl<C: LabelChar + Display> Display for Label<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for symbol in &self.0 {
            write!(f, "{symbol}")?;
        }
        Ok(())
    }
}

/// Trait for types that can be turned into an edge label or a corpus word.
///
/// Implemented for common string and sequence types so that
/// [`AutomatonBuilder::add_edge`](super::builder::AutomatonBuilder::add_edge)
/// and the corpus builders accept them directly without manual conversion.
pub trait IntoLabel<C: LabelChar> {
    /// Collects this value into a symbol buffer.
    fn collect_label(self) -> Label<C>;
}

impl<C: LabelChar> IntoLabel<C> for Label<C> {
    fn collect_label(self) -> Label<C> {
        self
    }
}

impl<C: LabelChar> IntoLabel<C> for &Label<C> {
    fn collect_label(self) -> Label<C> {
        self.clone()
    }
}

// String types → char

impl IntoLabel<char> for &str {
    fn collect_label(self) -> Label<char> {
        self.chars().collect()
    }
}

impl IntoLabel<char> for &&str {
    fn collect_label(self) -> Label<char> {
        self.chars().collect()
    }
}

impl IntoLabel<char> for String {
    fn collect_label(self) -> Label<char> {
        self.chars().collect()
    }
}

impl IntoLabel<char> for &String {
    fn collect_label(self) -> Label<char> {
        self.chars().collect()
    }
}

impl IntoLabel<char> for char {
    fn collect_label(self) -> Label<char> {
        Label::single(self)
    }
}

// Generic sequence types → C

impl<C: LabelChar> IntoLabel<C> for &[C] {
    fn collect_label(self) -> Label<C> {
        self.iter().copied().collect()
    }
}

impl<C: LabelChar> IntoLabel<C> for Vec<C> {
    fn collect_label(self) -> Label<C> {
        self.into_iter().collect()
    }
}

impl<C: LabelChar> IntoLabel<C> for &Vec<C> {
    fn collect_label(self) -> Label<C> {
        self.iter().copied().collect()
    }
}

impl<C: LabelChar, const N: usize> IntoLabel<C> for [C; N] {
    fn collect_label(self) -> Label<C> {
        self.into_iter().collect()
    }
}

impl<C: LabelChar, const N: usize> IntoLabel<C> for &[C; N] {
    fn collect_label(self) -> Label<C> {
        self.iter().copied().collect()
    }
}
