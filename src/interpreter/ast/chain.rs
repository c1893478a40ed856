use std::fmt::{Debug, Formatter};

/// A non-empty, right-leaning list: a head and an optional tail, with `None`
/// marking the end. Blocks, parameter lists, argument lists and index chains
/// all have this shape; an absent list is an `Option<Chain<T>>` that is `None`.
#[derive(Clone, PartialEq)]
pub struct Chain<T> {
    pub head: Box<T>,
    pub tail: Option<Box<Chain<T>>>,
}

impl<T> Chain<T> {
    /// A chain of `head` followed by `rest`, in order.
    pub fn new(head: T, rest: Vec<T>) -> Chain<T> {
        Chain { head: Box::new(head), tail: Chain::from_vec(rest).map(Box::new) }
    }

    /// Builds the chain right to left, so the first item becomes the head.
    /// Returns `None` for an empty vector.
    pub fn from_vec(items: Vec<T>) -> Option<Chain<T>> {
        let mut chain: Option<Box<Chain<T>>> = None;

        for item in items.into_iter().rev() {
            chain = Some(Box::new(Chain { head: Box::new(item), tail: chain }));
        }

        chain.map(|chain| *chain)
    }

    pub fn iter(&self) -> ChainIter<'_, T> {
        ChainIter { next: Some(self) }
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn last(&self) -> &T {
        let mut current = self;

        while let Some(tail) = &current.tail {
            current = tail;
        }

        &*current.head
    }
}

/// Length of an optional chain, zero when absent.
pub fn optional_len<T>(chain: Option<&Chain<T>>) -> usize {
    chain.map_or(0, Chain::len)
}

impl<T> Drop for Chain<T> {
    // Unlinks the tail iteratively; long blocks would otherwise drop recursively.
    fn drop(&mut self) {
        let mut next = self.tail.take();

        while let Some(mut node) = next {
            next = node.tail.take();
        }
    }
}

impl<T: Debug> Debug for Chain<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

pub struct ChainIter<'a, T> {
    next: Option<&'a Chain<T>>,
}

impl<'a, T> Iterator for ChainIter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let current = self.next?;
        self.next = current.tail.as_deref();
        Some(&*current.head)
    }
}

impl<'a, T> IntoIterator for &'a Chain<T> {
    type Item = &'a T;
    type IntoIter = ChainIter<'a, T>;

    fn into_iter(self) -> ChainIter<'a, T> {
        self.iter()
    }
}
