//! Small collection helpers used to prepare page data.

/// Splits `items` into consecutive groups of at most `size` items.
///
/// A `size` of zero is treated as one.
pub fn chunked<T>(items: impl IntoIterator<Item = T>, size: usize) -> Vec<Vec<T>> {
    let size = size.max(1);
    let mut chunks = Vec::new();
    let mut current = Vec::with_capacity(size);
    for item in items {
        current.push(item);
        if current.len() == size {
            chunks.push(std::mem::replace(&mut current, Vec::with_capacity(size)));
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// An arbitrarily nested list.
#[derive(Debug, Clone, PartialEq)]
pub enum Nested<T> {
    Item(T),
    List(Vec<Nested<T>>),
}

impl<T> From<T> for Nested<T> {
    fn from(item: T) -> Self {
        Self::Item(item)
    }
}

impl<T> Nested<T> {
    /// Yields the leaves depth-first, left to right.
    pub fn into_leaves(self) -> impl Iterator<Item = T> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            while let Some(node) = stack.pop() {
                match node {
                    Nested::Item(item) => return Some(item),
                    Nested::List(children) => stack.extend(children.into_iter().rev()),
                }
            }
            None
        })
    }
}

/// Flattens nested lists into a single list, keeping order.
pub fn flatten<T>(items: Vec<Nested<T>>) -> Vec<T> {
    Nested::List(items).into_leaves().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunked() {
        assert_eq!(chunked(1..=5, 2), vec![vec![1, 2], vec![3, 4], vec![5]]);
        assert_eq!(chunked(Vec::<u8>::new(), 3), Vec::<Vec<u8>>::new());
        assert_eq!(chunked([1, 2], 0), vec![vec![1], vec![2]]);
    }

    #[test]
    fn test_flatten_keeps_order() {
        let nested = vec![
            Nested::Item(1),
            Nested::List(vec![Nested::Item(2), Nested::List(vec![Nested::Item(3)])]),
            Nested::List(vec![]),
            4.into(),
        ];
        assert_eq!(flatten(nested), vec![1, 2, 3, 4]);
    }
}
