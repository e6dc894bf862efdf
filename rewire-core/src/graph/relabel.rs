//! Bijective node relabeling.

use std::{
    borrow::Borrow,
    collections::HashMap,
    fmt::Display,
    hash::Hash,
    io::{self, Write},
};

use super::NodeId;

/// Explicit bijection between external labels and contiguous node ids.
///
/// Ids are handed out in first-appearance order starting at [`Relabeling::base`].
///
/// # Examples
/// ```
/// use rewire_core::Relabeling;
///
/// let mut relabeling = Relabeling::new(0);
/// assert_eq!(relabeling.assign("alice".to_owned()), 0);
/// assert_eq!(relabeling.assign("bob".to_owned()), 1);
/// assert_eq!(relabeling.assign("alice".to_owned()), 0);
/// assert_eq!(relabeling.id("bob"), Some(1));
/// assert_eq!(relabeling.label(1).map(String::as_str), Some("bob"));
/// ```
#[derive(Clone, Debug)]
pub struct Relabeling<L = NodeId> {
    base: NodeId,
    ids: HashMap<L, NodeId>,
    labels: Vec<L>,
}

impl<L> Relabeling<L>
where
    L: Clone + Eq + Hash,
{
    /// Creates an empty relabeling whose first id is `base`.
    #[must_use]
    pub fn new(base: NodeId) -> Self {
        Self {
            base,
            ids: HashMap::new(),
            labels: Vec::new(),
        }
    }

    /// Returns the id of `label`, assigning the next free id on first sight.
    pub fn assign(&mut self, label: L) -> NodeId {
        if let Some(&id) = self.ids.get(&label) {
            return id;
        }
        let id = self.base + self.labels.len();
        self.ids.insert(label.clone(), id);
        self.labels.push(label);
        id
    }

    /// Looks up the id assigned to `label`.
    pub fn id<Q>(&self, label: &Q) -> Option<NodeId>
    where
        L: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.ids.get(label).copied()
    }

    /// Looks up the label behind `id`.
    #[must_use]
    pub fn label(&self, id: NodeId) -> Option<&L> {
        id.checked_sub(self.base)
            .and_then(|offset| self.labels.get(offset))
    }

    /// Returns the first id handed out.
    #[must_use]
    pub fn base(&self) -> NodeId {
        self.base
    }

    /// Returns the number of labels mapped.
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Returns `true` when no label has been mapped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Iterates `(label, id)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&L, NodeId)> + '_ {
        self.labels
            .iter()
            .enumerate()
            .map(|(offset, label)| (label, self.base + offset))
    }
}

impl<L> Relabeling<L>
where
    L: Clone + Display + Eq + Hash,
{
    /// Writes one `label<TAB>id` line per mapping in id order.
    ///
    /// # Errors
    /// Propagates failures from `writer`.
    pub fn write_to<W: Write>(&self, mut writer: W) -> io::Result<()> {
        for (label, id) in self.iter() {
            writeln!(writer, "{label}\t{id}")?;
        }
        writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_start_at_base_and_are_stable() {
        let mut relabeling = Relabeling::new(1);
        assert_eq!(relabeling.assign(40_usize), 1);
        assert_eq!(relabeling.assign(7), 2);
        assert_eq!(relabeling.assign(40), 1);
        assert_eq!(relabeling.len(), 2);
        assert_eq!(relabeling.label(0), None);
        assert_eq!(relabeling.label(2), Some(&7));
        assert_eq!(relabeling.id(&7_usize), Some(2));
    }

    #[test]
    fn writes_tab_separated_mapping() {
        let mut relabeling = Relabeling::new(0);
        relabeling.assign("x".to_owned());
        relabeling.assign("y".to_owned());
        let mut buffer = Vec::new();
        relabeling.write_to(&mut buffer).expect("write to vec");
        assert_eq!(String::from_utf8(buffer).expect("utf8"), "x\t0\ny\t1\n");
    }

    #[test]
    fn clones_do_not_share_assignments() {
        let mut original = Relabeling::new(0);
        original.assign("a".to_owned());
        let mut copy = original.clone();
        assert_eq!(copy.assign("b".to_owned()), 1);
        assert_eq!(original.len(), 1);
        assert_eq!(original.id("b"), None);
        assert_eq!(copy.label(1).map(String::as_str), Some("b"));
    }
}
