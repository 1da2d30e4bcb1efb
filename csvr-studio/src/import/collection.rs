//! Ordered, observable collection of queued upload containers

use std::collections::{BTreeMap, HashMap};

use csvr_common::Computed;

use super::container::{ContainerId, FileUploadContainer};
use super::file::FileBlob;

/// Insertion-ordered containers with an aggregate invalidity signal
///
/// Containers are keyed by an insertion sequence number, so removal by
/// identity never shifts or recomputes indexes of the remaining entries.
/// The id lookup is O(1); dropping the ordered entry is O(log n), which
/// keeps iteration in insertion order without a linked list.
#[derive(Debug, Default)]
pub struct UploadContainerCollection {
    entries: BTreeMap<u64, FileUploadContainer>,
    index: HashMap<ContainerId, u64>,
    next_seq: u64,
    invalidity: Computed<bool>,
}

impl UploadContainerCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a container at the end
    pub fn add(&mut self, container: FileUploadContainer) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.index.insert(container.id(), seq);
        self.entries.insert(seq, container);
        self.invalidity.invalidate();
    }

    /// Remove by identity; returns the removed container if it was present
    pub fn remove(&mut self, id: ContainerId) -> Option<FileUploadContainer> {
        let seq = self.index.remove(&id)?;
        let removed = self.entries.remove(&seq);
        self.invalidity.invalidate();
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: ContainerId) -> Option<&FileUploadContainer> {
        self.index.get(&id).and_then(|seq| self.entries.get(seq))
    }

    pub fn get_at(&self, position: usize) -> Option<&FileUploadContainer> {
        self.entries.values().nth(position)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FileUploadContainer> {
        self.entries.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut FileUploadContainer> {
        self.entries.values_mut()
    }

    /// Files in upload order
    pub fn files(&self) -> Vec<&FileBlob> {
        self.entries.values().map(|c| c.file()).collect()
    }

    /// True unless exactly one container is present and it is valid
    ///
    /// The importer takes one file per import action: extra drops are kept in
    /// the collection but keep the aggregate invalid until only one remains.
    pub fn invalidity(&mut self) -> bool {
        let entries = &self.entries;
        self.invalidity.get_or_compute(|| {
            entries.len() != 1 || entries.values().any(|c| !c.is_valid())
        })
    }

    /// Receiver bumped whenever membership changes
    pub fn subscribe(&self) -> tokio::sync::watch::Receiver<u64> {
        self.invalidity.subscribe()
    }
}
