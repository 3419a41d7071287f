//! Stage 1: transaction ids to image filenames.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use log::{info, warn};

use crate::error::HarvestError;
use crate::store::{LookupStore, TransactionId};
use crate::workspace::Workspace;

/// The pipeline's input: transaction ids read from `id_list.txt`.
#[derive(Clone, Debug, Default)]
pub struct TransactionList {
    ids: Vec<TransactionId>,
}

impl TransactionList {
    /// Reads a newline-delimited id list. Lines that are not plain
    /// unsigned integers are silently ignored; a missing file is
    /// stage-fatal.
    pub fn load(path: &Path) -> Result<Self, HarvestError> {
        let text =
            fs::read_to_string(path).map_err(|source| HarvestError::ResolutionUnavailable {
                path: path.to_path_buf(),
                source,
            })?;

        let ids = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && line.bytes().all(|byte| byte.is_ascii_digit()))
            .filter_map(|line| line.parse::<i64>().ok())
            .map(TransactionId::new)
            .collect();
        Ok(Self { ids })
    }

    /// Builds a list from ids already in hand.
    pub fn from_ids(ids: Vec<TransactionId>) -> Self {
        Self { ids }
    }

    pub fn ids(&self) -> &[TransactionId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Stage 1 output: resolved image filenames, deduplicated in first-seen
/// order.
#[derive(Clone, Debug, Default)]
pub struct FilenameList {
    file_names: Vec<String>,
}

impl FilenameList {
    /// Builds a list from names already in hand. Duplicates are kept;
    /// only [`resolve_filenames`] deduplicates.
    pub fn from_names(file_names: Vec<String>) -> Self {
        Self { file_names }
    }

    pub fn file_names(&self) -> &[String] {
        &self.file_names
    }

    pub fn len(&self) -> usize {
        self.file_names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.file_names.is_empty()
    }

    /// Writes the list to `image_list.txt`. The file is rewritten, not
    /// appended, so reruns never accumulate duplicates.
    fn persist(&self, path: &Path) -> Result<(), HarvestError> {
        let mut contents = self.file_names.join("\n");
        if !contents.is_empty() {
            contents.push('\n');
        }
        fs::write(path, contents).map_err(|source| HarvestError::ArtifactWrite {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Resolves every transaction id to its recorded image filenames.
///
/// Ids with no recorded filenames are skipped with a diagnostic; a store
/// query failure is stage-fatal. The resolved list is persisted to
/// `image_list.txt` as a side effect.
pub fn resolve_filenames(
    ids: &TransactionList,
    store: &mut dyn LookupStore,
    workspace: &Workspace,
) -> Result<FilenameList, HarvestError> {
    let mut seen = BTreeSet::new();
    let mut file_names = Vec::new();

    for &id in ids.ids() {
        let resolved = store.filenames_for_transaction(id)?;
        if resolved.is_empty() {
            warn!("no result for id {id}");
            continue;
        }
        for name in resolved {
            info!("file name resolved for {id}: {name}");
            if seen.insert(name.clone()) {
                file_names.push(name);
            }
        }
    }

    let list = FilenameList { file_names };
    list.persist(&workspace.image_list_path())?;
    Ok(list)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use crate::store::TransactionPayload;

    struct MapStore {
        filenames: BTreeMap<i64, Vec<String>>,
        fail: bool,
    }

    impl MapStore {
        fn new(entries: &[(i64, &[&str])]) -> Self {
            let filenames = entries
                .iter()
                .map(|(id, names)| (*id, names.iter().map(|s| s.to_string()).collect()))
                .collect();
            Self {
                filenames,
                fail: false,
            }
        }
    }

    impl LookupStore for MapStore {
        fn filenames_for_transaction(
            &mut self,
            id: TransactionId,
        ) -> Result<Vec<String>, HarvestError> {
            if self.fail {
                return Err(HarvestError::Store {
                    message: "boom".into(),
                });
            }
            Ok(self.filenames.get(&id.as_i64()).cloned().unwrap_or_default())
        }

        fn payload_for_filename(
            &mut self,
            _file_name: &str,
        ) -> Result<Option<TransactionPayload>, HarvestError> {
            Ok(None)
        }
    }

    #[test]
    fn load_ignores_non_numeric_lines() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let path = temp.path().join("id_list.txt");
        fs::write(&path, "12\nabc\n\n-5\n 34 \n7x\n").expect("write id list");

        let list = TransactionList::load(&path).expect("load id list");
        let ids: Vec<i64> = list.ids().iter().map(|id| id.as_i64()).collect();
        assert_eq!(ids, vec![12, 34]);
    }

    #[test]
    fn load_fails_when_file_is_missing() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let err = TransactionList::load(&temp.path().join("id_list.txt")).unwrap_err();
        assert!(matches!(err, HarvestError::ResolutionUnavailable { .. }));
    }

    #[test]
    fn resolve_skips_unknown_ids_and_dedupes() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let workspace = Workspace::create(temp.path()).expect("create workspace");
        let mut store = MapStore::new(&[
            (1, &["a.jpg", "b.jpg"][..]),
            (2, &["b.jpg", "c.jpg"][..]),
        ]);
        let ids = TransactionList::from_ids(vec![
            TransactionId::new(1),
            TransactionId::new(99),
            TransactionId::new(2),
        ]);

        let list = resolve_filenames(&ids, &mut store, &workspace).expect("resolve");

        assert_eq!(list.file_names(), ["a.jpg", "b.jpg", "c.jpg"]);
        let persisted =
            fs::read_to_string(workspace.image_list_path()).expect("image list written");
        assert_eq!(persisted, "a.jpg\nb.jpg\nc.jpg\n");
    }

    #[test]
    fn rerunning_resolve_rewrites_instead_of_appending() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let workspace = Workspace::create(temp.path()).expect("create workspace");
        let mut store = MapStore::new(&[(1, &["a.jpg"][..])]);
        let ids = TransactionList::from_ids(vec![TransactionId::new(1)]);

        resolve_filenames(&ids, &mut store, &workspace).expect("first run");
        resolve_filenames(&ids, &mut store, &workspace).expect("second run");

        let persisted =
            fs::read_to_string(workspace.image_list_path()).expect("image list written");
        assert_eq!(persisted, "a.jpg\n");
    }

    #[test]
    fn store_failure_aborts_the_stage() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let workspace = Workspace::create(temp.path()).expect("create workspace");
        let mut store = MapStore::new(&[]);
        store.fail = true;
        let ids = TransactionList::from_ids(vec![TransactionId::new(1)]);

        let err = resolve_filenames(&ids, &mut store, &workspace).unwrap_err();
        assert!(matches!(err, HarvestError::Store { .. }));
    }
}
