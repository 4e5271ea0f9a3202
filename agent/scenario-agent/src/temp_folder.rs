use crate::error::{self, FolderResult};
use crate::gate::StageGate;
use log::{debug, info, warn};
use scenario_model::constants::TEST_DATA_DIR;
use scenario_model::unique_id;
use serde::de::DeserializeOwned;
use serde::Serialize;
use snafu::{ensure, ResultExt};
use std::fs;
use std::path::{Path, PathBuf};

/// Hidden files that are still copied along with a module.
const COPIED_HIDDEN_FILES: &[&str] = &[".terraform-version", ".terraform.lock.hcl"];

/// Local state that must not follow a module into a fresh folder.
const SKIPPED_FILES: &[&str] = &["terraform.tfstate", "terraform.tfstate.backup"];

/// The working directory of one scenario run. It owns everything the run produces and is the
/// only channel between stages: data saved by one stage is loaded by a later one, possibly in a
/// different process. Test data lives in the `.test-data` subdirectory.
///
/// The folder is not deleted when the `TempFolder` is dropped so that a failed run can be
/// inspected and its stages replayed.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct TempFolder {
    path: PathBuf,
}

impl TempFolder {
    /// Use an existing directory, e.g. one left behind by an earlier run.
    pub fn existing<P>(path: P) -> Self
    where
        P: Into<PathBuf>,
    {
        Self { path: path.into() }
    }

    /// Create a new, uniquely named directory `<prefix>-<id>` inside `base`.
    pub fn create_in(base: &Path, prefix: &str) -> FolderResult<Self> {
        let path = base.join(format!("{}-{}", prefix, unique_id()));
        fs::create_dir_all(&path).context(error::CreateDirSnafu { path: &path })?;
        Ok(Self { path })
    }

    /// Copy `root` into a fresh directory under the system temp dir and return the folder of
    /// `module` within the copy. The whole of `root` is copied so that relative references from
    /// `module` to sibling modules keep working.
    ///
    /// If any stage is being skipped, the original `root/module` is returned instead so that
    /// persisted data is shared between invocations.
    pub fn copy_module_to_temp(root: &Path, module: &Path, gate: &StageGate) -> FolderResult<Self> {
        let source = root.join(module);
        ensure!(source.is_dir(), error::SourceMissingSnafu { path: &source });

        if gate.any_skipped() {
            info!(
                "A SKIP_ environment variable is set. Using the original folder '{}' rather \
                than a temp folder so data can be cached between stages.",
                source.display()
            );
            let path = source
                .canonicalize()
                .context(error::ResolveSnafu { path: &source })?;
            return Ok(Self { path });
        }

        let root = root
            .canonicalize()
            .context(error::ResolveSnafu { path: root })?;
        let prefix = root
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| "scenario".to_string());
        let temp = Self::create_in(&std::env::temp_dir(), &prefix)?;
        copy_dir(&root, temp.path())?;
        let folder = Self::existing(temp.path().join(module));
        info!(
            "Copied '{}' to temp folder '{}'",
            source.display(),
            folder.path().display()
        );
        Ok(folder)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The directory that holds persisted test data.
    pub fn test_data_dir(&self) -> PathBuf {
        self.path.join(TEST_DATA_DIR)
    }

    /// The path of the test data file `name`.
    pub fn test_data_path(&self, name: &str) -> PathBuf {
        self.test_data_dir().join(name)
    }

    pub fn is_test_data_present(&self, name: &str) -> bool {
        self.test_data_path(name).is_file()
    }

    /// Returns the path of the test data file `name`, or an error if it has not been written.
    pub fn require_test_data(&self, name: &str) -> FolderResult<PathBuf> {
        let path = self.test_data_path(name);
        ensure!(path.is_file(), error::MissingTestDataSnafu { path: &path });
        Ok(path)
    }

    /// Serialize `value` as JSON into the test data file `name`.
    pub fn save_test_data<T>(&self, name: &str, value: &T) -> FolderResult<PathBuf>
    where
        T: Serialize,
    {
        let json = serde_json::to_string_pretty(value).context(error::SerializeSnafu { name })?;
        self.write_file(name, json.as_bytes())
    }

    /// Deserialize the JSON test data file `name`.
    pub fn load_test_data<T>(&self, name: &str) -> FolderResult<T>
    where
        T: DeserializeOwned,
    {
        let path = self.require_test_data(name)?;
        debug!("Loading test data from '{}'", path.display());
        let data = fs::read(&path).context(error::ReadSnafu { path: &path })?;
        serde_json::from_slice(&data).context(error::DeserializeSnafu { path: &path })
    }

    /// Save a string under `name`. It is stored as a JSON string so any content round-trips.
    pub fn save_string(&self, name: &str, value: &str) -> FolderResult<PathBuf> {
        self.save_test_data(&json_file_name(name), &value)
    }

    /// Load a string saved with [`TempFolder::save_string`].
    pub fn load_string(&self, name: &str) -> FolderResult<String> {
        self.load_test_data(&json_file_name(name))
    }

    /// Write `contents` verbatim to the test data file `name` and return its path.
    pub fn write_file(&self, name: &str, contents: &[u8]) -> FolderResult<PathBuf> {
        let dir = self.test_data_dir();
        fs::create_dir_all(&dir).context(error::CreateDirSnafu { path: &dir })?;
        let path = dir.join(name);
        if path.exists() {
            warn!("Overwriting existing test data '{}'", path.display());
        }
        debug!("Writing test data to '{}'", path.display());
        fs::write(&path, contents).context(error::WriteSnafu { path: &path })?;
        Ok(path)
    }
}

fn json_file_name(name: &str) -> String {
    format!("{}.json", name)
}

fn is_copied(name: &str) -> bool {
    if SKIPPED_FILES.contains(&name) {
        return false;
    }
    !name.starts_with('.') || COPIED_HIDDEN_FILES.contains(&name)
}

fn copy_dir(from: &Path, to: &Path) -> FolderResult<()> {
    fs::create_dir_all(to).context(error::CreateDirSnafu { path: to })?;
    let entries = fs::read_dir(from).context(error::ReadSnafu { path: from })?;
    for entry in entries {
        let entry = entry.context(error::ReadSnafu { path: from })?;
        let name = entry.file_name();
        if !is_copied(&name.to_string_lossy()) {
            continue;
        }
        let source = entry.path();
        let dest = to.join(&name);
        let file_type = entry.file_type().context(error::ReadSnafu { path: &source })?;
        if file_type.is_symlink() {
            // Links are recreated, not followed.
            let target = fs::read_link(&source).context(error::ReadSnafu { path: &source })?;
            std::os::unix::fs::symlink(&target, &dest).context(error::SymlinkSnafu {
                link: &dest,
                target: &target,
            })?;
        } else if file_type.is_dir() {
            copy_dir(&source, &dest)?;
        } else {
            fs::copy(&source, &dest).context(error::CopySnafu {
                from: &source,
                to: &dest,
            })?;
        }
    }
    Ok(())
}
