use anyhow::Context;
use std::path::{Component, Path, PathBuf};

/// A local file and the object key it is published under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Asset {
    pub(crate) path: PathBuf,
    pub(crate) key: String,
}

/// `prefix/relative/path` with `/` separators. An empty prefix adds nothing.
pub(crate) fn object_key(prefix: &str, relative: &Path) -> String {
    let relative = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/");

    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        relative
    } else {
        format!("{prefix}/{relative}")
    }
}

/// Lists every file under `source`, sorted by key.
///
/// A directory is walked recursively and keys are relative to it. A single
/// file is published under its own name. Symlinks are followed.
pub(crate) async fn collect_assets(source: &Path, prefix: &str) -> anyhow::Result<Vec<Asset>> {
    let metadata = tokio::fs::metadata(source)
        .await
        .with_context(|| format!("cannot read site source {}", source.display()))?;

    if metadata.is_file() {
        let name = source
            .file_name()
            .with_context(|| format!("site source {} has no file name", source.display()))?;
        return Ok(vec![Asset {
            path: source.to_path_buf(),
            key: object_key(prefix, Path::new(name)),
        }]);
    }

    let mut assets = Vec::new();
    let mut pending = vec![source.to_path_buf()];
    while let Some(dir) = pending.pop() {
        let mut entries = tokio::fs::read_dir(&dir)
            .await
            .with_context(|| format!("cannot list {}", dir.display()))?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let metadata = tokio::fs::metadata(&path)
                .await
                .with_context(|| format!("cannot read {}", path.display()))?;

            if metadata.is_dir() {
                pending.push(path);
            } else if metadata.is_file() {
                let key = object_key(prefix, path.strip_prefix(source)?);
                assets.push(Asset { path, key });
            }
        }
    }

    assets.sort_by(|a, b| a.key.cmp(&b.key));
    Ok(assets)
}
