//! Serial directory walk: yields every candidate path under the root, or the walk error.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::engine::tools::WalkFilter;

/// One result from a directory walk: either a path to consider or an error with optional path.
pub enum WalkOutcome {
    Ok(PathBuf),
    Err { msg: String, path: Option<PathBuf> },
}

/// Convert a walkdir result into [`WalkOutcome`].
pub fn to_outcome_walkdir(r: Result<walkdir::DirEntry, walkdir::Error>) -> WalkOutcome {
    match r {
        Ok(entry) => WalkOutcome::Ok(entry.into_path()),
        Err(err) => WalkOutcome::Err {
            msg: format!("{}", err),
            path: err.path().map(PathBuf::from),
        },
    }
}

/// What a walk needs: root, link policy, and which paths to leave alone.
#[derive(Clone, Debug)]
pub struct WalkContext {
    pub root: PathBuf,
    pub follow_links: bool,
    pub filter: WalkFilter,
}

/// Walk `ctx.root` depth-first. The root itself and filtered paths are not yielded; errors are.
pub fn walk_paths(ctx: &WalkContext) -> impl Iterator<Item = WalkOutcome> + '_ {
    WalkDir::new(&ctx.root)
        .follow_links(ctx.follow_links)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .map(to_outcome_walkdir)
        .filter(|outcome| match outcome {
            WalkOutcome::Ok(path) => ctx.filter.should_scan(path),
            WalkOutcome::Err { .. } => true,
        })
}

/// True for regular files, following symlinks (a link to a file counts, a dangling link does not).
pub fn is_regular_file(path: &Path) -> bool {
    std::fs::metadata(path).is_ok_and(|m| m.is_file())
}
