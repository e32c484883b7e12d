//! File system reads.

use std::fs;
use std::path::Path;

use super::RealRuntime;

impl RealRuntime {
    #[tracing::instrument(skip(self))]
    pub(crate) fn read_impl(&self, path: &Path) -> std::io::Result<Vec<u8>> {
        fs::read(path)
    }
}
