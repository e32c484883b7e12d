//! Runtime abstraction for system operations.
//!
//! The client reaches the environment and the filesystem only through the
//! [`Runtime`] trait, so configuration and image loading can be tested with
//! `MockRuntime` instead of real files and variables.
//!
//! # Structure
//!
//! - `env` - Environment variables
//! - `fs` - File reads used by the image encoder

mod env;
mod fs;

use async_trait::async_trait;
use std::env as std_env;
use std::path::Path;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Runtime: Send + Sync {
    // Environment
    fn env_var(&self, key: &str) -> Result<String, std_env::VarError>;

    // File System
    fn read(&self, path: &Path) -> std::io::Result<Vec<u8>>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RealRuntime;

#[async_trait]
impl Runtime for RealRuntime {
    fn env_var(&self, key: &str) -> Result<String, std_env::VarError> {
        self.env_var_impl(key)
    }

    fn read(&self, path: &Path) -> std::io::Result<Vec<u8>> {
        self.read_impl(path)
    }
}
