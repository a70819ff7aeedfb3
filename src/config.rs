//! Configuration module for pdfstitch.
//!
//! This module transforms environment-style arguments into a validated,
//! normalized configuration that drives the merge pipeline. It handles:
//! - Validation of limit combinations
//! - Application of defaults
//! - Resolution of the parallel parse worker count

use anyhow::{bail, Result};
use clap::Parser;

/// Lower bound on files per merge request. A merge of one document is a
/// copy, not a merge.
pub const MIN_FILE_COUNT: usize = 2;

/// Environment-driven arguments for the service binary.
///
/// Every knob can be supplied as a flag or an environment variable; the
/// environment form is the deployment surface.
#[derive(Debug, Clone, Parser)]
#[command(name = "pdfstitchd", about = "PDF merge service", version)]
pub struct ServiceArgs {
    /// Port the HTTP listener binds.
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Maximum number of files accepted per merge request.
    #[arg(long, env = "MAX_FILE_COUNT", default_value_t = 20)]
    pub max_file_count: usize,

    /// Per-file size bound, in MiB.
    #[arg(long, env = "MAX_FILE_SIZE_MIB", default_value_t = 50)]
    pub max_file_size_mib: u64,

    /// Media type uploads must declare.
    #[arg(long, env = "ACCEPTED_MEDIA_TYPE", default_value = "application/pdf")]
    pub accepted_media_type: String,

    /// Bucket the merged artifacts are written to.
    #[arg(long, env = "STORAGE_BUCKET")]
    pub storage_bucket: String,

    /// Custom endpoint for S3-compatible storage (omit for AWS).
    #[arg(long, env = "STORAGE_ENDPOINT")]
    pub storage_endpoint: Option<String>,

    /// Public base URL under which stored objects are reachable.
    #[arg(long, env = "STORAGE_PUBLIC_URL")]
    pub storage_public_url: String,

    /// Connection string for the metadata repository.
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: String,

    /// Number of parallel parse workers (default: CPU count).
    #[arg(long, env = "PARSE_JOBS")]
    pub parse_jobs: Option<usize>,
}

/// Bounds the Upload Receiver enforces on an incoming file set.
#[derive(Debug, Clone)]
pub struct MergeLimits {
    /// Maximum number of files per request.
    pub max_file_count: usize,

    /// Per-file size bound in bytes.
    pub max_file_bytes: u64,

    /// The single accepted media type.
    pub accepted_media_type: String,
}

impl Default for MergeLimits {
    fn default() -> Self {
        Self {
            max_file_count: 20,
            max_file_bytes: 50 * 1024 * 1024,
            accepted_media_type: "application/pdf".to_string(),
        }
    }
}

/// Complete configuration for the merge service.
///
/// Derived and validated from [`ServiceArgs`]; carried per request by the
/// pipeline rather than living in module globals.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// HTTP listener port.
    pub port: u16,

    /// Receiver limits.
    pub limits: MergeLimits,

    /// Number of parallel parse workers (None = auto-detect).
    pub parse_jobs: Option<usize>,
}

impl ServiceConfig {
    /// Build and validate a configuration from parsed arguments.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The maximum file count is below the fixed minimum of 2
    /// - The per-file size bound is zero
    /// - The accepted media type is blank
    /// - The parse worker count is zero
    pub fn from_args(args: &ServiceArgs) -> Result<Self> {
        let config = Self {
            port: args.port,
            limits: MergeLimits {
                max_file_count: args.max_file_count,
                max_file_bytes: args.max_file_size_mib * 1024 * 1024,
                accepted_media_type: args.accepted_media_type.trim().to_string(),
            },
            parse_jobs: args.parse_jobs,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.limits.max_file_count < MIN_FILE_COUNT {
            bail!(
                "Maximum file count must be at least {MIN_FILE_COUNT}, got {}",
                self.limits.max_file_count
            );
        }

        if self.limits.max_file_bytes == 0 {
            bail!("Per-file size bound must be positive");
        }

        if self.limits.accepted_media_type.is_empty() {
            bail!("Accepted media type must not be blank");
        }

        if let Some(jobs) = self.parse_jobs {
            if jobs == 0 {
                bail!("Number of parse workers must be at least 1");
            }
        }

        Ok(())
    }

    /// Get the effective number of parallel parse workers.
    ///
    /// Returns the configured count, or the number of CPU cores if
    /// auto-detect.
    pub fn effective_parse_jobs(&self) -> usize {
        self.parse_jobs.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }

    /// Upper bound on a whole multipart request body, in bytes.
    ///
    /// The per-file bound times the file cap, plus headroom for part
    /// headers and order fields.
    pub fn max_request_bytes(&self) -> usize {
        self.limits.max_file_bytes as usize * self.limits.max_file_count + 64 * 1024
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            limits: MergeLimits::default(),
            parse_jobs: None,
        }
    }
}
