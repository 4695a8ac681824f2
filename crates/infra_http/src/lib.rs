//! HTTP infrastructure
//!
//! Outbound REST clients. Currently the applicant directory, which serves the
//! profiles used to enrich capacity-assessment requests.

pub mod applicant_directory;

pub use applicant_directory::{ApplicantDirectoryClient, ApplicantDirectoryConfig, UsuarioResponse};
