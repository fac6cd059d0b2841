//! Core module - fundamental types and utilities

pub mod api;
pub mod config;
pub mod entity;
pub mod export;
pub mod fetch;
pub mod identity;
pub mod mutation;
pub mod session;
pub mod summary;
pub mod upload;
pub mod view;

pub use api::{ApiClient, ApiError, HttpTransport, Listing, Pagination, Transport};
pub use config::Config;
pub use entity::{Record, ReviewStatus, VerificationStatus};
pub use export::{ExportError, FieldSpec};
pub use fetch::{FetchState, FetchTicket, ListSource, Screen};
pub use identity::RecordId;
pub use mutation::{Action, AssumeYes, Confirm, MutationDispatcher, RefreshPolicy};
pub use session::{AuthContext, CurrentUser, Session, SessionError};
pub use upload::UploadError;
pub use view::{CollectionView, DateBucket, FilterState, Page, PageSize, PageWindow};
