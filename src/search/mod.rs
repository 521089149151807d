//! Search Module
//!
//! The search-and-normalize pipeline over the FBOpen solicitation API:
//! - `query` - SBIR/STTR query string construction
//! - `pagination` - offsets and page metadata
//! - `normalize` - date parsing and agency abbreviation for raw records
//! - `backend` - the keyed and flat response envelope variants
//! - `client` - one upstream request per list or lookup

pub mod backend;
pub mod client;
pub mod normalize;
pub mod pagination;
pub mod query;

pub use backend::{Envelope, FlatEnvelopeBackend, KeyedEnvelopeBackend, UpstreamBackend};
pub use client::{SearchClient, SearchPage, SolicitationSource};
pub use normalize::{AgencyTable, NormalizedRecord, RawRecord, ResultNormalizer};
pub use pagination::{PageInfo, PageRequest, SOLICITATIONS_PER_PAGE};
pub use query::QueryBuilder;
