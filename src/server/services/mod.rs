pub mod auth_services;
pub mod base_document_services;
pub mod edge_services;
pub mod fetch_services;
pub mod geoblock_services;
pub mod guide_services;
pub mod playlist_services;
pub mod schedule_services;

pub use auth_services::DynAuthService;
pub use base_document_services::DynBaseDocumentService;
pub use fetch_services::DynFetchService;
pub use geoblock_services::DynGeoblockService;
pub use guide_services::DynGuideService;
pub use playlist_services::DynPlaylistService;
pub use schedule_services::DynScheduleService;
