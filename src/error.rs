#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Ceremony: {0}")]
    Ceremony(#[from] crate::ceremony::CeremonyError),
    #[error("API: {0}")]
    Api(#[from] crate::api::ApiError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
