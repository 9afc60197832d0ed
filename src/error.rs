/// Payload could not be mapped for reading. The only condition that aborts a
/// processing step; everything else degrades to pass-through.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("failed to map frame payload for reading: {0}")]
pub struct MapError(pub String);

#[derive(thiserror::Error, Debug)]
pub enum DefuseError {
    #[error(transparent)]
    Map(#[from] MapError),
}
