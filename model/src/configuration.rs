use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;

/// The `Configuration` trait is for "plain old data" structs that a scenario persists between
/// stages, for example the options handed to a provisioning tool. Anything that is a
/// `Configuration` can be written to and read back from a scenario's temp folder.
pub trait Configuration:
    Serialize + DeserializeOwned + Clone + Debug + Default + Send + Sync + Sized + 'static
{
}
