use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("Unable to read {} of '{}': {}", pipe, hint, source))]
    ReadPipe {
        hint: String,
        pipe: String,
        source: std::io::Error,
    },

    #[snafu(display("The {} of '{}' was not captured", pipe, hint))]
    MissingPipe { hint: String, pipe: String },

    #[snafu(display("Unable to start '{}': {}", hint, source))]
    Spawn {
        hint: String,
        source: std::io::Error,
    },

    #[snafu(display("Failed waiting for '{}' to exit: {}", hint, source))]
    Wait {
        hint: String,
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
