use clap::Parser;

/// Parses the process arguments (and the environment variables bound to them)
pub fn parse_args<T: Parser>() -> Result<T, clap::Error> {
    T::try_parse()
}
