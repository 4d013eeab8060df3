//! Command execution implementations

use super::definitions::Commands;
use super::{extract, info, insert, list, load_options};

impl Commands {
    /// Execute the selected command.
    ///
    /// # Errors
    /// Returns an error if the options cannot be loaded or the package
    /// operation fails.
    pub fn execute(&self) -> anyhow::Result<()> {
        match self {
            Commands::Extract {
                header,
                data,
                destination,
                profile,
                config,
                suffix,
                quiet,
            } => {
                let mut options = load_options(config.as_deref(), profile.as_deref())?;
                if let Some(suffix) = suffix {
                    options = options.with_output_suffix(suffix.as_str());
                }
                extract::execute(header, data, destination, &options, *quiet)
            }
            Commands::Insert {
                header,
                data,
                source,
                profile,
                config,
                sequential,
                quiet,
            } => {
                let mut options = load_options(config.as_deref(), profile.as_deref())?;
                if *sequential {
                    options = options.with_parallel_compression(false);
                }
                insert::execute(header, data, source, &options, *quiet)
            }
            Commands::List {
                header,
                profile,
                config,
                detailed,
                filter,
                count,
            } => {
                let options = load_options(config.as_deref(), profile.as_deref())?;
                list::execute(header, &options, *detailed, filter.as_deref(), *count)
            }
            Commands::Info {
                header,
                profile,
                config,
            } => {
                let options = load_options(config.as_deref(), profile.as_deref())?;
                info::execute(header, &options)
            }
        }
    }
}
