use wirebridge::codec::TypeRegistry;
use wirebridge::integration::registry;

use crate::cmd::SchemaArgs;
use crate::exit::{io_error, schema_error, CliResult, SUCCESS};
use crate::output::{print_schema, OutputFormat};

pub fn run(args: SchemaArgs, format: OutputFormat) -> CliResult<i32> {
    let registry = match &args.file {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .map_err(|err| io_error(&format!("failed reading {}", path.display()), err))?;
            TypeRegistry::from_json(&json)
                .map_err(|err| schema_error(&format!("invalid schema {}", path.display()), err))?
        }
        None => registry().map_err(|err| schema_error("registry load failed", err))?,
    };
    print_schema(&registry.to_document(), format);
    Ok(SUCCESS)
}
