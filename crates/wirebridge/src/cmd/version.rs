use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    println!("wirebridge {}", env!("CARGO_PKG_VERSION"));
    if args.extended {
        println!("target: {}", option_env!("WIREBRIDGE_BUILD_TARGET").unwrap_or("unknown"));
        println!("os: {} ({})", std::env::consts::OS, std::env::consts::ARCH);
        println!("git_hash: {}", option_env!("GIT_HASH").unwrap_or("unknown"));
        println!(
            "wire: custom type ids from {}, envelope request=[method,args] reply=[value]|[code,message,details]",
            wirebridge::codec::CUSTOM_TYPE_START
        );
    }
    Ok(SUCCESS)
}
