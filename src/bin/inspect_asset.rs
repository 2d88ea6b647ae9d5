use clap::{App, Arg};
use std::io;
use std::process;

//===========================================================================//

fn main() -> io::Result<()> {
    let matches = App::new("inspect_asset")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Lists the structure of generated ICO and PNG files")
        .arg(Arg::with_name("file").multiple(true).required(true))
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .help("Enables debug logging"),
        )
        .get_matches();
    placeholder_icons::logging::init(matches.is_present("verbose"))?;
    let paths: Vec<&str> =
        matches.values_of("file").into_iter().flatten().collect();
    let stdout = io::stdout();
    let num_failed = placeholder_icons::inspect_files(&paths, stdout.lock())?;
    if num_failed > 0 {
        process::exit(1);
    }
    Ok(())
}

//===========================================================================//
